use crate::compiler_frontend::ast::ast_nodes::{Expression, Statement};

/// Index of the last statement that suspends.
pub fn last_suspending_statement(statements: &[Statement]) -> Option<usize> {
    statements.iter().rposition(Statement::contains_await)
}

/// The child indices leading from `expression` to the `await` that is evaluated last.
/// An await whose own argument suspends is entered: its argument settles before it does.
pub fn last_suspension_path(expression: &Expression) -> Option<Vec<usize>> {
    if !expression.contains_await() {
        return None;
    }

    let mut path = Vec::new();
    let mut current = expression;
    loop {
        let children = current.children();
        match children.iter().rposition(|child| child.contains_await()) {
            Some(index) => {
                path.push(index);
                current = children[index];
            }
            None => return Some(path),
        }
    }
}
