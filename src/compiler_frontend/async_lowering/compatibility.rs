use crate::compiler_frontend::ast::ast_nodes::Statement;

/// Labeled jumps can't be expressed once loops and switches become helper calls.
/// Those functions are left as they are.
pub fn is_compatible(body: &[Statement]) -> bool {
    body.iter().all(statement_is_compatible)
}

fn statement_is_compatible(statement: &Statement) -> bool {
    match statement {
        Statement::Break(Some(_)) | Statement::Continue(Some(_)) => false,
        other => other
            .child_statements()
            .into_iter()
            .all(statement_is_compatible),
    }
}
