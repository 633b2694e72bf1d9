use crate::compiler_frontend::ast::ast_nodes::{
    AssignmentOperator, Expression, ForInit, Function, PropertyKey, Statement, UnaryOperator,
};
use rustc_hash::{FxHashMap, FxHashSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameUse {
    Declared,
    Assigned,
    Referenced,
}

/// Visits every name a list of statements declares, assigns or reads.
/// Unlike most traversals in this pass, this one enters nested functions.
pub fn for_each_name<F>(statements: &[Statement], visit: &mut F)
where
    F: FnMut(&str, NameUse),
{
    for statement in statements {
        visit_statement_names(statement, visit);
    }
}

fn visit_statement_names<F>(statement: &Statement, visit: &mut F)
where
    F: FnMut(&str, NameUse),
{
    match statement {
        Statement::VariableDeclaration(declaration)
        | Statement::For {
            init: Some(ForInit::Declaration(declaration)),
            ..
        } => {
            for declarator in &declaration.declarators {
                visit(&declarator.name, NameUse::Declared);
            }
        }

        Statement::FunctionDeclaration(function) => {
            visit_function_names(function, visit);
            return;
        }

        Statement::ForIn { left, .. } | Statement::ForOf { left, .. } => {
            let usage = match left.kind {
                Some(_) => NameUse::Declared,
                None => NameUse::Assigned,
            };
            visit(&left.name, usage);
        }

        Statement::Try {
            handler: Some(handler),
            ..
        } => {
            if let Some(param) = &handler.param {
                visit(param, NameUse::Declared);
            }
        }

        _ => {}
    }

    for expression in statement.child_expressions() {
        visit_expression_names(expression, visit);
    }

    for child in statement.child_statements() {
        visit_statement_names(child, visit);
    }
}

fn visit_function_names<F>(function: &Function, visit: &mut F)
where
    F: FnMut(&str, NameUse),
{
    if let Some(name) = &function.name {
        visit(name, NameUse::Declared);
    }

    for param in &function.params {
        visit(param, NameUse::Declared);
    }

    for_each_name(&function.body, visit);
}

fn visit_expression_names<F>(expression: &Expression, visit: &mut F)
where
    F: FnMut(&str, NameUse),
{
    match expression {
        Expression::Identifier(name) => visit(name, NameUse::Referenced),

        Expression::Function(function) => visit_function_names(function, visit),

        Expression::Assignment {
            operator,
            target,
            value,
        } => {
            match target.as_ref() {
                Expression::Identifier(name) => {
                    visit(name, NameUse::Assigned);
                    if matches!(operator, AssignmentOperator::Compound(_)) {
                        visit(name, NameUse::Referenced);
                    }
                }
                other => visit_expression_names(other, visit),
            }
            visit_expression_names(value, visit);
        }

        Expression::Update { argument, .. } => match argument.as_ref() {
            Expression::Identifier(name) => {
                visit(name, NameUse::Assigned);
                visit(name, NameUse::Referenced);
            }
            other => visit_expression_names(other, visit),
        },

        other => {
            for child in other.children() {
                visit_expression_names(child, visit);
            }
        }
    }
}

/// True if any statement mentions the name in any way.
pub fn references_name(statements: &[Statement], name: &str) -> bool {
    let mut found = false;
    for_each_name(statements, &mut |used, _| {
        if used == name {
            found = true;
        }
    });

    found
}

/// True if any statement writes to the name, nested functions included.
pub fn assigns_name(statements: &[Statement], name: &str) -> bool {
    let mut found = false;
    for_each_name(statements, &mut |used, usage| {
        if usage == NameUse::Assigned && used == name {
            found = true;
        }
    });

    found
}

/// True if a function nested anywhere in the statements mentions the name
/// without binding it as a parameter.
pub fn captured_by_function(statements: &[Statement], name: &str) -> bool {
    statements
        .iter()
        .any(|statement| statement_captures(statement, name))
}

fn statement_captures(statement: &Statement, name: &str) -> bool {
    if let Statement::FunctionDeclaration(function) = statement {
        return function_mentions(function, name);
    }

    statement
        .child_expressions()
        .into_iter()
        .any(|expression| expression_captures(expression, name))
        || statement
            .child_statements()
            .into_iter()
            .any(|child| statement_captures(child, name))
}

fn expression_captures(expression: &Expression, name: &str) -> bool {
    match expression {
        Expression::Function(function) => function_mentions(function, name),
        other => other
            .children()
            .into_iter()
            .any(|child| expression_captures(child, name)),
    }
}

fn function_mentions(function: &Function, name: &str) -> bool {
    !function.params.iter().any(|param| param == name) && references_name(&function.body, name)
}

/// Renames every read and write of `from`.
/// Functions that declare their own `from` keep it.
pub fn rename_in_expression(expression: &mut Expression, from: &str, to: &str) {
    match expression {
        Expression::Identifier(name) => {
            if name == from {
                *name = to.to_owned();
            }
        }

        Expression::Function(function) => rename_in_function(function, from, to),

        other => {
            for child in other.children_mut() {
                rename_in_expression(child, from, to);
            }
        }
    }
}

fn rename_in_function(function: &mut Function, from: &str, to: &str) {
    if function.params.iter().any(|param| param == from) || declares_name(&function.body, from) {
        return;
    }

    for statement in function.body.iter_mut() {
        rename_in_statement(statement, from, to);
    }
}

fn rename_in_statement(statement: &mut Statement, from: &str, to: &str) {
    if let Statement::FunctionDeclaration(function) = statement {
        rename_in_function(function, from, to);
        return;
    }

    for expression in statement.child_expressions_mut() {
        rename_in_expression(expression, from, to);
    }

    for child in statement.child_statements_mut() {
        rename_in_statement(child, from, to);
    }
}

fn declares_name(statements: &[Statement], name: &str) -> bool {
    let mut found = false;
    for_each_name(statements, &mut |used, usage| {
        if usage == NameUse::Declared && used == name {
            found = true;
        }
    });

    found
}

/// Tracks which bindings of a unit are written exactly once.
/// Reading a constant binding after a suspension gives the same value as reading it before,
/// so the decomposer can leave such reads in place.
#[derive(Debug, Default)]
pub struct BindingTable {
    declarations: FxHashMap<String, usize>,
    assigned: FxHashSet<String>,
}

impl BindingTable {
    pub fn from_statements(statements: &[Statement]) -> Self {
        let mut table = BindingTable::default();
        for_each_name(statements, &mut |name, usage| match usage {
            NameUse::Declared => *table.declarations.entry(name.to_owned()).or_default() += 1,
            NameUse::Assigned => {
                table.assigned.insert(name.to_owned());
            }
            NameUse::Referenced => {}
        });

        table
    }

    pub fn is_constant(&self, name: &str) -> bool {
        self.declarations.get(name) == Some(&1) && !self.assigned.contains(name)
    }

    pub fn register_constant(&mut self, name: &str) {
        self.declarations.insert(name.to_owned(), 1);
        self.assigned.remove(name);
    }

    /// Expressions that evaluate to the same value no matter when they are evaluated.
    /// Globals never qualify, something else could reassign them while suspended.
    pub fn is_literal_safe(&self, expression: &Expression) -> bool {
        match expression {
            Expression::Literal(_) => true,
            Expression::Identifier(name) => name == "undefined" || self.is_constant(name),
            Expression::Unary {
                operator: UnaryOperator::Void | UnaryOperator::Minus,
                argument,
            } => matches!(argument.as_ref(), Expression::Literal(_)),
            Expression::Array(elements) => elements
                .iter()
                .all(|element| self.is_literal_safe(element)),
            Expression::Object(properties) => properties.iter().all(|property| {
                let key_is_safe = match &property.key {
                    PropertyKey::Computed(key) => self.is_literal_safe(key),
                    _ => true,
                };
                key_is_safe && self.is_literal_safe(&property.value)
            }),
            _ => false,
        }
    }
}
