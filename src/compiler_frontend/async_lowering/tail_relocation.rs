use crate::backends::js::runtime_helpers::Helper;
use crate::compiler_frontend::ast::ast_nodes::{
    DeclarationKind, Declarator, Expression, Statement, VariableDeclaration,
};
use crate::compiler_frontend::async_lowering::LoweringContext;
use crate::compiler_frontend::async_lowering::driver::rewrite_statements;
use crate::compiler_frontend::async_lowering::jumps::build_guard;
use crate::compiler_frontend::compiler_messages::compiler_errors::CompilerError;

/// Detaches every statement after `index`.
pub fn borrow_tail(statements: &mut Vec<Statement>, index: usize) -> Vec<Statement> {
    if index + 1 >= statements.len() {
        return Vec::new();
    }

    statements.split_off(index + 1)
}

/// Turns `leading ++ tail` into the continuation of `awaited` and returns the statement
/// that replaces all of it.
///
/// With nothing to continue with, the result is `return awaited` when the awaited value
/// is what the function should resolve to, otherwise `return __await(awaited, __empty)`
/// so the function still resolves to undefined.
pub fn relocate_tail(
    ctx: &mut LoweringContext,
    awaited: Expression,
    leading: Vec<Statement>,
    tail: Vec<Statement>,
    param: Option<String>,
    awaited_is_result: bool,
) -> Result<Statement, CompilerError> {
    let mut body = leading;
    body.extend(tail);

    if !body.is_empty() {
        let body = rewrite_statements(ctx, body)?;
        let params: Vec<String> = param.into_iter().collect();

        if is_passthrough(&params, &body) {
            return Ok(Statement::return_value(awaited));
        }

        let continuation = Expression::function(params, body);
        return Ok(Statement::return_value(
            ctx.call_helper(Helper::Await, vec![awaited, continuation]),
        ));
    }

    if awaited_is_result {
        return Ok(Statement::return_value(awaited));
    }

    let empty = ctx.helper(Helper::Empty);
    Ok(Statement::return_value(
        ctx.call_helper(Helper::Await, vec![awaited, empty]),
    ))
}

/// Relocates the tail after a construct that became a helper call.
/// When the construct can set sentinels, the continuation first checks them and
/// hands the construct's result straight through.
pub fn relocate_after_construct(
    ctx: &mut LoweringContext,
    awaited: Expression,
    sentinels: &[String],
    tail: Vec<Statement>,
    awaited_is_result: bool,
) -> Result<Statement, CompilerError> {
    if tail.is_empty() || sentinels.is_empty() {
        return relocate_tail(ctx, awaited, Vec::new(), tail, None, awaited_is_result);
    }

    let result = ctx.temporary("result");
    let guard = build_guard(sentinels, &result);
    relocate_tail(
        ctx,
        awaited,
        vec![guard],
        tail,
        Some(result),
        awaited_is_result,
    )
}

// `function(x) { return x; }` adds nothing to a promise chain
fn is_passthrough(params: &[String], body: &[Statement]) -> bool {
    match (params, body) {
        ([param], [Statement::Return(Some(value))]) => value.is_identifier(param),
        _ => false,
    }
}

/// What must survive from a tail that can never run:
/// function declarations, and the names of `var` declarations (both are hoisted).
pub fn retain_hoisted_declarations(tail: Vec<Statement>) -> Vec<Statement> {
    let mut retained = Vec::new();
    let mut var_names = Vec::new();

    for statement in tail {
        collect_hoisted(statement, &mut retained, &mut var_names);
    }

    if !var_names.is_empty() {
        retained.push(Statement::VariableDeclaration(VariableDeclaration {
            kind: DeclarationKind::Var,
            declarators: var_names
                .into_iter()
                .map(|name| Declarator { name, init: None })
                .collect(),
        }));
    }

    retained
}

fn collect_hoisted(statement: Statement, functions: &mut Vec<Statement>, var_names: &mut Vec<String>) {
    match statement {
        Statement::FunctionDeclaration(_) => functions.push(statement),

        Statement::VariableDeclaration(VariableDeclaration {
            kind: DeclarationKind::Var,
            declarators,
        }) => {
            for declarator in declarators {
                if !var_names.contains(&declarator.name) {
                    var_names.push(declarator.name);
                }
            }
        }

        // Function declarations nested in blocks are block scoped, only `var` names escape
        mut other => {
            let mut nested_functions = Vec::new();
            for child in other.child_statements_mut() {
                let child = std::mem::replace(child, Statement::Empty);
                collect_hoisted(child, &mut nested_functions, var_names);
            }
        }
    }
}
