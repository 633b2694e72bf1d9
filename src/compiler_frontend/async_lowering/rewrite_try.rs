use crate::backends::js::runtime_helpers::Helper;
use crate::compiler_frontend::ast::ast_nodes::{CatchClause, Expression, Statement};
use crate::compiler_frontend::async_lowering::LoweringContext;
use crate::compiler_frontend::async_lowering::driver::{Applied, rewrite_statements};
use crate::compiler_frontend::async_lowering::jumps::{JumpPolicy, merge_sentinels, scan_sentinels};
use crate::compiler_frontend::async_lowering::reachability::{
    ExitQuery, Reach, statement_reach, statements_reach,
};
use crate::compiler_frontend::async_lowering::tail_relocation::{
    relocate_after_construct, retain_hoisted_declarations,
};
use crate::compiler_frontend::compiler_messages::compiler_errors::CompilerError;
use crate::return_compiler_error;

#[derive(Debug)]
pub struct TryPlan {
    exits: Reach,
    finalizer_exits: Option<Reach>,
}

pub fn plan_try(statement: &Statement) -> TryPlan {
    let finalizer_exits = match statement {
        Statement::Try {
            finalizer: Some(finalizer),
            ..
        } => Some(statements_reach(finalizer, ExitQuery::ReturnOrThrow)),
        _ => None,
    };

    TryPlan {
        exits: statement_reach(statement, ExitQuery::ReturnOrThrow),
        finalizer_exits,
    }
}

/// `try` becomes a chain on `__try(block)`:
/// the handler is attached as the rejection callback, then the finalizer through `__finally`,
/// and only then does the tail continue.
pub fn rewrite_try(
    ctx: &mut LoweringContext,
    statement: Statement,
    tail: Vec<Statement>,
    plan: TryPlan,
) -> Result<Applied, CompilerError> {
    let Statement::Try {
        mut block,
        mut handler,
        mut finalizer,
    } = statement
    else {
        return_compiler_error!("Try rewrite applied to a statement that isn't a try");
    };

    if plan.exits.any && !plan.exits.all {
        let mut policy = JumpPolicy::returns_only();
        block = policy.rewrite(ctx, block);
        handler = handler.map(|handler| CatchClause {
            param: handler.param,
            body: policy.rewrite(ctx, handler.body),
        });
        finalizer = finalizer.map(|finalizer| policy.rewrite(ctx, finalizer));
    }

    let mut sentinels = scan_sentinels(ctx, &block);
    if let Some(handler) = &handler {
        merge_sentinels(&mut sentinels, scan_sentinels(ctx, &handler.body));
    }
    if let Some(finalizer) = &finalizer {
        merge_sentinels(&mut sentinels, scan_sentinels(ctx, finalizer));
    }

    let mut awaited = try_call(ctx, block)?;

    if let Some(handler) = handler {
        let recover = match handler.body.is_empty() {
            true => ctx.helper(Helper::Empty),
            false => Expression::function(
                handler.param.into_iter().collect(),
                rewrite_statements(ctx, handler.body)?,
            ),
        };
        awaited = ctx.call_helper(
            Helper::Await,
            vec![awaited, Expression::undefined(), recover],
        );
    }

    if let Some(finalizer) = finalizer {
        let finalizer_always_exits = plan.finalizer_exits.is_some_and(|reach| reach.all);
        let finalizer_function = match finalizer_always_exits {
            true => Expression::function(Vec::new(), rewrite_statements(ctx, finalizer)?),
            false => {
                let was_thrown = ctx.temporary("wasThrown");
                let result = ctx.temporary("result");

                let mut body = finalizer;
                let rethrow = ctx.call_helper(
                    Helper::Rethrow,
                    vec![
                        Expression::identifier(&was_thrown),
                        Expression::identifier(&result),
                    ],
                );
                body.push(Statement::return_value(rethrow));

                Expression::function(vec![was_thrown, result], rewrite_statements(ctx, body)?)
            }
        };

        awaited = ctx.call_helper(Helper::Finally, vec![awaited, finalizer_function]);
    }

    let mut rewritten = Vec::new();
    let tail = match plan.exits.all {
        true => {
            rewritten.extend(retain_hoisted_declarations(tail));
            Vec::new()
        }
        false => tail,
    };

    rewritten.push(relocate_after_construct(
        ctx,
        awaited,
        &sentinels,
        tail,
        plan.exits.any,
    )?);

    Ok(Applied::rewritten(rewritten))
}

// `try { return f(); }` needs no wrapper function
fn try_call(ctx: &mut LoweringContext, block: Vec<Statement>) -> Result<Expression, CompilerError> {
    let block = rewrite_statements(ctx, block)?;

    if let [Statement::Return(Some(Expression::Call { callee, arguments }))] = block.as_slice() {
        if arguments.is_empty() {
            if let Expression::Identifier(name) = callee.as_ref() {
                let target = Expression::identifier(name);
                return Ok(ctx.call_helper(Helper::Try, vec![target]));
            }
        }
    }

    let thunk = Expression::function(Vec::new(), block);
    Ok(ctx.call_helper(Helper::Try, vec![thunk]))
}
