use crate::compiler_frontend::ast::ast_nodes::{Expression, Statement};
use crate::compiler_frontend::async_lowering::LoweringContext;
use crate::compiler_frontend::async_lowering::driver::{Applied, rewrite_statements};
use crate::compiler_frontend::async_lowering::jumps::{JumpPolicy, merge_sentinels, scan_sentinels};
use crate::compiler_frontend::async_lowering::reachability::Reach;
use crate::compiler_frontend::async_lowering::tail_relocation::{
    relocate_after_construct, retain_hoisted_declarations,
};
use crate::compiler_frontend::compiler_messages::compiler_errors::CompilerError;
use crate::return_compiler_error;

/// An `if` whose branches suspend.
///
/// When every branch returns or throws, the branches are rewritten where they are and the
/// tail is dropped. Otherwise the `if` runs inside an immediately invoked function and the
/// tail continues after it, guarded by whatever sentinels the branches can set.
pub fn rewrite_conditional(
    ctx: &mut LoweringContext,
    statement: Statement,
    tail: Vec<Statement>,
    exits: Reach,
) -> Result<Applied, CompilerError> {
    let Statement::If {
        test,
        consequent,
        alternate,
    } = statement
    else {
        return_compiler_error!("Conditional rewrite applied to a statement that isn't an if");
    };

    let mut consequent = consequent.into_statements();
    let mut alternate = alternate.map(|alternate| alternate.into_statements());

    if exits.all {
        let rewritten = build_if(ctx, test, consequent, alternate)?;
        return Ok(Applied {
            requeue: retain_hoisted_declarations(tail),
            rewritten: vec![rewritten],
        });
    }

    if exits.any {
        let mut policy = JumpPolicy::returns_only();
        consequent = policy.rewrite(ctx, consequent);
        alternate = alternate.map(|alternate| policy.rewrite(ctx, alternate));
    }

    let mut sentinels = scan_sentinels(ctx, &consequent);
    if let Some(alternate) = &alternate {
        merge_sentinels(&mut sentinels, scan_sentinels(ctx, alternate));
    }

    let rewritten = build_if(ctx, test, consequent, alternate)?;
    let evaluated = immediately_invoked(vec![rewritten]);
    let relocated = relocate_after_construct(ctx, evaluated, &sentinels, tail, exits.any)?;

    Ok(Applied::rewritten(vec![relocated]))
}

/// A block that suspends and isn't the body of anything, handled like a one armed `if`.
pub fn rewrite_block(
    ctx: &mut LoweringContext,
    statement: Statement,
    tail: Vec<Statement>,
    exits: Reach,
) -> Result<Applied, CompilerError> {
    let Statement::Block(mut body) = statement else {
        return_compiler_error!("Block rewrite applied to a statement that isn't a block");
    };

    if exits.all {
        let rewritten = rewrite_statements(ctx, body)?;
        return Ok(Applied {
            requeue: retain_hoisted_declarations(tail),
            rewritten: vec![Statement::Block(rewritten)],
        });
    }

    if exits.any {
        body = JumpPolicy::returns_only().rewrite(ctx, body);
    }

    let sentinels = scan_sentinels(ctx, &body);
    let body = rewrite_statements(ctx, body)?;
    let evaluated = immediately_invoked(body);
    let relocated = relocate_after_construct(ctx, evaluated, &sentinels, tail, exits.any)?;

    Ok(Applied::rewritten(vec![relocated]))
}

fn build_if(
    ctx: &mut LoweringContext,
    test: Expression,
    consequent: Vec<Statement>,
    alternate: Option<Vec<Statement>>,
) -> Result<Statement, CompilerError> {
    let consequent = rewrite_statements(ctx, consequent)?;
    let alternate = match alternate {
        Some(alternate) => Some(Box::new(Statement::from_statements(rewrite_statements(
            ctx, alternate,
        )?))),
        None => None,
    };

    Ok(Statement::If {
        test,
        consequent: Box::new(Statement::from_statements(consequent)),
        alternate,
    })
}

/// `(function() { body })()`
fn immediately_invoked(body: Vec<Statement>) -> Expression {
    Expression::call(Expression::function(Vec::new(), body), Vec::new())
}
