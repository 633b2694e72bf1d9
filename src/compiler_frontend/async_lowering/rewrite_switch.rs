use crate::backends::js::runtime_helpers::Helper;
use crate::compiler_frontend::ast::ast_nodes::{
    Expression, Statement, SwitchCase, VariableDeclaration,
};
use crate::compiler_frontend::async_lowering::LoweringContext;
use crate::compiler_frontend::async_lowering::driver::{Applied, rewrite_statements};
use crate::compiler_frontend::async_lowering::jumps::{
    JumpPolicy, build_check, merge_sentinels, scan_sentinels,
};
use crate::compiler_frontend::async_lowering::reachability::{
    ExitQuery, Reach, statement_reach, statements_reach,
};
use crate::compiler_frontend::async_lowering::tail_relocation::{
    relocate_after_construct, retain_hoisted_declarations,
};
use crate::compiler_frontend::compiler_messages::compiler_errors::CompilerError;
use crate::return_compiler_error;

#[derive(Debug)]
pub struct SwitchPlan {
    exits: Reach,

    /// False when every suspending case returns or throws, so the switch can stay
    convert: bool,
    cases: Vec<CasePlan>,
}

#[derive(Debug)]
struct CasePlan {
    /// No path runs off the end of the case into the next one
    terminates: bool,
    returns: bool,
}

pub fn plan_switch(statement: &Statement, cases: &[SwitchCase]) -> SwitchPlan {
    let exits = statement_reach(statement, ExitQuery::ReturnOrThrow);

    let tests_suspend = cases
        .iter()
        .any(|case| case.test.as_ref().is_some_and(Expression::contains_await));
    let suspending_cases_exit = cases
        .iter()
        .filter(|case| case.consequent.iter().any(Statement::contains_await))
        .all(|case| statements_reach(&case.consequent, ExitQuery::ReturnOrThrow).all);

    let cases = cases
        .iter()
        .map(|case| {
            let reach = statements_reach(&case.consequent, ExitQuery::ReturnOrThrow);
            CasePlan {
                terminates: !reach.falls_through,
                returns: reach.any,
            }
        })
        .collect();

    SwitchPlan {
        exits,
        convert: tests_suspend || !suspending_cases_exit,
        cases,
    }
}

/// A switch whose cases suspend becomes a `__switch(discriminant, cases)` call.
///
/// Each case is `[test, body, check]`. The check runs after the body and decides if
/// the switch stops there. Cases that can't fall through don't get one.
pub fn rewrite_switch(
    ctx: &mut LoweringContext,
    statement: Statement,
    tail: Vec<Statement>,
    plan: SwitchPlan,
) -> Result<Applied, CompilerError> {
    let Statement::Switch {
        discriminant,
        cases,
    } = statement
    else {
        return_compiler_error!("Switch rewrite applied to a statement that isn't a switch");
    };

    if !plan.convert {
        let mut rewritten_cases = Vec::with_capacity(cases.len());
        for case in cases {
            rewritten_cases.push(SwitchCase {
                test: case.test,
                consequent: rewrite_statements(ctx, case.consequent)?,
            });
        }

        let mut rewritten = vec![Statement::Switch {
            discriminant,
            cases: rewritten_cases,
        }];
        rewritten.extend(tail);
        return Ok(Applied::rewritten(rewritten));
    }

    // A case that returns and then falls into the next one needs the exit sentinel
    // to stop the switch, even when the switch as a whole always exits
    let mark_returns = plan.exits.any
        && (!plan.exits.all
            || plan
                .cases
                .iter()
                .any(|case| case.returns && !case.terminates));
    let mut policy = JumpPolicy::for_switch_case(mark_returns);

    let mut entries = Vec::with_capacity(cases.len());
    let mut sentinels = Vec::new();

    for (case, case_plan) in cases.into_iter().zip(&plan.cases) {
        let mut entry = Vec::with_capacity(3);
        let has_body = !case.consequent.is_empty();

        match case.test {
            Some(test) => entry.push(Expression::function(
                Vec::new(),
                rewrite_statements(ctx, vec![Statement::return_value(test)])?,
            )),
            None if has_body => entry.push(Expression::undefined()),
            None => {}
        }

        if has_body {
            let consequent = policy.rewrite(ctx, case.consequent);
            let case_sentinels = scan_sentinels(ctx, &consequent);
            entry.push(Expression::function(
                Vec::new(),
                rewrite_statements(ctx, consequent)?,
            ));

            if !case_plan.terminates {
                let check = match case_sentinels.is_empty() {
                    true => ctx.helper(Helper::Empty),
                    false => build_check(&case_sentinels),
                };
                entry.push(check);
            }
            merge_sentinels(&mut sentinels, case_sentinels);
        }

        entries.push(Expression::Array(entry));
    }

    let mut rewritten = Vec::new();
    if let Some(flag) = &policy.break_flag {
        rewritten.push(Statement::VariableDeclaration(VariableDeclaration::var(
            flag,
            Some(Expression::number(0.0)),
        )));
        sentinels.retain(|sentinel| sentinel != flag);
    }

    let tail = match plan.exits.all {
        true => {
            rewritten.extend(retain_hoisted_declarations(tail));
            Vec::new()
        }
        false => tail,
    };

    let call = ctx.call_helper(
        Helper::Switch,
        vec![discriminant, Expression::Array(entries)],
    );
    rewritten.push(relocate_after_construct(
        ctx,
        call,
        &sentinels,
        tail,
        plan.exits.any,
    )?);

    Ok(Applied::rewritten(rewritten))
}
