use crate::compiler_frontend::ast::ast_nodes::{
    Expression, ForInit, Statement, SwitchCase, VariableDeclaration, statements_contain_await,
};
use crate::compiler_frontend::async_lowering::LoweringContext;
use crate::compiler_frontend::async_lowering::expression_decomposer::decompose_statement;
use crate::compiler_frontend::async_lowering::reachability::{
    ExitQuery, Reach, statement_reach, statements_reach,
};
use crate::compiler_frontend::async_lowering::rewrite_conditional::{
    rewrite_block, rewrite_conditional,
};
use crate::compiler_frontend::async_lowering::rewrite_loops::{LoopPlan, plan_loop, rewrite_loop};
use crate::compiler_frontend::async_lowering::rewrite_switch::{
    SwitchPlan, plan_switch, rewrite_switch,
};
use crate::compiler_frontend::async_lowering::rewrite_try::{TryPlan, plan_try, rewrite_try};
use crate::compiler_frontend::async_lowering::suspension_locator::last_suspending_statement;
use crate::compiler_frontend::async_lowering::tail_relocation::{
    borrow_tail, relocate_tail, retain_hoisted_declarations,
};
use crate::compiler_frontend::compiler_messages::compiler_errors::CompilerError;
use crate::{lowering_log, return_compiler_error};

/// How the statement holding the last suspension gets rewritten.
/// Plans are made from the statement and tail before anything is mutated.
#[derive(Debug)]
pub enum RelocationPlan {
    // Reshapes that put simpler statements back in the queue
    Unlabel,
    SplitForInit,
    HoistHead,

    // Rewrites that consume the tail
    ExpressionTail,
    Conditional { exits: Reach },
    Block { exits: Reach },
    Loop(LoopPlan),
    Switch(SwitchPlan),
    Try(TryPlan),
}

/// The result of applying a plan.
/// `requeue` goes back in front of the unprocessed statements and may still suspend,
/// `rewritten` is final and replaces the statement and its tail.
pub struct Applied {
    pub requeue: Vec<Statement>,
    pub rewritten: Vec<Statement>,
}

impl Applied {
    pub fn rewritten(rewritten: Vec<Statement>) -> Self {
        Applied {
            requeue: Vec::new(),
            rewritten,
        }
    }
}

/// Rewrites a statement list until nothing in it suspends.
///
/// The last suspending statement is always handled first, so by the time a statement
/// is processed, everything after it has already become its continuation.
pub fn rewrite_statements(
    ctx: &mut LoweringContext,
    statements: Vec<Statement>,
) -> Result<Vec<Statement>, CompilerError> {
    let mut pending = statements;
    let mut rewritten: Vec<Statement> = Vec::new();

    while let Some(index) = last_suspending_statement(&pending) {
        let mut tail = borrow_tail(&mut pending, index);
        tail.append(&mut rewritten);

        let Some(statement) = pending.pop() else {
            return_compiler_error!("Suspending statement vanished from its list");
        };

        let plan = plan_relocation(&statement, &tail);
        lowering_log!("Relocating after ", Cyan #plan);

        let applied = apply_plan(ctx, plan, statement, tail)?;
        pending.extend(applied.requeue);
        rewritten = applied.rewritten;
    }

    pending.append(&mut rewritten);
    Ok(pending)
}

pub fn plan_relocation(statement: &Statement, tail: &[Statement]) -> RelocationPlan {
    match statement {
        Statement::Labeled { .. } => RelocationPlan::Unlabel,

        Statement::For {
            init: Some(init), ..
        } if for_init_suspends(init) => RelocationPlan::SplitForInit,

        Statement::If {
            test,
            consequent,
            alternate,
        } => {
            let branches_suspend = consequent.contains_await()
                || alternate.as_deref().is_some_and(Statement::contains_await);
            plan_head(test, branches_suspend, || RelocationPlan::Conditional {
                exits: statement_reach(statement, ExitQuery::ReturnOrThrow),
            })
        }

        Statement::Block(body) => RelocationPlan::Block {
            exits: statements_reach(body, ExitQuery::ReturnOrThrow),
        },

        Statement::ForIn { right, body, .. } | Statement::ForOf { right, body, .. } => {
            plan_head(right, body.contains_await(), || {
                RelocationPlan::Loop(plan_loop(statement, tail))
            })
        }

        Statement::For { .. } | Statement::While { .. } | Statement::DoWhile { .. } => {
            RelocationPlan::Loop(plan_loop(statement, tail))
        }

        Statement::Switch {
            discriminant,
            cases,
        } => plan_head(discriminant, cases_suspend(cases), || {
            RelocationPlan::Switch(plan_switch(statement, cases))
        }),

        Statement::Try { .. } => RelocationPlan::Try(plan_try(statement)),

        _ => RelocationPlan::ExpressionTail,
    }
}

// A construct whose head and body both suspend gets its head evaluated first, on its own
fn plan_head(
    head: &Expression,
    body_suspends: bool,
    construct: impl FnOnce() -> RelocationPlan,
) -> RelocationPlan {
    match (head.contains_await(), body_suspends) {
        (_, false) => RelocationPlan::ExpressionTail,
        (true, true) => RelocationPlan::HoistHead,
        (false, true) => construct(),
    }
}

fn cases_suspend(cases: &[SwitchCase]) -> bool {
    cases.iter().any(|case| {
        case.test.as_ref().is_some_and(Expression::contains_await)
            || statements_contain_await(&case.consequent)
    })
}

fn for_init_suspends(init: &ForInit) -> bool {
    match init {
        ForInit::Declaration(declaration) => declaration
            .declarators
            .iter()
            .filter_map(|declarator| declarator.init.as_ref())
            .any(Expression::contains_await),
        ForInit::Expression(expression) => expression.contains_await(),
    }
}

fn apply_plan(
    ctx: &mut LoweringContext,
    plan: RelocationPlan,
    statement: Statement,
    tail: Vec<Statement>,
) -> Result<Applied, CompilerError> {
    match plan {
        RelocationPlan::Unlabel => {
            let Statement::Labeled { body, .. } = statement else {
                return_compiler_error!("Unlabel plan applied to an unlabeled statement");
            };
            Ok(Applied {
                requeue: vec![*body],
                rewritten: tail,
            })
        }

        RelocationPlan::SplitForInit => split_for_init(statement, tail),

        RelocationPlan::HoistHead => hoist_head(ctx, statement, tail),

        RelocationPlan::ExpressionTail => rewrite_expression_tail(ctx, statement, tail),

        RelocationPlan::Conditional { exits } => rewrite_conditional(ctx, statement, tail, exits),

        RelocationPlan::Block { exits } => rewrite_block(ctx, statement, tail, exits),

        RelocationPlan::Loop(plan) => rewrite_loop(ctx, statement, tail, plan),

        RelocationPlan::Switch(plan) => rewrite_switch(ctx, statement, tail, plan),

        RelocationPlan::Try(plan) => rewrite_try(ctx, statement, tail, plan),
    }
}

fn split_for_init(statement: Statement, tail: Vec<Statement>) -> Result<Applied, CompilerError> {
    let Statement::For {
        init: Some(init),
        test,
        update,
        body,
    } = statement
    else {
        return_compiler_error!("For initializer split applied to a loop without one");
    };

    let init = match init {
        ForInit::Declaration(declaration) => Statement::VariableDeclaration(declaration),
        ForInit::Expression(expression) => Statement::Expression(expression),
    };

    Ok(Applied {
        requeue: vec![
            init,
            Statement::For {
                init: None,
                test,
                update,
                body,
            },
        ],
        rewritten: tail,
    })
}

fn hoist_head(
    ctx: &mut LoweringContext,
    mut statement: Statement,
    tail: Vec<Statement>,
) -> Result<Applied, CompilerError> {
    let head = match &mut statement {
        Statement::If { test, .. } => test,
        Statement::ForIn { right, .. } | Statement::ForOf { right, .. } => right,
        Statement::Switch { discriminant, .. } => discriminant,
        _ => return_compiler_error!("Head hoisting applied to a statement without a head"),
    };

    let temporary = ctx.temporary("temp");
    let value = std::mem::replace(head, Expression::identifier(&temporary));

    Ok(Applied {
        requeue: vec![
            Statement::VariableDeclaration(VariableDeclaration::var(&temporary, Some(value))),
            statement,
        ],
        rewritten: tail,
    })
}

fn rewrite_expression_tail(
    ctx: &mut LoweringContext,
    statement: Statement,
    tail: Vec<Statement>,
) -> Result<Applied, CompilerError> {
    let mut decomposed = decompose_statement(ctx, statement)?;

    let mut requeue = Vec::new();
    requeue.extend(decomposed.leading_declaration.take());
    requeue.extend(decomposed.suspension.hoisted_declaration());

    let placeholder = decomposed.suspension.placeholder;
    let awaited = decomposed.suspension.awaited;

    let (leading, tail, param) = match decomposed.remainder {
        Some(remainder) if remainder.is_return_or_throw() => {
            requeue.extend(retain_hoisted_declarations(tail));
            (vec![remainder], Vec::new(), Some(placeholder))
        }
        Some(remainder) => (vec![remainder], tail, Some(placeholder)),
        None => (Vec::new(), tail, None),
    };

    let relocated = relocate_tail(ctx, awaited, leading, tail, param, false)?;
    Ok(Applied {
        requeue,
        rewritten: vec![relocated],
    })
}
