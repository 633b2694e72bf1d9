use crate::backends::js::runtime_helpers::Helper;
use crate::compiler_frontend::ast::ast_nodes::{
    BinaryOperator, DeclarationKind, Declarator, Expression, ForBinding, ForInit, Literal,
    LogicalOperator, MemberProperty, Statement, UpdateOperator, VariableDeclaration,
};
use crate::compiler_frontend::async_lowering::LoweringContext;
use crate::compiler_frontend::async_lowering::bindings::{
    assigns_name, captured_by_function, references_name, rename_in_expression,
};
use crate::compiler_frontend::async_lowering::driver::{Applied, rewrite_statements};
use crate::compiler_frontend::async_lowering::jumps::{JumpPolicy, build_check, scan_sentinels};
use crate::compiler_frontend::async_lowering::reachability::{
    ExitQuery, Reach, statement_reach,
};
use crate::compiler_frontend::async_lowering::tail_relocation::relocate_after_construct;
use crate::compiler_frontend::compiler_messages::compiler_errors::CompilerError;
use crate::{lowering_log, return_compiler_error};

#[derive(Debug)]
pub struct LoopPlan {
    exits: Reach,
    index_loop: Option<IndexLoop>,
}

/// `for (let i = 0; i < array.length; i++)` with nothing else touching `i` or `array`.
#[derive(Debug)]
struct IndexLoop {
    index: String,
    array: String,
}

pub fn plan_loop(statement: &Statement, tail: &[Statement]) -> LoopPlan {
    let body = match statement {
        Statement::For { body, .. }
        | Statement::ForIn { body, .. }
        | Statement::ForOf { body, .. }
        | Statement::While { body, .. }
        | Statement::DoWhile { body, .. } => Some(body.as_ref()),
        _ => None,
    };

    let Some(body) = body else {
        return LoopPlan {
            exits: Reach::default(),
            index_loop: None,
        };
    };

    let exits = statement_reach(body, ExitQuery::ReturnOrThrow);
    let leaves = statement_reach(body, ExitQuery::ReturnThrowOrBreak);
    let index_loop = match leaves.any {
        true => None,
        false => index_loop_shape(statement, tail),
    };

    LoopPlan { exits, index_loop }
}

fn index_loop_shape(statement: &Statement, tail: &[Statement]) -> Option<IndexLoop> {
    let Statement::For {
        init: Some(ForInit::Declaration(declaration)),
        test: Some(test),
        update: Some(update),
        body,
    } = statement
    else {
        return None;
    };

    if declaration.kind == DeclarationKind::Const {
        return None;
    }

    let [
        Declarator {
            name: index,
            init: Some(Expression::Literal(Literal::Number(start))),
        },
    ] = declaration.declarators.as_slice()
    else {
        return None;
    };
    if *start != 0.0 {
        return None;
    }

    let Expression::Binary {
        operator: BinaryOperator::LessThan,
        left,
        right,
    } = test
    else {
        return None;
    };
    let Expression::Member {
        object,
        property: MemberProperty::Named(length),
    } = right.as_ref()
    else {
        return None;
    };
    let Expression::Identifier(array) = object.as_ref() else {
        return None;
    };
    if !left.is_identifier(index) || length != "length" {
        return None;
    }

    let Expression::Update {
        operator: UpdateOperator::Increment,
        argument,
        ..
    } = update
    else {
        return None;
    };
    if !argument.is_identifier(index) {
        return None;
    }

    let body = std::slice::from_ref(body.as_ref());
    if assigns_name(body, index) || assigns_name(body, array) {
        return None;
    }

    // A var index is still visible after the loop, where it would hold its final value
    if declaration.kind == DeclarationKind::Var && references_name(tail, index) {
        return None;
    }

    Some(IndexLoop {
        index: index.to_owned(),
        array: array.to_owned(),
    })
}

/// Jump handling shared by every loop shape.
struct LoopBody {
    statements: Vec<Statement>,
    policy: JumpPolicy,

    /// Sentinels set in the body that belong to something outside the loop
    foreign: Vec<String>,
}

impl LoopBody {
    fn new(ctx: &mut LoweringContext, body: Statement, plan: &LoopPlan) -> Self {
        let mut policy = JumpPolicy::for_loop_body(plan.exits.any);
        let statements = policy.rewrite(ctx, body.into_statements());

        let own = [policy.break_flag.as_deref(), policy.continue_flag.as_deref()];
        let foreign = scan_sentinels(ctx, &statements)
            .into_iter()
            .filter(|sentinel| !own.contains(&Some(sentinel.as_str())))
            .collect();

        LoopBody {
            statements,
            policy,
            foreign,
        }
    }

    /// Every sentinel that should stop the loop, its own interrupt first.
    fn stopping_sentinels(&self) -> Vec<String> {
        let mut sentinels: Vec<String> = self.policy.break_flag.iter().cloned().collect();
        sentinels.extend(self.foreign.iter().cloned());
        sentinels
    }

    /// Declarations that have to exist before the loop starts.
    fn preamble(&self) -> Vec<Statement> {
        self.policy
            .break_flag
            .iter()
            .map(|flag| zeroed(flag))
            .collect()
    }

    fn into_function(
        self,
        ctx: &mut LoweringContext,
        params: Vec<String>,
        prefix: Vec<Statement>,
    ) -> Result<Expression, CompilerError> {
        let mut statements = prefix;
        if let Some(flag) = &self.policy.continue_flag {
            statements.push(zeroed(flag));
        }
        statements.extend(self.statements);

        Ok(Expression::function(
            params,
            rewrite_statements(ctx, statements)?,
        ))
    }
}

pub fn rewrite_loop(
    ctx: &mut LoweringContext,
    statement: Statement,
    tail: Vec<Statement>,
    plan: LoopPlan,
) -> Result<Applied, CompilerError> {
    lowering_log!(
        "Loop rewrite, returns: ", #plan.exits.any,
        ", counts to length: ", #plan.index_loop.is_some()
    );

    match statement {
        Statement::ForIn { left, right, body } => {
            rewrite_keyed_loop(ctx, Helper::ForIn, left, right, *body, tail, &plan)
        }
        Statement::ForOf { left, right, body } => {
            rewrite_keyed_loop(ctx, Helper::ForOf, left, right, *body, tail, &plan)
        }
        Statement::For {
            init,
            test,
            update,
            body,
        } => rewrite_counted_loop(
            ctx,
            CountedLoop {
                init,
                test,
                update,
                tests_first: true,
            },
            *body,
            tail,
            &plan,
        ),
        Statement::While { test, body } => rewrite_counted_loop(
            ctx,
            CountedLoop {
                init: None,
                test: Some(test),
                update: None,
                tests_first: true,
            },
            *body,
            tail,
            &plan,
        ),
        Statement::DoWhile { body, test } => rewrite_counted_loop(
            ctx,
            CountedLoop {
                init: None,
                test: Some(test),
                update: None,
                tests_first: false,
            },
            *body,
            tail,
            &plan,
        ),
        _ => return_compiler_error!("Loop rewrite applied to a statement that isn't a loop"),
    }
}

// The head of a for, while or do-while loop
struct CountedLoop {
    init: Option<ForInit>,
    test: Option<Expression>,
    update: Option<Expression>,
    tests_first: bool,
}

fn rewrite_counted_loop(
    ctx: &mut LoweringContext,
    mut head: CountedLoop,
    body: Statement,
    tail: Vec<Statement>,
    plan: &LoopPlan,
) -> Result<Applied, CompilerError> {
    let body = LoopBody::new(ctx, body, plan);

    if let Some(index_loop) = &plan.index_loop {
        if head.tests_first && body.stopping_sentinels().is_empty() {
            let body_function = body.into_function(ctx, vec![index_loop.index.to_owned()], Vec::new())?;
            let call = ctx.call_helper(
                Helper::ForTo,
                vec![Expression::identifier(&index_loop.array), body_function],
            );
            let relocated = relocate_after_construct(ctx, call, &[], tail, false)?;
            return Ok(Applied::rewritten(vec![relocated]));
        }
    }

    let per_iteration = IterationBindings::split(ctx, &mut head, &body.statements);

    let mut rewritten = Vec::new();
    match head.init {
        Some(ForInit::Declaration(declaration)) => {
            rewritten.push(Statement::VariableDeclaration(declaration))
        }
        Some(ForInit::Expression(expression)) => rewritten.push(Statement::Expression(expression)),
        None => {}
    }
    rewritten.extend(body.preamble());

    let stopping = body.stopping_sentinels();
    let foreign = body.foreign.to_owned();

    let test = match (none_set(&stopping), head.test) {
        (Some(clear), Some(test)) if test != Expression::boolean(true) => {
            Expression::logical(LogicalOperator::And, clear, test)
        }
        (Some(clear), _) => clear,
        (None, Some(test)) => test,
        (None, None) => Expression::boolean(true),
    };

    let test_function = Expression::function(
        Vec::new(),
        rewrite_statements(ctx, vec![Statement::return_value(test)])?,
    );

    // A break or return leaves the loop before its update runs
    let mut update = match (head.update, none_set(&stopping)) {
        (Some(update), Some(clear)) => vec![Statement::If {
            test: clear,
            consequent: Box::new(Statement::Expression(update)),
            alternate: None,
        }],
        (Some(update), None) => vec![Statement::Expression(update)],
        (None, _) => Vec::new(),
    };

    let mut prefix = Vec::new();
    if let Some(bindings) = &per_iteration {
        prefix.push(bindings.copy_in());
        if let Some(store) = &bindings.store {
            rewritten.push(Statement::VariableDeclaration(VariableDeclaration::var(store, None)));
            prefix.push(bindings.store_back(store));
            update.insert(
                0,
                Statement::Expression(Expression::call(Expression::identifier(store), Vec::new())),
            );
        }
    }

    let update_function = match update.is_empty() {
        true => Expression::undefined(),
        false => Expression::function(Vec::new(), rewrite_statements(ctx, update)?),
    };

    let body_function = body.into_function(ctx, Vec::new(), prefix)?;

    let call = match head.tests_first {
        true => ctx.call_helper(
            Helper::For,
            vec![test_function, update_function, body_function],
        ),
        false => ctx.call_helper(Helper::Do, vec![body_function, test_function]),
    };

    let awaited_is_result = plan.exits.any || !foreign.is_empty();
    rewritten.push(relocate_after_construct(
        ctx,
        call,
        &foreign,
        tail,
        awaited_is_result,
    )?);

    Ok(Applied::rewritten(rewritten))
}

fn rewrite_keyed_loop(
    ctx: &mut LoweringContext,
    helper: Helper,
    left: ForBinding,
    right: Expression,
    body: Statement,
    tail: Vec<Statement>,
    plan: &LoopPlan,
) -> Result<Applied, CompilerError> {
    let body = LoopBody::new(ctx, body, plan);

    let mut rewritten = Vec::new();
    let mut prefix = Vec::new();

    let param = match left.kind {
        Some(DeclarationKind::Let | DeclarationKind::Const) => left.name,
        kind => {
            // The binding outlives the loop, so each key is copied into it
            let param = ctx.temporary(&left.name);
            prefix.push(Statement::Expression(Expression::assign(
                Expression::identifier(&left.name),
                Expression::identifier(&param),
            )));
            if kind == Some(DeclarationKind::Var) {
                rewritten.push(Statement::VariableDeclaration(VariableDeclaration::var(
                    &left.name, None,
                )));
            }
            param
        }
    };

    rewritten.extend(body.preamble());

    let stopping = body.stopping_sentinels();
    let foreign = body.foreign.to_owned();
    let body_function = body.into_function(ctx, vec![param], prefix)?;

    let mut arguments = vec![right, body_function];
    if !stopping.is_empty() {
        arguments.push(build_check(&stopping));
    }
    let call = ctx.call_helper(helper, arguments);

    let awaited_is_result = plan.exits.any || !foreign.is_empty();
    rewritten.push(relocate_after_construct(
        ctx,
        call,
        &foreign,
        tail,
        awaited_is_result,
    )?);

    Ok(Applied::rewritten(rewritten))
}

/// `let` bindings of a for head that a function in the body closes over.
/// Every iteration gets its own copy while the head works on carrier variables,
/// so each closure keeps the value of the iteration that created it.
struct IterationBindings {
    /// Original name and its carrier
    names: Vec<(String, String)>,

    /// Writes the body's copies back to the carriers, only when the body assigns them
    store: Option<String>,
}

impl IterationBindings {
    fn split(ctx: &mut LoweringContext, head: &mut CountedLoop, body: &[Statement]) -> Option<Self> {
        let Some(ForInit::Declaration(declaration)) = &mut head.init else {
            return None;
        };
        if declaration.kind != DeclarationKind::Let {
            return None;
        }
        if !declaration
            .declarators
            .iter()
            .any(|declarator| captured_by_function(body, &declarator.name))
        {
            return None;
        }

        // Carriers are reassigned every iteration, so they are never registered as constants
        let names: Vec<(String, String)> = declaration
            .declarators
            .iter()
            .map(|declarator| {
                let carrier = ctx.names.generate(&declarator.name);
                (declarator.name.to_owned(), carrier)
            })
            .collect();

        for (name, carrier) in &names {
            for declarator in declaration.declarators.iter_mut() {
                if let Some(init) = &mut declarator.init {
                    rename_in_expression(init, name, carrier);
                }
                if declarator.name == *name {
                    declarator.name = carrier.to_owned();
                }
            }
            for expression in head.test.iter_mut().chain(head.update.iter_mut()) {
                rename_in_expression(expression, name, carrier);
            }
        }

        let store = match names.iter().any(|(name, _)| assigns_name(body, name)) {
            true => Some(ctx.names.generate("store")),
            false => None,
        };

        Some(IterationBindings { names, store })
    }

    /// `let i = _i;`
    fn copy_in(&self) -> Statement {
        Statement::VariableDeclaration(VariableDeclaration {
            kind: DeclarationKind::Let,
            declarators: self
                .names
                .iter()
                .map(|(name, carrier)| Declarator {
                    name: name.to_owned(),
                    init: Some(Expression::identifier(carrier)),
                })
                .collect(),
        })
    }

    /// `_store = function() { _i = i; };`
    fn store_back(&self, store: &str) -> Statement {
        let writes = self
            .names
            .iter()
            .map(|(name, carrier)| {
                Statement::Expression(Expression::assign(
                    Expression::identifier(carrier),
                    Expression::identifier(name),
                ))
            })
            .collect();

        Statement::Expression(Expression::assign(
            Expression::identifier(store),
            Expression::function(Vec::new(), writes),
        ))
    }
}

/// `!_a && !_b`
fn none_set(sentinels: &[String]) -> Option<Expression> {
    sentinels
        .iter()
        .map(|sentinel| Expression::not(Expression::identifier(sentinel)))
        .reduce(|left, right| Expression::logical(LogicalOperator::And, left, right))
}

/// `var flag = 0;`
fn zeroed(flag: &str) -> Statement {
    Statement::VariableDeclaration(VariableDeclaration::var(flag, Some(Expression::number(0.0))))
}
