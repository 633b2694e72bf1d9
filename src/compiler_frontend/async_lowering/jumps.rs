use crate::compiler_frontend::ast::ast_nodes::{
    AssignmentOperator, CatchClause, Expression, Literal, LogicalOperator, Statement, SwitchCase,
    VariableDeclaration,
};
use crate::compiler_frontend::async_lowering::{LoweringContext, set_flag};

/// What happens to a `break` or `continue` once its target becomes a helper call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JumpAction {
    Untouched,

    /// `flag = 1; return;`
    Flag,

    /// A plain `return;` when that is enough to leave the callback,
    /// `flag = 1; return;` otherwise
    ReturnAtTop,
}

/// Rewrites the jumps of a body that is about to become a callback.
/// Flags are allocated the first time they are needed.
pub struct JumpPolicy {
    breaks: JumpAction,
    continues: JumpAction,
    mark_returns: bool,
    break_base: &'static str,

    pub break_flag: Option<String>,
    pub continue_flag: Option<String>,
    pub marked_returns: bool,
}

// `direct` holds for statements sitting straight in the rewritten list.
// `same_callback` holds while no enclosing statement suspends, so a bare `return`
// still leaves the callback being built.
#[derive(Clone, Copy)]
struct Depth {
    direct: bool,
    same_callback: bool,
    in_loop: bool,
    in_switch: bool,
}

impl Depth {
    fn enter(self, suspends: bool) -> Depth {
        Depth {
            direct: false,
            same_callback: self.same_callback && !suspends,
            ..self
        }
    }

    fn inside_loop(self) -> Depth {
        Depth {
            direct: false,
            same_callback: false,
            in_loop: true,
            in_switch: self.in_switch,
        }
    }

    fn inside_switch(self, suspends: bool) -> Depth {
        Depth {
            in_switch: true,
            ..self.enter(suspends)
        }
    }

    /// A `continue` only has to end the body callback. A case `break` also has to
    /// skip the fall-through check, which only a direct jump can promise.
    fn returns_cleanly(self, jump: Jump) -> bool {
        match jump {
            Jump::Continue => self.same_callback,
            Jump::Break => self.direct,
        }
    }
}

#[derive(Clone, Copy)]
enum Jump {
    Break,
    Continue,
}

impl JumpPolicy {
    pub fn for_loop_body(mark_returns: bool) -> Self {
        JumpPolicy {
            breaks: JumpAction::Flag,
            continues: JumpAction::ReturnAtTop,
            mark_returns,
            break_base: "interrupt",
            break_flag: None,
            continue_flag: None,
            marked_returns: false,
        }
    }

    pub fn for_switch_case(mark_returns: bool) -> Self {
        JumpPolicy {
            breaks: JumpAction::ReturnAtTop,
            continues: JumpAction::Untouched,
            mark_returns,
            break_base: "break",
            break_flag: None,
            continue_flag: None,
            marked_returns: false,
        }
    }

    pub fn returns_only() -> Self {
        JumpPolicy {
            breaks: JumpAction::Untouched,
            continues: JumpAction::Untouched,
            mark_returns: true,
            break_base: "break",
            break_flag: None,
            continue_flag: None,
            marked_returns: false,
        }
    }

    pub fn rewrite(&mut self, ctx: &mut LoweringContext, statements: Vec<Statement>) -> Vec<Statement> {
        let depth = Depth {
            direct: true,
            same_callback: true,
            in_loop: false,
            in_switch: false,
        };
        self.rewrite_list(ctx, statements, depth)
    }

    fn rewrite_list(
        &mut self,
        ctx: &mut LoweringContext,
        statements: Vec<Statement>,
        depth: Depth,
    ) -> Vec<Statement> {
        let mut rewritten = Vec::with_capacity(statements.len());
        for statement in statements {
            let synthetic = rewritten
                .last()
                .is_some_and(|previous| is_sentinel_assignment(ctx, previous));
            rewritten.extend(self.rewrite_statement(ctx, statement, depth, synthetic));
        }

        rewritten
    }

    fn rewrite_single(
        &mut self,
        ctx: &mut LoweringContext,
        statement: Statement,
        depth: Depth,
    ) -> Box<Statement> {
        let rewritten = self.rewrite_statement(ctx, statement, depth, false);
        Box::new(Statement::from_statements(rewritten))
    }

    fn rewrite_statement(
        &mut self,
        ctx: &mut LoweringContext,
        statement: Statement,
        depth: Depth,
        synthetic: bool,
    ) -> Vec<Statement> {
        let suspends = statement.contains_await();
        let inner = depth.enter(suspends);

        match statement {
            Statement::Return(argument) if self.mark_returns && !synthetic => {
                self.mark_return(ctx, argument)
            }

            Statement::Break(label) if !depth.in_loop && !depth.in_switch => {
                self.apply(ctx, self.breaks, Jump::Break, depth, Statement::Break(label))
            }

            Statement::Continue(label) if !depth.in_loop => {
                self.apply(ctx, self.continues, Jump::Continue, depth, Statement::Continue(label))
            }

            Statement::If {
                test,
                consequent,
                alternate,
            } => {
                let consequent = self.rewrite_single(ctx, *consequent, inner);
                let alternate =
                    alternate.map(|alternate| self.rewrite_single(ctx, *alternate, inner));
                vec![Statement::If {
                    test,
                    consequent,
                    alternate,
                }]
            }

            Statement::Block(body) => vec![Statement::Block(self.rewrite_list(
                ctx,
                body,
                inner,
            ))],

            Statement::Labeled { label, body } => vec![Statement::Labeled {
                label,
                body: self.rewrite_single(ctx, *body, inner),
            }],

            Statement::For {
                init,
                test,
                update,
                body,
            } => vec![Statement::For {
                init,
                test,
                update,
                body: self.rewrite_single(ctx, *body, depth.inside_loop()),
            }],

            Statement::ForIn { left, right, body } => vec![Statement::ForIn {
                left,
                right,
                body: self.rewrite_single(ctx, *body, depth.inside_loop()),
            }],

            Statement::ForOf { left, right, body } => vec![Statement::ForOf {
                left,
                right,
                body: self.rewrite_single(ctx, *body, depth.inside_loop()),
            }],

            Statement::While { test, body } => vec![Statement::While {
                test,
                body: self.rewrite_single(ctx, *body, depth.inside_loop()),
            }],

            Statement::DoWhile { body, test } => vec![Statement::DoWhile {
                body: self.rewrite_single(ctx, *body, depth.inside_loop()),
                test,
            }],

            Statement::Switch {
                discriminant,
                cases,
            } => {
                let cases = cases
                    .into_iter()
                    .map(|case| SwitchCase {
                        test: case.test,
                        consequent: self.rewrite_list(
                            ctx,
                            case.consequent,
                            depth.inside_switch(suspends),
                        ),
                    })
                    .collect();
                vec![Statement::Switch {
                    discriminant,
                    cases,
                }]
            }

            Statement::Try {
                block,
                handler,
                finalizer,
            } => {
                let block = self.rewrite_list(ctx, block, inner);
                let handler = handler.map(|handler| CatchClause {
                    param: handler.param,
                    body: self.rewrite_list(ctx, handler.body, inner),
                });
                let finalizer =
                    finalizer.map(|finalizer| self.rewrite_list(ctx, finalizer, inner));
                vec![Statement::Try {
                    block,
                    handler,
                    finalizer,
                }]
            }

            other => vec![other],
        }
    }

    fn apply(
        &mut self,
        ctx: &mut LoweringContext,
        action: JumpAction,
        jump: Jump,
        depth: Depth,
        original: Statement,
    ) -> Vec<Statement> {
        match action {
            JumpAction::Untouched => vec![original],
            JumpAction::ReturnAtTop if depth.returns_cleanly(jump) => vec![Statement::Return(None)],
            JumpAction::ReturnAtTop | JumpAction::Flag => {
                let flag = self.flag(ctx, jump);
                vec![set_flag(&flag), Statement::Return(None)]
            }
        }
    }

    fn flag(&mut self, ctx: &mut LoweringContext, jump: Jump) -> String {
        match jump {
            Jump::Break => {
                let base = self.break_base;
                self.break_flag
                    .get_or_insert_with(|| ctx.sentinel(base))
                    .to_owned()
            }
            Jump::Continue => self
                .continue_flag
                .get_or_insert_with(|| ctx.sentinel("continue"))
                .to_owned(),
        }
    }

    /// The exit sentinel is only set once the returned value has been evaluated,
    /// so a throwing return value still reaches an enclosing catch with the sentinel clear.
    fn mark_return(&mut self, ctx: &mut LoweringContext, argument: Option<Expression>) -> Vec<Statement> {
        self.marked_returns = true;
        let exit = ctx.exit_sentinel();

        match argument {
            Some(value) if !ctx.bindings.is_literal_safe(&value) => {
                let result = ctx.temporary("returnValue");
                vec![
                    Statement::VariableDeclaration(VariableDeclaration::var(&result, Some(value))),
                    set_flag(&exit),
                    Statement::return_value(Expression::identifier(&result)),
                ]
            }
            argument => vec![set_flag(&exit), Statement::Return(argument)],
        }
    }
}

fn is_sentinel_assignment(ctx: &LoweringContext, statement: &Statement) -> bool {
    match statement {
        Statement::Expression(Expression::Assignment {
            operator: AssignmentOperator::Assign,
            target,
            value,
        }) => match (target.as_ref(), value.as_ref()) {
            (Expression::Identifier(name), Expression::Literal(Literal::Number(one))) => {
                *one == 1.0 && ctx.is_sentinel(name)
            }
            _ => false,
        },
        _ => false,
    }
}

/// Sentinels set anywhere in the statements, in first-seen order.
/// Functions are not entered, their sentinels belong to their own rewrite.
pub fn scan_sentinels(ctx: &LoweringContext, statements: &[Statement]) -> Vec<String> {
    let mut found = Vec::new();
    collect_sentinels(ctx, statements, &mut found);
    found
}

fn collect_sentinels(ctx: &LoweringContext, statements: &[Statement], found: &mut Vec<String>) {
    for statement in statements {
        if is_sentinel_assignment(ctx, statement) {
            if let Statement::Expression(Expression::Assignment { target, .. }) = statement {
                if let Expression::Identifier(name) = target.as_ref() {
                    if !found.contains(name) {
                        found.push(name.to_owned());
                    }
                }
            }
            continue;
        }

        for child in statement.child_statements() {
            collect_sentinels(ctx, std::slice::from_ref(child), found);
        }
    }
}

/// Appends sentinels that aren't already in the list.
pub fn merge_sentinels(into: &mut Vec<String>, from: Vec<String>) {
    for sentinel in from {
        if !into.contains(&sentinel) {
            into.push(sentinel);
        }
    }
}

fn any_set(sentinels: &[String]) -> Expression {
    let mut names = sentinels.iter();
    let first = names
        .next()
        .map(Expression::identifier)
        .unwrap_or_else(|| Expression::boolean(false));

    names.fold(first, |test, name| {
        Expression::logical(LogicalOperator::Or, test, Expression::identifier(name))
    })
}

/// `if (_a || _b) return _result;`
pub fn build_guard(sentinels: &[String], result: &str) -> Statement {
    Statement::If {
        test: any_set(sentinels),
        consequent: Box::new(Statement::return_value(Expression::identifier(result))),
        alternate: None,
    }
}

/// `function() { return _a || _b; }`
pub fn build_check(sentinels: &[String]) -> Expression {
    Expression::function(Vec::new(), vec![Statement::return_value(any_set(sentinels))])
}
