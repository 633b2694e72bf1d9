use crate::compiler_frontend::ast::ast_nodes::{Statement, SwitchCase};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitQuery {
    ReturnOrThrow,
    Break,
    ReturnThrowOrBreak,
}

/// How control can leave a statement or a list of statements.
/// Nested functions are never entered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Reach {
    /// Some exit of the queried kind is present
    pub any: bool,

    /// No path completes normally and no path escapes through a jump outside the query
    pub all: bool,

    /// A break leaving the subtree is present
    pub has_break: bool,

    /// Some path reaches the end of the subtree
    pub falls_through: bool,
}

// Presence flags accumulate over the whole subtree, `completes` follows the paths
#[derive(Debug, Clone, Copy, Default)]
struct Flow {
    completes: bool,
    returns: bool,
    breaks: bool,
    continues: bool,
}

impl Flow {
    fn completing() -> Self {
        Flow {
            completes: true,
            ..Flow::default()
        }
    }

    fn merge_presence(&mut self, other: Flow) {
        self.returns |= other.returns;
        self.breaks |= other.breaks;
        self.continues |= other.continues;
    }
}

pub fn statement_reach(statement: &Statement, query: ExitQuery) -> Reach {
    reach_from_flow(statement_flow(statement), query)
}

pub fn statements_reach(statements: &[Statement], query: ExitQuery) -> Reach {
    reach_from_flow(list_flow(statements), query)
}

fn reach_from_flow(flow: Flow, query: ExitQuery) -> Reach {
    let (any, escapes) = match query {
        ExitQuery::ReturnOrThrow => (flow.returns, flow.breaks || flow.continues),
        ExitQuery::Break => (flow.breaks, flow.returns || flow.continues),
        ExitQuery::ReturnThrowOrBreak => (flow.returns || flow.breaks, flow.continues),
    };

    Reach {
        any,
        all: !flow.completes && !escapes,
        has_break: flow.breaks,
        falls_through: flow.completes,
    }
}

fn list_flow(statements: &[Statement]) -> Flow {
    let mut flow = Flow::completing();

    for statement in statements {
        let next = statement_flow(statement);
        flow.merge_presence(next);

        if flow.completes && !next.completes {
            flow.completes = false;
        }
    }

    flow
}

fn statement_flow(statement: &Statement) -> Flow {
    match statement {
        Statement::Return(_) | Statement::Throw(_) => Flow {
            returns: true,
            ..Flow::default()
        },

        Statement::Break(_) => Flow {
            breaks: true,
            ..Flow::default()
        },

        Statement::Continue(_) => Flow {
            continues: true,
            ..Flow::default()
        },

        Statement::If {
            consequent,
            alternate,
            ..
        } => {
            let consequent = statement_flow(consequent);
            let alternate = alternate
                .as_deref()
                .map(statement_flow)
                .unwrap_or_else(Flow::completing);

            let mut flow = Flow {
                completes: consequent.completes || alternate.completes,
                ..Flow::default()
            };
            flow.merge_presence(consequent);
            flow.merge_presence(alternate);
            flow
        }

        Statement::Block(body) => list_flow(body),

        Statement::Labeled { body, .. } => statement_flow(body),

        // The body may run zero times, and its own jumps stay inside
        Statement::For { body, .. }
        | Statement::ForIn { body, .. }
        | Statement::ForOf { body, .. }
        | Statement::While { body, .. } => Flow {
            completes: true,
            returns: statement_flow(body).returns,
            ..Flow::default()
        },

        Statement::DoWhile { body, .. } => {
            let body = statement_flow(body);
            Flow {
                completes: body.completes || body.breaks || body.continues,
                returns: body.returns,
                ..Flow::default()
            }
        }

        Statement::Switch { cases, .. } => switch_flow(cases),

        Statement::Try {
            block,
            handler,
            finalizer,
        } => {
            let block = list_flow(block);
            let handler = handler.as_ref().map(|handler| list_flow(&handler.body));
            let finalizer = finalizer.as_deref().map(list_flow);

            let protected_completes = match handler {
                Some(handler) => block.completes || handler.completes,
                None => block.completes,
            };
            let completes =
                protected_completes && finalizer.is_none_or(|finalizer| finalizer.completes);

            let mut flow = Flow {
                completes,
                ..Flow::default()
            };
            flow.merge_presence(block);
            if let Some(handler) = handler {
                flow.merge_presence(handler);
            }
            if let Some(finalizer) = finalizer {
                flow.merge_presence(finalizer);
            }
            flow
        }

        _ => Flow::completing(),
    }
}

fn switch_flow(cases: &[SwitchCase]) -> Flow {
    let flows: Vec<Flow> = cases.iter().map(|case| list_flow(&case.consequent)).collect();

    let has_default = cases.iter().any(|case| case.test.is_none());
    let breaks = flows.iter().any(|flow| flow.breaks);
    let falls_off_end = flows.last().is_none_or(|flow| flow.completes);

    let mut flow = Flow {
        completes: !has_default || breaks || falls_off_end,
        ..Flow::default()
    };
    for case in &flows {
        flow.returns |= case.returns;
        flow.continues |= case.continues;
    }

    flow
}
