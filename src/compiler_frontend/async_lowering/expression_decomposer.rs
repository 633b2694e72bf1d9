use crate::compiler_frontend::ast::ast_nodes::{
    AssignmentOperator, BinaryOperator, DeclarationKind, Declarator, Expression, LogicalOperator,
    MemberProperty, Statement, VariableDeclaration,
};
use crate::compiler_frontend::async_lowering::LoweringContext;
use crate::compiler_frontend::async_lowering::suspension_locator::last_suspension_path;
use crate::compiler_frontend::compiler_messages::compiler_errors::CompilerError;
use crate::return_compiler_error;

/// The last suspension point of an expression, pulled out.
/// `hoisted` holds temporaries for everything that has to be evaluated before the await,
/// in evaluation order. The await itself has been replaced by `placeholder`.
#[derive(Debug)]
pub struct Suspension {
    pub awaited: Expression,
    pub hoisted: Vec<(String, Expression)>,
    pub placeholder: String,
}

impl Suspension {
    /// `var _a = ..., _b = ...;` for the hoisted temporaries.
    pub fn hoisted_declaration(&mut self) -> Option<Statement> {
        if self.hoisted.is_empty() {
            return None;
        }

        let declarators = std::mem::take(&mut self.hoisted)
            .into_iter()
            .map(|(name, init)| Declarator {
                name,
                init: Some(init),
            })
            .collect();

        Some(Statement::VariableDeclaration(VariableDeclaration {
            kind: DeclarationKind::Var,
            declarators,
        }))
    }
}

// Hoisted work on one side of a short circuit only runs when that side would have run
enum ShortCircuit {
    WhenTruthy(Expression),
    WhenFalsy(Expression),
}

impl ShortCircuit {
    fn wrap(&self, value: Expression, otherwise: Expression) -> Expression {
        match self {
            ShortCircuit::WhenTruthy(test) => {
                Expression::conditional(test.to_owned(), value, otherwise)
            }
            ShortCircuit::WhenFalsy(test) => {
                Expression::conditional(test.to_owned(), otherwise, value)
            }
        }
    }
}

pub fn extract_last_await(
    ctx: &mut LoweringContext,
    expression: &mut Expression,
) -> Result<Suspension, CompilerError> {
    let Some(path) = last_suspension_path(expression) else {
        return_compiler_error!("Tried to extract an await from an expression without one");
    };

    extract_along(ctx, expression, &path)
}

fn extract_along(
    ctx: &mut LoweringContext,
    expression: &mut Expression,
    path: &[usize],
) -> Result<Suspension, CompilerError> {
    let Some((&index, rest)) = path.split_first() else {
        return replace_await(ctx, expression);
    };

    if let Some(merged) = merge_conditional_awaits(ctx, expression, index, rest)? {
        return Ok(merged);
    }

    let mut hoisted = Vec::new();
    let mut guard = None;
    let mut receiver = None;
    let mut compound = None;

    // Everything evaluated before the child that suspends
    match expression {
        Expression::Binary { left, .. } if index == 1 => hoist_unsafe(ctx, left, &mut hoisted),

        Expression::Logical { operator, left, .. } if index == 1 => {
            let test = hoist_for_test(ctx, left, &mut hoisted);
            guard = Some(match operator {
                LogicalOperator::And => ShortCircuit::WhenTruthy(test),
                LogicalOperator::Or => ShortCircuit::WhenFalsy(test),
            });
        }

        Expression::Conditional { test, .. } if index > 0 => {
            let test = hoist_for_test(ctx, test, &mut hoisted);
            guard = Some(match index {
                1 => ShortCircuit::WhenTruthy(test),
                _ => ShortCircuit::WhenFalsy(test),
            });
        }

        Expression::Call { callee, arguments } if index > 0 => {
            receiver = hoist_callee(ctx, callee, &mut hoisted);
            for argument in arguments.iter_mut().take(index - 1) {
                hoist_unsafe(ctx, argument, &mut hoisted);
            }
        }

        Expression::New { callee, arguments } if index > 0 => {
            hoist_unsafe(ctx, callee, &mut hoisted);
            for argument in arguments.iter_mut().take(index - 1) {
                hoist_unsafe(ctx, argument, &mut hoisted);
            }
        }

        Expression::Member { object, .. } if index == 1 => hoist_unsafe(ctx, object, &mut hoisted),

        Expression::Assignment {
            operator,
            target,
            ..
        } if index == 1 => {
            if let Expression::Member { object, property } = target.as_mut() {
                hoist_unsafe(ctx, object, &mut hoisted);
                if let MemberProperty::Computed(key) = property {
                    hoist_unsafe(ctx, key, &mut hoisted);
                }
            }

            if let AssignmentOperator::Compound(binary) = *operator {
                let current = ctx.temporary_for(target);
                hoisted.push((current.to_owned(), target.as_ref().to_owned()));
                compound = Some((binary, current));
            }
        }

        Expression::Array(_) | Expression::Object(_) | Expression::Sequence(_) => {
            for earlier in expression.children_mut().into_iter().take(index) {
                hoist_unsafe(ctx, earlier, &mut hoisted);
            }
        }

        _ => {}
    }

    let mut inner = {
        let Some(child) = expression.children_mut().into_iter().nth(index) else {
            return_compiler_error!("Suspension path points past the children of an expression");
        };
        extract_along(ctx, child, rest)?
    };

    if let Some(receiver) = receiver {
        bind_method_call(expression, receiver);
    }

    if let Some((binary, current)) = compound {
        expand_compound_assignment(expression, binary, &current);
    }

    if let Some(guard) = guard {
        for (_, init) in inner.hoisted.iter_mut() {
            let value = std::mem::replace(init, Expression::undefined());
            *init = guard.wrap(value, Expression::undefined());
        }

        let awaited = std::mem::replace(&mut inner.awaited, Expression::undefined());
        inner.awaited = guard.wrap(awaited, Expression::number(0.0));
    }

    hoisted.append(&mut inner.hoisted);
    Ok(Suspension {
        awaited: inner.awaited,
        hoisted,
        placeholder: inner.placeholder,
    })
}

fn replace_await(
    ctx: &mut LoweringContext,
    expression: &mut Expression,
) -> Result<Suspension, CompilerError> {
    let Expression::Await(argument) = expression else {
        return_compiler_error!("Suspension path does not end at an await");
    };

    let placeholder = ctx.temporary_for(argument);
    let Expression::Await(argument) =
        std::mem::replace(expression, Expression::identifier(&placeholder))
    else {
        return_compiler_error!("Suspension path does not end at an await");
    };

    Ok(Suspension {
        awaited: *argument,
        hoisted: Vec::new(),
        placeholder,
    })
}

/// `c ? await a : await b` suspends once on `c ? a : b`.
fn merge_conditional_awaits(
    ctx: &mut LoweringContext,
    expression: &mut Expression,
    index: usize,
    rest: &[usize],
) -> Result<Option<Suspension>, CompilerError> {
    let Expression::Conditional {
        test,
        consequent,
        alternate,
    } = expression
    else {
        return Ok(None);
    };

    let is_direct_await = |branch: &Expression| {
        matches!(branch, Expression::Await(argument) if !argument.contains_await())
    };
    if index != 2
        || !rest.is_empty()
        || !is_direct_await(consequent.as_ref())
        || !is_direct_await(alternate.as_ref())
    {
        return Ok(None);
    }

    let mut hoisted = Vec::new();
    let test = hoist_for_test(ctx, test, &mut hoisted);

    let (Expression::Await(consequent), Expression::Await(alternate)) = (
        std::mem::replace(consequent.as_mut(), Expression::undefined()),
        std::mem::replace(alternate.as_mut(), Expression::undefined()),
    ) else {
        return_compiler_error!("Conditional branches stopped being awaits while merging them");
    };

    let placeholder = ctx.temporary_for(&alternate);
    *expression = Expression::identifier(&placeholder);

    Ok(Some(Suspension {
        awaited: Expression::conditional(test, *consequent, *alternate),
        hoisted,
        placeholder,
    }))
}

fn hoist_unsafe(
    ctx: &mut LoweringContext,
    slot: &mut Expression,
    hoisted: &mut Vec<(String, Expression)>,
) {
    if ctx.bindings.is_literal_safe(slot) {
        return;
    }

    let name = ctx.temporary_for(slot);
    let value = std::mem::replace(slot, Expression::identifier(&name));
    hoisted.push((name, value));
}

/// Hoists a short circuit test and returns what later reads of it should use.
fn hoist_for_test(
    ctx: &mut LoweringContext,
    slot: &mut Expression,
    hoisted: &mut Vec<(String, Expression)>,
) -> Expression {
    hoist_unsafe(ctx, slot, hoisted);
    slot.to_owned()
}

/// A method looked up on an unsafe receiver is read once, before the suspension,
/// and later called with that receiver through `.call`.
/// Returns the receiver when that happened.
fn hoist_callee(
    ctx: &mut LoweringContext,
    callee: &mut Expression,
    hoisted: &mut Vec<(String, Expression)>,
) -> Option<Expression> {
    let Expression::Member { object, property } = callee else {
        hoist_unsafe(ctx, callee, hoisted);
        return None;
    };

    let receiver_is_safe = ctx.bindings.is_literal_safe(object);
    if !receiver_is_safe {
        hoist_unsafe(ctx, object, hoisted);
    }
    if let MemberProperty::Computed(key) = property {
        hoist_unsafe(ctx, key, hoisted);
    }
    if receiver_is_safe {
        return None;
    }

    let receiver = object.as_ref().to_owned();
    let method = ctx.temporary_for(callee);
    let lookup = std::mem::replace(callee, Expression::identifier(&method));
    hoisted.push((method, lookup));

    Some(receiver)
}

fn bind_method_call(expression: &mut Expression, receiver: Expression) {
    if let Expression::Call { callee, arguments } = expression {
        let method = std::mem::replace(callee.as_mut(), Expression::This);
        **callee = Expression::member(method, "call");
        arguments.insert(0, receiver);
    }
}

/// `a += await b` becomes `a = _a + _b`, with `_a` read before the suspension.
fn expand_compound_assignment(expression: &mut Expression, binary: BinaryOperator, current: &str) {
    if let Expression::Assignment {
        operator, value, ..
    } = expression
    {
        let right = std::mem::replace(value.as_mut(), Expression::undefined());
        **value = Expression::Binary {
            operator: binary,
            left: Box::new(Expression::identifier(current)),
            right: Box::new(right),
        };
        *operator = AssignmentOperator::Assign;
    }
}

/// A statement split around its last suspension point.
pub struct DecomposedStatement {
    /// Declarators that came before the suspending one
    pub leading_declaration: Option<Statement>,
    pub suspension: Suspension,

    /// The statement reading the placeholder. None when nothing is left of it
    pub remainder: Option<Statement>,
}

pub fn decompose_statement(
    ctx: &mut LoweringContext,
    statement: Statement,
) -> Result<DecomposedStatement, CompilerError> {
    match statement {
        Statement::VariableDeclaration(mut declaration) => {
            let Some(position) = declaration.declarators.iter().rposition(|declarator| {
                declarator
                    .init
                    .as_ref()
                    .is_some_and(Expression::contains_await)
            }) else {
                return_compiler_error!("Declaration has no suspending initializer");
            };

            let suspending = declaration.declarators.split_off(position);
            let leading_declaration = (!declaration.declarators.is_empty()).then(|| {
                Statement::VariableDeclaration(VariableDeclaration {
                    kind: declaration.kind,
                    declarators: std::mem::take(&mut declaration.declarators),
                })
            });
            declaration.declarators = suspending;

            let Some(init) = declaration
                .declarators
                .first_mut()
                .and_then(|declarator| declarator.init.as_mut())
            else {
                return_compiler_error!("Suspending declarator lost its initializer");
            };

            let suspension = extract_last_await(ctx, init)?;
            Ok(DecomposedStatement {
                leading_declaration,
                suspension,
                remainder: Some(Statement::VariableDeclaration(declaration)),
            })
        }

        mut statement => {
            let suspension = {
                let Some(expression) = statement
                    .child_expressions_mut()
                    .into_iter()
                    .rev()
                    .find(|expression| expression.contains_await())
                else {
                    return_compiler_error!("Statement has no suspending expression");
                };
                extract_last_await(ctx, expression)?
            };

            let remainder = match &statement {
                Statement::Expression(expression) if expression.is_identifier(&suspension.placeholder) => {
                    None
                }
                _ => Some(statement),
            };

            Ok(DecomposedStatement {
                leading_declaration: None,
                suspension,
                remainder,
            })
        }
    }
}
