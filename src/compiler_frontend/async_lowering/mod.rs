//! Async lowering
//!
//! Rewrites `async` functions into plain functions that sequence their suspension points
//! through the combinators in `backends::js::runtime_helpers`.
//!
//! The pass works on one function at a time, innermost first:
//! - The compatibility checker decides if a function can be rewritten at all
//! - The driver repeatedly takes the last statement containing an `await`,
//!   plans how to relocate everything after it, then applies that plan
//! - Plain statements go through the expression decomposer and tail relocation
//! - Control flow constructs (if, loops, switch, try) have their own rewriters
//!   that turn nested returns and breaks into sentinel assignments
//!
//! Every combinator that gets referenced is recorded in a `HelperUsage` set,
//! so the backend only emits the runtime code a unit actually needs.

pub(crate) mod bindings;
pub(crate) mod compatibility;
pub(crate) mod driver;
pub(crate) mod expression_decomposer;
pub(crate) mod helper_usage;
pub(crate) mod jumps;
pub(crate) mod name_generator;
pub(crate) mod program_walker;
pub(crate) mod reachability;
pub(crate) mod suspension_locator;
pub(crate) mod tail_relocation;

mod rewrite_conditional;
mod rewrite_loops;
mod rewrite_switch;
mod rewrite_try;

#[cfg(test)]
#[path = "tests/lowering_test_support.rs"]
mod lowering_test_support;

#[cfg(test)]
#[path = "tests/reachability_tests.rs"]
mod reachability_tests;

#[cfg(test)]
#[path = "tests/decomposer_tests.rs"]
mod decomposer_tests;

#[cfg(test)]
#[path = "tests/construct_tests.rs"]
mod construct_tests;

#[cfg(test)]
#[path = "tests/program_walker_tests.rs"]
mod program_walker_tests;

use crate::backends::js::runtime_helpers::Helper;
use crate::compiler_frontend::ast::ast_nodes::{Expression, Statement};
use crate::compiler_frontend::async_lowering::bindings::BindingTable;
use crate::compiler_frontend::async_lowering::helper_usage::HelperUsage;
use crate::compiler_frontend::async_lowering::name_generator::NameGenerator;
use rustc_hash::FxHashSet;

/// Everything the rewrite of a single async function needs.
/// Names and bindings are shared by the whole unit, sentinels belong to the function.
pub(crate) struct LoweringContext<'a> {
    pub(crate) names: &'a mut NameGenerator,
    pub(crate) bindings: &'a mut BindingTable,
    pub(crate) helpers: &'a mut HelperUsage,

    sentinels: FxHashSet<String>,
    exit: Option<String>,
}

impl<'a> LoweringContext<'a> {
    pub(crate) fn new(
        names: &'a mut NameGenerator,
        bindings: &'a mut BindingTable,
        helpers: &'a mut HelperUsage,
    ) -> Self {
        LoweringContext {
            names,
            bindings,
            helpers,
            sentinels: FxHashSet::default(),
            exit: None,
        }
    }

    /// A reference to a runtime helper, recorded as used.
    pub(crate) fn helper(&mut self, helper: Helper) -> Expression {
        self.helpers.record(helper);
        Expression::identifier(helper.name())
    }

    pub(crate) fn call_helper(&mut self, helper: Helper, arguments: Vec<Expression>) -> Expression {
        let callee = self.helper(helper);
        Expression::call(callee, arguments)
    }

    /// A fresh temporary. Temporaries are written once, so they count as constant bindings.
    pub(crate) fn temporary(&mut self, base: &str) -> String {
        let name = self.names.generate(base);
        self.bindings.register_constant(&name);
        name
    }

    /// A fresh temporary named after the expression it will hold.
    pub(crate) fn temporary_for(&mut self, expression: &Expression) -> String {
        let name = self.names.generate_based_on(expression);
        self.bindings.register_constant(&name);
        name
    }

    pub(crate) fn sentinel(&mut self, base: &str) -> String {
        let name = self.names.generate(base);
        self.sentinels.insert(name.to_owned());
        name
    }

    /// The exit sentinel of the function being rewritten, allocated on first use.
    pub(crate) fn exit_sentinel(&mut self) -> String {
        if let Some(exit) = &self.exit {
            return exit.to_owned();
        }

        let exit = self.sentinel("exit");
        self.exit = Some(exit.to_owned());
        exit
    }

    pub(crate) fn exit_name(&self) -> Option<&str> {
        self.exit.as_deref()
    }

    pub(crate) fn is_sentinel(&self, name: &str) -> bool {
        self.sentinels.contains(name)
    }
}

/// `name = 1;`
pub(crate) fn set_flag(name: &str) -> Statement {
    Statement::Expression(Expression::assign(
        Expression::identifier(name),
        Expression::number(1.0),
    ))
}
