use super::lowering_test_support::{lower, lowered};
use crate::backends::js::runtime_helpers::Helper;
use crate::compiler_frontend::compiler_messages::compiler_warnings::WarningKind;

#[test]
fn function_without_awaits_is_only_wrapped() {
    let lowered = lower("async function f(a) { return a + 1; }");

    assert_eq!(
        lowered.output,
        "var f = __async(function(a) { return a + 1; });"
    );
    assert_eq!(lowered.outcome.transformed, 1);
    assert!(lowered.helpers.contains(Helper::Async));
    assert!(!lowered.helpers.contains(Helper::Await));
}

#[test]
fn lowered_declarations_move_to_the_top_of_their_list() {
    assert_eq!(
        lowered("f(); async function f() { await a; }"),
        "var f = __async(function() { return __await(a, __empty); }); f();"
    );
}

#[test]
fn function_declarations_stay_ahead_of_the_continuations() {
    assert_eq!(
        lowered("async function f() { return await a; function helper() {} }"),
        "var f = __async(function() { function helper() {} return a; });"
    );
}

#[test]
fn async_object_method_is_wrapped_in_place() {
    assert_eq!(
        lowered("var o = { async load(id) { return await this.get(id); } };"),
        "var o = { load: __async(function(id) { var _this = this; return _this.get(id); }) };"
    );
}

#[test]
fn async_arrow_becomes_a_wrapped_function() {
    assert_eq!(
        lowered("var g = async (x) => await x + 1;"),
        "var g = __async(function(x) { return __await(x, function(_x) { return _x + 1; }); });"
    );
}

#[test]
fn named_function_expression_keeps_its_name() {
    let output = lowered("var g = async function load(x) { return await x; };");

    assert_eq!(output, "var g = __async(function load(x) { return x; });");
}

#[test]
fn this_is_read_through_an_alias() {
    assert_eq!(
        lowered("var o = { m: async function() { return await this.load(); } };"),
        "var o = { m: __async(function() { var _this = this; return _this.load(); }) };"
    );
}

#[test]
fn arrows_share_the_receiver_of_their_parent() {
    let output = lowered(
        "function outer() { var run = async () => { await step(); return this.value; }; return run; }",
    );

    assert!(output.starts_with("function outer() { var _this = this;"));
    assert!(output.contains("return _this.value;"));
}

#[test]
fn arguments_are_captured_before_the_first_suspension() {
    let output = lowered("async function f() { await a; return arguments.length; }");

    assert!(output.contains("var _arguments = arguments;"));
    assert!(output.contains("return _arguments.length;"));
}

#[test]
fn inner_async_functions_are_lowered_first() {
    let lowered = lower(
        "async function outer() { var inner = async function() { return await a; }; return await inner(); }",
    );

    assert_eq!(lowered.outcome.transformed, 2);
    assert_eq!(
        lowered.output,
        "var outer = __async(function() { var inner = __async(function() { return a; }); return inner(); });"
    );
}

#[test]
fn labeled_jumps_leave_the_function_untouched() {
    let lowered = lower("async function f() { outer: while (x) { await y; continue outer; } }");

    assert!(lowered.output.starts_with("async function f()"));
    assert_eq!(lowered.outcome.transformed, 0);
    assert_eq!(lowered.outcome.skipped, 1);
    assert_eq!(lowered.outcome.warnings.len(), 1);
    assert_eq!(
        lowered.outcome.warnings[0].warning_kind,
        WarningKind::IncompatibleAsyncFunction
    );
    assert!(lowered.helpers.is_empty());
}

#[test]
fn generated_names_never_collide_with_user_names() {
    let output = lowered("async function f(_a) { var b = await a; return b + _a; }");

    assert!(output.contains("function(_a2) { var b = _a2; return b + _a; }"));
}

#[test]
fn synchronous_code_is_left_alone() {
    let lowered = lower("function f(a) { return a; } var x = f(1);");

    assert_eq!(lowered.output, "function f(a) { return a; } var x = f(1);");
    assert_eq!(lowered.outcome.transformed, 0);
    assert!(lowered.helpers.is_empty());
}
