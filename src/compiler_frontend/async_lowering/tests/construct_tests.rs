use super::lowering_test_support::{lower, lowered};
use crate::backends::js::runtime_helpers::Helper;

// Conditionals

#[test]
fn branches_that_always_return_are_rewritten_in_place() {
    assert_eq!(
        lowered("async function f(a) { if (a) { return await b; } else { return 1; } }"),
        "var f = __async(function(a) { if (a) { return b; } else { return 1; } });"
    );
}

#[test]
fn conditional_without_returns_continues_after_the_if() {
    assert_eq!(
        lowered("async function f(a) { if (a) { await b(); } return 2; }"),
        "var f = __async(function(a) { return __await((function() { \
         if (a) { return __await(b(), __empty); } })(), function() { return 2; }); });"
    );
}

#[test]
fn early_return_sets_the_exit_sentinel() {
    assert_eq!(
        lowered("async function f(a) { if (a) { await b(); return 1; } return 2; }"),
        "var f = __async(function(a) { var _exit; return __await((function() { \
         if (a) { return __await(b(), function() { _exit = 1; return 1; }); } })(), \
         function(_result) { if (_exit) { return _result; } return 2; }); });"
    );
}

#[test]
fn returned_expressions_are_evaluated_before_the_sentinel_is_set() {
    let output = lowered("async function f(a) { if (a) { await b(); return compute(); } done(); }");

    assert!(output.contains("var _returnValue = compute(); _exit = 1; return _returnValue;"));
    assert!(output.contains("if (_exit) { return _result; } done();"));
}

#[test]
fn nested_vars_are_declared_once_at_the_top() {
    assert_eq!(
        lowered("async function f(a) { if (a) { var v = await a; } return v; }"),
        "var f = __async(function(a) { var v; return __await((function() { \
         if (a) { return __await(a, function(_a) { v = _a; }); } })(), function() { return v; }); });"
    );
}

#[test]
fn suspending_head_is_evaluated_before_suspending_branches() {
    let output = lowered("async function f() { if (await ready()) { await go(); } }");

    assert!(output.starts_with("var f = __async(function() { return __await(ready(), function(_ready) { var _temp = _ready;"));
    assert!(output.contains("if (_temp) { return __await(go(), __empty); }"));
}

// Loops

#[test]
fn index_loop_becomes_for_to() {
    let lowered = lower(
        "async function f(items) { for (let i = 0; i < items.length; i++) { await save(items[i]); } }",
    );

    assert_eq!(
        lowered.output,
        "var f = __async(function(items) { return __await(__forTo(items, function(i) { \
         return __await(save(items[i]), __empty); }), __empty); });"
    );
    assert!(lowered.helpers.contains(Helper::ForTo));
    assert!(!lowered.helpers.contains(Helper::For));
    assert!(lowered.helpers.emission_order().contains(&Helper::For));
}

#[test]
fn while_loop_break_sets_the_interrupt_flag() {
    assert_eq!(
        lowered("async function f() { while (x) { if (await y()) break; } done(); }"),
        "var f = __async(function() { var _interrupt = 0; return __await(__for(\
         function() { return !_interrupt && x; }, void 0, \
         function() { return __await(y(), function(_y) { if (_y) { _interrupt = 1; return; } }); }), \
         function() { done(); }); });"
    );
}

#[test]
fn var_index_read_after_the_loop_keeps_the_general_form() {
    let output = lowered(
        "async function f(list) { for (var i = 0; i < list.length; i++) { await use(list[i]); } return i; }",
    );

    assert!(!output.contains("__forTo"));
    assert!(output.contains("__for(function() { return i < list.length; }, function() { i++; }"));
}

#[test]
fn break_skips_the_update() {
    let output = lowered(
        "async function f() { for (var i = 0; i < 5; i++) { if (await t(i)) break; } return i; }",
    );

    assert!(output.contains("function() { return !_interrupt && i < 5; }"));
    assert!(output.contains("function() { if (!_interrupt) { i++; } }"));
}

#[test]
fn return_skips_the_update() {
    let output = lowered(
        "async function f(list) { for (var i = 0; i < list.length; i++) { if (await check(list[i])) return i; } return -1; }",
    );

    assert!(!output.contains("__forTo"));
    assert!(output.contains("function() { return !_exit && i < list.length; }"));
    assert!(output.contains("function() { if (!_exit) { i++; } }"));
}

#[test]
fn captured_let_index_is_copied_per_iteration() {
    let output = lowered(
        "async function f() { var fns = []; for (let i = 0; i < 3; i++) { await tick(); fns.push(function() { return i; }); } return fns; }",
    );

    assert!(output.contains("let _i = 0;"));
    assert!(output.contains("__for(function() { return _i < 3; }, function() { _i++; }, function() { let i = _i;"));
    assert!(output.contains("fns.push(function() { return i; });"));
    assert!(!output.contains("_store"));
}

#[test]
fn captured_let_index_assigned_in_the_body_is_stored_back() {
    let output = lowered(
        "async function f(n) { var fns = []; for (let i = 0; i < n; i++) { if (await odd(i)) i++; fns.push(function() { return i; }); } return fns; }",
    );

    assert!(output.contains("var _store;"));
    assert!(output.contains("function() { let i = _i; _store = function() { _i = i; };"));
    assert!(output.contains("function() { _store(); _i++; }"));
}

#[test]
fn uncaptured_let_index_keeps_one_binding() {
    let output = lowered("async function f(n) { for (let i = 0; i < n; i++) { await use(i); } }");

    assert!(output.contains("let i = 0;"));
    assert!(output.contains("function() { return i < n; }, function() { i++; }"));
}

#[test]
fn for_of_passes_each_value_to_the_body() {
    assert_eq!(
        lowered("async function f(list) { for (const item of list) { await handle(item); } return list.length; }"),
        "var f = __async(function(list) { return __await(__forOf(list, function(item) { \
         return __await(handle(item), __empty); }), function() { return list.length; }); });"
    );
}

#[test]
fn continue_directly_in_the_body_is_a_plain_return() {
    assert_eq!(
        lowered("async function f(list) { for (const x of list) { if (!x) continue; await use(x); } }"),
        "var f = __async(function(list) { return __await(__forOf(list, function(x) { \
         if (!x) { return; } return __await(use(x), __empty); }), __empty); });"
    );
}

#[test]
fn continue_after_a_suspension_inside_a_branch_uses_a_flag() {
    let output = lowered(
        "async function f(list) { for (const x of list) { if (x) { await use(x); continue; } skip(x); } }",
    );

    assert!(output.contains("var _continue = 0;"));
    assert!(output.contains("_continue = 1; return;"));
}

#[test]
fn return_inside_a_loop_stops_it_and_resolves_the_function() {
    assert_eq!(
        lowered("async function f(list) { for (const x of list) { if (await check(x)) return x; } return null; }"),
        "var f = __async(function(list) { var _exit; return __await(__forOf(list, function(x) { \
         return __await(check(x), function(_check) { if (_check) { _exit = 1; return x; } }); }, \
         function() { return _exit; }), function(_result) { if (_exit) { return _result; } return null; }); });"
    );
}

#[test]
fn do_while_tests_after_the_body() {
    assert_eq!(
        lowered("async function f() { do { await tick(); } while (more()); }"),
        "var f = __async(function() { return __await(__do(function() { \
         return __await(tick(), __empty); }, function() { return more(); }), __empty); });"
    );
}

#[test]
fn for_in_with_an_existing_binding_copies_each_key() {
    let output = lowered("async function f(o) { var k; for (k in o) { await use(k); } return k; }");

    assert!(output.contains("__forIn(o, function(_k) { k = _k; return __await(use(k), __empty); })"));
}

// Switch

#[test]
fn switch_with_suspending_cases_becomes_a_helper_call() {
    let lowered = lower(
        "async function f(x) { switch (x) { case 1: await a(); break; default: b(); } return 3; }",
    );

    assert_eq!(
        lowered.output,
        "var f = __async(function(x) { return __await(__switch(x, [\
         [function() { return 1; }, function() { return __await(a(), function() { return; }); }], \
         [void 0, function() { b(); }, __empty]]), function() { return 3; }); });"
    );
    assert!(lowered.helpers.contains(Helper::Switch));
    assert!(lowered.helpers.contains(Helper::Empty));
}

#[test]
fn switch_whose_suspending_cases_return_stays_a_switch() {
    assert_eq!(
        lowered("async function f(x) { switch (x) { case 1: return await a(); default: return 0; } }"),
        "var f = __async(function(x) { switch (x) { case 1: return a(); default: return 0; } });"
    );
}

#[test]
fn nested_case_break_uses_the_break_flag() {
    let output = lowered(
        "async function f(x) { switch (x) { case 1: if (x) { break; } await a(); default: b(); } }",
    );

    assert!(output.contains("var _break = 0;"));
    assert!(output.contains("_break = 1; return;"));
    assert!(output.contains("function() { return _break; }"));
}

// Try

#[test]
fn catch_becomes_the_rejection_callback() {
    assert_eq!(
        lowered("async function f() { try { await a(); } catch (e) { log(e); } done(); }"),
        "var f = __async(function() { return __await(__await(__try(function() { \
         return __await(a(), __empty); }), void 0, function(e) { log(e); }), function() { done(); }); });"
    );
}

#[test]
fn finally_rethrows_unless_it_exits() {
    let lowered = lower("async function f() { try { return await a(); } finally { cleanup(); } }");

    assert_eq!(
        lowered.output,
        "var f = __async(function() { return __finally(__try(a), \
         function(_wasThrown, _result) { cleanup(); return __rethrow(_wasThrown, _result); }); });"
    );
    assert!(lowered.helpers.contains(Helper::Finally));
    assert!(lowered.helpers.contains(Helper::Rethrow));
}

#[test]
fn empty_catch_swallows_the_rejection() {
    let output = lowered("async function f() { try { await a(); } catch (e) {} }");

    assert!(output.contains("void 0, __empty)"));
}
