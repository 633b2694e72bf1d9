use super::lowering_test_support::{lowered, parse, printed};
use crate::compiler_frontend::ast::ast_nodes::Statement;
use crate::compiler_frontend::async_lowering::LoweringContext;
use crate::compiler_frontend::async_lowering::bindings::BindingTable;
use crate::compiler_frontend::async_lowering::expression_decomposer::extract_last_await;
use crate::compiler_frontend::async_lowering::helper_usage::HelperUsage;
use crate::compiler_frontend::async_lowering::name_generator::NameGenerator;

fn extract(source: &str) -> (String, Vec<(String, String)>, String, String) {
    let mut statements = parse(source);
    let mut names = NameGenerator::from_statements(&statements);
    let mut bindings = BindingTable::from_statements(&statements);
    let mut helpers = HelperUsage::default();
    let mut ctx = LoweringContext::new(&mut names, &mut bindings, &mut helpers);

    let Statement::Expression(expression) = &mut statements[0] else {
        panic!("expected an expression statement");
    };
    let suspension = extract_last_await(&mut ctx, expression).expect("extraction should succeed");

    let hoisted = suspension
        .hoisted
        .iter()
        .map(|(name, init)| {
            let init = printed(&[Statement::Expression(init.to_owned())]);
            (name.to_owned(), init.trim_end_matches(';').to_owned())
        })
        .collect();
    let awaited = printed(&[Statement::Expression(suspension.awaited)]);

    (
        suspension.placeholder,
        hoisted,
        awaited.trim_end_matches(';').to_owned(),
        printed(&statements),
    )
}

#[test]
fn earlier_operands_are_read_before_the_await() {
    let (placeholder, hoisted, awaited, remainder) = extract("total + await next();");

    assert_eq!(placeholder, "_next");
    assert_eq!(hoisted, vec![("_total".to_owned(), "total".to_owned())]);
    assert_eq!(awaited, "next()");
    assert_eq!(remainder, "_total + _next;");
}

#[test]
fn literals_stay_in_place() {
    let (_, hoisted, _, remainder) = extract("[1, \"two\", void 0, await three];");

    assert!(hoisted.is_empty());
    assert_eq!(remainder, "[1, \"two\", void 0, _three];");
}

#[test]
fn earlier_awaits_move_into_the_hoisted_declaration() {
    let (placeholder, hoisted, awaited, remainder) = extract("f(await a, await b);");

    assert_eq!(placeholder, "_b");
    assert_eq!(awaited, "b");
    assert_eq!(
        hoisted,
        vec![
            ("_f".to_owned(), "f".to_owned()),
            ("_a".to_owned(), "await a".to_owned()),
        ]
    );
    assert_eq!(remainder, "_f(_a, _b);");
}

#[test]
fn multiple_awaits_in_one_call_nest_their_continuations() {
    assert_eq!(
        lowered("async function f() { return g(await a, await b); }"),
        "var f = __async(function() { var _g = g; return __await(a, function(_a2) { var _a = _a2; \
         return __await(b, function(_b) { return _g(_a, _b); }); }); });"
    );
}

#[test]
fn global_callee_is_hoisted() {
    assert_eq!(
        lowered("async function f() { return g(await a); }"),
        "var f = __async(function() { var _g = g; return __await(a, function(_a) { return _g(_a); }); });"
    );
}

#[test]
fn constant_callee_is_left_alone() {
    assert_eq!(
        lowered("async function f(a) { const g = h; return g(await a); }"),
        "var f = __async(function(a) { const g = h; return __await(a, function(_a) { return g(_a); }); });"
    );
}

#[test]
fn method_on_unsafe_receiver_keeps_its_receiver() {
    assert_eq!(
        lowered("async function f() { return obj.method(await x); }"),
        "var f = __async(function() { var _obj = obj, _obj$method = _obj.method; \
         return __await(x, function(_x) { return _obj$method.call(_obj, _x); }); });"
    );
}

#[test]
fn compound_assignment_reads_its_target_first() {
    assert_eq!(
        lowered("async function f() { total += await next(); }"),
        "var f = __async(function() { var _total = total; \
         return __await(next(), function(_next) { total = _total + _next; }); });"
    );
}

#[test]
fn logical_and_only_awaits_when_the_left_is_truthy() {
    assert_eq!(
        lowered("async function f(a) { return a && await b(); }"),
        "var f = __async(function(a) { return __await(a ? b() : 0, function(_b) { return a && _b; }); });"
    );
}

#[test]
fn short_circuit_guards_hoisted_work() {
    assert_eq!(
        lowered("async function f(x) { return x || g(await y); }"),
        "var f = __async(function(x) { var _g = x ? void 0 : g; \
         return __await(x ? 0 : y, function(_y) { return x || _g(_y); }); });"
    );
}

#[test]
fn conditional_awaits_merge_into_one() {
    assert_eq!(
        lowered("async function f(c) { return c ? await a : await b; }"),
        "var f = __async(function(c) { return c ? a : b; });"
    );
}

#[test]
fn returned_await_is_passed_straight_through() {
    assert_eq!(
        lowered("async function f(a) { var b = await a; return b + 1; }"),
        "var f = __async(function(a) { return __await(a, function(_a) { var b = _a; return b + 1; }); });"
    );
}

#[test]
fn earlier_declarators_stay_before_the_suspension() {
    let output = lowered("async function f(a) { var x = 1, y = await a; return x + y; }");

    assert!(output.contains("var x = 1; return __await(a, function(_a) { var y = _a; return x + y; });"));
}

#[test]
fn bare_awaits_chain_in_order() {
    assert_eq!(
        lowered("async function f() { await a; await b; }"),
        "var f = __async(function() { return __await(a, function() { return __await(b, __empty); }); });"
    );
}
