use super::lowering_test_support::function_body;
use crate::compiler_frontend::ast::ast_nodes::Statement;
use crate::compiler_frontend::async_lowering::reachability::{
    ExitQuery, statement_reach, statements_reach,
};

#[test]
fn both_branches_returning_exits_on_every_path() {
    let body = function_body("if (a) { return 1; } else { throw e; }");
    let reach = statements_reach(&body, ExitQuery::ReturnOrThrow);

    assert!(reach.any);
    assert!(reach.all);
    assert!(!reach.falls_through);
}

#[test]
fn missing_else_falls_through() {
    let body = function_body("if (a) { return 1; }");
    let reach = statements_reach(&body, ExitQuery::ReturnOrThrow);

    assert!(reach.any);
    assert!(!reach.all);
    assert!(reach.falls_through);
}

#[test]
fn statements_after_an_exit_are_unreachable() {
    let body = function_body("return 1; a();");
    let reach = statements_reach(&body, ExitQuery::ReturnOrThrow);

    assert!(reach.all);
    assert!(!reach.falls_through);
}

#[test]
fn loop_bodies_may_never_run() {
    let body = function_body("while (a) { return 1; }");
    let reach = statements_reach(&body, ExitQuery::ReturnOrThrow);

    assert!(reach.any);
    assert!(!reach.all);
}

#[test]
fn loops_absorb_their_own_jumps() {
    let body = function_body("for (;;) { if (a) break; continue; }");
    let reach = statements_reach(&body, ExitQuery::Break);

    assert!(!reach.any);
    assert!(!reach.has_break);
}

#[test]
fn do_while_runs_its_body_at_least_once() {
    let body = function_body("do { return 1; } while (a);");
    let reach = statements_reach(&body, ExitQuery::ReturnOrThrow);

    assert!(reach.all);
}

#[test]
fn break_query_treats_returns_as_escapes() {
    let body = function_body("while (x) { if (a) break; return 1; }");
    let loop_body = match &body[0] {
        Statement::While { body, .. } => body,
        other => panic!("expected a while loop, got {other:?}"),
    };

    let breaks = statement_reach(loop_body, ExitQuery::Break);
    assert!(breaks.any);
    assert!(breaks.has_break);
    assert!(!breaks.all);

    let leaves = statement_reach(loop_body, ExitQuery::ReturnThrowOrBreak);
    assert!(leaves.all);
}

#[test]
fn continue_escapes_a_return_query() {
    let body = function_body("for (;;) { if (a) { return 1; } else { continue; } }");
    let loop_body = match &body[0] {
        Statement::For { body, .. } => body,
        other => panic!("expected a for loop, got {other:?}"),
    };

    let reach = statement_reach(loop_body, ExitQuery::ReturnOrThrow);
    assert!(reach.any);
    assert!(!reach.all);
    assert!(!reach.falls_through);
}

#[test]
fn switch_with_default_and_no_breaks_exits() {
    let body = function_body("switch (x) { case 1: return 1; default: return 2; }");
    let reach = statements_reach(&body, ExitQuery::ReturnOrThrow);

    assert!(reach.all);
}

#[test]
fn switch_without_default_can_match_nothing() {
    let body = function_body("switch (x) { case 1: return 1; case 2: return 2; }");
    let reach = statements_reach(&body, ExitQuery::ReturnOrThrow);

    assert!(reach.any);
    assert!(!reach.all);
}

#[test]
fn switch_break_completes_the_switch() {
    let body = function_body("switch (x) { case 1: a(); break; default: return 2; }");
    let reach = statements_reach(&body, ExitQuery::ReturnOrThrow);

    assert!(!reach.all);
    assert!(reach.falls_through);
    assert!(!reach.has_break);
}

#[test]
fn exiting_finalizer_overrides_the_block() {
    let body = function_body("try { a(); } finally { return 1; }");
    let reach = statements_reach(&body, ExitQuery::ReturnOrThrow);

    assert!(reach.all);
}

#[test]
fn completing_finalizer_keeps_the_block_exits() {
    let body = function_body("try { return a(); } finally { cleanup(); }");
    assert!(statements_reach(&body, ExitQuery::ReturnOrThrow).all);

    let body = function_body("try { a(); } finally { cleanup(); }");
    assert!(!statements_reach(&body, ExitQuery::ReturnOrThrow).any);
}

#[test]
fn completing_finalizer_follows_block_and_handler() {
    let body = function_body("try { return a(); } catch (e) { throw e; } finally { cleanup(); }");
    let reach = statements_reach(&body, ExitQuery::ReturnOrThrow);
    assert!(reach.all);
    assert!(!reach.falls_through);

    let body = function_body("try { if (x) return a(); } finally { cleanup(); }");
    let reach = statements_reach(&body, ExitQuery::ReturnOrThrow);
    assert!(reach.any);
    assert!(!reach.all);
    assert!(reach.falls_through);
}

#[test]
fn catch_that_completes_lets_the_try_complete() {
    let body = function_body("try { return a(); } catch (e) { log(e); }");
    let reach = statements_reach(&body, ExitQuery::ReturnOrThrow);

    assert!(reach.any);
    assert!(!reach.all);
}

#[test]
fn nested_functions_are_not_entered() {
    let body = function_body("var g = function() { return 1; };");
    let reach = statements_reach(&body, ExitQuery::ReturnOrThrow);

    assert!(!reach.any);
    assert!(reach.falls_through);
}
