use crate::backends::js::runtime_helpers::{ALL_HELPERS, Helper, close_over_requirements};
use crate::backends::js::{JsPrinterConfig, escape_js_string, format_number, print_program};
use crate::compiler_frontend::ast::parser::parse_program;
use crate::compiler_frontend::tokenizer::tokenizer::tokenize;
use rustc_hash::FxHashSet;
use std::path::PathBuf;

fn print_with(source: &str, config: &JsPrinterConfig) -> String {
    let path = PathBuf::from("test.js");
    let tokens = tokenize(source, &path).expect("tokenization should succeed");
    let program = parse_program(tokens).expect("parsing should succeed");
    print_program(&program, config)
}

fn print(source: &str) -> String {
    print_with(source, &JsPrinterConfig::default())
}

fn helpers(list: &[Helper]) -> FxHashSet<Helper> {
    list.iter().copied().collect()
}

// ------------------------------------------
//                 Statements
// ------------------------------------------

#[test]
fn nested_blocks_are_indented() {
    assert_eq!(
        print("function f(a) { if (a) { return 1; } else if (b) { return 2; } else { return 3; } }"),
        "function f(a) {\n    if (a) {\n        return 1;\n    } else if (b) {\n        return 2;\n    } else {\n        return 3;\n    }\n}\n"
    );
}

#[test]
fn compact_output_keeps_every_line_at_column_zero() {
    let config = JsPrinterConfig {
        pretty: false,
        indent_width: 4,
    };

    assert_eq!(
        print_with("while (a) { b(); }", &config),
        "while (a) {\nb();\n}\n"
    );
}

#[test]
fn unbraced_bodies_gain_braces() {
    assert_eq!(
        print("if (a) b(); for (;;) break;"),
        "if (a) {\n    b();\n}\nfor (;;) {\n    break;\n}\n"
    );
}

#[test]
fn loops_print_their_heads() {
    assert_eq!(
        print("for (var i = 0, n = 2; i < n; i++) {} for (const k in o) {} for (x of list) {} do { a(); } while (b);"),
        "for (var i = 0, n = 2; i < n; i++) {\n}\nfor (const k in o) {\n}\nfor (x of list) {\n}\ndo {\n    a();\n} while (b);\n"
    );
}

#[test]
fn switch_cases_are_indented_under_their_labels() {
    assert_eq!(
        print("switch (x) { case 1: a(); break; default: b(); }"),
        "switch (x) {\n    case 1:\n        a();\n        break;\n    default:\n        b();\n}\n"
    );
}

#[test]
fn try_prints_catch_and_finally() {
    assert_eq!(
        print("try { a(); } catch { b(); } finally { c(); }"),
        "try {\n    a();\n} catch {\n    b();\n} finally {\n    c();\n}\n"
    );
}

#[test]
fn labels_sit_on_their_own_line() {
    assert_eq!(
        print("outer: while (a) { continue outer; }"),
        "outer:\nwhile (a) {\n    continue outer;\n}\n"
    );
}

// ------------------------------------------
//                 Expressions
// ------------------------------------------

#[test]
fn parentheses_follow_precedence() {
    assert_eq!(print("(a + b) * c;"), "(a + b) * c;\n");
    assert_eq!(print("a - (b - c);"), "a - (b - c);\n");
    assert_eq!(print("a - b - c;"), "a - b - c;\n");
    assert_eq!(print("(a || b) && c;"), "(a || b) && c;\n");
    assert_eq!(print("x = (a, b);"), "x = (a, b);\n");
}

#[test]
fn conditional_test_is_wrapped_when_needed() {
    assert_eq!(print("(a ? b : c) ? d : e;"), "(a ? b : c) ? d : e;\n");
    assert_eq!(print("a ? b : c ? d : e;"), "a ? b : c ? d : e;\n");
}

#[test]
fn statement_position_functions_and_objects_are_wrapped() {
    assert_eq!(print("({ a: 1 });"), "({ a: 1 });\n");
    assert_eq!(print("(function() {});"), "(function() {});\n");
}

#[test]
fn immediately_invoked_functions_wrap_the_callee() {
    assert_eq!(
        print("(function() { return 1; })();"),
        "(function() {\n    return 1;\n})();\n"
    );
}

#[test]
fn unary_operators_keep_their_spacing() {
    assert_eq!(print("- -x;"), "- -x;\n");
    assert_eq!(print("typeof x;"), "typeof x;\n");
    assert_eq!(print("void 0;"), "void 0;\n");
    assert_eq!(print("!(a && b);"), "!(a && b);\n");
}

#[test]
fn member_access_on_new_and_functions() {
    assert_eq!(print("new Foo(1).bar;"), "new Foo(1).bar;\n");
    assert_eq!(print("a[b + 1].c();"), "a[b + 1].c();\n");
}

#[test]
fn arrows_print_with_block_bodies() {
    assert_eq!(
        print("var f = (a) => a + 1;"),
        "var f = (a) => {\n    return a + 1;\n};\n"
    );
}

#[test]
fn return_sequences_are_parenthesized() {
    assert_eq!(
        print("function f() { return a(), b; }"),
        "function f() {\n    return (a(), b);\n}\n"
    );
}

#[test]
fn object_keys_keep_their_kind() {
    assert_eq!(
        print("x = { a: 1, \"b c\": 2, 3: 4, [k]: 5 };"),
        "x = { a: 1, \"b c\": 2, 3: 4, [k]: 5 };\n"
    );
}

// ------------------------------------------
//                 Literals
// ------------------------------------------

#[test]
fn strings_are_double_quoted_and_escaped() {
    assert_eq!(escape_js_string("it's"), "\"it's\"");
    assert_eq!(escape_js_string("say \"hi\"\n"), "\"say \\\"hi\\\"\\n\"");
    assert_eq!(escape_js_string("\u{1}"), "\"\\u0001\"");
    assert_eq!(print("var s = 'a\\'b';"), "var s = \"a'b\";\n");
}

#[test]
fn numbers_drop_integral_fractions() {
    assert_eq!(format_number(3.0), "3");
    assert_eq!(format_number(0.5), "0.5");
    assert_eq!(format_number(f64::INFINITY), "Infinity");
    assert_eq!(format_number(f64::NAN), "NaN");
    assert_eq!(print("x = 0x10;"), "x = 16;\n");
}

// ------------------------------------------
//              Runtime helpers
// ------------------------------------------

#[test]
fn helper_requirements_are_closed_over() {
    assert_eq!(
        close_over_requirements(&helpers(&[Helper::ForOf])),
        vec![Helper::ForOf, Helper::For, Helper::Try]
    );
    assert_eq!(
        close_over_requirements(&helpers(&[Helper::Empty, Helper::Async])),
        vec![Helper::Async, Helper::Empty]
    );
}

#[test]
fn every_helper_source_defines_its_name() {
    for helper in ALL_HELPERS {
        assert!(
            helper
                .source()
                .starts_with(&format!("function {}(", helper.name())),
            "{:?} source does not start with its own definition",
            helper
        );
    }
}

#[test]
fn helpers_serialize_as_their_js_names() {
    let json = serde_json::to_string(&vec![Helper::Async, Helper::ForTo]).expect("serialize");
    assert_eq!(json, "[\"__async\",\"__forTo\"]");
}
