use super::ast_nodes::*;
use super::parser::parse_program;
use crate::compiler_frontend::tokenizer::tokenizer::tokenize;
use std::path::PathBuf;

fn parse(source: &str) -> Vec<Statement> {
    let path = PathBuf::from("test.js");
    let tokens = tokenize(source, &path).expect("tokenization should succeed");
    parse_program(tokens).expect("parsing should succeed").body
}

fn parse_error(source: &str) -> String {
    let path = PathBuf::from("test.js");
    let tokens = tokenize(source, &path).expect("tokenization should succeed");
    parse_program(tokens).expect_err("parsing should fail").msg
}

fn single_expression(source: &str) -> Expression {
    match parse(source).remove(0) {
        Statement::Expression(expression) => expression,
        other => panic!("expected an expression statement, got {other:?}"),
    }
}

#[test]
fn async_function_declaration_is_marked_async() {
    let body = parse("async function load(a, b) { return await a; }");
    let Statement::FunctionDeclaration(function) = &body[0] else {
        panic!("expected a function declaration");
    };

    assert!(function.is_async);
    assert!(!function.is_arrow);
    assert_eq!(function.name.as_deref(), Some("load"));
    assert_eq!(function.params, vec!["a".to_owned(), "b".to_owned()]);
    assert!(statements_contain_await(&function.body));
}

#[test]
fn concise_async_arrow_becomes_a_return() {
    let expression = single_expression("f = async x => await x;");
    let Expression::Assignment { value, .. } = expression else {
        panic!("expected an assignment");
    };
    let Expression::Function(function) = *value else {
        panic!("expected an arrow function");
    };

    assert!(function.is_async && function.is_arrow);
    assert!(matches!(
        function.body.as_slice(),
        [Statement::Return(Some(Expression::Await(_)))]
    ));
}

#[test]
fn binary_precedence_is_respected() {
    let expression = single_expression("a + b * c;");
    let Expression::Binary {
        operator: BinaryOperator::Add,
        right,
        ..
    } = expression
    else {
        panic!("expected addition at the root");
    };

    assert!(matches!(
        *right,
        Expression::Binary {
            operator: BinaryOperator::Multiply,
            ..
        }
    ));
}

#[test]
fn logical_or_binds_looser_than_and() {
    let expression = single_expression("a || b && c;");
    assert!(matches!(
        expression,
        Expression::Logical {
            operator: LogicalOperator::Or,
            ..
        }
    ));
}

#[test]
fn await_binds_like_a_unary_operator() {
    let expression = single_expression("await a + b;");
    let Expression::Binary { left, .. } = expression else {
        panic!("expected a binary expression");
    };
    assert!(matches!(*left, Expression::Await(_)));
}

#[test]
fn member_calls_and_new_chain_correctly() {
    let expression = single_expression("new Foo(1).bar[baz](2);");
    let Expression::Call { callee, arguments } = expression else {
        panic!("expected a call");
    };
    assert_eq!(arguments.len(), 1);

    let Expression::Member { object, property } = *callee else {
        panic!("expected a member callee");
    };
    assert!(matches!(property, MemberProperty::Computed(_)));
    assert!(matches!(*object, Expression::Member { .. }));
}

#[test]
fn for_heads_are_classified() {
    let body = parse(
        "for (var i = 0; i < 3; i++) {}\n\
         for (var k in obj) {}\n\
         for (const v of list) {}\n\
         for (;;) { break; }",
    );

    assert!(matches!(body[0], Statement::For { init: Some(ForInit::Declaration(_)), .. }));
    assert!(matches!(
        &body[1],
        Statement::ForIn { left: ForBinding { kind: Some(DeclarationKind::Var), name }, .. } if name == "k"
    ));
    assert!(matches!(body[2], Statement::ForOf { .. }));
    assert!(matches!(
        body[3],
        Statement::For {
            init: None,
            test: None,
            update: None,
            ..
        }
    ));
}

#[test]
fn in_operator_is_allowed_inside_parens_in_for_init() {
    let body = parse("for (var x = ('a' in o); x; x = 0) {}");
    assert!(matches!(body[0], Statement::For { .. }));
}

#[test]
fn switch_try_and_labels_parse() {
    let body = parse(
        "switch (x) { case 1: a(); break; default: b(); }\n\
         try { a(); } catch (e) { b(e); } finally { c(); }\n\
         outer: while (true) { break outer; }",
    );

    let Statement::Switch { cases, .. } = &body[0] else {
        panic!("expected a switch");
    };
    assert_eq!(cases.len(), 2);
    assert!(cases[1].test.is_none());

    let Statement::Try {
        handler, finalizer, ..
    } = &body[1]
    else {
        panic!("expected a try");
    };
    assert_eq!(
        handler.as_ref().and_then(|handler| handler.param.as_deref()),
        Some("e")
    );
    assert!(finalizer.is_some());

    assert!(matches!(&body[2], Statement::Labeled { label, .. } if label == "outer"));
}

#[test]
fn return_on_its_own_line_has_no_argument() {
    let body = parse("function f() { return\n1; }");
    let Statement::FunctionDeclaration(function) = &body[0] else {
        panic!("expected a function");
    };
    assert!(matches!(function.body[0], Statement::Return(None)));
}

#[test]
fn object_literal_keys_and_methods() {
    let expression = single_expression("o = { a: 1, 'b': 2, [c]: 3, d, e() { return 1; } };");
    let Expression::Assignment { value, .. } = expression else {
        panic!("expected an assignment");
    };
    let Expression::Object(properties) = *value else {
        panic!("expected an object literal");
    };

    assert_eq!(properties.len(), 5);
    assert!(matches!(properties[1].key, PropertyKey::String(_)));
    assert!(matches!(properties[2].key, PropertyKey::Computed(_)));
    assert!(matches!(&properties[3].value, Expression::Identifier(name) if name == "d"));
    assert!(matches!(properties[4].value, Expression::Function(_)));
}

#[test]
fn async_object_methods_are_marked_async() {
    let expression = single_expression(
        "o = { async load(id) { return await get(id); }, async: 1, async() {}, async };",
    );
    let Expression::Assignment { value, .. } = expression else {
        panic!("expected an assignment");
    };
    let Expression::Object(properties) = *value else {
        panic!("expected an object literal");
    };

    assert_eq!(properties.len(), 4);
    assert!(matches!(&properties[0].key, PropertyKey::Identifier(name) if name == "load"));
    let Expression::Function(method) = &properties[0].value else {
        panic!("expected a method");
    };
    assert!(method.is_async && !method.is_arrow);
    assert_eq!(method.params, vec!["id".to_owned()]);

    assert!(matches!(&properties[1].key, PropertyKey::Identifier(name) if name == "async"));
    assert!(matches!(properties[1].value, Expression::Literal(_)));
    assert!(matches!(&properties[2].value, Expression::Function(function) if !function.is_async));
    assert!(matches!(&properties[3].value, Expression::Identifier(name) if name == "async"));
}

#[test]
fn unsupported_syntax_reports_errors() {
    assert!(parse_error("x = /re/;").contains("Regular expression"));
    assert!(parse_error("function* gen() {}").contains("Generator"));
    assert!(parse_error("1 = 2;").contains("assignment target"));
    assert!(parse_error("try { a(); }").contains("catch or finally"));
}

#[test]
fn missing_semicolon_on_same_line_is_an_error() {
    let message = parse_error("a b");
    assert!(message.contains("Expected ';'"));
}
