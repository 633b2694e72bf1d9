use super::*;
use std::path::PathBuf;

fn token_kinds(source: &str) -> Vec<TokenKind> {
    let path = PathBuf::from("test.js");
    tokenize(source, &path)
        .expect("tokenization should succeed")
        .tokens
        .into_iter()
        .map(|token| token.kind)
        .collect()
}

#[test]
fn greedy_punctuators_win_over_prefixes() {
    let kinds = token_kinds("a >>>= b === c => !== d");
    assert_eq!(
        kinds,
        vec![
            TokenKind::Identifier("a".to_owned()),
            TokenKind::Punctuator(Punctuator::UnsignedShiftRightAssign),
            TokenKind::Identifier("b".to_owned()),
            TokenKind::Punctuator(Punctuator::StrictEqual),
            TokenKind::Identifier("c".to_owned()),
            TokenKind::Punctuator(Punctuator::Arrow),
            TokenKind::Punctuator(Punctuator::StrictNotEqual),
            TokenKind::Identifier("d".to_owned()),
            TokenKind::Eof,
        ]
    );
}

#[test]
fn keywords_and_identifiers_are_split() {
    let kinds = token_kinds("async function $x() { await _y; }");
    assert_eq!(kinds[0], TokenKind::Identifier("async".to_owned()));
    assert_eq!(kinds[1], TokenKind::Keyword(Keyword::Function));
    assert_eq!(kinds[2], TokenKind::Identifier("$x".to_owned()));
    assert!(kinds.contains(&TokenKind::Keyword(Keyword::Await)));
    assert!(kinds.contains(&TokenKind::Identifier("_y".to_owned())));
}

#[test]
fn numbers_parse_in_all_supported_forms() {
    let kinds = token_kinds("42 3.5 .25 0x1F 1e3");
    assert_eq!(
        kinds,
        vec![
            TokenKind::NumberLiteral(42.0),
            TokenKind::NumberLiteral(3.5),
            TokenKind::NumberLiteral(0.25),
            TokenKind::NumberLiteral(31.0),
            TokenKind::NumberLiteral(1000.0),
            TokenKind::Eof,
        ]
    );
}

#[test]
fn member_access_on_number_like_dot_is_punctuation() {
    let kinds = token_kinds("a.b");
    assert_eq!(kinds[1], TokenKind::Punctuator(Punctuator::Dot));
}

#[test]
fn string_escapes_are_decoded() {
    let kinds = token_kinds(r#"'it\'s' "a\nb" "A""#);
    assert_eq!(kinds[0], TokenKind::StringLiteral("it's".to_owned()));
    assert_eq!(kinds[1], TokenKind::StringLiteral("a\nb".to_owned()));
    assert_eq!(kinds[2], TokenKind::StringLiteral("A".to_owned()));
}

#[test]
fn comments_are_skipped_and_record_newlines() {
    let path = PathBuf::from("test.js");
    let tokens = tokenize("a // line\n/* block */ b /* multi\nline */ c d", &path)
        .expect("tokenization should succeed")
        .tokens;

    assert_eq!(tokens.len(), 5);
    assert!(!tokens[0].newline_before);
    assert!(tokens[1].newline_before);
    assert!(tokens[2].newline_before);
    assert!(!tokens[3].newline_before);
}

#[test]
fn token_locations_track_lines() {
    let path = PathBuf::from("test.js");
    let tokens = tokenize("a\n  bb", &path)
        .expect("tokenization should succeed")
        .tokens;

    assert_eq!(tokens[1].location.start_pos.line_number, 1);
    assert_eq!(tokens[1].location.start_pos.char_column, 2);
    assert_eq!(tokens[1].location.end_pos.char_column, 4);
}

#[test]
fn unterminated_string_is_a_syntax_error() {
    let path = PathBuf::from("test.js");
    let error = tokenize("var a = 'oops", &path).expect_err("should fail");
    assert_eq!(
        error.error_type,
        crate::compiler_frontend::compiler_messages::compiler_errors::ErrorType::Syntax
    );
}

#[test]
fn template_literals_are_rejected() {
    let path = PathBuf::from("test.js");
    assert!(tokenize("`hi`", &path).is_err());
}
