use crate::compiler_frontend::compiler_messages::compiler_errors::CompilerError;
use crate::compiler_frontend::tokenizer::tokens::{
    FileTokens, Keyword, Punctuator, TextLocation, Token, TokenKind, TokenStream,
};
use crate::{return_syntax_error, settings, token_log};
use std::path::Path;

#[macro_export]
macro_rules! return_token {
    ($kind:expr, $stream:expr $(,)?) => {
        return Ok(Token::new($kind, $stream.new_location()))
    };
}

// Longest first, so the first match is always the greedy one
const PUNCTUATORS: &[Punctuator] = &[
    Punctuator::UnsignedShiftRightAssign,
    Punctuator::StrictEqual,
    Punctuator::StrictNotEqual,
    Punctuator::UnsignedShiftRight,
    Punctuator::ShiftLeftAssign,
    Punctuator::ShiftRightAssign,
    Punctuator::Arrow,
    Punctuator::PlusAssign,
    Punctuator::MinusAssign,
    Punctuator::StarAssign,
    Punctuator::SlashAssign,
    Punctuator::PercentAssign,
    Punctuator::AmpersandAssign,
    Punctuator::PipeAssign,
    Punctuator::CaretAssign,
    Punctuator::Increment,
    Punctuator::Decrement,
    Punctuator::Equal,
    Punctuator::NotEqual,
    Punctuator::LessEqual,
    Punctuator::GreaterEqual,
    Punctuator::LogicalAnd,
    Punctuator::LogicalOr,
    Punctuator::ShiftLeft,
    Punctuator::ShiftRight,
    Punctuator::OpenParen,
    Punctuator::CloseParen,
    Punctuator::OpenCurly,
    Punctuator::CloseCurly,
    Punctuator::OpenSquare,
    Punctuator::CloseSquare,
    Punctuator::Semicolon,
    Punctuator::Comma,
    Punctuator::Dot,
    Punctuator::Colon,
    Punctuator::Question,
    Punctuator::Assign,
    Punctuator::Plus,
    Punctuator::Minus,
    Punctuator::Star,
    Punctuator::Slash,
    Punctuator::Percent,
    Punctuator::LessThan,
    Punctuator::GreaterThan,
    Punctuator::Not,
    Punctuator::Ampersand,
    Punctuator::Pipe,
    Punctuator::Caret,
    Punctuator::Tilde,
];

pub fn tokenize(source_code: &str, src_path: &Path) -> Result<FileTokens, CompilerError> {
    let initial_capacity = source_code.len() / settings::SRC_TO_TOKEN_RATIO;

    let mut tokens: Vec<Token> = Vec::with_capacity(initial_capacity);
    let mut stream = TokenStream::new(source_code, src_path);

    loop {
        let newline_before = skip_trivia(&mut stream)?;
        let mut token = get_token_kind(&mut stream)?;
        token.newline_before = newline_before;

        token_log!(#token);

        let finished = token.kind == TokenKind::Eof;
        tokens.push(token);

        if finished {
            break;
        }
    }

    Ok(FileTokens::new(src_path.to_owned(), tokens))
}

/// Skips whitespace and comments.
/// Returns true if a line terminator was crossed on the way.
fn skip_trivia(stream: &mut TokenStream) -> Result<bool, CompilerError> {
    let mut crossed_newline = false;

    loop {
        match stream.peek() {
            Some(&ch) if ch.is_whitespace() => {
                if ch == '\n' {
                    crossed_newline = true;
                }
                stream.next();
            }

            Some(&'/') => match stream.peek_second() {
                Some('/') => {
                    while let Some(&ch) = stream.peek() {
                        if ch == '\n' {
                            break;
                        }
                        stream.next();
                    }
                }

                Some('*') => {
                    stream.update_start_position();
                    stream.next();
                    stream.next();

                    let mut closed = false;
                    while let Some(ch) = stream.next() {
                        if ch == '\n' {
                            crossed_newline = true;
                        }

                        if ch == '*' && stream.peek() == Some(&'/') {
                            stream.next();
                            closed = true;
                            break;
                        }
                    }

                    if !closed {
                        return_syntax_error!(
                            "Unterminated block comment",
                            stream.new_location(),
                            {
                                CompilationStage => "Tokenization",
                                SuggestedInsertion => "*/",
                            }
                        )
                    }
                }

                _ => break,
            },

            _ => break,
        }
    }

    // To ignore leading whitespace for the next token position
    stream.update_start_position();

    Ok(crossed_newline)
}

pub fn get_token_kind(stream: &mut TokenStream) -> Result<Token, CompilerError> {
    let current_char = match stream.next() {
        Some(ch) => ch,
        None => return_token!(TokenKind::Eof, stream),
    };

    if current_char == '"' || current_char == '\'' {
        return tokenize_string(current_char, stream);
    }

    if current_char == '`' {
        return_syntax_error!(
            "Template literals are not supported",
            stream.new_location(),
            {
                CompilationStage => "Tokenization",
                PrimarySuggestion => "Use string concatenation instead",
            }
        )
    }

    // Numbers, including the ".5" form
    if current_char.is_ascii_digit()
        || (current_char == '.' && stream.peek().is_some_and(|c| c.is_ascii_digit()))
    {
        return tokenize_number(current_char, stream);
    }

    if is_identifier_start(current_char) {
        let mut token_value = String::from(current_char);
        return keyword_or_identifier(&mut token_value, stream);
    }

    for &punctuator in PUNCTUATORS {
        if punctuator_matches(punctuator, current_char, stream) {
            // The first char is already consumed
            for _ in 1..punctuator.as_str().len() {
                stream.next();
            }

            return_token!(TokenKind::Punctuator(punctuator), stream);
        }
    }

    return_syntax_error!(
        format!("Invalid token: '{}' is not supported", current_char),
        stream.new_location(),
        {
            CompilationStage => "Tokenization",
            PrimarySuggestion => "Check for typos or unsupported characters",
        }
    )
}

fn punctuator_matches(punctuator: Punctuator, current_char: char, stream: &TokenStream) -> bool {
    let mut expected = punctuator.as_str().chars();
    if expected.next() != Some(current_char) {
        return false;
    }

    let mut lookahead = stream.chars.clone();
    expected.all(|ch| lookahead.next() == Some(ch))
}

pub fn is_identifier_start(ch: char) -> bool {
    ch.is_alphabetic() || ch == '_' || ch == '$'
}

pub fn is_identifier_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_' || ch == '$'
}

fn keyword_or_identifier(
    token_value: &mut String,
    stream: &mut TokenStream,
) -> Result<Token, CompilerError> {
    while let Some(&ch) = stream.peek() {
        if !is_identifier_char(ch) {
            break;
        }
        token_value.push(ch);
        stream.next();
    }

    match Keyword::from_word(token_value) {
        Some(keyword) => return_token!(TokenKind::Keyword(keyword), stream),
        None => return_token!(TokenKind::Identifier(std::mem::take(token_value)), stream),
    }
}

fn tokenize_number(first_char: char, stream: &mut TokenStream) -> Result<Token, CompilerError> {
    let mut token_value = String::from(first_char);

    // Hex
    if first_char == '0' && matches!(stream.peek(), Some(&'x') | Some(&'X')) {
        stream.next();
        let mut digits = String::new();
        while let Some(&ch) = stream.peek() {
            if !ch.is_ascii_hexdigit() {
                break;
            }
            digits.push(ch);
            stream.next();
        }

        match u64::from_str_radix(&digits, 16) {
            Ok(value) => return_token!(TokenKind::NumberLiteral(value as f64), stream),
            Err(_) => return_syntax_error!(
                format!("Invalid hexadecimal literal '0x{digits}'"),
                stream.new_location(),
                {
                    CompilationStage => "Tokenization",
                }
            ),
        }
    }

    let mut seen_dot = first_char == '.';
    let mut seen_exponent = false;

    while let Some(&ch) = stream.peek() {
        if ch.is_ascii_digit() {
            token_value.push(ch);
            stream.next();
            continue;
        }

        if ch == '.' && !seen_dot && !seen_exponent {
            seen_dot = true;
            token_value.push(ch);
            stream.next();
            continue;
        }

        if (ch == 'e' || ch == 'E') && !seen_exponent {
            seen_exponent = true;
            token_value.push(ch);
            stream.next();

            if let Some(&sign) = stream.peek()
                && (sign == '+' || sign == '-')
            {
                token_value.push(sign);
                stream.next();
            }
            continue;
        }

        break;
    }

    match token_value.parse::<f64>() {
        Ok(value) => return_token!(TokenKind::NumberLiteral(value), stream),
        Err(_) => return_syntax_error!(
            format!("Invalid number literal '{token_value}'"),
            stream.new_location(),
            {
                CompilationStage => "Tokenization",
            }
        ),
    }
}

fn tokenize_string(quote: char, stream: &mut TokenStream) -> Result<Token, CompilerError> {
    let mut token_value = String::new();

    while let Some(ch) = stream.next() {
        if ch == quote {
            return_token!(TokenKind::StringLiteral(token_value), stream);
        }

        if ch == '\n' {
            break;
        }

        if ch != '\\' {
            token_value.push(ch);
            continue;
        }

        let Some(escaped) = stream.next() else {
            break;
        };

        match escaped {
            'n' => token_value.push('\n'),
            't' => token_value.push('\t'),
            'r' => token_value.push('\r'),
            'b' => token_value.push('\u{8}'),
            'f' => token_value.push('\u{c}'),
            'v' => token_value.push('\u{b}'),
            '0' => token_value.push('\0'),
            'u' => token_value.push(read_unicode_escape(stream)?),
            // Line continuation
            '\n' => {}
            other => token_value.push(other),
        }
    }

    return_syntax_error!(
        "Unterminated string literal - missing closing quote",
        stream.new_location(),
        {
            CompilationStage => "Tokenization",
            PrimarySuggestion => "Add a closing quote at the end of the string",
        }
    )
}

fn read_unicode_escape(stream: &mut TokenStream) -> Result<char, CompilerError> {
    let mut digits = String::with_capacity(4);
    for _ in 0..4 {
        match stream.next() {
            Some(ch) if ch.is_ascii_hexdigit() => digits.push(ch),
            _ => break,
        }
    }

    let code = u32::from_str_radix(&digits, 16).ok().and_then(char::from_u32);
    match code {
        Some(ch) => Ok(ch),
        None => return_syntax_error!(
            format!("Invalid unicode escape '\\u{digits}'"),
            TextLocation::new(stream.file_path.to_path_buf(), stream.start_position, stream.position),
            {
                CompilationStage => "Tokenization",
                PrimarySuggestion => "Unicode escapes need exactly four hex digits",
            }
        ),
    }
}

#[cfg(test)]
#[path = "tests/tokenizer_tests.rs"]
mod tokenizer_tests;
