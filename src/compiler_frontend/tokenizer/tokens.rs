use std::iter::Peekable;
use std::path::{Path, PathBuf};
use std::str::Chars;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct CharPosition {
    pub line_number: i32,
    pub char_column: i32,
}

#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct TextLocation {
    pub scope: PathBuf,
    pub start_pos: CharPosition,
    pub end_pos: CharPosition,
}

impl TextLocation {
    pub fn new(scope: PathBuf, start: CharPosition, end: CharPosition) -> Self {
        Self {
            scope,
            start_pos: start,
            end_pos: end,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub location: TextLocation,

    /// A line terminator appeared between the previous token and this one.
    /// The parser needs this for automatic semicolon insertion and `return`/`break` arguments.
    pub newline_before: bool,
}

impl Token {
    pub fn new(kind: TokenKind, location: TextLocation) -> Self {
        Token {
            kind,
            location,
            newline_before: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum TokenKind {
    Eof,

    Identifier(String),
    Keyword(Keyword),

    NumberLiteral(f64),
    StringLiteral(String),

    Punctuator(Punctuator),
}

impl TokenKind {
    pub fn is_punctuator(&self, punctuator: Punctuator) -> bool {
        matches!(self, TokenKind::Punctuator(found) if *found == punctuator)
    }

    pub fn is_keyword(&self, keyword: Keyword) -> bool {
        matches!(self, TokenKind::Keyword(found) if *found == keyword)
    }

    pub fn is_identifier_named(&self, name: &str) -> bool {
        matches!(self, TokenKind::Identifier(found) if found == name)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Keyword {
    Await,
    Break,
    Case,
    Catch,
    Const,
    Continue,
    Default,
    Delete,
    Do,
    Else,
    False,
    Finally,
    For,
    Function,
    If,
    In,
    Instanceof,
    Let,
    New,
    Null,
    Of,
    Return,
    Switch,
    This,
    Throw,
    True,
    Try,
    Typeof,
    Var,
    Void,
    While,
}

impl Keyword {
    pub fn from_word(word: &str) -> Option<Keyword> {
        let keyword = match word {
            "await" => Keyword::Await,
            "break" => Keyword::Break,
            "case" => Keyword::Case,
            "catch" => Keyword::Catch,
            "const" => Keyword::Const,
            "continue" => Keyword::Continue,
            "default" => Keyword::Default,
            "delete" => Keyword::Delete,
            "do" => Keyword::Do,
            "else" => Keyword::Else,
            "false" => Keyword::False,
            "finally" => Keyword::Finally,
            "for" => Keyword::For,
            "function" => Keyword::Function,
            "if" => Keyword::If,
            "in" => Keyword::In,
            "instanceof" => Keyword::Instanceof,
            "let" => Keyword::Let,
            "new" => Keyword::New,
            "null" => Keyword::Null,
            "of" => Keyword::Of,
            "return" => Keyword::Return,
            "switch" => Keyword::Switch,
            "this" => Keyword::This,
            "throw" => Keyword::Throw,
            "true" => Keyword::True,
            "try" => Keyword::Try,
            "typeof" => Keyword::Typeof,
            "var" => Keyword::Var,
            "void" => Keyword::Void,
            "while" => Keyword::While,
            _ => return None,
        };

        Some(keyword)
    }

    /// Contextual keywords can still be used as plain identifiers.
    pub fn is_contextual(self) -> bool {
        matches!(self, Keyword::Of | Keyword::Let)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Keyword::Await => "await",
            Keyword::Break => "break",
            Keyword::Case => "case",
            Keyword::Catch => "catch",
            Keyword::Const => "const",
            Keyword::Continue => "continue",
            Keyword::Default => "default",
            Keyword::Delete => "delete",
            Keyword::Do => "do",
            Keyword::Else => "else",
            Keyword::False => "false",
            Keyword::Finally => "finally",
            Keyword::For => "for",
            Keyword::Function => "function",
            Keyword::If => "if",
            Keyword::In => "in",
            Keyword::Instanceof => "instanceof",
            Keyword::Let => "let",
            Keyword::New => "new",
            Keyword::Null => "null",
            Keyword::Of => "of",
            Keyword::Return => "return",
            Keyword::Switch => "switch",
            Keyword::This => "this",
            Keyword::Throw => "throw",
            Keyword::True => "true",
            Keyword::Try => "try",
            Keyword::Typeof => "typeof",
            Keyword::Var => "var",
            Keyword::Void => "void",
            Keyword::While => "while",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Punctuator {
    OpenParen,
    CloseParen,
    OpenCurly,
    CloseCurly,
    OpenSquare,
    CloseSquare,
    Semicolon,
    Comma,
    Dot,
    Colon,
    Question,
    Arrow,

    Assign,
    PlusAssign,
    MinusAssign,
    StarAssign,
    SlashAssign,
    PercentAssign,
    AmpersandAssign,
    PipeAssign,
    CaretAssign,
    ShiftLeftAssign,
    ShiftRightAssign,
    UnsignedShiftRightAssign,

    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Increment,
    Decrement,

    Equal,
    NotEqual,
    StrictEqual,
    StrictNotEqual,
    LessThan,
    GreaterThan,
    LessEqual,
    GreaterEqual,

    LogicalAnd,
    LogicalOr,
    Not,

    Ampersand,
    Pipe,
    Caret,
    Tilde,
    ShiftLeft,
    ShiftRight,
    UnsignedShiftRight,
}

impl Punctuator {
    pub fn as_str(self) -> &'static str {
        match self {
            Punctuator::OpenParen => "(",
            Punctuator::CloseParen => ")",
            Punctuator::OpenCurly => "{",
            Punctuator::CloseCurly => "}",
            Punctuator::OpenSquare => "[",
            Punctuator::CloseSquare => "]",
            Punctuator::Semicolon => ";",
            Punctuator::Comma => ",",
            Punctuator::Dot => ".",
            Punctuator::Colon => ":",
            Punctuator::Question => "?",
            Punctuator::Arrow => "=>",
            Punctuator::Assign => "=",
            Punctuator::PlusAssign => "+=",
            Punctuator::MinusAssign => "-=",
            Punctuator::StarAssign => "*=",
            Punctuator::SlashAssign => "/=",
            Punctuator::PercentAssign => "%=",
            Punctuator::AmpersandAssign => "&=",
            Punctuator::PipeAssign => "|=",
            Punctuator::CaretAssign => "^=",
            Punctuator::ShiftLeftAssign => "<<=",
            Punctuator::ShiftRightAssign => ">>=",
            Punctuator::UnsignedShiftRightAssign => ">>>=",
            Punctuator::Plus => "+",
            Punctuator::Minus => "-",
            Punctuator::Star => "*",
            Punctuator::Slash => "/",
            Punctuator::Percent => "%",
            Punctuator::Increment => "++",
            Punctuator::Decrement => "--",
            Punctuator::Equal => "==",
            Punctuator::NotEqual => "!=",
            Punctuator::StrictEqual => "===",
            Punctuator::StrictNotEqual => "!==",
            Punctuator::LessThan => "<",
            Punctuator::GreaterThan => ">",
            Punctuator::LessEqual => "<=",
            Punctuator::GreaterEqual => ">=",
            Punctuator::LogicalAnd => "&&",
            Punctuator::LogicalOr => "||",
            Punctuator::Not => "!",
            Punctuator::Ampersand => "&",
            Punctuator::Pipe => "|",
            Punctuator::Caret => "^",
            Punctuator::Tilde => "~",
            Punctuator::ShiftLeft => "<<",
            Punctuator::ShiftRight => ">>",
            Punctuator::UnsignedShiftRight => ">>>",
        }
    }
}

/// The parser walks this with a cursor.
/// The tokenizer always ends the list with an Eof token, and the cursor never moves past it.
#[derive(Debug, Clone)]
pub struct FileTokens {
    pub src_path: PathBuf,
    pub tokens: Vec<Token>,
    pub index: usize,
}

impl FileTokens {
    pub fn new(src_path: PathBuf, tokens: Vec<Token>) -> Self {
        Self {
            src_path,
            tokens,
            index: 0,
        }
    }

    pub fn current_token(&self) -> &Token {
        &self.tokens[self.index.min(self.tokens.len().saturating_sub(1))]
    }

    pub fn current_token_kind(&self) -> &TokenKind {
        &self.current_token().kind
    }

    pub fn peek_next_token(&self) -> Option<&TokenKind> {
        self.tokens.get(self.index + 1).map(|token| &token.kind)
    }

    pub fn current_location(&self) -> TextLocation {
        self.current_token().location.clone()
    }

    pub fn newline_before_current(&self) -> bool {
        self.current_token().newline_before
    }

    pub fn advance(&mut self) {
        match self.current_token_kind() {
            // Can't advance past End of File
            TokenKind::Eof => {
                crate::token_log!(Red "Parser tried to advance past EOF");
            }

            _ => {
                self.index += 1;
            }
        }
    }

    pub fn is_at_end(&self) -> bool {
        matches!(self.current_token_kind(), TokenKind::Eof)
    }
}

pub struct TokenStream<'a> {
    pub file_path: &'a Path,
    pub chars: Peekable<Chars<'a>>,
    pub position: CharPosition,
    pub start_position: CharPosition,
}

impl<'a> TokenStream<'a> {
    pub fn new(source_code: &'a str, file_path: &'a Path) -> Self {
        Self {
            file_path,
            chars: source_code.chars().peekable(),
            position: CharPosition::default(),
            start_position: Default::default(),
        }
    }

    pub fn next(&mut self) -> Option<char> {
        match self.chars.peek() {
            Some(c) => {
                if *c == '\n' {
                    self.position.line_number += 1;
                    self.position.char_column = 0;
                } else {
                    self.position.char_column += 1;
                }

                self.chars.next()
            }

            None => None,
        }
    }

    pub fn peek(&mut self) -> Option<&char> {
        self.chars.peek()
    }

    /// Looks one character past `peek` without consuming anything.
    pub fn peek_second(&self) -> Option<char> {
        let mut lookahead = self.chars.clone();
        lookahead.next();
        lookahead.next()
    }

    pub fn new_location(&mut self) -> TextLocation {
        let start_pos = self.start_position;
        self.update_start_position();
        TextLocation::new(self.file_path.to_path_buf(), start_pos, self.position)
    }

    pub fn update_start_position(&mut self) {
        self.start_position = self.position;
    }
}
