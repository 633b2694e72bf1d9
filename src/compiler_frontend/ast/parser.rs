use crate::compiler_frontend::ast::ast_nodes::Program;
use crate::compiler_frontend::compiler_messages::compiler_errors::CompilerError;
use crate::compiler_frontend::tokenizer::tokens::{
    FileTokens, Keyword, Punctuator, TextLocation, TokenKind,
};
use crate::{ast_log, return_syntax_error};

/// Recursive descent parser over a token stream.
/// Statement parsing lives in `parse_statements.rs`, expressions in `parse_expressions.rs`.
pub struct Parser {
    pub tokens: FileTokens,

    // Set while parsing a classic for-loop head, where a bare `in` ends the init expression
    pub no_in: bool,
}

pub fn parse_program(tokens: FileTokens) -> Result<Program, CompilerError> {
    let src_path = tokens.src_path.to_owned();
    let mut parser = Parser {
        tokens,
        no_in: false,
    };

    let mut body = Vec::new();
    while !parser.tokens.is_at_end() {
        body.push(parser.parse_statement()?);
    }

    ast_log!("Parsed ", Bright {body.len()}, " top level statements");

    Ok(Program { body, src_path })
}

impl Parser {
    pub fn kind(&self) -> &TokenKind {
        self.tokens.current_token_kind()
    }

    pub fn location(&self) -> TextLocation {
        self.tokens.current_location()
    }

    pub fn advance(&mut self) {
        self.tokens.advance();
    }

    pub fn at_punctuator(&self, punctuator: Punctuator) -> bool {
        self.kind().is_punctuator(punctuator)
    }

    pub fn at_keyword(&self, keyword: Keyword) -> bool {
        self.kind().is_keyword(keyword)
    }

    pub fn eat_punctuator(&mut self, punctuator: Punctuator) -> bool {
        if self.at_punctuator(punctuator) {
            self.advance();
            return true;
        }
        false
    }

    pub fn eat_keyword(&mut self, keyword: Keyword) -> bool {
        if self.at_keyword(keyword) {
            self.advance();
            return true;
        }
        false
    }

    pub fn expect_punctuator(&mut self, punctuator: Punctuator) -> Result<(), CompilerError> {
        if self.eat_punctuator(punctuator) {
            return Ok(());
        }

        return_syntax_error!(
            format!(
                "Expected '{}' but found {}",
                punctuator.as_str(),
                describe_token(self.kind())
            ),
            self.location(),
            {
                CompilationStage => "Parsing",
                ExpectedToken => punctuator.as_str(),
            }
        )
    }

    pub fn expect_keyword(&mut self, keyword: Keyword) -> Result<(), CompilerError> {
        if self.eat_keyword(keyword) {
            return Ok(());
        }

        return_syntax_error!(
            format!(
                "Expected '{}' but found {}",
                keyword.as_str(),
                describe_token(self.kind())
            ),
            self.location(),
            {
                CompilationStage => "Parsing",
                ExpectedToken => keyword.as_str(),
            }
        )
    }

    /// A binding name. Contextual keywords are fine here.
    pub fn parse_binding_identifier(&mut self) -> Result<String, CompilerError> {
        let name = match self.kind() {
            TokenKind::Identifier(name) => name.to_owned(),
            TokenKind::Keyword(keyword) if keyword.is_contextual() => keyword.as_str().to_owned(),
            other => {
                return_syntax_error!(
                    format!("Expected an identifier but found {}", describe_token(other)),
                    self.location(),
                    {
                        CompilationStage => "Parsing",
                        ExpectedToken => "identifier",
                    }
                )
            }
        };

        self.advance();
        Ok(name)
    }

    /// A property name after a dot or inside an object literal, where every keyword is allowed.
    pub fn parse_property_name(&mut self) -> Result<String, CompilerError> {
        let name = match self.kind() {
            TokenKind::Identifier(name) => name.to_owned(),
            TokenKind::Keyword(keyword) => keyword.as_str().to_owned(),
            other => {
                return_syntax_error!(
                    format!("Expected a property name but found {}", describe_token(other)),
                    self.location(),
                    {
                        CompilationStage => "Parsing",
                        ExpectedToken => "property name",
                    }
                )
            }
        };

        self.advance();
        Ok(name)
    }

    /// Statement terminator, with automatic semicolon insertion.
    pub fn consume_semicolon(&mut self) -> Result<(), CompilerError> {
        if self.eat_punctuator(Punctuator::Semicolon) {
            return Ok(());
        }

        if self.at_punctuator(Punctuator::CloseCurly)
            || self.tokens.is_at_end()
            || self.tokens.newline_before_current()
        {
            return Ok(());
        }

        return_syntax_error!(
            format!("Expected ';' but found {}", describe_token(self.kind())),
            self.location(),
            {
                CompilationStage => "Parsing",
                ExpectedToken => ";",
                SuggestedInsertion => ";",
            }
        )
    }

    pub fn at_async_function(&self) -> bool {
        self.kind().is_identifier_named("async")
            && matches!(
                self.tokens.peek_next_token(),
                Some(TokenKind::Keyword(Keyword::Function))
            )
            && !self.token_at_has_newline(self.tokens.index + 1)
    }

    /// `async` followed on the same line by a property key, inside an object literal.
    pub fn at_async_method(&self) -> bool {
        let next = self.tokens.index + 1;
        if !self.kind().is_identifier_named("async") || self.token_at_has_newline(next) {
            return false;
        }

        matches!(
            self.kind_at(next),
            Some(
                TokenKind::Identifier(_)
                    | TokenKind::Keyword(_)
                    | TokenKind::StringLiteral(_)
                    | TokenKind::NumberLiteral(_)
                    | TokenKind::Punctuator(Punctuator::OpenSquare)
            )
        )
    }

    pub fn token_at_has_newline(&self, index: usize) -> bool {
        self.tokens
            .tokens
            .get(index)
            .is_some_and(|token| token.newline_before)
    }

    pub fn kind_at(&self, index: usize) -> Option<&TokenKind> {
        self.tokens.tokens.get(index).map(|token| &token.kind)
    }

    /// True if the tokens starting at `index` are the parameter list of an arrow function:
    /// either a lone identifier or a parenthesised list, then `=>`.
    pub fn arrow_head_at(&self, index: usize) -> bool {
        match self.kind_at(index) {
            Some(TokenKind::Identifier(_)) => matches!(
                self.kind_at(index + 1),
                Some(TokenKind::Punctuator(Punctuator::Arrow))
            ),

            Some(TokenKind::Punctuator(Punctuator::OpenParen)) => {
                let mut depth = 0usize;
                let mut cursor = index;

                while let Some(kind) = self.kind_at(cursor) {
                    match kind {
                        TokenKind::Punctuator(Punctuator::OpenParen) => depth += 1,
                        TokenKind::Punctuator(Punctuator::CloseParen) => {
                            depth -= 1;
                            if depth == 0 {
                                return matches!(
                                    self.kind_at(cursor + 1),
                                    Some(TokenKind::Punctuator(Punctuator::Arrow))
                                );
                            }
                        }
                        TokenKind::Eof => return false,
                        _ => {}
                    }
                    cursor += 1;
                }

                false
            }

            _ => false,
        }
    }
}

pub fn describe_token(kind: &TokenKind) -> String {
    match kind {
        TokenKind::Eof => "end of file".to_owned(),
        TokenKind::Identifier(name) => format!("identifier '{name}'"),
        TokenKind::Keyword(keyword) => format!("keyword '{}'", keyword.as_str()),
        TokenKind::NumberLiteral(value) => format!("number {value}"),
        TokenKind::StringLiteral(value) => format!("string \"{value}\""),
        TokenKind::Punctuator(punctuator) => format!("'{}'", punctuator.as_str()),
    }
}
