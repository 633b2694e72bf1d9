use crate::compiler_frontend::ast::ast_nodes::{
    CatchClause, DeclarationKind, Declarator, ForBinding, ForInit, Function, Statement, SwitchCase,
    VariableDeclaration,
};
use crate::compiler_frontend::ast::parser::{Parser, describe_token};
use crate::compiler_frontend::compiler_messages::compiler_errors::CompilerError;
use crate::compiler_frontend::tokenizer::tokens::{Keyword, Punctuator, TokenKind};
use crate::return_syntax_error;

impl Parser {
    pub fn parse_statement(&mut self) -> Result<Statement, CompilerError> {
        match self.kind().to_owned() {
            TokenKind::Punctuator(Punctuator::OpenCurly) => {
                Ok(Statement::Block(self.parse_block_body()?))
            }

            TokenKind::Punctuator(Punctuator::Semicolon) => {
                self.advance();
                Ok(Statement::Empty)
            }

            TokenKind::Keyword(Keyword::Var) | TokenKind::Keyword(Keyword::Const) => {
                let declaration = self.parse_variable_declaration()?;
                self.consume_semicolon()?;
                Ok(Statement::VariableDeclaration(declaration))
            }

            TokenKind::Keyword(Keyword::Let)
                if matches!(self.tokens.peek_next_token(), Some(TokenKind::Identifier(_))) =>
            {
                let declaration = self.parse_variable_declaration()?;
                self.consume_semicolon()?;
                Ok(Statement::VariableDeclaration(declaration))
            }

            TokenKind::Keyword(Keyword::Function) => {
                let function = self.parse_function(false)?;
                Ok(Statement::FunctionDeclaration(function))
            }

            TokenKind::Identifier(ref name) if name == "async" && self.at_async_function() => {
                self.advance();
                let function = self.parse_function(true)?;
                Ok(Statement::FunctionDeclaration(function))
            }

            TokenKind::Identifier(ref name)
                if matches!(
                    self.tokens.peek_next_token(),
                    Some(TokenKind::Punctuator(Punctuator::Colon))
                ) =>
            {
                let label = name.to_owned();
                self.advance();
                self.advance();
                let body = self.parse_statement()?;
                Ok(Statement::Labeled {
                    label,
                    body: Box::new(body),
                })
            }

            TokenKind::Keyword(Keyword::If) => self.parse_if(),
            TokenKind::Keyword(Keyword::For) => self.parse_for(),
            TokenKind::Keyword(Keyword::While) => {
                self.advance();
                let test = self.parse_parenthesized_expression()?;
                let body = self.parse_statement()?;
                Ok(Statement::While {
                    test,
                    body: Box::new(body),
                })
            }

            TokenKind::Keyword(Keyword::Do) => {
                self.advance();
                let body = self.parse_statement()?;
                self.expect_keyword(Keyword::While)?;
                let test = self.parse_parenthesized_expression()?;
                // A semicolon after do-while is always optional
                self.eat_punctuator(Punctuator::Semicolon);
                Ok(Statement::DoWhile {
                    body: Box::new(body),
                    test,
                })
            }

            TokenKind::Keyword(Keyword::Switch) => self.parse_switch(),
            TokenKind::Keyword(Keyword::Try) => self.parse_try(),

            TokenKind::Keyword(Keyword::Return) => {
                self.advance();
                let argument = if self.at_statement_end() {
                    None
                } else {
                    Some(self.parse_expression()?)
                };
                self.consume_semicolon()?;
                Ok(Statement::Return(argument))
            }

            TokenKind::Keyword(Keyword::Throw) => {
                let location = self.location();
                self.advance();
                if self.tokens.newline_before_current() {
                    return_syntax_error!("Illegal newline after throw", location, {
                        CompilationStage => "Parsing",
                    })
                }
                let argument = self.parse_expression()?;
                self.consume_semicolon()?;
                Ok(Statement::Throw(argument))
            }

            TokenKind::Keyword(Keyword::Break) => {
                self.advance();
                let label = self.parse_jump_label()?;
                self.consume_semicolon()?;
                Ok(Statement::Break(label))
            }

            TokenKind::Keyword(Keyword::Continue) => {
                self.advance();
                let label = self.parse_jump_label()?;
                self.consume_semicolon()?;
                Ok(Statement::Continue(label))
            }

            _ => {
                let expression = self.parse_expression()?;
                self.consume_semicolon()?;
                Ok(Statement::Expression(expression))
            }
        }
    }

    fn at_statement_end(&self) -> bool {
        self.at_punctuator(Punctuator::Semicolon)
            || self.at_punctuator(Punctuator::CloseCurly)
            || self.tokens.is_at_end()
            || self.tokens.newline_before_current()
    }

    fn parse_jump_label(&mut self) -> Result<Option<String>, CompilerError> {
        if self.tokens.newline_before_current() {
            return Ok(None);
        }

        if matches!(self.kind(), TokenKind::Identifier(_)) {
            return Ok(Some(self.parse_binding_identifier()?));
        }

        Ok(None)
    }

    /// `{ statements }`, returning the statements.
    pub fn parse_block_body(&mut self) -> Result<Vec<Statement>, CompilerError> {
        self.expect_punctuator(Punctuator::OpenCurly)?;

        let mut body = Vec::new();
        while !self.at_punctuator(Punctuator::CloseCurly) {
            if self.tokens.is_at_end() {
                return_syntax_error!("Unexpected end of file inside a block", self.location(), {
                    CompilationStage => "Parsing",
                    ExpectedToken => "}",
                    SuggestedInsertion => "}",
                })
            }
            body.push(self.parse_statement()?);
        }

        self.advance();
        Ok(body)
    }

    pub fn parse_variable_declaration(&mut self) -> Result<VariableDeclaration, CompilerError> {
        let kind = self.parse_declaration_kind()?;
        let mut declarators = Vec::new();

        loop {
            let name = self.parse_binding_identifier()?;
            let init = if self.eat_punctuator(Punctuator::Assign) {
                Some(self.parse_assignment()?)
            } else {
                None
            };

            declarators.push(Declarator { name, init });

            if !self.eat_punctuator(Punctuator::Comma) {
                break;
            }
        }

        Ok(VariableDeclaration { kind, declarators })
    }

    fn parse_declaration_kind(&mut self) -> Result<DeclarationKind, CompilerError> {
        let kind = match self.kind() {
            TokenKind::Keyword(Keyword::Var) => DeclarationKind::Var,
            TokenKind::Keyword(Keyword::Let) => DeclarationKind::Let,
            TokenKind::Keyword(Keyword::Const) => DeclarationKind::Const,
            other => {
                return_syntax_error!(
                    format!("Expected a declaration but found {}", describe_token(other)),
                    self.location(),
                    {
                        CompilationStage => "Parsing",
                    }
                )
            }
        };

        self.advance();
        Ok(kind)
    }

    /// Parses from `function` onwards. The `async` marker has already been consumed.
    pub fn parse_function(&mut self, is_async: bool) -> Result<Function, CompilerError> {
        let location = self.location();
        self.expect_keyword(Keyword::Function)?;

        if self.at_punctuator(Punctuator::Star) {
            return_syntax_error!("Generator functions are not supported", self.location(), {
                CompilationStage => "Parsing",
            })
        }

        let name = if self.at_punctuator(Punctuator::OpenParen) {
            None
        } else {
            Some(self.parse_binding_identifier()?)
        };

        let params = self.parse_parameters()?;
        let body = self.parse_function_body()?;

        Ok(Function {
            name,
            params,
            body,
            is_async,
            is_arrow: false,
            location,
        })
    }

    pub fn parse_parameters(&mut self) -> Result<Vec<String>, CompilerError> {
        self.expect_punctuator(Punctuator::OpenParen)?;

        let mut params = Vec::new();
        while !self.at_punctuator(Punctuator::CloseParen) {
            params.push(self.parse_binding_identifier()?);

            if self.at_punctuator(Punctuator::Assign) {
                return_syntax_error!("Default parameter values are not supported", self.location(), {
                    CompilationStage => "Parsing",
                })
            }

            if !self.eat_punctuator(Punctuator::Comma) {
                break;
            }
        }

        self.expect_punctuator(Punctuator::CloseParen)?;
        Ok(params)
    }

    pub fn parse_function_body(&mut self) -> Result<Vec<Statement>, CompilerError> {
        // Function bodies reset the for-head context
        let no_in = std::mem::replace(&mut self.no_in, false);
        let body = self.parse_block_body();
        self.no_in = no_in;
        body
    }

    fn parse_if(&mut self) -> Result<Statement, CompilerError> {
        self.advance();
        let test = self.parse_parenthesized_expression()?;
        let consequent = self.parse_statement()?;

        let alternate = if self.eat_keyword(Keyword::Else) {
            Some(Box::new(self.parse_statement()?))
        } else {
            None
        };

        Ok(Statement::If {
            test,
            consequent: Box::new(consequent),
            alternate,
        })
    }

    fn parse_for(&mut self) -> Result<Statement, CompilerError> {
        self.advance();
        self.expect_punctuator(Punctuator::OpenParen)?;

        let mut init = None;

        if self.eat_punctuator(Punctuator::Semicolon) {
            return self.parse_classic_for_rest(init);
        }

        let declaration_kind = match self.kind() {
            TokenKind::Keyword(Keyword::Var) => Some(DeclarationKind::Var),
            TokenKind::Keyword(Keyword::Let) => Some(DeclarationKind::Let),
            TokenKind::Keyword(Keyword::Const) => Some(DeclarationKind::Const),
            _ => None,
        };

        let binding_offset = if declaration_kind.is_some() { 1 } else { 0 };
        let binding_index = self.tokens.index + binding_offset;

        // `for (x in ...)` / `for (var x of ...)`
        let iterates = matches!(self.kind_at(binding_index), Some(TokenKind::Identifier(_)))
            && matches!(
                self.kind_at(binding_index + 1),
                Some(TokenKind::Keyword(Keyword::In)) | Some(TokenKind::Keyword(Keyword::Of))
            );

        if iterates {
            if declaration_kind.is_some() {
                self.advance();
            }

            let name = self.parse_binding_identifier()?;
            let is_of = self.at_keyword(Keyword::Of);
            self.advance();

            let right = if is_of {
                self.parse_assignment()?
            } else {
                self.parse_expression()?
            };

            self.expect_punctuator(Punctuator::CloseParen)?;
            let body = Box::new(self.parse_statement()?);
            let left = ForBinding {
                kind: declaration_kind,
                name,
            };

            return Ok(if is_of {
                Statement::ForOf { left, right, body }
            } else {
                Statement::ForIn { left, right, body }
            });
        }

        self.no_in = true;
        let parsed_init = if declaration_kind.is_some() {
            self.parse_variable_declaration().map(ForInit::Declaration)
        } else {
            self.parse_expression().map(ForInit::Expression)
        };
        self.no_in = false;

        init = Some(parsed_init?);

        if self.at_keyword(Keyword::In) || self.at_keyword(Keyword::Of) {
            return_syntax_error!(
                "Only a single identifier is supported on the left of for-in / for-of",
                self.location(),
                {
                    CompilationStage => "Parsing",
                }
            )
        }

        self.expect_punctuator(Punctuator::Semicolon)?;
        self.parse_classic_for_rest(init)
    }

    fn parse_classic_for_rest(&mut self, init: Option<ForInit>) -> Result<Statement, CompilerError> {
        let test = if self.at_punctuator(Punctuator::Semicolon) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.expect_punctuator(Punctuator::Semicolon)?;

        let update = if self.at_punctuator(Punctuator::CloseParen) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.expect_punctuator(Punctuator::CloseParen)?;

        let body = self.parse_statement()?;

        Ok(Statement::For {
            init,
            test,
            update,
            body: Box::new(body),
        })
    }

    fn parse_switch(&mut self) -> Result<Statement, CompilerError> {
        self.advance();
        let discriminant = self.parse_parenthesized_expression()?;
        self.expect_punctuator(Punctuator::OpenCurly)?;

        let mut cases: Vec<SwitchCase> = Vec::new();
        while !self.eat_punctuator(Punctuator::CloseCurly) {
            let test = if self.eat_keyword(Keyword::Case) {
                Some(self.parse_expression()?)
            } else if self.eat_keyword(Keyword::Default) {
                if cases.iter().any(|case| case.test.is_none()) {
                    return_syntax_error!("More than one default clause in switch", self.location(), {
                        CompilationStage => "Parsing",
                    })
                }
                None
            } else {
                return_syntax_error!(
                    format!("Expected 'case' or 'default' but found {}", describe_token(self.kind())),
                    self.location(),
                    {
                        CompilationStage => "Parsing",
                        ExpectedToken => "case",
                    }
                )
            };

            self.expect_punctuator(Punctuator::Colon)?;

            let mut consequent = Vec::new();
            while !self.at_keyword(Keyword::Case)
                && !self.at_keyword(Keyword::Default)
                && !self.at_punctuator(Punctuator::CloseCurly)
            {
                if self.tokens.is_at_end() {
                    return_syntax_error!("Unexpected end of file inside a switch", self.location(), {
                        CompilationStage => "Parsing",
                        ExpectedToken => "}",
                    })
                }
                consequent.push(self.parse_statement()?);
            }

            cases.push(SwitchCase { test, consequent });
        }

        Ok(Statement::Switch {
            discriminant,
            cases,
        })
    }

    fn parse_try(&mut self) -> Result<Statement, CompilerError> {
        self.advance();
        let block = self.parse_block_body()?;

        let handler = if self.eat_keyword(Keyword::Catch) {
            let param = if self.eat_punctuator(Punctuator::OpenParen) {
                let name = self.parse_binding_identifier()?;
                self.expect_punctuator(Punctuator::CloseParen)?;
                Some(name)
            } else {
                None
            };

            let body = self.parse_block_body()?;
            Some(CatchClause { param, body })
        } else {
            None
        };

        let finalizer = if self.eat_keyword(Keyword::Finally) {
            Some(self.parse_block_body()?)
        } else {
            None
        };

        if handler.is_none() && finalizer.is_none() {
            return_syntax_error!("Missing catch or finally after try", self.location(), {
                CompilationStage => "Parsing",
                ExpectedToken => "catch",
            })
        }

        Ok(Statement::Try {
            block,
            handler,
            finalizer,
        })
    }
}
