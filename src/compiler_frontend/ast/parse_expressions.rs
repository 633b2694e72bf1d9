use crate::compiler_frontend::ast::ast_nodes::{
    AssignmentOperator, BinaryOperator, Expression, Function, Literal, LogicalOperator,
    MemberProperty, Property, PropertyKey, Statement, UnaryOperator, UpdateOperator,
};
use crate::compiler_frontend::ast::parser::{Parser, describe_token};
use crate::compiler_frontend::compiler_messages::compiler_errors::CompilerError;
use crate::compiler_frontend::tokenizer::tokens::{Keyword, Punctuator, TokenKind};
use crate::return_syntax_error;

#[derive(Clone, Copy)]
enum InfixOperator {
    Binary(BinaryOperator),
    Logical(LogicalOperator),
}

impl InfixOperator {
    fn precedence(self) -> u8 {
        match self {
            InfixOperator::Binary(operator) => operator.precedence(),
            InfixOperator::Logical(operator) => operator.precedence(),
        }
    }

    fn combine(self, left: Expression, right: Expression) -> Expression {
        match self {
            InfixOperator::Binary(operator) => Expression::Binary {
                operator,
                left: Box::new(left),
                right: Box::new(right),
            },
            InfixOperator::Logical(operator) => Expression::logical(operator, left, right),
        }
    }
}

fn infix_operator(kind: &TokenKind, no_in: bool) -> Option<InfixOperator> {
    let binary = match kind {
        TokenKind::Punctuator(punctuator) => match punctuator {
            Punctuator::LogicalAnd => return Some(InfixOperator::Logical(LogicalOperator::And)),
            Punctuator::LogicalOr => return Some(InfixOperator::Logical(LogicalOperator::Or)),
            Punctuator::Plus => BinaryOperator::Add,
            Punctuator::Minus => BinaryOperator::Subtract,
            Punctuator::Star => BinaryOperator::Multiply,
            Punctuator::Slash => BinaryOperator::Divide,
            Punctuator::Percent => BinaryOperator::Modulo,
            Punctuator::Equal => BinaryOperator::Equal,
            Punctuator::NotEqual => BinaryOperator::NotEqual,
            Punctuator::StrictEqual => BinaryOperator::StrictEqual,
            Punctuator::StrictNotEqual => BinaryOperator::StrictNotEqual,
            Punctuator::LessThan => BinaryOperator::LessThan,
            Punctuator::GreaterThan => BinaryOperator::GreaterThan,
            Punctuator::LessEqual => BinaryOperator::LessEqual,
            Punctuator::GreaterEqual => BinaryOperator::GreaterEqual,
            Punctuator::Ampersand => BinaryOperator::BitAnd,
            Punctuator::Pipe => BinaryOperator::BitOr,
            Punctuator::Caret => BinaryOperator::BitXor,
            Punctuator::ShiftLeft => BinaryOperator::ShiftLeft,
            Punctuator::ShiftRight => BinaryOperator::ShiftRight,
            Punctuator::UnsignedShiftRight => BinaryOperator::UnsignedShiftRight,
            _ => return None,
        },
        TokenKind::Keyword(Keyword::In) if !no_in => BinaryOperator::In,
        TokenKind::Keyword(Keyword::Instanceof) => BinaryOperator::Instanceof,
        _ => return None,
    };

    Some(InfixOperator::Binary(binary))
}

fn assignment_operator(kind: &TokenKind) -> Option<AssignmentOperator> {
    let TokenKind::Punctuator(punctuator) = kind else {
        return None;
    };

    let operator = match punctuator {
        Punctuator::Assign => AssignmentOperator::Assign,
        Punctuator::PlusAssign => AssignmentOperator::Compound(BinaryOperator::Add),
        Punctuator::MinusAssign => AssignmentOperator::Compound(BinaryOperator::Subtract),
        Punctuator::StarAssign => AssignmentOperator::Compound(BinaryOperator::Multiply),
        Punctuator::SlashAssign => AssignmentOperator::Compound(BinaryOperator::Divide),
        Punctuator::PercentAssign => AssignmentOperator::Compound(BinaryOperator::Modulo),
        Punctuator::AmpersandAssign => AssignmentOperator::Compound(BinaryOperator::BitAnd),
        Punctuator::PipeAssign => AssignmentOperator::Compound(BinaryOperator::BitOr),
        Punctuator::CaretAssign => AssignmentOperator::Compound(BinaryOperator::BitXor),
        Punctuator::ShiftLeftAssign => AssignmentOperator::Compound(BinaryOperator::ShiftLeft),
        Punctuator::ShiftRightAssign => AssignmentOperator::Compound(BinaryOperator::ShiftRight),
        Punctuator::UnsignedShiftRightAssign => {
            AssignmentOperator::Compound(BinaryOperator::UnsignedShiftRight)
        }
        _ => return None,
    };

    Some(operator)
}

impl Parser {
    /// Comma separated expressions.
    pub fn parse_expression(&mut self) -> Result<Expression, CompilerError> {
        let first = self.parse_assignment()?;
        if !self.at_punctuator(Punctuator::Comma) {
            return Ok(first);
        }

        let mut expressions = vec![first];
        while self.eat_punctuator(Punctuator::Comma) {
            expressions.push(self.parse_assignment()?);
        }

        Ok(Expression::Sequence(expressions))
    }

    pub fn parse_parenthesized_expression(&mut self) -> Result<Expression, CompilerError> {
        self.expect_punctuator(Punctuator::OpenParen)?;
        let no_in = std::mem::replace(&mut self.no_in, false);
        let expression = self.parse_expression();
        self.no_in = no_in;
        let expression = expression?;
        self.expect_punctuator(Punctuator::CloseParen)?;
        Ok(expression)
    }

    pub fn parse_assignment(&mut self) -> Result<Expression, CompilerError> {
        let index = self.tokens.index;

        if self.kind().is_identifier_named("async")
            && !self.token_at_has_newline(index + 1)
            && self.arrow_head_at(index + 1)
        {
            self.advance();
            return self.parse_arrow_function(true);
        }

        if self.arrow_head_at(index) {
            return self.parse_arrow_function(false);
        }

        let location = self.location();
        let target = self.parse_conditional()?;

        let Some(operator) = assignment_operator(self.kind()) else {
            return Ok(target);
        };

        if !matches!(target, Expression::Identifier(_) | Expression::Member { .. }) {
            return_syntax_error!("Invalid assignment target", location, {
                CompilationStage => "Parsing",
                PrimarySuggestion => "Only variables and properties can be assigned to",
            })
        }

        self.advance();
        let value = self.parse_assignment()?;

        Ok(Expression::Assignment {
            operator,
            target: Box::new(target),
            value: Box::new(value),
        })
    }

    fn parse_arrow_function(&mut self, is_async: bool) -> Result<Expression, CompilerError> {
        let location = self.location();

        let params = if matches!(self.kind(), TokenKind::Identifier(_)) {
            vec![self.parse_binding_identifier()?]
        } else {
            self.parse_parameters()?
        };

        self.expect_punctuator(Punctuator::Arrow)?;

        let body = if self.at_punctuator(Punctuator::OpenCurly) {
            self.parse_function_body()?
        } else {
            // Concise bodies are stored as a single return
            let no_in = std::mem::replace(&mut self.no_in, false);
            let expression = self.parse_assignment();
            self.no_in = no_in;
            vec![Statement::Return(Some(expression?))]
        };

        Ok(Expression::Function(Box::new(Function {
            name: None,
            params,
            body,
            is_async,
            is_arrow: true,
            location,
        })))
    }

    fn parse_conditional(&mut self) -> Result<Expression, CompilerError> {
        let test = self.parse_binary(0)?;
        if !self.eat_punctuator(Punctuator::Question) {
            return Ok(test);
        }

        let no_in = std::mem::replace(&mut self.no_in, false);
        let consequent = self.parse_assignment();
        self.no_in = no_in;
        let consequent = consequent?;

        self.expect_punctuator(Punctuator::Colon)?;
        let alternate = self.parse_assignment()?;

        Ok(Expression::conditional(test, consequent, alternate))
    }

    fn parse_binary(&mut self, min_precedence: u8) -> Result<Expression, CompilerError> {
        let mut left = self.parse_unary()?;

        while let Some(operator) = infix_operator(self.kind(), self.no_in) {
            let precedence = operator.precedence();
            if precedence < min_precedence {
                break;
            }

            self.advance();
            let right = self.parse_binary(precedence + 1)?;
            left = operator.combine(left, right);
        }

        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expression, CompilerError> {
        let unary = match self.kind() {
            TokenKind::Punctuator(Punctuator::Not) => Some(UnaryOperator::Not),
            TokenKind::Punctuator(Punctuator::Minus) => Some(UnaryOperator::Minus),
            TokenKind::Punctuator(Punctuator::Plus) => Some(UnaryOperator::Plus),
            TokenKind::Punctuator(Punctuator::Tilde) => Some(UnaryOperator::BitNot),
            TokenKind::Keyword(Keyword::Typeof) => Some(UnaryOperator::Typeof),
            TokenKind::Keyword(Keyword::Void) => Some(UnaryOperator::Void),
            TokenKind::Keyword(Keyword::Delete) => Some(UnaryOperator::Delete),
            _ => None,
        };

        if let Some(operator) = unary {
            self.advance();
            let argument = self.parse_unary()?;
            return Ok(Expression::Unary {
                operator,
                argument: Box::new(argument),
            });
        }

        let update = match self.kind() {
            TokenKind::Punctuator(Punctuator::Increment) => Some(UpdateOperator::Increment),
            TokenKind::Punctuator(Punctuator::Decrement) => Some(UpdateOperator::Decrement),
            _ => None,
        };

        if let Some(operator) = update {
            self.advance();
            let argument = self.parse_unary()?;
            return Ok(Expression::Update {
                operator,
                prefix: true,
                argument: Box::new(argument),
            });
        }

        if self.eat_keyword(Keyword::Await) {
            let argument = self.parse_unary()?;
            return Ok(Expression::Await(Box::new(argument)));
        }

        self.parse_postfix()
    }

    fn parse_postfix(&mut self) -> Result<Expression, CompilerError> {
        let expression = self.parse_left_hand_side()?;

        if self.tokens.newline_before_current() {
            return Ok(expression);
        }

        let operator = match self.kind() {
            TokenKind::Punctuator(Punctuator::Increment) => UpdateOperator::Increment,
            TokenKind::Punctuator(Punctuator::Decrement) => UpdateOperator::Decrement,
            _ => return Ok(expression),
        };

        self.advance();
        Ok(Expression::Update {
            operator,
            prefix: false,
            argument: Box::new(expression),
        })
    }

    fn parse_left_hand_side(&mut self) -> Result<Expression, CompilerError> {
        let mut expression = if self.at_keyword(Keyword::New) {
            self.parse_new()?
        } else {
            self.parse_primary()?
        };

        loop {
            if self.at_punctuator(Punctuator::OpenParen) {
                let arguments = self.parse_arguments()?;
                expression = Expression::call(expression, arguments);
                continue;
            }

            match self.parse_member_suffix(expression)? {
                (extended, true) => expression = extended,
                (unchanged, false) => return Ok(unchanged),
            }
        }
    }

    /// Applies one `.name` or `[key]` to the expression, if present.
    fn parse_member_suffix(
        &mut self,
        object: Expression,
    ) -> Result<(Expression, bool), CompilerError> {
        if self.eat_punctuator(Punctuator::Dot) {
            let name = self.parse_property_name()?;
            return Ok((Expression::member(object, name), true));
        }

        if self.eat_punctuator(Punctuator::OpenSquare) {
            let no_in = std::mem::replace(&mut self.no_in, false);
            let key = self.parse_expression();
            self.no_in = no_in;
            let key = key?;
            self.expect_punctuator(Punctuator::CloseSquare)?;

            return Ok((
                Expression::Member {
                    object: Box::new(object),
                    property: MemberProperty::Computed(Box::new(key)),
                },
                true,
            ));
        }

        Ok((object, false))
    }

    fn parse_new(&mut self) -> Result<Expression, CompilerError> {
        self.expect_keyword(Keyword::New)?;

        let mut callee = if self.at_keyword(Keyword::New) {
            self.parse_new()?
        } else {
            self.parse_primary()?
        };

        loop {
            match self.parse_member_suffix(callee)? {
                (extended, true) => callee = extended,
                (unchanged, false) => {
                    callee = unchanged;
                    break;
                }
            }
        }

        let arguments = if self.at_punctuator(Punctuator::OpenParen) {
            self.parse_arguments()?
        } else {
            Vec::new()
        };

        Ok(Expression::New {
            callee: Box::new(callee),
            arguments,
        })
    }

    fn parse_arguments(&mut self) -> Result<Vec<Expression>, CompilerError> {
        self.expect_punctuator(Punctuator::OpenParen)?;
        let no_in = std::mem::replace(&mut self.no_in, false);

        let mut arguments = Vec::new();
        let result = loop {
            if self.eat_punctuator(Punctuator::CloseParen) {
                break Ok(());
            }

            match self.parse_assignment() {
                Ok(argument) => arguments.push(argument),
                Err(error) => break Err(error),
            }

            if !self.eat_punctuator(Punctuator::Comma) {
                break self.expect_punctuator(Punctuator::CloseParen);
            }
        };

        self.no_in = no_in;
        result?;
        Ok(arguments)
    }

    fn parse_primary(&mut self) -> Result<Expression, CompilerError> {
        let location = self.location();

        let expression = match self.kind().to_owned() {
            TokenKind::Identifier(name) => {
                if self.at_async_function() {
                    self.advance();
                    let function = self.parse_function(true)?;
                    return Ok(Expression::Function(Box::new(function)));
                }

                self.advance();
                Expression::Identifier(name)
            }

            TokenKind::Keyword(keyword) if keyword.is_contextual() => {
                self.advance();
                Expression::identifier(keyword.as_str())
            }

            TokenKind::Keyword(Keyword::This) => {
                self.advance();
                Expression::This
            }

            TokenKind::Keyword(Keyword::True) => {
                self.advance();
                Expression::boolean(true)
            }

            TokenKind::Keyword(Keyword::False) => {
                self.advance();
                Expression::boolean(false)
            }

            TokenKind::Keyword(Keyword::Null) => {
                self.advance();
                Expression::Literal(Literal::Null)
            }

            TokenKind::Keyword(Keyword::Function) => {
                let function = self.parse_function(false)?;
                Expression::Function(Box::new(function))
            }

            TokenKind::NumberLiteral(value) => {
                self.advance();
                Expression::number(value)
            }

            TokenKind::StringLiteral(value) => {
                self.advance();
                Expression::Literal(Literal::String(value))
            }

            TokenKind::Punctuator(Punctuator::OpenParen) => self.parse_parenthesized_expression()?,
            TokenKind::Punctuator(Punctuator::OpenSquare) => self.parse_array_literal()?,
            TokenKind::Punctuator(Punctuator::OpenCurly) => self.parse_object_literal()?,

            TokenKind::Punctuator(Punctuator::Slash)
            | TokenKind::Punctuator(Punctuator::SlashAssign) => {
                return_syntax_error!("Regular expression literals are not supported", location, {
                    CompilationStage => "Parsing",
                    PrimarySuggestion => "Use the RegExp constructor instead",
                })
            }

            other => {
                return_syntax_error!(
                    format!("Unexpected {}", describe_token(&other)),
                    location,
                    {
                        CompilationStage => "Parsing",
                    }
                )
            }
        };

        Ok(expression)
    }

    fn parse_array_literal(&mut self) -> Result<Expression, CompilerError> {
        self.expect_punctuator(Punctuator::OpenSquare)?;
        let no_in = std::mem::replace(&mut self.no_in, false);

        let mut elements = Vec::new();
        let result = loop {
            if self.eat_punctuator(Punctuator::CloseSquare) {
                break Ok(());
            }

            if self.at_punctuator(Punctuator::Comma) {
                break Err(CompilerError::new_syntax_error(
                    "Array holes are not supported",
                    self.location(),
                ));
            }

            match self.parse_assignment() {
                Ok(element) => elements.push(element),
                Err(error) => break Err(error),
            }

            if !self.eat_punctuator(Punctuator::Comma) {
                break self.expect_punctuator(Punctuator::CloseSquare);
            }
        };

        self.no_in = no_in;
        result?;
        Ok(Expression::Array(elements))
    }

    fn parse_object_literal(&mut self) -> Result<Expression, CompilerError> {
        self.expect_punctuator(Punctuator::OpenCurly)?;
        let no_in = std::mem::replace(&mut self.no_in, false);
        let properties = self.parse_object_properties();
        self.no_in = no_in;
        Ok(Expression::Object(properties?))
    }

    fn parse_object_properties(&mut self) -> Result<Vec<Property>, CompilerError> {
        let mut properties = Vec::new();

        while !self.eat_punctuator(Punctuator::CloseCurly) {
            let location = self.location();

            // `async m() {}`, but not a property that is itself called async
            let is_async = self.at_async_method();
            if is_async {
                self.advance();
            }

            let key = match self.kind().to_owned() {
                TokenKind::Identifier(name) => {
                    self.advance();
                    PropertyKey::Identifier(name)
                }
                TokenKind::Keyword(keyword) => {
                    self.advance();
                    PropertyKey::Identifier(keyword.as_str().to_owned())
                }
                TokenKind::StringLiteral(value) => {
                    self.advance();
                    PropertyKey::String(value)
                }
                TokenKind::NumberLiteral(value) => {
                    self.advance();
                    PropertyKey::Number(value)
                }
                TokenKind::Punctuator(Punctuator::OpenSquare) => {
                    self.advance();
                    let key = self.parse_assignment()?;
                    self.expect_punctuator(Punctuator::CloseSquare)?;
                    PropertyKey::Computed(key)
                }
                other => {
                    return_syntax_error!(
                        format!("Expected a property key but found {}", describe_token(&other)),
                        location,
                        {
                            CompilationStage => "Parsing",
                        }
                    )
                }
            };

            let value = if is_async {
                let params = self.parse_parameters()?;
                let body = self.parse_function_body()?;
                Expression::Function(Box::new(Function {
                    name: None,
                    params,
                    body,
                    is_async: true,
                    is_arrow: false,
                    location,
                }))
            } else if self.eat_punctuator(Punctuator::Colon) {
                self.parse_assignment()?
            } else if self.at_punctuator(Punctuator::OpenParen) {
                // Method shorthand
                let params = self.parse_parameters()?;
                let body = self.parse_function_body()?;
                Expression::Function(Box::new(Function {
                    name: None,
                    params,
                    body,
                    is_async: false,
                    is_arrow: false,
                    location,
                }))
            } else {
                match &key {
                    PropertyKey::Identifier(name) => Expression::identifier(name.to_owned()),
                    _ => {
                        return_syntax_error!("Expected ':' after property key", self.location(), {
                            CompilationStage => "Parsing",
                            ExpectedToken => ":",
                        })
                    }
                }
            };

            properties.push(Property { key, value });

            if !self.eat_punctuator(Punctuator::Comma) {
                self.expect_punctuator(Punctuator::CloseCurly)?;
                break;
            }
        }

        Ok(properties)
    }
}
