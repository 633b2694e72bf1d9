use crate::compiler_frontend::tokenizer::tokens::TextLocation;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub body: Vec<Statement>,
    pub src_path: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclarationKind {
    Var,
    Let,
    Const,
}

impl DeclarationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            DeclarationKind::Var => "var",
            DeclarationKind::Let => "let",
            DeclarationKind::Const => "const",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Declarator {
    pub name: String,
    pub init: Option<Expression>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VariableDeclaration {
    pub kind: DeclarationKind,
    pub declarators: Vec<Declarator>,
}

impl VariableDeclaration {
    pub fn var(name: impl Into<String>, init: Option<Expression>) -> Self {
        VariableDeclaration {
            kind: DeclarationKind::Var,
            declarators: vec![Declarator {
                name: name.into(),
                init,
            }],
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ForInit {
    Declaration(VariableDeclaration),
    Expression(Expression),
}

/// The left side of a for-in / for-of head.
/// Only a single identifier binding is supported.
#[derive(Debug, Clone, PartialEq)]
pub struct ForBinding {
    pub kind: Option<DeclarationKind>,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SwitchCase {
    // None is the default case
    pub test: Option<Expression>,
    pub consequent: Vec<Statement>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CatchClause {
    pub param: Option<String>,
    pub body: Vec<Statement>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub name: Option<String>,
    pub params: Vec<String>,
    pub body: Vec<Statement>,
    pub is_async: bool,
    pub is_arrow: bool,
    pub location: TextLocation,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Expression(Expression),
    VariableDeclaration(VariableDeclaration),
    FunctionDeclaration(Function),
    Return(Option<Expression>),
    If {
        test: Expression,
        consequent: Box<Statement>,
        alternate: Option<Box<Statement>>,
    },
    Block(Vec<Statement>),
    For {
        init: Option<ForInit>,
        test: Option<Expression>,
        update: Option<Expression>,
        body: Box<Statement>,
    },
    ForIn {
        left: ForBinding,
        right: Expression,
        body: Box<Statement>,
    },
    ForOf {
        left: ForBinding,
        right: Expression,
        body: Box<Statement>,
    },
    While {
        test: Expression,
        body: Box<Statement>,
    },
    DoWhile {
        body: Box<Statement>,
        test: Expression,
    },
    Switch {
        discriminant: Expression,
        cases: Vec<SwitchCase>,
    },
    Try {
        block: Vec<Statement>,
        handler: Option<CatchClause>,
        finalizer: Option<Vec<Statement>>,
    },
    Throw(Expression),
    Break(Option<String>),
    Continue(Option<String>),
    Labeled {
        label: String,
        body: Box<Statement>,
    },
    Empty,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Number(f64),
    String(String),
    Bool(bool),
    Null,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PropertyKey {
    Identifier(String),
    String(String),
    Number(f64),
    Computed(Expression),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub key: PropertyKey,
    pub value: Expression,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MemberProperty {
    Named(String),
    Computed(Box<Expression>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    Minus,
    Plus,
    Not,
    BitNot,
    Typeof,
    Void,
    Delete,
}

impl UnaryOperator {
    pub fn as_str(self) -> &'static str {
        match self {
            UnaryOperator::Minus => "-",
            UnaryOperator::Plus => "+",
            UnaryOperator::Not => "!",
            UnaryOperator::BitNot => "~",
            UnaryOperator::Typeof => "typeof",
            UnaryOperator::Void => "void",
            UnaryOperator::Delete => "delete",
        }
    }

    pub fn is_word(self) -> bool {
        matches!(
            self,
            UnaryOperator::Typeof | UnaryOperator::Void | UnaryOperator::Delete
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOperator {
    Increment,
    Decrement,
}

impl UpdateOperator {
    pub fn as_str(self) -> &'static str {
        match self {
            UpdateOperator::Increment => "++",
            UpdateOperator::Decrement => "--",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    Equal,
    NotEqual,
    StrictEqual,
    StrictNotEqual,
    LessThan,
    GreaterThan,
    LessEqual,
    GreaterEqual,
    In,
    Instanceof,
    BitAnd,
    BitOr,
    BitXor,
    ShiftLeft,
    ShiftRight,
    UnsignedShiftRight,
}

impl BinaryOperator {
    pub fn as_str(self) -> &'static str {
        match self {
            BinaryOperator::Add => "+",
            BinaryOperator::Subtract => "-",
            BinaryOperator::Multiply => "*",
            BinaryOperator::Divide => "/",
            BinaryOperator::Modulo => "%",
            BinaryOperator::Equal => "==",
            BinaryOperator::NotEqual => "!=",
            BinaryOperator::StrictEqual => "===",
            BinaryOperator::StrictNotEqual => "!==",
            BinaryOperator::LessThan => "<",
            BinaryOperator::GreaterThan => ">",
            BinaryOperator::LessEqual => "<=",
            BinaryOperator::GreaterEqual => ">=",
            BinaryOperator::In => "in",
            BinaryOperator::Instanceof => "instanceof",
            BinaryOperator::BitAnd => "&",
            BinaryOperator::BitOr => "|",
            BinaryOperator::BitXor => "^",
            BinaryOperator::ShiftLeft => "<<",
            BinaryOperator::ShiftRight => ">>",
            BinaryOperator::UnsignedShiftRight => ">>>",
        }
    }

    /// Binding power, higher binds tighter.
    pub fn precedence(self) -> u8 {
        match self {
            BinaryOperator::BitOr => 6,
            BinaryOperator::BitXor => 7,
            BinaryOperator::BitAnd => 8,
            BinaryOperator::Equal
            | BinaryOperator::NotEqual
            | BinaryOperator::StrictEqual
            | BinaryOperator::StrictNotEqual => 9,
            BinaryOperator::LessThan
            | BinaryOperator::GreaterThan
            | BinaryOperator::LessEqual
            | BinaryOperator::GreaterEqual
            | BinaryOperator::In
            | BinaryOperator::Instanceof => 10,
            BinaryOperator::ShiftLeft
            | BinaryOperator::ShiftRight
            | BinaryOperator::UnsignedShiftRight => 11,
            BinaryOperator::Add | BinaryOperator::Subtract => 12,
            BinaryOperator::Multiply | BinaryOperator::Divide | BinaryOperator::Modulo => 13,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOperator {
    And,
    Or,
}

impl LogicalOperator {
    pub fn as_str(self) -> &'static str {
        match self {
            LogicalOperator::And => "&&",
            LogicalOperator::Or => "||",
        }
    }

    pub fn precedence(self) -> u8 {
        match self {
            LogicalOperator::Or => 4,
            LogicalOperator::And => 5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignmentOperator {
    Assign,
    Compound(BinaryOperator),
}

impl AssignmentOperator {
    pub fn as_str(self) -> String {
        match self {
            AssignmentOperator::Assign => "=".to_owned(),
            AssignmentOperator::Compound(operator) => format!("{}=", operator.as_str()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Identifier(String),
    This,
    Literal(Literal),
    Array(Vec<Expression>),
    Object(Vec<Property>),
    Function(Box<Function>),
    Unary {
        operator: UnaryOperator,
        argument: Box<Expression>,
    },
    Update {
        operator: UpdateOperator,
        prefix: bool,
        argument: Box<Expression>,
    },
    Binary {
        operator: BinaryOperator,
        left: Box<Expression>,
        right: Box<Expression>,
    },
    Logical {
        operator: LogicalOperator,
        left: Box<Expression>,
        right: Box<Expression>,
    },
    Conditional {
        test: Box<Expression>,
        consequent: Box<Expression>,
        alternate: Box<Expression>,
    },
    Assignment {
        operator: AssignmentOperator,
        target: Box<Expression>,
        value: Box<Expression>,
    },
    Sequence(Vec<Expression>),
    Call {
        callee: Box<Expression>,
        arguments: Vec<Expression>,
    },
    New {
        callee: Box<Expression>,
        arguments: Vec<Expression>,
    },
    Member {
        object: Box<Expression>,
        property: MemberProperty,
    },
    Await(Box<Expression>),
}

// Small constructors used all over the lowering passes
impl Expression {
    pub fn identifier(name: impl Into<String>) -> Expression {
        Expression::Identifier(name.into())
    }

    pub fn number(value: f64) -> Expression {
        Expression::Literal(Literal::Number(value))
    }

    pub fn boolean(value: bool) -> Expression {
        Expression::Literal(Literal::Bool(value))
    }

    /// `void 0`
    pub fn undefined() -> Expression {
        Expression::Unary {
            operator: UnaryOperator::Void,
            argument: Box::new(Expression::number(0.0)),
        }
    }

    pub fn call(callee: Expression, arguments: Vec<Expression>) -> Expression {
        Expression::Call {
            callee: Box::new(callee),
            arguments,
        }
    }

    pub fn member(object: Expression, name: impl Into<String>) -> Expression {
        Expression::Member {
            object: Box::new(object),
            property: MemberProperty::Named(name.into()),
        }
    }

    pub fn assign(target: Expression, value: Expression) -> Expression {
        Expression::Assignment {
            operator: AssignmentOperator::Assign,
            target: Box::new(target),
            value: Box::new(value),
        }
    }

    pub fn not(argument: Expression) -> Expression {
        Expression::Unary {
            operator: UnaryOperator::Not,
            argument: Box::new(argument),
        }
    }

    pub fn logical(operator: LogicalOperator, left: Expression, right: Expression) -> Expression {
        Expression::Logical {
            operator,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn conditional(test: Expression, consequent: Expression, alternate: Expression) -> Self {
        Expression::Conditional {
            test: Box::new(test),
            consequent: Box::new(consequent),
            alternate: Box::new(alternate),
        }
    }

    /// A plain `function(params) { body }` expression.
    pub fn function(params: Vec<String>, body: Vec<Statement>) -> Expression {
        Expression::Function(Box::new(Function {
            name: None,
            params,
            body,
            is_async: false,
            is_arrow: false,
            location: TextLocation::default(),
        }))
    }

    pub fn is_identifier(&self, name: &str) -> bool {
        matches!(self, Expression::Identifier(found) if found == name)
    }

    pub fn is_undefined(&self) -> bool {
        match self {
            Expression::Identifier(name) => name == "undefined",
            Expression::Unary {
                operator: UnaryOperator::Void,
                argument,
            } => matches!(**argument, Expression::Literal(_)),
            _ => false,
        }
    }

    /// Direct sub-expressions in evaluation order.
    /// Function bodies are never entered.
    pub fn children(&self) -> Vec<&Expression> {
        match self {
            Expression::Identifier(_)
            | Expression::This
            | Expression::Literal(_)
            | Expression::Function(_) => Vec::new(),
            Expression::Array(elements) => elements.iter().collect(),
            Expression::Object(properties) => {
                let mut children = Vec::with_capacity(properties.len());
                for property in properties {
                    if let PropertyKey::Computed(key) = &property.key {
                        children.push(key);
                    }
                    children.push(&property.value);
                }
                children
            }
            Expression::Unary { argument, .. }
            | Expression::Update { argument, .. }
            | Expression::Await(argument) => vec![argument.as_ref()],
            Expression::Binary { left, right, .. } | Expression::Logical { left, right, .. } => {
                vec![left.as_ref(), right.as_ref()]
            }
            Expression::Conditional {
                test,
                consequent,
                alternate,
            } => vec![test.as_ref(), consequent.as_ref(), alternate.as_ref()],
            Expression::Assignment { target, value, .. } => vec![target.as_ref(), value.as_ref()],
            Expression::Sequence(expressions) => expressions.iter().collect(),
            Expression::Call { callee, arguments } | Expression::New { callee, arguments } => {
                let mut children = vec![callee.as_ref()];
                children.extend(arguments.iter());
                children
            }
            Expression::Member { object, property } => match property {
                MemberProperty::Named(_) => vec![object.as_ref()],
                MemberProperty::Computed(key) => vec![object.as_ref(), key.as_ref()],
            },
        }
    }

    pub fn children_mut(&mut self) -> Vec<&mut Expression> {
        match self {
            Expression::Identifier(_)
            | Expression::This
            | Expression::Literal(_)
            | Expression::Function(_) => Vec::new(),
            Expression::Array(elements) => elements.iter_mut().collect(),
            Expression::Object(properties) => {
                let mut children = Vec::with_capacity(properties.len());
                for property in properties {
                    if let PropertyKey::Computed(key) = &mut property.key {
                        children.push(key);
                    }
                    children.push(&mut property.value);
                }
                children
            }
            Expression::Unary { argument, .. }
            | Expression::Update { argument, .. }
            | Expression::Await(argument) => vec![argument.as_mut()],
            Expression::Binary { left, right, .. } | Expression::Logical { left, right, .. } => {
                vec![left.as_mut(), right.as_mut()]
            }
            Expression::Conditional {
                test,
                consequent,
                alternate,
            } => vec![test.as_mut(), consequent.as_mut(), alternate.as_mut()],
            Expression::Assignment { target, value, .. } => vec![target.as_mut(), value.as_mut()],
            Expression::Sequence(expressions) => expressions.iter_mut().collect(),
            Expression::Call { callee, arguments } | Expression::New { callee, arguments } => {
                let mut children = vec![callee.as_mut()];
                children.extend(arguments.iter_mut());
                children
            }
            Expression::Member { object, property } => match property {
                MemberProperty::Named(_) => vec![object.as_mut()],
                MemberProperty::Computed(key) => vec![object.as_mut(), key.as_mut()],
            },
        }
    }

    pub fn contains_await(&self) -> bool {
        matches!(self, Expression::Await(_))
            || self.children().into_iter().any(Expression::contains_await)
    }
}

impl Statement {
    pub fn expression(expression: Expression) -> Statement {
        Statement::Expression(expression)
    }

    pub fn return_value(value: Expression) -> Statement {
        Statement::Return(Some(value))
    }

    /// Flattens a statement used as a body into a list.
    pub fn into_statements(self) -> Vec<Statement> {
        match self {
            Statement::Block(body) => body,
            Statement::Empty => Vec::new(),
            other => vec![other],
        }
    }

    /// The inverse of `into_statements` for single statement positions (branches, loop bodies).
    /// Declarations always keep their braces.
    pub fn from_statements(mut statements: Vec<Statement>) -> Statement {
        let keeps_braces = matches!(
            statements.as_slice(),
            [Statement::FunctionDeclaration(_)]
                | [Statement::VariableDeclaration(VariableDeclaration {
                    kind: DeclarationKind::Let | DeclarationKind::Const,
                    ..
                })]
        );

        match statements.len() {
            1 if !keeps_braces => statements.remove(0),
            _ => Statement::Block(statements),
        }
    }

    pub fn is_return_or_throw(&self) -> bool {
        matches!(self, Statement::Return(_) | Statement::Throw(_))
    }

    /// Expressions evaluated directly by this statement, in evaluation order.
    pub fn child_expressions(&self) -> Vec<&Expression> {
        match self {
            Statement::Expression(expression) | Statement::Throw(expression) => vec![expression],
            Statement::VariableDeclaration(declaration) => declaration
                .declarators
                .iter()
                .filter_map(|declarator| declarator.init.as_ref())
                .collect(),
            Statement::Return(argument) => argument.iter().collect(),
            Statement::If { test, .. } | Statement::While { test, .. } => vec![test],
            Statement::DoWhile { test, .. } => vec![test],
            Statement::For {
                init, test, update, ..
            } => {
                let mut children = Vec::new();
                match init {
                    Some(ForInit::Declaration(declaration)) => children.extend(
                        declaration
                            .declarators
                            .iter()
                            .filter_map(|declarator| declarator.init.as_ref()),
                    ),
                    Some(ForInit::Expression(expression)) => children.push(expression),
                    None => {}
                }
                children.extend(test.iter());
                children.extend(update.iter());
                children
            }
            Statement::ForIn { right, .. } | Statement::ForOf { right, .. } => vec![right],
            Statement::Switch {
                discriminant,
                cases,
            } => {
                let mut children = vec![discriminant];
                children.extend(cases.iter().filter_map(|case| case.test.as_ref()));
                children
            }
            Statement::FunctionDeclaration(_)
            | Statement::Block(_)
            | Statement::Try { .. }
            | Statement::Break(_)
            | Statement::Continue(_)
            | Statement::Labeled { .. }
            | Statement::Empty => Vec::new(),
        }
    }

    pub fn child_expressions_mut(&mut self) -> Vec<&mut Expression> {
        match self {
            Statement::Expression(expression) | Statement::Throw(expression) => vec![expression],
            Statement::VariableDeclaration(declaration) => declaration
                .declarators
                .iter_mut()
                .filter_map(|declarator| declarator.init.as_mut())
                .collect(),
            Statement::Return(argument) => argument.iter_mut().collect(),
            Statement::If { test, .. } | Statement::While { test, .. } => vec![test],
            Statement::DoWhile { test, .. } => vec![test],
            Statement::For {
                init, test, update, ..
            } => {
                let mut children = Vec::new();
                match init {
                    Some(ForInit::Declaration(declaration)) => children.extend(
                        declaration
                            .declarators
                            .iter_mut()
                            .filter_map(|declarator| declarator.init.as_mut()),
                    ),
                    Some(ForInit::Expression(expression)) => children.push(expression),
                    None => {}
                }
                children.extend(test.iter_mut());
                children.extend(update.iter_mut());
                children
            }
            Statement::ForIn { right, .. } | Statement::ForOf { right, .. } => vec![right],
            Statement::Switch {
                discriminant,
                cases,
            } => {
                let mut children = vec![discriminant];
                children.extend(cases.iter_mut().filter_map(|case| case.test.as_mut()));
                children
            }
            Statement::FunctionDeclaration(_)
            | Statement::Block(_)
            | Statement::Try { .. }
            | Statement::Break(_)
            | Statement::Continue(_)
            | Statement::Labeled { .. }
            | Statement::Empty => Vec::new(),
        }
    }

    /// Nested statements, not entering functions.
    pub fn child_statements(&self) -> Vec<&Statement> {
        match self {
            Statement::If {
                consequent,
                alternate,
                ..
            } => {
                let mut children = vec![consequent.as_ref()];
                if let Some(alternate) = alternate {
                    children.push(alternate.as_ref());
                }
                children
            }
            Statement::Block(body) => body.iter().collect(),
            Statement::For { body, .. }
            | Statement::ForIn { body, .. }
            | Statement::ForOf { body, .. }
            | Statement::While { body, .. }
            | Statement::DoWhile { body, .. }
            | Statement::Labeled { body, .. } => vec![body.as_ref()],
            Statement::Switch { cases, .. } => cases
                .iter()
                .flat_map(|case| case.consequent.iter())
                .collect(),
            Statement::Try {
                block,
                handler,
                finalizer,
            } => {
                let mut children: Vec<&Statement> = block.iter().collect();
                if let Some(handler) = handler {
                    children.extend(handler.body.iter());
                }
                if let Some(finalizer) = finalizer {
                    children.extend(finalizer.iter());
                }
                children
            }
            _ => Vec::new(),
        }
    }

    pub fn child_statements_mut(&mut self) -> Vec<&mut Statement> {
        match self {
            Statement::If {
                consequent,
                alternate,
                ..
            } => {
                let mut children = vec![consequent.as_mut()];
                if let Some(alternate) = alternate {
                    children.push(alternate.as_mut());
                }
                children
            }
            Statement::Block(body) => body.iter_mut().collect(),
            Statement::For { body, .. }
            | Statement::ForIn { body, .. }
            | Statement::ForOf { body, .. }
            | Statement::While { body, .. }
            | Statement::DoWhile { body, .. }
            | Statement::Labeled { body, .. } => vec![body.as_mut()],
            Statement::Switch { cases, .. } => cases
                .iter_mut()
                .flat_map(|case| case.consequent.iter_mut())
                .collect(),
            Statement::Try {
                block,
                handler,
                finalizer,
            } => {
                let mut children: Vec<&mut Statement> = block.iter_mut().collect();
                if let Some(handler) = handler {
                    children.extend(handler.body.iter_mut());
                }
                if let Some(finalizer) = finalizer {
                    children.extend(finalizer.iter_mut());
                }
                children
            }
            _ => Vec::new(),
        }
    }

    pub fn contains_await(&self) -> bool {
        self.child_expressions()
            .into_iter()
            .any(Expression::contains_await)
            || self
                .child_statements()
                .into_iter()
                .any(Statement::contains_await)
    }
}

pub fn statements_contain_await(statements: &[Statement]) -> bool {
    statements.iter().any(Statement::contains_await)
}
