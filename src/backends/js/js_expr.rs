use crate::backends::js::{JsEmitter, escape_js_string, format_number};
use crate::compiler_frontend::ast::ast_nodes::{
    Expression, Function, Literal, MemberProperty, Property, PropertyKey, UnaryOperator,
};

// Precedence levels, higher binds tighter
const SEQUENCE: u8 = 0;
const ASSIGNMENT: u8 = 1;
const CONDITIONAL: u8 = 2;
const UNARY: u8 = 14;
const POSTFIX: u8 = 15;
const CALL: u8 = 17;
const MEMBER: u8 = 18;
const PRIMARY: u8 = 19;

impl JsEmitter {
    /// Renders an expression, wrapping it in parens if it binds looser than `min_precedence`.
    pub(crate) fn render_expr(&self, expression: &Expression, min_precedence: u8) -> String {
        let (rendered, precedence) = self.render_expr_with_precedence(expression);

        if precedence < min_precedence {
            format!("({rendered})")
        } else {
            rendered
        }
    }

    /// Top level rendering where any expression is allowed unparenthesized.
    pub(crate) fn render_full_expr(&self, expression: &Expression) -> String {
        self.render_expr(expression, SEQUENCE)
    }

    /// Single argument / initializer position, where a bare comma would split the value.
    pub(crate) fn render_assignment_expr(&self, expression: &Expression) -> String {
        self.render_expr(expression, ASSIGNMENT)
    }

    fn render_expr_with_precedence(&self, expression: &Expression) -> (String, u8) {
        match expression {
            Expression::Identifier(name) => (name.to_owned(), PRIMARY),
            Expression::This => ("this".to_owned(), PRIMARY),

            Expression::Literal(literal) => match literal {
                Literal::Number(value) if *value < 0.0 => (format_number(*value), UNARY),
                Literal::Number(value) => (format_number(*value), PRIMARY),
                Literal::String(value) => (escape_js_string(value), PRIMARY),
                Literal::Bool(value) => (value.to_string(), PRIMARY),
                Literal::Null => ("null".to_owned(), PRIMARY),
            },

            Expression::Array(elements) => {
                let elements = elements
                    .iter()
                    .map(|element| self.render_assignment_expr(element))
                    .collect::<Vec<_>>();
                (format!("[{}]", elements.join(", ")), PRIMARY)
            }

            Expression::Object(properties) => (self.render_object(properties), PRIMARY),

            Expression::Function(function) => {
                let precedence = if function.is_arrow { ASSIGNMENT } else { PRIMARY };
                (self.render_function(function), precedence)
            }

            Expression::Unary { operator, argument } => {
                let argument_text = self.render_expr(argument, UNARY);

                let text = if operator.is_word() {
                    format!("{} {}", operator.as_str(), argument_text)
                } else if needs_operator_gap(*operator, &argument_text) {
                    format!("{} {}", operator.as_str(), argument_text)
                } else {
                    format!("{}{}", operator.as_str(), argument_text)
                };

                (text, UNARY)
            }

            Expression::Update {
                operator,
                prefix,
                argument,
            } => {
                if *prefix {
                    let argument = self.render_expr(argument, UNARY);
                    (format!("{}{}", operator.as_str(), argument), UNARY)
                } else {
                    let argument = self.render_expr(argument, CALL);
                    (format!("{}{}", argument, operator.as_str()), POSTFIX)
                }
            }

            Expression::Binary {
                operator,
                left,
                right,
            } => {
                let precedence = operator.precedence();
                let left = self.render_expr(left, precedence);
                let right = self.render_expr(right, precedence + 1);
                (format!("{} {} {}", left, operator.as_str(), right), precedence)
            }

            Expression::Logical {
                operator,
                left,
                right,
            } => {
                let precedence = operator.precedence();
                let left = self.render_expr(left, precedence);
                let right = self.render_expr(right, precedence + 1);
                (format!("{} {} {}", left, operator.as_str(), right), precedence)
            }

            Expression::Conditional {
                test,
                consequent,
                alternate,
            } => {
                let test = self.render_expr(test, CONDITIONAL + 1);
                let consequent = self.render_assignment_expr(consequent);
                let alternate = self.render_assignment_expr(alternate);
                (
                    format!("{} ? {} : {}", test, consequent, alternate),
                    CONDITIONAL,
                )
            }

            Expression::Assignment {
                operator,
                target,
                value,
            } => {
                let target = self.render_expr(target, POSTFIX);
                let value = self.render_assignment_expr(value);
                (
                    format!("{} {} {}", target, operator.as_str(), value),
                    ASSIGNMENT,
                )
            }

            Expression::Sequence(expressions) => {
                let expressions = expressions
                    .iter()
                    .map(|expression| self.render_assignment_expr(expression))
                    .collect::<Vec<_>>();
                (expressions.join(", "), SEQUENCE)
            }

            Expression::Call { callee, arguments } => {
                // Immediately invoked functions always get wrapped
                let callee = match callee.as_ref() {
                    Expression::Function(_) => format!("({})", self.render_full_expr(callee)),
                    _ => self.render_expr(callee, CALL),
                };
                (
                    format!("{}({})", callee, self.render_arguments(arguments)),
                    CALL,
                )
            }

            Expression::New { callee, arguments } => {
                let callee = self.render_expr(callee, MEMBER);
                (
                    format!("new {}({})", callee, self.render_arguments(arguments)),
                    CALL,
                )
            }

            Expression::Member { object, property } => {
                let object = match object.as_ref() {
                    Expression::Function(_) | Expression::Literal(Literal::Number(_)) => {
                        format!("({})", self.render_full_expr(object))
                    }
                    // `new a().b` needs the arguments to bind first
                    _ => self.render_expr(object, CALL),
                };

                let text = match property {
                    MemberProperty::Named(name) => format!("{}.{}", object, name),
                    MemberProperty::Computed(key) => {
                        format!("{}[{}]", object, self.render_full_expr(key))
                    }
                };
                (text, MEMBER)
            }

            Expression::Await(argument) => {
                let argument = self.render_expr(argument, UNARY);
                (format!("await {}", argument), UNARY)
            }
        }
    }

    fn render_arguments(&self, arguments: &[Expression]) -> String {
        arguments
            .iter()
            .map(|argument| self.render_assignment_expr(argument))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn render_object(&self, properties: &[Property]) -> String {
        if properties.is_empty() {
            return "{}".to_owned();
        }

        let properties = properties
            .iter()
            .map(|property| {
                let key = match &property.key {
                    PropertyKey::Identifier(name) => name.to_owned(),
                    PropertyKey::String(value) => escape_js_string(value),
                    PropertyKey::Number(value) => format_number(*value),
                    PropertyKey::Computed(key) => {
                        format!("[{}]", self.render_assignment_expr(key))
                    }
                };
                format!("{}: {}", key, self.render_assignment_expr(&property.value))
            })
            .collect::<Vec<_>>();

        format!("{{ {} }}", properties.join(", "))
    }

    /// `function name(a, b) { ... }` or `(a, b) => { ... }`.
    /// The body is rendered one level deeper than the current line.
    pub(crate) fn render_function(&self, function: &Function) -> String {
        let mut head = String::new();
        if function.is_async {
            head.push_str("async ");
        }

        let params = function.params.join(", ");
        if function.is_arrow {
            head.push_str(&format!("({}) =>", params));
        } else {
            head.push_str("function");
            if let Some(name) = &function.name {
                head.push(' ');
                head.push_str(name);
            }
            head.push_str(&format!("({})", params));
        }

        if function.body.is_empty() {
            return format!("{} {{}}", head);
        }

        let mut body_emitter = JsEmitter::new(self.config.to_owned(), self.indent + 1);
        body_emitter.emit_statements(&function.body);

        format!(
            "{} {{\n{}{}}}",
            head,
            body_emitter.out,
            self.indentation(self.indent)
        )
    }
}

fn needs_operator_gap(operator: UnaryOperator, argument: &str) -> bool {
    match operator {
        UnaryOperator::Minus => argument.starts_with('-'),
        UnaryOperator::Plus => argument.starts_with('+'),
        _ => false,
    }
}
