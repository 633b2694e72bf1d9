use crate::backends::js::JsEmitter;
use crate::compiler_frontend::ast::ast_nodes::{
    Expression, ForBinding, ForInit, Statement, VariableDeclaration,
};

impl JsEmitter {
    pub(crate) fn emit_statements(&mut self, statements: &[Statement]) {
        for statement in statements {
            self.emit_statement(statement);
        }
    }

    pub(crate) fn emit_statement(&mut self, statement: &Statement) {
        match statement {
            Statement::Expression(expression) => {
                let rendered = self.render_full_expr(expression);

                // These would parse as a declaration or a block at statement start
                if rendered.starts_with("function")
                    || rendered.starts_with("async function")
                    || rendered.starts_with('{')
                {
                    self.emit_line(&format!("({});", rendered));
                } else {
                    self.emit_line(&format!("{};", rendered));
                }
            }

            Statement::VariableDeclaration(declaration) => {
                let rendered = self.render_declaration(declaration);
                self.emit_line(&format!("{};", rendered));
            }

            Statement::FunctionDeclaration(function) => {
                let rendered = self.render_function(function);
                self.emit_line(&rendered);
            }

            Statement::Return(argument) => match argument {
                Some(argument) => {
                    let rendered = self.render_statement_argument(argument);
                    self.emit_line(&format!("return {};", rendered));
                }
                None => self.emit_line("return;"),
            },

            Statement::Throw(argument) => {
                let rendered = self.render_statement_argument(argument);
                self.emit_line(&format!("throw {};", rendered));
            }

            Statement::If { .. } => self.emit_if_chain(statement, ""),

            Statement::Block(body) => {
                self.emit_line("{");
                self.with_indent(|emitter| emitter.emit_statements(body));
                self.emit_line("}");
            }

            Statement::For {
                init,
                test,
                update,
                body,
            } => {
                let init = match init {
                    Some(ForInit::Declaration(declaration)) => {
                        self.render_declaration(declaration)
                    }
                    Some(ForInit::Expression(expression)) => self.render_full_expr(expression),
                    None => String::new(),
                };
                let test = test
                    .as_ref()
                    .map(|test| format!(" {}", self.render_full_expr(test)))
                    .unwrap_or_default();
                let update = update
                    .as_ref()
                    .map(|update| format!(" {}", self.render_full_expr(update)))
                    .unwrap_or_default();

                self.emit_line(&format!("for ({};{};{}) {{", init, test, update));
                self.emit_braced_body(body);
                self.emit_line("}");
            }

            Statement::ForIn { left, right, body } => {
                let head = format!(
                    "for ({} in {}) {{",
                    render_for_binding(left),
                    self.render_full_expr(right)
                );
                self.emit_line(&head);
                self.emit_braced_body(body);
                self.emit_line("}");
            }

            Statement::ForOf { left, right, body } => {
                let head = format!(
                    "for ({} of {}) {{",
                    render_for_binding(left),
                    self.render_assignment_expr(right)
                );
                self.emit_line(&head);
                self.emit_braced_body(body);
                self.emit_line("}");
            }

            Statement::While { test, body } => {
                let head = format!("while ({}) {{", self.render_full_expr(test));
                self.emit_line(&head);
                self.emit_braced_body(body);
                self.emit_line("}");
            }

            Statement::DoWhile { body, test } => {
                self.emit_line("do {");
                self.emit_braced_body(body);
                let tail = format!("}} while ({});", self.render_full_expr(test));
                self.emit_line(&tail);
            }

            Statement::Switch {
                discriminant,
                cases,
            } => {
                let head = format!("switch ({}) {{", self.render_full_expr(discriminant));
                self.emit_line(&head);

                self.with_indent(|emitter| {
                    for case in cases {
                        match &case.test {
                            Some(test) => {
                                let label = format!("case {}:", emitter.render_full_expr(test));
                                emitter.emit_line(&label);
                            }
                            None => emitter.emit_line("default:"),
                        }

                        emitter.with_indent(|emitter| emitter.emit_statements(&case.consequent));
                    }
                });

                self.emit_line("}");
            }

            Statement::Try {
                block,
                handler,
                finalizer,
            } => {
                self.emit_line("try {");
                self.with_indent(|emitter| emitter.emit_statements(block));

                if let Some(handler) = handler {
                    match &handler.param {
                        Some(param) => self.emit_line(&format!("}} catch ({}) {{", param)),
                        None => self.emit_line("} catch {"),
                    }
                    self.with_indent(|emitter| emitter.emit_statements(&handler.body));
                }

                if let Some(finalizer) = finalizer {
                    self.emit_line("} finally {");
                    self.with_indent(|emitter| emitter.emit_statements(finalizer));
                }

                self.emit_line("}");
            }

            Statement::Break(label) => match label {
                Some(label) => self.emit_line(&format!("break {};", label)),
                None => self.emit_line("break;"),
            },

            Statement::Continue(label) => match label {
                Some(label) => self.emit_line(&format!("continue {};", label)),
                None => self.emit_line("continue;"),
            },

            Statement::Labeled { label, body } => {
                self.emit_line(&format!("{}:", label));
                self.emit_statement(body);
            }

            Statement::Empty => self.emit_line(";"),
        }
    }

    /// `if` statements are always braced, and `else if` chains stay flat.
    fn emit_if_chain(&mut self, statement: &Statement, prefix: &str) {
        let Statement::If {
            test,
            consequent,
            alternate,
        } = statement
        else {
            return;
        };

        let head = format!("{}if ({}) {{", prefix, self.render_full_expr(test));
        self.emit_line(&head);
        self.emit_braced_body(consequent);

        match alternate.as_deref() {
            Some(alternate @ Statement::If { .. }) => self.emit_if_chain(alternate, "} else "),
            Some(alternate) => {
                self.emit_line("} else {");
                self.emit_braced_body(alternate);
                self.emit_line("}");
            }
            None => self.emit_line("}"),
        }
    }

    /// Emits the contents of a braced body, unwrapping a block statement.
    fn emit_braced_body(&mut self, body: &Statement) {
        self.with_indent(|emitter| match body {
            Statement::Block(statements) => emitter.emit_statements(statements),
            Statement::Empty => {}
            other => emitter.emit_statement(other),
        });
    }

    pub(crate) fn render_declaration(&self, declaration: &VariableDeclaration) -> String {
        let declarators = declaration
            .declarators
            .iter()
            .map(|declarator| match &declarator.init {
                Some(init) => format!(
                    "{} = {}",
                    declarator.name,
                    self.render_assignment_expr(init)
                ),
                None => declarator.name.to_owned(),
            })
            .collect::<Vec<_>>();

        format!("{} {}", declaration.kind.as_str(), declarators.join(", "))
    }

    /// `return` and `throw` arguments: a comma sequence is parenthesized for readability.
    fn render_statement_argument(&self, argument: &Expression) -> String {
        match argument {
            Expression::Sequence(_) => format!("({})", self.render_full_expr(argument)),
            _ => self.render_full_expr(argument),
        }
    }
}

fn render_for_binding(binding: &ForBinding) -> String {
    match binding.kind {
        Some(kind) => format!("{} {}", kind.as_str(), binding.name),
        None => binding.name.to_owned(),
    }
}
