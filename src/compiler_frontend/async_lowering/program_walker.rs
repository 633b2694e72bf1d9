use crate::backends::js::runtime_helpers::Helper;
use crate::compiler_frontend::ast::ast_nodes::{
    DeclarationKind, Declarator, Expression, ForInit, Function, Program, Statement,
    VariableDeclaration, statements_contain_await,
};
use crate::compiler_frontend::async_lowering::LoweringContext;
use crate::compiler_frontend::async_lowering::bindings::BindingTable;
use crate::compiler_frontend::async_lowering::compatibility::is_compatible;
use crate::compiler_frontend::async_lowering::driver::rewrite_statements;
use crate::compiler_frontend::async_lowering::helper_usage::HelperUsage;
use crate::compiler_frontend::async_lowering::name_generator::NameGenerator;
use crate::compiler_frontend::compiler_messages::compiler_errors::CompilerError;
use crate::compiler_frontend::compiler_messages::compiler_warnings::{
    CompilerWarning, WarningKind,
};
use crate::{lowering_log, return_compiler_error};
use std::path::PathBuf;

#[derive(Debug, Default)]
pub struct LoweringOutcome {
    pub transformed: usize,
    pub skipped: usize,
    pub warnings: Vec<CompilerWarning>,
}

/// Lowers every async function in the program, innermost first.
/// Helpers the lowered code references are recorded in `helpers`.
pub fn lower_program(
    program: &mut Program,
    helpers: &mut HelperUsage,
) -> Result<LoweringOutcome, CompilerError> {
    let mut walker = ProgramWalker {
        names: NameGenerator::from_statements(&program.body),
        bindings: BindingTable::from_statements(&program.body),
        helpers,
        frames: vec![Frame::default()],
        outcome: LoweringOutcome::default(),
        src_path: program.src_path.to_owned(),
    };

    walker.walk_statements(&mut program.body)?;

    let Some(frame) = walker.frames.pop() else {
        return_compiler_error!("Program frame was popped while walking the program");
    };
    let mut body = frame.alias_declarations();
    body.append(&mut program.body);
    program.body = body;

    Ok(walker.outcome)
}

/// The `this` and `arguments` of a non-arrow function, and the aliases lowered code
/// reads them through.
#[derive(Debug, Default)]
struct Frame {
    this_alias: Option<String>,
    arguments_alias: Option<String>,
}

impl Frame {
    fn alias_declarations(&self) -> Vec<Statement> {
        let mut declarators = Vec::new();
        if let Some(alias) = &self.this_alias {
            declarators.push(Declarator {
                name: alias.to_owned(),
                init: Some(Expression::This),
            });
        }
        if let Some(alias) = &self.arguments_alias {
            declarators.push(Declarator {
                name: alias.to_owned(),
                init: Some(Expression::identifier("arguments")),
            });
        }

        if declarators.is_empty() {
            return Vec::new();
        }

        vec![Statement::VariableDeclaration(VariableDeclaration {
            kind: DeclarationKind::Var,
            declarators,
        })]
    }
}

struct ProgramWalker<'a> {
    names: NameGenerator,
    bindings: BindingTable,
    helpers: &'a mut HelperUsage,
    frames: Vec<Frame>,
    outcome: LoweringOutcome,
    src_path: PathBuf,
}

impl ProgramWalker<'_> {
    /// Walks a statement list. Async declarations that were lowered become
    /// `var name = __async(...)` and move to the top of the list, where the declaration
    /// would have been hoisted to.
    fn walk_statements(&mut self, statements: &mut Vec<Statement>) -> Result<(), CompilerError> {
        let mut converted = Vec::new();
        let mut remaining = Vec::with_capacity(statements.len());

        for mut statement in statements.drain(..) {
            match self.walk_statement(&mut statement)? {
                true => converted.push(statement),
                false => remaining.push(statement),
            }
        }

        converted.append(&mut remaining);
        *statements = converted;
        Ok(())
    }

    /// Returns true when the statement was a lowered async function declaration.
    fn walk_statement(&mut self, statement: &mut Statement) -> Result<bool, CompilerError> {
        if let Statement::FunctionDeclaration(function) = statement {
            if !self.walk_function(function)? {
                return Ok(false);
            }

            let Statement::FunctionDeclaration(mut function) =
                std::mem::replace(statement, Statement::Empty)
            else {
                return_compiler_error!("Function declaration changed shape while lowering it");
            };

            let Some(name) = function.name.take() else {
                return_compiler_error!("Function declaration without a name");
            };
            let wrapped = self.async_wrapper(function);
            *statement = Statement::VariableDeclaration(VariableDeclaration::var(name, Some(wrapped)));
            return Ok(true);
        }

        for expression in statement.child_expressions_mut() {
            self.walk_expression(expression)?;
        }

        match statement {
            Statement::Block(body) => self.walk_statements(body)?,

            Statement::Switch { cases, .. } => {
                for case in cases {
                    self.walk_statements(&mut case.consequent)?;
                }
            }

            Statement::Try {
                block,
                handler,
                finalizer,
            } => {
                self.walk_statements(block)?;
                if let Some(handler) = handler {
                    self.walk_statements(&mut handler.body)?;
                }
                if let Some(finalizer) = finalizer {
                    self.walk_statements(finalizer)?;
                }
            }

            other => {
                for child in other.child_statements_mut() {
                    self.walk_statement(child)?;
                }
            }
        }

        Ok(false)
    }

    fn walk_expression(&mut self, expression: &mut Expression) -> Result<(), CompilerError> {
        if let Expression::Function(function) = expression {
            if self.walk_function(function)? {
                let Expression::Function(function) =
                    std::mem::replace(expression, Expression::This)
                else {
                    return_compiler_error!("Function expression changed shape while lowering it");
                };
                *expression = self.async_wrapper(*function);
            }
            return Ok(());
        }

        for child in expression.children_mut() {
            self.walk_expression(child)?;
        }

        Ok(())
    }

    /// Returns true when the function was async and got lowered.
    fn walk_function(&mut self, function: &mut Function) -> Result<bool, CompilerError> {
        let has_own_frame = !function.is_arrow;
        if has_own_frame {
            self.frames.push(Frame::default());
        }

        self.walk_statements(&mut function.body)?;

        let lowered = match function.is_async {
            true => self.lower_function(function)?,
            false => false,
        };

        if has_own_frame {
            let Some(frame) = self.frames.pop() else {
                return_compiler_error!("Function frame was popped while walking its body");
            };
            let mut body = frame.alias_declarations();
            body.append(&mut function.body);
            function.body = body;
        }

        Ok(lowered)
    }

    fn lower_function(&mut self, function: &mut Function) -> Result<bool, CompilerError> {
        let name = function.name.as_deref().unwrap_or("<anonymous>").to_owned();

        if !is_compatible(&function.body) {
            lowering_log!(Yellow "Skipping ", #name);
            self.outcome.skipped += 1;
            self.outcome.warnings.push(CompilerWarning::new(
                &name,
                function.location.to_owned(),
                WarningKind::IncompatibleAsyncFunction,
                self.src_path.to_owned(),
            ));
            return Ok(false);
        }

        lowering_log!("Lowering ", Cyan #name);

        let suspends = statements_contain_await(&function.body);
        let mut body = std::mem::take(&mut function.body);

        if function.is_arrow || suspends {
            let Some(frame) = self.frames.last_mut() else {
                return_compiler_error!("No enclosing frame for an async function");
            };
            let mut capture = ReceiverCapture {
                frame,
                names: &mut self.names,
                bindings: &mut self.bindings,
            };
            capture.statements(&mut body);
        }

        let mut prologue = Vec::new();
        if suspends {
            body = functions_first(body);

            let hoisted = hoist_nested_vars(&mut body);
            if !hoisted.is_empty() {
                prologue.push(declare_names(hoisted));
            }

            let mut ctx = LoweringContext::new(&mut self.names, &mut self.bindings, self.helpers);
            body = rewrite_statements(&mut ctx, body)?;

            if let Some(exit) = ctx.exit_name() {
                prologue.push(declare_names(vec![exit.to_owned()]));
            }
        }

        prologue.append(&mut body);
        function.body = prologue;
        function.is_async = false;
        function.is_arrow = false;

        self.helpers.record(Helper::Async);
        self.outcome.transformed += 1;
        Ok(true)
    }

    fn async_wrapper(&mut self, function: Function) -> Expression {
        self.helpers.record(Helper::Async);
        Expression::call(
            Expression::identifier(Helper::Async.name()),
            vec![Expression::Function(Box::new(function))],
        )
    }
}

#[derive(Clone, Copy)]
enum Receiver {
    This,
    Arguments,
}

/// Replaces `this` and `arguments` with aliases owned by the enclosing frame.
/// Arrow functions share the receiver of their parent, so they are entered.
struct ReceiverCapture<'a> {
    frame: &'a mut Frame,
    names: &'a mut NameGenerator,
    bindings: &'a mut BindingTable,
}

impl ReceiverCapture<'_> {
    fn alias(&mut self, receiver: Receiver) -> String {
        let (slot, base) = match receiver {
            Receiver::This => (&mut self.frame.this_alias, "this"),
            Receiver::Arguments => (&mut self.frame.arguments_alias, "arguments"),
        };

        if let Some(alias) = slot {
            return alias.to_owned();
        }

        let alias = self.names.generate(base);
        self.bindings.register_constant(&alias);
        *slot = Some(alias.to_owned());
        alias
    }

    fn statements(&mut self, statements: &mut [Statement]) {
        for statement in statements {
            self.statement(statement);
        }
    }

    fn statement(&mut self, statement: &mut Statement) {
        if let Statement::FunctionDeclaration(_) = statement {
            return;
        }

        for expression in statement.child_expressions_mut() {
            self.expression(expression);
        }

        for child in statement.child_statements_mut() {
            self.statement(child);
        }
    }

    fn expression(&mut self, expression: &mut Expression) {
        match expression {
            Expression::This => {
                let alias = self.alias(Receiver::This);
                *expression = Expression::identifier(alias);
            }

            Expression::Identifier(name) if name == "arguments" => {
                let alias = self.alias(Receiver::Arguments);
                *expression = Expression::identifier(alias);
            }

            Expression::Function(function) => {
                if function.is_arrow {
                    self.statements(&mut function.body);
                }
            }

            other => {
                for child in other.children_mut() {
                    self.expression(child);
                }
            }
        }
    }
}

// Function declarations are hoisted, so moving them up front is invisible,
// and it keeps them out of the continuations
fn functions_first(body: Vec<Statement>) -> Vec<Statement> {
    let (mut functions, mut rest): (Vec<Statement>, Vec<Statement>) = body
        .into_iter()
        .partition(|statement| matches!(statement, Statement::FunctionDeclaration(_)));

    functions.append(&mut rest);
    functions
}

fn declare_names(names: Vec<String>) -> Statement {
    Statement::VariableDeclaration(VariableDeclaration {
        kind: DeclarationKind::Var,
        declarators: names
            .into_iter()
            .map(|name| Declarator { name, init: None })
            .collect(),
    })
}

/// Nested `var` declarations turn into assignments, and their names are returned so the
/// function can declare them once at the top. Otherwise a declaration that ends up inside
/// a callback would only be visible inside that callback.
fn hoist_nested_vars(body: &mut [Statement]) -> Vec<String> {
    let mut names = Vec::new();

    for statement in body.iter_mut() {
        match statement {
            // Top level declarations and loop heads already live in the function scope
            Statement::VariableDeclaration(_) | Statement::FunctionDeclaration(_) => {}
            Statement::For { body, .. }
            | Statement::ForIn { body, .. }
            | Statement::ForOf { body, .. } => strip_vars(body, &mut names),
            other => {
                for child in other.child_statements_mut() {
                    strip_vars(child, &mut names);
                }
                drop_empty_statements(other);
            }
        }
    }

    names
}

fn strip_vars(statement: &mut Statement, names: &mut Vec<String>) {
    match statement {
        Statement::FunctionDeclaration(_) => return,

        Statement::VariableDeclaration(declaration) => {
            if declaration.kind == DeclarationKind::Var {
                let declarators = std::mem::take(&mut declaration.declarators);
                *statement = match assignments(declarators, names) {
                    Some(assignment) => Statement::Expression(assignment),
                    None => Statement::Empty,
                };
            }
            return;
        }

        Statement::For {
            init: init @ Some(ForInit::Declaration(_)),
            ..
        } => {
            if let Some(ForInit::Declaration(declaration)) = init {
                if declaration.kind == DeclarationKind::Var {
                    let declarators = std::mem::take(&mut declaration.declarators);
                    *init = assignments(declarators, names).map(ForInit::Expression);
                }
            }
        }

        Statement::ForIn { left, .. } | Statement::ForOf { left, .. } => {
            if left.kind == Some(DeclarationKind::Var) {
                push_name(names, &left.name);
                left.kind = None;
            }
        }

        _ => {}
    }

    for child in statement.child_statements_mut() {
        strip_vars(child, names);
    }
    drop_empty_statements(statement);
}

fn assignments(declarators: Vec<Declarator>, names: &mut Vec<String>) -> Option<Expression> {
    let mut assignments = Vec::new();
    for declarator in declarators {
        push_name(names, &declarator.name);
        if let Some(init) = declarator.init {
            assignments.push(Expression::assign(
                Expression::identifier(declarator.name),
                init,
            ));
        }
    }

    match assignments.len() {
        0 => None,
        1 => assignments.pop(),
        _ => Some(Expression::Sequence(assignments)),
    }
}

fn push_name(names: &mut Vec<String>, name: &str) {
    if !names.iter().any(|existing| existing == name) {
        names.push(name.to_owned());
    }
}

// Removed declarations leave empty statements behind in statement lists
fn drop_empty_statements(statement: &mut Statement) {
    let is_empty = |statement: &Statement| matches!(statement, Statement::Empty);

    match statement {
        Statement::Block(body) => body.retain(|statement| !is_empty(statement)),
        Statement::Switch { cases, .. } => {
            for case in cases {
                case.consequent.retain(|statement| !is_empty(statement));
            }
        }
        Statement::Try {
            block,
            handler,
            finalizer,
        } => {
            block.retain(|statement| !is_empty(statement));
            if let Some(handler) = handler {
                handler.body.retain(|statement| !is_empty(statement));
            }
            if let Some(finalizer) = finalizer {
                finalizer.retain(|statement| !is_empty(statement));
            }
        }
        _ => {}
    }
}
