//! JavaScript printer.
//!
//! Turns the (possibly lowered) AST back into readable JavaScript source.
//! Statements are streamed line by line into `out`; expressions are rendered to strings,
//! with function expressions rendering their bodies through a nested emitter.

mod js_expr;
mod js_statement;
pub(crate) mod runtime_helpers;

#[cfg(test)]
mod tests;

use crate::compiler_frontend::ast::ast_nodes::{Program, Statement};
use crate::settings::PrinterConfig;

/// Configuration for printing.
#[derive(Debug, Clone)]
pub struct JsPrinterConfig {
    /// Indent nested blocks. Without this every line starts at column zero.
    pub pretty: bool,
    pub indent_width: usize,
}

impl Default for JsPrinterConfig {
    fn default() -> Self {
        Self {
            pretty: true,
            indent_width: 4,
        }
    }
}

impl From<&PrinterConfig> for JsPrinterConfig {
    fn from(config: &PrinterConfig) -> Self {
        Self {
            pretty: config.pretty,
            indent_width: config.indent_width,
        }
    }
}

pub fn print_program(program: &Program, config: &JsPrinterConfig) -> String {
    print_statements(&program.body, config)
}

pub fn print_statements(statements: &[Statement], config: &JsPrinterConfig) -> String {
    let mut emitter = JsEmitter::new(config.to_owned(), 0);
    emitter.emit_statements(statements);
    emitter.out
}

pub(crate) struct JsEmitter {
    pub(crate) config: JsPrinterConfig,
    pub(crate) out: String,
    pub(crate) indent: usize,
}

impl JsEmitter {
    pub(crate) fn new(config: JsPrinterConfig, indent: usize) -> Self {
        Self {
            config,
            out: String::new(),
            indent,
        }
    }

    pub(crate) fn indentation(&self, depth: usize) -> String {
        if !self.config.pretty {
            return String::new();
        }

        " ".repeat(depth * self.config.indent_width)
    }

    pub(crate) fn emit_line(&mut self, line: &str) {
        let prefix = self.indentation(self.indent);
        self.out.push_str(&prefix);
        self.out.push_str(line);
        self.out.push('\n');
    }

    pub(crate) fn with_indent<F>(&mut self, mut callback: F)
    where
        F: FnMut(&mut Self),
    {
        self.indent += 1;
        callback(self);
        self.indent -= 1;
    }
}

pub(crate) fn escape_js_string(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len() + 2);
    escaped.push('"');

    for ch in value.chars() {
        match ch {
            '"' => escaped.push_str("\\\""),
            '\\' => escaped.push_str("\\\\"),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\t' => escaped.push_str("\\t"),
            '\u{2028}' => escaped.push_str("\\u2028"),
            '\u{2029}' => escaped.push_str("\\u2029"),
            ch if ch.is_control() => escaped.push_str(&format!("\\u{:04x}", ch as u32)),
            ch => escaped.push(ch),
        }
    }

    escaped.push('"');
    escaped
}

pub(crate) fn format_number(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_owned()
    } else if value.is_infinite() {
        if value.is_sign_positive() {
            "Infinity".to_owned()
        } else {
            "-Infinity".to_owned()
        }
    } else {
        // Display drops the trailing ".0" of integral values
        value.to_string()
    }
}
