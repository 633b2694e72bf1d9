pub(crate) mod ast;
pub(crate) mod async_lowering;
pub(crate) mod tokenizer {
    pub(crate) mod tokenizer;
    pub(crate) mod tokens;
}

pub(crate) mod compiler_messages {
    pub(crate) mod compiler_dev_logging;
    pub(crate) mod compiler_errors;
    pub(crate) mod compiler_warnings;
    pub(crate) mod display_messages;
}
pub(crate) use compiler_messages::compiler_errors;
pub(crate) use compiler_messages::display_messages;

use crate::backends::js::{JsPrinterConfig, print_program};
use crate::compiler_frontend::ast::ast_nodes::Program;
use crate::compiler_frontend::ast::parser::parse_program;
use crate::compiler_frontend::async_lowering::helper_usage::HelperUsage;
use crate::compiler_frontend::async_lowering::program_walker::{LoweringOutcome, lower_program};
use crate::compiler_frontend::compiler_errors::CompilerError;
use crate::compiler_frontend::tokenizer::tokenizer::tokenize;
use crate::compiler_frontend::tokenizer::tokens::FileTokens;
use crate::settings::Config;
use crate::{codegen_log, timer_log};
use std::path::Path;
use std::time::Instant;

/// Flags change the behavior of a single run of the pipeline.
/// For the built-in CLI these are added as cli flags and take priority over the config file.
#[derive(PartialEq, Debug, Clone)]
pub enum Flag {
    DisableWarnings,
    DisableTimers,

    // Don't prepend the runtime helpers to each output file
    NoHelpers,

    // Write a JSON manifest of the helpers each file references
    WriteManifest,
}

/// One source file after it has been through every stage.
#[derive(Debug)]
pub struct LoweredUnit {
    pub code: String,
    pub helpers: HelperUsage,
    pub outcome: LoweringOutcome,
}

impl LoweredUnit {
    /// The lowered code with the helpers it references placed in front.
    pub fn code_with_helpers(&self) -> String {
        let helpers = self.helpers.render();
        if helpers.is_empty() {
            return self.code.to_owned();
        }

        format!("{helpers}\n{}", self.code)
    }
}

pub struct CompilerFrontend {
    printer: JsPrinterConfig,
}

impl CompilerFrontend {
    pub fn new(config: &Config) -> Self {
        Self {
            printer: JsPrinterConfig::from(&config.printer),
        }
    }

    /// -----------------------------
    /// TOKENIZER
    /// -----------------------------
    pub fn source_to_tokens(
        &self,
        source_code: &str,
        src_path: &Path,
    ) -> Result<FileTokens, CompilerError> {
        match tokenize(source_code, src_path) {
            Ok(tokens) => Ok(tokens),
            Err(e) => Err(e.with_file_path(src_path.to_path_buf())),
        }
    }

    /// -----------------------------
    /// AST CREATION
    /// -----------------------------
    pub fn tokens_to_ast(&self, tokens: FileTokens) -> Result<Program, CompilerError> {
        let src_path = tokens.src_path.to_owned();
        match parse_program(tokens) {
            Ok(program) => Ok(program),
            Err(e) => Err(e.with_file_path(src_path)),
        }
    }

    /// -----------------------------
    /// ASYNC LOWERING
    /// -----------------------------
    /// Every async function in the program is rewritten in place.
    /// Functions that can't be rewritten are left as written and reported as warnings.
    pub fn lower_async(
        &self,
        program: &mut Program,
        helpers: &mut HelperUsage,
    ) -> Result<LoweringOutcome, CompilerError> {
        let src_path = program.src_path.to_owned();
        match lower_program(program, helpers) {
            Ok(outcome) => Ok(outcome),
            Err(e) => Err(e.with_file_path(src_path)),
        }
    }

    /// -----------------------------
    /// JS GENERATION
    /// -----------------------------
    pub fn ast_to_js(&self, program: &Program) -> String {
        let code = print_program(program, &self.printer);
        codegen_log!("Generated ", Bright {code.len()}, " bytes of JS");
        code
    }

    /// Runs every stage over one file.
    pub fn lower_source(
        &self,
        source_code: &str,
        src_path: &Path,
    ) -> Result<LoweredUnit, CompilerError> {
        let time = Instant::now();
        let tokens = self.source_to_tokens(source_code, src_path)?;
        timer_log!(time, "Tokenized in: ");

        let time = Instant::now();
        let mut program = self.tokens_to_ast(tokens)?;
        timer_log!(time, "AST created in: ");

        let time = Instant::now();
        let mut helpers = HelperUsage::default();
        let outcome = self.lower_async(&mut program, &mut helpers)?;
        timer_log!(time, "Async functions lowered in: ");

        let time = Instant::now();
        let code = self.ast_to_js(&program);
        timer_log!(time, "JS generated in: ");

        Ok(LoweredUnit {
            code,
            helpers,
            outcome,
        })
    }
}

#[cfg(test)]
#[path = "tests/frontend_tests.rs"]
mod frontend_tests;
