//! Lowers JavaScript `async` functions into plain functions that sequence their
//! suspension points through a small library of promise combinators.

pub mod settings;

pub(crate) mod backends {
    pub(crate) mod js;
}
pub(crate) mod build_system {
    pub(crate) mod build;
    pub(crate) mod helper_manifest;
}
pub(crate) mod compiler_frontend;
pub(crate) mod projects;

pub use backends::js::runtime_helpers::Helper;
pub use build_system::build::{BuildOptions, build_project};
pub use compiler_frontend::compiler_errors::{CompilerError, CompilerMessages, ErrorType};
pub use compiler_frontend::{CompilerFrontend, Flag, LoweredUnit};
pub use projects::cli::start_cli;

use crate::settings::Config;
use std::path::Path;

/// Lowers one unit of source with the default settings.
pub fn lower_source(source_code: &str, src_path: &Path) -> Result<LoweredUnit, CompilerError> {
    let config = Config::default();
    CompilerFrontend::new(&config).lower_source(source_code, src_path)
}
