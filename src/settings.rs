use crate::compiler_frontend::compiler_errors::CompilerError;
use crate::compiler_frontend::tokenizer::tokens::{CharPosition, TextLocation};
use crate::{return_config_error, return_file_error};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const JS_FILE_EXTENSION: &str = "js";
pub const CONFIG_FILE_NAME: &str = "unawait.toml";
pub const DEFAULT_OUTPUT_DIR: &str = "lowered";
pub const MANIFEST_FILE_NAME: &str = "unawait-manifest.json";

// This is a guess about how much should be initially allocated for the token vec.
// Just a heuristic from small hand-written files, it only needs to avoid most reallocations.
pub const SRC_TO_TOKEN_RATIO: usize = 4; // About 1/4 source bytes to tokens observed
pub const LIKELY_FILE_COUNT: usize = 16;

/// Project settings read from `unawait.toml`.
/// Every key is optional, missing tables and keys fall back to the defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub output: OutputConfig,
    pub printer: PrinterConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// Relative paths are resolved against the directory holding the config file
    pub dir: PathBuf,

    /// Prepend the referenced runtime helpers to each output file
    pub emit_helpers: bool,

    pub manifest: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        OutputConfig {
            dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            emit_helpers: true,
            manifest: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PrinterConfig {
    pub pretty: bool,
    pub indent_width: usize,
}

impl Default for PrinterConfig {
    fn default() -> Self {
        PrinterConfig {
            pretty: true,
            indent_width: 4,
        }
    }
}

impl Config {
    /// Reads the config file from the project directory.
    /// A project without one gets the default config.
    pub fn load(project_dir: &Path) -> Result<Config, CompilerError> {
        let config_path = project_dir.join(CONFIG_FILE_NAME);
        if !config_path.is_file() {
            return Ok(Config::default());
        }

        let source = match fs::read_to_string(&config_path) {
            Ok(source) => source,
            Err(e) => return_file_error!(
                &config_path,
                format!("Could not read the config file: {e}")
            ),
        };

        Config::from_toml(&source, &config_path)
    }

    pub fn from_toml(source: &str, config_path: &Path) -> Result<Config, CompilerError> {
        match toml::from_str::<Config>(source) {
            Ok(config) => Ok(config),
            Err(e) => {
                let start = e.span().map(|span| span.start).unwrap_or_default();
                let location = TextLocation::new(
                    config_path.to_path_buf(),
                    position_of(source, start),
                    position_of(source, start),
                );
                return_config_error!(e.message().trim().to_owned(), location)
            }
        }
    }
}

fn position_of(source: &str, byte_offset: usize) -> CharPosition {
    let before = source.get(..byte_offset).unwrap_or(source);
    let line_start = before.rfind('\n').map_or(0, |newline| newline + 1);

    CharPosition {
        line_number: before.matches('\n').count() as i32,
        char_column: before[line_start..].chars().count() as i32 + 1,
    }
}

#[cfg(test)]
#[path = "tests/settings_tests.rs"]
mod settings_tests;
