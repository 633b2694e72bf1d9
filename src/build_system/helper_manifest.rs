use crate::backends::js::runtime_helpers::Helper;
use crate::compiler_frontend::LoweredUnit;
use crate::compiler_frontend::async_lowering::helper_usage::HelperUsage;
use crate::compiler_frontend::compiler_errors::CompilerError;
use serde::Serialize;
use std::path::Path;

/// Which runtime helpers a build references, written next to the output as JSON.
/// Helpers are listed in emission order, dependencies included.
#[derive(Debug, Default, Serialize)]
pub struct HelperManifest {
    pub helpers: Vec<Helper>,
    pub files: Vec<FileManifest>,
}

#[derive(Debug, Serialize)]
pub struct FileManifest {
    pub path: String,
    pub helpers: Vec<Helper>,
    pub transformed: usize,
    pub skipped: usize,
}

impl HelperManifest {
    pub fn add_file(&mut self, relative_path: &Path, unit: &LoweredUnit) {
        self.files.push(FileManifest {
            // Forward slashes so the manifest reads the same on every platform
            path: relative_path.to_string_lossy().replace('\\', "/"),
            helpers: unit.helpers.emission_order(),
            transformed: unit.outcome.transformed,
            skipped: unit.outcome.skipped,
        });
    }

    pub fn set_helpers(&mut self, usage: &HelperUsage) {
        self.helpers = usage.emission_order();
    }

    pub fn to_json(&self) -> Result<String, CompilerError> {
        match serde_json::to_string_pretty(self) {
            Ok(json) => Ok(json),
            Err(e) => Err(CompilerError::compiler_error(format!(
                "Could not serialize the helper manifest: {e}"
            ))),
        }
    }
}
