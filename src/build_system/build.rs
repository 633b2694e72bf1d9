use crate::build_system::helper_manifest::HelperManifest;
use crate::compiler_frontend::async_lowering::helper_usage::HelperUsage;
use crate::compiler_frontend::compiler_errors::{CompilerError, CompilerMessages};
use crate::compiler_frontend::{CompilerFrontend, Flag, LoweredUnit};
use crate::settings::{Config, JS_FILE_EXTENSION, LIKELY_FILE_COUNT, MANIFEST_FILE_NAME};
use crate::{return_file_error, return_messages_with_err, timer_log};
use rayon::prelude::*;
use saying::say;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

// Directories that never hold sources worth lowering
const SKIPPED_DIRECTORIES: [&str; 2] = ["node_modules", ".git"];

pub struct InputFile {
    pub source_code: String,
    pub source_path: PathBuf,

    // Where the file sits relative to the project, mirrored in the output directory
    pub relative_path: PathBuf,
}

pub struct OutputFile {
    pub full_file_path: PathBuf,
    file_kind: FileKind,
}

pub enum FileKind {
    Js(String),
    Json(String),
}

impl OutputFile {
    pub fn new(full_file_path: PathBuf, file_kind: FileKind) -> Self {
        Self {
            full_file_path,
            file_kind,
        }
    }

    pub(crate) fn file_kind(&self) -> &FileKind {
        &self.file_kind
    }
}

/// Everything a build produces before any of it is written.
pub struct Project {
    pub output_files: Vec<OutputFile>,
    pub helpers: HelperUsage,
    pub manifest: HelperManifest,
    pub messages: CompilerMessages,
}

/// Settings only relevant to one build, on top of the config file.
#[derive(Debug, Default)]
pub struct BuildOptions {
    pub flags: Vec<Flag>,
    pub output_dir: Option<PathBuf>,
}

/// Lowers a single file or every JS file under a directory,
/// then writes the results into the configured output directory.
pub fn build_project(entry_path: &str, options: &BuildOptions) -> CompilerMessages {
    let time = Instant::now();
    let mut messages = CompilerMessages::new();

    let valid_path = match check_if_valid_path(entry_path) {
        Ok(path) => path,
        Err(e) => return_messages_with_err!(messages, e),
    };

    let project_dir = match valid_path.is_dir() {
        true => valid_path.to_owned(),
        false => valid_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default(),
    };

    let mut config = match Config::load(&project_dir) {
        Ok(config) => config,
        Err(e) => return_messages_with_err!(messages, e),
    };
    apply_options(&mut config, options);

    let output_dir = project_dir.join(&config.output.dir);
    let input_files = match discover_source_files(&valid_path, &project_dir, &output_dir) {
        Ok(files) => files,
        Err(e) => return_messages_with_err!(messages, e),
    };

    if input_files.is_empty() {
        say!(Yellow "No .js files found in ", Bright valid_path.to_string_lossy().to_string());
        return messages;
    }

    let project = build_outputs(input_files, &config, &output_dir);
    if !project.messages.errors.is_empty() {
        return project.messages;
    }

    let file_count = project.output_files.len();
    messages.extend(project.messages);

    for output_file in project.output_files {
        if let Err(e) = write_output_file(&output_file) {
            return_messages_with_err!(messages, e);
        }
    }

    if !options.flags.contains(&Flag::DisableTimers) {
        say!(
            "\nWrote ",
            Blue file_count,
            Reset " files in: ",
            Green Bold #time.elapsed()
        );
    }

    messages
}

/// CLI flags take priority over the config file.
pub fn apply_options(config: &mut Config, options: &BuildOptions) {
    if options.flags.contains(&Flag::NoHelpers) {
        config.output.emit_helpers = false;
    }

    if options.flags.contains(&Flag::WriteManifest) {
        config.output.manifest = true;
    }

    if let Some(dir) = &options.output_dir {
        config.output.dir = dir.to_owned();
    }
}

/// Runs every file through the frontend in parallel.
/// Each file owns its own helper usage, they are merged once every file is done.
pub fn build_outputs(input_files: Vec<InputFile>, config: &Config, output_dir: &Path) -> Project {
    let time = Instant::now();
    let frontend = CompilerFrontend::new(config);

    let results: Vec<Result<LoweredUnit, CompilerError>> = input_files
        .par_iter()
        .map(|file| frontend.lower_source(&file.source_code, &file.source_path))
        .collect();
    timer_log!(time, "Lowered every file in: ");

    let mut project = Project {
        output_files: Vec::with_capacity(input_files.len() + 1),
        helpers: HelperUsage::default(),
        manifest: HelperManifest::default(),
        messages: CompilerMessages::new(),
    };

    for (file, result) in input_files.iter().zip(results) {
        let unit = match result {
            Ok(unit) => unit,
            Err(e) => {
                project.messages.errors.push(e);
                continue;
            }
        };

        project.helpers.merge(&unit.helpers);
        project.manifest.add_file(&file.relative_path, &unit);

        let code = match config.output.emit_helpers {
            true => unit.code_with_helpers(),
            false => unit.code.to_owned(),
        };

        project.output_files.push(OutputFile::new(
            output_dir.join(&file.relative_path),
            FileKind::Js(code),
        ));
        project.messages.warnings.extend(unit.outcome.warnings);
    }

    project.manifest.set_helpers(&project.helpers);

    if config.output.manifest {
        match project.manifest.to_json() {
            Ok(json) => project.output_files.push(OutputFile::new(
                output_dir.join(MANIFEST_FILE_NAME),
                FileKind::Json(json),
            )),
            Err(e) => project.messages.errors.push(e),
        }
    }

    project
}

/// A single file is its own project. A directory is walked for `.js` files,
/// skipping the output directory so a second build doesn't lower its own output.
pub fn discover_source_files(
    entry_path: &Path,
    project_dir: &Path,
    output_dir: &Path,
) -> Result<Vec<InputFile>, CompilerError> {
    let mut source_paths = Vec::with_capacity(LIKELY_FILE_COUNT);

    if entry_path.is_dir() {
        collect_js_files(entry_path, output_dir, &mut source_paths)?;
    } else {
        source_paths.push(entry_path.to_path_buf());
    }

    // Stable order for the manifest and for error reporting
    source_paths.sort();

    let mut files = Vec::with_capacity(source_paths.len());
    for source_path in source_paths {
        let source_code = match fs::read_to_string(&source_path) {
            Ok(source) => source,
            Err(e) => return_file_error!(&source_path, format!("Could not read file: {e}")),
        };

        let relative_path = source_path
            .strip_prefix(project_dir)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| PathBuf::from(source_path.file_name().unwrap_or_default()));

        files.push(InputFile {
            source_code,
            source_path,
            relative_path,
        });
    }

    Ok(files)
}

fn collect_js_files(
    dir: &Path,
    output_dir: &Path,
    found: &mut Vec<PathBuf>,
) -> Result<(), CompilerError> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => return_file_error!(dir, format!("Could not read directory: {e}")),
    };

    for entry in entries {
        let path = match entry {
            Ok(entry) => entry.path(),
            Err(e) => return_file_error!(dir, format!("Could not read directory entry: {e}")),
        };

        if path.is_dir() {
            let skipped = path == output_dir
                || path
                    .file_name()
                    .is_some_and(|name| SKIPPED_DIRECTORIES.iter().any(|skip| name == *skip));

            if !skipped {
                collect_js_files(&path, output_dir, found)?;
            }
            continue;
        }

        if path.extension().is_some_and(|ext| ext == JS_FILE_EXTENSION) {
            found.push(path);
        }
    }

    Ok(())
}

fn write_output_file(output_file: &OutputFile) -> Result<(), CompilerError> {
    let path = &output_file.full_file_path;

    // A safety check so nothing is written over the current directory by mistake
    if path.as_os_str().is_empty() {
        return Err(CompilerError::compiler_error(
            "Output file did not have a path set",
        ));
    }

    if let Some(parent) = path.parent() {
        if let Err(e) = fs::create_dir_all(parent) {
            return_file_error!(parent, format!("Could not create the output directory: {e}"));
        }
    }

    let content = match output_file.file_kind() {
        FileKind::Js(code) => code,
        FileKind::Json(json) => json,
    };

    if let Err(e) = fs::write(path, content) {
        return_file_error!(path, format!("Error writing file: {e}"));
    }

    Ok(())
}

fn check_if_valid_path(entry_path: &str) -> Result<PathBuf, CompilerError> {
    let path = match entry_path.is_empty() {
        true => PathBuf::from("."),
        false => PathBuf::from(entry_path),
    };

    if !path.exists() {
        return_file_error!(&path, format!("Path does not exist: {}", path.display()), {
            PrimarySuggestion => "Pass a .js file or a directory containing .js files",
        });
    }

    Ok(path)
}

#[cfg(test)]
#[path = "tests/build_tests.rs"]
mod build_tests;
