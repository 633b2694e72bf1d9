use crate::compiler_frontend::compiler_messages::compiler_warnings::CompilerWarning;
use crate::compiler_frontend::tokenizer::tokens::{CharPosition, TextLocation};
use rustc_hash::FxHashMap;
use std::path::{Path, PathBuf};

// The final set of errors and warnings emitted from a build
#[derive(Debug, Default)]
pub struct CompilerMessages {
    pub errors: Vec<CompilerError>,
    pub warnings: Vec<CompilerWarning>,
}

impl CompilerMessages {
    pub fn new() -> Self {
        CompilerMessages {
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn from_error(error: CompilerError) -> Self {
        CompilerMessages {
            errors: vec![error],
            warnings: Vec::new(),
        }
    }

    pub fn extend(&mut self, other: CompilerMessages) {
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }
}

#[derive(Debug, Eq, Hash, PartialEq, Clone, Copy)]
pub enum ErrorMetaDataKey {
    CompilationStage,

    // Optional suggestions
    PrimarySuggestion,
    SuggestedInsertion,

    // What the parser was looking for
    ExpectedToken,
}

#[derive(Debug, Clone)]
pub struct CompilerError {
    pub msg: String,

    // The scope is the source file the error came from
    pub location: TextLocation,
    pub error_type: ErrorType,

    pub metadata: FxHashMap<ErrorMetaDataKey, &'static str>,
}

impl CompilerError {
    pub fn new(
        msg: impl Into<String>,
        location: TextLocation,
        error_type: ErrorType,
    ) -> CompilerError {
        CompilerError {
            msg: msg.into(),
            location,
            error_type,
            metadata: FxHashMap::default(),
        }
    }

    pub fn with_file_path(mut self, file_path: PathBuf) -> Self {
        self.location.scope = file_path;
        self
    }

    /// Malformed input the parser could not make sense of.
    pub fn new_syntax_error(msg: impl Into<String>, location: TextLocation) -> Self {
        CompilerError::new(msg, location, ErrorType::Syntax)
    }

    /// An internal invariant of the lowering pipeline was broken.
    /// Always a bug in this tool, never in the user's code.
    pub fn compiler_error(msg: impl Into<String>) -> Self {
        CompilerError::new(msg, TextLocation::default(), ErrorType::Compiler)
    }

    pub fn file_error(path: &Path, msg: impl Into<String>) -> Self {
        CompilerError::new(
            msg,
            TextLocation::new(
                path.to_path_buf(),
                CharPosition::default(),
                CharPosition::default(),
            ),
            ErrorType::File,
        )
    }

    pub fn new_file_error(
        path: &Path,
        msg: impl Into<String>,
        metadata: FxHashMap<ErrorMetaDataKey, &'static str>,
    ) -> Self {
        let mut error = CompilerError::file_error(path, msg);
        error.metadata = metadata;
        error
    }

    pub fn config_error(msg: impl Into<String>, location: TextLocation) -> Self {
        CompilerError::new(msg, location, ErrorType::Config)
    }
}

#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum ErrorType {
    Syntax,
    Compiler,
    File,
    Config,
}

pub fn error_type_to_str(e_type: &ErrorType) -> &'static str {
    match e_type {
        ErrorType::Syntax => "Syntax",
        ErrorType::Compiler => "Compiler Bug",
        ErrorType::File => "File Error",
        ErrorType::Config => "Malformed Config",
    }
}

/// Returns a new CompilerError for source the parser can't read.
///
/// Usage:
/// `return_syntax_error!("message", location, {
///     ExpectedToken => ")",
///     PrimarySuggestion => "Close the call arguments",
/// })`;
#[macro_export]
macro_rules! return_syntax_error {
    ($msg:expr, $loc:expr, { $( $key:ident => $value:expr ),* $(,)? }) => {
        return Err($crate::compiler_frontend::compiler_messages::compiler_errors::CompilerError {
            msg: $msg.into(),
            location: $loc,
            error_type: $crate::compiler_frontend::compiler_messages::compiler_errors::ErrorType::Syntax,
            metadata: {
                let mut map = rustc_hash::FxHashMap::default();
                $(
                    map.insert($crate::compiler_frontend::compiler_messages::compiler_errors::ErrorMetaDataKey::$key, $value);
                )*
                map
            },
        })
    };
    ($msg:expr, $loc:expr) => {
        return Err($crate::compiler_frontend::compiler_messages::compiler_errors::CompilerError::new_syntax_error(
            $msg, $loc,
        ))
    };
}

/// Returns a new CompilerError for an internal lowering bug.
///
/// Usage: `return_compiler_error!("Missing placeholder for {}", name)`;
#[macro_export]
macro_rules! return_compiler_error {
    ($($msg:tt)+) => {
        return Err($crate::compiler_frontend::compiler_messages::compiler_errors::CompilerError::compiler_error(
            format!($($msg)+),
        ))
    };
}

/// Usage: `return_file_error!(path, "message", { metadata })`;
#[macro_export]
macro_rules! return_file_error {
    ($path:expr, $msg:expr, { $( $key:ident => $value:expr ),* $(,)? }) => {{
        return Err($crate::compiler_frontend::compiler_messages::compiler_errors::CompilerError::new_file_error(
            $path,
            $msg,
            {
                let mut map = rustc_hash::FxHashMap::default();
                $( map.insert($crate::compiler_frontend::compiler_messages::compiler_errors::ErrorMetaDataKey::$key, $value); )*
                map
            },
        ));
    }};
    ($path:expr, $msg:expr) => {{
        return Err($crate::compiler_frontend::compiler_messages::compiler_errors::CompilerError::file_error(
            $path, $msg,
        ));
    }};
}

/// Usage: `return_config_error!("message", location)`;
#[macro_export]
macro_rules! return_config_error {
    ($msg:expr, $location:expr) => {
        return Err($crate::compiler_frontend::compiler_messages::compiler_errors::CompilerError::config_error(
            $msg, $location,
        ))
    };
}

/// Pushes an error onto a CompilerMessages and returns the messages.
///
/// Usage: `return_messages_with_err!(messages, error)`;
#[macro_export]
macro_rules! return_messages_with_err {
    ($messages:expr, $error:expr) => {{
        $messages.errors.push($error);
        return $messages;
    }};
}
