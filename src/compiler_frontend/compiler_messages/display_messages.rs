use crate::compiler_frontend::compiler_messages::compiler_errors::{
    CompilerError, CompilerMessages, ErrorMetaDataKey, ErrorType, error_type_to_str,
};
use crate::compiler_frontend::compiler_messages::compiler_warnings::print_formatted_warning;
use saying::say;
use std::path::{Path, PathBuf};
use std::{env, fs};

fn normalize_display_path(path: &Path) -> PathBuf {
    let path_string = path.to_string_lossy();
    if let Some(stripped) = path_string.strip_prefix(r"\\?\") {
        return PathBuf::from(stripped);
    }

    path.to_path_buf()
}

pub fn relative_display_path(scope: &Path) -> String {
    let normalized_scope = normalize_display_path(scope);

    match env::current_dir() {
        Ok(dir) => {
            let normalized_dir = normalize_display_path(&dir);
            normalized_scope
                .strip_prefix(&normalized_dir)
                .unwrap_or(&normalized_scope)
                .to_string_lossy()
                .to_string()
        }
        Err(err) => {
            say!(Red "Could not read the current directory to shorten the error path: ", err);
            normalized_scope.to_string_lossy().to_string()
        }
    }
}

pub fn print_compiler_messages(messages: CompilerMessages, show_warnings: bool) {
    for err in messages.errors {
        print_formatted_error(err);
    }

    if !show_warnings {
        return;
    }

    for warning in messages.warnings {
        print_formatted_warning(warning);
    }
}

pub fn print_formatted_error(e: CompilerError) {
    let relative_dir = relative_display_path(&e.location.scope);
    let line_number = e.location.start_pos.line_number.max(0) as usize;

    match e.error_type {
        ErrorType::Syntax => {
            if !relative_dir.is_empty() {
                say!("\n(╯°□°)╯  ", Dark Magenta relative_dir);
            }

            let label = error_type_to_str(&e.error_type);
            say!(Red label);
            say!(Dark Magenta "Line ", Bright {line_number + 1});
        }

        ErrorType::File => {
            say!(Yellow "Can't find/read file or directory: ", relative_dir);
            say!(e.msg);
            return;
        }

        ErrorType::Compiler => {
            if !relative_dir.is_empty() {
                say!("\nヽ༼☉ ‿ ⚆༽ﾉ  ", Dark Magenta relative_dir);
            }
            say!(Yellow "COMPILER BUG - ");
            say!(Dark Yellow "the async lowering broke one of its own rules (not your fault)");
        }

        ErrorType::Config => {
            if !relative_dir.is_empty() {
                say!("\n (-_-)  ", Dark Magenta relative_dir);
            }
            say!(Yellow "CONFIG FILE ISSUE - ");
            say!(Dark Yellow "Malformed config file");
            say!(Red e.msg);
            return;
        }
    }

    say!(Red e.msg);

    if let Some(suggestion) = e.metadata.get(&ErrorMetaDataKey::PrimarySuggestion) {
        say!(Dark Yellow "Suggestion: ", *suggestion);
    }

    // Compiler bugs don't always carry a real source position
    let line = match fs::read_to_string(normalize_display_path(&e.location.scope)) {
        Ok(file) => file
            .lines()
            .nth(line_number)
            .unwrap_or_default()
            .to_string(),
        Err(_) => return,
    };

    println!("\n{line}");

    print!(
        "{}",
        " ".repeat((e.location.start_pos.char_column - 1).max(0) as usize)
    );

    let length_of_underline =
        (e.location.end_pos.char_column - e.location.start_pos.char_column + 1).max(1) as usize;
    say!(Red { "^".repeat(length_of_underline) });
}
