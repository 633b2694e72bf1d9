//! Tests for CLI command and flag parsing.

use super::{Command, all_helpers_source, get_command, get_flags};
use crate::compiler_frontend::Flag;
use std::path::PathBuf;

fn args(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

#[test]
fn build_command_takes_a_path() {
    let command = get_command(&args(&["build", "src"])).expect("command should parse");
    assert_eq!(
        command,
        Command::Build {
            path: String::from("src"),
            output_dir: None,
        }
    );
}

#[test]
fn build_command_without_a_path_uses_the_current_directory() {
    let command = get_command(&args(&["build"])).expect("command should parse");
    assert_eq!(
        command,
        Command::Build {
            path: String::new(),
            output_dir: None,
        }
    );
}

#[test]
fn build_command_parses_the_output_directory() {
    let command = get_command(&args(&["build", "--manifest", "src", "--out", "dist"]))
        .expect("command should parse");
    assert_eq!(
        command,
        Command::Build {
            path: String::from("src"),
            output_dir: Some(PathBuf::from("dist")),
        }
    );
}

#[test]
fn build_command_rejects_missing_out_values() {
    let error = get_command(&args(&["build", "src", "--out"])).expect_err("missing value");
    assert!(error.contains("Missing value for --out"));

    let error =
        get_command(&args(&["build", "src", "--out", "--manifest"])).expect_err("flag as value");
    assert!(error.contains("Missing value for --out"));
}

#[test]
fn build_command_rejects_unknown_flags() {
    let error = get_command(&args(&["build", "src", "--watch"])).expect_err("unknown flag");
    assert!(error.contains("Unknown build flag"));
}

#[test]
fn build_command_accepts_one_path() {
    let error = get_command(&args(&["build", "a", "b"])).expect_err("two paths");
    assert!(error.contains("at most one path"));
}

#[test]
fn unknown_commands_are_rejected() {
    let error = get_command(&args(&["dev"])).expect_err("not a command");
    assert!(error.contains("'dev'"));
}

#[test]
fn helpers_and_help_commands_parse() {
    assert_eq!(get_command(&args(&["helpers"])), Ok(Command::Helpers));
    assert_eq!(get_command(&args(&["help"])), Ok(Command::Help));
}

#[test]
fn flags_are_collected_from_anywhere() {
    let flags = get_flags(&args(&[
        "unawait",
        "build",
        "--no-helpers",
        "src",
        "--manifest",
        "--hide-timers",
    ]));
    assert_eq!(
        flags,
        vec![Flag::NoHelpers, Flag::WriteManifest, Flag::DisableTimers]
    );
}

#[test]
fn helper_library_is_printed_dependency_first() {
    let source = all_helpers_source();

    let position = |name: &str| {
        source
            .find(&format!("function {name}("))
            .unwrap_or_else(|| panic!("{name} missing from the helper library"))
    };

    assert!(position("__async") < position("__await"));
    assert!(position("__for") < position("__do"));
    assert!(position("__try") < position("__finally"));
    assert!(source.contains("function __empty("));
}
