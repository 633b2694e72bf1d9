//! Command-line entrypoints for unawait.
//!
//! This module parses CLI commands and flags and dispatches them into the build pipeline.

use crate::backends::js::runtime_helpers::{ALL_HELPERS, Helper, render_helpers};
use crate::build_system::build::{self, BuildOptions};
use crate::compiler_frontend::Flag;
use crate::compiler_frontend::display_messages::print_compiler_messages;
use rustc_hash::FxHashSet;
use saying::say;
use std::env;
use std::path::PathBuf;

#[derive(Debug, PartialEq, Eq)]
enum Command {
    // Lowers a file or every .js file under a directory
    Build {
        path: String,
        output_dir: Option<PathBuf>,
    },

    // Prints the runtime helper library
    Helpers,

    Help,
}

pub fn start_cli() {
    let compiler_args: Vec<String> = env::args().collect();

    if compiler_args.len() < 2 {
        print_help(false);
        return;
    }

    let command = match get_command(&compiler_args[1..]) {
        Ok(command) => command,
        Err(e) => {
            say!(Red e);
            print_help(true);
            return;
        }
    };

    // Gather a list of any additional flags
    let flags = get_flags(&compiler_args);

    match command {
        Command::Help => {
            print_help(false);
        }

        Command::Helpers => {
            print!("{}", all_helpers_source());
        }

        Command::Build { path, output_dir } => {
            let show_warnings = !flags.contains(&Flag::DisableWarnings);
            let options = BuildOptions { flags, output_dir };
            let messages = build::build_project(&path, &options);
            print_compiler_messages(messages, show_warnings);
        }
    }
}

fn get_command(args: &[String]) -> Result<Command, String> {
    let command = args.first().map(String::as_str);

    match command {
        Some("help") | Some("--help") => Ok(Command::Help),
        Some("helpers") => Ok(Command::Helpers),
        Some("build") => parse_build_command(args),
        Some(other) => Err(format!("Invalid command: '{other}'")),
        None => Ok(Command::Help),
    }
}

fn get_flags(args: &[String]) -> Vec<Flag> {
    let mut flags = Vec::new();

    for arg in args {
        match arg.as_str() {
            "--hide-warnings" => flags.push(Flag::DisableWarnings),
            "--hide-timers" => flags.push(Flag::DisableTimers),
            "--no-helpers" => flags.push(Flag::NoHelpers),
            "--manifest" => flags.push(Flag::WriteManifest),
            _ => {}
        }
    }

    flags
}

fn parse_build_command(args: &[String]) -> Result<Command, String> {
    let mut path = String::new();
    let mut output_dir = None;
    let mut index = 1usize;

    while let Some(arg) = args.get(index) {
        match arg.as_str() {
            "--out" => {
                let Some(dir) = args.get(index + 1) else {
                    return Err(String::from("Missing value for --out"));
                };
                if dir.starts_with("--") {
                    return Err(String::from("Missing value for --out"));
                }
                output_dir = Some(PathBuf::from(dir));
                index += 2;
            }
            "--hide-warnings" | "--hide-timers" | "--no-helpers" | "--manifest" => {
                index += 1;
            }
            _ if arg.starts_with("--") => {
                return Err(format!(
                    "Unknown build flag: '{arg}'. Supported flags are --out, --no-helpers, --manifest, --hide-warnings, --hide-timers."
                ));
            }
            _ => {
                if path.is_empty() {
                    path = arg.to_owned();
                    index += 1;
                } else {
                    return Err(String::from(
                        "Build command accepts at most one path argument.",
                    ));
                }
            }
        }
    }

    Ok(Command::Build { path, output_dir })
}

fn all_helpers_source() -> String {
    let everything: FxHashSet<Helper> = ALL_HELPERS.iter().copied().collect();
    render_helpers(&everything)
}

fn print_help(commands_only: bool) {
    if !commands_only {
        say!(Bright Black "------------------------------------");
        say!(Green Bold "unawait - lowers async functions to promise callbacks");
        say!("Usage: ", Bold "<command>", Italic " <args>");
    }
    say!(Green Bold "\nCommands:");
    say!("  build <path>      - Lowers a .js file or every .js file in a directory");
    say!("  helpers           - Prints the runtime helper library");
    say!("  help              - Shows this message");

    say!(Green Bold "\nFlags:");
    say!("  --out <dir>       (default: from unawait.toml, or 'lowered')");
    say!("  --no-helpers");
    say!("  --manifest");
    say!("  --hide-warnings");
    say!("  --hide-timers");
}

#[cfg(test)]
#[path = "tests/cli_tests.rs"]
mod tests;
