use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use unawait::lower_source;

// Each case prints its results from `main`, so running the source and its
// lowered form must print the same line.

fn node_available() -> bool {
    Command::new("node")
        .arg("--version")
        .output()
        .map(|output| output.status.success())
        .unwrap_or(false)
}

fn case_files() -> Vec<PathBuf> {
    let mut cases: Vec<PathBuf> = fs::read_dir("tests/cases")
        .expect("cases folder")
        .map(|entry| entry.expect("case entry").path())
        .filter(|path| path.extension().and_then(|ext| ext.to_str()) == Some("js"))
        .collect();
    cases.sort();
    cases
}

struct Run {
    success: bool,
    stdout: String,
    stderr: String,
}

fn run_node(script: &Path) -> Run {
    let output = Command::new("node")
        .arg(script)
        .output()
        .expect("node should start");

    Run {
        success: output.status.success(),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    }
}

#[test]
fn lowered_cases_print_what_the_source_prints() {
    if !node_available() {
        eprintln!("node not found, skipping runtime comparison");
        return;
    }

    let dir = tempfile::tempdir().expect("temp dir");
    let mut errors = Vec::new();

    for path in case_files() {
        let source = fs::read_to_string(&path).expect("read case");
        let unit = match lower_source(&source, &path) {
            Ok(unit) => unit,
            Err(e) => {
                errors.push(format!("{}: {}", path.display(), e.msg));
                continue;
            }
        };

        let name = path.file_name().expect("case name");
        let native_path = dir.path().join("native").with_extension("js");
        let lowered_path = dir.path().join(name);
        fs::write(&native_path, &source).expect("write native case");
        fs::write(&lowered_path, unit.code_with_helpers()).expect("write lowered case");

        let native = run_node(&native_path);
        let lowered = run_node(&lowered_path);

        if !native.success || native.stdout.trim().is_empty() {
            errors.push(format!(
                "{}: the source itself did not print a result\n{}",
                path.display(),
                native.stderr
            ));
            continue;
        }

        if !lowered.success {
            errors.push(format!(
                "{}: lowered code failed to run\n{}\n--- lowered\n{}",
                path.display(),
                lowered.stderr,
                unit.code_with_helpers()
            ));
            continue;
        }

        if native.stdout != lowered.stdout {
            errors.push(format!(
                "{}: printed results differ\n  native:  {}  lowered: {}--- lowered\n{}",
                path.display(),
                native.stdout,
                lowered.stdout,
                unit.code_with_helpers()
            ));
        }
    }

    if !errors.is_empty() {
        panic!("Some cases ran differently:\n{}", errors.join("\n"));
    }
}
