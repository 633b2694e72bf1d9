use super::*;
use crate::backends::js::runtime_helpers::Helper;
use crate::compiler_frontend::compiler_errors::ErrorType;
use crate::settings::{CONFIG_FILE_NAME, DEFAULT_OUTPUT_DIR};
use tempfile::TempDir;

fn project_with(files: &[(&str, &str)]) -> TempDir {
    let dir = tempfile::tempdir().expect("temp dir");
    for (name, source) in files {
        let path = dir.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create source dir");
        }
        fs::write(path, source).expect("write source");
    }
    dir
}

fn quiet(flags: &[Flag]) -> BuildOptions {
    let mut all_flags = vec![Flag::DisableTimers];
    all_flags.extend_from_slice(flags);
    BuildOptions {
        flags: all_flags,
        output_dir: None,
    }
}

fn entry(dir: &TempDir) -> String {
    dir.path().to_string_lossy().to_string()
}

fn input(relative: &str, source: &str) -> InputFile {
    InputFile {
        source_code: source.to_owned(),
        source_path: PathBuf::from(relative),
        relative_path: PathBuf::from(relative),
    }
}

#[test]
fn directory_build_mirrors_the_source_tree() {
    let project = project_with(&[
        ("main.js", "async function main() { await start(); }"),
        ("lib/util.js", "function add(a, b) { return a + b; }"),
    ]);

    let messages = build_project(&entry(&project), &quiet(&[]));
    assert!(messages.errors.is_empty());

    let output = project.path().join(DEFAULT_OUTPUT_DIR);
    let main = fs::read_to_string(output.join("main.js")).expect("main output");
    assert!(main.starts_with("function __async(f) {"));
    assert!(main.contains("var main = __async(function() {"));

    let util = fs::read_to_string(output.join("lib").join("util.js")).expect("util output");
    assert!(!util.contains("__async"));
    assert!(!output.join(MANIFEST_FILE_NAME).exists());
}

#[test]
fn no_helpers_flag_leaves_only_the_lowered_code() {
    let project = project_with(&[("main.js", "async function main() { await start(); }")]);

    let messages = build_project(&entry(&project), &quiet(&[Flag::NoHelpers]));
    assert!(messages.errors.is_empty());

    let main = fs::read_to_string(project.path().join(DEFAULT_OUTPUT_DIR).join("main.js"))
        .expect("main output");
    assert!(main.starts_with("var main = __async("));
    assert!(!main.contains("function __async"));
}

#[test]
fn manifest_lists_helpers_per_file_and_overall() {
    let project = project_with(&[
        ("a.js", "async function f() { await a; }"),
        ("nested/b.js", "var x = 1;"),
    ]);

    let messages = build_project(&entry(&project), &quiet(&[Flag::WriteManifest]));
    assert!(messages.errors.is_empty());

    let json = fs::read_to_string(
        project
            .path()
            .join(DEFAULT_OUTPUT_DIR)
            .join(MANIFEST_FILE_NAME),
    )
    .expect("manifest written");
    let manifest: serde_json::Value = serde_json::from_str(&json).expect("manifest is JSON");

    assert_eq!(
        manifest["helpers"],
        serde_json::json!(["__async", "__await", "__empty"])
    );
    assert_eq!(manifest["files"][0]["path"], "a.js");
    assert_eq!(manifest["files"][0]["transformed"], 1);
    assert_eq!(manifest["files"][1]["path"], "nested/b.js");
    assert_eq!(manifest["files"][1]["helpers"], serde_json::json!([]));
}

#[test]
fn config_file_picks_the_output_directory() {
    let project = project_with(&[
        ("main.js", "async function main() { await start(); }"),
        (CONFIG_FILE_NAME, "[output]\ndir = \"dist\"\nemit_helpers = false\n"),
    ]);

    let messages = build_project(&entry(&project), &quiet(&[]));
    assert!(messages.errors.is_empty());

    let main = fs::read_to_string(project.path().join("dist").join("main.js")).expect("output");
    assert!(main.starts_with("var main = __async("));
}

#[test]
fn out_option_overrides_the_config() {
    let project = project_with(&[
        ("main.js", "var x = 1;"),
        (CONFIG_FILE_NAME, "[output]\ndir = \"dist\"\n"),
    ]);

    let options = BuildOptions {
        flags: vec![Flag::DisableTimers],
        output_dir: Some(PathBuf::from("build")),
    };
    let messages = build_project(&entry(&project), &options);

    assert!(messages.errors.is_empty());
    assert!(project.path().join("build").join("main.js").exists());
    assert!(!project.path().join("dist").exists());
}

#[test]
fn rebuilding_skips_the_previous_output() {
    let project = project_with(&[("main.js", "async function main() { await start(); }")]);

    build_project(&entry(&project), &quiet(&[]));
    build_project(&entry(&project), &quiet(&[Flag::WriteManifest]));

    let json = fs::read_to_string(
        project
            .path()
            .join(DEFAULT_OUTPUT_DIR)
            .join(MANIFEST_FILE_NAME),
    )
    .expect("manifest written");
    let manifest: serde_json::Value = serde_json::from_str(&json).expect("manifest is JSON");

    assert_eq!(manifest["files"].as_array().map(Vec::len), Some(1));
}

#[test]
fn single_file_builds_next_to_itself() {
    let project = project_with(&[("main.js", "var x = 1;"), ("other.js", "var y = 2;")]);
    let file = project.path().join("main.js");

    let messages = build_project(&file.to_string_lossy(), &quiet(&[]));

    assert!(messages.errors.is_empty());
    let output = project.path().join(DEFAULT_OUTPUT_DIR);
    assert!(output.join("main.js").exists());
    assert!(!output.join("other.js").exists());
}

#[test]
fn syntax_errors_stop_the_build_before_writing() {
    let project = project_with(&[
        ("good.js", "var x = 1;"),
        ("bad.js", "function ( {"),
    ]);

    let messages = build_project(&entry(&project), &quiet(&[]));

    assert_eq!(messages.errors.len(), 1);
    assert_eq!(messages.errors[0].error_type, ErrorType::Syntax);
    assert!(!project.path().join(DEFAULT_OUTPUT_DIR).exists());
}

#[test]
fn missing_entry_path_is_a_file_error() {
    let project = project_with(&[]);
    let missing = project.path().join("nowhere");

    let messages = build_project(&missing.to_string_lossy(), &quiet(&[]));

    assert_eq!(messages.errors.len(), 1);
    assert_eq!(messages.errors[0].error_type, ErrorType::File);
}

#[test]
fn helper_usage_is_merged_across_files() {
    let files = vec![
        input(
            "loop.js",
            "async function f(list) { for (const x of list) { await x; } }",
        ),
        input(
            "switch.js",
            "async function g(x) { switch (x) { case 1: await a(); break; } done(); }",
        ),
    ];

    let project = build_outputs(files, &Config::default(), Path::new("out"));

    assert!(project.messages.errors.is_empty());
    assert!(project.helpers.contains(Helper::ForOf));
    assert!(project.helpers.contains(Helper::Switch));
    assert_eq!(project.output_files.len(), 2);
    assert_eq!(
        project.output_files[1].full_file_path,
        Path::new("out").join("switch.js")
    );
}

#[test]
fn incompatible_functions_become_warnings() {
    let files = vec![input(
        "labels.js",
        "async function f() { outer: for (;;) { await a; break outer; } }",
    )];

    let project = build_outputs(files, &Config::default(), Path::new("out"));

    assert!(project.messages.errors.is_empty());
    assert_eq!(project.messages.warnings.len(), 1);
    match project.output_files[0].file_kind() {
        FileKind::Js(code) => assert!(code.starts_with("async function f()")),
        FileKind::Json(_) => panic!("expected a JS file"),
    }
}
