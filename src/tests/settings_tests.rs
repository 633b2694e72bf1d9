use super::*;
use crate::compiler_frontend::compiler_errors::ErrorType;

#[test]
fn missing_config_file_uses_the_defaults() {
    let project = tempfile::tempdir().expect("temp dir");

    let config = Config::load(project.path()).expect("defaults should load");

    assert_eq!(config.output.dir, PathBuf::from(DEFAULT_OUTPUT_DIR));
    assert!(config.output.emit_helpers);
    assert!(!config.output.manifest);
    assert!(config.printer.pretty);
    assert_eq!(config.printer.indent_width, 4);
}

#[test]
fn partial_tables_keep_the_other_defaults() {
    let project = tempfile::tempdir().expect("temp dir");
    fs::write(
        project.path().join(CONFIG_FILE_NAME),
        "[output]\ndir = \"dist\"\nmanifest = true\n",
    )
    .expect("write config");

    let config = Config::load(project.path()).expect("config should load");

    assert_eq!(config.output.dir, PathBuf::from("dist"));
    assert!(config.output.manifest);
    assert!(config.output.emit_helpers);
    assert_eq!(config.printer.indent_width, 4);
}

#[test]
fn unknown_keys_are_config_errors() {
    let source = "[printer]\npretty = false\ntabs = true\n";

    let error = Config::from_toml(source, Path::new(CONFIG_FILE_NAME))
        .expect_err("unknown key should be rejected");

    assert_eq!(error.error_type, ErrorType::Config);
    assert_eq!(error.location.scope, PathBuf::from(CONFIG_FILE_NAME));
    assert!(error.msg.contains("tabs"));
}

#[test]
fn wrong_value_types_are_rejected() {
    let error = Config::from_toml("[printer]\nindent_width = \"four\"\n", Path::new("x.toml"))
        .expect_err("a string is not a width");

    assert_eq!(error.error_type, ErrorType::Config);
}

#[test]
fn positions_count_lines_and_columns() {
    let position = position_of("a = 1\nbb = 2", 8);

    assert_eq!(position.line_number, 1);
    assert_eq!(position.char_column, 3);
}
