use super::*;
use crate::compiler_frontend::compiler_errors::ErrorType;
use std::path::PathBuf;

#[test]
fn lowered_unit_carries_code_and_helpers() {
    let config = Config::default();
    let frontend = CompilerFrontend::new(&config);

    let unit = frontend
        .lower_source("async function f() { await a; }", &PathBuf::from("main.js"))
        .expect("lowering should succeed");

    assert!(unit.code.contains("var f = __async(function() {"));
    assert_eq!(unit.outcome.transformed, 1);

    let with_helpers = unit.code_with_helpers();
    assert!(with_helpers.starts_with("function __async(f) {"));
    assert!(with_helpers.ends_with(&unit.code));
}

#[test]
fn synchronous_files_get_no_helpers() {
    let config = Config::default();
    let frontend = CompilerFrontend::new(&config);

    let unit = frontend
        .lower_source("var x = 1;", &PathBuf::from("main.js"))
        .expect("lowering should succeed");

    assert!(unit.helpers.is_empty());
    assert_eq!(unit.code_with_helpers(), unit.code);
}

#[test]
fn syntax_errors_point_at_their_file() {
    let config = Config::default();
    let frontend = CompilerFrontend::new(&config);

    let error = frontend
        .lower_source("var = ;", &PathBuf::from("broken.js"))
        .expect_err("parsing should fail");

    assert_eq!(error.error_type, ErrorType::Syntax);
    assert_eq!(error.location.scope, PathBuf::from("broken.js"));
}

#[test]
fn printer_settings_come_from_the_config() {
    let mut config = Config::default();
    config.printer.indent_width = 2;
    let frontend = CompilerFrontend::new(&config);

    let unit = frontend
        .lower_source("function f() { return 1; }", &PathBuf::from("main.js"))
        .expect("lowering should succeed");

    assert_eq!(unit.code, "function f() {\n  return 1;\n}\n");
}
