pub(crate) mod ast_nodes;
pub(crate) mod parse_expressions;
pub(crate) mod parse_statements;
pub(crate) mod parser;

#[cfg(test)]
#[path = "tests/parser_tests.rs"]
mod parser_tests;
