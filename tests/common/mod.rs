//! Common test utilities.
//!
//! Shared helpers for parsing, rewriting, and analyzing query text across
//! the integration suites.

#![allow(dead_code)]

use gql_analyzer::ast::pattern::Program;
use gql_analyzer::ast::print_program;
use gql_analyzer::diag::Diag;
use gql_analyzer::parse;
use gql_analyzer::semantic::{
    AnalysisOutput, AnalyzerConfig, AnalyzerError, ErrorCode, SyntaxAnalyzer,
};

/// Formats diagnostics for display in assertion messages.
pub fn format_diagnostics(diags: &[Diag]) -> String {
    diags
        .iter()
        .map(|diag| format!("{diag:?}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Parses source text, panicking on any diagnostic.
pub fn parse_cleanly(source: &str) -> Program {
    let result = parse(source);
    assert!(
        result.diagnostics.is_empty(),
        "unexpected diagnostics for `{source}`:\n{}",
        format_diagnostics(&result.diagnostics)
    );
    result
        .program
        .unwrap_or_else(|| panic!("expected AST for source: {source}"))
}

/// Parses, runs all rewrites, and reprints canonically.
pub fn rewrite_and_print(source: &str) -> String {
    let mut program = parse_cleanly(source);
    gql_analyzer::rewrite::rewrite_program(&mut program)
        .unwrap_or_else(|err| panic!("rewrite failed for `{source}`: {err}"));
    print_program(&program)
}

/// Parses and analyzes with the default configuration, returning the
/// annotated program.
pub fn analyze(source: &str) -> Program {
    let mut program = parse_cleanly(source);
    SyntaxAnalyzer::new()
        .analyze(&mut program)
        .unwrap_or_else(|err| panic!("analysis failed for `{source}`: {err}"));
    program
}

/// Parses and analyzes, returning the annotated program together with the
/// analysis output.
pub fn analyze_with_output(source: &str) -> (Program, AnalysisOutput) {
    let mut program = parse_cleanly(source);
    let output = SyntaxAnalyzer::new()
        .analyze(&mut program)
        .unwrap_or_else(|err| panic!("analysis failed for `{source}`: {err}"));
    (program, output)
}

/// Parses and analyzes, expecting analysis to fail.
pub fn analyze_err(source: &str) -> AnalyzerError {
    let mut program = parse_cleanly(source);
    match SyntaxAnalyzer::new().analyze(&mut program) {
        Ok(_) => panic!("expected analysis of `{source}` to fail"),
        Err(err) => err,
    }
}

/// Parses and analyzes with a custom configuration, expecting failure.
pub fn analyze_err_with(source: &str, config: AnalyzerConfig) -> AnalyzerError {
    let mut program = parse_cleanly(source);
    match SyntaxAnalyzer::with_config(config).analyze(&mut program) {
        Ok(_) => panic!("expected analysis of `{source}` to fail"),
        Err(err) => err,
    }
}

/// Asserts the error carries the expected code.
pub fn assert_error_code(err: &AnalyzerError, code: ErrorCode) {
    assert_eq!(
        err.code, code,
        "expected {code:?}, got {:?}: {}",
        err.code, err.message
    );
}
