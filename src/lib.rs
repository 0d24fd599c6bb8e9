//! ISO GQL graph pattern front end.
//!
//! A parser followed by semantic analysis that lowers `MATCH` patterns into
//! a normalized, annotated AST. The pipeline:
//!
//! 1. [`parse`] turns query text into a pattern AST with rich diagnostics.
//! 2. [`rewrite::rewrite_program`] desugars surface syntax (simplified path
//!    patterns, bare dashes, element predicates) into canonical form.
//! 3. [`semantic::SyntaxAnalyzer`] walks the rewritten tree once, enforcing
//!    the variable-binding and scoping rules of ISO GQL and attaching
//!    auxiliary data (joinable variables, per-clause referenced variables,
//!    per-factor declared variables) for downstream layers.
//!
//! ```
//! use gql_analyzer::{parse, semantic::SyntaxAnalyzer};
//!
//! let mut program = parse("MATCH (a)-[b]->(c) WHERE a.age > 18")
//!     .program
//!     .expect("parses");
//! SyntaxAnalyzer::new().analyze(&mut program).expect("analyzes");
//!
//! let aux = program.statements[0].pattern.aux.as_ref().expect("aux data");
//! assert_eq!(aux.variables.len(), 3);
//! ```

pub mod ast;
pub mod diag;
pub mod lexer;
pub mod parser;
pub mod rewrite;
pub mod semantic;

// Re-export the everyday surface.
pub use ast::{print_program, Span};
pub use diag::{render_report, render_reports, Diag, DiagSeverity, SourceFile};
pub use parser::{parse, ParseResult};
pub use semantic::{
    AnalyzerConfig, AnalyzerError, DegreeOfExposure, ErrorCode, Feature, FeatureSet,
    SyntaxAnalyzer, VariableKind,
};
