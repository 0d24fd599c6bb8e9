//! Semantic analysis of graph patterns.
//!
//! The analyzer walks a rewritten `MATCH` pattern tree in a single pass,
//! enforces the ISO GQL rules that bind pattern variables, tracks each
//! variable's degree of exposure, scopes search conditions across union and
//! quantification boundaries, and attaches auxiliary annotations to the AST
//! for downstream layers.

pub mod analyzer;
pub mod aux_data;
pub mod context;
pub mod error;
pub mod features;
pub mod search_condition;
pub mod value_type;

pub use analyzer::{match_output_columns, AnalysisOutput, AnalyzerConfig, SyntaxAnalyzer};
pub use aux_data::{
    DegreeOfExposure, GraphPatternAuxData, GraphPatternWhereClauseAuxData, PathPatternAuxData,
    PathVariableReferenceScopeAuxData, Variable, VariableKind,
};
pub use context::{FinalizedPattern, GraphPatternContext, VariableScope, VariableScopeId};
pub use error::{AnalyzerError, ErrorCode};
pub use features::{Feature, FeatureSet};
pub use search_condition::{InaccessibleReason, SearchConditionScope};
pub use value_type::{check_value_type, expect_singleton, value_type_of_variable, ValueType};
