//! Typed analyzer errors.
//!
//! The semantic core is fail-fast: the first error aborts analysis and the
//! partially annotated AST is discarded. Every error carries a stable code,
//! the offending span, and a formatted message; rendering goes through the
//! diagnostic model in [`crate::diag`].

use crate::ast::Span;
use crate::diag::Diag;
use crate::semantic::features::Feature;
use std::fmt;

/// Stable analyzer error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// Variable declared again with a different kind.
    E0001,
    /// Path variable declared more than once.
    E0002,
    /// Subpath variable declared more than once.
    E0003,
    /// Nested quantified path primary.
    E0004,
    /// Unbounded quantifier outside a restrictive or selective context.
    E0005,
    /// Quantified path primary with zero minimum path length.
    E0006,
    /// Questioned path primary with zero minimum path length.
    E0007,
    /// Variable re-exposed with an incompatible degree of exposure.
    E0008,
    /// Strict interior variable of a selective path pattern re-exposed.
    E0009,
    /// Feature not supported by the configured feature set.
    E0010,
    /// Reference to a variable declared in an adjacent union operand.
    E0051,
    /// Non-local reference to a variable with group degree.
    E0052,
    /// Reference from a selective path pattern to an outside variable.
    E0053,
    /// Reference to an unknown field.
    E0054,
    /// Singleton degree of reference expected.
    E0055,
    /// Simplified path pattern survived the rewriters.
    E0060,
    /// Group list element type is not a node or edge reference.
    E0097,
    /// User identifier collides with the reserved temporary prefix.
    E0100,
    /// Path pattern with zero minimum node count.
    E0109,
    /// Subpath pattern with zero minimum node count.
    E0110,
    /// Element pattern predicate survived the rewriters.
    E0111,
    /// Field present in the working table but not in the working record.
    E0113,
}

impl ErrorCode {
    /// The stable textual form of this code.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::E0001 => "E0001",
            ErrorCode::E0002 => "E0002",
            ErrorCode::E0003 => "E0003",
            ErrorCode::E0004 => "E0004",
            ErrorCode::E0005 => "E0005",
            ErrorCode::E0006 => "E0006",
            ErrorCode::E0007 => "E0007",
            ErrorCode::E0008 => "E0008",
            ErrorCode::E0009 => "E0009",
            ErrorCode::E0010 => "E0010",
            ErrorCode::E0051 => "E0051",
            ErrorCode::E0052 => "E0052",
            ErrorCode::E0053 => "E0053",
            ErrorCode::E0054 => "E0054",
            ErrorCode::E0055 => "E0055",
            ErrorCode::E0060 => "E0060",
            ErrorCode::E0097 => "E0097",
            ErrorCode::E0100 => "E0100",
            ErrorCode::E0109 => "E0109",
            ErrorCode::E0110 => "E0110",
            ErrorCode::E0111 => "E0111",
            ErrorCode::E0113 => "E0113",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An analysis error with code, position, and formatted message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyzerError {
    pub code: ErrorCode,
    pub span: Span,
    pub message: String,
}

impl AnalyzerError {
    /// Creates a new analyzer error.
    pub fn new(code: ErrorCode, span: Span, message: impl Into<String>) -> Self {
        Self {
            code,
            span,
            message: message.into(),
        }
    }

    /// Creates the error for an unsupported feature.
    pub fn unsupported_feature(feature: Feature, span: Span) -> Self {
        Self::new(
            ErrorCode::E0010,
            span,
            format!(
                "Feature {} ({}) is not supported",
                feature.code(),
                feature.description()
            ),
        )
    }

    /// Converts this error into a renderable diagnostic.
    pub fn to_diag(&self) -> Diag {
        Diag::error(self.message.clone())
            .with_code(self.code.as_str())
            .with_primary_label(self.span.clone(), "here")
    }
}

impl fmt::Display for AnalyzerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.as_str(), self.message)
    }
}

impl std::error::Error for AnalyzerError {}

/// Analysis result alias used throughout the semantic core.
pub type Result<T> = std::result::Result<T, AnalyzerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_includes_code() {
        let err = AnalyzerError::new(ErrorCode::E0004, 3..9, "nested quantifier");
        assert_eq!(err.to_string(), "E0004: nested quantifier");
    }

    #[test]
    fn to_diag_carries_code_and_span() {
        let err = AnalyzerError::new(ErrorCode::E0051, 10..14, "adjacent operand");
        let diag = err.to_diag();
        assert_eq!(diag.code.as_deref(), Some("E0051"));
        assert_eq!(diag.labels[0].span, 10..14);
    }
}
