//! Value types of pattern-declared identifiers and their legality checks.
//!
//! Pattern variables resolve to reference types: node and edge references
//! for element variables, path values for path and subpath variables, and
//! group lists for group-degree variables. The analyzer checks every
//! variable's type once the pattern is finalized: list and path values are
//! feature-gated, and a group list may only collect nodes or edges — which
//! is how a subpath variable caught inside a quantifier gets rejected.
//! Search-condition resolution uses [`expect_singleton`] to refuse plain
//! references to group-degree variables.

use crate::ast::Span;
use crate::semantic::aux_data::{Variable, VariableKind};
use crate::semantic::error::{AnalyzerError, ErrorCode, Result};
use crate::semantic::features::{Feature, FeatureSet};

/// The type alternatives a pattern variable can produce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueType {
    NodeReference,
    EdgeReference,
    Path,
    List {
        element: Option<Box<ValueType>>,
        is_group: bool,
    },
}

impl ValueType {
    /// A group list over the given element type.
    pub fn group_list(element: ValueType) -> Self {
        ValueType::List {
            element: Some(Box::new(element)),
            is_group: true,
        }
    }

    /// True for list-shaped types (group or plain).
    pub fn is_list(&self) -> bool {
        matches!(self, ValueType::List { .. })
    }
}

/// The type a pattern variable resolves to.
///
/// Group-degree variables bind group lists of their element type.
pub fn value_type_of_variable(variable: &Variable) -> ValueType {
    let element = match variable.kind {
        VariableKind::Node => ValueType::NodeReference,
        VariableKind::Edge => ValueType::EdgeReference,
        VariableKind::Path | VariableKind::Subpath => ValueType::Path,
    };
    if variable.degree.is_group() {
        ValueType::group_list(element)
    } else {
        element
    }
}

/// Requires a singleton (non-list) degree of reference.
pub fn expect_singleton(value_type: &ValueType, span: &Span) -> Result<()> {
    if value_type.is_list() {
        return Err(AnalyzerError::new(
            ErrorCode::E0055,
            span.clone(),
            "Expected singleton degree of reference",
        ));
    }
    Ok(())
}

/// Validates a pattern variable's type against the group-list rule and the
/// configured feature set.
pub fn check_value_type(
    value_type: &ValueType,
    features: &FeatureSet,
    span: &Span,
) -> Result<()> {
    match value_type {
        ValueType::NodeReference | ValueType::EdgeReference => Ok(()),
        ValueType::Path => features.require(Feature::GV55, span),
        ValueType::List { element, is_group } => {
            features.require(Feature::GV50, span)?;
            if *is_group {
                let element_ok = element.as_ref().is_some_and(|element| {
                    matches!(**element, ValueType::NodeReference | ValueType::EdgeReference)
                });
                if !element_ok {
                    return Err(AnalyzerError::new(
                        ErrorCode::E0097,
                        span.clone(),
                        "Group list element type must be node or edge reference type",
                    ));
                }
            }
            if let Some(element) = element {
                check_value_type(element, features, span)?;
            }
            Ok(())
        }
    }
}
