//! Auxiliary data attached to pattern AST nodes by the analyzer.
//!
//! Aux data is created as the analyzer exits the corresponding scope and is
//! installed behind `Rc`; it is immutable once set and lives as long as the
//! owning node.

use smol_str::SmolStr;
use std::collections::{HashMap, HashSet};

/// The kind of a graph pattern variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VariableKind {
    Node,
    Edge,
    Path,
    Subpath,
}

impl VariableKind {
    /// Lowercase name used in error messages.
    pub fn as_str(self) -> &'static str {
        match self {
            VariableKind::Node => "node",
            VariableKind::Edge => "edge",
            VariableKind::Path => "path",
            VariableKind::Subpath => "subpath",
        }
    }
}

/// How many elements a variable binds to when a match exists.
///
/// The variants are ordered from most to least constrained; merge rules take
/// the maximum under this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DegreeOfExposure {
    /// Binds exactly one element.
    UnconditionalSingleton,
    /// Binds one element or is absent.
    ConditionalSingleton,
    /// Binds a bounded list of elements.
    EffectivelyBoundedGroup,
    /// Binds an unbounded list of elements.
    EffectivelyUnboundedGroup,
}

impl DegreeOfExposure {
    /// True for either group degree.
    pub fn is_group(self) -> bool {
        matches!(
            self,
            DegreeOfExposure::EffectivelyBoundedGroup
                | DegreeOfExposure::EffectivelyUnboundedGroup
        )
    }
}

/// A variable as recorded in aux data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Variable {
    pub kind: VariableKind,
    pub degree: DegreeOfExposure,
    pub is_temp: bool,
}

/// Aux data of a [`crate::ast::pattern::PathPattern`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathPatternAuxData {
    /// Variables the pattern exposes as unconditional singletons, available
    /// for joining across the patterns of a graph pattern.
    pub joinable_variables: HashSet<SmolStr>,
}

/// Aux data of a [`crate::ast::pattern::GraphPattern`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GraphPatternAuxData {
    /// Every variable of the graph pattern with its final kind and degree.
    pub variables: HashMap<SmolStr, Variable>,
}

/// Aux data of graph-pattern and parenthesized `WHERE` clauses.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GraphPatternWhereClauseAuxData {
    /// The variables legally resolvable from the clause.
    pub referenced_variables: HashMap<SmolStr, Variable>,
}

/// Aux data of `PathFactor` and `PathPatternExpression` nodes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PathVariableReferenceScopeAuxData {
    /// Element variables declared at this syntactic point with a particular
    /// degree of exposure for the first time (the deepest such factor).
    /// Unconditional singletons may be declared multiple times.
    pub declared_variables: HashMap<SmolStr, Variable>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn degree_order_matches_groupness() {
        use DegreeOfExposure::*;
        assert!(UnconditionalSingleton < ConditionalSingleton);
        assert!(ConditionalSingleton < EffectivelyBoundedGroup);
        assert!(EffectivelyBoundedGroup < EffectivelyUnboundedGroup);
        assert_eq!(
            EffectivelyBoundedGroup.max(ConditionalSingleton),
            EffectivelyBoundedGroup
        );
    }

    #[test]
    fn group_predicate() {
        use DegreeOfExposure::*;
        assert!(!UnconditionalSingleton.is_group());
        assert!(!ConditionalSingleton.is_group());
        assert!(EffectivelyBoundedGroup.is_group());
        assert!(EffectivelyUnboundedGroup.is_group());
    }
}
