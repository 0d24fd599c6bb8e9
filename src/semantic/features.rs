//! ISO GQL optional-feature gate.
//!
//! The analyzer consults the feature set before accepting gated constructs.
//! Every feature is supported by default; a deployment narrows the set with
//! [`FeatureSet::without`].

use crate::ast::Span;
use crate::semantic::error::{AnalyzerError, Result};
use std::collections::HashSet;

/// ISO GQL optional features the analyzer gates on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    /// TRAIL path mode.
    G011,
    /// SIMPLE path mode.
    G012,
    /// ACYCLIC path mode.
    G013,
    /// ANY path search.
    G016,
    /// ANY SHORTEST path search.
    G017,
    /// SHORTEST path search.
    G018,
    /// SHORTEST k paths search.
    G019,
    /// SHORTEST k groups search.
    G020,
    /// Path multiset alternation.
    G030,
    /// Path pattern union.
    G032,
    /// Subpath variable declarations.
    G048,
    /// Parenthesized path pattern path mode.
    G049,
    /// Parenthesized path pattern WHERE clause.
    G050,
    /// Bounded graph pattern quantifiers.
    G060,
    /// Unbounded graph pattern quantifiers.
    G061,
    /// Label expression wildcard.
    G074,
    /// List value types.
    GV50,
    /// Path value types.
    GV55,
}

impl Feature {
    /// The ISO feature code.
    pub fn code(self) -> &'static str {
        match self {
            Feature::G011 => "G011",
            Feature::G012 => "G012",
            Feature::G013 => "G013",
            Feature::G016 => "G016",
            Feature::G017 => "G017",
            Feature::G018 => "G018",
            Feature::G019 => "G019",
            Feature::G020 => "G020",
            Feature::G030 => "G030",
            Feature::G032 => "G032",
            Feature::G048 => "G048",
            Feature::G049 => "G049",
            Feature::G050 => "G050",
            Feature::G060 => "G060",
            Feature::G061 => "G061",
            Feature::G074 => "G074",
            Feature::GV50 => "GV50",
            Feature::GV55 => "GV55",
        }
    }

    /// Human-readable feature name.
    pub fn description(self) -> &'static str {
        match self {
            Feature::G011 => "TRAIL path mode",
            Feature::G012 => "SIMPLE path mode",
            Feature::G013 => "ACYCLIC path mode",
            Feature::G016 => "ANY path search",
            Feature::G017 => "ANY SHORTEST path search",
            Feature::G018 => "SHORTEST path search",
            Feature::G019 => "SHORTEST k path search",
            Feature::G020 => "SHORTEST k GROUPS path search",
            Feature::G030 => "path multiset alternation",
            Feature::G032 => "path pattern union",
            Feature::G048 => "subpath variable declaration",
            Feature::G049 => "parenthesized path pattern path mode",
            Feature::G050 => "parenthesized path pattern WHERE clause",
            Feature::G060 => "bounded graph pattern quantifier",
            Feature::G061 => "unbounded graph pattern quantifier",
            Feature::G074 => "label expression wildcard",
            Feature::GV50 => "list value types",
            Feature::GV55 => "path value types",
        }
    }
}

/// The set of supported optional features.
///
/// Everything is supported unless explicitly disabled.
#[derive(Debug, Clone, Default)]
pub struct FeatureSet {
    disabled: HashSet<Feature>,
}

impl FeatureSet {
    /// A feature set supporting every gated feature.
    pub fn all() -> Self {
        Self::default()
    }

    /// Returns the set with the given feature disabled.
    pub fn without(mut self, feature: Feature) -> Self {
        self.disabled.insert(feature);
        self
    }

    /// True if the feature is supported.
    pub fn is_supported(&self, feature: Feature) -> bool {
        !self.disabled.contains(&feature)
    }

    /// Errors with the feature's code if it is not supported.
    pub fn require(&self, feature: Feature, span: &Span) -> Result<()> {
        if self.is_supported(feature) {
            Ok(())
        } else {
            Err(AnalyzerError::unsupported_feature(feature, span.clone()))
        }
    }
}
