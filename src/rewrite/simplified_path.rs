//! Rewrite of simplified path pattern expressions.
//!
//! Replaces every `SimplifiedPathPatternExpression` by an equivalent
//! `ParenthesizedPathPatternExpression` built from labeled edge patterns:
//! `-/ A /->` becomes `(-[:A]->)`, `A | B` becomes two edge alternatives,
//! and a conjunction `!A & !B` becomes a single edge whose label expression
//! is `(!A&!B)`. Quantifiers carry over to the containing factor and
//! direction overrides (`<`, `>`) replace the delimiter direction.
//!
//! A simplified pattern whose negations or conjunctions sit over structural
//! contents cannot be expressed as a label expression; such a pattern is
//! left in place and rejected by the analyzer as unrewritten.

use crate::ast::pattern::*;
use crate::ast::visit::{self, PatternVisitorMut, VisitResult};
use std::convert::Infallible;

/// Rewrites all simplified path pattern expressions in the program.
pub fn rewrite_simplified_path_patterns(program: &mut Program) {
    let mut rewriter = SimplifiedPathRewriter;
    let _ = rewriter.visit_program_mut(program);
}

struct SimplifiedPathRewriter;

impl PatternVisitorMut for SimplifiedPathRewriter {
    type Break = Infallible;

    fn visit_path_factor_mut(&mut self, factor: &mut PathFactor) -> VisitResult<Infallible> {
        if let PathPrimary::Simplified(simplified) = &factor.primary {
            if let Some(primary) = convert_simplified(simplified) {
                factor.primary = primary;
            }
        }
        visit::walk_path_factor_mut(self, factor)
    }
}

fn convert_simplified(simplified: &SimplifiedPathPatternExpression) -> Option<PathPrimary> {
    let pattern = convert_contents(&simplified.contents, simplified.direction)?;
    Some(PathPrimary::Parenthesized(Box::new(
        ParenthesizedPathPatternExpression {
            subpath_variable: None,
            path_mode: PathMode::Walk,
            pattern,
            where_clause: None,
            span: simplified.span.clone(),
        },
    )))
}

fn convert_contents(
    contents: &SimplifiedContents,
    direction: EdgeDirection,
) -> Option<PathPatternExpression> {
    let terms = contents
        .terms
        .iter()
        .map(|term| convert_term(term, direction))
        .collect::<Option<Vec<_>>>()?;
    Some(PathPatternExpression {
        terms,
        op: contents.op,
        span: contents.span.clone(),
        aux: None,
    })
}

fn convert_term(term: &SimplifiedTerm, direction: EdgeDirection) -> Option<PathTerm> {
    let factors = term
        .factors
        .iter()
        .map(|factor| convert_factor(factor, direction))
        .collect::<Option<Vec<_>>>()?;
    Some(PathTerm {
        factors,
        span: term.span.clone(),
    })
}

fn convert_factor(factor: &SimplifiedFactor, outer_direction: EdgeDirection) -> Option<PathFactor> {
    let direction = match factor.direction {
        None => outer_direction,
        Some(SimplifiedDirectionOverride::Left) => EdgeDirection::PointingLeft,
        Some(SimplifiedDirectionOverride::Right) => EdgeDirection::PointingRight,
        Some(SimplifiedDirectionOverride::LeftOrRight) => EdgeDirection::LeftOrRight,
    };

    let primary = match &factor.primary {
        SimplifiedPrimary::Conjunction(..) => {
            edge_primary(direction, label_of_primary(&factor.primary)?, &factor.span)
        }
        SimplifiedPrimary::Unit(SimplifiedUnit::Parenthesized(contents, span)) => {
            if factor.direction.is_some() {
                // A direction override forces a single edge pattern, so the
                // contents must collapse to a label expression.
                edge_primary(direction, label_of_contents(contents)?, &factor.span)
            } else {
                let pattern = convert_contents(contents, outer_direction)?;
                PathPrimary::Parenthesized(Box::new(ParenthesizedPathPatternExpression {
                    subpath_variable: None,
                    path_mode: PathMode::Walk,
                    pattern,
                    where_clause: None,
                    span: span.clone(),
                }))
            }
        }
        SimplifiedPrimary::Unit(unit) => {
            edge_primary(direction, label_of_unit(unit)?, &factor.span)
        }
    };

    Some(PathFactor {
        quantifier: factor.quantifier.clone(),
        primary,
        span: factor.span.clone(),
        aux: None,
    })
}

fn edge_primary(
    direction: EdgeDirection,
    label: LabelExpression,
    span: &crate::ast::Span,
) -> PathPrimary {
    PathPrimary::Element(ElementPattern::Edge(EdgePattern {
        direction,
        filler: Some(ElementPatternFiller {
            variable: None,
            label: Some(label),
            predicate: None,
            span: span.clone(),
        }),
        span: span.clone(),
    }))
}

/// Collapses a simplified primary to a label expression, when possible.
fn label_of_primary(primary: &SimplifiedPrimary) -> Option<LabelExpression> {
    match primary {
        SimplifiedPrimary::Conjunction(units, span) => {
            let parts = units
                .iter()
                .map(label_of_unit)
                .collect::<Option<Vec<_>>>()?;
            Some(LabelExpression::Parenthesized(
                Box::new(LabelExpression::Conjunction(parts, span.clone())),
                span.clone(),
            ))
        }
        SimplifiedPrimary::Unit(unit) => label_of_unit(unit),
    }
}

fn label_of_unit(unit: &SimplifiedUnit) -> Option<LabelExpression> {
    match unit {
        SimplifiedUnit::Label(name, span) => {
            Some(LabelExpression::Name(name.clone(), span.clone()))
        }
        SimplifiedUnit::Negation(inner, span) => Some(LabelExpression::Negation(
            Box::new(label_of_unit(inner)?),
            span.clone(),
        )),
        SimplifiedUnit::Parenthesized(contents, _) => label_of_contents(contents),
    }
}

/// Collapses parenthesized contents to a label expression when every term
/// is a single unquantified, non-overridden, label-shaped factor.
fn label_of_contents(contents: &SimplifiedContents) -> Option<LabelExpression> {
    let mut labels = Vec::new();
    for term in &contents.terms {
        if term.factors.len() != 1 {
            return None;
        }
        let factor = &term.factors[0];
        if factor.direction.is_some() || !matches!(factor.quantifier, PathQuantifier::None) {
            return None;
        }
        labels.push(label_of_primary(&factor.primary)?);
    }
    match labels.len() {
        0 => None,
        1 => Some(labels.remove(0)),
        _ => Some(LabelExpression::Parenthesized(
            Box::new(LabelExpression::Disjunction(labels, contents.span.clone())),
            contents.span.clone(),
        )),
    }
}
