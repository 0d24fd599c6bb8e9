//! Rewrite of bare edge patterns.
//!
//! Expands every edge pattern that lacks flanking node patterns into an
//! explicit node/edge/node shape: `-` becomes `()-()`, `- -` becomes
//! `()-()-()`, and a quantified bare edge like `-?` becomes `(()-()) ?`.
//! Synthesized nodes inherit the span of the edge they flank.

use crate::ast::pattern::*;
use crate::ast::visit::{self, PatternVisitorMut, VisitResult};
use crate::ast::Span;
use std::convert::Infallible;

/// Rewrites all bare edge patterns in the program.
pub fn rewrite_element_patterns(program: &mut Program) {
    let mut rewriter = ElementPatternRewriter;
    let _ = rewriter.visit_program_mut(program);
}

struct ElementPatternRewriter;

impl PatternVisitorMut for ElementPatternRewriter {
    type Break = Infallible;

    fn visit_path_term_mut(&mut self, term: &mut PathTerm) -> VisitResult<Infallible> {
        // Nested parenthesized expressions first, then this term.
        visit::walk_path_term_mut(self, term)?;
        wrap_quantified_edges(term);
        insert_flanking_nodes(term);
        std::ops::ControlFlow::Continue(())
    }
}

fn is_bare_edge(factor: &PathFactor) -> bool {
    matches!(factor.quantifier, PathQuantifier::None)
        && matches!(
            factor.primary,
            PathPrimary::Element(ElementPattern::Edge(_))
        )
}

fn empty_node_factor(span: &Span) -> PathFactor {
    PathFactor {
        quantifier: PathQuantifier::None,
        primary: PathPrimary::Element(ElementPattern::Node(NodePattern {
            filler: ElementPatternFiller::empty(span.clone()),
            span: span.clone(),
        })),
        span: span.clone(),
        aux: None,
    }
}

/// Replaces a quantified edge factor by a quantified parenthesized
/// node/edge/node subpattern.
fn wrap_quantified_edges(term: &mut PathTerm) {
    for factor in &mut term.factors {
        if matches!(factor.quantifier, PathQuantifier::None) {
            continue;
        }
        if !matches!(
            factor.primary,
            PathPrimary::Element(ElementPattern::Edge(_))
        ) {
            continue;
        }

        let edge_span = factor.primary.span().clone();
        let placeholder = PathPrimary::Element(ElementPattern::Node(NodePattern {
            filler: ElementPatternFiller::empty(edge_span.clone()),
            span: edge_span.clone(),
        }));
        let edge_primary = std::mem::replace(&mut factor.primary, placeholder);

        let edge_factor = PathFactor {
            quantifier: PathQuantifier::None,
            primary: edge_primary,
            span: edge_span.clone(),
            aux: None,
        };
        let inner = PathTerm {
            factors: vec![
                empty_node_factor(&edge_span),
                edge_factor,
                empty_node_factor(&edge_span),
            ],
            span: edge_span.clone(),
        };
        factor.primary = PathPrimary::Parenthesized(Box::new(ParenthesizedPathPatternExpression {
            subpath_variable: None,
            path_mode: PathMode::Walk,
            pattern: PathPatternExpression {
                terms: vec![inner],
                op: PathUnionOperator::Union,
                span: edge_span.clone(),
                aux: None,
            },
            where_clause: None,
            span: edge_span,
        }));
    }
}

/// Inserts empty node patterns so no edge pattern starts or ends the term
/// and no two edge patterns are adjacent.
fn insert_flanking_nodes(term: &mut PathTerm) {
    let needs_work = term.factors.iter().any(is_bare_edge);
    if !needs_work {
        return;
    }

    let mut result: Vec<PathFactor> = Vec::with_capacity(term.factors.len());
    let mut last_was_edge = false;
    for factor in term.factors.drain(..) {
        if is_bare_edge(&factor) {
            if result.is_empty() || last_was_edge {
                result.push(empty_node_factor(&factor.span));
            }
            last_was_edge = true;
        } else {
            last_was_edge = false;
        }
        result.push(factor);
    }
    if last_was_edge {
        let span = result.last().expect("non-empty").span.clone();
        result.push(empty_node_factor(&span));
    }
    term.factors = result;
}
