//! Rewrite of element pattern `WHERE` clauses.
//!
//! Lifts `(a WHERE cond)` and `-[b WHERE cond]-` into a surrounding
//! parenthesized path pattern expression whose `WHERE` carries the
//! condition: `((a) WHERE cond)`. The condition keeps its span; the
//! synthesized parenthesized expression inherits the element's span.

use crate::ast::pattern::*;
use crate::ast::visit::{self, PatternVisitorMut, VisitResult};
use std::convert::Infallible;
use std::ops::ControlFlow;

/// Rewrites all element pattern `WHERE` clauses in the program.
pub fn rewrite_element_pattern_where(program: &mut Program) {
    let mut rewriter = ElementWhereRewriter;
    let _ = rewriter.visit_program_mut(program);
}

struct ElementWhereRewriter;

impl PatternVisitorMut for ElementWhereRewriter {
    type Break = Infallible;

    fn visit_path_factor_mut(&mut self, factor: &mut PathFactor) -> VisitResult<Infallible> {
        visit::walk_path_factor_mut(self, factor)?;

        let Some(filler) = element_filler_mut(&mut factor.primary) else {
            return ControlFlow::Continue(());
        };
        if !matches!(filler.predicate, Some(ElementPatternPredicate::Where(_))) {
            return ControlFlow::Continue(());
        }
        let Some(ElementPatternPredicate::Where(where_clause)) = filler.predicate.take() else {
            unreachable!("checked above");
        };

        lift_to_parenthesized_where(factor, where_clause.condition, where_clause.span);
        ControlFlow::Continue(())
    }
}

pub(super) fn element_filler_mut(primary: &mut PathPrimary) -> Option<&mut ElementPatternFiller> {
    match primary {
        PathPrimary::Element(ElementPattern::Node(node)) => Some(&mut node.filler),
        PathPrimary::Element(ElementPattern::Edge(edge)) => edge.filler.as_mut(),
        _ => None,
    }
}

/// Replaces the factor's element primary by a parenthesized expression
/// containing the element, with `condition` as the attached `WHERE`.
///
/// The factor's quantifier stays on the factor and now quantifies the
/// parenthesized expression.
pub(super) fn lift_to_parenthesized_where(
    factor: &mut PathFactor,
    condition: crate::ast::Expression,
    where_span: crate::ast::Span,
) {
    let element_span = factor.primary.span().clone();
    let placeholder = PathPrimary::Element(ElementPattern::Node(NodePattern {
        filler: ElementPatternFiller::empty(element_span.clone()),
        span: element_span.clone(),
    }));
    let element_primary = std::mem::replace(&mut factor.primary, placeholder);

    let inner_factor = PathFactor {
        quantifier: PathQuantifier::None,
        primary: element_primary,
        span: element_span.clone(),
        aux: None,
    };
    let mut parenthesized =
        ParenthesizedPathPatternExpression::wrapping(inner_factor, element_span);
    parenthesized.where_clause = Some(ParenthesizedPathPatternWhereClause {
        condition,
        span: where_span,
        aux: None,
    });
    factor.primary = PathPrimary::Parenthesized(Box::new(parenthesized));
}
