//! Rewrite of element property predicates.
//!
//! Turns `(a {p: v, q: w})` into `((a) WHERE a.p = v AND a.q = w)`. An
//! anonymous element first receives a generated temporary variable
//! (`gql_gen_prop1`, `gql_gen_prop2`, ...); the conjunction is
//! left-associative in property order. The generator counter is scoped to
//! one rewrite run.
//!
//! The generated prefix is reserved: a user identifier carrying it is
//! rejected before any temporary is minted.

use crate::ast::expression::{
    ComparisonOperator, Expression, PropertyReference, VariableReference,
};
use crate::ast::pattern::*;
use crate::ast::visit::{self, PatternVisitor, PatternVisitorMut, VisitResult};
use crate::rewrite::element_where::{element_filler_mut, lift_to_parenthesized_where};
use crate::semantic::error::{AnalyzerError, ErrorCode, Result};
use smol_str::SmolStr;
use std::convert::Infallible;
use std::ops::ControlFlow;

/// Prefix reserved for generated temporary identifiers.
pub const GENERATED_NAME_PREFIX: &str = "gql_gen_prop";

/// Rewrites all element property predicates in the program.
pub fn rewrite_element_property_predicates(program: &mut Program) -> Result<()> {
    check_reserved_prefix(program)?;

    let mut rewriter = PropertyPredicateRewriter { last_generated_id: 0 };
    let _ = rewriter.visit_program_mut(program);
    Ok(())
}

struct PropertyPredicateRewriter {
    last_generated_id: u32,
}

impl PropertyPredicateRewriter {
    fn generate_name(&mut self) -> SmolStr {
        self.last_generated_id += 1;
        SmolStr::new(format!("{GENERATED_NAME_PREFIX}{}", self.last_generated_id))
    }
}

impl PatternVisitorMut for PropertyPredicateRewriter {
    type Break = Infallible;

    fn visit_path_factor_mut(&mut self, factor: &mut PathFactor) -> VisitResult<Infallible> {
        visit::walk_path_factor_mut(self, factor)?;

        let element_span = factor.primary.span().clone();
        let Some(filler) = element_filler_mut(&mut factor.primary) else {
            return ControlFlow::Continue(());
        };
        if !matches!(filler.predicate, Some(ElementPatternPredicate::Properties(_))) {
            return ControlFlow::Continue(());
        }
        let Some(ElementPatternPredicate::Properties(properties)) = filler.predicate.take()
        else {
            unreachable!("checked above");
        };
        if properties.properties.is_empty() {
            return ControlFlow::Continue(());
        }

        if filler.variable.is_none() {
            filler.variable = Some(ElementVariableDeclaration {
                name: self.generate_name(),
                is_temp: true,
                span: element_span.clone(),
            });
        }
        let variable = filler
            .variable
            .as_ref()
            .expect("variable present or just injected")
            .name
            .clone();

        let condition = property_conjunction(&variable, &element_span, properties);
        lift_to_parenthesized_where(factor, condition, element_span);
        ControlFlow::Continue(())
    }
}

/// Builds `v.p1 = v1 AND ... AND v.pn = vn`, left-associative in the order
/// the properties were written.
fn property_conjunction(
    variable: &SmolStr,
    element_span: &crate::ast::Span,
    properties: ElementPropertySpecification,
) -> Expression {
    let mut condition: Option<Expression> = None;
    for pair in properties.properties {
        let pair_span = pair.span.clone();
        let comparison = Expression::Comparison {
            op: ComparisonOperator::Equals,
            left: Box::new(Expression::Property(PropertyReference {
                base: Box::new(Expression::Variable(VariableReference {
                    name: variable.clone(),
                    span: element_span.clone(),
                })),
                property: pair.key,
                span: pair_span.clone(),
            })),
            right: Box::new(pair.value),
            span: pair_span,
        };
        condition = Some(match condition {
            None => comparison,
            Some(acc) => {
                let span = acc.span().start..comparison.span().end;
                Expression::Binary {
                    op: crate::ast::expression::BinaryOperator::And,
                    left: Box::new(acc),
                    right: Box::new(comparison),
                    span,
                }
            }
        });
    }
    condition.expect("at least one property")
}

/// Rejects user identifiers that collide with the reserved prefix.
fn check_reserved_prefix(program: &Program) -> Result<()> {
    struct PrefixChecker;

    impl PrefixChecker {
        fn check(&self, name: &str, span: &crate::ast::Span) -> VisitResult<AnalyzerError> {
            if name.starts_with(GENERATED_NAME_PREFIX) {
                ControlFlow::Break(AnalyzerError::new(
                    ErrorCode::E0100,
                    span.clone(),
                    format!(
                        "Identifier \"{name}\" uses the prefix \"{GENERATED_NAME_PREFIX}\" \
                         reserved for generated identifiers"
                    ),
                ))
            } else {
                ControlFlow::Continue(())
            }
        }
    }

    impl PatternVisitor for PrefixChecker {
        type Break = AnalyzerError;

        fn visit_path_pattern(&mut self, pattern: &PathPattern) -> VisitResult<AnalyzerError> {
            if let Some(variable) = &pattern.variable {
                self.check(&variable.name, &variable.span)?;
            }
            visit::walk_path_pattern(self, pattern)
        }

        fn visit_parenthesized(
            &mut self,
            parenthesized: &ParenthesizedPathPatternExpression,
        ) -> VisitResult<AnalyzerError> {
            if let Some(variable) = &parenthesized.subpath_variable {
                self.check(&variable.name, &variable.span)?;
            }
            visit::walk_parenthesized(self, parenthesized)
        }

        fn visit_element_pattern(
            &mut self,
            element: &ElementPattern,
        ) -> VisitResult<AnalyzerError> {
            let filler = match element {
                ElementPattern::Node(node) => Some(&node.filler),
                ElementPattern::Edge(edge) => edge.filler.as_ref(),
            };
            if let Some(variable) = filler.and_then(|f| f.variable.as_ref()) {
                if !variable.is_temp {
                    self.check(&variable.name, &variable.span)?;
                }
            }
            visit::walk_element_pattern(self, element)
        }
    }

    match PrefixChecker.visit_program(program) {
        ControlFlow::Continue(()) => Ok(()),
        ControlFlow::Break(error) => Err(error),
    }
}
