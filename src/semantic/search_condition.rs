//! Search-condition scoping and reference resolution.
//!
//! Every `WHERE` inside a pattern is registered with the lexical scope it
//! was in. After the whole graph pattern is processed, each condition's
//! expression is checked against the final visibility oracle: adjacent
//! union operands and other path patterns of a selective pattern are
//! inaccessible, group-degree variables resolve only locally and only in
//! aggregate arguments, and everything resolvable is recorded into the
//! clause's aux data.

use crate::ast::expression::Expression;
use crate::ast::Span;
use crate::semantic::aux_data::GraphPatternWhereClauseAuxData;
use crate::semantic::context::{FinalizedPattern, VariableScopeId};
use crate::semantic::error::{AnalyzerError, ErrorCode, Result};
use crate::semantic::value_type::{expect_singleton, value_type_of_variable};
use smol_str::SmolStr;
use std::collections::{HashMap, HashSet};

/// The recorded lexical visibility context of one `WHERE` clause.
#[derive(Debug, Clone)]
pub struct SearchConditionScope {
    /// The lexical variable scope active at registration.
    pub variable_scope: VariableScopeId,

    /// For conditions registered inside a selective path pattern: the set of
    /// variables that pattern declares. References outside the set are
    /// rejected.
    pub scope: Option<HashSet<SmolStr>>,

    /// Per variable, how many of its declarations sit in union operands
    /// adjacent to the one holding this condition. After finalization only
    /// variables with no other declaration remain, and those are
    /// inaccessible.
    pub inaccessible_variables: HashMap<SmolStr, u32>,
}

/// Why a reference is inaccessible from a search condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InaccessibleReason {
    ReferenceToAdjacentUnionOperand,
    NonLocalReferenceWithGroupDegreeOfReference,
    ReferenceFromSelectivePathPattern,
}

impl InaccessibleReason {
    fn into_error(self, span: &Span) -> AnalyzerError {
        match self {
            InaccessibleReason::ReferenceToAdjacentUnionOperand => AnalyzerError::new(
                ErrorCode::E0051,
                span.clone(),
                "Cannot reference variable in the adjacent union operand",
            ),
            InaccessibleReason::NonLocalReferenceWithGroupDegreeOfReference => AnalyzerError::new(
                ErrorCode::E0052,
                span.clone(),
                "Cannot reference non-local variable with group degree of reference",
            ),
            InaccessibleReason::ReferenceFromSelectivePathPattern => AnalyzerError::new(
                ErrorCode::E0053,
                span.clone(),
                "Cannot reference variables in other path patterns from selective path pattern",
            ),
        }
    }
}

/// Checks one search condition against the finalized pattern state,
/// producing the clause's aux data.
pub fn check_search_condition(
    finalized: &FinalizedPattern,
    scope: &SearchConditionScope,
    condition: &Expression,
) -> Result<GraphPatternWhereClauseAuxData> {
    let mut aux = GraphPatternWhereClauseAuxData::default();
    walk_condition(finalized, scope, condition, false, &mut aux)?;
    Ok(aux)
}

fn walk_condition(
    finalized: &FinalizedPattern,
    scope: &SearchConditionScope,
    expression: &Expression,
    in_aggregate: bool,
    aux: &mut GraphPatternWhereClauseAuxData,
) -> Result<()> {
    match expression {
        Expression::Variable(var) => {
            resolve_reference(finalized, scope, &var.name, &var.span, in_aggregate, aux)
        }
        Expression::Property(prop) => {
            walk_condition(finalized, scope, &prop.base, in_aggregate, aux)
        }
        Expression::Literal(..) => Ok(()),
        Expression::Unary { operand, .. } => {
            walk_condition(finalized, scope, operand, in_aggregate, aux)
        }
        Expression::Binary { left, right, .. } | Expression::Comparison { left, right, .. } => {
            walk_condition(finalized, scope, left, in_aggregate, aux)?;
            walk_condition(finalized, scope, right, in_aggregate, aux)
        }
        Expression::Aggregate(agg) => {
            // Group-degree variables are legal inside aggregate arguments.
            walk_condition(finalized, scope, &agg.argument, true, aux)
        }
        Expression::Parenthesized(inner, _) => {
            walk_condition(finalized, scope, inner, in_aggregate, aux)
        }
    }
}

fn resolve_reference(
    finalized: &FinalizedPattern,
    scope: &SearchConditionScope,
    name: &SmolStr,
    span: &Span,
    in_aggregate: bool,
    aux: &mut GraphPatternWhereClauseAuxData,
) -> Result<()> {
    if scope.inaccessible_variables.contains_key(name) {
        return Err(InaccessibleReason::ReferenceToAdjacentUnionOperand.into_error(span));
    }

    if let Some(declared) = &scope.scope {
        if !declared.contains(name) && finalized.variables.contains_key(name) {
            return Err(InaccessibleReason::ReferenceFromSelectivePathPattern.into_error(span));
        }
    }

    // Walk the lexical scope chain from the innermost scope outward.
    let mut current = Some(scope.variable_scope);
    let mut is_local = true;
    while let Some(id) = current {
        let variable_scope = &finalized.variable_scopes[id];
        if let Some(variable) = variable_scope.local_variables.get(name) {
            if variable.degree.is_group() && !is_local {
                return Err(
                    InaccessibleReason::NonLocalReferenceWithGroupDegreeOfReference
                        .into_error(span),
                );
            }
            if !in_aggregate {
                expect_singleton(&value_type_of_variable(variable), span)?;
            }
            aux.referenced_variables.insert(name.clone(), *variable);
            return Ok(());
        }
        current = variable_scope.parent;
        is_local = false;
    }

    if finalized.variables.contains_key(name) {
        // In the working table but not in the current working record.
        return Err(AnalyzerError::new(
            ErrorCode::E0113,
            span.clone(),
            format!(
                "There is no field \"{name}\" in current working record. Probably, \
                 aggregating expression is missing"
            ),
        ));
    }
    Err(AnalyzerError::new(
        ErrorCode::E0054,
        span.clone(),
        format!("Reference to unknown field \"{name}\""),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::expression::VariableReference;
    use crate::semantic::aux_data::{DegreeOfExposure, Variable, VariableKind};
    use crate::semantic::context::VariableScope;

    fn variable(kind: VariableKind, degree: DegreeOfExposure) -> Variable {
        Variable {
            kind,
            degree,
            is_temp: false,
        }
    }

    fn reference(name: &str) -> Expression {
        Expression::Variable(VariableReference {
            name: SmolStr::new(name),
            span: 0..1,
        })
    }

    fn finalized_with_scopes(scopes: Vec<VariableScope>) -> FinalizedPattern {
        let mut variables = HashMap::new();
        let mut declaration_spans = HashMap::new();
        for scope in &scopes {
            for (name, var) in &scope.local_variables {
                variables.insert(name.clone(), *var);
                declaration_spans.insert(name.clone(), 0..1);
            }
        }
        FinalizedPattern {
            variables,
            declaration_spans,
            search_condition_scopes: Vec::new(),
            variable_scopes: scopes,
        }
    }

    fn plain_scope(id: VariableScopeId) -> SearchConditionScope {
        SearchConditionScope {
            variable_scope: id,
            scope: None,
            inaccessible_variables: HashMap::new(),
        }
    }

    #[test]
    fn resolves_local_singleton() {
        let mut root = VariableScope::default();
        root.local_variables.insert(
            SmolStr::new("a"),
            variable(VariableKind::Node, DegreeOfExposure::UnconditionalSingleton),
        );
        let finalized = finalized_with_scopes(vec![root]);

        let aux = check_search_condition(&finalized, &plain_scope(0), &reference("a")).unwrap();
        assert_eq!(
            aux.referenced_variables["a"].degree,
            DegreeOfExposure::UnconditionalSingleton
        );
    }

    #[test]
    fn unknown_reference_is_rejected() {
        let finalized = finalized_with_scopes(vec![VariableScope::default()]);
        let err =
            check_search_condition(&finalized, &plain_scope(0), &reference("zz")).unwrap_err();
        assert_eq!(err.code, ErrorCode::E0054);
    }

    #[test]
    fn working_table_only_reference_is_rejected() {
        // The variable exists in the working table but no scope on the
        // chain carries it in its working record.
        let mut finalized = finalized_with_scopes(vec![VariableScope::default()]);
        finalized.variables.insert(
            SmolStr::new("g"),
            variable(VariableKind::Node, DegreeOfExposure::UnconditionalSingleton),
        );
        let err =
            check_search_condition(&finalized, &plain_scope(0), &reference("g")).unwrap_err();
        assert_eq!(err.code, ErrorCode::E0113);
    }

    #[test]
    fn adjacent_union_operand_is_rejected() {
        let mut root = VariableScope::default();
        root.local_variables.insert(
            SmolStr::new("d"),
            variable(VariableKind::Edge, DegreeOfExposure::ConditionalSingleton),
        );
        let finalized = finalized_with_scopes(vec![root]);

        let mut scope = plain_scope(0);
        scope
            .inaccessible_variables
            .insert(SmolStr::new("d"), 1);
        let err = check_search_condition(&finalized, &scope, &reference("d")).unwrap_err();
        assert_eq!(err.code, ErrorCode::E0051);
    }

    #[test]
    fn selective_scope_excludes_outside_variables() {
        let mut root = VariableScope::default();
        root.local_variables.insert(
            SmolStr::new("x"),
            variable(VariableKind::Node, DegreeOfExposure::UnconditionalSingleton),
        );
        let finalized = finalized_with_scopes(vec![root]);

        let mut scope = plain_scope(0);
        scope.scope = Some(HashSet::from([SmolStr::new("a")]));
        let err = check_search_condition(&finalized, &scope, &reference("x")).unwrap_err();
        assert_eq!(err.code, ErrorCode::E0053);
    }

    #[test]
    fn nonlocal_group_reference_is_rejected() {
        // Scope 0 is the root holding the group variable; scope 1 is an
        // inner scope where the condition was registered.
        let mut root = VariableScope::default();
        root.local_variables.insert(
            SmolStr::new("b"),
            variable(VariableKind::Edge, DegreeOfExposure::EffectivelyBoundedGroup),
        );
        let inner = VariableScope {
            parent: Some(0),
            local_variables: HashMap::new(),
        };
        let finalized = finalized_with_scopes(vec![root, inner]);

        let err =
            check_search_condition(&finalized, &plain_scope(1), &reference("b")).unwrap_err();
        assert_eq!(err.code, ErrorCode::E0052);
    }

    #[test]
    fn local_group_requires_aggregate_position() {
        let mut root = VariableScope::default();
        root.local_variables.insert(
            SmolStr::new("b"),
            variable(VariableKind::Edge, DegreeOfExposure::EffectivelyBoundedGroup),
        );
        let finalized = finalized_with_scopes(vec![root]);

        let err =
            check_search_condition(&finalized, &plain_scope(0), &reference("b")).unwrap_err();
        assert_eq!(err.code, ErrorCode::E0055);

        use crate::ast::expression::{AggregateFunction, SetFunctionType};
        let aggregated = Expression::Aggregate(AggregateFunction {
            function: SetFunctionType::Count,
            distinct: false,
            argument: Box::new(reference("b")),
            span: 0..8,
        });
        let aux = check_search_condition(&finalized, &plain_scope(0), &aggregated).unwrap();
        assert_eq!(
            aux.referenced_variables["b"].degree,
            DegreeOfExposure::EffectivelyBoundedGroup
        );
    }
}
