//! Search-condition scoping tests.
//!
//! Accessibility of variables from `WHERE` clauses across union operands,
//! selective path patterns, and group-degree binding contexts, plus the
//! `referenced_variables` aux data written back onto the clauses.

mod common;

use common::{analyze, analyze_err, analyze_with_output, assert_error_code};
use gql_analyzer::ast::pattern::PathPrimary;
use gql_analyzer::semantic::{DegreeOfExposure, ErrorCode, VariableKind};

#[test]
fn reference_to_adjacent_union_operand_is_rejected() {
    let err = analyze_err("MATCH ((a)-[b]->(c) WHERE d.prop = 1) | (a)-[d]->(e)");
    assert_error_code(&err, ErrorCode::E0051);
}

#[test]
fn variable_declared_in_both_operands_is_accessible() {
    let (program, output) =
        analyze_with_output("MATCH ((a)-[b]->(c) WHERE a.p = 1) | ((a)-[d]->(e))");

    // The deferred bookkeeping resolved `a` in favor of accessibility;
    // variables declared only in the adjacent operand stay inaccessible.
    assert_eq!(output.search_condition_scopes.len(), 1);
    let scope = &output.search_condition_scopes[0];
    assert!(!scope.inaccessible_variables.contains_key("a"));
    assert!(scope.inaccessible_variables.contains_key("d"));
    assert!(scope.inaccessible_variables.contains_key("e"));

    // The clause aux data records the resolved reference.
    let term = &program.statements[0].pattern.paths.patterns[0].expression.terms[0];
    let PathPrimary::Parenthesized(paren) = &term.factors[0].primary else {
        panic!("expected parenthesized operand");
    };
    let aux = paren
        .where_clause
        .as_ref()
        .expect("where clause")
        .aux
        .as_ref()
        .expect("where aux");
    assert_eq!(aux.referenced_variables["a"].kind, VariableKind::Node);
    assert_eq!(
        aux.referenced_variables["a"].degree,
        DegreeOfExposure::UnconditionalSingleton
    );
}

#[test]
fn nonlocal_group_reference_is_rejected() {
    let err = analyze_err("MATCH ((a)-[b]->()){2} ((c) WHERE b.p = 1)");
    assert_error_code(&err, ErrorCode::E0052);
}

#[test]
fn selective_pattern_cannot_reference_other_patterns() {
    let err = analyze_err("MATCH (x), ANY SHORTEST ((a)-[b]->(c) WHERE x.p = 1)");
    assert_error_code(&err, ErrorCode::E0053);
}

#[test]
fn unknown_reference_is_rejected() {
    let err = analyze_err("MATCH ((a) WHERE zz.p = 1)");
    assert_error_code(&err, ErrorCode::E0054);
}

#[test]
fn local_group_reference_requires_aggregation() {
    let err = analyze_err("MATCH (((a)-[b]->()){2} WHERE b.p = 1)");
    assert_error_code(&err, ErrorCode::E0055);
}

#[test]
fn aggregated_group_reference_is_accepted() {
    let program = analyze("MATCH (((a)-[b]->()){2} WHERE COUNT(b) = 2)");
    let term = &program.statements[0].pattern.paths.patterns[0].expression.terms[0];
    let PathPrimary::Parenthesized(paren) = &term.factors[0].primary else {
        panic!("expected parenthesized primary");
    };
    let aux = paren
        .where_clause
        .as_ref()
        .expect("where clause")
        .aux
        .as_ref()
        .expect("where aux");
    assert_eq!(
        aux.referenced_variables["b"].degree,
        DegreeOfExposure::EffectivelyBoundedGroup
    );
    assert_eq!(aux.referenced_variables["b"].kind, VariableKind::Edge);
}

#[test]
fn graph_pattern_where_sees_all_pattern_variables() {
    let program = analyze("MATCH (a)-[b]->(c) WHERE a.age > 18 AND c.age > 18");
    let where_clause = program.statements[0]
        .pattern
        .where_clause
        .as_ref()
        .expect("graph where");
    let aux = where_clause.aux.as_ref().expect("where aux");
    assert!(aux.referenced_variables.contains_key("a"));
    assert!(aux.referenced_variables.contains_key("c"));
    assert!(!aux.referenced_variables.contains_key("b"));
}

#[test]
fn graph_pattern_where_aggregates_group_variables() {
    let program = analyze("MATCH TRAIL ((a)-[b]->)+ WHERE COUNT(b) > 2");
    let aux = program.statements[0]
        .pattern
        .where_clause
        .as_ref()
        .expect("graph where")
        .aux
        .as_ref()
        .expect("where aux");
    assert_eq!(
        aux.referenced_variables["b"].degree,
        DegreeOfExposure::EffectivelyBoundedGroup
    );

    let err = analyze_err("MATCH TRAIL ((a)-[b]->)+ WHERE b.p = 1");
    assert_error_code(&err, ErrorCode::E0055);
}

#[test]
fn outer_singleton_is_visible_inside_quantified_where() {
    // A singleton declared outside resolves fine from a condition nested
    // inside a quantified subpattern.
    let program = analyze("MATCH (a) (((b) WHERE b.p = a.p)-[e]->()){2}");
    let pattern = &program.statements[0].pattern;
    let variables = &pattern.aux.as_ref().expect("aux").variables;
    assert_eq!(
        variables["a"].degree,
        DegreeOfExposure::UnconditionalSingleton
    );
    assert_eq!(
        variables["b"].degree,
        DegreeOfExposure::EffectivelyBoundedGroup
    );
}

#[test]
fn selective_scope_is_stamped_on_conditions() {
    let (_, output) = analyze_with_output("MATCH ANY SHORTEST ((a)-[b]->(c) WHERE a.p = 1)");
    assert_eq!(output.search_condition_scopes.len(), 1);
    let scope = output.search_condition_scopes[0]
        .scope
        .as_ref()
        .expect("selective scope set");
    for name in ["a", "b", "c"] {
        assert!(scope.contains(name), "missing {name} in selective scope");
    }
}

#[test]
fn scopes_are_reported_in_registration_order() {
    let (_, output) = analyze_with_output(
        "MATCH (((a) WHERE a.p = 1)-[b]->(c) WHERE b.q = 2) WHERE c.r = 3",
    );
    // Inner parenthesized WHERE, outer parenthesized WHERE, graph WHERE.
    assert_eq!(output.search_condition_scopes.len(), 3);
}
