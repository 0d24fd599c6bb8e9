//! Pattern-focused AST visitor infrastructure.
//!
//! These visitors cover the `MATCH` pattern subtree, which is the surface the
//! rewriters and the analyzer operate on. Traversal order matches the
//! analyzer's own walk: path patterns left to right, terms and factors in
//! sequence, and for parenthesized expressions the inner pattern before the
//! attached `WHERE` clause.

use std::ops::ControlFlow;

use crate::ast::pattern::{
    ElementPattern, GraphPattern, GraphPatternWhereClause, LabelExpression, MatchStatement,
    ParenthesizedPathPatternExpression, ParenthesizedPathPatternWhereClause, PathFactor,
    PathPattern, PathPatternExpression, PathPrimary, PathTerm, Program,
};

macro_rules! try_visit {
    ($expr:expr) => {
        match $expr {
            ControlFlow::Continue(()) => {}
            ControlFlow::Break(b) => return ControlFlow::Break(b),
        }
    };
}

/// Shared type alias for visitor traversal methods.
pub type VisitResult<B> = ControlFlow<B>;

/// Immutable visitor over the pattern subtree.
pub trait PatternVisitor {
    /// Early-exit payload produced when traversal stops.
    type Break;

    fn visit_program(&mut self, program: &Program) -> VisitResult<Self::Break> {
        walk_program(self, program)
    }

    fn visit_match_statement(&mut self, statement: &MatchStatement) -> VisitResult<Self::Break> {
        walk_match_statement(self, statement)
    }

    fn visit_graph_pattern(&mut self, pattern: &GraphPattern) -> VisitResult<Self::Break> {
        walk_graph_pattern(self, pattern)
    }

    fn visit_path_pattern(&mut self, pattern: &PathPattern) -> VisitResult<Self::Break> {
        walk_path_pattern(self, pattern)
    }

    fn visit_path_pattern_expression(
        &mut self,
        expression: &PathPatternExpression,
    ) -> VisitResult<Self::Break> {
        walk_path_pattern_expression(self, expression)
    }

    fn visit_path_term(&mut self, term: &PathTerm) -> VisitResult<Self::Break> {
        walk_path_term(self, term)
    }

    fn visit_path_factor(&mut self, factor: &PathFactor) -> VisitResult<Self::Break> {
        walk_path_factor(self, factor)
    }

    fn visit_element_pattern(&mut self, element: &ElementPattern) -> VisitResult<Self::Break> {
        walk_element_pattern(self, element)
    }

    fn visit_parenthesized(
        &mut self,
        parenthesized: &ParenthesizedPathPatternExpression,
    ) -> VisitResult<Self::Break> {
        walk_parenthesized(self, parenthesized)
    }

    fn visit_label_expression(&mut self, _label: &LabelExpression) -> VisitResult<Self::Break> {
        ControlFlow::Continue(())
    }

    fn visit_parenthesized_where_clause(
        &mut self,
        _clause: &ParenthesizedPathPatternWhereClause,
    ) -> VisitResult<Self::Break> {
        ControlFlow::Continue(())
    }

    fn visit_graph_pattern_where_clause(
        &mut self,
        _clause: &GraphPatternWhereClause,
    ) -> VisitResult<Self::Break> {
        ControlFlow::Continue(())
    }
}

/// Mutable visitor over the pattern subtree, used by the rewriters.
pub trait PatternVisitorMut {
    /// Early-exit payload produced when traversal stops.
    type Break;

    fn visit_program_mut(&mut self, program: &mut Program) -> VisitResult<Self::Break> {
        walk_program_mut(self, program)
    }

    fn visit_match_statement_mut(
        &mut self,
        statement: &mut MatchStatement,
    ) -> VisitResult<Self::Break> {
        walk_match_statement_mut(self, statement)
    }

    fn visit_graph_pattern_mut(&mut self, pattern: &mut GraphPattern) -> VisitResult<Self::Break> {
        walk_graph_pattern_mut(self, pattern)
    }

    fn visit_path_pattern_mut(&mut self, pattern: &mut PathPattern) -> VisitResult<Self::Break> {
        walk_path_pattern_mut(self, pattern)
    }

    fn visit_path_pattern_expression_mut(
        &mut self,
        expression: &mut PathPatternExpression,
    ) -> VisitResult<Self::Break> {
        walk_path_pattern_expression_mut(self, expression)
    }

    fn visit_path_term_mut(&mut self, term: &mut PathTerm) -> VisitResult<Self::Break> {
        walk_path_term_mut(self, term)
    }

    fn visit_path_factor_mut(&mut self, factor: &mut PathFactor) -> VisitResult<Self::Break> {
        walk_path_factor_mut(self, factor)
    }

    fn visit_element_pattern_mut(
        &mut self,
        element: &mut ElementPattern,
    ) -> VisitResult<Self::Break> {
        walk_element_pattern_mut(self, element)
    }

    fn visit_parenthesized_mut(
        &mut self,
        parenthesized: &mut ParenthesizedPathPatternExpression,
    ) -> VisitResult<Self::Break> {
        walk_parenthesized_mut(self, parenthesized)
    }

    fn visit_label_expression_mut(
        &mut self,
        _label: &mut LabelExpression,
    ) -> VisitResult<Self::Break> {
        ControlFlow::Continue(())
    }

    fn visit_parenthesized_where_clause_mut(
        &mut self,
        _clause: &mut ParenthesizedPathPatternWhereClause,
    ) -> VisitResult<Self::Break> {
        ControlFlow::Continue(())
    }

    fn visit_graph_pattern_where_clause_mut(
        &mut self,
        _clause: &mut GraphPatternWhereClause,
    ) -> VisitResult<Self::Break> {
        ControlFlow::Continue(())
    }
}

/// Walks a full program with an immutable visitor.
pub fn walk_program<V: PatternVisitor + ?Sized>(
    visitor: &mut V,
    program: &Program,
) -> VisitResult<V::Break> {
    for statement in &program.statements {
        try_visit!(visitor.visit_match_statement(statement));
    }
    ControlFlow::Continue(())
}

/// Walks a match statement with an immutable visitor.
pub fn walk_match_statement<V: PatternVisitor + ?Sized>(
    visitor: &mut V,
    statement: &MatchStatement,
) -> VisitResult<V::Break> {
    visitor.visit_graph_pattern(&statement.pattern)
}

/// Walks a graph pattern with an immutable visitor.
pub fn walk_graph_pattern<V: PatternVisitor + ?Sized>(
    visitor: &mut V,
    pattern: &GraphPattern,
) -> VisitResult<V::Break> {
    for path in &pattern.paths.patterns {
        try_visit!(visitor.visit_path_pattern(path));
    }
    if let Some(where_clause) = &pattern.where_clause {
        try_visit!(visitor.visit_graph_pattern_where_clause(where_clause));
    }
    ControlFlow::Continue(())
}

/// Walks a path pattern with an immutable visitor.
pub fn walk_path_pattern<V: PatternVisitor + ?Sized>(
    visitor: &mut V,
    pattern: &PathPattern,
) -> VisitResult<V::Break> {
    visitor.visit_path_pattern_expression(&pattern.expression)
}

/// Walks a path pattern expression with an immutable visitor.
pub fn walk_path_pattern_expression<V: PatternVisitor + ?Sized>(
    visitor: &mut V,
    expression: &PathPatternExpression,
) -> VisitResult<V::Break> {
    for term in &expression.terms {
        try_visit!(visitor.visit_path_term(term));
    }
    ControlFlow::Continue(())
}

/// Walks a path term with an immutable visitor.
pub fn walk_path_term<V: PatternVisitor + ?Sized>(
    visitor: &mut V,
    term: &PathTerm,
) -> VisitResult<V::Break> {
    for factor in &term.factors {
        try_visit!(visitor.visit_path_factor(factor));
    }
    ControlFlow::Continue(())
}

/// Walks a path factor with an immutable visitor.
pub fn walk_path_factor<V: PatternVisitor + ?Sized>(
    visitor: &mut V,
    factor: &PathFactor,
) -> VisitResult<V::Break> {
    match &factor.primary {
        PathPrimary::Element(element) => visitor.visit_element_pattern(element),
        PathPrimary::Parenthesized(parenthesized) => visitor.visit_parenthesized(parenthesized),
        PathPrimary::Simplified(_) => ControlFlow::Continue(()),
    }
}

/// Walks an element pattern with an immutable visitor.
pub fn walk_element_pattern<V: PatternVisitor + ?Sized>(
    visitor: &mut V,
    element: &ElementPattern,
) -> VisitResult<V::Break> {
    let filler = match element {
        ElementPattern::Node(node) => Some(&node.filler),
        ElementPattern::Edge(edge) => edge.filler.as_ref(),
    };
    if let Some(filler) = filler {
        if let Some(label) = &filler.label {
            try_visit!(visitor.visit_label_expression(label));
        }
    }
    ControlFlow::Continue(())
}

/// Walks a parenthesized path pattern expression with an immutable visitor.
///
/// The inner pattern is visited before the `WHERE` clause, mirroring the
/// analyzer's registration order for search conditions.
pub fn walk_parenthesized<V: PatternVisitor + ?Sized>(
    visitor: &mut V,
    parenthesized: &ParenthesizedPathPatternExpression,
) -> VisitResult<V::Break> {
    try_visit!(visitor.visit_path_pattern_expression(&parenthesized.pattern));
    if let Some(where_clause) = &parenthesized.where_clause {
        try_visit!(visitor.visit_parenthesized_where_clause(where_clause));
    }
    ControlFlow::Continue(())
}

/// Walks a full program with a mutable visitor.
pub fn walk_program_mut<V: PatternVisitorMut + ?Sized>(
    visitor: &mut V,
    program: &mut Program,
) -> VisitResult<V::Break> {
    for statement in &mut program.statements {
        try_visit!(visitor.visit_match_statement_mut(statement));
    }
    ControlFlow::Continue(())
}

/// Walks a match statement with a mutable visitor.
pub fn walk_match_statement_mut<V: PatternVisitorMut + ?Sized>(
    visitor: &mut V,
    statement: &mut MatchStatement,
) -> VisitResult<V::Break> {
    visitor.visit_graph_pattern_mut(&mut statement.pattern)
}

/// Walks a graph pattern with a mutable visitor.
pub fn walk_graph_pattern_mut<V: PatternVisitorMut + ?Sized>(
    visitor: &mut V,
    pattern: &mut GraphPattern,
) -> VisitResult<V::Break> {
    for path in &mut pattern.paths.patterns {
        try_visit!(visitor.visit_path_pattern_mut(path));
    }
    if let Some(where_clause) = &mut pattern.where_clause {
        try_visit!(visitor.visit_graph_pattern_where_clause_mut(where_clause));
    }
    ControlFlow::Continue(())
}

/// Walks a path pattern with a mutable visitor.
pub fn walk_path_pattern_mut<V: PatternVisitorMut + ?Sized>(
    visitor: &mut V,
    pattern: &mut PathPattern,
) -> VisitResult<V::Break> {
    visitor.visit_path_pattern_expression_mut(&mut pattern.expression)
}

/// Walks a path pattern expression with a mutable visitor.
pub fn walk_path_pattern_expression_mut<V: PatternVisitorMut + ?Sized>(
    visitor: &mut V,
    expression: &mut PathPatternExpression,
) -> VisitResult<V::Break> {
    for term in &mut expression.terms {
        try_visit!(visitor.visit_path_term_mut(term));
    }
    ControlFlow::Continue(())
}

/// Walks a path term with a mutable visitor.
pub fn walk_path_term_mut<V: PatternVisitorMut + ?Sized>(
    visitor: &mut V,
    term: &mut PathTerm,
) -> VisitResult<V::Break> {
    for factor in &mut term.factors {
        try_visit!(visitor.visit_path_factor_mut(factor));
    }
    ControlFlow::Continue(())
}

/// Walks a path factor with a mutable visitor.
pub fn walk_path_factor_mut<V: PatternVisitorMut + ?Sized>(
    visitor: &mut V,
    factor: &mut PathFactor,
) -> VisitResult<V::Break> {
    match &mut factor.primary {
        PathPrimary::Element(element) => visitor.visit_element_pattern_mut(element),
        PathPrimary::Parenthesized(parenthesized) => {
            visitor.visit_parenthesized_mut(parenthesized)
        }
        PathPrimary::Simplified(_) => ControlFlow::Continue(()),
    }
}

/// Walks an element pattern with a mutable visitor.
pub fn walk_element_pattern_mut<V: PatternVisitorMut + ?Sized>(
    visitor: &mut V,
    element: &mut ElementPattern,
) -> VisitResult<V::Break> {
    let filler = match element {
        ElementPattern::Node(node) => Some(&mut node.filler),
        ElementPattern::Edge(edge) => edge.filler.as_mut(),
    };
    if let Some(filler) = filler {
        if let Some(label) = &mut filler.label {
            try_visit!(visitor.visit_label_expression_mut(label));
        }
    }
    ControlFlow::Continue(())
}

/// Walks a parenthesized path pattern expression with a mutable visitor.
pub fn walk_parenthesized_mut<V: PatternVisitorMut + ?Sized>(
    visitor: &mut V,
    parenthesized: &mut ParenthesizedPathPatternExpression,
) -> VisitResult<V::Break> {
    try_visit!(visitor.visit_path_pattern_expression_mut(&mut parenthesized.pattern));
    if let Some(where_clause) = &mut parenthesized.where_clause {
        try_visit!(visitor.visit_parenthesized_where_clause_mut(where_clause));
    }
    ControlFlow::Continue(())
}
