//! AST foundation types and node structures.

pub mod expression;
pub mod pattern;
pub mod print;
pub mod visit;
mod span;

// Re-export span types
pub use span::{merge_spans, Span};

// Re-export expression types
pub use expression::{
    AggregateFunction, BinaryOperator, ComparisonOperator, Expression, Literal, PropertyReference,
    SetFunctionType, UnaryOperator, VariableReference,
};

// Re-export pattern types
pub use pattern::{
    EdgeDirection, EdgePattern, ElementPattern, ElementPatternFiller, ElementPatternPredicate,
    ElementPatternWhereClause, ElementPropertySpecification, ElementVariableDeclaration,
    GraphPattern, GraphPatternQuantifier, GraphPatternWhereClause, LabelExpression, MatchMode,
    MatchStatement, NodePattern, ParenthesizedPathPatternExpression,
    ParenthesizedPathPatternWhereClause, PathFactor, PathMode, PathPattern, PathPatternExpression,
    PathPatternList, PathPatternPrefix, PathPrimary, PathQuantifier, PathSearch, PathSearchPrefix,
    PathTerm, PathUnionOperator, PathVariableDeclaration, Program, PropertyKeyValuePair,
    SimplifiedContents, SimplifiedDirectionOverride, SimplifiedFactor,
    SimplifiedPathPatternExpression, SimplifiedPrimary, SimplifiedTerm, SimplifiedUnit,
    SubpathVariableDeclaration,
};

// Re-export visitor infrastructure
pub use visit::{PatternVisitor, PatternVisitorMut, VisitResult};

// Re-export the canonical printer
pub use print::{print_graph_pattern, print_program};
