//! Canonical AST printer.
//!
//! Reconstructs query text from a (possibly rewritten) pattern AST. The
//! output is canonical rather than source-preserving: tokens are separated
//! by single spaces except around bracket characters, and node/edge element
//! junctions are glued so `(a)-[b]->(c)` prints without inner spaces. The
//! rewrite tests compare surface forms through this printer.

use crate::ast::expression::{
    AggregateFunction, BinaryOperator, Expression, Literal, UnaryOperator,
};
use crate::ast::pattern::*;

/// Accumulates output tokens with automatic spacing.
///
/// A token is separated from the previous one by a single space unless the
/// previous token ended with an opening bracket, the next token starts with
/// a closing bracket or comma, or a glue was requested.
struct OutputStream {
    out: String,
    no_break: bool,
}

impl OutputStream {
    fn new() -> Self {
        Self {
            out: String::new(),
            no_break: false,
        }
    }

    /// Suppresses the separator before the next token.
    fn glue(&mut self) {
        self.no_break = true;
    }

    fn token(&mut self, text: &str) {
        let Some(first) = text.chars().next() else {
            return;
        };
        if self.no_break {
            self.no_break = false;
        } else if !matches!(first, ')' | '}' | ']' | ',') {
            if let Some(last) = self.out.chars().last() {
                if !last.is_whitespace() && !matches!(last, '(' | '{' | '[') {
                    self.out.push(' ');
                }
            }
        }
        self.out.push_str(text);
    }

    fn finish(self) -> String {
        self.out
    }
}

/// Prints a full program.
pub fn print_program(program: &Program) -> String {
    let mut os = OutputStream::new();
    for statement in &program.statements {
        print_match_statement(&mut os, statement);
    }
    os.finish()
}

/// Prints a single graph pattern (without the `MATCH` keyword).
pub fn print_graph_pattern(pattern: &GraphPattern) -> String {
    let mut os = OutputStream::new();
    graph_pattern(&mut os, pattern);
    os.finish()
}

fn print_match_statement(os: &mut OutputStream, statement: &MatchStatement) {
    os.token("MATCH");
    graph_pattern(os, &statement.pattern);
}

fn graph_pattern(os: &mut OutputStream, pattern: &GraphPattern) {
    match pattern.match_mode {
        Some(MatchMode::RepeatableElements) => {
            os.token("REPEATABLE");
            os.token("ELEMENTS");
        }
        Some(MatchMode::DifferentEdges) => {
            os.token("DIFFERENT");
            os.token("EDGES");
        }
        None => {}
    }
    for (i, path) in pattern.paths.patterns.iter().enumerate() {
        if i > 0 {
            os.token(",");
        }
        path_pattern(os, path);
    }
    if let Some(where_clause) = &pattern.where_clause {
        os.token("WHERE");
        expression(os, &where_clause.condition);
    }
}

fn path_pattern(os: &mut OutputStream, pattern: &PathPattern) {
    if let Some(var) = &pattern.variable {
        os.token(&var.name);
        os.token("=");
    }
    if let Some(prefix) = &pattern.prefix {
        path_pattern_prefix(os, prefix);
    }
    path_pattern_expression(os, &pattern.expression);
}

fn path_pattern_prefix(os: &mut OutputStream, prefix: &PathPatternPrefix) {
    match prefix {
        PathPatternPrefix::PathMode(mode) => os.token(mode.as_str()),
        PathPatternPrefix::PathSearch(search) => {
            match &search.search {
                PathSearch::All => os.token("ALL"),
                PathSearch::Any { count } => {
                    os.token("ANY");
                    if let Some(count) = count {
                        os.token(count);
                    }
                }
                PathSearch::AllShortest => {
                    os.token("ALL");
                    os.token("SHORTEST");
                }
                PathSearch::AnyShortest => {
                    os.token("ANY");
                    os.token("SHORTEST");
                }
                PathSearch::CountedShortest { count } => {
                    os.token("SHORTEST");
                    os.token(count);
                }
                PathSearch::CountedShortestGroups { count } => {
                    os.token("SHORTEST");
                    if let Some(count) = count {
                        os.token(count);
                    }
                    os.token("GROUPS");
                }
            }
            if search.mode != PathMode::Walk {
                os.token(search.mode.as_str());
            }
        }
    }
}

fn path_pattern_expression(os: &mut OutputStream, expression: &PathPatternExpression) {
    let op = match expression.op {
        PathUnionOperator::Union => "|",
        PathUnionOperator::Alternation => "|+|",
    };
    for (i, term) in expression.terms.iter().enumerate() {
        if i > 0 {
            os.token(op);
        }
        path_term(os, term);
    }
}

/// Classification of a factor for junction gluing.
#[derive(PartialEq, Eq, Clone, Copy)]
enum FactorShape {
    NodeElement,
    EdgeElement,
    Other,
}

fn factor_shape(factor: &PathFactor) -> FactorShape {
    if !matches!(factor.quantifier, PathQuantifier::None) {
        return FactorShape::Other;
    }
    match &factor.primary {
        PathPrimary::Element(ElementPattern::Node(_)) => FactorShape::NodeElement,
        PathPrimary::Element(ElementPattern::Edge(_)) => FactorShape::EdgeElement,
        _ => FactorShape::Other,
    }
}

fn path_term(os: &mut OutputStream, term: &PathTerm) {
    let mut prev: Option<FactorShape> = None;
    for factor in &term.factors {
        let shape = factor_shape(factor);
        if let Some(prev) = prev {
            let glued = matches!(
                (prev, shape),
                (FactorShape::NodeElement, FactorShape::EdgeElement)
                    | (FactorShape::EdgeElement, FactorShape::NodeElement)
            );
            if glued {
                os.glue();
            }
        }
        path_factor(os, factor);
        prev = Some(shape);
    }
}

fn path_factor(os: &mut OutputStream, factor: &PathFactor) {
    match &factor.primary {
        PathPrimary::Element(element) => element_pattern(os, element),
        PathPrimary::Parenthesized(parenthesized) => {
            parenthesized_expression(os, parenthesized)
        }
        PathPrimary::Simplified(simplified) => simplified_expression(os, simplified),
    }
    match &factor.quantifier {
        PathQuantifier::None => {}
        PathQuantifier::Questioned => os.token("?"),
        PathQuantifier::Quantified(q) => os.token(&quantifier_text(q)),
    }
}

fn quantifier_text(q: &GraphPatternQuantifier) -> String {
    match (q.lower, q.upper) {
        (0, None) => "*".to_string(),
        (1, None) => "+".to_string(),
        (lower, None) => format!("{{{lower},}}"),
        (lower, Some(upper)) if lower == upper => format!("{{{lower}}}"),
        (lower, Some(upper)) => format!("{{{lower}, {upper}}}"),
    }
}

fn element_pattern(os: &mut OutputStream, element: &ElementPattern) {
    match element {
        ElementPattern::Node(node) => {
            os.token("(");
            element_filler(os, &node.filler);
            os.token(")");
        }
        ElementPattern::Edge(edge) => edge_pattern(os, edge),
    }
}

fn edge_pattern(os: &mut OutputStream, edge: &EdgePattern) {
    match &edge.filler {
        Some(filler) => {
            let (open, close) = match edge.direction {
                EdgeDirection::PointingLeft => ("<-[", "]-"),
                EdgeDirection::PointingRight => ("-[", "]->"),
                EdgeDirection::AnyDirection => ("-[", "]-"),
                EdgeDirection::Undirected => ("~[", "]~"),
                EdgeDirection::LeftOrUndirected => ("<~[", "]~"),
                EdgeDirection::RightOrUndirected => ("~[", "]~>"),
                EdgeDirection::LeftOrRight => ("<-[", "]->"),
            };
            os.token(open);
            element_filler(os, filler);
            os.token(close);
        }
        None => {
            let glyph = match edge.direction {
                EdgeDirection::PointingLeft => "<-",
                EdgeDirection::PointingRight => "->",
                EdgeDirection::AnyDirection => "-",
                EdgeDirection::Undirected => "~",
                EdgeDirection::LeftOrUndirected => "<~",
                EdgeDirection::RightOrUndirected => "~>",
                EdgeDirection::LeftOrRight => "<->",
            };
            os.token(glyph);
        }
    }
}

fn element_filler(os: &mut OutputStream, filler: &ElementPatternFiller) {
    if let Some(var) = &filler.variable {
        if var.is_temp {
            os.token("TEMP");
        }
        os.token(&var.name);
    }
    if let Some(label) = &filler.label {
        os.token(":");
        os.glue();
        os.token(&label_text(label));
    }
    match &filler.predicate {
        Some(ElementPatternPredicate::Where(where_clause)) => {
            os.token("WHERE");
            expression(os, &where_clause.condition);
        }
        Some(ElementPatternPredicate::Properties(properties)) => {
            os.token("{");
            for (i, pair) in properties.properties.iter().enumerate() {
                if i > 0 {
                    os.token(",");
                }
                os.token(&pair.key);
                os.glue();
                os.token(":");
                expression(os, &pair.value);
            }
            os.token("}");
        }
        None => {}
    }
}

/// Renders a label expression without inner spacing.
fn label_text(label: &LabelExpression) -> String {
    match label {
        LabelExpression::Name(name, _) => name.to_string(),
        LabelExpression::Wildcard(_) => "%".to_string(),
        LabelExpression::Negation(inner, _) => format!("!{}", label_text(inner)),
        LabelExpression::Conjunction(parts, _) => parts
            .iter()
            .map(label_text)
            .collect::<Vec<_>>()
            .join("&"),
        LabelExpression::Disjunction(parts, _) => parts
            .iter()
            .map(label_text)
            .collect::<Vec<_>>()
            .join("|"),
        LabelExpression::Parenthesized(inner, _) => format!("({})", label_text(inner)),
    }
}

fn parenthesized_expression(
    os: &mut OutputStream,
    parenthesized: &ParenthesizedPathPatternExpression,
) {
    os.token("(");
    if let Some(var) = &parenthesized.subpath_variable {
        os.token(&var.name);
        os.token("=");
    }
    if parenthesized.path_mode != PathMode::Walk {
        os.token(parenthesized.path_mode.as_str());
    }
    path_pattern_expression(os, &parenthesized.pattern);
    if let Some(where_clause) = &parenthesized.where_clause {
        os.token("WHERE");
        expression(os, &where_clause.condition);
    }
    os.token(")");
}

fn simplified_expression(os: &mut OutputStream, simplified: &SimplifiedPathPatternExpression) {
    let (open, close) = match simplified.direction {
        EdgeDirection::PointingLeft => ("<-/", "/-"),
        EdgeDirection::PointingRight => ("-/", "/->"),
        EdgeDirection::AnyDirection => ("-/", "/-"),
        EdgeDirection::Undirected => ("~/", "/~"),
        EdgeDirection::LeftOrUndirected => ("<~/", "/~"),
        EdgeDirection::RightOrUndirected => ("~/", "/~>"),
        EdgeDirection::LeftOrRight => ("<-/", "/->"),
    };
    os.token(open);
    simplified_contents(os, &simplified.contents);
    os.token(close);
}

fn simplified_contents(os: &mut OutputStream, contents: &SimplifiedContents) {
    let op = match contents.op {
        PathUnionOperator::Union => "|",
        PathUnionOperator::Alternation => "|+|",
    };
    for (i, term) in contents.terms.iter().enumerate() {
        if i > 0 {
            os.token(op);
        }
        for factor in &term.factors {
            simplified_factor(os, factor);
        }
    }
}

fn simplified_factor(os: &mut OutputStream, factor: &SimplifiedFactor) {
    if matches!(
        factor.direction,
        Some(SimplifiedDirectionOverride::Left | SimplifiedDirectionOverride::LeftOrRight)
    ) {
        os.token("<");
        os.glue();
    }
    match &factor.primary {
        SimplifiedPrimary::Conjunction(units, _) => {
            for (i, unit) in units.iter().enumerate() {
                if i > 0 {
                    os.token("&");
                }
                simplified_unit(os, unit);
            }
        }
        SimplifiedPrimary::Unit(unit) => simplified_unit(os, unit),
    }
    if matches!(
        factor.direction,
        Some(SimplifiedDirectionOverride::Right | SimplifiedDirectionOverride::LeftOrRight)
    ) {
        os.glue();
        os.token(">");
    }
    match &factor.quantifier {
        PathQuantifier::None => {}
        PathQuantifier::Questioned => os.token("?"),
        PathQuantifier::Quantified(q) => os.token(&quantifier_text(q)),
    }
}

fn simplified_unit(os: &mut OutputStream, unit: &SimplifiedUnit) {
    match unit {
        SimplifiedUnit::Label(name, _) => os.token(name),
        SimplifiedUnit::Negation(inner, _) => {
            os.token("!");
            os.glue();
            simplified_unit(os, inner);
        }
        SimplifiedUnit::Parenthesized(contents, _) => {
            os.token("(");
            simplified_contents(os, contents);
            os.token(")");
        }
    }
}

fn expression(os: &mut OutputStream, expr: &Expression) {
    match expr {
        Expression::Variable(var) => os.token(&var.name),
        Expression::Property(prop) => {
            expression(os, &prop.base);
            os.glue();
            os.token(".");
            os.glue();
            os.token(&prop.property);
        }
        Expression::Literal(literal, _) => literal_token(os, literal),
        Expression::Unary { op, operand, .. } => {
            match op {
                UnaryOperator::Not => os.token("NOT"),
            }
            expression(os, operand);
        }
        Expression::Binary {
            op, left, right, ..
        } => {
            expression(os, left);
            os.token(match op {
                BinaryOperator::And => "AND",
                BinaryOperator::Or => "OR",
                BinaryOperator::Xor => "XOR",
            });
            expression(os, right);
        }
        Expression::Comparison {
            op, left, right, ..
        } => {
            expression(os, left);
            os.token(op.as_str());
            expression(os, right);
        }
        Expression::Aggregate(agg) => aggregate(os, agg),
        Expression::Parenthesized(inner, _) => {
            os.token("(");
            expression(os, inner);
            os.token(")");
        }
    }
}

fn aggregate(os: &mut OutputStream, agg: &AggregateFunction) {
    os.token(agg.function.as_str());
    os.glue();
    os.token("(");
    if agg.distinct {
        os.token("DISTINCT");
    }
    expression(os, &agg.argument);
    os.token(")");
}

fn literal_token(os: &mut OutputStream, literal: &Literal) {
    match literal {
        Literal::Integer(text) | Literal::Float(text) => os.token(text),
        Literal::String(text) => {
            let mut escaped = String::from("\"");
            for c in text.chars() {
                match c {
                    '"' => escaped.push_str("\\\""),
                    '\n' => escaped.push_str("\\n"),
                    '\r' => escaped.push_str("\\r"),
                    '\t' => escaped.push_str("\\t"),
                    '\\' => escaped.push_str("\\\\"),
                    _ => escaped.push(c),
                }
            }
            escaped.push('"');
            os.token(&escaped);
        }
        Literal::Boolean(true) => os.token("TRUE"),
        Literal::Boolean(false) => os.token("FALSE"),
        Literal::Null => os.token("NULL"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smol_str::SmolStr;

    fn node(name: Option<&str>) -> PathFactor {
        let filler = ElementPatternFiller {
            variable: name.map(|n| ElementVariableDeclaration {
                name: SmolStr::new(n),
                is_temp: false,
                span: 0..0,
            }),
            label: None,
            predicate: None,
            span: 0..0,
        };
        PathFactor {
            quantifier: PathQuantifier::None,
            primary: PathPrimary::Element(ElementPattern::Node(NodePattern {
                filler,
                span: 0..0,
            })),
            span: 0..0,
            aux: None,
        }
    }

    fn edge(direction: EdgeDirection, name: Option<&str>) -> PathFactor {
        let filler = name.map(|n| ElementPatternFiller {
            variable: Some(ElementVariableDeclaration {
                name: SmolStr::new(n),
                is_temp: false,
                span: 0..0,
            }),
            label: None,
            predicate: None,
            span: 0..0,
        });
        PathFactor {
            quantifier: PathQuantifier::None,
            primary: PathPrimary::Element(ElementPattern::Edge(EdgePattern {
                direction,
                filler,
                span: 0..0,
            })),
            span: 0..0,
            aux: None,
        }
    }

    fn term_pattern(factors: Vec<PathFactor>) -> GraphPattern {
        GraphPattern {
            match_mode: None,
            paths: PathPatternList {
                patterns: vec![PathPattern {
                    variable: None,
                    prefix: None,
                    expression: PathPatternExpression {
                        terms: vec![PathTerm {
                            factors,
                            span: 0..0,
                        }],
                        op: PathUnionOperator::Union,
                        span: 0..0,
                        aux: None,
                    },
                    span: 0..0,
                    aux: None,
                }],
                span: 0..0,
            },
            where_clause: None,
            span: 0..0,
            aux: None,
        }
    }

    #[test]
    fn node_edge_junctions_are_glued() {
        let pattern = term_pattern(vec![
            node(Some("a")),
            edge(EdgeDirection::PointingRight, Some("b")),
            node(Some("c")),
        ]);
        assert_eq!(print_graph_pattern(&pattern), "(a)-[b]->(c)");
    }

    #[test]
    fn bare_edges_between_empty_nodes() {
        let pattern = term_pattern(vec![
            node(None),
            edge(EdgeDirection::AnyDirection, None),
            node(None),
        ]);
        assert_eq!(print_graph_pattern(&pattern), "()-()");
    }

    #[test]
    fn quantified_parenthesized_factor_is_spaced() {
        let inner = PathFactor {
            quantifier: PathQuantifier::None,
            primary: PathPrimary::Element(ElementPattern::Node(NodePattern {
                filler: ElementPatternFiller::empty(0..0),
                span: 0..0,
            })),
            span: 0..0,
            aux: None,
        };
        let paren = PathFactor {
            quantifier: PathQuantifier::Quantified(GraphPatternQuantifier {
                lower: 1,
                upper: Some(3),
                span: 0..0,
            }),
            primary: PathPrimary::Parenthesized(Box::new(
                ParenthesizedPathPatternExpression::wrapping(inner, 0..0),
            )),
            span: 0..0,
            aux: None,
        };
        let pattern = term_pattern(vec![node(None), paren]);
        assert_eq!(print_graph_pattern(&pattern), "() (()) {1, 3}");
    }

    #[test]
    fn quantifier_surface_forms() {
        let q = |lower, upper| GraphPatternQuantifier {
            lower,
            upper,
            span: 0..0,
        };
        assert_eq!(quantifier_text(&q(0, None)), "*");
        assert_eq!(quantifier_text(&q(1, None)), "+");
        assert_eq!(quantifier_text(&q(2, None)), "{2,}");
        assert_eq!(quantifier_text(&q(4, Some(4))), "{4}");
        assert_eq!(quantifier_text(&q(2, Some(3))), "{2, 3}");
    }

    #[test]
    fn label_text_forms() {
        let name = |n: &str| LabelExpression::Name(SmolStr::new(n), 0..0);
        let conj = LabelExpression::Conjunction(
            vec![
                name("A"),
                LabelExpression::Negation(
                    Box::new(LabelExpression::Parenthesized(
                        Box::new(LabelExpression::Disjunction(
                            vec![name("B"), name("C")],
                            0..0,
                        )),
                        0..0,
                    )),
                    0..0,
                ),
            ],
            0..0,
        );
        assert_eq!(label_text(&conj), "A&!(B|C)");
    }
}
