//! The syntax analyzer driver.
//!
//! A single depth-first traversal of the rewritten AST. Each structural node
//! kind has a `process_*` entry point that consults the feature gate, opens
//! the matching scopes on [`GraphPatternContext`], recurses into children
//! (variable declarations before label and predicate sub-analysis), and
//! lets the scope exits run the exposure merge rules. After the walk, the
//! search conditions registered along the way are checked against the
//! finalized visibility state and every aux-data slot is filled.

use crate::ast::pattern::{
    ElementPattern, ElementPatternFiller, GraphPattern, GraphPatternWhereClause, LabelExpression,
    MatchMode, MatchStatement, ParenthesizedPathPatternExpression,
    ParenthesizedPathPatternWhereClause, PathFactor, PathMode, PathPattern,
    PathPatternExpression, PathPatternPrefix, PathPrimary, PathQuantifier, PathSearch, Program,
};
use crate::ast::visit::{self, PatternVisitor, PatternVisitorMut, VisitResult};
use crate::semantic::aux_data::GraphPatternAuxData;
use crate::semantic::context::{FinalizedPattern, GraphPatternContext};
use crate::semantic::error::{AnalyzerError, ErrorCode, Result};
use crate::semantic::features::{Feature, FeatureSet};
use crate::semantic::search_condition::{check_search_condition, SearchConditionScope};
use crate::semantic::value_type::{check_value_type, value_type_of_variable};
use smol_str::SmolStr;
use std::collections::HashSet;
use std::ops::ControlFlow;
use std::rc::Rc;

/// Configuration of the analyzer.
#[derive(Debug, Clone, Default)]
pub struct AnalyzerConfig {
    /// The supported optional-feature set.
    pub features: FeatureSet,
}

impl AnalyzerConfig {
    /// Creates a configuration supporting every feature.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the feature set.
    pub fn with_features(mut self, features: FeatureSet) -> Self {
        self.features = features;
        self
    }
}

/// Everything analysis produces besides the in-place AST annotations.
#[derive(Debug, Default)]
pub struct AnalysisOutput {
    /// Search-condition scope descriptors in registration order across all
    /// statements, with `scope` and `inaccessible_variables` finalized.
    pub search_condition_scopes: Vec<SearchConditionScope>,
}

/// The pattern-matching syntax analyzer.
///
/// [`Self::analyze`] runs the canonical rewrites and then annotates the AST
/// in place. Analysis is fail-fast: the first error aborts and the partially
/// annotated AST should be discarded.
pub struct SyntaxAnalyzer {
    config: AnalyzerConfig,
}

impl SyntaxAnalyzer {
    /// Creates an analyzer with the default configuration.
    pub fn new() -> Self {
        Self {
            config: AnalyzerConfig::new(),
        }
    }

    /// Creates an analyzer with a custom configuration.
    pub fn with_config(config: AnalyzerConfig) -> Self {
        Self { config }
    }

    /// Rewrites and analyzes a program in place.
    pub fn analyze(&self, program: &mut Program) -> Result<AnalysisOutput> {
        crate::rewrite::rewrite_program(program)?;
        self.analyze_rewritten(program)
    }

    /// Analyzes a program that already went through the rewriters.
    ///
    /// Surviving surface forms the rewriters should have removed (simplified
    /// path patterns, element predicates) are internal invariant violations
    /// and rejected here.
    pub fn analyze_rewritten(&self, program: &mut Program) -> Result<AnalysisOutput> {
        let mut output = AnalysisOutput::default();
        for statement in &mut program.statements {
            let scopes = self.process_match_statement(statement)?;
            output.search_condition_scopes.extend(scopes);
        }
        Ok(output)
    }

    fn process_match_statement(
        &self,
        statement: &mut MatchStatement,
    ) -> Result<Vec<SearchConditionScope>> {
        self.process_graph_pattern(&mut statement.pattern)
    }

    fn process_graph_pattern(
        &self,
        pattern: &mut GraphPattern,
    ) -> Result<Vec<SearchConditionScope>> {
        let different_edges = matches!(pattern.match_mode, Some(MatchMode::DifferentEdges));
        let mut context = GraphPatternContext::new(different_edges);

        for path in &mut pattern.paths.patterns {
            self.process_path_pattern(path, &mut context)?;
        }

        if pattern.where_clause.is_some() {
            context.add_search_condition();
        }

        context.finalize()?;
        let finalized = context.finish();

        pattern.aux = Some(Rc::new(GraphPatternAuxData {
            variables: finalized.variables.clone(),
        }));

        self.check_variable_types(&finalized)?;
        self.check_search_conditions(pattern, &finalized)?;
        Ok(finalized.search_condition_scopes)
    }

    /// Checks that every pattern variable resolves to a representable,
    /// feature-supported value type.
    ///
    /// Group-degree variables produce group lists (gated by GV50) over
    /// their element type, and path/subpath variables produce path values
    /// (gated by GV55); a group list over anything but a node or edge
    /// reference is rejected, which is how a subpath variable caught
    /// inside a quantifier fails.
    fn check_variable_types(&self, finalized: &FinalizedPattern) -> Result<()> {
        for (name, variable) in &finalized.variables {
            let span = finalized
                .declaration_spans
                .get(name)
                .expect("every variable has a declaration span");
            let value_type = value_type_of_variable(variable);
            check_value_type(&value_type, &self.config.features, span)?;
        }
        Ok(())
    }

    fn process_path_pattern(
        &self,
        path: &mut PathPattern,
        context: &mut GraphPatternContext,
    ) -> Result<()> {
        let selective = path
            .prefix
            .as_ref()
            .is_some_and(PathPatternPrefix::is_selective);
        if let Some(prefix) = &path.prefix {
            self.process_path_pattern_prefix(prefix, &path.span)?;
        }

        context.enter_path_pattern(selective);

        if let Some(variable) = &path.variable {
            context.declare_path_variable(variable)?;
        }

        let mode = path
            .prefix
            .as_ref()
            .map(PathPatternPrefix::path_mode)
            .unwrap_or_default();
        context.enter_path_mode(mode);
        self.process_path_pattern_expression(&mut path.expression, context)?;
        context.exit_path_mode();

        let aux = context.exit_path_pattern(&path.span)?;
        path.aux = Some(Rc::new(aux));
        Ok(())
    }

    fn process_path_pattern_prefix(
        &self,
        prefix: &PathPatternPrefix,
        span: &crate::ast::Span,
    ) -> Result<()> {
        match prefix {
            PathPatternPrefix::PathMode(mode) => self.process_path_mode(*mode, span),
            PathPatternPrefix::PathSearch(search) => {
                self.process_path_mode(search.mode, &search.span)?;
                match &search.search {
                    PathSearch::All => Ok(()),
                    PathSearch::Any { .. } => {
                        self.config.features.require(Feature::G016, &search.span)
                    }
                    PathSearch::AnyShortest => {
                        self.config.features.require(Feature::G017, &search.span)
                    }
                    PathSearch::AllShortest => {
                        self.config.features.require(Feature::G018, &search.span)
                    }
                    PathSearch::CountedShortest { count } => {
                        if count.as_str() == "1" {
                            self.config.features.require(Feature::G018, &search.span)?;
                        }
                        self.config.features.require(Feature::G019, &search.span)
                    }
                    PathSearch::CountedShortestGroups { count } => {
                        if count.as_deref() == Some("1") {
                            self.config.features.require(Feature::G017, &search.span)?;
                        }
                        self.config.features.require(Feature::G020, &search.span)
                    }
                }
            }
        }
    }

    fn process_path_mode(&self, mode: PathMode, span: &crate::ast::Span) -> Result<()> {
        match mode {
            PathMode::Walk => Ok(()),
            PathMode::Trail => self.config.features.require(Feature::G011, span),
            PathMode::Simple => self.config.features.require(Feature::G012, span),
            PathMode::Acyclic => self.config.features.require(Feature::G013, span),
        }
    }

    fn process_path_pattern_expression(
        &self,
        expression: &mut PathPatternExpression,
        context: &mut GraphPatternContext,
    ) -> Result<()> {
        if expression.terms.len() > 1 {
            let feature = match expression.op {
                crate::ast::pattern::PathUnionOperator::Union => Feature::G032,
                crate::ast::pattern::PathUnionOperator::Alternation => Feature::G030,
            };
            self.config.features.require(feature, &expression.span)?;
        }

        context.enter_reference_scope();
        let union_active = expression.terms.len() > 1;
        if union_active {
            context.enter_path_pattern_union();
        }

        for term in &mut expression.terms {
            if union_active {
                context.enter_path_pattern_union_operand();
            }
            for factor in &mut term.factors {
                self.process_path_factor(factor, context)?;
            }
            if union_active {
                context.exit_path_pattern_union_operand();
            }
        }

        if union_active {
            context.exit_path_pattern_union()?;
        }
        expression.aux = Some(Rc::new(context.exit_reference_scope()));
        Ok(())
    }

    fn process_path_factor(
        &self,
        factor: &mut PathFactor,
        context: &mut GraphPatternContext,
    ) -> Result<()> {
        context.enter_reference_scope();

        match &factor.quantifier {
            PathQuantifier::None => {}
            PathQuantifier::Questioned => context.enter_questioned_path_primary(),
            PathQuantifier::Quantified(quantifier) => {
                let feature = if quantifier.is_bounded() {
                    Feature::G060
                } else {
                    Feature::G061
                };
                self.config.features.require(feature, &factor.span)?;
                context.enter_quantified_path_primary(&factor.span, quantifier.is_bounded())?;
            }
        }

        match &mut factor.primary {
            PathPrimary::Element(element) => self.process_element_pattern(element, context)?,
            PathPrimary::Parenthesized(parenthesized) => {
                self.process_parenthesized_expression(parenthesized, context)?
            }
            PathPrimary::Simplified(simplified) => {
                return Err(AnalyzerError::new(
                    ErrorCode::E0060,
                    simplified.span.clone(),
                    "SimplifiedPathPatternExpression must be rewritten to ElementPattern",
                ));
            }
        }

        match &factor.quantifier {
            PathQuantifier::None => {}
            PathQuantifier::Questioned => context.exit_questioned_path_primary(&factor.span)?,
            PathQuantifier::Quantified(quantifier) => context.exit_quantified_path_primary(
                &factor.span,
                quantifier.is_bounded(),
                quantifier.lower,
            )?,
        }

        factor.aux = Some(Rc::new(context.exit_reference_scope()));
        Ok(())
    }

    fn process_element_pattern(
        &self,
        element: &mut ElementPattern,
        context: &mut GraphPatternContext,
    ) -> Result<()> {
        match element {
            ElementPattern::Node(node) => {
                context.enter_node_pattern();
                if let Some(variable) = &node.filler.variable {
                    context.declare_node_variable(variable)?;
                }
                self.process_element_pattern_filler(&node.filler)?;
                context.exit_node_pattern();
            }
            ElementPattern::Edge(edge) => {
                context.enter_edge_pattern();
                if let Some(filler) = &edge.filler {
                    if let Some(variable) = &filler.variable {
                        context.declare_edge_variable(variable)?;
                    }
                    self.process_element_pattern_filler(filler)?;
                }
                context.exit_edge_pattern();
            }
        }
        Ok(())
    }

    fn process_element_pattern_filler(&self, filler: &ElementPatternFiller) -> Result<()> {
        if let Some(label) = &filler.label {
            self.process_label_expression(label)?;
        }
        if filler.predicate.is_some() {
            return Err(AnalyzerError::new(
                ErrorCode::E0111,
                filler.span.clone(),
                "Element predicate must be rewritten to parenthesized path pattern where clause",
            ));
        }
        Ok(())
    }

    fn process_label_expression(&self, label: &LabelExpression) -> Result<()> {
        match label {
            LabelExpression::Name(..) => Ok(()),
            LabelExpression::Wildcard(span) => self.config.features.require(Feature::G074, span),
            LabelExpression::Negation(inner, _) | LabelExpression::Parenthesized(inner, _) => {
                self.process_label_expression(inner)
            }
            LabelExpression::Conjunction(parts, _) | LabelExpression::Disjunction(parts, _) => {
                for part in parts {
                    self.process_label_expression(part)?;
                }
                Ok(())
            }
        }
    }

    fn process_parenthesized_expression(
        &self,
        parenthesized: &mut ParenthesizedPathPatternExpression,
        context: &mut GraphPatternContext,
    ) -> Result<()> {
        if let Some(variable) = &parenthesized.subpath_variable {
            self.config.features.require(Feature::G048, &variable.span)?;
        }
        if parenthesized.path_mode != PathMode::Walk {
            self.config
                .features
                .require(Feature::G049, &parenthesized.span)?;
        }
        if let Some(where_clause) = &parenthesized.where_clause {
            self.config
                .features
                .require(Feature::G050, &where_clause.span)?;
        }

        context.enter_parenthesized_path_pattern_expression();
        self.process_path_mode(parenthesized.path_mode, &parenthesized.span)?;
        if let Some(variable) = &parenthesized.subpath_variable {
            context.declare_subpath_variable(variable)?;
        }

        context.enter_path_mode(parenthesized.path_mode);
        self.process_path_pattern_expression(&mut parenthesized.pattern, context)?;
        if parenthesized.where_clause.is_some() {
            context.add_search_condition();
        }
        context.exit_path_mode();

        context.exit_parenthesized_path_pattern_expression(
            parenthesized.subpath_variable.is_some(),
            &parenthesized.span,
        )
    }

    /// Resolves every registered search condition and writes the results
    /// back onto the owning `WHERE` nodes.
    ///
    /// The mutable walk below visits `WHERE` clauses in the exact order the
    /// driver registered them (inner parenthesized clauses before outer
    /// ones, the graph-pattern clause last).
    fn check_search_conditions(
        &self,
        pattern: &mut GraphPattern,
        finalized: &FinalizedPattern,
    ) -> Result<()> {
        let mut checker = WhereClauseChecker {
            finalized,
            next_scope: 0,
        };
        if let ControlFlow::Break(error) = checker.visit_graph_pattern_mut(pattern) {
            return Err(error);
        }
        debug_assert_eq!(checker.next_scope, finalized.search_condition_scopes.len());
        Ok(())
    }
}

impl Default for SyntaxAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

struct WhereClauseChecker<'a> {
    finalized: &'a FinalizedPattern,
    next_scope: usize,
}

impl WhereClauseChecker<'_> {
    fn check(
        &mut self,
        condition: &crate::ast::Expression,
    ) -> std::result::Result<Rc<crate::semantic::aux_data::GraphPatternWhereClauseAuxData>, AnalyzerError>
    {
        let scope = &self.finalized.search_condition_scopes[self.next_scope];
        self.next_scope += 1;
        check_search_condition(self.finalized, scope, condition).map(Rc::new)
    }
}

impl PatternVisitorMut for WhereClauseChecker<'_> {
    type Break = AnalyzerError;

    fn visit_parenthesized_where_clause_mut(
        &mut self,
        clause: &mut ParenthesizedPathPatternWhereClause,
    ) -> VisitResult<AnalyzerError> {
        match self.check(&clause.condition) {
            Ok(aux) => {
                clause.aux = Some(aux);
                ControlFlow::Continue(())
            }
            Err(error) => ControlFlow::Break(error),
        }
    }

    fn visit_graph_pattern_where_clause_mut(
        &mut self,
        clause: &mut GraphPatternWhereClause,
    ) -> VisitResult<AnalyzerError> {
        match self.check(&clause.condition) {
            Ok(aux) => {
                clause.aux = Some(aux);
                ControlFlow::Continue(())
            }
            Err(error) => ControlFlow::Break(error),
        }
    }
}

/// Collects the binding-variable names a `MATCH` statement exposes to the
/// working table: path variables plus the element variables of every path
/// pattern.
pub fn match_output_columns(statement: &MatchStatement) -> HashSet<SmolStr> {
    struct Collector {
        columns: HashSet<SmolStr>,
    }

    impl PatternVisitor for Collector {
        type Break = std::convert::Infallible;

        fn visit_path_pattern(&mut self, pattern: &PathPattern) -> VisitResult<Self::Break> {
            if let Some(variable) = &pattern.variable {
                self.columns.insert(variable.name.clone());
            }
            visit::walk_path_pattern(self, pattern)
        }

        fn visit_element_pattern(&mut self, element: &ElementPattern) -> VisitResult<Self::Break> {
            let filler = match element {
                ElementPattern::Node(node) => Some(&node.filler),
                ElementPattern::Edge(edge) => edge.filler.as_ref(),
            };
            if let Some(variable) = filler.and_then(|f| f.variable.as_ref()) {
                self.columns.insert(variable.name.clone());
            }
            visit::walk_element_pattern(self, element)
        }
    }

    let mut collector = Collector {
        columns: HashSet::new(),
    };
    let _ = collector.visit_match_statement(statement);
    collector.columns
}
