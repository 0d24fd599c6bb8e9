//! Graph pattern analysis context.
//!
//! The state machine behind pattern analysis. The driver opens and closes a
//! scope around every structural construct it walks; each exit merges the
//! construct's exposed variables into the enclosing frame following the ISO
//! GQL exposure rules, and checks the structural rules (minimum path length,
//! minimum node count, quantifier nesting) that attach to that construct.
//!
//! Every stack keeps a permanent sentinel frame at the bottom so the top is
//! always valid at the outer edge. Scopes must be balanced on every success
//! path; on an error the context is dropped wholesale and no merge logic
//! runs.

use crate::ast::pattern::{
    ElementVariableDeclaration, PathMode, PathVariableDeclaration, SubpathVariableDeclaration,
};
use crate::ast::Span;
use crate::semantic::aux_data::{
    DegreeOfExposure, PathPatternAuxData, PathVariableReferenceScopeAuxData, Variable,
    VariableKind,
};
use crate::semantic::error::{AnalyzerError, ErrorCode, Result};
use crate::semantic::search_condition::SearchConditionScope;
use smol_str::SmolStr;
use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};

/// Index of a lexical variable scope in the context's scope arena.
pub type VariableScopeId = usize;

/// A lexical scope for search-condition reference resolution.
///
/// `local_variables` is filled when the scope exits, with the degrees the
/// variables have at that point.
#[derive(Debug, Clone, Default)]
pub struct VariableScope {
    pub parent: Option<VariableScopeId>,
    pub local_variables: HashMap<SmolStr, Variable>,
}

/// A variable as exposed by the currently open construct.
#[derive(Debug, Clone)]
struct ExposedVariable {
    kind: VariableKind,
    declaration_span: Span,
    is_temp: bool,
    degree: DegreeOfExposure,
    /// Set on non-boundary variables of a selective path pattern.
    is_strict_interior: bool,
}

/// First-declaration record of a variable.
#[derive(Debug, Clone)]
struct VariableDeclaration {
    kind: VariableKind,
    /// Order of first appearance; downstream layers rely on it when they
    /// materialize the working record.
    #[allow(dead_code)]
    declaration_order: usize,
    first_span: Span,
}

/// Bookkeeping for one path pattern union.
#[derive(Debug, Default)]
struct UnionFrame {
    /// Index of the first search-condition scope of each operand, plus one
    /// trailing entry per completed operand.
    first_scope_index_in_operands: Vec<usize>,
    declarations_in_operands: Vec<HashMap<SmolStr, u32>>,
}

impl UnionFrame {
    fn is_first_operand(&self) -> bool {
        self.declarations_in_operands.is_empty()
    }
}

/// Everything the context produces for one analyzed graph pattern.
pub struct FinalizedPattern {
    /// Every variable with its final kind and degree.
    pub variables: HashMap<SmolStr, Variable>,
    /// Position of each variable's first declaration, for error reporting.
    pub declaration_spans: HashMap<SmolStr, Span>,
    /// Search-condition scopes in registration order, with accessibility
    /// bookkeeping resolved.
    pub search_condition_scopes: Vec<SearchConditionScope>,
    /// The lexical scope arena the scopes point into.
    pub variable_scopes: Vec<VariableScope>,
}

/// The core state machine for one graph pattern analysis.
pub struct GraphPatternContext {
    different_edges_match_mode: bool,

    inside_quantified_path_primary: bool,
    inside_selective_pattern: bool,

    is_restrictive_path_mode: Vec<bool>,

    variable_scopes: Vec<VariableScope>,
    variable_scope_stack: Vec<VariableScopeId>,

    exposed_variables: Vec<HashMap<SmolStr, ExposedVariable>>,

    variable_declarations: HashMap<SmolStr, VariableDeclaration>,
    first_declaration_start: Option<usize>,

    declarations_in_unions: Vec<HashMap<SmolStr, u32>>,
    search_condition_scopes: Vec<SearchConditionScope>,
    first_scope_index_in_path_pattern: usize,

    expecting_left_boundary_variable: bool,
    left_boundary_variable: Option<SmolStr>,
    possible_right_boundary_variable: Option<SmolStr>,

    path_pattern_unions: Vec<UnionFrame>,

    minimum_path_length: Vec<u64>,
    non_zero_node_count: Vec<bool>,

    reference_scopes: Vec<PathVariableReferenceScopeAuxData>,
}

impl GraphPatternContext {
    /// Creates a context for one graph pattern.
    ///
    /// `different_edges_match_mode` lifts the restriction on unbounded
    /// quantifiers outside restrictive searches.
    pub fn new(different_edges_match_mode: bool) -> Self {
        let mut context = Self {
            different_edges_match_mode,
            inside_quantified_path_primary: false,
            inside_selective_pattern: false,
            is_restrictive_path_mode: vec![false],
            variable_scopes: Vec::new(),
            variable_scope_stack: Vec::new(),
            exposed_variables: vec![HashMap::new()],
            variable_declarations: HashMap::new(),
            first_declaration_start: None,
            declarations_in_unions: vec![HashMap::new()],
            search_condition_scopes: Vec::new(),
            first_scope_index_in_path_pattern: 0,
            expecting_left_boundary_variable: false,
            left_boundary_variable: None,
            possible_right_boundary_variable: None,
            path_pattern_unions: Vec::new(),
            minimum_path_length: vec![0],
            non_zero_node_count: vec![false],
            reference_scopes: vec![PathVariableReferenceScopeAuxData::default()],
        };
        context.enter_variable_scope();
        context
    }

    // ------------------------------------------------------------------
    // Declarations
    // ------------------------------------------------------------------

    /// Declares a path variable (`p = ...`).
    pub fn declare_path_variable(&mut self, var: &PathVariableDeclaration) -> Result<()> {
        self.declare_variable(&var.name, &var.span, VariableKind::Path, false)
    }

    /// Declares a subpath variable inside a parenthesized expression.
    pub fn declare_subpath_variable(&mut self, var: &SubpathVariableDeclaration) -> Result<()> {
        self.declare_variable(&var.name, &var.span, VariableKind::Subpath, false)
    }

    /// Declares a node element variable and updates boundary tracking.
    pub fn declare_node_variable(&mut self, var: &ElementVariableDeclaration) -> Result<()> {
        self.declare_variable(&var.name, &var.span, VariableKind::Node, var.is_temp)?;

        if self.expecting_left_boundary_variable && !var.is_temp {
            self.left_boundary_variable = Some(var.name.clone());
            self.expecting_left_boundary_variable = false;
        }
        self.possible_right_boundary_variable = Some(var.name.clone());
        Ok(())
    }

    /// Declares an edge element variable.
    pub fn declare_edge_variable(&mut self, var: &ElementVariableDeclaration) -> Result<()> {
        self.declare_variable(&var.name, &var.span, VariableKind::Edge, var.is_temp)
    }

    fn declare_variable(
        &mut self,
        name: &SmolStr,
        span: &Span,
        kind: VariableKind,
        is_temp: bool,
    ) -> Result<()> {
        // Declarations are traversed in the order they appear in the query.
        match self.first_declaration_start {
            Some(first) => debug_assert!(span.start >= first),
            None => self.first_declaration_start = Some(span.start),
        }

        let next_order = self.variable_declarations.len();
        match self.variable_declarations.entry(name.clone()) {
            Entry::Vacant(entry) => {
                entry.insert(VariableDeclaration {
                    kind,
                    declaration_order: next_order,
                    first_span: span.clone(),
                });
            }
            Entry::Occupied(entry) => {
                let existing = entry.get();
                if existing.kind != kind {
                    return Err(AnalyzerError::new(
                        ErrorCode::E0001,
                        span.clone(),
                        format!(
                            "{} variable \"{}\" was declared before as a {} variable",
                            kind.as_str(),
                            name,
                            existing.kind.as_str()
                        ),
                    ));
                }
                match kind {
                    VariableKind::Path => {
                        return Err(AnalyzerError::new(
                            ErrorCode::E0002,
                            span.clone(),
                            format!("Path variable \"{name}\" was declared more than once"),
                        ));
                    }
                    VariableKind::Subpath => {
                        // A parenthesized path pattern expression exposes its
                        // subpath variable as an unconditional singleton and
                        // no other parenthesized expression may redeclare it.
                        return Err(AnalyzerError::new(
                            ErrorCode::E0003,
                            span.clone(),
                            format!("Subpath variable \"{name}\" was declared more than once"),
                        ));
                    }
                    VariableKind::Node | VariableKind::Edge => {}
                }
            }
        }

        self.expose_new_variable(
            name.clone(),
            ExposedVariable {
                kind,
                declaration_span: span.clone(),
                is_temp,
                degree: DegreeOfExposure::UnconditionalSingleton,
                is_strict_interior: false,
            },
        )?;

        *self
            .declarations_in_unions
            .last_mut()
            .expect("sentinel frame")
            .entry(name.clone())
            .or_insert(0) += 1;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Path pattern scope
    // ------------------------------------------------------------------

    /// Enters a path pattern scope.
    pub fn enter_path_pattern(&mut self, is_selective_pattern: bool) {
        self.inside_selective_pattern = is_selective_pattern;
        self.expecting_left_boundary_variable = is_selective_pattern;
        self.left_boundary_variable = None;
        self.possible_right_boundary_variable = None;
        self.exposed_variables.push(HashMap::new());

        if self.inside_selective_pattern {
            self.enter_variable_scope();
            self.first_scope_index_in_path_pattern = self.search_condition_scopes.len();
        }

        self.non_zero_node_count.push(false);
    }

    /// Exits a path pattern scope, producing its aux data.
    ///
    /// Downgrades unbounded groups to bounded at the pattern boundary,
    /// collects joinable variables, stamps selective-pattern scopes, and
    /// marks strict interior variables.
    pub fn exit_path_pattern(&mut self, span: &Span) -> Result<PathPatternAuxData> {
        if self.inside_selective_pattern {
            // A selective path pattern shall not reference a graph pattern
            // variable that is not declared by it: stamp every search
            // condition registered inside with the declared-variable set.
            let var_set: HashSet<SmolStr> = self
                .exposed_variables
                .last()
                .expect("pattern frame")
                .keys()
                .cloned()
                .collect();
            self.exit_variable_scope()?;

            for scope in &mut self.search_condition_scopes[self.first_scope_index_in_path_pattern..]
            {
                scope.scope = Some(var_set.clone());
            }

            // Non-boundary variables become strict interior.
            let left = self.left_boundary_variable.clone();
            let right = self.possible_right_boundary_variable.clone();
            for (name, var) in self
                .exposed_variables
                .last_mut()
                .expect("pattern frame")
                .iter_mut()
            {
                let is_boundary = left.as_ref() == Some(name) || right.as_ref() == Some(name);
                if is_boundary {
                    debug_assert_eq!(var.degree, DegreeOfExposure::UnconditionalSingleton);
                } else {
                    var.is_strict_interior = true;
                }
            }
        }

        let mut aux = PathPatternAuxData::default();
        for (name, var) in self.exposed_variables.last().expect("pattern frame") {
            if var.degree == DegreeOfExposure::UnconditionalSingleton {
                aux.joinable_variables.insert(name.clone());
            }
        }

        let local = self.exposed_variables.pop().expect("pattern frame");
        for (name, mut var) in local {
            // An unbounded group is effectively bounded once the pattern it
            // was produced in is complete.
            if var.degree == DegreeOfExposure::EffectivelyUnboundedGroup {
                var.degree = DegreeOfExposure::EffectivelyBoundedGroup;
            }
            self.expose_variable(name, var)?;
        }

        if !self.non_zero_node_count.last().copied().unwrap_or(false) {
            return Err(AnalyzerError::new(
                ErrorCode::E0109,
                span.clone(),
                "Path pattern shall have minimum node count that is greater than zero",
            ));
        }
        self.non_zero_node_count.pop();
        Ok(aux)
    }

    // ------------------------------------------------------------------
    // Parenthesized path pattern expression scope
    // ------------------------------------------------------------------

    /// Enters a parenthesized path pattern expression scope.
    pub fn enter_parenthesized_path_pattern_expression(&mut self) {
        self.enter_variable_scope();
        self.non_zero_node_count.push(false);
    }

    /// Exits a parenthesized path pattern expression scope.
    pub fn exit_parenthesized_path_pattern_expression(
        &mut self,
        has_subpath_variable: bool,
        span: &Span,
    ) -> Result<()> {
        self.exit_variable_scope()?;

        if has_subpath_variable && !self.non_zero_node_count.last().copied().unwrap_or(false) {
            return Err(AnalyzerError::new(
                ErrorCode::E0110,
                span.clone(),
                "Subpath pattern shall have minimum node count that is greater than zero",
            ));
        }
        let non_zero = self.non_zero_node_count.pop().expect("paren frame");
        *self.non_zero_node_count.last_mut().expect("sentinel") |= non_zero;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Lexical variable scopes
    // ------------------------------------------------------------------

    /// Opens a lexical scope for search-condition reference resolution.
    pub fn enter_variable_scope(&mut self) {
        self.exposed_variables.push(HashMap::new());
        let parent = self.variable_scope_stack.last().copied();
        let id = self.variable_scopes.len();
        self.variable_scopes.push(VariableScope {
            parent,
            local_variables: HashMap::new(),
        });
        self.variable_scope_stack.push(id);
    }

    /// Closes the innermost lexical scope, recording its local variables.
    pub fn exit_variable_scope(&mut self) -> Result<()> {
        let id = self.variable_scope_stack.pop().expect("scope stack");
        let frame = self.exposed_variables.last().expect("scope frame");
        for (name, var) in frame {
            self.variable_scopes[id].local_variables.insert(
                name.clone(),
                Variable {
                    kind: var.kind,
                    degree: var.degree,
                    is_temp: var.is_temp,
                },
            );
        }
        self.append_exposed_variables()
    }

    // ------------------------------------------------------------------
    // Path modes
    // ------------------------------------------------------------------

    /// Enters a path mode; any non-WALK mode makes the search restrictive.
    pub fn enter_path_mode(&mut self, mode: PathMode) {
        let restrictive =
            self.is_restrictive_path_mode.last().copied().unwrap_or(false) || mode != PathMode::Walk;
        self.is_restrictive_path_mode.push(restrictive);
    }

    /// Exits the innermost path mode.
    pub fn exit_path_mode(&mut self) {
        self.is_restrictive_path_mode.pop();
    }

    // ------------------------------------------------------------------
    // Quantified and questioned path primaries
    // ------------------------------------------------------------------

    /// Enters a quantified path primary (`{m,n}`, `*`, `+`).
    pub fn enter_quantified_path_primary(&mut self, span: &Span, bounded: bool) -> Result<()> {
        if self.inside_quantified_path_primary {
            // The path primary simply contained in a quantified path primary
            // shall not contain a quantified path primary at the same depth
            // of graph pattern matching.
            return Err(AnalyzerError::new(
                ErrorCode::E0004,
                span.clone(),
                "Nested quantified path primary is not allowed",
            ));
        }
        self.inside_quantified_path_primary = true;

        if !bounded
            && !self.is_inside_restrictive_search()
            && !self.inside_selective_pattern
            && !self.different_edges_match_mode
        {
            return Err(AnalyzerError::new(
                ErrorCode::E0005,
                span.clone(),
                "An unbounded quantified path primary shall be inside a restrictive search or \
                 a selective path pattern",
            ));
        }

        self.expecting_left_boundary_variable = false;

        self.minimum_path_length.push(0);
        self.non_zero_node_count.push(false);
        self.exposed_variables.push(HashMap::new());
        Ok(())
    }

    /// Exits a quantified path primary, regrouping its exposed variables.
    pub fn exit_quantified_path_primary(
        &mut self,
        span: &Span,
        bounded: bool,
        lower_bound: u64,
    ) -> Result<()> {
        self.inside_quantified_path_primary = false;

        let local = self.exposed_variables.pop().expect("quantifier frame");
        let restrictive = self.is_inside_restrictive_search();
        for (name, mut var) in local {
            if var.degree != DegreeOfExposure::EffectivelyUnboundedGroup {
                var.degree = if bounded || restrictive {
                    DegreeOfExposure::EffectivelyBoundedGroup
                } else {
                    DegreeOfExposure::EffectivelyUnboundedGroup
                };
            }
            self.expose_new_variable(name, var)?;
        }

        self.possible_right_boundary_variable = None;

        if self.minimum_path_length.last().copied().unwrap_or(0) == 0 {
            return Err(AnalyzerError::new(
                ErrorCode::E0006,
                span.clone(),
                "A quantified path primary shall have minimum path length that is greater \
                 than zero",
            ));
        }
        let min = self.minimum_path_length.pop().expect("quantifier frame");
        let outer = self.minimum_path_length.last_mut().expect("sentinel");
        *outer = outer.saturating_add(min.saturating_mul(lower_bound));

        let non_zero = self.non_zero_node_count.pop().expect("quantifier frame");
        *self.non_zero_node_count.last_mut().expect("sentinel") |= non_zero && lower_bound > 0;
        Ok(())
    }

    /// Enters a questioned path primary (`?`).
    pub fn enter_questioned_path_primary(&mut self) {
        self.expecting_left_boundary_variable = false;

        self.minimum_path_length.push(0);
        self.non_zero_node_count.push(false);
        self.exposed_variables.push(HashMap::new());
    }

    /// Exits a questioned path primary, demoting singletons to conditional.
    pub fn exit_questioned_path_primary(&mut self, span: &Span) -> Result<()> {
        let local = self.exposed_variables.pop().expect("questioned frame");
        for (name, mut var) in local {
            if var.degree == DegreeOfExposure::UnconditionalSingleton {
                var.degree = DegreeOfExposure::ConditionalSingleton;
            }
            self.expose_new_variable(name, var)?;
        }

        self.possible_right_boundary_variable = None;

        if self.minimum_path_length.last().copied().unwrap_or(0) == 0 {
            return Err(AnalyzerError::new(
                ErrorCode::E0007,
                span.clone(),
                "A questioned path primary shall have minimum path length that is greater \
                 than zero",
            ));
        }
        self.minimum_path_length.pop();
        self.non_zero_node_count.pop();
        Ok(())
    }

    // ------------------------------------------------------------------
    // Path pattern unions
    // ------------------------------------------------------------------

    /// Enters a path pattern union (two or more terms).
    pub fn enter_path_pattern_union(&mut self) {
        self.exposed_variables.push(HashMap::new());
        self.expecting_left_boundary_variable = false;

        self.minimum_path_length.push(u64::MAX);
        self.non_zero_node_count.push(true);

        let mut union = UnionFrame::default();
        union
            .first_scope_index_in_operands
            .push(self.search_condition_scopes.len());
        self.path_pattern_unions.push(union);
    }

    /// Exits a path pattern union, distributing adjacent-operand
    /// inaccessibility over the search conditions registered inside.
    pub fn exit_path_pattern_union(&mut self) -> Result<()> {
        self.append_exposed_variables()?;

        self.possible_right_boundary_variable = None;

        let min = self.minimum_path_length.pop().expect("union frame");
        let outer = self.minimum_path_length.last_mut().expect("sentinel");
        *outer = outer.saturating_add(min);

        let non_zero = self.non_zero_node_count.pop().expect("union frame");
        *self.non_zero_node_count.last_mut().expect("sentinel") |= non_zero;

        let union = self.path_pattern_unions.pop().expect("union frame");
        let operand_count = union.declarations_in_operands.len();
        for i in 0..operand_count {
            for j in 0..operand_count {
                if i == j {
                    continue;
                }
                let scope_range = union.first_scope_index_in_operands[j]
                    ..union.first_scope_index_in_operands[j + 1];
                for k in scope_range {
                    for (name, count) in &union.declarations_in_operands[i] {
                        *self.search_condition_scopes[k]
                            .inaccessible_variables
                            .entry(name.clone())
                            .or_insert(0) += count;
                    }
                }
            }
        }
        Ok(())
    }

    /// Enters one operand of a path pattern union.
    pub fn enter_path_pattern_union_operand(&mut self) {
        self.exposed_variables.push(HashMap::new());
        self.minimum_path_length.push(0);
        self.non_zero_node_count.push(false);
        self.declarations_in_unions.push(HashMap::new());
    }

    /// Exits one union operand, merging its exposure into the union frame.
    ///
    /// A variable missing from one side of the union is at most a
    /// conditional singleton; a variable present on both sides takes the
    /// least upper bound of the two degrees.
    pub fn exit_path_pattern_union_operand(&mut self) {
        let operand = self.exposed_variables.pop().expect("operand frame");
        let is_first_operand = self
            .path_pattern_unions
            .last()
            .expect("union frame")
            .is_first_operand();
        let union_exposed = self.exposed_variables.last_mut().expect("union frame");

        for (name, var) in union_exposed.iter_mut() {
            if var.degree == DegreeOfExposure::UnconditionalSingleton
                && !operand.contains_key(name)
            {
                var.degree = DegreeOfExposure::ConditionalSingleton;
            }
        }

        for (name, mut var) in operand {
            match union_exposed.entry(name) {
                Entry::Vacant(entry) => {
                    if !is_first_operand
                        && var.degree == DegreeOfExposure::UnconditionalSingleton
                    {
                        var.degree = DegreeOfExposure::ConditionalSingleton;
                    }
                    entry.insert(var);
                }
                Entry::Occupied(mut entry) => {
                    let merged = entry.get().degree.max(var.degree);
                    entry.get_mut().degree = merged;
                }
            }
        }

        let min = self.minimum_path_length.pop().expect("operand frame");
        let outer = self.minimum_path_length.last_mut().expect("union frame");
        *outer = (*outer).min(min);

        let non_zero = self.non_zero_node_count.pop().expect("operand frame");
        let outer = self.non_zero_node_count.last_mut().expect("union frame");
        *outer = non_zero && *outer;

        let union = self.path_pattern_unions.last_mut().expect("union frame");
        union
            .first_scope_index_in_operands
            .push(self.search_condition_scopes.len());
        union
            .declarations_in_operands
            .push(self.declarations_in_unions.last().expect("operand frame").clone());

        let local = self.declarations_in_unions.pop().expect("operand frame");
        let outer = self.declarations_in_unions.last_mut().expect("sentinel");
        for (name, count) in local {
            *outer.entry(name).or_insert(0) += count;
        }
    }

    // ------------------------------------------------------------------
    // Node and edge patterns
    // ------------------------------------------------------------------

    /// Enters a node pattern.
    pub fn enter_node_pattern(&mut self) {
        *self.non_zero_node_count.last_mut().expect("sentinel") = true;
    }

    /// Exits a node pattern.
    pub fn exit_node_pattern(&mut self) {}

    /// Enters an edge pattern.
    pub fn enter_edge_pattern(&mut self) {
        self.expecting_left_boundary_variable = false;
        self.possible_right_boundary_variable = None;

        *self.minimum_path_length.last_mut().expect("sentinel") += 1;
    }

    /// Exits an edge pattern.
    pub fn exit_edge_pattern(&mut self) {}

    // ------------------------------------------------------------------
    // Search conditions and reference scopes
    // ------------------------------------------------------------------

    /// Registers a `WHERE` clause together with its lexical scope.
    ///
    /// Scopes are registered in traversal order; the driver relies on that
    /// order when it attaches results back onto the `WHERE` nodes.
    pub fn add_search_condition(&mut self) {
        self.search_condition_scopes.push(SearchConditionScope {
            variable_scope: *self.variable_scope_stack.last().expect("scope stack"),
            scope: None,
            inaccessible_variables: HashMap::new(),
        });
    }

    /// Opens a reference scope for a `PathFactor` or `PathPatternExpression`.
    pub fn enter_reference_scope(&mut self) {
        self.reference_scopes
            .push(PathVariableReferenceScopeAuxData::default());
    }

    /// Closes the innermost reference scope, yielding its aux data.
    pub fn exit_reference_scope(&mut self) -> PathVariableReferenceScopeAuxData {
        debug_assert!(self.reference_scopes.len() > 1, "sentinel must remain");
        self.reference_scopes.pop().expect("reference scope")
    }

    // ------------------------------------------------------------------
    // Finalization
    // ------------------------------------------------------------------

    /// Resolves deferred accessibility bookkeeping after the whole graph
    /// pattern was processed.
    ///
    /// A variable stays inaccessible to a search condition only when every
    /// one of its declarations sits in an adjacent union operand.
    pub fn finalize(&mut self) -> Result<()> {
        let totals = self
            .declarations_in_unions
            .last()
            .expect("sentinel frame")
            .clone();
        for scope in &mut self.search_condition_scopes {
            scope
                .inaccessible_variables
                .retain(|name, count| *count >= totals.get(name).copied().unwrap_or(0));
        }
        self.exit_variable_scope()
    }

    /// Consumes the context after [`Self::finalize`].
    pub fn finish(self) -> FinalizedPattern {
        debug_assert!(self.is_balanced());
        let declaration_spans = self
            .variable_declarations
            .iter()
            .map(|(name, decl)| (name.clone(), decl.first_span.clone()))
            .collect();
        FinalizedPattern {
            variables: self.variables(),
            declaration_spans,
            search_condition_scopes: self.search_condition_scopes,
            variable_scopes: self.variable_scopes,
        }
    }

    /// The final variable table: kind from the first declaration, degree
    /// and temp flag from the merged exposure.
    pub fn variables(&self) -> HashMap<SmolStr, Variable> {
        let exposed = self.exposed_variables.last().expect("sentinel frame");
        self.variable_declarations
            .iter()
            .map(|(name, decl)| {
                let var = exposed
                    .get(name)
                    .expect("every declared variable is exposed");
                (
                    name.clone(),
                    Variable {
                        kind: decl.kind,
                        degree: var.degree,
                        is_temp: var.is_temp,
                    },
                )
            })
            .collect()
    }

    /// True when every stack is back to its sentinel frame.
    pub fn is_balanced(&self) -> bool {
        self.exposed_variables.len() == 1
            && self.declarations_in_unions.len() == 1
            && self.is_restrictive_path_mode.len() == 1
            && self.minimum_path_length.len() == 1
            && self.non_zero_node_count.len() == 1
            && self.reference_scopes.len() == 1
            && self.variable_scope_stack.is_empty()
            && self.path_pattern_unions.is_empty()
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn append_exposed_variables(&mut self) -> Result<()> {
        let frame = self.exposed_variables.pop().expect("frame");
        for (name, var) in frame {
            self.expose_variable(name, var)?;
        }
        Ok(())
    }

    /// Exposes a variable into the current frame and records it in the
    /// active reference scope when it carries a new binding context.
    fn expose_new_variable(&mut self, name: SmolStr, variable: ExposedVariable) -> Result<()> {
        let recorded = Variable {
            kind: variable.kind,
            degree: variable.degree,
            is_temp: variable.is_temp,
        };
        let kind = variable.kind;
        self.expose_variable(name.clone(), variable)?;

        if matches!(kind, VariableKind::Node | VariableKind::Edge) {
            self.reference_scopes
                .last_mut()
                .expect("sentinel scope")
                .declared_variables
                .insert(name, recorded);
        }
        Ok(())
    }

    fn expose_variable(&mut self, name: SmolStr, variable: ExposedVariable) -> Result<()> {
        let frame = self.exposed_variables.last_mut().expect("sentinel frame");
        match frame.entry(name) {
            Entry::Vacant(entry) => {
                entry.insert(variable);
            }
            Entry::Occupied(entry) => {
                let name = entry.key().clone();
                let existing = entry.get();
                debug_assert_eq!(variable.is_temp, existing.is_temp);
                // If two path patterns expose the same element variable,
                // both occurrences must be unconditional singletons.
                if variable.degree != DegreeOfExposure::UnconditionalSingleton
                    || existing.degree != DegreeOfExposure::UnconditionalSingleton
                {
                    return Err(AnalyzerError::new(
                        ErrorCode::E0008,
                        variable.declaration_span.clone(),
                        format!(
                            "Element variable \"{name}\" was declared before and has \
                             incompatible degree of exposure"
                        ),
                    ));
                }
                // A strict interior variable of one selective path pattern
                // shall not be exposed anywhere else.
                if variable.is_strict_interior || existing.is_strict_interior {
                    return Err(AnalyzerError::new(
                        ErrorCode::E0009,
                        variable.declaration_span.clone(),
                        format!(
                            "Element variable \"{name}\" is a strict interior variable of one \
                             selective path pattern and can't be exposed by another"
                        ),
                    ));
                }
            }
        }
        Ok(())
    }

    fn is_inside_restrictive_search(&self) -> bool {
        self.is_restrictive_path_mode.last().copied().unwrap_or(false)
    }
}
