//! Graph pattern and path pattern parsing.

use crate::ast::pattern::*;
use crate::lexer::token::TokenKind;
use crate::parser::Parser;
use smol_str::SmolStr;

impl<'a> Parser<'a> {
    pub(super) fn parse_graph_pattern(&mut self) -> Option<GraphPattern> {
        let start = self.current_start().unwrap_or(0);

        let match_mode = self.parse_match_mode();
        let paths = self.parse_path_pattern_list()?;

        let where_clause = if self.eat(&TokenKind::Where) {
            let condition = self.parse_expression()?;
            let span = condition.span().clone();
            Some(GraphPatternWhereClause {
                condition,
                span,
                aux: None,
            })
        } else {
            None
        };

        let end = self.last_consumed_end(start);
        Some(GraphPattern {
            match_mode,
            paths,
            where_clause,
            span: start..end,
            aux: None,
        })
    }

    fn parse_match_mode(&mut self) -> Option<MatchMode> {
        match self.current_kind() {
            Some(TokenKind::Repeatable) => {
                self.advance();
                if matches!(
                    self.current_kind(),
                    Some(TokenKind::Element | TokenKind::Elements)
                ) {
                    self.advance();
                    self.eat(&TokenKind::Bindings);
                } else {
                    self.error_here(
                        "Expected ELEMENT or ELEMENTS after REPEATABLE",
                        "expected ELEMENTS here",
                    );
                }
                Some(MatchMode::RepeatableElements)
            }
            Some(TokenKind::Different) => {
                self.advance();
                if matches!(self.current_kind(), Some(TokenKind::Edge | TokenKind::Edges)) {
                    self.advance();
                    self.eat(&TokenKind::Bindings);
                } else {
                    self.error_here(
                        "Expected EDGE or EDGES after DIFFERENT",
                        "expected EDGES here",
                    );
                }
                Some(MatchMode::DifferentEdges)
            }
            _ => None,
        }
    }

    fn parse_path_pattern_list(&mut self) -> Option<PathPatternList> {
        let start = self.current_start().unwrap_or(0);
        let mut patterns = Vec::new();

        match self.parse_path_pattern() {
            Some(pattern) => patterns.push(pattern),
            None => {
                self.error_here(
                    "Expected path pattern in MATCH clause",
                    "expected path pattern here",
                );
                return None;
            }
        }

        while self.eat(&TokenKind::Comma) {
            match self.parse_path_pattern() {
                Some(pattern) => patterns.push(pattern),
                None => {
                    self.error_here("Expected path pattern after ','", "missing path pattern");
                    break;
                }
            }
        }

        let end = patterns.last().map(|p| p.span.end).unwrap_or(start);
        Some(PathPatternList {
            patterns,
            span: start..end,
        })
    }

    fn parse_path_pattern(&mut self) -> Option<PathPattern> {
        let start = self.current_start()?;

        let variable = self.parse_path_variable_declaration();
        let prefix = self.parse_path_pattern_prefix();

        let expression = match self.parse_path_pattern_expression() {
            Some(expression) => expression,
            None => {
                if variable.is_some() || prefix.is_some() {
                    self.error_here("Expected path pattern expression", "expected path here");
                }
                return None;
            }
        };

        let end = expression.span.end;
        Some(PathPattern {
            variable,
            prefix,
            expression,
            span: start..end,
            aux: None,
        })
    }

    fn parse_path_variable_declaration(&mut self) -> Option<PathVariableDeclaration> {
        let name = match self.current_kind() {
            Some(kind) => kind.identifier_text()?,
            None => return None,
        };
        if self.peek_kind(1) != Some(&TokenKind::Eq) {
            return None;
        }

        let start = self.current_start()?;
        self.advance(); // name
        self.advance(); // =
        let end = self.last_consumed_end(start);
        Some(PathVariableDeclaration {
            name,
            span: start..end,
        })
    }

    fn parse_path_pattern_prefix(&mut self) -> Option<PathPatternPrefix> {
        if let Some(mode) = self.parse_path_mode() {
            self.consume_path_or_paths();
            return Some(PathPatternPrefix::PathMode(mode));
        }
        self.parse_path_search_prefix()
            .map(PathPatternPrefix::PathSearch)
    }

    fn parse_path_mode(&mut self) -> Option<PathMode> {
        let mode = match self.current_kind() {
            Some(TokenKind::Walk) => PathMode::Walk,
            Some(TokenKind::Trail) => PathMode::Trail,
            Some(TokenKind::Simple) => PathMode::Simple,
            Some(TokenKind::Acyclic) => PathMode::Acyclic,
            _ => return None,
        };
        self.advance();
        Some(mode)
    }

    fn consume_path_or_paths(&mut self) {
        if matches!(self.current_kind(), Some(TokenKind::Path | TokenKind::Paths)) {
            self.advance();
        }
    }

    fn parse_path_search_prefix(&mut self) -> Option<PathSearchPrefix> {
        let start = self.current_start()?;

        let search = match self.current_kind() {
            Some(TokenKind::All) => {
                self.advance();
                if self.eat(&TokenKind::Shortest) {
                    PathSearch::AllShortest
                } else {
                    PathSearch::All
                }
            }
            Some(TokenKind::Any) => {
                self.advance();
                let count = self.parse_integer_lexeme();
                if self.eat(&TokenKind::Shortest) {
                    PathSearch::AnyShortest
                } else {
                    PathSearch::Any { count }
                }
            }
            Some(TokenKind::Shortest) => {
                self.advance();
                let count = self.parse_integer_lexeme();
                let mode = self.parse_path_mode().unwrap_or_default();
                self.consume_path_or_paths();
                let search =
                    if matches!(self.current_kind(), Some(TokenKind::Group | TokenKind::Groups)) {
                        self.advance();
                        PathSearch::CountedShortestGroups { count }
                    } else if let Some(count) = count {
                        PathSearch::CountedShortest { count }
                    } else {
                        PathSearch::AnyShortest
                    };
                let end = self.last_consumed_end(start);
                return Some(PathSearchPrefix {
                    search,
                    mode,
                    span: start..end,
                });
            }
            _ => return None,
        };

        let mode = self.parse_path_mode().unwrap_or_default();
        self.consume_path_or_paths();
        let end = self.last_consumed_end(start);
        Some(PathSearchPrefix {
            search,
            mode,
            span: start..end,
        })
    }

    fn parse_integer_lexeme(&mut self) -> Option<SmolStr> {
        if let Some(TokenKind::IntegerLiteral(text)) = self.current_kind() {
            let text = text.clone();
            self.advance();
            Some(text)
        } else {
            None
        }
    }

    pub(super) fn parse_path_pattern_expression(&mut self) -> Option<PathPatternExpression> {
        let start = self.current_start()?;
        let mut terms = Vec::new();
        let mut op = PathUnionOperator::Union;

        terms.push(self.parse_path_term()?);

        loop {
            let next_op = match self.current_kind() {
                Some(TokenKind::Pipe) => PathUnionOperator::Union,
                Some(TokenKind::MultisetAlternation) => PathUnionOperator::Alternation,
                _ => break,
            };
            if terms.len() > 1 && next_op != op {
                self.error_here(
                    "Cannot mix '|' and '|+|' in one path pattern expression",
                    "conflicting union operator",
                );
            }
            op = next_op;
            self.advance();

            match self.parse_path_term() {
                Some(term) => terms.push(term),
                None => {
                    self.error_here("Expected path term after union operator", "missing term");
                    break;
                }
            }
        }

        let end = terms.last().map(|t| t.span.end).unwrap_or(start);
        Some(PathPatternExpression {
            terms,
            op,
            span: start..end,
            aux: None,
        })
    }

    fn parse_path_term(&mut self) -> Option<PathTerm> {
        let start = self.current_start()?;
        let mut factors = Vec::new();

        while let Some(factor) = self.parse_path_factor() {
            factors.push(factor);
        }

        if factors.is_empty() {
            return None;
        }

        let end = factors.last().map(|f| f.span.end).unwrap_or(start);
        Some(PathTerm {
            factors,
            span: start..end,
        })
    }

    fn parse_path_factor(&mut self) -> Option<PathFactor> {
        let start = self.current_start()?;
        let primary = self.parse_path_primary()?;
        let quantifier = self.parse_quantifier();
        let end = self.last_consumed_end(start);
        Some(PathFactor {
            quantifier,
            primary,
            span: start..end,
            aux: None,
        })
    }

    fn parse_quantifier(&mut self) -> PathQuantifier {
        let start = self.current_start().unwrap_or(0);
        match self.current_kind() {
            Some(TokenKind::Question) => {
                self.advance();
                PathQuantifier::Questioned
            }
            Some(TokenKind::Star) => {
                self.advance();
                PathQuantifier::Quantified(GraphPatternQuantifier {
                    lower: 0,
                    upper: None,
                    span: start..self.last_consumed_end(start),
                })
            }
            Some(TokenKind::Plus) => {
                self.advance();
                PathQuantifier::Quantified(GraphPatternQuantifier {
                    lower: 1,
                    upper: None,
                    span: start..self.last_consumed_end(start),
                })
            }
            Some(TokenKind::LBrace) => {
                // `{m}`, `{m,}`, `{m,n}` -- only when the braces hold a
                // quantifier shape (property maps never follow a factor).
                self.advance();
                let lower = match self.parse_integer_lexeme() {
                    Some(text) => text.parse::<u64>().unwrap_or(0),
                    None => {
                        self.error_here(
                            "Expected lower bound in quantifier",
                            "expected an integer here",
                        );
                        0
                    }
                };
                let upper = if self.eat(&TokenKind::Comma) {
                    self.parse_integer_lexeme()
                        .map(|text| text.parse::<u64>().unwrap_or(0))
                } else {
                    Some(lower)
                };
                if !self.eat(&TokenKind::RBrace) {
                    self.error_here("Expected '}' to close quantifier", "expected '}' here");
                }
                PathQuantifier::Quantified(GraphPatternQuantifier {
                    lower,
                    upper,
                    span: start..self.last_consumed_end(start),
                })
            }
            _ => PathQuantifier::None,
        }
    }

    fn parse_path_primary(&mut self) -> Option<PathPrimary> {
        match self.current_kind() {
            Some(TokenKind::LParen) => self.parse_node_or_parenthesized(),
            Some(
                TokenKind::Minus
                | TokenKind::Arrow
                | TokenKind::LeftArrow
                | TokenKind::Tilde
                | TokenKind::RightTilde
                | TokenKind::LeftTilde,
            ) => self.parse_edge_or_simplified(),
            _ => None,
        }
    }

    /// Disambiguates `(` between a node pattern and a parenthesized path
    /// pattern expression by attempting the node parse first.
    fn parse_node_or_parenthesized(&mut self) -> Option<PathPrimary> {
        let checkpoint = self.checkpoint();
        if let Some(node) = self.try_parse_node_pattern() {
            return Some(PathPrimary::Element(ElementPattern::Node(node)));
        }
        self.rewind(checkpoint);
        self.parse_parenthesized_expression()
            .map(|paren| PathPrimary::Parenthesized(Box::new(paren)))
    }

    fn try_parse_node_pattern(&mut self) -> Option<NodePattern> {
        let start = self.current_start()?;
        self.advance(); // (
        let filler = self.parse_element_pattern_filler(start)?;
        if !self.eat(&TokenKind::RParen) {
            return None;
        }
        let end = self.last_consumed_end(start);
        Some(NodePattern {
            filler,
            span: start..end,
        })
    }

    fn parse_parenthesized_expression(&mut self) -> Option<ParenthesizedPathPatternExpression> {
        let start = self.current_start()?;
        if !self.eat(&TokenKind::LParen) {
            return None;
        }

        let subpath_variable = self.parse_subpath_variable_declaration();
        let path_mode = self.parse_path_mode().unwrap_or_default();
        if path_mode != PathMode::Walk {
            self.consume_path_or_paths();
        }

        let pattern = match self.parse_path_pattern_expression() {
            Some(pattern) => pattern,
            None => {
                self.error_here(
                    "Expected path pattern expression inside parentheses",
                    "expected path pattern here",
                );
                return None;
            }
        };

        let where_clause = if self.eat(&TokenKind::Where) {
            let condition = self.parse_expression()?;
            let span = condition.span().clone();
            Some(ParenthesizedPathPatternWhereClause {
                condition,
                span,
                aux: None,
            })
        } else {
            None
        };

        if !self.eat(&TokenKind::RParen) {
            self.error_here(
                "Expected ')' to close parenthesized path pattern",
                "expected ')' here",
            );
        }

        let end = self.last_consumed_end(start);
        Some(ParenthesizedPathPatternExpression {
            subpath_variable,
            path_mode,
            pattern,
            where_clause,
            span: start..end,
        })
    }

    fn parse_subpath_variable_declaration(&mut self) -> Option<SubpathVariableDeclaration> {
        let name = match self.current_kind() {
            Some(kind) => kind.identifier_text()?,
            None => return None,
        };
        if self.peek_kind(1) != Some(&TokenKind::Eq) {
            return None;
        }

        let start = self.current_start()?;
        self.advance();
        self.advance();
        let end = self.last_consumed_end(start);
        Some(SubpathVariableDeclaration {
            name,
            span: start..end,
        })
    }

    // ------------------------------------------------------------------
    // Element patterns
    // ------------------------------------------------------------------

    /// Parses an element pattern filler. Returns `None` if the content
    /// cannot be a filler (signals the caller to reparse as a parenthesized
    /// path pattern).
    fn parse_element_pattern_filler(&mut self, fallback_start: usize) -> Option<ElementPatternFiller> {
        let start = self.current_start().unwrap_or(fallback_start);

        let is_temp = self.eat(&TokenKind::Temp);
        let variable = match self.current_kind() {
            Some(kind) => match kind.identifier_text() {
                Some(name) => {
                    // An identifier followed by `=` is a subpath variable
                    // declaration, not an element variable.
                    if self.peek_kind(1) == Some(&TokenKind::Eq) {
                        return None;
                    }
                    let span = self.current_span_or(start);
                    self.advance();
                    Some(ElementVariableDeclaration {
                        name,
                        is_temp,
                        span,
                    })
                }
                None => None,
            },
            None => None,
        };
        if is_temp && variable.is_none() {
            return None;
        }

        let label = if matches!(self.current_kind(), Some(TokenKind::Colon | TokenKind::Is)) {
            self.advance();
            Some(self.parse_label_expression()?)
        } else {
            None
        };

        let predicate = match self.current_kind() {
            Some(TokenKind::LBrace) => {
                Some(ElementPatternPredicate::Properties(
                    self.parse_element_property_specification()?,
                ))
            }
            Some(TokenKind::Where) => {
                let where_start = self.current_start().unwrap_or(start);
                self.advance();
                let condition = self.parse_expression()?;
                let end = condition.span().end;
                Some(ElementPatternPredicate::Where(ElementPatternWhereClause {
                    condition,
                    span: where_start..end,
                }))
            }
            _ => None,
        };

        let end = self.last_consumed_end(start);
        Some(ElementPatternFiller {
            variable,
            label,
            predicate,
            span: start..end,
        })
    }

    fn parse_element_property_specification(&mut self) -> Option<ElementPropertySpecification> {
        let start = self.current_start()?;
        self.advance(); // {

        let mut properties = Vec::new();
        while !matches!(self.current_kind(), Some(TokenKind::RBrace) | None) && !self.at_eof() {
            let pair = self.parse_property_key_value_pair()?;
            properties.push(pair);
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }

        if !self.eat(&TokenKind::RBrace) {
            self.error_here(
                "Expected '}' to close property specification",
                "expected '}' here",
            );
            return None;
        }

        let end = self.last_consumed_end(start);
        Some(ElementPropertySpecification {
            properties,
            span: start..end,
        })
    }

    fn parse_property_key_value_pair(&mut self) -> Option<PropertyKeyValuePair> {
        let start = self.current_start()?;
        let key = match self.current_kind() {
            Some(TokenKind::StringLiteral(name)) => {
                let name = name.clone();
                self.advance();
                name
            }
            Some(kind) => match kind.identifier_text() {
                Some(name) => {
                    self.advance();
                    name
                }
                None => {
                    self.error_here(
                        "Expected property name in property specification",
                        "expected property name here",
                    );
                    return None;
                }
            },
            None => return None,
        };

        if !self.eat(&TokenKind::Colon) {
            self.error_here("Expected ':' after property name", "expected ':' here");
            return None;
        }

        let value = self.parse_expression()?;
        let end = value.span().end;
        Some(PropertyKeyValuePair {
            key,
            value,
            span: start..end,
        })
    }

    // ------------------------------------------------------------------
    // Label expressions
    // ------------------------------------------------------------------

    pub(super) fn parse_label_expression(&mut self) -> Option<LabelExpression> {
        self.parse_label_disjunction()
    }

    fn parse_label_disjunction(&mut self) -> Option<LabelExpression> {
        let start = self.current_start()?;
        let first = self.parse_label_conjunction()?;
        if !self.check(&TokenKind::Pipe) {
            return Some(first);
        }

        let mut parts = vec![first];
        while self.eat(&TokenKind::Pipe) {
            parts.push(self.parse_label_conjunction()?);
        }
        let end = self.last_consumed_end(start);
        Some(LabelExpression::Disjunction(parts, start..end))
    }

    fn parse_label_conjunction(&mut self) -> Option<LabelExpression> {
        let start = self.current_start()?;
        let first = self.parse_label_primary()?;
        if !self.check(&TokenKind::Ampersand) {
            return Some(first);
        }

        let mut parts = vec![first];
        while self.eat(&TokenKind::Ampersand) {
            parts.push(self.parse_label_primary()?);
        }
        let end = self.last_consumed_end(start);
        Some(LabelExpression::Conjunction(parts, start..end))
    }

    fn parse_label_primary(&mut self) -> Option<LabelExpression> {
        let start = self.current_start()?;
        match self.current_kind() {
            Some(TokenKind::Bang) => {
                self.advance();
                let inner = self.parse_label_primary()?;
                let end = self.last_consumed_end(start);
                Some(LabelExpression::Negation(Box::new(inner), start..end))
            }
            Some(TokenKind::Percent) => {
                self.advance();
                Some(LabelExpression::Wildcard(start..self.last_consumed_end(start)))
            }
            Some(TokenKind::LParen) => {
                self.advance();
                let inner = self.parse_label_disjunction()?;
                if !self.eat(&TokenKind::RParen) {
                    self.error_here("Expected ')' in label expression", "expected ')' here");
                    return None;
                }
                let end = self.last_consumed_end(start);
                Some(LabelExpression::Parenthesized(Box::new(inner), start..end))
            }
            Some(kind) => {
                let name = kind.identifier_text()?;
                self.advance();
                Some(LabelExpression::Name(name, start..self.last_consumed_end(start)))
            }
            None => None,
        }
    }

    // ------------------------------------------------------------------
    // Edge and simplified path patterns
    // ------------------------------------------------------------------

    fn parse_edge_or_simplified(&mut self) -> Option<PathPrimary> {
        let start = self.current_start()?;
        let opening = self.current_kind()?.clone();

        // Simplified path pattern: opening glyph directly followed by `/`.
        if matches!(
            opening,
            TokenKind::Minus | TokenKind::Tilde | TokenKind::LeftArrow | TokenKind::LeftTilde
        ) && self.peek_kind(1) == Some(&TokenKind::Slash)
            && self.next_is_adjacent()
        {
            return self
                .parse_simplified_expression(opening, start)
                .map(|simplified| PathPrimary::Simplified(Box::new(simplified)));
        }

        // Full edge pattern: opening glyph followed by `[`.
        if matches!(
            opening,
            TokenKind::Minus | TokenKind::Tilde | TokenKind::LeftArrow | TokenKind::LeftTilde
        ) && self.peek_kind(1) == Some(&TokenKind::LBracket)
        {
            return self
                .parse_full_edge_pattern(opening, start)
                .map(|edge| PathPrimary::Element(ElementPattern::Edge(edge)));
        }

        // Abbreviated edge pattern.
        let direction = match opening {
            TokenKind::Minus => {
                self.advance();
                EdgeDirection::AnyDirection
            }
            TokenKind::Arrow => {
                self.advance();
                EdgeDirection::PointingRight
            }
            TokenKind::LeftArrow => {
                self.advance();
                // `<->` lexes as `<-` + `>`; join when adjacent.
                if self.check(&TokenKind::Gt)
                    && self.last_consumed_end(start) == self.current_start().unwrap_or(usize::MAX)
                {
                    self.advance();
                    EdgeDirection::LeftOrRight
                } else {
                    EdgeDirection::PointingLeft
                }
            }
            TokenKind::Tilde => {
                self.advance();
                EdgeDirection::Undirected
            }
            TokenKind::RightTilde => {
                self.advance();
                EdgeDirection::RightOrUndirected
            }
            TokenKind::LeftTilde => {
                self.advance();
                EdgeDirection::LeftOrUndirected
            }
            _ => return None,
        };

        let end = self.last_consumed_end(start);
        Some(PathPrimary::Element(ElementPattern::Edge(EdgePattern {
            direction,
            filler: None,
            span: start..end,
        })))
    }

    fn parse_full_edge_pattern(&mut self, opening: TokenKind, start: usize) -> Option<EdgePattern> {
        self.advance(); // opening glyph
        self.advance(); // [

        let filler = self.parse_element_pattern_filler(start)?;

        if !self.eat(&TokenKind::RBracket) {
            self.error_here("Expected ']' in edge pattern", "expected ']' here");
            return None;
        }

        let closing = self.current_kind().cloned();
        let direction = match (&opening, closing) {
            (TokenKind::Minus, Some(TokenKind::Arrow)) => EdgeDirection::PointingRight,
            (TokenKind::Minus, Some(TokenKind::Minus)) => EdgeDirection::AnyDirection,
            (TokenKind::LeftArrow, Some(TokenKind::Minus)) => EdgeDirection::PointingLeft,
            (TokenKind::LeftArrow, Some(TokenKind::Arrow)) => EdgeDirection::LeftOrRight,
            (TokenKind::Tilde, Some(TokenKind::Tilde)) => EdgeDirection::Undirected,
            (TokenKind::Tilde, Some(TokenKind::RightTilde)) => EdgeDirection::RightOrUndirected,
            (TokenKind::LeftTilde, Some(TokenKind::Tilde)) => EdgeDirection::LeftOrUndirected,
            _ => {
                self.error_here(
                    "Expected edge direction terminator after ']'",
                    "expected edge glyph here",
                );
                return None;
            }
        };
        self.advance(); // closing glyph

        let end = self.last_consumed_end(start);
        Some(EdgePattern {
            direction,
            filler: Some(filler),
            span: start..end,
        })
    }

    fn parse_simplified_expression(
        &mut self,
        opening: TokenKind,
        start: usize,
    ) -> Option<SimplifiedPathPatternExpression> {
        self.advance(); // opening glyph
        self.advance(); // /

        let contents = self.parse_simplified_contents()?;

        if !self.eat(&TokenKind::Slash) {
            self.error_here(
                "Expected '/' to close simplified path pattern",
                "expected '/' here",
            );
            return None;
        }

        let closing = self.current_kind().cloned();
        let direction = match (&opening, closing) {
            (TokenKind::Minus, Some(TokenKind::Minus)) => EdgeDirection::AnyDirection,
            (TokenKind::Minus, Some(TokenKind::Arrow)) => EdgeDirection::PointingRight,
            (TokenKind::LeftArrow, Some(TokenKind::Minus)) => EdgeDirection::PointingLeft,
            (TokenKind::LeftArrow, Some(TokenKind::Arrow)) => EdgeDirection::LeftOrRight,
            (TokenKind::Tilde, Some(TokenKind::Tilde)) => EdgeDirection::Undirected,
            (TokenKind::Tilde, Some(TokenKind::RightTilde)) => EdgeDirection::RightOrUndirected,
            (TokenKind::LeftTilde, Some(TokenKind::Tilde)) => EdgeDirection::LeftOrUndirected,
            _ => {
                self.error_here(
                    "Expected simplified path pattern terminator",
                    "expected edge glyph here",
                );
                return None;
            }
        };
        self.advance(); // closing glyph

        let end = self.last_consumed_end(start);
        Some(SimplifiedPathPatternExpression {
            direction,
            contents,
            span: start..end,
        })
    }

    fn parse_simplified_contents(&mut self) -> Option<SimplifiedContents> {
        let start = self.current_start()?;
        let mut terms = Vec::new();
        let mut op = PathUnionOperator::Union;

        terms.push(self.parse_simplified_term()?);

        loop {
            let next_op = match self.current_kind() {
                Some(TokenKind::Pipe) => PathUnionOperator::Union,
                Some(TokenKind::MultisetAlternation) => PathUnionOperator::Alternation,
                _ => break,
            };
            if terms.len() > 1 && next_op != op {
                self.error_here(
                    "Cannot mix '|' and '|+|' in one simplified path pattern",
                    "conflicting union operator",
                );
            }
            op = next_op;
            self.advance();
            match self.parse_simplified_term() {
                Some(term) => terms.push(term),
                None => {
                    self.error_here("Expected simplified term after union operator", "missing term");
                    break;
                }
            }
        }

        let end = terms.last().map(|t| t.span.end).unwrap_or(start);
        Some(SimplifiedContents {
            terms,
            op,
            span: start..end,
        })
    }

    fn parse_simplified_term(&mut self) -> Option<SimplifiedTerm> {
        let start = self.current_start()?;
        let mut factors = Vec::new();

        while let Some(factor) = self.parse_simplified_factor() {
            factors.push(factor);
        }

        if factors.is_empty() {
            return None;
        }

        let end = factors.last().map(|f| f.span.end).unwrap_or(start);
        Some(SimplifiedTerm {
            factors,
            span: start..end,
        })
    }

    fn parse_simplified_factor(&mut self) -> Option<SimplifiedFactor> {
        let start = self.current_start()?;

        let has_left = if self.check(&TokenKind::Lt) {
            self.advance();
            true
        } else {
            false
        };

        let primary = match self.parse_simplified_conjunction() {
            Some(primary) => primary,
            None => {
                if has_left {
                    self.error_here(
                        "Expected simplified path primary after '<'",
                        "expected label here",
                    );
                }
                return None;
            }
        };

        let has_right = if self.check(&TokenKind::Gt) {
            self.advance();
            true
        } else {
            false
        };

        let direction = match (has_left, has_right) {
            (false, false) => None,
            (true, false) => Some(SimplifiedDirectionOverride::Left),
            (false, true) => Some(SimplifiedDirectionOverride::Right),
            (true, true) => Some(SimplifiedDirectionOverride::LeftOrRight),
        };

        let quantifier = self.parse_quantifier();
        let end = self.last_consumed_end(start);
        Some(SimplifiedFactor {
            direction,
            primary,
            quantifier,
            span: start..end,
        })
    }

    fn parse_simplified_conjunction(&mut self) -> Option<SimplifiedPrimary> {
        let start = self.current_start()?;
        let first = self.parse_simplified_unit()?;
        if !self.check(&TokenKind::Ampersand) {
            return Some(SimplifiedPrimary::Unit(first));
        }

        let mut units = vec![first];
        while self.eat(&TokenKind::Ampersand) {
            match self.parse_simplified_unit() {
                Some(unit) => units.push(unit),
                None => {
                    self.error_here("Expected label after '&'", "missing conjunction operand");
                    break;
                }
            }
        }
        let end = self.last_consumed_end(start);
        Some(SimplifiedPrimary::Conjunction(units, start..end))
    }

    fn parse_simplified_unit(&mut self) -> Option<SimplifiedUnit> {
        let start = self.current_start()?;
        match self.current_kind() {
            Some(TokenKind::Bang) => {
                self.advance();
                let inner = self.parse_simplified_unit()?;
                let end = self.last_consumed_end(start);
                Some(SimplifiedUnit::Negation(Box::new(inner), start..end))
            }
            Some(TokenKind::LParen) => {
                self.advance();
                let contents = self.parse_simplified_contents()?;
                if !self.eat(&TokenKind::RParen) {
                    self.error_here(
                        "Expected ')' in simplified path pattern",
                        "expected ')' here",
                    );
                    return None;
                }
                let end = self.last_consumed_end(start);
                Some(SimplifiedUnit::Parenthesized(Box::new(contents), start..end))
            }
            Some(kind) => {
                let name = kind.identifier_text()?;
                self.advance();
                Some(SimplifiedUnit::Label(name, start..self.last_consumed_end(start)))
            }
            None => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn single_pattern(source: &str) -> GraphPattern {
        let result = parse(source);
        assert!(
            result.diagnostics.is_empty(),
            "unexpected diagnostics for `{source}`: {:?}",
            result.diagnostics
        );
        let mut program = result.program.expect("program");
        assert_eq!(program.statements.len(), 1);
        program.statements.remove(0).pattern
    }

    fn first_term(pattern: &GraphPattern) -> &PathTerm {
        &pattern.paths.patterns[0].expression.terms[0]
    }

    #[test]
    fn node_edge_node_chain() {
        let pattern = single_pattern("MATCH (a)-[b]->(c)");
        let term = first_term(&pattern);
        assert_eq!(term.factors.len(), 3);
        assert!(matches!(
            &term.factors[1].primary,
            PathPrimary::Element(ElementPattern::Edge(edge))
                if edge.direction == EdgeDirection::PointingRight
        ));
    }

    #[test]
    fn abbreviated_edge_directions() {
        for (source, direction) in [
            ("MATCH -", EdgeDirection::AnyDirection),
            ("MATCH ->", EdgeDirection::PointingRight),
            ("MATCH <-", EdgeDirection::PointingLeft),
            ("MATCH ~", EdgeDirection::Undirected),
            ("MATCH ~>", EdgeDirection::RightOrUndirected),
            ("MATCH <~", EdgeDirection::LeftOrUndirected),
            ("MATCH <->", EdgeDirection::LeftOrRight),
        ] {
            let pattern = single_pattern(source);
            let term = first_term(&pattern);
            assert!(
                matches!(
                    &term.factors[0].primary,
                    PathPrimary::Element(ElementPattern::Edge(edge))
                        if edge.direction == direction && edge.filler.is_none()
                ),
                "wrong direction for {source}"
            );
        }
    }

    #[test]
    fn quantifiers() {
        let pattern = single_pattern("MATCH ((a)-[b]->(c)){2,3}");
        let term = first_term(&pattern);
        assert!(matches!(
            &term.factors[0].quantifier,
            PathQuantifier::Quantified(q) if q.lower == 2 && q.upper == Some(3)
        ));

        let pattern = single_pattern("MATCH ((a)-[b]->(c))+");
        assert!(matches!(
            &first_term(&pattern).factors[0].quantifier,
            PathQuantifier::Quantified(q) if q.lower == 1 && q.upper.is_none()
        ));

        let pattern = single_pattern("MATCH ((a)-[b]->(c))?");
        assert!(matches!(
            &first_term(&pattern).factors[0].quantifier,
            PathQuantifier::Questioned
        ));
    }

    #[test]
    fn node_where_predicate() {
        let pattern = single_pattern("MATCH (a WHERE a.prop = 3)");
        let term = first_term(&pattern);
        let PathPrimary::Element(ElementPattern::Node(node)) = &term.factors[0].primary else {
            panic!("expected node");
        };
        assert!(matches!(
            node.filler.predicate,
            Some(ElementPatternPredicate::Where(_))
        ));
    }

    #[test]
    fn node_property_predicate() {
        let pattern = single_pattern("MATCH (a {prop1: 3, prop2: 4})");
        let term = first_term(&pattern);
        let PathPrimary::Element(ElementPattern::Node(node)) = &term.factors[0].primary else {
            panic!("expected node");
        };
        let Some(ElementPatternPredicate::Properties(props)) = &node.filler.predicate else {
            panic!("expected properties");
        };
        assert_eq!(props.properties.len(), 2);
        assert_eq!(props.properties[0].key.as_str(), "prop1");
    }

    #[test]
    fn parenthesized_with_subpath_and_mode() {
        let pattern = single_pattern("MATCH (p = TRAIL (a)-[b]->(c) WHERE a.x = 1)");
        let term = first_term(&pattern);
        let PathPrimary::Parenthesized(paren) = &term.factors[0].primary else {
            panic!("expected parenthesized expression");
        };
        assert_eq!(paren.subpath_variable.as_ref().unwrap().name.as_str(), "p");
        assert_eq!(paren.path_mode, PathMode::Trail);
        assert!(paren.where_clause.is_some());
    }

    #[test]
    fn path_variable_and_prefix() {
        let pattern = single_pattern("MATCH p = ANY SHORTEST (a)-[b]->(c)");
        let path = &pattern.paths.patterns[0];
        assert_eq!(path.variable.as_ref().unwrap().name.as_str(), "p");
        let Some(PathPatternPrefix::PathSearch(search)) = &path.prefix else {
            panic!("expected search prefix");
        };
        assert_eq!(search.search, PathSearch::AnyShortest);
        assert!(search.search.is_selective());
    }

    #[test]
    fn union_and_alternation() {
        let pattern = single_pattern("MATCH (a)-[b]->(c) | (a)-[d]->(e)");
        let expr = &pattern.paths.patterns[0].expression;
        assert_eq!(expr.terms.len(), 2);
        assert_eq!(expr.op, PathUnionOperator::Union);

        let pattern = single_pattern("MATCH (a)-[b]->(c) |+| (a)-[d]->(e)");
        let expr = &pattern.paths.patterns[0].expression;
        assert_eq!(expr.op, PathUnionOperator::Alternation);
    }

    #[test]
    fn match_modes() {
        let pattern = single_pattern("MATCH DIFFERENT EDGES (a)-[b]->(c)");
        assert_eq!(pattern.match_mode, Some(MatchMode::DifferentEdges));

        let pattern = single_pattern("MATCH REPEATABLE ELEMENTS (a)");
        assert_eq!(pattern.match_mode, Some(MatchMode::RepeatableElements));
    }

    #[test]
    fn simplified_single_label() {
        let pattern = single_pattern("MATCH (a) -/KNOWS/-> (b)");
        let term = first_term(&pattern);
        let PathPrimary::Simplified(simplified) = &term.factors[1].primary else {
            panic!("expected simplified path pattern");
        };
        assert_eq!(simplified.direction, EdgeDirection::PointingRight);
        assert_eq!(simplified.contents.terms.len(), 1);
    }

    #[test]
    fn simplified_alternation_and_overrides() {
        let pattern = single_pattern("MATCH () ~/ A |+| (B | C D) |+| <E> /~> ()");
        let term = first_term(&pattern);
        let PathPrimary::Simplified(simplified) = &term.factors[1].primary else {
            panic!("expected simplified path pattern");
        };
        assert_eq!(simplified.direction, EdgeDirection::RightOrUndirected);
        assert_eq!(simplified.contents.op, PathUnionOperator::Alternation);
        assert_eq!(simplified.contents.terms.len(), 3);
        let third = &simplified.contents.terms[2].factors[0];
        assert_eq!(
            third.direction,
            Some(SimplifiedDirectionOverride::LeftOrRight)
        );
    }

    #[test]
    fn graph_pattern_where_clause() {
        let pattern = single_pattern("MATCH (a)-[b]->(c) WHERE a.age > 18");
        assert!(pattern.where_clause.is_some());
    }

    #[test]
    fn comma_separated_path_patterns() {
        let pattern = single_pattern("MATCH (a)-[b]->(c), (d)");
        assert_eq!(pattern.paths.patterns.len(), 2);
    }

    #[test]
    fn temp_variable_round_trip() {
        let pattern = single_pattern("MATCH (TEMP gen1)");
        let term = first_term(&pattern);
        let PathPrimary::Element(ElementPattern::Node(node)) = &term.factors[0].primary else {
            panic!("expected node");
        };
        let var = node.filler.variable.as_ref().expect("variable");
        assert!(var.is_temp);
        assert_eq!(var.name.as_str(), "gen1");
    }
}
