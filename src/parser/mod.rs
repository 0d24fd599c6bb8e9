//! Recursive-descent parser for GQL `MATCH` statements.
//!
//! The parser covers the pattern-matching front of the language: match
//! modes, path pattern lists with prefixes and path variables, path pattern
//! expressions (including the simplified surface syntax), element patterns,
//! and the value-expression subset used by search conditions and property
//! specifications. It is error-tolerant: diagnostics accumulate and parsing
//! resynchronizes at statement boundaries.

mod expression;
mod patterns;

use crate::ast::pattern::{MatchStatement, Program};
use crate::diag::Diag;
use crate::lexer::token::{Token, TokenKind};
use crate::lexer::Lexer;

/// Result of parsing: an optional AST plus accumulated diagnostics.
#[derive(Debug)]
pub struct ParseResult {
    /// The parsed program, if the parser could produce one.
    pub program: Option<Program>,
    /// Lexer and parser diagnostics.
    pub diagnostics: Vec<Diag>,
}

/// Parses GQL source text into a program of `MATCH` statements.
pub fn parse(source: &str) -> ParseResult {
    let lexed = Lexer::new(source).tokenize();
    let mut parser = Parser::new(&lexed.tokens);
    let program = parser.parse_program();

    let mut diagnostics = lexed.diagnostics;
    diagnostics.extend(parser.diags);

    ParseResult {
        program,
        diagnostics,
    }
}

pub(crate) struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    pub(crate) diags: Vec<Diag>,
}

impl<'a> Parser<'a> {
    fn new(tokens: &'a [Token]) -> Self {
        Self {
            tokens,
            pos: 0,
            diags: Vec::new(),
        }
    }

    fn parse_program(&mut self) -> Option<Program> {
        let mut statements = Vec::new();

        while !self.at_eof() {
            if matches!(self.current_kind(), Some(TokenKind::Match)) {
                if let Some(statement) = self.parse_match_statement() {
                    statements.push(statement);
                } else {
                    self.skip_to_statement_boundary();
                }
            } else {
                let span = self.current_span_or(0);
                self.diags.push(
                    Diag::error("Expected MATCH statement")
                        .with_primary_label(span, "expected MATCH here"),
                );
                self.skip_to_statement_boundary();
            }
        }

        if statements.is_empty() {
            return None;
        }

        let start = statements.first().map(|s| s.span.start).unwrap_or(0);
        let end = statements.last().map(|s| s.span.end).unwrap_or(start);
        Some(Program {
            statements,
            span: start..end,
        })
    }

    fn parse_match_statement(&mut self) -> Option<MatchStatement> {
        let start = self.current_start().unwrap_or(0);
        self.advance(); // MATCH

        let pattern = self.parse_graph_pattern()?;
        let end = pattern.span.end;
        Some(MatchStatement {
            pattern,
            span: start..end,
        })
    }

    fn skip_to_statement_boundary(&mut self) {
        while !self.at_eof() && !matches!(self.current_kind(), Some(TokenKind::Match)) {
            self.advance();
        }
    }

    // ------------------------------------------------------------------
    // Token stream helpers
    // ------------------------------------------------------------------

    pub(crate) fn current_kind(&self) -> Option<&TokenKind> {
        self.tokens.get(self.pos).map(|t| &t.kind)
    }

    pub(crate) fn peek_kind(&self, offset: usize) -> Option<&TokenKind> {
        self.tokens.get(self.pos + offset).map(|t| &t.kind)
    }

    pub(crate) fn advance(&mut self) {
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
    }

    pub(crate) fn check(&self, kind: &TokenKind) -> bool {
        self.current_kind() == Some(kind)
    }

    pub(crate) fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn at_eof(&self) -> bool {
        matches!(self.current_kind(), None | Some(TokenKind::Eof))
    }

    pub(crate) fn current_start(&self) -> Option<usize> {
        self.tokens.get(self.pos).map(|t| t.span.start)
    }

    pub(crate) fn current_span_or(&self, fallback: usize) -> crate::ast::Span {
        self.tokens
            .get(self.pos)
            .map(|t| t.span.clone())
            .unwrap_or(fallback..fallback)
    }

    pub(crate) fn last_consumed_end(&self, fallback: usize) -> usize {
        if self.pos == 0 {
            return fallback;
        }
        self.tokens
            .get(self.pos - 1)
            .map(|t| t.span.end)
            .unwrap_or(fallback)
    }

    /// True if the current token directly abuts the next (no whitespace).
    pub(crate) fn next_is_adjacent(&self) -> bool {
        match (self.tokens.get(self.pos), self.tokens.get(self.pos + 1)) {
            (Some(a), Some(b)) => a.span.end == b.span.start,
            _ => false,
        }
    }

    /// Saves the parser position for backtracking.
    pub(crate) fn checkpoint(&self) -> (usize, usize) {
        (self.pos, self.diags.len())
    }

    /// Restores a previously saved position, dropping diagnostics emitted
    /// since the checkpoint.
    pub(crate) fn rewind(&mut self, checkpoint: (usize, usize)) {
        self.pos = checkpoint.0;
        self.diags.truncate(checkpoint.1);
    }

    pub(crate) fn error_here(&mut self, message: &str, label: &str) {
        let span = self.current_span_or(self.last_consumed_end(0));
        self.diags
            .push(Diag::error(message).with_primary_label(span, label));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_match() {
        let result = parse("MATCH (a)");
        assert!(result.diagnostics.is_empty(), "{:?}", result.diagnostics);
        let program = result.program.expect("program");
        assert_eq!(program.statements.len(), 1);
    }

    #[test]
    fn parses_multiple_statements() {
        let result = parse("MATCH (a) MATCH (b)");
        assert!(result.diagnostics.is_empty(), "{:?}", result.diagnostics);
        assert_eq!(result.program.expect("program").statements.len(), 2);
    }

    #[test]
    fn reports_missing_match() {
        let result = parse("(a)");
        assert!(!result.diagnostics.is_empty());
        assert!(result.program.is_none());
    }
}
