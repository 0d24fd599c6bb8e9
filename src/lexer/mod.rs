//! Lexical analysis for GQL pattern text.
//!
//! An error-tolerant scanner that converts source text into a token stream.
//! Invalid characters are reported as diagnostics and skipped so the parser
//! always receives a well-formed stream terminated by an EOF token.

pub mod token;

use crate::diag::Diag;
use smol_str::SmolStr;
use token::{lookup_keyword, Token, TokenKind};

/// Result of lexical analysis.
#[derive(Debug, Clone, PartialEq)]
pub struct LexerResult {
    /// The tokens produced, including an EOF token at the end.
    pub tokens: Vec<Token>,
    /// Diagnostics encountered during scanning.
    pub diagnostics: Vec<Diag>,
}

/// A lexical analyzer over GQL source text.
pub struct Lexer<'a> {
    source: &'a str,
    pos: usize,
    tokens: Vec<Token>,
    diagnostics: Vec<Diag>,
}

impl<'a> Lexer<'a> {
    /// Creates a new lexer for the given source text.
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            pos: 0,
            tokens: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    /// Tokenizes the source text, consuming the lexer.
    pub fn tokenize(mut self) -> LexerResult {
        while !self.is_at_end() {
            self.skip_whitespace_and_comments();
            if self.is_at_end() {
                break;
            }
            self.scan_token();
        }

        let eof = self.source.len();
        self.tokens.push(Token::new(TokenKind::Eof, eof..eof));

        LexerResult {
            tokens: self.tokens,
            diagnostics: self.diagnostics,
        }
    }

    fn scan_token(&mut self) {
        let start = self.pos;
        let ch = self.advance();

        match ch {
            '(' => self.add_token(TokenKind::LParen, start),
            ')' => self.add_token(TokenKind::RParen, start),
            '[' => self.add_token(TokenKind::LBracket, start),
            ']' => self.add_token(TokenKind::RBracket, start),
            '{' => self.add_token(TokenKind::LBrace, start),
            '}' => self.add_token(TokenKind::RBrace, start),
            ',' => self.add_token(TokenKind::Comma, start),
            ':' => self.add_token(TokenKind::Colon, start),
            '+' => self.add_token(TokenKind::Plus, start),
            '*' => self.add_token(TokenKind::Star, start),
            '/' => self.add_token(TokenKind::Slash, start),
            '%' => self.add_token(TokenKind::Percent, start),
            '&' => self.add_token(TokenKind::Ampersand, start),
            '!' => self.add_token(TokenKind::Bang, start),
            '?' => self.add_token(TokenKind::Question, start),
            '=' => self.add_token(TokenKind::Eq, start),
            '.' => self.add_token(TokenKind::Dot, start),

            '-' => {
                if self.match_char('>') {
                    self.add_token(TokenKind::Arrow, start);
                } else {
                    self.add_token(TokenKind::Minus, start);
                }
            }
            '<' => {
                if self.match_char('-') {
                    self.add_token(TokenKind::LeftArrow, start);
                } else if self.match_char('~') {
                    self.add_token(TokenKind::LeftTilde, start);
                } else if self.match_char('=') {
                    self.add_token(TokenKind::LtEq, start);
                } else if self.match_char('>') {
                    self.add_token(TokenKind::NotEq, start);
                } else {
                    self.add_token(TokenKind::Lt, start);
                }
            }
            '>' => {
                if self.match_char('=') {
                    self.add_token(TokenKind::GtEq, start);
                } else {
                    self.add_token(TokenKind::Gt, start);
                }
            }
            '~' => {
                if self.match_char('>') {
                    self.add_token(TokenKind::RightTilde, start);
                } else {
                    self.add_token(TokenKind::Tilde, start);
                }
            }
            '|' => {
                if self.peek() == '+' && self.peek_next() == '|' {
                    self.advance();
                    self.advance();
                    self.add_token(TokenKind::MultisetAlternation, start);
                } else {
                    self.add_token(TokenKind::Pipe, start);
                }
            }

            '\'' | '"' => self.scan_string_literal(start, ch),
            '0'..='9' => self.scan_number(start),
            'a'..='z' | 'A'..='Z' | '_' => self.scan_identifier_or_keyword(start),

            _ => {
                self.diagnostics.push(
                    Diag::error(format!("invalid character '{ch}'"))
                        .with_primary_label(start..self.pos, "not a GQL token"),
                );
            }
        }
    }

    fn scan_identifier_or_keyword(&mut self, start: usize) {
        while self.is_identifier_continue(self.peek()) {
            self.advance();
        }
        let text = &self.source[start..self.pos];
        if let Some(kind) = lookup_keyword(text) {
            self.add_token(kind, start);
        } else {
            self.add_token(TokenKind::Identifier(SmolStr::new(text)), start);
        }
    }

    fn scan_number(&mut self, start: usize) {
        while self.peek().is_ascii_digit() {
            self.advance();
        }
        let mut is_float = false;
        if self.peek() == '.' && self.peek_next().is_ascii_digit() {
            is_float = true;
            self.advance();
            while self.peek().is_ascii_digit() {
                self.advance();
            }
        }
        let text = SmolStr::new(&self.source[start..self.pos]);
        let kind = if is_float {
            TokenKind::FloatLiteral(text)
        } else {
            TokenKind::IntegerLiteral(text)
        };
        self.add_token(kind, start);
    }

    fn scan_string_literal(&mut self, start: usize, quote: char) {
        let mut value = String::new();
        while self.peek() != quote && !self.is_at_end() {
            if self.peek() == '\\' {
                self.advance();
                if self.is_at_end() {
                    break;
                }
                let escaped = self.advance();
                match escaped {
                    'n' => value.push('\n'),
                    't' => value.push('\t'),
                    'r' => value.push('\r'),
                    '\\' => value.push('\\'),
                    '\'' => value.push('\''),
                    '"' => value.push('"'),
                    other => {
                        self.diagnostics.push(
                            Diag::warning(format!("unknown escape sequence '\\{other}'"))
                                .with_primary_label(self.pos - 1..self.pos, "unknown escape"),
                        );
                        value.push(other);
                    }
                }
            } else {
                value.push(self.advance());
            }
        }

        if self.is_at_end() {
            self.diagnostics.push(
                Diag::error("unterminated string literal")
                    .with_primary_label(start..self.pos, "string starts here"),
            );
        } else {
            self.advance();
        }

        self.add_token(TokenKind::StringLiteral(SmolStr::new(value)), start);
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            let ch = self.peek();
            if ch.is_whitespace() {
                self.advance();
            } else if ch == '/' && self.peek_next() == '*' {
                let start = self.pos;
                self.advance();
                self.advance();
                let mut closed = false;
                while !self.is_at_end() {
                    if self.peek() == '*' && self.peek_next() == '/' {
                        self.advance();
                        self.advance();
                        closed = true;
                        break;
                    }
                    self.advance();
                }
                if !closed {
                    self.diagnostics.push(
                        Diag::error("unterminated block comment")
                            .with_primary_label(start..self.pos, "comment starts here"),
                    );
                }
            } else {
                break;
            }
        }
    }

    fn add_token(&mut self, kind: TokenKind, start: usize) {
        self.tokens.push(Token::new(kind, start..self.pos));
    }

    fn is_identifier_continue(&self, ch: char) -> bool {
        ch.is_ascii_alphanumeric() || ch == '_'
    }

    fn advance(&mut self) -> char {
        let ch = self.peek();
        self.pos += ch.len_utf8();
        ch
    }

    fn match_char(&mut self, expected: char) -> bool {
        if self.peek() == expected {
            self.advance();
            true
        } else {
            false
        }
    }

    fn peek(&self) -> char {
        self.source[self.pos..].chars().next().unwrap_or('\0')
    }

    fn peek_next(&self) -> char {
        let mut chars = self.source[self.pos..].chars();
        chars.next();
        chars.next().unwrap_or('\0')
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.source.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        let result = Lexer::new(source).tokenize();
        assert!(
            result.diagnostics.is_empty(),
            "unexpected diagnostics for `{source}`: {:?}",
            result.diagnostics
        );
        result.tokens.into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn basic_match_pattern() {
        let kinds = kinds("MATCH (a)-[b]->(c)");
        assert_eq!(
            kinds,
            vec![
                TokenKind::Match,
                TokenKind::LParen,
                TokenKind::Identifier(SmolStr::new("a")),
                TokenKind::RParen,
                TokenKind::Minus,
                TokenKind::LBracket,
                TokenKind::Identifier(SmolStr::new("b")),
                TokenKind::RBracket,
                TokenKind::Arrow,
                TokenKind::LParen,
                TokenKind::Identifier(SmolStr::new("c")),
                TokenKind::RParen,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn edge_glyphs() {
        assert_eq!(
            kinds("<- -> <~ ~> ~ -"),
            vec![
                TokenKind::LeftArrow,
                TokenKind::Arrow,
                TokenKind::LeftTilde,
                TokenKind::RightTilde,
                TokenKind::Tilde,
                TokenKind::Minus,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn multiset_alternation_operator() {
        assert_eq!(
            kinds("a |+| b | c"),
            vec![
                TokenKind::Identifier(SmolStr::new("a")),
                TokenKind::MultisetAlternation,
                TokenKind::Identifier(SmolStr::new("b")),
                TokenKind::Pipe,
                TokenKind::Identifier(SmolStr::new("c")),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn comparison_operators() {
        assert_eq!(
            kinds("= <> < > <= >="),
            vec![
                TokenKind::Eq,
                TokenKind::NotEq,
                TokenKind::Lt,
                TokenKind::Gt,
                TokenKind::LtEq,
                TokenKind::GtEq,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn quantifier_tokens() {
        assert_eq!(
            kinds("? * + {2,3}"),
            vec![
                TokenKind::Question,
                TokenKind::Star,
                TokenKind::Plus,
                TokenKind::LBrace,
                TokenKind::IntegerLiteral(SmolStr::new("2")),
                TokenKind::Comma,
                TokenKind::IntegerLiteral(SmolStr::new("3")),
                TokenKind::RBrace,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn string_literals_both_quotes() {
        assert_eq!(
            kinds(r#"'abc' "d\"e""#),
            vec![
                TokenKind::StringLiteral(SmolStr::new("abc")),
                TokenKind::StringLiteral(SmolStr::new("d\"e")),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn numbers() {
        assert_eq!(
            kinds("42 3.25"),
            vec![
                TokenKind::IntegerLiteral(SmolStr::new("42")),
                TokenKind::FloatLiteral(SmolStr::new("3.25")),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn block_comments_are_skipped() {
        assert_eq!(
            kinds("MATCH /* a node */ (a)"),
            vec![
                TokenKind::Match,
                TokenKind::LParen,
                TokenKind::Identifier(SmolStr::new("a")),
                TokenKind::RParen,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn invalid_character_reports_and_recovers() {
        let result = Lexer::new("MATCH @ (a)").tokenize();
        assert_eq!(result.diagnostics.len(), 1);
        assert_eq!(result.tokens.len(), 5); // MATCH ( a ) EOF
    }

    #[test]
    fn simplified_delimiters() {
        assert_eq!(
            kinds("-/ A /->"),
            vec![
                TokenKind::Minus,
                TokenKind::Slash,
                TokenKind::Identifier(SmolStr::new("A")),
                TokenKind::Slash,
                TokenKind::Arrow,
                TokenKind::Eof,
            ]
        );
    }
}
