//! Diagnostics for the pattern front end.
//!
//! The lexer and parser accumulate [`Diag`]s while recovering from errors;
//! the analyzer's typed [`crate::semantic::AnalyzerError`]s convert into
//! them for rendering. `Diag` implements [`miette::Diagnostic`] itself, so
//! producing a terminal report is just a matter of clamping the labels
//! against the source text and attaching that text.

use crate::ast::Span;
use miette::{Diagnostic, LabeledSpan, Report, Severity};
use std::fmt;

/// Severity of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagSeverity {
    /// Rejects the query.
    Error,
    /// Suspicious but recoverable (e.g. an unknown escape sequence).
    Warning,
}

impl fmt::Display for DiagSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagSeverity::Error => write!(f, "error"),
            DiagSeverity::Warning => write!(f, "warning"),
        }
    }
}

/// A labeled source range pointing at the offending syntax.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagLabel {
    pub span: Span,
    pub message: String,
}

/// A diagnostic with severity, message, labeled spans, and an optional
/// stable code (e.g. `E0005`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diag {
    pub severity: DiagSeverity,
    pub message: String,
    pub labels: Vec<DiagLabel>,
    pub code: Option<String>,
}

impl Diag {
    fn new(severity: DiagSeverity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
            labels: Vec::new(),
            code: None,
        }
    }

    /// Creates an error diagnostic.
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(DiagSeverity::Error, message)
    }

    /// Creates a warning diagnostic.
    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(DiagSeverity::Warning, message)
    }

    /// Adds a label pointing at the offending span.
    pub fn with_primary_label(mut self, span: Span, message: impl Into<String>) -> Self {
        self.labels.push(DiagLabel {
            span,
            message: message.into(),
        });
        self
    }

    /// Sets the diagnostic code.
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }
}

impl fmt::Display for Diag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for Diag {}

impl Diagnostic for Diag {
    fn severity(&self) -> Option<Severity> {
        Some(match self.severity {
            DiagSeverity::Error => Severity::Error,
            DiagSeverity::Warning => Severity::Warning,
        })
    }

    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.code
            .as_ref()
            .map(|code| Box::new(code) as Box<dyn fmt::Display>)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        if self.labels.is_empty() {
            return None;
        }
        Some(Box::new(self.labels.iter().map(|label| {
            LabeledSpan::new_primary_with_span(
                Some(label.message.clone()),
                (label.span.start, label.span.len()),
            )
        })))
    }
}

/// Source text a diagnostic is rendered against.
#[derive(Debug, Clone)]
pub struct SourceFile {
    content: String,
    name: Option<String>,
}

impl SourceFile {
    /// Creates a source file from the given content.
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            name: None,
        }
    }

    /// Creates a source file with a display name.
    pub fn with_name(content: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            name: Some(name.into()),
        }
    }

    /// Returns the source content.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Returns the display name, if any.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Clamps a span to valid bounds within this source, so a stale or
    /// synthesized span can never panic the renderer.
    pub fn clamp_span(&self, span: &Span) -> Span {
        let len = self.content.len();
        let start = span.start.min(len);
        let end = span.end.min(len).max(start);
        start..end
    }
}

/// Renders a diagnostic as a miette report with source context.
pub fn render_report(diag: &Diag, source: &SourceFile) -> Report {
    let mut clamped = diag.clone();
    for label in &mut clamped.labels {
        label.span = source.clamp_span(&label.span);
    }
    match source.name() {
        Some(name) => Report::new(clamped)
            .with_source_code(miette::NamedSource::new(name, source.content().to_string())),
        None => Report::new(clamped).with_source_code(source.content().to_string()),
    }
}

/// Renders a batch of diagnostics against one source.
pub fn render_reports(diagnostics: &[Diag], source: &SourceFile) -> Vec<Report> {
    diagnostics
        .iter()
        .map(|diag| render_report(diag, source))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_collects_labels_and_code() {
        let diag = Diag::error("nested quantified path primary is not allowed")
            .with_primary_label(4..9, "inner quantifier here")
            .with_primary_label(0..12, "outer quantifier here")
            .with_code("E0004");

        assert_eq!(diag.severity, DiagSeverity::Error);
        assert_eq!(diag.labels.len(), 2);
        assert_eq!(diag.labels[0].span, 4..9);
        assert_eq!(diag.code.as_deref(), Some("E0004"));
    }

    #[test]
    fn display_is_the_message() {
        let diag = Diag::warning("unknown escape sequence '\\q'");
        assert_eq!(diag.to_string(), "unknown escape sequence '\\q'");
        assert_eq!(DiagSeverity::Error.to_string(), "error");
        assert_eq!(DiagSeverity::Warning.to_string(), "warning");
    }

    #[test]
    fn diag_exposes_miette_metadata() {
        let diag = Diag::error("edge variable \"a\" was declared before as a node variable")
            .with_primary_label(11..12, "second declaration")
            .with_code("E0001");

        assert_eq!(Diagnostic::severity(&diag), Some(Severity::Error));
        assert_eq!(diag.code().expect("code").to_string(), "E0001");
        let labels: Vec<_> = Diagnostic::labels(&diag).expect("labels").collect();
        assert_eq!(labels.len(), 1);
        assert!(labels[0].primary());
        assert_eq!(labels[0].label(), Some("second declaration"));
    }

    #[test]
    fn labels_absent_when_empty() {
        let diag = Diag::error("no labels");
        assert!(Diagnostic::labels(&diag).is_none());
    }

    #[test]
    fn clamp_out_of_bounds_span() {
        let source = SourceFile::new("MATCH (a)");
        assert_eq!(source.clamp_span(&(0..100)), 0..9);
        assert_eq!(source.clamp_span(&(50..60)), 9..9);
        assert_eq!(source.clamp_span(&(2..4)), 2..4);
    }

    #[test]
    fn render_preserves_message() {
        let source = SourceFile::with_name("MATCH (a)-[a]->(b)", "query.gql");
        let diag = Diag::error("edge variable \"a\" was declared before as a node variable")
            .with_primary_label(11..12, "second declaration");

        let report = render_report(&diag, &source);
        assert_eq!(
            report.to_string(),
            "edge variable \"a\" was declared before as a node variable"
        );
    }

    #[test]
    fn render_with_invalid_span_does_not_panic() {
        let source = SourceFile::new("short");
        let diag = Diag::error("err").with_primary_label(0..100, "out of bounds");
        let report = render_report(&diag, &source);
        assert_eq!(report.to_string(), "err");
    }

    #[test]
    fn render_batch() {
        let source = SourceFile::new("MATCH (a)");
        let diags = vec![
            Diag::error("first").with_primary_label(0..5, "here"),
            Diag::warning("second").with_primary_label(6..9, "there"),
        ];
        let reports = render_reports(&diags, &source);
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].to_string(), "first");
        assert_eq!(reports[1].to_string(), "second");
    }
}
