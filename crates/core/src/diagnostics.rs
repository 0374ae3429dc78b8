//! Recoverable diagnostics collected while walking a translation unit
//!
//! A diagnostic never aborts a walk. Each one is logged through `tracing` at
//! the moment it is reported and kept in the sink so callers can inspect what
//! went wrong after the fact.

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// Category of a recoverable diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DiagnosticKind {
    /// Unknown command token inside a documentation comment
    CommentParse,
    /// Cursor shape the classifier did not expect
    Classification,
    /// Type or declaration reference that could not be resolved
    UnresolvedReference,
}

/// A single recoverable problem, tied to an entity name and source line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub entity: String,
    pub line: u32,
    pub message: String,
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{}: {} error: {}",
            self.entity, self.line, self.kind, self.message
        )
    }
}

/// Ordered sink of diagnostics
#[derive(Debug, Default, Clone)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a diagnostic and log it
    pub fn report(
        &mut self,
        kind: DiagnosticKind,
        entity: impl Into<String>,
        line: u32,
        message: impl Into<String>,
    ) {
        let diagnostic = Diagnostic {
            kind,
            entity: entity.into(),
            line,
            message: message.into(),
        };
        tracing::warn!(
            kind = %diagnostic.kind,
            entity = %diagnostic.entity,
            line = diagnostic.line,
            "{}",
            diagnostic.message
        );
        self.entries.push(diagnostic);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    pub fn of_kind(&self, kind: DiagnosticKind) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter().filter(move |d| d.kind == kind)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drain all recorded diagnostics, leaving the sink empty
    pub fn take(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_keeps_order() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.report(DiagnosticKind::CommentParse, "f", 2, "invalid section name 'x'");
        diagnostics.report(DiagnosticKind::Classification, "g", 7, "unexpected cursor");

        let lines: Vec<u32> = diagnostics.iter().map(|d| d.line).collect();
        assert_eq!(lines, vec![2, 7]);
        assert_eq!(diagnostics.of_kind(DiagnosticKind::CommentParse).count(), 1);
    }

    #[test]
    fn test_display_format() {
        let diagnostic = Diagnostic {
            kind: DiagnosticKind::CommentParse,
            entity: "foo".to_string(),
            line: 3,
            message: "invalid section name 'notes'".to_string(),
        };
        assert_eq!(
            diagnostic.to_string(),
            "foo:3: comment_parse error: invalid section name 'notes'"
        );
    }

    #[test]
    fn test_take_empties_sink() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.report(DiagnosticKind::UnresolvedReference, "d", 1, "base not found");
        assert_eq!(diagnostics.take().len(), 1);
        assert!(diagnostics.is_empty());
    }
}
