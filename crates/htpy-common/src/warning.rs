//! Conversion diagnostics.
//!
//! Every conversion owns its own [`Diagnostics`] collector. Stages push
//! warnings into it instead of printing, and the caller decides how (and
//! whether) to render them. Identical messages are recorded once, so a
//! document with a thousand `<x:foo>` tags produces a single warning.

use std::collections::HashSet;
use std::fmt;

use strum_macros::Display;

/// How serious a diagnostic is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Severity {
    /// Informational, shown only in verbose output.
    Note,
    /// The output is still valid but differs from what the input asked for.
    Warning,
}

/// What a diagnostic is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum DiagnosticKind {
    /// Malformed markup that the parser recovered from.
    ParseIssue,
    /// A construct with no direct DSL mapping; a fallback was emitted.
    UnsupportedConstruct,
    /// The optional formatter could not run; unformatted source was kept.
    FormatterUnavailable,
    /// Progress information.
    Info,
}

/// A single message produced while converting one document.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Diagnostic {
    /// Stage that produced the message ("HTML Tokenizer", "Mapper", ...).
    pub component: &'static str,
    /// Severity of the message.
    pub severity: Severity,
    /// Category of the message.
    pub kind: DiagnosticKind,
    /// Human readable text.
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.component, self.message)
    }
}

/// Ordered, de-duplicated collection of diagnostics for one conversion.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
    seen: HashSet<(&'static str, String)>,
}

impl Diagnostics {
    /// Create an empty collector.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a diagnostic unless an identical message from the same
    /// component was already recorded.
    pub fn push(&mut self, diagnostic: Diagnostic) {
        let key = (diagnostic.component, diagnostic.message.clone());
        if self.seen.insert(key) {
            self.entries.push(diagnostic);
        }
    }

    /// Record a warning.
    pub fn warn(&mut self, component: &'static str, kind: DiagnosticKind, message: impl Into<String>) {
        self.push(Diagnostic {
            component,
            severity: Severity::Warning,
            kind,
            message: message.into(),
        });
    }

    /// Record an informational note.
    pub fn note(&mut self, component: &'static str, message: impl Into<String>) {
        self.push(Diagnostic {
            component,
            severity: Severity::Note,
            kind: DiagnosticKind::Info,
            message: message.into(),
        });
    }

    /// Append every diagnostic from `other`, keeping de-duplication.
    pub fn extend(&mut self, other: Self) {
        for diagnostic in other.entries {
            self.push(diagnostic);
        }
    }

    /// Iterate in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.entries.iter()
    }

    /// Number of recorded diagnostics.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True when at least one diagnostic of `kind` was recorded.
    #[must_use]
    pub fn has_kind(&self, kind: DiagnosticKind) -> bool {
        self.entries.iter().any(|d| d.kind == kind)
    }

    /// Consume the collector, returning the diagnostics in insertion order.
    #[must_use]
    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.entries
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
