//! Terminal rendering of conversion diagnostics.

use htpy_common::{Diagnostic, Diagnostics, Severity};
use owo_colors::OwoColorize;

/// How much the CLI prints besides the generated code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    /// Nothing but results and errors.
    Quiet,
    /// Warnings.
    Normal,
    /// Also informational notes.
    Verbose,
}

impl Verbosity {
    pub const fn from_flags(quiet: bool, verbose: bool) -> Self {
        match (quiet, verbose) {
            (true, _) => Self::Quiet,
            (false, true) => Self::Verbose,
            (false, false) => Self::Normal,
        }
    }

    const fn shows(self, severity: Severity) -> bool {
        match self {
            Self::Quiet => false,
            Self::Normal => !matches!(severity, Severity::Note),
            Self::Verbose => true,
        }
    }
}

/// Plain text of a diagnostic line, without colors.
pub fn format_diagnostic(diagnostic: &Diagnostic, label: Option<&str>) -> String {
    let marker = match diagnostic.severity {
        Severity::Note => "ℹ",
        Severity::Warning => "⚠",
    };
    match label {
        Some(label) => format!(
            "[htpy {}] {marker} {label}: {}",
            diagnostic.component, diagnostic.message
        ),
        None => format!("[htpy {}] {marker} {}", diagnostic.component, diagnostic.message),
    }
}

/// Print the diagnostics `verbosity` lets through on stderr.
///
/// `label` names the input (a file path) when several inputs are converted
/// in one run.
pub fn print_diagnostics(diagnostics: &Diagnostics, verbosity: Verbosity, label: Option<&str>) {
    for diagnostic in diagnostics.iter().filter(|d| verbosity.shows(d.severity)) {
        let line = format_diagnostic(diagnostic, label);
        match diagnostic.severity {
            Severity::Note => eprintln!("{}", line.dimmed()),
            Severity::Warning => eprintln!("{}", line.yellow()),
        }
    }
}
