//! Formatter adapter tests with injected backends. None of these need an
//! installed formatter.

use std::cell::Cell;

use htpy_common::DiagnosticKind;
use htpy_convert::{
    ConvertOptions, FormatBackend, FormatError, FormatOutcome, NoFormatter, convert, format_source,
};

/// Collapses runs of blank lines and strips trailing commas before `]`,
/// which is idempotent like a real formatter.
struct TidyFormatter {
    calls: Cell<usize>,
}

impl TidyFormatter {
    const fn new() -> Self {
        Self {
            calls: Cell::new(0),
        }
    }
}

impl FormatBackend for TidyFormatter {
    fn name(&self) -> &str {
        "tidy"
    }

    fn format(&self, source: &str) -> Result<String, FormatError> {
        self.calls.set(self.calls.get() + 1);
        let mut out = String::new();
        for line in source.lines() {
            if line.is_empty() && out.ends_with("\n\n") {
                continue;
            }
            out.push_str(line.trim_end());
            out.push('\n');
        }
        Ok(out.replace(",\n]", "\n]"))
    }
}

/// Rejects every input, like a formatter hitting a syntax error.
struct FailingFormatter;

impl FormatBackend for FailingFormatter {
    fn name(&self) -> &str {
        "failing"
    }

    fn format(&self, _source: &str) -> Result<String, FormatError> {
        Err(FormatError::Failed {
            program: "failing".to_string(),
            status: "exit status: 123".to_string(),
            stderr: "cannot parse".to_string(),
        })
    }
}

#[test]
fn test_present_backend_formats() {
    let backend = TidyFormatter::new();
    let formatted = format_source("p  \n\n\n\nbr\n".to_string(), true, &backend);
    assert_eq!(formatted.source, "p\n\nbr\n");
    assert_eq!(formatted.outcome, FormatOutcome::Formatted);
    assert_eq!(backend.calls.get(), 1);
}

#[test]
fn test_backend_not_called_when_format_is_off() {
    let backend = TidyFormatter::new();
    let formatted = format_source("p  \n".to_string(), false, &backend);
    assert_eq!(formatted.source, "p  \n");
    assert_eq!(formatted.outcome, FormatOutcome::Skipped);
    assert_eq!(backend.calls.get(), 0);
}

#[test]
fn test_absent_backend_keeps_source() {
    let formatted = format_source("p[\"x\"]\n".to_string(), true, &NoFormatter);
    assert_eq!(formatted.source, "p[\"x\"]\n");
    assert!(matches!(
        formatted.outcome,
        FormatOutcome::Unavailable(FormatError::Unavailable { .. })
    ));
}

#[test]
fn test_failing_backend_keeps_source() {
    let formatted = format_source("p[\"x\"]\n".to_string(), true, &FailingFormatter);
    assert_eq!(formatted.source, "p[\"x\"]\n");
    let FormatOutcome::Unavailable(err) = formatted.outcome else {
        panic!("expected the failure to be reported");
    };
    assert_eq!(
        err.to_string(),
        "formatter `failing` failed (exit status: 123): cannot parse"
    );
}

#[test]
fn test_formatting_is_idempotent() {
    let backend = TidyFormatter::new();
    let options = ConvertOptions::default().with_format(true);
    let once = convert("<ul><li>a</li><li>b</li></ul>", &options, &backend)
        .expect("markup converts")
        .source;
    let twice = format_source(once.clone(), true, &backend).source;
    assert_eq!(once, "ul[\n    li[\"a\"],\n    li[\"b\"]\n]\n");
    assert_eq!(once, twice);
}

#[test]
fn test_convert_records_formatter_outcome() {
    let options = ConvertOptions::default().with_format(true);

    let formatted = convert("<p>x</p>", &options, &TidyFormatter::new()).expect("markup converts");
    assert!(
        formatted
            .diagnostics
            .iter()
            .any(|d| d.message == "formatted with tidy")
    );

    let unformatted = convert("<p>x</p>", &options, &FailingFormatter).expect("markup converts");
    assert_eq!(unformatted.source, "p[\"x\"]\n");
    assert!(
        unformatted
            .diagnostics
            .has_kind(DiagnosticKind::FormatterUnavailable)
    );
}
