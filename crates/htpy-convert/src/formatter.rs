//! Optional reformatting of generated source.
//!
//! The backend is passed in by the caller, so whether a formatter is
//! installed is never global state. A backend that is missing or fails
//! leaves the generated source untouched.

use std::io::Write as _;
use std::process::{Command, Stdio};
use std::thread;

use crate::error::FormatError;

/// Something that can reformat Python source.
pub trait FormatBackend {
    /// Short name used in diagnostics.
    fn name(&self) -> &str;

    /// Format `source`.
    ///
    /// # Errors
    ///
    /// Returns a [`FormatError`] when the backend is unavailable, rejects the
    /// source, or produces unreadable output.
    fn format(&self, source: &str) -> Result<String, FormatError>;
}

/// Runs an external formatter that reads stdin and writes stdout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlackFormatter {
    /// Executable to spawn.
    pub program: String,
    /// Arguments passed before the source is piped in.
    pub args: Vec<String>,
}

impl Default for BlackFormatter {
    fn default() -> Self {
        Self {
            program: "black".to_string(),
            args: vec!["-q".to_string(), "-".to_string()],
        }
    }
}

impl BlackFormatter {
    /// Use `program` with black's stdin arguments.
    #[must_use]
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            ..Self::default()
        }
    }

    fn unavailable(&self, reason: String) -> FormatError {
        FormatError::Unavailable {
            program: self.program.clone(),
            reason,
        }
    }
}

impl FormatBackend for BlackFormatter {
    fn name(&self) -> &str {
        &self.program
    }

    fn format(&self, source: &str) -> Result<String, FormatError> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|err| self.unavailable(err.to_string()))?;

        let Some(mut stdin) = child.stdin.take() else {
            let _ = child.kill();
            let _ = child.wait();
            return Err(self.unavailable("stdin was not captured".to_string()));
        };

        // stdin is written on its own thread while `wait_with_output` drains
        // stdout and stderr; dropping the handle signals end of input.
        let (written, output) = thread::scope(|scope| {
            let writer = scope.spawn(move || stdin.write_all(source.as_bytes()));
            let output = child.wait_with_output();
            (writer.join(), output)
        });
        let output = output.map_err(|err| self.unavailable(err.to_string()))?;
        match written {
            // A formatter that exits early reports its own failure below.
            Ok(Err(err)) if output.status.success() => {
                return Err(self.unavailable(err.to_string()));
            }
            Err(_) => return Err(self.unavailable("stdin writer panicked".to_string())),
            Ok(_) => {}
        }
        if !output.status.success() {
            return Err(FormatError::Failed {
                program: self.program.clone(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        String::from_utf8(output.stdout).map_err(|_| FormatError::InvalidOutput {
            program: self.program.clone(),
        })
    }
}

/// A backend that is never available.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoFormatter;

impl FormatBackend for NoFormatter {
    fn name(&self) -> &str {
        "none"
    }

    fn format(&self, _source: &str) -> Result<String, FormatError> {
        Err(FormatError::Unavailable {
            program: self.name().to_string(),
            reason: "no formatter configured".to_string(),
        })
    }
}

/// What happened when formatting was attempted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatOutcome {
    /// Formatting was not requested.
    Skipped,
    /// The backend reformatted the source.
    Formatted,
    /// The backend could not format; the source is unchanged.
    Unavailable(FormatError),
}

/// Source text after the formatting step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Formatted {
    /// Formatted source, or the input when formatting did not happen.
    pub source: String,
    /// How the source was produced.
    pub outcome: FormatOutcome,
}

/// Format `source` with `backend` when `format` is set.
///
/// Never fails: on any backend error the input is returned as is, with the
/// error kept in [`FormatOutcome::Unavailable`].
#[must_use]
pub fn format_source(source: String, format: bool, backend: &dyn FormatBackend) -> Formatted {
    if !format {
        return Formatted {
            source,
            outcome: FormatOutcome::Skipped,
        };
    }
    match backend.format(&source) {
        Ok(formatted) => Formatted {
            source: formatted,
            outcome: FormatOutcome::Formatted,
        },
        Err(err) => Formatted {
            source,
            outcome: FormatOutcome::Unavailable(err),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_program_is_unavailable() {
        let backend = BlackFormatter::with_program("htpy-formatter-that-does-not-exist");
        let err = backend.format("div\n").expect_err("program does not exist");
        assert!(matches!(err, FormatError::Unavailable { ref program, .. } if program == "htpy-formatter-that-does-not-exist"));
    }

    #[test]
    fn default_runs_black_on_stdin() {
        let backend = BlackFormatter::default();
        assert_eq!(backend.name(), "black");
        assert_eq!(backend.args, ["-q", "-"]);
    }

    #[cfg(unix)]
    #[test]
    fn large_source_through_streaming_program() {
        use std::sync::mpsc;
        use std::time::Duration;

        let source = format!("p[\"{}\"]\n", "x".repeat(300_000));
        let expected = source.clone();
        let (sender, receiver) = mpsc::channel();
        let _ = thread::spawn(move || {
            let backend = BlackFormatter {
                program: "cat".to_string(),
                args: Vec::new(),
            };
            let _ = sender.send(backend.format(&source));
        });
        let formatted = receiver
            .recv_timeout(Duration::from_secs(30))
            .expect("cat finishes without blocking")
            .expect("cat succeeds");
        assert_eq!(formatted, expected);
    }

    #[cfg(unix)]
    #[test]
    fn failing_program_is_reported() {
        let backend = BlackFormatter {
            program: "false".to_string(),
            args: Vec::new(),
        };
        let err = backend.format("p\n").expect_err("false exits non-zero");
        assert!(matches!(err, FormatError::Failed { ref program, .. } if program == "false"));
    }

    #[test]
    fn skipped_keeps_source() {
        let formatted = format_source("p\n".to_string(), false, &NoFormatter);
        assert_eq!(formatted.source, "p\n");
        assert_eq!(formatted.outcome, FormatOutcome::Skipped);
    }
}
