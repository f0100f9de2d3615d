use htpy_html::ParseError;
use thiserror::Error;

/// Why the formatting backend did not produce formatted source.
///
/// None of these abort a conversion; the caller keeps the unformatted code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    /// The backend could not be started (not installed, not executable).
    #[error("formatter `{program}` is unavailable: {reason}")]
    Unavailable {
        /// Program or backend name.
        program: String,
        /// Reason reported by the operating system or backend.
        reason: String,
    },

    /// The backend ran and rejected the source.
    #[error("formatter `{program}` failed ({status}): {stderr}")]
    Failed {
        /// Program or backend name.
        program: String,
        /// Exit status as reported by the process.
        status: String,
        /// Captured standard error, trimmed.
        stderr: String,
    },

    /// The backend produced output that is not UTF-8.
    #[error("formatter `{program}` produced output that is not valid UTF-8")]
    InvalidOutput {
        /// Program or backend name.
        program: String,
    },
}

/// A conversion that produced no source at all.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConvertError {
    /// The markup could not be read.
    #[error(transparent)]
    Parse(#[from] ParseError),
}
