use thiserror::Error;

/// Input the parser refuses to build a tree for.
///
/// Malformed markup is never an error; the tree builder recovers and records
/// a diagnostic. This covers input that cannot be read at all.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The input bytes are not UTF-8.
    #[error("input is not valid UTF-8 (first invalid byte at offset {valid_up_to})")]
    InvalidEncoding {
        /// Length of the longest valid UTF-8 prefix.
        valid_up_to: usize,
    },
}
