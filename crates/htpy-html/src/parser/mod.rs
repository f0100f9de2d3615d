//! HTML parser module for tree construction.

/// Fragment tree builder.
pub mod core;

pub use self::core::{HtmlParser, MAX_NESTING_DEPTH, format_tree};
