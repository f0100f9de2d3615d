//! HTML tokenizer and fragment tree builder for the htpy converter.
//!
//! # Scope
//!
//! This crate implements:
//! - **HTML Tokenizer** ([WHATWG § 13.2.5](https://html.spec.whatwg.org/multipage/parsing.html#tokenization))
//!   - Data, RCDATA, RAWTEXT, and tag states
//!   - DOCTYPE, comment, CDATA and character reference handling
//!   - Attribute parsing with boolean attributes kept distinct from empty ones
//!
//! - **Fragment Tree Builder** ([WHATWG § 13.2.6](https://html.spec.whatwg.org/multipage/parsing.html#tree-construction))
//!   - Stack of open elements and scope checks
//!   - Optional end tags (`li`, `p`, `dt`/`dd`, table rows and cells, ...)
//!   - Recovery from unmatched and missing end tags
//!
//! # Not Implemented
//!
//! - Insertion modes (no implied `html`/`head`/`body`)
//! - Foster parenting and the adoption agency algorithm
//! - Script data escape states

/// Errors for input that cannot be parsed at all.
pub mod error;
/// HTML parser and tree construction.
pub mod parser;
/// HTML tokenizer for converting input into tokens.
pub mod tokenizer;

use htpy_common::Diagnostics;
use htpy_dom::DocumentTree;

pub use error::ParseError;
pub use parser::{HtmlParser, MAX_NESTING_DEPTH, format_tree};
pub use tokenizer::{HtmlTokenizer, Token, TokenizerState};

/// A parsed forest together with the issues recovered from along the way.
#[derive(Debug, Clone)]
pub struct ParsedDocument {
    /// The document tree; its roots are the top-level nodes of the markup.
    pub tree: DocumentTree,
    /// Tokenizer and tree-builder diagnostics, in the order they occurred.
    pub diagnostics: Diagnostics,
}

/// Parse markup into a document forest.
///
/// Malformed markup is recovered from, not rejected: every problem ends up
/// as a [`DiagnosticKind::ParseIssue`](htpy_common::DiagnosticKind::ParseIssue).
/// Elements nested deeper than [`MAX_NESTING_DEPTH`] are flattened into the
/// deepest open element.
#[must_use]
pub fn parse(markup: &str) -> ParsedDocument {
    let mut tokenizer = HtmlTokenizer::new(markup);
    tokenizer.run();
    let (tokens, diagnostics) = tokenizer.finish();
    let (tree, diagnostics) = HtmlParser::new(tokens)
        .with_diagnostics(diagnostics)
        .run();
    ParsedDocument { tree, diagnostics }
}

/// Decode `bytes` as UTF-8 and parse them.
///
/// # Errors
///
/// Returns [`ParseError::InvalidEncoding`] for input that is not UTF-8.
pub fn parse_bytes(bytes: &[u8]) -> Result<ParsedDocument, ParseError> {
    let markup = std::str::from_utf8(bytes).map_err(|err| ParseError::InvalidEncoding {
        valid_up_to: err.valid_up_to(),
    })?;
    Ok(parse(markup))
}
