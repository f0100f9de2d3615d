//! HTML to htpy conversion.
//!
//! # Pipeline
//!
//! ```text
//! markup ─► htpy_html::parse ─► mapper::map_document ─► generator::generate ─► formatter::format_source
//! ```
//!
//! Every stage is a pure function over the previous stage's output, apart
//! from the formatter, whose backend is passed in by the caller. Recoverable
//! problems are collected in [`Diagnostics`]; only unreadable input is an
//! error.
//!
//! # Example
//!
//! ```
//! let source = htpy_convert::html_to_htpy(r#"<div class="a b" id="x">Hi</div>"#, true, false)?;
//! assert_eq!(source, "div(\".a.b#x\")[\"Hi\"]\n");
//! # Ok::<(), htpy_convert::ConvertError>(())
//! ```

/// Conversion errors and formatter failures.
pub mod error;
/// Optional formatting of generated source.
pub mod formatter;
/// Python source rendering.
pub mod generator;
/// Python string literal encoding.
pub mod literal;
/// Document tree to DSL call tree.
pub mod mapper;

use htpy_common::{DiagnosticKind, Diagnostics};

pub use error::{ConvertError, FormatError};
pub use formatter::{BlackFormatter, FormatBackend, FormatOutcome, Formatted, NoFormatter, format_source};
pub use generator::{ImportMode, generate};
pub use literal::python_string;
pub use mapper::{DslCall, DslNode, map_document};

const COMPONENT: &str = "Formatter";

/// Options for one conversion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConvertOptions {
    /// Fold eligible `class`/`id` values into a `.class#id` selector.
    pub shorthand: bool,
    /// Run the formatting backend over the generated source.
    pub format: bool,
    /// Import statements to prepend.
    pub imports: ImportMode,
}

impl ConvertOptions {
    /// Set [`ConvertOptions::shorthand`].
    #[must_use]
    pub const fn with_shorthand(mut self, shorthand: bool) -> Self {
        self.shorthand = shorthand;
        self
    }

    /// Set [`ConvertOptions::format`].
    #[must_use]
    pub const fn with_format(mut self, format: bool) -> Self {
        self.format = format;
        self
    }

    /// Set [`ConvertOptions::imports`].
    #[must_use]
    pub const fn with_imports(mut self, imports: ImportMode) -> Self {
        self.imports = imports;
        self
    }
}

/// The result of a successful conversion.
#[derive(Debug, Clone)]
pub struct Conversion {
    /// Generated (and possibly formatted) Python source.
    pub source: String,
    /// Everything the stages recovered from, in pipeline order.
    pub diagnostics: Diagnostics,
}

/// Convert markup to htpy source.
///
/// # Errors
///
/// Text input always parses, so this only shares its error type with
/// [`convert_bytes`]. A failing formatter is not an error: the unformatted source is returned
/// and a [`DiagnosticKind::FormatterUnavailable`] warning is recorded.
pub fn convert(
    markup: &str,
    options: &ConvertOptions,
    backend: &dyn FormatBackend,
) -> Result<Conversion, ConvertError> {
    Ok(finish(htpy_html::parse(markup), options, backend))
}

/// Like [`convert`], for input that still has to be decoded as UTF-8.
///
/// # Errors
///
/// Returns [`ConvertError::Parse`] for input that is not UTF-8.
pub fn convert_bytes(
    bytes: &[u8],
    options: &ConvertOptions,
    backend: &dyn FormatBackend,
) -> Result<Conversion, ConvertError> {
    let parsed = htpy_html::parse_bytes(bytes)?;
    Ok(finish(parsed, options, backend))
}

/// Convert markup with the default formatter and no import header.
///
/// # Errors
///
/// See [`convert`].
pub fn html_to_htpy(markup: &str, shorthand: bool, format: bool) -> Result<String, ConvertError> {
    let options = ConvertOptions::default()
        .with_shorthand(shorthand)
        .with_format(format);
    convert(markup, &options, &BlackFormatter::default()).map(|conversion| conversion.source)
}

fn finish(
    parsed: htpy_html::ParsedDocument,
    options: &ConvertOptions,
    backend: &dyn FormatBackend,
) -> Conversion {
    let mut diagnostics = parsed.diagnostics;
    let nodes = map_document(&parsed.tree, options.shorthand, &mut diagnostics);
    let source = generate(&nodes, options.imports);

    let formatted = format_source(source, options.format, backend);
    match formatted.outcome {
        FormatOutcome::Skipped => {}
        FormatOutcome::Formatted => {
            diagnostics.note(COMPONENT, format!("formatted with {}", backend.name()));
        }
        FormatOutcome::Unavailable(err) => diagnostics.warn(
            COMPONENT,
            DiagnosticKind::FormatterUnavailable,
            format!("{err}; keeping unformatted source"),
        ),
    }

    Conversion {
        source: formatted.source,
        diagnostics,
    }
}
