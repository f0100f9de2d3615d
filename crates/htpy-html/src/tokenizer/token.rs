use core::fmt;

use htpy_dom::{Attribute, AttributeValue};

/// [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization)
///
/// The tokenizer emits tokens of these types to the tree builder.
///
/// Unlike the standard, character data is emitted in runs rather than one
/// token per character, and DOCTYPE tokens keep their declaration text
/// instead of the name/public/system split; the converter only ever needs
/// to reproduce them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// `<!DOCTYPE ...>`. `text` is the normalized declaration without the
    /// angle brackets, e.g. `DOCTYPE html`.
    Doctype {
        /// Declaration text.
        text: String,
    },

    /// "Start and end tag tokens have a tag name, a self-closing flag, and a
    /// list of attributes, each of which has a name and a value."
    StartTag {
        /// Lower-cased tag name.
        name: String,
        /// Set by a trailing `/` before `>`.
        self_closing: bool,
        /// Attributes in source order. Duplicates are removed on emit.
        attributes: Vec<Attribute>,
    },

    /// End tag token. Attributes on end tags are parse errors and dropped.
    EndTag {
        /// Lower-cased tag name.
        name: String,
    },

    /// "Comment and character tokens have data."
    Comment {
        /// Comment body without the `<!--`/`-->` delimiters.
        data: String,
    },

    /// A run of character data.
    Text {
        /// Decoded characters.
        data: String,
    },

    /// End-of-file token signals the end of input.
    EndOfFile,
}

impl Token {
    /// "When a start or end tag token is created, its self-closing flag must be
    /// unset (its other state is that it be set), and its attributes list must
    /// be empty."
    #[must_use]
    pub const fn new_start_tag() -> Self {
        Self::StartTag {
            name: String::new(),
            self_closing: false,
            attributes: Vec::new(),
        }
    }

    /// Create a new end tag token with an empty name.
    #[must_use]
    pub const fn new_end_tag() -> Self {
        Self::EndTag {
            name: String::new(),
        }
    }

    /// Create a new comment token with empty data.
    #[must_use]
    pub const fn new_comment() -> Self {
        Self::Comment {
            data: String::new(),
        }
    }

    /// Create a new DOCTYPE token with no declaration text yet.
    #[must_use]
    pub const fn new_doctype() -> Self {
        Self::Doctype {
            text: String::new(),
        }
    }

    /// Returns true if this is an end-of-file token.
    #[must_use]
    pub const fn is_eof(&self) -> bool {
        matches!(self, Self::EndOfFile)
    }

    /// [§ 13.2.5.8 Tag name state](https://html.spec.whatwg.org/multipage/parsing.html#tag-name-state)
    ///
    /// "Append the current input character to the current tag token's tag name."
    pub(crate) fn append_to_tag_name(&mut self, c: char) {
        if let Self::StartTag { name, .. } | Self::EndTag { name } = self {
            name.push(c);
        }
    }

    /// [§ 13.2.5.40 Self-closing start tag state](https://html.spec.whatwg.org/multipage/parsing.html#self-closing-start-tag-state)
    ///
    /// "Set the self-closing flag of the current tag token."
    pub(crate) fn set_self_closing(&mut self) {
        if let Self::StartTag { self_closing, .. } = self {
            *self_closing = true;
        }
    }

    /// Append to comment data or DOCTYPE text.
    pub(crate) fn append_to_data(&mut self, s: &str) {
        match self {
            Self::Comment { data } | Self::Text { data } => data.push_str(s),
            Self::Doctype { text } => text.push_str(s),
            _ => {}
        }
    }

    /// "Start a new attribute in the current tag token."
    ///
    /// The attribute starts out boolean; it becomes a text attribute once an
    /// `=` is seen.
    pub(crate) fn start_new_attribute(&mut self) {
        if let Self::StartTag { attributes, .. } = self {
            attributes.push(Attribute::boolean(String::new()));
        }
    }

    /// "Append the current input character to the current attribute's name."
    pub(crate) fn append_to_current_attribute_name(&mut self, c: char) {
        if let Some(attr) = self.current_attribute() {
            attr.name.push(c);
        }
    }

    /// The current attribute has a value (possibly empty): `name=`.
    pub(crate) fn begin_current_attribute_value(&mut self) {
        if let Some(attr) = self.current_attribute() {
            attr.value = AttributeValue::Text(String::new());
        }
    }

    /// "Append the current input character to the current attribute's value."
    pub(crate) fn append_to_current_attribute_value(&mut self, s: &str) {
        if let Some(attr) = self.current_attribute() {
            match &mut attr.value {
                AttributeValue::Text(value) => value.push_str(s),
                AttributeValue::Boolean => attr.value = AttributeValue::Text(s.to_string()),
            }
        }
    }

    fn current_attribute(&mut self) -> Option<&mut Attribute> {
        match self {
            Self::StartTag { attributes, .. } => attributes.last_mut(),
            _ => None,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Doctype { text } => write!(f, "<!{text}>"),
            Self::StartTag {
                name,
                self_closing,
                attributes,
            } => {
                write!(f, "<{name}")?;
                for attr in attributes {
                    match &attr.value {
                        AttributeValue::Text(value) => write!(f, " {}=\"{value}\"", attr.name)?,
                        AttributeValue::Boolean => write!(f, " {}", attr.name)?,
                    }
                }
                if *self_closing {
                    write!(f, " /")?;
                }
                write!(f, ">")
            }
            Self::EndTag { name } => write!(f, "</{name}>"),
            Self::Comment { data } => write!(f, "<!--{data}-->"),
            Self::Text { data } => write!(f, "Text({data:?})"),
            Self::EndOfFile => write!(f, "EOF"),
        }
    }
}
