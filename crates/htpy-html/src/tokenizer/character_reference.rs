//! Character reference decoding for the HTML tokenizer.
//!
//! [§ 13.2.5.72 Character reference state](https://html.spec.whatwg.org/multipage/parsing.html#character-reference-state)

use super::core::{HtmlTokenizer, TokenizerState};
use super::named_character_references::longest_entity_prefix;

/// A decoded reference and how much input it used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedReference {
    /// Replacement text.
    pub text: String,
    /// Bytes consumed after the `&`.
    pub consumed: usize,
    /// Set for references that decode but are parse errors
    /// (missing semicolon, out-of-range code point, ...).
    pub parse_error: bool,
}

/// [§ 13.2.5.80 Numeric character reference end state](https://html.spec.whatwg.org/multipage/parsing.html#numeric-character-reference-end-state)
///
/// "If the number is one of the numbers in the first column of the following
/// table, then find the row with that number in the first column, and set the
/// character reference code to the number in the second column of that row."
const C1_REPLACEMENTS: &[(u32, char)] = &[
    (0x80, '\u{20AC}'),
    (0x82, '\u{201A}'),
    (0x83, '\u{0192}'),
    (0x84, '\u{201E}'),
    (0x85, '\u{2026}'),
    (0x86, '\u{2020}'),
    (0x87, '\u{2021}'),
    (0x88, '\u{02C6}'),
    (0x89, '\u{2030}'),
    (0x8A, '\u{0160}'),
    (0x8B, '\u{2039}'),
    (0x8C, '\u{0152}'),
    (0x8E, '\u{017D}'),
    (0x91, '\u{2018}'),
    (0x92, '\u{2019}'),
    (0x93, '\u{201C}'),
    (0x94, '\u{201D}'),
    (0x95, '\u{2022}'),
    (0x96, '\u{2013}'),
    (0x97, '\u{2014}'),
    (0x98, '\u{02DC}'),
    (0x99, '\u{2122}'),
    (0x9A, '\u{0161}'),
    (0x9B, '\u{203A}'),
    (0x9C, '\u{0153}'),
    (0x9E, '\u{017E}'),
    (0x9F, '\u{0178}'),
];

/// Decode the character reference at the start of `rest` (the text right
/// after an `&`).
///
/// Returns `None` when `rest` does not start a reference; the `&` is then
/// literal text.
#[must_use]
pub fn decode_character_reference(rest: &str, in_attribute: bool) -> Option<DecodedReference> {
    if let Some(numeric) = rest.strip_prefix('#') {
        return decode_numeric(numeric).map(|mut reference| {
            reference.consumed += 1;
            reference
        });
    }

    let (len, text) = longest_entity_prefix(rest)?;
    let terminated = rest[..len].ends_with(';');
    if !terminated && in_attribute {
        // "If the character reference was consumed as part of an attribute,
        // and the last character matched is not a U+003B SEMICOLON character
        // (;), and the next input character is either a U+003D EQUALS SIGN
        // character (=) or an ASCII alphanumeric, then, for historical
        // reasons, flush code points consumed as a character reference."
        if rest[len..]
            .chars()
            .next()
            .is_some_and(|c| c == '=' || c.is_ascii_alphanumeric())
        {
            return None;
        }
    }
    Some(DecodedReference {
        text: text.to_string(),
        consumed: len,
        parse_error: !terminated,
    })
}

/// `rest` is the text after `&#`.
fn decode_numeric(rest: &str) -> Option<DecodedReference> {
    let (radix, prefix_len) = match rest.chars().next() {
        Some('x' | 'X') => (16, 1),
        _ => (10, 0),
    };
    let digits_len = rest[prefix_len..]
        .char_indices()
        .find(|&(_, c)| !c.is_digit(radix))
        .map_or(rest.len() - prefix_len, |(i, _)| i);
    if digits_len == 0 {
        return None;
    }

    let digits = &rest[prefix_len..prefix_len + digits_len];
    // Saturate instead of overflowing: anything past U+10FFFF is an error
    // and decodes to U+FFFD regardless of how large it is.
    let code = digits.chars().fold(0u32, |acc, c| {
        acc.saturating_mul(radix)
            .saturating_add(c.to_digit(radix).unwrap_or(0))
    });

    let mut consumed = prefix_len + digits_len;
    let mut parse_error = true;
    if rest[consumed..].starts_with(';') {
        consumed += 1;
        parse_error = false;
    }

    let ch = match code {
        0 | 0xD800..=0xDFFF | 0x11_0000.. => {
            parse_error = true;
            '\u{FFFD}'
        }
        0x80..=0x9F => C1_REPLACEMENTS
            .iter()
            .find(|&&(from, _)| from == code)
            .map_or_else(|| char::from_u32(code).unwrap_or('\u{FFFD}'), |&(_, to)| to),
        _ => char::from_u32(code).unwrap_or('\u{FFFD}'),
    };

    Some(DecodedReference {
        text: ch.to_string(),
        consumed,
        parse_error,
    })
}

impl HtmlTokenizer {
    /// [§ 13.2.5.72 Character reference state](https://html.spec.whatwg.org/multipage/parsing.html#character-reference-state)
    /// Returns true if the return state is an attribute value state.
    /// "If the character reference was consumed as part of an attribute"
    pub(super) const fn is_consumed_as_part_of_attribute(&self) -> bool {
        matches!(
            self.return_state,
            Some(
                TokenizerState::AttributeValueDoubleQuoted
                    | TokenizerState::AttributeValueSingleQuoted
                    | TokenizerState::AttributeValueUnquoted
            )
        )
    }

    /// [§ 13.2.5.72 Character reference state](https://html.spec.whatwg.org/multipage/parsing.html#character-reference-state)
    ///
    /// Entered after consuming `&`; the current input character is the one
    /// right after it.
    pub(super) fn handle_character_reference_state(&mut self) {
        let in_attribute = self.is_consumed_as_part_of_attribute();
        let return_state = self.return_state.take().unwrap_or(TokenizerState::Data);
        let start = self.current_pos - self.current_input_character.map_or(0, char::len_utf8);

        match decode_character_reference(&self.input[start..], in_attribute) {
            Some(reference) => {
                if reference.parse_error {
                    self.log_parse_error("malformed character reference");
                }
                self.current_pos = start + reference.consumed;
                self.flush_code_points_consumed_as_character_reference(&reference.text, in_attribute);
                self.switch_to(return_state);
            }
            None => {
                self.flush_code_points_consumed_as_character_reference("&", in_attribute);
                self.reconsume_in(return_state);
            }
        }
    }

    /// "Flush code points consumed as a character reference"
    ///
    /// "If the character reference was consumed as part of an attribute,
    /// then append each character to the current attribute's value. Otherwise,
    /// emit each character as a character token."
    fn flush_code_points_consumed_as_character_reference(&mut self, text: &str, in_attribute: bool) {
        if in_attribute {
            if let Some(ref mut token) = self.current_token {
                token.append_to_current_attribute_value(text);
            }
        } else {
            self.emit_characters(text);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(rest: &str) -> Option<(String, usize)> {
        decode_character_reference(rest, false).map(|r| (r.text, r.consumed))
    }

    #[test]
    fn numeric_references() {
        assert_eq!(decode("#60;x"), Some(("<".to_string(), 4)));
        assert_eq!(decode("#x3C;"), Some(("<".to_string(), 5)));
        assert_eq!(decode("#X3c"), Some(("<".to_string(), 4)));
        assert_eq!(decode("#0;"), Some(("\u{FFFD}".to_string(), 3)));
        assert_eq!(decode("#xD800;"), Some(("\u{FFFD}".to_string(), 7)));
        assert_eq!(decode("#99999999999;"), Some(("\u{FFFD}".to_string(), 13)));
        assert_eq!(decode("#x80;"), Some(("\u{20AC}".to_string(), 5)));
        assert_eq!(decode("#;"), None);
        assert_eq!(decode("#x;"), None);
    }

    #[test]
    fn named_references() {
        assert_eq!(decode("amp;"), Some(("&".to_string(), 4)));
        assert_eq!(decode("copy 2024"), Some(("\u{00A9}".to_string(), 4)));
        assert_eq!(decode("unknown;"), None);
        assert_eq!(decode(" "), None);
    }

    #[test]
    fn legacy_reference_in_attribute_followed_by_equals_is_literal() {
        assert!(decode_character_reference("amp=1", true).is_none());
        assert!(decode_character_reference("ampx", true).is_none());
        assert!(decode_character_reference("amp;x", true).is_some());
        assert!(decode_character_reference("amp=1", false).is_some());
    }
}
