//! Python string literal encoding.
//!
//! The delimiter is picked per string to keep escapes rare: `'...'` for text
//! with double quotes, triple quotes for long multi-line text.

use std::fmt::Write as _;

/// Multi-line text at least this many characters long is written with
/// triple quotes.
pub const TRIPLE_QUOTE_MIN_LEN: usize = 40;

/// Encode `value` as a Python `str` literal that evaluates to exactly `value`.
#[must_use]
pub fn python_string(value: &str) -> String {
    if value.contains('\n') && value.chars().count() >= TRIPLE_QUOTE_MIN_LEN {
        triple_quoted(value)
    } else {
        single_line(value)
    }
}

fn single_line(value: &str) -> String {
    let quote = if value.contains('"') && !value.contains('\'') {
        '\''
    } else {
        '"'
    };
    let mut out = String::with_capacity(value.len() + 2);
    out.push(quote);
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c => push_char(&mut out, c),
        }
    }
    out.push(quote);
    out
}

fn triple_quoted(value: &str) -> String {
    let quote = if value.contains("\"\"\"") { '\'' } else { '"' };
    let chars: Vec<char> = value.chars().collect();
    let mut out = String::with_capacity(value.len() + 6);
    for _ in 0..3 {
        out.push(quote);
    }
    for (index, &c) in chars.iter().enumerate() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push('\n'),
            // A quote next to another quote, or at either end, could close
            // the literal early.
            c if c == quote => {
                let touches_quote = index == 0
                    || index + 1 == chars.len()
                    || chars[index - 1] == quote
                    || chars[index + 1] == quote;
                if touches_quote {
                    out.push('\\');
                }
                out.push(c);
            }
            c => push_char(&mut out, c),
        }
    }
    for _ in 0..3 {
        out.push(quote);
    }
    out
}

/// Push a character that is neither a backslash, a newline nor the delimiter.
fn push_char(out: &mut String, c: char) {
    // Writing to a String cannot fail.
    let _ = match c {
        '\r' => write!(out, "\\r"),
        '\t' => write!(out, "\\t"),
        c if u32::from(c) < 0x100 && c.is_control() => write!(out, "\\x{:02x}", u32::from(c)),
        '\u{2028}' | '\u{2029}' | '\u{FEFF}' => write!(out, "\\u{:04x}", u32::from(c)),
        c => write!(out, "{c}"),
    };
}
