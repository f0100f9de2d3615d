//! Property tests for literal encoding and attribute mapping.

use htpy_convert::{html_to_htpy, python_string};
use htpy_dom::VOID_ELEMENTS;
use quickcheck::TestResult;
use quickcheck_macros::quickcheck;

/// Decode a Python string literal the way the Python tokenizer would, for
/// the escapes the encoder produces. Returns `None` for anything that would
/// be a syntax error or would end before the last character.
fn decode_python_literal(literal: &str) -> Option<String> {
    let quote = literal.chars().next().filter(|&c| c == '"' || c == '\'')?;
    let triple: String = std::iter::repeat_n(quote, 3).collect();
    let (delimiter, body) = if literal.len() >= 6 && literal.starts_with(&triple) {
        (triple.as_str(), &literal[3..])
    } else {
        (&literal[..1], &literal[1..])
    };

    let mut out = String::new();
    let mut chars = body.char_indices();
    while let Some((index, c)) = chars.next() {
        if body[index..].starts_with(delimiter) {
            // The closing delimiter must be the end of the literal.
            return (index + delimiter.len() == body.len()).then_some(out);
        }
        match c {
            '\\' => {
                let (_, escape) = chars.next()?;
                match escape {
                    '\\' => out.push('\\'),
                    '\'' => out.push('\''),
                    '"' => out.push('"'),
                    'n' => out.push('\n'),
                    'r' => out.push('\r'),
                    't' => out.push('\t'),
                    'x' | 'u' => {
                        let digits = if escape == 'x' { 2 } else { 4 };
                        let hex: String = (0..digits)
                            .map(|_| chars.next().map(|(_, h)| h))
                            .collect::<Option<_>>()?;
                        out.push(char::from_u32(u32::from_str_radix(&hex, 16).ok()?)?);
                    }
                    _ => return None,
                }
            }
            '\n' | '\r' if delimiter.len() == 1 => return None,
            c => out.push(c),
        }
    }
    None
}

#[quickcheck]
fn literal_decodes_to_input(value: String) -> bool {
    decode_python_literal(&python_string(&value)) == Some(value)
}

#[quickcheck]
fn multiline_literal_decodes_to_input(lines: Vec<String>) -> bool {
    let value = lines.join("\n\"");
    decode_python_literal(&python_string(&value)) == Some(value)
}

/// Class tokens made only of characters the selector accepts.
fn class_tokens(raw: Vec<String>) -> Vec<String> {
    raw.into_iter()
        .map(|token| {
            token
                .chars()
                .filter(|c| c.is_ascii_alphanumeric() || *c == '-')
                .collect::<String>()
        })
        .filter(|token| !token.is_empty())
        .collect()
}

#[quickcheck]
fn shorthand_folds_class_tokens(raw: Vec<String>) -> TestResult {
    let tokens = class_tokens(raw);
    if tokens.is_empty() {
        return TestResult::discard();
    }
    let html = format!("<div class=\"{}\">x</div>", tokens.join(" "));
    let source = html_to_htpy(&html, true, false).expect("markup converts");

    let selector: String = tokens.iter().map(|token| format!(".{token}")).collect();
    TestResult::from_bool(
        source.starts_with(&format!("div(\"{selector}\")")) && !source.contains("class_="),
    )
}

#[quickcheck]
fn without_shorthand_class_is_a_keyword(raw: Vec<String>) -> TestResult {
    let tokens = class_tokens(raw);
    if tokens.is_empty() {
        return TestResult::discard();
    }
    let class = tokens.join(" ");
    let html = format!("<div class=\"{class}\">x</div>");
    let source = html_to_htpy(&html, false, false).expect("markup converts");

    TestResult::from_bool(source.starts_with(&format!("div(class_=\"{class}\")")))
}

#[quickcheck]
fn void_elements_never_get_children(which: usize, mut text: String, shorthand: bool) -> bool {
    let tag = VOID_ELEMENTS[which % VOID_ELEMENTS.len()];
    text.retain(|c| c.is_ascii_alphanumeric());
    let html = format!("<{tag}>{text}</{tag}>");
    let source = html_to_htpy(&html, shorthand, false).expect("markup converts");

    source.lines().next() == Some(tag)
}
