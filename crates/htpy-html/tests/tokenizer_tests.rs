//! Integration tests for the HTML tokenizer.

use htpy_common::DiagnosticKind;
use htpy_dom::{Attribute, AttributeValue};
use htpy_html::{HtmlTokenizer, Token};

/// Helper to tokenize HTML and return the tokens, without the trailing EOF.
fn tokenize(html: &str) -> Vec<Token> {
    let mut tokenizer = HtmlTokenizer::new(html);
    tokenizer.run();
    let mut tokens = tokenizer.into_tokens();
    assert_eq!(tokens.pop(), Some(Token::EndOfFile));
    tokens
}

fn start_tag(name: &str, attributes: Vec<Attribute>) -> Token {
    Token::StartTag {
        name: name.to_string(),
        self_closing: false,
        attributes,
    }
}

fn end_tag(name: &str) -> Token {
    Token::EndTag {
        name: name.to_string(),
    }
}

fn text(data: &str) -> Token {
    Token::Text {
        data: data.to_string(),
    }
}

#[test]
fn test_simple_element() {
    assert_eq!(
        tokenize("<p>Hello</p>"),
        vec![start_tag("p", vec![]), text("Hello"), end_tag("p")]
    );
}

#[test]
fn test_tag_and_attribute_names_are_lowercased() {
    assert_eq!(
        tokenize("<DIV Class=\"X\"></Div>"),
        vec![
            start_tag("div", vec![Attribute::text("class", "X")]),
            end_tag("div")
        ]
    );
}

#[test]
fn test_attribute_quoting_styles() {
    let tokens = tokenize(r#"<input type=text value='a "b"' placeholder="it's">"#);
    let Token::StartTag { attributes, .. } = &tokens[0] else {
        panic!("expected start tag, got {:?}", tokens[0]);
    };
    assert_eq!(
        attributes,
        &vec![
            Attribute::text("type", "text"),
            Attribute::text("value", "a \"b\""),
            Attribute::text("placeholder", "it's"),
        ]
    );
}

#[test]
fn test_boolean_attribute_differs_from_empty_value() {
    let tokens = tokenize(r#"<input disabled value="" checked=>"#);
    let Token::StartTag { attributes, .. } = &tokens[0] else {
        panic!("expected start tag");
    };
    assert_eq!(attributes[0].value, AttributeValue::Boolean);
    assert_eq!(attributes[1].value, AttributeValue::Text(String::new()));
    assert_eq!(attributes[2].value, AttributeValue::Text(String::new()));
}

#[test]
fn test_duplicate_attributes_keep_first() {
    let mut tokenizer = HtmlTokenizer::new(r#"<a href="1" HREF="2">"#);
    tokenizer.run();
    let (tokens, diagnostics) = tokenizer.finish();
    assert_eq!(
        tokens[0],
        start_tag("a", vec![Attribute::text("href", "1")])
    );
    assert!(diagnostics.has_kind(DiagnosticKind::ParseIssue));
}

#[test]
fn test_self_closing_flag() {
    assert_eq!(
        tokenize("<br/><path d=\"M0\" />"),
        vec![
            Token::StartTag {
                name: "br".to_string(),
                self_closing: true,
                attributes: vec![],
            },
            Token::StartTag {
                name: "path".to_string(),
                self_closing: true,
                attributes: vec![Attribute::text("d", "M0")],
            },
        ]
    );
}

#[test]
fn test_comments() {
    assert_eq!(
        tokenize("<!-- hi --><!----><!-- a-b -- c -->"),
        vec![
            Token::Comment {
                data: " hi ".to_string()
            },
            Token::Comment {
                data: String::new()
            },
            Token::Comment {
                data: " a-b -- c ".to_string()
            },
        ]
    );
}

#[test]
fn test_bogus_comment() {
    assert_eq!(
        tokenize("<?xml version=\"1.0\"?><!foo>"),
        vec![
            Token::Comment {
                data: "?xml version=\"1.0\"?".to_string()
            },
            Token::Comment {
                data: "foo".to_string()
            },
        ]
    );
}

#[test]
fn test_doctype_is_normalized() {
    assert_eq!(
        tokenize("<!doctype   HTML >"),
        vec![Token::Doctype {
            text: "DOCTYPE HTML".to_string()
        }]
    );
}

#[test]
fn test_character_references_in_text() {
    assert_eq!(
        tokenize("a &amp; b &lt;c&gt; &#169; &#x1F600; &bogus; &"),
        vec![text("a & b <c> \u{00A9} \u{1F600} &bogus; &")]
    );
}

#[test]
fn test_character_references_in_attributes() {
    let tokens = tokenize(r#"<a href="?a=1&amp;b=2&copy=3" title="&quot;x&quot;">"#);
    assert_eq!(
        tokens[0],
        start_tag(
            "a",
            vec![
                Attribute::text("href", "?a=1&b=2&copy=3"),
                Attribute::text("title", "\"x\""),
            ]
        )
    );
}

#[test]
fn test_script_content_is_raw_text() {
    assert_eq!(
        tokenize("<script>if (a < b && c) { x = '</p>'; }</script>"),
        vec![
            start_tag("script", vec![]),
            text("if (a < b && c) { x = '</p>'; }"),
            end_tag("script"),
        ]
    );
}

#[test]
fn test_end_tag_match_is_case_insensitive_in_raw_text() {
    assert_eq!(
        tokenize("<style>a{}</STYLE >"),
        vec![start_tag("style", vec![]), text("a{}"), end_tag("style")]
    );
}

#[test]
fn test_title_decodes_references_but_not_tags() {
    assert_eq!(
        tokenize("<title>A &amp; <b>B</b></title>"),
        vec![
            start_tag("title", vec![]),
            text("A & <b>B</b>"),
            end_tag("title"),
        ]
    );
}

#[test]
fn test_cdata_is_text() {
    assert_eq!(
        tokenize("<![CDATA[x < y]]>z"),
        vec![text("x < yz")]
    );
}

#[test]
fn test_line_endings_and_bom_are_normalized() {
    assert_eq!(
        tokenize("\u{FEFF}a\r\nb\rc"),
        vec![text("a\nb\nc")]
    );
}

#[test]
fn test_stray_less_than_is_text() {
    assert_eq!(tokenize("1 < 2"), vec![text("1 < 2")]);
}

#[test]
fn test_unterminated_tag_at_eof_is_dropped() {
    let mut tokenizer = HtmlTokenizer::new("ok<div class=\"x");
    tokenizer.run();
    let (tokens, diagnostics) = tokenizer.finish();
    assert_eq!(tokens, vec![text("ok"), Token::EndOfFile]);
    assert!(diagnostics.has_kind(DiagnosticKind::ParseIssue));
}

#[test]
fn test_parse_errors_carry_position() {
    let mut tokenizer = HtmlTokenizer::new("<p>\n<a b='1'c>");
    tokenizer.run();
    let (_, diagnostics) = tokenizer.finish();
    let message = &diagnostics.iter().next().expect("one issue").message;
    assert!(message.contains("2:"), "{message}");
}
