//! End-to-end conversion tests: markup in, Python source out.

use htpy_common::DiagnosticKind;
use htpy_convert::{ConvertError, ConvertOptions, ImportMode, NoFormatter, convert, convert_bytes, html_to_htpy};
use htpy_html::ParseError;

/// Convert without formatting.
fn to_htpy(html: &str, shorthand: bool) -> String {
    html_to_htpy(html, shorthand, false).expect("markup converts")
}

fn convert_with(html: &str, options: ConvertOptions) -> htpy_convert::Conversion {
    convert(html, &options, &NoFormatter).expect("markup converts")
}

#[test]
fn test_shorthand_selector_with_text_child() {
    assert_eq!(
        to_htpy(r#"<div class="a b" id="x">Hi</div>"#, true),
        "div(\".a.b#x\")[\"Hi\"]\n"
    );
}

#[test]
fn test_without_shorthand_class_is_keyword() {
    assert_eq!(
        to_htpy(r#"<div class="a b" id="x">Hi</div>"#, false),
        "div(class_=\"a b\", id=\"x\")[\"Hi\"]\n"
    );
}

#[test]
fn test_void_element_has_keywords_and_no_children() {
    assert_eq!(to_htpy(r#"<img src="pic.png">"#, false), "img(src=\"pic.png\")\n");
    assert_eq!(to_htpy("<br>", true), "br\n");
}

#[test]
fn test_two_roots_are_two_expressions() {
    assert_eq!(to_htpy("<p>A</p><p>B</p>", false), "p[\"A\"]\np[\"B\"]\n");
}

#[test]
fn test_unclosed_li_is_closed() {
    let source = to_htpy("<li>Item", false);
    assert_eq!(source, "li[\"Item\"]\n");
    assert_eq!(source.matches("li").count(), 1);
}

#[test]
fn test_nested_list_layout() {
    let html = "<ul>\n  <li>One</li>\n  <li><a href=\"/two\">Two</a></li>\n</ul>";
    assert_eq!(
        to_htpy(html, false),
        "ul[\n    li[\"One\"],\n    li[\n        a(href=\"/two\")[\"Two\"],\n    ],\n]\n"
    );
}

#[test]
fn test_inline_whitespace_between_phrasing_is_kept() {
    assert_eq!(
        to_htpy("<p><b>a</b> <i>b</i></p>", false),
        "p[\n    b[\"a\"],\n    \" \",\n    i[\"b\"],\n]\n"
    );
}

#[test]
fn test_pre_keeps_whitespace() {
    assert_eq!(to_htpy("<pre>  x\n</pre>", false), "pre[\"  x\\n\"]\n");
}

#[test]
fn test_comment_becomes_comment_call() {
    assert_eq!(
        to_htpy("<div><!-- keep me --><p>x</p></div>", false),
        "div[\n    comment(\" keep me \"),\n    p[\"x\"],\n]\n"
    );
}

#[test]
fn test_ineligible_class_stays_keyword() {
    assert_eq!(
        to_htpy(r#"<span class="a.b" id="main">x</span>"#, true),
        "span(\"#main\", class_=\"a.b\")[\"x\"]\n"
    );
}

#[test]
fn test_keyword_and_dash_translation() {
    assert_eq!(
        to_htpy(r#"<label for="name" hx-get="/x" data-id="1">Name</label>"#, false),
        "label(for_=\"name\", hx_get=\"/x\", data_id=\"1\")[\"Name\"]\n"
    );
}

#[test]
fn test_non_identifier_attributes_go_into_dict() {
    assert_eq!(
        to_htpy(r#"<button @click="go()" :class="c" x_y="1" type="button">Go</button>"#, false),
        "button({\"@click\": \"go()\", \":class\": \"c\", \"x_y\": \"1\"}, type=\"button\")[\"Go\"]\n"
    );
}

#[test]
fn test_boolean_and_empty_attributes() {
    assert_eq!(
        to_htpy(r#"<input disabled value="">"#, false),
        "input(disabled=True, value=\"\")\n"
    );
}

#[test]
fn test_attribute_with_double_quote_uses_single_quotes() {
    assert_eq!(
        to_htpy(r#"<a title='say "hi"'>x</a>"#, false),
        "a(title='say \"hi\"')[\"x\"]\n"
    );
}

#[test]
fn test_custom_element_and_keyword_tag() {
    assert_eq!(to_htpy("<my-widget>x</my-widget>", false), "my_widget[\"x\"]\n");
    assert_eq!(to_htpy("<del>x</del>", false), "del_[\"x\"]\n");
}

#[test]
fn test_fallback_tag_is_reported() {
    let conversion = convert_with("<x:foo>y</x:foo>", ConvertOptions::default());
    assert_eq!(conversion.source, "Element(\"x:foo\", {}, [])[\"y\"]\n");
    assert!(
        conversion
            .diagnostics
            .has_kind(DiagnosticKind::UnsupportedConstruct)
    );
}

#[test]
fn test_underscore_tag_falls_back() {
    let conversion = convert_with("<foo_bar>x</foo_bar>", ConvertOptions::default());
    assert_eq!(conversion.source, "Element(\"foo_bar\", {}, [])[\"x\"]\n");
    assert!(
        conversion
            .diagnostics
            .has_kind(DiagnosticKind::UnsupportedConstruct)
    );
}

#[test]
fn test_noscript_content_is_parsed_as_elements() {
    assert_eq!(
        to_htpy(r#"<noscript><img src="p.gif"></noscript>"#, false),
        "noscript[\n    img(src=\"p.gif\"),\n]\n"
    );
}

#[test]
fn test_raw_text_elements_are_markup() {
    assert_eq!(
        to_htpy("<xmp><b>bold</b></xmp>", false),
        "xmp[Markup(\"<b>bold</b>\")]\n"
    );
    assert_eq!(
        to_htpy("<iframe><p>fallback</p></iframe>", false),
        "iframe[Markup(\"<p>fallback</p>\")]\n"
    );
}

#[test]
fn test_deeply_nested_markup_still_converts() {
    let conversion = convert_with(&"<span>x".repeat(600), ConvertOptions::default());
    assert!(conversion.source.starts_with("span[\n"));
    assert!(
        conversion
            .diagnostics
            .iter()
            .any(|d| d.message.contains("nested deeper than 512"))
    );
}

#[test]
fn test_script_body_is_markup() {
    assert_eq!(
        to_htpy("<script>if (a < b) { go(\"x\"); }</script>", false),
        "script[Markup('if (a < b) { go(\"x\"); }')]\n"
    );
}

#[test]
fn test_doctype_dropped_before_html_root() {
    let source = to_htpy("<!DOCTYPE html>\n<html><body><p>x</p></body></html>", false);
    assert_eq!(source, "html[\n    body[\n        p[\"x\"],\n    ],\n]\n");
}

#[test]
fn test_doctype_kept_without_html_root() {
    assert_eq!(
        to_htpy("<!doctype html><p>x</p>", false),
        "Markup(\"<!DOCTYPE html>\")\np[\"x\"]\n"
    );
}

#[test]
fn test_empty_input_is_empty_source() {
    assert_eq!(to_htpy("", true), "");
    assert_eq!(to_htpy("  \n\t", true), "");
}

#[test]
fn test_root_text() {
    assert_eq!(to_htpy("hello &amp; bye", false), "\"hello & bye\"\n");
}

#[test]
fn test_long_multiline_text_uses_triple_quotes() {
    let html = "<p>This paragraph is long enough to wrap,\nso it spans two lines.</p>";
    assert_eq!(
        to_htpy(html, false),
        "p[\"\"\"This paragraph is long enough to wrap,\nso it spans two lines.\"\"\"]\n"
    );
}

#[test]
fn test_names_import_header() {
    let options = ConvertOptions::default()
        .with_shorthand(true)
        .with_imports(ImportMode::Names);
    let conversion = convert_with("<div class=\"box\"><!-- c --><br></div>", options);
    assert_eq!(
        conversion.source,
        "from htpy import br, comment, div\n\ndiv(\".box\")[\n    comment(\" c \"),\n    br,\n]\n"
    );
}

#[test]
fn test_module_import_header() {
    let options = ConvertOptions::default().with_imports(ImportMode::Module);
    let conversion = convert_with("<p>x</p>", options);
    assert_eq!(conversion.source, "import htpy as h\n\nh.p[\"x\"]\n");
}

#[test]
fn test_parse_issues_are_collected_not_fatal() {
    let conversion = convert_with("<div><span>x</div></b>", ConvertOptions::default());
    assert_eq!(conversion.source, "div[\n    span[\"x\"],\n]\n");
    assert!(conversion.diagnostics.has_kind(DiagnosticKind::ParseIssue));
}

#[test]
fn test_missing_formatter_keeps_source() {
    let options = ConvertOptions::default().with_format(true);
    let conversion = convert_with("<p>x</p>", options);
    assert_eq!(conversion.source, "p[\"x\"]\n");
    assert!(
        conversion
            .diagnostics
            .has_kind(DiagnosticKind::FormatterUnavailable)
    );
}

#[test]
fn test_invalid_utf8_is_a_parse_error() {
    let err = convert_bytes(b"<p>\xff</p>", &ConvertOptions::default(), &NoFormatter)
        .expect_err("not UTF-8");
    assert_eq!(
        err,
        ConvertError::Parse(ParseError::InvalidEncoding { valid_up_to: 3 })
    );
}

#[test]
fn test_conversions_are_independent() {
    let first = to_htpy("<x:foo></x:foo>", false);
    let again = to_htpy("<x:foo></x:foo>", false);
    assert_eq!(first, again);
}
