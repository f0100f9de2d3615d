//! Document tree to DSL call tree.
//!
//! The mapper decides *what* gets generated: which identifier a tag becomes,
//! which attributes fold into the shorthand selector, which whitespace is
//! noise. It never deals with quoting or layout; that is the generator's job.

use htpy_common::{DiagnosticKind, Diagnostics};
use htpy_dom::{AttributeValue, DocumentTree, ElementData, NodeId, NodeType};

const COMPONENT: &str = "Mapper";

/// Python keywords. Identifiers that collide get a trailing underscore.
pub const PYTHON_KEYWORDS: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class",
    "continue", "def", "del", "elif", "else", "except", "finally", "for", "from", "global", "if",
    "import", "in", "is", "lambda", "nonlocal", "not", "or", "pass", "raise", "return", "try",
    "while", "with", "yield",
];

/// [§ 3.2.5.2.5 Phrasing content](https://html.spec.whatwg.org/multipage/dom.html#phrasing-content)
///
/// Whitespace between two of these is significant (`<b>a</b> <i>b</i>`).
const PHRASING_ELEMENTS: &[&str] = &[
    "a", "abbr", "area", "audio", "b", "bdi", "bdo", "br", "button", "canvas", "cite", "code",
    "data", "datalist", "del", "dfn", "em", "embed", "i", "iframe", "img", "input", "ins", "kbd",
    "label", "map", "mark", "math", "meter", "noscript", "object", "output", "picture",
    "progress", "q", "ruby", "s", "samp", "script", "select", "slot", "small", "span", "strong",
    "sub", "sup", "svg", "template", "textarea", "time", "u", "var", "video", "wbr",
];

/// Elements whose text is passed through as markup instead of escaped text.
/// Same set the tokenizer reads in the RAWTEXT state.
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style", "xmp", "iframe", "noembed", "noframes"];

/// Elements where every whitespace character is content.
const WHITESPACE_PRESERVING_ELEMENTS: &[&str] = &["pre", "textarea", "listing"];

/// A node of the generated code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DslNode {
    /// An element constructor call.
    Call(DslCall),
    /// Escaped text: `"Hi"`.
    Text(TextLiteral),
    /// A comment that survives into the rendered HTML: `comment("x")`.
    Comment(CommentLiteral),
    /// Text emitted without escaping: `Markup("...")`.
    Raw(RawLiteral),
}

/// Character data of a text child.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextLiteral(pub String);

/// Body of a comment child.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentLiteral(pub String);

/// Markup passed through verbatim (raw text element bodies, doctypes).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawLiteral(pub String);

/// The callee of a [`DslCall`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagName {
    /// A valid Python identifier exported by htpy (`div`, `my_widget`, `del_`).
    Identifier(String),
    /// A tag that cannot be spelled as an identifier; rendered through the
    /// generic `Element("name", {}, [])` constructor.
    Fallback(String),
}

/// How an attribute is passed to the call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeName {
    /// `name=value` keyword argument; htpy maps `_` back to `-` and strips a
    /// trailing `_`.
    Keyword(String),
    /// Entry of the positional attribute dictionary, for names that cannot be
    /// keywords (`@click`, `:class`, `x_y`).
    Quoted(String),
}

/// Value of a mapped attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DslValue {
    /// A string literal.
    Text(String),
    /// A boolean attribute, rendered as `True`.
    True,
}

/// An attribute that was not folded into the selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DslAttribute {
    /// Name, already translated.
    pub name: AttributeName,
    /// Value.
    pub value: DslValue,
}

/// The mapped form of an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DslCall {
    /// Callee.
    pub tag: TagName,
    /// Shorthand selector, e.g. `.btn.primary#main`.
    pub selector: Option<String>,
    /// Remaining attributes in source order.
    pub attributes: Vec<DslAttribute>,
    /// Children in source order.
    pub children: Vec<DslNode>,
    /// Void elements never get a children block.
    pub void: bool,
}

impl DslCall {
    /// Keyword attributes, in source order.
    pub fn keyword_attributes(&self) -> impl Iterator<Item = (&str, &DslValue)> {
        self.attributes.iter().filter_map(|attr| match &attr.name {
            AttributeName::Keyword(name) => Some((name.as_str(), &attr.value)),
            AttributeName::Quoted(_) => None,
        })
    }

    /// Attributes that go into the positional dictionary, in source order.
    pub fn quoted_attributes(&self) -> impl Iterator<Item = (&str, &DslValue)> {
        self.attributes.iter().filter_map(|attr| match &attr.name {
            AttributeName::Quoted(name) => Some((name.as_str(), &attr.value)),
            AttributeName::Keyword(_) => None,
        })
    }
}

/// Returns true if `name` matches `[A-Za-z_][A-Za-z0-9_]*`.
#[must_use]
pub fn is_python_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|first| first.is_ascii_alphabetic() || first == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Returns true if `name` is a Python keyword.
#[must_use]
pub fn is_python_keyword(name: &str) -> bool {
    PYTHON_KEYWORDS.contains(&name)
}

/// Translate a tag name into a callee.
///
/// `my-widget` becomes `my_widget`, `del` becomes `del_`; anything else
/// that is still not an identifier (`x:foo`, `1up`) falls back. So does a
/// name with an underscore: htpy would render `foo_bar` as `<foo-bar>`.
#[must_use]
pub fn tag_identifier(tag_name: &str) -> TagName {
    if tag_name.contains('_') {
        return TagName::Fallback(tag_name.to_string());
    }
    let candidate = tag_name.to_ascii_lowercase().replace('-', "_");
    if !is_python_identifier(&candidate) {
        return TagName::Fallback(tag_name.to_string());
    }
    if is_python_keyword(&candidate) {
        TagName::Identifier(format!("{candidate}_"))
    } else {
        TagName::Identifier(candidate)
    }
}

/// Translate an attribute name into a keyword argument name, or `None` when
/// it has to go into the attribute dictionary.
///
/// Underscores in the source name cannot survive the keyword form: htpy
/// turns every `_` into `-` when rendering.
#[must_use]
pub fn attribute_keyword(name: &str) -> Option<String> {
    if name.contains('_') {
        return None;
    }
    let candidate = name.replace('-', "_");
    if !is_python_identifier(&candidate) {
        return None;
    }
    if is_python_keyword(&candidate) {
        Some(format!("{candidate}_"))
    } else {
        Some(candidate)
    }
}

/// A character that can appear in a shorthand selector token unescaped.
fn is_selector_char(c: char) -> bool {
    !(c.is_whitespace() || c.is_control() || matches!(c, '.' | '#' | '"' | '\'' | '\\'))
}

/// An `id` value that can be written as `#value`.
#[must_use]
pub fn is_shorthand_id(value: &str) -> bool {
    !value.is_empty() && value.chars().all(is_selector_char)
}

/// A `class` value whose tokens can be written as `.a.b`.
#[must_use]
pub fn is_shorthand_class(value: &str) -> bool {
    let mut tokens = value.split_ascii_whitespace().peekable();
    tokens.peek().is_some() && tokens.all(|token| token.chars().all(is_selector_char))
}

/// Map a parsed forest to DSL nodes.
///
/// Unmappable constructs are recorded in `diagnostics`; mapping itself never
/// fails.
#[must_use]
pub fn map_document(tree: &DocumentTree, shorthand: bool, diagnostics: &mut Diagnostics) -> Vec<DslNode> {
    let mut mapper = Mapper {
        tree,
        shorthand,
        diagnostics,
    };
    let has_html_root = tree
        .roots()
        .iter()
        .any(|&id| tree.as_element(id).is_some_and(|data| data.tag_name == "html"));

    let mut nodes = Vec::new();
    for item in mapper.collect_children(NodeId::ROOT) {
        match item {
            Item::Node(id) => {
                if let Some(NodeType::Doctype(text)) = tree.node_type(id) {
                    // The html element renders its own doctype.
                    if !(has_html_root && text.eq_ignore_ascii_case("DOCTYPE html")) {
                        nodes.push(DslNode::Raw(RawLiteral(format!("<!{text}>"))));
                    }
                    continue;
                }
                nodes.extend(mapper.map_node(id));
            }
            Item::Text(text) => nodes.push(DslNode::Text(TextLiteral(text))),
        }
    }
    nodes
}

/// A child after adjacent text has been merged.
enum Item {
    Node(NodeId),
    Text(String),
}

struct Mapper<'a> {
    tree: &'a DocumentTree,
    shorthand: bool,
    diagnostics: &'a mut Diagnostics,
}

impl Mapper<'_> {
    fn map_node(&mut self, id: NodeId) -> Option<DslNode> {
        let tree = self.tree;
        match tree.node_type(id)? {
            NodeType::Element(data) => Some(DslNode::Call(self.map_element(id, data))),
            NodeType::Comment(data) => Some(DslNode::Comment(CommentLiteral(data.clone()))),
            NodeType::Text(data) => Some(DslNode::Text(TextLiteral(data.clone()))),
            NodeType::Doctype(text) => Some(DslNode::Raw(RawLiteral(format!("<!{text}>")))),
            NodeType::Document => None,
        }
    }

    fn map_element(&mut self, id: NodeId, data: &ElementData) -> DslCall {
        let tag = tag_identifier(&data.tag_name);
        if let TagName::Fallback(name) = &tag {
            self.diagnostics.warn(
                COMPONENT,
                DiagnosticKind::UnsupportedConstruct,
                format!("<{name}> is not a valid identifier; using Element(\"{name}\", ...)"),
            );
        }

        let (selector, attributes) = self.map_attributes(data);

        let void = data.is_void();
        let children = if void {
            Vec::new()
        } else if RAW_TEXT_ELEMENTS.contains(&data.tag_name.as_str()) {
            self.tree
                .children(id)
                .iter()
                .filter_map(|&child| self.tree.as_text(child))
                .map(|text| DslNode::Raw(RawLiteral(text.to_string())))
                .collect()
        } else {
            let preserve = WHITESPACE_PRESERVING_ELEMENTS.contains(&data.tag_name.as_str());
            self.map_children(id, preserve)
        };

        DslCall {
            tag,
            selector,
            attributes,
            children,
            void,
        }
    }

    /// Split attributes into the shorthand selector and the rest.
    fn map_attributes(&self, data: &ElementData) -> (Option<String>, Vec<DslAttribute>) {
        let eligible_class = self.shorthand
            && data
                .attribute("class")
                .and_then(AttributeValue::as_text)
                .is_some_and(is_shorthand_class);
        let eligible_id = self.shorthand
            && data
                .attribute("id")
                .and_then(AttributeValue::as_text)
                .is_some_and(is_shorthand_id);

        let mut selector = String::new();
        if eligible_class {
            for class in data.classes() {
                selector.push('.');
                selector.push_str(class);
            }
        }
        if eligible_id && let Some(id) = data.id() {
            selector.push('#');
            selector.push_str(id);
        }

        let mut keywords_used: Vec<String> = Vec::new();
        let mut attributes = Vec::new();
        for attr in &data.attrs {
            if (attr.name == "class" && eligible_class) || (attr.name == "id" && eligible_id) {
                continue;
            }
            let name = match attribute_keyword(&attr.name) {
                Some(keyword) if !keywords_used.contains(&keyword) => {
                    keywords_used.push(keyword.clone());
                    AttributeName::Keyword(keyword)
                }
                _ => AttributeName::Quoted(attr.name.clone()),
            };
            let value = match &attr.value {
                AttributeValue::Text(text) => DslValue::Text(text.clone()),
                AttributeValue::Boolean => DslValue::True,
            };
            attributes.push(DslAttribute { name, value });
        }

        let selector = (!selector.is_empty()).then_some(selector);
        (selector, attributes)
    }

    fn map_children(&mut self, id: NodeId, preserve_whitespace: bool) -> Vec<DslNode> {
        let mut nodes = Vec::new();
        for item in self.collect_children_with(id, preserve_whitespace) {
            match item {
                Item::Node(child) => nodes.extend(self.map_node(child)),
                Item::Text(text) => nodes.push(DslNode::Text(TextLiteral(text))),
            }
        }
        nodes
    }

    fn collect_children(&self, id: NodeId) -> Vec<Item> {
        self.collect_children_with(id, false)
    }

    /// Merge adjacent text children and drop insignificant whitespace.
    ///
    /// Whitespace-only text is dropped when it is the first or last child,
    /// sits at the root, or touches something that is not phrasing content.
    fn collect_children_with(&self, id: NodeId, preserve_whitespace: bool) -> Vec<Item> {
        let mut items: Vec<Item> = Vec::new();
        for &child in self.tree.children(id) {
            match self.tree.node_type(child) {
                Some(NodeType::Text(text)) => {
                    if let Some(Item::Text(previous)) = items.last_mut() {
                        previous.push_str(text);
                    } else {
                        items.push(Item::Text(text.clone()));
                    }
                }
                Some(_) => items.push(Item::Node(child)),
                None => {}
            }
        }
        if preserve_whitespace {
            return items;
        }

        let at_root = id == NodeId::ROOT;
        let last = items.len().saturating_sub(1);
        let keep: Vec<bool> = items
            .iter()
            .enumerate()
            .map(|(index, item)| match item {
                Item::Text(text) if text.chars().all(char::is_whitespace) => {
                    !at_root
                        && index != 0
                        && index != last
                        && self.is_phrasing(&items[index - 1])
                        && self.is_phrasing(&items[index + 1])
                }
                _ => true,
            })
            .collect();

        items
            .into_iter()
            .zip(keep)
            .filter_map(|(item, keep)| keep.then_some(item))
            .collect()
    }

    fn is_phrasing(&self, item: &Item) -> bool {
        match item {
            Item::Text(_) => true,
            Item::Node(id) => self
                .tree
                .as_element(*id)
                .is_some_and(|data| is_phrasing_element(&data.tag_name)),
        }
    }
}

/// Elements that flow inline with text. Custom elements count as phrasing.
fn is_phrasing_element(tag_name: &str) -> bool {
    PHRASING_ELEMENTS.contains(&tag_name) || tag_name.contains('-')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_identifiers() {
        assert_eq!(tag_identifier("div"), TagName::Identifier("div".to_string()));
        assert_eq!(tag_identifier("my-widget"), TagName::Identifier("my_widget".to_string()));
        assert_eq!(tag_identifier("del"), TagName::Identifier("del_".to_string()));
        assert_eq!(tag_identifier("x:foo"), TagName::Fallback("x:foo".to_string()));
        assert_eq!(tag_identifier("foo_bar"), TagName::Fallback("foo_bar".to_string()));
    }

    #[test]
    fn attribute_keywords() {
        assert_eq!(attribute_keyword("class").as_deref(), Some("class_"));
        assert_eq!(attribute_keyword("for").as_deref(), Some("for_"));
        assert_eq!(attribute_keyword("hx-get").as_deref(), Some("hx_get"));
        assert_eq!(attribute_keyword("data-is").as_deref(), Some("data_is"));
        assert_eq!(attribute_keyword("@click"), None);
        assert_eq!(attribute_keyword(":class"), None);
        assert_eq!(attribute_keyword("x-on:click"), None);
        assert_eq!(attribute_keyword("snake_case"), None);
    }

    #[test]
    fn shorthand_eligibility() {
        assert!(is_shorthand_class("a b"));
        assert!(is_shorthand_class("  btn\tbtn-primary  "));
        assert!(is_shorthand_class("md:flex w-1/2"));
        assert!(!is_shorthand_class(""));
        assert!(!is_shorthand_class("   "));
        assert!(!is_shorthand_class("a.b"));
        assert!(!is_shorthand_class("it's"));
        assert!(is_shorthand_id("main"));
        assert!(!is_shorthand_id(""));
        assert!(!is_shorthand_id("a b"));
        assert!(!is_shorthand_id("#x"));
    }
}
