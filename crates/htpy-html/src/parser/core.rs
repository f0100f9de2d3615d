use std::fmt::Write as _;

use htpy_common::{DiagnosticKind, Diagnostics};
use htpy_dom::{
    Attribute, AttributeValue, DocumentTree, ElementData, NodeId, NodeType, is_void_element,
};

use crate::tokenizer::Token;

/// Deepest the stack of open elements grows. Elements opened beyond it are
/// inserted into the deepest open element without being pushed, so their
/// content flattens into it.
pub const MAX_NESTING_DEPTH: usize = 512;

const COMPONENT: &str = "HTML Parser";

/// [§ 13.2.4.2 The stack of open elements](https://html.spec.whatwg.org/multipage/parsing.html#has-an-element-in-scope)
///
/// Default scope markers (MathML/SVG markers omitted).
const DEFAULT_SCOPE: &[&str] = &[
    "applet", "caption", "html", "table", "td", "th", "marquee", "object", "template",
];

/// "has an element in button scope" - default scope markers plus button.
const BUTTON_SCOPE: &[&str] = &[
    "applet", "caption", "html", "table", "td", "th", "marquee", "object", "template", "button",
];

/// "has an element in list item scope" - default scope markers plus ol, ul.
const LIST_ITEM_SCOPE: &[&str] = &[
    "applet", "caption", "html", "table", "td", "th", "marquee", "object", "template", "ol", "ul",
];

/// Definition terms close each other up to the nearest `dl`.
const DEFINITION_SCOPE: &[&str] = &[
    "applet", "caption", "html", "table", "td", "th", "marquee", "object", "template", "dl",
];

/// "has an element in table scope" - scope markers: html, table, template.
const TABLE_SCOPE: &[&str] = &["html", "table", "template"];

/// [§ 13.2.6.2 Generate implied end tags](https://html.spec.whatwg.org/multipage/parsing.html#generate-implied-end-tags)
const IMPLIED_END_TAG_ELEMENTS: &[&str] = &[
    "dd", "dt", "li", "optgroup", "option", "p", "rb", "rp", "rt", "rtc",
];

/// [§ 13.1.2.4 Optional tags](https://html.spec.whatwg.org/multipage/syntax.html#optional-tags)
///
/// Elements whose end tag may be omitted. Closing one implicitly is not
/// worth a diagnostic.
const OPTIONAL_END_TAG_ELEMENTS: &[&str] = &[
    "body", "caption", "colgroup", "dd", "dt", "head", "html", "li", "optgroup", "option", "p",
    "rb", "rp", "rt", "rtc", "tbody", "td", "tfoot", "th", "thead", "tr",
];

/// [§ 13.2.6.4.7 The "in body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inbody)
///
/// "If the stack of open elements has a p element in button scope, then
/// close a p element." Start tags that do this:
const CLOSES_P_ELEMENT: &[&str] = &[
    "address", "article", "aside", "blockquote", "center", "details", "dialog", "dir", "div",
    "dl", "fieldset", "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5",
    "h6", "header", "hgroup", "hr", "listing", "main", "menu", "nav", "ol", "p", "pre",
    "search", "section", "summary", "table", "ul",
];

const HEADING_ELEMENTS: &[&str] = &["h1", "h2", "h3", "h4", "h5", "h6"];

const TABLE_SECTIONS: &[&str] = &["thead", "tbody", "tfoot"];

/// [§ 13.2.6 Tree construction](https://html.spec.whatwg.org/multipage/parsing.html#tree-construction)
///
/// Builds a [`DocumentTree`] forest from a token stream.
///
/// Unlike a browser there are no insertion modes: pasted markup is a
/// fragment, so nothing synthesizes `html`/`head`/`body` and elements land
/// exactly where the source put them. What is kept is the stack of open
/// elements and the optional-end-tag rules, which is what makes `<li>a<li>b`
/// produce two siblings.
pub struct HtmlParser {
    /// [§ 13.2.4.3 The stack of open elements](https://html.spec.whatwg.org/multipage/parsing.html#the-stack-of-open-elements)
    ///
    /// Stores `NodeId`s into the arena.
    stack_of_open_elements: Vec<NodeId>,

    /// The forest under construction.
    tree: DocumentTree,

    /// Input tokens from the tokenizer.
    tokens: Vec<Token>,

    /// Parse issues, starting with whatever the tokenizer recorded.
    diagnostics: Diagnostics,

    /// See [`MAX_NESTING_DEPTH`].
    max_depth: usize,

    /// Set once an element has been inserted at the root; DOCTYPEs after
    /// that point are dropped.
    seen_root_element: bool,
}

impl HtmlParser {
    /// Create a new parser from a token stream.
    #[must_use]
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            stack_of_open_elements: Vec::new(),
            tree: DocumentTree::new(),
            tokens,
            diagnostics: Diagnostics::new(),
            max_depth: MAX_NESTING_DEPTH,
            seen_root_element: false,
        }
    }

    /// Continue recording into an existing collector (usually the tokenizer's).
    #[must_use]
    pub fn with_diagnostics(mut self, diagnostics: Diagnostics) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    /// Override the nesting limit.
    #[must_use]
    pub const fn with_max_depth(mut self, limit: usize) -> Self {
        self.max_depth = limit;
        self
    }

    /// Run the parser and return the tree with every recorded diagnostic.
    #[must_use]
    pub fn run(mut self) -> (DocumentTree, Diagnostics) {
        let tokens = std::mem::take(&mut self.tokens);
        for token in tokens {
            let at_end = token.is_eof();
            self.process_token(token);
            if at_end {
                break;
            }
        }
        // A stream without an EOF token still ends here.
        self.close_all_open_elements();
        (self.tree, self.diagnostics)
    }

    /// [§ 13.2.6 Tree construction](https://html.spec.whatwg.org/multipage/parsing.html#tree-construction-dispatcher)
    fn process_token(&mut self, token: Token) {
        match token {
            Token::Doctype { text } => self.insert_doctype(text),
            Token::Comment { data } => self.insert_node(NodeType::Comment(data)),
            Token::Text { data } => self.insert_node(NodeType::Text(data)),
            Token::StartTag {
                name,
                self_closing,
                attributes,
            } => self.handle_start_tag(name, self_closing, attributes),
            Token::EndTag { name } => self.handle_end_tag(&name),
            Token::EndOfFile => self.close_all_open_elements(),
        }
    }

    fn parse_issue(&mut self, message: String) {
        self.diagnostics
            .warn(COMPONENT, DiagnosticKind::ParseIssue, message);
    }

    /// "The current node is the bottommost node in this stack of open elements."
    fn current_node(&self) -> NodeId {
        self.stack_of_open_elements
            .last()
            .copied()
            .unwrap_or(NodeId::ROOT)
    }

    /// Get the tag name of a node (local name of the element).
    fn get_tag_name(&self, id: NodeId) -> Option<&str> {
        self.tree.as_element(id).map(|data| data.tag_name.as_str())
    }

    fn current_node_is_one_of(&self, tag_names: &[&str]) -> bool {
        self.get_tag_name(self.current_node())
            .is_some_and(|tag| tag_names.contains(&tag))
    }

    /// "Insert a comment" / "Insert a character", without merging: adjacent
    /// text stays in separate nodes.
    fn insert_node(&mut self, node_type: NodeType) {
        let parent = self.current_node();
        let id = self.tree.alloc(node_type);
        self.tree.append_child(parent, id);
    }

    /// [§ 13.2.6.4.1 The "initial" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-initial-insertion-mode)
    ///
    /// A DOCTYPE is only meaningful before any element has been opened.
    fn insert_doctype(&mut self, text: String) {
        if self.seen_root_element || !self.stack_of_open_elements.is_empty() {
            self.parse_issue(format!("<!{text}> after content ignored"));
            return;
        }
        let id = self.tree.alloc(NodeType::Doctype(text));
        self.tree.append_child(NodeId::ROOT, id);
    }

    fn handle_start_tag(
        &mut self,
        name: String,
        self_closing: bool,
        attributes: Vec<Attribute>,
    ) {
        self.close_elements_implied_by(&name);

        let void = is_void_element(&name);
        if self_closing && !void {
            // `<path/>`, `<my-widget />`: honoured as written.
            self.diagnostics.note(
                COMPONENT,
                format!("self-closing syntax on non-void element <{name}>"),
            );
        }

        let parent = self.current_node();
        if parent == NodeId::ROOT {
            self.seen_root_element = true;
        }
        let id = self
            .tree
            .alloc(NodeType::Element(ElementData::new(name, attributes)));
        self.tree.append_child(parent, id);

        if void || self_closing {
            return;
        }
        if self.stack_of_open_elements.len() >= self.max_depth {
            let limit = self.max_depth;
            self.parse_issue(format!(
                "elements nested deeper than {limit} levels; later content is flattened"
            ));
            return;
        }
        self.stack_of_open_elements.push(id);
    }

    /// Optional end tags: close whatever the incoming start tag cannot nest in.
    fn close_elements_implied_by(&mut self, name: &str) {
        match name {
            // "A start tag whose tag name is "li""
            "li" => {
                if self.has_element_in_specific_scope(&["li"], LIST_ITEM_SCOPE) {
                    self.close_element("li");
                }
            }
            // "A start tag whose tag name is one of: "dd", "dt""
            "dd" | "dt" => {
                if self.has_element_in_specific_scope(&["dd", "dt"], DEFINITION_SCOPE) {
                    self.close_one_of(&["dd", "dt"]);
                }
            }
            // "A start tag whose tag name is "option""
            "option" => {
                if self.current_node_is_one_of(&["option"]) {
                    let _ = self.stack_of_open_elements.pop();
                }
            }
            // "A start tag whose tag name is "optgroup""
            "optgroup" => {
                if self.current_node_is_one_of(&["option"]) {
                    let _ = self.stack_of_open_elements.pop();
                }
                if self.current_node_is_one_of(&["optgroup"]) {
                    let _ = self.stack_of_open_elements.pop();
                }
            }
            // "A start tag whose tag name is one of: "rp", "rt""
            "rp" | "rt" => {
                if self.current_node_is_one_of(&["rp", "rt"]) {
                    let _ = self.stack_of_open_elements.pop();
                }
            }
            // [§ 13.2.6.4.15 The "in cell" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-incell)
            "td" | "th" => self.close_cell(),
            // [§ 13.2.6.4.14 The "in row" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inrow)
            "tr" => {
                self.close_cell();
                if self.has_element_in_specific_scope(&["tr"], TABLE_SCOPE) {
                    self.close_element("tr");
                }
            }
            // [§ 13.2.6.4.13 The "in table body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-intbody)
            "thead" | "tbody" | "tfoot" => {
                self.close_cell();
                if self.has_element_in_specific_scope(&["tr"], TABLE_SCOPE) {
                    self.close_element("tr");
                }
                if self.has_element_in_specific_scope(TABLE_SECTIONS, TABLE_SCOPE) {
                    self.close_one_of(TABLE_SECTIONS);
                }
            }
            _ => {}
        }

        if CLOSES_P_ELEMENT.contains(&name) && self.has_element_in_specific_scope(&["p"], BUTTON_SCOPE) {
            self.close_element("p");
        }

        // "If the current node is an h1, h2, h3, h4, h5, or h6 element, then
        // this is a parse error; pop the current node off the stack of open elements."
        if HEADING_ELEMENTS.contains(&name) && self.current_node_is_one_of(HEADING_ELEMENTS) {
            if let Some(open) = self.get_tag_name(self.current_node()) {
                let message = format!("<{name}> inside open <{open}>; closing <{open}>");
                self.parse_issue(message);
            }
            let _ = self.stack_of_open_elements.pop();
        }
    }

    /// [§ 13.2.6.4.15 The "in cell" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#close-the-cell)
    ///
    /// "Close the cell" when a `td` or `th` is open in table scope.
    fn close_cell(&mut self) {
        if self.has_element_in_specific_scope(&["td", "th"], TABLE_SCOPE) {
            self.close_one_of(&["td", "th"]);
        }
    }

    fn handle_end_tag(&mut self, name: &str) {
        if is_void_element(name) {
            self.parse_issue(format!("end tag </{name}> for void element ignored"));
            return;
        }

        let scope = match name {
            "table" | "tr" | "thead" | "tbody" | "tfoot" => TABLE_SCOPE,
            "li" => LIST_ITEM_SCOPE,
            "p" => BUTTON_SCOPE,
            _ => DEFAULT_SCOPE,
        };
        if !self.has_element_in_specific_scope(&[name], scope) {
            self.parse_issue(format!("unmatched end tag </{name}> ignored"));
            return;
        }

        self.close_element(name);
    }

    /// [§ 13.2.4.2 The stack of open elements](https://html.spec.whatwg.org/multipage/parsing.html#has-an-element-in-scope)
    ///
    /// STEP 1: "Initialize node to be the current node (the bottommost node
    ///          of the stack)."
    ///
    /// STEP 2: "If node is the target node, terminate in a match state."
    ///
    /// STEP 3: "Otherwise, if node is one of the element types in list,
    ///          terminate in a failure state."
    ///
    /// STEP 4: "Otherwise, set node to the previous entry in the stack of
    ///          open elements and return to step 2."
    fn has_element_in_specific_scope(&self, targets: &[&str], scope_markers: &[&str]) -> bool {
        for &node_id in self.stack_of_open_elements.iter().rev() {
            if let Some(node_tag) = self.get_tag_name(node_id) {
                if targets.contains(&node_tag) {
                    return true;
                }
                if scope_markers.contains(&node_tag) {
                    return false;
                }
            }
        }
        false
    }

    /// [§ 13.2.6.2 Generate implied end tags](https://html.spec.whatwg.org/multipage/parsing.html#generate-implied-end-tags)
    ///
    /// "If a step requires the user agent to generate implied end tags but lists
    /// an element to exclude from the process, then the user agent must perform
    /// the above steps as if that element was not in the above list."
    fn generate_implied_end_tags_excluding(&mut self, exclude: &[&str]) {
        while let Some(&current) = self.stack_of_open_elements.last() {
            if let Some(tag) = self.get_tag_name(current)
                && IMPLIED_END_TAG_ELEMENTS.contains(&tag)
                && !exclude.contains(&tag)
            {
                let _ = self.stack_of_open_elements.pop();
                continue;
            }
            break;
        }
    }

    /// Generate implied end tags, then pop until `tag_name` has been popped.
    fn close_element(&mut self, tag_name: &str) {
        self.close_one_of(&[tag_name]);
    }

    /// Generate implied end tags, then pop until one of `tag_names` has been
    /// popped. Anything else closed on the way that needed an explicit end
    /// tag is reported.
    ///
    /// STEP 1: Pop the current node from the stack.
    /// STEP 2: If popped node matches any target tag name, stop.
    /// STEP 3: Otherwise, repeat from STEP 1.
    fn close_one_of(&mut self, tag_names: &[&str]) {
        self.generate_implied_end_tags_excluding(tag_names);
        let mut unclosed = Vec::new();
        while let Some(id) = self.stack_of_open_elements.pop() {
            let Some(tag) = self.get_tag_name(id) else {
                continue;
            };
            if tag_names.contains(&tag) {
                break;
            }
            if !OPTIONAL_END_TAG_ELEMENTS.contains(&tag) {
                unclosed.push(tag.to_string());
            }
        }
        for tag in unclosed {
            self.parse_issue(format!("<{tag}> closed implicitly"));
        }
    }

    /// [§ 13.2.6.5 The end](https://html.spec.whatwg.org/multipage/parsing.html#the-end)
    ///
    /// "Pop all the nodes off the stack of open elements." Elements whose end
    /// tag is not optional are reported.
    fn close_all_open_elements(&mut self) {
        while let Some(id) = self.stack_of_open_elements.pop() {
            if let Some(tag) = self.get_tag_name(id)
                && !OPTIONAL_END_TAG_ELEMENTS.contains(&tag)
            {
                let message = format!("unclosed <{tag}> at end of input");
                self.parse_issue(message);
            }
        }
    }
}

/// Render a tree as an indented outline for debugging.
///
/// ```text
/// <ul class="nav">
///   <li>
///     "Home"
/// ```
#[must_use]
pub fn format_tree(tree: &DocumentTree) -> String {
    let mut out = String::new();
    for &root in tree.roots() {
        write_node(tree, root, 0, &mut out);
    }
    out
}

fn write_node(tree: &DocumentTree, id: NodeId, indent: usize, out: &mut String) {
    let prefix = "  ".repeat(indent);
    let Some(node_type) = tree.node_type(id) else {
        return;
    };
    // Writing to a String cannot fail.
    let _ = match node_type {
        NodeType::Document => writeln!(out, "{prefix}#document"),
        NodeType::Element(data) => {
            let attrs: String = data
                .attrs
                .iter()
                .map(|attr| match &attr.value {
                    AttributeValue::Text(value) => format!(" {}=\"{value}\"", attr.name),
                    AttributeValue::Boolean => format!(" {}", attr.name),
                })
                .collect();
            writeln!(out, "{prefix}<{}{attrs}>", data.tag_name)
        }
        NodeType::Text(data) => {
            let display = data.replace('\n', "\\n").replace(' ', "\u{00B7}");
            writeln!(out, "{prefix}\"{display}\"")
        }
        NodeType::Comment(data) => writeln!(out, "{prefix}<!-- {data} -->"),
        NodeType::Doctype(text) => writeln!(out, "{prefix}<!{text}>"),
    };
    for &child in tree.children(id) {
        write_node(tree, child, indent + 1, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn element(name: &str) -> Token {
        Token::StartTag {
            name: name.to_string(),
            self_closing: false,
            attributes: Vec::new(),
        }
    }

    #[test]
    fn elements_past_the_nesting_limit_are_flattened() {
        let tokens = vec![
            element("div"),
            element("span"),
            element("b"),
            element("i"),
            Token::EndOfFile,
        ];
        let (tree, diagnostics) = HtmlParser::new(tokens).with_max_depth(2).run();

        let div = tree.roots()[0];
        let span = tree.children(div)[0];
        let flattened: Vec<&str> = tree
            .children(span)
            .iter()
            .filter_map(|&id| tree.as_element(id))
            .map(|data| data.tag_name.as_str())
            .collect();
        assert_eq!(flattened, vec!["b", "i"]);
        assert!(diagnostics.has_kind(DiagnosticKind::ParseIssue));
    }

    #[test]
    fn stream_without_eof_still_closes_elements() {
        let tokens = vec![
            element("p"),
            Token::Text {
                data: "x".to_string(),
            },
        ];
        let (tree, diagnostics) = HtmlParser::new(tokens).run();
        assert_eq!(tree.roots().len(), 1);
        assert!(diagnostics.is_empty());
    }
}
