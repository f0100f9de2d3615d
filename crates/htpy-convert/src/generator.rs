//! DSL call tree to Python source.
//!
//! Rendering goes through [`IndentedNode`], a `Display` wrapper that knows
//! its nesting depth, so the whole output is produced by one pass of
//! `write!` calls into a single buffer.

use std::collections::BTreeSet;
use std::fmt::{self, Display, Formatter, Write as _};

use strum_macros::{Display as StrumDisplay, EnumString};

use crate::literal::python_string;
use crate::mapper::{DslCall, DslNode, DslValue, TagName};

/// Spaces per nesting level.
pub const INDENT_WIDTH: usize = 4;

/// Name of the generic element constructor used for fallback tags.
const ELEMENT_CONSTRUCTOR: &str = "Element";

/// Name of the comment constructor.
const COMMENT_CONSTRUCTOR: &str = "comment";

/// Name of the unescaped-markup wrapper.
const MARKUP_CONSTRUCTOR: &str = "Markup";

/// Which import statements precede the generated expressions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, EnumString, StrumDisplay)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ImportMode {
    /// Bare expressions, no header.
    #[default]
    None,
    /// `from htpy import div, p` listing every name used.
    Names,
    /// `import htpy as h`, with every call written `h.div`.
    Module,
}

/// Render `nodes` as Python source.
///
/// Each root becomes its own top-level expression. Non-empty output ends
/// with exactly one newline.
#[must_use]
pub fn generate(nodes: &[DslNode], imports: ImportMode) -> String {
    if nodes.is_empty() {
        return String::new();
    }
    let prefix = match imports {
        ImportMode::Module => "h.",
        ImportMode::None | ImportMode::Names => "",
    };

    let mut out = import_header(nodes, imports);
    for node in nodes {
        // Writing to a String cannot fail.
        let _ = writeln!(
            out,
            "{}",
            IndentedNode {
                indent: 0,
                node,
                prefix,
            }
        );
    }
    out
}

/// Every name the generated code refers to, sorted.
#[must_use]
pub fn used_names(nodes: &[DslNode]) -> BTreeSet<&str> {
    let mut names = BTreeSet::new();
    collect_names(nodes, &mut names);
    names
}

fn collect_names<'a>(nodes: &'a [DslNode], names: &mut BTreeSet<&'a str>) {
    for node in nodes {
        match node {
            DslNode::Call(call) => {
                let _ = match &call.tag {
                    TagName::Identifier(name) => names.insert(name.as_str()),
                    TagName::Fallback(_) => names.insert(ELEMENT_CONSTRUCTOR),
                };
                collect_names(&call.children, names);
            }
            DslNode::Comment(_) => {
                let _ = names.insert(COMMENT_CONSTRUCTOR);
            }
            DslNode::Raw(_) => {
                let _ = names.insert(MARKUP_CONSTRUCTOR);
            }
            DslNode::Text(_) => {}
        }
    }
}

/// The import block, including the blank line that separates it from code.
fn import_header(nodes: &[DslNode], imports: ImportMode) -> String {
    let names = used_names(nodes);
    let uses_markup = names.contains(MARKUP_CONSTRUCTOR);
    let mut header = String::new();
    match imports {
        ImportMode::None => return header,
        ImportMode::Names => {
            let htpy_names: Vec<&str> = names
                .iter()
                .copied()
                .filter(|&name| name != MARKUP_CONSTRUCTOR)
                .collect();
            if !htpy_names.is_empty() {
                header.push_str("from htpy import ");
                header.push_str(&htpy_names.join(", "));
                header.push('\n');
            }
        }
        ImportMode::Module => header.push_str("import htpy as h\n"),
    }
    // Markup lives in markupsafe, not in htpy.
    if uses_markup {
        header.push_str("from markupsafe import Markup\n");
    }
    header.push('\n');
    header
}

/// A node together with its nesting depth.
struct IndentedNode<'a> {
    indent: usize,
    node: &'a DslNode,
    /// Module qualifier for htpy names (`h.` or empty).
    prefix: &'a str,
}

impl IndentedNode<'_> {
    fn child<'b>(&'b self, node: &'b DslNode) -> IndentedNode<'b> {
        IndentedNode {
            indent: self.indent + 1,
            node,
            prefix: self.prefix,
        }
    }

    fn write_call(&self, f: &mut Formatter<'_>, call: &DslCall) -> fmt::Result {
        match &call.tag {
            TagName::Identifier(name) => write!(f, "{}{name}", self.prefix)?,
            TagName::Fallback(name) => write!(
                f,
                "{}{ELEMENT_CONSTRUCTOR}({}, {{}}, [])",
                self.prefix,
                python_string(name)
            )?,
        }

        let arguments = call_arguments(call);
        if !arguments.is_empty() {
            write!(f, "({})", arguments.join(", "))?;
        }

        if call.void || call.children.is_empty() {
            return Ok(());
        }
        if let [only] = call.children.as_slice()
            && !matches!(only, DslNode::Call(_))
        {
            return write!(f, "[{}]", self.child(only).inline());
        }

        writeln!(f, "[")?;
        for child in &call.children {
            writeln!(f, "{},", self.child(child))?;
        }
        write_indent(f, self.indent)?;
        write!(f, "]")
    }

    /// The same node without leading indentation.
    const fn inline(&self) -> Self {
        IndentedNode {
            indent: 0,
            node: self.node,
            prefix: self.prefix,
        }
    }
}

impl Display for IndentedNode<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write_indent(f, self.indent)?;
        match self.node {
            DslNode::Call(call) => self.write_call(f, call),
            DslNode::Text(text) => write!(f, "{}", python_string(&text.0)),
            DslNode::Comment(comment) => write!(
                f,
                "{}{COMMENT_CONSTRUCTOR}({})",
                self.prefix,
                python_string(&comment.0)
            ),
            DslNode::Raw(raw) => write!(f, "{MARKUP_CONSTRUCTOR}({})", python_string(&raw.0)),
        }
    }
}

/// Positional and keyword arguments of a call, in order: selector,
/// attribute dictionary, keywords.
fn call_arguments(call: &DslCall) -> Vec<String> {
    let mut arguments = Vec::new();
    if let Some(selector) = &call.selector {
        arguments.push(python_string(selector));
    }

    let entries: Vec<String> = call
        .quoted_attributes()
        .map(|(name, value)| format!("{}: {}", python_string(name), python_value(value)))
        .collect();
    if !entries.is_empty() {
        arguments.push(format!("{{{}}}", entries.join(", ")));
    }

    arguments.extend(
        call.keyword_attributes()
            .map(|(name, value)| format!("{name}={}", python_value(value))),
    );
    arguments
}

fn python_value(value: &DslValue) -> String {
    match value {
        DslValue::Text(text) => python_string(text),
        DslValue::True => "True".to_string(),
    }
}

fn write_indent(f: &mut impl fmt::Write, indent_level: usize) -> fmt::Result {
    for _ in 0..indent_level * INDENT_WIDTH {
        f.write_char(' ')?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapper::{AttributeName, CommentLiteral, DslAttribute, RawLiteral, TextLiteral};

    fn call(tag: &str, children: Vec<DslNode>) -> DslCall {
        DslCall {
            tag: TagName::Identifier(tag.to_string()),
            selector: None,
            attributes: Vec::new(),
            children,
            void: false,
        }
    }

    fn text(value: &str) -> DslNode {
        DslNode::Text(TextLiteral(value.to_string()))
    }

    #[test]
    fn empty_forest_is_empty_source() {
        assert_eq!(generate(&[], ImportMode::Names), "");
    }

    #[test]
    fn single_literal_child_is_inline() {
        let node = DslNode::Call(call("p", vec![text("Hi")]));
        assert_eq!(generate(&[node], ImportMode::None), "p[\"Hi\"]\n");
    }

    #[test]
    fn nested_children_are_indented() {
        let inner = DslNode::Call(call("li", vec![text("One")]));
        let outer = DslNode::Call(call("ul", vec![inner]));
        let body = DslNode::Call(call("body", vec![outer, text("tail")]));
        assert_eq!(
            generate(&[body], ImportMode::None),
            "body[\n    ul[\n        li[\"One\"],\n    ],\n    \"tail\",\n]\n"
        );
    }

    #[test]
    fn arguments_order_selector_dict_keywords() {
        let mut node = call("button", Vec::new());
        node.selector = Some(".btn".to_string());
        node.attributes = vec![
            DslAttribute {
                name: AttributeName::Keyword("type".to_string()),
                value: DslValue::Text("submit".to_string()),
            },
            DslAttribute {
                name: AttributeName::Quoted("@click".to_string()),
                value: DslValue::Text("go()".to_string()),
            },
            DslAttribute {
                name: AttributeName::Keyword("disabled".to_string()),
                value: DslValue::True,
            },
        ];
        assert_eq!(
            generate(&[DslNode::Call(node)], ImportMode::None),
            "button(\".btn\", {\"@click\": \"go()\"}, type=\"submit\", disabled=True)\n"
        );
    }

    #[test]
    fn void_call_has_no_children_block() {
        let mut node = call("br", Vec::new());
        node.void = true;
        assert_eq!(generate(&[DslNode::Call(node)], ImportMode::None), "br\n");
    }

    #[test]
    fn fallback_tag_uses_element_constructor() {
        let mut node = call("x", vec![text("y")]);
        node.tag = TagName::Fallback("x:foo".to_string());
        assert_eq!(
            generate(&[DslNode::Call(node)], ImportMode::None),
            "Element(\"x:foo\", {}, [])[\"y\"]\n"
        );
    }

    #[test]
    fn names_header_lists_everything_used() {
        let nodes = vec![
            DslNode::Call(call(
                "div",
                vec![
                    DslNode::Comment(CommentLiteral(" note ".to_string())),
                    DslNode::Call(call("script", vec![DslNode::Raw(RawLiteral("x < 1".to_string()))])),
                ],
            )),
            DslNode::Call(call("a", Vec::new())),
        ];
        let source = generate(&nodes, ImportMode::Names);
        assert!(source.starts_with(
            "from htpy import a, comment, div, script\nfrom markupsafe import Markup\n\n"
        ));
        assert!(source.contains("comment(\" note \")"));
        assert!(source.contains("script[Markup(\"x < 1\")]"));
    }

    #[test]
    fn module_header_qualifies_calls() {
        let nodes = vec![DslNode::Call(call(
            "div",
            vec![DslNode::Comment(CommentLiteral("c".to_string())), text("t")],
        ))];
        assert_eq!(
            generate(&nodes, ImportMode::Module),
            "import htpy as h\n\nh.div[\n    h.comment(\"c\"),\n    \"t\",\n]\n"
        );
    }

    #[test]
    fn import_mode_parses_case_insensitively() {
        assert_eq!("Names".parse::<ImportMode>(), Ok(ImportMode::Names));
        assert_eq!("module".parse::<ImportMode>(), Ok(ImportMode::Module));
        assert_eq!(ImportMode::None.to_string(), "none");
        assert!("everything".parse::<ImportMode>().is_err());
    }
}
