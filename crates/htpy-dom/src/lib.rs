//! Document tree for the htpy converter.
//!
//! The parser produces a forest, not a single `<html>` document: pasted
//! markup is frequently a handful of sibling elements. The forest hangs off
//! a synthetic [`NodeType::Document`] node at [`NodeId::ROOT`].
//!
//! # Design
//!
//! The tree uses arena allocation with [`NodeId`] indices for all relationships,
//! so the tree builder can keep a stack of open elements without fighting the
//! borrow checker. A tree is built once per parse and treated as immutable
//! afterwards.

use serde::ser::{Serialize, SerializeStruct, Serializer};

/// [§ 13.1.2 Elements](https://html.spec.whatwg.org/multipage/syntax.html#void-elements)
///
/// "Void elements: area, base, br, col, embed, hr, img, input, link, meta,
/// source, track, wbr". `param` and `keygen` are obsolete but still show up
/// in pasted markup.
pub const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "keygen", "link", "meta", "param",
    "source", "track", "wbr",
];

/// Returns true if `tag_name` (already lower-cased) is a void element.
#[must_use]
pub fn is_void_element(tag_name: &str) -> bool {
    VOID_ELEMENTS.contains(&tag_name)
}

/// A type-safe index into the document tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

impl NodeId {
    /// The synthetic document node is always at index 0.
    pub const ROOT: Self = Self(0);
}

/// The value of an attribute as written in the source.
///
/// `<input disabled>` and `<input value="">` are different things and stay
/// different all the way to the generated code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeValue {
    /// `name="value"`, `name='value'` or `name=value`, with character
    /// references decoded.
    Text(String),
    /// `name` with no `=` at all.
    Boolean,
}

impl AttributeValue {
    /// The text of the value, or `None` for a boolean attribute.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Boolean => None,
        }
    }
}

impl Serialize for AttributeValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Text(text) => serializer.serialize_str(text),
            Self::Boolean => serializer.serialize_bool(true),
        }
    }
}

/// One attribute of an element. Source order is significant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// Lower-cased attribute name.
    pub name: String,
    /// Decoded value.
    pub value: AttributeValue,
}

impl Attribute {
    /// Attribute with a text value.
    #[must_use]
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: AttributeValue::Text(value.into()),
        }
    }

    /// Attribute present without a value.
    #[must_use]
    pub fn boolean(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: AttributeValue::Boolean,
        }
    }
}

impl Serialize for Attribute {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Attribute", 2)?;
        state.serialize_field("name", &self.name)?;
        state.serialize_field("value", &self.value)?;
        state.end()
    }
}

/// Element-specific data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementData {
    /// Lower-cased tag name.
    pub tag_name: String,
    /// Attributes in source order, without duplicates.
    pub attrs: Vec<Attribute>,
}

impl ElementData {
    /// Create element data from a tag name and attribute list.
    #[must_use]
    pub fn new(tag_name: impl Into<String>, attrs: Vec<Attribute>) -> Self {
        Self {
            tag_name: tag_name.into(),
            attrs,
        }
    }

    /// Look up an attribute by name.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&AttributeValue> {
        self.attrs
            .iter()
            .find(|attr| attr.name == name)
            .map(|attr| &attr.value)
    }

    /// The `id` attribute, if present with a value.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.attribute("id").and_then(AttributeValue::as_text)
    }

    /// Class names from the `class` attribute, in source order.
    ///
    /// "The class attribute, if specified, must have a value that is a set
    /// of space-separated tokens."
    #[must_use]
    pub fn classes(&self) -> Vec<&str> {
        self.attribute("class")
            .and_then(AttributeValue::as_text)
            .map(|classes| classes.split_ascii_whitespace().collect())
            .unwrap_or_default()
    }

    /// True for void elements, which never have children.
    #[must_use]
    pub fn is_void(&self) -> bool {
        is_void_element(&self.tag_name)
    }
}

/// What kind of node this is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeType {
    /// The synthetic root that owns the parsed forest.
    Document,
    /// An element with attributes and (unless void) children.
    Element(ElementData),
    /// Character data, exactly as it appeared after reference decoding.
    Text(String),
    /// The body of `<!-- ... -->`.
    Comment(String),
    /// The declaration text between `<!` and `>`, e.g. `DOCTYPE html`.
    /// Only ever a child of the document node.
    Doctype(String),
}

/// A node in the arena.
#[derive(Debug, Clone)]
pub struct Node {
    /// The node payload.
    pub node_type: NodeType,
    /// Parent node, `None` for the document and for detached nodes.
    pub parent: Option<NodeId>,
    /// Children in document order.
    pub children: Vec<NodeId>,
}

/// Arena-based document tree.
///
/// All nodes live in one vector and refer to each other by [`NodeId`].
/// The document node is always at index 0 ([`NodeId::ROOT`]) and its
/// children are the roots of the parsed forest.
#[derive(Debug, Clone)]
pub struct DocumentTree {
    nodes: Vec<Node>,
}

impl DocumentTree {
    /// Create a tree holding only the document node.
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                node_type: NodeType::Document,
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    /// The document node.
    #[must_use]
    pub const fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Top-level nodes of the parsed forest, in source order.
    #[must_use]
    pub fn roots(&self) -> &[NodeId] {
        self.children(NodeId::ROOT)
    }

    /// Get a node by its ID.
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    /// Allocate a new, detached node and return its ID.
    pub fn alloc(&mut self, node_type: NodeType) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            node_type,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    /// Append `child` as the last child of `parent`.
    ///
    /// Void elements never receive children; appending to one is ignored.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        if self.as_element(parent).is_some_and(ElementData::is_void) {
            return;
        }
        let (Some(_), Some(_)) = (self.nodes.get(parent.0), self.nodes.get(child.0)) else {
            return;
        };
        self.nodes[parent.0].children.push(child);
        self.nodes[child.0].parent = Some(parent);
    }

    /// Get the parent of a node.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.parent)
    }

    /// Get all children of a node.
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map_or(&[], |n| n.children.as_slice())
    }

    /// Get the node type of a node.
    #[must_use]
    pub fn node_type(&self, id: NodeId) -> Option<&NodeType> {
        self.get(id).map(|n| &n.node_type)
    }

    /// Get element data if this node is an element.
    #[must_use]
    pub fn as_element(&self, id: NodeId) -> Option<&ElementData> {
        match self.node_type(id) {
            Some(NodeType::Element(data)) => Some(data),
            _ => None,
        }
    }

    /// Get text content if this node is a text node.
    #[must_use]
    pub fn as_text(&self, id: NodeId) -> Option<&str> {
        match self.node_type(id) {
            Some(NodeType::Text(s)) => Some(s),
            _ => None,
        }
    }

    /// Iterate over all ancestors of a node, from parent to document.
    #[must_use]
    pub fn ancestors(&self, id: NodeId) -> AncestorIterator<'_> {
        AncestorIterator {
            tree: self,
            current: self.parent(id),
        }
    }

    /// Concatenated text of a node and its descendants.
    #[must_use]
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        match self.node_type(id) {
            Some(NodeType::Text(data)) => out.push_str(data),
            Some(NodeType::Element(_) | NodeType::Document) => {
                for &child in self.children(id) {
                    self.collect_text(child, out);
                }
            }
            _ => {}
        }
    }

    /// A serializable view of the subtree under `id`.
    #[must_use]
    pub const fn view(&self, id: NodeId) -> NodeView<'_> {
        NodeView { tree: self, id }
    }

    /// Serializable views of the forest roots.
    #[must_use]
    pub fn forest(&self) -> Vec<NodeView<'_>> {
        self.roots().iter().map(|&id| self.view(id)).collect()
    }
}

impl Default for DocumentTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over ancestors of a node.
pub struct AncestorIterator<'a> {
    tree: &'a DocumentTree,
    current: Option<NodeId>,
}

impl Iterator for AncestorIterator<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        self.current = self.tree.parent(id);
        Some(id)
    }
}

/// Borrowed subtree that serializes as nested JSON objects.
///
/// `{"type": "element", "tag": "p", "attributes": [...], "children": [...]}`
#[derive(Clone, Copy)]
pub struct NodeView<'a> {
    tree: &'a DocumentTree,
    id: NodeId,
}

impl Serialize for NodeView<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let children: Vec<NodeView<'_>> = self
            .tree
            .children(self.id)
            .iter()
            .map(|&id| self.tree.view(id))
            .collect();
        match self.tree.node_type(self.id) {
            Some(NodeType::Element(data)) => {
                let mut state = serializer.serialize_struct("Element", 4)?;
                state.serialize_field("type", "element")?;
                state.serialize_field("tag", &data.tag_name)?;
                state.serialize_field("attributes", &data.attrs)?;
                state.serialize_field("children", &children)?;
                state.end()
            }
            Some(NodeType::Text(data)) => leaf(serializer, "text", data),
            Some(NodeType::Comment(data)) => leaf(serializer, "comment", data),
            Some(NodeType::Doctype(data)) => leaf(serializer, "doctype", data),
            Some(NodeType::Document) | None => {
                let mut state = serializer.serialize_struct("Document", 2)?;
                state.serialize_field("type", "document")?;
                state.serialize_field("children", &children)?;
                state.end()
            }
        }
    }
}

fn leaf<S: Serializer>(serializer: S, kind: &'static str, data: &str) -> Result<S::Ok, S::Error> {
    let mut state = serializer.serialize_struct("Leaf", 2)?;
    state.serialize_field("type", kind)?;
    state.serialize_field("data", data)?;
    state.end()
}
