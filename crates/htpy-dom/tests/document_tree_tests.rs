//! Tests for the arena document tree.

use htpy_dom::{Attribute, AttributeValue, DocumentTree, ElementData, NodeId, NodeType};

/// Helper to create an element node and return its NodeId.
fn alloc_element(tree: &mut DocumentTree, tag: &str) -> NodeId {
    tree.alloc(NodeType::Element(ElementData::new(tag, Vec::new())))
}

#[test]
fn test_forest_roots_keep_source_order() {
    let mut tree = DocumentTree::new();
    let first = alloc_element(&mut tree, "p");
    let second = alloc_element(&mut tree, "p");
    tree.append_child(NodeId::ROOT, first);
    tree.append_child(NodeId::ROOT, second);

    assert_eq!(tree.roots(), &[first, second]);
    assert_eq!(tree.parent(second), Some(NodeId::ROOT));
}

#[test]
fn test_void_element_refuses_children() {
    let mut tree = DocumentTree::new();
    let br = alloc_element(&mut tree, "br");
    tree.append_child(NodeId::ROOT, br);
    let text = tree.alloc(NodeType::Text("oops".to_string()));
    tree.append_child(br, text);

    assert!(tree.children(br).is_empty());
    assert_eq!(tree.parent(text), None);
}

#[test]
fn test_classes_in_source_order() {
    let data = ElementData::new(
        "div",
        vec![
            Attribute::text("class", "  b   a\tc "),
            Attribute::text("id", "main"),
        ],
    );
    assert_eq!(data.classes(), ["b", "a", "c"]);
    assert_eq!(data.id(), Some("main"));
}

#[test]
fn test_boolean_attribute_is_distinct_from_empty() {
    let data = ElementData::new(
        "input",
        vec![Attribute::boolean("disabled"), Attribute::text("value", "")],
    );
    assert_eq!(data.attribute("disabled"), Some(&AttributeValue::Boolean));
    assert_eq!(
        data.attribute("value"),
        Some(&AttributeValue::Text(String::new()))
    );
    assert!(data.attribute("missing").is_none());
}

#[test]
fn test_ancestors_and_text_content() {
    let mut tree = DocumentTree::new();
    let div = alloc_element(&mut tree, "div");
    let span = alloc_element(&mut tree, "span");
    let hello = tree.alloc(NodeType::Text("Hello ".to_string()));
    let world = tree.alloc(NodeType::Text("world".to_string()));
    tree.append_child(NodeId::ROOT, div);
    tree.append_child(div, hello);
    tree.append_child(div, span);
    tree.append_child(span, world);

    let ancestors: Vec<_> = tree.ancestors(world).collect();
    assert_eq!(ancestors, [span, div, NodeId::ROOT]);
    assert_eq!(tree.text_content(div), "Hello world");
}

#[test]
fn test_forest_serializes_as_nested_json() {
    let mut tree = DocumentTree::new();
    let input = tree.alloc(NodeType::Element(ElementData::new(
        "input",
        vec![Attribute::boolean("checked"), Attribute::text("name", "x")],
    )));
    let comment = tree.alloc(NodeType::Comment(" note ".to_string()));
    tree.append_child(NodeId::ROOT, input);
    tree.append_child(NodeId::ROOT, comment);

    let json = serde_json::to_value(tree.forest()).unwrap();
    assert_eq!(
        json,
        serde_json::json!([
            {
                "type": "element",
                "tag": "input",
                "attributes": [
                    {"name": "checked", "value": true},
                    {"name": "name", "value": "x"}
                ],
                "children": []
            },
            {"type": "comment", "data": " note "}
        ])
    );
}
