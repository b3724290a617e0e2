//! Schema-driven normalization

use pretty_assertions::assert_eq;
use serde_json::json;
use weft_editor::{
    DataConstraint, Editor, EditorConfig, EditorError, ElementRule, Location, NodeMatch, Schema,
    Target, ViolationCode,
};
use weft_model::{Element, Mark, Node, NodeObject, Text, Value};

fn image() -> Node {
    Element::new("image")
        .void()
        .with_children([Node::text("")])
        .into()
}

#[test]
fn test_invalid_child_type_empties_document() {
    let schema = Schema::new().rule(
        "quote",
        ElementRule::new().children(NodeMatch::kinds(["paragraph"])),
    );
    let value = Value::new([Node::element("quote", [image()])]);
    let mut editor = Editor::new(value).with_schema(schema);

    let repairs = editor.normalize().unwrap();

    assert!(repairs > 0);
    assert!(editor.value().children.is_empty());
}

#[test]
fn test_missing_required_data_removes_node() {
    let schema = Schema::new().rule(
        "paragraph",
        ElementRule::new().data("thing", |value| value == Some(&json!("value"))),
    );
    let value = Value::new([
        Node::element("paragraph", [Node::text("missing")]),
        Element::new("paragraph")
            .with_data("thing", json!("value"))
            .with_children([Node::text("kept")])
            .into(),
    ]);
    let mut editor = Editor::new(value).with_schema(schema);

    editor.normalize().unwrap();

    assert_eq!(editor.value().string(), "kept");
}

#[test]
fn test_custom_repair_wraps_last_child() {
    let schema = Schema::new().rule(
        "quote",
        ElementRule::new()
            .last(NodeMatch::object(NodeObject::Block))
            .normalize(|editor, violation| {
                match (violation.code, &violation.child) {
                    (ViolationCode::LastChildInvalid, Some(child)) => {
                        editor.wrap_nodes(
                            Element::new("paragraph"),
                            Some(Location::Path(child.clone())),
                            Target::LeafBlocks,
                        )?;
                        Ok(true)
                    }
                    _ => Ok(false),
                }
            }),
    );
    let value = Value::new([Node::element("quote", [Node::text("text")])]);
    let mut editor = Editor::new(value).with_schema(schema);

    editor.normalize().unwrap();

    let expected = Value::new([Node::element(
        "quote",
        [Node::element("paragraph", [Node::text("text")])],
    )]);
    assert_eq!(editor.value().children, expected.children);
}

#[test]
fn test_disallowed_marks_are_removed() {
    let schema = Schema::new().rule("paragraph", ElementRule::new().marks(["bold"]));
    let text = Text::new("styled").with_marks([Mark::new("bold"), Mark::new("italic")]);
    let value = Value::new([Node::element("paragraph", [text.into()])]);
    let mut editor = Editor::new(value).with_schema(schema);

    editor.normalize().unwrap();

    let (_, text) = editor.value().texts().next().unwrap();
    assert!(text.has_mark(&Mark::new("bold")));
    assert!(!text.has_mark(&Mark::new("italic")));
}

#[test]
fn test_core_rules_fill_and_merge() {
    let value = Value::new([
        Node::element("paragraph", Vec::<Node>::new()),
        Node::element("paragraph", [Node::text("a"), Node::text("b"), Node::text("")]),
        Node::text("stray"),
    ]);
    let mut editor = Editor::new(value);

    editor.normalize().unwrap();

    let children = &editor.value().children;
    assert_eq!(children.len(), 2);
    assert_eq!(children[0].children(), &[Node::text("")]);
    assert_eq!(children[1].children(), &[Node::text("ab")]);
}

#[test]
fn test_inline_gets_surrounding_texts() {
    let link: Node = Element::new("link")
        .inline()
        .with_children([Node::text("go")])
        .into();
    let mut editor = Editor::new(Value::new([Node::element("paragraph", [link])]));

    editor.normalize().unwrap();

    let children = editor.value().children[0].children();
    assert_eq!(children.len(), 3);
    assert_eq!(children[0], Node::text(""));
    assert!(children[1].is_inline());
    assert_eq!(children[2], Node::text(""));
}

#[test]
fn test_normalize_is_idempotent() {
    let value = Value::new([Node::element("paragraph", [Node::text("a"), Node::text("b")])]);
    let mut editor = Editor::new(value);

    assert_eq!(editor.normalize().unwrap(), 1);
    assert_eq!(editor.normalize().unwrap(), 0);
}

#[test]
fn test_normalization_is_undoable() {
    let original = Value::new([Node::element("paragraph", [Node::text("a"), Node::text("b")])]);
    let mut editor = Editor::new(original.clone());

    editor.normalize().unwrap();
    assert_eq!(editor.history().undo_description(), Some("normalize"));

    editor.without_normalizing(|editor| editor.undo()).unwrap();
    assert_eq!(editor.value().children, original.children);
}

fn stubborn_schema() -> Schema {
    Schema::new().rule(
        "quote",
        ElementRule::new().min(2).normalize(|_, _| Ok(true)),
    )
}

#[test]
fn test_unrepaired_violation_fails_in_strict_mode() {
    let config = EditorConfig {
        strict: true,
        ..EditorConfig::default()
    };
    let value = Value::new([Node::element("quote", [Node::text("one")])]);
    let mut editor = Editor::new(value)
        .with_schema(stubborn_schema())
        .with_config(config);

    let result = editor.normalize();

    assert!(matches!(
        result,
        Err(EditorError::SchemaViolationUnrepaired {
            code: ViolationCode::ChildMinInvalid,
            ..
        })
    ));
}

#[test]
fn test_unrepaired_violation_is_logged_otherwise() {
    let value = Value::new([Node::element("quote", [Node::text("one")])]);
    let mut editor = Editor::new(value.clone()).with_schema(stubborn_schema());

    assert_eq!(editor.normalize().unwrap(), 1);
    assert_eq!(editor.value().children, value.children);
}

#[test]
fn test_iteration_cap_from_config() {
    let config = EditorConfig {
        max_normalize_iterations: Some(1),
        strict: true,
        ..EditorConfig::default()
    };
    let value = Value::new([
        Node::element("paragraph", [Node::text("a"), Node::text("b"), Node::text("c")]),
    ]);
    let mut editor = Editor::new(value).with_config(config);

    assert!(matches!(
        editor.normalize(),
        Err(EditorError::SchemaViolationUnrepaired { iterations: 1, .. })
    ));
}

#[test]
fn test_json_schema_constraints() {
    let schema = Schema::from_json(
        r#"{ "elements": { "heading": { "data": { "level": { "rule": "oneOf", "values": [1, 2] } } } } }"#,
    )
    .unwrap();
    let value = Value::new([
        Element::new("heading")
            .with_data("level", json!(1))
            .with_children([Node::text("ok")])
            .into(),
        Element::new("heading")
            .with_data("level", json!(9))
            .with_children([Node::text("bad")])
            .into(),
    ]);
    let mut editor = Editor::new(value).with_schema(schema);

    editor.normalize().unwrap();

    assert_eq!(editor.value().string(), "ok");
    let required = DataConstraint::Required.validator();
    assert!(!required(None), "required rejects a missing key");
}
