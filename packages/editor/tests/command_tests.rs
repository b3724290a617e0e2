//! Command behaviour on small documents

use pretty_assertions::assert_eq;
use weft_editor::{Editor, NodePatch, Schema, SplitHeight, Target, Unit};
use weft_model::{Annotation, Element, Location, Mark, Node, Path, Point, Range, Value};

fn paragraph(text: &str) -> Node {
    Node::element("paragraph", [Node::text(text)])
}

fn image() -> Node {
    Element::new("image")
        .void()
        .with_children([Node::text("")])
        .into()
}

fn link(text: &str) -> Node {
    Element::new("link")
        .inline()
        .with_children([Node::text(text)])
        .into()
}

fn point<const N: usize>(path: [usize; N], offset: usize) -> Point {
    Point::new(path, offset)
}

fn caret<const N: usize>(path: [usize; N], offset: usize) -> Range {
    Range::collapsed(point(path, offset))
}

fn strings(editor: &Editor) -> Vec<String> {
    editor
        .value()
        .children
        .iter()
        .map(|node| node.string())
        .collect()
}

#[test]
fn test_delete_across_blocks_joins_them() {
    let mut editor = Editor::new(Value::new([paragraph("one"), paragraph("two")]));
    editor
        .select(Range::new(point([0, 0], 1), point([1, 0], 1)))
        .unwrap();

    editor.delete_backward(Unit::Character).unwrap();

    assert_eq!(strings(&editor), vec!["owo"]);
    assert_eq!(editor.selection(), Some(&caret([0, 0], 1)));
}

#[test]
fn test_delete_backward_character() {
    let mut editor = Editor::new(Value::new([paragraph("word")]));
    editor.select(point([0, 0], 4)).unwrap();

    editor.delete_backward(Unit::Character).unwrap();

    assert_eq!(strings(&editor), vec!["wor"]);
    assert_eq!(editor.selection(), Some(&caret([0, 0], 3)));
}

#[test]
fn test_delete_backward_at_block_start_merges() {
    let mut editor = Editor::new(Value::new([paragraph("one"), paragraph("two")]));
    editor.select(point([1, 0], 0)).unwrap();

    editor.delete_backward(Unit::Character).unwrap();

    assert_eq!(strings(&editor), vec!["onetwo"]);
    assert_eq!(editor.selection(), Some(&caret([0, 0], 3)));
}

#[test]
fn test_delete_word_forward() {
    let mut editor = Editor::new(Value::new([paragraph("one two")]));
    editor.select(point([0, 0], 0)).unwrap();

    editor.delete_forward(Unit::Word).unwrap();

    assert_eq!(strings(&editor), vec![" two"]);
}

#[test]
fn test_delete_at_document_start_is_noop() {
    let mut editor = Editor::new(Value::new([paragraph("one")]));
    editor.select(point([0, 0], 0)).unwrap();

    editor.delete_backward(Unit::Character).unwrap();

    assert_eq!(strings(&editor), vec!["one"]);
    assert!(!editor.can_undo());
}

#[test]
fn test_insert_text_moves_caret() {
    let mut editor = Editor::new(Value::new([paragraph("wrd")]));
    editor.select(point([0, 0], 1)).unwrap();

    editor.insert_text("o", None).unwrap();

    assert_eq!(strings(&editor), vec!["word"]);
    assert_eq!(editor.selection(), Some(&caret([0, 0], 2)));
}

#[test]
fn test_insert_text_replaces_expanded_selection() {
    let mut editor = Editor::new(Value::new([paragraph("one"), paragraph("two")]));
    editor
        .select(Range::new(point([0, 0], 2), point([1, 0], 1)))
        .unwrap();

    editor.insert_text("X", None).unwrap();

    assert_eq!(strings(&editor), vec!["onXwo"]);
    assert_eq!(editor.selection(), Some(&caret([0, 0], 3)));
}

#[test]
fn test_insert_text_removes_atomic_annotation() {
    let mention = Annotation::new("mention", Range::new(point([0, 0], 1), point([0, 0], 3)));
    let comment = Annotation::new("comment", Range::new(point([0, 0], 1), point([0, 0], 3)));
    let value = Value::new([paragraph("word")])
        .with_annotation("m", mention)
        .with_annotation("c", comment);
    let mut editor = Editor::new(value).with_schema(Schema::new().atomic_annotation("mention"));
    editor.select(point([0, 0], 2)).unwrap();

    editor.insert_text("X", None).unwrap();

    assert_eq!(strings(&editor), vec!["woXrd"]);
    let annotations = &editor.value().annotations;
    assert!(!annotations.contains_key("m"));
    assert_eq!(
        annotations["c"].range(),
        Range::new(point([0, 0], 1), point([0, 0], 4))
    );
}

#[test]
fn test_insert_text_inside_fully_covered_atomic_annotation() {
    let mention = Annotation::new("mention", Range::new(point([0, 0], 0), point([0, 0], 4)));
    let value = Value::new([paragraph("word")]).with_annotation("m", mention);
    let mut editor = Editor::new(value).with_schema(Schema::new().atomic_annotation("mention"));

    editor
        .insert_text("X", Some(Location::Point(point([0, 0], 2))))
        .unwrap();

    assert_eq!(strings(&editor), vec!["woXrd"]);
    assert!(editor.value().annotations.is_empty());
}

#[test]
fn test_split_nodes_at_root_path_is_an_error() {
    let mut editor = Editor::new(Value::new([paragraph("one")]));

    let result = editor.split_nodes(Some(Location::Path(Path::root())), SplitHeight::Block);

    assert!(result.is_err());
    assert_eq!(strings(&editor), vec!["one"]);
}

#[test]
fn test_insert_text_inside_void_is_ignored() {
    let mut editor = Editor::new(Value::new([paragraph("one"), image()]));
    editor.select(point([1, 0], 0)).unwrap();

    editor.insert_text("x", None).unwrap();

    assert_eq!(strings(&editor), vec!["one", ""]);
}

#[test]
fn test_delete_inside_void_removes_it() {
    let mut editor = Editor::new(Value::new([paragraph("one"), image(), paragraph("two")]));
    editor.select(point([1, 0], 0)).unwrap();

    editor.delete_backward(Unit::Character).unwrap();

    assert_eq!(strings(&editor), vec!["one", "two"]);
    assert!(editor.value().children.iter().all(|node| !node.is_void()));
}

#[test]
fn test_delete_forward_from_empty_block_lands_in_void() {
    let mut editor = Editor::new(Value::new([paragraph(""), image(), paragraph("after")]));
    editor.select(point([0, 0], 0)).unwrap();

    editor.delete_forward(Unit::Character).unwrap();

    assert_eq!(editor.value().children.len(), 2);
    assert!(editor.value().children[0].is_void());
    assert_eq!(editor.selection(), Some(&caret([0, 0], 0)));
}

#[test]
fn test_delete_lone_void_empties_document() {
    let mut editor = Editor::new(Value::new([image()]));
    editor.select(point([0, 0], 0)).unwrap();

    editor.delete_backward(Unit::Character).unwrap();

    assert!(editor.value().children.is_empty());
    assert_eq!(editor.selection(), None);
}

#[test]
fn test_delete_inside_inline_keeps_empty_inline() {
    let block = Node::element("paragraph", [Node::text("a"), link("bc"), Node::text("d")]);
    let mut editor = Editor::new(Value::new([block]));
    editor
        .select(Range::new(point([0, 1, 0], 0), point([0, 1, 0], 2)))
        .unwrap();

    editor.delete_backward(Unit::Character).unwrap();

    let children = editor.value().children[0].children();
    assert_eq!(children.len(), 3);
    assert!(children[1].is_inline());
    assert_eq!(children[1].string(), "");
}

#[test]
fn test_split_block_moves_caret_into_second_half() {
    let mut editor = Editor::new(Value::new([paragraph("word")]));
    editor.select(point([0, 0], 2)).unwrap();

    editor.split_nodes(None, SplitHeight::Block).unwrap();

    assert_eq!(strings(&editor), vec!["wo", "rd"]);
    assert_eq!(editor.selection(), Some(&caret([1, 0], 0)));
}

#[test]
fn test_merge_nodes_at_path() {
    let mut editor = Editor::new(Value::new([paragraph("one"), paragraph("two")]));

    editor
        .merge_nodes(Some(Location::Path(Path::from([1]))))
        .unwrap();

    assert_eq!(strings(&editor), vec!["onetwo"]);
    assert_eq!(editor.value().children[0].children().len(), 1);
}

#[test]
fn test_move_block_carries_selection() {
    let mut editor = Editor::new(Value::new([paragraph("one"), paragraph("two")]));
    editor.select(point([0, 0], 1)).unwrap();

    editor
        .move_nodes(None, Target::Depth(1), Path::from([1]))
        .unwrap();

    assert_eq!(strings(&editor), vec!["two", "one"]);
    assert_eq!(editor.selection(), Some(&caret([1, 0], 1)));
}

#[test]
fn test_set_nodes_ignores_hanging_block() {
    let mut editor = Editor::new(Value::new([paragraph("one"), paragraph("two")]));
    editor
        .select(Range::new(point([0, 0], 0), point([1, 0], 0)))
        .unwrap();

    editor
        .set_nodes(NodePatch::new().kind("heading"), None, Target::LeafBlocks)
        .unwrap();

    let kinds: Vec<_> = editor
        .value()
        .children
        .iter()
        .map(|node| node.kind().unwrap_or_default())
        .collect();
    assert_eq!(kinds, vec!["heading", "paragraph"]);
}

#[test]
fn test_set_nodes_patches_data() {
    let mut editor = Editor::new(Value::new([paragraph("one")]));
    editor.select(point([0, 0], 0)).unwrap();

    editor
        .set_nodes(
            NodePatch::new().data("align", serde_json::json!("center")),
            None,
            Target::LeafBlocks,
        )
        .unwrap();

    let element = editor.value().element(&Path::from([0])).unwrap();
    assert_eq!(element.data["align"], serde_json::json!("center"));
}

#[test]
fn test_wrap_and_unwrap_blocks() {
    let original = Value::new([paragraph("a"), paragraph("b"), paragraph("c")]);
    let mut editor = Editor::new(original.clone());
    editor
        .select(Range::new(point([0, 0], 0), point([1, 0], 1)))
        .unwrap();

    editor
        .wrap_nodes(Element::new("quote"), None, Target::LeafBlocks)
        .unwrap();

    let children = &editor.value().children;
    assert_eq!(children.len(), 2);
    assert_eq!(children[0].kind(), Some("quote"));
    assert_eq!(children[0].string(), "ab");

    editor
        .unwrap_nodes("quote", Some(Location::Path(Path::from([0]))))
        .unwrap();

    assert_eq!(editor.value().children, original.children);
}

#[test]
fn test_wrap_inline_around_range() {
    let mut editor = Editor::new(Value::new([paragraph("hello world")]));
    editor
        .select(Range::new(point([0, 0], 6), point([0, 0], 11)))
        .unwrap();

    editor
        .wrap_nodes(Element::new("link").inline(), None, Target::Inlines)
        .unwrap();

    let children = editor.value().children[0].children();
    assert_eq!(editor.value().string(), "hello world");
    assert_eq!(children[0].string(), "hello ");
    assert!(children[1].is_inline());
    assert_eq!(children[1].string(), "world");
}

#[test]
fn test_insert_fragment_splits_block() {
    let mut editor = Editor::new(Value::new([paragraph("word")]));
    editor.select(point([0, 0], 2)).unwrap();

    editor
        .insert_fragment(vec![paragraph("A"), paragraph("B")], None)
        .unwrap();

    assert_eq!(strings(&editor), vec!["wo", "A", "B", "rd"]);
    assert_eq!(editor.selection(), Some(&caret([2, 0], 1)));
}

#[test]
fn test_insert_nodes_at_path() {
    let mut editor = Editor::new(Value::new([paragraph("one"), paragraph("two")]));

    editor
        .insert_nodes(vec![paragraph("mid")], Some(Location::Path(Path::from([1]))))
        .unwrap();

    assert_eq!(strings(&editor), vec!["one", "mid", "two"]);
}

#[test]
fn test_remove_nodes_under_selection() {
    let mut editor = Editor::new(Value::new([paragraph("a"), paragraph("b"), paragraph("c")]));
    editor
        .select(Range::new(point([0, 0], 0), point([1, 0], 1)))
        .unwrap();

    editor.remove_nodes(None, Target::LeafBlocks).unwrap();

    assert_eq!(strings(&editor), vec!["c"]);
}

#[test]
fn test_toggle_mark_across_inline() {
    let block = Node::element("paragraph", [Node::text("one"), link("two"), Node::text("three")]);
    let mut editor = Editor::new(Value::new([block]));
    editor
        .select(Range::new(point([0, 0], 1), point([0, 2], 2)))
        .unwrap();
    let bold = Mark::new("bold");

    editor.toggle_mark(bold.clone(), None).unwrap();

    let marked: Vec<String> = editor
        .value()
        .texts()
        .filter(|(_, text)| text.has_mark(&bold))
        .map(|(_, text)| text.text.clone())
        .collect();
    assert_eq!(marked, vec!["ne", "two", "th"]);
    assert_eq!(editor.value().string(), "onetwothree");

    editor.toggle_mark(bold.clone(), None).unwrap();

    assert!(editor.value().texts().all(|(_, text)| !text.has_mark(&bold)));
    assert_eq!(editor.value().children[0].children().len(), 3);
}

#[test]
fn test_marks_on_collapsed_selection_are_ignored() {
    let mut editor = Editor::new(Value::new([paragraph("one")]));
    editor.select(point([0, 0], 1)).unwrap();

    editor.add_mark(Mark::new("bold"), None).unwrap();

    assert!(editor.value().texts().all(|(_, text)| text.marks.is_empty()));
}

#[test]
fn test_commands_without_selection_do_nothing() {
    let mut editor = Editor::new(Value::new([paragraph("one")]));

    editor.insert_text("x", None).unwrap();
    editor.delete_backward(Unit::Character).unwrap();
    editor.split_nodes(None, SplitHeight::Block).unwrap();

    assert_eq!(strings(&editor), vec!["one"]);
    assert!(!editor.can_undo());
}

#[test]
fn test_insert_fragment_between_block_halves() -> anyhow::Result<()> {
    let mut editor = Editor::new(Value::new([paragraph("abcd")]));
    editor.select(point([0, 0], 2))?;

    editor.insert_fragment(vec![paragraph("mid")], None)?;

    assert_eq!(strings(&editor), vec!["ab", "mid", "cd"]);
    Ok(())
}

#[test]
fn test_insert_fragment_replaces_empty_block() -> anyhow::Result<()> {
    let mut editor = Editor::new(Value::new([paragraph("one"), paragraph("")]));
    editor.select(point([1, 0], 0))?;

    editor.insert_fragment(vec![paragraph("two"), paragraph("three")], None)?;

    assert_eq!(strings(&editor), vec!["one", "two", "three"]);
    assert_eq!(editor.selection(), Some(&caret([2, 0], 5)));
    Ok(())
}

#[test]
fn test_delete_range_ending_in_void_takes_whole_void() -> anyhow::Result<()> {
    let mut editor = Editor::new(Value::new([paragraph("one"), image(), paragraph("two")]));
    editor.select(Range::new(point([0, 0], 1), point([1, 0], 0)))?;

    editor.delete_backward(Unit::Character)?;

    assert_eq!(strings(&editor), vec!["o", "two"]);
    assert_eq!(editor.selection(), Some(&caret([0, 0], 1)));
    Ok(())
}

#[test]
fn test_zero_distance_delete_is_rejected_before_any_change() {
    let mut editor = Editor::new(Value::new([paragraph("one")]));
    editor.select(point([0, 0], 3)).unwrap();
    let options = weft_editor::DeleteOptions {
        distance: 0,
        ..weft_editor::DeleteOptions::default()
    };

    let result = editor.delete(None, options);

    assert!(matches!(
        result,
        Err(weft_editor::EditorError::InvalidOption(_))
    ));
    assert_eq!(strings(&editor), vec!["one"]);
}

#[test]
fn test_insert_text_at_path_is_invalid() {
    let mut editor = Editor::new(Value::new([paragraph("one")]));

    let result = editor.insert_text("x", Some(Location::Path(Path::from([0]))));

    assert!(matches!(
        result,
        Err(weft_editor::EditorError::InvalidLocation(_))
    ));
}
