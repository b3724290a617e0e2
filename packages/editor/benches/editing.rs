use criterion::{black_box, criterion_group, criterion_main, Criterion};
use weft_editor::{Editor, Unit};
use weft_model::{Node, Point, Range, Value};

fn document(blocks: usize) -> Value {
    Value::new((0..blocks).map(|index| {
        Node::element(
            "paragraph",
            [Node::text(format!("paragraph number {index} with some words"))],
        )
    }))
}

fn type_characters(c: &mut Criterion) {
    let value = document(50);

    c.bench_function("type_100_characters", |b| {
        b.iter(|| {
            let mut editor = Editor::new(value.clone());
            editor.select(Point::new([25, 0], 0)).unwrap();
            for _ in 0..100 {
                editor.insert_text(black_box("x"), None).unwrap();
            }
            editor
        })
    });
}

fn delete_across_blocks(c: &mut Criterion) {
    let value = document(200);

    c.bench_function("delete_across_100_blocks", |b| {
        b.iter(|| {
            let mut editor = Editor::new(value.clone());
            editor
                .select(Range::new(Point::new([10, 0], 3), Point::new([110, 0], 3)))
                .unwrap();
            editor.delete_backward(Unit::Character).unwrap();
            editor
        })
    });
}

fn undo_redo(c: &mut Criterion) {
    let value = document(50);

    c.bench_function("undo_redo_split", |b| {
        let mut editor = Editor::new(value.clone());
        editor.select(Point::new([0, 0], 4)).unwrap();
        editor
            .split_nodes(None, weft_editor::SplitHeight::Block)
            .unwrap();
        b.iter(|| {
            editor.undo().unwrap();
            editor.redo().unwrap();
        })
    });
}

fn normalize_fragmented(c: &mut Criterion) {
    let value = Value::new((0..50).map(|_| {
        Node::element("paragraph", (0..20).map(|i| Node::text(i.to_string())))
    }));

    c.bench_function("normalize_fragmented_texts", |b| {
        b.iter(|| {
            let mut editor = Editor::new(black_box(value.clone()));
            editor.normalize().unwrap()
        })
    });
}

criterion_group!(
    benches,
    type_characters,
    delete_across_blocks,
    undo_redo,
    normalize_fragmented
);
criterion_main!(benches);
