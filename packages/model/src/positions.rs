//! # Positions
//!
//! Stepping a point forwards or backwards by a unit of text.
//!
//! The document is flattened into a list of stops. Inside a leaf block
//! every character boundary is one stop, and the boundary between two
//! adjacent texts counts once. Crossing into another block is one step,
//! and a void element is a single stop at the start of its first text.

use crate::{Node, Path, Point, Value};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    #[default]
    Character,
    Word,
    Line,
    Block,
}

#[derive(Debug, Clone)]
struct Stop {
    point: Point,
    /// Ordinal of the leaf block (or void) this stop belongs to
    block: usize,
    /// Character crossed to reach this stop from the previous one
    crossed: Option<char>,
    /// The same location expressed at offset 0 of the following text
    alias: Option<Point>,
}

fn collect_stops(value: &Value) -> Vec<Stop> {
    let mut stops = Vec::new();
    let mut block = 0;
    collect_blocks(&value.children, &Path::root(), &mut stops, &mut block);
    stops
}

fn collect_blocks(children: &[Node], base: &Path, stops: &mut Vec<Stop>, block: &mut usize) {
    for (index, child) in children.iter().enumerate() {
        let path = base.child(index);
        match child {
            Node::Element(element) if element.is_block() && element.has_block_children() => {
                collect_blocks(&element.children, &path, stops, block);
            }
            Node::Element(element) if element.is_block() => {
                *block += 1;
                if element.is_void {
                    push_void(child, &path, stops, *block);
                } else {
                    let mut fresh = true;
                    collect_inline(&element.children, &path, stops, *block, &mut fresh);
                }
            }
            _ => {
                *block += 1;
                let mut fresh = true;
                collect_inline(std::slice::from_ref(child), base, stops, *block, &mut fresh);
            }
        }
    }
}

fn collect_inline(
    children: &[Node],
    base: &Path,
    stops: &mut Vec<Stop>,
    block: usize,
    fresh: &mut bool,
) {
    for (index, child) in children.iter().enumerate() {
        let path = base.child(index);
        match child {
            Node::Text(text) => {
                if *fresh {
                    stops.push(Stop {
                        point: Point::new(path.clone(), 0),
                        block,
                        crossed: None,
                        alias: None,
                    });
                } else if let Some(last) = stops.last_mut() {
                    last.alias = Some(Point::new(path.clone(), 0));
                }
                for (offset, ch) in text.text.chars().enumerate() {
                    stops.push(Stop {
                        point: Point::new(path.clone(), offset + 1),
                        block,
                        crossed: Some(ch),
                        alias: None,
                    });
                }
                *fresh = false;
            }
            Node::Element(element) if element.is_void => {
                push_void(child, &path, stops, block);
                *fresh = true;
            }
            Node::Element(element) => {
                collect_inline(&element.children, &path, stops, block, fresh);
            }
        }
    }
}

fn push_void(node: &Node, path: &Path, stops: &mut Vec<Stop>, block: usize) {
    let mut path = path.clone();
    let mut node = node;
    while let Some(first) = node.children().first() {
        path = path.child(0);
        node = first;
    }
    if node.is_text() {
        stops.push(Stop {
            point: Point::new(path, 0),
            block,
            crossed: None,
            alias: None,
        });
    }
}

fn is_word_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_' || ch == '\''
}

impl Value {
    /// The point `distance` units after `point`, or `None` when the end of
    /// the document is reached before the first step
    pub fn next_point(&self, point: &Point, unit: Unit, distance: usize) -> Option<Point> {
        self.step(point, unit, distance, false)
    }

    /// The point `distance` units before `point`, or `None` when the start
    /// of the document is reached before the first step
    pub fn previous_point(&self, point: &Point, unit: Unit, distance: usize) -> Option<Point> {
        self.step(point, unit, distance, true)
    }

    fn step(&self, point: &Point, unit: Unit, distance: usize, reverse: bool) -> Option<Point> {
        let stops = collect_stops(self);
        let origin = match self.furthest_void(&point.path) {
            Some(void) => self.start(&void).ok()?,
            None => point.clone(),
        };
        let start = stops.iter().rposition(|stop| stop.point <= origin)?;

        let mut index = start;
        for _ in 0..distance {
            let next = if reverse {
                step_back(&stops, index, unit)
            } else {
                step_forward(&stops, index, unit)
            };
            match next {
                Some(next) => index = next,
                None => break,
            }
        }

        if index == start {
            return None;
        }

        let stop = &stops[index];
        match &stop.alias {
            Some(alias) if alias.path == origin.path => Some(alias.clone()),
            _ => Some(stop.point.clone()),
        }
    }
}

fn step_forward(stops: &[Stop], index: usize, unit: Unit) -> Option<usize> {
    let block = stops[index].block;
    let next = stops.get(index + 1)?;
    if next.block != block {
        return Some(index + 1);
    }

    match unit {
        Unit::Character => Some(index + 1),
        Unit::Word => {
            let mut at = index;
            let mut started = false;
            while let Some(next) = stops.get(at + 1) {
                if next.block != block {
                    break;
                }
                match next.crossed {
                    Some(ch) if is_word_char(ch) => started = true,
                    Some(_) if !started => {}
                    Some(_) => break,
                    None => {
                        if at == index {
                            at += 1;
                        }
                        break;
                    }
                }
                at += 1;
            }
            Some(at)
        }
        Unit::Line | Unit::Block => {
            let mut at = index;
            while stops.get(at + 1).is_some_and(|next| next.block == block) {
                at += 1;
            }
            Some(at)
        }
    }
}

fn step_back(stops: &[Stop], index: usize, unit: Unit) -> Option<usize> {
    let block = stops[index].block;
    let previous = index.checked_sub(1)?;
    if stops[previous].block != block {
        return Some(previous);
    }

    match unit {
        Unit::Character => Some(previous),
        Unit::Word => {
            let mut at = index;
            let mut started = false;
            while at > 0 && stops[at - 1].block == block {
                match stops[at].crossed {
                    Some(ch) if is_word_char(ch) => started = true,
                    Some(_) if !started => {}
                    Some(_) => break,
                    None => {
                        if at == index {
                            at -= 1;
                        }
                        break;
                    }
                }
                at -= 1;
            }
            Some(at)
        }
        Unit::Line | Unit::Block => {
            let mut at = index;
            while at > 0 && stops[at - 1].block == block {
                at -= 1;
            }
            Some(at)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Element;

    fn p<const N: usize>(indices: [usize; N]) -> Path {
        Path::from(indices)
    }

    fn pt<const N: usize>(path: [usize; N], offset: usize) -> Point {
        Point::new(path, offset)
    }

    fn doc() -> Value {
        Value::new([
            Node::element("paragraph", [Node::text("one two")]),
            Node::element(
                "paragraph",
                [
                    Node::text("ab"),
                    Element::new("link")
                        .inline()
                        .with_children([Node::text("cd")])
                        .into(),
                    Node::text(""),
                ],
            ),
            Element::new("image").void().into(),
            Node::element("paragraph", [Node::text("end")]),
        ])
    }

    #[test]
    fn test_character_steps_within_text() {
        let value = doc();
        assert_eq!(
            value.next_point(&pt([0, 0], 1), Unit::Character, 1),
            Some(pt([0, 0], 2))
        );
        assert_eq!(
            value.previous_point(&pt([0, 0], 1), Unit::Character, 1),
            Some(pt([0, 0], 0))
        );
        assert_eq!(
            value.next_point(&pt([0, 0], 1), Unit::Character, 3),
            Some(pt([0, 0], 4))
        );
    }

    #[test]
    fn test_crossing_blocks_costs_one_step() {
        let value = doc();
        assert_eq!(
            value.next_point(&pt([0, 0], 7), Unit::Character, 1),
            Some(pt([1, 0], 0))
        );
        assert_eq!(
            value.previous_point(&pt([1, 0], 0), Unit::Character, 1),
            Some(pt([0, 0], 7))
        );
    }

    #[test]
    fn test_inline_boundaries_are_free() {
        let value = doc();
        assert_eq!(
            value.next_point(&pt([1, 0], 2), Unit::Character, 1),
            Some(pt([1, 1, 0], 1))
        );
        assert_eq!(
            value.previous_point(&pt([1, 1, 0], 1), Unit::Character, 1),
            Some(pt([1, 1, 0], 0))
        );
    }

    #[test]
    fn test_voids_are_one_stop() {
        let value = doc();
        assert_eq!(
            value.next_point(&pt([1, 2], 0), Unit::Character, 1),
            Some(pt([2, 0], 0))
        );
        assert_eq!(
            value.next_point(&pt([2, 0], 0), Unit::Character, 1),
            Some(pt([3, 0], 0))
        );
        assert_eq!(
            value.previous_point(&pt([3, 0], 0), Unit::Character, 1),
            Some(pt([2, 0], 0))
        );
    }

    #[test]
    fn test_document_edges() {
        let value = doc();
        assert_eq!(value.previous_point(&pt([0, 0], 0), Unit::Character, 1), None);
        assert_eq!(value.next_point(&pt([3, 0], 3), Unit::Character, 1), None);
        assert_eq!(
            value.next_point(&pt([3, 0], 1), Unit::Character, 10),
            Some(pt([3, 0], 3))
        );
    }

    #[test]
    fn test_word_steps() {
        let value = doc();
        assert_eq!(
            value.next_point(&pt([0, 0], 0), Unit::Word, 1),
            Some(pt([0, 0], 3))
        );
        assert_eq!(
            value.next_point(&pt([0, 0], 3), Unit::Word, 1),
            Some(pt([0, 0], 7))
        );
        assert_eq!(
            value.previous_point(&pt([0, 0], 7), Unit::Word, 1),
            Some(pt([0, 0], 4))
        );
        assert_eq!(
            value.previous_point(&pt([0, 0], 4), Unit::Word, 1),
            Some(pt([0, 0], 0))
        );
    }

    #[test]
    fn test_block_steps() {
        let value = doc();
        assert_eq!(
            value.next_point(&pt([0, 0], 2), Unit::Block, 1),
            Some(pt([0, 0], 7))
        );
        assert_eq!(
            value.next_point(&pt([0, 0], 7), Unit::Line, 1),
            Some(pt([1, 0], 0))
        );
        assert_eq!(
            value.previous_point(&pt([1, 1, 0], 1), Unit::Block, 1),
            Some(pt([1, 0], 0))
        );
    }
}
