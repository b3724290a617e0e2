//! # Points and ranges
//!
//! A point is a character offset inside a text leaf. A range is a pair of
//! points: the anchor is where a selection started and the focus is where it
//! currently ends, so a range can run backwards.

use crate::{Affinity, Operation, Path};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub path: Path,
    /// Offset in characters (Unicode scalar values), not bytes
    pub offset: usize,
}

impl Point {
    pub fn new(path: impl Into<Path>, offset: usize) -> Self {
        Self {
            path: path.into(),
            offset,
        }
    }

    pub fn is_before(&self, other: &Point) -> bool {
        self < other
    }

    pub fn is_after(&self, other: &Point) -> bool {
        self > other
    }

    /// Where this point ends up after `op`, or `None` when its text leaf was
    /// removed (or split exactly here with no affinity).
    pub fn transform(&self, op: &Operation, affinity: Option<Affinity>) -> Option<Point> {
        let mut point = self.clone();

        match op {
            Operation::InsertNode { .. } | Operation::MoveNode { .. } => {
                point.path = self.path.transform(op, affinity)?;
            }

            Operation::InsertText { path, offset, text } => {
                if *path == self.path
                    && (*offset < self.offset
                        || (*offset == self.offset && affinity == Some(Affinity::Forward)))
                {
                    point.offset += text.chars().count();
                }
            }

            Operation::RemoveText { path, offset, text } => {
                if *path == self.path && *offset <= self.offset {
                    point.offset -= (self.offset - offset).min(text.chars().count());
                }
            }

            Operation::MergeNode { path, position, .. } => {
                if *path == self.path {
                    point.offset += position;
                }
                point.path = self.path.transform(op, affinity)?;
            }

            Operation::RemoveNode { .. } => {
                point.path = self.path.transform(op, affinity)?;
            }

            Operation::SplitNode { path, position, .. } => {
                if *path == self.path {
                    if *position == self.offset && affinity.is_none() {
                        return None;
                    }
                    if *position < self.offset
                        || (*position == self.offset && affinity == Some(Affinity::Forward))
                    {
                        point.offset -= position;
                        point.path = self.path.transform(op, Some(Affinity::Forward))?;
                    }
                } else {
                    point.path = self.path.transform(op, affinity)?;
                }
            }

            _ => {}
        }

        Some(point)
    }
}

impl PartialOrd for Point {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Point {
    fn cmp(&self, other: &Self) -> Ordering {
        self.path
            .cmp(&other.path)
            .then_with(|| self.offset.cmp(&other.offset))
    }
}

/// How a tracked range reacts to edits landing exactly on its edges
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RangeAffinity {
    /// Edges shrink towards the inside of the range
    Inward,
    /// Edges grow towards the outside of the range
    Outward,
    Forward,
    Backward,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Edge {
    Anchor,
    Focus,
    Start,
    End,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Range {
    pub anchor: Point,
    pub focus: Point,
}

impl Range {
    pub fn new(anchor: Point, focus: Point) -> Self {
        Self { anchor, focus }
    }

    pub fn collapsed(point: Point) -> Self {
        Self {
            anchor: point.clone(),
            focus: point,
        }
    }

    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.focus
    }

    pub fn is_expanded(&self) -> bool {
        !self.is_collapsed()
    }

    /// Anchor at or before focus
    pub fn is_forward(&self) -> bool {
        self.anchor <= self.focus
    }

    pub fn is_backward(&self) -> bool {
        !self.is_forward()
    }

    pub fn start(&self) -> &Point {
        if self.is_forward() {
            &self.anchor
        } else {
            &self.focus
        }
    }

    pub fn end(&self) -> &Point {
        if self.is_forward() {
            &self.focus
        } else {
            &self.anchor
        }
    }

    pub fn edges(&self) -> (Point, Point) {
        (self.start().clone(), self.end().clone())
    }

    pub fn edge(&self, edge: Edge) -> &Point {
        match edge {
            Edge::Anchor => &self.anchor,
            Edge::Focus => &self.focus,
            Edge::Start => self.start(),
            Edge::End => self.end(),
        }
    }

    /// Inclusive containment of a point
    pub fn includes(&self, point: &Point) -> bool {
        self.start() <= point && point <= self.end()
    }

    /// Whether `point` lies strictly between the edges
    pub fn surrounds(&self, point: &Point) -> bool {
        self.start() < point && point < self.end()
    }

    /// Whether the node at `path` intersects the range
    pub fn touches_path(&self, path: &Path) -> bool {
        let start = &self.start().path;
        let end = &self.end().path;
        let after_start = path >= start || path.is_ancestor_of(start);
        let before_end = path <= end || end.is_ancestor_of(path);
        after_start && before_end
    }

    pub fn transform(&self, op: &Operation, affinity: Option<RangeAffinity>) -> Option<Range> {
        let (anchor_affinity, focus_affinity) = match affinity {
            Some(RangeAffinity::Inward) => {
                if self.is_forward() {
                    let anchor = Some(Affinity::Forward);
                    let focus = if self.is_collapsed() {
                        anchor
                    } else {
                        Some(Affinity::Backward)
                    };
                    (anchor, focus)
                } else {
                    let anchor = Some(Affinity::Backward);
                    let focus = if self.is_collapsed() {
                        anchor
                    } else {
                        Some(Affinity::Forward)
                    };
                    (anchor, focus)
                }
            }
            Some(RangeAffinity::Outward) => {
                if self.is_forward() {
                    (Some(Affinity::Backward), Some(Affinity::Forward))
                } else {
                    (Some(Affinity::Forward), Some(Affinity::Backward))
                }
            }
            Some(RangeAffinity::Forward) => (Some(Affinity::Forward), Some(Affinity::Forward)),
            Some(RangeAffinity::Backward) => (Some(Affinity::Backward), Some(Affinity::Backward)),
            None => (None, None),
        };

        let anchor = self.anchor.transform(op, anchor_affinity)?;
        let focus = self.focus.transform(op, focus_affinity)?;
        Some(Range { anchor, focus })
    }
}

impl From<Point> for Range {
    fn from(point: Point) -> Self {
        Range::collapsed(point)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Node, Properties};

    fn pt<const N: usize>(path: [usize; N], offset: usize) -> Point {
        Point::new(path, offset)
    }

    #[test]
    fn test_points_order_by_path_then_offset() {
        assert!(pt([0, 0], 5) < pt([0, 1], 0));
        assert!(pt([0, 0], 1) < pt([0, 0], 2));
        assert_eq!(pt([1], 3).cmp(&pt([1], 3)), Ordering::Equal);
    }

    #[test]
    fn test_range_edges_ignore_direction() {
        let range = Range::new(pt([1, 0], 2), pt([0, 0], 1));
        assert!(range.is_backward());
        assert_eq!(range.start(), &pt([0, 0], 1));
        assert_eq!(range.end(), &pt([1, 0], 2));
        assert!(range.includes(&pt([0, 3], 0)));
        assert!(range.includes(&pt([1, 0], 2)));
        assert!(!range.surrounds(&pt([1, 0], 2)));
    }

    #[test]
    fn test_insert_text_uses_affinity_at_exact_offset() {
        let op = Operation::InsertText {
            path: Path::from([0, 0]),
            offset: 2,
            text: "xy".into(),
        };
        assert_eq!(pt([0, 0], 2).transform(&op, Some(Affinity::Forward)), Some(pt([0, 0], 4)));
        assert_eq!(pt([0, 0], 2).transform(&op, Some(Affinity::Backward)), Some(pt([0, 0], 2)));
        assert_eq!(pt([0, 0], 3).transform(&op, None), Some(pt([0, 0], 5)));
        assert_eq!(pt([0, 1], 3).transform(&op, None), Some(pt([0, 1], 3)));
    }

    #[test]
    fn test_remove_text_clamps_to_offset() {
        let op = Operation::RemoveText {
            path: Path::from([0, 0]),
            offset: 1,
            text: "bcd".into(),
        };
        assert_eq!(pt([0, 0], 0).transform(&op, None), Some(pt([0, 0], 0)));
        assert_eq!(pt([0, 0], 2).transform(&op, None), Some(pt([0, 0], 1)));
        assert_eq!(pt([0, 0], 6).transform(&op, None), Some(pt([0, 0], 3)));
    }

    #[test]
    fn test_split_and_merge_move_offsets() {
        let split = Operation::SplitNode {
            path: Path::from([0, 0]),
            position: 3,
            properties: Properties::default(),
        };
        assert_eq!(pt([0, 0], 5).transform(&split, None), Some(pt([0, 1], 2)));
        assert_eq!(pt([0, 0], 1).transform(&split, None), Some(pt([0, 0], 1)));
        assert_eq!(pt([0, 0], 3).transform(&split, Some(Affinity::Forward)), Some(pt([0, 1], 0)));
        assert_eq!(pt([0, 0], 3).transform(&split, Some(Affinity::Backward)), Some(pt([0, 0], 3)));
        assert_eq!(pt([0, 0], 3).transform(&split, None), None);

        let merge = Operation::MergeNode {
            path: Path::from([0, 1]),
            position: 3,
            properties: Properties::default(),
        };
        assert_eq!(pt([0, 1], 2).transform(&merge, None), Some(pt([0, 0], 5)));
    }

    #[test]
    fn test_removed_leaf_destroys_point() {
        let op = Operation::RemoveNode {
            path: Path::from([0]),
            node: Node::text(""),
        };
        assert_eq!(pt([0, 0], 0).transform(&op, None), None);
        assert_eq!(pt([1, 0], 4).transform(&op, None), Some(pt([0, 0], 4)));
    }

    #[test]
    fn test_inward_range_shrinks_at_edges() {
        let range = Range::new(pt([0, 0], 1), pt([0, 0], 3));
        let insert_at_start = Operation::InsertText {
            path: Path::from([0, 0]),
            offset: 1,
            text: "z".into(),
        };
        let moved = range
            .transform(&insert_at_start, Some(RangeAffinity::Inward))
            .unwrap();
        assert_eq!(moved, Range::new(pt([0, 0], 2), pt([0, 0], 4)));

        let insert_at_end = Operation::InsertText {
            path: Path::from([0, 0]),
            offset: 3,
            text: "z".into(),
        };
        let kept = range.transform(&insert_at_end, Some(RangeAffinity::Inward)).unwrap();
        assert_eq!(kept, range);

        let grown = range.transform(&insert_at_end, Some(RangeAffinity::Outward)).unwrap();
        assert_eq!(grown, Range::new(pt([0, 0], 1), pt([0, 0], 4)));
    }

    #[test]
    fn test_touches_path() {
        let range = Range::new(pt([0, 1], 0), pt([2, 0], 0));
        assert!(range.touches_path(&Path::from([0])));
        assert!(range.touches_path(&Path::from([1])));
        assert!(range.touches_path(&Path::from([2, 0])));
        assert!(!range.touches_path(&Path::from([0, 0])));
        assert!(!range.touches_path(&Path::from([3])));
    }
}
