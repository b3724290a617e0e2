//! # Live references
//!
//! Paths, points and ranges that stay correct while a command issues
//! operations. The editor owns one registry; every applied operation is
//! pushed through [`RefRegistry::transform`] before the next one is issued.
//!
//! Handles are plain ids and cannot be cloned. Releasing one with `unref_*`
//! consumes it and returns the final location.

use std::collections::BTreeMap;
use weft_model::{Affinity, Operation, Path, Point, Range, RangeAffinity};

#[derive(Debug, PartialEq, Eq)]
#[must_use = "an unused ref keeps being transformed until released"]
pub struct PathRef(u64);

#[derive(Debug, PartialEq, Eq)]
#[must_use = "an unused ref keeps being transformed until released"]
pub struct PointRef(u64);

#[derive(Debug, PartialEq, Eq)]
#[must_use = "an unused ref keeps being transformed until released"]
pub struct RangeRef(u64);

#[derive(Debug, Clone)]
enum Tracked {
    Path {
        current: Option<Path>,
        affinity: Option<Affinity>,
    },
    Point {
        current: Option<Point>,
        affinity: Option<Affinity>,
    },
    Range {
        current: Option<Range>,
        affinity: Option<RangeAffinity>,
    },
}

impl Tracked {
    fn transform(&mut self, op: &Operation) {
        match self {
            Tracked::Path { current, affinity } => {
                *current = current.take().and_then(|path| path.transform(op, *affinity));
            }
            Tracked::Point { current, affinity } => {
                *current = current.take().and_then(|point| point.transform(op, *affinity));
            }
            Tracked::Range { current, affinity } => {
                *current = current.take().and_then(|range| range.transform(op, *affinity));
            }
        }
    }
}

/// Registry of live references, keyed by creation order
#[derive(Debug, Default)]
pub struct RefRegistry {
    next_id: u64,
    refs: BTreeMap<u64, Tracked>,
}

impl RefRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn track(&mut self, tracked: Tracked) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.refs.insert(id, tracked);
        id
    }

    pub fn path_ref(&mut self, path: Path, affinity: Option<Affinity>) -> PathRef {
        PathRef(self.track(Tracked::Path {
            current: Some(path),
            affinity,
        }))
    }

    pub fn point_ref(&mut self, point: Point, affinity: Option<Affinity>) -> PointRef {
        PointRef(self.track(Tracked::Point {
            current: Some(point),
            affinity,
        }))
    }

    pub fn range_ref(&mut self, range: Range, affinity: Option<RangeAffinity>) -> RangeRef {
        RangeRef(self.track(Tracked::Range {
            current: Some(range),
            affinity,
        }))
    }

    /// Current path, `None` once the node was removed
    pub fn path(&self, handle: &PathRef) -> Option<Path> {
        match self.refs.get(&handle.0) {
            Some(Tracked::Path { current, .. }) => current.clone(),
            _ => None,
        }
    }

    pub fn point(&self, handle: &PointRef) -> Option<Point> {
        match self.refs.get(&handle.0) {
            Some(Tracked::Point { current, .. }) => current.clone(),
            _ => None,
        }
    }

    pub fn range(&self, handle: &RangeRef) -> Option<Range> {
        match self.refs.get(&handle.0) {
            Some(Tracked::Range { current, .. }) => current.clone(),
            _ => None,
        }
    }

    /// Overwrite a path ref, e.g. to advance a move target
    pub fn set_path(&mut self, handle: &PathRef, path: Option<Path>) {
        if let Some(Tracked::Path { current, .. }) = self.refs.get_mut(&handle.0) {
            *current = path;
        }
    }

    pub fn unref_path(&mut self, handle: PathRef) -> Option<Path> {
        let current = self.path(&handle);
        self.refs.remove(&handle.0);
        current
    }

    pub fn unref_point(&mut self, handle: PointRef) -> Option<Point> {
        let current = self.point(&handle);
        self.refs.remove(&handle.0);
        current
    }

    pub fn unref_range(&mut self, handle: RangeRef) -> Option<Range> {
        let current = self.range(&handle);
        self.refs.remove(&handle.0);
        current
    }

    /// Move every live ref across `op`
    pub fn transform(&mut self, op: &Operation) {
        for tracked in self.refs.values_mut() {
            tracked.transform(op);
        }
    }

    /// Id the next ref will receive
    pub(crate) fn watermark(&self) -> u64 {
        self.next_id
    }

    /// Drop every ref created at or after `mark`. Returns how many were live.
    pub(crate) fn release_since(&mut self, mark: u64) -> usize {
        let released = self.refs.split_off(&mark);
        released.len()
    }

    /// Number of refs not yet released
    pub fn len(&self) -> usize {
        self.refs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.refs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use weft_model::Node;

    fn p<const N: usize>(indices: [usize; N]) -> Path {
        Path::from(indices)
    }

    #[test]
    fn test_path_ref_follows_insert() {
        let mut refs = RefRegistry::new();
        let handle = refs.path_ref(p([1]), None);
        refs.transform(&Operation::InsertNode {
            path: p([0]),
            node: Node::text(""),
        });
        assert_eq!(refs.path(&handle), Some(p([2])));
        assert_eq!(refs.unref_path(handle), Some(p([2])));
        assert!(refs.is_empty());
    }

    #[test]
    fn test_destroyed_ref_stays_destroyed() {
        let mut refs = RefRegistry::new();
        let handle = refs.path_ref(p([0, 1]), None);
        refs.transform(&Operation::RemoveNode {
            path: p([0]),
            node: Node::text(""),
        });
        assert_eq!(refs.path(&handle), None);
        refs.transform(&Operation::InsertNode {
            path: p([0]),
            node: Node::text(""),
        });
        assert_eq!(refs.unref_path(handle), None);
    }

    #[test]
    fn test_point_affinity_at_split() {
        let mut refs = RefRegistry::new();
        let forward = refs.point_ref(Point::new(p([0, 0]), 2), Some(Affinity::Forward));
        let backward = refs.point_ref(Point::new(p([0, 0]), 2), Some(Affinity::Backward));
        let none = refs.point_ref(Point::new(p([0, 0]), 2), None);
        refs.transform(&Operation::SplitNode {
            path: p([0, 0]),
            position: 2,
            properties: Default::default(),
        });
        assert_eq!(refs.unref_point(forward), Some(Point::new(p([0, 1]), 0)));
        assert_eq!(refs.unref_point(backward), Some(Point::new(p([0, 0]), 2)));
        assert_eq!(refs.unref_point(none), None);
    }

    #[test]
    fn test_inward_range_shrinks_onto_split_halves() {
        let mut refs = RefRegistry::new();
        let range = Range::new(Point::new(p([0, 0]), 1), Point::new(p([0, 0]), 3));
        let handle = refs.range_ref(range, Some(RangeAffinity::Inward));
        for position in [3, 1] {
            refs.transform(&Operation::SplitNode {
                path: p([0, 0]),
                position,
                properties: Default::default(),
            });
        }
        let range = refs.unref_range(handle).unwrap();
        assert_eq!(range.anchor, Point::new(p([0, 1]), 0));
        assert_eq!(range.focus, Point::new(p([0, 1]), 2));
    }

    #[test]
    fn test_released_ref_is_not_updated() {
        let mut refs = RefRegistry::new();
        let kept = refs.path_ref(p([0]), None);
        let released = refs.path_ref(p([0]), None);
        assert_eq!(refs.unref_path(released), Some(p([0])));
        assert_eq!(refs.len(), 1);
        refs.set_path(&kept, Some(p([3])));
        assert_eq!(refs.path(&kept), Some(p([3])));
    }
}
