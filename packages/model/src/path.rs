//! # Paths
//!
//! A path addresses a node by the child index taken at each depth, starting
//! from the document root. The root itself is the empty path.
//!
//! Paths order lexicographically, so an ancestor sorts before all of its
//! descendants and a node's subtree sorts before its next sibling.

use crate::{ModelError, ModelResult, Operation};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Deref;

/// Which side a location sticks to when an edit lands exactly on it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Affinity {
    Forward,
    Backward,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Path(Vec<usize>);

impl Path {
    pub fn new(indices: Vec<usize>) -> Self {
        Path(indices)
    }

    pub fn root() -> Self {
        Path(Vec::new())
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_vec(&self) -> Vec<usize> {
        self.0.clone()
    }

    /// Path of the parent node
    pub fn parent(&self) -> ModelResult<Path> {
        match self.0.split_last() {
            Some((_, rest)) => Ok(Path(rest.to_vec())),
            None => Err(ModelError::NoParent { path: self.clone() }),
        }
    }

    /// Path of the child at `index`
    pub fn child(&self, index: usize) -> Path {
        let mut indices = self.0.clone();
        indices.push(index);
        Path(indices)
    }

    /// Path of the following sibling
    pub fn next(&self) -> ModelResult<Path> {
        match self.0.split_last() {
            Some((last, rest)) => {
                let mut indices = rest.to_vec();
                indices.push(last + 1);
                Ok(Path(indices))
            }
            None => Err(ModelError::NoParent { path: self.clone() }),
        }
    }

    /// Path of the preceding sibling
    pub fn previous(&self) -> ModelResult<Path> {
        match self.0.split_last() {
            Some((0, _)) => Err(ModelError::out_of_range(self)),
            Some((last, rest)) => {
                let mut indices = rest.to_vec();
                indices.push(last - 1);
                Ok(Path(indices))
            }
            None => Err(ModelError::NoParent { path: self.clone() }),
        }
    }

    pub fn has_previous(&self) -> bool {
        matches!(self.0.last(), Some(last) if *last > 0)
    }

    pub fn is_ancestor_of(&self, other: &Path) -> bool {
        self.0.len() < other.0.len() && other.0.starts_with(&self.0)
    }

    pub fn is_descendant_of(&self, other: &Path) -> bool {
        other.is_ancestor_of(self)
    }

    /// Same parent, different index
    pub fn is_sibling_of(&self, other: &Path) -> bool {
        match (self.0.split_last(), other.0.split_last()) {
            (Some((a, a_rest)), Some((b, b_rest))) => a != b && a_rest == b_rest,
            _ => false,
        }
    }

    /// True when `self` is an earlier sibling of `other` or of one of its
    /// ancestors.
    pub fn ends_before(&self, other: &Path) -> bool {
        let Some((last, rest)) = self.0.split_last() else {
            return false;
        };
        other.0.len() > rest.len() && other.0.starts_with(rest) && *last < other.0[rest.len()]
    }

    /// True when `self` is a later sibling of `other` or of one of its
    /// ancestors.
    pub fn ends_after(&self, other: &Path) -> bool {
        let Some((last, rest)) = self.0.split_last() else {
            return false;
        };
        other.0.len() > rest.len() && other.0.starts_with(rest) && *last > other.0[rest.len()]
    }

    /// Strictly before in document order, excluding ancestors
    pub fn is_before(&self, other: &Path) -> bool {
        self < other && !self.is_ancestor_of(other)
    }

    /// Strictly after in document order, excluding descendants
    pub fn is_after(&self, other: &Path) -> bool {
        self > other && !other.is_ancestor_of(self)
    }

    /// Longest shared prefix
    pub fn common(&self, other: &Path) -> Path {
        let shared = self
            .0
            .iter()
            .zip(other.0.iter())
            .take_while(|(a, b)| a == b)
            .map(|(a, _)| *a)
            .collect();
        Path(shared)
    }

    /// Path of `self` relative to `ancestor`
    pub fn relative(&self, ancestor: &Path) -> ModelResult<Path> {
        if ancestor == self || ancestor.is_ancestor_of(self) {
            Ok(Path(self.0[ancestor.0.len()..].to_vec()))
        } else {
            Err(ModelError::out_of_range(self))
        }
    }

    /// Every proper ancestor, root first
    pub fn ancestors(&self) -> Vec<Path> {
        (0..self.0.len()).map(|len| Path(self.0[..len].to_vec())).collect()
    }

    /// Every ancestor plus the path itself, root first
    pub fn levels(&self) -> Vec<Path> {
        (0..=self.0.len()).map(|len| Path(self.0[..len].to_vec())).collect()
    }

    /// Prefix of the first `depth` indices
    pub fn truncate(&self, depth: usize) -> Path {
        Path(self.0[..depth.min(self.0.len())].to_vec())
    }

    /// Where this path ends up after `op` has been applied, or `None` when
    /// the node it addresses no longer exists.
    ///
    /// `affinity` only matters for `split_node` on this exact path: forward
    /// follows the new right sibling, backward stays on the left part, and
    /// `None` treats the split node as gone.
    pub fn transform(&self, op: &Operation, affinity: Option<Affinity>) -> Option<Path> {
        if self.is_root() {
            return Some(self.clone());
        }

        match op {
            Operation::MoveNode { path: from, new_path: to } if from.is_root() || to.is_root() => {
                return Some(self.clone());
            }
            _ if op.path().is_some_and(|at| at.is_root()) => return Some(self.clone()),
            _ => {}
        }

        let mut p = self.0.clone();

        match op {
            Operation::InsertNode { path: at, .. } => {
                if at == self || at.ends_before(self) || at.is_ancestor_of(self) {
                    p[at.len() - 1] += 1;
                }
            }

            Operation::RemoveNode { path: at, .. } => {
                if at == self || at.is_ancestor_of(self) {
                    return None;
                }
                if at.ends_before(self) {
                    p[at.len() - 1] -= 1;
                }
            }

            Operation::MergeNode { path: at, position, .. } => {
                if at == self || at.ends_before(self) {
                    p[at.len() - 1] -= 1;
                } else if at.is_ancestor_of(self) {
                    p[at.len() - 1] -= 1;
                    p[at.len()] += position;
                }
            }

            Operation::SplitNode { path: at, position, .. } => {
                if at == self {
                    match affinity {
                        Some(Affinity::Forward) => {
                            let last = p.len() - 1;
                            p[last] += 1;
                        }
                        Some(Affinity::Backward) => {}
                        None => return None,
                    }
                } else if at.ends_before(self) {
                    p[at.len() - 1] += 1;
                } else if at.is_ancestor_of(self) && self.0[at.len()] >= *position {
                    p[at.len() - 1] += 1;
                    p[at.len()] -= position;
                }
            }

            Operation::MoveNode { path: from, new_path: to } => {
                if from == to {
                    return Some(self.clone());
                }

                if from == self || from.is_ancestor_of(self) {
                    let mut moved = to.0.clone();
                    if from.ends_before(to) && from.len() < to.len() {
                        moved[from.len() - 1] -= 1;
                    }
                    moved.extend_from_slice(&self.0[from.len()..]);
                    return Some(Path(moved));
                }

                if from.is_sibling_of(to) && (to == self || to.is_ancestor_of(self)) {
                    if from.ends_before(self) {
                        p[from.len() - 1] -= 1;
                    } else {
                        p[from.len() - 1] += 1;
                    }
                } else if to.ends_before(self) || to == self || to.is_ancestor_of(self) {
                    if from.ends_before(self) {
                        p[from.len() - 1] -= 1;
                    }
                    p[to.len() - 1] += 1;
                } else if from.ends_before(self) {
                    if to == self {
                        p[to.len() - 1] += 1;
                    }
                    p[from.len() - 1] -= 1;
                }
            }

            _ => {}
        }

        Some(Path(p))
    }
}

impl Deref for Path {
    type Target = [usize];

    fn deref(&self) -> &[usize] {
        &self.0
    }
}

impl From<Vec<usize>> for Path {
    fn from(indices: Vec<usize>) -> Self {
        Path(indices)
    }
}

impl From<&[usize]> for Path {
    fn from(indices: &[usize]) -> Self {
        Path(indices.to_vec())
    }
}

impl<const N: usize> From<[usize; N]> for Path {
    fn from(indices: [usize; N]) -> Self {
        Path(indices.to_vec())
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, index) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", index)?;
        }
        write!(f, "]")
    }
}
