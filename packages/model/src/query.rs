//! # Tree queries
//!
//! Read-only lookups and traversals over a `Value`, all keyed by `Path`.

use crate::{Element, ModelError, ModelResult, Node, NodeRef, Path, Point, Range, Text, Value};

/// Pre-order iterator over every node below the root
pub struct Descendants<'a> {
    stack: Vec<(Path, &'a Node)>,
}

impl<'a> Descendants<'a> {
    fn new(base: Path, children: &'a [Node]) -> Self {
        let stack = children
            .iter()
            .enumerate()
            .rev()
            .map(|(index, node)| (base.child(index), node))
            .collect();
        Self { stack }
    }
}

impl<'a> Iterator for Descendants<'a> {
    type Item = (Path, &'a Node);

    fn next(&mut self) -> Option<Self::Item> {
        let (path, node) = self.stack.pop()?;
        for (index, child) in node.children().iter().enumerate().rev() {
            self.stack.push((path.child(index), child));
        }
        Some((path, node))
    }
}

impl Value {
    /// Node at `path`; the empty path yields the root
    pub fn node(&self, path: &Path) -> ModelResult<NodeRef<'_>> {
        if path.is_root() {
            return Ok(NodeRef::Value(self));
        }
        self.get(path).map(NodeRef::from)
    }

    pub fn get(&self, path: &Path) -> ModelResult<&Node> {
        let (first, rest) = path
            .split_first()
            .ok_or_else(|| ModelError::out_of_range(path))?;
        let mut node = self
            .children
            .get(*first)
            .ok_or_else(|| ModelError::out_of_range(path))?;
        for index in rest {
            node = node
                .children()
                .get(*index)
                .ok_or_else(|| ModelError::out_of_range(path))?;
        }
        Ok(node)
    }

    pub fn get_mut(&mut self, path: &Path) -> ModelResult<&mut Node> {
        let (first, rest) = path
            .split_first()
            .ok_or_else(|| ModelError::out_of_range(path))?;
        let mut node = self
            .children
            .get_mut(*first)
            .ok_or_else(|| ModelError::out_of_range(path))?;
        for index in rest {
            node = match node {
                Node::Element(element) => element
                    .children
                    .get_mut(*index)
                    .ok_or_else(|| ModelError::out_of_range(path))?,
                Node::Text(_) => return Err(ModelError::out_of_range(path)),
            };
        }
        Ok(node)
    }

    pub fn has(&self, path: &Path) -> bool {
        self.node(path).is_ok()
    }

    pub fn children_at(&self, path: &Path) -> ModelResult<&[Node]> {
        match self.node(path)? {
            NodeRef::Text(_) => Err(ModelError::not_element(path)),
            node => Ok(node.children()),
        }
    }

    pub(crate) fn children_at_mut(&mut self, path: &Path) -> ModelResult<&mut Vec<Node>> {
        if path.is_root() {
            return Ok(&mut self.children);
        }
        match self.get_mut(path)? {
            Node::Element(element) => Ok(&mut element.children),
            Node::Text(_) => Err(ModelError::not_element(path)),
        }
    }

    pub fn text(&self, path: &Path) -> ModelResult<&Text> {
        self.get(path)?
            .as_text()
            .ok_or_else(|| ModelError::not_text(path))
    }

    pub(crate) fn text_mut(&mut self, path: &Path) -> ModelResult<&mut Text> {
        self.get_mut(path)?
            .as_text_mut()
            .ok_or_else(|| ModelError::not_text(path))
    }

    pub fn element(&self, path: &Path) -> ModelResult<&Element> {
        self.get(path)?
            .as_element()
            .ok_or_else(|| ModelError::not_element(path))
    }

    pub fn parent(&self, path: &Path) -> ModelResult<NodeRef<'_>> {
        self.node(&path.parent()?)
    }

    /// The root, every ancestor and the node itself, root first
    pub fn levels(&self, path: &Path) -> ModelResult<Vec<(Path, NodeRef<'_>)>> {
        path.levels()
            .into_iter()
            .map(|level| self.node(&level).map(|node| (level, node)))
            .collect()
    }

    /// Nearest element at or above `path` satisfying `predicate`
    pub fn closest<F>(&self, path: &Path, predicate: F) -> Option<(Path, &Element)>
    where
        F: Fn(&Element) -> bool,
    {
        let levels = self.levels(path).ok()?;
        levels.into_iter().rev().find_map(|(level, node)| match node {
            NodeRef::Element(element) if predicate(element) => Some((level, element)),
            _ => None,
        })
    }

    pub fn closest_block(&self, path: &Path) -> Option<(Path, &Element)> {
        self.closest(path, Element::is_block)
    }

    pub fn closest_inline(&self, path: &Path) -> Option<(Path, &Element)> {
        self.closest(path, |element| element.is_inline)
    }

    /// Highest void element at or above `path`
    pub fn furthest_void(&self, path: &Path) -> Option<Path> {
        let levels = self.levels(path).ok()?;
        levels.into_iter().find_map(|(level, node)| match node {
            NodeRef::Element(element) if element.is_void => Some(level),
            _ => None,
        })
    }

    pub fn descendants(&self) -> Descendants<'_> {
        Descendants::new(Path::root(), &self.children)
    }

    /// Every node below `path`, in document order
    pub fn descendants_of(&self, path: &Path) -> ModelResult<Descendants<'_>> {
        let children = self.node(path)?.children();
        Ok(Descendants::new(path.clone(), children))
    }

    pub fn texts(&self) -> impl Iterator<Item = (Path, &Text)> {
        self.descendants()
            .filter_map(|(path, node)| node.as_text().map(|text| (path, text)))
    }

    /// Nodes that overlap the span from `from` to `to` in document order:
    /// ancestors of `from`, everything between, and descendants of `to`.
    pub fn nodes_between(&self, from: &Path, to: &Path) -> Vec<(Path, &Node)> {
        let mut out = Vec::new();
        collect_between(&self.children, &Path::root(), from, to, &mut out);
        out
    }

    /// Block elements without block children, voids included, in document
    /// order
    pub fn leaf_blocks(&self) -> Vec<(Path, &Element)> {
        let mut out = Vec::new();
        collect_leaf_blocks(&self.children, &Path::root(), &mut out);
        out
    }

    /// Leaf blocks overlapping the span from `from` to `to`
    pub fn leaf_blocks_between(&self, from: &Path, to: &Path) -> Vec<(Path, &Element)> {
        self.nodes_between(from, to)
            .into_iter()
            .filter_map(|(path, node)| match node {
                Node::Element(element) if element.is_block() && !element.has_block_children() => {
                    Some((path, element))
                }
                _ => None,
            })
            .collect()
    }

    /// The leaf block containing `path`, or the first leaf block below it
    /// when `path` is a block with block children
    pub fn leaf_block_at(&self, path: &Path) -> Option<(Path, &Element)> {
        match self.node(path).ok()? {
            NodeRef::Element(element) if element.is_block() => {
                let mut path = path.clone();
                let mut element = element;
                while element.has_block_children() {
                    let first = element.children.first()?.as_element()?;
                    path = path.child(0);
                    element = first;
                }
                Some((path, element))
            }
            NodeRef::Value(value) => {
                if value.children.is_empty() {
                    None
                } else {
                    self.leaf_block_at(&Path::from([0]))
                }
            }
            _ => self.closest_block(path),
        }
    }

    /// Last leaf block that ends before `path` in document order
    pub fn previous_leaf_block(&self, path: &Path) -> Option<(Path, &Element)> {
        self.leaf_blocks()
            .into_iter()
            .take_while(|(block, _)| block.is_before(path))
            .last()
    }

    /// First leaf block that starts after `path` in document order
    pub fn next_leaf_block(&self, path: &Path) -> Option<(Path, &Element)> {
        self.leaf_blocks()
            .into_iter()
            .find(|(block, _)| block.is_after(path))
    }

    pub fn first_text(&self, path: &Path) -> ModelResult<(Path, &Text)> {
        let mut path = path.clone();
        let mut node = self.node(&path)?;
        loop {
            match node {
                NodeRef::Text(text) => return Ok((path, text)),
                _ => {
                    let child = node
                        .children()
                        .first()
                        .ok_or_else(|| ModelError::not_text(&path))?;
                    path = path.child(0);
                    node = NodeRef::from(child);
                }
            }
        }
    }

    pub fn last_text(&self, path: &Path) -> ModelResult<(Path, &Text)> {
        let mut path = path.clone();
        let mut node = self.node(&path)?;
        loop {
            match node {
                NodeRef::Text(text) => return Ok((path, text)),
                _ => {
                    let children = node.children();
                    let child = children.last().ok_or_else(|| ModelError::not_text(&path))?;
                    path = path.child(children.len() - 1);
                    node = NodeRef::from(child);
                }
            }
        }
    }

    /// First point inside the node at `path`
    pub fn start(&self, path: &Path) -> ModelResult<Point> {
        let (path, _) = self.first_text(path)?;
        Ok(Point::new(path, 0))
    }

    /// Last point inside the node at `path`
    pub fn end(&self, path: &Path) -> ModelResult<Point> {
        let (path, text) = self.last_text(path)?;
        let len = text.len();
        Ok(Point::new(path, len))
    }

    /// Range spanning the whole node at `path`
    pub fn range_of(&self, path: &Path) -> ModelResult<Range> {
        Ok(Range::new(self.start(path)?, self.end(path)?))
    }

    pub fn string_at(&self, path: &Path) -> ModelResult<String> {
        Ok(self.node(path)?.string())
    }

    /// Text covered by `range`
    pub fn string_in(&self, range: &Range) -> String {
        let (start, end) = range.edges();
        let mut out = String::new();
        for (path, node) in self.nodes_between(&start.path, &end.path) {
            let Some(text) = node.as_text() else {
                continue;
            };
            let from = if path == start.path { start.offset } else { 0 };
            let to = if path == end.path { end.offset } else { text.len() };
            out.push_str(&text.slice(from, to));
        }
        out
    }

    /// Closest text leaf strictly before `path`
    pub fn previous_text(&self, path: &Path) -> Option<(Path, &Text)> {
        self.texts()
            .take_while(|(text, _)| text.is_before(path))
            .last()
    }

    /// Closest text leaf strictly after `path`
    pub fn next_text(&self, path: &Path) -> Option<(Path, &Text)> {
        self.texts().find(|(text, _)| text.is_after(path))
    }

    /// The point resolves to a text leaf and its offset is in bounds
    pub fn is_valid_point(&self, point: &Point) -> bool {
        self.text(&point.path)
            .map(|text| point.offset <= text.len())
            .unwrap_or(false)
    }

    pub fn is_valid_range(&self, range: &Range) -> bool {
        self.is_valid_point(&range.anchor) && self.is_valid_point(&range.focus)
    }
}

fn collect_between<'a>(
    children: &'a [Node],
    base: &Path,
    from: &Path,
    to: &Path,
    out: &mut Vec<(Path, &'a Node)>,
) {
    for (index, child) in children.iter().enumerate() {
        let path = base.child(index);
        if path.is_before(from) {
            continue;
        }
        if path.is_after(to) {
            break;
        }
        out.push((path.clone(), child));
        collect_between(child.children(), &path, from, to, out);
    }
}

fn collect_leaf_blocks<'a>(children: &'a [Node], base: &Path, out: &mut Vec<(Path, &'a Element)>) {
    for (index, child) in children.iter().enumerate() {
        if let Node::Element(element) = child {
            if element.is_inline {
                continue;
            }
            let path = base.child(index);
            if element.has_block_children() {
                collect_leaf_blocks(&element.children, &path, out);
            } else {
                out.push((path, element));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Element;
    use pretty_assertions::assert_eq;

    fn sample() -> Value {
        Value::new([
            Node::element("paragraph", [Node::text("one")]),
            Node::element(
                "quote",
                [
                    Node::element("paragraph", [Node::text("two")]),
                    Node::element(
                        "paragraph",
                        [
                            Node::text("th"),
                            Element::new("link")
                                .inline()
                                .with_children([Node::text("re")])
                                .into(),
                            Node::text("e"),
                        ],
                    ),
                ],
            ),
            Element::new("image").void().into(),
        ])
    }

    fn p<const N: usize>(indices: [usize; N]) -> Path {
        Path::from(indices)
    }

    #[test]
    fn test_get_and_out_of_range() {
        let value = sample();
        assert_eq!(value.get(&p([1, 1, 1, 0])).unwrap().string(), "re");
        assert!(matches!(
            value.get(&p([1, 5])),
            Err(ModelError::OutOfRange { .. })
        ));
        assert!(matches!(value.node(&Path::root()), Ok(NodeRef::Value(_))));
        assert!(value.text(&p([0])).is_err());
    }

    #[test]
    fn test_descendants_in_document_order() {
        let value = sample();
        let paths: Vec<Path> = value.descendants().map(|(path, _)| path).collect();
        assert_eq!(paths.first(), Some(&p([0])));
        assert_eq!(paths[1], p([0, 0]));
        assert_eq!(paths[2], p([1]));
        assert_eq!(paths.last(), Some(&p([2, 0])));
        assert!(paths.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn test_closest_and_voids() {
        let value = sample();
        let (block, element) = value.closest_block(&p([1, 1, 1, 0])).unwrap();
        assert_eq!(block, p([1, 1]));
        assert_eq!(element.kind, "paragraph");
        assert_eq!(value.closest_inline(&p([1, 1, 1, 0])).unwrap().0, p([1, 1, 1]));
        assert_eq!(value.furthest_void(&p([2, 0])), Some(p([2])));
        assert_eq!(value.furthest_void(&p([0, 0])), None);
    }

    #[test]
    fn test_leaf_blocks() {
        let value = sample();
        let paths: Vec<Path> = value.leaf_blocks().into_iter().map(|(path, _)| path).collect();
        assert_eq!(paths, vec![p([0]), p([1, 0]), p([1, 1]), p([2])]);
        assert_eq!(value.previous_leaf_block(&p([1, 1])).unwrap().0, p([1, 0]));
        assert_eq!(value.previous_leaf_block(&p([1])).unwrap().0, p([0]));
        assert_eq!(value.next_leaf_block(&p([0, 0])).unwrap().0, p([1, 0]));
        assert_eq!(value.leaf_block_at(&p([1])).unwrap().0, p([1, 0]));
        assert_eq!(value.leaf_block_at(&p([1, 1, 2])).unwrap().0, p([1, 1]));
    }

    #[test]
    fn test_nodes_between_bounds() {
        let value = sample();
        let paths: Vec<Path> = value
            .nodes_between(&p([1, 0, 0]), &p([1, 1, 0]))
            .into_iter()
            .map(|(path, _)| path)
            .collect();
        assert_eq!(
            paths,
            vec![p([1]), p([1, 0]), p([1, 0, 0]), p([1, 1]), p([1, 1, 0])]
        );
    }

    #[test]
    fn test_points_and_strings() {
        let value = sample();
        assert_eq!(value.start(&p([1])).unwrap(), Point::new(p([1, 0, 0]), 0));
        assert_eq!(value.end(&p([1])).unwrap(), Point::new(p([1, 1, 2]), 1));
        assert_eq!(value.string_at(&p([1])).unwrap(), "twothree");
        let range = Range::new(Point::new(p([0, 0]), 1), Point::new(p([1, 1, 1, 0]), 1));
        assert_eq!(value.string_in(&range), "netwothr");
        assert_eq!(value.previous_text(&p([1, 0, 0])).unwrap().0, p([0, 0]));
        assert_eq!(value.next_text(&p([1, 1, 0])).unwrap().0, p([1, 1, 1, 0]));
        assert!(value.is_valid_point(&Point::new(p([0, 0]), 3)));
        assert!(!value.is_valid_point(&Point::new(p([0, 0]), 4)));
    }
}
