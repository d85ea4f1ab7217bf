//! Depth-first traversals over the finished tree
//!
//! Both walks use an explicit stack so that deep trees built from long,
//! repetitive references cannot exhaust the call stack.

use super::{NodeId, SuffixTree};

/// Pre-order iterator over `(node, label height)` pairs.
///
/// Children are visited in symbol order.
#[derive(Debug)]
pub struct DepthFirst<'a> {
    tree: &'a SuffixTree,
    stack: Vec<(NodeId, usize)>,
}

impl<'a> DepthFirst<'a> {
    pub(crate) fn new(tree: &'a SuffixTree) -> Self {
        Self {
            tree,
            stack: vec![(NodeId::ROOT, 0)],
        }
    }
}

impl Iterator for DepthFirst<'_> {
    type Item = (NodeId, usize);

    fn next(&mut self) -> Option<Self::Item> {
        let (id, height) = self.stack.pop()?;
        for child in self.tree.children(id).rev() {
            let (start, end) = self.tree.edge(child);
            self.stack.push((child, height + end - start));
        }
        Some((id, height))
    }
}

/// Resolve the suffix index of every node.
///
/// Leaves get `len - label height`. Internal nodes, the root included,
/// inherit the index of the last leaf resolved below them, so any node a
/// match query stops at reports a real occurrence.
pub(crate) fn resolve_suffix_indices(tree: &mut SuffixTree) {
    let len = tree.text.len();
    let mut stack = vec![(NodeId::ROOT, 0usize, false)];
    let mut last_leaf = 0;

    while let Some((id, height, expanded)) = stack.pop() {
        if tree.nodes[id.index()].is_leaf() {
            last_leaf = len - height;
            tree.nodes[id.index()].suffix_index = last_leaf;
            continue;
        }
        if expanded {
            tree.nodes[id.index()].suffix_index = last_leaf;
            continue;
        }

        stack.push((id, height, true));
        let first_child = stack.len();
        for child in tree.children(id) {
            let (start, end) = tree.edge(child);
            stack.push((child, height + end - start, false));
        }
        stack[first_child..].reverse();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preorder_visits_every_node_once() {
        let tree = SuffixTree::build(b"BANANA$").unwrap();
        let visited: Vec<_> = tree.depth_first().map(|(id, _)| id).collect();
        assert_eq!(visited.len(), tree.node_count());
        assert_eq!(visited[0], NodeId::ROOT);
    }

    #[test]
    fn internal_indices_point_into_their_subtree() {
        let reference = b"BANANA$";
        let tree = SuffixTree::build(reference).unwrap();
        for (id, height) in tree.depth_first().skip(1) {
            let start = tree.node(id).suffix_index();
            // The path label of the node must be a prefix of the suffix it reports.
            assert!(start + height <= reference.len());
        }
        // "ANA" is an internal node: its occurrence must really spell "ANA".
        let found = tree.longest_match_bytes(b"ANA").unwrap();
        assert_eq!(&reference[found.position..found.position + 3], b"ANA");
    }
}
