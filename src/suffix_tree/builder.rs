//! Ukkonen construction session
//!
//! All mutable construction state (active point, remainder counter, open
//! leaf end, node awaiting a suffix link) lives in [`Builder`] and is dropped
//! once the finished tree is returned.

use super::node::{Node, NodeId};
use super::{traversal, SuffixTree};
use crate::alphabet::SymbolCode;

/// Construction session for a [`SuffixTree`].
#[derive(Debug)]
pub(crate) struct Builder {
    tree: SuffixTree,
    active_node: NodeId,
    /// Reference offset whose symbol selects the active edge.
    active_edge: usize,
    active_length: usize,
    remaining: usize,
    /// Exclusive end shared by every open leaf.
    open_end: usize,
    pending_link: Option<NodeId>,
}

impl Builder {
    pub(crate) fn new(tree: SuffixTree) -> Self {
        Self {
            tree,
            active_node: NodeId::ROOT,
            active_edge: 0,
            active_length: 0,
            remaining: 0,
            open_end: 0,
            pending_link: None,
        }
    }

    /// Run every phase, seal open leaves and resolve suffix indices.
    pub(crate) fn finish(mut self) -> SuffixTree {
        for pos in 0..self.tree.text.len() {
            self.extend(pos);
        }

        let len = self.tree.text.len();
        self.tree.seal_leaves(len);
        traversal::resolve_suffix_indices(&mut self.tree);
        self.tree
    }

    #[inline]
    fn symbol(&self, pos: usize) -> SymbolCode {
        self.tree.text[pos]
    }

    fn extend(&mut self, pos: usize) {
        // Rule 1: every open leaf grows with the shared end.
        self.open_end = pos + 1;
        self.remaining += 1;
        self.pending_link = None;

        while self.remaining > 0 {
            if self.active_length == 0 {
                self.active_edge = pos;
            }

            let edge_symbol = self.symbol(self.active_edge);
            match self.tree.child(self.active_node, edge_symbol) {
                None => {
                    // Rule 2: new leaf straight off the active node.
                    let leaf = self.tree.push_node(Node::leaf(pos));
                    self.tree.set_child(self.active_node, edge_symbol, leaf);
                    if let Some(pending) = self.pending_link.take() {
                        self.tree.nodes[pending.index()].suffix_link = Some(self.active_node);
                    }
                }
                Some(next) => {
                    let edge_len = self.tree.nodes[next.index()].edge_len(self.open_end);
                    if self.active_length >= edge_len {
                        // Skip/count: hop over the whole edge.
                        self.active_edge += edge_len;
                        self.active_length -= edge_len;
                        self.active_node = next;
                        continue;
                    }

                    let next_start = self.tree.nodes[next.index()].start;
                    if self.symbol(next_start + self.active_length) == self.symbol(pos) {
                        // Rule 3: already present, the phase ends here.
                        if self.active_node != NodeId::ROOT {
                            if let Some(pending) = self.pending_link.take() {
                                self.tree.nodes[pending.index()].suffix_link =
                                    Some(self.active_node);
                            }
                        }
                        self.active_length += 1;
                        break;
                    }

                    let split_end = next_start + self.active_length;
                    let split = self.tree.push_node(Node::internal(next_start, split_end));
                    self.tree.set_child(self.active_node, edge_symbol, split);

                    let leaf = self.tree.push_node(Node::leaf(pos));
                    self.tree.set_child(split, self.symbol(pos), leaf);

                    self.tree.nodes[next.index()].start = split_end;
                    self.tree.set_child(split, self.symbol(split_end), next);

                    if let Some(pending) = self.pending_link {
                        self.tree.nodes[pending.index()].suffix_link = Some(split);
                    }
                    self.pending_link = Some(split);
                }
            }

            self.remaining -= 1;
            if self.active_node == NodeId::ROOT && self.active_length > 0 {
                self.active_length -= 1;
                self.active_edge = pos + 1 - self.remaining;
            } else if self.active_node != NodeId::ROOT {
                self.active_node = self.tree.nodes[self.active_node.index()]
                    .suffix_link
                    .unwrap_or(NodeId::ROOT);
            }
        }
    }
}
