//! Suffix tree over the reference
//!
//! Built once with Ukkonen's algorithm in time linear in the reference
//! length, then queried read-only for longest-prefix matches while the
//! source is factorized.
//!
//! Nodes live in an arena addressed by [`NodeId`]; every node owns one child
//! slot per alphabet symbol. After [`SuffixTree::build`] returns nothing is
//! mutated, so a tree can be shared between threads for concurrent queries.

mod builder;
mod node;
mod traversal;

pub use node::{EdgeEnd, Node, NodeId};
pub use traversal::DepthFirst;

use crate::alphabet::{AlphabetError, AlphabetMap, SymbolCode};
use thiserror::Error;
use tracing::debug;

/// Error type returned by suffix tree construction.
#[derive(Debug, Error)]
pub enum SuffixTreeError {
    /// Reference sequence was empty.
    #[error("reference sequence must be non-empty")]
    EmptyReference,

    /// Reference could not be mapped onto its own alphabet.
    #[error("alphabet error: {0}")]
    Alphabet(#[from] AlphabetError),
}

/// Longest match of a pattern prefix inside the reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Match {
    /// Reference offset of one occurrence of the matched prefix.
    pub position: usize,
    /// Number of pattern symbols matched.
    pub length: usize,
}

/// Suffix tree over a reference sequence.
#[derive(Debug, Clone)]
pub struct SuffixTree {
    alphabet: AlphabetMap,
    text: Vec<SymbolCode>,
    nodes: Vec<Node>,
    /// `nodes.len() * alphabet.len()` child slots, row-major by node.
    children: Vec<Option<NodeId>>,
}

impl SuffixTree {
    /// Build the suffix tree of `reference`.
    ///
    /// The alphabet is taken from the bytes observed in the reference. For
    /// every suffix to end at its own leaf the reference should end with a
    /// terminator that occurs nowhere else; without one the tree is implicit
    /// but longest-match queries remain correct.
    pub fn build(reference: &[u8]) -> Result<Self, SuffixTreeError> {
        if reference.is_empty() {
            return Err(SuffixTreeError::EmptyReference);
        }

        let alphabet = AlphabetMap::from_text(reference);
        let text = alphabet.encode(reference)?;

        let mut tree = Self {
            alphabet,
            text,
            nodes: Vec::with_capacity(2 * reference.len()),
            children: Vec::new(),
        };
        tree.push_node(Node::internal(0, 0));
        tree.nodes[NodeId::ROOT.index()].suffix_link = None;

        let tree = builder::Builder::new(tree).finish();
        debug!(
            reference_len = reference.len(),
            alphabet = tree.alphabet.len(),
            nodes = tree.node_count(),
            "suffix tree built"
        );
        Ok(tree)
    }

    /// Alphabet of the indexed reference.
    pub fn alphabet(&self) -> &AlphabetMap {
        &self.alphabet
    }

    /// Length of the indexed reference.
    pub fn len(&self) -> usize {
        self.text.len()
    }

    /// Returns `true` when the indexed reference is empty.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Number of nodes, root included.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of leaves.
    pub fn leaf_count(&self) -> usize {
        self.nodes.iter().filter(|node| node.is_leaf()).count()
    }

    /// Access a node by handle.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    /// Child of `node` whose edge starts with `symbol`.
    #[inline]
    pub fn child(&self, node: NodeId, symbol: SymbolCode) -> Option<NodeId> {
        self.children[node.index() * self.alphabet.len() + symbol as usize]
    }

    /// Children of `node` in symbol order.
    pub fn children(&self, node: NodeId) -> impl DoubleEndedIterator<Item = NodeId> + '_ {
        let width = self.alphabet.len();
        let row = node.index() * width;
        self.children[row..row + width].iter().flatten().copied()
    }

    /// Edge label of `node` as a reference interval `[start, end)`.
    pub fn edge(&self, node: NodeId) -> (usize, usize) {
        let node = &self.nodes[node.index()];
        (node.start, node.end_with(self.text.len()))
    }

    /// Depth-first iterator yielding `(node, label height)` pairs.
    pub fn depth_first(&self) -> DepthFirst<'_> {
        DepthFirst::new(self)
    }

    /// Longest prefix of the encoded `pattern` that occurs in the reference.
    ///
    /// Returns `None` when the first symbol never occurs in the reference.
    /// An empty pattern matches trivially with length zero.
    pub fn longest_match(&self, pattern: &[SymbolCode]) -> Option<Match> {
        self.walk(pattern.len(), |i| Some(pattern[i]))
    }

    /// Longest prefix of the raw byte `pattern` that occurs in the reference.
    ///
    /// Bytes outside the reference alphabet end the match; `None` is returned
    /// when the very first byte is such a byte.
    pub fn longest_match_bytes(&self, pattern: &[u8]) -> Option<Match> {
        self.walk(pattern.len(), |i| self.alphabet.code(pattern[i]))
    }

    fn walk<F>(&self, limit: usize, symbol_at: F) -> Option<Match>
    where
        F: Fn(usize) -> Option<SymbolCode>,
    {
        if limit == 0 {
            return Some(Match {
                position: 0,
                length: 0,
            });
        }

        let mut node = NodeId::ROOT;
        let mut matched = 0;
        while matched < limit {
            let Some(child) = symbol_at(matched).and_then(|symbol| self.child(node, symbol))
            else {
                break;
            };

            let (start, end) = self.edge(child);
            for offset in start..end {
                if matched == limit || symbol_at(matched) != Some(self.text[offset]) {
                    return Some(Match {
                        position: self.nodes[child.index()].suffix_index,
                        length: matched,
                    });
                }
                matched += 1;
            }
            node = child;
        }

        if matched == 0 {
            return None;
        }
        Some(Match {
            position: self.nodes[node.index()].suffix_index,
            length: matched,
        })
    }

    fn push_node(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        self.children
            .extend(std::iter::repeat(None).take(self.alphabet.len()));
        id
    }

    fn set_child(&mut self, parent: NodeId, symbol: SymbolCode, child: NodeId) {
        let width = self.alphabet.len();
        self.children[parent.index() * width + symbol as usize] = Some(child);
    }

    fn seal_leaves(&mut self, end: usize) {
        for node in &mut self.nodes {
            if node.end == EdgeEnd::Open {
                node.end = EdgeEnd::Fixed(end);
            }
        }
    }
}
