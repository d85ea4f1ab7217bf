//! Arena node representation
//!
//! Each node stores the edge leading into it as a half-open interval
//! `[start, end)` of the reference. Children live in a flat table owned by
//! the tree, one slot per alphabet symbol.

/// Stable handle of a node inside the tree arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Handle of the root node.
    pub const ROOT: NodeId = NodeId(0);

    /// Position of the node in the arena.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// End of the edge leading into a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeEnd {
    /// Leaf edge that grows with the construction cursor.
    Open,
    /// Edge ending (exclusive) at a fixed reference offset.
    Fixed(usize),
}

/// Suffix tree node
#[derive(Debug, Clone)]
pub struct Node {
    /// Reference offset where the incoming edge label starts
    pub(crate) start: usize,

    /// Exclusive end of the incoming edge label
    pub(crate) end: EdgeEnd,

    /// Suffix link (internal nodes only)
    pub(crate) suffix_link: Option<NodeId>,

    /// Start of some reference suffix passing through this node.
    /// Resolved once construction is complete.
    pub(crate) suffix_index: usize,

    leaf: bool,
}

impl Node {
    pub(crate) fn leaf(start: usize) -> Self {
        Self {
            start,
            end: EdgeEnd::Open,
            suffix_link: None,
            suffix_index: 0,
            leaf: true,
        }
    }

    pub(crate) fn internal(start: usize, end: usize) -> Self {
        Self {
            start,
            end: EdgeEnd::Fixed(end),
            suffix_link: Some(NodeId::ROOT),
            suffix_index: 0,
            leaf: false,
        }
    }

    /// Whether the node was created as a leaf.
    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.leaf
    }

    /// Edge end, resolving open leaves against `open_end`.
    #[inline]
    pub(crate) fn end_with(&self, open_end: usize) -> usize {
        match self.end {
            EdgeEnd::Open => open_end,
            EdgeEnd::Fixed(end) => end,
        }
    }

    /// Length of the incoming edge label, resolving open leaves against `open_end`.
    #[inline]
    pub(crate) fn edge_len(&self, open_end: usize) -> usize {
        self.end_with(open_end) - self.start
    }

    /// Start of a reference suffix reachable through this node.
    pub fn suffix_index(&self) -> usize {
        self.suffix_index
    }
}
