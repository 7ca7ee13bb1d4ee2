//! Index-addressed node storage for tries with back-pointers.
//!
//! Failure links turn the trie into a graph with cycles back toward the root, so
//! nodes live in a flat `Vec` and refer to each other by [`NodeId`]. Nodes are
//! only ever appended; the whole arena is released with its automaton.

use std::fmt;
use std::ops::{Index, IndexMut};

use super::children::Children;
use super::symbol::Symbol;

/// Stable index of a node inside a [`NodeArena`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u32);

impl NodeId {
    /// The root node, always the first allocation.
    pub const ROOT: NodeId = NodeId(0);

    pub(crate) fn new(index: usize) -> Self {
        NodeId(u32::try_from(index).expect("node arena exceeds u32::MAX nodes"))
    }

    /// Position of this node in its arena.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// True for [`NodeId::ROOT`].
    #[inline]
    pub fn is_root(self) -> bool {
        self == Self::ROOT
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A node in a keyword trie.
///
/// `M` is the automaton-specific metadata: failure links for Aho-Corasick,
/// shift bounds for Commentz-Walter.
#[derive(Clone, Debug)]
pub struct TrieNode<C: Symbol, P, M> {
    children: Children<C>,
    output: Option<P>,
    depth: usize,
    pub(crate) meta: M,
}

impl<C: Symbol, P, M: Default> TrieNode<C, P, M> {
    fn new(depth: usize) -> Self {
        TrieNode {
            children: Children::None,
            output: None,
            depth,
            meta: M::default(),
        }
    }
}

impl<C: Symbol, P, M> TrieNode<C, P, M> {
    /// Returns the node that `label`'s edge leads to, or None if no such edge exists.
    #[inline]
    pub fn get(&self, label: C) -> Option<NodeId> {
        self.children.get(label)
    }

    /// The outgoing edges of this node.
    #[inline]
    pub fn children(&self) -> &Children<C> {
        &self.children
    }

    /// The payload stored if this node ends a complete keyword.
    #[inline]
    pub fn output(&self) -> Option<&P> {
        self.output.as_ref()
    }

    /// Length of the path from the root to this node.
    #[inline]
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub(crate) fn set_output(&mut self, payload: P) {
        self.output = Some(payload);
    }
}

/// Append-only storage for trie nodes.
#[derive(Clone, Debug)]
pub(crate) struct NodeArena<N> {
    nodes: Vec<N>,
}

impl<C: Symbol, P, M: Default> NodeArena<TrieNode<C, P, M>> {
    /// Creates an arena holding only the root node.
    pub fn new() -> Self {
        NodeArena {
            nodes: vec![TrieNode::new(0)],
        }
    }

    /// Appends a childless node below `parent` on edge `label` and returns its id.
    pub fn alloc_child(&mut self, parent: NodeId, label: C) -> NodeId {
        let id = NodeId::new(self.nodes.len());
        let depth = self[parent].depth + 1;
        self.nodes.push(TrieNode::new(depth));
        self[parent].children.insert(label, id);
        id
    }
}

impl<N> NodeArena<N> {
    /// Returns the number of nodes allocated in this arena, root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }
}

impl<N> Index<NodeId> for NodeArena<N> {
    type Output = N;

    #[inline]
    fn index(&self, id: NodeId) -> &N {
        &self.nodes[id.index()]
    }
}

impl<N> IndexMut<NodeId> for NodeArena<N> {
    #[inline]
    fn index_mut(&mut self, id: NodeId) -> &mut N {
        &mut self.nodes[id.index()]
    }
}
