use std::collections::VecDeque;

use smallvec::SmallVec;
use thiserror::Error;

use super::node_arena::{NodeArena, NodeId, TrieNode};
use super::symbol::Symbol;

/// Trait for types that can be used as a keyword or document.
///
/// Implemented for common sequence types so that `add_keyword` accepts them
/// directly without manual conversion. String types map onto their UTF-8 bytes;
/// for UTF-16 code units go through the [`transcode`](crate::transcode) adapter.
pub trait IntoSymbols<C: Symbol> {
    /// Collects this word into a symbol buffer.
    fn collect_symbols(self) -> SmallVec<[C; 32]>;
}

// String types → u8

impl IntoSymbols<u8> for &str {
    fn collect_symbols(self) -> SmallVec<[u8; 32]> {
        SmallVec::from_slice(self.as_bytes())
    }
}

impl IntoSymbols<u8> for &&str {
    fn collect_symbols(self) -> SmallVec<[u8; 32]> {
        SmallVec::from_slice(self.as_bytes())
    }
}

impl IntoSymbols<u8> for String {
    fn collect_symbols(self) -> SmallVec<[u8; 32]> {
        SmallVec::from_vec(self.into_bytes())
    }
}

impl IntoSymbols<u8> for &String {
    fn collect_symbols(self) -> SmallVec<[u8; 32]> {
        SmallVec::from_slice(self.as_bytes())
    }
}

// Generic sequence types → C

impl<C: Symbol> IntoSymbols<C> for &[C] {
    fn collect_symbols(self) -> SmallVec<[C; 32]> {
        SmallVec::from_slice(self)
    }
}

impl<C: Symbol> IntoSymbols<C> for Vec<C> {
    fn collect_symbols(self) -> SmallVec<[C; 32]> {
        SmallVec::from_vec(self)
    }
}

impl<C: Symbol> IntoSymbols<C> for &Vec<C> {
    fn collect_symbols(self) -> SmallVec<[C; 32]> {
        SmallVec::from_slice(self)
    }
}

impl<C: Symbol, const N: usize> IntoSymbols<C> for [C; N] {
    fn collect_symbols(self) -> SmallVec<[C; 32]> {
        self.into_iter().collect()
    }
}

impl<C: Symbol, const N: usize> IntoSymbols<C> for &[C; N] {
    fn collect_symbols(self) -> SmallVec<[C; 32]> {
        SmallVec::from_slice(self)
    }
}

/// Errors that can occur when adding a keyword to an automaton.
///
/// A failed insertion leaves the automaton untouched.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PatternError {
    /// The keyword is longer than the automaton's configured maximum.
    #[error("fed pattern is too long: len={len}, max={max}")]
    TooLongPattern {
        /// Length of the rejected keyword, in symbols.
        len: usize,
        /// Configured maximum keyword length.
        max: usize,
    },
    /// The keyword has no symbols.
    #[error("fed pattern is empty")]
    EmptyPattern,
}

/// Checks a keyword length against an automaton's bound before any mutation.
pub(crate) fn check_pattern_len(len: usize, max: usize) -> Result<(), PatternError> {
    if len == 0 {
        Err(PatternError::EmptyPattern)
    } else if len > max {
        Err(PatternError::TooLongPattern { len, max })
    } else {
        Ok(())
    }
}

/// A prefix tree over `C`, built by path insertion.
///
/// Nodes are created only by [`insert`](Trie::insert) and never removed. Each
/// node carries automaton-specific metadata `M` which the owning automaton
/// recomputes in full on every compile pass.
#[derive(Clone, Debug)]
pub struct Trie<C: Symbol, P, M> {
    nodes: NodeArena<TrieNode<C, P, M>>,
    keywords: usize,
}

/// Failure links of every node plus the breadth-first order they were derived in.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct SuffixLinks {
    fail: Vec<NodeId>,
    order: Vec<NodeId>,
}

impl SuffixLinks {
    /// The node spelling the longest proper suffix of `id`'s path that is also
    /// a path from the root. The root links to itself.
    #[inline]
    pub fn fail(&self, id: NodeId) -> NodeId {
        self.fail[id.index()]
    }

    /// All nodes, parents before children, root first.
    pub fn breadth_first(&self) -> &[NodeId] {
        &self.order
    }
}

impl<C: Symbol, P, M: Default> Trie<C, P, M> {
    /// Creates a trie holding only the root.
    pub fn new() -> Self {
        Trie {
            nodes: NodeArena::new(),
            keywords: 0,
        }
    }

    /// Inserts the path spelled by `symbols`, reusing any existing common prefix,
    /// and stores `payload` on the terminal node. Re-inserting a path replaces its
    /// payload. Returns the terminal node.
    pub(crate) fn insert<I>(&mut self, symbols: I, payload: P) -> NodeId
    where
        I: IntoIterator<Item = C>,
    {
        let mut symbols = symbols.into_iter();
        let mut current = NodeId::ROOT;

        // Skip nodes that already exist.
        let mut divergence = None;
        for label in symbols.by_ref() {
            match self.nodes[current].get(label) {
                Some(next) => current = next,
                None => {
                    divergence = Some(label);
                    break;
                }
            }
        }

        for label in divergence.into_iter().chain(symbols) {
            current = self.nodes.alloc_child(current, label);
        }

        let terminal = &mut self.nodes[current];
        if terminal.output().is_none() {
            self.keywords += 1;
        }
        terminal.set_output(payload);
        current
    }
}

impl<C: Symbol, P, M: Default> Default for Trie<C, P, M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Symbol, P, M> Trie<C, P, M> {
    /// Returns the node with the given id.
    #[inline]
    pub fn node(&self, id: NodeId) -> &TrieNode<C, P, M> {
        &self.nodes[id]
    }

    #[inline]
    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut TrieNode<C, P, M> {
        &mut self.nodes[id]
    }

    /// Follows the edge labeled `label` out of `id`.
    #[inline]
    pub fn child(&self, id: NodeId, label: C) -> Option<NodeId> {
        self.nodes[id].get(label)
    }

    /// Walks `symbols` from the root, returning the node reached if the whole
    /// sequence is a path.
    pub fn walk(&self, symbols: impl IntoIterator<Item = C>) -> Option<NodeId> {
        symbols
            .into_iter()
            .try_fold(NodeId::ROOT, |id, label| self.child(id, label))
    }

    /// Returns the number of nodes, root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True if no keyword has been inserted.
    pub fn is_empty(&self) -> bool {
        self.keywords == 0
    }

    /// Returns the number of distinct keywords stored.
    pub fn keyword_count(&self) -> usize {
        self.keywords
    }

    /// Computes the failure link of every node.
    ///
    /// Breadth-first, so each node's link is derived from its parent's already
    /// final link: follow the parent's chain until some node has an edge on the
    /// same label, or the root is reached without one.
    pub(crate) fn suffix_links(&self) -> SuffixLinks {
        let mut fail = vec![NodeId::ROOT; self.len()];
        let mut order = Vec::with_capacity(self.len());
        let mut queue = VecDeque::from([NodeId::ROOT]);

        while let Some(id) = queue.pop_front() {
            order.push(id);
            for (label, child) in self.nodes[id].children().iter() {
                if !id.is_root() {
                    let link = self.follow(&fail, fail[id.index()], label);
                    fail[child.index()] = link;
                }
                queue.push_back(child);
            }
        }

        SuffixLinks { fail, order }
    }

    fn follow(&self, fail: &[NodeId], mut state: NodeId, label: C) -> NodeId {
        loop {
            if let Some(next) = self.child(state, label) {
                return next;
            }
            if state.is_root() {
                return NodeId::ROOT;
            }
            state = fail[state.index()];
        }
    }
}
