/// Keyword trie construction and the failure-link computation shared by both automatons.
pub mod builder;
/// Compact child-edge list of a trie node.
pub mod children;
/// Index-addressed node storage.
pub mod node_arena;
/// Trait for types that can serve as trie edge labels.
pub mod symbol;

use std::fmt;

pub use builder::{IntoSymbols, PatternError, Trie};
pub use children::Children;
pub use node_arena::{NodeId, TrieNode};
pub use symbol::Symbol;

/// Displays an edge label as a quoted character when it has one, or as its raw
/// value otherwise.
pub(crate) struct Label<C>(pub C);

impl<C: Symbol> fmt::Display for Label<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.as_char() {
            Some(ch) => write!(f, "\"{}\"", ch.escape_debug()),
            None => write!(f, "{:?}", self.0),
        }
    }
}
