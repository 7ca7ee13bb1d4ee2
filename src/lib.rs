//! # libkwmatch
//!
//! Multi-pattern exact string matching over a fixed-width symbol alphabet.
//!
//! Two automatons are built over a dynamic set of keywords, each keyword tagged
//! with a caller-supplied payload that is handed back on a match:
//!
//! - [`AhoCorasick`] enumerates every occurrence of every keyword in a single
//!   left-to-right pass, in O(document length).
//! - [`CommentzWalter`] matches keyword suffixes right-to-left inside a sliding
//!   window and skips ahead using precomputed shift bounds. It reports at most
//!   one match per scan, not necessarily the leftmost one.
//!
//! Both are generic over the edge label type ([`Symbol`]): raw bytes (`u8`) or
//! UTF-16 code units (`u16`). The [`transcode`] module turns UTF-8 text into
//! UTF-16 at the boundary.
//!
//! ## Quick Start
//!
//! ```
//! use libkwmatch::{AhoCorasick, CommentzWalter};
//!
//! let mut ac = AhoCorasick::<u8, &str>::new(16);
//! for keyword in ["abcd", "cd", "bcd", "d"] {
//!     ac.add_keyword(keyword, keyword).unwrap();
//! }
//! let found: Vec<_> = ac.scan(b"abcd").map(|m| *m.payload()).collect();
//! assert_eq!(found, ["abcd", "bcd", "cd", "d"]);
//!
//! let mut cw = CommentzWalter::<u8, &str>::new(64);
//! for keyword in ["cacbaa", "acb", "aba", "acbab", "ccbab"] {
//!     cw.add_keyword(keyword, keyword).unwrap();
//! }
//! assert_eq!(cw.scan(b"ecbabbcacbaa").map(|m| *m.payload()), Some("acb"));
//! assert!(cw.scan(b"ecbabbccbaa").is_none());
//! ```
//!
//! ## Compilation
//!
//! Adding a keyword invalidates the derived tables (failure links, shift
//! bounds). `scan` recompiles lazily; call `compile` explicitly and then use
//! `scan_shared` to scan from several threads through a shared reference.

#![warn(missing_docs)]

/// Aho-Corasick automaton and its match iterators.
pub mod aho_corasick;
/// Commentz-Walter automaton.
pub mod commentz_walter;
/// Crate-level error type.
pub mod error;
/// UTF-8 to UTF-16 adapter and UTF-8 entry points for `u16` automatons.
#[cfg(feature = "transcode")]
pub mod transcode;
/// Keyword trie primitives shared by both automatons.
pub mod trie;

pub use aho_corasick::{AhoCorasick, Matches, OwnedMatches};
pub use commentz_walter::CommentzWalter;
pub use error::Error;
#[cfg(feature = "transcode")]
pub use transcode::EncodingError;
pub use trie::{IntoSymbols, PatternError, Symbol};

/// Whether an automaton's derived tables reflect every inserted keyword.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CompileState {
    /// Keywords were added since the last compile pass.
    Stale,
    /// Derived tables are current.
    Compiled,
}

impl CompileState {
    /// True for [`CompileState::Compiled`].
    #[inline]
    pub fn is_compiled(self) -> bool {
        self == CompileState::Compiled
    }
}

/// One keyword occurrence: the keyword's payload and where it was found.
///
/// Offsets are in symbols, `start` inclusive and `end` exclusive. Two matches
/// are equal when they span the same offsets and carry the very same payload
/// (compared by address, not by value).
#[derive(Debug)]
pub struct Match<'a, P> {
    payload: &'a P,
    start: usize,
    end: usize,
}

impl<P> Clone for Match<'_, P> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<P> Copy for Match<'_, P> {}

impl<P> PartialEq for Match<'_, P> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.payload, other.payload)
            && self.start == other.start
            && self.end == other.end
    }
}

impl<P> Eq for Match<'_, P> {}

impl<'a, P> Match<'a, P> {
    pub(crate) fn new(payload: &'a P, start: usize, end: usize) -> Self {
        Match {
            payload,
            start,
            end,
        }
    }

    /// The payload the keyword was added with.
    #[inline]
    pub fn payload(&self) -> &'a P {
        self.payload
    }

    /// Offset of the first symbol of the occurrence.
    #[inline]
    pub fn start(&self) -> usize {
        self.start
    }

    /// Offset one past the last symbol of the occurrence.
    #[inline]
    pub fn end(&self) -> usize {
        self.end
    }

    /// Length of the matched keyword.
    #[inline]
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Always false: keywords are never empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}
