//! Aho-Corasick automaton: reports every occurrence of every keyword in one
//! left-to-right pass over the document.
//!
//! The goto function is the keyword trie itself, the failure function lives on
//! each node as a link to another node of the same trie, and the output function
//! is the payload stored on keyword-terminal nodes together with the outputs
//! reachable along the failure chain.

use std::fmt;
use std::iter::FusedIterator;

use crate::error::Error;
use crate::trie::builder::{check_pattern_len, IntoSymbols, PatternError, Trie};
use crate::trie::{Label, NodeId, Symbol};
use crate::{CompileState, Match};

/// Per-node failure link.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct AcMeta {
    fail: NodeId,
}

impl Default for AcMeta {
    fn default() -> Self {
        AcMeta { fail: NodeId::ROOT }
    }
}

type AcTrie<C, P> = Trie<C, P, AcMeta>;

/// A multi-pattern matcher that enumerates all keyword occurrences.
///
/// Keywords are added with [`add_keyword`](AhoCorasick::add_keyword); failure
/// links are derived on the next [`compile`](AhoCorasick::compile), which
/// [`scan`](AhoCorasick::scan) runs implicitly.
///
/// # Examples
///
/// ```
/// use libkwmatch::AhoCorasick;
///
/// let mut ac = AhoCorasick::<u8, &str>::new(16);
/// for keyword in ["ab", "cd", "bc", "de"] {
///     ac.add_keyword(keyword, keyword).unwrap();
/// }
/// let found: Vec<_> = ac.scan(b"abcde").map(|m| *m.payload()).collect();
/// assert_eq!(found, ["ab", "bc", "cd", "de"]);
/// ```
#[derive(Clone, Debug)]
pub struct AhoCorasick<C: Symbol, P> {
    trie: AcTrie<C, P>,
    max_pattern_len: usize,
    state: CompileState,
}

impl<C: Symbol, P> AhoCorasick<C, P> {
    /// Creates an empty automaton accepting keywords of up to `max_pattern_len` symbols.
    pub fn new(max_pattern_len: usize) -> Self {
        AhoCorasick {
            trie: Trie::new(),
            max_pattern_len,
            state: CompileState::Compiled,
        }
    }

    /// Adds a keyword, tagging it with `payload`.
    ///
    /// Adding a keyword that is already present replaces its payload.
    ///
    /// # Errors
    ///
    /// Returns [`PatternError::TooLongPattern`] if the keyword exceeds the
    /// configured maximum length and [`PatternError::EmptyPattern`] if it has no
    /// symbols. The automaton is unchanged in both cases.
    pub fn add_keyword(
        &mut self,
        pattern: impl IntoSymbols<C>,
        payload: P,
    ) -> Result<(), PatternError> {
        let pattern = pattern.collect_symbols();
        check_pattern_len(pattern.len(), self.max_pattern_len)?;
        log::trace!("aho-corasick: adding keyword {:?}", pattern.as_slice());
        self.trie.insert(pattern, payload);
        self.state = CompileState::Stale;
        Ok(())
    }

    /// Derives the failure link of every node. Does nothing if no keyword was
    /// added since the last call.
    pub fn compile(&mut self) {
        if self.state.is_compiled() {
            return;
        }
        self.rebuild();
        self.state = CompileState::Compiled;
    }

    fn rebuild(&mut self) {
        let links = self.trie.suffix_links();
        for &id in links.breadth_first() {
            self.trie.node_mut(id).meta.fail = links.fail(id);
        }
        log::debug!(
            "aho-corasick: compiled {} nodes for {} keywords",
            self.trie.len(),
            self.trie.keyword_count()
        );
    }

    /// True when failure links reflect every keyword added so far.
    pub fn is_compiled(&self) -> bool {
        self.state.is_compiled()
    }

    /// Compiles if needed, then returns an iterator over all matches in `document`.
    ///
    /// Matches come in ascending order of end position; matches ending at the
    /// same position come longest first.
    pub fn scan<'a>(&'a mut self, document: &'a [C]) -> Matches<'a, C, P> {
        self.compile();
        Matches::new(&self.trie, document)
    }

    /// Like [`scan`](AhoCorasick::scan) but takes ownership of the document, so
    /// the iterator can outlive the caller's buffer.
    pub fn scan_owned(&mut self, document: Vec<C>) -> OwnedMatches<'_, C, P> {
        self.compile();
        OwnedMatches {
            trie: &self.trie,
            document,
            cursor: Cursor::default(),
        }
    }

    /// Scans through a shared reference, for use from several threads once
    /// [`compile`](AhoCorasick::compile) has run.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotCompiled`] if keywords were added since the last compile.
    pub fn scan_shared<'a>(&'a self, document: &'a [C]) -> Result<Matches<'a, C, P>, Error> {
        if !self.is_compiled() {
            return Err(Error::NotCompiled);
        }
        Ok(Matches::new(&self.trie, document))
    }

    /// Returns the configured maximum keyword length.
    pub fn max_pattern_len(&self) -> usize {
        self.max_pattern_len
    }

    /// Returns the number of distinct keywords.
    pub fn keyword_count(&self) -> usize {
        self.trie.keyword_count()
    }

    /// Returns the number of trie nodes, root included.
    pub fn len(&self) -> usize {
        self.trie.len()
    }

    /// True if no keyword has been added.
    pub fn is_empty(&self) -> bool {
        self.trie.is_empty()
    }

    /// Writes an indented listing of the trie with each node's failure link and
    /// output, compiling first. Meant for debugging only; the format is not stable.
    pub fn dump(&mut self, out: &mut impl fmt::Write) -> fmt::Result
    where
        P: fmt::Debug,
    {
        self.compile();
        let mut stack = vec![(C::default(), NodeId::ROOT)];
        while let Some((label, id)) = stack.pop() {
            let node = self.trie.node(id);
            if !id.is_root() {
                let indent = 2 * (node.depth() - 1);
                write!(out, "{:indent$}{}: <{id}> ", "", Label(label))?;
                if node.meta.fail.is_root() {
                    write!(out, "failure=(start), ")?;
                } else {
                    write!(out, "failure={}, ", node.meta.fail)?;
                }
                writeln!(out, "output={:?}", node.output())?;
            }
            let mark = stack.len();
            stack.extend(node.children().iter());
            stack[mark..].reverse();
        }
        Ok(())
    }
}

/// Scan position shared by the borrowed and owned match iterators.
#[derive(Clone, Debug)]
struct Cursor {
    state: NodeId,
    /// Next node of the failure chain still to be checked for output; the root
    /// when the chain is exhausted.
    pending: NodeId,
    position: usize,
}

impl Default for Cursor {
    fn default() -> Self {
        Cursor {
            state: NodeId::ROOT,
            pending: NodeId::ROOT,
            position: 0,
        }
    }
}

impl Cursor {
    fn advance<'a, C: Symbol, P>(
        &mut self,
        trie: &'a AcTrie<C, P>,
        document: &[C],
    ) -> Option<Match<'a, P>> {
        loop {
            // Every node on the chain ends at the current position, each one
            // shorter than the last.
            while !self.pending.is_root() {
                let node = trie.node(self.pending);
                self.pending = node.meta.fail;
                if let Some(payload) = node.output() {
                    let start = self.position - node.depth();
                    return Some(Match::new(payload, start, self.position));
                }
            }

            let &label = document.get(self.position)?;
            match trie.child(self.state, label) {
                Some(next) => {
                    self.state = next;
                    self.position += 1;
                    self.pending = next;
                }
                None if self.state.is_root() => self.position += 1,
                None => self.state = trie.node(self.state).meta.fail,
            }
        }
    }
}

/// Lazy iterator over the matches of an [`AhoCorasick`] automaton in a borrowed
/// document.
///
/// Dropping it at any point leaves the automaton unaffected; to rescan, create a
/// new iterator.
#[derive(Clone, Debug)]
pub struct Matches<'a, C: Symbol, P> {
    trie: &'a AcTrie<C, P>,
    document: &'a [C],
    cursor: Cursor,
}

impl<'a, C: Symbol, P> Matches<'a, C, P> {
    fn new(trie: &'a AcTrie<C, P>, document: &'a [C]) -> Self {
        Matches {
            trie,
            document,
            cursor: Cursor::default(),
        }
    }
}

impl<'a, C: Symbol, P> Iterator for Matches<'a, C, P> {
    type Item = Match<'a, P>;

    fn next(&mut self) -> Option<Self::Item> {
        self.cursor.advance(self.trie, self.document)
    }
}

impl<C: Symbol, P> FusedIterator for Matches<'_, C, P> {}

/// Lazy iterator over the matches of an [`AhoCorasick`] automaton in a document
/// it owns, typically one produced by transcoding.
///
/// The document buffer is released when the iterator is dropped.
#[derive(Clone, Debug)]
pub struct OwnedMatches<'a, C: Symbol, P> {
    trie: &'a AcTrie<C, P>,
    document: Vec<C>,
    cursor: Cursor,
}

impl<C: Symbol, P> OwnedMatches<'_, C, P> {
    /// The document being scanned.
    pub fn document(&self) -> &[C] {
        &self.document
    }
}

impl<'a, C: Symbol, P> Iterator for OwnedMatches<'a, C, P> {
    type Item = Match<'a, P>;

    fn next(&mut self) -> Option<Self::Item> {
        self.cursor.advance(self.trie, &self.document)
    }
}

impl<C: Symbol, P> FusedIterator for OwnedMatches<'_, C, P> {}
