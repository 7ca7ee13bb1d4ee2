//! Commentz-Walter automaton: a backward-matching filter that slides a window
//! over the document and skips ahead by precomputed shift bounds.
//!
//! Keywords are stored reversed, so a node's path (its `word`) is a keyword
//! suffix read right to left. For every node `v`:
//!
//! - `shift1(v)` is the smallest `d > 0` such that `word(v)` recurs `d` symbols
//!   deeper as a suffix of some other node's word, or `w_min` if none does.
//! - `shift2(v)` is the same bound restricted to words that are whole keywords,
//!   further capped by the parent's `shift2`.
//!
//! and for every symbol `a`, `min_depth(a)` is the shallowest edge labeled `a`,
//! capped at `w_min + 1`. The window advances by
//! `min(max(shift1, min_depth(a) - j - 1), shift2)` after a mismatch on `a` with
//! `j` symbols matched, which never steps over an occurrence.

use std::fmt;

use smallvec::SmallVec;

use crate::error::Error;
use crate::trie::builder::{check_pattern_len, IntoSymbols, PatternError, Trie};
use crate::trie::{Label, NodeId, Symbol};
use crate::{CompileState, Match};

/// Per-node shift bounds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct CwMeta {
    shift1: usize,
    shift2: usize,
}

type CwTrie<C, P> = Trie<C, P, CwMeta>;

/// Shallowest depths below a node in the failure-link tree.
#[derive(Clone, Copy)]
struct Nearest {
    any: usize,
    keyword: usize,
}

impl Default for Nearest {
    fn default() -> Self {
        Nearest {
            any: usize::MAX,
            keyword: usize::MAX,
        }
    }
}

/// A multi-pattern matcher that answers "does any keyword occur" with sublinear
/// skips over the document.
///
/// [`scan`](CommentzWalter::scan) returns the first match met in the algorithm's
/// own window order, which is not necessarily the leftmost occurrence.
///
/// # Examples
///
/// ```
/// use libkwmatch::CommentzWalter;
///
/// let mut cw = CommentzWalter::<u8, &str>::new(64);
/// for keyword in ["cacbaa", "acb", "aba", "acbab", "ccbab"] {
///     cw.add_keyword(keyword, keyword).unwrap();
/// }
/// let hit = cw.scan(b"ecbabbccbab").unwrap();
/// assert_eq!(*hit.payload(), "ccbab");
/// assert_eq!((hit.start(), hit.end()), (6, 11));
/// ```
#[derive(Clone, Debug)]
pub struct CommentzWalter<C: Symbol, P> {
    trie: CwTrie<C, P>,
    max_pattern_len: usize,
    w_min: usize,
    min_depth: Vec<usize>,
    state: CompileState,
}

impl<C: Symbol, P> CommentzWalter<C, P> {
    /// Creates an empty automaton accepting keywords of up to `max_pattern_len` symbols.
    pub fn new(max_pattern_len: usize) -> Self {
        let mut cw = CommentzWalter {
            trie: Trie::new(),
            max_pattern_len,
            w_min: max_pattern_len,
            min_depth: Vec::new(),
            state: CompileState::Stale,
        };
        cw.compile();
        cw
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
        log::trace!("commentz-walter: adding keyword {:?}", pattern.as_slice());
        self.trie.insert(pattern.iter().rev().copied(), payload);
        self.w_min = self.w_min.min(pattern.len());
        self.state = CompileState::Stale;
        Ok(())
    }

    /// Derives shift bounds and the per-symbol minimum depth table. Does nothing
    /// if no keyword was added since the last call.
    pub fn compile(&mut self) {
        if self.state.is_compiled() {
            return;
        }
        self.rebuild();
        self.state = CompileState::Compiled;
    }

    fn rebuild(&mut self) {
        self.assign_shifts();
        self.min_depth = self.min_depth_table();
        log::debug!(
            "commentz-walter: compiled {} nodes for {} keywords, w_min={}",
            self.trie.len(),
            self.trie.keyword_count(),
            self.w_min
        );
    }

    fn assign_shifts(&mut self) {
        let w_min = self.w_min;
        let links = self.trie.suffix_links();

        // `word(v)` is a proper suffix of `word(b)` exactly when `v` is a proper
        // ancestor of `b` in the tree formed by failure links. For each node,
        // find its shallowest descendant in that tree, and its shallowest
        // keyword-terminal one, folding deepest nodes first.
        let mut nearest = vec![Nearest::default(); self.trie.len()];
        for &b in links.breadth_first().iter().rev().filter(|b| !b.is_root()) {
            let node = self.trie.node(b);
            let mut found = nearest[b.index()];
            found.any = found.any.min(node.depth());
            if node.output().is_some() {
                found.keyword = found.keyword.min(node.depth());
            }
            let parent = &mut nearest[links.fail(b).index()];
            parent.any = parent.any.min(found.any);
            parent.keyword = parent.keyword.min(found.keyword);
        }

        // `shift2` holds only the keyword-terminal bound here; the parent cap is
        // folded in below.
        for &id in links.breadth_first() {
            let node = self.trie.node_mut(id);
            let found = nearest[id.index()];
            node.meta = CwMeta {
                shift1: w_min.min(found.any.saturating_sub(node.depth())),
                shift2: w_min.min(found.keyword.saturating_sub(node.depth())),
            };
        }

        self.trie.node_mut(NodeId::ROOT).meta = CwMeta {
            shift1: 1,
            shift2: w_min,
        };
        for &parent in links.breadth_first() {
            let cap = self.trie.node(parent).meta.shift2;
            let children: SmallVec<[NodeId; 8]> = self
                .trie
                .node(parent)
                .children()
                .iter()
                .map(|(_, id)| id)
                .collect();
            for child in children {
                let meta = &mut self.trie.node_mut(child).meta;
                meta.shift2 = meta.shift2.min(cap);
            }
        }
    }

    /// Shallowest depth of an edge labeled with each symbol, defaulting to
    /// `w_min + 1`. Edges deeper than `w_min` can never lower a value, so their
    /// subtrees are not visited.
    fn min_depth_table(&self) -> Vec<usize> {
        let limit = self.w_min + 1;
        let mut table = vec![limit; C::ALPHABET_SIZE];
        let mut stack = vec![NodeId::ROOT];
        while let Some(id) = stack.pop() {
            let node = self.trie.node(id);
            let edge_depth = node.depth() + 1;
            if edge_depth >= limit {
                continue;
            }
            for (label, child) in node.children().iter() {
                let slot = &mut table[label.index()];
                *slot = (*slot).min(edge_depth);
                stack.push(child);
            }
        }
        table
    }

    /// True when shift tables reflect every keyword added so far.
    pub fn is_compiled(&self) -> bool {
        self.state.is_compiled()
    }

    /// Compiles if needed, then searches `document` for a keyword occurrence.
    ///
    /// Returns at most one match. When the document holds several occurrences,
    /// which one is reported follows the window order of the search, not the
    /// document order. A `None` result means no keyword occurs anywhere.
    pub fn scan(&mut self, document: &[C]) -> Option<Match<'_, P>> {
        self.compile();
        self.search(document)
    }

    /// Scans through a shared reference, for use from several threads once
    /// [`compile`](CommentzWalter::compile) has run.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotCompiled`] if keywords were added since the last compile.
    pub fn scan_shared(&self, document: &[C]) -> Result<Option<Match<'_, P>>, Error> {
        if !self.is_compiled() {
            return Err(Error::NotCompiled);
        }
        Ok(self.search(document))
    }

    fn search(&self, document: &[C]) -> Option<Match<'_, P>> {
        if self.trie.is_empty() {
            return None;
        }
        // Position of the last symbol of the current window.
        let mut window_end = self.w_min - 1;
        while window_end < document.len() {
            let mut id = NodeId::ROOT;
            let mut pos = window_end;
            let mismatch = loop {
                let label = document[pos];
                let Some(next) = self.trie.child(id, label) else {
                    break Some(label);
                };
                id = next;
                if let Some(payload) = self.trie.node(id).output() {
                    return Some(Match::new(payload, pos, window_end + 1));
                }
                if pos == 0 {
                    break None;
                }
                pos -= 1;
            };

            let node = self.trie.node(id);
            let shift = match mismatch {
                Some(label) => {
                    let consumed = node.depth();
                    let by_symbol = self.min_depth[label.index()].saturating_sub(consumed + 1);
                    node.meta.shift1.max(by_symbol)
                }
                None => node.meta.shift1,
            };
            window_end += shift.min(node.meta.shift2);
        }
        None
    }

    /// Returns the minimum keyword length seen so far, or the configured maximum
    /// if no keyword has been added.
    pub fn w_min(&self) -> usize {
        self.w_min
    }

    /// Returns the shallowest trie depth of an edge labeled `symbol`, capped at
    /// `w_min + 1`. Compiles first if needed.
    pub fn min_depth(&mut self, symbol: C) -> usize {
        self.compile();
        self.min_depth[symbol.index()]
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

    /// Writes an indented listing of the reversed-keyword trie with each node's
    /// shift bounds, word and output, compiling first. Meant for debugging only;
    /// the format is not stable.
    pub fn dump(&mut self, out: &mut impl fmt::Write) -> fmt::Result
    where
        P: fmt::Debug,
    {
        self.compile();
        let mut word: Vec<C> = Vec::new();
        let mut stack = vec![(C::default(), NodeId::ROOT)];
        while let Some((label, id)) = stack.pop() {
            let node = self.trie.node(id);
            word.truncate(node.depth().saturating_sub(1));
            if !id.is_root() {
                word.push(label);
            }
            let indent = 2 * node.depth();
            if id.is_root() {
                write!(out, "\"\": <{id}> ")?;
            } else {
                write!(out, "{:indent$}{}: <{id}> ", "", Label(label))?;
            }
            write!(
                out,
                "shift1={}, shift2={}, word=",
                node.meta.shift1, node.meta.shift2
            )?;
            for &c in &word {
                match c.as_char() {
                    Some(ch) => write!(out, "{ch}")?,
                    None => write!(out, "\\{{{c:?}}}")?,
                }
            }
            writeln!(out, ", word_len={}, output={:?}", word.len(), node.output())?;

            let mark = stack.len();
            stack.extend(node.children().iter());
            stack[mark..].reverse();
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use itertools::Itertools;

    const KEYWORDS: [&str; 5] = ["cacbaa", "acb", "aba", "acbab", "ccbab"];

    fn matcher(keywords: &[&'static str]) -> CommentzWalter<u8, &'static str> {
        let mut cw = CommentzWalter::new(64);
        for &keyword in keywords {
            cw.add_keyword(keyword, keyword).unwrap();
        }
        cw
    }

    fn hit(cw: &mut CommentzWalter<u8, &'static str>, document: &str) -> Option<&'static str> {
        cw.scan(document.as_bytes()).map(|m| *m.payload())
    }

    /// Every node's word (reversed keyword prefix) with its shift bounds, sorted.
    fn shift_table<C: Symbol, P>(cw: &CommentzWalter<C, P>) -> Vec<(Vec<C>, usize, usize)> {
        let mut table = Vec::new();
        let mut stack = vec![(Vec::new(), NodeId::ROOT)];
        while let Some((word, id)) = stack.pop() {
            let meta = cw.trie.node(id).meta;
            for (label, child) in cw.trie.node(id).children().iter() {
                let mut next = word.clone();
                next.push(label);
                stack.push((next, child));
            }
            table.push((word, meta.shift1, meta.shift2));
        }
        table.sort();
        table
    }

    fn shifts(cw: &mut CommentzWalter<u8, &'static str>, keyword_suffix: &str) -> (usize, usize) {
        cw.compile();
        let id = cw.trie.walk(keyword_suffix.bytes().rev()).unwrap();
        let meta = cw.trie.node(id).meta;
        (meta.shift1, meta.shift2)
    }

    #[test]
    fn classic_keyword_set() {
        let mut cw = matcher(&KEYWORDS);
        assert_eq!(hit(&mut cw, "acb"), Some("acb"));
        assert_eq!(hit(&mut cw, "aba"), Some("aba"));
        assert_eq!(hit(&mut cw, "ccbab"), Some("ccbab"));
        assert_eq!(hit(&mut cw, "ecbabbcacbaa"), Some("acb"));
        assert_eq!(hit(&mut cw, "ecbabbccbab"), Some("ccbab"));
        assert_eq!(hit(&mut cw, "ecbabbccbaa"), None);
    }

    #[test]
    fn match_offsets_cover_the_keyword() {
        let mut cw = matcher(&KEYWORDS);
        let m = cw.scan(b"ecbabbcacbaa").unwrap();
        assert_eq!((m.start(), m.end()), (7, 10));
        assert_eq!(m.len(), 3);
    }

    #[test]
    fn shift_bounds_for_classic_set() {
        let mut cw = matcher(&KEYWORDS);
        assert_eq!(cw.w_min(), 3);
        assert_eq!(shifts(&mut cw, ""), (1, 3));
        // "a" recurs one deeper in "aa" (cacbaa), and two deeper at the end of
        // the whole keyword "aba".
        assert_eq!(shifts(&mut cw, "a"), (1, 2));
        assert_eq!(shifts(&mut cw, "b"), (1, 3));
        assert_eq!(shifts(&mut cw, "cb"), (2, 3));
        assert_eq!(shifts(&mut cw, "acb"), (2, 2));
        assert_eq!(shifts(&mut cw, "cbab"), (3, 1));
        assert_eq!(shifts(&mut cw, "ccbab"), (3, 1));
    }

    #[test]
    fn min_depth_table_for_classic_set() {
        let mut cw = matcher(&KEYWORDS);
        assert_eq!(cw.min_depth(b'a'), 1);
        assert_eq!(cw.min_depth(b'b'), 1);
        assert_eq!(cw.min_depth(b'c'), 2);
        assert_eq!(cw.min_depth(b'e'), 4);
    }

    #[test]
    fn edges_at_w_min_depth_are_counted() {
        let mut cw = matcher(&["ab"]);
        assert_eq!(cw.min_depth(b'a'), 2);
        assert_eq!(hit(&mut cw, "xab"), Some("ab"));
        assert_eq!(hit(&mut cw, "xxxxab"), Some("ab"));
    }

    #[test]
    fn occurrence_at_document_start_and_end() {
        let mut cw = matcher(&["needle", "pin"]);
        assert_eq!(hit(&mut cw, "pin in a haystack"), Some("pin"));
        assert_eq!(hit(&mut cw, "a haystack with a needle"), Some("needle"));
        assert_eq!(hit(&mut cw, "a haystack with a needl"), None);
    }

    #[test]
    fn backward_walk_reaching_document_start() {
        // The window's walk consumes "ba" down to offset 0 without completing
        // "cba"; the scan must still find "ab" further right.
        let mut cw = matcher(&["cba", "ab"]);
        assert_eq!(hit(&mut cw, "bab"), Some("ab"));
    }

    #[test]
    fn short_and_empty_documents() {
        let mut cw = matcher(&["abc"]);
        assert_eq!(hit(&mut cw, ""), None);
        assert_eq!(hit(&mut cw, "ab"), None);
        assert_eq!(hit(&mut cw, "abc"), Some("abc"));
    }

    #[test]
    fn no_keywords_never_matches() {
        let mut cw = matcher(&[]);
        assert!(cw.is_empty());
        assert_eq!(cw.w_min(), 64);
        assert_eq!(hit(&mut cw, "anything"), None);

        let mut zero = CommentzWalter::<u8, ()>::new(0);
        assert!(zero.scan(b"abc").is_none());
        assert_eq!(
            zero.add_keyword("a", ()),
            Err(PatternError::TooLongPattern { len: 1, max: 0 })
        );
    }

    #[test]
    fn rejected_keywords_leave_state_unchanged() {
        let mut cw = CommentzWalter::<u8, u8>::new(4);
        cw.add_keyword("abc", 1).unwrap();
        cw.compile();
        let before = shift_table(&cw);
        assert_eq!(
            cw.add_keyword("abcde", 2),
            Err(PatternError::TooLongPattern { len: 5, max: 4 })
        );
        assert_eq!(cw.add_keyword(b"", 3), Err(PatternError::EmptyPattern));
        assert!(cw.is_compiled());
        assert_eq!(cw.w_min(), 3);
        assert_eq!(before, shift_table(&cw));
    }

    #[test]
    fn w_min_only_decreases() {
        let mut cw = matcher(&["abcd"]);
        assert_eq!(cw.w_min(), 4);
        cw.add_keyword("ab", "ab").unwrap();
        assert_eq!(cw.w_min(), 2);
        cw.add_keyword("abcdef", "abcdef").unwrap();
        assert_eq!(cw.w_min(), 2);
    }

    #[test]
    fn insertion_marks_stale_and_compile_clears() {
        let mut cw = matcher(&[]);
        assert!(cw.is_compiled());
        cw.add_keyword("ab", "ab").unwrap();
        assert!(!cw.is_compiled());
        assert!(matches!(cw.scan_shared(b"ab"), Err(Error::NotCompiled)));
        cw.compile();
        let m = cw.scan_shared(b"xab").unwrap().unwrap();
        assert_eq!(*m.payload(), "ab");
    }

    #[test]
    fn payload_identity_is_preserved() {
        let keywords = [String::from("alpha"), String::from("beta")];
        let mut cw = CommentzWalter::<u8, &String>::new(8);
        for keyword in &keywords {
            cw.add_keyword(keyword, keyword).unwrap();
        }
        let m = cw.scan(b"the beta test").unwrap();
        assert!(std::ptr::eq(*m.payload(), &keywords[1]));
    }

    #[test]
    fn compile_is_idempotent() {
        let mut cw = matcher(&KEYWORDS);
        cw.compile();
        let shifts = shift_table(&cw);
        let depths = cw.min_depth.clone();
        cw.rebuild();
        assert_eq!(shifts, shift_table(&cw));
        assert_eq!(depths, cw.min_depth);
    }

    #[test]
    fn tables_independent_of_insertion_order() {
        let mut expected = None;
        for order in KEYWORDS.iter().permutations(KEYWORDS.len()) {
            let mut cw = CommentzWalter::<u8, ()>::new(64);
            for keyword in order {
                cw.add_keyword(*keyword, ()).unwrap();
            }
            cw.compile();
            let tables = (shift_table(&cw), cw.min_depth.clone());
            assert_eq!(expected.get_or_insert_with(|| tables.clone()), &tables);
        }
    }

    #[test]
    fn dump_lists_every_node() {
        let mut cw = matcher(&["ab", "cb"]);
        let mut out = String::new();
        cw.dump(&mut out).unwrap();
        let lines: Vec<_> = out.lines().collect();
        assert_eq!(lines.len(), cw.len());
        assert!(lines[0].starts_with("\"\": <#0> shift1=1, shift2=2, word=, word_len=0"));
        let a = lines.iter().find(|l| l.starts_with("    \"a\": <#")).unwrap();
        assert!(a.contains("word=ba, word_len=2, output=Some(\"ab\")"));
        assert!(lines.iter().any(|l| l.contains("word=bc, word_len=2")));
    }

    #[test]
    fn compiled_matcher_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<CommentzWalter<u16, &'static str>>();
    }

    #[test]
    fn generic_u16_keywords() {
        let mut cw = CommentzWalter::<u16, u32>::new(8);
        cw.add_keyword([0x3042, 0x3044], 1).unwrap();
        cw.add_keyword([0x3046, 0x3048, 0x304A], 2).unwrap();
        let m = cw.scan(&[0x3093, 0x3046, 0x3048, 0x304A]).unwrap();
        assert_eq!(*m.payload(), 2);
        assert!(cw.scan(&[0x3044, 0x3042]).is_none());
    }
}
