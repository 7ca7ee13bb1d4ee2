use std::fmt::Debug;
use std::hash::Hash;

/// Trait for fixed-width integer types that serve as edge labels in a trie.
///
/// - `Copy`: edges store labels by value
/// - `Eq + Ord`: comparing and ordering edge labels
/// - `Hash`: keyed lookups in tests and callers
/// - `Debug`: debug printing of nodes
/// - `Default`: placeholder label for the root in diagnostic dumps
///
/// Every symbol maps onto a dense index below [`ALPHABET_SIZE`](Symbol::ALPHABET_SIZE),
/// which lets per-symbol tables be plain arrays.
pub trait Symbol: Copy + Eq + Ord + Hash + Debug + Default {
    /// Number of distinct values of this symbol type.
    const ALPHABET_SIZE: usize;

    /// Dense index of this symbol, always `< ALPHABET_SIZE`.
    fn index(self) -> usize;

    /// Printable form of this symbol, if it maps to a single `char`.
    fn as_char(self) -> Option<char>;
}

impl Symbol for u8 {
    const ALPHABET_SIZE: usize = 1 << 8;

    #[inline]
    fn index(self) -> usize {
        self as usize
    }

    fn as_char(self) -> Option<char> {
        self.is_ascii().then(|| char::from(self))
    }
}

impl Symbol for u16 {
    const ALPHABET_SIZE: usize = 1 << 16;

    #[inline]
    fn index(self) -> usize {
        self as usize
    }

    // Lone surrogates have no `char` of their own.
    fn as_char(self) -> Option<char> {
        char::from_u32(u32::from(self))
    }
}
