use thiserror::Error;

#[cfg(feature = "transcode")]
use crate::transcode::EncodingError;
use crate::trie::PatternError;

/// Errors returned by the automatons' fallible entry points.
///
/// No variant leaves an automaton in a partially updated state.
#[derive(Debug, Error)]
pub enum Error {
    /// A keyword was rejected at insertion time.
    #[error(transparent)]
    Pattern(#[from] PatternError),
    /// Input text was not valid UTF-8.
    #[cfg(feature = "transcode")]
    #[error(transparent)]
    Encoding(#[from] EncodingError),
    /// A shared scan was requested while keywords added since the last compile
    /// have no derived tables yet.
    #[error("automaton has keywords added since the last compile")]
    NotCompiled,
}
