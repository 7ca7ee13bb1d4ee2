//! UTF-8 ↔ UTF-16 conversion at the automaton boundary.
//!
//! The automatons never parse UTF-8 themselves. Text is validated and
//! transcoded to UTF-16 code units here, then matched as `u16` symbols. A
//! conversion failure fails the whole call and leaves the automaton untouched.

use std::str::Utf8Error;
use std::string::FromUtf16Error;

use thiserror::Error;

use crate::aho_corasick::{AhoCorasick, OwnedMatches};
use crate::commentz_walter::CommentzWalter;
use crate::error::Error;
use crate::Match;

/// Input could not be transcoded.
#[derive(Debug, Error)]
pub enum EncodingError {
    /// The input bytes are not valid UTF-8.
    #[error("invalid UTF-8 input: {0}")]
    Utf8(#[from] Utf8Error),
    /// The input code units are not valid UTF-16.
    #[error("invalid UTF-16 input: {0}")]
    Utf16(#[from] FromUtf16Error),
}

/// Validates `text` as UTF-8 and returns its UTF-16 code units.
///
/// # Examples
///
/// ```
/// use libkwmatch::transcode::utf8_to_utf16;
///
/// assert_eq!(utf8_to_utf16("aあ".as_bytes()).unwrap(), [0x61, 0x3042]);
/// assert!(utf8_to_utf16(&[0xE3, 0x81]).is_err());
/// ```
pub fn utf8_to_utf16(text: &[u8]) -> Result<Vec<u16>, EncodingError> {
    Ok(std::str::from_utf8(text)?.encode_utf16().collect())
}

/// Decodes UTF-16 code units back into a `String`.
///
/// # Errors
///
/// Returns [`EncodingError::Utf16`] on unpaired surrogates.
pub fn utf16_to_utf8(units: &[u16]) -> Result<String, EncodingError> {
    Ok(String::from_utf16(units)?)
}

impl<P> AhoCorasick<u16, P> {
    /// Adds a keyword given as UTF-8 bytes.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::Encoding`] on invalid UTF-8 and with [`Error::Pattern`]
    /// if the transcoded keyword is empty or too long.
    pub fn add_keyword_utf8(&mut self, pattern: &[u8], payload: P) -> Result<(), Error> {
        let units = utf8_to_utf16(pattern)?;
        Ok(self.add_keyword(units, payload)?)
    }

    /// Scans a document given as UTF-8 bytes.
    ///
    /// The returned iterator owns the transcoded document; match offsets are in
    /// UTF-16 code units of that buffer.
    ///
    /// # Examples
    ///
    /// ```
    /// use libkwmatch::AhoCorasick;
    ///
    /// let mut ac = AhoCorasick::<u16, &str>::new(16);
    /// for keyword in ["あいう", "うえお", "いうえ"] {
    ///     ac.add_keyword_utf8(keyword.as_bytes(), keyword).unwrap();
    /// }
    /// let found: Vec<_> = ac
    ///     .scan_utf8("あいうえお".as_bytes())
    ///     .unwrap()
    ///     .map(|m| *m.payload())
    ///     .collect();
    /// assert_eq!(found, ["あいう", "いうえ", "うえお"]);
    /// ```
    ///
    /// # Errors
    ///
    /// Fails with [`Error::Encoding`] on invalid UTF-8.
    pub fn scan_utf8(&mut self, text: &[u8]) -> Result<OwnedMatches<'_, u16, P>, Error> {
        let units = utf8_to_utf16(text)?;
        Ok(self.scan_owned(units))
    }
}

impl<P> CommentzWalter<u16, P> {
    /// Adds a keyword given as UTF-8 bytes.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::Encoding`] on invalid UTF-8 and with [`Error::Pattern`]
    /// if the transcoded keyword is empty or too long.
    pub fn add_keyword_utf8(&mut self, pattern: &[u8], payload: P) -> Result<(), Error> {
        let units = utf8_to_utf16(pattern)?;
        Ok(self.add_keyword(units, payload)?)
    }

    /// Scans a document given as UTF-8 bytes. Match offsets are in UTF-16 code
    /// units.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::Encoding`] on invalid UTF-8.
    pub fn scan_utf8(&mut self, text: &[u8]) -> Result<Option<Match<'_, P>>, Error> {
        let units = utf8_to_utf16(text)?;
        Ok(self.scan(&units))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::trie::PatternError;

    const INVALID: &[u8] = &[b'a', 0xFF, b'b'];

    #[test]
    fn round_trip_through_utf16() {
        let text = "授人以鱼不如授人以渔 🦀";
        let units = utf8_to_utf16(text.as_bytes()).unwrap();
        assert_eq!(units.len(), text.encode_utf16().count());
        assert_eq!(utf16_to_utf8(&units).unwrap(), text);
    }

    #[test]
    fn invalid_input_is_reported() {
        let bad_utf8 = utf8_to_utf16(INVALID);
        assert!(matches!(bad_utf8, Err(EncodingError::Utf8(_))));
        let lone_surrogate = utf16_to_utf8(&[0xD800]);
        assert!(matches!(lone_surrogate, Err(EncodingError::Utf16(_))));
    }

    #[test]
    fn aho_corasick_over_utf16() {
        let mut ac = AhoCorasick::<u16, &str>::new(16);
        for keyword in ["あいう", "うえお", "いうえ"] {
            ac.add_keyword_utf8(keyword.as_bytes(), keyword).unwrap();
        }
        let hits: Vec<_> = ac
            .scan_utf8("あいうえお".as_bytes())
            .unwrap()
            .map(|m| (*m.payload(), m.start(), m.end()))
            .collect();
        assert_eq!(hits, [("あいう", 0, 3), ("いうえ", 1, 4), ("うえお", 2, 5)]);
    }

    #[test]
    fn surrogate_pairs_are_two_symbols() {
        let mut ac = AhoCorasick::<u16, ()>::new(2);
        ac.add_keyword_utf8("🦀".as_bytes(), ()).unwrap();
        assert!(matches!(
            ac.add_keyword_utf8("🦀a".as_bytes(), ()),
            Err(Error::Pattern(PatternError::TooLongPattern { len: 3, max: 2 }))
        ));
        let spans: Vec<_> = ac
            .scan_utf8("x🦀".as_bytes())
            .unwrap()
            .map(|m| (m.start(), m.end()))
            .collect();
        assert_eq!(spans, [(1, 3)]);
    }

    #[test]
    fn encoding_errors_leave_automatons_untouched() {
        let mut ac = AhoCorasick::<u16, u8>::new(8);
        ac.add_keyword_utf8(b"ab", 1).unwrap();
        ac.compile();
        let nodes = ac.len();
        assert!(matches!(ac.add_keyword_utf8(INVALID, 2), Err(Error::Encoding(_))));
        assert!(matches!(ac.scan_utf8(INVALID), Err(Error::Encoding(_))));
        assert_eq!(ac.len(), nodes);
        assert!(ac.is_compiled());

        let mut cw = CommentzWalter::<u16, u8>::new(8);
        cw.add_keyword_utf8(b"ab", 1).unwrap();
        assert!(matches!(cw.add_keyword_utf8(INVALID, 2), Err(Error::Encoding(_))));
        assert!(matches!(cw.scan_utf8(INVALID), Err(Error::Encoding(_))));
        assert_eq!(cw.keyword_count(), 1);
        assert_eq!(cw.w_min(), 2);
    }

    #[test]
    fn commentz_walter_over_utf16() {
        let mut cw = CommentzWalter::<u16, &str>::new(64);
        for keyword in ["cacbaa", "acb", "aba", "acbab", "ccbab"] {
            cw.add_keyword_utf8(keyword.as_bytes(), keyword).unwrap();
        }
        let found = |cw: &mut CommentzWalter<u16, &'static str>, text: &str| {
            cw.scan_utf8(text.as_bytes()).unwrap().map(|m| *m.payload())
        };
        assert_eq!(found(&mut cw, "acb"), Some("acb"));
        assert_eq!(found(&mut cw, "aba"), Some("aba"));
        assert_eq!(found(&mut cw, "ccbab"), Some("ccbab"));
        assert_eq!(found(&mut cw, "ecbabbcacbaa"), Some("acb"));
        assert_eq!(found(&mut cw, "ecbabbccbab"), Some("ccbab"));
        assert_eq!(found(&mut cw, "ecbabbccbaa"), None);

        let mut jp = CommentzWalter::<u16, &str>::new(8);
        jp.add_keyword_utf8("以渔".as_bytes(), "以渔").unwrap();
        assert_eq!(found(&mut jp, "授人以鱼不如授人以渔"), Some("以渔"));
        assert_eq!(found(&mut jp, "授人以鱼"), None);
    }
}
