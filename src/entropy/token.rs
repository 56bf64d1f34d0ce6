//! Printable token generation via uniform rejection sampling.
//!
//! Sampling an alphabet index with `byte % len` is biased whenever
//! `len` does not evenly divide 256. This module instead rejects any
//! drawn byte that would fall in the biased tail.

use rand_core::{OsRng, RngCore};

use crate::error::{Error, Result};
use crate::entropy::TOKEN_MAX_BYTES;

const UPPER: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const LOWER: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
const DIGITS: &[u8] = b"0123456789";
const SYMBOLS: &[u8] = b"!@#$%^&*()-_=+[]{}";

/// Characters excluded by [`Alphabet::exclude_similar`]: digits and
/// letters easily confused with one another in most fonts.
const SIMILAR: &[u8] = b"0Oo1lI";

/// A character set a generated token may draw from.
#[derive(Debug, Clone)]
pub struct Alphabet {
    chars: Vec<u8>,
}

impl Alphabet {
    /// Uppercase ASCII letters.
    pub fn uppercase() -> Self {
        Self::from_bytes(UPPER)
    }

    /// Lowercase ASCII letters.
    pub fn lowercase() -> Self {
        Self::from_bytes(LOWER)
    }

    /// ASCII digits.
    pub fn digits() -> Self {
        Self::from_bytes(DIGITS)
    }

    /// A fixed, conservative set of punctuation symbols.
    pub fn symbols() -> Self {
        Self::from_bytes(SYMBOLS)
    }

    /// Uppercase + lowercase + digits, the common default.
    pub fn alphanumeric() -> Self {
        let mut chars = Vec::new();
        chars.extend_from_slice(UPPER);
        chars.extend_from_slice(LOWER);
        chars.extend_from_slice(DIGITS);
        Self { chars }
    }

    /// A caller-defined set of bytes. Duplicates are harmless but
    /// skew the distribution toward the repeated character, so callers
    /// should pass a deduplicated set.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            chars: bytes.to_vec(),
        }
    }

    /// Drop every character in [`SIMILAR`] from this alphabet.
    #[must_use]
    pub fn exclude_similar(mut self) -> Self {
        self.chars.retain(|c| !SIMILAR.contains(c));
        self
    }

    fn as_slice(&self) -> &[u8] {
        &self.chars
    }
}

/// Generate a printable token of `len` bytes drawn from `alphabet`
/// using rejection sampling, so every character is uniformly likely
/// regardless of the alphabet's size.
pub fn token(len: usize, alphabet: &Alphabet) -> Result<String> {
    if len > TOKEN_MAX_BYTES {
        return Err(Error::TokenTooLarge);
    }
    let chars = alphabet.as_slice();
    if chars.is_empty() {
        return Err(Error::invalid("alphabet", "must not be empty"));
    }
    if chars.len() > 256 {
        return Err(Error::invalid("alphabet", "must not exceed 256 characters"));
    }

    // Largest multiple of `chars.len()` that fits in a u8; bytes drawn
    // at or above this threshold are rejected to avoid modulo bias.
    let limit = (256 / chars.len() as u32 * chars.len() as u32) as u8;

    let mut out = Vec::with_capacity(len);
    let mut scratch = [0u8; 64];
    while out.len() < len {
        OsRng
            .try_fill_bytes(&mut scratch)
            .map_err(|_| Error::EntropyUnavailable)?;
        for &b in scratch.iter() {
            if out.len() == len {
                break;
            }
            if chars.len() == 256 || b < limit {
                out.push(chars[(b as usize) % chars.len()]);
            }
        }
    }

    Ok(String::from_utf8(out).expect("alphabet bytes are always ASCII"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_has_requested_length() {
        let t = token(24, &Alphabet::alphanumeric()).expect("ok");
        assert_eq!(t.len(), 24);
    }

    #[test]
    fn token_only_uses_alphabet_chars() {
        let alphabet = Alphabet::digits();
        let t = token(100, &alphabet).expect("ok");
        assert!(t.bytes().all(|b| DIGITS.contains(&b)));
    }

    #[test]
    fn exclude_similar_drops_ambiguous_chars() {
        let alphabet = Alphabet::alphanumeric().exclude_similar();
        let t = token(500, &alphabet).expect("ok");
        assert!(t.bytes().all(|b| !SIMILAR.contains(&b)));
    }

    #[test]
    fn oversized_request_is_rejected() {
        let err = token(TOKEN_MAX_BYTES + 1, &Alphabet::alphanumeric());
        assert!(matches!(err, Err(Error::TokenTooLarge)));
    }

    #[test]
    fn empty_alphabet_is_rejected() {
        let err = token(8, &Alphabet::from_bytes(b""));
        assert!(err.is_err());
    }

    #[test]
    fn oversized_alphabet_is_rejected() {
        let oversized = vec![b'a'; 257];
        let err = token(8, &Alphabet::from_bytes(&oversized));
        assert!(err.is_err());
    }

    #[test]
    fn zero_length_token_is_empty_string() {
        let t = token(0, &Alphabet::alphanumeric()).expect("ok");
        assert!(t.is_empty());
    }
}
