//! Content-hash names and prefixes.
//!
//! Artifact content hashes are hexadecimal digests, canonically lower-case.
//! User input may arrive in mixed case and optionally wrapped in square
//! brackets; canonicalization is case-folding only and never alters length
//! or content. A prefix shorter than [`HASH_PREFIX_MIN`] characters is
//! never treated as a hash candidate.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Shortest string accepted as a hash prefix.
pub const HASH_PREFIX_MIN: usize = 4;

/// Longest supported hash name (a 256-bit digest in hex).
pub const HASH_LEN_MAX: usize = 64;

/// Length of a full 160-bit hash name in hex.
pub const HASH_LEN_SHORT: usize = 40;

/// True when `text` is non-empty and drawn entirely from the hex alphabet
/// (either case).
pub fn is_hash_alphabet(text: &str) -> bool {
    !text.is_empty() && text.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Rewrite a verified hash name or prefix into canonical lower-case form.
///
/// Case-folding only; the caller is responsible for having validated the
/// alphabet first.
pub fn canonical_hash_name(text: &str) -> String {
    text.to_ascii_lowercase()
}

/// Strip one leading `[` and one trailing `]`, independently.
///
/// Bracket decoration around an identifier is tolerated on either side or
/// both; the brackets are never part of the name.
pub fn strip_brackets(text: &str) -> &str {
    let text = text.strip_prefix('[').unwrap_or(text);
    text.strip_suffix(']').unwrap_or(text)
}

// =============================================================================
// HashPrefix
// =============================================================================

/// A validated, canonical (lower-case) hash prefix.
///
/// Guaranteed to be [`HASH_PREFIX_MIN`]..=[`HASH_LEN_MAX`] hex characters.
/// A full hash name is its own prefix.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct HashPrefix(String);

impl HashPrefix {
    /// Validate and canonicalize a candidate prefix.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidHashName`] if the length is out of range or
    /// any character falls outside the hex alphabet.
    pub fn parse(text: &str) -> Result<Self> {
        if text.len() < HASH_PREFIX_MIN {
            return Err(Error::invalid_hash_name(format!(
                "prefix '{}' is shorter than {} characters",
                text, HASH_PREFIX_MIN
            )));
        }
        if text.len() > HASH_LEN_MAX {
            return Err(Error::invalid_hash_name(format!(
                "prefix '{}' is longer than {} characters",
                text, HASH_LEN_MAX
            )));
        }
        if !is_hash_alphabet(text) {
            return Err(Error::invalid_hash_name(format!(
                "prefix '{}' contains non-hex characters",
                text
            )));
        }
        Ok(HashPrefix(canonical_hash_name(text)))
    }

    /// The canonical prefix text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Prefix length in characters.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when the prefix has no characters. Cannot occur for a parsed
    /// prefix; present to pair with `len`.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for HashPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for HashPrefix {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for HashPrefix {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        HashPrefix::parse(s)
    }
}

impl TryFrom<String> for HashPrefix {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        HashPrefix::parse(&value)
    }
}

impl From<HashPrefix> for String {
    fn from(prefix: HashPrefix) -> String {
        prefix.0
    }
}

// =============================================================================
// ArtifactHash
// =============================================================================

/// A full, canonical content hash: exactly [`HASH_LEN_SHORT`] or
/// [`HASH_LEN_MAX`] lower-case hex characters.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ArtifactHash(String);

impl ArtifactHash {
    /// Validate and canonicalize a full hash name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidHashName`] unless the input is hex of one of
    /// the two supported digest lengths.
    pub fn parse(text: &str) -> Result<Self> {
        if text.len() != HASH_LEN_SHORT && text.len() != HASH_LEN_MAX {
            return Err(Error::invalid_hash_name(format!(
                "hash '{}' must be {} or {} characters, got {}",
                text,
                HASH_LEN_SHORT,
                HASH_LEN_MAX,
                text.len()
            )));
        }
        if !is_hash_alphabet(text) {
            return Err(Error::invalid_hash_name(format!(
                "hash '{}' contains non-hex characters",
                text
            )));
        }
        Ok(ArtifactHash(canonical_hash_name(text)))
    }

    /// Wrap an already-canonical digest produced in-process.
    pub(crate) fn from_digest_hex(hex: String) -> Self {
        ArtifactHash(hex)
    }

    /// The canonical hash text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this hash starts with the given canonical prefix.
    pub fn has_prefix(&self, prefix: &HashPrefix) -> bool {
        self.0.starts_with(prefix.as_str())
    }
}

impl fmt::Display for ArtifactHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ArtifactHash {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for ArtifactHash {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        ArtifactHash::parse(s)
    }
}

impl TryFrom<String> for ArtifactHash {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        ArtifactHash::parse(&value)
    }
}

impl From<ArtifactHash> for String {
    fn from(hash: ArtifactHash) -> String {
        hash.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_hash(prefix: &str) -> String {
        let mut s = String::from(prefix);
        while s.len() < HASH_LEN_SHORT {
            s.push('0');
        }
        s
    }

    #[test]
    fn test_alphabet_check() {
        assert!(is_hash_alphabet("abcdef0123456789"));
        assert!(is_hash_alphabet("ABCDEF"));
        assert!(!is_hash_alphabet("abcg"));
        assert!(!is_hash_alphabet(""));
        assert!(!is_hash_alphabet("abc d"));
    }

    #[test]
    fn test_canonicalization_is_case_folding_only() {
        assert_eq!(canonical_hash_name("AbCd1234"), "abcd1234");
        assert_eq!(canonical_hash_name("abcd"), "abcd");
        assert_eq!(canonical_hash_name("FFFF").len(), 4);
    }

    #[test]
    fn test_strip_brackets() {
        assert_eq!(strip_brackets("[abcd]"), "abcd");
        assert_eq!(strip_brackets("[abcd"), "abcd");
        assert_eq!(strip_brackets("abcd]"), "abcd");
        assert_eq!(strip_brackets("abcd"), "abcd");
        assert_eq!(strip_brackets("[]"), "");
    }

    #[test]
    fn test_prefix_floor() {
        assert!(HashPrefix::parse("abc").is_err());
        assert!(HashPrefix::parse("abcd").is_ok());
        assert!(HashPrefix::parse("").is_err());
    }

    #[test]
    fn test_prefix_ceiling() {
        let max = "a".repeat(HASH_LEN_MAX);
        assert!(HashPrefix::parse(&max).is_ok());
        let over = "a".repeat(HASH_LEN_MAX + 1);
        assert!(HashPrefix::parse(&over).is_err());
    }

    #[test]
    fn test_prefix_canonicalizes() {
        let prefix = HashPrefix::parse("AbCd12").unwrap();
        assert_eq!(prefix.as_str(), "abcd12");
        assert_eq!(prefix.len(), 6);
    }

    #[test]
    fn test_prefix_rejects_non_hex() {
        assert!(HashPrefix::parse("wxyz").is_err());
        assert!(HashPrefix::parse("abc!").is_err());
    }

    #[test]
    fn test_artifact_hash_lengths() {
        assert!(ArtifactHash::parse(&full_hash("abcd")).is_ok());
        assert!(ArtifactHash::parse(&"b".repeat(HASH_LEN_MAX)).is_ok());
        assert!(ArtifactHash::parse("abcd").is_err());
        assert!(ArtifactHash::parse(&"c".repeat(41)).is_err());
    }

    #[test]
    fn test_artifact_hash_prefix_match() {
        let hash = ArtifactHash::parse(&full_hash("abcd1111")).unwrap();
        let prefix = HashPrefix::parse("ABCD1").unwrap();
        assert!(hash.has_prefix(&prefix));
        let other = HashPrefix::parse("abcd2").unwrap();
        assert!(!hash.has_prefix(&other));
    }

    #[test]
    fn test_hash_never_altered_beyond_case() {
        let upper = full_hash("DEAD").to_uppercase();
        let hash = ArtifactHash::parse(&upper).unwrap();
        assert_eq!(hash.as_str(), upper.to_lowercase());
        assert_eq!(hash.as_str().len(), upper.len());
    }
}
