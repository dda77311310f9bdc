//! The plaintext / sealed split for government ID numbers.
//!
//! A [`NationalId`] is a cleartext value that only ever lives in memory: it has no
//! `Serialize` impl, prints masked under `Debug`, and is zeroized on drop.
//! A [`SealedId`] is the opaque ciphertext that storage holds. The two are
//! distinct types so nothing ever has to guess which one a string is.

use serde::{Deserialize, Serialize};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Character used to hide the middle of an ID in display strings.
pub const MASK_CHAR: char = '*';

/// Number of characters left visible at each end of a masked ID.
pub const MASK_VISIBLE: usize = 4;

/// A cleartext national ID number.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct NationalId(String);

impl NationalId {
    /// Wrap a raw string, trimming surrounding whitespace.
    ///
    /// Format validation is the identity store's job; this only normalises.
    pub fn new(raw: &str) -> Self {
        Self(raw.trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    pub fn len(&self) -> usize {
        self.0.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Display form with the middle replaced by [`MASK_CHAR`].
    pub fn masked(&self) -> String {
        mask_id(&self.0)
    }
}

impl fmt::Debug for NationalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NationalId({})", self.masked())
    }
}

/// Mask an ID for low-sensitivity display: the first and last
/// [`MASK_VISIBLE`] characters stay, everything between becomes [`MASK_CHAR`].
///
/// Values too short to keep both ends visible are hidden entirely.
pub fn mask_id(raw: &str) -> String {
    let chars: Vec<char> = raw.chars().collect();
    if chars.len() < MASK_VISIBLE * 2 {
        return "***masked***".to_string();
    }
    let hidden = chars.len() - MASK_VISIBLE * 2;
    let mut out = String::with_capacity(chars.len());
    out.extend(&chars[..MASK_VISIBLE]);
    out.extend(std::iter::repeat(MASK_CHAR).take(hidden));
    out.extend(&chars[chars.len() - MASK_VISIBLE..]);
    out
}

/// An encrypted national ID as held by storage.
///
/// Layout: `key_id (1) || nonce (12) || ciphertext+tag`. The bytes are opaque to
/// everything except the crypto crate, and are never compared for equality by
/// callers; duplicate detection goes through the verification hash instead.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SealedId(Vec<u8>);

impl SealedId {
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// The keyring slot this value was sealed under.
    pub fn key_id(&self) -> Option<u8> {
        self.0.first().copied()
    }
}

impl fmt::Debug for SealedId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SealedId({} bytes)", self.0.len())
    }
}

/// Salted one-way digest of a national ID, used only for equality.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VerificationHash([u8; 32]);

impl VerificationHash {
    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for VerificationHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in &self.0 {
            write!(f, "{b:02x}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for VerificationHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VerificationHash({self})")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn masks_thirteen_char_id() {
        assert_eq!(mask_id("CF12345678901"), "CF12*****8901");
    }

    #[test]
    fn masks_fifteen_char_id() {
        assert_eq!(mask_id("CF1234567890123"), "CF12*******0123");
    }

    #[test]
    fn short_values_fully_hidden() {
        assert_eq!(mask_id("CF12"), "***masked***");
    }

    #[test]
    fn debug_never_shows_plaintext() {
        let id = NationalId::new("CM98765432109");
        let shown = format!("{id:?}");
        assert!(!shown.contains("98765432"));
        assert!(shown.contains("CM98"));
    }

    #[test]
    fn new_trims_whitespace() {
        assert_eq!(NationalId::new("  CF12345678901\n").as_str(), "CF12345678901");
    }

    #[test]
    fn hash_displays_as_hex() {
        let h = VerificationHash::new([0xab; 32]);
        assert_eq!(h.to_string().len(), 64);
        assert!(h.to_string().starts_with("abab"));
    }

    #[test]
    fn sealed_key_id_is_first_byte() {
        assert_eq!(SealedId::from_bytes(vec![3, 9, 9]).key_id(), Some(3));
        assert_eq!(SealedId::from_bytes(vec![]).key_id(), None);
    }
}
