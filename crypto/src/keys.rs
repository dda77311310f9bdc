//! Key material for ID protection: the sealing keyring and the hash salt.
//!
//! Loaded once at process start and never mutated afterwards. Rotating the
//! encryption key means starting the process with a new active key and the
//! old one moved to the retired set; records are re-sealed lazily by the
//! identity store.

use std::collections::BTreeMap;

use boda_types::NationalId;
use rand::rngs::OsRng;
use rand::RngCore;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::hash::{blake2b_256_multi, IdHasher};
use crate::CryptoError;

/// Domain separator for the symmetric sealing key.
const SEAL_CONTEXT: &[u8] = b"boda-national-id-seal";

/// A 32-byte master key. Never printed, zeroized on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct IdKey([u8; 32]);

impl IdKey {
    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn from_hex(key_hex: &str) -> Result<Self, CryptoError> {
        let bytes = hex::decode(key_hex.trim())
            .map_err(|e| CryptoError::InvalidKey(format!("encryption key is not hex: {e}")))?;
        let arr: [u8; 32] = bytes.as_slice().try_into().map_err(|_| {
            CryptoError::InvalidKey(format!(
                "encryption key must be 32 bytes, got {}",
                bytes.len()
            ))
        })?;
        Ok(Self(arr))
    }

    /// The symmetric key actually fed to the AEAD.
    pub(crate) fn seal_key(&self) -> Zeroizing<[u8; 32]> {
        Zeroizing::new(blake2b_256_multi(&[&self.0, SEAL_CONTEXT]))
    }
}

/// Active sealing key plus any retired keys still needed to open old values.
#[derive(Clone)]
pub struct IdKeyring {
    active: u8,
    keys: BTreeMap<u8, IdKey>,
}

impl IdKeyring {
    pub fn new(active_id: u8, key: IdKey) -> Self {
        let mut keys = BTreeMap::new();
        keys.insert(active_id, key);
        Self {
            active: active_id,
            keys,
        }
    }

    /// Add a retired key that can open, but no longer seal, values.
    pub fn with_retired(mut self, id: u8, key: IdKey) -> Result<Self, CryptoError> {
        if id == self.active || self.keys.contains_key(&id) {
            return Err(CryptoError::InvalidKey(format!("duplicate key id {id}")));
        }
        self.keys.insert(id, key);
        Ok(self)
    }

    /// Parse `"<id>:<hex>"` or bare `"<hex>"` (id 1).
    pub fn parse_entry(entry: &str) -> Result<(u8, IdKey), CryptoError> {
        match entry.trim().split_once(':') {
            Some((id, key_hex)) => {
                let id = id
                    .parse::<u8>()
                    .map_err(|_| CryptoError::InvalidKey(format!("bad key id {id:?}")))?;
                Ok((id, IdKey::from_hex(key_hex)?))
            }
            None => Ok((1, IdKey::from_hex(entry)?)),
        }
    }

    pub fn active_id(&self) -> u8 {
        self.active
    }

    pub(crate) fn active_key(&self) -> (u8, &IdKey) {
        // The active id is inserted at construction and never removed.
        (self.active, &self.keys[&self.active])
    }

    pub(crate) fn key(&self, id: u8) -> Result<&IdKey, CryptoError> {
        self.keys.get(&id).ok_or(CryptoError::UnknownKeyId(id))
    }
}

/// Everything the identity store needs to protect ID values.
pub struct KeyMaterial {
    pub keyring: IdKeyring,
    pub hasher: IdHasher,
}

impl KeyMaterial {
    pub fn new(keyring: IdKeyring, hasher: IdHasher) -> Self {
        Self { keyring, hasher }
    }

    /// Build from configuration strings: the active key entry, zero or more
    /// retired key entries, and the hex salt.
    pub fn from_config(
        active_key: &str,
        retired_keys: &[String],
        salt_hex: &str,
    ) -> Result<Self, CryptoError> {
        let (id, key) = IdKeyring::parse_entry(active_key)?;
        let mut keyring = IdKeyring::new(id, key);
        for entry in retired_keys.iter().filter(|e| !e.trim().is_empty()) {
            let (id, key) = IdKeyring::parse_entry(entry)?;
            keyring = keyring.with_retired(id, key)?;
        }
        Ok(Self::new(keyring, IdHasher::from_hex(salt_hex)?))
    }

    pub fn hash(&self, id: &NationalId) -> boda_types::VerificationHash {
        self.hasher.hash(id)
    }
}

/// Fresh random 32-byte key, hex encoded.
pub fn generate_key_hex() -> String {
    let mut key = [0u8; 32];
    OsRng.fill_bytes(&mut key);
    let out = hex::encode(key);
    key.zeroize();
    out
}

/// Fresh random 32-byte hash salt, hex encoded.
pub fn generate_salt_hex() -> String {
    generate_key_hex()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_entry_with_and_without_id() {
        let hex_key = "11".repeat(32);
        let (id, _) = IdKeyring::parse_entry(&hex_key).unwrap();
        assert_eq!(id, 1);
        let (id, _) = IdKeyring::parse_entry(&format!("7:{hex_key}")).unwrap();
        assert_eq!(id, 7);
    }

    #[test]
    fn seal_key_is_derived_and_wiped_on_drop() {
        let master = [3u8; 32];
        let derived: Zeroizing<[u8; 32]> = IdKey::new(master).seal_key();
        assert_ne!(*derived, master);
        assert_eq!(*derived, *IdKey::new(master).seal_key());
    }

    #[test]
    fn wrong_key_length_rejected() {
        assert!(matches!(
            IdKey::from_hex(&"11".repeat(16)),
            Err(CryptoError::InvalidKey(_))
        ));
    }

    #[test]
    fn duplicate_retired_id_rejected() {
        let ring = IdKeyring::new(2, IdKey::new([1; 32]));
        assert!(ring.clone().with_retired(2, IdKey::new([2; 32])).is_err());
        let ring = ring.with_retired(1, IdKey::new([2; 32])).unwrap();
        assert!(ring.key(1).is_ok());
        assert!(matches!(ring.key(9), Err(CryptoError::UnknownKeyId(9))));
    }

    #[test]
    fn generated_keys_parse_back() {
        let key = generate_key_hex();
        assert_eq!(key.len(), 64);
        assert!(IdKey::from_hex(&key).is_ok());
        assert_ne!(generate_key_hex(), key);
        assert!(IdHasher::from_hex(&generate_salt_hex()).is_ok());
    }

    #[test]
    fn from_config_skips_blank_retired_entries() {
        let km = KeyMaterial::from_config(
            &format!("3:{}", "22".repeat(32)),
            &[String::new(), format!("2:{}", "33".repeat(32))],
            &"44".repeat(16),
        )
        .unwrap();
        assert_eq!(km.keyring.active_id(), 3);
        assert!(km.keyring.key(2).is_ok());
    }
}
