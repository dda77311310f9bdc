//! Blake2b key derivation and the salted verification hash.

use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};
use boda_types::{NationalId, VerificationHash};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use zeroize::Zeroizing;

use crate::CryptoError;

type Blake2b256 = Blake2b<U32>;
type HmacSha256 = Hmac<Sha256>;

/// Minimum salt length accepted for the verification hash.
pub const MIN_SALT_LEN: usize = 16;

/// Hash multiple byte slices in sequence (avoids concatenation allocation).
pub fn blake2b_256_multi(parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Blake2b256::new();
    for part in parts {
        hasher.update(part);
    }
    let result = hasher.finalize();
    let mut output = [0u8; 32];
    output.copy_from_slice(&result);
    output
}

/// Deterministic, salted, one-way digest of national IDs.
///
/// The same plaintext always yields the same hash under one salt, so equality
/// of hashes is equality of IDs. The salt is fixed for the lifetime of the data;
/// changing it orphans every stored hash.
pub struct IdHasher {
    keyed: HmacSha256,
}

impl IdHasher {
    pub fn new(salt: Vec<u8>) -> Result<Self, CryptoError> {
        if salt.len() < MIN_SALT_LEN {
            return Err(CryptoError::InvalidKey(format!(
                "hash salt must be at least {MIN_SALT_LEN} bytes, got {}",
                salt.len()
            )));
        }
        let salt = Zeroizing::new(salt);
        let keyed = HmacSha256::new_from_slice(&salt)
            .map_err(|e| CryptoError::InvalidKey(format!("hash salt rejected: {e}")))?;
        Ok(Self { keyed })
    }

    pub fn from_hex(salt_hex: &str) -> Result<Self, CryptoError> {
        let salt = hex::decode(salt_hex.trim())
            .map_err(|e| CryptoError::InvalidKey(format!("hash salt is not hex: {e}")))?;
        Self::new(salt)
    }

    pub fn hash(&self, id: &NationalId) -> VerificationHash {
        let mut mac = self.keyed.clone();
        mac.update(id.as_bytes());
        let digest = mac.finalize().into_bytes();
        let mut output = [0u8; 32];
        output.copy_from_slice(&digest);
        VerificationHash::new(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hasher() -> IdHasher {
        IdHasher::new(b"0123456789abcdef-test-salt".to_vec()).unwrap()
    }

    #[test]
    fn blake2b_multi_hashes_the_concatenation() {
        let single = blake2b_256_multi(&[b"helloworld"]);
        let multi = blake2b_256_multi(&[b"hello", b"world"]);
        assert_eq!(single, multi);
        assert_ne!(single, blake2b_256_multi(&[b"hello boda"]));
    }

    #[test]
    fn verification_hash_is_stable() {
        let id = NationalId::new("CF12345678901");
        assert_eq!(hasher().hash(&id), hasher().hash(&id));
    }

    #[test]
    fn verification_hash_depends_on_salt() {
        let id = NationalId::new("CF12345678901");
        let other = IdHasher::new(b"another-salt-of-16+bytes".to_vec()).unwrap();
        assert_ne!(hasher().hash(&id), other.hash(&id));
    }

    #[test]
    fn short_salt_rejected() {
        assert!(matches!(
            IdHasher::new(b"short".to_vec()),
            Err(CryptoError::InvalidKey(_))
        ));
    }

    #[test]
    fn salt_from_hex() {
        let h = IdHasher::from_hex(&"ab".repeat(16)).unwrap();
        let id = NationalId::new("CM98765432109");
        assert_ne!(h.hash(&id).as_bytes(), &[0u8; 32]);
        assert!(IdHasher::from_hex("zz").is_err());
    }
}
