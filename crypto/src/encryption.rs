//! Sealing national IDs at rest.
//!
//! ChaCha20-Poly1305 AEAD with a fresh random nonce per seal. The rider id is
//! bound as associated data, so a sealed value copied onto another rider's
//! record fails authentication instead of decrypting.
//!
//! Wire layout: `key_id (1) || nonce (12) || ciphertext || tag (16)`.

use boda_types::{NationalId, RiderId, SealedId};
use chacha20poly1305::{
    aead::{Aead, AeadCore, KeyInit, OsRng, Payload},
    ChaCha20Poly1305, Nonce,
};

use crate::keys::{IdKey, IdKeyring};
use crate::CryptoError;

const NONCE_LEN: usize = 12;
const TAG_LEN: usize = 16;
const HEADER_LEN: usize = 1 + NONCE_LEN;

fn cipher_for(key: &IdKey) -> Result<ChaCha20Poly1305, CryptoError> {
    ChaCha20Poly1305::new_from_slice(key.seal_key().as_slice())
        .map_err(|_| CryptoError::InvalidKey("sealing key has wrong length".into()))
}

/// Seal a national ID for `rider` under the keyring's active key.
pub fn seal_id(
    keyring: &IdKeyring,
    rider: &RiderId,
    id: &NationalId,
) -> Result<SealedId, CryptoError> {
    let (key_id, key) = keyring.active_key();
    let cipher = cipher_for(key)?;
    let nonce = ChaCha20Poly1305::generate_nonce(&mut OsRng);

    let ciphertext = cipher
        .encrypt(
            &nonce,
            Payload {
                msg: id.as_bytes(),
                aad: rider.as_str().as_bytes(),
            },
        )
        .map_err(|_| CryptoError::EncryptFailed)?;

    let mut out = Vec::with_capacity(HEADER_LEN + ciphertext.len());
    out.push(key_id);
    out.extend_from_slice(nonce.as_slice());
    out.extend_from_slice(&ciphertext);
    Ok(SealedId::from_bytes(out))
}

/// Open a sealed ID. Fails if the key is unknown, the value was tampered
/// with, or it was sealed for a different rider.
pub fn open_id(
    keyring: &IdKeyring,
    rider: &RiderId,
    sealed: &SealedId,
) -> Result<NationalId, CryptoError> {
    let bytes = sealed.as_bytes();
    if bytes.len() < HEADER_LEN + TAG_LEN {
        return Err(CryptoError::Malformed("sealed value too short"));
    }
    let key = keyring.key(bytes[0])?;
    let cipher = cipher_for(key)?;
    let nonce = Nonce::from_slice(&bytes[1..HEADER_LEN]);

    let mut plain = cipher
        .decrypt(
            nonce,
            Payload {
                msg: &bytes[HEADER_LEN..],
                aad: rider.as_str().as_bytes(),
            },
        )
        .map_err(|_| CryptoError::DecryptFailed)?;

    let result = std::str::from_utf8(&plain)
        .map(NationalId::new)
        .map_err(|_| CryptoError::Malformed("plaintext is not UTF-8"));
    zeroize::Zeroize::zeroize(&mut plain);
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ring() -> IdKeyring {
        IdKeyring::new(1, IdKey::new([7u8; 32]))
    }

    #[test]
    fn seal_open_roundtrip() {
        let rider = RiderId::new("DB-2025-0001");
        let id = NationalId::new("CF12345678901");
        let sealed = seal_id(&ring(), &rider, &id).unwrap();

        assert_eq!(sealed.key_id(), Some(1));
        assert_eq!(sealed.as_bytes().len(), HEADER_LEN + id.as_bytes().len() + TAG_LEN);
        assert!(!sealed
            .as_bytes()
            .windows(id.as_bytes().len())
            .any(|w| w == id.as_bytes()));

        let opened = open_id(&ring(), &rider, &sealed).unwrap();
        assert_eq!(opened, id);
    }

    #[test]
    fn nonce_is_fresh_per_seal() {
        let rider = RiderId::new("r");
        let id = NationalId::new("CF12345678901");
        let a = seal_id(&ring(), &rider, &id).unwrap();
        let b = seal_id(&ring(), &rider, &id).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn wrong_key_fails_authentication() {
        let rider = RiderId::new("r");
        let sealed = seal_id(&ring(), &rider, &NationalId::new("CF12345678901")).unwrap();
        let other = IdKeyring::new(1, IdKey::new([8u8; 32]));
        assert!(matches!(
            open_id(&other, &rider, &sealed),
            Err(CryptoError::DecryptFailed)
        ));
    }

    #[test]
    fn value_bound_to_rider() {
        let sealed =
            seal_id(&ring(), &RiderId::new("a"), &NationalId::new("CF12345678901")).unwrap();
        assert!(matches!(
            open_id(&ring(), &RiderId::new("b"), &sealed),
            Err(CryptoError::DecryptFailed)
        ));
    }

    #[test]
    fn tampered_ciphertext_fails_authentication() {
        let rider = RiderId::new("r");
        let sealed = seal_id(&ring(), &rider, &NationalId::new("CF12345678901")).unwrap();
        let mut bytes = sealed.as_bytes().to_vec();
        let last = bytes.len() - 1;
        bytes[last] ^= 0xFF;
        assert!(open_id(&ring(), &rider, &SealedId::from_bytes(bytes)).is_err());
    }

    #[test]
    fn retired_key_still_opens() {
        let rider = RiderId::new("r");
        let old = IdKeyring::new(1, IdKey::new([7u8; 32]));
        let sealed = seal_id(&old, &rider, &NationalId::new("CM98765432109")).unwrap();

        let rotated = IdKeyring::new(2, IdKey::new([9u8; 32]))
            .with_retired(1, IdKey::new([7u8; 32]))
            .unwrap();
        assert_eq!(
            open_id(&rotated, &rider, &sealed).unwrap().as_str(),
            "CM98765432109"
        );
        let resealed = seal_id(&rotated, &rider, &NationalId::new("CM98765432109")).unwrap();
        assert_eq!(resealed.key_id(), Some(2));
    }

    #[test]
    fn unknown_key_id_reported() {
        let mut bytes = vec![42u8];
        bytes.extend_from_slice(&[0u8; NONCE_LEN + TAG_LEN + 4]);
        assert!(matches!(
            open_id(&ring(), &RiderId::new("r"), &SealedId::from_bytes(bytes)),
            Err(CryptoError::UnknownKeyId(42))
        ));
    }

    #[test]
    fn short_value_is_malformed() {
        assert!(matches!(
            open_id(&ring(), &RiderId::new("r"), &SealedId::from_bytes(vec![1, 2, 3])),
            Err(CryptoError::Malformed(_))
        ));
    }
}
