//! Cryptographic primitives for national ID protection.
//!
//! - **ChaCha20-Poly1305** AEAD for sealing ID values at rest, bound to the rider
//! - **HMAC-SHA256** with a deployment salt for the duplicate-detection hash
//! - **Blake2b** for deriving per-purpose symmetric keys from configured key material
//!
//! Key material is loaded once into a [`KeyMaterial`] and shared read-only.

pub mod encryption;
pub mod error;
pub mod hash;
pub mod keys;

pub use encryption::{open_id, seal_id};
pub use error::CryptoError;
pub use hash::{blake2b_256_multi, IdHasher};
pub use keys::{generate_key_hex, generate_salt_hex, IdKey, IdKeyring, KeyMaterial};
