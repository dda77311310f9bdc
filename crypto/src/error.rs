use thiserror::Error;

#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("invalid key material: {0}")]
    InvalidKey(String),

    #[error("no key with id {0} in the keyring")]
    UnknownKeyId(u8),

    #[error("sealed value is malformed: {0}")]
    Malformed(&'static str),

    #[error("encryption failed")]
    EncryptFailed,

    #[error("decryption failed: authentication check failed")]
    DecryptFailed,
}
