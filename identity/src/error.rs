use boda_crypto::CryptoError;
use boda_store::StoreError;
use boda_types::RiderId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("invalid national ID format: {0}")]
    InvalidFormat(String),

    #[error("national ID is already registered to another rider")]
    DuplicateIdentity,

    #[error("{actor} is not authorized to access the national ID of rider {rider}")]
    NotAuthorized { actor: String, rider: RiderId },

    #[error("rider {0} has no national ID on record")]
    NoIdentity(RiderId),

    #[error("rider {0} is not in the directory")]
    UnknownRider(RiderId),

    #[error("key material error: {0}")]
    Crypto(#[from] CryptoError),

    #[error("storage error: {0}")]
    Storage(#[from] StoreError),
}

impl IdentityError {
    /// Stable machine-readable code for API callers.
    pub fn reason_code(&self) -> &'static str {
        match self {
            Self::InvalidFormat(_) => "invalid_format",
            Self::DuplicateIdentity => "duplicate_identity",
            Self::NotAuthorized { .. } => "not_authorized",
            Self::NoIdentity(_) => "no_identity",
            Self::UnknownRider(_) => "unknown_rider",
            Self::Crypto(_) => "key_material",
            Self::Storage(_) => "storage_failure",
        }
    }
}
