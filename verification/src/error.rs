use boda_identity::IdentityError;
use boda_store::StoreError;
use boda_types::{PhotoCategory, RiderId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum VerificationError {
    #[error("invalid national ID format: {0}")]
    InvalidFormat(String),

    #[error("national ID is already registered to another rider")]
    DuplicateIdentity,

    #[error("{actor} is not authorized to {operation} for rider {rider}")]
    NotAuthorized {
        actor: String,
        operation: &'static str,
        rider: String,
    },

    #[error("rider {rider} is missing photos: {}", missing_list(.missing))]
    MissingPhotos {
        rider: RiderId,
        missing: Vec<PhotoCategory>,
    },

    #[error("no face detected in {} photo", .0.as_str().to_lowercase().replace('_', " "))]
    NoFaceDetected(PhotoCategory),

    #[error("text extraction failed: {0}")]
    ExtractionFailed(String),

    #[error("storage failure: {0}")]
    StorageFailure(#[from] StoreError),

    #[error("rider {0} has a reviewer decision; re-trigger explicitly to run again")]
    ReviewLocked(RiderId),

    #[error("verification of rider {rider} exceeded {limit_ms} ms; nothing was saved")]
    TimedOut { rider: RiderId, limit_ms: u64 },

    #[error("rider {0} is not in the directory")]
    UnknownRider(RiderId),

    #[error("rider {0} has no verification results")]
    NotVerified(RiderId),

    #[error("key material error: {0}")]
    KeyMaterial(String),
}

fn missing_list(missing: &[PhotoCategory]) -> String {
    missing
        .iter()
        .map(|c| c.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

impl VerificationError {
    /// Stable machine-readable code. Callers use it to decide whether to
    /// retry, ask for new photos, or escalate to a reviewer.
    pub fn reason_code(&self) -> &'static str {
        match self {
            Self::InvalidFormat(_) => "invalid_format",
            Self::DuplicateIdentity => "duplicate_identity",
            Self::NotAuthorized { .. } => "not_authorized",
            Self::MissingPhotos { .. } => "missing_photos",
            Self::NoFaceDetected(_) => "no_face_detected",
            Self::ExtractionFailed(_) => "extraction_failed",
            Self::StorageFailure(_) => "storage_failure",
            Self::ReviewLocked(_) => "review_locked",
            Self::TimedOut { .. } => "timed_out",
            Self::UnknownRider(_) => "unknown_rider",
            Self::NotVerified(_) => "not_verified",
            Self::KeyMaterial(_) => "key_material",
        }
    }
}

impl From<IdentityError> for VerificationError {
    fn from(e: IdentityError) -> Self {
        match e {
            IdentityError::InvalidFormat(msg) => Self::InvalidFormat(msg),
            IdentityError::DuplicateIdentity => Self::DuplicateIdentity,
            IdentityError::NotAuthorized { actor, rider } => Self::NotAuthorized {
                actor,
                operation: "access the national ID",
                rider: rider.to_string(),
            },
            IdentityError::NoIdentity(rider) => Self::NotVerified(rider),
            IdentityError::UnknownRider(rider) => Self::UnknownRider(rider),
            IdentityError::Crypto(e) => Self::KeyMaterial(e.to_string()),
            IdentityError::Storage(e) => Self::StorageFailure(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_photos_names_each_category() {
        let err = VerificationError::MissingPhotos {
            rider: RiderId::new("DB-1"),
            missing: vec![PhotoCategory::IdDocument],
        };
        assert_eq!(err.to_string(), "rider DB-1 is missing photos: ID_DOCUMENT");
        assert_eq!(err.reason_code(), "missing_photos");
    }

    #[test]
    fn no_face_names_the_photo() {
        let err = VerificationError::NoFaceDetected(PhotoCategory::IdDocument);
        assert_eq!(err.to_string(), "no face detected in id document photo");
    }

    #[test]
    fn identity_errors_keep_their_meaning() {
        let err: VerificationError = IdentityError::DuplicateIdentity.into();
        assert_eq!(err.reason_code(), "duplicate_identity");
        let err: VerificationError = StoreError::Backend("disk".into()).into();
        assert_eq!(err.reason_code(), "storage_failure");
    }
}
