//! Persisted records: identity, per-photo verification result, rider aggregate.

use crate::ids::RiderId;
use crate::national_id::{SealedId, VerificationHash};
use crate::status::{DecisionSource, PhotoCategory, VerificationStatus};
use crate::time::Timestamp;
use serde::{Deserialize, Serialize};

/// A rider's stored government ID. One per rider.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IdentityRecord {
    pub rider: RiderId,
    /// Encrypted ID value. Never compared directly.
    pub ciphertext: SealedId,
    /// Unique across all records; the storage layer enforces it.
    pub verification_hash: VerificationHash,
    pub id_verification_status: VerificationStatus,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub last_accessed_at: Option<Timestamp>,
    pub access_count: u64,
    pub verified_at: Option<Timestamp>,
    pub verified_by: Option<String>,
}

/// Outcome of a verification run (or reviewer action) for one photo category.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PhotoVerificationResult {
    pub rider: RiderId,
    pub category: PhotoCategory,
    pub status: VerificationStatus,
    pub is_authentic: bool,
    /// Authenticity confidence for this photo, in [0, 1].
    pub confidence_score: f64,
    /// Face match confidence between the two photos, in [0, 1].
    pub face_match_score: f64,
    pub warnings: Vec<String>,
    /// Per-check breakdown of the run that produced this result.
    #[serde(with = "json_text")]
    pub verification_details: serde_json::Value,
    pub reviewer_notes: String,
    pub verified_by: Option<String>,
    pub decided_by: DecisionSource,
    pub created_at: Timestamp,
    pub verified_at: Option<Timestamp>,
}

/// The rider-level aggregate the rest of the product reads.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RiderVerificationState {
    pub rider: RiderId,
    pub photo_verification_status: VerificationStatus,
    pub overall_score: Option<f64>,
    pub face_match_score: Option<f64>,
    pub photo_verified_at: Option<Timestamp>,
    pub photo_verified_by: Option<String>,
    pub decided_by: DecisionSource,
}

impl RiderVerificationState {
    pub fn pending(rider: RiderId) -> Self {
        Self {
            rider,
            photo_verification_status: VerificationStatus::Pending,
            overall_score: None,
            face_match_score: None,
            photo_verified_at: None,
            photo_verified_by: None,
            decided_by: DecisionSource::Automatic,
        }
    }
}

/// Keeps `verification_details` as JSON text for non-self-describing
/// encodings (bincode); human-readable formats get the JSON value itself.
mod json_text {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(value: &serde_json::Value, s: S) -> Result<S::Ok, S::Error> {
        if s.is_human_readable() {
            value.serialize(s)
        } else {
            s.serialize_str(&value.to_string())
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<serde_json::Value, D::Error> {
        if d.is_human_readable() {
            return serde_json::Value::deserialize(d);
        }
        let text = String::deserialize(d)?;
        serde_json::from_str(&text).map_err(serde::de::Error::custom)
    }
}
