//! Fundamental types for the rider identity verification pipeline.
//!
//! This crate defines the types shared across every other crate in the workspace:
//! rider and actor identities, timestamps, the plaintext/sealed ID split, the
//! persisted identity, verification and audit records, and their status enums.

pub mod actor;
pub mod audit;
pub mod ids;
pub mod national_id;
pub mod record;
pub mod rider;
pub mod status;
pub mod time;

pub use actor::Actor;
pub use audit::{AuditAction, AuditEntry, ClientInfo};
pub use ids::{AgentId, RiderId, UserId};
pub use national_id::{mask_id, NationalId, SealedId, VerificationHash, MASK_CHAR, MASK_VISIBLE};
pub use record::{IdentityRecord, PhotoVerificationResult, RiderVerificationState};
pub use rider::RiderProfile;
pub use status::{DecisionSource, PhotoCategory, ReviewDecision, VerificationStatus};
pub use time::{Clock, SystemClock, Timestamp};
