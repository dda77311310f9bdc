//! Identity record storage trait.

use crate::StoreError;
use boda_types::{IdentityRecord, RiderId, Timestamp, VerificationHash};

/// Storage for sealed national IDs, with a uniqueness constraint on the
/// verification hash.
pub trait IdentityRecordStore: Send + Sync {
    /// Get the identity record for a rider, if one has been set.
    fn get_identity(&self, rider: &RiderId) -> Result<Option<IdentityRecord>, StoreError>;

    /// Insert or replace a rider's record.
    ///
    /// Must fail with [`StoreError::Duplicate`] if another rider already owns
    /// `record.verification_hash`, checked atomically with the write. On that
    /// failure neither record is modified.
    fn put_identity(&self, record: &IdentityRecord) -> Result<(), StoreError>;

    /// Which rider, if any, owns this hash.
    fn find_by_hash(&self, hash: &VerificationHash) -> Result<Option<RiderId>, StoreError>;

    /// Atomically bump `access_count` and set `last_accessed_at`.
    fn record_access(&self, rider: &RiderId, at: Timestamp) -> Result<(), StoreError>;
}
