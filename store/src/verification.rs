//! Verification result storage trait.

use crate::StoreError;
use boda_types::{PhotoCategory, PhotoVerificationResult, RiderId, RiderVerificationState};

/// Storage for per-photo verification results and the rider aggregate.
pub trait VerificationRecordStore: Send + Sync {
    /// The latest result for one photo category.
    fn get_result(
        &self,
        rider: &RiderId,
        category: PhotoCategory,
    ) -> Result<Option<PhotoVerificationResult>, StoreError>;

    /// The rider-level aggregate, if any run or review has happened.
    fn get_state(&self, rider: &RiderId) -> Result<Option<RiderVerificationState>, StoreError>;

    /// Write the aggregate and every given result in one transaction.
    /// Results replace any existing result for the same (rider, category).
    fn commit(
        &self,
        state: &RiderVerificationState,
        results: &[PhotoVerificationResult],
    ) -> Result<(), StoreError>;

    /// Every rider aggregate on record.
    fn list_states(&self) -> Result<Vec<RiderVerificationState>, StoreError>;

    /// Results of one category with a `verified_at` time, newest first,
    /// at most `limit`.
    fn recent_verified(
        &self,
        category: PhotoCategory,
        limit: usize,
    ) -> Result<Vec<PhotoVerificationResult>, StoreError>;
}
