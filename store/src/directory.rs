//! Read-only view of the rider directory owned by the surrounding product.

use crate::StoreError;
use boda_types::{RiderId, RiderProfile};

pub trait RiderDirectory: Send + Sync {
    /// Look up one rider. [`StoreError::NotFound`] if unknown.
    fn rider(&self, id: &RiderId) -> Result<RiderProfile, StoreError>;

    /// Every rider known to the directory.
    fn riders(&self) -> Result<Vec<RiderProfile>, StoreError>;
}
