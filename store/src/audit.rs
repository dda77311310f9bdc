//! Append-only audit trail storage trait.

use crate::StoreError;
use boda_types::{AuditEntry, RiderId};

/// Append-only storage for audit entries. There is no update or delete.
pub trait AuditStore: Send + Sync {
    /// Append an entry. The store assigns `seq`; the stored entry is returned.
    fn append(&self, entry: AuditEntry) -> Result<AuditEntry, StoreError>;

    /// All entries about a rider, newest first.
    fn entries_for(&self, rider: &RiderId) -> Result<Vec<AuditEntry>, StoreError>;
}
