//! Nullable stores: thread-safe in-memory storage for testing.

use boda_store::{
    AuditStore, IdentityRecordStore, RiderDirectory, StoreError, VerificationRecordStore,
};
use boda_types::{
    AuditEntry, IdentityRecord, PhotoCategory, PhotoVerificationResult, RiderId, RiderProfile,
    RiderVerificationState, Timestamp, VerificationHash,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

#[derive(Default)]
struct IdentityTables {
    records: HashMap<RiderId, IdentityRecord>,
    by_hash: HashMap<VerificationHash, RiderId>,
}

/// An in-memory identity store. Both tables sit behind one lock so the
/// uniqueness check and the write are a single atomic step.
#[derive(Default)]
pub struct NullIdentityStore {
    tables: Mutex<IdentityTables>,
}

impl NullIdentityStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.tables.lock().unwrap().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl IdentityRecordStore for NullIdentityStore {
    fn get_identity(&self, rider: &RiderId) -> Result<Option<IdentityRecord>, StoreError> {
        Ok(self.tables.lock().unwrap().records.get(rider).cloned())
    }

    fn put_identity(&self, record: &IdentityRecord) -> Result<(), StoreError> {
        let mut tables = self.tables.lock().unwrap();
        if let Some(owner) = tables.by_hash.get(&record.verification_hash) {
            if owner != &record.rider {
                return Err(StoreError::Duplicate(format!(
                    "verification hash already owned by another rider ({})",
                    record.verification_hash
                )));
            }
        }
        if let Some(previous) = tables.records.get(&record.rider).cloned() {
            tables.by_hash.remove(&previous.verification_hash);
        }
        tables
            .by_hash
            .insert(record.verification_hash, record.rider.clone());
        tables.records.insert(record.rider.clone(), record.clone());
        Ok(())
    }

    fn find_by_hash(&self, hash: &VerificationHash) -> Result<Option<RiderId>, StoreError> {
        Ok(self.tables.lock().unwrap().by_hash.get(hash).cloned())
    }

    fn record_access(&self, rider: &RiderId, at: Timestamp) -> Result<(), StoreError> {
        let mut tables = self.tables.lock().unwrap();
        let record = tables
            .records
            .get_mut(rider)
            .ok_or_else(|| StoreError::NotFound(rider.to_string()))?;
        record.access_count += 1;
        record.last_accessed_at = Some(at);
        Ok(())
    }
}

#[derive(Default)]
struct VerificationTables {
    states: HashMap<RiderId, RiderVerificationState>,
    results: HashMap<(RiderId, PhotoCategory), PhotoVerificationResult>,
}

/// An in-memory verification store.
///
/// `fail_commits(true)` makes every commit fail with a backend error, for
/// exercising the all-or-nothing persistence boundary.
#[derive(Default)]
pub struct NullVerificationStore {
    tables: Mutex<VerificationTables>,
    fail_commits: AtomicBool,
    commits: Mutex<u64>,
}

impl NullVerificationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_commits(&self, fail: bool) {
        self.fail_commits.store(fail, Ordering::SeqCst);
    }

    /// Number of successful commits so far.
    pub fn commit_count(&self) -> u64 {
        *self.commits.lock().unwrap()
    }

    pub fn result_count(&self) -> usize {
        self.tables.lock().unwrap().results.len()
    }
}

impl VerificationRecordStore for NullVerificationStore {
    fn get_result(
        &self,
        rider: &RiderId,
        category: PhotoCategory,
    ) -> Result<Option<PhotoVerificationResult>, StoreError> {
        Ok(self
            .tables
            .lock()
            .unwrap()
            .results
            .get(&(rider.clone(), category))
            .cloned())
    }

    fn get_state(&self, rider: &RiderId) -> Result<Option<RiderVerificationState>, StoreError> {
        Ok(self.tables.lock().unwrap().states.get(rider).cloned())
    }

    fn commit(
        &self,
        state: &RiderVerificationState,
        results: &[PhotoVerificationResult],
    ) -> Result<(), StoreError> {
        if self.fail_commits.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("injected commit failure".into()));
        }
        let mut tables = self.tables.lock().unwrap();
        tables.states.insert(state.rider.clone(), state.clone());
        for result in results {
            tables
                .results
                .insert((result.rider.clone(), result.category), result.clone());
        }
        *self.commits.lock().unwrap() += 1;
        Ok(())
    }

    fn list_states(&self) -> Result<Vec<RiderVerificationState>, StoreError> {
        Ok(self.tables.lock().unwrap().states.values().cloned().collect())
    }

    fn recent_verified(
        &self,
        category: PhotoCategory,
        limit: usize,
    ) -> Result<Vec<PhotoVerificationResult>, StoreError> {
        let tables = self.tables.lock().unwrap();
        let mut verified: Vec<PhotoVerificationResult> = tables
            .results
            .values()
            .filter(|r| r.category == category && r.verified_at.is_some())
            .cloned()
            .collect();
        verified.sort_by(|a, b| b.verified_at.cmp(&a.verified_at));
        verified.truncate(limit);
        Ok(verified)
    }
}

/// An in-memory, append-only audit store.
#[derive(Default)]
pub struct NullAuditStore {
    entries: Mutex<Vec<AuditEntry>>,
    fail_appends: AtomicBool,
}

impl NullAuditStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_appends(&self, fail: bool) {
        self.fail_appends.store(fail, Ordering::SeqCst);
    }

    /// Every entry in insertion order.
    pub fn all(&self) -> Vec<AuditEntry> {
        self.entries.lock().unwrap().clone()
    }
}

impl AuditStore for NullAuditStore {
    fn append(&self, mut entry: AuditEntry) -> Result<AuditEntry, StoreError> {
        if self.fail_appends.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("injected audit failure".into()));
        }
        let mut entries = self.entries.lock().unwrap();
        entry.seq = entries.len() as u64 + 1;
        entries.push(entry.clone());
        Ok(entry)
    }

    fn entries_for(&self, rider: &RiderId) -> Result<Vec<AuditEntry>, StoreError> {
        let mut found: Vec<AuditEntry> = self
            .entries
            .lock()
            .unwrap()
            .iter()
            .filter(|e| &e.subject_rider == rider)
            .cloned()
            .collect();
        found.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then(b.seq.cmp(&a.seq)));
        Ok(found)
    }
}

/// An in-memory rider directory.
#[derive(Default)]
pub struct NullDirectory {
    riders: Mutex<HashMap<RiderId, RiderProfile>>,
}

impl NullDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, profile: RiderProfile) {
        self.riders
            .lock()
            .unwrap()
            .insert(profile.id.clone(), profile);
    }
}

impl RiderDirectory for NullDirectory {
    fn rider(&self, id: &RiderId) -> Result<RiderProfile, StoreError> {
        self.riders
            .lock()
            .unwrap()
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("rider {id}")))
    }

    fn riders(&self) -> Result<Vec<RiderProfile>, StoreError> {
        let mut all: Vec<RiderProfile> = self.riders.lock().unwrap().values().cloned().collect();
        all.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(all)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use boda_types::{AuditAction, SealedId, VerificationStatus};

    fn record(rider: &str, hash_byte: u8) -> IdentityRecord {
        IdentityRecord {
            rider: RiderId::new(rider),
            ciphertext: SealedId::from_bytes(vec![1, 2, 3]),
            verification_hash: VerificationHash::new([hash_byte; 32]),
            id_verification_status: VerificationStatus::Pending,
            created_at: Timestamp::new(10),
            updated_at: Timestamp::new(10),
            last_accessed_at: None,
            access_count: 0,
            verified_at: None,
            verified_by: None,
        }
    }

    #[test]
    fn duplicate_hash_rejected_without_mutation() {
        let store = NullIdentityStore::new();
        store.put_identity(&record("a", 1)).unwrap();
        store.put_identity(&record("b", 2)).unwrap();

        let err = store.put_identity(&record("b", 1)).unwrap_err();
        assert!(matches!(err, StoreError::Duplicate(_)));
        assert_eq!(
            store.get_identity(&RiderId::new("b")).unwrap().unwrap().verification_hash,
            VerificationHash::new([2; 32])
        );
        assert_eq!(
            store.find_by_hash(&VerificationHash::new([1; 32])).unwrap(),
            Some(RiderId::new("a"))
        );
    }

    #[test]
    fn replacing_own_record_moves_hash() {
        let store = NullIdentityStore::new();
        store.put_identity(&record("a", 1)).unwrap();
        store.put_identity(&record("a", 3)).unwrap();
        assert_eq!(store.find_by_hash(&VerificationHash::new([1; 32])).unwrap(), None);
        assert_eq!(
            store.find_by_hash(&VerificationHash::new([3; 32])).unwrap(),
            Some(RiderId::new("a"))
        );
        assert!(!store.is_empty());
    }

    #[test]
    fn record_access_increments() {
        let store = NullIdentityStore::new();
        store.put_identity(&record("a", 1)).unwrap();
        store.record_access(&RiderId::new("a"), Timestamp::new(99)).unwrap();
        store.record_access(&RiderId::new("a"), Timestamp::new(100)).unwrap();
        let rec = store.get_identity(&RiderId::new("a")).unwrap().unwrap();
        assert_eq!(rec.access_count, 2);
        assert_eq!(rec.last_accessed_at, Some(Timestamp::new(100)));
        assert!(store
            .record_access(&RiderId::new("ghost"), Timestamp::new(1))
            .is_err());
    }

    #[test]
    fn audit_entries_newest_first() {
        let store = NullAuditStore::new();
        for (i, ts) in [5u64, 7, 7].iter().enumerate() {
            store
                .append(AuditEntry {
                    seq: 0,
                    subject_rider: RiderId::new("a"),
                    actor: None,
                    action: AuditAction::View,
                    success: true,
                    reason: format!("#{i}"),
                    client_ip: None,
                    client_agent: None,
                    timestamp: Timestamp::new(*ts),
                })
                .unwrap();
        }
        let entries = store.entries_for(&RiderId::new("a")).unwrap();
        let reasons: Vec<&str> = entries.iter().map(|e| e.reason.as_str()).collect();
        assert_eq!(reasons, ["#2", "#1", "#0"]);
        assert!(store.entries_for(&RiderId::new("b")).unwrap().is_empty());
    }
}
