//! LMDB implementation of AuditStore.
//!
//! `audit`: `rider ++ 0x00 ++ seq` -> bincode(AuditEntry). The global sequence
//! counter lives in `meta` and is bumped in the same transaction as the insert.
//! There is no update or delete path.

use std::sync::Arc;

use heed::types::Bytes;
use heed::{Database, Env, RwTxn};

use boda_store::{AuditStore, StoreError};
use boda_types::{AuditEntry, RiderId};

use crate::keys::{audit_key, rider_prefix, scan_prefix};
use crate::LmdbError;

const AUDIT_SEQ_KEY: &[u8] = b"audit_seq";

pub struct LmdbAuditStore {
    pub(crate) env: Arc<Env>,
    pub(crate) audit_db: Database<Bytes, Bytes>,
    pub(crate) meta_db: Database<Bytes, Bytes>,
}

impl LmdbAuditStore {
    fn next_seq(&self, wtxn: &mut RwTxn<'_>) -> Result<u64, LmdbError> {
        let current = match self.meta_db.get(wtxn, AUDIT_SEQ_KEY)? {
            Some(bytes) => {
                let arr: [u8; 8] = bytes.try_into().map_err(|_| {
                    LmdbError::Serialization("audit_seq has unexpected byte length".to_string())
                })?;
                u64::from_be_bytes(arr)
            }
            None => 0,
        };
        let next = current + 1;
        self.meta_db.put(wtxn, AUDIT_SEQ_KEY, &next.to_be_bytes())?;
        Ok(next)
    }
}

impl AuditStore for LmdbAuditStore {
    fn append(&self, mut entry: AuditEntry) -> Result<AuditEntry, StoreError> {
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        entry.seq = self.next_seq(&mut wtxn)?;
        let bytes = bincode::serialize(&entry).map_err(LmdbError::from)?;
        self.audit_db
            .put(&mut wtxn, &audit_key(&entry.subject_rider, entry.seq), &bytes)
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(entry)
    }

    fn entries_for(&self, rider: &RiderId) -> Result<Vec<AuditEntry>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let mut entries = Vec::new();
        for bytes in scan_prefix(&self.audit_db, &rtxn, &rider_prefix(rider))? {
            let entry: AuditEntry = bincode::deserialize(&bytes).map_err(LmdbError::from)?;
            entries.push(entry);
        }
        entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then(b.seq.cmp(&a.seq)));
        Ok(entries)
    }
}
