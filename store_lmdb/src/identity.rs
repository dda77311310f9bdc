//! LMDB implementation of IdentityRecordStore.
//!
//! `identities`: rider bytes -> bincode(IdentityRecord).
//! `hash_index`: verification hash (32 bytes) -> rider bytes. This is the
//! unique constraint; it is read and written in the same transaction as the
//! record itself.

use std::sync::Arc;

use heed::types::Bytes;
use heed::{Database, Env};

use boda_store::{IdentityRecordStore, StoreError};
use boda_types::{IdentityRecord, RiderId, Timestamp, VerificationHash};

use crate::LmdbError;

pub struct LmdbIdentityStore {
    pub(crate) env: Arc<Env>,
    pub(crate) identities_db: Database<Bytes, Bytes>,
    pub(crate) hash_index_db: Database<Bytes, Bytes>,
}

fn decode(bytes: &[u8]) -> Result<IdentityRecord, LmdbError> {
    Ok(bincode::deserialize(bytes)?)
}

impl IdentityRecordStore for LmdbIdentityStore {
    fn get_identity(&self, rider: &RiderId) -> Result<Option<IdentityRecord>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let record = self
            .identities_db
            .get(&rtxn, rider.as_str().as_bytes())
            .map_err(LmdbError::from)?
            .map(decode)
            .transpose()?;
        Ok(record)
    }

    fn put_identity(&self, record: &IdentityRecord) -> Result<(), StoreError> {
        let rider_key = record.rider.as_str().as_bytes();
        let hash_key = record.verification_hash.as_bytes().as_slice();
        let bytes = bincode::serialize(record).map_err(LmdbError::from)?;

        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;

        if let Some(owner) = self
            .hash_index_db
            .get(&wtxn, hash_key)
            .map_err(LmdbError::from)?
        {
            if owner != rider_key {
                // Dropping the transaction aborts it; nothing was written.
                return Err(StoreError::Duplicate(format!(
                    "verification hash already owned by another rider ({})",
                    record.verification_hash
                )));
            }
        }

        let previous = self
            .identities_db
            .get(&wtxn, rider_key)
            .map_err(LmdbError::from)?
            .map(decode)
            .transpose()?;
        if let Some(previous) = previous {
            if previous.verification_hash != record.verification_hash {
                self.hash_index_db
                    .delete(&mut wtxn, previous.verification_hash.as_bytes().as_slice())
                    .map_err(LmdbError::from)?;
            }
        }

        self.hash_index_db
            .put(&mut wtxn, hash_key, rider_key)
            .map_err(LmdbError::from)?;
        self.identities_db
            .put(&mut wtxn, rider_key, &bytes)
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn find_by_hash(&self, hash: &VerificationHash) -> Result<Option<RiderId>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let owner = self
            .hash_index_db
            .get(&rtxn, hash.as_bytes().as_slice())
            .map_err(LmdbError::from)?
            .map(|bytes| {
                std::str::from_utf8(bytes)
                    .map(RiderId::new)
                    .map_err(|e| LmdbError::Serialization(e.to_string()))
            })
            .transpose()?;
        Ok(owner)
    }

    fn record_access(&self, rider: &RiderId, at: Timestamp) -> Result<(), StoreError> {
        let rider_key = rider.as_str().as_bytes();
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        let mut record = match self
            .identities_db
            .get(&wtxn, rider_key)
            .map_err(LmdbError::from)?
        {
            Some(bytes) => decode(bytes)?,
            None => return Err(LmdbError::NotFound(format!("identity for {rider}")).into()),
        };
        record.access_count += 1;
        record.last_accessed_at = Some(at);
        let bytes = bincode::serialize(&record).map_err(LmdbError::from)?;
        self.identities_db
            .put(&mut wtxn, rider_key, &bytes)
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }
}
