//! LMDB implementation of VerificationRecordStore.
//!
//! `results`: `rider ++ 0x00 ++ category` -> bincode(PhotoVerificationResult).
//! `states`: rider bytes -> bincode(RiderVerificationState).
//! A run's aggregate and its per-category results are committed together.

use std::sync::Arc;

use heed::types::Bytes;
use heed::{Database, Env};

use boda_store::{StoreError, VerificationRecordStore};
use boda_types::{PhotoCategory, PhotoVerificationResult, RiderId, RiderVerificationState};

use crate::keys::result_key;
use crate::LmdbError;

pub struct LmdbVerificationStore {
    pub(crate) env: Arc<Env>,
    pub(crate) results_db: Database<Bytes, Bytes>,
    pub(crate) states_db: Database<Bytes, Bytes>,
}

impl VerificationRecordStore for LmdbVerificationStore {
    fn get_result(
        &self,
        rider: &RiderId,
        category: PhotoCategory,
    ) -> Result<Option<PhotoVerificationResult>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let result = match self
            .results_db
            .get(&rtxn, &result_key(rider, category))
            .map_err(LmdbError::from)?
        {
            Some(bytes) => Some(bincode::deserialize(bytes).map_err(LmdbError::from)?),
            None => None,
        };
        Ok(result)
    }

    fn get_state(&self, rider: &RiderId) -> Result<Option<RiderVerificationState>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let state = match self
            .states_db
            .get(&rtxn, rider.as_str().as_bytes())
            .map_err(LmdbError::from)?
        {
            Some(bytes) => Some(bincode::deserialize(bytes).map_err(LmdbError::from)?),
            None => None,
        };
        Ok(state)
    }

    fn commit(
        &self,
        state: &RiderVerificationState,
        results: &[PhotoVerificationResult],
    ) -> Result<(), StoreError> {
        // Serialize everything before opening the transaction so an encoding
        // failure never leaves a half-written run.
        let state_bytes = bincode::serialize(state).map_err(LmdbError::from)?;
        let mut encoded = Vec::with_capacity(results.len());
        for result in results {
            encoded.push((
                result_key(&result.rider, result.category),
                bincode::serialize(result).map_err(LmdbError::from)?,
            ));
        }

        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        self.states_db
            .put(&mut wtxn, state.rider.as_str().as_bytes(), &state_bytes)
            .map_err(LmdbError::from)?;
        for (key, bytes) in &encoded {
            self.results_db
                .put(&mut wtxn, key, bytes)
                .map_err(LmdbError::from)?;
        }
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn list_states(&self) -> Result<Vec<RiderVerificationState>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let mut states = Vec::new();
        for entry in self.states_db.iter(&rtxn).map_err(LmdbError::from)? {
            let (_key, bytes) = entry.map_err(LmdbError::from)?;
            states.push(bincode::deserialize(bytes).map_err(LmdbError::from)?);
        }
        Ok(states)
    }

    fn recent_verified(
        &self,
        category: PhotoCategory,
        limit: usize,
    ) -> Result<Vec<PhotoVerificationResult>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let mut verified: Vec<PhotoVerificationResult> = Vec::new();
        for entry in self.results_db.iter(&rtxn).map_err(LmdbError::from)? {
            let (_key, bytes) = entry.map_err(LmdbError::from)?;
            let result: PhotoVerificationResult =
                bincode::deserialize(bytes).map_err(LmdbError::from)?;
            if result.category == category && result.verified_at.is_some() {
                verified.push(result);
            }
        }
        verified.sort_by(|a, b| b.verified_at.cmp(&a.verified_at));
        verified.truncate(limit);
        Ok(verified)
    }
}
