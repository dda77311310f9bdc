//! LMDB environment setup.

use std::path::Path;
use std::sync::Arc;

use heed::types::Bytes;
use heed::{Database, Env, EnvOpenOptions};
use tracing::info;

use crate::{LmdbAuditStore, LmdbError, LmdbIdentityStore, LmdbVerificationStore};

/// Default memory map size: 1 GiB.
pub const DEFAULT_MAP_SIZE: usize = 1 << 30;

/// Named databases inside the environment.
const DATABASES: u32 = 6;

/// Wraps the LMDB environment and all database handles.
pub struct LmdbEnvironment {
    env: Arc<Env>,
    identities_db: Database<Bytes, Bytes>,
    hash_index_db: Database<Bytes, Bytes>,
    results_db: Database<Bytes, Bytes>,
    states_db: Database<Bytes, Bytes>,
    audit_db: Database<Bytes, Bytes>,
    meta_db: Database<Bytes, Bytes>,
}

impl LmdbEnvironment {
    /// Open or create an LMDB environment in the directory `path`.
    pub fn open(path: &Path, map_size: usize) -> Result<Self, LmdbError> {
        std::fs::create_dir_all(path)
            .map_err(|e| LmdbError::Heed(format!("create {}: {e}", path.display())))?;

        // SAFETY: the environment is opened once per process per directory and
        // the memory map is never modified outside of heed transactions.
        let env = unsafe {
            EnvOpenOptions::new()
                .map_size(map_size)
                .max_dbs(DATABASES)
                .open(path)?
        };

        let mut wtxn = env.write_txn()?;
        let identities_db = env.create_database(&mut wtxn, Some("identities"))?;
        let hash_index_db = env.create_database(&mut wtxn, Some("hash_index"))?;
        let results_db = env.create_database(&mut wtxn, Some("results"))?;
        let states_db = env.create_database(&mut wtxn, Some("states"))?;
        let audit_db = env.create_database(&mut wtxn, Some("audit"))?;
        let meta_db = env.create_database(&mut wtxn, Some("meta"))?;
        wtxn.commit()?;

        info!(path = %path.display(), map_size, "opened LMDB environment");

        Ok(Self {
            env: Arc::new(env),
            identities_db,
            hash_index_db,
            results_db,
            states_db,
            audit_db,
            meta_db,
        })
    }

    pub fn identity_store(&self) -> LmdbIdentityStore {
        LmdbIdentityStore {
            env: Arc::clone(&self.env),
            identities_db: self.identities_db,
            hash_index_db: self.hash_index_db,
        }
    }

    pub fn verification_store(&self) -> LmdbVerificationStore {
        LmdbVerificationStore {
            env: Arc::clone(&self.env),
            results_db: self.results_db,
            states_db: self.states_db,
        }
    }

    pub fn audit_store(&self) -> LmdbAuditStore {
        LmdbAuditStore {
            env: Arc::clone(&self.env),
            audit_db: self.audit_db,
            meta_db: self.meta_db,
        }
    }
}
