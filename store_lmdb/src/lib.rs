//! LMDB storage backend for the rider verification pipeline.
//!
//! Implements the storage traits from `boda-store` using the `heed` LMDB bindings.
//! Each logical store maps to one or more LMDB databases within a single environment,
//! and every multi-record write happens inside one write transaction.

pub mod audit;
pub mod environment;
pub mod error;
pub mod identity;
mod keys;
pub mod verification;

pub use audit::LmdbAuditStore;
pub use environment::LmdbEnvironment;
pub use error::LmdbError;
pub use identity::LmdbIdentityStore;
pub use verification::LmdbVerificationStore;
