//! Abstract storage traits for the verification pipeline.
//!
//! Every storage backend (LMDB, in-memory for testing) implements these traits.
//! The services depend only on the traits, so persistence stays an injected
//! collaborator.

pub mod audit;
pub mod directory;
pub mod error;
pub mod identity;
pub mod verification;

pub use audit::AuditStore;
pub use directory::RiderDirectory;
pub use error::StoreError;
pub use identity::IdentityRecordStore;
pub use verification::VerificationRecordStore;
