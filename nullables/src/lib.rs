//! Nullable infrastructure for deterministic testing.
//!
//! Every external collaborator of the pipeline (clock, storage, rider
//! directory, face embedding engine, OCR engine) sits behind a trait. This
//! crate provides test-friendly implementations that:
//! - Return deterministic values
//! - Can be controlled programmatically (scripted outputs, injected failures)
//! - Never touch the filesystem, a subprocess or the network
//!
//! Usage: swap real implementations for nullables in tests.

pub mod capability;
pub mod clock;
pub mod store;

pub use capability::{NullFaceEmbedder, NullOcrEngine};
pub use clock::NullClock;
pub use store::{NullAuditStore, NullDirectory, NullIdentityStore, NullVerificationStore};
