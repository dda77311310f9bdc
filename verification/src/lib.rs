//! Rider photo verification.
//!
//! One run of the [`Orchestrator`] collects four independent signals
//! concurrently (authenticity of each photo, face match, ID text extraction),
//! cross-checks the extracted ID against the stored one through the access
//! gate, then fuses everything into a weighted score:
//!
//! | signal                    | weight |
//! |---------------------------|--------|
//! | profile photo authentic   | 0.25   |
//! | ID photo authentic        | 0.25   |
//! | face match confidence     | 0.30   |
//! | text extraction succeeded | 0.10   |
//! | extracted ID matches      | 0.10   |
//!
//! Scores of 0.8 and above are VERIFIED, 0.5 and above FLAGGED, anything
//! lower REJECTED. A failed signal contributes zero; only a missing photo,
//! a refused caller, a timeout or a storage failure aborts the run, and an
//! aborted run persists nothing.
//!
//! Reviewer decisions ([`Orchestrator::override_decision`]) stick until a
//! run is explicitly re-triggered with [`Orchestrator::reverify`].

pub mod error;
pub mod evidence;
pub mod orchestrator;
pub mod outcome;
pub mod review;
pub mod scoring;
pub mod stats;

pub use error::VerificationError;
pub use evidence::{CrossCheck, FaceSignal, SignalFailure, VerificationEvidence};
pub use orchestrator::{Orchestrator, SignalSources};
pub use outcome::{
    PendingReview, RecentVerification, VerificationOutcome, VerificationReport,
    VerificationStatistics, VerificationSummary,
};
pub use scoring::{positional_similarity, ScoreBreakdown, ScoreWeights, ScoringConfig, SignalValues};
