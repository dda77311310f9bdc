//! Photo analysis for rider verification.
//!
//! - [`AuthenticityAnalyzer`] scores one image on independent, weighted checks
//!   (resolution, capture metadata, quality, manipulation, face presence).
//! - [`FaceMatcher`] compares the face in a profile photo with the face on an
//!   ID document, using a face embedding engine when one is available and a
//!   colour histogram comparison when it is not.
//!
//! External engines sit behind [`FaceEmbedder`] and [`FaceDetector`]; the
//! implementation in use is chosen at startup and named in every result.

pub mod authenticity;
pub mod error;
pub mod face;
pub mod manipulation;
pub mod matcher;
pub mod metadata;
pub mod photo;
pub mod quality;

#[cfg(test)]
pub(crate) mod testing;

pub use authenticity::{
    AuthenticityAnalyzer, AuthenticityCheck, AuthenticityConfig, AuthenticityResult, CheckOutcome,
    CheckWeights,
};
pub use error::{EngineError, FaceMatchError, PhotoError};
pub use face::{
    CommandFaceEmbedder, Embedding, EmbeddingFaceDetector, FaceDetection, FaceDetector,
    FaceEmbedder, SkinToneDetector,
};
pub use manipulation::ManipulationReport;
pub use matcher::{FaceMatchConfig, FaceMatchResult, FaceMatcher, MatchMethod, DEGRADED_METHOD};
pub use metadata::CaptureMetadata;
pub use photo::Photo;
pub use quality::QualityReport;
