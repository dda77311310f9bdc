//! Weighted fusion of the verification signals and status classification.

use std::time::Duration;

use boda_types::VerificationStatus;
use serde::{Deserialize, Serialize};

/// Contribution of each signal to the overall score. The defaults sum to 1.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    pub profile_authentic: f64,
    pub id_document_authentic: f64,
    pub face_match: f64,
    pub extraction: f64,
    pub cross_verification: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            profile_authentic: 0.25,
            id_document_authentic: 0.25,
            face_match: 0.30,
            extraction: 0.10,
            cross_verification: 0.10,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub weights: ScoreWeights,
    /// Scores at or above this are VERIFIED.
    pub verified_threshold: f64,
    /// Scores at or above this (and below `verified_threshold`) are FLAGGED.
    pub flagged_threshold: f64,
    /// Multiplier on the face match contribution when it came from the
    /// histogram fallback.
    pub degraded_face_discount: f64,
    /// Positional similarity at which an extracted ID counts as matching the
    /// stored one.
    pub cross_match_threshold: f64,
    /// Deadline for collecting all signals of one run.
    pub run_timeout_ms: u64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            weights: ScoreWeights::default(),
            verified_threshold: 0.8,
            flagged_threshold: 0.5,
            degraded_face_discount: 0.5,
            cross_match_threshold: 0.9,
            run_timeout_ms: 30_000,
        }
    }
}

impl ScoringConfig {
    pub fn run_timeout(&self) -> Duration {
        Duration::from_millis(self.run_timeout_ms)
    }

    /// Boundaries are inclusive on the upper class.
    pub fn classify(&self, score: f64) -> VerificationStatus {
        if score >= self.verified_threshold {
            VerificationStatus::Verified
        } else if score >= self.flagged_threshold {
            VerificationStatus::Flagged
        } else {
            VerificationStatus::Rejected
        }
    }
}

/// The per-signal inputs to the aggregate, already reduced to plain values.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SignalValues {
    pub profile_authentic: bool,
    pub id_document_authentic: bool,
    /// Face match confidence in [0, 1]; zero when no comparison was possible.
    pub face_confidence: f64,
    pub face_degraded: bool,
    pub extraction_succeeded: bool,
    pub cross_verified: bool,
}

/// How the overall score was put together.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub profile_authentic: f64,
    pub id_document_authentic: f64,
    pub face_match: f64,
    pub extraction: f64,
    pub cross_verification: f64,
    pub total: f64,
}

impl ScoringConfig {
    pub fn score(&self, signals: &SignalValues) -> ScoreBreakdown {
        let w = &self.weights;
        let flag = |on: bool, weight: f64| if on { weight } else { 0.0 };

        let face_discount = if signals.face_degraded {
            self.degraded_face_discount
        } else {
            1.0
        };
        let profile_authentic = flag(signals.profile_authentic, w.profile_authentic);
        let id_document_authentic = flag(signals.id_document_authentic, w.id_document_authentic);
        let face_match = signals.face_confidence.clamp(0.0, 1.0) * w.face_match * face_discount;
        let extraction = flag(signals.extraction_succeeded, w.extraction);
        let cross_verification = flag(signals.cross_verified, w.cross_verification);

        let total = profile_authentic + id_document_authentic + face_match + extraction
            + cross_verification;
        ScoreBreakdown {
            profile_authentic,
            id_document_authentic,
            face_match,
            extraction,
            cross_verification,
            total: total.min(1.0),
        }
    }
}

/// Fraction of positions at which the two IDs agree, over the longer length.
pub fn positional_similarity(a: &str, b: &str) -> f64 {
    let longest = a.chars().count().max(b.chars().count());
    if longest == 0 {
        return 0.0;
    }
    let same = a.chars().zip(b.chars()).filter(|(x, y)| x == y).count();
    same as f64 / longest as f64
}
