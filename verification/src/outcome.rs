//! What the orchestrator hands back to callers.

use std::collections::BTreeMap;

use boda_photo::MatchMethod;
use boda_types::{
    AgentId, DecisionSource, PhotoVerificationResult, RiderId, RiderProfile,
    RiderVerificationState, Timestamp, VerificationStatus,
};
use serde::Serialize;

use crate::evidence::{FaceSignal, VerificationEvidence};
use crate::scoring::ScoreBreakdown;

/// Result of one automatic run.
#[derive(Clone, Debug, Serialize)]
pub struct VerificationOutcome {
    pub rider: RiderId,
    pub status: VerificationStatus,
    pub overall_score: f64,
    pub breakdown: ScoreBreakdown,
    pub summary: VerificationSummary,
    /// One per photo category, as persisted.
    pub results: Vec<PhotoVerificationResult>,
}

/// Headline view of each signal, suitable for an API response.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct VerificationSummary {
    pub profile_authentic: bool,
    pub profile_confidence: f64,
    pub id_authentic: bool,
    pub id_confidence: f64,
    pub faces_match: bool,
    pub face_match_confidence: f64,
    /// `None` when the comparison could not run.
    pub face_match_method: Option<MatchMethod>,
    pub face_match_error: Option<String>,
    pub id_extracted: bool,
    pub extraction_engine: String,
    /// `None` when no cross-verification took place.
    pub cross_verified: Option<bool>,
}

impl VerificationSummary {
    pub(crate) fn from_evidence(evidence: &VerificationEvidence) -> Self {
        let (faces_match, face_match_method, face_match_error) = match &evidence.face {
            FaceSignal::Compared(result) => (result.is_match, Some(result.method), None),
            FaceSignal::Failed(failure) => (false, None, Some(failure.message.clone())),
        };
        Self {
            profile_authentic: evidence.profile.authentic,
            profile_confidence: evidence.profile.confidence,
            id_authentic: evidence.id_document.authentic,
            id_confidence: evidence.id_document.confidence,
            faces_match,
            face_match_confidence: evidence.face_confidence(),
            face_match_method,
            face_match_error,
            id_extracted: evidence.extraction.success,
            extraction_engine: evidence.extraction.engine.clone(),
            cross_verified: evidence.cross_check.verdict(),
        }
    }
}

/// Stored verification state of one rider, read without running anything.
#[derive(Clone, Debug, Serialize)]
pub struct VerificationReport {
    pub rider: RiderId,
    pub status: VerificationStatus,
    pub overall_score: Option<f64>,
    pub face_match_score: Option<f64>,
    pub decided_by: DecisionSource,
    pub verified_at: Option<Timestamp>,
    pub verified_by: Option<String>,
    pub profile: Option<PhotoVerificationResult>,
    pub id_document: Option<PhotoVerificationResult>,
}

/// One rider in a reviewer's queue.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PendingReview {
    pub rider: RiderId,
    pub display_name: String,
    pub status: VerificationStatus,
    pub face_match_score: Option<f64>,
    pub assigned_agent: Option<AgentId>,
}

impl PendingReview {
    pub(crate) fn new(profile: RiderProfile, state: Option<&RiderVerificationState>) -> Self {
        Self {
            status: state.map_or(VerificationStatus::Pending, |s| s.photo_verification_status),
            face_match_score: state.and_then(|s| s.face_match_score),
            rider: profile.id,
            display_name: profile.display_name,
            assigned_agent: profile.assigned_agent,
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct RecentVerification {
    pub rider: RiderId,
    pub status: VerificationStatus,
    pub confidence_score: f64,
    pub verified_at: Option<Timestamp>,
    pub verified_by: Option<String>,
}

impl From<PhotoVerificationResult> for RecentVerification {
    fn from(result: PhotoVerificationResult) -> Self {
        Self {
            rider: result.rider,
            status: result.status,
            confidence_score: result.confidence_score,
            verified_at: result.verified_at,
            verified_by: result.verified_by,
        }
    }
}

/// Fleet-wide verification figures for administrators.
#[derive(Clone, Debug, Serialize)]
pub struct VerificationStatistics {
    pub total_riders: usize,
    pub riders_with_photos: usize,
    /// Share of riders with both photos, in percent.
    pub photo_coverage: f64,
    pub status_breakdown: BTreeMap<VerificationStatus, usize>,
    pub average_face_match: Option<f64>,
    pub recent: Vec<RecentVerification>,
}
