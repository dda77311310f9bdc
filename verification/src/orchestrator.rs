//! The verification orchestrator: runs every signal for a rider, fuses them
//! into one score and persists the decision.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use boda_document::{ExtractionResult, TextExtractor};
use boda_identity::{authorize_review, Access, AuditLog, IdentityError, IdentityStore};
use boda_photo::{AuthenticityAnalyzer, AuthenticityResult, FaceMatcher, Photo, PhotoError};
use boda_store::{RiderDirectory, StoreError, VerificationRecordStore};
use boda_types::{
    mask_id, Actor, AuditAction, Clock, DecisionSource, PhotoCategory, PhotoVerificationResult,
    RiderId, RiderProfile, RiderVerificationState, Timestamp, VerificationStatus,
};
use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::evidence::{CrossCheck, FaceSignal, VerificationEvidence};
use crate::outcome::{VerificationOutcome, VerificationSummary};
use crate::scoring::{positional_similarity, ScoringConfig};
use crate::VerificationError;

pub(crate) const VERIFY_REASON: &str = "Photo verification";
const CROSS_CHECK_REASON: &str = "Photo verification cross-check";

/// The analysis engines one run draws its signals from.
pub struct SignalSources {
    pub analyzer: AuthenticityAnalyzer,
    pub matcher: FaceMatcher,
    pub extractor: TextExtractor,
}

pub struct Orchestrator {
    pub(crate) identity: Arc<IdentityStore>,
    pub(crate) records: Arc<dyn VerificationRecordStore>,
    pub(crate) directory: Arc<dyn RiderDirectory>,
    pub(crate) audit: AuditLog,
    pub(crate) clock: Arc<dyn Clock>,
    signals: SignalSources,
    scoring: ScoringConfig,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum RunKind {
    /// Refused while a reviewer decision stands.
    Automatic,
    /// Explicit re-run that replaces a reviewer decision.
    Retrigger,
}

impl Orchestrator {
    pub fn new(
        identity: Arc<IdentityStore>,
        records: Arc<dyn VerificationRecordStore>,
        directory: Arc<dyn RiderDirectory>,
        signals: SignalSources,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let audit = identity.audit_log().clone();
        Self {
            identity,
            records,
            directory,
            audit,
            clock,
            signals,
            scoring: ScoringConfig::default(),
        }
    }

    pub fn with_scoring(mut self, scoring: ScoringConfig) -> Self {
        self.scoring = scoring;
        self
    }

    pub fn scoring(&self) -> &ScoringConfig {
        &self.scoring
    }

    /// Run every signal for `rider` and record the result.
    ///
    /// Allowed for the system actor, administrators and the rider's assigned
    /// agent. Refused with `ReviewLocked` while a reviewer decision stands;
    /// use [`reverify`](Self::reverify) to replace one.
    pub fn verify(
        &self,
        rider: &RiderId,
        actor: &Actor,
    ) -> Result<VerificationOutcome, VerificationError> {
        self.run(rider, actor, RunKind::Automatic)
    }

    /// Like [`verify`](Self::verify), but also replaces a reviewer decision.
    /// Only administrators and the assigned agent may re-trigger.
    pub fn reverify(
        &self,
        rider: &RiderId,
        actor: &Actor,
    ) -> Result<VerificationOutcome, VerificationError> {
        self.run(rider, actor, RunKind::Retrigger)
    }

    fn run(
        &self,
        rider: &RiderId,
        actor: &Actor,
        kind: RunKind,
    ) -> Result<VerificationOutcome, VerificationError> {
        let access = Access::new(actor.clone(), VERIFY_REASON);
        let profile = self.profile(rider)?;

        let permitted = match kind {
            RunKind::Automatic => {
                matches!(actor, Actor::System) || authorize_review(actor, &profile)
            }
            RunKind::Retrigger => authorize_review(actor, &profile),
        };
        if !permitted {
            return Err(self.refuse(rider, &access, "run photo verification"));
        }

        if kind == RunKind::Automatic {
            if let Some(state) = self.records.get_state(rider)? {
                if state.decided_by == DecisionSource::Reviewer {
                    self.audit_failure(rider, &access, "locked by reviewer decision");
                    return Err(VerificationError::ReviewLocked(rider.clone()));
                }
            }
        }

        let (profile_path, id_path) = match (
            profile.photo(PhotoCategory::Profile),
            profile.photo(PhotoCategory::IdDocument),
        ) {
            (Some(p), Some(i)) => (p, i),
            (p, i) => {
                let missing = [(PhotoCategory::Profile, p), (PhotoCategory::IdDocument, i)]
                    .into_iter()
                    .filter(|(_, path)| path.is_none())
                    .map(|(category, _)| category)
                    .collect();
                self.audit_failure(rider, &access, "missing photos");
                return Err(VerificationError::MissingPhotos {
                    rider: rider.clone(),
                    missing,
                });
            }
        };

        let started = Instant::now();
        let evidence = self.collect(&profile, &access, profile_path, id_path);
        let elapsed = started.elapsed();
        let limit = self.scoring.run_timeout();
        if elapsed >= limit {
            warn!(
                rider = %rider,
                elapsed_ms = elapsed.as_millis() as u64,
                "verification timed out"
            );
            self.audit_failure(rider, &access, "timed out");
            return Err(VerificationError::TimedOut {
                rider: rider.clone(),
                limit_ms: self.scoring.run_timeout_ms,
            });
        }

        let breakdown = self.scoring.score(&evidence.signal_values());
        let status = self.scoring.classify(breakdown.total);
        let now = self.clock.now();
        let details = evidence.details(&breakdown);
        let results: Vec<PhotoVerificationResult> = PhotoCategory::ALL
            .into_iter()
            .map(|category| {
                automatic_result(rider, category, status, &evidence, &details, actor, now)
            })
            .collect();
        let state = RiderVerificationState {
            rider: rider.clone(),
            photo_verification_status: status,
            overall_score: Some(breakdown.total),
            face_match_score: Some(evidence.face_confidence()),
            photo_verified_at: Some(now),
            photo_verified_by: actor.audit_ref(),
            decided_by: DecisionSource::Automatic,
        };

        if let Err(e) = self.records.commit(&state, &results) {
            error!(rider = %rider, error = %e, "failed to persist verification");
            self.audit_failure(rider, &access, "storage failure");
            return Err(e.into());
        }
        self.audit.record(
            rider,
            &access,
            AuditAction::Verify,
            true,
            format!("{VERIFY_REASON} - {status} (score {:.2})", breakdown.total),
        )?;
        info!(
            rider = %rider,
            status = %status,
            score = breakdown.total,
            elapsed_ms = elapsed.as_millis() as u64,
            "photo verification complete"
        );

        Ok(VerificationOutcome {
            rider: rider.clone(),
            status,
            overall_score: breakdown.total,
            breakdown,
            summary: VerificationSummary::from_evidence(&evidence),
            results,
        })
    }

    /// All four signals concurrently, then the cross-check, which needs the
    /// extracted ID.
    fn collect(
        &self,
        profile: &RiderProfile,
        access: &Access,
        profile_path: &Path,
        id_path: &Path,
    ) -> VerificationEvidence {
        let (profile_photo, id_photo) =
            rayon::join(|| Photo::open(profile_path), || Photo::open(id_path));

        let ((profile_auth, id_auth), (face, extraction)) = rayon::join(
            || {
                rayon::join(
                    || self.authenticity(&profile_photo),
                    || self.authenticity(&id_photo),
                )
            },
            || {
                rayon::join(
                    || self.compare_faces(&profile_photo, &id_photo),
                    || self.extract(&id_photo),
                )
            },
        );
        let cross_check = self.cross_check(profile, access, &extraction);
        debug!(rider = %profile.id, ?cross_check, "signals collected");

        VerificationEvidence {
            profile: profile_auth,
            id_document: id_auth,
            face,
            extraction,
            cross_check,
        }
    }

    fn authenticity(&self, photo: &Result<Photo, PhotoError>) -> AuthenticityResult {
        match photo {
            Ok(photo) => self.signals.analyzer.analyze(photo),
            Err(e) => AuthenticityResult::unreadable(&e.to_string()),
        }
    }

    fn compare_faces(
        &self,
        profile: &Result<Photo, PhotoError>,
        id_document: &Result<Photo, PhotoError>,
    ) -> FaceSignal {
        match (profile, id_document) {
            (Ok(p), Ok(i)) => {
                let signal = FaceSignal::from_comparison(self.signals.matcher.compare(p, i));
                if let FaceSignal::Failed(failure) = &signal {
                    warn!(code = failure.code, reason = %failure.message, "face match signal lost");
                }
                signal
            }
            (Err(e), _) => FaceSignal::unavailable(PhotoCategory::Profile, &e.to_string()),
            (_, Err(e)) => FaceSignal::unavailable(PhotoCategory::IdDocument, &e.to_string()),
        }
    }

    fn extract(&self, id_document: &Result<Photo, PhotoError>) -> ExtractionResult {
        let extractor = &self.signals.extractor;
        let result = match id_document {
            Ok(photo) => extractor.extract(photo.image()),
            Err(e) => ExtractionResult::failure(extractor.engine_name(), e.to_string()),
        };
        if !result.success {
            let reason = result.error.clone().unwrap_or_default();
            let err = VerificationError::ExtractionFailed(reason);
            warn!(code = err.reason_code(), reason = %err, "extraction signal lost");
        }
        result
    }

    /// Compare the extracted ID with the stored one through the gate, as the
    /// run's own actor. A refusal is final for this run.
    fn cross_check(
        &self,
        profile: &RiderProfile,
        access: &Access,
        extraction: &ExtractionResult,
    ) -> CrossCheck {
        let extracted = match extraction.parsed.id_number.as_deref() {
            Some(id) if extraction.success => id,
            _ => {
                return CrossCheck::Skipped {
                    reason: "no ID number extracted",
                }
            }
        };
        match self.identity.has_identity(&profile.id) {
            Ok(true) => {}
            Ok(false) => {
                return CrossCheck::Skipped {
                    reason: "no ID on record",
                }
            }
            Err(e) => return CrossCheck::Failed(VerificationError::from(e).into()),
        }

        let mut access = access.clone();
        access.reason = CROSS_CHECK_REASON.to_string();
        match self.identity.get(&profile.id, &access) {
            Ok(stored) => {
                let similarity = positional_similarity(extracted, stored.as_str());
                CrossCheck::Compared {
                    extracted: mask_id(extracted),
                    similarity,
                    is_match: similarity >= self.scoring.cross_match_threshold,
                }
            }
            Err(IdentityError::NotAuthorized { actor, .. }) => {
                warn!(rider = %profile.id, %actor, "cross-verification refused by access gate");
                CrossCheck::Denied
            }
            Err(e) => CrossCheck::Failed(VerificationError::from(e).into()),
        }
    }

    pub(crate) fn profile(&self, rider: &RiderId) -> Result<RiderProfile, VerificationError> {
        match self.directory.rider(rider) {
            Ok(profile) => Ok(profile),
            Err(StoreError::NotFound(_)) => Err(VerificationError::UnknownRider(rider.clone())),
            Err(e) => Err(e.into()),
        }
    }

    /// Audit the refusal and build the error.
    pub(crate) fn refuse(
        &self,
        rider: &RiderId,
        access: &Access,
        operation: &'static str,
    ) -> VerificationError {
        self.audit.record_best_effort(
            rider,
            access,
            AuditAction::UnauthorizedAccess,
            false,
            format!("{} - {operation}", access.reason),
        );
        VerificationError::NotAuthorized {
            actor: access.actor.to_string(),
            operation,
            rider: rider.to_string(),
        }
    }

    fn audit_failure(&self, rider: &RiderId, access: &Access, what: &str) {
        self.audit.record_best_effort(
            rider,
            access,
            AuditAction::Verify,
            false,
            format!("{} - {what}", access.reason),
        );
    }
}

fn automatic_result(
    rider: &RiderId,
    category: PhotoCategory,
    status: VerificationStatus,
    evidence: &VerificationEvidence,
    details: &Value,
    actor: &Actor,
    now: Timestamp,
) -> PhotoVerificationResult {
    let authenticity = match category {
        PhotoCategory::Profile => &evidence.profile,
        PhotoCategory::IdDocument => &evidence.id_document,
    };
    PhotoVerificationResult {
        rider: rider.clone(),
        category,
        status,
        is_authentic: authenticity.authentic,
        confidence_score: authenticity.confidence,
        face_match_score: evidence.face_confidence(),
        warnings: evidence.warnings_for(category),
        verification_details: details.clone(),
        reviewer_notes: String::new(),
        verified_by: actor.audit_ref(),
        decided_by: DecisionSource::Automatic,
        created_at: now,
        verified_at: (status == VerificationStatus::Verified).then_some(now),
    }
}
