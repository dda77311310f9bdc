//! Reviewer decisions, the review queue and stored reports.

use std::collections::HashMap;

use boda_identity::{authorize_id_access, authorize_review, Access};
use boda_types::{
    Actor, AuditAction, DecisionSource, PhotoCategory, PhotoVerificationResult, ReviewDecision,
    RiderId, RiderVerificationState,
};
use serde_json::json;
use tracing::{error, info, warn};

use crate::orchestrator::{Orchestrator, VERIFY_REASON};
use crate::outcome::{PendingReview, VerificationReport};
use crate::VerificationError;

impl Orchestrator {
    /// Record a reviewer's decision for `rider`.
    ///
    /// The decision stands until an explicit [`reverify`](Self::reverify);
    /// automatic runs are refused meanwhile. Administrators and the assigned
    /// agent only.
    pub fn override_decision(
        &self,
        rider: &RiderId,
        actor: &Actor,
        decision: ReviewDecision,
        notes: &str,
    ) -> Result<VerificationReport, VerificationError> {
        let access = Access::new(actor.clone(), format!("{VERIFY_REASON} - manual review"));
        let profile = self.profile(rider)?;
        if !authorize_review(actor, &profile) {
            return Err(self.refuse(rider, &access, "review photo verification"));
        }

        let status = decision.status();
        let now = self.clock.now();
        let verified_at = (decision == ReviewDecision::Approve).then_some(now);

        let mut state = self
            .records
            .get_state(rider)?
            .unwrap_or_else(|| RiderVerificationState::pending(rider.clone()));
        state.photo_verification_status = status;
        state.photo_verified_at = Some(now);
        state.photo_verified_by = actor.audit_ref();
        state.decided_by = DecisionSource::Reviewer;

        let mut results = self.stored_results(rider)?;
        if results.is_empty() {
            results.push(PhotoVerificationResult {
                rider: rider.clone(),
                category: PhotoCategory::Profile,
                status,
                is_authentic: false,
                confidence_score: 0.0,
                face_match_score: state.face_match_score.unwrap_or(0.0),
                warnings: Vec::new(),
                verification_details: json!({ "manual_review": true }),
                reviewer_notes: String::new(),
                verified_by: None,
                decided_by: DecisionSource::Reviewer,
                created_at: now,
                verified_at: None,
            });
        }
        for result in &mut results {
            result.status = status;
            result.reviewer_notes = notes.to_string();
            result.verified_by = actor.audit_ref();
            result.decided_by = DecisionSource::Reviewer;
            result.verified_at = verified_at;
        }

        if let Err(e) = self.records.commit(&state, &results) {
            error!(rider = %rider, error = %e, "failed to persist review decision");
            self.audit.record_best_effort(
                rider,
                &access,
                AuditAction::Verify,
                false,
                format!("{} - storage failure", access.reason),
            );
            return Err(e.into());
        }
        self.audit.record(
            rider,
            &access,
            AuditAction::Verify,
            true,
            format!("{} - {} ({status})", access.reason, decision.as_str()),
        )?;
        info!(rider = %rider, actor = %actor, decision = decision.as_str(), "review recorded");

        Ok(report_from(rider, &state, &results))
    }

    /// Riders with both photos whose status still needs a human: everyone's
    /// for administrators, their own assigned riders for field agents.
    pub fn pending_reviews(&self, actor: &Actor) -> Result<Vec<PendingReview>, VerificationError> {
        if !matches!(actor, Actor::Administrator(_) | Actor::FieldAgent(_)) {
            warn!(actor = %actor, "review queue refused");
            return Err(VerificationError::NotAuthorized {
                actor: actor.to_string(),
                operation: "list pending reviews",
                rider: "*".to_string(),
            });
        }

        let states: HashMap<RiderId, RiderVerificationState> = self
            .records
            .list_states()?
            .into_iter()
            .map(|s| (s.rider.clone(), s))
            .collect();

        let mut pending: Vec<PendingReview> = self
            .directory
            .riders()?
            .into_iter()
            .filter(|profile| authorize_review(actor, profile))
            .filter(|profile| profile.has_both_photos())
            .filter(|profile| {
                states
                    .get(&profile.id)
                    .map_or(true, |s| s.photo_verification_status.awaits_review())
            })
            .map(|profile| {
                let state = states.get(&profile.id);
                PendingReview::new(profile, state)
            })
            .collect();
        pending.sort_by(|a, b| a.rider.cmp(&b.rider));
        Ok(pending)
    }

    /// The stored results for `rider`, without running anything.
    ///
    /// Readable by administrators, the assigned agent and the rider. Fails
    /// with `NotVerified` if no run or review has happened yet.
    pub fn report(
        &self,
        rider: &RiderId,
        actor: &Actor,
    ) -> Result<VerificationReport, VerificationError> {
        let access = Access::new(actor.clone(), format!("{VERIFY_REASON} - report"));
        let profile = self.profile(rider)?;
        if !authorize_id_access(actor, &profile) {
            return Err(self.refuse(rider, &access, "read the verification report"));
        }

        let results = self.stored_results(rider)?;
        if results.is_empty() {
            return Err(VerificationError::NotVerified(rider.clone()));
        }
        let state = self
            .records
            .get_state(rider)?
            .unwrap_or_else(|| RiderVerificationState::pending(rider.clone()));
        Ok(report_from(rider, &state, &results))
    }

    fn stored_results(
        &self,
        rider: &RiderId,
    ) -> Result<Vec<PhotoVerificationResult>, VerificationError> {
        let mut results = Vec::new();
        for category in PhotoCategory::ALL {
            if let Some(result) = self.records.get_result(rider, category)? {
                results.push(result);
            }
        }
        Ok(results)
    }
}

fn report_from(
    rider: &RiderId,
    state: &RiderVerificationState,
    results: &[PhotoVerificationResult],
) -> VerificationReport {
    let find = |category: PhotoCategory| {
        results.iter().find(|r| r.category == category).cloned()
    };
    let profile = find(PhotoCategory::Profile);
    VerificationReport {
        rider: rider.clone(),
        status: state.photo_verification_status,
        overall_score: state.overall_score,
        face_match_score: state.face_match_score,
        decided_by: state.decided_by,
        verified_at: profile.as_ref().and_then(|r| r.verified_at),
        verified_by: profile.as_ref().and_then(|r| r.verified_by.clone()),
        profile,
        id_document: find(PhotoCategory::IdDocument),
    }
}
