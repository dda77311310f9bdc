use std::collections::{BTreeMap, HashMap};

use boda_types::{Actor, PhotoCategory, VerificationStatus};
use tracing::warn;

use crate::orchestrator::Orchestrator;
use crate::outcome::{RecentVerification, VerificationStatistics};
use crate::VerificationError;

const RECENT_LIMIT: usize = 10;

impl Orchestrator {
    /// Fleet-wide figures. Administrators only.
    ///
    /// Riders with no verification state count as PENDING. The recent list
    /// holds one entry per rider, taken from the profile result.
    pub fn statistics(&self, actor: &Actor) -> Result<VerificationStatistics, VerificationError> {
        if !matches!(actor, Actor::Administrator(_)) {
            warn!(actor = %actor, "statistics refused");
            return Err(VerificationError::NotAuthorized {
                actor: actor.to_string(),
                operation: "read verification statistics",
                rider: "*".to_string(),
            });
        }

        let riders = self.directory.riders()?;
        let states: HashMap<_, _> = self
            .records
            .list_states()?
            .into_iter()
            .map(|s| (s.rider.clone(), s))
            .collect();

        let total_riders = riders.len();
        let riders_with_photos = riders.iter().filter(|r| r.has_both_photos()).count();
        let photo_coverage = if total_riders > 0 {
            riders_with_photos as f64 * 100.0 / total_riders as f64
        } else {
            0.0
        };

        let mut status_breakdown: BTreeMap<VerificationStatus, usize> = BTreeMap::new();
        for rider in &riders {
            let status = states
                .get(&rider.id)
                .map_or(VerificationStatus::Pending, |s| s.photo_verification_status);
            *status_breakdown.entry(status).or_default() += 1;
        }

        let face_scores: Vec<f64> = riders
            .iter()
            .filter_map(|r| states.get(&r.id).and_then(|s| s.face_match_score))
            .collect();
        let average_face_match = (!face_scores.is_empty())
            .then(|| face_scores.iter().sum::<f64>() / face_scores.len() as f64);

        let recent = self
            .records
            .recent_verified(PhotoCategory::Profile, RECENT_LIMIT)?
            .into_iter()
            .map(RecentVerification::from)
            .collect();

        Ok(VerificationStatistics {
            total_riders,
            riders_with_photos,
            photo_coverage,
            status_breakdown,
            average_face_match,
            recent,
        })
    }
}
