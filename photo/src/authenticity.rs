//! Single-photo authenticity scoring.
//!
//! Five independent checks, each weighted. Confidence is the weight of the
//! checks that passed over the weight of the checks that ran; a check that
//! could not run is left out of both.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, warn};

use crate::{
    CaptureMetadata, EngineError, FaceDetection, FaceDetector, ManipulationReport, Photo,
    QualityReport, SkinToneDetector,
};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckWeights {
    pub resolution: f64,
    pub capture_metadata: f64,
    pub quality: f64,
    pub manipulation: f64,
    pub face_presence: f64,
}

impl Default for CheckWeights {
    fn default() -> Self {
        Self {
            resolution: 0.15,
            capture_metadata: 0.25,
            quality: 0.25,
            manipulation: 0.20,
            face_presence: 0.15,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthenticityConfig {
    pub min_width: u32,
    pub min_height: u32,
    /// Confidence at or above which a photo is authentic.
    pub threshold: f64,
    /// Blended quality score above which the quality check passes.
    pub quality_threshold: f64,
    pub min_aspect_ratio: f64,
    pub max_aspect_ratio: f64,
    /// Skin-toned fraction of the central region needed by the fallback face check.
    pub skin_ratio: f64,
    pub weights: CheckWeights,
}

impl Default for AuthenticityConfig {
    fn default() -> Self {
        Self {
            min_width: 300,
            min_height: 300,
            threshold: 0.6,
            quality_threshold: 0.4,
            min_aspect_ratio: 0.5,
            max_aspect_ratio: 2.0,
            skin_ratio: 0.1,
            weights: CheckWeights::default(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthenticityCheck {
    Resolution,
    CaptureMetadata,
    Quality,
    Manipulation,
    FacePresence,
}

impl AuthenticityCheck {
    pub const ALL: [Self; 5] = [
        Self::Resolution,
        Self::CaptureMetadata,
        Self::Quality,
        Self::Manipulation,
        Self::FacePresence,
    ];

    pub fn weight(&self, weights: &CheckWeights) -> f64 {
        match self {
            Self::Resolution => weights.resolution,
            Self::CaptureMetadata => weights.capture_metadata,
            Self::Quality => weights.quality,
            Self::Manipulation => weights.manipulation,
            Self::FacePresence => weights.face_presence,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckOutcome {
    Passed,
    Failed,
    /// The check could not run; excluded from the score.
    Skipped,
}

impl From<bool> for CheckOutcome {
    fn from(passed: bool) -> Self {
        if passed {
            Self::Passed
        } else {
            Self::Failed
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AuthenticityResult {
    pub authentic: bool,
    pub confidence: f64,
    pub checks: BTreeMap<AuthenticityCheck, CheckOutcome>,
    pub warnings: Vec<String>,
    /// Per-check breakdown (measurements, metadata, detector used).
    pub details: serde_json::Value,
}

impl AuthenticityResult {
    /// Result for a photo that could not be loaded at all.
    pub fn unreadable(reason: &str) -> Self {
        Self {
            authentic: false,
            confidence: 0.0,
            checks: AuthenticityCheck::ALL
                .into_iter()
                .map(|c| (c, CheckOutcome::Skipped))
                .collect(),
            warnings: vec![format!("Verification failed: {reason}")],
            details: json!({ "error": reason }),
        }
    }

    /// `Some(passed)` for a check that ran, `None` if it was skipped.
    pub fn passed(&self, check: AuthenticityCheck) -> Option<bool> {
        match self.checks.get(&check) {
            Some(CheckOutcome::Passed) => Some(true),
            Some(CheckOutcome::Failed) => Some(false),
            Some(CheckOutcome::Skipped) | None => None,
        }
    }
}

pub struct AuthenticityAnalyzer {
    config: AuthenticityConfig,
    detector: Option<Arc<dyn FaceDetector>>,
    fallback: SkinToneDetector,
}

impl AuthenticityAnalyzer {
    /// `detector` is the true face detector for this deployment, if any. The
    /// skin-tone heuristic is used whenever it is absent or cannot answer.
    pub fn new(config: AuthenticityConfig, detector: Option<Arc<dyn FaceDetector>>) -> Self {
        let fallback = SkinToneDetector {
            min_ratio: config.skin_ratio,
        };
        Self {
            config,
            detector,
            fallback,
        }
    }

    pub fn config(&self) -> &AuthenticityConfig {
        &self.config
    }

    pub fn analyze(&self, photo: &Photo) -> AuthenticityResult {
        let cfg = &self.config;
        let mut checks: BTreeMap<AuthenticityCheck, CheckOutcome> = BTreeMap::new();
        let mut warnings = Vec::new();

        let (w, h) = (photo.width(), photo.height());
        let resolution_ok = w >= cfg.min_width && h >= cfg.min_height;
        if !resolution_ok {
            warnings.push(format!("Low resolution: {w}x{h}"));
        }
        checks.insert(AuthenticityCheck::Resolution, resolution_ok.into());

        let exif = CaptureMetadata::read(photo.bytes());
        if !exif.has_camera_data {
            warnings.push("No camera metadata found".to_string());
        }
        checks.insert(AuthenticityCheck::CaptureMetadata, exif.has_camera_data.into());

        let quality = QualityReport::measure(photo.image(), cfg.quality_threshold);
        if !quality.good_quality {
            warnings.push(format!("Low image quality (score {:.2})", quality.overall));
        }
        checks.insert(AuthenticityCheck::Quality, quality.good_quality.into());

        let manipulation =
            match ManipulationReport::inspect(photo, cfg.min_aspect_ratio, cfg.max_aspect_ratio) {
                Ok(report) => {
                    warnings.extend(report.reasons.iter().cloned());
                    checks.insert(AuthenticityCheck::Manipulation, (!report.suspicious).into());
                    json!(report)
                }
                Err(e) => {
                    warn!(error = %e, "manipulation analysis failed");
                    checks.insert(AuthenticityCheck::Manipulation, CheckOutcome::Skipped);
                    json!({ "error": e.to_string() })
                }
            };

        let face = match self.detect_face(photo) {
            Some(detection) => {
                if !detection.face_found {
                    warnings.push("No face detected".to_string());
                }
                checks.insert(AuthenticityCheck::FacePresence, detection.face_found.into());
                json!(detection)
            }
            None => {
                checks.insert(AuthenticityCheck::FacePresence, CheckOutcome::Skipped);
                json!({ "method": "fallback_failed" })
            }
        };

        let confidence = score(&checks, &cfg.weights);
        debug!(confidence, width = w, height = h, "authenticity analysed");

        AuthenticityResult {
            authentic: confidence >= cfg.threshold,
            confidence,
            checks,
            warnings,
            details: json!({
                "resolution": format!("{w}x{h}"),
                "format": photo.format_name(),
                "exif": exif,
                "quality": quality,
                "manipulation": manipulation,
                "face": face,
            }),
        }
    }

    fn detect_face(&self, photo: &Photo) -> Option<FaceDetection> {
        if let Some(detector) = &self.detector {
            match detector.detect(photo) {
                Ok(detection) => return Some(detection),
                Err(EngineError::Unavailable(reason)) => {
                    debug!(%reason, "face detector unavailable, using skin-tone heuristic");
                }
                Err(EngineError::Failed(reason)) => {
                    warn!(%reason, "face detector failed, using skin-tone heuristic");
                }
            }
        }
        self.fallback.detect(photo).ok()
    }
}

fn score(checks: &BTreeMap<AuthenticityCheck, CheckOutcome>, weights: &CheckWeights) -> f64 {
    let (mut passed, mut considered) = (0.0, 0.0);
    for (check, outcome) in checks {
        let weight = check.weight(weights);
        match outcome {
            CheckOutcome::Passed => {
                passed += weight;
                considered += weight;
            }
            CheckOutcome::Failed => considered += weight,
            CheckOutcome::Skipped => {}
        }
    }
    if considered > 0.0 {
        passed / considered
    } else {
        0.0
    }
}
