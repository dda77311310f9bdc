//! Per-run signal bundle. Lives only for the duration of one run; what is kept
//! is the JSON breakdown folded into the persisted results.

use boda_document::ExtractionResult;
use boda_photo::{AuthenticityResult, FaceMatchError, FaceMatchResult};
use boda_types::{mask_id, PhotoCategory};
use serde::Serialize;
use serde_json::{json, Value};

use crate::scoring::{ScoreBreakdown, SignalValues};
use crate::VerificationError;

/// A signal that could not be produced, with the code a caller would act on.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SignalFailure {
    pub code: &'static str,
    pub message: String,
}

impl From<VerificationError> for SignalFailure {
    fn from(e: VerificationError) -> Self {
        Self {
            code: e.reason_code(),
            message: e.to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum FaceSignal {
    Compared(FaceMatchResult),
    Failed(SignalFailure),
}

impl FaceSignal {
    pub fn from_comparison(result: Result<FaceMatchResult, FaceMatchError>) -> Self {
        match result {
            Ok(compared) => Self::Compared(compared),
            Err(FaceMatchError::NoFaceDetected { which }) => {
                Self::Failed(VerificationError::NoFaceDetected(which).into())
            }
            Err(FaceMatchError::Engine(e)) => Self::Failed(SignalFailure {
                code: "face_engine_failed",
                message: e.to_string(),
            }),
        }
    }

    pub fn unavailable(which: PhotoCategory, reason: &str) -> Self {
        Self::Failed(SignalFailure {
            code: "photo_unreadable",
            message: format!("{} photo: {reason}", which.as_str()),
        })
    }

    pub fn compared(&self) -> Option<&FaceMatchResult> {
        match self {
            Self::Compared(result) => Some(result),
            Self::Failed(_) => None,
        }
    }
}

/// Comparison of the ID read off the document with the one on record.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CrossCheck {
    /// Nothing to compare: no ID was extracted or none is on record.
    Skipped { reason: &'static str },
    Compared {
        extracted: String,
        similarity: f64,
        is_match: bool,
    },
    /// The gate refused plaintext access for this run's actor.
    Denied,
    Failed(SignalFailure),
}

impl CrossCheck {
    pub fn is_match(&self) -> bool {
        matches!(self, Self::Compared { is_match: true, .. })
    }

    /// `None` when no comparison took place.
    pub fn verdict(&self) -> Option<bool> {
        match self {
            Self::Compared { is_match, .. } => Some(*is_match),
            Self::Skipped { .. } | Self::Denied | Self::Failed(_) => None,
        }
    }
}

pub struct VerificationEvidence {
    pub profile: AuthenticityResult,
    pub id_document: AuthenticityResult,
    pub face: FaceSignal,
    pub extraction: ExtractionResult,
    pub cross_check: CrossCheck,
}

impl VerificationEvidence {
    pub fn signal_values(&self) -> SignalValues {
        let face = self.face.compared();
        SignalValues {
            profile_authentic: self.profile.authentic,
            id_document_authentic: self.id_document.authentic,
            face_confidence: face.map_or(0.0, |f| f.confidence),
            face_degraded: face.is_some_and(|f| f.is_degraded()),
            extraction_succeeded: self.extraction.success,
            cross_verified: self.cross_check.is_match(),
        }
    }

    pub fn face_confidence(&self) -> f64 {
        self.face.compared().map_or(0.0, |f| f.confidence)
    }

    /// Warnings that belong on the result for `category`.
    pub fn warnings_for(&self, category: PhotoCategory) -> Vec<String> {
        let mut warnings = match category {
            PhotoCategory::Profile => self.profile.warnings.clone(),
            PhotoCategory::IdDocument => self.id_document.warnings.clone(),
        };
        match &self.face {
            FaceSignal::Compared(result) => warnings.extend(result.warnings.iter().cloned()),
            FaceSignal::Failed(failure) => warnings.push(failure.message.clone()),
        }
        if category == PhotoCategory::IdDocument {
            if let Some(error) = &self.extraction.error {
                warnings.push(format!("Text extraction failed: {error}"));
            }
        }
        warnings
    }

    /// The structured breakdown stored with each result. Extracted ID numbers
    /// appear masked and the raw OCR text is left out.
    pub fn details(&self, breakdown: &ScoreBreakdown) -> Value {
        let parsed = &self.extraction.parsed;
        json!({
            "profile_photo": self.profile,
            "id_document": self.id_document,
            "face_match": self.face,
            "id_extraction": {
                "success": self.extraction.success,
                "engine": self.extraction.engine,
                "confidence": self.extraction.confidence,
                "error": self.extraction.error,
                "text_length": self.extraction.raw_text.len(),
                "parsed": {
                    "id_number": parsed.id_number.as_deref().map(mask_id),
                    "name": parsed.name,
                    "date_of_birth": parsed.date_of_birth,
                    "sex": parsed.sex,
                },
            },
            "id_cross_verification": self.cross_check,
            "score": breakdown,
        })
    }
}
