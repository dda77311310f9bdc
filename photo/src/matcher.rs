//! Face matching between a profile photo and an ID document photo.

use std::sync::Arc;

use boda_types::PhotoCategory;
use image::RgbImage;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{EngineError, Embedding, FaceEmbedder, FaceMatchError, Photo};

/// Warning attached to results produced by the histogram fallback.
pub const DEGRADED_METHOD: &str = "degraded-method";

const HISTOGRAM_BINS: usize = 256 * 3;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FaceMatchConfig {
    /// Maximum embedding distance that still counts as the same person.
    pub tolerance: f64,
    /// Histogram similarity above which the fallback reports a match.
    pub histogram_threshold: f64,
}

impl Default for FaceMatchConfig {
    fn default() -> Self {
        Self {
            tolerance: 0.4,
            histogram_threshold: 0.5,
        }
    }
}

/// Which strategy produced a [`FaceMatchResult`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMethod {
    /// Face embeddings from the configured embedder.
    Embedding,
    /// Colour histogram comparison of the whole images.
    Histogram,
}

impl MatchMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Embedding => "embedding",
            Self::Histogram => "basic_histogram_comparison",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FaceMatchResult {
    pub is_match: bool,
    /// In [0, 1].
    pub confidence: f64,
    pub method: MatchMethod,
    /// Smallest embedding distance; `None` for the histogram method.
    pub distance: Option<f64>,
    /// Faces found in (profile, ID document); `None` for the histogram method.
    pub faces_found: Option<(usize, usize)>,
    pub warnings: Vec<String>,
}

impl FaceMatchResult {
    /// Produced by a fallback, so downstream scoring should discount it.
    pub fn is_degraded(&self) -> bool {
        self.method == MatchMethod::Histogram
    }
}

/// Compares faces with the configured embedder, falling back to histograms
/// only when no embedder is configured or the embedder reports itself
/// unavailable.
pub struct FaceMatcher {
    embedder: Option<Arc<dyn FaceEmbedder>>,
    config: FaceMatchConfig,
}

impl FaceMatcher {
    pub fn new(embedder: Option<Arc<dyn FaceEmbedder>>, config: FaceMatchConfig) -> Self {
        Self { embedder, config }
    }

    /// Histogram comparison only.
    pub fn fallback_only(config: FaceMatchConfig) -> Self {
        Self::new(None, config)
    }

    pub fn compare(
        &self,
        profile: &Photo,
        id_document: &Photo,
    ) -> Result<FaceMatchResult, FaceMatchError> {
        let Some(embedder) = &self.embedder else {
            return Ok(self.histogram_match(profile, id_document));
        };
        match self.embedding_match(embedder.as_ref(), profile, id_document) {
            Err(FaceMatchError::Engine(EngineError::Unavailable(reason))) => {
                warn!(
                    embedder = embedder.name(),
                    %reason,
                    "face embedder unavailable, using histogram comparison"
                );
                Ok(self.histogram_match(profile, id_document))
            }
            other => other,
        }
    }

    fn embedding_match(
        &self,
        embedder: &dyn FaceEmbedder,
        profile: &Photo,
        id_document: &Photo,
    ) -> Result<FaceMatchResult, FaceMatchError> {
        let profile_faces = embedder.embed(profile)?;
        if profile_faces.is_empty() {
            return Err(FaceMatchError::NoFaceDetected {
                which: PhotoCategory::Profile,
            });
        }
        let id_faces = embedder.embed(id_document)?;
        let Some(reference) = id_faces.first() else {
            return Err(FaceMatchError::NoFaceDetected {
                which: PhotoCategory::IdDocument,
            });
        };

        let min_distance = profile_faces
            .iter()
            .map(|face| euclidean(face, reference))
            .fold(f64::INFINITY, f64::min);
        let is_match = min_distance <= self.config.tolerance;
        let confidence = (1.0 - min_distance).clamp(0.0, 1.0);
        debug!(min_distance, is_match, "embedding comparison");

        Ok(FaceMatchResult {
            is_match,
            confidence,
            method: MatchMethod::Embedding,
            distance: Some(min_distance),
            faces_found: Some((profile_faces.len(), id_faces.len())),
            warnings: Vec::new(),
        })
    }

    fn histogram_match(&self, profile: &Photo, id_document: &Photo) -> FaceMatchResult {
        let a = histogram(&profile.image().to_rgb8());
        let b = histogram(&id_document.image().to_rgb8());
        // Each channel is a distribution, so its L1 distance is at most 2.
        let distance: f64 = a.iter().zip(&b).map(|(x, y)| (x - y).abs()).sum::<f64>() / 6.0;
        let confidence = (1.0 - distance).clamp(0.0, 1.0);
        FaceMatchResult {
            is_match: confidence > self.config.histogram_threshold,
            confidence,
            method: MatchMethod::Histogram,
            distance: None,
            faces_found: None,
            warnings: vec![DEGRADED_METHOD.to_string()],
        }
    }
}

fn euclidean(a: &Embedding, b: &Embedding) -> f64 {
    if a.len() != b.len() {
        return f64::INFINITY;
    }
    a.iter().zip(b).map(|(x, y)| (x - y).powi(2)).sum::<f64>().sqrt()
}

/// Per-channel normalised 256-bin histograms, R then G then B.
fn histogram(img: &RgbImage) -> Vec<f64> {
    let mut bins = vec![0.0; HISTOGRAM_BINS];
    for pixel in img.pixels() {
        for (channel, &value) in pixel.0.iter().enumerate() {
            bins[channel * 256 + usize::from(value)] += 1.0;
        }
    }
    let total = f64::from(img.width()) * f64::from(img.height());
    if total > 0.0 {
        bins.iter_mut().for_each(|b| *b /= total);
    }
    bins
}
