//! Face capabilities: embedding extraction and presence detection.
//!
//! Both are traits so a deployment picks its implementation at startup. The
//! embedder shipped here drives an external program; [`SkinToneDetector`] is
//! the pure-Rust heuristic used when no detector is available.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use boda_utils::{run_with_input, ProcessError, DEFAULT_ENGINE_TIMEOUT};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{EngineError, Photo};

/// One face encoding vector.
pub type Embedding = Vec<f64>;

/// Extracts one embedding per face found in a photo.
pub trait FaceEmbedder: Send + Sync {
    /// Implementation name reported in results.
    fn name(&self) -> &'static str;

    /// Every face found, possibly none. `EngineError::Unavailable` means the
    /// engine cannot run at all in this deployment.
    fn embed(&self, photo: &Photo) -> Result<Vec<Embedding>, EngineError>;
}

impl<T: FaceEmbedder + ?Sized> FaceEmbedder for Arc<T> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn embed(&self, photo: &Photo) -> Result<Vec<Embedding>, EngineError> {
        (**self).embed(photo)
    }
}

/// Answer of a face presence detector.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FaceDetection {
    pub face_found: bool,
    pub face_count: Option<usize>,
    /// Detector-specific strength of the signal, when it has one.
    pub confidence: Option<f64>,
    pub method: &'static str,
}

pub trait FaceDetector: Send + Sync {
    fn detect(&self, photo: &Photo) -> Result<FaceDetection, EngineError>;
}

/// Runs an external face embedding program.
///
/// The program receives the encoded image on stdin and must print
/// `{"faces": [[f64, ...], ...]}` on stdout. A program that cannot be spawned
/// is reported as unavailable.
#[derive(Clone, Debug)]
pub struct CommandFaceEmbedder {
    program: PathBuf,
    args: Vec<String>,
    timeout: Duration,
}

#[derive(Deserialize)]
struct EmbedderOutput {
    faces: Vec<Embedding>,
}

impl CommandFaceEmbedder {
    pub fn new(program: impl Into<PathBuf>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            timeout: DEFAULT_ENGINE_TIMEOUT,
        }
    }

    /// Kill the program if it has not answered within `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl FaceEmbedder for CommandFaceEmbedder {
    fn name(&self) -> &'static str {
        "command"
    }

    fn embed(&self, photo: &Photo) -> Result<Vec<Embedding>, EngineError> {
        let output = run_with_input(&self.program, &self.args, photo.bytes(), self.timeout)
            .map_err(|e| match e {
                ProcessError::Spawn { .. } => EngineError::Unavailable(e.to_string()),
                other => EngineError::Failed(other.to_string()),
            })?;
        if !output.status.success() {
            return Err(EngineError::Failed(format!(
                "{} exited with {}: {}",
                self.program.display(),
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        let parsed: EmbedderOutput = serde_json::from_slice(&output.stdout)
            .map_err(|e| EngineError::Failed(format!("unreadable embedder output: {e}")))?;
        debug!(faces = parsed.faces.len(), "face embeddings extracted");
        Ok(parsed.faces)
    }
}

/// Face presence from an embedder: a face is present if at least one
/// embedding comes back.
pub struct EmbeddingFaceDetector<E> {
    embedder: E,
}

impl<E: FaceEmbedder> EmbeddingFaceDetector<E> {
    pub fn new(embedder: E) -> Self {
        Self { embedder }
    }
}

impl<E: FaceEmbedder> FaceDetector for EmbeddingFaceDetector<E> {
    fn detect(&self, photo: &Photo) -> Result<FaceDetection, EngineError> {
        let faces = self.embedder.embed(photo)?;
        Ok(FaceDetection {
            face_found: !faces.is_empty(),
            face_count: Some(faces.len()),
            confidence: None,
            method: "embedding",
        })
    }
}

/// Counts skin-toned pixels in a central square of side `min(w, h) / 4`.
#[derive(Clone, Copy, Debug)]
pub struct SkinToneDetector {
    /// Minimum fraction of skin-toned pixels for a face to be reported.
    pub min_ratio: f64,
}

impl Default for SkinToneDetector {
    fn default() -> Self {
        Self { min_ratio: 0.1 }
    }
}

impl SkinToneDetector {
    fn is_skin([r, g, b]: [u8; 3]) -> bool {
        (95..=255).contains(&r)
            && (40..=195).contains(&g)
            && (20..=155).contains(&b)
            && r > g
            && r > b
    }
}

impl FaceDetector for SkinToneDetector {
    fn detect(&self, photo: &Photo) -> Result<FaceDetection, EngineError> {
        let (w, h) = (photo.width(), photo.height());
        let side = w.min(h) / 4;
        if side == 0 {
            return Err(EngineError::Failed("image too small for skin sampling".into()));
        }
        let rgb = photo.image().to_rgb8();
        let (x0, y0) = (w / 2 - side / 2, h / 2 - side / 2);
        let total = u64::from(side) * u64::from(side);
        let skin = (y0..y0 + side)
            .flat_map(|y| (x0..x0 + side).map(move |x| (x, y)))
            .filter(|&(x, y)| Self::is_skin(rgb.get_pixel(x, y).0))
            .count();
        let ratio = skin as f64 / total as f64;
        Ok(FaceDetection {
            face_found: ratio > self.min_ratio,
            face_count: None,
            confidence: Some(ratio),
            method: "fallback_skin_detection",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{encode_png, flat};
    use image::{Rgb, RgbImage};

    fn photo(img: &RgbImage) -> Photo {
        Photo::from_bytes(encode_png(img)).unwrap()
    }

    #[test]
    fn skin_toned_centre_is_a_face() {
        let detection = SkinToneDetector::default()
            .detect(&photo(&flat(200, 200, [200, 140, 110])))
            .unwrap();
        assert!(detection.face_found);
        assert_eq!(detection.confidence, Some(1.0));
        assert_eq!(detection.method, "fallback_skin_detection");
    }

    #[test]
    fn only_the_centre_is_sampled() {
        // Skin-toned border, blue centre.
        let img = RgbImage::from_fn(200, 200, |x, y| {
            if (75..125).contains(&x) && (75..125).contains(&y) {
                Rgb([20, 40, 200])
            } else {
                Rgb([200, 140, 110])
            }
        });
        let detection = SkinToneDetector::default().detect(&photo(&img)).unwrap();
        assert!(!detection.face_found);
        assert_eq!(detection.confidence, Some(0.0));
    }

    #[test]
    fn tiny_image_cannot_be_sampled() {
        assert!(SkinToneDetector::default()
            .detect(&photo(&flat(3, 3, [200, 140, 110])))
            .is_err());
    }

    #[test]
    fn missing_program_is_unavailable() {
        let embedder = CommandFaceEmbedder::new("/nonexistent/boda-face-embedder", vec![]);
        let err = embedder.embed(&photo(&flat(8, 8, [0, 0, 0]))).unwrap_err();
        assert!(matches!(err, EngineError::Unavailable(_)));
    }

    #[cfg(unix)]
    fn script(body: &str) -> CommandFaceEmbedder {
        CommandFaceEmbedder::new("/bin/sh", vec!["-c".to_string(), body.to_string()])
    }

    #[cfg(unix)]
    #[test]
    fn reads_embeddings_from_program_output() {
        let embedder = script(r#"cat >/dev/null; echo '{"faces": [[0.25, 0.5], [1.0, 0.0]]}'"#);
        let faces = embedder.embed(&photo(&flat(8, 8, [0, 0, 0]))).unwrap();
        assert_eq!(faces, vec![vec![0.25, 0.5], vec![1.0, 0.0]]);
    }

    #[cfg(unix)]
    #[test]
    fn hung_embedder_fails_at_its_timeout() {
        let embedder = script("sleep 30").with_timeout(Duration::from_millis(100));
        let started = std::time::Instant::now();
        let err = embedder.embed(&photo(&flat(8, 8, [0, 0, 0]))).unwrap_err();
        match err {
            EngineError::Failed(reason) => assert!(reason.contains("did not finish")),
            other => panic!("expected a failure, got {other:?}"),
        }
        assert!(started.elapsed() < Duration::from_secs(10));
    }
}
