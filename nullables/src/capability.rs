//! Nullable capabilities: face embedding and OCR engines with scripted output.

use boda_document::{OcrEngine, OcrError};
use boda_photo::{Embedding, EngineError, FaceEmbedder, Photo};
use image::GrayImage;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::thread;
use std::time::Duration;

enum Script<T> {
    Output(T),
    Unavailable,
    Failing,
}

/// A face embedder that answers from a script instead of a model.
///
/// Photos are told apart by pixel width, so tests build profile and ID
/// photos at different sizes and give each its own faces.
pub struct NullFaceEmbedder {
    by_width: Mutex<HashMap<u32, Vec<Embedding>>>,
    default: Script<Vec<Embedding>>,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl NullFaceEmbedder {
    /// Every photo holds one face at the origin.
    pub fn new() -> Self {
        Self::with_default(Script::Output(vec![vec![0.0; 4]]))
    }

    /// Behaves like a deployment with no embedding engine installed.
    pub fn unavailable() -> Self {
        Self::with_default(Script::Unavailable)
    }

    /// Behaves like an installed engine that crashes on every call.
    pub fn failing() -> Self {
        Self::with_default(Script::Failing)
    }

    fn with_default(default: Script<Vec<Embedding>>) -> Self {
        Self {
            by_width: Mutex::new(HashMap::new()),
            default,
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Faces returned for photos `width` pixels wide.
    pub fn faces_for(self, width: u32, faces: Vec<Embedding>) -> Self {
        self.by_width.lock().unwrap().insert(width, faces);
        self
    }

    /// Sleep before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for NullFaceEmbedder {
    fn default() -> Self {
        Self::new()
    }
}

impl FaceEmbedder for NullFaceEmbedder {
    fn name(&self) -> &'static str {
        "null"
    }

    fn embed(&self, photo: &Photo) -> Result<Vec<Embedding>, EngineError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            thread::sleep(delay);
        }
        if let Some(faces) = self.by_width.lock().unwrap().get(&photo.width()) {
            return Ok(faces.clone());
        }
        match &self.default {
            Script::Output(faces) => Ok(faces.clone()),
            Script::Unavailable => Err(EngineError::Unavailable("null embedder".into())),
            Script::Failing => Err(EngineError::Failed("null embedder crashed".into())),
        }
    }
}

/// An OCR engine that returns fixed text.
pub struct NullOcrEngine {
    script: Script<String>,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl NullOcrEngine {
    pub fn with_text(text: impl Into<String>) -> Self {
        Self::scripted(Script::Output(text.into()))
    }

    pub fn unavailable() -> Self {
        Self::scripted(Script::Unavailable)
    }

    pub fn failing() -> Self {
        Self::scripted(Script::Failing)
    }

    fn scripted(script: Script<String>) -> Self {
        Self {
            script,
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl OcrEngine for NullOcrEngine {
    fn name(&self) -> &'static str {
        "null"
    }

    fn recognize(&self, _image: &GrayImage) -> Result<String, OcrError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            thread::sleep(delay);
        }
        match &self.script {
            Script::Output(text) => Ok(text.clone()),
            Script::Unavailable => Err(OcrError::Unavailable("null OCR".into())),
            Script::Failing => Err(OcrError::Failed("null OCR crashed".into())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageFormat, RgbImage};
    use std::io::Cursor;

    fn photo(width: u32) -> Photo {
        let mut png = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(RgbImage::new(width, 8))
            .write_to(&mut png, ImageFormat::Png)
            .unwrap();
        Photo::from_bytes(png.into_inner()).unwrap()
    }

    #[test]
    fn faces_are_chosen_by_width() {
        let embedder = NullFaceEmbedder::new().faces_for(32, vec![vec![1.0; 4], vec![2.0; 4]]);
        assert_eq!(embedder.embed(&photo(32)).unwrap().len(), 2);
        assert_eq!(embedder.embed(&photo(16)).unwrap(), vec![vec![0.0; 4]]);
        assert_eq!(embedder.calls(), 2);
    }

    #[test]
    fn unavailable_and_failing_differ() {
        assert!(matches!(
            NullFaceEmbedder::unavailable().embed(&photo(8)),
            Err(EngineError::Unavailable(_))
        ));
        assert!(matches!(
            NullFaceEmbedder::failing().embed(&photo(8)),
            Err(EngineError::Failed(_))
        ));
    }

    #[test]
    fn ocr_returns_its_script() {
        let ocr = NullOcrEngine::with_text("CF12345678901");
        let image = GrayImage::new(2, 2);
        assert_eq!(ocr.recognize(&image).unwrap(), "CF12345678901");
        assert!(matches!(
            NullOcrEngine::unavailable().recognize(&image),
            Err(OcrError::Unavailable(_))
        ));
        assert_eq!(ocr.calls(), 1);
    }
}
