//! OCR engines.

use std::io::Cursor;
use std::path::PathBuf;
use std::time::Duration;

use boda_utils::{run_with_input, ProcessError, DEFAULT_ENGINE_TIMEOUT};
use image::{DynamicImage, GrayImage, ImageFormat};
use tracing::debug;

use crate::OcrError;

pub trait OcrEngine: Send + Sync {
    /// Implementation name reported in results.
    fn name(&self) -> &'static str;

    fn recognize(&self, image: &GrayImage) -> Result<String, OcrError>;
}

/// Runs the `tesseract` command line tool, image on stdin, text on stdout.
#[derive(Clone, Debug)]
pub struct TesseractEngine {
    program: PathBuf,
    page_segmentation: u8,
    whitelist: String,
    language: Option<String>,
    timeout: Duration,
}

impl TesseractEngine {
    pub fn new(
        program: impl Into<PathBuf>,
        page_segmentation: u8,
        whitelist: impl Into<String>,
    ) -> Self {
        Self {
            program: program.into(),
            page_segmentation,
            whitelist: whitelist.into(),
            language: None,
            timeout: DEFAULT_ENGINE_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    fn args(&self) -> Vec<String> {
        let mut args = vec![
            "stdin".to_string(),
            "stdout".to_string(),
            "--psm".to_string(),
            self.page_segmentation.to_string(),
        ];
        if let Some(lang) = &self.language {
            args.push("-l".to_string());
            args.push(lang.clone());
        }
        if !self.whitelist.is_empty() {
            args.push("-c".to_string());
            args.push(format!("tessedit_char_whitelist={}", self.whitelist));
        }
        args
    }
}

impl OcrEngine for TesseractEngine {
    fn name(&self) -> &'static str {
        "tesseract"
    }

    fn recognize(&self, image: &GrayImage) -> Result<String, OcrError> {
        let mut png = Cursor::new(Vec::new());
        DynamicImage::ImageLuma8(image.clone())
            .write_to(&mut png, ImageFormat::Png)
            .map_err(|e| OcrError::Image(e.to_string()))?;

        let output = run_with_input(&self.program, &self.args(), png.get_ref(), self.timeout)
            .map_err(|e| match e {
                ProcessError::Spawn { .. } => OcrError::Unavailable(e.to_string()),
                other => OcrError::Failed(other.to_string()),
            })?;
        if !output.status.success() {
            return Err(OcrError::Failed(format!(
                "{} exited with {}: {}",
                self.program.display(),
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        let text = String::from_utf8_lossy(&output.stdout).into_owned();
        debug!(chars = text.len(), "OCR complete");
        Ok(text)
    }
}

/// Engine for deployments without OCR. Every call reports unavailability.
#[derive(Clone, Copy, Debug, Default)]
pub struct UnavailableOcr;

impl OcrEngine for UnavailableOcr {
    fn name(&self) -> &'static str {
        "none"
    }

    fn recognize(&self, _image: &GrayImage) -> Result<String, OcrError> {
        Err(OcrError::Unavailable("no OCR engine configured".into()))
    }
}
