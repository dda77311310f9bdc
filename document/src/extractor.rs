use std::sync::Arc;
use std::time::Duration;

use image::DynamicImage;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::engine::{OcrEngine, TesseractEngine, UnavailableOcr};
use crate::parse::{IdDocumentParser, OcrConfig, ParsedFields};
use crate::preprocess::preprocess;
use crate::OcrError;

/// Outcome of one extraction. `success` is false only when no text could be
/// produced at all; a successful run may still have found no fields.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub success: bool,
    pub raw_text: String,
    pub parsed: ParsedFields,
    pub confidence: f64,
    pub engine: String,
    pub error: Option<String>,
}

impl ExtractionResult {
    /// No text at all, for the reason given.
    pub fn failure(engine: &str, reason: impl Into<String>) -> Self {
        Self {
            success: false,
            raw_text: String::new(),
            parsed: ParsedFields::default(),
            confidence: 0.0,
            engine: engine.to_string(),
            error: Some(reason.into()),
        }
    }
}

#[derive(Clone)]
pub struct TextExtractor {
    engine: Arc<dyn OcrEngine>,
    parser: Arc<IdDocumentParser>,
}

impl TextExtractor {
    pub fn new(engine: Arc<dyn OcrEngine>, parser: IdDocumentParser) -> Self {
        Self {
            engine,
            parser: Arc::new(parser),
        }
    }

    /// Tesseract at the configured path, or no engine when the path is empty.
    pub fn from_config(config: &OcrConfig) -> Result<Self, OcrError> {
        let engine: Arc<dyn OcrEngine> = if config.tesseract.as_os_str().is_empty() {
            Arc::new(UnavailableOcr)
        } else {
            let mut tesseract = TesseractEngine::new(
                &config.tesseract,
                config.page_segmentation,
                config.whitelist.clone(),
            )
            .with_timeout(Duration::from_millis(config.timeout_ms));
            if let Some(language) = &config.language {
                tesseract = tesseract.with_language(language.clone());
            }
            Arc::new(tesseract)
        };
        Ok(Self::new(engine, IdDocumentParser::new(config)?))
    }

    pub fn engine_name(&self) -> &'static str {
        self.engine.name()
    }

    pub fn extract(&self, image: &DynamicImage) -> ExtractionResult {
        let engine = self.engine.name();
        let prepared = preprocess(image);
        let raw_text = match self.engine.recognize(&prepared) {
            Ok(text) => text,
            Err(e) => {
                warn!(engine, error = %e, "text extraction failed");
                return ExtractionResult::failure(engine, e.to_string());
            }
        };
        let parsed = self.parser.parse(&raw_text);
        let confidence = parsed.confidence(&raw_text);
        debug!(
            engine,
            confidence,
            id_found = parsed.id_number.is_some(),
            "text extracted"
        );
        ExtractionResult {
            success: true,
            raw_text,
            parsed,
            confidence,
            engine: engine.to_string(),
            error: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};

    struct Fixed(&'static str);

    impl OcrEngine for Fixed {
        fn name(&self) -> &'static str {
            "fixed"
        }

        fn recognize(&self, image: &GrayImage) -> Result<String, OcrError> {
            assert_eq!(image.dimensions(), (20, 10));
            Ok(self.0.to_string())
        }
    }

    fn blank() -> DynamicImage {
        DynamicImage::ImageLuma8(GrayImage::from_pixel(20, 10, Luma([200])))
    }

    fn extractor(engine: Arc<dyn OcrEngine>) -> TextExtractor {
        TextExtractor::new(engine, IdDocumentParser::new(&OcrConfig::default()).unwrap())
    }

    #[test]
    fn parses_recognised_text() {
        let result = extractor(Arc::new(Fixed("NIN CF12345678901\nMALE"))).extract(&blank());
        assert!(result.success);
        assert_eq!(result.engine, "fixed");
        assert_eq!(result.parsed.id_number.as_deref(), Some("CF12345678901"));
        assert_eq!(result.parsed.name.as_deref(), Some("NIN CF"));
        assert!((result.confidence - 0.8).abs() < 1e-9);
        assert_eq!(result.error, None);
    }

    #[test]
    fn missing_engine_is_reported_not_raised() {
        let result = extractor(Arc::new(UnavailableOcr)).extract(&blank());
        assert!(!result.success);
        assert_eq!(result.confidence, 0.0);
        assert!(result.error.unwrap().contains("unavailable"));
    }

    #[test]
    fn empty_text_is_a_successful_empty_read() {
        let result = extractor(Arc::new(Fixed("  \n"))).extract(&blank());
        assert!(result.success);
        assert_eq!(result.parsed, ParsedFields::default());
        assert_eq!(result.confidence, 0.0);
    }

    #[test]
    fn empty_program_path_means_no_engine() {
        let config = OcrConfig {
            tesseract: "".into(),
            ..OcrConfig::default()
        };
        let extractor = TextExtractor::from_config(&config).unwrap();
        assert_eq!(extractor.engine_name(), "none");
    }

    #[test]
    fn result_serialises() {
        let result = extractor(Arc::new(Fixed("SEX FEMALE"))).extract(&blank());
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["parsed"]["sex"], "FEMALE");
    }
}
