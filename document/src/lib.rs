//! Document text extraction for photographed national ID cards.
//!
//! The pipeline is: preprocess (grayscale, median denoise, unsharp mask) →
//! OCR through an [`OcrEngine`] → ordered pattern rules per field
//! ([`IdDocumentParser`]). Extraction never fails outright; an unreadable
//! image or a missing engine yields `success = false` with the reason.

pub mod engine;
pub mod error;
pub mod extractor;
pub mod parse;
pub mod preprocess;

pub use engine::{OcrEngine, TesseractEngine, UnavailableOcr};
pub use error::OcrError;
pub use extractor::{ExtractionResult, TextExtractor};
pub use parse::{IdDocumentParser, OcrConfig, ParsedFields, Sex};
pub use preprocess::preprocess;
