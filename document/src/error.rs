use thiserror::Error;

#[derive(Debug, Error)]
pub enum OcrError {
    /// No OCR engine can run in this deployment.
    #[error("OCR engine unavailable: {0}")]
    Unavailable(String),

    #[error("OCR engine failed: {0}")]
    Failed(String),

    #[error("unreadable image: {0}")]
    Image(String),

    #[error("invalid field pattern: {0}")]
    Pattern(#[from] regex::Error),
}
