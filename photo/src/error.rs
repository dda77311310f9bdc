use boda_types::PhotoCategory;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PhotoError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot decode image: {0}")]
    Decode(String),

    #[error("cannot encode image: {0}")]
    Encode(String),
}

/// Failure of an external analysis engine (face embedding, face detection).
#[derive(Debug, Error)]
pub enum EngineError {
    /// The engine is not installed or not configured in this deployment.
    #[error("engine unavailable: {0}")]
    Unavailable(String),

    /// The engine ran but did not produce a usable answer.
    #[error("engine failed: {0}")]
    Failed(String),
}

#[derive(Debug, Error)]
pub enum FaceMatchError {
    #[error("no face detected in {} photo", label(.which))]
    NoFaceDetected { which: PhotoCategory },

    #[error("face embedding failed: {0}")]
    Engine(#[from] EngineError),
}

fn label(which: &PhotoCategory) -> &'static str {
    match which {
        PhotoCategory::Profile => "profile",
        PhotoCategory::IdDocument => "ID document",
    }
}
