//! Heuristic manipulation signals: unusual aspect ratio and re-compression.

use image::codecs::jpeg::JpegEncoder;
use image::ImageFormat;
use serde::Serialize;

use crate::{Photo, PhotoError};

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ManipulationReport {
    pub suspicious: bool,
    pub reasons: Vec<String>,
    pub aspect_ratio: f64,
    /// `None` when the check does not apply (non-JPEG input).
    pub recompressed: Option<bool>,
}

impl ManipulationReport {
    pub fn inspect(photo: &Photo, min_aspect: f64, max_aspect: f64) -> Result<Self, PhotoError> {
        let aspect_ratio = f64::from(photo.width()) / f64::from(photo.height().max(1));
        let mut reasons = Vec::new();

        if aspect_ratio < min_aspect || aspect_ratio > max_aspect {
            reasons.push("Unusual aspect ratio detected".to_string());
        }

        let recompressed = if photo.format() == Some(ImageFormat::Jpeg) {
            let flagged = looks_recompressed(photo)?;
            if flagged {
                reasons.push("Possible re-compression detected".to_string());
            }
            Some(flagged)
        } else {
            None
        };

        Ok(Self {
            suspicious: !reasons.is_empty(),
            reasons,
            aspect_ratio,
            recompressed,
        })
    }
}

/// Re-encode at high and low quality; a file whose size sits nearer the low
/// quality encoding has most likely been through a lossy save before.
fn looks_recompressed(photo: &Photo) -> Result<bool, PhotoError> {
    let rgb = photo.image().to_rgb8();
    let size_at = |quality: u8| -> Result<usize, PhotoError> {
        let mut out = Vec::new();
        JpegEncoder::new_with_quality(&mut out, quality)
            .encode_image(&rgb)
            .map_err(|e| PhotoError::Encode(e.to_string()))?;
        Ok(out.len())
    };
    let original = photo.bytes().len();
    let high = size_at(95)?;
    let low = size_at(50)?;
    Ok(original.abs_diff(high) > original.abs_diff(low))
}
