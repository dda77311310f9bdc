//! A decoded photo together with its original encoded bytes.

use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageFormat};

use crate::PhotoError;

/// Original bytes are kept because the metadata and re-compression checks
/// work on the encoded file, not on pixels.
#[derive(Clone, Debug)]
pub struct Photo {
    source: Option<PathBuf>,
    bytes: Vec<u8>,
    image: DynamicImage,
    format: Option<ImageFormat>,
}

impl Photo {
    pub fn open(path: &Path) -> Result<Self, PhotoError> {
        let bytes = std::fs::read(path).map_err(|source| PhotoError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut photo = Self::from_bytes(bytes)?;
        photo.source = Some(path.to_path_buf());
        Ok(photo)
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, PhotoError> {
        let format = image::guess_format(&bytes).ok();
        let image =
            image::load_from_memory(&bytes).map_err(|e| PhotoError::Decode(e.to_string()))?;
        Ok(Self {
            source: None,
            bytes,
            image,
            format,
        })
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn image(&self) -> &DynamicImage {
        &self.image
    }

    pub fn format(&self) -> Option<ImageFormat> {
        self.format
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Short format label for result details, e.g. `JPEG`.
    pub fn format_name(&self) -> &'static str {
        match self.format {
            Some(ImageFormat::Jpeg) => "JPEG",
            Some(ImageFormat::Png) => "PNG",
            Some(_) => "OTHER",
            None => "UNKNOWN",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{encode_png, flat};

    #[test]
    fn decodes_png_and_keeps_bytes() {
        let bytes = encode_png(&flat(40, 30, [10, 20, 30]));
        let photo = Photo::from_bytes(bytes.clone()).unwrap();
        assert_eq!((photo.width(), photo.height()), (40, 30));
        assert_eq!(photo.format_name(), "PNG");
        assert_eq!(photo.bytes(), bytes.as_slice());
        assert!(photo.source().is_none());
    }

    #[test]
    fn rejects_garbage() {
        assert!(matches!(
            Photo::from_bytes(b"not an image".to_vec()),
            Err(PhotoError::Decode(_))
        ));
    }

    #[test]
    fn open_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.jpg");
        let err = Photo::open(&missing).unwrap_err();
        assert!(err.to_string().contains("missing.jpg"));

        let present = dir.path().join("profile.png");
        std::fs::write(&present, encode_png(&flat(8, 8, [1, 2, 3]))).unwrap();
        let photo = Photo::open(&present).unwrap();
        assert_eq!(photo.source(), Some(present.as_path()));
    }
}
