//! Camera capture metadata (EXIF).

use std::io::Cursor;

use exif::{In, Reader, Tag};
use serde::Serialize;
use tracing::debug;

/// What the embedded EXIF block says about how the photo was taken.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct CaptureMetadata {
    /// At least one camera capture tag (make, model or capture time) is present.
    pub has_camera_data: bool,
    pub camera_make: Option<String>,
    pub camera_model: Option<String>,
    pub datetime: Option<String>,
    pub gps_info: bool,
    pub software: Option<String>,
    pub flash: bool,
}

impl CaptureMetadata {
    /// Read EXIF from an encoded JPEG or PNG. Files without an EXIF block
    /// produce the empty default.
    pub fn read(bytes: &[u8]) -> Self {
        let exif = match Reader::new().read_from_container(&mut Cursor::new(bytes)) {
            Ok(exif) => exif,
            Err(e) => {
                debug!(error = %e, "no readable EXIF block");
                return Self::default();
            }
        };

        let text = |tag: Tag| {
            exif.get_field(tag, In::PRIMARY).map(|field| {
                field
                    .display_value()
                    .to_string()
                    .trim_matches('"')
                    .trim()
                    .to_string()
            })
        };

        let camera_make = text(Tag::Make);
        let camera_model = text(Tag::Model);
        let datetime = text(Tag::DateTimeOriginal).or_else(|| text(Tag::DateTime));
        let has_camera_data =
            camera_make.is_some() || camera_model.is_some() || datetime.is_some();

        let metadata = Self {
            has_camera_data,
            camera_make,
            camera_model,
            datetime,
            gps_info: exif
                .fields()
                .any(|f| f.ifd_num == In::PRIMARY && f.tag == Tag::GPSLatitude),
            software: text(Tag::Software),
            flash: exif.get_field(Tag::Flash, In::PRIMARY).is_some(),
        };
        metadata
    }
}
