//! Rider directory backed by a JSON export from the rider registry.
//!
//! The file is a JSON array of rider profiles. Relative photo paths are
//! resolved against the file's own directory.

use std::collections::BTreeMap;
use std::path::Path;

use boda_store::{RiderDirectory, StoreError};
use boda_types::{RiderId, RiderProfile};
use tracing::{info, warn};

pub struct JsonDirectory {
    riders: BTreeMap<RiderId, RiderProfile>,
}

impl JsonDirectory {
    /// Read the export at `path`. A missing file is an empty directory.
    pub fn load(path: &Path) -> Result<Self, StoreError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(path = %path.display(), "rider directory not found, starting empty");
                return Ok(Self::from_profiles(Vec::new()));
            }
            Err(e) => {
                return Err(StoreError::Backend(format!("read {}: {e}", path.display())));
            }
        };
        let mut profiles: Vec<RiderProfile> = serde_json::from_str(&content).map_err(|e| {
            StoreError::Serialization(format!("rider directory {}: {e}", path.display()))
        })?;

        if let Some(base) = path.parent() {
            for profile in &mut profiles {
                for photo in [&mut profile.profile_photo, &mut profile.id_document_photo]
                    .into_iter()
                    .flatten()
                {
                    if photo.is_relative() {
                        *photo = base.join(&*photo);
                    }
                }
            }
        }
        info!(path = %path.display(), riders = profiles.len(), "rider directory loaded");
        Ok(Self::from_profiles(profiles))
    }

    pub fn from_profiles(profiles: Vec<RiderProfile>) -> Self {
        Self {
            riders: profiles.into_iter().map(|p| (p.id.clone(), p)).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.riders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.riders.is_empty()
    }
}

impl RiderDirectory for JsonDirectory {
    fn rider(&self, id: &RiderId) -> Result<RiderProfile, StoreError> {
        self.riders
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("rider {id}")))
    }

    fn riders(&self) -> Result<Vec<RiderProfile>, StoreError> {
        Ok(self.riders.values().cloned().collect())
    }
}
