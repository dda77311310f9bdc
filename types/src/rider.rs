//! What the rider directory tells the pipeline about a rider.

use crate::ids::{AgentId, RiderId};
use crate::status::PhotoCategory;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// A rider as seen by the pipeline. Owned by the directory collaborator;
/// the pipeline only reads it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiderProfile {
    pub id: RiderId,
    pub display_name: String,
    /// Field agent currently responsible for this rider.
    pub assigned_agent: Option<AgentId>,
    pub profile_photo: Option<PathBuf>,
    pub id_document_photo: Option<PathBuf>,
}

impl RiderProfile {
    pub fn new(id: RiderId, display_name: impl Into<String>) -> Self {
        Self {
            id,
            display_name: display_name.into(),
            assigned_agent: None,
            profile_photo: None,
            id_document_photo: None,
        }
    }

    pub fn photo(&self, category: PhotoCategory) -> Option<&Path> {
        match category {
            PhotoCategory::Profile => self.profile_photo.as_deref(),
            PhotoCategory::IdDocument => self.id_document_photo.as_deref(),
        }
    }

    pub fn has_both_photos(&self) -> bool {
        self.profile_photo.is_some() && self.id_document_photo.is_some()
    }
}
