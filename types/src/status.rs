//! Status enums for identity records and photo verification.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Verification status shared by identity records and photo verification.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VerificationStatus {
    /// Nothing decided yet.
    #[default]
    Pending,
    Verified,
    Rejected,
    /// Needs a human reviewer.
    Flagged,
}

impl VerificationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Verified => "VERIFIED",
            Self::Rejected => "REJECTED",
            Self::Flagged => "FLAGGED",
        }
    }

    /// Whether the rider belongs in a reviewer's queue.
    pub fn awaits_review(&self) -> bool {
        matches!(self, Self::Pending | Self::Flagged)
    }
}

impl fmt::Display for VerificationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which submitted photograph a result belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PhotoCategory {
    Profile,
    IdDocument,
}

impl PhotoCategory {
    pub const ALL: [PhotoCategory; 2] = [PhotoCategory::Profile, PhotoCategory::IdDocument];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Profile => "PROFILE",
            Self::IdDocument => "ID_DOCUMENT",
        }
    }
}

impl fmt::Display for PhotoCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A reviewer's manual decision.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewDecision {
    Approve,
    Reject,
    Flag,
}

impl ReviewDecision {
    pub fn status(&self) -> VerificationStatus {
        match self {
            Self::Approve => VerificationStatus::Verified,
            Self::Reject => VerificationStatus::Rejected,
            Self::Flag => VerificationStatus::Flagged,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Approve => "approve",
            Self::Reject => "reject",
            Self::Flag => "flag",
        }
    }
}

impl std::str::FromStr for ReviewDecision {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "approve" => Ok(Self::Approve),
            "reject" => Ok(Self::Reject),
            "flag" => Ok(Self::Flag),
            other => Err(format!(
                "invalid decision {other:?}: must be approve, reject, or flag"
            )),
        }
    }
}

/// Who produced the status currently on record.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecisionSource {
    /// The orchestrator's scoring.
    #[default]
    Automatic,
    /// A human reviewer. Automatic runs leave this alone unless re-triggered.
    Reviewer,
}
