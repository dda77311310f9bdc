//! Audit trail entries for identity data access.

use crate::ids::RiderId;
use crate::time::Timestamp;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;

/// What was attempted against a rider's identity data.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    View,
    Set,
    Verify,
    Update,
    Export,
    UnauthorizedAccess,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::View => "VIEW",
            Self::Set => "SET",
            Self::Verify => "VERIFY",
            Self::Update => "UPDATE",
            Self::Export => "EXPORT",
            Self::UnauthorizedAccess => "UNAUTHORIZED_ACCESS",
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request metadata copied into every audit entry.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientInfo {
    pub client_ip: Option<IpAddr>,
    pub client_agent: Option<String>,
}

/// One immutable line of the audit trail.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    /// Insertion sequence assigned by the audit store. Breaks ties between
    /// entries written in the same second.
    pub seq: u64,
    pub subject_rider: RiderId,
    /// `None` when the system itself acted.
    pub actor: Option<String>,
    pub action: AuditAction,
    pub success: bool,
    pub reason: String,
    pub client_ip: Option<IpAddr>,
    pub client_agent: Option<String>,
    pub timestamp: Timestamp,
}
