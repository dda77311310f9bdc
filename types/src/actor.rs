//! The caller on whose behalf an operation runs.

use crate::ids::{AgentId, RiderId, UserId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Who is calling into the pipeline.
///
/// The directory resolves a login to one of these; the pipeline never
/// authenticates anyone itself.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Actor {
    /// Automated caller with no human behind it (scheduled runs, batch jobs).
    System,
    /// A system administrator.
    Administrator(UserId),
    /// A field agent. Whether they are assigned to a given rider is decided
    /// against the rider's directory profile.
    FieldAgent(AgentId),
    /// A rider acting as themselves.
    Rider(RiderId),
}

impl Actor {
    /// Human-readable reference for audit entries; `None` for the system actor.
    pub fn audit_ref(&self) -> Option<String> {
        match self {
            Actor::System => None,
            other => Some(other.to_string()),
        }
    }

    pub fn is_human(&self) -> bool {
        !matches!(self, Actor::System)
    }
}

impl fmt::Display for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Actor::System => f.write_str("system"),
            Actor::Administrator(u) => write!(f, "admin:{u}"),
            Actor::FieldAgent(a) => write!(f, "agent:{a}"),
            Actor::Rider(r) => write!(f, "rider:{r}"),
        }
    }
}

impl FromStr for Actor {
    type Err = String;

    /// Inverse of `Display`: `system`, `admin:<user>`, `agent:<id>` or `rider:<id>`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("system") {
            return Ok(Actor::System);
        }
        let (kind, id) = s
            .split_once(':')
            .filter(|(_, id)| !id.trim().is_empty())
            .ok_or_else(|| format!("unrecognised actor {s:?}"))?;
        let id = id.trim();
        match kind.to_ascii_lowercase().as_str() {
            "admin" => Ok(Actor::Administrator(UserId::new(id))),
            "agent" => Ok(Actor::FieldAgent(AgentId::new(id))),
            "rider" => Ok(Actor::Rider(RiderId::new(id))),
            other => Err(format!("unknown actor kind {other:?}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_actor_has_no_audit_ref() {
        assert_eq!(Actor::System.audit_ref(), None);
        assert!(!Actor::System.is_human());
    }

    #[test]
    fn human_actor_refs_are_prefixed() {
        let agent = Actor::FieldAgent(AgentId::new("EN-7"));
        assert_eq!(agent.audit_ref().as_deref(), Some("agent:EN-7"));
        let admin = Actor::Administrator(UserId::new("root"));
        assert_eq!(admin.to_string(), "admin:root");
    }

    #[test]
    fn parses_its_own_display_form() {
        for actor in [
            Actor::System,
            Actor::Administrator(UserId::new("ops")),
            Actor::FieldAgent(AgentId::new("EN-1")),
            Actor::Rider(RiderId::new("DB-2025-0001")),
        ] {
            assert_eq!(actor.to_string().parse::<Actor>(), Ok(actor));
        }
        assert!("agent:".parse::<Actor>().is_err());
        assert!("guest:x".parse::<Actor>().is_err());
        assert!("ops".parse::<Actor>().is_err());
    }
}
