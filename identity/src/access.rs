//! Who is asking, why, and from where.

use boda_types::{Actor, ClientInfo};
use std::net::IpAddr;

/// Caller context attached to every identity operation and copied into the
/// audit entry it produces.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Access {
    pub actor: Actor,
    pub reason: String,
    pub client: ClientInfo,
}

impl Access {
    pub fn new(actor: Actor, reason: impl Into<String>) -> Self {
        Self {
            actor,
            reason: reason.into(),
            client: ClientInfo::default(),
        }
    }

    /// The automated caller, used by scheduled verification runs.
    pub fn system(reason: impl Into<String>) -> Self {
        Self::new(Actor::System, reason)
    }

    pub fn with_client(mut self, ip: Option<IpAddr>, agent: Option<String>) -> Self {
        self.client = ClientInfo {
            client_ip: ip,
            client_agent: agent,
        };
        self
    }
}
