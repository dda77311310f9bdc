//! Audit log service over an [`AuditStore`].

use std::sync::Arc;

use boda_store::{AuditStore, StoreError};
use boda_types::{AuditAction, AuditEntry, Clock, RiderId};
use tracing::{error, info, warn};

use crate::Access;

/// Writes and reads the identity audit trail.
#[derive(Clone)]
pub struct AuditLog {
    store: Arc<dyn AuditStore>,
    clock: Arc<dyn Clock>,
}

impl AuditLog {
    pub fn new(store: Arc<dyn AuditStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Append one entry. Callers on a success path treat an error here as fatal.
    pub fn record(
        &self,
        rider: &RiderId,
        access: &Access,
        action: AuditAction,
        success: bool,
        reason: impl Into<String>,
    ) -> Result<AuditEntry, StoreError> {
        let entry = AuditEntry {
            seq: 0,
            subject_rider: rider.clone(),
            actor: access.actor.audit_ref(),
            action,
            success,
            reason: reason.into(),
            client_ip: access.client.client_ip,
            client_agent: access.client.client_agent.clone(),
            timestamp: self.clock.now(),
        };
        let stored = self.store.append(entry)?;
        if success {
            info!(rider = %rider, actor = %access.actor, action = %action, "identity access");
        } else {
            warn!(
                rider = %rider,
                actor = %access.actor,
                action = %action,
                reason = %stored.reason,
                "identity access refused"
            );
        }
        Ok(stored)
    }

    /// Append an entry on a path that is already failing. A storage error is
    /// logged and swallowed so the original failure reaches the caller.
    pub fn record_best_effort(
        &self,
        rider: &RiderId,
        access: &Access,
        action: AuditAction,
        success: bool,
        reason: impl Into<String>,
    ) {
        if let Err(e) = self.record(rider, access, action, success, reason) {
            error!(rider = %rider, action = %action, error = %e, "failed to write audit entry");
        }
    }

    /// Every entry about `rider`, newest first.
    pub fn entries_for(&self, rider: &RiderId) -> Result<Vec<AuditEntry>, StoreError> {
        self.store.entries_for(rider)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use boda_nullables::{NullAuditStore, NullClock};
    use boda_types::{Actor, AgentId};

    #[test]
    fn copies_access_context() {
        let store = Arc::new(NullAuditStore::new());
        let log = AuditLog::new(store.clone(), Arc::new(NullClock::new(1_700_000_000)));
        let access = Access::new(Actor::FieldAgent(AgentId::new("EN-4")), "onboarding")
            .with_client("192.168.1.20".parse().ok(), Some("okhttp/4.9".into()));

        let entry = log
            .record(&RiderId::new("DB-1"), &access, AuditAction::Set, true, "onboarding")
            .unwrap();

        assert_eq!(entry.seq, 1);
        assert_eq!(entry.actor.as_deref(), Some("agent:EN-4"));
        assert_eq!(entry.client_ip, "192.168.1.20".parse().ok());
        assert_eq!(entry.client_agent.as_deref(), Some("okhttp/4.9"));
        assert_eq!(entry.timestamp.as_secs(), 1_700_000_000);
    }

    #[test]
    fn system_actor_is_recorded_as_none() {
        let store = Arc::new(NullAuditStore::new());
        let log = AuditLog::new(store.clone(), Arc::new(NullClock::new(5)));
        log.record(
            &RiderId::new("DB-1"),
            &Access::system("scheduled run"),
            AuditAction::Verify,
            true,
            "scheduled run",
        )
        .unwrap();
        assert_eq!(store.all()[0].actor, None);
    }

    #[test]
    fn best_effort_swallows_failures() {
        let store = Arc::new(NullAuditStore::new());
        store.fail_appends(true);
        let log = AuditLog::new(store.clone(), Arc::new(NullClock::new(5)));
        log.record_best_effort(
            &RiderId::new("DB-1"),
            &Access::system("x"),
            AuditAction::View,
            false,
            "x",
        );
        assert!(store.all().is_empty());
    }
}
