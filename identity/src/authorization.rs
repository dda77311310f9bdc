//! The authorization gate for plaintext ID access.
//!
//! Pure functions over (actor, rider profile). Nothing else in the workspace
//! grants plaintext access, and there is no override.

use boda_types::{Actor, RiderProfile};

/// May `actor` see the decrypted national ID of `rider`?
///
/// Granted to administrators, to the field agent currently assigned to the
/// rider, and to the rider themself. Everyone else, including the system
/// actor, is denied.
pub fn authorize_id_access(actor: &Actor, rider: &RiderProfile) -> bool {
    match actor {
        Actor::Administrator(_) => true,
        Actor::FieldAgent(agent) => rider.assigned_agent.as_ref() == Some(agent),
        Actor::Rider(id) => id == &rider.id,
        Actor::System => false,
    }
}

/// May `actor` record a review decision for `rider`?
///
/// Administrators and the assigned field agent only. Riders cannot review
/// themselves.
pub fn authorize_review(actor: &Actor, rider: &RiderProfile) -> bool {
    match actor {
        Actor::Administrator(_) => true,
        Actor::FieldAgent(agent) => rider.assigned_agent.as_ref() == Some(agent),
        Actor::Rider(_) | Actor::System => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use boda_types::{AgentId, RiderId, UserId};

    fn rider() -> RiderProfile {
        let mut profile = RiderProfile::new(RiderId::new("DB-2025-0001"), "Okello");
        profile.assigned_agent = Some(AgentId::new("EN-1"));
        profile
    }

    #[test]
    fn id_access_matrix() {
        let r = rider();
        assert!(authorize_id_access(&Actor::Administrator(UserId::new("root")), &r));
        assert!(authorize_id_access(&Actor::FieldAgent(AgentId::new("EN-1")), &r));
        assert!(authorize_id_access(&Actor::Rider(RiderId::new("DB-2025-0001")), &r));

        assert!(!authorize_id_access(&Actor::FieldAgent(AgentId::new("EN-2")), &r));
        assert!(!authorize_id_access(&Actor::Rider(RiderId::new("DB-2025-0002")), &r));
        assert!(!authorize_id_access(&Actor::System, &r));
    }

    #[test]
    fn unassigned_rider_denies_every_agent() {
        let r = RiderProfile::new(RiderId::new("DB-9"), "Unassigned");
        assert!(!authorize_id_access(&Actor::FieldAgent(AgentId::new("EN-1")), &r));
        assert!(!authorize_review(&Actor::FieldAgent(AgentId::new("EN-1")), &r));
    }

    #[test]
    fn riders_cannot_review_themselves() {
        let r = rider();
        assert!(!authorize_review(&Actor::Rider(RiderId::new("DB-2025-0001")), &r));
        assert!(authorize_review(&Actor::FieldAgent(AgentId::new("EN-1")), &r));
        assert!(authorize_review(&Actor::Administrator(UserId::new("ops")), &r));
        assert!(!authorize_review(&Actor::System, &r));
    }
}
