//! The identity store service.
//!
//! Validates, hashes, seals and persists national IDs, and releases plaintext
//! only through the authorization gate. Every call that touches identity data
//! leaves an audit entry, including refused and failed calls.

use std::sync::Arc;

use boda_crypto::{open_id, seal_id, KeyMaterial};
use boda_store::{IdentityRecordStore, RiderDirectory, StoreError};
use boda_types::{
    mask_id, Actor, AuditAction, Clock, IdentityRecord, NationalId, RiderId, RiderProfile,
    VerificationStatus,
};
use tracing::{debug, info, warn};

use crate::{authorize_id_access, authorize_review, Access, AuditLog, IdFormat, IdentityError};

/// One rider's plaintext ID, as returned by [`IdentityStore::export`].
#[derive(Clone, Debug)]
pub struct ExportedId {
    pub rider: RiderId,
    pub national_id: NationalId,
}

pub struct IdentityStore {
    records: Arc<dyn IdentityRecordStore>,
    directory: Arc<dyn RiderDirectory>,
    audit: AuditLog,
    keys: Arc<KeyMaterial>,
    clock: Arc<dyn Clock>,
    format: IdFormat,
}

impl IdentityStore {
    pub fn new(
        records: Arc<dyn IdentityRecordStore>,
        directory: Arc<dyn RiderDirectory>,
        audit: AuditLog,
        keys: Arc<KeyMaterial>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            records,
            directory,
            audit,
            keys,
            clock,
            format: IdFormat::default(),
        }
    }

    pub fn with_format(mut self, format: IdFormat) -> Self {
        self.format = format;
        self
    }

    pub fn audit_log(&self) -> &AuditLog {
        &self.audit
    }

    /// Store `raw_id` for `rider`, replacing any previous ID.
    ///
    /// The status resets to `Pending`. Fails with `InvalidFormat` or
    /// `DuplicateIdentity` without touching storage; both are audited.
    pub fn set(&self, rider: &RiderId, raw_id: &str, access: &Access) -> Result<(), IdentityError> {
        let id = match self.format.validate(raw_id) {
            Ok(id) => id,
            Err(e) => {
                self.audit.record_best_effort(
                    rider,
                    access,
                    AuditAction::Set,
                    false,
                    format!("{} - invalid format", access.reason),
                );
                return Err(e);
            }
        };

        let hash = self.keys.hash(&id);
        if let Some(owner) = self.records.find_by_hash(&hash)? {
            if &owner != rider {
                return Err(self.refuse_duplicate(rider, access));
            }
        }

        let ciphertext = seal_id(&self.keys.keyring, rider, &id)?;
        let now = self.clock.now();
        let record = match self.records.get_identity(rider)? {
            Some(existing) => IdentityRecord {
                ciphertext,
                verification_hash: hash,
                id_verification_status: VerificationStatus::Pending,
                updated_at: now,
                verified_at: None,
                verified_by: None,
                ..existing
            },
            None => IdentityRecord {
                rider: rider.clone(),
                ciphertext,
                verification_hash: hash,
                id_verification_status: VerificationStatus::Pending,
                created_at: now,
                updated_at: now,
                last_accessed_at: None,
                access_count: 0,
                verified_at: None,
                verified_by: None,
            },
        };

        // The pre-check above is advisory; the store's unique index decides.
        match self.records.put_identity(&record) {
            Ok(()) => {}
            Err(StoreError::Duplicate(_)) => return Err(self.refuse_duplicate(rider, access)),
            Err(e) => {
                self.audit.record_best_effort(
                    rider,
                    access,
                    AuditAction::Set,
                    false,
                    format!("{} - storage failure", access.reason),
                );
                return Err(e.into());
            }
        }

        self.audit
            .record(rider, access, AuditAction::Set, true, access.reason.clone())?;
        info!(rider = %rider, id = %id.masked(), "national ID stored");
        Ok(())
    }

    fn refuse_duplicate(&self, rider: &RiderId, access: &Access) -> IdentityError {
        self.audit.record_best_effort(
            rider,
            access,
            AuditAction::Set,
            false,
            format!("{} - duplicate", access.reason),
        );
        IdentityError::DuplicateIdentity
    }

    /// Decrypt and return the rider's ID if the gate allows `access.actor`.
    pub fn get(&self, rider: &RiderId, access: &Access) -> Result<NationalId, IdentityError> {
        let profile = self.profile(rider)?;
        self.reveal(&profile, access, AuditAction::View)
    }

    /// Plaintext for every rider in `riders` that `access.actor` may see.
    /// Riders that are refused or have no ID are skipped; refusals are still
    /// audited.
    pub fn export(
        &self,
        riders: &[RiderId],
        access: &Access,
    ) -> Result<Vec<ExportedId>, IdentityError> {
        let mut exported = Vec::new();
        for rider in riders {
            let profile = match self.profile(rider) {
                Ok(profile) => profile,
                Err(IdentityError::UnknownRider(_)) => continue,
                Err(e) => return Err(e),
            };
            match self.reveal(&profile, access, AuditAction::Export) {
                Ok(national_id) => exported.push(ExportedId {
                    rider: rider.clone(),
                    national_id,
                }),
                Err(IdentityError::NotAuthorized { .. } | IdentityError::NoIdentity(_)) => {}
                Err(IdentityError::Crypto(e)) => {
                    warn!(rider = %rider, error = %e, "skipping unreadable ID in export");
                }
                Err(e) => return Err(e),
            }
        }
        Ok(exported)
    }

    fn reveal(
        &self,
        profile: &RiderProfile,
        access: &Access,
        action: AuditAction,
    ) -> Result<NationalId, IdentityError> {
        let rider = &profile.id;
        if !authorize_id_access(&access.actor, profile) {
            self.audit.record_best_effort(
                rider,
                access,
                AuditAction::UnauthorizedAccess,
                false,
                access.reason.clone(),
            );
            return Err(IdentityError::NotAuthorized {
                actor: access.actor.to_string(),
                rider: rider.clone(),
            });
        }

        let Some(record) = self.records.get_identity(rider)? else {
            self.audit.record_best_effort(
                rider,
                access,
                action,
                false,
                format!("{} - no ID on record", access.reason),
            );
            return Err(IdentityError::NoIdentity(rider.clone()));
        };

        let id = match open_id(&self.keys.keyring, rider, &record.ciphertext) {
            Ok(id) => id,
            Err(e) => {
                self.audit.record_best_effort(
                    rider,
                    access,
                    action,
                    false,
                    format!("{} - decryption failed", access.reason),
                );
                return Err(e.into());
            }
        };

        self.audit
            .record(rider, access, action, true, access.reason.clone())?;
        self.records.record_access(rider, self.clock.now())?;
        Ok(id)
    }

    /// Redacted form for display. No authorization and no audit entry.
    /// `None` if the rider has no ID on record.
    pub fn masked(&self, rider: &RiderId) -> Result<Option<String>, IdentityError> {
        let Some(record) = self.records.get_identity(rider)? else {
            return Ok(None);
        };
        match open_id(&self.keys.keyring, rider, &record.ciphertext) {
            Ok(id) => Ok(Some(id.masked())),
            Err(e) => {
                warn!(rider = %rider, error = %e, "stored ID could not be opened for masking");
                Ok(Some(mask_id("")))
            }
        }
    }

    /// Would `raw_id` collide with an ID registered to a rider other than
    /// `excluding`? Hash lookup only; usable before any record exists.
    pub fn is_duplicate(
        &self,
        raw_id: &str,
        excluding: Option<&RiderId>,
    ) -> Result<bool, IdentityError> {
        let id = NationalId::new(raw_id);
        if id.is_empty() {
            return Ok(false);
        }
        let owner = self.records.find_by_hash(&self.keys.hash(&id))?;
        debug!(found = owner.is_some(), "duplicate check");
        Ok(match owner {
            Some(owner) => Some(&owner) != excluding,
            None => false,
        })
    }

    /// Whether a verification hash is on record for `rider`.
    pub fn has_identity(&self, rider: &RiderId) -> Result<bool, IdentityError> {
        Ok(self.records.get_identity(rider)?.is_some())
    }

    /// Re-seal `rider`'s ID under the active key. Administrators only.
    /// Returns `false` when the record already uses the active key.
    pub fn rotate(&self, rider: &RiderId, access: &Access) -> Result<bool, IdentityError> {
        if !matches!(access.actor, Actor::Administrator(_)) {
            return Err(self.refuse(rider, access));
        }
        let Some(mut record) = self.records.get_identity(rider)? else {
            return Err(IdentityError::NoIdentity(rider.clone()));
        };
        let active = self.keys.keyring.active_id();
        if record.ciphertext.key_id() == Some(active) {
            return Ok(false);
        }

        let id = open_id(&self.keys.keyring, rider, &record.ciphertext)?;
        record.ciphertext = seal_id(&self.keys.keyring, rider, &id)?;
        record.updated_at = self.clock.now();
        self.records.put_identity(&record)?;
        self.audit.record(
            rider,
            access,
            AuditAction::Update,
            true,
            format!("{} - resealed under key {active}", access.reason),
        )?;
        info!(rider = %rider, key_id = active, "national ID resealed");
        Ok(true)
    }

    /// Record a reviewer's decision on the ID itself.
    pub fn review(
        &self,
        rider: &RiderId,
        access: &Access,
        status: VerificationStatus,
    ) -> Result<(), IdentityError> {
        let profile = self.profile(rider)?;
        if !authorize_review(&access.actor, &profile) {
            return Err(self.refuse(rider, access));
        }
        let Some(mut record) = self.records.get_identity(rider)? else {
            return Err(IdentityError::NoIdentity(rider.clone()));
        };

        let now = self.clock.now();
        record.id_verification_status = status;
        record.updated_at = now;
        if status == VerificationStatus::Verified {
            record.verified_at = Some(now);
            record.verified_by = access.actor.audit_ref();
        }
        self.records.put_identity(&record)?;
        self.audit.record(
            rider,
            access,
            AuditAction::Verify,
            true,
            format!("{} - {}", access.reason, status.as_str()),
        )?;
        Ok(())
    }

    fn refuse(&self, rider: &RiderId, access: &Access) -> IdentityError {
        self.audit.record_best_effort(
            rider,
            access,
            AuditAction::UnauthorizedAccess,
            false,
            access.reason.clone(),
        );
        IdentityError::NotAuthorized {
            actor: access.actor.to_string(),
            rider: rider.clone(),
        }
    }

    fn profile(&self, rider: &RiderId) -> Result<RiderProfile, IdentityError> {
        match self.directory.rider(rider) {
            Ok(profile) => Ok(profile),
            Err(StoreError::NotFound(_)) => Err(IdentityError::UnknownRider(rider.clone())),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use boda_crypto::{IdHasher, IdKey, IdKeyring};
    use boda_nullables::{NullAuditStore, NullClock, NullDirectory, NullIdentityStore};
    use boda_types::{AgentId, AuditEntry, Timestamp, UserId, VerificationHash};

    struct Fixture {
        store: IdentityStore,
        records: Arc<NullIdentityStore>,
        audit: Arc<NullAuditStore>,
        clock: Arc<NullClock>,
    }

    fn keys() -> KeyMaterial {
        KeyMaterial::new(
            IdKeyring::new(1, IdKey::new([7; 32])),
            IdHasher::new(b"0123456789abcdef-salt".to_vec()).unwrap(),
        )
    }

    fn fixture_with(keys: KeyMaterial) -> Fixture {
        let records = Arc::new(NullIdentityStore::new());
        fixture_over(keys, records.clone(), records)
    }

    /// `backing` is what the service talks to; `records` is the table under it.
    fn fixture_over(
        keys: KeyMaterial,
        backing: Arc<dyn IdentityRecordStore>,
        records: Arc<NullIdentityStore>,
    ) -> Fixture {
        let audit = Arc::new(NullAuditStore::new());
        let clock = Arc::new(NullClock::new(1_000));
        let directory = Arc::new(NullDirectory::new());
        for (rider, agent) in [("DB-1", "EN-1"), ("DB-2", "EN-2"), ("DB-3", "EN-1")] {
            let mut profile = RiderProfile::new(RiderId::new(rider), rider);
            profile.assigned_agent = Some(AgentId::new(agent));
            directory.insert(profile);
        }
        let store = IdentityStore::new(
            backing,
            directory,
            AuditLog::new(audit.clone(), clock.clone()),
            Arc::new(keys),
            clock.clone(),
        );
        Fixture {
            store,
            records,
            audit,
            clock,
        }
    }

    fn fixture() -> Fixture {
        fixture_with(keys())
    }

    fn agent(id: &str) -> Access {
        Access::new(Actor::FieldAgent(AgentId::new(id)), "registration")
    }

    fn admin() -> Access {
        Access::new(Actor::Administrator(UserId::new("ops")), "support ticket")
    }

    fn actions(entries: &[AuditEntry]) -> Vec<(AuditAction, bool)> {
        entries.iter().map(|e| (e.action, e.success)).collect()
    }

    #[test]
    fn set_then_get_round_trips() {
        let f = fixture();
        let rider = RiderId::new("DB-1");
        f.store.set(&rider, "CF12345678901", &agent("EN-1")).unwrap();

        let id = f.store.get(&rider, &agent("EN-1")).unwrap();
        assert_eq!(id.as_str(), "CF12345678901");

        let record = f.records.get_identity(&rider).unwrap().unwrap();
        assert_eq!(record.access_count, 1);
        assert_eq!(record.id_verification_status, VerificationStatus::Pending);
        assert!(!record.ciphertext.as_bytes().windows(13).any(|w| w == b"CF12345678901"));

        assert_eq!(
            actions(&f.audit.all()),
            [(AuditAction::Set, true), (AuditAction::View, true)]
        );
    }

    #[test]
    fn masked_needs_no_authorization() {
        let f = fixture();
        let rider = RiderId::new("DB-1");
        assert_eq!(f.store.masked(&rider).unwrap(), None);
        f.store.set(&rider, "CF12345678901", &agent("EN-1")).unwrap();
        let before = f.audit.all().len();

        let masked = f.store.masked(&rider).unwrap().unwrap();
        assert_eq!(masked, "CF12*****8901");
        assert_eq!(masked.matches('*').count(), 13 - 8);
        assert_eq!(f.audit.all().len(), before);
    }

    #[test]
    fn second_rider_with_same_id_is_duplicate() {
        let f = fixture();
        f.store
            .set(&RiderId::new("DB-1"), "CM98765432109", &agent("EN-1"))
            .unwrap();
        f.store
            .set(&RiderId::new("DB-2"), "CF11111111111", &agent("EN-2"))
            .unwrap();
        let before = f.records.get_identity(&RiderId::new("DB-2")).unwrap();

        let err = f
            .store
            .set(&RiderId::new("DB-2"), "CM98765432109", &agent("EN-2"))
            .unwrap_err();
        assert!(matches!(err, IdentityError::DuplicateIdentity));
        assert_eq!(f.records.get_identity(&RiderId::new("DB-2")).unwrap(), before);

        let last = f.audit.all().pop().unwrap();
        assert_eq!(last.action, AuditAction::Set);
        assert!(!last.success);
        assert!(last.reason.ends_with("duplicate"));
    }

    /// Hash lookups always miss, leaving uniqueness to the write.
    struct StaleLookup(Arc<NullIdentityStore>);

    impl IdentityRecordStore for StaleLookup {
        fn get_identity(&self, rider: &RiderId) -> Result<Option<IdentityRecord>, StoreError> {
            self.0.get_identity(rider)
        }

        fn put_identity(&self, record: &IdentityRecord) -> Result<(), StoreError> {
            self.0.put_identity(record)
        }

        fn find_by_hash(&self, _hash: &VerificationHash) -> Result<Option<RiderId>, StoreError> {
            Ok(None)
        }

        fn record_access(&self, rider: &RiderId, at: Timestamp) -> Result<(), StoreError> {
            self.0.record_access(rider, at)
        }
    }

    #[test]
    fn duplicate_is_caught_at_write_time() {
        let records = Arc::new(NullIdentityStore::new());
        let f = fixture_over(keys(), Arc::new(StaleLookup(records.clone())), records);
        f.store
            .set(&RiderId::new("DB-1"), "CM98765432109", &agent("EN-1"))
            .unwrap();

        let err = f
            .store
            .set(&RiderId::new("DB-2"), "CM98765432109", &agent("EN-2"))
            .unwrap_err();
        assert!(matches!(err, IdentityError::DuplicateIdentity));
        assert_eq!(f.records.get_identity(&RiderId::new("DB-2")).unwrap(), None);
        assert_eq!(f.records.len(), 1);

        let last = f.audit.all().pop().unwrap();
        assert_eq!(last.subject_rider, RiderId::new("DB-2"));
        assert_eq!((last.action, last.success), (AuditAction::Set, false));
        assert_eq!(last.reason, "registration - duplicate");
    }

    #[test]
    fn concurrent_registrations_of_one_id_admit_a_single_rider() {
        let f = fixture();
        let results: Vec<Result<(), IdentityError>> = std::thread::scope(|s| {
            let handles: Vec<_> = [("DB-1", "EN-1"), ("DB-2", "EN-2")]
                .into_iter()
                .map(|(rider, agent_id)| {
                    let store = &f.store;
                    s.spawn(move || {
                        store.set(&RiderId::new(rider), "CM98765432109", &agent(agent_id))
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(results
            .iter()
            .any(|r| matches!(r, Err(IdentityError::DuplicateIdentity))));
        assert_eq!(f.records.len(), 1);

        let sets: Vec<bool> = f
            .audit
            .all()
            .iter()
            .filter(|e| e.action == AuditAction::Set)
            .map(|e| e.success)
            .collect();
        assert_eq!(sets.len(), 2);
        assert_eq!(sets.iter().filter(|ok| **ok).count(), 1);
    }

    #[test]
    fn resetting_own_id_is_not_duplicate() {
        let f = fixture();
        let rider = RiderId::new("DB-1");
        f.store.set(&rider, "CM98765432109", &agent("EN-1")).unwrap();
        f.store.set(&rider, "CM98765432109", &agent("EN-1")).unwrap();
        assert!(!f.store.is_duplicate("CM98765432109", Some(&rider)).unwrap());
        assert!(f.store.is_duplicate("CM98765432109", None).unwrap());
        assert!(f
            .store
            .is_duplicate(" CM98765432109 ", Some(&RiderId::new("DB-2")))
            .unwrap());
        assert!(!f.store.is_duplicate("CF00000000000", None).unwrap());
        assert!(!f.store.is_duplicate("", None).unwrap());
    }

    #[test]
    fn invalid_format_is_audited_and_not_stored() {
        let f = fixture();
        let rider = RiderId::new("DB-1");
        let err = f.store.set(&rider, "XY123", &agent("EN-1")).unwrap_err();
        assert_eq!(err.reason_code(), "invalid_format");
        assert!(f.records.is_empty());
        assert_eq!(actions(&f.audit.all()), [(AuditAction::Set, false)]);
    }

    #[test]
    fn unauthorized_get_leaves_exactly_one_entry() {
        let f = fixture();
        let rider = RiderId::new("DB-1");
        f.store.set(&rider, "CF12345678901", &agent("EN-1")).unwrap();
        let before = f.audit.all().len();

        for outsider in [
            agent("EN-2"),
            Access::new(Actor::Rider(RiderId::new("DB-2")), "curious"),
        ] {
            let err = f.store.get(&rider, &outsider).unwrap_err();
            assert!(matches!(err, IdentityError::NotAuthorized { .. }));
        }

        let entries = f.audit.all();
        assert_eq!(entries.len(), before + 2);
        assert!(entries[before..]
            .iter()
            .all(|e| e.action == AuditAction::UnauthorizedAccess && !e.success));
        assert_eq!(
            f.records.get_identity(&rider).unwrap().unwrap().access_count,
            0
        );
    }

    #[test]
    fn rider_and_admin_may_read() {
        let f = fixture();
        let rider = RiderId::new("DB-1");
        f.store.set(&rider, "CF12345678901", &agent("EN-1")).unwrap();
        let own = Access::new(Actor::Rider(rider.clone()), "self service");
        assert_eq!(f.store.get(&rider, &own).unwrap().as_str(), "CF12345678901");
        assert_eq!(f.store.get(&rider, &admin()).unwrap().as_str(), "CF12345678901");
    }

    #[test]
    fn audit_failure_withholds_plaintext() {
        let f = fixture();
        let rider = RiderId::new("DB-1");
        f.store.set(&rider, "CF12345678901", &agent("EN-1")).unwrap();
        f.audit.fail_appends(true);
        let err = f.store.get(&rider, &agent("EN-1")).unwrap_err();
        assert_eq!(err.reason_code(), "storage_failure");
    }

    #[test]
    fn get_without_record() {
        let f = fixture();
        let err = f.store.get(&RiderId::new("DB-1"), &admin()).unwrap_err();
        assert!(matches!(err, IdentityError::NoIdentity(_)));
        let err = f.store.get(&RiderId::new("DB-404"), &admin()).unwrap_err();
        assert!(matches!(err, IdentityError::UnknownRider(_)));
    }

    #[test]
    fn export_skips_refused_riders() {
        let f = fixture();
        f.store
            .set(&RiderId::new("DB-1"), "CF12345678901", &agent("EN-1"))
            .unwrap();
        f.store
            .set(&RiderId::new("DB-2"), "CF22222222222", &agent("EN-2"))
            .unwrap();
        f.store
            .set(&RiderId::new("DB-3"), "CM33333333333", &agent("EN-1"))
            .unwrap();

        let riders = [RiderId::new("DB-1"), RiderId::new("DB-2"), RiderId::new("DB-3")];
        let exported = f.store.export(&riders, &agent("EN-1")).unwrap();
        let got: Vec<&str> = exported.iter().map(|e| e.rider.as_str()).collect();
        assert_eq!(got, ["DB-1", "DB-3"]);

        let entries = f.audit.all();
        let tail = actions(&entries[entries.len() - 3..]);
        assert_eq!(
            tail,
            [
                (AuditAction::Export, true),
                (AuditAction::UnauthorizedAccess, false),
                (AuditAction::Export, true),
            ]
        );
    }

    #[test]
    fn rotation_reseals_under_active_key() {
        let old = IdKey::new([1; 32]);
        let salt = b"0123456789abcdef-salt".to_vec();
        let f = fixture_with(KeyMaterial::new(
            IdKeyring::new(1, old.clone()),
            IdHasher::new(salt.clone()).unwrap(),
        ));
        let rider = RiderId::new("DB-1");
        f.store.set(&rider, "CF12345678901", &agent("EN-1")).unwrap();
        let sealed = f.records.get_identity(&rider).unwrap().unwrap();

        // Same backing records, new keyring with key 2 active and key 1 retired.
        let directory = Arc::new(NullDirectory::new());
        directory.insert(RiderProfile::new(rider.clone(), "DB-1"));
        let rotated = IdentityStore::new(
            f.records.clone(),
            directory,
            AuditLog::new(f.audit.clone(), f.clock.clone()),
            Arc::new(KeyMaterial::new(
                IdKeyring::new(2, IdKey::new([2; 32]))
                    .with_retired(1, old)
                    .unwrap(),
                IdHasher::new(salt).unwrap(),
            )),
            f.clock.clone(),
        );

        assert!(matches!(
            rotated.rotate(&rider, &agent("EN-1")),
            Err(IdentityError::NotAuthorized { .. })
        ));
        assert!(rotated.rotate(&rider, &admin()).unwrap());
        assert!(!rotated.rotate(&rider, &admin()).unwrap());

        let resealed = f.records.get_identity(&rider).unwrap().unwrap();
        assert_eq!(resealed.ciphertext.key_id(), Some(2));
        assert_eq!(resealed.verification_hash, sealed.verification_hash);
        assert_eq!(rotated.get(&rider, &admin()).unwrap().as_str(), "CF12345678901");
        assert_eq!(f.audit.all().iter().filter(|e| e.action == AuditAction::Update).count(), 1);
    }

    #[test]
    fn review_sets_status() {
        let f = fixture();
        let rider = RiderId::new("DB-1");
        f.store.set(&rider, "CF12345678901", &agent("EN-1")).unwrap();
        f.clock.advance(60);

        let own = Access::new(Actor::Rider(rider.clone()), "self approve");
        assert!(f.store.review(&rider, &own, VerificationStatus::Verified).is_err());

        f.store
            .review(&rider, &agent("EN-1"), VerificationStatus::Verified)
            .unwrap();
        let record = f.records.get_identity(&rider).unwrap().unwrap();
        assert_eq!(record.id_verification_status, VerificationStatus::Verified);
        assert_eq!(record.verified_at.map(|t| t.as_secs()), Some(1_060));
        assert_eq!(record.verified_by.as_deref(), Some("agent:EN-1"));

        let newest = f.store.audit_log().entries_for(&rider).unwrap();
        assert_eq!(newest[0].action, AuditAction::Verify);
        assert!(newest[0].reason.ends_with("VERIFIED"));

        // Setting a new ID resets the review.
        f.store.set(&rider, "CF12345678902", &agent("EN-1")).unwrap();
        let record = f.records.get_identity(&rider).unwrap().unwrap();
        assert_eq!(record.id_verification_status, VerificationStatus::Pending);
        assert_eq!(record.verified_at, None);
    }
}
