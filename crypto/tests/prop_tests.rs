use proptest::prelude::*;

use boda_crypto::{open_id, seal_id, IdHasher, IdKey, IdKeyring};
use boda_types::{NationalId, RiderId};

fn keyring() -> IdKeyring {
    IdKeyring::new(1, IdKey::new([0x11u8; 32]))
}

fn hasher() -> IdHasher {
    IdHasher::new(b"prop-test-salt-0123456789".to_vec()).unwrap()
}

proptest! {
    /// Sealing then opening returns the original plaintext exactly.
    #[test]
    fn seal_open_roundtrip(raw in "C[FM][0-9]{11,13}", rider in "[A-Z]{2}-[0-9]{4}") {
        let rider = RiderId::new(rider);
        let id = NationalId::new(&raw);
        let sealed = seal_id(&keyring(), &rider, &id).unwrap();
        let opened = open_id(&keyring(), &rider, &sealed).unwrap();
        prop_assert_eq!(opened.as_str(), raw.as_str());
    }

    /// The same plaintext always hashes the same way.
    #[test]
    fn hash_is_stable(raw in "C[FM][0-9]{11,13}") {
        let id = NationalId::new(&raw);
        prop_assert_eq!(hasher().hash(&id), hasher().hash(&id));
    }

    /// Distinct plaintexts produce distinct hashes.
    #[test]
    fn distinct_ids_distinct_hashes(a in "C[FM][0-9]{11,13}", b in "C[FM][0-9]{11,13}") {
        prop_assume!(a != b);
        let h = hasher();
        prop_assert_ne!(h.hash(&NationalId::new(&a)), h.hash(&NationalId::new(&b)));
    }
}
