#![no_main]

use boda_crypto::{open_id, IdKey, IdKeyring};
use boda_types::{RiderId, SealedId};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Stored ciphertext may be truncated or corrupted; opening it must fail
    // cleanly rather than panic.
    let keyring = IdKeyring::new(1, IdKey::new([7; 32]));
    let sealed = SealedId::from_bytes(data.to_vec());
    let _ = open_id(&keyring, &RiderId::new("DB-FUZZ"), &sealed);
});
