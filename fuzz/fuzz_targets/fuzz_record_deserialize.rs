#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Records are read back from storage with bincode; malformed bytes must
    // produce an error, never a panic.
    let _ = bincode::deserialize::<boda_types::IdentityRecord>(data);
    let _ = bincode::deserialize::<boda_types::PhotoVerificationResult>(data);
    let _ = bincode::deserialize::<boda_types::RiderVerificationState>(data);
    let _ = bincode::deserialize::<boda_types::AuditEntry>(data);
});
