#![no_main]

use boda_identity::IdFormat;
use boda_types::mask_id;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(raw) = std::str::from_utf8(data) else {
        return;
    };
    let format = IdFormat::default();

    // Accepted values are re-validated unchanged; masking never panics and
    // never shows the middle of the value.
    if let Ok(id) = format.validate(raw) {
        assert!(format.is_valid(id.as_str()));
        assert!(id.as_str().len() >= format.min_len && id.as_str().len() <= format.max_len);
        let masked = mask_id(id.as_str());
        assert_eq!(masked.chars().count(), id.as_str().chars().count());
    }
    let _ = mask_id(raw);
});
