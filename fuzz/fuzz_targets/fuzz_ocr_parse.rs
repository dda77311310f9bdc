#![no_main]

use std::sync::OnceLock;

use boda_document::{IdDocumentParser, OcrConfig};
use libfuzzer_sys::fuzz_target;

fn parser() -> &'static IdDocumentParser {
    static PARSER: OnceLock<IdDocumentParser> = OnceLock::new();
    PARSER.get_or_init(|| {
        IdDocumentParser::new(&OcrConfig::default()).expect("default patterns compile")
    })
}

fuzz_target!(|data: &[u8]| {
    // OCR output is arbitrary text; parsing must never panic and the
    // confidence must stay in range.
    let text = String::from_utf8_lossy(data);
    let fields = parser().parse(&text);
    let confidence = fields.confidence(&text);
    assert!((0.0..=1.0).contains(&confidence));
    if let Some(id) = &fields.id_number {
        assert!(id.len() >= OcrConfig::default().min_id_len);
    }
});
