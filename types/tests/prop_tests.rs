use proptest::prelude::*;

use boda_types::{
    mask_id, DecisionSource, PhotoCategory, PhotoVerificationResult, RiderId, Timestamp,
    VerificationStatus, MASK_CHAR, MASK_VISIBLE,
};

proptest! {
    /// Masking keeps both ends and hides exactly `len - 8` characters.
    #[test]
    fn mask_hides_middle(id in "[A-Z]{2}[0-9]{6,20}") {
        let masked = mask_id(&id);
        prop_assert_eq!(masked.len(), id.len());
        prop_assert_eq!(&masked[..MASK_VISIBLE], &id[..MASK_VISIBLE]);
        prop_assert_eq!(&masked[id.len() - MASK_VISIBLE..], &id[id.len() - MASK_VISIBLE..]);
        let stars = masked.chars().filter(|c| *c == MASK_CHAR).count();
        prop_assert_eq!(stars, id.len() - 2 * MASK_VISIBLE);
    }

    /// Verification results survive bincode, including the JSON details blob.
    #[test]
    fn photo_result_bincode_roundtrip(score in 0.0f64..=1.0, warn in "[a-z ]{0,30}") {
        let result = PhotoVerificationResult {
            rider: RiderId::new("DB-2025-0001"),
            category: PhotoCategory::Profile,
            status: VerificationStatus::Flagged,
            is_authentic: true,
            confidence_score: score,
            face_match_score: score / 2.0,
            warnings: vec![warn],
            verification_details: serde_json::json!({ "checks": { "resolution": true, "quality": false } }),
            reviewer_notes: String::new(),
            verified_by: None,
            decided_by: DecisionSource::Automatic,
            created_at: Timestamp::new(1_700_000_000),
            verified_at: None,
        };
        let encoded = bincode::serialize(&result).unwrap();
        let decoded: PhotoVerificationResult = bincode::deserialize(&encoded).unwrap();
        prop_assert_eq!(decoded, result);
    }
}
