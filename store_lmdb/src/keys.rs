//! Composite key layout shared by the per-rider databases.
//!
//! Rider ids are variable length, so every composite key puts a `0x00`
//! separator after the rider bytes. That keeps the prefix of rider `a`
//! from matching rider `ab`.

use std::ops::Bound;

use heed::types::Bytes;
use heed::{Database, RoTxn};

use boda_types::{PhotoCategory, RiderId};

use crate::LmdbError;

const SEPARATOR: u8 = 0x00;

/// `rider ++ 0x00`, the prefix of every composite key for one rider.
pub(crate) fn rider_prefix(rider: &RiderId) -> Vec<u8> {
    let id = rider.as_str().as_bytes();
    let mut key = Vec::with_capacity(id.len() + 1);
    key.extend_from_slice(id);
    key.push(SEPARATOR);
    key
}

/// `rider ++ 0x00 ++ category_tag`.
pub(crate) fn result_key(rider: &RiderId, category: PhotoCategory) -> Vec<u8> {
    let mut key = rider_prefix(rider);
    key.push(match category {
        PhotoCategory::Profile => 1,
        PhotoCategory::IdDocument => 2,
    });
    key
}

/// `rider ++ 0x00 ++ seq (big endian)`, so a prefix scan yields insertion order.
pub(crate) fn audit_key(rider: &RiderId, seq: u64) -> Vec<u8> {
    let mut key = rider_prefix(rider);
    key.extend_from_slice(&seq.to_be_bytes());
    key
}

/// Increment a byte prefix to form the exclusive upper bound of a range scan.
/// Trailing `0xFF` bytes roll over; an all-`0xFF` prefix becomes empty
/// (unbounded).
pub(crate) fn increment_prefix(prefix: &mut Vec<u8>) {
    while let Some(last) = prefix.pop() {
        if last < 0xFF {
            prefix.push(last + 1);
            return;
        }
    }
}

/// Prefix range-scan: collect all values whose key starts with `prefix`.
pub(crate) fn scan_prefix(
    db: &Database<Bytes, Bytes>,
    rtxn: &RoTxn<'_>,
    prefix: &[u8],
) -> Result<Vec<Vec<u8>>, LmdbError> {
    let mut upper = prefix.to_vec();
    increment_prefix(&mut upper);
    let upper_bound = if upper.is_empty() {
        Bound::Unbounded
    } else {
        Bound::Excluded(upper.as_slice())
    };
    let bounds = (Bound::Included(prefix), upper_bound);
    let mut values = Vec::new();
    for entry in db.range(rtxn, &bounds)? {
        let (_key, val) = entry?;
        values.push(val.to_vec());
    }
    Ok(values)
}
