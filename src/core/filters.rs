use crate::models::{ItemRecord, ItemType, MatchResult};

/// Check whether `candidate` may be compared against `target`
///
/// Only the opposite item type is eligible. The id check only matters for
/// ad-hoc targets built outside the registry, since a registry id holds a
/// single item type.
#[inline]
pub fn is_candidate(target: &ItemRecord, candidate: &ItemRecord) -> bool {
    candidate.item_type == target.item_type.opposite() && candidate.item_id != target.item_id
}

/// Order two items as `(lost, found)` by their item type
///
/// Returns `None` when both items share a type.
#[inline]
pub fn orient<'a>(a: &'a ItemRecord, b: &'a ItemRecord) -> Option<(&'a ItemRecord, &'a ItemRecord)> {
    match (a.item_type, b.item_type) {
        (ItemType::Lost, ItemType::Found) => Some((a, b)),
        (ItemType::Found, ItemType::Lost) => Some((b, a)),
        _ => None,
    }
}

/// Check a scored pairing against the reporting threshold (inclusive)
#[inline]
pub fn passes_threshold(result: &MatchResult, threshold: f64) -> bool {
    result.confidence_score >= threshold
}
