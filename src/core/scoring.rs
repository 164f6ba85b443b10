use crate::models::{ItemRecord, MatchResult, MatchThresholds, ScoringWeights};
use crate::core::similarity::{category_match, cosine_similarity};

/// Score a lost item against a found item
///
/// Scoring formula when both items have an image:
/// confidence = (
///     image_similarity * 0.5 +
///     text_similarity  * 0.3 +
///     category_match   * 0.2
/// )
///
/// Otherwise the image term is dropped and the fallback weights apply:
/// confidence = text_similarity * 0.6 + category_match * 0.4
///
/// The fallback weights are fixed values, not a rescaling of the primary ones.
pub fn calculate_match_score(
    lost: &ItemRecord,
    found: &ItemRecord,
    weights: &ScoringWeights,
    thresholds: &MatchThresholds,
) -> MatchResult {
    let text_similarity = cosine_similarity(&lost.text_embedding, &found.text_embedding);
    let category = category_match(&lost.category, &found.category);

    let (image_similarity, confidence) = match (lost.image(), found.image()) {
        (Some(lost_image), Some(found_image)) => {
            let image_similarity = cosine_similarity(lost_image, found_image);
            let confidence = image_similarity * weights.image
                + text_similarity * weights.text
                + category * weights.category;
            (image_similarity, confidence)
        }
        _ => {
            let confidence =
                text_similarity * weights.fallback_text + category * weights.fallback_category;
            (0.0, confidence)
        }
    };

    MatchResult {
        lost_item_id: lost.item_id.clone(),
        found_item_id: found.item_id.clone(),
        lost_user_id: lost.user_id.clone(),
        found_user_id: found.user_id.clone(),
        confidence_score: confidence,
        image_similarity,
        text_similarity,
        category_match: category,
        match_level: thresholds.level(confidence),
    }
}
