use std::collections::{HashMap, HashSet};
use crate::models::{ItemRecord, ItemType, MatchResult, MatchThresholds, ScoringWeights};
use crate::core::{
    filters::{is_candidate, orient, passes_threshold},
    scoring::calculate_match_score,
};

/// Default number of matches returned per query
pub const TOP_K_MATCHES: usize = 3;

/// Matching orchestrator
///
/// # Pipeline Stages
/// 1. Candidate filter (opposite item type only)
/// 2. Scoring, oriented lost -> found by item type
/// 3. Threshold post-filter
/// 4. Ranking and truncation
#[derive(Debug, Clone, Copy)]
pub struct Matcher {
    weights: ScoringWeights,
    thresholds: MatchThresholds,
}

impl Matcher {
    pub fn new(weights: ScoringWeights, thresholds: MatchThresholds) -> Self {
        Self { weights, thresholds }
    }

    pub fn with_defaults() -> Self {
        Self {
            weights: ScoringWeights::default(),
            thresholds: MatchThresholds::default(),
        }
    }

    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    pub fn thresholds(&self) -> &MatchThresholds {
        &self.thresholds
    }

    /// Score two items regardless of argument order
    ///
    /// Returns `None` when both items have the same type.
    pub fn score(&self, a: &ItemRecord, b: &ItemRecord) -> Option<MatchResult> {
        orient(a, b).map(|(lost, found)| {
            calculate_match_score(lost, found, &self.weights, &self.thresholds)
        })
    }

    /// Find the best matches for `target` among `candidates`
    ///
    /// # Arguments
    /// * `target` - The item to match
    /// * `candidates` - Items to compare against; same-type items are skipped
    /// * `top_k` - Maximum number of matches to return
    /// * `threshold` - Overrides the configured minimum confidence
    ///
    /// # Returns
    /// Matches at or above the threshold, best first
    pub fn find_matches<'a, I>(
        &self,
        target: &ItemRecord,
        candidates: I,
        top_k: usize,
        threshold: Option<f64>,
    ) -> Vec<MatchResult>
    where
        I: IntoIterator<Item = &'a ItemRecord>,
    {
        let threshold = threshold.unwrap_or(self.thresholds.match_threshold);

        let mut matches: Vec<MatchResult> = candidates
            .into_iter()
            .filter(|candidate| is_candidate(target, candidate))
            .filter_map(|candidate| self.score(target, candidate))
            .filter(|result| passes_threshold(result, threshold))
            .collect();

        sort_by_confidence(&mut matches);
        matches.truncate(top_k);
        matches
    }

    /// Match every lost item against every found item
    ///
    /// Each `(lost_id, found_id)` pair is scored at most once per call, even
    /// when `items` holds duplicate entries. With `top_k = None` the whole
    /// above-threshold feed is returned; with `Some(k)` each lost item keeps
    /// at most its `k` best matches. Either way the result is ranked globally.
    pub fn match_all(
        &self,
        items: &[ItemRecord],
        top_k: Option<usize>,
        threshold: Option<f64>,
    ) -> Vec<MatchResult> {
        let threshold = threshold.unwrap_or(self.thresholds.match_threshold);

        let (lost_items, found_items): (Vec<&ItemRecord>, Vec<&ItemRecord>) =
            items.iter().partition(|item| item.item_type == ItemType::Lost);

        let mut seen_pairs: HashSet<(&str, &str)> = HashSet::new();
        let mut all_matches = Vec::new();

        for lost in &lost_items {
            for found in &found_items {
                if !seen_pairs.insert((lost.item_id.as_str(), found.item_id.as_str())) {
                    continue;
                }

                let result = calculate_match_score(lost, found, &self.weights, &self.thresholds);
                if passes_threshold(&result, threshold) {
                    all_matches.push(result);
                }
            }
        }

        sort_by_confidence(&mut all_matches);

        if let Some(k) = top_k {
            let mut kept_per_lost: HashMap<String, usize> = HashMap::new();
            all_matches.retain(|result| {
                let kept = kept_per_lost.entry(result.lost_item_id.clone()).or_insert(0);
                *kept += 1;
                *kept <= k
            });
        }

        tracing::debug!(
            "Batch matched {} lost x {} found items, {} pairs above threshold",
            lost_items.len(),
            found_items.len(),
            all_matches.len()
        );

        all_matches
    }
}

impl Default for Matcher {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Stable sort, descending by confidence
fn sort_by_confidence(matches: &mut [MatchResult]) {
    matches.sort_by(|a, b| {
        b.confidence_score
            .partial_cmp(&a.confidence_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_item(id: &str, item_type: ItemType, category: &str, text: Vec<f32>) -> ItemRecord {
        ItemRecord {
            item_id: id.to_string(),
            item_type,
            category: category.to_string(),
            text_embedding: text,
            image_embedding: None,
            has_image: false,
            title: format!("Item {}", id),
            description: String::new(),
            user_id: format!("owner_{}", id),
        }
    }

    #[test]
    fn test_find_matches_basic() {
        let matcher = Matcher::with_defaults();
        let target = create_item("l1", ItemType::Lost, "PHONE", vec![1.0, 0.0]);

        let candidates = vec![
            create_item("f1", ItemType::Found, "PHONE", vec![1.0, 0.0]),  // Exact match
            create_item("f2", ItemType::Found, "KEYS", vec![-1.0, 0.0]),  // Opposite text
            create_item("l2", ItemType::Lost, "PHONE", vec![1.0, 0.0]),   // Same type
        ];

        let result = matcher.find_matches(&target, &candidates, 10, None);

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].found_item_id, "f1");
    }

    #[test]
    fn test_found_target_is_scored_as_found() {
        let matcher = Matcher::with_defaults();
        let target = create_item("f1", ItemType::Found, "PHONE", vec![1.0, 0.0]);
        let candidates = vec![create_item("l1", ItemType::Lost, "PHONE", vec![1.0, 0.0])];

        let result = matcher.find_matches(&target, &candidates, 3, None);

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].lost_item_id, "l1");
        assert_eq!(result[0].found_item_id, "f1");
        assert_eq!(result[0].lost_user_id, "owner_l1");
    }

    #[test]
    fn test_matches_sorted_and_limited() {
        let matcher = Matcher::with_defaults();
        let target = create_item("l1", ItemType::Lost, "BAG", vec![1.0, 0.0]);

        let candidates: Vec<ItemRecord> = (0..10)
            .map(|i| create_item(&format!("f{}", i), ItemType::Found, "BAG", vec![1.0, i as f32 * 0.1]))
            .collect();

        let result = matcher.find_matches(&target, &candidates, 3, None);

        assert_eq!(result.len(), 3);
        assert_eq!(result[0].found_item_id, "f0");
        for pair in result.windows(2) {
            assert!(pair[0].confidence_score >= pair[1].confidence_score);
        }
    }

    #[test]
    fn test_threshold_override() {
        let matcher = Matcher::with_defaults();
        let target = create_item("l1", ItemType::Lost, "BAG", vec![1.0, 0.0]);
        // Orthogonal text, same category: 0.6 * 0.5 + 0.4 = 0.7
        let candidates = vec![create_item("f1", ItemType::Found, "BAG", vec![0.0, 1.0])];

        assert_eq!(matcher.find_matches(&target, &candidates, 3, None).len(), 1);
        assert!(matcher.find_matches(&target, &candidates, 3, Some(0.9)).is_empty());
    }

    #[test]
    fn test_match_all_dedups_pairs() {
        let matcher = Matcher::with_defaults();
        let lost = create_item("l1", ItemType::Lost, "BAG", vec![1.0, 0.0]);
        let found = create_item("f1", ItemType::Found, "BAG", vec![1.0, 0.0]);

        let items = vec![lost.clone(), found.clone(), lost, found];
        let result = matcher.match_all(&items, None, None);

        assert_eq!(result.len(), 1);
    }

    #[test]
    fn test_match_all_per_lost_cap() {
        let matcher = Matcher::with_defaults();
        let items = vec![
            create_item("l1", ItemType::Lost, "BAG", vec![1.0, 0.0]),
            create_item("l2", ItemType::Lost, "BAG", vec![1.0, 0.0]),
            create_item("f1", ItemType::Found, "BAG", vec![1.0, 0.0]),
            create_item("f2", ItemType::Found, "BAG", vec![1.0, 0.1]),
            create_item("f3", ItemType::Found, "BAG", vec![1.0, 0.2]),
        ];

        assert_eq!(matcher.match_all(&items, None, None).len(), 6);

        let capped = matcher.match_all(&items, Some(1), None);
        assert_eq!(capped.len(), 2);
        assert!(capped.iter().all(|m| m.found_item_id == "f1"));
    }
}
