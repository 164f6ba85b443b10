use serde::{Deserialize, Serialize};

/// Which side of the lost-and-found board an item was reported on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ItemType {
    Lost,
    Found,
}

impl ItemType {
    /// The type an item of this type is matched against
    pub fn opposite(self) -> Self {
        match self {
            ItemType::Lost => ItemType::Found,
            ItemType::Found => ItemType::Lost,
        }
    }
}

/// One reported item with its embeddings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemRecord {
    #[serde(rename = "itemId")]
    pub item_id: String,
    #[serde(rename = "itemType")]
    pub item_type: ItemType,
    #[serde(default)]
    pub category: String,
    #[serde(rename = "textEmbedding")]
    pub text_embedding: Vec<f32>,
    #[serde(rename = "imageEmbedding", default)]
    pub image_embedding: Option<Vec<f32>>,
    #[serde(rename = "hasImage", default)]
    pub has_image: bool,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "userId", default)]
    pub user_id: String,
}

impl ItemRecord {
    /// Image embedding usable for comparison.
    ///
    /// `None` whenever `has_image` is false, even if a (zero) vector is stored.
    pub fn image(&self) -> Option<&[f32]> {
        if self.has_image {
            self.image_embedding.as_deref()
        } else {
            None
        }
    }
}

/// Raw fields of an item whose embeddings still have to be computed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewItem {
    pub item_id: String,
    pub item_type: ItemType,
    pub category: String,
    pub title: String,
    pub description: String,
    pub user_id: String,
}

/// Coarse confidence bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MatchLevel {
    High,
    Medium,
    Low,
}

/// Scored pairing of a lost and a found item.
///
/// All scores are on the internal [0, 1] scale; the percentage view lives in
/// [`crate::models::MatchResultResponse`].
#[derive(Debug, Clone, PartialEq)]
pub struct MatchResult {
    pub lost_item_id: String,
    pub found_item_id: String,
    pub lost_user_id: String,
    pub found_user_id: String,
    pub confidence_score: f64,
    pub image_similarity: f64,
    pub text_similarity: f64,
    pub category_match: f64,
    pub match_level: MatchLevel,
}

/// Scoring weights
///
/// `image`/`text`/`category` apply when both items carry an image. Otherwise
/// the image term is dropped and the fixed `fallback_*` weights are used.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringWeights {
    pub image: f64,
    pub text: f64,
    pub category: f64,
    pub fallback_text: f64,
    pub fallback_category: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            image: 0.5,
            text: 0.3,
            category: 0.2,
            fallback_text: 0.6,
            fallback_category: 0.4,
        }
    }
}

/// Confidence cut-offs
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchThresholds {
    /// Minimum confidence for a pairing to be reported at all
    pub match_threshold: f64,
    pub high_match_threshold: f64,
}

impl MatchThresholds {
    pub fn level(&self, confidence: f64) -> MatchLevel {
        if confidence >= self.high_match_threshold {
            MatchLevel::High
        } else if confidence >= self.match_threshold {
            MatchLevel::Medium
        } else {
            MatchLevel::Low
        }
    }
}

impl Default for MatchThresholds {
    fn default() -> Self {
        Self {
            match_threshold: 0.6,
            high_match_threshold: 0.8,
        }
    }
}

/// Snapshot of registry contents
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryCounts {
    pub lost: usize,
    pub found: usize,
    #[serde(rename = "withImages")]
    pub with_images: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_type_wire_names() {
        assert_eq!(serde_json::to_string(&ItemType::Lost).unwrap(), "\"LOST\"");
        let parsed: ItemType = serde_json::from_str("\"FOUND\"").unwrap();
        assert_eq!(parsed, ItemType::Found);
        assert_eq!(ItemType::Lost.opposite(), ItemType::Found);
    }

    #[test]
    fn test_image_hidden_without_flag() {
        let record = ItemRecord {
            item_id: "a".to_string(),
            item_type: ItemType::Lost,
            category: "BAG".to_string(),
            text_embedding: vec![1.0, 0.0],
            image_embedding: Some(vec![0.0, 0.0]),
            has_image: false,
            title: String::new(),
            description: String::new(),
            user_id: String::new(),
        };
        assert!(record.image().is_none());
    }

    #[test]
    fn test_level_boundaries() {
        let thresholds = MatchThresholds::default();
        assert_eq!(thresholds.level(0.8), MatchLevel::High);
        assert_eq!(thresholds.level(0.6), MatchLevel::Medium);
        assert_eq!(thresholds.level(0.5999), MatchLevel::Low);
    }
}
