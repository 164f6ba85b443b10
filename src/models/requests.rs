use serde::{Deserialize, Serialize};
use validator::Validate;
use crate::models::domain::ItemType;

/// Request to register (or re-register) an item
///
/// When `textEmbedding` is omitted the engine embeds title and description
/// itself, and `imageBase64` (if any) through the image model.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterItemRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "item_id", rename = "itemId")]
    pub item_id: String,
    #[serde(alias = "item_type", rename = "itemType")]
    pub item_type: ItemType,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(alias = "user_id", rename = "userId", default)]
    pub user_id: String,
    #[serde(rename = "textEmbedding", default)]
    pub text_embedding: Option<Vec<f32>>,
    #[serde(rename = "imageEmbedding", default)]
    pub image_embedding: Option<Vec<f32>>,
    #[serde(rename = "hasImage", default)]
    pub has_image: bool,
    #[serde(rename = "imageBase64", default)]
    pub image_base64: Option<String>,
}

/// Request to compute embeddings for an item without registering it
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct EmbedItemRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "item_id", rename = "itemId")]
    pub item_id: String,
    #[serde(alias = "item_type", rename = "itemType")]
    pub item_type: ItemType,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(alias = "user_id", rename = "userId", default)]
    pub user_id: String,
    #[serde(rename = "imageBase64", default)]
    pub image_base64: Option<String>,
}

/// Request to find matches for a registered item
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct FindMatchesRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "item_id", rename = "itemId")]
    pub item_id: String,
    #[validate(range(min = 1))]
    #[serde(alias = "top_k", rename = "topK", default)]
    pub top_k: Option<usize>,
    #[validate(range(min = 0.0, max = 1.0))]
    #[serde(default)]
    pub threshold: Option<f64>,
}

/// Request to score two registered items against each other
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CompareRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "lost_item_id", rename = "lostItemId")]
    pub lost_item_id: String,
    #[validate(length(min = 1))]
    #[serde(alias = "found_item_id", rename = "foundItemId")]
    pub found_item_id: String,
}

/// Query string for the batch matching endpoint
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct MatchAllQuery {
    #[validate(range(min = 1))]
    #[serde(rename = "topK", default)]
    pub top_k: Option<usize>,
    #[validate(range(min = 0.0, max = 1.0))]
    #[serde(default)]
    pub threshold: Option<f64>,
}
