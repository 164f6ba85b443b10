use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::{Deserialize, Serialize};
use crate::models::domain::{ItemRecord, ItemType, MatchLevel, MatchResult, RegistryCounts};

/// Wire form of a [`MatchResult`]; scores are percentages with one decimal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchResultResponse {
    #[serde(rename = "lostItemId")]
    pub lost_item_id: String,
    #[serde(rename = "foundItemId")]
    pub found_item_id: String,
    #[serde(rename = "lostUserId")]
    pub lost_user_id: String,
    #[serde(rename = "foundUserId")]
    pub found_user_id: String,
    #[serde(rename = "confidenceScore")]
    pub confidence_score: f64,
    #[serde(rename = "imageSimilarity")]
    pub image_similarity: f64,
    #[serde(rename = "textSimilarity")]
    pub text_similarity: f64,
    #[serde(rename = "categoryMatch")]
    pub category_match: f64,
    #[serde(rename = "matchLevel")]
    pub match_level: MatchLevel,
}

/// `round(value * 100, 1)`
#[inline]
pub fn as_percentage(value: f64) -> f64 {
    (value * 1000.0).round() / 10.0
}

impl From<&MatchResult> for MatchResultResponse {
    fn from(result: &MatchResult) -> Self {
        Self {
            lost_item_id: result.lost_item_id.clone(),
            found_item_id: result.found_item_id.clone(),
            lost_user_id: result.lost_user_id.clone(),
            found_user_id: result.found_user_id.clone(),
            confidence_score: as_percentage(result.confidence_score),
            image_similarity: as_percentage(result.image_similarity),
            text_similarity: as_percentage(result.text_similarity),
            category_match: as_percentage(result.category_match),
            match_level: result.match_level,
        }
    }
}

/// Response carrying a ranked list of matches
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchesResponse {
    pub success: bool,
    pub matches: Vec<MatchResultResponse>,
    pub count: usize,
}

impl MatchesResponse {
    pub fn new(results: &[MatchResult]) -> Self {
        let matches: Vec<MatchResultResponse> = results.iter().map(Into::into).collect();
        Self {
            success: true,
            count: matches.len(),
            matches,
        }
    }
}

/// Response for a single comparison
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompareResponse {
    pub success: bool,
    #[serde(rename = "match")]
    pub result: MatchResultResponse,
}

/// Registration response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterItemResponse {
    pub success: bool,
    #[serde(rename = "itemId")]
    pub item_id: String,
    #[serde(rename = "itemType")]
    pub item_type: ItemType,
    #[serde(rename = "hasImage")]
    pub has_image: bool,
    /// True when an earlier registration under the same id was overwritten
    pub replaced: bool,
}

/// Embeddings computed for an item that has not been registered yet
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbedItemResponse {
    pub success: bool,
    #[serde(rename = "itemId")]
    pub item_id: String,
    #[serde(rename = "itemType")]
    pub item_type: ItemType,
    #[serde(rename = "textEmbedding")]
    pub text_embedding: Vec<f32>,
    /// `null` when no image was supplied
    #[serde(rename = "imageEmbedding")]
    pub image_embedding: Option<Vec<f32>>,
    #[serde(rename = "hasImage")]
    pub has_image: bool,
}

impl From<ItemRecord> for EmbedItemResponse {
    fn from(record: ItemRecord) -> Self {
        Self {
            success: true,
            item_id: record.item_id,
            item_type: record.item_type,
            text_embedding: record.text_embedding,
            image_embedding: record.image_embedding,
            has_image: record.has_image,
        }
    }
}

/// Unregistration response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnregisterResponse {
    pub success: bool,
    #[serde(rename = "itemId")]
    pub item_id: String,
    pub existed: bool,
}

/// Registry statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsResponse {
    pub total: usize,
    #[serde(flatten)]
    pub counts: RegistryCounts,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
///
/// Used as the body of every non-2xx reply, including payload errors raised
/// before a handler runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

impl ErrorResponse {
    pub fn new(status: StatusCode, error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            status_code: status.as_u16(),
        }
    }
}

impl std::fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

impl std::error::Error for ErrorResponse {}

impl ResponseError for ErrorResponse {
    fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::BAD_REQUEST)
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentage_rounding() {
        assert_eq!(as_percentage(1.0), 100.0);
        assert_eq!(as_percentage(0.0), 0.0);
        assert_eq!(as_percentage(0.87654), 87.7);
        assert_eq!(as_percentage(0.6), 60.0);
    }

    #[test]
    fn test_match_response_shape() {
        let result = MatchResult {
            lost_item_id: "l1".to_string(),
            found_item_id: "f1".to_string(),
            lost_user_id: "u1".to_string(),
            found_user_id: "u2".to_string(),
            confidence_score: 0.8123,
            image_similarity: 0.0,
            text_similarity: 0.95,
            category_match: 1.0,
            match_level: MatchLevel::High,
        };

        let json = serde_json::to_value(MatchResultResponse::from(&result)).unwrap();
        assert_eq!(json["lostItemId"], "l1");
        assert_eq!(json["confidenceScore"], 81.2);
        assert_eq!(json["categoryMatch"], 100.0);
        assert_eq!(json["matchLevel"], "HIGH");
    }

    #[test]
    fn test_error_response_status_and_body() {
        let err = ErrorResponse::new(StatusCode::NOT_FOUND, "Not found", "Item not found: x");
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.to_string(), "Not found: Item not found: x");

        let resp = err.error_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_embed_response_keeps_null_image() {
        let record = ItemRecord {
            item_id: "l1".to_string(),
            item_type: ItemType::Lost,
            category: "BAG".to_string(),
            text_embedding: vec![0.5, 0.5],
            image_embedding: None,
            has_image: false,
            title: String::new(),
            description: String::new(),
            user_id: String::new(),
        };

        let json = serde_json::to_value(EmbedItemResponse::from(record)).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["textEmbedding"], serde_json::json!([0.5, 0.5]));
        assert!(json["imageEmbedding"].is_null());
        assert_eq!(json["hasImage"], false);
    }
}
