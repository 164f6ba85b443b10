// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{ItemType, ItemRecord, NewItem, MatchLevel, MatchResult, ScoringWeights, MatchThresholds, RegistryCounts};
pub use requests::{RegisterItemRequest, EmbedItemRequest, FindMatchesRequest, CompareRequest, MatchAllQuery};
pub use responses::{MatchResultResponse, MatchesResponse, CompareResponse, RegisterItemResponse, EmbedItemResponse, UnregisterResponse, StatsResponse, HealthResponse, ErrorResponse};
