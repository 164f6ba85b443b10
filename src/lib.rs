//! Lost & Found Matcher - matching engine for the lost-and-found app
//!
//! This library scores reported lost items against reported found items from
//! their text and image embeddings and ranks the candidate pairings.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{Matcher, TOP_K_MATCHES, calculate_match_score, cosine_similarity};
pub use crate::models::{ItemRecord, ItemType, MatchLevel, MatchResult, MatchResultResponse, ScoringWeights, MatchThresholds};
pub use crate::services::{EmbeddingProvider, ItemRegistry, MatchingEngine, MatchingError};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_exports() {
        // Verify that the library exports work correctly
        let sim = cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]);
        assert_eq!(sim, 1.0);
        assert_eq!(TOP_K_MATCHES, 3);
    }
}
