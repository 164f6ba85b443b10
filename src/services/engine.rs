use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};
use crate::core::{Matcher, TOP_K_MATCHES};
use crate::models::{ItemRecord, MatchResult, NewItem, RegistryCounts};
use crate::services::embedding::{item_text, EmbeddingProvider};
use crate::services::registry::ItemRegistry;

/// Errors surfaced to callers of the matching engine
#[derive(Debug, Error, PartialEq)]
pub enum MatchingError {
    #[error("Item not found: {0}")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

/// Matching engine facade
///
/// Owns the item registry and the embedding provider; both are injected so
/// tests can use isolated registries and stub providers.
#[derive(Clone)]
pub struct MatchingEngine {
    registry: Arc<ItemRegistry>,
    embeddings: Arc<dyn EmbeddingProvider>,
    matcher: Matcher,
    default_top_k: usize,
    max_top_k: usize,
}

impl MatchingEngine {
    pub fn new(
        registry: Arc<ItemRegistry>,
        embeddings: Arc<dyn EmbeddingProvider>,
        matcher: Matcher,
    ) -> Self {
        Self {
            registry,
            embeddings,
            matcher,
            default_top_k: TOP_K_MATCHES,
            max_top_k: usize::MAX,
        }
    }

    /// Override the default and maximum number of matches per query
    pub fn with_top_k(mut self, default_top_k: usize, max_top_k: usize) -> Self {
        self.max_top_k = max_top_k.max(1);
        self.default_top_k = default_top_k.clamp(1, self.max_top_k);
        self
    }

    pub fn matcher(&self) -> &Matcher {
        &self.matcher
    }

    pub fn registry(&self) -> &ItemRegistry {
        &self.registry
    }

    /// Register an item with precomputed embeddings
    ///
    /// Returns true when an earlier registration under the same id was replaced.
    pub fn register(&self, mut record: ItemRecord) -> Result<bool, MatchingError> {
        self.validate(&record)?;

        if !record.has_image {
            record.image_embedding = None;
        }

        let item_id = record.item_id.clone();
        let item_type = record.item_type;
        let replaced = self.registry.upsert(record);

        info!(
            "Registered {:?} item {} (replaced: {}, total: {})",
            item_type,
            item_id,
            replaced,
            self.registry.len()
        );

        Ok(replaced)
    }

    /// Compute embeddings for a raw item without registering it
    ///
    /// The text embedding covers title and description; an image embedding is
    /// computed only when non-empty image bytes are given.
    pub async fn embed_item(
        &self,
        item: NewItem,
        image: Option<Vec<u8>>,
    ) -> Result<ItemRecord, MatchingError> {
        if item.item_id.trim().is_empty() {
            return Err(MatchingError::InvalidRequest("itemId must not be empty".to_string()));
        }

        let text_embedding = self
            .embeddings
            .embed_text(&item_text(&item.title, &item.description))
            .await;

        let image_embedding = match image.as_deref() {
            Some(bytes) if !bytes.is_empty() => Some(self.embeddings.embed_image(bytes).await),
            _ => None,
        };

        debug!(
            "Computed embeddings for {} (image: {})",
            item.item_id,
            image_embedding.is_some()
        );

        Ok(ItemRecord {
            item_id: item.item_id,
            item_type: item.item_type,
            category: item.category,
            text_embedding,
            has_image: image_embedding.is_some(),
            image_embedding,
            title: item.title,
            description: item.description,
            user_id: item.user_id,
        })
    }

    /// Compute embeddings for a raw item and register it
    pub async fn register_raw(
        &self,
        item: NewItem,
        image: Option<Vec<u8>>,
    ) -> Result<(ItemRecord, bool), MatchingError> {
        let record = self.embed_item(item, image).await?;
        let replaced = self.register(record.clone())?;
        Ok((record, replaced))
    }

    fn validate(&self, record: &ItemRecord) -> Result<(), MatchingError> {
        if record.item_id.trim().is_empty() {
            return Err(MatchingError::InvalidRequest("itemId must not be empty".to_string()));
        }

        let text_dim = self.embeddings.text_dim();
        if record.text_embedding.len() != text_dim {
            return Err(MatchingError::InvalidRequest(format!(
                "textEmbedding has {} dimensions, expected {}",
                record.text_embedding.len(),
                text_dim
            )));
        }

        if record.has_image {
            let image_dim = self.embeddings.image_dim();
            match &record.image_embedding {
                Some(embedding) if embedding.len() == image_dim => {}
                Some(embedding) => {
                    return Err(MatchingError::InvalidRequest(format!(
                        "imageEmbedding has {} dimensions, expected {}",
                        embedding.len(),
                        image_dim
                    )));
                }
                None => {
                    return Err(MatchingError::InvalidRequest(
                        "hasImage is set but imageEmbedding is missing".to_string(),
                    ));
                }
            }
        }

        Ok(())
    }

    /// Remove an item. Returns false if it was not registered.
    pub fn unregister(&self, item_id: &str) -> bool {
        let existed = self.registry.delete(item_id);
        info!("Unregistered item {} (existed: {})", item_id, existed);
        existed
    }

    pub fn get(&self, item_id: &str) -> Result<ItemRecord, MatchingError> {
        self.registry
            .get(item_id)
            .ok_or_else(|| MatchingError::NotFound(item_id.to_string()))
    }

    pub fn items(&self) -> Vec<ItemRecord> {
        self.registry.list()
    }

    pub fn stats(&self) -> RegistryCounts {
        self.registry.counts()
    }

    /// Best matches for a registered item
    ///
    /// `top_k` defaults to the configured value and is capped at the
    /// configured maximum; `threshold` overrides the minimum confidence.
    pub fn find_matches_for(
        &self,
        item_id: &str,
        top_k: Option<usize>,
        threshold: Option<f64>,
    ) -> Result<Vec<MatchResult>, MatchingError> {
        let target = self.get(item_id)?;
        let top_k = top_k.unwrap_or(self.default_top_k).min(self.max_top_k);

        let snapshot = self.registry.list();
        let matches = self.matcher.find_matches(&target, &snapshot, top_k, threshold);

        info!(
            "Returning {} matches for {:?} item {} (from {} registered items)",
            matches.len(),
            target.item_type,
            item_id,
            snapshot.len()
        );

        Ok(matches)
    }

    /// All above-threshold lost/found pairings in the registry, best first
    pub fn match_all(&self, top_k: Option<usize>, threshold: Option<f64>) -> Vec<MatchResult> {
        let snapshot = self.registry.list();
        let matches = self.matcher.match_all(&snapshot, top_k, threshold);

        info!(
            "Batch matching returned {} matches over {} items",
            matches.len(),
            snapshot.len()
        );

        matches
    }

    /// Score two registered items against each other, oriented by type
    pub fn compare(&self, a_id: &str, b_id: &str) -> Result<MatchResult, MatchingError> {
        let a = self.get(a_id)?;
        let b = self.get(b_id)?;

        self.matcher.score(&a, &b).ok_or_else(|| {
            MatchingError::InvalidRequest(format!(
                "Items {} and {} are both {:?}; one LOST and one FOUND item are required",
                a_id, b_id, a.item_type
            ))
        })
    }
}
