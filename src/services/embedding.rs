use async_trait::async_trait;
use reqwest::{header::CONTENT_TYPE, Client};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use thiserror::Error;

/// Output dimension of the sentence embedding model (all-MiniLM-L6-v2)
pub const TEXT_EMBEDDING_DIM: usize = 384;

/// Output dimension of the image feature extractor (EfficientNetB0, avg-pooled)
pub const IMAGE_EMBEDDING_DIM: usize = 1280;

/// Errors that can occur when talking to the embedding service
#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Embedding service returned error: {0}")]
    ApiError(String),

    #[error("Embedding has {got} dimensions, expected {expected}")]
    DimensionMismatch { expected: usize, got: usize },
}

/// Source of text and image embeddings
///
/// Both operations are total: empty input or any failure yields a zero vector
/// of the provider's dimension, which every similarity treats as "no signal".
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    fn text_dim(&self) -> usize;

    fn image_dim(&self) -> usize;

    async fn embed_text(&self, text: &str) -> Vec<f32>;

    async fn embed_image(&self, image: &[u8]) -> Vec<f32>;
}

/// Text that represents an item for embedding purposes
pub fn item_text(title: &str, description: &str) -> String {
    if description.trim().is_empty() {
        title.to_string()
    } else {
        format!("{}. {}", title, description)
    }
}

/// Provider that always answers with zero vectors.
///
/// Used when no embedding service is configured: clients must then supply
/// embeddings themselves on registration.
#[derive(Debug, Clone, Copy)]
pub struct ZeroEmbeddingProvider {
    text_dim: usize,
    image_dim: usize,
}

impl ZeroEmbeddingProvider {
    pub fn new(text_dim: usize, image_dim: usize) -> Self {
        Self { text_dim, image_dim }
    }
}

impl Default for ZeroEmbeddingProvider {
    fn default() -> Self {
        Self::new(TEXT_EMBEDDING_DIM, IMAGE_EMBEDDING_DIM)
    }
}

#[async_trait]
impl EmbeddingProvider for ZeroEmbeddingProvider {
    fn text_dim(&self) -> usize {
        self.text_dim
    }

    fn image_dim(&self) -> usize {
        self.image_dim
    }

    async fn embed_text(&self, _text: &str) -> Vec<f32> {
        vec![0.0; self.text_dim]
    }

    async fn embed_image(&self, _image: &[u8]) -> Vec<f32> {
        vec![0.0; self.image_dim]
    }
}

#[derive(Debug, Deserialize)]
struct EmbeddingReply {
    embedding: Vec<f32>,
}

/// Client for an external model-serving endpoint
///
/// Protocol:
/// - `POST {base_url}/embeddings/text` with `{"text": "..."}`
/// - `POST {base_url}/embeddings/image` with the raw image bytes
///
/// Both reply `{"embedding": [...]}`. Text embeddings are memoised in memory.
pub struct RemoteEmbeddingProvider {
    base_url: String,
    client: Client,
    text_dim: usize,
    image_dim: usize,
    text_cache: moka::future::Cache<String, Vec<f32>>,
}

impl RemoteEmbeddingProvider {
    pub fn new(
        base_url: impl Into<String>,
        text_dim: usize,
        image_dim: usize,
        timeout_secs: u64,
        cache_size: u64,
    ) -> Result<Self, EmbeddingError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        let text_cache = moka::future::CacheBuilder::new(cache_size).build();

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
            text_dim,
            image_dim,
            text_cache,
        })
    }

    async fn request_text(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let response = self
            .client
            .post(format!("{}/embeddings/text", self.base_url))
            .json(&json!({ "text": text }))
            .send()
            .await?;

        Self::read_embedding(response, self.text_dim).await
    }

    async fn request_image(&self, image: &[u8]) -> Result<Vec<f32>, EmbeddingError> {
        let response = self
            .client
            .post(format!("{}/embeddings/image", self.base_url))
            .header(CONTENT_TYPE, "application/octet-stream")
            .body(image.to_vec())
            .send()
            .await?;

        Self::read_embedding(response, self.image_dim).await
    }

    async fn read_embedding(
        response: reqwest::Response,
        expected: usize,
    ) -> Result<Vec<f32>, EmbeddingError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EmbeddingError::ApiError(format!("{}: {}", status, body)));
        }

        let reply: EmbeddingReply = response.json().await?;
        if reply.embedding.len() != expected {
            return Err(EmbeddingError::DimensionMismatch {
                expected,
                got: reply.embedding.len(),
            });
        }

        Ok(reply.embedding)
    }
}

#[async_trait]
impl EmbeddingProvider for RemoteEmbeddingProvider {
    fn text_dim(&self) -> usize {
        self.text_dim
    }

    fn image_dim(&self) -> usize {
        self.image_dim
    }

    async fn embed_text(&self, text: &str) -> Vec<f32> {
        if text.trim().is_empty() {
            return vec![0.0; self.text_dim];
        }

        if let Some(embedding) = self.text_cache.get(text).await {
            tracing::trace!("Text embedding cache hit");
            return embedding;
        }

        match self.request_text(text).await {
            Ok(embedding) => {
                self.text_cache.insert(text.to_string(), embedding.clone()).await;
                embedding
            }
            Err(e) => {
                tracing::warn!("Text embedding failed, using zero vector: {}", e);
                vec![0.0; self.text_dim]
            }
        }
    }

    async fn embed_image(&self, image: &[u8]) -> Vec<f32> {
        if image.is_empty() {
            return vec![0.0; self.image_dim];
        }

        match self.request_image(image).await {
            Ok(embedding) => embedding,
            Err(e) => {
                tracing::warn!("Image embedding failed, using zero vector: {}", e);
                vec![0.0; self.image_dim]
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_text() {
        assert_eq!(item_text("Black wallet", "Leather, two cards"), "Black wallet. Leather, two cards");
        assert_eq!(item_text("Black wallet", ""), "Black wallet");
    }

    #[tokio::test]
    async fn test_zero_provider_dimensions() {
        let provider = ZeroEmbeddingProvider::default();
        assert_eq!(provider.embed_text("anything").await.len(), TEXT_EMBEDDING_DIM);
        assert_eq!(provider.embed_image(b"bytes").await.len(), IMAGE_EMBEDDING_DIM);
    }

    #[tokio::test]
    async fn test_remote_text_embedding_is_cached() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/embeddings/text")
            .match_body(mockito::Matcher::Json(json!({ "text": "black wallet" })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"embedding": [0.1, 0.2, 0.3]}"#)
            .expect(1)
            .create_async()
            .await;

        let provider = RemoteEmbeddingProvider::new(server.url(), 3, 4, 5, 100).unwrap();

        let first = provider.embed_text("black wallet").await;
        let second = provider.embed_text("black wallet").await;

        assert_eq!(first, vec![0.1, 0.2, 0.3]);
        assert_eq!(first, second);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_remote_failure_yields_zero_vector() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/embeddings/image")
            .with_status(500)
            .with_body("model unavailable")
            .create_async()
            .await;

        let provider = RemoteEmbeddingProvider::new(server.url(), 3, 4, 5, 100).unwrap();

        assert_eq!(provider.embed_image(b"\xff\xd8").await, vec![0.0; 4]);
    }

    #[tokio::test]
    async fn test_remote_wrong_dimension_yields_zero_vector() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/embeddings/text")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"embedding": [1.0, 2.0]}"#)
            .create_async()
            .await;

        let provider = RemoteEmbeddingProvider::new(server.url(), 3, 4, 5, 100).unwrap();

        assert_eq!(provider.embed_text("umbrella").await, vec![0.0; 3]);
    }

    #[tokio::test]
    async fn test_remote_skips_empty_input() {
        let server = mockito::Server::new_async().await;
        let provider = RemoteEmbeddingProvider::new(server.url(), 3, 4, 5, 100).unwrap();

        assert_eq!(provider.embed_text("   ").await, vec![0.0; 3]);
        assert_eq!(provider.embed_image(&[]).await, vec![0.0; 4]);
    }
}
