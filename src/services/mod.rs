// Service exports
pub mod embedding;
pub mod engine;
pub mod registry;

pub use embedding::{EmbeddingProvider, EmbeddingError, RemoteEmbeddingProvider, ZeroEmbeddingProvider, item_text, TEXT_EMBEDDING_DIM, IMAGE_EMBEDDING_DIM};
pub use engine::{MatchingEngine, MatchingError};
pub use registry::ItemRegistry;
