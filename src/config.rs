use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;
use crate::models::{MatchThresholds, ScoringWeights};
use crate::services::embedding::{IMAGE_EMBEDDING_DIM, TEXT_EMBEDDING_DIM};

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub embedding: EmbeddingSettings,
    #[serde(default)]
    pub matching: MatchingSettings,
    #[serde(default)]
    pub scoring: ScoringSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub workers: Option<usize>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: None,
        }
    }
}

fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 5000 }

/// External embedding service. Without an endpoint, clients must register
/// items with precomputed embeddings.
#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingSettings {
    pub endpoint: Option<String>,
    #[serde(default = "default_text_dim")]
    pub text_dim: usize,
    #[serde(default = "default_image_dim")]
    pub image_dim: usize,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_cache_size")]
    pub cache_size: u64,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            endpoint: None,
            text_dim: default_text_dim(),
            image_dim: default_image_dim(),
            timeout_secs: default_timeout_secs(),
            cache_size: default_cache_size(),
        }
    }
}

fn default_text_dim() -> usize { TEXT_EMBEDDING_DIM }
fn default_image_dim() -> usize { IMAGE_EMBEDDING_DIM }
fn default_timeout_secs() -> u64 { 30 }
fn default_cache_size() -> u64 { 10_000 }

#[derive(Debug, Clone, Deserialize)]
pub struct MatchingSettings {
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    #[serde(default = "default_max_top_k")]
    pub max_top_k: usize,
    #[serde(default = "default_match_threshold")]
    pub match_threshold: f64,
    #[serde(default = "default_high_match_threshold")]
    pub high_match_threshold: f64,
}

impl Default for MatchingSettings {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            max_top_k: default_max_top_k(),
            match_threshold: default_match_threshold(),
            high_match_threshold: default_high_match_threshold(),
        }
    }
}

impl MatchingSettings {
    pub fn thresholds(&self) -> MatchThresholds {
        MatchThresholds {
            match_threshold: self.match_threshold,
            high_match_threshold: self.high_match_threshold,
        }
    }
}

fn default_top_k() -> usize { 3 }
fn default_max_top_k() -> usize { 50 }
fn default_match_threshold() -> f64 { 0.6 }
fn default_high_match_threshold() -> f64 { 0.8 }

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScoringSettings {
    #[serde(default)]
    pub weights: WeightsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WeightsConfig {
    #[serde(default = "default_image_weight")]
    pub image: f64,
    #[serde(default = "default_text_weight")]
    pub text: f64,
    #[serde(default = "default_category_weight")]
    pub category: f64,
    /// Text weight when the image term is dropped
    #[serde(default = "default_fallback_text_weight")]
    pub fallback_text: f64,
    /// Category weight when the image term is dropped
    #[serde(default = "default_fallback_category_weight")]
    pub fallback_category: f64,
}

impl Default for WeightsConfig {
    fn default() -> Self {
        Self {
            image: default_image_weight(),
            text: default_text_weight(),
            category: default_category_weight(),
            fallback_text: default_fallback_text_weight(),
            fallback_category: default_fallback_category_weight(),
        }
    }
}

impl From<&WeightsConfig> for ScoringWeights {
    fn from(weights: &WeightsConfig) -> Self {
        Self {
            image: weights.image,
            text: weights.text,
            category: weights.category,
            fallback_text: weights.fallback_text,
            fallback_category: weights.fallback_category,
        }
    }
}

fn default_image_weight() -> f64 { 0.5 }
fn default_text_weight() -> f64 { 0.3 }
fn default_category_weight() -> f64 { 0.2 }
fn default_fallback_text_weight() -> f64 { 0.6 }
fn default_fallback_category_weight() -> f64 { 0.4 }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with LOSTFOUND__)
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., LOSTFOUND__SERVER__PORT -> server.port
            .add_source(environment())
            .build()?;

        let settings: Self = settings.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(environment())
            .build()?;

        let settings: Self = settings.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let matching = &self.matching;
        if !(0.0..=1.0).contains(&matching.match_threshold)
            || !(0.0..=1.0).contains(&matching.high_match_threshold)
            || matching.high_match_threshold < matching.match_threshold
        {
            return Err(ConfigError::Message(format!(
                "invalid thresholds: match={}, high={}",
                matching.match_threshold, matching.high_match_threshold
            )));
        }

        if matching.top_k == 0 || matching.max_top_k < matching.top_k {
            return Err(ConfigError::Message(format!(
                "invalid top_k: top_k={}, max_top_k={}",
                matching.top_k, matching.max_top_k
            )));
        }

        Ok(())
    }
}

fn environment() -> Environment {
    Environment::with_prefix("LOSTFOUND")
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}
