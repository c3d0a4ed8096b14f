//! Embedding generation
//!
//! This module provides an abstraction over embedding providers with:
//! - A trait for different embedding backends
//! - An OpenAI-compatible HTTP backend
//! - Transient vs fatal failure classification for the retry policy

mod http_backend;

pub use http_backend::*;

use crate::config::EmbeddingConfig;
use crate::error::Result;
use async_trait::async_trait;

/// Trait for embedding providers.
///
/// Contract: the returned vectors have the same length and order as the
/// input texts. Implementations signal transient failures as
/// `Error::Provider` (retryable) and everything else as
/// `Error::ProviderFatal`.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed a batch of texts
    async fn embed(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>>;

    /// Get the embedding dimension
    fn dimension(&self) -> usize;

    /// Get the model name
    fn model_name(&self) -> &str;
}

/// Create an embedder based on configuration
pub fn create_embedder(config: &EmbeddingConfig, api_key: Option<String>) -> Result<Box<dyn Embedder>> {
    let embedder = HttpEmbedder::new(config, api_key)?;
    Ok(Box::new(embedder))
}
