//! Embedding Provider
//!
//! Abstraction over text-to-vector models. The retrieval layer treats
//! embedding as an opaque function; the only assumption is that one
//! provider instance always returns vectors of the same dimensionality.

use async_trait::async_trait;
use std::collections::HashMap;

use crate::error::{Result, RetrievalError};

/// Embedding provider trait (Strategy pattern)
///
/// Implement this for each backend: Ollama, OpenAI, Voyage, etc.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Convert text to a fixed-length vector
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;
}

/// Static embedding provider with fixed vectors per text
///
/// For testing and demo purposes. Unknown texts fall back to the
/// configured default vector, or fail if none is set.
#[derive(Default)]
pub struct StaticEmbedder {
    vectors: HashMap<String, Vec<f32>>,
    fallback: Option<Vec<f32>>,
}

impl StaticEmbedder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_vector(mut self, text: impl Into<String>, vector: Vec<f32>) -> Self {
        self.vectors.insert(text.into(), vector);
        self
    }

    pub fn with_fallback(mut self, vector: Vec<f32>) -> Self {
        self.fallback = Some(vector);
        self
    }
}

#[async_trait]
impl EmbeddingProvider for StaticEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.vectors
            .get(text)
            .or(self.fallback.as_ref())
            .cloned()
            .ok_or_else(|| RetrievalError::Embedding(format!("no embedding for text: {text}")))
    }
}
