//! Test-only mock embedding provider.

use crate::error::EmbedError;
use crate::provider::EmbeddingProvider;

#[derive(Debug, Clone)]
pub struct MockEmbedder {
    pub embedding: Vec<f32>,
    pub fail: bool,
}

impl Default for MockEmbedder {
    fn default() -> Self {
        Self {
            embedding: vec![0.0; 384],
            fail: false,
        }
    }
}

impl MockEmbedder {
    #[must_use]
    pub fn with_embedding(embedding: Vec<f32>) -> Self {
        Self {
            embedding,
            fail: false,
        }
    }

    /// Provider whose backend yields no embedding (the soft failure mode).
    #[must_use]
    pub fn empty() -> Self {
        Self::with_embedding(Vec::new())
    }

    /// Provider whose transport fails outright.
    #[must_use]
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }
}

impl EmbeddingProvider for MockEmbedder {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>, EmbedError> {
        if self.fail {
            return Err(EmbedError::Other("mock embed error".into()));
        }
        Ok(self.embedding.clone())
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn default_returns_vector() {
        let e = MockEmbedder::default();
        let v = e.embed("anything").await.unwrap();
        assert_eq!(v.len(), 384);
    }

    #[tokio::test]
    async fn empty_returns_empty_vector() {
        let v = MockEmbedder::empty().embed("x").await.unwrap();
        assert!(v.is_empty());
    }

    #[tokio::test]
    async fn failing_returns_error() {
        assert!(MockEmbedder::failing().embed("x").await.is_err());
    }
}
