use crate::error::EmbedError;

/// Backend that turns text into an embedding vector.
pub trait EmbeddingProvider: Send + Sync {
    /// Embed a single text into a vector.
    ///
    /// An empty vector means the backend produced no usable embedding for
    /// this text; callers must treat it as a soft failure and degrade.
    ///
    /// # Errors
    ///
    /// Returns an error only on transport-level failure (connection refused,
    /// malformed response body).
    fn embed(&self, text: &str) -> impl Future<Output = Result<Vec<f32>, EmbedError>> + Send;

    fn name(&self) -> &'static str;
}
