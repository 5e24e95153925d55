//! Error types for quarry-retrieval.

/// Errors that can occur during retrieval operations.
#[derive(Debug, thiserror::Error)]
pub enum RetrievalError {
    /// Embedding collaborator transport failure.
    #[error("embedding error: {0}")]
    Embed(#[from] quarry_embed::EmbedError),

    /// Vector store collaborator failure.
    #[error("vector store error: {0}")]
    VectorStore(#[from] quarry_store::VectorStoreError),

    /// Chunk metadata store failure.
    #[error("metadata store error: {0}")]
    Metadata(#[from] quarry_store::StoreError),
}

/// Result type alias using `RetrievalError`.
pub type Result<T> = std::result::Result<T, RetrievalError>;
