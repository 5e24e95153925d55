//! Storage collaborators for Quarry: Qdrant vector search and `SQLite`
//! chunk metadata.
//!
//! Each registered repository owns one Qdrant collection
//! (`repo_{repository_id}`); chunk line ranges are mirrored into `SQLite`
//! so stack-trace lookups can run without a vector query.

pub mod error;
pub mod in_memory;
pub mod metadata;
pub mod qdrant;
pub mod vector_store;

pub use error::StoreError;
pub use in_memory::InMemoryVectorStore;
pub use metadata::{ChunkMetadataStore, ChunkRow};
pub use qdrant::QdrantVectorStore;
pub use vector_store::{
    PayloadPoint, ScoredPoint, VectorPoint, VectorStore, VectorStoreError, repository_collection,
};
