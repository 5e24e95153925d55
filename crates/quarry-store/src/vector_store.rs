use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;

#[derive(Debug, thiserror::Error)]
pub enum VectorStoreError {
    #[error("connection error: {0}")]
    Connection(String),
    #[error("collection error: {0}")]
    Collection(String),
    #[error("upsert error: {0}")]
    Upsert(String),
    #[error("search error: {0}")]
    Search(String),
    #[error("delete error: {0}")]
    Delete(String),
    #[error("scroll error: {0}")]
    Scroll(String),
    #[error("serialization error: {0}")]
    Serialization(String),
}

#[derive(Debug, Clone)]
pub struct VectorPoint {
    pub id: String,
    pub vector: Vec<f32>,
    pub payload: HashMap<String, serde_json::Value>,
}

/// Similarity search hit: cosine score plus the stored payload.
#[derive(Debug, Clone)]
pub struct ScoredPoint {
    pub id: String,
    pub score: f32,
    pub payload: HashMap<String, serde_json::Value>,
}

/// Scroll result: payload only, no score attached.
#[derive(Debug, Clone)]
pub struct PayloadPoint {
    pub id: String,
    pub payload: HashMap<String, serde_json::Value>,
}

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Per-repository collection name.
#[must_use]
pub fn repository_collection(repository_id: i64) -> String {
    format!("repo_{repository_id}")
}

pub trait VectorStore: Send + Sync {
    fn ensure_collection(
        &self,
        collection: &str,
        vector_size: u64,
    ) -> BoxFuture<'_, Result<(), VectorStoreError>>;

    fn collection_exists(&self, collection: &str) -> BoxFuture<'_, Result<bool, VectorStoreError>>;

    fn delete_collection(&self, collection: &str) -> BoxFuture<'_, Result<(), VectorStoreError>>;

    fn upsert(
        &self,
        collection: &str,
        points: Vec<VectorPoint>,
    ) -> BoxFuture<'_, Result<(), VectorStoreError>>;

    /// Similarity search returning at most `limit` hits scoring at or above
    /// `score_threshold`, best first.
    fn search(
        &self,
        collection: &str,
        vector: Vec<f32>,
        limit: u64,
        score_threshold: f32,
    ) -> BoxFuture<'_, Result<Vec<ScoredPoint>, VectorStoreError>>;

    /// Fetch every point whose payload `field` equals `value` exactly.
    /// No semantic component; used for retrieve-by-file lookups.
    fn scroll_by_filter(
        &self,
        collection: &str,
        field: &str,
        value: &str,
    ) -> BoxFuture<'_, Result<Vec<PayloadPoint>, VectorStoreError>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repository_collection_format() {
        assert_eq!(repository_collection(7), "repo_7");
        assert_eq!(repository_collection(12345), "repo_12345");
    }
}
