//! Qdrant-backed implementation of the [`VectorStore`] collaborator.

use std::collections::HashMap;

use qdrant_client::Qdrant;
use qdrant_client::qdrant::{
    Condition, CreateCollectionBuilder, Distance, Filter, PointId, PointStruct,
    ScrollPointsBuilder, SearchPointsBuilder, UpsertPointsBuilder, VectorParamsBuilder,
};

use crate::vector_store::{PayloadPoint, ScoredPoint, VectorPoint, VectorStore, VectorStoreError};

type QdrantResult<T> = Result<T, Box<qdrant_client::QdrantError>>;

const SCROLL_PAGE_SIZE: u32 = 100;

/// Thin wrapper over the [`Qdrant`] client encapsulating the collection
/// operations the retrieval pipeline needs.
#[derive(Clone)]
pub struct QdrantVectorStore {
    client: Qdrant,
}

impl std::fmt::Debug for QdrantVectorStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QdrantVectorStore").finish_non_exhaustive()
    }
}

impl QdrantVectorStore {
    /// Create a new store connected to the given URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the Qdrant client cannot be created.
    pub fn new(url: &str) -> QdrantResult<Self> {
        let client = Qdrant::from_url(url).build().map_err(Box::new)?;
        Ok(Self { client })
    }

    /// Ensure a collection exists with cosine distance vectors.
    ///
    /// Idempotent: no-op if the collection already exists.
    ///
    /// # Errors
    ///
    /// Returns an error if Qdrant cannot be reached or collection creation fails.
    pub async fn ensure_collection(&self, collection: &str, vector_size: u64) -> QdrantResult<()> {
        if self
            .client
            .collection_exists(collection)
            .await
            .map_err(Box::new)?
        {
            return Ok(());
        }
        self.client
            .create_collection(
                CreateCollectionBuilder::new(collection)
                    .vectors_config(VectorParamsBuilder::new(vector_size, Distance::Cosine)),
            )
            .await
            .map_err(Box::new)?;
        tracing::info!(collection, vector_size, "created collection");
        Ok(())
    }

    /// Check whether a collection exists.
    ///
    /// # Errors
    ///
    /// Returns an error if Qdrant cannot be reached.
    pub async fn collection_exists(&self, collection: &str) -> QdrantResult<bool> {
        self.client
            .collection_exists(collection)
            .await
            .map_err(Box::new)
    }

    /// Delete a collection and all its points.
    ///
    /// # Errors
    ///
    /// Returns an error if the collection cannot be deleted.
    pub async fn delete_collection(&self, collection: &str) -> QdrantResult<()> {
        self.client
            .delete_collection(collection)
            .await
            .map_err(Box::new)?;
        Ok(())
    }

    /// Upsert points into a collection.
    ///
    /// # Errors
    ///
    /// Returns an error if payload conversion or the upsert fails.
    pub async fn upsert(
        &self,
        collection: &str,
        points: Vec<VectorPoint>,
    ) -> Result<(), VectorStoreError> {
        let mut structs = Vec::with_capacity(points.len());
        for p in points {
            let payload = json_map_to_payload(p.payload)
                .map_err(|e| VectorStoreError::Serialization(e.to_string()))?;
            structs.push(PointStruct::new(p.id, p.vector, payload));
        }
        self.client
            .upsert_points(UpsertPointsBuilder::new(collection, structs))
            .await
            .map_err(|e| VectorStoreError::Upsert(e.to_string()))?;
        Ok(())
    }

    /// Similarity search with a score threshold, payloads included.
    ///
    /// # Errors
    ///
    /// Returns an error if the search fails.
    pub async fn search(
        &self,
        collection: &str,
        vector: Vec<f32>,
        limit: u64,
        score_threshold: f32,
    ) -> Result<Vec<ScoredPoint>, VectorStoreError> {
        let builder = SearchPointsBuilder::new(collection, vector, limit)
            .score_threshold(score_threshold)
            .with_payload(true);

        let results = self
            .client
            .search_points(builder)
            .await
            .map_err(|e| VectorStoreError::Search(e.to_string()))?;

        results
            .result
            .into_iter()
            .map(|point| {
                let payload = payload_to_json(point.payload)?;
                Ok(ScoredPoint {
                    id: point_id_string(point.id),
                    score: point.score,
                    payload,
                })
            })
            .collect()
    }

    /// Scroll every point whose payload `field` equals `value`, following
    /// `next_page_offset` until the collection is exhausted.
    ///
    /// # Errors
    ///
    /// Returns an error if the scroll operation fails.
    pub async fn scroll_by_filter(
        &self,
        collection: &str,
        field: &str,
        value: &str,
    ) -> Result<Vec<PayloadPoint>, VectorStoreError> {
        let mut out = Vec::new();
        let mut offset: Option<PointId> = None;

        loop {
            let mut builder = ScrollPointsBuilder::new(collection)
                .filter(Filter::must(vec![Condition::matches(
                    field,
                    value.to_owned(),
                )]))
                .with_payload(true)
                .with_vectors(false)
                .limit(SCROLL_PAGE_SIZE);

            if let Some(ref off) = offset {
                builder = builder.offset(off.clone());
            }

            let response = self
                .client
                .scroll(builder)
                .await
                .map_err(|e| VectorStoreError::Scroll(e.to_string()))?;

            for point in response.result {
                let payload = payload_to_json(point.payload)?;
                out.push(PayloadPoint {
                    id: point_id_string(point.id),
                    payload,
                });
            }

            match response.next_page_offset {
                Some(next) => offset = Some(next),
                None => break,
            }
        }

        Ok(out)
    }
}

fn point_id_string(id: Option<PointId>) -> String {
    use qdrant_client::qdrant::point_id::PointIdOptions;

    match id.and_then(|p| p.point_id_options) {
        Some(PointIdOptions::Uuid(u)) => u,
        Some(PointIdOptions::Num(n)) => n.to_string(),
        None => String::new(),
    }
}

/// Convert a JSON map to a Qdrant payload map.
fn json_map_to_payload(
    map: HashMap<String, serde_json::Value>,
) -> Result<HashMap<String, qdrant_client::qdrant::Value>, serde_json::Error> {
    serde_json::from_value(serde_json::Value::Object(map.into_iter().collect()))
}

/// Convert a Qdrant payload map back to plain JSON values.
fn payload_to_json(
    payload: HashMap<String, qdrant_client::qdrant::Value>,
) -> Result<HashMap<String, serde_json::Value>, VectorStoreError> {
    payload
        .into_iter()
        .map(|(k, v)| {
            let json = serde_json::to_value(v)
                .map_err(|e| VectorStoreError::Serialization(e.to_string()))?;
            Ok((k, json))
        })
        .collect()
}

impl VectorStore for QdrantVectorStore {
    fn ensure_collection(
        &self,
        collection: &str,
        vector_size: u64,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<(), VectorStoreError>> + Send + '_>,
    > {
        let collection = collection.to_owned();
        Box::pin(async move {
            self.ensure_collection(&collection, vector_size)
                .await
                .map_err(|e| VectorStoreError::Collection(e.to_string()))
        })
    }

    fn collection_exists(
        &self,
        collection: &str,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<bool, VectorStoreError>> + Send + '_>,
    > {
        let collection = collection.to_owned();
        Box::pin(async move {
            self.collection_exists(&collection)
                .await
                .map_err(|e| VectorStoreError::Collection(e.to_string()))
        })
    }

    fn delete_collection(
        &self,
        collection: &str,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<(), VectorStoreError>> + Send + '_>,
    > {
        let collection = collection.to_owned();
        Box::pin(async move {
            self.delete_collection(&collection)
                .await
                .map_err(|e| VectorStoreError::Delete(e.to_string()))
        })
    }

    fn upsert(
        &self,
        collection: &str,
        points: Vec<VectorPoint>,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<(), VectorStoreError>> + Send + '_>,
    > {
        let collection = collection.to_owned();
        Box::pin(async move { self.upsert(&collection, points).await })
    }

    fn search(
        &self,
        collection: &str,
        vector: Vec<f32>,
        limit: u64,
        score_threshold: f32,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Vec<ScoredPoint>, VectorStoreError>> + Send + '_>,
    > {
        let collection = collection.to_owned();
        Box::pin(async move {
            self.search(&collection, vector, limit, score_threshold)
                .await
        })
    }

    fn scroll_by_filter(
        &self,
        collection: &str,
        field: &str,
        value: &str,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Vec<PayloadPoint>, VectorStoreError>> + Send + '_>,
    > {
        let collection = collection.to_owned();
        let field = field.to_owned();
        let value = value.to_owned();
        Box::pin(async move { self.scroll_by_filter(&collection, &field, &value).await })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_roundtrip_preserves_fields() {
        let map: HashMap<String, serde_json::Value> = HashMap::from([
            ("file_path".into(), serde_json::json!("src/app.py")),
            ("start_line".into(), serde_json::json!(10)),
        ]);
        let payload = json_map_to_payload(map).unwrap();
        let back = payload_to_json(payload).unwrap();
        assert_eq!(back.get("file_path").unwrap(), "src/app.py");
        assert_eq!(back.get("start_line").unwrap(), 10);
    }

    #[test]
    fn point_id_string_variants() {
        use qdrant_client::qdrant::point_id::PointIdOptions;

        assert_eq!(point_id_string(None), "");
        let uuid = PointId {
            point_id_options: Some(PointIdOptions::Uuid("abc".into())),
        };
        assert_eq!(point_id_string(Some(uuid)), "abc");
        let num = PointId {
            point_id_options: Some(PointIdOptions::Num(42)),
        };
        assert_eq!(point_id_string(Some(num)), "42");
    }

    #[test]
    fn debug_format() {
        let Ok(store) = QdrantVectorStore::new("http://localhost:6334") else {
            return;
        };
        assert!(format!("{store:?}").contains("QdrantVectorStore"));
    }
}
