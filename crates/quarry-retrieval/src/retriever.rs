//! Retrieval orchestrator: semantic search plus the lexical, structural
//! and trace-driven layers on top of it.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::time::Duration;

use quarry_embed::EmbeddingProvider;
use quarry_store::{ChunkMetadataStore, VectorStore, repository_collection};
use tracing::{debug, warn};

use crate::cache::{ResultCache, cache_key};
use crate::chunk::RetrievedChunk;
use crate::error::Result;
use crate::{dedup, format, imports, ranking, trace};

/// Result count when the caller does not specify one.
pub const DEFAULT_TOP_K: usize = 10;

/// Hard cap on requested result counts.
pub const MAX_TOP_K: usize = 50;

/// Minimum similarity score when the caller does not specify one.
pub const DEFAULT_THRESHOLD: f32 = 0.4;

/// Tuning knobs for a [`Retriever`].
#[derive(Debug, Clone)]
pub struct RetrieverConfig {
    /// Directory repositories are cloned under; indexed payloads may carry
    /// paths prefixed with `{clone_root}/{repository_id}/`.
    pub clone_root: String,
    /// TTL for cached result sets.
    pub cache_ttl: Duration,
    /// Token budget for [`Retriever::format_context`].
    pub max_context_tokens: usize,
}

impl Default for RetrieverConfig {
    fn default() -> Self {
        Self {
            clone_root: "/tmp/repos".to_owned(),
            cache_ttl: Duration::from_secs(300),
            max_context_tokens: format::DEFAULT_MAX_TOKENS,
        }
    }
}

/// Retrieves indexed code chunks for a repository.
///
/// Holds the embedding provider, the vector store, the chunk metadata
/// mirror and a TTL result cache. All retrieval entry points degrade to
/// empty results when the embedding backend yields nothing or the
/// repository has no collection; collaborator transport errors propagate.
pub struct Retriever<E: EmbeddingProvider> {
    embedder: E,
    vector_store: Arc<dyn VectorStore>,
    metadata: ChunkMetadataStore,
    cache: ResultCache,
    config: RetrieverConfig,
}

impl<E: EmbeddingProvider> std::fmt::Debug for Retriever<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Retriever")
            .field("embedder", &self.embedder.name())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<E: EmbeddingProvider> Retriever<E> {
    #[must_use]
    pub fn new(
        embedder: E,
        vector_store: Arc<dyn VectorStore>,
        metadata: ChunkMetadataStore,
        config: RetrieverConfig,
    ) -> Self {
        let cache = ResultCache::new(config.cache_ttl);
        Self {
            embedder,
            vector_store,
            metadata,
            cache,
            config,
        }
    }

    /// Pure semantic retrieval: embed the query and return the best chunks
    /// at or above `score_threshold`, score-descending.
    ///
    /// `top_k` is capped at [`MAX_TOP_K`]. Results are cached per
    /// repository, query and parameters.
    ///
    /// # Errors
    ///
    /// Returns an error if the embedding backend or vector store fails.
    pub async fn retrieve_relevant_chunks(
        &self,
        repository_id: i64,
        query: &str,
        top_k: usize,
        score_threshold: f32,
    ) -> Result<Vec<RetrievedChunk>> {
        let top_k = top_k.min(MAX_TOP_K);
        let key = cache_key(
            repository_id,
            &format!("vector:{query}:{top_k}:{score_threshold}"),
        );
        if let Some(hit) = self.cache.get(&key) {
            debug!(repository_id, top_k, "retrieval cache hit");
            return Ok(hit);
        }

        let chunks = self
            .semantic_search(repository_id, query, top_k, score_threshold)
            .await?;
        self.cache.put(key, chunks.clone());
        Ok(chunks)
    }

    /// Semantic retrieval re-ranked by keyword boosts.
    ///
    /// Over-fetches (three times `top_k`, capped at [`MAX_TOP_K`]) so that
    /// lexical matches just below the semantic cutoff can surface, then
    /// boosts name and path matches and keeps the top `top_k`.
    ///
    /// # Errors
    ///
    /// Returns an error if the embedding backend or vector store fails.
    pub async fn hybrid_search(
        &self,
        repository_id: i64,
        query: &str,
        top_k: usize,
    ) -> Result<Vec<RetrievedChunk>> {
        let top_k = top_k.min(MAX_TOP_K);
        let key = cache_key(repository_id, &format!("hybrid:{query}:{top_k}"));
        if let Some(hit) = self.cache.get(&key) {
            debug!(repository_id, top_k, "hybrid cache hit");
            return Ok(hit);
        }

        // Candidates come through the vector-level operation so the
        // over-fetched set lands in its cache and is shared with plain
        // semantic retrieval.
        let fetch_k = (top_k * 3).min(MAX_TOP_K);
        let candidates = self
            .retrieve_relevant_chunks(repository_id, query, fetch_k, DEFAULT_THRESHOLD)
            .await?;
        let ranked = ranking::rerank(candidates, query, top_k);
        self.cache.put(key, ranked.clone());
        Ok(ranked)
    }

    /// Hybrid search expanded with the files the hits import.
    ///
    /// Primaries come from [`Self::hybrid_search`], so keyword boosts decide
    /// which chunks seed the expansion. Import candidates are resolved from
    /// each primary's source text and probed with
    /// [`Self::retrieve_by_file_path`]; imported chunks carry score 1.0 and
    /// the merged set is deduplicated by location.
    ///
    /// # Errors
    ///
    /// Returns an error if the embedding backend or vector store fails.
    pub async fn retrieve_with_context(
        &self,
        repository_id: i64,
        query: &str,
        top_k: usize,
    ) -> Result<Vec<RetrievedChunk>> {
        let base = self.hybrid_search(repository_id, query, top_k).await?;

        // BTreeSet: dedup across chunks and probe in a stable order.
        let mut candidates = BTreeSet::new();
        for chunk in &base {
            if let Some(language) = &chunk.language {
                candidates.extend(imports::resolve(&chunk.content, &chunk.file_path, language));
            }
        }
        debug!(
            repository_id,
            base = base.len(),
            imports = candidates.len(),
            "expanding context via imports"
        );

        let mut merged = base;
        for path in candidates {
            merged.extend(self.retrieve_by_file_path(repository_id, &path).await?);
        }
        Ok(dedup::by_location(merged))
    }

    /// Retrieval driven by a stack trace.
    ///
    /// The first line of the log serves as a semantic query with default
    /// parameters; every file/line reference parsed from the trace
    /// is then resolved through the metadata mirror to the chunks covering
    /// that exact line, which join the result at score 1.0.
    ///
    /// # Errors
    ///
    /// Returns an error if the embedding backend, vector store or metadata
    /// store fails.
    pub async fn retrieve_by_error_trace(
        &self,
        repository_id: i64,
        error_log: &str,
    ) -> Result<Vec<RetrievedChunk>> {
        let summary = error_log.lines().next().map_or("", str::trim);

        let mut merged = if summary.is_empty() {
            Vec::new()
        } else {
            self.retrieve_relevant_chunks(repository_id, summary, DEFAULT_TOP_K, DEFAULT_THRESHOLD)
                .await?
        };

        let references = trace::parse(error_log);
        debug!(
            repository_id,
            references = references.len(),
            "parsed trace references"
        );

        // One file-path lookup per distinct file, shared across references.
        let mut by_file: HashMap<String, Vec<RetrievedChunk>> = HashMap::new();
        for reference in &references {
            let fragment = reference
                .file
                .rsplit('/')
                .next()
                .unwrap_or(reference.file.as_str());
            let rows = self
                .metadata
                .find_covering(repository_id, fragment, i64::from(reference.line))
                .await?;

            for row in rows {
                if !by_file.contains_key(&row.file_path) {
                    let fetched = self
                        .retrieve_by_file_path(repository_id, &row.file_path)
                        .await?;
                    by_file.insert(row.file_path.clone(), fetched);
                }
                let Some(file_chunks) = by_file.get(&row.file_path) else {
                    continue;
                };
                for chunk in file_chunks {
                    if chunk.covers_line(reference.line) {
                        let mut hit = chunk.clone();
                        hit.score = 1.0;
                        merged.push(hit);
                    }
                }
            }
        }

        Ok(dedup::by_location(merged))
    }

    /// Fetch every chunk of one file via payload filtering, no semantic
    /// component. Chunks carry score 1.0 and come back in line order.
    ///
    /// The exact path is probed first; when the index stores clone-rooted
    /// absolute paths, a second probe with the repository's clone prefix
    /// catches them.
    ///
    /// # Errors
    ///
    /// Returns an error if the vector store fails.
    pub async fn retrieve_by_file_path(
        &self,
        repository_id: i64,
        file_path: &str,
    ) -> Result<Vec<RetrievedChunk>> {
        let collection = repository_collection(repository_id);
        if !self.vector_store.collection_exists(&collection).await? {
            warn!(repository_id, "no collection for repository");
            return Ok(Vec::new());
        }

        let prefix = self.clone_prefix(repository_id);
        let mut points = self
            .vector_store
            .scroll_by_filter(&collection, "file_path", file_path)
            .await?;
        if points.is_empty() && !file_path.starts_with('/') {
            points = self
                .vector_store
                .scroll_by_filter(&collection, "file_path", &format!("{prefix}{file_path}"))
                .await?;
        }

        let mut chunks: Vec<RetrievedChunk> = points
            .into_iter()
            .map(|p| RetrievedChunk::from_payload_point(p, 1.0, &prefix))
            .collect();
        chunks.sort_by_key(|c| c.start_line.unwrap_or(0));
        Ok(chunks)
    }

    /// Assemble retrieved chunks into a prompt-ready context string within
    /// the configured token budget.
    #[must_use]
    pub fn format_context(&self, chunks: &[RetrievedChunk]) -> String {
        format::context_for_llm(chunks, self.config.max_context_tokens)
    }

    /// Drop cached results for a repository, e.g. after re-indexing.
    pub fn invalidate_repository(&self, repository_id: i64) {
        self.cache.forget_repository(repository_id);
    }

    async fn semantic_search(
        &self,
        repository_id: i64,
        query: &str,
        limit: usize,
        score_threshold: f32,
    ) -> Result<Vec<RetrievedChunk>> {
        let vector = self.embedder.embed(query).await?;
        if vector.is_empty() {
            warn!(
                repository_id,
                provider = self.embedder.name(),
                "embedding backend returned no vector, degrading to empty results"
            );
            return Ok(Vec::new());
        }

        let collection = repository_collection(repository_id);
        if !self.vector_store.collection_exists(&collection).await? {
            warn!(repository_id, "no collection for repository");
            return Ok(Vec::new());
        }

        let hits = self
            .vector_store
            .search(&collection, vector, limit as u64, score_threshold)
            .await?;

        let prefix = self.clone_prefix(repository_id);
        let mut chunks: Vec<RetrievedChunk> = hits
            .into_iter()
            .map(|p| RetrievedChunk::from_scored_point(p, &prefix))
            .collect();
        chunks.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        Ok(chunks)
    }

    fn clone_prefix(&self, repository_id: i64) -> String {
        format!(
            "{}/{repository_id}/",
            self.config.clone_root.trim_end_matches('/')
        )
    }
}
