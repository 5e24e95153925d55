//! TTL cache for retrieval results.
//!
//! Keys hash the request discriminator so arbitrary query text never ends
//! up in a key. Entries expire lazily on read; there is no background
//! eviction.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::chunk::RetrievedChunk;

/// Build the cache key for a retrieval request.
///
/// `discriminator` encodes everything that affects the result set for a
/// repository (operation, query text, parameters).
#[must_use]
pub fn cache_key(repository_id: i64, discriminator: &str) -> String {
    let digest = blake3::hash(discriminator.as_bytes());
    format!("retriever:{repository_id}:{digest}")
}

/// In-process result cache with a fixed TTL.
#[derive(Debug)]
pub struct ResultCache {
    ttl: Duration,
    entries: Mutex<HashMap<String, CacheEntry>>,
}

#[derive(Debug)]
struct CacheEntry {
    expires_at: Instant,
    chunks: Vec<RetrievedChunk>,
}

impl ResultCache {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Look up a key, dropping the entry if its TTL has elapsed.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Vec<RetrievedChunk>> {
        let Ok(mut entries) = self.entries.lock() else {
            return None;
        };
        match entries.get(key) {
            Some(entry) if entry.expires_at > Instant::now() => Some(entry.chunks.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    pub fn put(&self, key: String, chunks: Vec<RetrievedChunk>) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(
                key,
                CacheEntry {
                    expires_at: Instant::now() + self.ttl,
                    chunks,
                },
            );
        }
    }

    /// Drop every cached result for a repository.
    pub fn forget_repository(&self, repository_id: i64) {
        let prefix = format!("retriever:{repository_id}:");
        if let Ok(mut entries) = self.entries.lock() {
            entries.retain(|key, _| !key.starts_with(&prefix));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(path: &str) -> RetrievedChunk {
        RetrievedChunk {
            vector_id: String::new(),
            score: 0.5,
            file_path: path.into(),
            chunk_type: None,
            name: None,
            language: None,
            signature: None,
            docstring: None,
            content: String::new(),
            start_line: None,
            end_line: None,
        }
    }

    #[test]
    fn put_then_get_within_ttl() {
        let cache = ResultCache::new(Duration::from_secs(60));
        cache.put("k".into(), vec![chunk("a.py")]);
        let hit = cache.get("k").unwrap();
        assert_eq!(hit.len(), 1);
        assert_eq!(hit[0].file_path, "a.py");
    }

    #[test]
    fn expired_entry_misses_and_is_removed() {
        let cache = ResultCache::new(Duration::ZERO);
        cache.put("k".into(), vec![chunk("a.py")]);
        assert!(cache.get("k").is_none());
        assert!(cache.entries.lock().unwrap().is_empty());
    }

    #[test]
    fn missing_key_is_none() {
        let cache = ResultCache::new(Duration::from_secs(60));
        assert!(cache.get("nope").is_none());
    }

    #[test]
    fn forget_repository_is_scoped() {
        let cache = ResultCache::new(Duration::from_secs(60));
        cache.put(cache_key(1, "q"), vec![chunk("a.py")]);
        cache.put(cache_key(2, "q"), vec![chunk("b.py")]);

        cache.forget_repository(1);
        assert!(cache.get(&cache_key(1, "q")).is_none());
        assert!(cache.get(&cache_key(2, "q")).is_some());
    }

    #[test]
    fn key_varies_by_repository_and_discriminator() {
        assert_ne!(cache_key(1, "a"), cache_key(2, "a"));
        assert_ne!(cache_key(1, "a"), cache_key(1, "b"));
        assert_eq!(cache_key(1, "a"), cache_key(1, "a"));
    }

    #[test]
    fn key_has_fixed_shape() {
        let key = cache_key(7, "vector:how:10:0.4");
        assert!(key.starts_with("retriever:7:"));
        // blake3 hex digest
        assert_eq!(key.rsplit(':').next().unwrap().len(), 64);
    }
}
