//! Collapse overlapping chunks from merged result sets.

use std::collections::HashSet;

use crate::chunk::RetrievedChunk;

/// Deduplicate by file path and line range, keeping the highest-scoring
/// copy of each location. Output is score-descending.
///
/// Sorting first makes the single dedup pass keep the best copy: after a
/// stable descending sort, the first occurrence of any location key is the
/// maximum-score one.
#[must_use]
pub fn by_location(mut chunks: Vec<RetrievedChunk>) -> Vec<RetrievedChunk> {
    chunks.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut seen = HashSet::new();
    chunks.retain(|c| seen.insert(c.location_key()));
    chunks
}
