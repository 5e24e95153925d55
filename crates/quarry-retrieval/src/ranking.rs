//! Keyword-boost re-ranking over semantic candidates.

use crate::chunk::RetrievedChunk;
use crate::keywords;

/// Score multiplier when the chunk name contains a query keyword.
pub const NAME_BOOST: f32 = 1.3;

/// Score multiplier when the chunk file path contains a query keyword.
pub const PATH_BOOST: f32 = 1.2;

/// Re-rank semantic candidates by boosting lexical matches, returning the
/// top `top_k`.
///
/// Name and path boosts are independent and multiplicative; each applies
/// at most once per chunk regardless of how many keywords match. A query
/// with no significant keywords leaves the candidate order untouched.
#[must_use]
pub fn rerank(
    mut candidates: Vec<RetrievedChunk>,
    query: &str,
    top_k: usize,
) -> Vec<RetrievedChunk> {
    if candidates.is_empty() {
        return candidates;
    }

    let keywords = keywords::extract(query);
    if keywords.is_empty() {
        candidates.truncate(top_k);
        return candidates;
    }

    for chunk in &mut candidates {
        let name = chunk.name.as_deref().unwrap_or("").to_lowercase();
        let path = chunk.file_path.to_lowercase();

        if !name.is_empty() && keywords.iter().any(|k| name.contains(k)) {
            chunk.score *= NAME_BOOST;
        }
        if !path.is_empty() && keywords.iter().any(|k| path.contains(k)) {
            chunk.score *= PATH_BOOST;
        }
    }

    // Stable sort: equal adjusted scores keep their semantic-rank order.
    candidates.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    candidates.truncate(top_k);
    candidates
}
