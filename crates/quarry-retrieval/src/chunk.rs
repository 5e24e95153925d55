//! Chunk model shared across the retrieval pipeline.

use std::collections::HashMap;

use quarry_store::{PayloadPoint, ScoredPoint};

/// A retrieved unit of source code, normalized from a vector-store hit.
///
/// Request-local: chunks are built per retrieval call, re-scored at most
/// once (hybrid boosting), and discarded when the response is assembled.
#[derive(Debug, Clone, PartialEq)]
pub struct RetrievedChunk {
    pub vector_id: String,
    pub score: f32,
    /// Repository-relative path; clone-root prefixes are stripped during
    /// normalization.
    pub file_path: String,
    pub chunk_type: Option<String>,
    pub name: Option<String>,
    pub language: Option<String>,
    pub signature: Option<String>,
    pub docstring: Option<String>,
    pub content: String,
    pub start_line: Option<u32>,
    pub end_line: Option<u32>,
}

impl RetrievedChunk {
    /// Normalize a similarity-search hit.
    #[must_use]
    pub fn from_scored_point(point: ScoredPoint, clone_prefix: &str) -> Self {
        Self::from_payload(point.id, point.score, &point.payload, clone_prefix)
    }

    /// Normalize a scroll hit, assigning `score` explicitly since scroll
    /// results carry no similarity score.
    #[must_use]
    pub fn from_payload_point(point: PayloadPoint, score: f32, clone_prefix: &str) -> Self {
        Self::from_payload(point.id, score, &point.payload, clone_prefix)
    }

    fn from_payload(
        id: String,
        score: f32,
        payload: &HashMap<String, serde_json::Value>,
        clone_prefix: &str,
    ) -> Self {
        let get_str = |key: &str| {
            payload
                .get(key)
                .and_then(serde_json::Value::as_str)
                .map(str::to_owned)
        };
        let get_line = |key: &str| {
            payload
                .get(key)
                .and_then(serde_json::Value::as_u64)
                .and_then(|v| u32::try_from(v).ok())
        };

        let file_path = strip_clone_prefix(&get_str("file_path").unwrap_or_default(), clone_prefix);

        Self {
            vector_id: id,
            score,
            file_path,
            chunk_type: get_str("chunk_type"),
            name: get_str("name"),
            language: get_str("language"),
            signature: get_str("signature"),
            docstring: get_str("docstring"),
            content: get_str("content").unwrap_or_default(),
            start_line: get_line("start_line"),
            end_line: get_line("end_line"),
        }
    }

    /// Identity key for deduplication: same file and same line range means
    /// the same chunk, regardless of content.
    #[must_use]
    pub fn location_key(&self) -> String {
        format!(
            "{}:{}-{}",
            self.file_path,
            self.start_line.unwrap_or(0),
            self.end_line.unwrap_or(0)
        )
    }

    /// Whether this chunk's line range contains `line`.
    ///
    /// Missing line bounds fall back to zero, so a chunk without an end
    /// line never covers anything.
    #[must_use]
    pub fn covers_line(&self, line: u32) -> bool {
        self.start_line.unwrap_or(0) <= line && self.end_line.unwrap_or(0) >= line
    }
}

/// Strip a clone-root prefix (`{clone_root}/{repository_id}/`) so paths are
/// repository-relative. Paths without the prefix pass through unchanged.
#[must_use]
pub fn strip_clone_prefix(path: &str, clone_prefix: &str) -> String {
    path.strip_prefix(clone_prefix).unwrap_or(path).to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(entries: &[(&str, serde_json::Value)]) -> HashMap<String, serde_json::Value> {
        entries
            .iter()
            .map(|(k, v)| ((*k).to_owned(), v.clone()))
            .collect()
    }

    #[test]
    fn from_scored_point_strips_clone_prefix() {
        let point = ScoredPoint {
            id: "p1".into(),
            score: 0.9,
            payload: payload(&[
                ("file_path", serde_json::json!("/tmp/repos/7/src/app.py")),
                ("content", serde_json::json!("def f(): pass")),
                ("start_line", serde_json::json!(10)),
                ("end_line", serde_json::json!(20)),
                ("language", serde_json::json!("python")),
            ]),
        };
        let chunk = RetrievedChunk::from_scored_point(point, "/tmp/repos/7/");
        assert_eq!(chunk.file_path, "src/app.py");
        assert_eq!(chunk.start_line, Some(10));
        assert_eq!(chunk.end_line, Some(20));
        assert!((chunk.score - 0.9).abs() < f32::EPSILON);
    }

    #[test]
    fn from_payload_point_takes_explicit_score() {
        let point = PayloadPoint {
            id: "p2".into(),
            payload: payload(&[
                ("file_path", serde_json::json!("src/lib.py")),
                ("content", serde_json::json!("x = 1")),
            ]),
        };
        let chunk = RetrievedChunk::from_payload_point(point, 1.0, "/tmp/repos/7/");
        assert!((chunk.score - 1.0).abs() < f32::EPSILON);
        assert_eq!(chunk.file_path, "src/lib.py");
        assert_eq!(chunk.start_line, None);
    }

    #[test]
    fn missing_optional_fields_map_to_none() {
        let point = ScoredPoint {
            id: "p3".into(),
            score: 0.5,
            payload: payload(&[("file_path", serde_json::json!("a.rs"))]),
        };
        let chunk = RetrievedChunk::from_scored_point(point, "");
        assert_eq!(chunk.name, None);
        assert_eq!(chunk.signature, None);
        assert_eq!(chunk.docstring, None);
        assert_eq!(chunk.content, "");
    }

    #[test]
    fn location_key_uses_path_and_range() {
        let point = ScoredPoint {
            id: "p".into(),
            score: 0.5,
            payload: payload(&[
                ("file_path", serde_json::json!("a.rs")),
                ("start_line", serde_json::json!(3)),
                ("end_line", serde_json::json!(9)),
            ]),
        };
        let chunk = RetrievedChunk::from_scored_point(point, "");
        assert_eq!(chunk.location_key(), "a.rs:3-9");
    }

    #[test]
    fn covers_line_inclusive_bounds() {
        let point = ScoredPoint {
            id: "p".into(),
            score: 0.5,
            payload: payload(&[
                ("file_path", serde_json::json!("a.rs")),
                ("start_line", serde_json::json!(10)),
                ("end_line", serde_json::json!(20)),
            ]),
        };
        let chunk = RetrievedChunk::from_scored_point(point, "");
        assert!(chunk.covers_line(10));
        assert!(chunk.covers_line(20));
        assert!(!chunk.covers_line(9));
        assert!(!chunk.covers_line(21));
    }

    #[test]
    fn covers_line_false_without_end_line() {
        let point = PayloadPoint {
            id: "p".into(),
            payload: payload(&[("file_path", serde_json::json!("a.rs"))]),
        };
        let chunk = RetrievedChunk::from_payload_point(point, 1.0, "");
        assert!(!chunk.covers_line(1));
    }

    #[test]
    fn strip_clone_prefix_passthrough() {
        assert_eq!(strip_clone_prefix("src/a.py", "/tmp/repos/1/"), "src/a.py");
    }
}
