//! Query keyword extraction for lexical boosting.

/// Common English words plus domain filler that carry no search signal.
const STOPWORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "by", "do", "for", "from", "has", "he", "in", "is",
    "it", "its", "of", "on", "or", "that", "the", "this", "to", "was", "were", "will", "with",
    "how", "what", "where", "when", "which", "who", "why", "can", "get", "set", "use", "used",
    "using", "also", "not",
];

const MIN_TOKEN_LEN: usize = 3;

/// Extract significant keywords from a query string.
///
/// Lowercases the input, splits on any run of characters outside
/// `[a-z0-9_]`, drops short tokens and stopwords, and returns unique terms
/// in first-seen order. No stemming or synonym expansion.
#[must_use]
pub fn extract(query: &str) -> Vec<String> {
    let lowered = query.to_lowercase();
    let mut keywords: Vec<String> = Vec::new();

    for token in lowered.split(|c: char| !(c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_'))
    {
        if token.len() < MIN_TOKEN_LEN || STOPWORDS.contains(&token) {
            continue;
        }
        if !keywords.iter().any(|k| k == token) {
            keywords.push(token.to_owned());
        }
    }

    keywords
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drops_stopwords_and_short_tokens() {
        let kw = extract("how does the authenticate function work");
        assert_eq!(kw, vec!["does", "authenticate", "function", "work"]);
    }

    #[test]
    fn lowercases_and_splits_on_punctuation() {
        let kw = extract("UserService::findById(id)");
        assert_eq!(kw, vec!["userservice", "findbyid"]);
    }

    #[test]
    fn keeps_underscores_inside_tokens() {
        let kw = extract("call parse_error_trace here");
        assert_eq!(kw, vec!["call", "parse_error_trace", "here"]);
    }

    #[test]
    fn deduplicates_preserving_first_seen_order() {
        let kw = extract("retry retry backoff retry");
        assert_eq!(kw, vec!["retry", "backoff"]);
    }

    #[test]
    fn empty_and_stopword_only_queries_yield_nothing() {
        assert!(extract("").is_empty());
        assert!(extract("how to use the get").is_empty());
    }

    #[test]
    fn no_token_shorter_than_three_chars() {
        let kw = extract("go fn db xs http");
        assert_eq!(kw, vec!["http"]);
    }
}
