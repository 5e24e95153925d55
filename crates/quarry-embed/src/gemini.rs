//! Gemini `batchEmbedContents` backend.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::EmbedError;
use crate::provider::EmbeddingProvider;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_MODEL: &str = "gemini-embedding-001";
const DEFAULT_DIMENSIONS: u32 = 1536;

/// Embedding client for the Gemini generative language API.
///
/// A non-success HTTP status or a response without embeddings degrades to
/// empty vectors rather than an error; only transport failures surface as
/// [`EmbedError`].
pub struct GeminiEmbedder {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    dimensions: u32,
}

impl fmt::Debug for GeminiEmbedder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiEmbedder")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("dimensions", &self.dimensions)
            .finish_non_exhaustive()
    }
}

impl GeminiEmbedder {
    #[must_use]
    pub fn new(api_key: String) -> Self {
        Self {
            client: crate::http::default_client(),
            api_key,
            base_url: DEFAULT_BASE_URL.to_owned(),
            model: DEFAULT_MODEL.to_owned(),
            dimensions: DEFAULT_DIMENSIONS,
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, mut base_url: String) -> Self {
        while base_url.ends_with('/') {
            base_url.pop();
        }
        self.base_url = base_url;
        self
    }

    #[must_use]
    pub fn with_model(mut self, model: String) -> Self {
        self.model = model;
        self
    }

    #[must_use]
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    /// Embed a batch of texts in one request.
    ///
    /// The result is indexed like the input. Texts the backend failed to
    /// embed map to empty vectors, as does the whole batch when the request
    /// is rejected.
    ///
    /// # Errors
    ///
    /// Returns an error on transport-level failure or an unparseable body.
    pub async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbedError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let requests: Vec<EmbedContentRequest<'_>> = texts
            .iter()
            .map(|text| EmbedContentRequest {
                model: format!("models/{}", self.model),
                content: Content {
                    parts: vec![Part { text }],
                },
                output_dimensionality: self.dimensions,
            })
            .collect();

        let url = format!(
            "{}/models/{}:batchEmbedContents",
            self.base_url, self.model
        );

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&BatchEmbedRequest { requests })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            tracing::warn!(%status, count = texts.len(), "batchEmbedContents rejected");
            return Ok(vec![Vec::new(); texts.len()]);
        }

        let body: BatchEmbedResponse = response.json().await?;
        let embeddings = body.embeddings.unwrap_or_default();

        Ok((0..texts.len())
            .map(|i| {
                embeddings
                    .get(i)
                    .map(|e| e.values.clone())
                    .unwrap_or_default()
            })
            .collect())
    }
}

impl EmbeddingProvider for GeminiEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError> {
        let mut batch = self.embed_batch(&[text.to_owned()]).await?;
        Ok(batch.pop().unwrap_or_default())
    }

    fn name(&self) -> &'static str {
        "gemini"
    }
}

#[derive(Serialize)]
struct BatchEmbedRequest<'a> {
    requests: Vec<EmbedContentRequest<'a>>,
}

#[derive(Serialize)]
struct EmbedContentRequest<'a> {
    model: String,
    content: Content<'a>,
    #[serde(rename = "outputDimensionality")]
    output_dimensionality: u32,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct BatchEmbedResponse {
    embeddings: Option<Vec<EmbeddingValues>>,
}

#[derive(Deserialize)]
struct EmbeddingValues {
    #[serde(default)]
    values: Vec<f32>,
}
