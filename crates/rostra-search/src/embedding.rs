//! Query embedding via an OpenAI-compatible NIM inference endpoint.
//!
//! One request per query, no retry. Transport failures and non-success
//! statuses surface as [`Error::ServiceUnavailable`]; a body without an
//! embedding surfaces as [`Error::MalformedResponse`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

const SERVICE: &str = "embedding";

/// Upper bound on a single embedding call.
pub const EMBEDDING_TIMEOUT: Duration = Duration::from_secs(30);

/// Turns free text into a fixed-length vector.
#[async_trait]
pub trait Embedder: Send + Sync + std::fmt::Debug {
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: [&'a str; 1],
    input_type: &'static str,
    encoding_format: &'static str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

/// NIM embedding client.
///
/// Wraps a [`reqwest::Client`] with a 30-second timeout. Requests use
/// `input_type = "query"`, the asymmetric-retrieval mode for search
/// queries.
#[derive(Debug, Clone)]
pub struct NimEmbedder {
    http: Client,
    endpoint: String,
    model: String,
    dimensions: Option<usize>,
}

impl NimEmbedder {
    /// Create a new embedding client for `endpoint` (the service root,
    /// without `/v1/embeddings`).
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(endpoint: impl Into<String>, model: impl Into<String>) -> Result<Self> {
        let http = Client::builder()
            .timeout(EMBEDDING_TIMEOUT)
            .user_agent("rostra/0.1.0")
            .build()
            .map_err(|e| Error::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            model: model.into(),
            dimensions: None,
        })
    }

    /// Reject embeddings whose length differs from `dimensions`.
    #[must_use]
    pub fn with_dimensions(mut self, dimensions: Option<usize>) -> Self {
        self.dimensions = dimensions;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Readiness check: `GET /v1/health/ready` must answer 200.
    pub async fn ready(&self, timeout: Duration) -> bool {
        let url = format!("{}/v1/health/ready", self.endpoint);
        match self.http.get(&url).timeout(timeout).send().await {
            Ok(response) => response.status() == reqwest::StatusCode::OK,
            Err(e) => {
                log::debug!("Embedding readiness check failed: {}", e);
                false
            }
        }
    }
}

#[async_trait]
impl Embedder for NimEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let url = format!("{}/v1/embeddings", self.endpoint);
        let payload = EmbeddingRequest {
            model: &self.model,
            input: [text],
            input_type: "query",
            encoding_format: "float",
        };

        log::debug!("Embedding query ({} chars) with {}", text.len(), self.model);

        let response = self
            .http
            .post(&url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| Error::transport(SERVICE, e))?
            .error_for_status()
            .map_err(|e| Error::unavailable(SERVICE, e))?;

        let body = response
            .bytes()
            .await
            .map_err(|e| Error::unavailable(SERVICE, e))?;

        parse_embedding(&body, self.dimensions)
    }
}

/// Extract the first embedding from a response body.
fn parse_embedding(body: &[u8], dimensions: Option<usize>) -> Result<Vec<f32>> {
    let response: EmbeddingResponse =
        serde_json::from_slice(body).map_err(|e| Error::malformed(SERVICE, e))?;

    let embedding = response
        .data
        .into_iter()
        .next()
        .map(|d| d.embedding)
        .ok_or_else(|| Error::malformed(SERVICE, "response contained no embeddings"))?;

    if embedding.is_empty() {
        return Err(Error::malformed(SERVICE, "embedding is empty"));
    }
    if let Some(expected) = dimensions {
        if embedding.len() != expected {
            return Err(Error::malformed(
                SERVICE,
                format!(
                    "expected {expected}-dimensional embedding, got {}",
                    embedding.len()
                ),
            ));
        }
    }

    Ok(embedding)
}
