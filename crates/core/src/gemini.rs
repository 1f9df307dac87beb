//! Google Generative Language client: `embedding-001` for vectors and
//! `gemini-1.5-flash` for grounded answer generation.

use crate::error::ProviderError;
use crate::providers::{EmbeddingProvider, GenerationProvider};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;

const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const EMBEDDING_MODEL: &str = "embedding-001";
const GENERATION_MODEL: &str = "gemini-1.5-flash";
const GENERATION_TEMPERATURE: f32 = 0.3;

/// `embedding-001` output dimensionality.
pub const GEMINI_EMBEDDING_DIMENSIONS: usize = 768;

/// batchEmbedContents accepts at most this many requests per call.
const MAX_EMBED_BATCH: usize = 100;

pub struct GeminiClient {
    endpoint: String,
    api_key: String,
    client: Client,
}

impl GeminiClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_endpoint(api_key, DEFAULT_ENDPOINT)
    }

    /// Point the client at a different base URL, e.g. a local stub server.
    pub fn with_endpoint(api_key: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            client: Client::new(),
        }
    }

    async fn post(&self, path: &str, body: &Value) -> Result<Value, ProviderError> {
        let response = self
            .client
            .post(format!("{}/{path}", self.endpoint))
            .timeout(REQUEST_TIMEOUT)
            .header("x-goog-api-key", &self.api_key)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if status.as_u16() == 429 {
            let details = response.text().await.unwrap_or_default();
            return Err(ProviderError::RateLimited(details));
        }
        if status.is_client_error() {
            let details = response.text().await.unwrap_or_default();
            return Err(ProviderError::InvalidInput(format!("{status}: {details}")));
        }
        if !status.is_success() {
            return Err(ProviderError::BackendResponse {
                backend: "gemini",
                status: Some(status.as_u16()),
                details: status.to_string(),
            });
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl EmbeddingProvider for GeminiClient {
    fn dimensions(&self) -> usize {
        GEMINI_EMBEDDING_DIMENSIONS
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, ProviderError> {
        let body = json!({
            "model": format!("models/{EMBEDDING_MODEL}"),
            "content": { "parts": [{ "text": text }] },
        });
        let parsed = self
            .post(&format!("models/{EMBEDDING_MODEL}:embedContent"), &body)
            .await?;

        vector_from_value(parsed.pointer("/embedding/values"))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, ProviderError> {
        let mut vectors = Vec::with_capacity(texts.len());

        for window in texts.chunks(MAX_EMBED_BATCH) {
            let requests = window
                .iter()
                .map(|text| {
                    json!({
                        "model": format!("models/{EMBEDDING_MODEL}"),
                        "content": { "parts": [{ "text": text }] },
                    })
                })
                .collect::<Vec<_>>();

            let parsed = self
                .post(
                    &format!("models/{EMBEDDING_MODEL}:batchEmbedContents"),
                    &json!({ "requests": requests }),
                )
                .await?;

            let embeddings = parsed
                .pointer("/embeddings")
                .and_then(Value::as_array)
                .ok_or_else(|| ProviderError::BackendResponse {
                    backend: "gemini",
                    status: None,
                    details: "response is missing embeddings".to_string(),
                })?;

            if embeddings.len() != window.len() {
                return Err(ProviderError::BackendResponse {
                    backend: "gemini",
                    status: None,
                    details: format!(
                        "requested {} embeddings, got {}",
                        window.len(),
                        embeddings.len()
                    ),
                });
            }

            for embedding in embeddings {
                vectors.push(vector_from_value(embedding.pointer("/values"))?);
            }
        }

        Ok(vectors)
    }
}

#[async_trait]
impl GenerationProvider for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, ProviderError> {
        let body = json!({
            "contents": [{ "role": "user", "parts": [{ "text": prompt }] }],
            "generationConfig": { "temperature": GENERATION_TEMPERATURE },
        });
        let parsed = self
            .post(&format!("models/{GENERATION_MODEL}:generateContent"), &body)
            .await?;

        generated_text(&parsed)
    }
}

fn vector_from_value(values: Option<&Value>) -> Result<Vec<f32>, ProviderError> {
    values
        .and_then(Value::as_array)
        .map(|array| {
            array
                .iter()
                .map(|value| value.as_f64().unwrap_or(0.0) as f32)
                .collect::<Vec<f32>>()
        })
        .filter(|vector| !vector.is_empty())
        .ok_or_else(|| ProviderError::BackendResponse {
            backend: "gemini",
            status: None,
            details: "response is missing embedding values".to_string(),
        })
}

fn generated_text(response: &Value) -> Result<String, ProviderError> {
    response
        .pointer("/candidates/0/content/parts/0/text")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| ProviderError::BackendResponse {
            backend: "gemini",
            status: None,
            details: "response has no generated candidate text".to_string(),
        })
}
