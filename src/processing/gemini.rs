//! Gemini embedding client.

use std::thread;
use std::time::Duration;

use anyhow::Context;
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::config::EmbeddingConfig;
use crate::error::{Result, ResumeMatchError};
use crate::processing::embeddings::{EmbeddingBackend, EmbeddingProvider};

const MAX_RETRIES: usize = 3;

/// Blocking client for the `batchEmbedContents` endpoint.
pub struct RemoteEmbeddingProvider {
    client: Client,
    endpoint: String,
    model: String,
    batch_size: usize,
}

impl RemoteEmbeddingProvider {
    /// Builds the HTTP client. No request is made here.
    pub fn new(api_key: String, model: &str, config: &EmbeddingConfig) -> Result<Self> {
        Self::build(api_key, model, config)
            .map_err(|e| ResumeMatchError::ProviderConstruction(format!("{:#}", e)))
    }

    fn build(api_key: String, model: &str, config: &EmbeddingConfig) -> anyhow::Result<Self> {
        anyhow::ensure!(!api_key.trim().is_empty(), "missing Gemini API key");
        anyhow::ensure!(!model.trim().is_empty(), "missing Gemini embedding model name");
        anyhow::ensure!(config.batch_size > 0, "batch size must be positive");

        let mut headers = HeaderMap::new();
        headers.insert(
            "x-goog-api-key",
            HeaderValue::from_str(api_key.trim()).context("invalid Gemini API key")?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()
            .context("failed to build Gemini HTTP client")?;

        let model = normalize_model_name(model);
        let endpoint = format!(
            "{}/{}:batchEmbedContents",
            config.endpoint.trim_end_matches('/'),
            model
        );

        Ok(Self {
            client,
            endpoint,
            model,
            batch_size: config.batch_size,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn embed_batch(&self, inputs: &[&str]) -> anyhow::Result<Vec<Vec<f32>>> {
        if inputs.is_empty() {
            return Ok(Vec::new());
        }

        let request = BatchEmbedRequest {
            requests: inputs
                .iter()
                .map(|text| EmbedContentRequest {
                    model: &self.model,
                    content: Content {
                        parts: vec![Part { text: *text }],
                    },
                })
                .collect(),
        };

        let mut attempt = 0usize;
        loop {
            match self.client.post(&self.endpoint).json(&request).send() {
                Ok(resp) => {
                    let status = resp.status();
                    if status.is_success() {
                        let parsed: BatchEmbedResponse = resp
                            .json()
                            .context("failed to parse Gemini embedding response")?;
                        anyhow::ensure!(
                            parsed.embeddings.len() == inputs.len(),
                            "Gemini returned {} embeddings for {} inputs",
                            parsed.embeddings.len(),
                            inputs.len()
                        );
                        return Ok(parsed.embeddings.into_iter().map(|e| e.values).collect());
                    }

                    let body = resp
                        .text()
                        .unwrap_or_else(|_| "<body unavailable>".to_string());
                    if should_retry(status) && attempt + 1 < MAX_RETRIES {
                        attempt += 1;
                        log::debug!("Gemini returned {}, retrying (attempt {})", status, attempt);
                        thread::sleep(retry_backoff(attempt));
                        continue;
                    }
                    anyhow::bail!("Gemini embeddings request failed ({}): {}", status, body);
                }
                Err(err) => {
                    if (err.is_timeout() || err.is_connect()) && attempt + 1 < MAX_RETRIES {
                        attempt += 1;
                        thread::sleep(retry_backoff(attempt));
                        continue;
                    }
                    return Err(err).context("Gemini embeddings request could not be sent");
                }
            }
        }
    }
}

impl EmbeddingProvider for RemoteEmbeddingProvider {
    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let trimmed: Vec<&str> = texts.iter().map(|t| t.trim()).collect();
        let mut vectors = Vec::with_capacity(trimmed.len());

        for batch in trimmed.chunks(self.batch_size) {
            let batch_vectors = self
                .embed_batch(batch)
                .map_err(|e| ResumeMatchError::Embedding(format!("{:#}", e)))?;
            vectors.extend(batch_vectors);
        }

        if let Some(first) = vectors.first() {
            let expected = first.len();
            if let Some(bad) = vectors.iter().find(|v| v.len() != expected) {
                return Err(ResumeMatchError::DimensionMismatch {
                    expected,
                    actual: bad.len(),
                });
            }
            if vectors.iter().flatten().any(|x| !x.is_finite()) {
                return Err(ResumeMatchError::Embedding(
                    "Gemini returned a non-finite vector component".to_string(),
                ));
            }
        }

        Ok(vectors)
    }

    fn dimension(&self) -> Option<usize> {
        None
    }

    fn backend(&self) -> EmbeddingBackend {
        EmbeddingBackend::Remote {
            model: self.model.clone(),
        }
    }
}

/// Model ids are addressed as `models/<name>`.
pub fn normalize_model_name(model: &str) -> String {
    let model = model.trim();
    if model.starts_with("models/") {
        model.to_string()
    } else {
        format!("models/{}", model)
    }
}

fn should_retry(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

fn retry_backoff(attempt: usize) -> Duration {
    let capped = attempt.min(5) as u32;
    Duration::from_millis(250 * (1 << capped))
}

#[derive(Serialize)]
struct BatchEmbedRequest<'a> {
    requests: Vec<EmbedContentRequest<'a>>,
}

#[derive(Serialize)]
struct EmbedContentRequest<'a> {
    model: &'a str,
    content: Content<'a>,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct BatchEmbedResponse {
    #[serde(default)]
    embeddings: Vec<ContentEmbedding>,
}

#[derive(Debug, Deserialize)]
struct ContentEmbedding {
    values: Vec<f32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_prefix() {
        assert_eq!(normalize_model_name("text-embedding-004"), "models/text-embedding-004");
        assert_eq!(normalize_model_name(" models/embedding-001 "), "models/embedding-001");
    }

    #[test]
    fn test_endpoint_is_built_from_config() {
        let config = EmbeddingConfig {
            endpoint: "https://example.invalid/v1beta/".to_string(),
            ..EmbeddingConfig::default()
        };
        let provider = RemoteEmbeddingProvider::new("key".to_string(), "text-embedding-004", &config).unwrap();

        assert_eq!(
            provider.endpoint,
            "https://example.invalid/v1beta/models/text-embedding-004:batchEmbedContents"
        );
        assert_eq!(provider.dimension(), None);
    }

    #[test]
    fn test_blank_key_is_a_construction_error() {
        let result = RemoteEmbeddingProvider::new("  ".to_string(), "m", &EmbeddingConfig::default());
        assert!(matches!(result, Err(ResumeMatchError::ProviderConstruction(_))));
    }

    #[test]
    fn test_request_shape() {
        let request = BatchEmbedRequest {
            requests: vec![EmbedContentRequest {
                model: "models/text-embedding-004",
                content: Content {
                    parts: vec![Part { text: "hello" }],
                },
            }],
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "requests": [{
                    "model": "models/text-embedding-004",
                    "content": {"parts": [{"text": "hello"}]}
                }]
            })
        );
    }

    #[test]
    fn test_response_parsing() {
        let body = r#"{"embeddings": [{"values": [0.1, 0.2]}, {"values": [0.3, 0.4]}]}"#;
        let parsed: BatchEmbedResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.embeddings.len(), 2);
        assert_eq!(parsed.embeddings[1].values, vec![0.3, 0.4]);
    }
}
