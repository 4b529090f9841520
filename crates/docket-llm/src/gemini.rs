//! Gemini Adapter Implementation
//!
//! Talks to the Generative Language REST API (`generateContent`). Files are
//! sent inline as base64 parts next to the prompt text.
//!
//! Failures are split the way callers retry them: HTTP 408/429/5xx,
//! timeouts and connection failures are transient; every other error is
//! permanent for the file.
//!
//! # Examples
//!
//! ```no_run
//! use docket_llm::{AdapterConfig, GeminiAdapter};
//!
//! let config = AdapterConfig {
//!     api_key: Some("key".to_string()),
//!     ..AdapterConfig::default()
//! };
//! let adapter = GeminiAdapter::new(config).unwrap();
//! ```

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use docket_domain::{AdapterError, Document, ExtractionAdapter};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Default API endpoint
pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com";

/// Default model
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Environment variable consulted when no key is configured
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Default timeout for one request (2 minutes; long documents are slow)
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Connection settings for the model service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdapterConfig {
    /// Base URL of the API
    pub endpoint: String,
    /// Model name
    pub model: String,
    /// API key; falls back to `GEMINI_API_KEY`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
    /// Sampling temperature
    pub temperature: f32,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            temperature: 0.0,
        }
    }
}

impl AdapterConfig {
    /// Configured key, or the environment variable, if either is non-empty
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var(API_KEY_ENV).ok())
            .filter(|k| !k.trim().is_empty())
    }

    /// Get timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Adapter for the Gemini `generateContent` endpoint
pub struct GeminiAdapter {
    endpoint: String,
    model: String,
    api_key: String,
    temperature: f32,
    client: reqwest::Client,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Part<'a> {
    Inline { inline_data: InlineData<'a> },
    Text { text: &'a str },
}

#[derive(Serialize)]
struct InlineData<'a> {
    mime_type: &'a str,
    data: String,
}

#[derive(Serialize)]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

impl GeminiAdapter {
    /// Create an adapter
    ///
    /// # Errors
    ///
    /// Returns `AdapterError::Permanent` when no API key is available or
    /// the HTTP client cannot be built.
    pub fn new(config: AdapterConfig) -> Result<Self, AdapterError> {
        let api_key = config.resolve_api_key().ok_or_else(|| {
            AdapterError::Permanent(format!("no API key configured (set {})", API_KEY_ENV))
        })?;
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| AdapterError::Permanent(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model,
            api_key,
            temperature: config.temperature,
            client,
        })
    }

    fn url(&self) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.endpoint, self.model)
    }

    async fn generate(
        &self,
        document: Option<&Document>,
        prompt: &str,
    ) -> Result<String, AdapterError> {
        let mut parts = Vec::with_capacity(2);
        if let Some(doc) = document {
            parts.push(Part::Inline {
                inline_data: InlineData {
                    mime_type: &doc.mime_type,
                    data: STANDARD.encode(&doc.bytes),
                },
            });
        }
        parts.push(Part::Text { text: prompt });

        let body = GenerateRequest {
            contents: vec![Content { role: "user", parts }],
            generation_config: GenerationConfig {
                temperature: self.temperature,
            },
        };

        let response = self
            .client
            .post(self.url())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(request_error)?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(status_error(status, &error_text));
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| AdapterError::Permanent(format!("Failed to parse response: {}", e)))?;
        let candidate = parsed
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| AdapterError::Permanent("response has no candidates".to_string()))?;

        if let Some(reason) = &candidate.finish_reason {
            debug!("Model finished with reason {}", reason);
        }
        let text: String = candidate
            .content
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();
        Ok(text)
    }
}

fn request_error(e: reqwest::Error) -> AdapterError {
    if e.is_builder() {
        AdapterError::Permanent(format!("Invalid request: {}", e))
    } else {
        // Timeouts, refused connections and resets all deserve another try
        AdapterError::Transient(format!("Request failed: {}", e))
    }
}

fn status_error(status: reqwest::StatusCode, body: &str) -> AdapterError {
    let message = format!("HTTP {}: {}", status, body);
    if status == reqwest::StatusCode::TOO_MANY_REQUESTS
        || status == reqwest::StatusCode::REQUEST_TIMEOUT
        || status.is_server_error()
    {
        AdapterError::Transient(message)
    } else {
        AdapterError::Permanent(message)
    }
}

#[async_trait]
impl ExtractionAdapter for GeminiAdapter {
    async fn classify(&self, document: &Document, prompt: &str) -> Result<String, AdapterError> {
        self.generate(Some(document), prompt).await
    }

    async fn extract(
        &self,
        document: &Document,
        field_prompt: &str,
    ) -> Result<String, AdapterError> {
        self.generate(Some(document), field_prompt).await
    }

    async fn prompt_only(&self, prompt: &str) -> Result<String, AdapterError> {
        self.generate(None, prompt).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    fn config() -> AdapterConfig {
        AdapterConfig {
            api_key: Some("test-key".to_string()),
            ..AdapterConfig::default()
        }
    }

    #[test]
    fn test_adapter_creation() {
        let adapter = GeminiAdapter::new(AdapterConfig {
            endpoint: "http://localhost:8080/".to_string(),
            ..config()
        })
        .unwrap();
        assert_eq!(
            adapter.url(),
            "http://localhost:8080/v1beta/models/gemini-2.0-flash:generateContent"
        );
    }

    #[test]
    fn test_blank_key_is_rejected() {
        let cfg = AdapterConfig {
            api_key: Some("   ".to_string()),
            ..AdapterConfig::default()
        };
        if std::env::var(API_KEY_ENV).is_err() {
            assert!(matches!(GeminiAdapter::new(cfg), Err(AdapterError::Permanent(_))));
        }
    }

    #[test]
    fn test_status_mapping() {
        assert!(status_error(StatusCode::TOO_MANY_REQUESTS, "").is_transient());
        assert!(status_error(StatusCode::SERVICE_UNAVAILABLE, "").is_transient());
        assert!(status_error(StatusCode::REQUEST_TIMEOUT, "").is_transient());
        assert!(!status_error(StatusCode::BAD_REQUEST, "").is_transient());
        assert!(!status_error(StatusCode::FORBIDDEN, "").is_transient());
    }

    #[test]
    fn test_request_body_shape() {
        let body = GenerateRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![
                    Part::Inline {
                        inline_data: InlineData {
                            mime_type: "application/pdf",
                            data: STANDARD.encode(b"%PDF"),
                        },
                    },
                    Part::Text { text: "extract" },
                ],
            }],
            generation_config: GenerationConfig { temperature: 0.0 },
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["contents"][0]["parts"][0]["inline_data"]["data"], "JVBERg==");
        assert_eq!(json["contents"][0]["parts"][1]["text"], "extract");
        assert_eq!(json["generationConfig"]["temperature"], 0.0);
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_transient() {
        let adapter = GeminiAdapter::new(AdapterConfig {
            endpoint: "http://127.0.0.1:9".to_string(),
            timeout_secs: 2,
            ..config()
        })
        .unwrap();
        let result = adapter.prompt_only("hello").await;
        assert!(matches!(result, Err(AdapterError::Transient(_))));
    }
}
