//! Text-generation provider client with credential rotation
//!
//! One `TextAdapter` per response family owns the request shape, the auth
//! header and where the generated text lives in the response. The
//! `TextGenerator` owns the HTTP client and the ordered credential list.
//!
//! Rotation policy: HTTP 429 advances to the next credential; any other
//! failure stops immediately; success stops.

use reqwest::{Client, RequestBuilder, StatusCode};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, warn};

use foodcraft_common::config::{TextProviderConfig, TextProviderFamily};

use crate::error::ResolveError;

/// Longest provider error body kept in error messages
const MAX_ERROR_DETAIL: usize = 500;

/// Request/response shape of one provider family
pub trait TextAdapter: Send + Sync {
    /// Family name for logs and error messages
    fn name(&self) -> &'static str;

    /// URL to POST to
    fn request_url(&self, endpoint: &str, model: &str) -> String;

    /// JSON body carrying a single user-role prompt
    fn request_body(&self, model: &str, prompt: &str) -> Value;

    /// Attach the credential
    fn authorize(&self, request: RequestBuilder, api_key: &str) -> RequestBuilder;

    /// Pull the generated text out of a success payload
    fn extract_text(&self, payload: &Value) -> Option<String>;
}

/// OpenAI-style chat completions (`choices[0].message.content`)
#[derive(Debug, Default)]
pub struct OpenAiAdapter;

impl TextAdapter for OpenAiAdapter {
    fn name(&self) -> &'static str {
        "openai"
    }

    fn request_url(&self, endpoint: &str, _model: &str) -> String {
        endpoint.to_string()
    }

    fn request_body(&self, model: &str, prompt: &str) -> Value {
        json!({
            "model": model,
            "messages": [
                { "role": "user", "content": prompt }
            ]
        })
    }

    fn authorize(&self, request: RequestBuilder, api_key: &str) -> RequestBuilder {
        request.bearer_auth(api_key)
    }

    fn extract_text(&self, payload: &Value) -> Option<String> {
        payload
            .pointer("/choices/0/message/content")
            .and_then(Value::as_str)
            .map(str::to_string)
    }
}

/// Gemini generateContent (`candidates[0].content.parts[0].text`)
#[derive(Debug, Default)]
pub struct GeminiAdapter;

impl TextAdapter for GeminiAdapter {
    fn name(&self) -> &'static str {
        "gemini"
    }

    fn request_url(&self, endpoint: &str, model: &str) -> String {
        format!("{}/{}:generateContent", endpoint.trim_end_matches('/'), model)
    }

    fn request_body(&self, _model: &str, prompt: &str) -> Value {
        json!({
            "contents": [
                { "role": "user", "parts": [ { "text": prompt } ] }
            ]
        })
    }

    fn authorize(&self, request: RequestBuilder, api_key: &str) -> RequestBuilder {
        request.header("x-goog-api-key", api_key)
    }

    fn extract_text(&self, payload: &Value) -> Option<String> {
        payload
            .pointer("/candidates/0/content/parts/0/text")
            .and_then(Value::as_str)
            .map(str::to_string)
    }
}

/// Adapter for a configured family
pub fn text_adapter(family: TextProviderFamily) -> Box<dyn TextAdapter> {
    match family {
        TextProviderFamily::OpenAi => Box::new(OpenAiAdapter),
        TextProviderFamily::Gemini => Box::new(GeminiAdapter),
    }
}

/// Text-generation client
pub struct TextGenerator {
    http_client: Client,
    adapter: Box<dyn TextAdapter>,
    endpoint: String,
    model: String,
    /// Ordered: primary first, then fallbacks
    credentials: Vec<String>,
}

impl TextGenerator {
    pub fn new(
        config: &TextProviderConfig,
        credentials: Vec<String>,
    ) -> Result<Self, ResolveError> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build()
            .map_err(|e| ResolveError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            adapter: text_adapter(config.family),
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
            credentials,
        })
    }

    pub fn has_credentials(&self) -> bool {
        !self.credentials.is_empty()
    }

    pub fn credential_count(&self) -> usize {
        self.credentials.len()
    }

    /// Run one prompt, rotating credentials on rate limits
    ///
    /// Returns the raw generated text; parsing is the caller's concern.
    pub async fn generate(&self, prompt: &str) -> Result<String, ResolveError> {
        if self.credentials.is_empty() {
            return Err(ResolveError::Config(
                "no text provider API key configured".to_string(),
            ));
        }

        let url = self.adapter.request_url(&self.endpoint, &self.model);
        let body = self.adapter.request_body(&self.model, prompt);
        let total = self.credentials.len();
        let mut last_error = String::new();

        for (index, api_key) in self.credentials.iter().enumerate() {
            let attempt = index + 1;
            debug!(provider = self.adapter.name(), attempt, total, "Calling text provider");

            let request = self.adapter.authorize(self.http_client.post(&url).json(&body), api_key);
            let response = request.send().await.map_err(|e| ResolveError::Provider {
                attempts: attempt,
                message: format!("{} request failed: {}", self.adapter.name(), e),
            })?;

            let status = response.status();
            let body = response.text().await;

            // A 429 rotates even when its body cannot be read
            if status == StatusCode::TOO_MANY_REQUESTS {
                warn!(
                    provider = self.adapter.name(),
                    credential = attempt,
                    total,
                    "Text provider rate-limited, rotating to next credential"
                );
                last_error = format!(
                    "{} rate-limited credential {}/{}: {}",
                    self.adapter.name(),
                    attempt,
                    total,
                    body.as_deref().map(truncate).unwrap_or_default()
                );
                continue;
            }

            let text = body.map_err(|e| ResolveError::Provider {
                attempts: attempt,
                message: format!("{} response body unreadable: {}", self.adapter.name(), e),
            })?;

            if !status.is_success() {
                return Err(ResolveError::Provider {
                    attempts: attempt,
                    message: format!(
                        "{} returned {}: {}",
                        self.adapter.name(),
                        status,
                        truncate(&text)
                    ),
                });
            }

            let payload: Value = serde_json::from_str(&text).map_err(|e| {
                ResolveError::MalformedOutput {
                    reason: format!("response body is not JSON: {}", e),
                    raw: text.clone(),
                }
            })?;

            return self
                .adapter
                .extract_text(&payload)
                .ok_or_else(|| ResolveError::MalformedOutput {
                    reason: format!("{} response has no content field", self.adapter.name()),
                    raw: text,
                });
        }

        Err(ResolveError::Provider {
            attempts: total,
            message: last_error,
        })
    }
}

fn truncate(text: &str) -> &str {
    match text.char_indices().nth(MAX_ERROR_DETAIL) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
