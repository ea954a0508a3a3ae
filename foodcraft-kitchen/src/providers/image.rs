//! Best-effort dish image generation
//!
//! Failures of any kind (network, status, payload) are logged and turned
//! into `None`; an image never fails a combination.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::{header, Client};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, warn};

use foodcraft_common::config::{ImageProviderConfig, ImageProviderFamily};

use crate::error::ResolveError;

/// Request/response shape of one image provider family
pub trait ImageAdapter: Send + Sync {
    fn name(&self) -> &'static str;

    /// Value of the `Accept` header
    fn accept(&self) -> &'static str;

    fn request_body(&self, prompt: &str) -> Value;

    /// Decoded image bytes from a success response
    fn extract_image_bytes(&self, content_type: Option<&str>, body: &[u8]) -> Option<Vec<u8>>;
}

/// Stability v1 text-to-image: JSON with `artifacts[0].base64`
#[derive(Debug, Default)]
pub struct StabilityJsonAdapter;

impl ImageAdapter for StabilityJsonAdapter {
    fn name(&self) -> &'static str {
        "stability"
    }

    fn accept(&self) -> &'static str {
        "application/json"
    }

    fn request_body(&self, prompt: &str) -> Value {
        json!({
            "text_prompts": [ { "text": prompt, "weight": 1 } ],
            "cfg_scale": 7,
            "height": 512,
            "width": 512,
            "steps": 30,
            "samples": 1
        })
    }

    fn extract_image_bytes(&self, _content_type: Option<&str>, body: &[u8]) -> Option<Vec<u8>> {
        let payload: Value = serde_json::from_slice(body).ok()?;
        let encoded = payload.pointer("/artifacts/0/base64")?.as_str()?;
        STANDARD.decode(encoded).ok().filter(|bytes| !bytes.is_empty())
    }
}

/// Endpoints that stream the image itself as the response body
#[derive(Debug, Default)]
pub struct RawBytesAdapter;

impl ImageAdapter for RawBytesAdapter {
    fn name(&self) -> &'static str {
        "raw-bytes"
    }

    fn accept(&self) -> &'static str {
        "image/*"
    }

    fn request_body(&self, prompt: &str) -> Value {
        json!({ "prompt": prompt, "output_format": "png" })
    }

    fn extract_image_bytes(&self, content_type: Option<&str>, body: &[u8]) -> Option<Vec<u8>> {
        let is_image = content_type.map_or(false, |ct| ct.starts_with("image/"));
        if is_image && !body.is_empty() {
            Some(body.to_vec())
        } else {
            None
        }
    }
}

pub fn image_adapter(family: ImageProviderFamily) -> Box<dyn ImageAdapter> {
    match family {
        ImageProviderFamily::StabilityJson => Box::new(StabilityJsonAdapter),
        ImageProviderFamily::RawBytes => Box::new(RawBytesAdapter),
    }
}

/// Prompt sent to the image provider for a dish
pub fn image_prompt(dish_name: &str) -> String {
    format!(
        "professional food photography of {}, appetizing, high quality, studio lighting",
        dish_name
    )
}

/// Encode image bytes as a `data:` URI
pub fn to_data_uri(bytes: &[u8]) -> String {
    format!("data:image/png;base64,{}", STANDARD.encode(bytes))
}

/// Image-generation client
pub struct ImageGenerator {
    http_client: Client,
    adapter: Box<dyn ImageAdapter>,
    endpoint: String,
    api_key: String,
}

impl ImageGenerator {
    /// Returns `Ok(None)` when no key is configured
    pub fn from_config(
        config: &ImageProviderConfig,
        api_key: Option<String>,
    ) -> Result<Option<Self>, ResolveError> {
        let Some(api_key) = api_key else {
            return Ok(None);
        };

        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build()
            .map_err(|e| ResolveError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Some(Self {
            http_client,
            adapter: image_adapter(config.family),
            endpoint: config.endpoint.clone(),
            api_key,
        }))
    }

    /// Generate an image for a dish; `None` on any failure
    pub async fn generate(&self, dish_name: &str) -> Option<String> {
        match self.try_generate(dish_name).await {
            Ok(uri) => {
                debug!(dish = dish_name, bytes = uri.len(), "Dish image generated");
                Some(uri)
            }
            Err(reason) => {
                warn!(
                    dish = dish_name,
                    provider = self.adapter.name(),
                    "Image generation failed: {}",
                    reason
                );
                None
            }
        }
    }

    async fn try_generate(&self, dish_name: &str) -> Result<String, String> {
        let response = self
            .http_client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .header(header::ACCEPT, self.adapter.accept())
            .json(&self.adapter.request_body(&image_prompt(dish_name)))
            .send()
            .await
            .map_err(|e| format!("request failed: {}", e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(format!("provider returned {}", status));
        }

        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let body = response
            .bytes()
            .await
            .map_err(|e| format!("reading body failed: {}", e))?;

        self.adapter
            .extract_image_bytes(content_type.as_deref(), &body)
            .map(|bytes| to_data_uri(&bytes))
            .ok_or_else(|| "response did not contain an image".to_string())
    }
}
