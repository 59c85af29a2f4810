//! Vision call that asks a multimodal model to read a book cover.
//!
//! One request per call, no retries: a failure surfaces immediately and the
//! caller decides what to do with it.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{error, info, warn};

use super::image_prep::split_data_uri;
use super::prompts::DEFAULT_PROMPT;
use crate::error::{Result, ScoutError};

/// Model used for every identification request.
pub const MODEL_NAME: &str = "gemini-2.5-flash-preview-04-17";

pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Marker the provider puts in the error body for a rejected credential.
const INVALID_KEY_MARKER: &str = "API key not valid";

/// Anything that can turn a cover image and a prompt into raw model text.
#[async_trait]
pub trait BookIdentifier: Send + Sync {
    /// `image` is a `data:<mime>;base64,<payload>` URI.
    async fn identify(&self, image: &str, prompt: &str) -> Result<String>;

    async fn identify_default(&self, image: &str) -> Result<String> {
        self.identify(image, DEFAULT_PROMPT).await
    }
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

impl GenerateContentResponse {
    /// Concatenated text parts of the first candidate.
    fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect::<String>()
            })
            .unwrap_or_default()
    }
}

/// Client for the Gemini `generateContent` REST endpoint.
pub struct GeminiClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl GeminiClient {
    pub fn new(api_key: &str, base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ScoutError::Transport(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, MODEL_NAME)
    }
}

#[async_trait]
impl BookIdentifier for GeminiClient {
    async fn identify(&self, image: &str, prompt: &str) -> Result<String> {
        let (mime_type, data) = split_data_uri(image);

        let body = serde_json::json!({
            "contents": [{
                "parts": [
                    {"inlineData": {"mimeType": mime_type, "data": data}},
                    {"text": prompt}
                ]
            }]
        });

        info!("Sending {} image to {}", mime_type, MODEL_NAME);

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    error!("Model request timed out: {}", e);
                } else {
                    error!("Model request failed: {}", e);
                }
                ScoutError::ModelRequest
            })?;

        let status = response.status();
        let body_text = response.text().await.map_err(|e| {
            error!("Failed to read model response body: {}", e);
            ScoutError::ModelRequest
        })?;

        if !status.is_success() {
            error!("Model API error: {} - {}", status, body_text);
            if body_text.contains(INVALID_KEY_MARKER) {
                return Err(ScoutError::InvalidCredential);
            }
            return Err(ScoutError::ModelRequest);
        }

        let parsed: GenerateContentResponse = serde_json::from_str(&body_text).map_err(|e| {
            error!("Failed to parse model response wrapper: {}", e);
            ScoutError::ModelRequest
        })?;

        let text = parsed.text();
        if text.is_empty() {
            warn!("Model response contained no text");
        }
        Ok(text)
    }
}
