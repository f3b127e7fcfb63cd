//! services/verifier/src/adapters/gemini.rs
//!
//! Adapter for Gemini's native `generateContent` REST API.
//! It implements the `ModelGateway` port from the `core` crate.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use catchai_core::{
    domain::ImageInput,
    ports::{ModelGateway, PortError, PortResult},
};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

pub const GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// Talks to Gemini directly. One text model and one vision model share a client.
#[derive(Clone)]
pub struct GeminiGateway {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    text_model: String,
    vision_model: String,
}

impl GeminiGateway {
    pub fn new(api_key: String, text_model: String, vision_model: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            base_url: GEMINI_API_URL.to_string(),
            text_model,
            vision_model,
        }
    }

    /// Points the adapter at a different host, e.g. a regional endpoint or a proxy.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn endpoint(&self, model: &str) -> String {
        let model = model.trim_start_matches("models/");
        format!("{}/models/{}:generateContent", self.base_url, model)
    }

    async fn generate(&self, model: &str, parts: Vec<GeminiPart>) -> PortResult<Option<String>> {
        let request = GeminiRequest {
            contents: vec![GeminiContent { parts }],
        };

        let response = self
            .client
            .post(self.endpoint(model))
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                error!("Gemini API request failed: {}", e);
                if e.is_timeout() {
                    PortError::Transport("Request timeout - please try again".to_string())
                } else if e.is_connect() {
                    PortError::Transport("Network error - please check your connection".to_string())
                } else {
                    PortError::Transport(format!("Request failed: {}", e))
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| PortError::Transport(format!("Failed to read response: {}", e)))?;
        debug!("Gemini API response status: {}", status);

        if !status.is_success() {
            error!("Gemini API error: status={}, body={}", status, body);
            return Err(map_api_error(status, &body));
        }

        let parsed: GeminiResponse = serde_json::from_str(&body)
            .map_err(|e| PortError::Unexpected(format!("Failed to parse response: {}", e)))?;
        extract_text(parsed)
    }
}

//=========================================================================================
// `ModelGateway` Trait Implementation
//=========================================================================================

#[async_trait]
impl ModelGateway for GeminiGateway {
    async fn generate_text(&self, prompt: &str) -> PortResult<Option<String>> {
        info!("Gemini text request: model={}", self.text_model);
        self.generate(
            &self.text_model,
            vec![GeminiPart::Text {
                text: prompt.to_string(),
            }],
        )
        .await
    }

    async fn generate_vision(
        &self,
        image: &ImageInput,
        prompt: &str,
    ) -> PortResult<Option<String>> {
        info!(
            "Gemini vision request: model={}, image_bytes={}",
            self.vision_model,
            image.data.len()
        );
        let parts = vec![
            GeminiPart::InlineData {
                inline_data: GeminiInlineData {
                    mime_type: image.mime_type.clone(),
                    data: STANDARD.encode(&image.data),
                },
            },
            GeminiPart::Text {
                text: prompt.to_string(),
            },
        ];
        self.generate(&self.vision_model, parts).await
    }
}

//=========================================================================================
// Response Handling
//=========================================================================================

/// Joins the text parts of the first candidate. No candidate or no text is `None`.
fn extract_text(response: GeminiResponse) -> PortResult<Option<String>> {
    if let Some(error) = response.error {
        return Err(PortError::Transport(error.message));
    }

    let text: String = response
        .candidates
        .and_then(|c| c.into_iter().next())
        .and_then(|c| c.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|part| part.text)
                .collect()
        })
        .unwrap_or_default();

    if text.is_empty() {
        Ok(None)
    } else {
        Ok(Some(text))
    }
}

fn map_api_error(status: StatusCode, body: &str) -> PortError {
    if let Ok(GeminiResponse {
        error: Some(error), ..
    }) = serde_json::from_str::<GeminiResponse>(body)
    {
        return match error.status.as_deref() {
            Some("INVALID_ARGUMENT") if error.message.contains("API key") => PortError::Unauthorized,
            Some("PERMISSION_DENIED") | Some("UNAUTHENTICATED") => PortError::Unauthorized,
            Some("RESOURCE_EXHAUSTED") => PortError::QuotaExceeded,
            _ => PortError::Transport(error.message),
        };
    }

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => PortError::Unauthorized,
        StatusCode::TOO_MANY_REQUESTS => PortError::QuotaExceeded,
        _ => PortError::Transport(format!("API error ({}): {}", status, body)),
    }
}

// --- Gemini API request/response types ---

#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum GeminiPart {
    Text { text: String },
    InlineData { inline_data: GeminiInlineData },
}

#[derive(Debug, Serialize)]
struct GeminiInlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    candidates: Option<Vec<GeminiCandidate>>,
    error: Option<GeminiError>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    // Absent when the candidate was blocked by safety filters.
    content: Option<GeminiResponseContent>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponseContent {
    #[serde(default)]
    parts: Vec<GeminiResponsePart>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    message: String,
    status: Option<String>,
}
