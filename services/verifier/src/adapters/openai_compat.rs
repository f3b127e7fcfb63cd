//! services/verifier/src/adapters/openai_compat.rs
//!
//! Adapter for any OpenAI-compatible chat completions endpoint. By default it targets
//! Gemini's OpenAI compatibility layer, so the same API key works for both adapters.
//! It implements the `ModelGateway` port from the `core` crate.

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::{
        ChatCompletionRequestMessage, ChatCompletionRequestMessageContentPartImageArgs,
        ChatCompletionRequestMessageContentPartTextArgs, ChatCompletionRequestUserMessageArgs,
        ChatCompletionRequestUserMessageContent, ChatCompletionRequestUserMessageContentPart,
        CreateChatCompletionRequestArgs, CreateChatCompletionResponse, ImageDetail, ImageUrlArgs,
    },
    Client,
};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use catchai_core::{
    domain::ImageInput,
    ports::{ModelGateway, PortError, PortResult},
};
use tracing::{error, info};

pub const GEMINI_OPENAI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/openai";

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `ModelGateway` using an OpenAI-compatible LLM.
#[derive(Clone)]
pub struct OpenAiCompatGateway {
    client: Client<OpenAIConfig>,
    text_model: String,
    vision_model: String,
}

impl OpenAiCompatGateway {
    /// Creates a new `OpenAiCompatGateway`.
    pub fn new(client: Client<OpenAIConfig>, text_model: String, vision_model: String) -> Self {
        Self {
            client,
            text_model,
            vision_model,
        }
    }

    /// Builds the underlying client for `api_base` (Gemini's compatibility layer when `None`).
    pub fn client_for(api_key: &str, api_base: Option<&str>) -> Client<OpenAIConfig> {
        let config = OpenAIConfig::new()
            .with_api_key(api_key)
            .with_api_base(api_base.unwrap_or(GEMINI_OPENAI_API_BASE));
        Client::with_config(config)
    }

    async fn complete(
        &self,
        model: &str,
        content: ChatCompletionRequestUserMessageContent,
    ) -> PortResult<Option<String>> {
        let message = ChatCompletionRequestUserMessageArgs::default()
            .content(content)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let messages: Vec<ChatCompletionRequestMessage> = vec![message.into()];
        let request = CreateChatCompletionRequestArgs::default()
            .model(model)
            .messages(messages)
            .n(1)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        // Map the error manually, which respects the orphan rule.
        let response = self.client.chat().create(request).await.map_err(|e| {
            error!("Chat completion request failed: {}", e);
            map_openai_error(e)
        })?;

        Ok(first_choice_text(response))
    }
}

//=========================================================================================
// `ModelGateway` Trait Implementation
//=========================================================================================

#[async_trait]
impl ModelGateway for OpenAiCompatGateway {
    async fn generate_text(&self, prompt: &str) -> PortResult<Option<String>> {
        info!("Chat completion text request: model={}", self.text_model);
        self.complete(&self.text_model, prompt.into()).await
    }

    async fn generate_vision(
        &self,
        image: &ImageInput,
        prompt: &str,
    ) -> PortResult<Option<String>> {
        info!(
            "Chat completion vision request: model={}, image_bytes={}",
            self.vision_model,
            image.data.len()
        );

        let image_part = ChatCompletionRequestMessageContentPartImageArgs::default()
            .image_url(
                ImageUrlArgs::default()
                    .url(data_url(image))
                    .detail(ImageDetail::Auto)
                    .build()
                    .map_err(|e| PortError::Unexpected(e.to_string()))?,
            )
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        let text_part = ChatCompletionRequestMessageContentPartTextArgs::default()
            .text(prompt)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let content = ChatCompletionRequestUserMessageContent::Array(vec![
            ChatCompletionRequestUserMessageContentPart::ImageUrl(image_part),
            ChatCompletionRequestUserMessageContentPart::Text(text_part),
        ]);
        self.complete(&self.vision_model, content).await
    }
}

/// Inlines the image as a base64 `data:` URL.
fn data_url(image: &ImageInput) -> String {
    format!("data:{};base64,{}", image.mime_type, STANDARD.encode(&image.data))
}

fn first_choice_text(response: CreateChatCompletionResponse) -> Option<String> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .filter(|text| !text.is_empty())
}

fn map_openai_error(e: OpenAIError) -> PortError {
    match e {
        OpenAIError::Reqwest(e) => PortError::Transport(e.to_string()),
        OpenAIError::ApiError(api) => PortError::Transport(api.message),
        other => PortError::Unexpected(other.to_string()),
    }
}
