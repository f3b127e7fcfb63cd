pub mod gemini;
pub mod openai_compat;

pub use gemini::GeminiGateway;
pub use openai_compat::OpenAiCompatGateway;

use crate::config::{Config, ModelProvider};
use catchai_core::ports::ModelGateway;
use std::sync::Arc;
use tracing::info;

/// Builds the single gateway handle shared by every session.
pub fn build_gateway(config: &Config) -> Arc<dyn ModelGateway> {
    match config.provider {
        ModelProvider::Gemini => {
            info!("Using the native Gemini gateway.");
            let gateway = GeminiGateway::new(
                config.api_key.clone(),
                config.text_model.clone(),
                config.vision_model.clone(),
            );
            match &config.api_base {
                Some(base) => Arc::new(gateway.with_base_url(base.as_str())),
                None => Arc::new(gateway),
            }
        }
        ModelProvider::OpenAiCompat => {
            info!("Using the OpenAI-compatible gateway.");
            let client =
                OpenAiCompatGateway::client_for(&config.api_key, config.api_base.as_deref());
            Arc::new(OpenAiCompatGateway::new(
                client,
                config.text_model.clone(),
                config.vision_model.clone(),
            ))
        }
    }
}
