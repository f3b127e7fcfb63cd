//! crates/catchai_core/src/ports.rs
//!
//! Defines the service contract (trait) between the session controllers and the
//! hosted generative model. Adapters in the service crate implement it; the core
//! never knows which provider sits behind it.

use crate::domain::ImageInput;
use async_trait::async_trait;

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A failure reaching the model, abstracted away from any particular HTTP client.
///
/// The `Display` text is what a user sees, so transport messages are passed
/// through untouched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PortError {
    #[error("{0}")]
    Transport(String),
    #[error("Invalid API key")]
    Unauthorized,
    #[error("API quota exceeded - please check your account")]
    QuotaExceeded,
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait ModelGateway: Send + Sync {
    /// Sends a single instruction to the text model.
    ///
    /// `Ok(None)` means the call succeeded but the model produced no text.
    async fn generate_text(&self, prompt: &str) -> PortResult<Option<String>>;

    /// Sends one image plus an instruction to the vision model.
    async fn generate_vision(&self, image: &ImageInput, prompt: &str)
        -> PortResult<Option<String>>;
}
