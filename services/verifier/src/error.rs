//! services/verifier/src/error.rs
//!
//! Defines the primary error type for the verifier service.

use crate::config::ConfigError;
use crate::session::SessionError;
use catchai_core::ports::PortError;

/// The primary error type for the `verifier` service.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents an error that propagated up from the model gateway port.
    #[error("Model Gateway Error: {0}")]
    Port(#[from] PortError),

    /// A session refused an operation.
    #[error("Session Error: {0}")]
    Session(#[from] SessionError),

    /// Represents a standard Input/Output error (e.g., reading an image or stdin).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A catch-all for any other unexpected errors.
    #[error("An unexpected internal error occurred: {0}")]
    Internal(String),
}
