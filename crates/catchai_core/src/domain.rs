//! crates/catchai_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! The two verdict schemas double as the wire format the model is asked to produce,
//! so they carry serde attributes matching the JSON field names.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

//=========================================================================================
// Model Verdicts
//=========================================================================================

/// A fact-check verdict for a single textual claim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FactCheckResult {
    pub is_real: bool,
    /// How sure the model is of `is_real`, always within 0..=100.
    #[serde(deserialize_with = "clamped_percentage")]
    pub confidence_score: u8,
    pub detailed_analysis: String,
    /// Source URLs in the order the model listed them.
    pub trusted_sources: Vec<String>,
}

/// An AI-generated-media verdict for a single image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionResult {
    pub is_ai_generated: bool,
    #[serde(deserialize_with = "clamped_percentage")]
    pub confidence_percentage: u8,
    pub brief_description: String,
    #[serde(default)]
    pub original_source: Option<String>,
}

/// Accepts any JSON integer and pins it into 0..=100.
/// Non-integers (floats, strings) are still rejected.
fn clamped_percentage<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let value = i64::deserialize(deserializer)?;
    Ok(value.clamp(0, 100) as u8)
}

//=========================================================================================
// Conversation History
//=========================================================================================

/// One discrete entry in a fact-check conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversationTurn {
    /// The claim exactly as the user submitted it.
    UserText(String),
    /// A successfully decoded verdict.
    ModelVerdict(FactCheckResult),
    /// Anything that could not become a verdict: the model's own text, a fallback
    /// apology, or a transport failure description.
    ModelError(String),
}

impl ConversationTurn {
    /// True for turns produced by the model side of the exchange.
    pub fn is_model_turn(&self) -> bool {
        !matches!(self, ConversationTurn::UserText(_))
    }
}

/// A history slot: a turn plus a stable identity for list rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub turn: ConversationTurn,
}

impl HistoryEntry {
    pub fn new(turn: ConversationTurn) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            turn,
        }
    }
}

//=========================================================================================
// Media
//=========================================================================================

/// An encoded image (PNG, JPEG, ...) handed to the vision model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageInput {
    pub mime_type: String,
    pub data: Bytes,
}

impl ImageInput {
    pub fn new(mime_type: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data: data.into(),
        }
    }

    /// Guesses a MIME type from a file extension, case-insensitively.
    pub fn mime_type_for_extension(extension: &str) -> Option<&'static str> {
        match extension.to_ascii_lowercase().as_str() {
            "png" => Some("image/png"),
            "jpg" | "jpeg" => Some("image/jpeg"),
            "webp" => Some("image/webp"),
            "gif" => Some("image/gif"),
            "heic" => Some("image/heic"),
            "heif" => Some("image/heif"),
            _ => None,
        }
    }
}
