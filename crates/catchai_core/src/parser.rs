//! crates/catchai_core/src/parser.rs
//!
//! Turns raw model output into one of the verdict schemas.
//!
//! Models tend to wrap JSON in a markdown code block, so the known fence markers are
//! removed before a strict decode. Decoding is purely structural: unknown fields are
//! ignored, while missing fields or wrong types make the whole reply malformed.

use serde::de::DeserializeOwned;
use tracing::debug;

const JSON_FENCE: &str = "```json";
const FENCE: &str = "```";

/// Why a model reply could not become a typed verdict.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseFailure {
    /// The model returned no text at all.
    #[error("the model returned no text")]
    Empty,
    /// Text was present but did not decode. `raw` is the text exactly as received.
    #[error("the model reply is not a valid verdict: {reason}")]
    Malformed { raw: String, reason: String },
}

/// Removes every ```` ```json ```` and ```` ``` ```` marker and trims the result.
pub fn strip_fences(raw: &str) -> String {
    raw.replace(JSON_FENCE, "").replace(FENCE, "").trim().to_string()
}

/// Strips fences from `raw` and decodes it into `T`.
pub fn parse<T: DeserializeOwned>(raw: Option<&str>) -> Result<T, ParseFailure> {
    let raw = raw.ok_or(ParseFailure::Empty)?;
    let cleaned = strip_fences(raw);

    serde_json::from_str::<T>(&cleaned).map_err(|e| {
        debug!("Model reply failed to decode: {}", e);
        ParseFailure::Malformed {
            raw: raw.to_string(),
            reason: e.to_string(),
        }
    })
}
