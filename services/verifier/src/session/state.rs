//! services/verifier/src/session/state.rs
//!
//! Defines the observable state of each session and the events a UI feeds into it.

use catchai_core::domain::{ConversationTurn, DetectionResult, HistoryEntry, ImageInput};

//=========================================================================================
// Fact-Check Session
//=========================================================================================

/// Everything a fact-check screen needs to draw itself.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FactCheckState {
    /// Text currently in the input box.
    pub pending_input_text: String,
    /// Oldest first. Entries are only ever appended.
    pub history: Vec<HistoryEntry>,
    pub is_loading: bool,
    /// Description of the most recent transport failure, cleared on the next send.
    pub last_error: Option<String>,
}

impl FactCheckState {
    /// The turns in insertion order, without their entry metadata.
    pub fn turns(&self) -> impl Iterator<Item = &ConversationTurn> {
        self.history.iter().map(|entry| &entry.turn)
    }

    /// Newest first, for bottom-anchored chat lists.
    pub fn newest_first(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.history.iter().rev()
    }
}

/// Input events produced by a fact-check screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FactCheckEvent {
    MessageChanged(String),
    SendMessage(String),
}

//=========================================================================================
// Media Detection Session
//=========================================================================================

/// Everything a media-detection screen needs to draw itself.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediaDetectionState {
    pub latest_result: Option<DetectionResult>,
    pub is_loading: bool,
    pub error_message: Option<String>,
}

/// Input events produced by a media-detection screen.
#[derive(Debug, Clone)]
pub enum MediaDetectionEvent {
    /// The user asked to analyze an image they already picked.
    AnalyzeClicked(ImageInput),
}
