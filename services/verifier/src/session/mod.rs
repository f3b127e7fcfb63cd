//! services/verifier/src/session/mod.rs
//!
//! The two session controllers. Each one owns its state exclusively, publishes
//! snapshots over a `watch` channel, and runs at most one model request at a time.

pub mod fact_check;
pub mod media_detection;
pub mod prompts;
pub mod state;

pub use fact_check::FactCheckSession;
pub use media_detection::{MalformedDetectionPolicy, MediaDetectionSession};
pub use state::{FactCheckEvent, FactCheckState, MediaDetectionEvent, MediaDetectionState};

use tokio::task::JoinHandle;
use tracing::warn;

/// Why a session refused to start a request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// A request is already outstanding for this session.
    #[error("a request is already in progress")]
    Busy,
    /// The session was shut down and accepts no more requests.
    #[error("the session has been shut down")]
    Closed,
}

/// What a session did with an event.
#[derive(Debug)]
pub enum Dispatch {
    /// Nothing was sent; no request was started.
    Ignored,
    /// A request is in flight. The handle resolves after its outcome is published
    /// (or after it was discarded by a shutdown).
    Started(JoinHandle<()>),
}

impl Dispatch {
    pub fn is_started(&self) -> bool {
        matches!(self, Dispatch::Started(_))
    }

    /// Waits for the request, if any, to reach its terminal state.
    pub async fn finished(self) {
        if let Dispatch::Started(handle) = self {
            if let Err(e) = handle.await {
                warn!("Session request task ended abnormally: {}", e);
            }
        }
    }
}
