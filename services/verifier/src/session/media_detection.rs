//! services/verifier/src/session/media_detection.rs
//!
//! The single-shot media detection controller. No history is kept: every finished
//! analysis replaces the previous result.

use super::{prompts, Dispatch, MediaDetectionEvent, MediaDetectionState, SessionError};
use catchai_core::{
    domain::{DetectionResult, ImageInput},
    parser::{parse, ParseFailure},
    ports::ModelGateway,
};
use std::sync::Arc;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// What to do when the vision model answers with something that is not a verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MalformedDetectionPolicy {
    /// Clear the result and show an error message.
    #[default]
    Surface,
    /// Keep the previous result and show nothing; only the loading flag changes.
    Silent,
}

/// Owns one media detection screen's state.
///
/// Must be driven from within a tokio runtime. Dropping the session cancels any
/// outstanding analysis.
pub struct MediaDetectionSession {
    gateway: Arc<dyn ModelGateway>,
    state: Arc<watch::Sender<MediaDetectionState>>,
    policy: MalformedDetectionPolicy,
    cancellation_token: CancellationToken,
}

impl MediaDetectionSession {
    pub fn new(gateway: Arc<dyn ModelGateway>) -> Self {
        Self::with_policy(gateway, MalformedDetectionPolicy::default())
    }

    pub fn with_policy(gateway: Arc<dyn ModelGateway>, policy: MalformedDetectionPolicy) -> Self {
        let (state, _) = watch::channel(MediaDetectionState::default());
        Self {
            gateway,
            state: Arc::new(state),
            policy,
            cancellation_token: CancellationToken::new(),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<MediaDetectionState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> MediaDetectionState {
        self.state.borrow().clone()
    }

    pub fn handle_event(&self, event: MediaDetectionEvent) -> Result<Dispatch, SessionError> {
        match event {
            MediaDetectionEvent::AnalyzeClicked(image) => self.on_analyze_click(image),
        }
    }

    /// Sends `image` to the vision model and publishes the verdict when it arrives.
    pub fn on_analyze_click(&self, image: ImageInput) -> Result<Dispatch, SessionError> {
        if self.cancellation_token.is_cancelled() {
            return Err(SessionError::Closed);
        }

        let accepted = self.state.send_if_modified(|state| {
            if state.is_loading {
                return false;
            }
            state.is_loading = true;
            state.error_message = None;
            true
        });

        if !accepted {
            warn!("Media analysis rejected: another one is still outstanding.");
            return Err(SessionError::Busy);
        }

        info!(
            "Media analysis started ({}, {} bytes).",
            image.mime_type,
            image.data.len()
        );
        let handle = tokio::spawn(run_detection(
            self.gateway.clone(),
            self.state.clone(),
            self.policy,
            self.cancellation_token.clone(),
            image,
        ));
        Ok(Dispatch::Started(handle))
    }

    /// Cancels the outstanding analysis, if any, and refuses further ones.
    pub fn shutdown(&self) {
        self.cancellation_token.cancel();
    }
}

impl Drop for MediaDetectionSession {
    fn drop(&mut self) {
        self.cancellation_token.cancel();
    }
}

async fn run_detection(
    gateway: Arc<dyn ModelGateway>,
    state: Arc<watch::Sender<MediaDetectionState>>,
    policy: MalformedDetectionPolicy,
    cancellation_token: CancellationToken,
    image: ImageInput,
) {
    let reply = tokio::select! {
        biased;
        _ = cancellation_token.cancelled() => {
            info!("Media detection session shut down; discarding the outstanding analysis.");
            return;
        }
        reply = gateway.generate_vision(&image, prompts::DETECTION_PROMPT) => reply,
    };

    match reply {
        Ok(text) => match parse::<DetectionResult>(text.as_deref()) {
            Ok(result) => {
                debug!(
                    "Detection verdict: ai_generated={}, confidence={}",
                    result.is_ai_generated, result.confidence_percentage
                );
                state.send_modify(|state| {
                    state.latest_result = Some(result);
                    state.is_loading = false;
                });
            }
            Err(failure) => {
                warn!("Vision reply is not a detection verdict: {}", failure);
                let message = match failure {
                    ParseFailure::Malformed { raw, .. } if !raw.trim().is_empty() => raw,
                    _ => prompts::FALLBACK_REPLY.to_string(),
                };
                state.send_modify(|state| {
                    state.is_loading = false;
                    if policy == MalformedDetectionPolicy::Surface {
                        state.latest_result = None;
                        state.error_message = Some(message);
                    }
                });
            }
        },
        Err(e) => {
            error!("Media analysis failed: {}", e);
            state.send_modify(|state| {
                state.is_loading = false;
                state.error_message = Some(e.to_string());
            });
        }
    }
    info!("Media analysis finished.");
}
