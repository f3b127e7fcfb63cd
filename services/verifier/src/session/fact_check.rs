//! services/verifier/src/session/fact_check.rs
//!
//! The fact-check conversation controller: an append-only history of user claims
//! and model verdicts, one model request per turn.

use super::{prompts, Dispatch, FactCheckEvent, FactCheckState, SessionError};
use catchai_core::{
    domain::{ConversationTurn, FactCheckResult, HistoryEntry},
    parser::{parse, ParseFailure},
    ports::ModelGateway,
};
use std::sync::Arc;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Owns one fact-check conversation.
///
/// Requests run on spawned tokio tasks, so the sending methods must be called from
/// within a tokio runtime. Dropping the session cancels any outstanding request.
pub struct FactCheckSession {
    gateway: Arc<dyn ModelGateway>,
    state: Arc<watch::Sender<FactCheckState>>,
    cancellation_token: CancellationToken,
}

impl FactCheckSession {
    pub fn new(gateway: Arc<dyn ModelGateway>) -> Self {
        let (state, _) = watch::channel(FactCheckState::default());
        Self {
            gateway,
            state: Arc::new(state),
            cancellation_token: CancellationToken::new(),
        }
    }

    /// A receiver that sees every published snapshot.
    pub fn subscribe(&self) -> watch::Receiver<FactCheckState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> FactCheckState {
        self.state.borrow().clone()
    }

    pub fn handle_event(&self, event: FactCheckEvent) -> Result<Dispatch, SessionError> {
        match event {
            FactCheckEvent::MessageChanged(text) => {
                self.on_message_change(text);
                Ok(Dispatch::Ignored)
            }
            FactCheckEvent::SendMessage(text) => self.on_send_message(&text),
        }
    }

    /// Replaces the pending input text.
    pub fn on_message_change(&self, text: impl Into<String>) {
        let text = text.into();
        self.state.send_modify(|state| state.pending_input_text = text);
    }

    /// Appends `text` as a user turn and asks the model to check it.
    ///
    /// Blank text is ignored. While a previous request is outstanding the call is
    /// rejected with [`SessionError::Busy`] and the state is left untouched.
    pub fn on_send_message(&self, text: &str) -> Result<Dispatch, SessionError> {
        if self.cancellation_token.is_cancelled() {
            return Err(SessionError::Closed);
        }
        if text.trim().is_empty() {
            debug!("Ignoring blank fact-check input.");
            return Ok(Dispatch::Ignored);
        }

        let claim = text.to_string();
        let mut accepted = false;
        self.state.send_if_modified(|state| {
            if state.is_loading {
                return false;
            }
            state
                .history
                .push(HistoryEntry::new(ConversationTurn::UserText(claim.clone())));
            state.pending_input_text.clear();
            state.is_loading = true;
            state.last_error = None;
            accepted = true;
            true
        });

        if !accepted {
            warn!("Fact-check request rejected: another one is still outstanding.");
            return Err(SessionError::Busy);
        }

        info!("Fact-check request started ({} chars).", claim.chars().count());
        let handle = tokio::spawn(run_fact_check(
            self.gateway.clone(),
            self.state.clone(),
            self.cancellation_token.clone(),
            claim,
        ));
        Ok(Dispatch::Started(handle))
    }

    /// Cancels the outstanding request, if any, and refuses further ones.
    pub fn shutdown(&self) {
        self.cancellation_token.cancel();
    }
}

impl Drop for FactCheckSession {
    fn drop(&mut self) {
        self.cancellation_token.cancel();
    }
}

/// The worker for one turn: a single model call, then exactly one publish.
async fn run_fact_check(
    gateway: Arc<dyn ModelGateway>,
    state: Arc<watch::Sender<FactCheckState>>,
    cancellation_token: CancellationToken,
    claim: String,
) {
    let prompt = prompts::fact_check_prompt(&claim);

    let reply = tokio::select! {
        biased;
        _ = cancellation_token.cancelled() => {
            info!("Fact-check session shut down; discarding the outstanding request.");
            return;
        }
        reply = gateway.generate_text(&prompt) => reply,
    };

    let (turn, failure) = match reply {
        Ok(text) => (turn_from_reply(text.as_deref()), None),
        Err(e) => {
            error!("Fact-check request failed: {}", e);
            let description = e.to_string();
            (ConversationTurn::ModelError(description.clone()), Some(description))
        }
    };

    state.send_modify(|state| {
        state.history.push(HistoryEntry::new(turn));
        state.is_loading = false;
        if failure.is_some() {
            state.last_error = failure;
        }
    });
    info!("Fact-check request finished.");
}

/// Maps raw model text onto the terminal turn for this exchange.
fn turn_from_reply(text: Option<&str>) -> ConversationTurn {
    match parse::<FactCheckResult>(text) {
        Ok(result) => ConversationTurn::ModelVerdict(result),
        Err(ParseFailure::Empty) => {
            warn!("Model returned no text for a fact-check.");
            ConversationTurn::ModelError(prompts::FALLBACK_REPLY.to_string())
        }
        Err(ParseFailure::Malformed { raw, reason }) => {
            warn!("Model reply is not a fact-check verdict: {}", reason);
            if raw.trim().is_empty() {
                ConversationTurn::ModelError(prompts::FALLBACK_REPLY.to_string())
            } else {
                ConversationTurn::ModelError(raw)
            }
        }
    }
}
