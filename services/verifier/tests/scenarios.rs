// Scenario tests — the fact-check and media sessions driven end to end through the
// public API, with a scripted gateway standing in for the hosted model.

use async_trait::async_trait;
use catchai_core::domain::{ConversationTurn, ImageInput};
use catchai_core::ports::{ModelGateway, PortError, PortResult};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use verifier_lib::session::{
    FactCheckSession, MalformedDetectionPolicy, MediaDetectionSession, SessionError,
};

struct ScriptedGateway {
    replies: Mutex<VecDeque<PortResult<Option<String>>>>,
}

impl ScriptedGateway {
    fn shared(replies: Vec<PortResult<Option<String>>>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
        })
    }

    fn next(&self) -> PortResult<Option<String>> {
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .expect("no scripted reply left")
    }
}

#[async_trait]
impl ModelGateway for ScriptedGateway {
    async fn generate_text(&self, _prompt: &str) -> PortResult<Option<String>> {
        self.next()
    }

    async fn generate_vision(&self, _image: &ImageInput, _prompt: &str) -> PortResult<Option<String>> {
        self.next()
    }
}

fn photo() -> ImageInput {
    ImageInput::new("image/jpeg", vec![0xFF, 0xD8, 0xFF, 0xE0])
}

// ============================================================
// Fact-check session
// ============================================================

#[tokio::test]
async fn scenario_a_verdict_is_appended() {
    let gateway = ScriptedGateway::shared(vec![Ok(Some(
        r#"{"isReal":false,"confidenceScore":97,"detailedAnalysis":"The sky is blue because of Rayleigh scattering.","trustedSources":["https://nasa.gov"]}"#
            .to_string(),
    ))]);
    let session = FactCheckSession::new(gateway);

    session
        .on_send_message("Is the sky green?")
        .unwrap()
        .finished()
        .await;

    let state = session.snapshot();
    assert!(!state.is_loading);
    assert_eq!(state.history.len(), 2);
    assert_eq!(
        state.history[0].turn,
        ConversationTurn::UserText("Is the sky green?".into())
    );
    match &state.history[1].turn {
        ConversationTurn::ModelVerdict(result) => {
            assert!(!result.is_real);
            assert_eq!(result.confidence_score, 97);
            assert_eq!(result.trusted_sources, vec!["https://nasa.gov".to_string()]);
        }
        other => panic!("expected a verdict, got {:?}", other),
    }
}

#[tokio::test]
async fn scenario_b_plain_text_becomes_a_model_error() {
    let gateway = ScriptedGateway::shared(vec![Ok(Some(
        "Hi there! I can only fact-check claims.".to_string(),
    ))]);
    let session = FactCheckSession::new(gateway);

    session.on_send_message("hello").unwrap().finished().await;

    let turns: Vec<_> = session.snapshot().turns().cloned().collect();
    assert_eq!(
        turns,
        vec![
            ConversationTurn::UserText("hello".into()),
            ConversationTurn::ModelError("Hi there! I can only fact-check claims.".into()),
        ]
    );
    assert_eq!(session.snapshot().last_error, None);
}

#[tokio::test]
async fn scenario_c_transport_failure_is_recorded() {
    let gateway = ScriptedGateway::shared(vec![Err(PortError::Transport("timeout".into()))]);
    let session = FactCheckSession::new(gateway);

    session
        .on_send_message("The moon is made of cheese")
        .unwrap()
        .finished()
        .await;

    let state = session.snapshot();
    assert_eq!(
        state.history[1].turn,
        ConversationTurn::ModelError("timeout".into())
    );
    assert_eq!(state.last_error.as_deref(), Some("timeout"));
    assert!(!state.is_loading);
}

#[tokio::test]
async fn fenced_verdict_matches_unfenced_verdict() {
    let body = r#"{"isReal":true,"confidenceScore":70,"detailedAnalysis":"Plausible.","trustedSources":[]}"#;
    let gateway = ScriptedGateway::shared(vec![
        Ok(Some(body.to_string())),
        Ok(Some(format!("```json\n{}\n```", body))),
    ]);
    let session = FactCheckSession::new(gateway);

    session.on_send_message("claim").unwrap().finished().await;
    session.on_send_message("claim").unwrap().finished().await;

    let state = session.snapshot();
    assert_eq!(state.history[1].turn, state.history[3].turn);
    assert!(matches!(state.history[3].turn, ConversationTurn::ModelVerdict(_)));
}

#[tokio::test]
async fn history_keeps_every_turn_in_order() {
    let gateway = ScriptedGateway::shared(vec![
        Err(PortError::Transport("offline".into())),
        Ok(Some("Sorry, that's not a claim.".into())),
        Ok(Some(
            r#"{"isReal":true,"confidenceScore":150,"detailedAnalysis":"x","trustedSources":["https://a"]}"#
                .into(),
        )),
    ]);
    let session = FactCheckSession::new(gateway);
    let mut updates = session.subscribe();

    for claim in ["one", "two", "three"] {
        session.on_send_message(claim).unwrap().finished().await;
    }
    // A blank send in between must not disturb anything.
    assert!(!session.on_send_message("   ").unwrap().is_started());

    assert!(updates.has_changed().unwrap());
    let state = updates.borrow_and_update().clone();
    let kinds: Vec<&str> = state
        .turns()
        .map(|turn| match turn {
            ConversationTurn::UserText(_) => "user",
            ConversationTurn::ModelVerdict(_) => "verdict",
            ConversationTurn::ModelError(_) => "error",
        })
        .collect();
    assert_eq!(
        kinds,
        vec!["user", "error", "user", "error", "user", "verdict"]
    );
    // The second send cleared the transport failure.
    assert_eq!(state.last_error, None);

    match &state.history[5].turn {
        ConversationTurn::ModelVerdict(result) => assert_eq!(result.confidence_score, 100),
        other => panic!("expected a verdict, got {:?}", other),
    }
}

// ============================================================
// Media detection session
// ============================================================

#[tokio::test]
async fn scenario_d_silent_policy_drops_malformed_replies() {
    let gateway = ScriptedGateway::shared(vec![Ok(Some("{\"isAiGenerated\": tru".into()))]);
    let session = MediaDetectionSession::with_policy(gateway, MalformedDetectionPolicy::Silent);

    session.on_analyze_click(photo()).unwrap().finished().await;

    let state = session.snapshot();
    assert_eq!(state.latest_result, None);
    assert_eq!(state.error_message, None);
    assert!(!state.is_loading);
}

#[tokio::test]
async fn scenario_d_default_policy_surfaces_malformed_replies() {
    let gateway = ScriptedGateway::shared(vec![Ok(Some("{\"isAiGenerated\": tru".into()))]);
    let session = MediaDetectionSession::new(gateway);

    session.on_analyze_click(photo()).unwrap().finished().await;

    let state = session.snapshot();
    assert_eq!(state.latest_result, None);
    assert_eq!(state.error_message.as_deref(), Some("{\"isAiGenerated\": tru"));
    assert!(!state.is_loading);
}

#[tokio::test]
async fn each_analysis_overwrites_the_previous_result() {
    let gateway = ScriptedGateway::shared(vec![
        Ok(Some(
            r#"{"isAiGenerated":true,"confidencePercentage":90,"briefDescription":"Melted text."}"#
                .into(),
        )),
        Ok(Some(
            r#"```json
{"isAiGenerated":false,"confidencePercentage":75,"briefDescription":"Press photo.","originalSource":"https://example.com/photo"}
```"#
                .into(),
        )),
    ]);
    let session = MediaDetectionSession::new(gateway);

    session.on_analyze_click(photo()).unwrap().finished().await;
    assert!(session.snapshot().latest_result.unwrap().is_ai_generated);

    session.on_analyze_click(photo()).unwrap().finished().await;
    let result = session.snapshot().latest_result.unwrap();
    assert!(!result.is_ai_generated);
    assert_eq!(result.original_source.as_deref(), Some("https://example.com/photo"));
}

#[tokio::test]
async fn shut_down_sessions_refuse_new_work() {
    let session = MediaDetectionSession::new(ScriptedGateway::shared(vec![]));
    session.shutdown();
    assert_eq!(
        session.on_analyze_click(photo()).unwrap_err(),
        SessionError::Closed
    );
    assert!(!session.snapshot().is_loading);
}
