//! services/verifier/src/bin/verifier.rs
//!
//! Terminal driver for both sessions. Each stdin line is a claim to fact-check,
//! `/analyze <path>` runs media detection on an image file, `/quit` exits.

use catchai_core::domain::{ConversationTurn, ImageInput};
use std::path::Path;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::watch;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use verifier_lib::{
    adapters::build_gateway,
    config::Config,
    error::AppError,
    session::{FactCheckSession, FactCheckState, MediaDetectionSession, MediaDetectionState},
};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Config::from_env()?;
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
    info!(
        "Configuration loaded: provider={:?}, text_model={}, vision_model={}",
        config.provider, config.text_model, config.vision_model
    );

    // --- 2. Build the Gateway & Sessions ---
    let gateway = build_gateway(&config);
    let fact_check = FactCheckSession::new(gateway.clone());
    let media = MediaDetectionSession::with_policy(gateway, config.malformed_detection);

    // --- 3. Render Published State ---
    let fact_check_renderer = tokio::spawn(render_fact_check(fact_check.subscribe()));
    let media_renderer = tokio::spawn(render_media(media.subscribe()));

    println!("Type a claim to fact-check, `/analyze <image path>` to inspect an image, `/quit` to exit.");

    // --- 4. Read Input ---
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line == "/quit" {
            break;
        }

        let dispatch = if let Some(path) = line.strip_prefix("/analyze") {
            let image = match load_image(Path::new(path.trim())).await {
                Ok(image) => image,
                Err(e) => {
                    println!("Could not load image: {}", e);
                    continue;
                }
            };
            media.on_analyze_click(image)
        } else {
            fact_check.on_message_change(line);
            fact_check.on_send_message(line)
        };

        match dispatch {
            Ok(dispatch) => dispatch.finished().await,
            Err(e) => warn!("Request not started: {}", e),
        }
    }

    // Dropping the sessions closes their channels, which ends the renderers.
    drop(fact_check);
    drop(media);
    if let Err(e) = fact_check_renderer.await {
        warn!("Fact-check renderer ended abnormally: {}", e);
    }
    if let Err(e) = media_renderer.await {
        warn!("Media renderer ended abnormally: {}", e);
    }
    Ok(())
}

async fn load_image(path: &Path) -> Result<ImageInput, AppError> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or_default();
    let mime_type = ImageInput::mime_type_for_extension(extension).ok_or_else(|| {
        AppError::Internal(format!("unsupported image type '{}'", path.display()))
    })?;
    let data = tokio::fs::read(path).await?;
    Ok(ImageInput::new(mime_type, data))
}

/// Prints history entries as they are appended.
async fn render_fact_check(mut updates: watch::Receiver<FactCheckState>) {
    let mut shown = 0;
    let mut was_loading = false;
    while updates.changed().await.is_ok() {
        let state = updates.borrow_and_update().clone();
        for entry in state.history.iter().skip(shown) {
            match &entry.turn {
                ConversationTurn::UserText(text) => println!("you> {}", text),
                ConversationTurn::ModelVerdict(result) => {
                    println!(
                        "verdict> {} ({}% confident)",
                        if result.is_real { "TRUE" } else { "FALSE" },
                        result.confidence_score
                    );
                    println!("  {}", result.detailed_analysis);
                    for source in &result.trusted_sources {
                        println!("  - {}", source);
                    }
                }
                ConversationTurn::ModelError(message) => println!("model> {}", message),
            }
        }
        shown = state.history.len();

        if state.is_loading && !was_loading {
            println!("checking...");
        }
        was_loading = state.is_loading;
    }
}

async fn render_media(mut updates: watch::Receiver<MediaDetectionState>) {
    while updates.changed().await.is_ok() {
        let state = updates.borrow_and_update().clone();
        if state.is_loading {
            println!("analyzing image...");
            continue;
        }
        if let Some(message) = &state.error_message {
            println!("error> {}", message);
        } else if let Some(result) = &state.latest_result {
            println!(
                "detection> {} ({}% confident)",
                if result.is_ai_generated {
                    "AI-GENERATED"
                } else {
                    "LIKELY AUTHENTIC"
                },
                result.confidence_percentage
            );
            println!("  {}", result.brief_description);
            if let Some(source) = &result.original_source {
                println!("  original source: {}", source);
            }
        }
    }
}
