//! HTTP surface for the quiz session.
//!
//! The moderator UI drives `/upload`, `/generate`, `/next`, `/answerkey`
//! and `/reset`; the embedded button clients poll `/current` and submit to
//! `/answer`, which answers with fixed plain-text codes.

use axum::{
    extract::{Multipart, Query, State},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::state::AppState;
use crate::types::AdvanceOutcome;

/// Subject used when `/generate` is called without one.
const DEFAULT_SUBJECT: &str = "general knowledge";

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/upload", post(upload_bank))
        .route("/generate", get(generate_bank))
        .route("/next", get(next_question))
        .route("/answerkey", get(answer_key))
        .route("/current", get(current_question))
        .route("/answer", get(submit_answer))
        .route("/scores", get(scores))
        .route("/reset", get(reset_session))
        .with_state(state)
}

#[derive(Debug, Serialize)]
struct LoadReply {
    loaded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl LoadReply {
    fn ok(count: usize) -> Self {
        Self {
            loaded: true,
            count: Some(count),
            error: None,
        }
    }

    fn err(error: impl ToString) -> Self {
        Self {
            loaded: false,
            count: None,
            error: Some(error.to_string()),
        }
    }
}

#[derive(Debug, Serialize)]
struct GenerateReply {
    generated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Debug, Serialize)]
struct InfoMessage {
    message: String,
}

impl InfoMessage {
    fn new(message: impl Into<String>) -> Json<Self> {
        Json(Self {
            message: message.into(),
        })
    }
}

/// POST /upload: multipart document upload, replaces the question bank.
///
/// Every failure is reported as `loaded: false` with a message; a bad
/// upload never clears an already loaded game.
async fn upload_bank(State(state): State<Arc<AppState>>, multipart: Multipart) -> Json<LoadReply> {
    let (file_name, data) = match read_file_field(multipart).await {
        Ok(found) => found,
        Err(message) => return Json(LoadReply::err(message)),
    };

    let text = match state.extractor.extract(&file_name, &data).await {
        Ok(text) => text,
        Err(e) => return Json(LoadReply::err(e)),
    };

    match state.load_bank(&text).await {
        Ok(count) => Json(LoadReply::ok(count)),
        Err(e) => Json(LoadReply::err(e)),
    }
}

/// Pull the `file` field out of the multipart body, tolerating other fields
/// around it.
async fn read_file_field(mut multipart: Multipart) -> Result<(String, Vec<u8>), String> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| format!("malformed upload: {e}"))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().unwrap_or("upload").to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| format!("failed to read upload: {e}"))?;
        return Ok((file_name, data.to_vec()));
    }
    Err("no file field in upload".to_string())
}

#[derive(Debug, Deserialize)]
struct GenerateParams {
    subject: Option<String>,
}

/// GET /generate?subject=: ask the generation backend for a fresh bank.
async fn generate_bank(
    State(state): State<Arc<AppState>>,
    Query(params): Query<GenerateParams>,
) -> Json<GenerateReply> {
    let subject = params
        .subject
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(DEFAULT_SUBJECT)
        .to_string();

    let Some(generator) = &state.generator else {
        return Json(GenerateReply {
            generated: false,
            count: None,
            error: Some("no generation backend configured".to_string()),
        });
    };

    let text = match generator.generate_questions(&subject).await {
        Ok(response) => response.text,
        Err(e) => {
            tracing::error!(error = %e, subject, "generation failed");
            return Json(GenerateReply {
                generated: false,
                count: None,
                error: Some(e.to_string()),
            });
        }
    };

    match state.load_bank(&text).await {
        Ok(count) => {
            tracing::info!(count, subject, "generated question bank");
            Json(GenerateReply {
                generated: true,
                count: Some(count),
                error: None,
            })
        }
        Err(e) => Json(GenerateReply {
            generated: false,
            count: None,
            error: Some(e.to_string()),
        }),
    }
}

/// GET /next: advance to the next round.
async fn next_question(State(state): State<Arc<AppState>>) -> Response {
    match state.advance().await {
        AdvanceOutcome::Opened(snapshot) => Json(snapshot).into_response(),
        AdvanceOutcome::NoBankLoaded => {
            InfoMessage::new("No questions loaded or generated.").into_response()
        }
        AdvanceOutcome::EndOfBank => InfoMessage::new("No more questions!").into_response(),
    }
}

/// GET /answerkey: the moderator's view of the correct option.
async fn answer_key(State(state): State<Arc<AppState>>) -> Response {
    match state.answer_key().await {
        Some(key) => Json(key).into_response(),
        None => InfoMessage::new("No active question.").into_response(),
    }
}

/// GET /current: what the button clients should display right now.
async fn current_question(State(state): State<Arc<AppState>>) -> Response {
    Json(state.current().await).into_response()
}

#[derive(Debug, Deserialize)]
struct AnswerParams {
    player: Option<String>,
    choice: Option<String>,
}

/// GET /answer?player=&choice=: answer submission from a button client.
/// Responds with one of the fixed wire codes.
async fn submit_answer(
    State(state): State<Arc<AppState>>,
    Query(params): Query<AnswerParams>,
) -> &'static str {
    let player = params.player.unwrap_or_default();
    let choice = params.choice.and_then(|c| c.trim().parse::<u32>().ok());

    state.submit_answer(&player, choice).await.as_wire()
}

/// GET /scores: the full score table.
async fn scores(State(state): State<Arc<AppState>>) -> Response {
    Json(state.get_scores().await).into_response()
}

/// GET /reset: wipe scores and progress, keep the bank.
async fn reset_session(State(state): State<Arc<AppState>>) -> &'static str {
    state.reset().await;
    "Game reset."
}
