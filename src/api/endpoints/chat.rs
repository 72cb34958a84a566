//! `POST /api/chat` — streaming chat proxy.
//!
//! The conversation arrives as an ordered message list; the newest message
//! is the turn to answer. The mapped history (persona first, newest
//! excluded) seeds the backend, and the reply is relayed to the caller as
//! raw text chunks in arrival order — no buffering, no framing, stream end
//! is the only completion signal.

use std::convert::Infallible;

use axum::body::{Body, Bytes};
use axum::extract::State;
use axum::http::header;
use axum::response::Response;
use axum::Json;
use futures_util::StreamExt;
use serde::Deserialize;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::genai::split_active_turn;
use crate::models::Message;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub messages: Vec<Message>,
    #[serde(default)]
    pub user_id: Option<String>,
}

/// Relay a conversation to the model backend and stream the reply back.
///
/// Backend failures are caught here, before any byte of the reply is
/// written, and surface as a single non-streaming 500 — a partial stream
/// is never left open on a failed request.
pub async fn send(
    State(ctx): State<ApiContext>,
    Json(req): Json<ChatRequest>,
) -> Result<Response, ApiError> {
    let Some((history, active_turn)) = split_active_turn(&req.messages) else {
        return Err(ApiError::BadRequest(
            "Conversation must contain at least one message".into(),
        ));
    };
    if active_turn.trim().is_empty() {
        return Err(ApiError::BadRequest("Message cannot be empty".into()));
    }

    tracing::debug!(
        turns = history.len(),
        user_id = req.user_id.as_deref().unwrap_or("-"),
        "chat turn submitted",
    );

    let reply = ctx.backend.stream_reply(history, active_turn).await?;

    let body = Body::from_stream(
        reply.map(|chunk| Ok::<Bytes, Infallible>(Bytes::from(chunk))),
    );
    Response::builder()
        .header(header::CONTENT_TYPE, "text/plain; charset=utf-8")
        .body(body)
        .map_err(|e| ApiError::Internal(e.to_string()))
}
