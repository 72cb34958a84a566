//! `GET`/`POST /api/history` — the chat history log.
//!
//! The UI appends one entry per completed exchange; the server assigns the
//! id and timestamp so entries stay ordered even if the client clock is
//! off.

use axum::extract::State;
use axum::Json;
use serde::Deserialize;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::models::{HistoryEntry, Message};
use crate::store::keys;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewHistoryEntry {
    pub patient_name: String,
    pub messages: Vec<Message>,
}

/// Append a completed exchange. Returns the stored entry.
pub async fn append(
    State(ctx): State<ApiContext>,
    Json(new): Json<NewHistoryEntry>,
) -> Result<Json<HistoryEntry>, ApiError> {
    if new.messages.is_empty() {
        return Err(ApiError::BadRequest(
            "History entry must contain at least one message".into(),
        ));
    }
    let entry = HistoryEntry {
        id: uuid::Uuid::new_v4().to_string(),
        date: chrono::Utc::now(),
        patient_name: new.patient_name,
        messages: new.messages,
    };
    let mut log: Vec<HistoryEntry> = ctx
        .store
        .get_json(keys::CHAT_HISTORY)?
        .unwrap_or_default();
    log.push(entry.clone());
    ctx.store.put_json(keys::CHAT_HISTORY, &log)?;
    Ok(Json(entry))
}

/// The full history log, oldest first.
pub async fn list(State(ctx): State<ApiContext>) -> Result<Json<Vec<HistoryEntry>>, ApiError> {
    let log: Vec<HistoryEntry> = ctx
        .store
        .get_json(keys::CHAT_HISTORY)?
        .unwrap_or_default();
    Ok(Json(log))
}
