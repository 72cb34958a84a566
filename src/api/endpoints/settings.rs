//! `GET`/`PUT /api/settings` — branding and appearance.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::models::AppSettings;
use crate::store::keys;

/// Current settings; defaults when nothing has been saved yet.
pub async fn fetch(State(ctx): State<ApiContext>) -> Result<Json<AppSettings>, ApiError> {
    Ok(Json(ctx.settings()?))
}

/// Replace the stored settings wholesale.
pub async fn update(
    State(ctx): State<ApiContext>,
    Json(settings): Json<AppSettings>,
) -> Result<StatusCode, ApiError> {
    ctx.store.put_json(keys::APP_SETTINGS, &settings)?;
    Ok(StatusCode::NO_CONTENT)
}
