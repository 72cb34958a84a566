//! `GET /api/health` — liveness probe.

use axum::Json;
use serde::Serialize;

use crate::config;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

pub async fn check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: config::APP_VERSION,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn health_reports_version() {
        let Json(body) = check().await;
        assert_eq!(body.status, "ok");
        assert_eq!(body.version, config::APP_VERSION);
    }
}
