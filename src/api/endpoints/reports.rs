//! Report endpoints: stage a conversation record, render it to a PDF,
//! list/delete saved reports, download the rendered document.
//!
//! Rendering is synchronous CPU work, so it runs on the blocking pool.
//! Nothing is persisted unless the render succeeds — a failed render
//! leaves the store untouched.

use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::Response;
use axum::Json;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::models::{ConversationRecord, SavedReport};
use crate::report::{render_report, report_filename};
use crate::store::keys;

const NO_REPORT_DATA: &str = "No report data found. Please start a conversation first.";

/// `PUT /api/report/current` — stage the record the next render will use.
pub async fn stage(
    State(ctx): State<ApiContext>,
    Json(record): Json<ConversationRecord>,
) -> Result<StatusCode, ApiError> {
    ctx.store.put_json(keys::CURRENT_REPORT, &record)?;
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /api/report/current` — the staged record, if any.
pub async fn current(
    State(ctx): State<ApiContext>,
) -> Result<Json<ConversationRecord>, ApiError> {
    let record = ctx
        .store
        .get_json::<ConversationRecord>(keys::CURRENT_REPORT)?
        .ok_or_else(|| ApiError::NotFound(NO_REPORT_DATA.into()))?;
    Ok(Json(record))
}

/// `POST /api/report/generate` — render the staged record.
///
/// On success the document bytes are stored, a `SavedReport` is appended
/// to the saved list, and the new record is returned. A missing staged
/// record is a user-visible "no data found", not a crash.
pub async fn generate(State(ctx): State<ApiContext>) -> Result<Json<SavedReport>, ApiError> {
    let record = ctx
        .store
        .get_json::<ConversationRecord>(keys::CURRENT_REPORT)?
        .ok_or_else(|| ApiError::NotFound(NO_REPORT_DATA.into()))?;

    let settings = ctx.settings()?;
    let patient_name = record.patient_info.name.clone();
    let date = record.date;

    let app_name = settings.app_name.clone();
    let rendered = tokio::task::spawn_blocking(move || render_report(&record, &app_name))
        .await
        .map_err(|e| ApiError::Internal(format!("render task failed: {e}")))??;

    let id = uuid::Uuid::new_v4().to_string();
    ctx.store
        .put_document(&id, "application/pdf", &rendered.bytes)?;

    let report = SavedReport {
        id: id.clone(),
        date,
        patient_name,
        document_handle: format!("/api/reports/{id}/document"),
    };
    let mut reports: Vec<SavedReport> = ctx
        .store
        .get_json(keys::SAVED_REPORTS)?
        .unwrap_or_default();
    reports.push(report.clone());
    ctx.store.put_json(keys::SAVED_REPORTS, &reports)?;

    tracing::info!(report_id = %id, pages = rendered.pages, "report generated");
    Ok(Json(report))
}

/// `GET /api/reports` — every saved report, oldest first.
pub async fn list(State(ctx): State<ApiContext>) -> Result<Json<Vec<SavedReport>>, ApiError> {
    let reports: Vec<SavedReport> = ctx
        .store
        .get_json(keys::SAVED_REPORTS)?
        .unwrap_or_default();
    Ok(Json(reports))
}

/// `DELETE /api/reports/:id` — remove the record and its document.
pub async fn remove(
    State(ctx): State<ApiContext>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let mut reports: Vec<SavedReport> = ctx
        .store
        .get_json(keys::SAVED_REPORTS)?
        .unwrap_or_default();
    let before = reports.len();
    reports.retain(|r| r.id != id);
    if reports.len() == before {
        return Err(ApiError::NotFound("Report not found".into()));
    }
    ctx.store.put_json(keys::SAVED_REPORTS, &reports)?;
    ctx.store.delete_document(&id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /api/reports/:id/document` — the rendered bytes, exactly as
/// produced by the render that created them.
pub async fn download(
    State(ctx): State<ApiContext>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let reports: Vec<SavedReport> = ctx
        .store
        .get_json(keys::SAVED_REPORTS)?
        .unwrap_or_default();
    let report = reports
        .iter()
        .find(|r| r.id == id)
        .ok_or_else(|| ApiError::NotFound("Report not found".into()))?;
    let (content_type, bytes) = ctx
        .store
        .get_document(&id)?
        .ok_or_else(|| ApiError::NotFound("Report document not found".into()))?;

    let settings = ctx.settings()?;
    let filename = report_filename(&settings.app_name, &report.patient_name, report.date);

    Response::builder()
        .header(header::CONTENT_TYPE, content_type)
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{filename}\""),
        )
        .body(Body::from(bytes))
        .map_err(|e| ApiError::Internal(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::http::Request;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use crate::api::router::api_router;
    use crate::genai::MockBackend;
    use crate::store::KvStore;

    fn test_ctx() -> ApiContext {
        ApiContext::new(
            KvStore::open_in_memory().unwrap(),
            Arc::new(MockBackend::new(&[])),
        )
    }

    fn record_json() -> &'static str {
        r#"{
            "patientInfo": {"name":"Ada","role":"patient","cancerType":"Breast"},
            "messages": [
                {"id":"1","role":"user","content":"Hello"},
                {"id":"2","role":"assistant","content":"Hello Ada, how are you feeling today?"}
            ],
            "files": [],
            "date": "2026-03-01T10:00:00Z"
        }"#
    }

    fn put_current(body: &str) -> Request<Body> {
        Request::builder()
            .method("PUT")
            .uri("/api/report/current")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn post(uri: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn delete(uri: &str) -> Request<Body> {
        Request::builder()
            .method("DELETE")
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    async fn json_body(response: Response) -> serde_json::Value {
        let body = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn generate_without_staged_record_is_not_found() {
        let app = api_router(test_ctx());
        let response = app.oneshot(post("/api/report/generate")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let json = json_body(response).await;
        assert_eq!(
            json["error"],
            "No report data found. Please start a conversation first.",
        );
    }

    #[tokio::test]
    async fn stage_then_fetch_current() {
        let ctx = test_ctx();
        let app = api_router(ctx.clone());

        let response = app
            .clone()
            .oneshot(put_current(record_json()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let response = app.oneshot(get("/api/report/current")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        assert_eq!(json["patientInfo"]["name"], "Ada");
    }

    #[tokio::test]
    async fn generate_persists_report_and_document() {
        let ctx = test_ctx();
        let app = api_router(ctx.clone());

        app.clone()
            .oneshot(put_current(record_json()))
            .await
            .unwrap();
        let response = app
            .clone()
            .oneshot(post("/api/report/generate"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let report = json_body(response).await;
        assert_eq!(report["patientName"], "Ada");
        let id = report["id"].as_str().unwrap().to_string();
        assert_eq!(
            report["documentHandle"],
            format!("/api/reports/{id}/document"),
        );

        // Listed
        let response = app.clone().oneshot(get("/api/reports")).await.unwrap();
        let listed = json_body(response).await;
        assert_eq!(listed.as_array().unwrap().len(), 1);

        // Document stored and is a PDF
        let (ct, bytes) = ctx.store.get_document(&id).unwrap().unwrap();
        assert_eq!(ct, "application/pdf");
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[tokio::test]
    async fn download_round_trips_bytes_exactly() {
        let ctx = test_ctx();
        let app = api_router(ctx.clone());

        app.clone()
            .oneshot(put_current(record_json()))
            .await
            .unwrap();
        let response = app
            .clone()
            .oneshot(post("/api/report/generate"))
            .await
            .unwrap();
        let report = json_body(response).await;
        let id = report["id"].as_str().unwrap().to_string();
        let (_, stored) = ctx.store.get_document(&id).unwrap().unwrap();

        let response = app
            .oneshot(get(&format!("/api/reports/{id}/document")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["content-type"], "application/pdf");
        let disposition = response.headers()[header::CONTENT_DISPOSITION]
            .to_str()
            .unwrap()
            .to_string();
        assert!(disposition.contains("Solace_Report_Ada_2026-03-01.pdf"));
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], &stored[..]);
    }

    #[tokio::test]
    async fn delete_removes_record_and_document() {
        let ctx = test_ctx();
        let app = api_router(ctx.clone());

        app.clone()
            .oneshot(put_current(record_json()))
            .await
            .unwrap();
        let response = app
            .clone()
            .oneshot(post("/api/report/generate"))
            .await
            .unwrap();
        let id = json_body(response).await["id"].as_str().unwrap().to_string();

        let response = app
            .clone()
            .oneshot(delete(&format!("/api/reports/{id}")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        assert!(ctx.store.get_document(&id).unwrap().is_none());
        let response = app
            .clone()
            .oneshot(get(&format!("/api/reports/{id}/document")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        // Deleting again reports not found
        let response = app
            .oneshot(delete(&format!("/api/reports/{id}")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn download_of_unknown_report_is_not_found() {
        let app = api_router(test_ctx());
        let response = app
            .oneshot(get("/api/reports/nope/document"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
