//! API router.
//!
//! Returns a composable `Router` that can be mounted on any axum server.
//! Routes are nested under `/api/`. The UI runs in a browser, so the
//! router carries a permissive CORS layer.

use axum::routing::{get, post, put};
use axum::Router;
use tower_http::cors::CorsLayer;

use crate::api::endpoints;
use crate::api::types::ApiContext;

/// Build the API router with all routes under `/api/`.
pub fn api_router(ctx: ApiContext) -> Router {
    let routes = Router::new()
        .route("/health", get(endpoints::health::check))
        .route("/chat", post(endpoints::chat::send))
        .route(
            "/report/current",
            put(endpoints::reports::stage).get(endpoints::reports::current),
        )
        .route("/report/generate", post(endpoints::reports::generate))
        .route("/reports", get(endpoints::reports::list))
        .route(
            "/reports/:id",
            axum::routing::delete(endpoints::reports::remove),
        )
        .route("/reports/:id/document", get(endpoints::reports::download))
        .route(
            "/settings",
            get(endpoints::settings::fetch).put(endpoints::settings::update),
        )
        .route(
            "/history",
            get(endpoints::history::list).post(endpoints::history::append),
        )
        .with_state(ctx);

    Router::new()
        .nest("/api", routes)
        .layer(CorsLayer::permissive())
}
