//! API router: all endpoints nested under `/api`.

use axum::routing::{get, post, put};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::api::endpoints;
use crate::api::types::ApiContext;

/// Build the full API router.
pub fn api_router(ctx: ApiContext) -> Router {
    let routes = Router::new()
        .route("/status", get(endpoints::status))
        .route(
            "/webhook/whatsapp",
            get(endpoints::webhook::verify).post(endpoints::webhook::ingest),
        )
        .route("/financial/summary", get(endpoints::financial::summary))
        .route(
            "/financial/expenses/categories",
            get(endpoints::financial::categories),
        )
        .route("/financial/transactions", post(endpoints::financial::create))
        .route(
            "/financial/transactions/:id",
            put(endpoints::financial::update).delete(endpoints::financial::remove),
        )
        .route("/health/summary", get(endpoints::health::summary))
        .route("/health/metrics/:metric_type", get(endpoints::health::metrics))
        .route("/health/history", get(endpoints::health::history))
        .route("/patients", get(endpoints::patients::list))
        .route("/patients/list", get(endpoints::patients::list_names))
        .route("/patients/:id", get(endpoints::patients::detail))
        .with_state(ctx);

    Router::new()
        .nest("/api", routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
