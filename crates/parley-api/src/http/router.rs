//! Axum router configuration with middleware.
//!
//! All chat routes are under `/api/chat`.
//! Middleware: CORS, tracing.

use axum::http::Uri;
use axum::routing::get;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::http::error::AppError;
use crate::http::handlers;
use crate::state::AppState;

/// Build the complete API router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route(
            "/api/chat",
            get(handlers::message::list_messages)
                .post(handlers::message::create_message)
                .delete(handlers::message::delete_all_messages),
        )
        // Reply probe (nothing is stored)
        .route("/api/chat/bot/response", get(handlers::bot::bot_response))
        .route(
            "/api/chat/{id}",
            get(handlers::message::get_message)
                .put(handlers::message::update_message)
                .delete(handlers::message::delete_message),
        )
        .route("/health", get(health_check))
        .fallback(route_not_found)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET /health - Simple health check endpoint.
async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn route_not_found(uri: Uri) -> AppError {
    AppError::RouteNotFound(uri.path().to_string())
}
