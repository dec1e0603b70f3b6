//! API routes

use axum::{
    routing::{get, put},
    Router,
};

use super::handlers::{self, AppState};

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health
        .route("/health", get(handlers::health))
        .route("/api/health", get(handlers::health))

        // Alerts
        .route(
            "/api/alerts",
            get(handlers::list_alerts).post(handlers::create_alert),
        )
        .route(
            "/api/alerts/:id",
            put(handlers::update_alert).delete(handlers::delete_alert),
        )

        .fallback(handlers::not_found)
        .with_state(state)
}
