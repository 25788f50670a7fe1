use super::handlers;
use super::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

/// Create the HTTP router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Session persistence and history
        .route(
            "/sessions",
            post(handlers::save_session).get(handlers::list_sessions),
        )
        .route("/sessions/:id", get(handlers::get_session))
        // Date-filtered aggregate statistics
        .route("/analytics", get(handlers::get_analytics))
        // Question generation (topic and/or resume upload)
        .route("/questions", post(handlers::generate_questions))
        // Add tracing middleware for request logging
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
