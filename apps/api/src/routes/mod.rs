pub mod health;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;

use crate::matching::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route(
            "/api/v1/opportunities/match",
            post(handlers::handle_match),
        )
        .route(
            "/api/v1/opportunities",
            get(handlers::handle_list_opportunities),
        )
        .with_state(state)
        // Pre-flight OPTIONS is answered here; the dashboard and tracking
        // snippet call from other origins.
        .layer(CorsLayer::permissive())
}
