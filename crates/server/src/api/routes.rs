use axum::{
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::{handlers, matches, query, tickets};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health, config, metrics
        .route("/api/v1/health", get(handlers::health))
        .route("/api/v1/config", get(handlers::get_config))
        .route("/metrics", get(handlers::get_metrics))
        // Frontend: tickets
        .route("/api/v1/tickets", post(tickets::create_ticket))
        .route("/api/v1/tickets/{id}", get(tickets::get_ticket))
        .route("/api/v1/tickets/{id}", delete(tickets::delete_ticket))
        .route(
            "/api/v1/tickets/{id}/assignments/watch",
            get(tickets::watch_assignments),
        )
        // Backend: matches and assignments
        .route("/api/v1/matches:fetch", post(matches::fetch_matches))
        .route("/api/v1/tickets:assign", post(matches::assign_tickets))
        // Query service
        .route("/api/v1/queries/tickets", post(query::query_tickets))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
