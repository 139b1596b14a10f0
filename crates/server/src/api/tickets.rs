//! Ticket API handlers.

use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use futures::StreamExt;
use serde::Serialize;
use std::sync::Arc;

use matchgrid_core::{Assignment, Ticket};

use crate::metrics;
use crate::state::AppState;

use super::error::ApiError;

/// Create a new ticket.
///
/// The body is the ticket submission: properties and search fields only.
/// Server-generated fields (id, create time) must be absent.
pub async fn create_ticket(
    State(state): State<Arc<AppState>>,
    Json(submitted): Json<Ticket>,
) -> Result<(StatusCode, Json<Ticket>), ApiError> {
    let created = state.frontend().create_ticket(submitted).await?;
    metrics::TICKETS_CREATED_TOTAL.inc();
    Ok((StatusCode::CREATED, Json(created)))
}

/// Get a ticket by id.
pub async fn get_ticket(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Ticket>, ApiError> {
    let ticket = state.frontend().get_ticket(&id).await?;
    metrics::TICKETS_RETRIEVED_TOTAL.inc();
    Ok(Json(ticket))
}

/// Delete a ticket: it becomes invisible to matchmaking immediately, the
/// record itself is removed in the background.
pub async fn delete_ticket(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.frontend().delete_ticket(&id).await?;
    metrics::TICKETS_DELETED_TOTAL.inc();
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Serialize)]
struct AssignmentFrame {
    assignment: Assignment,
}

/// Stream the ticket's distinct assignments as newline-delimited JSON.
/// The stream runs until the client disconnects.
pub async fn watch_assignments(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Response {
    let rx = state.frontend().watch_assignments(&id);

    let stream = futures::stream::unfold(rx, |mut rx| async move {
        rx.recv().await.map(|assignment| (assignment, rx))
    })
    .map(|assignment| {
        metrics::ASSIGNMENTS_STREAMED_TOTAL.inc();
        let frame = AssignmentFrame { assignment };
        Ok::<_, std::convert::Infallible>(
            serde_json::to_string(&frame)
                .map(|line| line + "\n")
                .unwrap_or_default(),
        )
    });

    (
        [(header::CONTENT_TYPE, "application/x-ndjson")],
        Body::from_stream(stream),
    )
        .into_response()
}
