//! Match fetching and assignment handlers.

use axum::{
    body::Body,
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use matchgrid_core::{Assignment, Match, MatchProfile};

use crate::metrics;
use crate::state::AppState;

use super::error::ApiError;

/// Request body for one fetch cycle.
#[derive(Debug, Deserialize)]
pub struct FetchMatchesBody {
    /// Name of the registered match function to run.
    pub function: String,
    pub profile: MatchProfile,
}

/// One frame of the fetch response stream.
#[derive(Debug, Serialize)]
struct MatchFrame {
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<Match>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Run one matchmaking cycle and stream the accepted matches back as
/// newline-delimited JSON frames.
pub async fn fetch_matches(
    State(state): State<Arc<AppState>>,
    Json(body): Json<FetchMatchesBody>,
) -> Result<Response, ApiError> {
    let rx = state
        .backend()
        .fetch_matches(&body.function, body.profile)
        .await?;

    let stream = futures::stream::unfold(rx, |mut rx| async move {
        rx.recv().await.map(|item| (item, rx))
    })
    .map(|item| {
        let frame = match item {
            Ok(accepted) => {
                metrics::MATCHES_FETCHED_TOTAL.inc();
                MatchFrame {
                    result: Some(accepted),
                    error: None,
                }
            }
            Err(e) => MatchFrame {
                result: None,
                error: Some(e.to_string()),
            },
        };
        Ok::<_, std::convert::Infallible>(
            serde_json::to_string(&frame)
                .map(|line| line + "\n")
                .unwrap_or_default(),
        )
    });

    Ok((
        [(header::CONTENT_TYPE, "application/x-ndjson")],
        Body::from_stream(stream),
    )
        .into_response())
}

/// Request body for assigning tickets.
#[derive(Debug, Deserialize)]
pub struct AssignTicketsBody {
    pub ticket_ids: Vec<String>,
    pub assignment: Assignment,
}

/// Attach an assignment to every listed ticket.
pub async fn assign_tickets(
    State(state): State<Arc<AppState>>,
    Json(body): Json<AssignTicketsBody>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state
        .backend()
        .assign_tickets(&body.ticket_ids, &body.assignment)
        .await?;
    metrics::TICKETS_ASSIGNED_TOTAL.inc_by(body.ticket_ids.len() as u64);
    Ok(Json(serde_json::json!({})))
}
