//! Query service handler.

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

use matchgrid_core::{Pool, Ticket};

use crate::metrics;
use crate::state::AppState;

use super::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct QueryTicketsBody {
    pub pool: Pool,
}

/// One page of query results.
#[derive(Debug, Serialize)]
struct TicketPage {
    #[serde(skip_serializing_if = "Option::is_none")]
    tickets: Option<Vec<Ticket>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Stream every indexed ticket satisfying the pool's filters, one JSON page
/// per line.
pub async fn query_tickets(
    State(state): State<Arc<AppState>>,
    Json(body): Json<QueryTicketsBody>,
) -> Result<Response, ApiError> {
    let rx = state.query().query_tickets(&body.pool).await?;
    metrics::QUERIES_TOTAL.inc();

    let stream = futures::stream::unfold(rx, |mut rx| async move {
        rx.recv().await.map(|page| (page, rx))
    })
    .map(|page| {
        let frame = match page {
            Ok(tickets) => TicketPage {
                tickets: Some(tickets),
                error: None,
            },
            Err(e) => TicketPage {
                tickets: None,
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
