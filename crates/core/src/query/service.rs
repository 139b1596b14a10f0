//! Query service implementation.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::debug;

use crate::statestore::{StateStore, StoreError};
use crate::ticket::Ticket;

use super::types::Pool;

/// Query service configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct QueryConfig {
    /// Maximum tickets per response page.
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// How many tickets to request from the store per chunk read.
    #[serde(default = "default_fetch_batch_size")]
    pub fetch_batch_size: usize,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            fetch_batch_size: default_fetch_batch_size(),
        }
    }
}

fn default_page_size() -> usize {
    10_000
}

fn default_fetch_batch_size() -> usize {
    10_000
}

/// Errors surfaced by ticket queries.
#[derive(Debug, Error)]
pub enum QueryError {
    /// The pool is unusable (empty filter conjunction).
    #[error("invalid pool: {0}")]
    InvalidArgument(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Streams tickets that satisfy a pool's filters.
pub struct QueryService {
    store: Arc<dyn StateStore>,
    config: QueryConfig,
}

impl QueryService {
    pub fn new(store: Arc<dyn StateStore>, config: QueryConfig) -> Self {
        Self { store, config }
    }

    /// Stream every indexed, non-ignored ticket that passes all of the
    /// pool's filters, in pages of at most `page_size` tickets.
    ///
    /// The indexed id set is snapshotted once up front; tickets deleted
    /// between the snapshot and the chunk reads are silently dropped. Pages
    /// arrive in chunk-read order; no inter-ticket order is guaranteed.
    /// Dropping the receiver cancels the producer.
    pub async fn query_tickets(
        &self,
        pool: &Pool,
    ) -> Result<mpsc::Receiver<Result<Vec<Ticket>, QueryError>>, QueryError> {
        if pool.filter_count() == 0 {
            return Err(QueryError::InvalidArgument(format!(
                "pool {:?} has no filters",
                pool.name
            )));
        }

        let ids: Vec<String> = self.store.get_indexed_id_set().await?.into_iter().collect();
        debug!(pool = %pool.name, candidates = ids.len(), "starting ticket query");

        let (tx, rx) = mpsc::channel(4);
        let store = Arc::clone(&self.store);
        let pool = pool.clone();
        let page_size = self.config.page_size;
        let batch_size = self.config.fetch_batch_size.max(1);

        tokio::spawn(async move {
            let mut page = Vec::new();
            for chunk in ids.chunks(batch_size) {
                let tickets = match store.get_tickets(chunk).await {
                    Ok(tickets) => tickets,
                    Err(e) => {
                        let _ = tx.send(Err(e.into())).await;
                        return;
                    }
                };

                for ticket in tickets {
                    if !pool.matches(&ticket) {
                        continue;
                    }
                    page.push(ticket);
                    if page.len() >= page_size {
                        if tx.send(Ok(std::mem::take(&mut page))).await.is_err() {
                            return;
                        }
                    }
                }
            }

            if !page.is_empty() {
                let _ = tx.send(Ok(page)).await;
            }
        });

        Ok(rx)
    }
}
