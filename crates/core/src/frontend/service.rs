//! Frontend service implementation.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::debug;
use uuid::Uuid;

use crate::statestore::{AssignmentCallback, StateStore, StoreError, WatchFlow};
use crate::ticket::{Assignment, Ticket};

use super::deleter::DeleterHandle;

/// Frontend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FrontendConfig {
    /// Capacity of the deferred-delete queue.
    #[serde(default = "default_delete_queue_size")]
    pub delete_queue_size: usize,
}

impl Default for FrontendConfig {
    fn default() -> Self {
        Self {
            delete_queue_size: default_delete_queue_size(),
        }
    }
}

fn default_delete_queue_size() -> usize {
    256
}

/// Errors surfaced by frontend operations.
#[derive(Debug, Error)]
pub enum FrontendError {
    /// The submitted ticket is malformed.
    #[error("invalid ticket: {0}")]
    InvalidArgument(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Ticket CRUD and assignment watching.
pub struct FrontendService {
    store: Arc<dyn StateStore>,
    deleter: DeleterHandle,
}

impl FrontendService {
    pub fn new(store: Arc<dyn StateStore>, deleter: DeleterHandle) -> Self {
        Self { store, deleter }
    }

    /// Persist and index a new ticket.
    ///
    /// The id and creation time are server-generated; submissions carrying
    /// either are rejected. The ticket is persisted before it is indexed: if
    /// indexing fails the record is unreachable by queries and the store TTL
    /// garbage-collects it.
    pub async fn create_ticket(&self, submitted: Ticket) -> Result<Ticket, FrontendError> {
        if submitted.assignment.is_some() {
            return Err(FrontendError::InvalidArgument(
                "tickets cannot be created with an assignment".to_string(),
            ));
        }
        if submitted.create_time.is_some() {
            return Err(FrontendError::InvalidArgument(
                "tickets cannot be created with create time set".to_string(),
            ));
        }

        let mut ticket = submitted;
        ticket.id = Uuid::new_v4().to_string();
        ticket.create_time = Some(Utc::now());

        self.store.create_ticket(&ticket).await?;
        self.store.index_ticket(&ticket).await?;

        debug!(id = %ticket.id, "ticket created");
        Ok(ticket)
    }

    pub async fn get_ticket(&self, id: &str) -> Result<Ticket, FrontendError> {
        Ok(self.store.get_ticket(id).await?)
    }

    /// Remove a ticket from matchmaking.
    ///
    /// The deindex happens synchronously, so no query issued after this call
    /// returns can observe the ticket. The record itself and its ignore-list
    /// entry are removed by the background deleter, which tolerates transient
    /// store errors.
    pub async fn delete_ticket(&self, id: &str) -> Result<(), FrontendError> {
        self.store.deindex_ticket(id).await?;
        self.deleter.enqueue(id.to_string()).await;
        Ok(())
    }

    /// Stream every distinct assignment the ticket receives.
    ///
    /// The first non-null observation fires immediately; identical
    /// consecutive values are suppressed by the store's watch. The poll stops
    /// when the returned receiver is dropped or the ticket disappears.
    pub fn watch_assignments(&self, id: &str) -> mpsc::Receiver<Assignment> {
        let (tx, rx) = mpsc::channel(8);
        let store = Arc::clone(&self.store);
        let id = id.to_string();

        tokio::spawn(async move {
            let sender = tx.clone();
            let callback: AssignmentCallback = Box::new(move |assignment| {
                let sender = sender.clone();
                Box::pin(async move {
                    match assignment {
                        Some(assignment) => {
                            if sender.send(assignment).await.is_err() {
                                WatchFlow::Stop
                            } else {
                                WatchFlow::Continue
                            }
                        }
                        // An assignment never reverts to null in practice;
                        // nothing to emit if it does.
                        None => WatchFlow::Continue,
                    }
                })
            });

            tokio::select! {
                _ = tx.closed() => {
                    debug!(id = %id, "assignment watch cancelled by client");
                }
                result = store.get_assignments(&id, callback) => {
                    if let Err(e) = result {
                        debug!(id = %id, error = %e, "assignment watch ended");
                    }
                }
            }
        });

        rx
    }
}
