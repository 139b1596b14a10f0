//! Deferred ticket deletion.
//!
//! `DeleteTicket` deindexes synchronously, which is what makes the ticket
//! invisible to matchmaking; the record itself and its ignore-list entry are
//! removed by this bounded background worker. Failures here are logged and
//! never surfaced, because correctness only depends on the deindex.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{error, info, warn};

use crate::statestore::StateStore;

/// Sending half of the delete queue. Clone freely; the worker drains until
/// every handle is dropped.
#[derive(Clone)]
pub struct DeleterHandle {
    tx: mpsc::Sender<String>,
}

impl DeleterHandle {
    /// Queue a ticket id for deletion. Blocks when the queue is full; a
    /// closed queue (worker gone) is logged and ignored.
    pub async fn enqueue(&self, id: String) {
        if self.tx.send(id).await.is_err() {
            warn!("ticket deleter is gone, dropping delete request");
        }
    }
}

/// Background task that deletes queued tickets and their ignore-list entries.
pub struct TicketDeleter {
    rx: mpsc::Receiver<String>,
    store: Arc<dyn StateStore>,
}

impl TicketDeleter {
    /// Run the worker, consuming ids until every handle is dropped.
    ///
    /// Spawn as a background task; await the join handle at shutdown to
    /// drain the queue.
    pub async fn run(mut self) {
        info!("ticket deleter started");

        while let Some(id) = self.rx.recv().await {
            if let Err(e) = self.store.delete_ticket(&id).await {
                error!(id = %id, error = %e, "failed to delete ticket");
            }
            if let Err(e) = self
                .store
                .delete_tickets_from_ignore_list(std::slice::from_ref(&id))
                .await
            {
                error!(id = %id, error = %e, "failed to remove ticket from ignore list");
            }
        }

        info!("ticket deleter shutting down");
    }
}

/// Create the delete queue: a handle for producers and the worker to spawn.
pub fn create_deleter(
    store: Arc<dyn StateStore>,
    buffer_size: usize,
) -> (DeleterHandle, TicketDeleter) {
    let (tx, rx) = mpsc::channel(buffer_size);
    (DeleterHandle { tx }, TicketDeleter { rx, store })
}
