//! Synchronizer error and registration types.

use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tracing::warn;

use crate::mmf::Match;

/// Errors surfaced to synchronizer callers.
#[derive(Debug, Clone, Error)]
pub enum SyncError {
    /// The synchronizer refuses new registrations.
    #[error("synchronizer is shutting down")]
    ShuttingDown,

    /// The window advanced past Proposals before this caller submitted.
    #[error("evaluation window {0} is no longer accepting proposals")]
    WindowClosed(u64),

    /// The window aborted without publishing: evaluator failure, ignore-list
    /// write failure, or a dead driver. No proposals were accepted and the
    /// ignore list was not touched; callers may retry in the next window.
    #[error("evaluation window aborted: {0}")]
    WindowAborted(String),
}

pub(crate) struct Submission {
    pub caller: usize,
    pub proposals: Vec<Match>,
}

/// A caller's membership in one evaluation window, returned by
/// [`super::Synchronizer::register`] and consumed by
/// [`super::Synchronizer::evaluate_proposals`].
pub struct Registration {
    pub(crate) window_id: u64,
    pub(crate) caller: usize,
    pub(crate) proposals_tx: mpsc::Sender<Submission>,
    pub(crate) accepted_rx: oneshot::Receiver<Result<Vec<Match>, SyncError>>,
}

impl Registration {
    /// Id of the window this registration belongs to.
    pub fn window_id(&self) -> u64 {
        self.window_id
    }

    pub(crate) async fn submit(self, proposals: Vec<Match>) -> Result<Vec<Match>, SyncError> {
        let Registration {
            window_id,
            caller,
            proposals_tx,
            accepted_rx,
        } = self;

        let submission = Submission { caller, proposals };
        if proposals_tx.send(submission).await.is_err() {
            warn!(
                window = window_id,
                caller, "proposals arrived after the collection deadline, dropping"
            );
            return Err(SyncError::WindowClosed(window_id));
        }

        match accepted_rx.await {
            Ok(share) => share,
            Err(_) => Err(SyncError::WindowAborted(
                "window driver terminated before publishing".to_string(),
            )),
        }
    }
}
