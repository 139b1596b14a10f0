//! One evaluation window: registration, proposal collection, evaluation,
//! publication.

use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, error, warn};

use crate::evaluator::Evaluator;
use crate::mmf::Match;
use crate::statestore::StateStore;

use super::config::SynchronizerConfig;
use super::types::{Registration, Submission, SyncError};

type ShareSender = oneshot::Sender<Result<Vec<Match>, SyncError>>;

pub(crate) struct Window {
    pub(crate) id: u64,
    shared: Mutex<Shared>,
    resolved_rx: watch::Receiver<bool>,
}

struct Shared {
    registration_open: bool,
    proposals_tx: Option<mpsc::Sender<Submission>>,
    publishers: Vec<ShareSender>,
}

impl Window {
    /// Create a window in Collecting state. The returned watch sender must be
    /// handed to [`drive`], whose termination resolves the window.
    pub(crate) fn open(
        id: u64,
        proposals_tx: mpsc::Sender<Submission>,
    ) -> (Self, watch::Sender<bool>) {
        let (resolved_tx, resolved_rx) = watch::channel(false);
        (
            Self {
                id,
                shared: Mutex::new(Shared {
                    registration_open: true,
                    proposals_tx: Some(proposals_tx),
                    publishers: Vec::new(),
                }),
                resolved_rx,
            },
            resolved_tx,
        )
    }

    /// Register one caller. Returns None once registration has closed.
    pub(crate) fn join(&self) -> Option<Registration> {
        let mut shared = self.shared.lock();
        if !shared.registration_open {
            return None;
        }
        let proposals_tx = shared.proposals_tx.clone()?;

        let (share_tx, accepted_rx) = oneshot::channel();
        let caller = shared.publishers.len();
        shared.publishers.push(share_tx);

        Some(Registration {
            window_id: self.id,
            caller,
            proposals_tx,
            accepted_rx,
        })
    }

    /// Wait until the window's driver has finished, successfully or not.
    pub(crate) async fn wait_resolved(&self) {
        let mut rx = self.resolved_rx.clone();
        while !*rx.borrow() {
            // A dropped sender means the driver is gone, which also resolves
            // the window.
            if rx.changed().await.is_err() {
                return;
            }
        }
    }

    /// Close the Collecting phase. Returns how many callers registered.
    fn close_registration(&self) -> usize {
        let mut shared = self.shared.lock();
        shared.registration_open = false;
        shared.proposals_tx = None;
        shared.publishers.len()
    }

    fn take_publishers(&self) -> Vec<ShareSender> {
        std::mem::take(&mut self.shared.lock().publishers)
    }

    fn abort(&self, reason: &str) {
        for publisher in self.take_publishers() {
            let _ = publisher.send(Err(SyncError::WindowAborted(reason.to_string())));
        }
    }
}

/// Drive one window through its phases. Spawned by the synchronizer when the
/// window opens; its termination (on any path) resolves the window.
pub(crate) async fn drive(
    window: Arc<Window>,
    store: Arc<dyn StateStore>,
    evaluator: Arc<dyn Evaluator>,
    config: SynchronizerConfig,
    mut proposals_rx: mpsc::Receiver<Submission>,
    resolved_tx: watch::Sender<bool>,
) {
    // Collecting phase.
    tokio::time::sleep(config.registration_interval()).await;
    let expected = window.close_registration();
    debug!(window = window.id, callers = expected, "registration closed");

    if expected > 0 {
        run_window(&window, &store, &evaluator, &config, &mut proposals_rx, expected).await;
    }

    let _ = resolved_tx.send(true);
}

async fn run_window(
    window: &Window,
    store: &Arc<dyn StateStore>,
    evaluator: &Arc<dyn Evaluator>,
    config: &SynchronizerConfig,
    proposals_rx: &mut mpsc::Receiver<Submission>,
    expected: usize,
) {
    // Proposals phase: one submission per registered caller, bounded by the
    // collection interval.
    let deadline = tokio::time::Instant::now() + config.proposal_collection_interval();
    let mut submissions: Vec<Option<Vec<Match>>> = Vec::new();
    submissions.resize_with(expected, || None);

    let mut received = 0;
    while received < expected {
        match tokio::time::timeout_at(deadline, proposals_rx.recv()).await {
            Ok(Some(submission)) => {
                let slot = &mut submissions[submission.caller];
                if slot.is_none() {
                    *slot = Some(submission.proposals);
                    received += 1;
                } else {
                    warn!(
                        window = window.id,
                        caller = submission.caller,
                        "duplicate submission ignored"
                    );
                }
            }
            Ok(None) => break,
            Err(_) => {
                warn!(
                    window = window.id,
                    received, expected, "proposal collection interval elapsed"
                );
                break;
            }
        }
    }
    proposals_rx.close();

    // The Proposals→Evaluating transition: after this point no proposal can
    // enter the window.
    let mut batch = Vec::new();
    let mut owner_by_match: HashMap<String, usize> = HashMap::new();
    for (caller, slot) in submissions.into_iter().enumerate() {
        let Some(proposals) = slot else { continue };
        for proposal in proposals {
            owner_by_match
                .entry(proposal.match_id.clone())
                .or_insert(caller);
            batch.push(proposal);
        }
    }

    debug!(
        window = window.id,
        proposals = batch.len(),
        "sending batch to evaluator"
    );
    let accepted = match evaluator.evaluate(batch).await {
        Ok(accepted) => accepted,
        Err(e) => {
            error!(window = window.id, error = %e, "evaluator call failed, aborting window");
            window.abort(&e.to_string());
            return;
        }
    };

    // Sanitize the verdict: only matches proposed in this window survive, and
    // no ticket may be consumed twice.
    let mut shares: Vec<Vec<Match>> = Vec::new();
    shares.resize_with(expected, Vec::new);
    let mut delivered: HashSet<String> = HashSet::new();
    let mut consumed: HashSet<String> = HashSet::new();
    let mut ignore_ids: Vec<String> = Vec::new();

    for accepted_match in accepted {
        let Some(&caller) = owner_by_match.get(&accepted_match.match_id) else {
            warn!(
                window = window.id,
                match_id = %accepted_match.match_id,
                "evaluator accepted a match that was never proposed, dropping"
            );
            continue;
        };
        if !delivered.insert(accepted_match.match_id.clone()) {
            warn!(
                window = window.id,
                match_id = %accepted_match.match_id,
                "evaluator accepted the same match twice, dropping duplicate"
            );
            continue;
        }

        let ticket_ids = accepted_match.ticket_ids();
        if ticket_ids.iter().any(|id| consumed.contains(id)) {
            warn!(
                window = window.id,
                match_id = %accepted_match.match_id,
                "accepted match reuses an already-consumed ticket, dropping"
            );
            continue;
        }

        consumed.extend(ticket_ids.iter().cloned());
        ignore_ids.extend(ticket_ids);
        shares[caller].push(accepted_match);
    }

    // Publishing phase: consumed tickets must be hidden before any caller
    // observes its share, so the next window's queries cannot hand them out
    // again.
    if let Err(e) = store.add_tickets_to_ignore_list(&ignore_ids).await {
        error!(window = window.id, error = %e, "ignore list update failed, aborting window");
        window.abort(&format!("failed to update ignore list: {}", e));
        return;
    }

    debug!(
        window = window.id,
        accepted = consumed.len(),
        "publishing accepted matches"
    );
    for (caller, publisher) in window.take_publishers().into_iter().enumerate() {
        let share = shares.get_mut(caller).map(std::mem::take).unwrap_or_default();
        // A caller that went away mid-window is fine; the ignore-list writes
        // above already committed.
        let _ = publisher.send(Ok(share));
    }
}
