//! The synchronizer coalesces overlapping backend cycles into evaluation
//! windows.
//!
//! A window moves through: Collecting (registrations accepted) → Proposals
//! (each registered caller submits once) → Evaluating (one evaluator call
//! for the whole batch) → Publishing (accepted tickets hidden via the ignore
//! list, then each caller receives its share). Windows are strictly
//! sequential: a new one opens only after the previous one has resolved, so
//! its queries always observe the previous window's ignore-list writes.

mod config;
mod types;
mod window;

pub use config::SynchronizerConfig;
pub use types::{Registration, SyncError};

use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::evaluator::Evaluator;
use crate::mmf::Match;
use crate::statestore::StateStore;

use window::Window;

/// Singleton coordinator for evaluation windows.
pub struct Synchronizer {
    store: Arc<dyn StateStore>,
    evaluator: Arc<dyn Evaluator>,
    config: SynchronizerConfig,
    state: Mutex<SyncState>,
}

struct SyncState {
    current: Option<Arc<Window>>,
    next_window_id: u64,
    shutting_down: bool,
}

impl Synchronizer {
    pub fn new(
        store: Arc<dyn StateStore>,
        evaluator: Arc<dyn Evaluator>,
        config: SynchronizerConfig,
    ) -> Self {
        Self {
            store,
            evaluator,
            config,
            state: Mutex::new(SyncState {
                current: None,
                next_window_id: 1,
                shutting_down: false,
            }),
        }
    }

    /// Join the window currently collecting registrations, opening one if
    /// none is. Blocks while the previous window is still resolving, which
    /// is what makes windows strictly sequential.
    pub async fn register(&self) -> Result<Registration, SyncError> {
        loop {
            let in_flight = {
                let mut state = self.state.lock();
                if state.shutting_down {
                    return Err(SyncError::ShuttingDown);
                }

                let current = state.current.clone();
                if let Some(window) = current {
                    match window.join() {
                        Some(registration) => return Ok(registration),
                        // Registration closed; wait for the window to resolve.
                        None => window,
                    }
                } else {
                    let id = state.next_window_id;
                    state.next_window_id += 1;

                    let (proposals_tx, proposals_rx) = mpsc::channel(64);
                    let (window, resolved_tx) = Window::open(id, proposals_tx);
                    let window = Arc::new(window);
                    state.current = Some(Arc::clone(&window));

                    let registration = match window.join() {
                        Some(registration) => registration,
                        None => return Err(SyncError::WindowAborted(
                            "freshly opened window refused registration".to_string(),
                        )),
                    };

                    debug!(window = id, "opened evaluation window");
                    tokio::spawn(window::drive(
                        Arc::clone(&window),
                        Arc::clone(&self.store),
                        Arc::clone(&self.evaluator),
                        self.config.clone(),
                        proposals_rx,
                        resolved_tx,
                    ));
                    return Ok(registration);
                }
            };

            in_flight.wait_resolved().await;
            let mut state = self.state.lock();
            if state
                .current
                .as_ref()
                .is_some_and(|w| w.id == in_flight.id)
            {
                state.current = None;
            }
        }
    }

    /// Submit this caller's proposals and block until the window publishes,
    /// returning the caller's share of the accepted matches.
    pub async fn evaluate_proposals(
        &self,
        registration: Registration,
        proposals: Vec<Match>,
    ) -> Result<Vec<Match>, SyncError> {
        registration.submit(proposals).await
    }

    /// Refuse new registrations. The in-flight window, if any, still runs to
    /// completion so its ignore-list writes commit.
    pub fn shutdown(&self) {
        let mut state = self.state.lock();
        if !state.shutting_down {
            state.shutting_down = true;
            info!("synchronizer shutting down, refusing new registrations");
        }
    }
}
