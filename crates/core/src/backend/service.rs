//! Backend service implementation.

use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::debug;

use crate::mmf::{Match, MatchFunction, MatchFunctionHost, MatchProfile, MmfError};
use crate::statestore::{StateStore, StoreError};
use crate::synchronizer::{SyncError, Synchronizer};
use crate::ticket::Assignment;

/// Errors surfaced by backend operations.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Empty id list, missing assignment, or an unknown match function.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// An id passed to `assign_tickets` does not exist; nothing was written
    /// to the ignore list.
    #[error("ticket not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Mmf(#[from] MmfError),

    #[error(transparent)]
    Sync(#[from] SyncError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Entry point for one matchmaking cycle and for applying assignments.
pub struct BackendService {
    host: Arc<MatchFunctionHost>,
    synchronizer: Arc<Synchronizer>,
    store: Arc<dyn StateStore>,
    functions: HashMap<String, Arc<dyn MatchFunction>>,
}

impl BackendService {
    pub fn new(
        host: Arc<MatchFunctionHost>,
        synchronizer: Arc<Synchronizer>,
        store: Arc<dyn StateStore>,
    ) -> Self {
        Self {
            host,
            synchronizer,
            store,
            functions: HashMap::new(),
        }
    }

    /// Register a match function under its name.
    pub fn with_function(mut self, function: Arc<dyn MatchFunction>) -> Self {
        self.functions.insert(function.name().to_string(), function);
        self
    }

    /// Run one `FetchMatches` cycle: invoke the named match function against
    /// the profile, forward its proposals through the synchronizer, and
    /// stream back this caller's accepted matches.
    ///
    /// Dropping the receiver abandons the cycle; a window already publishing
    /// still commits its ignore-list writes.
    pub async fn fetch_matches(
        &self,
        function_name: &str,
        profile: MatchProfile,
    ) -> Result<mpsc::Receiver<Result<Match, BackendError>>, BackendError> {
        let function = self
            .functions
            .get(function_name)
            .cloned()
            .ok_or_else(|| {
                BackendError::InvalidArgument(format!(
                    "unknown match function {:?}",
                    function_name
                ))
            })?;

        // Register before running the function so this cycle joins the
        // window that is currently collecting.
        let registration = self.synchronizer.register().await?;
        debug!(
            window = registration.window_id(),
            function = function_name,
            profile = %profile.name,
            "fetch cycle registered"
        );

        let (tx, rx) = mpsc::channel(16);
        let host = Arc::clone(&self.host);
        let synchronizer = Arc::clone(&self.synchronizer);

        tokio::spawn(async move {
            let proposals = match host.run(function.as_ref(), &profile).await {
                Ok(proposals) => proposals,
                Err(e) => {
                    let _ = tx.send(Err(e.into())).await;
                    return;
                }
            };

            if tx.is_closed() {
                return;
            }

            let accepted = match synchronizer.evaluate_proposals(registration, proposals).await {
                Ok(accepted) => accepted,
                Err(e) => {
                    let _ = tx.send(Err(e.into())).await;
                    return;
                }
            };

            for accepted_match in accepted {
                if tx.send(Ok(accepted_match)).await.is_err() {
                    return;
                }
            }
        });

        Ok(rx)
    }

    /// Attach `assignment` to every listed ticket, then hide the tickets
    /// from further matchmaking (ignore list + deindex).
    ///
    /// A missing id aborts before the ignore list or index are touched,
    /// though the store may have written a subset of the assignments by then.
    pub async fn assign_tickets(
        &self,
        ids: &[String],
        assignment: &Assignment,
    ) -> Result<(), BackendError> {
        if ids.is_empty() {
            return Err(BackendError::InvalidArgument(
                "no ticket ids to assign".to_string(),
            ));
        }

        self.store
            .update_assignments(ids, assignment)
            .await
            .map_err(|e| match e {
                StoreError::NotFound(id) => BackendError::NotFound(id),
                other => BackendError::Store(other),
            })?;

        self.store.add_tickets_to_ignore_list(ids).await?;
        for id in ids {
            self.store.deindex_ticket(id).await?;
        }

        debug!(tickets = ids.len(), "assignments applied");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mmf::{MmfHostConfig, PairMatchFunction};
    use crate::query::{QueryConfig, QueryService};
    use crate::synchronizer::SynchronizerConfig;
    use crate::testing::{fixtures, MemoryStateStore, MockEvaluator};

    fn backend(store: Arc<MemoryStateStore>) -> BackendService {
        let query = Arc::new(QueryService::new(store.clone(), QueryConfig::default()));
        let host = Arc::new(MatchFunctionHost::new(query, MmfHostConfig::default()));
        let synchronizer = Arc::new(Synchronizer::new(
            store.clone(),
            Arc::new(MockEvaluator::accept_all()),
            SynchronizerConfig {
                registration_interval_ms: 30,
                proposal_collection_interval_ms: 500,
            },
        ));
        BackendService::new(host, synchronizer, store)
            .with_function(Arc::new(PairMatchFunction::new()))
    }

    #[tokio::test]
    async fn test_unknown_function_rejected() {
        let store = Arc::new(MemoryStateStore::new());
        let backend = backend(store);

        let result = backend
            .fetch_matches("nonexistent", fixtures::skill_profile("p", 0.0, 100.0, 2))
            .await;
        assert!(matches!(result, Err(BackendError::InvalidArgument(_))));
    }

    #[tokio::test]
    async fn test_assign_rejects_empty_ids() {
        let store = Arc::new(MemoryStateStore::new());
        let backend = backend(store);

        let result = backend.assign_tickets(&[], &Assignment::new("host:1")).await;
        assert!(matches!(result, Err(BackendError::InvalidArgument(_))));
    }

    #[tokio::test]
    async fn test_assign_missing_id_leaves_existing_untouched() {
        let store = Arc::new(MemoryStateStore::new());
        let existing = store.seed_indexed(fixtures::skill_ticket(1.0)).await;
        let backend = backend(store.clone());

        let result = backend
            .assign_tickets(
                &["bogus".to_string()],
                &Assignment::new("host:1"),
            )
            .await;
        assert!(matches!(result, Err(BackendError::NotFound(_))));

        let ticket = store.get_ticket(&existing).await.unwrap();
        assert!(ticket.assignment.is_none());
        assert!(!store.is_on_ignore_list(&existing));
    }

    #[tokio::test]
    async fn test_assign_writes_assignment_and_hides_tickets() {
        let store = Arc::new(MemoryStateStore::new());
        let id = store.seed_indexed(fixtures::skill_ticket(1.0)).await;
        let backend = backend(store.clone());

        backend
            .assign_tickets(std::slice::from_ref(&id), &Assignment::new("host:1"))
            .await
            .unwrap();

        let ticket = store.get_ticket(&id).await.unwrap();
        assert_eq!(ticket.assignment.unwrap().connection, "host:1");
        assert!(!store.get_indexed_id_set().await.unwrap().contains(&id));
    }
}
