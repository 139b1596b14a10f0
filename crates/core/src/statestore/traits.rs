//! The state storage contract.

use async_trait::async_trait;
use futures::future::BoxFuture;
use std::collections::HashSet;

use crate::ticket::{Assignment, Ticket};

use super::error::StoreError;

/// Whether an assignment watch should keep polling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchFlow {
    Continue,
    Stop,
}

/// Callback invoked by [`StateStore::get_assignments`] whenever the observed
/// assignment differs from the previously delivered one.
pub type AssignmentCallback =
    Box<dyn FnMut(Option<Assignment>) -> BoxFuture<'static, WatchFlow> + Send>;

/// Storage backend for tickets, the candidate index, and the ignore list.
///
/// All operations are cancellable by dropping the returned future.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Cheap reachability probe. Uses a connection pool distinct from the
    /// data pool so that data-pool exhaustion cannot hide an unhealthy store.
    async fn health_check(&self) -> Result<(), StoreError>;

    /// Persist `ticket` under its id, overwriting any existing record.
    async fn create_ticket(&self, ticket: &Ticket) -> Result<(), StoreError>;

    /// Fetch the ticket with the given id.
    async fn get_ticket(&self, id: &str) -> Result<Ticket, StoreError>;

    /// Remove the ticket record. Succeeds whether or not the id exists.
    async fn delete_ticket(&self, id: &str) -> Result<(), StoreError>;

    /// Add the ticket's id to the candidate index. Idempotent.
    async fn index_ticket(&self, ticket: &Ticket) -> Result<(), StoreError>;

    /// Remove the id from the candidate index; the ticket itself survives.
    /// Idempotent.
    async fn deindex_ticket(&self, id: &str) -> Result<(), StoreError>;

    /// Ids currently indexed, minus ids whose ignore-list entry is younger
    /// than the configured ignore-list TTL.
    async fn get_indexed_id_set(&self) -> Result<HashSet<String>, StoreError>;

    /// Fetch multiple tickets. Ids deleted or expired between the index
    /// snapshot and this read are silently dropped; order is not guaranteed.
    async fn get_tickets(&self, ids: &[String]) -> Result<Vec<Ticket>, StoreError>;

    /// Rewrite every listed ticket with a deep clone of `assignment`.
    ///
    /// Every id is verified to exist before the first write. The writes
    /// themselves are not atomic across ids: a backend failure mid-call can
    /// leave a subset of the tickets updated.
    async fn update_assignments(
        &self,
        ids: &[String],
        assignment: &Assignment,
    ) -> Result<(), StoreError>;

    /// Poll the ticket's assignment with a constant backoff, invoking
    /// `callback` only when the observed value differs from the previously
    /// delivered one (the first non-null observation fires). Returns when the
    /// callback asks to stop or the ticket disappears.
    async fn get_assignments(
        &self,
        id: &str,
        callback: AssignmentCallback,
    ) -> Result<(), StoreError>;

    /// Stamp each id onto the ignore list with the current time, in one
    /// pipelined round trip. Entries for ids whose ticket record has already
    /// expired are harmless; queries drop missing tickets and the entries age
    /// out with the ignore-list TTL.
    async fn add_tickets_to_ignore_list(&self, ids: &[String]) -> Result<(), StoreError>;

    /// Remove ids from the ignore list, in one pipelined round trip.
    async fn delete_tickets_from_ignore_list(&self, ids: &[String]) -> Result<(), StoreError>;
}
