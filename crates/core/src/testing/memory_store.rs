//! In-memory state store.
//!
//! A complete implementation of the storage contract, including ignore-list
//! and ticket TTLs, so the full pipeline can run in tests without a Redis
//! server.

use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::time::Duration;

use crate::statestore::{AssignmentCallback, StateStore, StoreError, WatchFlow};
use crate::ticket::{Assignment, Ticket};

/// In-process implementation of [`StateStore`].
pub struct MemoryStateStore {
    inner: Mutex<Inner>,
    ticket_ttl: Option<ChronoDuration>,
    ignore_list_ttl: ChronoDuration,
    poll_interval: Duration,
}

struct Inner {
    tickets: HashMap<String, StoredTicket>,
    index: HashSet<String>,
    ignore: HashMap<String, DateTime<Utc>>,
    fail_next_delete: bool,
    fail_next_ignore_add: bool,
}

struct StoredTicket {
    ticket: Ticket,
    stored_at: DateTime<Utc>,
}

impl Default for MemoryStateStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                tickets: HashMap::new(),
                index: HashSet::new(),
                ignore: HashMap::new(),
                fail_next_delete: false,
                fail_next_ignore_add: false,
            }),
            ticket_ttl: None,
            ignore_list_ttl: ChronoDuration::seconds(60),
            poll_interval: Duration::from_millis(10),
        }
    }

    /// Hide ignore-list entries for this long instead of the 60s default.
    pub fn with_ignore_list_ttl(mut self, ttl: Duration) -> Self {
        self.ignore_list_ttl =
            ChronoDuration::from_std(ttl).unwrap_or_else(|_| ChronoDuration::seconds(60));
        self
    }

    /// Expire ticket records after this long.
    pub fn with_ticket_ttl(mut self, ttl: Duration) -> Self {
        self.ticket_ttl = ChronoDuration::from_std(ttl).ok();
        self
    }

    /// Assignment poll spacing for `get_assignments`.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Store and index a ticket in one step, returning its id.
    pub async fn seed_indexed(&self, ticket: Ticket) -> String {
        let id = ticket.id.clone();
        let mut inner = self.inner.lock();
        inner.tickets.insert(
            id.clone(),
            StoredTicket {
                ticket,
                stored_at: Utc::now(),
            },
        );
        inner.index.insert(id.clone());
        id
    }

    /// Whether the id currently has any ignore-list entry, fresh or stale.
    pub fn is_on_ignore_list(&self, id: &str) -> bool {
        self.inner.lock().ignore.contains_key(id)
    }

    /// Make the next `delete_ticket` call fail once.
    pub async fn fail_next_delete(&self) {
        self.inner.lock().fail_next_delete = true;
    }

    /// Make the next `add_tickets_to_ignore_list` call fail once.
    pub async fn fail_next_ignore_list_add(&self) {
        self.inner.lock().fail_next_ignore_add = true;
    }

    /// Drop records whose ticket TTL has elapsed, and their index entries.
    fn sweep(&self, inner: &mut Inner) {
        let Some(ttl) = self.ticket_ttl else { return };
        let now = Utc::now();
        let expired: Vec<String> = inner
            .tickets
            .iter()
            .filter(|(_, stored)| stored.stored_at + ttl <= now)
            .map(|(id, _)| id.clone())
            .collect();
        for id in expired {
            inner.tickets.remove(&id);
            inner.index.remove(&id);
        }
    }
}

#[async_trait]
impl StateStore for MemoryStateStore {
    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn create_ticket(&self, ticket: &Ticket) -> Result<(), StoreError> {
        let mut inner = self.inner.lock();
        inner.tickets.insert(
            ticket.id.clone(),
            StoredTicket {
                ticket: ticket.clone(),
                stored_at: Utc::now(),
            },
        );
        Ok(())
    }

    async fn get_ticket(&self, id: &str) -> Result<Ticket, StoreError> {
        let mut inner = self.inner.lock();
        self.sweep(&mut inner);
        inner
            .tickets
            .get(id)
            .map(|stored| stored.ticket.clone())
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    async fn delete_ticket(&self, id: &str) -> Result<(), StoreError> {
        let mut inner = self.inner.lock();
        if inner.fail_next_delete {
            inner.fail_next_delete = false;
            return Err(StoreError::Internal("injected delete failure".to_string()));
        }
        inner.tickets.remove(id);
        Ok(())
    }

    async fn index_ticket(&self, ticket: &Ticket) -> Result<(), StoreError> {
        self.inner.lock().index.insert(ticket.id.clone());
        Ok(())
    }

    async fn deindex_ticket(&self, id: &str) -> Result<(), StoreError> {
        self.inner.lock().index.remove(id);
        Ok(())
    }

    async fn get_indexed_id_set(&self) -> Result<HashSet<String>, StoreError> {
        let mut inner = self.inner.lock();
        self.sweep(&mut inner);

        let now = Utc::now();
        let ttl = self.ignore_list_ttl;
        let hidden: HashSet<&String> = inner
            .ignore
            .iter()
            .filter(|(_, inserted)| now - **inserted < ttl)
            .map(|(id, _)| id)
            .collect();

        Ok(inner
            .index
            .iter()
            .filter(|id| !hidden.contains(id))
            .cloned()
            .collect())
    }

    async fn get_tickets(&self, ids: &[String]) -> Result<Vec<Ticket>, StoreError> {
        let mut inner = self.inner.lock();
        self.sweep(&mut inner);
        Ok(ids
            .iter()
            .filter_map(|id| inner.tickets.get(id).map(|stored| stored.ticket.clone()))
            .collect())
    }

    async fn update_assignments(
        &self,
        ids: &[String],
        assignment: &Assignment,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.lock();
        self.sweep(&mut inner);

        for id in ids {
            if !inner.tickets.contains_key(id) {
                return Err(StoreError::NotFound(id.clone()));
            }
        }
        for id in ids {
            if let Some(stored) = inner.tickets.get_mut(id) {
                stored.ticket.assignment = Some(assignment.clone());
            }
        }
        Ok(())
    }

    async fn get_assignments(
        &self,
        id: &str,
        mut callback: AssignmentCallback,
    ) -> Result<(), StoreError> {
        let mut delivered: Option<Assignment> = None;

        loop {
            let ticket = self.get_ticket(id).await?;
            let current = ticket.assignment;

            let changed = match (&delivered, &current) {
                (None, Some(_)) => true,
                (Some(prev), Some(cur)) => prev != cur,
                (Some(_), None) => true,
                (None, None) => false,
            };

            if changed {
                delivered = current.clone();
                if callback(current).await == WatchFlow::Stop {
                    return Ok(());
                }
            }

            tokio::time::sleep(self.poll_interval).await;
        }
    }

    async fn add_tickets_to_ignore_list(&self, ids: &[String]) -> Result<(), StoreError> {
        let mut inner = self.inner.lock();
        if inner.fail_next_ignore_add {
            inner.fail_next_ignore_add = false;
            return Err(StoreError::Unavailable(
                "injected ignore-list failure".to_string(),
            ));
        }
        let now = Utc::now();
        for id in ids {
            inner.ignore.insert(id.clone(), now);
        }
        Ok(())
    }

    async fn delete_tickets_from_ignore_list(&self, ids: &[String]) -> Result<(), StoreError> {
        let mut inner = self.inner.lock();
        for id in ids {
            inner.ignore.remove(id);
        }
        Ok(())
    }
}
