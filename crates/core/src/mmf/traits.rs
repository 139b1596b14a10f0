//! The match function seam.

use async_trait::async_trait;
use std::collections::HashMap;
use thiserror::Error;

use crate::ticket::Ticket;

use super::types::{Match, MatchProfile};

/// Errors from running a match function cycle.
#[derive(Debug, Error)]
pub enum MmfError {
    /// The profile is unusable (no pools, a pool with no filters, an unknown
    /// function name).
    #[error("invalid profile: {0}")]
    InvalidArgument(String),

    /// A pool query or the function itself failed.
    #[error("match function cycle failed: {0}")]
    Internal(String),
}

/// A user-supplied matchmaking algorithm.
///
/// The algorithm is opaque to the host; its only obligation is to return
/// proposals whose tickets were present in its input.
#[async_trait]
pub trait MatchFunction: Send + Sync {
    /// Function name, recorded on every proposal it produces.
    fn name(&self) -> &str;

    /// Produce match proposals from the tickets each pool selected.
    async fn run(
        &self,
        profile: &MatchProfile,
        pool_tickets: HashMap<String, Vec<Ticket>>,
    ) -> Result<Vec<Match>, MmfError>;
}
