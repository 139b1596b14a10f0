//! Ticket query service.
//!
//! Evaluates pool filters against the candidate index and streams matching
//! tickets back in pages. Read-only: nothing here mutates store state.

mod service;
mod types;

pub use service::{QueryConfig, QueryError, QueryService};
pub use types::{DoubleRangeFilter, Pool, StringEqualsFilter, TagPresentFilter};
