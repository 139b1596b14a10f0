//! Backend service: fetch matches and apply assignments.

mod service;

pub use service::{BackendError, BackendService};
