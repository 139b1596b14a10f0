//! Frontend service: ticket CRUD and assignment watching.

mod deleter;
mod service;

pub use deleter::{create_deleter, DeleterHandle, TicketDeleter};
pub use service::{FrontendConfig, FrontendError, FrontendService};
