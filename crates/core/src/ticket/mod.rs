//! Ticket data types shared by every service.

mod types;

pub use types::{Assignment, SearchFields, Ticket};
