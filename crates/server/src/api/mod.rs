pub mod error;
pub mod handlers;
pub mod matches;
pub mod query;
pub mod routes;
pub mod tickets;

pub use routes::create_router;
