//! Prometheus metrics for observability.

use once_cell::sync::Lazy;
use prometheus::{self, Encoder, IntCounter, Registry, TextEncoder};

/// Global metrics registry.
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

/// Tickets created through the frontend.
pub static TICKETS_CREATED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new("matchgrid_tickets_created_total", "Tickets created").unwrap()
});

/// Tickets deleted through the frontend.
pub static TICKETS_DELETED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new("matchgrid_tickets_deleted_total", "Tickets deleted").unwrap()
});

/// Tickets retrieved through the frontend.
pub static TICKETS_RETRIEVED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new("matchgrid_tickets_retrieved_total", "Tickets retrieved").unwrap()
});

/// Assignments pushed to watching clients.
pub static ASSIGNMENTS_STREAMED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "matchgrid_assignments_streamed_total",
        "Assignments pushed to watchers",
    )
    .unwrap()
});

/// Accepted matches streamed to backends.
pub static MATCHES_FETCHED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "matchgrid_matches_fetched_total",
        "Accepted matches streamed to backends",
    )
    .unwrap()
});

/// Tickets that received an assignment.
pub static TICKETS_ASSIGNED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new("matchgrid_tickets_assigned_total", "Tickets assigned").unwrap()
});

/// Ticket queries served.
pub static QUERIES_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new("matchgrid_queries_total", "Ticket queries served").unwrap()
});

fn register_metrics(registry: &Registry) {
    registry
        .register(Box::new(TICKETS_CREATED_TOTAL.clone()))
        .unwrap();
    registry
        .register(Box::new(TICKETS_DELETED_TOTAL.clone()))
        .unwrap();
    registry
        .register(Box::new(TICKETS_RETRIEVED_TOTAL.clone()))
        .unwrap();
    registry
        .register(Box::new(ASSIGNMENTS_STREAMED_TOTAL.clone()))
        .unwrap();
    registry
        .register(Box::new(MATCHES_FETCHED_TOTAL.clone()))
        .unwrap();
    registry
        .register(Box::new(TICKETS_ASSIGNED_TOTAL.clone()))
        .unwrap();
    registry.register(Box::new(QUERIES_TOTAL.clone())).unwrap();
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer).unwrap_or_default();
    String::from_utf8(buffer).unwrap_or_default()
}
