//! Redis state store configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for the Redis-backed state store.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StoreConfig {
    /// Redis server hostname.
    #[serde(default = "default_hostname")]
    pub hostname: String,

    /// Redis server port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Redis user (only used when a password file is configured).
    #[serde(default)]
    pub user: Option<String>,

    /// File holding the Redis password. Read once at startup.
    #[serde(default)]
    pub password_file: Option<PathBuf>,

    /// Maximum connections in the data pool.
    #[serde(default = "default_pool_max_size")]
    pub pool_max_size: usize,

    /// Maximum connections in the health-check pool. Kept separate so that
    /// data-pool exhaustion cannot mask an unhealthy store.
    #[serde(default = "default_health_pool_max_size")]
    pub health_pool_max_size: usize,

    /// Ticket record TTL in seconds. None disables expiration.
    #[serde(default)]
    pub ticket_ttl_secs: Option<u64>,

    /// How long an ignore-list entry hides a ticket from queries.
    #[serde(default = "default_ignore_list_ttl_ms")]
    pub ignore_list_ttl_ms: u64,

    /// Constant backoff between assignment polls in `get_assignments`.
    #[serde(default = "default_assignment_poll_interval_ms")]
    pub assignment_poll_interval_ms: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            hostname: default_hostname(),
            port: default_port(),
            user: None,
            password_file: None,
            pool_max_size: default_pool_max_size(),
            health_pool_max_size: default_health_pool_max_size(),
            ticket_ttl_secs: None,
            ignore_list_ttl_ms: default_ignore_list_ttl_ms(),
            assignment_poll_interval_ms: default_assignment_poll_interval_ms(),
        }
    }
}

fn default_hostname() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    6379
}

fn default_pool_max_size() -> usize {
    32
}

fn default_health_pool_max_size() -> usize {
    3
}

fn default_ignore_list_ttl_ms() -> u64 {
    60_000
}

fn default_assignment_poll_interval_ms() -> u64 {
    200
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = StoreConfig::default();
        assert_eq!(config.hostname, "localhost");
        assert_eq!(config.port, 6379);
        assert_eq!(config.pool_max_size, 32);
        assert_eq!(config.health_pool_max_size, 3);
        assert!(config.ticket_ttl_secs.is_none());
        assert_eq!(config.ignore_list_ttl_ms, 60_000);
    }

    #[test]
    fn test_deserialize_partial() {
        let config: StoreConfig = toml::from_str(
            r#"
hostname = "redis.internal"
port = 6380
ticket_ttl_secs = 600
"#,
        )
        .unwrap();
        assert_eq!(config.hostname, "redis.internal");
        assert_eq!(config.port, 6380);
        assert_eq!(config.ticket_ttl_secs, Some(600));
        assert_eq!(config.assignment_poll_interval_ms, 200);
    }
}
