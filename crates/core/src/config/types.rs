//! Configuration types.

use serde::{Deserialize, Serialize};
use std::net::IpAddr;

use crate::evaluator::EvaluatorConfig;
use crate::frontend::FrontendConfig;
use crate::mmf::MmfHostConfig;
use crate::query::QueryConfig;
use crate::statestore::StoreConfig;
use crate::synchronizer::SynchronizerConfig;

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub redis: StoreConfig,

    #[serde(default)]
    pub query: QueryConfig,

    #[serde(default)]
    pub synchronizer: SynchronizerConfig,

    /// Required: one of the two transports must be selected.
    pub evaluator: EvaluatorConfig,

    #[serde(default)]
    pub match_function: MmfHostConfig,

    #[serde(default)]
    pub frontend: FrontendConfig,
}

/// HTTP listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::from([0, 0, 0, 0])
}

fn default_port() -> u16 {
    50500
}

/// Config view safe to expose over the API (secrets redacted).
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub server: ServerConfig,
    pub redis: SanitizedStoreConfig,
    pub query: QueryConfig,
    pub synchronizer: SynchronizerConfig,
    pub evaluator: SanitizedEvaluatorConfig,
    pub match_function: MmfHostConfig,
    pub frontend: FrontendConfig,
}

/// Store config with the password path hidden.
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedStoreConfig {
    pub hostname: String,
    pub port: u16,
    pub password_configured: bool,
    pub pool_max_size: usize,
    pub health_pool_max_size: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ticket_ttl_secs: Option<u64>,
    pub ignore_list_ttl_ms: u64,
    pub assignment_poll_interval_ms: u64,
}

/// Evaluator config reduced to the selected transport.
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedEvaluatorConfig {
    pub hostname: String,
    pub transport: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        let (transport, port) = match (config.evaluator.ws_port, config.evaluator.http_port) {
            (Some(port), _) => ("websocket".to_string(), Some(port)),
            (None, Some(port)) => ("http".to_string(), Some(port)),
            (None, None) => ("unconfigured".to_string(), None),
        };

        Self {
            server: config.server.clone(),
            redis: SanitizedStoreConfig {
                hostname: config.redis.hostname.clone(),
                port: config.redis.port,
                password_configured: config.redis.password_file.is_some(),
                pool_max_size: config.redis.pool_max_size,
                health_pool_max_size: config.redis.health_pool_max_size,
                ticket_ttl_secs: config.redis.ticket_ttl_secs,
                ignore_list_ttl_ms: config.redis.ignore_list_ttl_ms,
                assignment_poll_interval_ms: config.redis.assignment_poll_interval_ms,
            },
            query: config.query.clone(),
            synchronizer: config.synchronizer.clone(),
            evaluator: SanitizedEvaluatorConfig {
                hostname: config.evaluator.hostname.clone(),
                transport,
                port,
            },
            match_function: config.match_function.clone(),
            frontend: config.frontend.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_minimal_config() {
        let toml = r#"
[evaluator]
ws_port = 50508
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.server.port, 50500);
        assert_eq!(config.redis.hostname, "localhost");
        assert_eq!(config.evaluator.ws_port, Some(50508));
        assert_eq!(config.query.page_size, 10_000);
        assert_eq!(config.synchronizer.registration_interval_ms, 250);
    }

    #[test]
    fn test_deserialize_missing_evaluator_fails() {
        let toml = r#"
[server]
port = 50500
"#;
        let result: Result<Config, _> = toml::from_str(toml);
        assert!(result.is_err());
    }

    #[test]
    fn test_deserialize_full_config() {
        let toml = r#"
[server]
host = "127.0.0.1"
port = 9000

[redis]
hostname = "redis.internal"
port = 6380
password_file = "/run/secrets/redis"
ticket_ttl_secs = 600
ignore_list_ttl_ms = 30000

[query]
page_size = 500

[synchronizer]
registration_interval_ms = 100
proposal_collection_interval_ms = 5000

[evaluator]
hostname = "evaluator.internal"
http_port = 51508

[match_function]
max_tickets_per_match = 16

[frontend]
delete_queue_size = 64
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.server.host.to_string(), "127.0.0.1");
        assert_eq!(config.redis.ticket_ttl_secs, Some(600));
        assert_eq!(config.query.page_size, 500);
        assert_eq!(config.evaluator.http_port, Some(51508));
        assert_eq!(config.match_function.max_tickets_per_match, Some(16));
        assert_eq!(config.frontend.delete_queue_size, 64);
    }

    #[test]
    fn test_sanitized_config_hides_password_path() {
        let toml = r#"
[redis]
password_file = "/run/secrets/redis"

[evaluator]
ws_port = 50508
"#;
        let config: Config = toml::from_str(toml).unwrap();
        let sanitized = SanitizedConfig::from(&config);

        assert!(sanitized.redis.password_configured);
        assert_eq!(sanitized.evaluator.transport, "websocket");
        assert_eq!(sanitized.evaluator.port, Some(50508));

        let json = serde_json::to_string(&sanitized).unwrap();
        assert!(!json.contains("/run/secrets/redis"));
    }
}
