//! Evaluator client configuration.

use serde::{Deserialize, Serialize};

/// Where and how to reach the evaluator. Exactly one of `ws_port` /
/// `http_port` must be set.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EvaluatorConfig {
    #[serde(default = "default_hostname")]
    pub hostname: String,

    /// WebSocket streaming transport port.
    #[serde(default)]
    pub ws_port: Option<u16>,

    /// Chunked HTTP JSON transport port.
    #[serde(default)]
    pub http_port: Option<u16>,

    /// Request timeout for the HTTP transport.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            hostname: default_hostname(),
            ws_port: None,
            http_port: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_hostname() -> String {
    "localhost".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}
