//! Evaluator client.
//!
//! The evaluator is an external service that picks a non-conflicting subset
//! from a window's proposals. Two transports are supported, selected by
//! configuration: a WebSocket stream (one frame per proposal, accepted
//! matches streamed back) and a chunked HTTP JSON call. The transport is
//! constructed once at startup; a configuration that selects neither (or
//! both) is a fatal startup error.

mod config;
mod http;
mod traits;
mod wire;
mod ws;

pub use config::EvaluatorConfig;
pub use http::HttpEvaluator;
pub use traits::{Evaluator, EvaluatorError};
pub use ws::WsEvaluator;

use std::sync::Arc;
use tracing::info;

/// Build the evaluator client selected by `config`.
///
/// Exactly one transport must be configured; anything else fails with
/// `FailedPrecondition` and should abort startup.
pub fn build_evaluator(config: &EvaluatorConfig) -> Result<Arc<dyn Evaluator>, EvaluatorError> {
    match (config.ws_port, config.http_port) {
        (Some(port), None) => {
            info!(hostname = %config.hostname, port, "using websocket evaluator transport");
            Ok(Arc::new(WsEvaluator::new(&config.hostname, port)))
        }
        (None, Some(port)) => {
            info!(hostname = %config.hostname, port, "using http evaluator transport");
            Ok(Arc::new(HttpEvaluator::new(
                &config.hostname,
                port,
                config.timeout_secs,
            )?))
        }
        (None, None) => Err(EvaluatorError::FailedPrecondition(
            "unable to determine evaluator transport, either evaluator.ws_port or \
             evaluator.http_port must be configured"
                .to_string(),
        )),
        (Some(_), Some(_)) => Err(EvaluatorError::FailedPrecondition(
            "evaluator.ws_port and evaluator.http_port are mutually exclusive".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_requires_a_transport() {
        let config = EvaluatorConfig::default();
        let result = build_evaluator(&config);
        assert!(matches!(
            result,
            Err(EvaluatorError::FailedPrecondition(_))
        ));
    }

    #[test]
    fn test_build_rejects_both_transports() {
        let config = EvaluatorConfig {
            ws_port: Some(50508),
            http_port: Some(51508),
            ..EvaluatorConfig::default()
        };
        assert!(matches!(
            build_evaluator(&config),
            Err(EvaluatorError::FailedPrecondition(_))
        ));
    }

    #[test]
    fn test_build_ws_transport() {
        let config = EvaluatorConfig {
            ws_port: Some(50508),
            ..EvaluatorConfig::default()
        };
        let evaluator = build_evaluator(&config).unwrap();
        assert_eq!(evaluator.name(), "websocket");
    }

    #[test]
    fn test_build_http_transport() {
        let config = EvaluatorConfig {
            http_port: Some(51508),
            ..EvaluatorConfig::default()
        };
        let evaluator = build_evaluator(&config).unwrap();
        assert_eq!(evaluator.name(), "http");
    }
}
