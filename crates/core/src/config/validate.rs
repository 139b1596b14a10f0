use super::{types::Config, ConfigError};

/// Validate configuration beyond what serde enforces:
/// - server port is not 0
/// - exactly one evaluator transport is selected
/// - page sizes, intervals, and queue sizes are non-zero
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    match (config.evaluator.ws_port, config.evaluator.http_port) {
        (None, None) => {
            return Err(ConfigError::ValidationError(
                "one of evaluator.ws_port or evaluator.http_port must be set".to_string(),
            ));
        }
        (Some(_), Some(_)) => {
            return Err(ConfigError::ValidationError(
                "evaluator.ws_port and evaluator.http_port are mutually exclusive".to_string(),
            ));
        }
        _ => {}
    }

    if config.query.page_size == 0 {
        return Err(ConfigError::ValidationError(
            "query.page_size cannot be 0".to_string(),
        ));
    }
    if config.query.fetch_batch_size == 0 {
        return Err(ConfigError::ValidationError(
            "query.fetch_batch_size cannot be 0".to_string(),
        ));
    }

    if config.synchronizer.registration_interval_ms == 0 {
        return Err(ConfigError::ValidationError(
            "synchronizer.registration_interval_ms cannot be 0".to_string(),
        ));
    }
    if config.synchronizer.proposal_collection_interval_ms == 0 {
        return Err(ConfigError::ValidationError(
            "synchronizer.proposal_collection_interval_ms cannot be 0".to_string(),
        ));
    }

    if config.frontend.delete_queue_size == 0 {
        return Err(ConfigError::ValidationError(
            "frontend.delete_queue_size cannot be 0".to_string(),
        ));
    }

    Ok(())
}
