//! Wire frames shared by both evaluator transports.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::mmf::Match;

use super::traits::EvaluatorError;

/// One proposal sent to the evaluator.
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct EvaluateRequest {
    #[serde(rename = "match")]
    pub proposal: Match,
}

/// One accepted match received from the evaluator.
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct EvaluateResponse {
    #[serde(rename = "match")]
    pub accepted: Match,
}

/// One frame of the HTTP transport's newline-delimited response body:
/// either a result or an error, never both.
#[derive(Debug, Deserialize)]
pub(crate) struct ResponseFrame {
    #[serde(default)]
    pub result: Option<EvaluateResponse>,
    #[serde(default)]
    pub error: Option<Value>,
}

impl ResponseFrame {
    /// Extract the accepted match, failing the whole call on an error frame.
    pub fn into_accepted(self) -> Result<Option<Match>, EvaluatorError> {
        if let Some(error) = self.error {
            if !error.is_null() {
                return Err(EvaluatorError::Unavailable(format!(
                    "evaluator reported: {}",
                    error
                )));
            }
        }
        Ok(self.result.map(|r| r.accepted))
    }
}
