//! The evaluator seam.

use async_trait::async_trait;
use thiserror::Error;

use crate::mmf::Match;

/// Errors from evaluator calls.
#[derive(Debug, Error)]
pub enum EvaluatorError {
    /// The evaluator configuration is unusable. Raised at startup only.
    #[error("evaluator misconfigured: {0}")]
    FailedPrecondition(String),

    /// The evaluator could not be reached, closed the stream early, or
    /// reported an error frame. The synchronizer aborts the window; the next
    /// window may succeed.
    #[error("evaluator unavailable: {0}")]
    Unavailable(String),

    /// Serialization failure on our side.
    #[error("evaluator client error: {0}")]
    Internal(String),
}

/// Decides which proposals to keep.
///
/// The returned matches are whatever subset the evaluator accepted, in the
/// order it produced them. Proposals the evaluator rejects are simply absent;
/// rejection is not an error.
#[async_trait]
pub trait Evaluator: Send + Sync {
    /// Transport name for logging.
    fn name(&self) -> &str;

    /// Stream `proposals` to the evaluator and collect its accepted subset.
    async fn evaluate(&self, proposals: Vec<Match>) -> Result<Vec<Match>, EvaluatorError>;
}
