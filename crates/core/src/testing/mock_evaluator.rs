//! Controllable evaluators for tests.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashSet;

use crate::evaluator::{Evaluator, EvaluatorError};
use crate::mmf::Match;

/// Scripted evaluator.
///
/// Plays back a script of responses, one per `evaluate` call, and records
/// every batch it receives for assertions. With an empty or exhausted script
/// it accepts every proposal unchanged.
pub struct MockEvaluator {
    script: Mutex<Vec<Result<Vec<Match>, String>>>,
    batches: Mutex<Vec<Vec<Match>>>,
}

impl MockEvaluator {
    /// Accept every proposal, always.
    pub fn accept_all() -> Self {
        Self::scripted(Vec::new())
    }

    /// Play back `script` in order; `Err` strings become `Unavailable`.
    pub fn scripted(script: Vec<Result<Vec<Match>, String>>) -> Self {
        Self {
            script: Mutex::new(script),
            batches: Mutex::new(Vec::new()),
        }
    }

    /// Every batch received so far, in call order.
    pub fn recorded_batches(&self) -> Vec<Vec<Match>> {
        self.batches.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.batches.lock().len()
    }
}

#[async_trait]
impl Evaluator for MockEvaluator {
    fn name(&self) -> &str {
        "mock"
    }

    async fn evaluate(&self, proposals: Vec<Match>) -> Result<Vec<Match>, EvaluatorError> {
        self.batches.lock().push(proposals.clone());

        let scripted = {
            let mut script = self.script.lock();
            if script.is_empty() {
                None
            } else {
                Some(script.remove(0))
            }
        };

        match scripted {
            Some(Ok(accepted)) => Ok(accepted),
            Some(Err(message)) => Err(EvaluatorError::Unavailable(message)),
            None => Ok(proposals),
        }
    }
}

/// Accepts each proposal whose tickets are all still unclaimed within the
/// batch, in arrival order. This is the usual conflict-resolution strategy of
/// a real evaluator: first proposal wins, overlapping ones are rejected.
pub struct FirstComeEvaluator;

impl FirstComeEvaluator {
    pub fn new() -> Self {
        Self
    }
}

impl Default for FirstComeEvaluator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Evaluator for FirstComeEvaluator {
    fn name(&self) -> &str {
        "first-come"
    }

    async fn evaluate(&self, proposals: Vec<Match>) -> Result<Vec<Match>, EvaluatorError> {
        let mut claimed: HashSet<String> = HashSet::new();
        let mut accepted = Vec::new();

        for proposal in proposals {
            let ids = proposal.ticket_ids();
            if ids.iter().any(|id| claimed.contains(id)) {
                continue;
            }
            claimed.extend(ids);
            accepted.push(proposal);
        }

        Ok(accepted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures;

    fn proposal(id: &str, tickets: Vec<crate::ticket::Ticket>) -> Match {
        Match {
            match_id: id.to_string(),
            match_profile: "p".to_string(),
            match_function: "f".to_string(),
            tickets,
            payload: serde_json::Value::Null,
        }
    }

    #[tokio::test]
    async fn test_first_come_rejects_overlap() {
        let shared = fixtures::skill_ticket(1.0);
        let other = fixtures::skill_ticket(2.0);

        let evaluator = FirstComeEvaluator::new();
        let accepted = evaluator
            .evaluate(vec![
                proposal("m-1", vec![shared.clone(), other.clone()]),
                proposal("m-2", vec![shared.clone()]),
            ])
            .await
            .unwrap();

        let ids: Vec<_> = accepted.iter().map(|m| m.match_id.as_str()).collect();
        assert_eq!(ids, vec!["m-1"]);
    }

    #[tokio::test]
    async fn test_first_come_keeps_disjoint() {
        let evaluator = FirstComeEvaluator::new();
        let accepted = evaluator
            .evaluate(vec![
                proposal("m-1", vec![fixtures::skill_ticket(1.0)]),
                proposal("m-2", vec![fixtures::skill_ticket(2.0)]),
            ])
            .await
            .unwrap();
        assert_eq!(accepted.len(), 2);
    }

    #[tokio::test]
    async fn test_mock_plays_script_then_accepts_all() {
        let evaluator = MockEvaluator::scripted(vec![Err("down".to_string())]);

        let first = evaluator
            .evaluate(vec![proposal("m-1", vec![fixtures::skill_ticket(1.0)])])
            .await;
        assert!(first.is_err());

        let batch = vec![proposal("m-2", vec![fixtures::skill_ticket(2.0)])];
        let second = evaluator.evaluate(batch.clone()).await.unwrap();
        assert_eq!(second, batch);
        assert_eq!(evaluator.call_count(), 2);
    }
}
