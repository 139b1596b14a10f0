//! Chunked HTTP JSON evaluator transport.

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use std::time::Duration;
use tracing::debug;

use crate::mmf::Match;

use super::traits::{Evaluator, EvaluatorError};
use super::wire::{EvaluateRequest, ResponseFrame};

/// POSTs proposals as a chunked request body (one JSON object per line,
/// written by a background producer) and reads newline-delimited
/// `{result}` / `{error}` frames from the response body.
pub struct HttpEvaluator {
    client: reqwest::Client,
    url: String,
}

impl HttpEvaluator {
    pub fn new(hostname: &str, port: u16, timeout_secs: u64) -> Result<Self, EvaluatorError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| EvaluatorError::Internal(e.to_string()))?;

        Ok(Self {
            client,
            url: format!(
                "http://{}:{}/v1/evaluator/matches:evaluate",
                hostname, port
            ),
        })
    }
}

#[async_trait]
impl Evaluator for HttpEvaluator {
    fn name(&self) -> &str {
        "http"
    }

    async fn evaluate(&self, proposals: Vec<Match>) -> Result<Vec<Match>, EvaluatorError> {
        let (mut body_tx, body_rx) =
            futures::channel::mpsc::channel::<Result<Vec<u8>, std::io::Error>>(16);

        debug!(proposals = proposals.len(), "posting proposals to evaluator");

        // Producer feeding the chunked request body. Serialization failures
        // end the body early and are reported after the response is read.
        let producer = tokio::spawn(async move {
            for proposal in proposals {
                let mut line = serde_json::to_vec(&EvaluateRequest { proposal })
                    .map_err(|e| EvaluatorError::Internal(e.to_string()))?;
                line.push(b'\n');
                if body_tx.send(Ok(line)).await.is_err() {
                    break;
                }
            }
            Ok::<(), EvaluatorError>(())
        });

        let response = self
            .client
            .post(&self.url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(reqwest::Body::wrap_stream(body_rx))
            .send()
            .await
            .map_err(|e| EvaluatorError::Unavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(EvaluatorError::Unavailable(format!(
                "evaluator returned HTTP {}",
                response.status()
            )));
        }

        let mut accepted = Vec::new();
        let mut buffer: Vec<u8> = Vec::new();
        let mut chunks = response.bytes_stream();
        while let Some(chunk) = chunks.next().await {
            let chunk = chunk.map_err(|e| EvaluatorError::Unavailable(e.to_string()))?;
            buffer.extend_from_slice(&chunk);
            while let Some(pos) = buffer.iter().position(|b| *b == b'\n') {
                let line: Vec<u8> = buffer.drain(..=pos).collect();
                consume_line(&line, &mut accepted)?;
            }
        }
        consume_line(&buffer, &mut accepted)?;

        producer
            .await
            .map_err(|e| EvaluatorError::Internal(e.to_string()))??;

        debug!(accepted = accepted.len(), "evaluator response finished");
        Ok(accepted)
    }
}

fn consume_line(line: &[u8], accepted: &mut Vec<Match>) -> Result<(), EvaluatorError> {
    let trimmed: &[u8] = {
        let mut slice = line;
        while let [rest @ .., last] = slice {
            if last.is_ascii_whitespace() {
                slice = rest;
            } else {
                break;
            }
        }
        slice
    };
    if trimmed.is_empty() {
        return Ok(());
    }

    let frame: ResponseFrame = serde_json::from_slice(trimmed).map_err(|e| {
        EvaluatorError::Unavailable(format!("failed to read evaluator JSON stream: {}", e))
    })?;
    if let Some(m) = frame.into_accepted()? {
        accepted.push(m);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_consume_line_collects_results() {
        let mut accepted = Vec::new();
        consume_line(
            br#"{"result": {"match": {"match_id": "m-1"}}}"#,
            &mut accepted,
        )
        .unwrap();
        consume_line(b"  \n", &mut accepted).unwrap();
        consume_line(
            br#"{"result": {"match": {"match_id": "m-2"}}}"#,
            &mut accepted,
        )
        .unwrap();

        let ids: Vec<_> = accepted.iter().map(|m| m.match_id.as_str()).collect();
        assert_eq!(ids, vec!["m-1", "m-2"]);
    }

    #[test]
    fn test_consume_line_error_frame() {
        let mut accepted = Vec::new();
        let result = consume_line(br#"{"error": {"message": "conflict"}}"#, &mut accepted);
        assert!(matches!(result, Err(EvaluatorError::Unavailable(_))));
    }

    #[test]
    fn test_consume_line_garbage() {
        let mut accepted = Vec::new();
        let result = consume_line(b"not json", &mut accepted);
        assert!(matches!(result, Err(EvaluatorError::Unavailable(_))));
    }
}
