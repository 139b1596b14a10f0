//! WebSocket evaluator transport.

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::debug;

use crate::mmf::Match;

use super::traits::{Evaluator, EvaluatorError};
use super::wire::{EvaluateRequest, EvaluateResponse};

/// Streams proposals over a WebSocket: one text frame per proposal, then a
/// close of the send side; accepted matches are read until the peer closes.
pub struct WsEvaluator {
    url: String,
}

impl WsEvaluator {
    pub fn new(hostname: &str, port: u16) -> Self {
        Self {
            url: format!("ws://{}:{}/v1/evaluator/matches:evaluate", hostname, port),
        }
    }
}

#[async_trait]
impl Evaluator for WsEvaluator {
    fn name(&self) -> &str {
        "websocket"
    }

    async fn evaluate(&self, proposals: Vec<Match>) -> Result<Vec<Match>, EvaluatorError> {
        let (stream, _) = connect_async(self.url.as_str())
            .await
            .map_err(|e| EvaluatorError::Unavailable(e.to_string()))?;
        let (mut write, mut read) = stream.split();

        debug!(proposals = proposals.len(), "streaming proposals to evaluator");

        for proposal in proposals {
            let frame = serde_json::to_string(&EvaluateRequest { proposal })
                .map_err(|e| EvaluatorError::Internal(e.to_string()))?;
            write
                .send(Message::Text(frame.into()))
                .await
                .map_err(|e| EvaluatorError::Unavailable(e.to_string()))?;
        }

        write
            .send(Message::Close(None))
            .await
            .map_err(|e| EvaluatorError::Unavailable(e.to_string()))?;

        let mut accepted = Vec::new();
        while let Some(message) = read.next().await {
            let message = message.map_err(|e| EvaluatorError::Unavailable(e.to_string()))?;
            match message {
                Message::Text(text) => {
                    let response: EvaluateResponse = serde_json::from_str(text.as_ref())
                        .map_err(|e| {
                            EvaluatorError::Unavailable(format!(
                                "unparseable evaluator frame: {}",
                                e
                            ))
                        })?;
                    accepted.push(response.accepted);
                }
                Message::Close(_) => break,
                // Control frames carry no matches.
                _ => {}
            }
        }

        debug!(accepted = accepted.len(), "evaluator stream finished");
        Ok(accepted)
    }
}
