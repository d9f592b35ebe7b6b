use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use boardflow_core::{BoardflowError, BoardflowResult};

use crate::{
    channel::Channel,
    protocol::{ClientMessage, CorrelationId, ServerMessage},
};

/// Pairs each outbound request with exactly one response.
///
/// A response resolves only the waiter registered under its correlation
/// token. Responses carrying an unknown token are logged and dropped;
/// they are never handed to an unrelated in-flight request, so two
/// items moved in quick succession cannot steal each other's replies.
#[derive(Debug, Clone)]
pub struct ResponseMatcher {
    pending: Arc<Mutex<HashMap<CorrelationId, oneshot::Sender<ServerMessage>>>>,
    timeout: Duration,
}

impl ResponseMatcher {
    pub fn new(timeout: Duration) -> Self {
        Self {
            pending: Arc::new(Mutex::new(HashMap::new())),
            timeout,
        }
    }

    /// Send `message` and await the response echoing its token.
    ///
    /// Panics if `message` is a notification (no token): correlated
    /// sends are for requests only.
    pub async fn send_request<C: Channel>(
        &self,
        channel: &C,
        message: ClientMessage,
    ) -> BoardflowResult<ServerMessage> {
        let id = message
            .correlation_id()
            .expect("send_request requires a correlated message");
        let (tx, rx) = oneshot::channel();
        self.pending
            .lock()
            .expect("matcher lock poisoned")
            .insert(id, tx);

        if let Err(err) = channel.send(message).await {
            self.forget(id);
            return Err(err);
        }

        match tokio::time::timeout(self.timeout, rx).await {
            Ok(Ok(response)) => Ok(response),
            Ok(Err(_)) => {
                self.forget(id);
                Err(BoardflowError::Transport(
                    "response channel closed".to_string(),
                ))
            }
            Err(_) => {
                self.forget(id);
                warn!(correlation_id = %id, "timed out waiting for response");
                Err(BoardflowError::Timeout)
            }
        }
    }

    /// Route one inbound message to its waiter, if any.
    pub fn dispatch_inbound(&self, message: ServerMessage) {
        let id = message.correlation_id();
        let waiter = self
            .pending
            .lock()
            .expect("matcher lock poisoned")
            .remove(&id);
        match waiter {
            Some(tx) => {
                if tx.send(message).is_err() {
                    debug!(correlation_id = %id, "waiter gone before response arrived");
                }
            }
            None => {
                warn!(correlation_id = %id, "dropping response with no matching request");
            }
        }
    }

    /// Spawn a task pumping a receiver of server messages into the
    /// matcher. Returns the pump's handle so callers can shut it down.
    pub fn pump(&self, mut rx: mpsc::UnboundedReceiver<ServerMessage>) -> JoinHandle<()> {
        let matcher = self.clone();
        tokio::spawn(async move {
            while let Some(message) = rx.recv().await {
                matcher.dispatch_inbound(message);
            }
        })
    }

    pub fn in_flight(&self) -> usize {
        self.pending.lock().expect("matcher lock poisoned").len()
    }

    fn forget(&self, id: CorrelationId) {
        self.pending
            .lock()
            .expect("matcher lock poisoned")
            .remove(&id);
    }
}
