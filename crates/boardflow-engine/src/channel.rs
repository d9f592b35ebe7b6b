use async_trait::async_trait;
use tokio::sync::mpsc;

use boardflow_core::{BoardflowError, BoardflowResult};

use crate::protocol::ClientMessage;

/// Outbound half of the message channel to the server.
///
/// Implementations wrap whatever persistent bidirectional transport the
/// application uses; the engine only ever asks to send. Inbound
/// messages are pumped into the [`ResponseMatcher`](crate::matcher::ResponseMatcher)
/// by the transport's receive loop.
#[async_trait]
pub trait Channel: Send + Sync {
    async fn send(&self, message: ClientMessage) -> BoardflowResult<()>;
}

/// A `Channel` backed by a tokio mpsc queue. Used by tests and by
/// embedders that bridge the engine onto their own socket loop.
#[derive(Debug, Clone)]
pub struct InMemoryChannel {
    tx: mpsc::UnboundedSender<ClientMessage>,
}

impl InMemoryChannel {
    pub fn pair() -> (Self, mpsc::UnboundedReceiver<ClientMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

#[async_trait]
impl Channel for InMemoryChannel {
    async fn send(&self, message: ClientMessage) -> BoardflowResult<()> {
        self.tx
            .send(message)
            .map_err(|_| BoardflowError::Transport("channel closed".to_string()))
    }
}
