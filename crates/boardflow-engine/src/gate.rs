use boardflow_core::{BoardflowError, BoardflowResult};
use boardflow_domain::{GroupId, ItemId};

use crate::{
    channel::Channel,
    matcher::ResponseMatcher,
    protocol::{ClientMessage, CorrelationId, GateRequest, ServerMessage},
};

/// Outcome of a dependency check for a status-changing move.
#[derive(Debug, Clone, PartialEq)]
pub struct GateDecision {
    pub accepted: bool,
    /// Names of the unresolved blocking dependencies, for the
    /// user-facing warning. Empty when accepted.
    pub blocking: Vec<String>,
}

/// Pre-commit business-rule check: a move into a workflow status must
/// not complete while blocking-dependency predecessors are unresolved.
///
/// A rejection is never a silent no-op; the caller rolls back and
/// surfaces a warning naming the dependencies.
#[derive(Debug, Clone)]
pub struct DependencyGate {
    matcher: ResponseMatcher,
}

impl DependencyGate {
    pub fn new(matcher: ResponseMatcher) -> Self {
        Self { matcher }
    }

    pub async fn check<C: Channel>(
        &self,
        channel: &C,
        item_id: ItemId,
        destination_group_id: GroupId,
    ) -> BoardflowResult<GateDecision> {
        let request = ClientMessage::CheckDependencyGate(GateRequest {
            correlation_id: CorrelationId::generate(),
            item_id,
            destination_group_id,
        });
        match self.matcher.send_request(channel, request).await? {
            ServerMessage::GateAck {
                accepted, blocking, ..
            } => Ok(GateDecision { accepted, blocking }),
            other => Err(BoardflowError::Transport(format!(
                "expected a gate ack, got {other:?}"
            ))),
        }
    }
}
