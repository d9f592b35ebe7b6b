//! Wire contract for the move/reorder channel.
//!
//! The engine talks to the server over a persistent bidirectional
//! message channel. Framing is the transport's business; the contract
//! here is only "send a message, receive correlated message(s) back".
//! Every request carries a generated correlation token, and responses
//! echo it. Pairing by token (rather than by event name alone) is what
//! keeps concurrent moves of two different items from resolving each
//! other's replies.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use uuid::Uuid;

use boardflow_domain::{GroupId, GroupKind, ItemId, SortKey};

/// Token pairing an outbound request with its eventual response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CorrelationId(Uuid);

impl CorrelationId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveItemRequest {
    pub correlation_id: CorrelationId,
    pub project_id: Uuid,
    pub item_id: ItemId,
    pub from_group_id: GroupId,
    pub to_group_id: GroupId,
    pub to_index: usize,
    pub grouping_mode: GroupKind,
    pub team_id: Uuid,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReorderGroupsRequest {
    pub correlation_id: CorrelationId,
    pub project_id: Uuid,
    pub ordered_group_ids: Vec<GroupId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GateRequest {
    pub correlation_id: CorrelationId,
    pub item_id: ItemId,
    pub destination_group_id: GroupId,
}

/// Messages the engine sends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    MoveItem(MoveItemRequest),
    ReorderGroups(ReorderGroupsRequest),
    CheckDependencyGate(GateRequest),
    /// Fire-and-forget: ask the server to recompute a parent's
    /// progress rollup after a committed move.
    RecomputeProgress { item_id: ItemId },
}

impl ClientMessage {
    /// The token a response must echo; `None` for notifications.
    pub fn correlation_id(&self) -> Option<CorrelationId> {
        match self {
            ClientMessage::MoveItem(req) => Some(req.correlation_id),
            ClientMessage::ReorderGroups(req) => Some(req.correlation_id),
            ClientMessage::CheckDependencyGate(req) => Some(req.correlation_id),
            ClientMessage::RecomputeProgress { .. } => None,
        }
    }
}

/// The server's canonical answer to a move: the accepted order of the
/// destination group and authoritative sort keys for every item it
/// rekeyed. Local keys are always overwritten from this on commit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveItemResponse {
    pub correlation_id: CorrelationId,
    pub accepted_order: Vec<ItemId>,
    pub canonical_sort_keys: HashMap<ItemId, SortKey>,
}

/// Messages the server sends back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    MoveItemAck(MoveItemResponse),
    ReorderGroupsAck {
        correlation_id: CorrelationId,
        accepted: bool,
    },
    GateAck {
        correlation_id: CorrelationId,
        accepted: bool,
        /// Names of unresolved blocking dependencies when rejected.
        #[serde(default)]
        blocking: Vec<String>,
    },
}

impl ServerMessage {
    pub fn correlation_id(&self) -> CorrelationId {
        match self {
            ServerMessage::MoveItemAck(resp) => resp.correlation_id,
            ServerMessage::ReorderGroupsAck { correlation_id, .. } => *correlation_id,
            ServerMessage::GateAck { correlation_id, .. } => *correlation_id,
        }
    }
}
