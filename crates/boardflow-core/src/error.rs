use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum BoardflowError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Timed out waiting for a response")]
    Timeout,

    #[error("Move rejected by server: {reason}")]
    Rejected { reason: String },

    #[error("Task {item_id} has unresolved blocking dependencies: {}", blocking.join(", "))]
    DependencyBlocked { item_id: Uuid, blocking: Vec<String> },

    #[error("A drag session is already active")]
    SessionActive,

    #[error("No drag session is active")]
    SessionInactive,

    #[error("Group order is derived externally and cannot be reordered")]
    GroupingLocked,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}
