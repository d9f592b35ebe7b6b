pub mod channel;
pub mod dispatcher;
pub mod engine;
pub mod gate;
pub mod matcher;
pub mod protocol;
pub mod rollback;

pub use channel::{Channel, InMemoryChannel};
pub use dispatcher::{MoveDebouncer, PendingMove};
pub use engine::{BoardEngine, EngineEvent, MoveOutcome};
pub use gate::{DependencyGate, GateDecision};
pub use matcher::ResponseMatcher;
pub use protocol::{
    ClientMessage, CorrelationId, GateRequest, MoveItemRequest, MoveItemResponse,
    ReorderGroupsRequest, ServerMessage,
};
pub use rollback::RollbackManager;
