pub mod applier;
pub mod board;
pub mod geometry;
pub mod group;
pub mod index;
pub mod item;
pub mod resolver;
pub mod session;
pub mod sort_key;

pub use applier::{Applied, MoveSpec, OptimisticApplier};
pub use board::Board;
pub use geometry::{ActivationThreshold, Point, Rect};
pub use group::{Group, GroupId, GroupKind};
pub use index::MembershipIndex;
pub use item::{Item, ItemId};
pub use resolver::{DropResolver, DropTarget, DroppableRegion, ResolvedTarget};
pub use session::{DragSession, SessionGuard, SessionKind, SessionPhase};
pub use sort_key::SortKey;
