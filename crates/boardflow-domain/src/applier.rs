use std::collections::HashSet;
use std::time::{Duration, Instant};

use crate::{board::Board, group::GroupId, item::ItemId};

/// One requested optimistic move, as produced from a resolved drop
/// target. `to_parent` is the parent of the row the item lands next
/// to, carried so subtask drops reparent correctly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveSpec {
    pub item_id: ItemId,
    pub to_group_id: GroupId,
    pub to_index: usize,
    pub to_parent: Option<ItemId>,
}

/// Result of one optimistic application.
#[derive(Debug, Clone, PartialEq)]
pub enum Applied {
    /// The board changed; here is the new projection.
    Changed(Board),
    /// The move matches the item's current position; nothing to do.
    Unchanged,
    /// A different move for the same item landed within the same
    /// animation frame; dropped to prevent thrash at group boundaries.
    Throttled,
}

/// Applies optimistic moves against a board projection.
///
/// Applications are idempotent and rate-limited to one per item per
/// animation frame. This throttle is local churn control and is
/// independent of the outbound network debounce.
#[derive(Debug)]
pub struct OptimisticApplier {
    frame_interval: Duration,
    last_applied: Option<(MoveSpec, Instant)>,
    dirty_parents: HashSet<ItemId>,
}

impl OptimisticApplier {
    pub fn new(frame_interval: Duration) -> Self {
        Self {
            frame_interval,
            last_applied: None,
            dirty_parents: HashSet::new(),
        }
    }

    pub fn apply(&mut self, board: &Board, spec: MoveSpec, now: Instant) -> Applied {
        let item = board.item(spec.item_id);
        let from_group_id = item.group_id;
        let current_index = board
            .group(from_group_id)
            .position_of(spec.item_id)
            .unwrap_or_else(|| panic!("item {} missing from its group order", spec.item_id));

        // no-op detection: already exactly there
        if spec.to_group_id == from_group_id
            && spec.to_index == current_index
            && spec.to_parent == item.parent_item_id
        {
            return Applied::Unchanged;
        }
        if let Some((last_spec, applied_at)) = self.last_applied {
            if last_spec == spec {
                return Applied::Unchanged;
            }
            if last_spec.item_id == spec.item_id
                && now.duration_since(applied_at) < self.frame_interval
            {
                return Applied::Throttled;
            }
        }

        let old_parent = item.parent_item_id;
        let next = board.move_item(
            spec.item_id,
            from_group_id,
            spec.to_group_id,
            spec.to_index,
            spec.to_parent,
        );
        // every parent touched on either end has a rollup to refresh,
        // including an unchanged parent whose subtask changed group
        self.dirty_parents.extend(old_parent);
        self.dirty_parents.extend(spec.to_parent);
        self.last_applied = Some((spec, now));
        Applied::Changed(next)
    }

    /// Parents whose progress rollups must be recomputed once the
    /// session commits. Draining is deferred to commit time.
    pub fn take_dirty_parents(&mut self) -> Vec<ItemId> {
        let mut parents: Vec<ItemId> = self.dirty_parents.drain().collect();
        parents.sort();
        parents
    }

    /// Discard per-session state. Called on session end and rollback.
    pub fn reset(&mut self) {
        self.last_applied = None;
        self.dirty_parents.clear();
    }
}
