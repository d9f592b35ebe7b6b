use std::collections::HashMap;

use crate::{
    board::Board,
    group::GroupId,
    item::ItemId,
};

/// O(1) item-to-group lookup.
///
/// Rebuilt on every *committed* mutation (commit or rollback), never on
/// pointer moves: during a drag the optimistic projection is consulted
/// directly and the index keeps answering from last-known-good state.
#[derive(Debug, Clone, Default)]
pub struct MembershipIndex {
    map: HashMap<ItemId, GroupId>,
}

impl MembershipIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_board(board: &Board) -> Self {
        let mut index = Self::new();
        index.rebuild(board);
        index
    }

    pub fn rebuild(&mut self, board: &Board) {
        self.map.clear();
        for group in &board.groups {
            for item_id in &group.ordered_item_ids {
                self.map.insert(*item_id, group.id);
            }
        }
    }

    /// Panics on an unknown id; ids must come from the indexed board.
    pub fn find_group(&self, item_id: ItemId) -> GroupId {
        *self
            .map
            .get(&item_id)
            .unwrap_or_else(|| panic!("unknown item id {item_id}: ids must come from this board"))
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}
