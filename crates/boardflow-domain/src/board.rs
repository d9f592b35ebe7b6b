use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::{
    group::{Group, GroupId},
    item::{Item, ItemId},
    sort_key::SortKey,
};

/// The board: an ordered list of groups plus the items they contain.
///
/// Every item id appears in exactly one group's `ordered_item_ids`.
/// Mutation goes through pure functions (`move_item`, `reorder_groups`)
/// that return a new projection, so a snapshot for rollback is just a
/// clone taken before the first optimistic application.
///
/// Unknown item or group ids are a programming error: callers must only
/// pass ids obtained from this board, and lookups panic rather than
/// surface a recoverable error.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Board {
    pub groups: Vec<Group>,
    pub items: HashMap<ItemId, Item>,
}

impl Board {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_group(&mut self, group: Group) {
        self.groups.push(group);
    }

    /// Append an item to the tail of its group.
    pub fn add_item(&mut self, item: Item) {
        let group = self.group_mut(item.group_id);
        let index = group.len();
        group.insert_at(index, item.id);
        self.items.insert(item.id, item);
    }

    pub fn group(&self, id: GroupId) -> &Group {
        self.groups
            .iter()
            .find(|g| g.id == id)
            .unwrap_or_else(|| panic!("unknown group id {id}: ids must come from this board"))
    }

    pub fn group_mut(&mut self, id: GroupId) -> &mut Group {
        self.groups
            .iter_mut()
            .find(|g| g.id == id)
            .unwrap_or_else(|| panic!("unknown group id {id}: ids must come from this board"))
    }

    pub fn item(&self, id: ItemId) -> &Item {
        self.items
            .get(&id)
            .unwrap_or_else(|| panic!("unknown item id {id}: ids must come from this board"))
    }

    pub fn group_order(&self) -> Vec<GroupId> {
        self.groups.iter().map(|g| g.id).collect()
    }

    pub fn group_position(&self, id: GroupId) -> usize {
        self.groups
            .iter()
            .position(|g| g.id == id)
            .unwrap_or_else(|| panic!("unknown group id {id}: ids must come from this board"))
    }

    pub fn total_items(&self) -> usize {
        self.groups.iter().map(Group::len).sum()
    }

    /// Splice `item_id` out of `from_group_id` and into `to_group_id`
    /// at `to_index` (clamped), returning a new projection.
    ///
    /// The moved item receives a fresh sort key at the midpoint of its
    /// new neighbors; no other item's key changes. `to_parent` becomes
    /// the item's parent in the new position (subtask drops carry the
    /// parent of the row they land next to).
    pub fn move_item(
        &self,
        item_id: ItemId,
        from_group_id: GroupId,
        to_group_id: GroupId,
        to_index: usize,
        to_parent: Option<ItemId>,
    ) -> Board {
        assert_eq!(
            self.item(item_id).group_id,
            from_group_id,
            "item {item_id} is not in group {from_group_id}"
        );

        let mut next = self.clone();
        next.group_mut(from_group_id)
            .remove(item_id)
            .unwrap_or_else(|| panic!("item {item_id} missing from group {from_group_id} order"));
        next.group_mut(to_group_id).insert_at(to_index, item_id);

        let position = next
            .group(to_group_id)
            .position_of(item_id)
            .expect("just inserted");
        let sort_key = next.key_for_position(to_group_id, position, item_id);
        next.items
            .get_mut(&item_id)
            .expect("item exists")
            .relocate(to_group_id, sort_key, to_parent);
        next
    }

    /// Reorder the groups themselves, returning a new projection.
    /// `new_order` must be a permutation of the current group ids.
    pub fn reorder_groups(&self, new_order: &[GroupId]) -> Board {
        assert_eq!(
            new_order.len(),
            self.groups.len(),
            "group order must be a permutation of the current groups"
        );
        let mut next = self.clone();
        next.groups = new_order
            .iter()
            .map(|id| self.group(*id).clone())
            .collect();
        next
    }

    /// Midpoint key for the item sitting at `position` in `group_id`,
    /// derived from the neighbors around it.
    fn key_for_position(&self, group_id: GroupId, position: usize, item_id: ItemId) -> SortKey {
        let ids = &self.group(group_id).ordered_item_ids;
        let prev = position
            .checked_sub(1)
            .map(|i| self.item(ids[i]).sort_key);
        let next = ids.get(position + 1).map(|id| self.item(*id).sort_key);
        match (prev, next) {
            (Some(p), Some(n)) => SortKey::between(p, n),
            (Some(p), None) => SortKey::after(p),
            (None, Some(n)) => SortKey::before(n),
            (None, None) => self.item(item_id).sort_key,
        }
    }

    /// Check the membership invariants. Used by tests and debug
    /// assertions; a committed board must always pass.
    pub fn is_consistent(&self) -> bool {
        let mut seen = std::collections::HashSet::new();
        for group in &self.groups {
            for id in &group.ordered_item_ids {
                if !seen.insert(*id) {
                    return false;
                }
                match self.items.get(id) {
                    Some(item) if item.group_id == group.id => {}
                    _ => return false,
                }
            }
        }
        seen.len() == self.items.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::group::GroupKind;

    fn board_with(groups: &[(&str, usize)]) -> Board {
        let mut board = Board::new();
        for (name, count) in groups {
            let group = Group::new(GroupKind::Status, name.to_string());
            let group_id = group.id;
            board.add_group(group);
            for (i, key) in SortKey::sequence(*count).into_iter().enumerate() {
                board.add_item(Item::new(group_id, format!("{name}-{i}"), key));
            }
        }
        board
    }

    #[test]
    fn test_move_item_across_groups() {
        let board = board_with(&[("Todo", 2), ("Doing", 0)]);
        let todo = board.groups[0].id;
        let doing = board.groups[1].id;
        let a = board.groups[0].ordered_item_ids[0];

        let moved = board.move_item(a, todo, doing, 0, None);

        assert_eq!(moved.group(todo).len(), 1);
        assert_eq!(moved.group(doing).ordered_item_ids, vec![a]);
        assert_eq!(moved.item(a).group_id, doing);
        assert!(moved.is_consistent());
        // source projection untouched
        assert_eq!(board.group(todo).len(), 2);
    }

    #[test]
    fn test_move_item_within_group_gets_midpoint_key() {
        let board = board_with(&[("Todo", 3)]);
        let todo = board.groups[0].id;
        let ids = board.group(todo).ordered_item_ids.clone();

        // move the last item between the first two
        let moved = board.move_item(ids[2], todo, todo, 1, None);

        assert_eq!(
            moved.group(todo).ordered_item_ids,
            vec![ids[0], ids[2], ids[1]]
        );
        let key = moved.item(ids[2]).sort_key;
        assert!(moved.item(ids[0]).sort_key < key);
        assert!(key < moved.item(ids[1]).sort_key);
    }

    #[test]
    fn test_move_item_clamps_index_to_tail() {
        let board = board_with(&[("Todo", 1), ("Doing", 1)]);
        let todo = board.groups[0].id;
        let doing = board.groups[1].id;
        let a = board.groups[0].ordered_item_ids[0];

        let moved = board.move_item(a, todo, doing, 99, None);

        assert_eq!(moved.group(doing).len(), 2);
        assert_eq!(moved.group(doing).position_of(a), Some(1));
        assert!(moved.item(moved.group(doing).ordered_item_ids[0]).sort_key < moved.item(a).sort_key);
    }

    #[test]
    fn test_conservation_under_moves() {
        let board = board_with(&[("Todo", 3), ("Doing", 2), ("Done", 1)]);
        let todo = board.groups[0].id;
        let doing = board.groups[1].id;
        let done = board.groups[2].id;
        let a = board.group(todo).ordered_item_ids[0];
        let b = board.group(doing).ordered_item_ids[1];

        let step1 = board.move_item(a, todo, done, 0, None);
        let step2 = step1.move_item(b, doing, todo, 2, None);
        let step3 = step2.reorder_groups(&[done, doing, todo]);

        for projection in [&step1, &step2, &step3] {
            assert_eq!(projection.total_items(), 6);
            assert!(projection.is_consistent());
        }
    }

    #[test]
    fn test_untouched_group_order_is_stable() {
        let board = board_with(&[("Todo", 2), ("Doing", 3), ("Done", 0)]);
        let todo = board.groups[0].id;
        let doing = board.groups[1].id;
        let done = board.groups[2].id;
        let a = board.group(todo).ordered_item_ids[0];
        let doing_before = board.group(doing).ordered_item_ids.clone();

        let moved = board.move_item(a, todo, done, 0, None);

        assert_eq!(moved.group(doing).ordered_item_ids, doing_before);
    }

    #[test]
    fn test_reorder_groups_keeps_contents() {
        let board = board_with(&[("Todo", 1), ("Doing", 2)]);
        let todo = board.groups[0].id;
        let doing = board.groups[1].id;

        let reordered = board.reorder_groups(&[doing, todo]);

        assert_eq!(reordered.group_order(), vec![doing, todo]);
        assert_eq!(reordered.group(doing).len(), 2);
        assert!(reordered.is_consistent());
    }

    #[test]
    fn test_move_item_reparents() {
        let mut board = board_with(&[("Todo", 1), ("Doing", 0)]);
        let todo = board.groups[0].id;
        let doing = board.groups[1].id;
        let parent = board.group(todo).ordered_item_ids[0];
        let sub = Item::subtask_of(todo, "sub".to_string(), SortKey::new(9.0), parent);
        let sub_id = sub.id;
        board.add_item(sub);
        let new_parent = Item::new(doing, "other parent".to_string(), SortKey::new(0.0));
        let new_parent_id = new_parent.id;
        board.add_item(new_parent);

        let moved = board.move_item(sub_id, todo, doing, 1, Some(new_parent_id));

        assert_eq!(moved.item(sub_id).parent_item_id, Some(new_parent_id));
    }

    #[test]
    #[should_panic(expected = "unknown item id")]
    fn test_unknown_item_is_fatal() {
        let board = board_with(&[("Todo", 1)]);
        board.item(uuid::Uuid::new_v4());
    }

    #[test]
    #[should_panic(expected = "unknown group id")]
    fn test_unknown_group_is_fatal() {
        let board = board_with(&[("Todo", 1)]);
        board.group(uuid::Uuid::new_v4());
    }
}
