use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{group::GroupId, sort_key::SortKey};

pub type ItemId = Uuid;

/// A task or subtask; a movable element belonging to exactly one group
/// at any committed instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub group_id: GroupId,
    pub name: String,
    pub sort_key: SortKey,
    /// Parent task for progress rollups, if this item is a subtask.
    pub parent_item_id: Option<ItemId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Item {
    pub fn new(group_id: GroupId, name: String, sort_key: SortKey) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            group_id,
            name,
            sort_key,
            parent_item_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn subtask_of(group_id: GroupId, name: String, sort_key: SortKey, parent: ItemId) -> Self {
        let mut item = Self::new(group_id, name, sort_key);
        item.parent_item_id = Some(parent);
        item
    }

    pub fn relocate(&mut self, group_id: GroupId, sort_key: SortKey, parent: Option<ItemId>) {
        self.group_id = group_id;
        self.sort_key = sort_key;
        self.parent_item_id = parent;
        self.updated_at = Utc::now();
    }

    pub fn adopt_sort_key(&mut self, sort_key: SortKey) {
        self.sort_key = sort_key;
        self.updated_at = Utc::now();
    }
}
