use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::item::ItemId;

pub type GroupId = Uuid;

/// What a group's buckets denote. Phase order comes from the project
/// timeline and cannot be reordered by hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GroupKind {
    Status,
    Priority,
    Phase,
}

/// An ordered container of items: one column on the board, or one
/// section of the grouped task list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    pub kind: GroupKind,
    pub name: String,
    pub ordered_item_ids: Vec<ItemId>,
    pub category_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Group {
    pub fn new(kind: GroupKind, name: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            kind,
            name,
            ordered_item_ids: Vec::new(),
            category_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn len(&self) -> usize {
        self.ordered_item_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordered_item_ids.is_empty()
    }

    pub fn position_of(&self, item_id: ItemId) -> Option<usize> {
        self.ordered_item_ids.iter().position(|id| *id == item_id)
    }

    pub fn contains(&self, item_id: ItemId) -> bool {
        self.position_of(item_id).is_some()
    }

    /// Insert at `index`, clamped to the end of the list.
    pub fn insert_at(&mut self, index: usize, item_id: ItemId) {
        let index = index.min(self.ordered_item_ids.len());
        self.ordered_item_ids.insert(index, item_id);
        self.updated_at = Utc::now();
    }

    pub fn remove(&mut self, item_id: ItemId) -> Option<usize> {
        let index = self.position_of(item_id)?;
        self.ordered_item_ids.remove(index);
        self.updated_at = Utc::now();
        Some(index)
    }
}
