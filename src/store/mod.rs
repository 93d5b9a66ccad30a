use chrono::Utc;
use indexmap::IndexMap;

use crate::models::{CreateItem, Item};

/// In-memory item collection, the only store this service has; contents live
/// and die with the process.
///
/// Backed by an `IndexMap` keyed by id: iteration follows insertion order and
/// id lookup stays O(1). Shared across handlers as `Arc<RwLock<ItemStore>>`,
/// so every mutation runs under the write guard.
#[derive(Debug, Default)]
pub struct ItemStore {
    items: IndexMap<i64, Item>,
    last_id: i64,
}

impl ItemStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current time in milliseconds, bumped past the previous id so two
    /// creates landing in the same millisecond still get distinct,
    /// strictly increasing ids.
    fn next_id(&mut self) -> i64 {
        let id = Utc::now().timestamp_millis().max(self.last_id + 1);
        self.last_id = id;
        id
    }

    /// Builds an item from the validated payload, appends it, and returns the
    /// stored copy.
    pub fn create(&mut self, payload: CreateItem, image_url: String) -> Item {
        let item = Item {
            id: self.next_id(),
            name: payload.name,
            category: payload.category,
            quantity: payload.quantity,
            price: payload.price,
            image_url,
        };
        self.items.insert(item.id, item.clone());
        item
    }

    pub fn get(&self, id: i64) -> Option<&Item> {
        self.items.get(&id)
    }

    /// Snapshot of the collection in insertion order.
    pub fn list(&self) -> Vec<Item> {
        self.items.values().cloned().collect()
    }

    /// Removes and returns the item, keeping the remaining items in their
    /// original insertion order. `None` when the id is unknown.
    pub fn remove(&mut self, id: i64) -> Option<Item> {
        self.items.shift_remove(&id)
    }

    pub fn count(&self) -> usize {
        self.items.len()
    }
}
