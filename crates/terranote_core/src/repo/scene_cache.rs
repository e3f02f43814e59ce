//! Bounded cache from scene key to materialized comment lists.
//!
//! # Responsibility
//! - Serve repeated reads of one scene's comments without re-materializing.
//! - Keep memory bounded by evicting the oldest-inserted entry.
//!
//! # Invariants
//! - Eviction follows insertion order (FIFO), not access recency.
//! - Any document write clears the whole cache, never a single entry. This
//!   is a documented simplicity trade-off: writing scene A also drops the
//!   cached read of scene B.

use crate::repo::comment_store::CommentRecord;
use std::collections::{HashMap, VecDeque};

pub(crate) struct SceneCache {
    capacity: usize,
    order: VecDeque<String>,
    entries: HashMap<String, Vec<CommentRecord>>,
}

impl SceneCache {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            order: VecDeque::new(),
            entries: HashMap::new(),
        }
    }

    pub(crate) fn get(&self, scene_key: &str) -> Option<&Vec<CommentRecord>> {
        self.entries.get(scene_key)
    }

    pub(crate) fn insert(&mut self, scene_key: String, records: Vec<CommentRecord>) {
        if self.entries.contains_key(&scene_key) {
            self.entries.insert(scene_key, records);
            return;
        }
        if self.order.len() == self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.entries.remove(&oldest);
            }
        }
        self.order.push_back(scene_key.clone());
        self.entries.insert(scene_key, records);
    }

    pub(crate) fn clear(&mut self) {
        self.order.clear();
        self.entries.clear();
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}
