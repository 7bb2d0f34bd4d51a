//! # Topic Registry
//!
//! Current-state [`Topic`] records plus a children index keyed by parent
//! reference (`None` is the root level). Children are kept in insertion
//! order, which is the order every listing, snapshot and BFS uses.
//!
//! The registry never removes a record. Deletion is a tombstone, and every
//! "active" query path checks it.

use crate::{Timestamp, Topic, TopicId};
use std::collections::BTreeMap;

/// Topic records and the parent -> children index.
#[derive(Debug, Clone, Default)]
pub struct TopicRegistry {
    topics: BTreeMap<TopicId, Topic>,
    /// parent -> children in insertion order. Deleted children stay listed
    /// here; readers filter on the tombstone.
    children: BTreeMap<Option<TopicId>, Vec<TopicId>>,
}

impl TopicRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a freshly created topic. Caller guarantees the id is new and
    /// the first version has been written in the same critical section.
    pub(crate) fn insert(&mut self, topic: Topic) {
        self.children
            .entry(topic.parent_id)
            .or_default()
            .push(topic.id);
        self.topics.insert(topic.id, topic);
    }

    /// Any record, deleted or not.
    #[must_use]
    pub fn get(&self, id: TopicId) -> Option<&Topic> {
        self.topics.get(&id)
    }

    /// The record if it exists and is not soft-deleted.
    #[must_use]
    pub fn get_active(&self, id: TopicId) -> Option<&Topic> {
        self.topics.get(&id).filter(|t| t.is_active())
    }

    /// Direct, non-deleted children of `parent`, in insertion order.
    ///
    /// Does not check whether `parent` itself is still active: a deleted
    /// topic's children remain listable.
    pub fn active_children(&self, parent: Option<TopicId>) -> impl Iterator<Item = &Topic> + '_ {
        self.children
            .get(&parent)
            .into_iter()
            .flatten()
            .filter_map(|id| self.get_active(*id))
    }

    /// Move the current-version pointer and `updated_at` together.
    pub(crate) fn advance(&mut self, id: TopicId, version: u32, now: Timestamp) -> bool {
        match self.topics.get_mut(&id) {
            Some(topic) => {
                topic.current_version = version;
                topic.updated_at = now;
                true
            }
            None => false,
        }
    }

    /// Set the tombstone. `false` if missing or already deleted.
    pub(crate) fn tombstone(&mut self, id: TopicId, now: Timestamp) -> bool {
        match self.topics.get_mut(&id) {
            Some(topic) if topic.is_active() => {
                topic.deleted_at = Some(now);
                true
            }
            _ => false,
        }
    }

    /// All records, deleted included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.topics.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }

    #[must_use]
    pub fn active_len(&self) -> usize {
        self.topics.values().filter(|t| t.is_active()).count()
    }
}

// =============================================================================
// TESTS
// =============================================================================
