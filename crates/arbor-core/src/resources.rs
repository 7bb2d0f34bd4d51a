//! # Resource Store
//!
//! In-memory resources attached to topics, with their own tombstones.
//!
//! The tree reconstructor only needs one read from this module, "active
//! resources of topic X", expressed as the [`ResourceSource`] trait so any
//! other backing store can stand in.

use crate::{ArborError, Resource, ResourceId, ResourcePatch, Timestamp, TopicId};
use std::collections::BTreeMap;

// =============================================================================
// RESOURCESOURCE TRAIT
// =============================================================================

/// Read contract consumed by the tree reconstructor.
pub trait ResourceSource {
    /// Non-deleted resources of `topic`, in a stable order. Does not check
    /// whether the topic itself is active.
    fn active_resources(&self, topic: TopicId) -> Vec<Resource>;
}

// =============================================================================
// IN-MEMORY IMPLEMENTATION
// =============================================================================

/// Fields for a new resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewResource {
    pub topic_id: TopicId,
    pub url: String,
    pub description: Option<String>,
    pub kind: String,
}

#[derive(Debug, Clone, Default)]
pub struct ResourceStore {
    resources: BTreeMap<ResourceId, Resource>,
    /// topic -> resources in insertion order
    by_topic: BTreeMap<TopicId, Vec<ResourceId>>,
}

impl ResourceStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a new resource. Topic existence is the caller's concern.
    pub fn create(&mut self, id: ResourceId, new: NewResource, now: Timestamp) -> Resource {
        let resource = Resource {
            id,
            topic_id: new.topic_id,
            url: new.url,
            description: new.description,
            kind: new.kind,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        self.by_topic.entry(resource.topic_id).or_default().push(id);
        self.resources.insert(id, resource.clone());
        resource
    }

    /// Active resource by id.
    pub fn get(&self, id: ResourceId) -> Result<&Resource, ArborError> {
        self.resources
            .get(&id)
            .filter(|r| r.is_active())
            .ok_or(ArborError::ResourceNotFound(id))
    }

    /// Apply a non-empty patch to an active resource.
    pub fn update(
        &mut self,
        id: ResourceId,
        patch: ResourcePatch,
        now: Timestamp,
    ) -> Result<Resource, ArborError> {
        if patch.is_empty() {
            return Err(ArborError::Validation("at least one field must be provided".to_string()));
        }
        let resource = self
            .resources
            .get_mut(&id)
            .filter(|r| r.is_active())
            .ok_or(ArborError::ResourceNotFound(id))?;

        if let Some(url) = patch.url {
            resource.url = url;
        }
        if let Some(description) = patch.description {
            resource.description = Some(description);
        }
        if let Some(kind) = patch.kind {
            resource.kind = kind;
        }
        resource.updated_at = now;
        Ok(resource.clone())
    }

    /// Tombstone a resource. `false` if missing or already deleted.
    pub fn soft_delete(&mut self, id: ResourceId, now: Timestamp) -> bool {
        match self.resources.get_mut(&id) {
            Some(r) if r.is_active() => {
                r.deleted_at = Some(now);
                r.updated_at = now;
                true
            }
            _ => false,
        }
    }

    /// Number of active resources.
    #[must_use]
    pub fn active_len(&self) -> usize {
        self.resources.values().filter(|r| r.is_active()).count()
    }
}

impl ResourceSource for ResourceStore {
    fn active_resources(&self, topic: TopicId) -> Vec<Resource> {
        self.by_topic
            .get(&topic)
            .into_iter()
            .flatten()
            .filter_map(|id| self.resources.get(id))
            .filter(|r| r.is_active())
            .cloned()
            .collect()
    }
}

// =============================================================================
// TESTS
// =============================================================================
