//! # Store
//!
//! The single owner of all topic state: registry, version arena and
//! resources, plus the injected clock and id allocator.
//!
//! Every mutation validates first and writes last. A failed call leaves
//! the store exactly as it was, and no id is drawn from the allocator
//! before all checks pass.

use crate::clock::{Clock, SystemClock};
use crate::ids::{IdAllocator, RandomIds};
use crate::path::PathFinder;
use crate::registry::TopicRegistry;
use crate::resources::{NewResource, ResourceSource, ResourceStore};
use crate::seed::{self, SeedTopic};
use crate::tree::TreeReconstructor;
use crate::validator::ensure_unique_sibling_name;
use crate::versions::VersionStore;
use crate::{
    ArborError, PathNode, Resource, ResourceId, ResourcePatch, StoreStats, Topic, TopicId,
    TopicPatch, TopicVersion, TopicView, TreeNode, VersionId, VersionSelector,
};

/// In-memory versioned topic forest.
#[derive(Debug)]
pub struct Store {
    registry: TopicRegistry,
    versions: VersionStore,
    resources: ResourceStore,
    clock: Box<dyn Clock>,
    ids: Box<dyn IdAllocator>,
}

impl Default for Store {
    fn default() -> Self {
        Self::with_collaborators(Box::new(SystemClock), Box::new(RandomIds))
    }
}

impl Store {
    /// Empty store on wall-clock time and random v4 ids.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty store with explicit collaborators (deterministic tests).
    #[must_use]
    pub fn with_collaborators(clock: Box<dyn Clock>, ids: Box<dyn IdAllocator>) -> Self {
        Self {
            registry: TopicRegistry::new(),
            versions: VersionStore::new(),
            resources: ResourceStore::new(),
            clock,
            ids,
        }
    }

    #[must_use]
    pub fn registry(&self) -> &TopicRegistry {
        &self.registry
    }

    #[must_use]
    pub fn versions(&self) -> &VersionStore {
        &self.versions
    }

    // =========================================================================
    // TOPIC MUTATIONS
    // =========================================================================

    /// Create a topic at root level.
    pub fn create_root(
        &mut self,
        name: impl Into<String>,
        content: impl Into<String>,
    ) -> Result<TopicView, ArborError> {
        self.create(None, name.into(), content.into())
    }

    /// Create a topic under an active parent.
    pub fn create_child(
        &mut self,
        parent: TopicId,
        name: impl Into<String>,
        content: impl Into<String>,
    ) -> Result<TopicView, ArborError> {
        self.create(Some(parent), name.into(), content.into())
    }

    fn create(
        &mut self,
        parent: Option<TopicId>,
        name: String,
        content: String,
    ) -> Result<TopicView, ArborError> {
        if let Some(missing) = parent.filter(|p| self.registry.get_active(*p).is_none()) {
            return Err(ArborError::ParentNotFound(missing));
        }
        ensure_unique_sibling_name(&self.registry, &self.versions, parent, &name, None)?;

        let now = self.clock.now();
        let id = TopicId(self.ids.allocate());
        let version_id = VersionId(self.ids.allocate());
        let version = VersionStore::create_initial(version_id, id, name, content, now);
        let topic = Topic {
            id,
            parent_id: parent,
            current_version: 1,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };

        self.versions.insert(version.clone())?;
        self.registry.insert(topic.clone());

        tracing::debug!(topic = %id, parent = ?parent, name = %version.name, "topic created");
        Ok(TopicView::new(&topic, &version))
    }

    /// Append a new version built from `patch` and make it current.
    pub fn append_version(
        &mut self,
        id: TopicId,
        patch: TopicPatch,
    ) -> Result<TopicView, ArborError> {
        if patch.is_empty() {
            return Err(ArborError::Validation(
                "at least one of name or content must be provided".to_string(),
            ));
        }
        let (parent, current) = self
            .registry
            .get_active(id)
            .map(|t| (t.parent_id, t.current_version))
            .ok_or(ArborError::TopicNotFound(id))?;

        if let Some(name) = patch.name.as_deref() {
            ensure_unique_sibling_name(&self.registry, &self.versions, parent, name, Some(id))?;
        }

        let previous = self
            .versions
            .get(id, current)
            .ok_or(ArborError::VersionNotFound {
                topic: id,
                version: u64::from(current),
            })?;
        let now = self.clock.now();
        let next = VersionStore::create_next(VersionId(self.ids.allocate()), previous, &patch, now);

        self.versions.insert(next.clone())?;
        self.registry.advance(id, next.version, now);

        tracing::debug!(topic = %id, version = next.version, "version appended");
        let topic = self.registry.get(id).ok_or(ArborError::TopicNotFound(id))?;
        Ok(TopicView::new(topic, &next))
    }

    /// Tombstone a topic. Children are left untouched.
    ///
    /// Returns `false` if the topic is missing or already deleted.
    pub fn soft_delete(&mut self, id: TopicId) -> bool {
        let now = self.clock.now();
        let deleted = self.registry.tombstone(id, now);
        if deleted {
            tracing::debug!(topic = %id, "topic soft-deleted");
        }
        deleted
    }

    // =========================================================================
    // TOPIC READS
    // =========================================================================

    /// The topic joined with its current version.
    pub fn get_active(&self, id: TopicId) -> Result<TopicView, ArborError> {
        let topic = self
            .registry
            .get_active(id)
            .ok_or(ArborError::TopicNotFound(id))?;
        let version = self.current_version(topic)?;
        Ok(TopicView::new(topic, version))
    }

    /// Active children of `parent` (root level for `None`), in insertion
    /// order. The parent itself may be deleted.
    pub fn list_active_children(&self, parent: Option<TopicId>) -> Vec<TopicView> {
        self.registry
            .active_children(parent)
            .filter_map(|topic| {
                self.current_version(topic)
                    .ok()
                    .map(|v| TopicView::new(topic, v))
            })
            .collect()
    }

    /// Full history, ascending. Available for deleted topics too.
    pub fn list_versions(&self, id: TopicId) -> Result<Vec<TopicVersion>, ArborError> {
        if self.registry.get(id).is_none() {
            return Err(ArborError::TopicNotFound(id));
        }
        Ok(self.versions.list(id).into_iter().cloned().collect())
    }

    /// One exact version. Available for deleted topics too.
    pub fn get_version(&self, id: TopicId, version: u64) -> Result<TopicVersion, ArborError> {
        if version == 0 {
            return Err(ArborError::InvalidVersionSelector(version.to_string()));
        }
        if self.registry.get(id).is_none() {
            return Err(ArborError::TopicNotFound(id));
        }
        self.versions
            .find(id, version)
            .cloned()
            .ok_or(ArborError::VersionNotFound { topic: id, version })
    }

    /// Point-in-time tree rooted at `root`.
    pub fn build_tree(
        &self,
        root: TopicId,
        selector: VersionSelector,
        include_resources: bool,
    ) -> Result<TreeNode, ArborError> {
        let snapshot = TreeReconstructor::new(&self.registry, &self.versions, &self.resources);
        snapshot.build(root, selector, include_resources)
    }

    /// Shortest undirected path between two active topics.
    pub fn shortest_path(&self, from: TopicId, to: TopicId) -> Result<Vec<PathNode>, ArborError> {
        PathFinder::new(&self.registry, &self.versions).shortest_path(from, to)
    }

    fn current_version(&self, topic: &Topic) -> Result<&TopicVersion, ArborError> {
        self.versions
            .get(topic.id, topic.current_version)
            .ok_or(ArborError::VersionNotFound {
                topic: topic.id,
                version: u64::from(topic.current_version),
            })
    }

    // =========================================================================
    // RESOURCES
    // =========================================================================

    /// Attach a resource to an active topic.
    pub fn create_resource(&mut self, new: NewResource) -> Result<Resource, ArborError> {
        if self.registry.get_active(new.topic_id).is_none() {
            return Err(ArborError::TopicNotFound(new.topic_id));
        }
        let id = ResourceId(self.ids.allocate());
        let now = self.clock.now();
        let resource = self.resources.create(id, new, now);
        tracing::debug!(resource = %id, topic = %resource.topic_id, "resource created");
        Ok(resource)
    }

    pub fn get_resource(&self, id: ResourceId) -> Result<Resource, ArborError> {
        self.resources.get(id).cloned()
    }

    /// Active resources of an active topic.
    pub fn list_resources(&self, topic: TopicId) -> Result<Vec<Resource>, ArborError> {
        if self.registry.get_active(topic).is_none() {
            return Err(ArborError::TopicNotFound(topic));
        }
        Ok(self.resources.active_resources(topic))
    }

    pub fn update_resource(
        &mut self,
        id: ResourceId,
        patch: ResourcePatch,
    ) -> Result<Resource, ArborError> {
        let now = self.clock.now();
        let resource = self.resources.update(id, patch, now)?;
        tracing::debug!(resource = %id, "resource updated");
        Ok(resource)
    }

    /// Tombstone a resource. `false` if missing or already deleted.
    pub fn delete_resource(&mut self, id: ResourceId) -> bool {
        let now = self.clock.now();
        let deleted = self.resources.soft_delete(id, now);
        if deleted {
            tracing::debug!(resource = %id, "resource soft-deleted");
        }
        deleted
    }

    // =========================================================================
    // SEEDING & STATS
    // =========================================================================

    /// Import a seed forest through the normal create paths.
    ///
    /// The whole document is validated before the first write, so an
    /// invalid seed leaves the store untouched. Returns the number of
    /// topics created.
    pub fn import_seed(&mut self, roots: &[SeedTopic]) -> Result<usize, ArborError> {
        seed::validate(self, roots)?;

        let mut created = 0usize;
        let mut stack: Vec<(Option<TopicId>, &SeedTopic)> =
            roots.iter().rev().map(|t| (None, t)).collect();

        while let Some((parent, node)) = stack.pop() {
            let view = match parent {
                None => self.create_root(node.name.as_str(), node.content.as_str())?,
                Some(p) => self.create_child(p, node.name.as_str(), node.content.as_str())?,
            };
            created = created.saturating_add(1);

            for resource in &node.resources {
                self.create_resource(NewResource {
                    topic_id: view.id,
                    url: resource.url.clone(),
                    description: resource.description.clone(),
                    kind: resource.kind.clone(),
                })?;
            }
            stack.extend(node.children.iter().rev().map(|c| (Some(view.id), c)));
        }

        tracing::info!(topics = created, "seed imported");
        Ok(created)
    }

    #[must_use]
    pub fn stats(&self) -> StoreStats {
        StoreStats {
            topics: self.registry.len(),
            active_topics: self.registry.active_len(),
            roots: self.registry.active_children(None).count(),
            versions: self.versions.count(),
            resources: self.resources.active_len(),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Timestamp;
    use crate::clock::ManualClock;
    use crate::ids::SequentialIds;

    fn store_with_clock() -> (Store, ManualClock) {
        let clock = ManualClock::new(1_000);
        let ids = Box::new(SequentialIds::new());
        let store = Store::with_collaborators(Box::new(clock.clone()), ids);
        (store, clock)
    }

    fn link(topic: TopicId, url: &str) -> NewResource {
        NewResource {
            topic_id: topic,
            url: url.to_string(),
            description: None,
            kind: "article".to_string(),
        }
    }

    #[test]
    fn create_root_starts_at_version_one() {
        let (mut s, _) = store_with_clock();
        let view = s.create_root("Rust", "systems").expect("create");
        assert_eq!(view.version, 1);
        assert_eq!(view.parent_id, None);
        assert_eq!(view.created_at, Timestamp(1_000));
        assert_eq!(view.updated_at, Timestamp(1_000));
        assert_eq!(s.get_active(view.id), Ok(view));
    }

    #[test]
    fn duplicate_sibling_leaves_no_trace() {
        let (mut s, _) = store_with_clock();
        let r = s.create_root("A", "a").expect("root").id;
        s.create_child(r, "X", "x").expect("child");
        let before = s.stats();

        assert_eq!(
            s.create_child(r, "X", "other"),
            Err(ArborError::DuplicateSiblingName("X".to_string()))
        );
        assert_eq!(s.stats(), before);

        // The next allocation is unaffected by the failed call.
        let next = s.create_child(r, "Y", "y").expect("child").id;
        let expected = TopicId(uuid::Uuid::from_u128(5));
        assert_eq!(next, expected);
    }

    #[test]
    fn create_child_checks_parent_before_name() {
        let (mut s, _) = store_with_clock();
        let r = s.create_root("A", "a").expect("root").id;
        assert!(s.soft_delete(r));
        let before = s.stats();

        assert_eq!(
            s.create_child(r, "A", "x"),
            Err(ArborError::ParentNotFound(r))
        );
        assert_eq!(s.stats(), before);
        // Nothing was allocated for the rejected child.
        let next = s.create_root("B", "b").expect("root").id;
        assert_eq!(next, TopicId(uuid::Uuid::from_u128(3)));
    }

    #[test]
    fn append_version_failure_order() {
        let (mut s, _) = store_with_clock();
        let r = s.create_root("A", "a").expect("root").id;
        let b = s.create_child(r, "B", "b").expect("b").id;
        s.create_child(r, "C", "c").expect("c");
        let missing = TopicId(uuid::Uuid::from_u128(999));

        assert!(matches!(
            s.append_version(missing, TopicPatch::default()),
            Err(ArborError::Validation(_))
        ));
        assert_eq!(
            s.append_version(missing, TopicPatch::name("C")),
            Err(ArborError::TopicNotFound(missing))
        );
        assert_eq!(
            s.append_version(b, TopicPatch::name("C")),
            Err(ArborError::DuplicateSiblingName("C".to_string()))
        );
        assert_eq!(s.list_versions(b).map(|v| v.len()), Ok(1));
    }

    #[test]
    fn rename_to_own_name_is_allowed() {
        let (mut s, _) = store_with_clock();
        let r = s.create_root("A", "a").expect("root").id;
        let view = s.append_version(r, TopicPatch::name("A")).expect("append");
        assert_eq!(view.version, 2);
    }

    #[test]
    fn append_version_advances_pointer_and_timestamps() {
        let (mut s, clock) = store_with_clock();
        let r = s.create_root("A", "a").expect("root").id;
        clock.advance(500);
        let view = s.append_version(r, TopicPatch::content("a2")).expect("v2");

        assert_eq!(view.version, 2);
        assert_eq!(view.name, "A");
        assert_eq!(view.content, "a2");
        assert_eq!(view.created_at, Timestamp(1_000));
        assert_eq!(view.updated_at, Timestamp(1_500));
        assert_eq!(
            s.registry().get(r).map(|t| t.updated_at),
            Some(Timestamp(1_500))
        );

        let v2 = s.get_version(r, 2).expect("v2");
        assert_eq!(v2.created_at, Timestamp(1_000));
    }

    #[test]
    fn history_survives_deletion() {
        let (mut s, _) = store_with_clock();
        let r = s.create_root("A", "a").expect("root").id;
        s.append_version(r, TopicPatch::content("a2")).expect("v2");
        assert!(s.soft_delete(r));
        assert!(!s.soft_delete(r));

        assert_eq!(s.get_active(r), Err(ArborError::TopicNotFound(r)));
        let history = s.list_versions(r).expect("history");
        let numbers: Vec<u32> = history.iter().map(|v| v.version).collect();
        assert_eq!(numbers, vec![1, 2]);
        assert_eq!(s.get_version(r, 1).map(|v| v.content), Ok("a".to_string()));
    }

    #[test]
    fn get_version_edge_cases() {
        let (mut s, _) = store_with_clock();
        let r = s.create_root("A", "a").expect("root").id;
        assert!(matches!(
            s.get_version(r, 0),
            Err(ArborError::InvalidVersionSelector(_))
        ));
        assert_eq!(
            s.get_version(r, 7),
            Err(ArborError::VersionNotFound {
                topic: r,
                version: 7,
            })
        );
        let missing = TopicId(uuid::Uuid::from_u128(999));
        assert_eq!(
            s.list_versions(missing),
            Err(ArborError::TopicNotFound(missing))
        );
    }

    #[test]
    fn children_of_deleted_parent_remain_listable() {
        let (mut s, _) = store_with_clock();
        let r = s.create_root("A", "a").expect("root").id;
        let c = s.create_child(r, "B", "b").expect("c").id;
        assert!(s.soft_delete(r));

        let children = s.list_active_children(Some(r));
        assert_eq!(children.iter().map(|v| v.id).collect::<Vec<_>>(), vec![c]);
        assert!(s.list_active_children(None).is_empty());
    }

    #[test]
    fn deleted_name_can_be_reused() {
        let (mut s, _) = store_with_clock();
        let first = s.create_root("A", "a").expect("root").id;
        assert!(s.soft_delete(first));
        let second = s.create_root("A", "again").expect("reuse").id;
        assert_ne!(first, second);
    }

    #[test]
    fn resources_follow_topic_and_tombstones() {
        let (mut s, _) = store_with_clock();
        let r = s.create_root("A", "a").expect("root").id;
        let res = s.create_resource(link(r, "https://a.dev")).expect("link");

        assert_eq!(s.get_resource(res.id), Ok(res.clone()));
        assert_eq!(s.list_resources(r).map(|v| v.len()), Ok(1));

        let tree = s
            .build_tree(r, VersionSelector::Latest, true)
            .expect("tree");
        assert_eq!(tree.resources.map(|v| v.len()), Some(1));

        assert!(s.delete_resource(res.id));
        assert!(!s.delete_resource(res.id));
        assert_eq!(
            s.get_resource(res.id),
            Err(ArborError::ResourceNotFound(res.id))
        );

        assert!(s.soft_delete(r));
        assert_eq!(
            s.create_resource(link(r, "https://b.dev")),
            Err(ArborError::TopicNotFound(r))
        );
        assert_eq!(s.list_resources(r), Err(ArborError::TopicNotFound(r)));
    }

    #[test]
    fn stats_count_records_and_active() {
        let (mut s, _) = store_with_clock();
        let r = s.create_root("A", "a").expect("root").id;
        let c = s.create_child(r, "B", "b").expect("c").id;
        s.create_root("Z", "z").expect("root");
        s.append_version(c, TopicPatch::content("b2")).expect("v2");
        s.create_resource(link(c, "https://b.dev")).expect("link");
        assert!(s.soft_delete(c));

        assert_eq!(
            s.stats(),
            StoreStats {
                topics: 3,
                active_topics: 2,
                roots: 2,
                versions: 4,
                resources: 1,
            }
        );
    }
}
