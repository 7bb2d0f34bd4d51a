//! # Tree Reconstructor
//!
//! Builds point-in-time nested views of a topic and its active descendants.
//!
//! ## Version resolution
//!
//! - `Latest`: every node resolves independently to its own current version.
//! - `Exact(N)`: every node must literally possess version `N`. A descendant
//!   without it is omitted together with its whole subtree; the root
//!   without it fails the call.
//!
//! Soft-deleted children never appear, whatever the selector.
//!
//! The walk is iterative (explicit stack) so hierarchy depth is bounded by
//! heap, not by the call stack. Nodes are emitted in pre-order and children
//! keep registry insertion order.

use crate::registry::TopicRegistry;
use crate::resources::ResourceSource;
use crate::versions::VersionStore;
use crate::{ArborError, Topic, TopicId, TopicVersion, TreeNode, VersionSelector};

/// Borrowed view over the store parts a snapshot needs.
pub struct TreeReconstructor<'a> {
    registry: &'a TopicRegistry,
    versions: &'a VersionStore,
    resources: &'a dyn ResourceSource,
}

impl<'a> TreeReconstructor<'a> {
    #[must_use]
    pub fn new(
        registry: &'a TopicRegistry,
        versions: &'a VersionStore,
        resources: &'a dyn ResourceSource,
    ) -> Self {
        Self {
            registry,
            versions,
            resources,
        }
    }

    /// Reconstruct the tree rooted at `root` as selected by `selector`.
    pub fn build(
        &self,
        root: TopicId,
        selector: VersionSelector,
        include_resources: bool,
    ) -> Result<TreeNode, ArborError> {
        let root_topic = self
            .registry
            .get_active(root)
            .ok_or(ArborError::TopicNotFound(root))?;
        let wanted = match selector {
            VersionSelector::Exact(n) => n,
            VersionSelector::Latest => u64::from(root_topic.current_version),
        };
        let missing = ArborError::VersionNotFound {
            topic: root,
            version: wanted,
        };
        let root_version = self.resolve(root_topic, selector).ok_or(missing)?;

        // Flat pre-order arena; children always get larger indices than
        // their parent, which lets the final assembly run back to front.
        let mut nodes: Vec<Option<TreeNode>> =
            vec![Some(self.node(root_topic, root_version, include_resources))];
        let mut child_slots: Vec<Vec<usize>> = vec![Vec::new()];

        let mut stack: Vec<(usize, &'a Topic)> = Vec::new();
        self.push_children(&mut stack, 0, root);

        while let Some((parent_slot, topic)) = stack.pop() {
            let Some(version) = self.resolve(topic, selector) else {
                // Pruned: its children are never pushed.
                continue;
            };

            let slot = nodes.len();
            nodes.push(Some(self.node(topic, version, include_resources)));
            child_slots.push(Vec::new());
            if let Some(siblings) = child_slots.get_mut(parent_slot) {
                siblings.push(slot);
            }
            self.push_children(&mut stack, slot, topic.id);
        }

        for slot in (0..nodes.len()).rev() {
            let children: Vec<TreeNode> = child_slots[slot]
                .iter()
                .filter_map(|&c| nodes[c].take())
                .collect();
            if let Some(node) = nodes[slot].as_mut() {
                node.children = children;
            }
        }

        let tree = nodes
            .first_mut()
            .and_then(Option::take)
            .ok_or(ArborError::TopicNotFound(root))?;

        tracing::debug!(
            root = %root,
            selector = %selector,
            nodes = tree.len(),
            "tree reconstructed"
        );
        Ok(tree)
    }

    fn resolve(&self, topic: &Topic, selector: VersionSelector) -> Option<&'a TopicVersion> {
        match selector {
            VersionSelector::Latest => self.versions.get(topic.id, topic.current_version),
            VersionSelector::Exact(n) => self.versions.find(topic.id, n),
        }
    }

    /// Push active children in reverse so they pop left to right.
    fn push_children(&self, stack: &mut Vec<(usize, &'a Topic)>, slot: usize, parent: TopicId) {
        let children: Vec<&'a Topic> = self.registry.active_children(Some(parent)).collect();
        stack.extend(children.into_iter().rev().map(|t| (slot, t)));
    }

    fn node(&self, topic: &Topic, version: &TopicVersion, include_resources: bool) -> TreeNode {
        TreeNode {
            id: topic.id,
            parent_id: topic.parent_id,
            name: version.name.clone(),
            content: version.content.clone(),
            version: version.version,
            created_at: topic.created_at,
            updated_at: version.updated_at,
            children: Vec::new(),
            resources: include_resources.then(|| self.resources.active_resources(topic.id)),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
