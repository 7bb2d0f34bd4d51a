//! # Graph Path Finder
//!
//! Unweighted shortest path over the implicit, undirected topic graph:
//! the neighbors of a topic are its parent (if active) and its active
//! children.
//!
//! Plain BFS with a visited set and a predecessor map. Within one tree the
//! simple path is unique, so neighbor order only affects how much of the
//! forest gets visited, never the answer. All bookkeeping uses `BTreeMap`/
//! `BTreeSet` for deterministic iteration.

use crate::registry::TopicRegistry;
use crate::versions::VersionStore;
use crate::{ArborError, PathNode, TopicId};
use std::collections::{BTreeMap, BTreeSet, VecDeque};

/// Borrowed view over the store parts a path query needs.
pub struct PathFinder<'a> {
    registry: &'a TopicRegistry,
    versions: &'a VersionStore,
}

impl<'a> PathFinder<'a> {
    #[must_use]
    pub fn new(registry: &'a TopicRegistry, versions: &'a VersionStore) -> Self {
        Self { registry, versions }
    }

    /// Shortest path from `from` to `to`, both endpoints included.
    ///
    /// Fails `TopicNotFound` if either endpoint is missing or deleted, and
    /// `NoPath` if they sit in disconnected trees.
    pub fn shortest_path(&self, from: TopicId, to: TopicId) -> Result<Vec<PathNode>, ArborError> {
        for id in [from, to] {
            if self.registry.get_active(id).is_none() {
                return Err(ArborError::TopicNotFound(id));
            }
        }

        if from == to {
            return Ok(vec![self.resolve(from)?]);
        }

        let ids = self.search(from, to)?;
        ids.into_iter().map(|id| self.resolve(id)).collect()
    }

    /// Neighbors of an active topic: parent first, then children in
    /// insertion order.
    pub fn neighbors(&self, id: TopicId) -> Vec<TopicId> {
        let Some(topic) = self.registry.get_active(id) else {
            return Vec::new();
        };
        topic
            .parent_id
            .filter(|p| self.registry.get_active(*p).is_some())
            .into_iter()
            .chain(self.registry.active_children(Some(id)).map(|c| c.id))
            .collect()
    }

    fn search(&self, from: TopicId, to: TopicId) -> Result<Vec<TopicId>, ArborError> {
        let mut visited = BTreeSet::new();
        let mut predecessor: BTreeMap<TopicId, TopicId> = BTreeMap::new();
        let mut queue = VecDeque::new();

        visited.insert(from);
        queue.push_back(from);

        while let Some(current) = queue.pop_front() {
            if current == to {
                return self.reconstruct(&predecessor, from, to);
            }
            for neighbor in self.neighbors(current) {
                if visited.insert(neighbor) {
                    predecessor.insert(neighbor, current);
                    queue.push_back(neighbor);
                }
            }
        }

        tracing::debug!(%from, %to, visited = visited.len(), "frontier exhausted");
        Err(ArborError::NoPath { from, to })
    }

    /// Walk predecessors back from `to` and reverse.
    fn reconstruct(
        &self,
        predecessor: &BTreeMap<TopicId, TopicId>,
        from: TopicId,
        to: TopicId,
    ) -> Result<Vec<TopicId>, ArborError> {
        let mut path = vec![to];
        let mut current = to;
        while current != from {
            // A path can never be longer than the set of discovered nodes.
            if path.len() > predecessor.len().saturating_add(1) {
                return Err(ArborError::NoPath { from, to });
            }
            current = match predecessor.get(&current) {
                Some(&p) => p,
                None => return Err(ArborError::NoPath { from, to }),
            };
            path.push(current);
        }
        path.reverse();
        Ok(path)
    }

    /// Current latest version for display.
    fn resolve(&self, id: TopicId) -> Result<PathNode, ArborError> {
        let topic = self
            .registry
            .get_active(id)
            .ok_or(ArborError::TopicNotFound(id))?;
        let version = self
            .versions
            .get(id, topic.current_version)
            .ok_or(ArborError::VersionNotFound {
                topic: id,
                version: u64::from(topic.current_version),
            })?;
        Ok(PathNode {
            id,
            name: version.name.clone(),
            version: version.version,
        })
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::clock::ManualClock;
    use crate::ids::SequentialIds;
    use crate::{ArborError, PathNode, Store, TopicId, TopicPatch};

    fn store() -> Store {
        let ids = Box::new(SequentialIds::new());
        Store::with_collaborators(Box::new(ManualClock::new(0)), ids)
    }

    fn ids(path: &[PathNode]) -> Vec<TopicId> {
        path.iter().map(|p| p.id).collect()
    }

    /// R("A") -> C1("B"), C2("C") -> G("D")
    fn sample(s: &mut Store) -> (TopicId, TopicId, TopicId, TopicId) {
        let r = s.create_root("A", "a").expect("r").id;
        let c1 = s.create_child(r, "B", "b").expect("c1").id;
        let c2 = s.create_child(r, "C", "c").expect("c2").id;
        let g = s.create_child(c2, "D", "d").expect("g").id;
        (r, c1, c2, g)
    }

    #[test]
    fn same_node_is_single_element() {
        let mut s = store();
        let (r, ..) = sample(&mut s);
        let path = s.shortest_path(r, r).expect("path");
        assert_eq!(
            path,
            vec![PathNode {
                id: r,
                name: "A".to_string(),
                version: 1,
            }]
        );
    }

    #[test]
    fn cousin_path_goes_through_common_ancestor() {
        let mut s = store();
        let (r, c1, c2, g) = sample(&mut s);
        let path = s.shortest_path(c1, g).expect("path");
        assert_eq!(ids(&path), vec![c1, r, c2, g]);
    }

    #[test]
    fn downward_and_upward_paths_mirror() {
        let mut s = store();
        let (r, _, c2, g) = sample(&mut s);
        assert_eq!(ids(&s.shortest_path(r, g).expect("down")), vec![r, c2, g]);
        assert_eq!(ids(&s.shortest_path(g, r).expect("up")), vec![g, c2, r]);
    }

    #[test]
    fn path_nodes_show_current_version() {
        let mut s = store();
        let (r, c1, ..) = sample(&mut s);
        s.append_version(c1, TopicPatch::name("B2")).expect("v2");
        let path = s.shortest_path(r, c1).expect("path");
        assert_eq!(path[1].name, "B2");
        assert_eq!(path[1].version, 2);
    }

    #[test]
    fn disconnected_forests_have_no_path() {
        let mut s = store();
        let (r, ..) = sample(&mut s);
        let other = s.create_root("Other", "o").expect("other").id;
        assert_eq!(
            s.shortest_path(r, other),
            Err(ArborError::NoPath { from: r, to: other })
        );
    }

    #[test]
    fn deleted_endpoint_is_not_found() {
        let mut s = store();
        let (r, c1, ..) = sample(&mut s);
        assert!(s.soft_delete(c1));
        assert_eq!(s.shortest_path(r, c1), Err(ArborError::TopicNotFound(c1)));
        assert_eq!(s.shortest_path(c1, c1), Err(ArborError::TopicNotFound(c1)));
    }

    #[test]
    fn deleted_intermediate_cuts_the_tree() {
        let mut s = store();
        let (r, c1, c2, g) = sample(&mut s);
        assert!(s.soft_delete(c2));
        assert_eq!(
            s.shortest_path(c1, g),
            Err(ArborError::NoPath { from: c1, to: g })
        );
        assert_eq!(ids(&s.shortest_path(c1, r).expect("path")), vec![c1, r]);
    }
}
