//! # Version Store
//!
//! Append-only arena of [`TopicVersion`] records, keyed by
//! `(TopicId, version)` for exact lookup. Independent of tree structure.
//!
//! Records are never mutated or removed. The only write path is
//! [`VersionStore::insert`], which refuses anything but the next number in
//! a topic's chain, so chains stay exactly `1..=k`.

use crate::{ArborError, Timestamp, TopicId, TopicPatch, TopicVersion, VersionId};
use std::collections::BTreeMap;

/// Storage for every topic's version chain.
#[derive(Debug, Clone, Default)]
pub struct VersionStore {
    /// (topic, version) -> record. BTreeMap keeps each chain contiguous and ordered.
    records: BTreeMap<(TopicId, u32), TopicVersion>,
}

impl VersionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build version 1 of a topic. Performs no uniqueness check.
    #[must_use]
    pub fn create_initial(
        id: VersionId,
        topic_id: TopicId,
        name: impl Into<String>,
        content: impl Into<String>,
        now: Timestamp,
    ) -> TopicVersion {
        TopicVersion {
            id,
            topic_id,
            version: 1,
            name: name.into(),
            content: content.into(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Build the successor of `previous`, inheriting unset patch fields.
    ///
    /// `created_at` is carried over so every record in a chain reports the
    /// instant version 1 was created.
    #[must_use]
    pub fn create_next(
        id: VersionId,
        previous: &TopicVersion,
        patch: &TopicPatch,
        now: Timestamp,
    ) -> TopicVersion {
        TopicVersion {
            id,
            topic_id: previous.topic_id,
            version: previous.version.saturating_add(1),
            name: patch.name.clone().unwrap_or_else(|| previous.name.clone()),
            content: patch
                .content
                .clone()
                .unwrap_or_else(|| previous.content.clone()),
            created_at: previous.created_at,
            updated_at: now,
        }
    }

    /// The number the next record for `topic_id` must carry.
    #[must_use]
    pub fn next_number(&self, topic_id: TopicId) -> u32 {
        self.latest(topic_id)
            .map_or(1, |v| v.version.saturating_add(1))
    }

    /// Append a record to its topic's chain.
    ///
    /// Fails with `Validation` if the record would leave a gap or overwrite
    /// an existing version.
    pub(crate) fn insert(&mut self, version: TopicVersion) -> Result<(), ArborError> {
        let expected = self.next_number(version.topic_id);
        if version.version != expected {
            return Err(ArborError::Validation(format!(
                "version {} out of sequence for topic {} (expected {})",
                version.version, version.topic_id, expected
            )));
        }
        self.records
            .insert((version.topic_id, version.version), version);
        Ok(())
    }

    /// Highest version of a topic, if any exist.
    #[must_use]
    pub fn latest(&self, topic_id: TopicId) -> Option<&TopicVersion> {
        self.records
            .range((topic_id, 0)..=(topic_id, u32::MAX))
            .next_back()
            .map(|(_, v)| v)
    }

    /// Exact version lookup. No nearest-version fallback.
    #[must_use]
    pub fn get(&self, topic_id: TopicId, version: u32) -> Option<&TopicVersion> {
        self.records.get(&(topic_id, version))
    }

    /// Exact lookup by a requested number, which may lie past any number a
    /// topic can carry.
    #[must_use]
    pub fn find(&self, topic_id: TopicId, requested: u64) -> Option<&TopicVersion> {
        u32::try_from(requested)
            .ok()
            .and_then(|v| self.get(topic_id, v))
    }

    /// Every version of a topic, ascending by version number.
    #[must_use]
    pub fn list(&self, topic_id: TopicId) -> Vec<&TopicVersion> {
        self.records
            .range((topic_id, 0)..=(topic_id, u32::MAX))
            .map(|(_, v)| v)
            .collect()
    }

    /// Total number of version records across all topics.
    #[must_use]
    pub fn count(&self) -> usize {
        self.records.len()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn topic(n: u128) -> TopicId {
        TopicId(Uuid::from_u128(n))
    }

    fn vid(n: u128) -> VersionId {
        VersionId(Uuid::from_u128(1000 + n))
    }

    fn seeded(store: &mut VersionStore, t: TopicId) -> TopicVersion {
        let v1 = VersionStore::create_initial(vid(1), t, "Rust", "systems", Timestamp(100));
        store.insert(v1.clone()).expect("insert v1");
        v1
    }

    #[test]
    fn initial_version_is_one_with_equal_timestamps() {
        let v = VersionStore::create_initial(vid(1), topic(1), "A", "a", Timestamp(42));
        assert_eq!(v.version, 1);
        assert_eq!(v.created_at, Timestamp(42));
        assert_eq!(v.updated_at, Timestamp(42));
    }

    #[test]
    fn next_inherits_unset_fields_and_created_at() {
        let mut store = VersionStore::new();
        let v1 = seeded(&mut store, topic(1));

        let v2 = VersionStore::create_next(
            vid(2),
            &v1,
            &TopicPatch::content("memory safety"),
            Timestamp(200),
        );
        assert_eq!(v2.version, 2);
        assert_eq!(v2.name, "Rust");
        assert_eq!(v2.content, "memory safety");
        assert_eq!(v2.created_at, Timestamp(100));
        assert_eq!(v2.updated_at, Timestamp(200));

        let rename = TopicPatch::name("Rust 2024");
        let v3 = VersionStore::create_next(vid(3), &v2, &rename, Timestamp(300));
        assert_eq!(v3.name, "Rust 2024");
        assert_eq!(v3.content, "memory safety");
        assert_eq!(v3.created_at, Timestamp(100));
    }

    #[test]
    fn latest_tracks_highest_number() {
        let mut store = VersionStore::new();
        let t = topic(1);
        assert!(store.latest(t).is_none());

        let v1 = seeded(&mut store, t);
        let v2 = VersionStore::create_next(vid(2), &v1, &TopicPatch::content("x"), Timestamp(2));
        store.insert(v2).expect("insert v2");

        assert_eq!(store.latest(t).map(|v| v.version), Some(2));
    }

    #[test]
    fn get_is_exact_only() {
        let mut store = VersionStore::new();
        let t = topic(1);
        seeded(&mut store, t);

        assert!(store.get(t, 1).is_some());
        assert!(store.get(t, 2).is_none());
        assert!(store.get(t, 0).is_none());
    }

    #[test]
    fn find_does_not_wrap_numbers_past_u32() {
        let mut store = VersionStore::new();
        let t = topic(1);
        seeded(&mut store, t);

        assert!(store.find(t, 1).is_some());
        // Truncated to 32 bits this would read as version 1.
        assert!(store.find(t, 4_294_967_297).is_none());
    }

    #[test]
    fn list_is_ascending_and_isolated_per_topic() {
        let mut store = VersionStore::new();
        let a = topic(1);
        let b = topic(2);
        let mut prev = seeded(&mut store, a);
        seeded(&mut store, b);
        for n in 2..=4 {
            let patch = TopicPatch::content(format!("c{n}"));
            let next = VersionStore::create_next(vid(n), &prev, &patch, Timestamp(0));
            store.insert(next.clone()).expect("insert");
            prev = next;
        }

        let numbers: Vec<u32> = store.list(a).iter().map(|v| v.version).collect();
        assert_eq!(numbers, vec![1, 2, 3, 4]);
        assert_eq!(store.list(b).len(), 1);
        assert_eq!(store.count(), 5);
    }

    #[test]
    fn insert_rejects_gaps_and_overwrites() {
        let mut store = VersionStore::new();
        let t = topic(1);
        let v1 = seeded(&mut store, t);

        // Overwrite of version 1
        assert!(store.insert(v1.clone()).is_err());

        // Gap: version 3 before 2
        let patch = TopicPatch::content("x");
        let mut v3 = VersionStore::create_next(vid(3), &v1, &patch, Timestamp(0));
        v3.version = 3;
        assert!(store.insert(v3).is_err());

        assert_eq!(store.list(t).len(), 1);
        assert_eq!(store.get(t, 1), Some(&v1));
    }
}
