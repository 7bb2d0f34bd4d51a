//! # Core Type Definitions
//!
//! This module contains all core types for the Arbor topic store:
//! - Identifiers (`TopicId`, `VersionId`, `ResourceId`) and `Timestamp`
//! - Registry and history records (`Topic`, `TopicVersion`, `Resource`)
//! - Read models (`TopicView`, `TreeNode`, `PathNode`, `StoreStats`)
//! - Mutation inputs (`TopicPatch`, `ResourcePatch`, `VersionSelector`)
//! - Error types (`ArborError`)
//!
//! ## Determinism Guarantees
//!
//! All types in this module:
//! - Use integer arithmetic only (no floating-point)
//! - Implement `Ord` on identifiers for deterministic ordering in `BTreeMap`/`BTreeSet`

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

// =============================================================================
// IDENTIFIERS
// =============================================================================

/// Opaque identity of a topic. Never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TopicId(pub Uuid);

/// Opaque identity of a single version record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VersionId(pub Uuid);

/// Opaque identity of a resource attached to a topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceId(pub Uuid);

macro_rules! uuid_newtype {
    ($name:ident) => {
        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s).map(Self)
            }
        }
    };
}

uuid_newtype!(TopicId);
uuid_newtype!(VersionId);
uuid_newtype!(ResourceId);

/// Milliseconds since the Unix epoch.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct Timestamp(pub u64);

impl Timestamp {
    /// Get the raw millisecond value.
    #[must_use]
    pub const fn millis(self) -> u64 {
        self.0
    }
}

// =============================================================================
// REGISTRY RECORD
// =============================================================================

/// Current-state record of a topic.
///
/// Identity and parent never change after creation. The only in-place
/// mutations are advancing `current_version` (with `updated_at`) and
/// setting the `deleted_at` tombstone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    pub id: TopicId,
    /// Lookup-only reference; `None` means root level.
    pub parent_id: Option<TopicId>,
    /// Always references an existing version of this topic.
    pub current_version: u32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub deleted_at: Option<Timestamp>,
}

impl Topic {
    /// Whether the topic is not soft-deleted.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.deleted_at.is_none()
    }
}

// =============================================================================
// VERSION RECORD
// =============================================================================

/// One immutable named/content snapshot in a topic's history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicVersion {
    pub id: VersionId,
    pub topic_id: TopicId,
    /// Positive, contiguous per topic: `1..=k`.
    pub version: u32,
    pub name: String,
    pub content: String,
    /// Copied forward from version 1.
    pub created_at: Timestamp,
    /// Instant this version was created.
    pub updated_at: Timestamp,
}

/// Partial update for `append_version`. Unset fields inherit from the
/// previous version.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

impl TopicPatch {
    /// Patch that only renames.
    #[must_use]
    pub fn name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            content: None,
        }
    }

    /// Patch that only changes content.
    #[must_use]
    pub fn content(content: impl Into<String>) -> Self {
        Self {
            name: None,
            content: Some(content.into()),
        }
    }

    /// True when neither field is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.content.is_none()
    }
}

// =============================================================================
// RESOURCE
// =============================================================================

/// External material (link, video, pdf...) attached to exactly one topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    pub id: ResourceId,
    pub topic_id: TopicId,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<Timestamp>,
}

impl Resource {
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.deleted_at.is_none()
    }
}

/// Partial update for a resource.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourcePatch {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

impl ResourcePatch {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.url.is_none() && self.description.is_none() && self.kind.is_none()
    }
}

// =============================================================================
// VERSION SELECTOR
// =============================================================================

/// Which version of each node a snapshot shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VersionSelector {
    /// Each node resolves independently to its own current version.
    #[default]
    Latest,
    /// Every node must literally possess this version number.
    ///
    /// Wider than stored version numbers: a well-formed request for a
    /// number no topic can reach is a miss, not a malformed selector.
    Exact(u64),
}

impl FromStr for VersionSelector {
    type Err = ArborError;

    /// Accepts `"latest"` or a positive decimal integer. Integers past
    /// `u64::MAX` saturate.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed == "latest" {
            return Ok(Self::Latest);
        }
        if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ArborError::InvalidVersionSelector(s.to_string()));
        }
        match trimmed.parse::<u64>() {
            Ok(0) => Err(ArborError::InvalidVersionSelector(s.to_string())),
            Ok(v) => Ok(Self::Exact(v)),
            // Digits only, so the sole failure left is overflow.
            Err(_) => Ok(Self::Exact(u64::MAX)),
        }
    }
}

impl fmt::Display for VersionSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Latest => f.write_str("latest"),
            Self::Exact(v) => write!(f, "{v}"),
        }
    }
}

// =============================================================================
// READ MODELS
// =============================================================================

/// A topic joined with one of its versions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicView {
    pub id: TopicId,
    pub parent_id: Option<TopicId>,
    pub name: String,
    pub content: String,
    pub version: u32,
    /// The topic's creation instant.
    pub created_at: Timestamp,
    /// The shown version's creation instant.
    pub updated_at: Timestamp,
}

impl TopicView {
    #[must_use]
    pub fn new(topic: &Topic, version: &TopicVersion) -> Self {
        Self {
            id: topic.id,
            parent_id: topic.parent_id,
            name: version.name.clone(),
            content: version.content.clone(),
            version: version.version,
            created_at: topic.created_at,
            updated_at: version.updated_at,
        }
    }
}

/// A node of a point-in-time tree snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeNode {
    pub id: TopicId,
    pub parent_id: Option<TopicId>,
    pub name: String,
    pub content: String,
    pub version: u32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub children: Vec<TreeNode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resources: Option<Vec<Resource>>,
}

impl TreeNode {
    /// Total number of nodes in this subtree, including itself.
    #[must_use]
    pub fn len(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            count += 1;
            stack.extend(node.children.iter());
        }
        count
    }

    /// A tree node is never empty; provided for clippy's `len_without_is_empty`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Ids in pre-order.
    #[must_use]
    pub fn ids(&self) -> Vec<TopicId> {
        let mut out = Vec::new();
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            out.push(node.id);
            stack.extend(node.children.iter().rev());
        }
        out
    }

    /// Find a node anywhere in this subtree.
    #[must_use]
    pub fn find(&self, id: TopicId) -> Option<&TreeNode> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(id))
    }
}

/// One hop of a shortest path, resolved to the topic's current version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathNode {
    pub id: TopicId,
    pub name: String,
    pub version: u32,
}

/// Store-wide counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreStats {
    /// All topic records, deleted included.
    pub topics: usize,
    pub active_topics: usize,
    /// Active topics at root level.
    pub roots: usize,
    pub versions: usize,
    /// Active resources.
    pub resources: usize,
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur in the Arbor store.
///
/// - Every failure is a distinguishable kind, never a catch-all
/// - Use `Result<T, ArborError>` for fallible operations
/// - A failed mutation leaves no partial state behind
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArborError {
    /// The topic is absent or soft-deleted.
    #[error("Topic not found: {0}")]
    TopicNotFound(TopicId),

    /// The topic exists but has no such version.
    #[error("Version {version} not found for topic {topic}")]
    VersionNotFound { topic: TopicId, version: u64 },

    /// Child creation against a missing or deleted parent.
    #[error("Parent topic not found: {0}")]
    ParentNotFound(TopicId),

    /// An active sibling already carries this name.
    #[error("DuplicateSiblingName:{0}")]
    DuplicateSiblingName(String),

    /// The request carried no usable fields.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The two topics live in disconnected trees.
    #[error("No path from {from} to {to}")]
    NoPath { from: TopicId, to: TopicId },

    /// Non-positive or non-integer explicit version.
    #[error("Invalid version selector: {0:?}")]
    InvalidVersionSelector(String),

    /// The resource is absent or soft-deleted.
    #[error("Resource not found: {0}")]
    ResourceNotFound(ResourceId),

    /// A seed or payload could not be (de)serialized.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(String),
}

impl ArborError {
    /// Stable machine-readable code for the wire.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::TopicNotFound(_) => "TOPIC_NOT_FOUND",
            Self::VersionNotFound { .. } => "VERSION_NOT_FOUND",
            Self::ParentNotFound(_) => "PARENT_NOT_FOUND",
            Self::DuplicateSiblingName(_) => "DUPLICATE_SIBLING_NAME",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::NoPath { .. } => "NO_PATH",
            Self::InvalidVersionSelector(_) => "INVALID_VERSION_SELECTOR",
            Self::ResourceNotFound(_) => "RESOURCE_NOT_FOUND",
            Self::Serialization(_) => "SERIALIZATION_ERROR",
            Self::Io(_) => "IO_ERROR",
        }
    }

    /// True for every "record absent" variant.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::TopicNotFound(_)
                | Self::VersionNotFound { .. }
                | Self::ParentNotFound(_)
                | Self::ResourceNotFound(_)
        )
    }
}

// =============================================================================
// TESTS
// =============================================================================
