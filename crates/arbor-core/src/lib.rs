//! # arbor-core
//!
//! The versioned topic store for Arbor.
//!
//! Topics form a forest. Every edit appends an immutable version, deletion
//! is a tombstone, and two read paths sit on top:
//!
//! - [`TreeReconstructor`]: point-in-time nested snapshots of a subtree
//! - [`PathFinder`]: shortest undirected path between two topics
//!
//! ## Architectural Constraints
//!
//! - Pure Rust: no async, no network
//! - Deterministic: `BTreeMap`/`BTreeSet` only, insertion-ordered children
//! - Time and ids come from injected [`Clock`] and [`IdAllocator`]
//! - A failed mutation never leaves partial state

// =============================================================================
// MODULES
// =============================================================================

pub mod clock;
pub mod ids;
pub mod path;
pub mod primitives;
pub mod registry;
pub mod resources;
pub mod seed;
pub mod store;
pub mod tree;
pub mod types;
pub mod validator;
pub mod versions;

// =============================================================================
// RE-EXPORTS: Core Types
// =============================================================================

pub use types::{
    ArborError, PathNode, Resource, ResourceId, ResourcePatch, StoreStats, Timestamp, Topic,
    TopicId, TopicPatch, TopicVersion, TopicView, TreeNode, VersionId, VersionSelector,
};

// =============================================================================
// RE-EXPORTS: Store & Collaborators
// =============================================================================

pub use clock::{Clock, ManualClock, SystemClock};
pub use ids::{IdAllocator, RandomIds, SequentialIds};
pub use path::PathFinder;
pub use registry::TopicRegistry;
pub use resources::{NewResource, ResourceSource, ResourceStore};
pub use seed::{SeedResource, SeedTopic, parse_seed};
pub use store::Store;
pub use tree::TreeReconstructor;
pub use versions::VersionStore;
