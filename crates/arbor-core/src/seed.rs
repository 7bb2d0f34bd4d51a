//! # Seed Documents
//!
//! JSON forests used to pre-populate a fresh store:
//!
//! ```json
//! [
//!   {
//!     "name": "Rust",
//!     "content": "Systems programming",
//!     "resources": [{ "url": "https://doc.rust-lang.org/book/", "type": "book" }],
//!     "children": [{ "name": "Ownership", "content": "Moves and borrows" }]
//!   }
//! ]
//! ```
//!
//! A document is checked in full before anything is written, see
//! [`crate::Store::import_seed`].

use crate::primitives::{
    MAX_CONTENT_LENGTH, MAX_NAME_LENGTH, MAX_SEED_TOPICS, check_resource, check_text,
};
use crate::validator::ensure_unique_sibling_name;
use crate::{ArborError, Store};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// One topic of a seed document, with its subtree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeedTopic {
    pub name: String,
    pub content: String,
    #[serde(default)]
    pub children: Vec<SeedTopic>,
    #[serde(default)]
    pub resources: Vec<SeedResource>,
}

/// A resource attached to a seed topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeedResource {
    pub url: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
}

/// Parse a seed document from JSON text.
pub fn parse_seed(json: &str) -> Result<Vec<SeedTopic>, ArborError> {
    serde_json::from_str(json).map_err(|e| ArborError::Serialization(e.to_string()))
}

/// Check a whole seed forest against `store` without writing anything.
///
/// Covers field limits, the topic budget, duplicate sibling names inside
/// the document and root names already taken in the store.
pub fn validate(store: &Store, roots: &[SeedTopic]) -> Result<(), ArborError> {
    for root in roots {
        ensure_unique_sibling_name(store.registry(), store.versions(), None, &root.name, None)?;
    }

    let mut total = 0usize;
    let mut stack: Vec<&[SeedTopic]> = vec![roots];
    while let Some(siblings) = stack.pop() {
        let mut names = BTreeSet::new();
        for topic in siblings {
            total = total.saturating_add(1);
            if total > MAX_SEED_TOPICS {
                return Err(ArborError::Validation(format!(
                    "seed exceeds maximum of {MAX_SEED_TOPICS} topics"
                )));
            }
            check_text("name", &topic.name, MAX_NAME_LENGTH)?;
            check_text("content", &topic.content, MAX_CONTENT_LENGTH)?;
            if !names.insert(topic.name.as_str()) {
                return Err(ArborError::DuplicateSiblingName(topic.name.clone()));
            }
            for resource in &topic.resources {
                check_resource(
                    &resource.url,
                    resource.description.as_deref(),
                    &resource.kind,
                )?;
            }
            if !topic.children.is_empty() {
                stack.push(&topic.children);
            }
        }
    }
    Ok(())
}

// =============================================================================
// TESTS
// =============================================================================
