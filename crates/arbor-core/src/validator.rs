//! # Sibling Uniqueness Validator
//!
//! Active siblings (same parent reference, or both at root level) may not
//! share a *current* name. Names are compared exactly, case-sensitive.
//!
//! The check is linear in sibling count with one latest-version lookup per
//! sibling. It runs before every create and every rename.

use crate::registry::TopicRegistry;
use crate::versions::VersionStore;
use crate::{ArborError, TopicId};

/// Fail with `DuplicateSiblingName` if an active sibling under `parent`
/// currently carries `name`. `except` excludes one topic (the one being
/// renamed) from the comparison.
pub fn ensure_unique_sibling_name(
    registry: &TopicRegistry,
    versions: &VersionStore,
    parent: Option<TopicId>,
    name: &str,
    except: Option<TopicId>,
) -> Result<(), ArborError> {
    let conflict = registry
        .active_children(parent)
        .filter(|sibling| Some(sibling.id) != except)
        .find(|sibling| versions.latest(sibling.id).is_some_and(|v| v.name == name));

    match conflict {
        Some(sibling) => {
            tracing::warn!(
                parent = ?parent,
                conflicting = %sibling.id,
                name,
                "sibling name already taken"
            );
            Err(ArborError::DuplicateSiblingName(name.to_string()))
        }
        None => Ok(()),
    }
}
