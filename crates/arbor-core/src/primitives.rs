//! # Store Primitives
//!
//! Hardcoded limits for the Arbor store.
//!
//! The store itself accepts any string; these bounds are enforced wherever
//! untrusted input enters (HTTP requests, seed documents) so that a single
//! payload cannot exhaust memory.

// =============================================================================
// INPUT VALIDATION LIMITS
// =============================================================================

/// Maximum length for topic names, in bytes.
pub const MAX_NAME_LENGTH: usize = 256;

/// Maximum length for topic content (64KB).
pub const MAX_CONTENT_LENGTH: usize = 65536;

/// Maximum length for resource URLs.
pub const MAX_URL_LENGTH: usize = 2048;

/// Maximum length for resource descriptions.
pub const MAX_DESCRIPTION_LENGTH: usize = 1000;

/// Maximum length for resource type tags ("video", "article", ...).
pub const MAX_RESOURCE_TYPE_LENGTH: usize = 64;

/// Maximum number of topics a single seed document may create.
pub const MAX_SEED_TOPICS: usize = 100_000;

/// Validate a topic name or content string against a byte limit.
///
/// Returns `ArborError::Validation` naming the offending field.
pub fn check_text(field: &str, value: &str, max: usize) -> Result<(), crate::ArborError> {
    if value.is_empty() {
        return Err(crate::ArborError::Validation(format!("{field} must not be empty")));
    }
    if value.len() > max {
        return Err(crate::ArborError::Validation(format!(
            "{field} length {} exceeds maximum {} bytes",
            value.len(),
            max
        )));
    }
    Ok(())
}

/// Validate a resource URL: bounded, absolute, http or https.
pub fn check_url(value: &str) -> Result<(), crate::ArborError> {
    check_text("url", value, MAX_URL_LENGTH)?;
    let parsed = url::Url::parse(value)
        .map_err(|e| crate::ArborError::Validation(format!("url is invalid: {e}")))?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(crate::ArborError::Validation(format!(
            "url scheme '{other}' is not allowed (http or https only)"
        ))),
    }
}

/// Validate the fields of a new resource.
pub fn check_resource(
    url: &str,
    description: Option<&str>,
    kind: &str,
) -> Result<(), crate::ArborError> {
    check_url(url)?;
    let too_long = description.filter(|d| d.len() > MAX_DESCRIPTION_LENGTH);
    if let Some(description) = too_long {
        return Err(crate::ArborError::Validation(format!(
            "description length {} exceeds maximum {} bytes",
            description.len(),
            MAX_DESCRIPTION_LENGTH
        )));
    }
    check_text("type", kind, MAX_RESOURCE_TYPE_LENGTH)
}
