//! # API Request/Response Types
//!
//! JSON structures for the HTTP API. Requests validate themselves at the
//! boundary so oversized or malformed input never reaches the store.

use arbor_core::{
    ArborError, NewResource, PathNode, ResourceId, ResourcePatch, TopicId, TopicPatch,
    VersionSelector,
    primitives::{
        MAX_CONTENT_LENGTH, MAX_DESCRIPTION_LENGTH, MAX_NAME_LENGTH, MAX_RESOURCE_TYPE_LENGTH,
        check_resource, check_text, check_url,
    },
};
use serde::{Deserialize, Serialize};

// =============================================================================
// HEALTH & ERRORS
// =============================================================================

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Body of every non-2xx response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

impl From<&ArborError> for ErrorResponse {
    fn from(err: &ArborError) -> Self {
        Self {
            code: err.code().to_string(),
            message: err.to_string(),
        }
    }
}

// =============================================================================
// ID PARSING
// =============================================================================

/// Parse a topic id from a path or query segment.
pub fn parse_topic_id(field: &str, raw: &str) -> Result<TopicId, ArborError> {
    raw.parse()
        .map_err(|e| ArborError::Validation(format!("{field} is not a valid id: {e}")))
}

pub fn parse_resource_id(raw: &str) -> Result<ResourceId, ArborError> {
    raw.parse()
        .map_err(|e| ArborError::Validation(format!("id is not a valid id: {e}")))
}

/// Parse an explicit version number from a path segment. Same grammar as
/// the `version` query parameter, minus `latest`.
pub fn parse_version_number(raw: &str) -> Result<u64, ArborError> {
    match raw.parse::<VersionSelector>()? {
        VersionSelector::Exact(n) => Ok(n),
        VersionSelector::Latest => Err(ArborError::InvalidVersionSelector(raw.to_string())),
    }
}

// =============================================================================
// TOPIC REQUESTS
// =============================================================================

/// `POST /topics`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTopicRequest {
    pub name: String,
    pub content: String,
    #[serde(default)]
    pub parent_id: Option<TopicId>,
}

impl CreateTopicRequest {
    pub fn validate(&self) -> Result<(), ArborError> {
        check_text("name", &self.name, MAX_NAME_LENGTH)?;
        check_text("content", &self.content, MAX_CONTENT_LENGTH)
    }
}

/// `PATCH /topics/{id}`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTopicRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

impl UpdateTopicRequest {
    /// Validate present fields and convert. At least one field is required.
    pub fn into_patch(self) -> Result<TopicPatch, ArborError> {
        if self.name.is_none() && self.content.is_none() {
            return Err(ArborError::Validation(
                "at least one of name or content must be provided".to_string(),
            ));
        }
        if let Some(name) = &self.name {
            check_text("name", name, MAX_NAME_LENGTH)?;
        }
        if let Some(content) = &self.content {
            check_text("content", content, MAX_CONTENT_LENGTH)?;
        }
        Ok(TopicPatch {
            name: self.name,
            content: self.content,
        })
    }
}

/// `GET /topics?parent_id=<uuid>|null`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListTopicsQuery {
    #[serde(default)]
    pub parent_id: Option<String>,
}

impl ListTopicsQuery {
    /// Absent, empty or `null` all mean the root level.
    pub fn parent(&self) -> Result<Option<TopicId>, ArborError> {
        match self.parent_id.as_deref().map(str::trim) {
            None | Some("" | "null") => Ok(None),
            Some(raw) => parse_topic_id("parent_id", raw).map(Some),
        }
    }
}

/// `GET /topics/{id}/tree`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TreeQuery {
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub include_resources: bool,
}

impl TreeQuery {
    pub fn selector(&self) -> Result<VersionSelector, ArborError> {
        self.version
            .as_deref()
            .map_or(Ok(VersionSelector::Latest), |v| v.parse())
    }
}

/// `GET /topics/shortest-path?from=&to=`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathQuery {
    pub from: String,
    pub to: String,
}

impl PathQuery {
    pub fn endpoints(&self) -> Result<(TopicId, TopicId), ArborError> {
        Ok((
            parse_topic_id("from", &self.from)?,
            parse_topic_id("to", &self.to)?,
        ))
    }
}

/// Shortest path response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathResponse {
    pub path: Vec<PathNode>,
}

// =============================================================================
// RESOURCE REQUESTS
// =============================================================================

/// `POST /resources`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateResourceRequest {
    pub topic_id: TopicId,
    pub url: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
}

impl CreateResourceRequest {
    pub fn into_new_resource(self) -> Result<NewResource, ArborError> {
        check_resource(&self.url, self.description.as_deref(), &self.kind)?;
        Ok(NewResource {
            topic_id: self.topic_id,
            url: self.url,
            description: self.description,
            kind: self.kind,
        })
    }
}

/// `PATCH /resources/{id}`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateResourceRequest {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

impl UpdateResourceRequest {
    pub fn into_patch(self) -> Result<ResourcePatch, ArborError> {
        let patch = ResourcePatch {
            url: self.url,
            description: self.description,
            kind: self.kind,
        };
        if patch.is_empty() {
            return Err(ArborError::Validation("at least one field must be provided".to_string()));
        }
        if let Some(url) = &patch.url {
            check_url(url)?;
        }
        if let Some(description) = patch
            .description
            .as_ref()
            .filter(|d| d.len() > MAX_DESCRIPTION_LENGTH)
        {
            return Err(ArborError::Validation(format!(
                "description length {} exceeds maximum {} bytes",
                description.len(),
                MAX_DESCRIPTION_LENGTH
            )));
        }
        if let Some(kind) = &patch.kind {
            check_text("type", kind, MAX_RESOURCE_TYPE_LENGTH)?;
        }
        Ok(patch)
    }
}

/// `GET /resources?topic_id=`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListResourcesQuery {
    pub topic_id: String,
}
