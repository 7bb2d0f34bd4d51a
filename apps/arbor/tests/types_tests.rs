//! Unit tests for API request/response types.

// Allow unwrap and panic in tests - these are standard for test code
#![allow(clippy::unwrap_used, clippy::panic)]

use arbor::api::{
    CreateResourceRequest, CreateTopicRequest, ErrorResponse, HealthResponse, ListTopicsQuery,
    PathQuery, TreeQuery, UpdateResourceRequest, UpdateTopicRequest, parse_version_number,
};
use arbor_core::{ArborError, TopicId, VersionSelector};
use uuid::Uuid;

const TOPIC: &str = "6f9619ff-8b86-d011-b42d-00cf4fc964ff";

// =============================================================================
// HEALTH & ERROR RESPONSES
// =============================================================================

#[test]
fn test_health_response_default() {
    let health = HealthResponse::default();
    assert_eq!(health.status, "ok");
    assert!(!health.version.is_empty());
}

#[test]
fn test_error_response_from_error() {
    let err = ArborError::DuplicateSiblingName("Rust".to_string());
    let body = ErrorResponse::from(&err);
    assert_eq!(body.code, "DUPLICATE_SIBLING_NAME");
    assert!(body.message.contains("Rust"));

    let json = serde_json::to_string(&body).unwrap();
    assert!(json.contains("\"code\":\"DUPLICATE_SIBLING_NAME\""));
}

// =============================================================================
// TOPIC REQUESTS
// =============================================================================

#[test]
fn test_create_topic_request_parent_optional() {
    let root: CreateTopicRequest =
        serde_json::from_str(r#"{"name":"Rust","content":"lang"}"#).unwrap();
    assert!(root.parent_id.is_none());
    assert!(root.validate().is_ok());

    let child: CreateTopicRequest = serde_json::from_str(&format!(
        r#"{{"name":"Cargo","content":"build","parent_id":"{TOPIC}"}}"#
    ))
    .unwrap();
    assert_eq!(child.parent_id, Some(TOPIC.parse::<TopicId>().unwrap()));
}

#[test]
fn test_create_topic_request_rejects_empty_name() {
    let request: CreateTopicRequest =
        serde_json::from_str(r#"{"name":"","content":"lang"}"#).unwrap();
    assert!(matches!(request.validate(), Err(ArborError::Validation(_))));
}

#[test]
fn test_update_topic_request_requires_a_field() {
    let empty = UpdateTopicRequest::default();
    assert!(matches!(empty.into_patch(), Err(ArborError::Validation(_))));

    let rename: UpdateTopicRequest = serde_json::from_str(r#"{"name":"Ferris"}"#).unwrap();
    let patch = rename.into_patch().unwrap();
    assert_eq!(patch.name.as_deref(), Some("Ferris"));
    assert!(patch.content.is_none());
}

#[test]
fn test_list_topics_query_parent() {
    assert_eq!(ListTopicsQuery::default().parent().unwrap(), None);

    let null = ListTopicsQuery {
        parent_id: Some("null".to_string()),
    };
    assert_eq!(null.parent().unwrap(), None);

    let some = ListTopicsQuery {
        parent_id: Some(TOPIC.to_string()),
    };
    assert_eq!(
        some.parent().unwrap(),
        Some(TopicId(Uuid::parse_str(TOPIC).unwrap()))
    );

    let junk = ListTopicsQuery {
        parent_id: Some("root".to_string()),
    };
    assert!(matches!(junk.parent(), Err(ArborError::Validation(_))));
}

// =============================================================================
// TREE & PATH QUERIES
// =============================================================================

#[test]
fn test_tree_query_selector() {
    assert_eq!(
        TreeQuery::default().selector().unwrap(),
        VersionSelector::Latest
    );

    let exact = TreeQuery {
        version: Some("3".to_string()),
        include_resources: false,
    };
    assert_eq!(exact.selector().unwrap(), VersionSelector::Exact(3));

    let zero = TreeQuery {
        version: Some("0".to_string()),
        include_resources: false,
    };
    assert!(matches!(zero.selector(), Err(ArborError::InvalidVersionSelector(_))));
}

#[test]
fn test_parse_version_number() {
    assert_eq!(parse_version_number("7").unwrap(), 7);
    assert_eq!(parse_version_number("4294967296").unwrap(), 4_294_967_296);
    assert!(matches!(
        parse_version_number("0"),
        Err(ArborError::InvalidVersionSelector(_))
    ));
    assert!(parse_version_number("latest").is_err());
}

#[test]
fn test_path_query_endpoints() {
    let query = PathQuery {
        from: TOPIC.to_string(),
        to: TOPIC.to_string(),
    };
    let (from, to) = query.endpoints().unwrap();
    assert_eq!(from, to);

    let bad = PathQuery {
        from: TOPIC.to_string(),
        to: "nope".to_string(),
    };
    match bad.endpoints() {
        Err(ArborError::Validation(msg)) => assert!(msg.starts_with("to ")),
        other => panic!("expected validation error, got {:?}", other),
    }
}

// =============================================================================
// RESOURCE REQUESTS
// =============================================================================

#[test]
fn test_create_resource_request_uses_type_field() {
    let request: CreateResourceRequest = serde_json::from_str(&format!(
        r#"{{"topic_id":"{TOPIC}","url":"https://doc.rust-lang.org","type":"docs"}}"#
    ))
    .unwrap();
    assert_eq!(request.kind, "docs");
    assert!(request.description.is_none());

    let json = serde_json::to_string(&request).unwrap();
    assert!(json.contains("\"type\":\"docs\""));

    let new = request.into_new_resource().unwrap();
    assert_eq!(new.kind, "docs");
}

#[test]
fn test_create_resource_request_rejects_non_http_url() {
    let request: CreateResourceRequest = serde_json::from_str(&format!(
        r#"{{"topic_id":"{TOPIC}","url":"ftp://files.example","type":"docs"}}"#
    ))
    .unwrap();
    assert!(matches!(request.into_new_resource(), Err(ArborError::Validation(_))));
}

#[test]
fn test_update_resource_request_validation() {
    assert!(UpdateResourceRequest::default().into_patch().is_err());

    let long = UpdateResourceRequest {
        description: Some("d".repeat(1001)),
        ..UpdateResourceRequest::default()
    };
    assert!(matches!(long.into_patch(), Err(ArborError::Validation(_))));

    let retype: UpdateResourceRequest = serde_json::from_str(r#"{"type":"video"}"#).unwrap();
    let patch = retype.into_patch().unwrap();
    assert_eq!(patch.kind.as_deref(), Some("video"));
}
