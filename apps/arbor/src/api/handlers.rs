//! # API Endpoint Handlers
//!
//! Every handler validates its input first, then takes the store lock for
//! exactly one store call. Mutations take the write lock, reads the read
//! lock.

use super::{
    AppState,
    error::ApiError,
    types::{
        CreateResourceRequest, CreateTopicRequest, HealthResponse, ListResourcesQuery,
        ListTopicsQuery, PathQuery, PathResponse, TreeQuery, UpdateResourceRequest,
        UpdateTopicRequest, parse_resource_id, parse_topic_id, parse_version_number,
    },
};
use arbor_core::{ArborError, Resource, StoreStats, TopicVersion, TopicView, TreeNode};
use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    response::IntoResponse,
};

type ApiResult<T> = Result<T, ApiError>;

// =============================================================================
// HEALTH & STATUS
// =============================================================================

/// Health check endpoint.
pub async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse::default())
}

/// Store-wide counters.
pub async fn status_handler(State(state): State<AppState>) -> Json<StoreStats> {
    let store = state.store.read().await;
    Json(store.stats())
}

// =============================================================================
// TOPICS
// =============================================================================

pub async fn create_topic_handler(
    State(state): State<AppState>,
    body: Result<Json<CreateTopicRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<TopicView>)> {
    let Json(request) = body?;
    request.validate()?;

    let mut store = state.store.write().await;
    let view = match request.parent_id {
        Some(parent) => store.create_child(parent, request.name, request.content)?,
        None => store.create_root(request.name, request.content)?,
    };
    Ok((StatusCode::CREATED, Json(view)))
}

/// List-by-parent. No `parent_id` lists the roots.
pub async fn list_topics_handler(
    State(state): State<AppState>,
    query: Result<Query<ListTopicsQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<TopicView>>> {
    let Query(query) = query?;
    let parent = query.parent()?;

    let store = state.store.read().await;
    Ok(Json(store.list_active_children(parent)))
}

pub async fn get_topic_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<TopicView>> {
    let id = parse_topic_id("id", &id)?;
    let store = state.store.read().await;
    Ok(Json(store.get_active(id)?))
}

/// Append a version. The body must carry at least one field.
pub async fn update_topic_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<UpdateTopicRequest>, JsonRejection>,
) -> ApiResult<Json<TopicView>> {
    let Json(request) = body?;
    let patch = request.into_patch()?;
    let id = parse_topic_id("id", &id)?;

    let mut store = state.store.write().await;
    Ok(Json(store.append_version(id, patch)?))
}

pub async fn delete_topic_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let id = parse_topic_id("id", &id)?;
    let mut store = state.store.write().await;
    if store.soft_delete(id) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ArborError::TopicNotFound(id).into())
    }
}

// =============================================================================
// HISTORY
// =============================================================================

pub async fn list_versions_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Vec<TopicVersion>>> {
    let id = parse_topic_id("id", &id)?;
    let store = state.store.read().await;
    Ok(Json(store.list_versions(id)?))
}

pub async fn get_version_handler(
    State(state): State<AppState>,
    Path((id, version)): Path<(String, String)>,
) -> ApiResult<Json<TopicVersion>> {
    let id = parse_topic_id("id", &id)?;
    let version = parse_version_number(&version)?;
    let store = state.store.read().await;
    Ok(Json(store.get_version(id, version)?))
}

// =============================================================================
// TREE & PATH
// =============================================================================

pub async fn tree_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    query: Result<Query<TreeQuery>, QueryRejection>,
) -> ApiResult<Json<TreeNode>> {
    let Query(query) = query?;
    let id = parse_topic_id("id", &id)?;
    let selector = query.selector()?;

    let store = state.store.read().await;
    Ok(Json(store.build_tree(id, selector, query.include_resources)?))
}

pub async fn shortest_path_handler(
    State(state): State<AppState>,
    query: Result<Query<PathQuery>, QueryRejection>,
) -> ApiResult<Json<PathResponse>> {
    let Query(query) = query?;
    let (from, to) = query.endpoints()?;

    let store = state.store.read().await;
    let path = store.shortest_path(from, to)?;
    Ok(Json(PathResponse { path }))
}

// =============================================================================
// RESOURCES
// =============================================================================

pub async fn create_resource_handler(
    State(state): State<AppState>,
    body: Result<Json<CreateResourceRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Resource>)> {
    let Json(request) = body?;
    let new = request.into_new_resource()?;

    let mut store = state.store.write().await;
    let resource = store.create_resource(new)?;
    Ok((StatusCode::CREATED, Json(resource)))
}

pub async fn list_resources_handler(
    State(state): State<AppState>,
    query: Result<Query<ListResourcesQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<Resource>>> {
    let Query(query) = query?;
    let topic = parse_topic_id("topic_id", &query.topic_id)?;

    let store = state.store.read().await;
    Ok(Json(store.list_resources(topic)?))
}

pub async fn get_resource_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Resource>> {
    let id = parse_resource_id(&id)?;
    let store = state.store.read().await;
    Ok(Json(store.get_resource(id)?))
}

pub async fn update_resource_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<UpdateResourceRequest>, JsonRejection>,
) -> ApiResult<Json<Resource>> {
    let Json(request) = body?;
    let patch = request.into_patch()?;
    let id = parse_resource_id(&id)?;

    let mut store = state.store.write().await;
    Ok(Json(store.update_resource(id, patch)?))
}

pub async fn delete_resource_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let id = parse_resource_id(&id)?;
    let mut store = state.store.write().await;
    if store.delete_resource(id) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ArborError::ResourceNotFound(id).into())
    }
}
