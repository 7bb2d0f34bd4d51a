//! # Arbor HTTP API Module
//!
//! HTTP REST API over a shared [`Store`], built on axum.
//!
//! ## Endpoints
//!
//! - `GET /health` - Health check (never authenticated)
//! - `GET /status` - Store statistics
//! - `POST|GET /topics` - Create a topic / list children of a parent
//! - `GET|PATCH|DELETE /topics/{id}` - Read, append a version, soft-delete
//! - `GET /topics/{id}/versions[/{n}]` - Version history
//! - `GET /topics/{id}/tree?version=latest|N&include_resources=bool` - Snapshot
//! - `GET /topics/shortest-path?from=&to=` - Shortest path between topics
//! - `POST|GET /resources`, `GET|PATCH|DELETE /resources/{id}` - Resources
//!
//! Security settings (CORS, rate limit, API key) come from [`ServerConfig`].

mod auth;
mod error;
mod handlers;
mod middleware;
mod types;

pub use auth::ApiKey;
pub use error::ApiError;
pub use middleware::{GlobalRateLimiter, create_rate_limiter};
pub use types::{
    CreateResourceRequest, CreateTopicRequest, ErrorResponse, HealthResponse, ListTopicsQuery,
    PathQuery, PathResponse, TreeQuery, UpdateResourceRequest, UpdateTopicRequest,
    parse_version_number,
};

use crate::config::ServerConfig;
use arbor_core::{ArborError, Store};
use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware as axum_middleware,
    routing::get,
};
use std::sync::Arc;
use tokio::sync::RwLock;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Maximum request body size (2 MB).
const MAX_BODY_SIZE: usize = 2 * 1024 * 1024;

// =============================================================================
// SERVER STATE
// =============================================================================

/// Shared server state containing the store.
#[derive(Clone)]
pub struct AppState {
    /// One lock for the whole store: a write covers every sibling check
    /// and the records it guards.
    pub store: Arc<RwLock<Store>>,
}

impl AppState {
    #[must_use]
    pub fn new(store: Store) -> Self {
        Self {
            store: Arc::new(RwLock::new(store)),
        }
    }
}

// =============================================================================
// CORS CONFIGURATION
// =============================================================================

const CORS_METHODS: [Method; 5] = [
    Method::GET,
    Method::POST,
    Method::PATCH,
    Method::DELETE,
    Method::OPTIONS,
];

/// Build the CORS layer.
///
/// - `None`: localhost only
/// - `["*"]`: every origin (development only)
/// - otherwise the listed origins; if none parse, localhost only
fn build_cors_layer(origins: Option<&[String]>) -> CorsLayer {
    match origins {
        Some([only]) if only == "*" => {
            tracing::warn!("CORS: Allowing ALL origins. This is insecure for production!");
            CorsLayer::permissive()
        }
        Some(origins) => {
            let allowed_origins: Vec<HeaderValue> = origins
                .iter()
                .filter_map(|s| match s.trim().parse::<HeaderValue>() {
                    Ok(hv) => {
                        tracing::info!("CORS: Allowing origin: {}", s.trim());
                        Some(hv)
                    }
                    Err(e) => {
                        tracing::warn!("CORS: Invalid origin '{}': {}", s, e);
                        None
                    }
                })
                .collect();

            if allowed_origins.is_empty() {
                tracing::warn!("CORS: No valid origins configured, defaulting to localhost only");
                build_localhost_cors()
            } else {
                CorsLayer::new()
                    .allow_origin(allowed_origins)
                    .allow_methods(CORS_METHODS)
                    .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
            }
        }
        None => {
            tracing::info!("CORS: No origins configured, defaulting to localhost only");
            build_localhost_cors()
        }
    }
}

fn build_localhost_cors() -> CorsLayer {
    let origins: Vec<HeaderValue> = [
        "http://localhost:3000",
        "http://localhost:8080",
        "http://127.0.0.1:3000",
        "http://127.0.0.1:8080",
    ]
    .iter()
    .filter_map(|o| o.parse::<HeaderValue>().ok())
    .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(CORS_METHODS)
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

// =============================================================================
// ROUTER CREATION
// =============================================================================

/// Create the axum router with all endpoints and middleware.
///
/// Middleware stack (outer to inner):
/// 1. Tracing - logs all requests
/// 2. CORS - handles preflight requests
/// 3. Rate Limiting - if `rate_limit > 0`
/// 4. Authentication - if an API key is configured
pub fn create_router(state: AppState, config: &ServerConfig) -> Router {
    let mut router = Router::new()
        .route("/health", get(handlers::health_handler))
        .route("/status", get(handlers::status_handler))
        .route(
            "/topics",
            get(handlers::list_topics_handler).post(handlers::create_topic_handler),
        )
        .route(
            "/topics/shortest-path",
            get(handlers::shortest_path_handler),
        )
        .route(
            "/topics/{id}",
            get(handlers::get_topic_handler)
                .patch(handlers::update_topic_handler)
                .delete(handlers::delete_topic_handler),
        )
        .route(
            "/topics/{id}/versions",
            get(handlers::list_versions_handler),
        )
        .route(
            "/topics/{id}/versions/{version}",
            get(handlers::get_version_handler),
        )
        .route("/topics/{id}/tree", get(handlers::tree_handler))
        .route(
            "/resources",
            get(handlers::list_resources_handler).post(handlers::create_resource_handler),
        )
        .route(
            "/resources/{id}",
            get(handlers::get_resource_handler)
                .patch(handlers::update_resource_handler)
                .delete(handlers::delete_resource_handler),
        );

    match config.api_key() {
        Some(key) => {
            tracing::info!("API key authentication enabled");
            router = router.layer(axum_middleware::from_fn_with_state(
                ApiKey::new(key),
                auth::api_key_auth_middleware,
            ));
        }
        None => {
            tracing::warn!(
                "API key authentication DISABLED - all endpoints are publicly accessible! \
                 Set ARBOR_API_KEY to enable authentication."
            );
        }
    }

    if config.rate_limit > 0 {
        tracing::info!("Rate limiting enabled: {} requests/second", config.rate_limit);
        router = router.layer(axum_middleware::from_fn_with_state(
            create_rate_limiter(config.rate_limit),
            middleware::rate_limit_middleware,
        ));
    } else {
        tracing::info!("Rate limiting disabled");
    }

    router
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(build_cors_layer(config.cors_origins.as_deref()))
                .layer(axum::extract::DefaultBodyLimit::max(MAX_BODY_SIZE)),
        )
        .with_state(state)
}

// =============================================================================
// SERVER STARTUP
// =============================================================================

/// Bind and serve until the process is stopped.
pub async fn run_server(config: &ServerConfig, store: Store) -> Result<(), ArborError> {
    let router = create_router(AppState::new(store), config);
    let addr = config.addr();

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| ArborError::Io(format!("Bind failed: {}", e)))?;

    tracing::info!("Arbor HTTP server listening on {}", addr);

    axum::serve(listener, router)
        .await
        .map_err(|e| ArborError::Io(format!("Server error: {}", e)))
}
