//! # API Errors
//!
//! The one place where store errors become HTTP statuses.

use super::types::ErrorResponse;
use arbor_core::ArborError;
use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};

/// An [`ArborError`] on its way to the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError(pub ArborError);

impl ApiError {
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            err if err.is_not_found() => StatusCode::NOT_FOUND,
            ArborError::DuplicateSiblingName(_) => StatusCode::CONFLICT,
            ArborError::Validation(_)
            | ArborError::InvalidVersionSelector(_)
            | ArborError::Serialization(_) => StatusCode::BAD_REQUEST,
            ArborError::NoPath { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ArborError> for ApiError {
    fn from(err: ArborError) -> Self {
        Self(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(ArborError::Validation(rejection.body_text()))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self(ArborError::Validation(rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(code = self.0.code(), error = %self.0, "request failed");
        } else {
            tracing::debug!(code = self.0.code(), error = %self.0, "request rejected");
        }
        (status, Json(ErrorResponse::from(&self.0))).into_response()
    }
}
