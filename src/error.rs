//! Error types for the board backend
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the cache layer and the handlers built on it.
#[derive(Error, Debug)]
pub enum CacheError {
    /// A domain value could not be encoded into a cache payload
    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The backing store is unavailable or rejected the operation
    #[error("Backing store error: {0}")]
    BackingStore(String),

    /// Requested record does not exist in the backing store
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Client address is on the ban list
    #[error("Banned: {0}")]
    Banned(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
            CacheError::BackingStore(_) => StatusCode::SERVICE_UNAVAILABLE,
            CacheError::NotFound(_) => StatusCode::NOT_FOUND,
            CacheError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            CacheError::Banned(_) => StatusCode::FORBIDDEN,
            CacheError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the board backend.
pub type Result<T> = std::result::Result<T, CacheError>;
