//! Error taxonomy for the auth service
//!
//! Expected outcomes (`UserExists`, `UserNotFound`, `TokenExpired`,
//! `InvalidToken`) are distinct variants so callers can branch on them
//! without exception-style control flow. Dependency failures surface as
//! 500-class errors and never masquerade as a success value.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum AuthError {
    /// Registration conflict: a user with this login already exists.
    #[error("User {0} already exists")]
    UserExists(String),

    /// Unknown login or wrong password. Both collapse to the same
    /// message so the response does not leak which part failed.
    #[error("User with the provided details not found")]
    UserNotFound,

    /// The token decoded correctly but its `exp` claim has passed.
    #[error("Token has expired")]
    TokenExpired,

    /// Bad signature, malformed payload, or otherwise unparseable token.
    #[error("Invalid token")]
    InvalidToken,

    /// Uploaded file has an extension outside the image whitelist.
    #[error("Invalid image format {0}")]
    WrongImageFormat(String),

    /// Uploaded file name is too short or has no extension.
    #[error("File name is too short or the file has no extension")]
    BadFileName,

    /// Request payload failed schema validation.
    #[error("{0}")]
    Validation(String),

    #[error("database error")]
    Database(#[from] sqlx::Error),

    #[error("token cache error")]
    Cache(#[from] redis::RedisError),

    #[error("message queue error: {0}")]
    Queue(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AuthError {
    fn status_code(&self) -> StatusCode {
        match self {
            AuthError::UserExists(_)
            | AuthError::WrongImageFormat(_)
            | AuthError::BadFileName => StatusCode::BAD_REQUEST,
            AuthError::UserNotFound => StatusCode::NOT_FOUND,
            AuthError::TokenExpired | AuthError::InvalidToken => StatusCode::UNAUTHORIZED,
            AuthError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AuthError::Database(_)
            | AuthError::Cache(_)
            | AuthError::Queue(_)
            | AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let detail = if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!(error = %self, "request failed");
            "Internal server error".to_string()
        } else {
            self.to_string()
        };
        (status, Json(json!({ "detail": detail }))).into_response()
    }
}
