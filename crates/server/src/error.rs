//! Unified error handling with Sentry integration.
//!
//! Route handlers return `Result<T, AppError>`. Errors are rendered as
//! `{"error": {"code": "...", "message": "..."}}` with the matching status;
//! server errors are captured to Sentry before responding and their details
//! never reach the client.

use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::catalog::CatalogError;
use crate::db::RepositoryError;
use crate::description_cache::CacheError;
use crate::google_auth::GoogleAuthError;
use crate::openai::NormalizerError;
use crate::services::ServiceError;
use crate::storage::StorageError;

/// Application-level error type for the server.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Google Books lookup failed.
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Redis operation failed.
    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    /// `OpenAI` request failed.
    #[error("Normalizer error: {0}")]
    Normalizer(#[from] NormalizerError),

    /// Upload URL could not be signed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Session store failed.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Google sign-in failed.
    #[error("Google auth error: {0}")]
    GoogleAuth(#[from] GoogleAuthError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// User is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// User lacks permission.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Request conflicts with existing data.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::NotFound(m) => Self::NotFound(m),
            ServiceError::Forbidden(m) => Self::Forbidden(m),
            ServiceError::BadRequest(m) => Self::BadRequest(m),
            ServiceError::Conflict(m) => Self::Conflict(m),
            ServiceError::Repository(RepositoryError::NotFound) => {
                Self::NotFound("Resource not found".to_string())
            }
            ServiceError::Repository(RepositoryError::Conflict(m)) => Self::Conflict(m),
            ServiceError::Repository(e) => Self::Database(e),
            ServiceError::Catalog(CatalogError::NotFound(m)) => Self::NotFound(m),
            ServiceError::Catalog(CatalogError::Malformed(m)) => Self::BadRequest(m),
            ServiceError::Catalog(e) => Self::Catalog(e),
            ServiceError::Cache(e) => Self::Cache(e),
            ServiceError::Normalizer(e) => Self::Normalizer(e),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: ErrorDetail<'a>,
}

#[derive(Serialize)]
struct ErrorDetail<'a> {
    code: &'a str,
    message: String,
}

impl AppError {
    /// Whether this is a server-side failure.
    #[must_use]
    pub const fn is_server_error(&self) -> bool {
        matches!(
            self,
            Self::Database(_)
                | Self::Catalog(_)
                | Self::Cache(_)
                | Self::Normalizer(_)
                | Self::Storage(_)
                | Self::Session(_)
                | Self::GoogleAuth(_)
                | Self::Internal(_)
        )
    }

    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Conflict(_) => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Machine-readable code for the error envelope.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "NOT_FOUND",
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::BadRequest(_) => "BAD_REQUEST",
            Self::Conflict(_) => "CONFLICT",
            _ => "INTERNAL_SERVER_ERROR",
        }
    }

    fn client_message(&self) -> String {
        match self {
            Self::NotFound(m)
            | Self::Unauthorized(m)
            | Self::Forbidden(m)
            | Self::BadRequest(m)
            | Self::Conflict(m) => m.clone(),
            // Don't expose internal error details to clients
            _ => "Internal server error".to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code(),
                message: self.client_message(),
            },
        };

        (self.status(), Json(body)).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from a user ID.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::body::to_bytes;

    use super::*;

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("list 7".to_string());
        assert_eq!(err.to_string(), "Not found: list 7");

        let err = AppError::Conflict("List name already taken!".to_string());
        assert_eq!(err.to_string(), "Conflict: List name already taken!");
    }

    #[test]
    fn test_app_error_status_codes() {
        fn get_status(err: AppError) -> StatusCode {
            err.into_response().status()
        }

        assert_eq!(
            get_status(AppError::NotFound("test".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Unauthorized("test".to_string())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AppError::Forbidden("test".to_string())),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            get_status(AppError::BadRequest("test".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Conflict("test".to_string())),
            StatusCode::CONFLICT
        );
        assert_eq!(
            get_status(AppError::Internal("test".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_service_errors_keep_their_meaning() {
        let err = AppError::from(ServiceError::Repository(RepositoryError::Conflict(
            "taken".to_string(),
        )));
        assert!(matches!(err, AppError::Conflict(ref m) if m == "taken"));

        let err = AppError::from(ServiceError::Catalog(CatalogError::NotFound(
            "No results".to_string(),
        )));
        assert_eq!(err.status(), StatusCode::NOT_FOUND);

        let err = AppError::from(ServiceError::Catalog(CatalogError::Malformed(
            "bad".to_string(),
        )));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);

        let err = AppError::from(ServiceError::Catalog(CatalogError::RateLimited(30)));
        assert!(err.is_server_error());
    }

    #[tokio::test]
    async fn test_error_envelope() {
        let response = AppError::Forbidden("Not your list".to_string()).into_response();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(body["error"]["code"], "FORBIDDEN");
        assert_eq!(body["error"]["message"], "Not your list");
    }

    #[tokio::test]
    async fn test_internal_details_hidden() {
        let response = AppError::Internal("pool exhausted at 10.0.0.3".to_string()).into_response();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(body["error"]["code"], "INTERNAL_SERVER_ERROR");
        assert_eq!(body["error"]["message"], "Internal server error");
    }
}
