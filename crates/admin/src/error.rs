//! Unified error handling for admin.
//!
//! Console routes answer `{"success": false, "error": "<message>"}` on
//! failure. The product-status endpoint has its own error type in
//! [`crate::routes::function`].

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use bazaar_supabase::SupabaseError;
use thiserror::Error;

/// Application-level error type for the admin console.
#[derive(Debug, Error)]
pub enum AdminError {
    /// Backend operation failed.
    #[error("Backend error: {0}")]
    Backend(#[from] SupabaseError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Caller is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Caller is not an admin.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AdminError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Backend(err) if err.is_unique_violation() => StatusCode::CONFLICT,
            Self::Backend(SupabaseError::NotFound(_)) | Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Backend(_) => StatusCode::BAD_GATEWAY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for AdminError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Admin request error"
            );
        }

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Backend(_) if status == StatusCode::CONFLICT => "Already exists".to_string(),
            Self::Backend(_) if status == StatusCode::NOT_FOUND => "Not found".to_string(),
            Self::Backend(_) => "External service error".to_string(),
            Self::Internal(_) => "Internal server error".to_string(),
            Self::NotFound(msg)
            | Self::Unauthorized(msg)
            | Self::Forbidden(msg)
            | Self::BadRequest(msg) => msg.clone(),
        };

        let body = serde_json::json!({
            "success": false,
            "error": message,
        });
        (status, Json(body)).into_response()
    }
}

/// Result type alias for `AdminError`.
pub type Result<T> = std::result::Result<T, AdminError>;

/// Set the Sentry user context for the calling admin.
pub fn set_sentry_user(admin_id: &impl ToString) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(admin_id.to_string()),
            ..Default::default()
        }));
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get_status(err: AdminError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_admin_error_display() {
        let err = AdminError::NotFound("category-123".to_string());
        assert_eq!(err.to_string(), "Not found: category-123");

        let err = AdminError::BadRequest("invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: invalid input");
    }

    #[test]
    fn test_admin_error_status_codes() {
        assert_eq!(
            get_status(AdminError::NotFound("test".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AdminError::Unauthorized("test".to_string())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AdminError::Forbidden("test".to_string())),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            get_status(AdminError::BadRequest("test".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AdminError::Internal("test".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_backend_error_status_codes() {
        assert_eq!(
            get_status(AdminError::Backend(SupabaseError::Api {
                status: 409,
                code: Some("23505".to_string()),
                message: "duplicate key value".to_string(),
            })),
            StatusCode::CONFLICT
        );
        assert_eq!(
            get_status(AdminError::Backend(SupabaseError::NotFound("gone".to_string()))),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AdminError::Backend(SupabaseError::Api {
                status: 500,
                code: None,
                message: "boom".to_string(),
            })),
            StatusCode::BAD_GATEWAY
        );
    }
}
