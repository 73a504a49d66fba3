//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers should return `Result<T, AppError>`.
//! Every error renders as `{"success": false, "error": "<message>"}`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use bazaar_supabase::SupabaseError;
use thiserror::Error;

use crate::services::ServiceError;
use crate::services::auth::AuthError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Data-access operation failed.
    #[error("Service error: {0}")]
    Service(#[from] ServiceError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Session store failed.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// User is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// User may not perform this action.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Request conflicts with existing data.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Rate limited.
    #[error("Rate limited")]
    RateLimited,

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Service(err) => service_status(err),
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials
                | AuthError::SessionExpired
                | AuthError::InvalidToken => StatusCode::UNAUTHORIZED,
                AuthError::UserAlreadyExists => StatusCode::CONFLICT,
                AuthError::EmailNotConfirmed => StatusCode::FORBIDDEN,
                AuthError::WeakPassword(_) | AuthError::InvalidEmail(_) | AuthError::Provider(_) => {
                    StatusCode::BAD_REQUEST
                }
                AuthError::Backend(err) => backend_status(err),
            },
            Self::Session(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,
        }
    }

    // Don't expose internal error details to clients
    fn message(&self) -> String {
        match self {
            Self::Service(err) => match err {
                ServiceError::Backend(err) => backend_message(err),
                other => other.to_string(),
            },
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials => "Invalid credentials".to_string(),
                AuthError::UserAlreadyExists => {
                    "An account with this email already exists".to_string()
                }
                AuthError::WeakPassword(msg) | AuthError::Provider(msg) => msg.clone(),
                AuthError::InvalidEmail(_) => "Invalid email address".to_string(),
                AuthError::EmailNotConfirmed => "Please confirm your email first".to_string(),
                AuthError::SessionExpired | AuthError::InvalidToken => {
                    "Session expired, please sign in again".to_string()
                }
                AuthError::Backend(err) => backend_message(err),
            },
            Self::Session(_) | Self::Internal(_) => "Internal server error".to_string(),
            Self::NotFound(msg)
            | Self::Unauthorized(msg)
            | Self::Forbidden(msg)
            | Self::BadRequest(msg)
            | Self::Conflict(msg) => msg.clone(),
            Self::RateLimited => "Too many requests, please try again later".to_string(),
        }
    }
}

fn service_status(err: &ServiceError) -> StatusCode {
    match err {
        ServiceError::Backend(err) => backend_status(err),
        ServiceError::Validation(_) | ServiceError::BadRequest(_) => StatusCode::BAD_REQUEST,
        ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
        ServiceError::Forbidden(_) => StatusCode::FORBIDDEN,
        ServiceError::Conflict(_) => StatusCode::CONFLICT,
    }
}

fn backend_status(err: &SupabaseError) -> StatusCode {
    match err {
        SupabaseError::NotFound(_) => StatusCode::NOT_FOUND,
        SupabaseError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        SupabaseError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
        SupabaseError::Api { status: 403, .. } => StatusCode::FORBIDDEN,
        _ if err.is_unique_violation() => StatusCode::CONFLICT,
        _ => StatusCode::BAD_GATEWAY,
    }
}

fn backend_message(err: &SupabaseError) -> String {
    match backend_status(err) {
        StatusCode::NOT_FOUND => "Not found".to_string(),
        StatusCode::UNAUTHORIZED => "Session expired, please sign in again".to_string(),
        StatusCode::TOO_MANY_REQUESTS => "Too many requests, please try again later".to_string(),
        StatusCode::FORBIDDEN => "Access denied".to_string(),
        StatusCode::CONFLICT => "Already exists".to_string(),
        _ => "External service error".to_string(),
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Capture server errors to Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let body = serde_json::json!({
            "success": false,
            "error": self.message(),
        });
        (status, Json(body)).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from a user ID.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Call this on logout to stop associating errors with the user.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use bazaar_core::validation::ValidationError;
    use http_body_util::BodyExt;

    use super::*;

    fn get_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("product-123".to_string());
        assert_eq!(err.to_string(), "Not found: product-123");

        let err = AppError::BadRequest("invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: invalid input");
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            get_status(AppError::NotFound("test".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Unauthorized("test".to_string())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AppError::BadRequest("test".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::RateLimited),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            get_status(AppError::Internal("test".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_service_error_status_codes() {
        assert_eq!(
            get_status(ServiceError::NotFound("Product").into()),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(ServiceError::Forbidden("no".to_string()).into()),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            get_status(ServiceError::Conflict("dup".to_string()).into()),
            StatusCode::CONFLICT
        );
        assert_eq!(
            get_status(ServiceError::Validation(ValidationError::TooManyImages).into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(ServiceError::Backend(SupabaseError::RateLimited(3)).into()),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            get_status(
                ServiceError::Backend(SupabaseError::Api {
                    status: 500,
                    code: None,
                    message: "boom".to_string(),
                })
                .into()
            ),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_auth_error_status_codes() {
        assert_eq!(
            get_status(AuthError::InvalidCredentials.into()),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AuthError::UserAlreadyExists.into()),
            StatusCode::CONFLICT
        );
        assert_eq!(
            get_status(AuthError::WeakPassword("short".to_string()).into()),
            StatusCode::BAD_REQUEST
        );
    }

    #[tokio::test]
    async fn test_error_envelope_hides_backend_details() {
        let err: AppError = ServiceError::Backend(SupabaseError::Api {
            status: 500,
            code: Some("XX000".to_string()),
            message: "relation \"secret_table\" does not exist".to_string(),
        })
        .into();

        let body = err.into_response().into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();

        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "External service error");
    }

    #[tokio::test]
    async fn test_error_envelope_carries_conflict_message() {
        let err: AppError = ServiceError::Conflict(
            crate::services::reports::DUPLICATE_REPORT.to_string(),
        )
        .into();

        let body = err.into_response().into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();

        assert_eq!(json["error"], crate::services::reports::DUPLICATE_REPORT);
    }
}
