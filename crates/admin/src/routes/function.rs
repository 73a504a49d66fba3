//! Product status endpoint.
//!
//! `POST /functions/v1/admin-product` with `{"productId", "status"}` sets a
//! listing's status on behalf of an admin. The storefront calls it when an
//! admin deletes a listing. Every response, errors and preflight included,
//! carries permissive CORS headers.

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
    routing::post,
};
use bazaar_core::{ProductId, ProductStatus};
use bazaar_supabase::SupabaseError;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tower_http::set_header::SetResponseHeaderLayer;
use tracing::{error, info, instrument, warn};

use crate::backend::ProductRecord;
use crate::middleware::bearer_token;
use crate::state::AppState;

/// Route of the endpoint.
pub const FUNCTION_PATH: &str = "/functions/v1/admin-product";

/// Why a status change was refused.
#[derive(Debug, Error)]
pub enum FunctionError {
    #[error("Missing Authorization header")]
    MissingAuthorization,

    #[error("User not found")]
    UserNotFound,

    #[error("Unauthorized - Admin access required")]
    NotAdmin,

    #[error("Invalid request body")]
    InvalidBody,

    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Invalid status value. Must be one of: {0}")]
    InvalidStatus(String),

    #[error("Product not found")]
    ProductNotFound,

    #[error("Backend error: {0}")]
    Backend(#[from] SupabaseError),
}

impl FunctionError {
    const fn status(&self) -> StatusCode {
        match self {
            Self::MissingAuthorization | Self::InvalidBody | Self::MissingField(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::UserNotFound | Self::NotAdmin => StatusCode::FORBIDDEN,
            Self::InvalidStatus(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::ProductNotFound => StatusCode::NOT_FOUND,
            Self::Backend(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for FunctionError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if matches!(self, Self::Backend(_)) {
            let event_id = sentry::capture_error(&self);
            error!(error = %self, sentry_event_id = %event_id, "Status endpoint failed");
            "An unexpected error occurred".to_string()
        } else {
            self.to_string()
        };

        let body = serde_json::json!({
            "success": false,
            "error": message,
        });
        (status, Json(body)).into_response()
    }
}

/// Request body. Fields are optional so their absence can be reported by
/// name.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StatusRequest {
    #[serde(default)]
    product_id: Option<String>,
    #[serde(default)]
    status: Option<String>,
}

/// Success envelope with the updated row.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub success: bool,
    pub data: ProductRecord,
}

/// Create the endpoint router with its CORS headers.
pub fn function_routes() -> Router<AppState> {
    Router::new()
        .route(FUNCTION_PATH, post(admin_product).options(preflight))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static("POST, OPTIONS"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static("Content-Type, Authorization"),
        ))
}

/// CORS preflight.
async fn preflight() -> StatusCode {
    StatusCode::OK
}

/// Set a listing's status.
///
/// Checks run in order: header present, token valid, caller is admin, body
/// fields present, status allowed, listing exists.
#[instrument(skip_all)]
pub async fn admin_product(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<StatusResponse>, FunctionError> {
    if !headers.contains_key(header::AUTHORIZATION) {
        return Err(FunctionError::MissingAuthorization);
    }
    // A header without a bearer token names no user.
    let token = bearer_token(&headers).ok_or(FunctionError::UserNotFound)?;

    let backend = state.backend();
    let user_id = backend
        .user_for_token(token)
        .await?
        .ok_or(FunctionError::UserNotFound)?;
    if !backend.is_admin(user_id).await? {
        warn!(user_id = %user_id, "Non-admin status change attempt");
        return Err(FunctionError::NotAdmin);
    }

    let (product_id, status) = parse_request(&body)?;

    let product = backend
        .set_product_status(product_id, status)
        .await?
        .ok_or(FunctionError::ProductNotFound)?;

    info!(admin_id = %user_id, product_id = %product_id, status = %status, "Product status changed");
    Ok(Json(StatusResponse {
        success: true,
        data: product,
    }))
}

/// Validate the body. An id that is not a UUID cannot name a listing.
fn parse_request(body: &[u8]) -> Result<(ProductId, ProductStatus), FunctionError> {
    let request: StatusRequest = if body.is_empty() {
        StatusRequest::default()
    } else {
        serde_json::from_slice(body).map_err(|_| FunctionError::InvalidBody)?
    };

    let product_id = request
        .product_id
        .filter(|id| !id.is_empty())
        .ok_or(FunctionError::MissingField("productId"))?;
    let status = request
        .status
        .filter(|s| !s.is_empty())
        .ok_or(FunctionError::MissingField("status"))?;

    let status = status
        .parse::<ProductStatus>()
        .map_err(|_| FunctionError::InvalidStatus(ProductStatus::allowed_values()))?;
    let product_id = product_id
        .parse::<ProductId>()
        .map_err(|_| FunctionError::ProductNotFound)?;

    Ok((product_id, status))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::body::Body;
    use axum::http::{Method, Request};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use super::*;
    use crate::testing::{ADMIN_TOKEN, FakeBackend, USER_TOKEN};

    async fn call(
        state: AppState,
        token: Option<&str>,
        body: &str,
    ) -> (StatusCode, HeaderMap, serde_json::Value) {
        let authorization = token.map(|token| format!("Bearer {token}"));
        call_with_header(state, authorization.as_deref(), body).await
    }

    async fn call_with_header(
        state: AppState,
        authorization: Option<&str>,
        body: &str,
    ) -> (StatusCode, HeaderMap, serde_json::Value) {
        let mut request = Request::builder()
            .method(Method::POST)
            .uri(FUNCTION_PATH)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(value) = authorization {
            request = request.header(header::AUTHORIZATION, value);
        }
        let response = function_routes()
            .with_state(state)
            .oneshot(request.body(Body::from(body.to_string())).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, headers, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_preflight_returns_cors_headers() {
        let (backend, _, _) = FakeBackend::with_users();
        let response = function_routes()
            .with_state(backend.into_state())
            .oneshot(
                Request::builder()
                    .method(Method::OPTIONS)
                    .uri(FUNCTION_PATH)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let headers = response.headers();
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_METHODS], "POST, OPTIONS");
        assert_eq!(
            headers[header::ACCESS_CONTROL_ALLOW_HEADERS],
            "Content-Type, Authorization"
        );
    }

    #[tokio::test]
    async fn test_admin_sets_status() {
        let (backend, _, seller) = FakeBackend::with_users();
        let product_id = backend.add_product(seller);
        let backend = std::sync::Arc::new(backend);
        let state = AppState::with_backend(crate::testing::config(), backend.clone());

        let (status, headers, json) = call(
            state,
            Some(ADMIN_TOKEN),
            &format!(r#"{{"productId":"{product_id}","status":"deleted"}}"#),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert_eq!(json["success"], true);
        assert_eq!(json["data"]["id"], product_id.to_string());
        assert_eq!(json["data"]["status"], "deleted");
        assert_eq!(json["data"]["title"], "Велосипед");
        assert_eq!(json["data"]["description"], "Почти новый");
        assert!(json["data"]["category_id"].is_string());
        assert!(json["data"].get("seller").is_none());
        assert_eq!(
            backend.product_status(product_id),
            Some(ProductStatus::Deleted)
        );
    }

    #[tokio::test]
    async fn test_missing_authorization_is_bad_request() {
        let (backend, _, _) = FakeBackend::with_users();
        let (status, headers, json) = call(
            backend.into_state(),
            None,
            r#"{"productId":"x","status":"sold"}"#,
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "Missing Authorization header");
    }

    #[tokio::test]
    async fn test_unknown_token_is_forbidden() {
        let (backend, _, _) = FakeBackend::with_users();
        let (status, _, json) = call(
            backend.into_state(),
            Some("stolen"),
            r#"{"productId":"x","status":"sold"}"#,
        )
        .await;

        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(json["error"], "User not found");
    }

    #[tokio::test]
    async fn test_non_admin_is_forbidden() {
        let (backend, _, seller) = FakeBackend::with_users();
        let product_id = backend.add_product(seller);
        let (status, _, json) = call(
            backend.into_state(),
            Some(USER_TOKEN),
            &format!(r#"{{"productId":"{product_id}","status":"deleted"}}"#),
        )
        .await;

        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(json["error"], "Unauthorized - Admin access required");
    }

    #[tokio::test]
    async fn test_missing_fields_are_named() {
        let (backend, _, _) = FakeBackend::with_users();
        let state = backend.into_state();

        let (status, _, json) = call(state.clone(), Some(ADMIN_TOKEN), r#"{"status":"sold"}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "Missing required field: productId");

        let (status, _, json) = call(
            state,
            Some(ADMIN_TOKEN),
            &format!(r#"{{"productId":"{}"}}"#, ProductId::random()),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "Missing required field: status");
    }

    #[tokio::test]
    async fn test_invalid_status_is_unprocessable() {
        let (backend, _, _) = FakeBackend::with_users();
        let (status, _, json) = call(
            backend.into_state(),
            Some(ADMIN_TOKEN),
            &format!(r#"{{"productId":"{}","status":"archived"}}"#, ProductId::random()),
        )
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            json["error"],
            "Invalid status value. Must be one of: active, deleted, sold"
        );
    }

    #[tokio::test]
    async fn test_unknown_product_is_not_found() {
        let (backend, _, _) = FakeBackend::with_users();
        let (status, _, json) = call(
            backend.into_state(),
            Some(ADMIN_TOKEN),
            &format!(r#"{{"productId":"{}","status":"sold"}}"#, ProductId::random()),
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"], "Product not found");
    }

    #[tokio::test]
    async fn test_malformed_product_id_is_not_found() {
        let (backend, _, _) = FakeBackend::with_users();
        let (status, _, json) = call(
            backend.into_state(),
            Some(ADMIN_TOKEN),
            r#"{"productId":"not-a-uuid","status":"sold"}"#,
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"], "Product not found");
    }

    #[tokio::test]
    async fn test_authorization_without_bearer_is_forbidden() {
        let body = format!(r#"{{"productId":"{}","status":"sold"}}"#, ProductId::random());

        for value in ["some-raw-token", "Basic abc", "Bearer "] {
            let (backend, _, _) = FakeBackend::with_users();
            let (status, headers, json) =
                call_with_header(backend.into_state(), Some(value), &body).await;
            assert_eq!(status, StatusCode::FORBIDDEN, "header {value:?}");
            assert_eq!(json["error"], "User not found");
            assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        }
    }

    #[tokio::test]
    async fn test_backend_failure_hides_details() {
        let (mut backend, _, seller) = FakeBackend::with_users();
        let product_id = backend.add_product(seller);
        backend.failing = true;

        let (status, _, json) = call(
            backend.into_state(),
            Some(ADMIN_TOKEN),
            &format!(r#"{{"productId":"{product_id}","status":"sold"}}"#),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["error"], "An unexpected error occurred");
    }

    #[test]
    fn test_parse_request_rejects_malformed_body() {
        assert!(matches!(
            parse_request(b"not json"),
            Err(FunctionError::InvalidBody)
        ));
        assert!(matches!(
            parse_request(b""),
            Err(FunctionError::MissingField("productId"))
        ));
    }
}
