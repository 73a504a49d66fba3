//! HTTP routes for admin.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                              - Health check
//!
//! # Product status endpoint (CORS, bearer token)
//! POST    /functions/v1/admin-product       - Set a listing's status
//! OPTIONS /functions/v1/admin-product       - Preflight
//!
//! # Console (bearer token of an admin)
//! GET  /api/admin/users | /products | /reports | /categories
//! POST /api/admin/users/{id}/status         - {action: suspend|ban|activate}
//! POST /api/admin/products/{id}/status      - {action: delete|restore}
//! POST /api/admin/reports/{id}/status       - {action: resolve|dismiss}
//! POST /api/admin/categories                - Create
//! PUT  /api/admin/categories/{id}           - Rename
//! DELETE /api/admin/categories/{id}         - Delete
//! ```

pub mod console;
pub mod function;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::state::AppState;

pub use function::function_routes;

/// Create the console router.
pub fn console_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(console::users))
        .route("/users/{id}/status", post(console::user_status))
        .route("/products", get(console::products))
        .route("/products/{id}/status", post(console::product_status))
        .route("/reports", get(console::reports))
        .route("/reports/{id}/status", post(console::report_status))
        .route(
            "/categories",
            get(console::categories).post(console::create_category),
        )
        .route(
            "/categories/{id}",
            put(console::update_category).delete(console::delete_category),
        )
}

/// Create all admin routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(function_routes())
        .nest("/api/admin", console_routes())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Method, Request, StatusCode, header};
    use bazaar_core::{ProductStatus, UserStatus};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use super::*;
    use crate::testing::{ADMIN_TOKEN, FakeBackend, USER_TOKEN, config};

    async fn send(
        state: AppState,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<serde_json::Value>,
    ) -> (StatusCode, serde_json::Value) {
        let mut request = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            request = request.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let body = match body {
            Some(json) => {
                request = request.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = routes()
            .with_state(state)
            .oneshot(request.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_console_requires_token() {
        let (backend, _, _) = FakeBackend::with_users();
        let (status, json) = send(backend.into_state(), Method::GET, "/api/admin/users", None, None).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(json["success"], false);
    }

    #[tokio::test]
    async fn test_console_rejects_non_admin() {
        let (backend, _, _) = FakeBackend::with_users();
        let (status, json) = send(
            backend.into_state(),
            Method::GET,
            "/api/admin/users",
            Some(USER_TOKEN),
            None,
        )
        .await;

        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(json["error"], "Unauthorized - Admin access required");
    }

    #[tokio::test]
    async fn test_admin_lists_users() {
        let (backend, _, _) = FakeBackend::with_users();
        let (status, json) = send(
            backend.into_state(),
            Method::GET,
            "/api/admin/users",
            Some(ADMIN_TOKEN),
            None,
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["success"], true);
        assert_eq!(json["data"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_ban_user() {
        let (backend, _, user) = FakeBackend::with_users();
        let backend = Arc::new(backend);
        let state = AppState::with_backend(config(), backend.clone());

        let (status, json) = send(
            state,
            Method::POST,
            &format!("/api/admin/users/{user}/status"),
            Some(ADMIN_TOKEN),
            Some(serde_json::json!({"action": "ban"})),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["status"], "banned");
        let profiles = backend.profiles.lock().unwrap();
        let banned = profiles.iter().find(|p| p.id == user).unwrap();
        assert_eq!(banned.status, UserStatus::Banned);
    }

    #[tokio::test]
    async fn test_unknown_action_is_bad_request() {
        let (backend, _, user) = FakeBackend::with_users();
        let (status, json) = send(
            backend.into_state(),
            Method::POST,
            &format!("/api/admin/users/{user}/status"),
            Some(ADMIN_TOKEN),
            Some(serde_json::json!({"action": "promote"})),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            json["error"],
            "invalid user action value 'promote'. Must be one of: suspend, ban, activate"
        );
    }

    #[tokio::test]
    async fn test_restore_product_sets_active() {
        let (backend, _, seller) = FakeBackend::with_users();
        let product_id = backend.add_product(seller);
        backend.products.lock().unwrap()[0].status = ProductStatus::Deleted;
        let backend = Arc::new(backend);
        let state = AppState::with_backend(config(), backend.clone());

        let (status, _) = send(
            state,
            Method::POST,
            &format!("/api/admin/products/{product_id}/status"),
            Some(ADMIN_TOKEN),
            Some(serde_json::json!({"action": "restore"})),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(backend.product_status(product_id), Some(ProductStatus::Active));
    }

    #[tokio::test]
    async fn test_missing_product_is_not_found() {
        let (backend, _, _) = FakeBackend::with_users();
        let (status, json) = send(
            backend.into_state(),
            Method::POST,
            &format!("/api/admin/products/{}/status", bazaar_core::ProductId::random()),
            Some(ADMIN_TOKEN),
            Some(serde_json::json!({"action": "delete"})),
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"], "Product not found");
    }

    #[tokio::test]
    async fn test_category_lifecycle() {
        let (backend, _, _) = FakeBackend::with_users();
        let backend = Arc::new(backend);
        let state = AppState::with_backend(config(), backend.clone());

        let (status, json) = send(
            state.clone(),
            Method::POST,
            "/api/admin/categories",
            Some(ADMIN_TOKEN),
            Some(serde_json::json!({"name": "Home Goods"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["slug"], "home-goods");
        let id = json["data"]["id"].as_str().unwrap().to_string();

        let (status, json) = send(
            state.clone(),
            Method::PUT,
            &format!("/api/admin/categories/{id}"),
            Some(ADMIN_TOKEN),
            Some(serde_json::json!({"name": "Garden  Tools", "description": "Outdoor"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["slug"], "garden-tools");
        assert_eq!(json["data"]["description"], "Outdoor");

        let (status, _) = send(
            state,
            Method::DELETE,
            &format!("/api/admin/categories/{id}"),
            Some(ADMIN_TOKEN),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(backend.categories.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_category_is_conflict() {
        let (backend, _, _) = FakeBackend::with_users();
        let state = backend.into_state();
        let body = serde_json::json!({"name": "Books"});

        let (status, _) = send(
            state.clone(),
            Method::POST,
            "/api/admin/categories",
            Some(ADMIN_TOKEN),
            Some(body.clone()),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, json) = send(
            state,
            Method::POST,
            "/api/admin/categories",
            Some(ADMIN_TOKEN),
            Some(body),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(json["error"], "Already exists");
    }

    #[tokio::test]
    async fn test_blank_category_name_is_bad_request() {
        let (backend, _, _) = FakeBackend::with_users();
        let (status, json) = send(
            backend.into_state(),
            Method::POST,
            "/api/admin/categories",
            Some(ADMIN_TOKEN),
            Some(serde_json::json!({"name": "   "})),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "Category name cannot be empty");
    }
}
