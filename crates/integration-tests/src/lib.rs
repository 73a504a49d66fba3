//! Integration tests for Bazaar.
//!
//! The tests talk to running servers over HTTP and are `#[ignore]`d by
//! default.
//!
//! # Running Tests
//!
//! ```bash
//! cargo run -p bazaar-storefront &
//! cargo run -p bazaar-admin &
//! cargo test -p bazaar-integration-tests -- --ignored
//! ```
//!
//! # Environment Variables
//!
//! - `STOREFRONT_BASE_URL` - default `http://localhost:3000`
//! - `ADMIN_BASE_URL` - default `http://localhost:3001`
//! - `TEST_USER_EMAIL`, `TEST_USER_PASSWORD` - a confirmed test account
//! - `TEST_ADMIN_TOKEN` - access token of an admin account

use reqwest::{Client, Response};
use serde_json::Value;

/// Base URL for the storefront API.
#[must_use]
pub fn storefront_url() -> String {
    std::env::var("STOREFRONT_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

/// Base URL for the admin API.
#[must_use]
pub fn admin_url() -> String {
    std::env::var("ADMIN_BASE_URL").unwrap_or_else(|_| "http://localhost:3001".to_string())
}

/// A client that keeps the session cookie between requests.
///
/// # Panics
///
/// Panics if the HTTP client cannot be built.
#[must_use]
pub fn session_client() -> Client {
    Client::builder()
        .cookie_store(true)
        .build()
        .expect("Failed to create HTTP client")
}

/// Read an environment variable the test cannot run without.
///
/// # Panics
///
/// Panics with the variable name if it is unset.
#[must_use]
pub fn require_env(key: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| panic!("{key} must be set for this test"))
}

/// Sign the client's session in as the test user.
///
/// # Panics
///
/// Panics if the request fails or the credentials are rejected.
pub async fn sign_in(client: &Client) {
    let resp = client
        .post(format!("{}/api/auth/login", storefront_url()))
        .json(&serde_json::json!({
            "email": require_env("TEST_USER_EMAIL"),
            "password": require_env("TEST_USER_PASSWORD"),
        }))
        .send()
        .await
        .expect("Failed to send login request");
    assert!(resp.status().is_success(), "login failed: {}", resp.status());
}

/// Decode a response body as JSON.
///
/// # Panics
///
/// Panics if the body is not JSON.
pub async fn json(resp: Response) -> Value {
    resp.json().await.expect("Response body is not JSON")
}
