//! Client for the Bazaar backend.
//!
//! The marketplace keeps no database of its own. Auth, row-level security,
//! relational data and file storage all live in a Supabase-style platform
//! reached over HTTP:
//!
//! - `/rest/v1/<table>`: PostgREST data API ([`Table`])
//! - `/auth/v1/*`: GoTrue identity provider ([`AuthClient`])
//! - `/storage/v1/object/*`: object storage ([`StorageClient`])
//! - `/functions/v1/*`: server functions ([`FunctionsClient`])
//!
//! Every request carries the project key in the `apikey` header and a bearer
//! token: the caller's access token when one is given, otherwise the project
//! key itself.
//!
//! # Example
//!
//! ```rust,ignore
//! use bazaar_supabase::SupabaseClient;
//!
//! let client = SupabaseClient::new(&config.supabase_url, config.anon_key.clone())?;
//!
//! let products: Vec<serde_json::Value> = client
//!     .table("products")
//!     .select("*")
//!     .eq("status", "active")
//!     .order("created_at", false)
//!     .fetch()
//!     .await?;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

mod auth;
mod functions;
pub mod jwt;
mod rest;
mod storage;

use std::sync::Arc;

use reqwest::{Method, RequestBuilder, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use thiserror::Error;
use url::Url;

pub use auth::{AuthClient, AuthUser, Session};
pub use functions::FunctionsClient;
pub use jwt::{Claims, JwtError, decode_token, is_token_expired};
pub use rest::Table;
pub use storage::StorageClient;

/// Postgres error code for a unique constraint violation.
pub const UNIQUE_VIOLATION: &str = "23505";

/// PostgREST error code for "single row requested, none returned".
pub const NO_ROWS: &str = "PGRST116";

/// Errors that can occur when talking to the backend.
#[derive(Debug, Error)]
pub enum SupabaseError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Endpoint URL could not be built.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The backend answered with an error body.
    #[error("API error ({status}): {message}")]
    Api {
        status: u16,
        code: Option<String>,
        message: String,
    },

    /// No row matched a single-row request.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Missing, invalid or expired token.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Rate limited by the backend.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),
}

impl SupabaseError {
    /// Whether this is a Postgres unique-constraint violation.
    #[must_use]
    pub fn is_unique_violation(&self) -> bool {
        self.code() == Some(UNIQUE_VIOLATION)
    }

    /// Whether the requested row does not exist.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Backend error code (Postgres SQLSTATE, PostgREST or GoTrue code).
    #[must_use]
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Api { code, .. } => code.as_deref(),
            _ => None,
        }
    }

    /// HTTP status the backend answered with, when there was one.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::NotFound(_) => Some(StatusCode::NOT_FOUND.as_u16()),
            Self::Unauthorized(_) => Some(StatusCode::UNAUTHORIZED.as_u16()),
            Self::RateLimited(_) => Some(StatusCode::TOO_MANY_REQUESTS.as_u16()),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            Self::Url(_) | Self::Parse(_) => None,
        }
    }

    /// Classify a non-success response.
    fn from_response(status: StatusCode, body: &str) -> Self {
        let parsed: ApiErrorBody = serde_json::from_str(body).unwrap_or_default();
        let code = parsed.code();
        let message = parsed
            .message()
            .unwrap_or_else(|| body.chars().take(200).collect());

        match status {
            StatusCode::UNAUTHORIZED => Self::Unauthorized(message),
            StatusCode::NOT_FOUND => Self::NotFound(message),
            StatusCode::NOT_ACCEPTABLE if code.as_deref() == Some(NO_ROWS) => {
                Self::NotFound(message)
            }
            _ => Self::Api {
                status: status.as_u16(),
                code,
                message,
            },
        }
    }
}

/// Union of the error shapes used by the backend's services.
///
/// PostgREST sends `{code, message, details, hint}`; GoTrue uses `msg`,
/// `error_description` or `error`, sometimes with a numeric `code` and a
/// symbolic `error_code`.
#[derive(Debug, Default, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    code: Option<serde_json::Value>,
    #[serde(default)]
    error_code: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
    #[serde(default)]
    error: Option<serde_json::Value>,
}

impl ApiErrorBody {
    fn code(&self) -> Option<String> {
        if let Some(code) = &self.error_code {
            return Some(code.clone());
        }
        match self.code.as_ref()? {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    fn message(self) -> Option<String> {
        self.message
            .or(self.msg)
            .or(self.error_description)
            .or_else(|| match self.error? {
                serde_json::Value::String(s) => Some(s),
                other => Some(other.to_string()),
            })
    }
}

// =============================================================================
// SupabaseClient
// =============================================================================

/// Shared backend client.
///
/// Cheap to clone: the HTTP connection pool and key sit behind an `Arc`.
#[derive(Clone)]
pub struct SupabaseClient {
    inner: Arc<SupabaseClientInner>,
}

struct SupabaseClientInner {
    http: reqwest::Client,
    base_url: Url,
    api_key: SecretString,
}

impl std::fmt::Debug for SupabaseClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SupabaseClient")
            .field("base_url", &self.inner.base_url.as_str())
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

impl SupabaseClient {
    /// Create a client for the project at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`SupabaseError::Url`] if `base_url` is not an absolute URL.
    pub fn new(base_url: &str, api_key: SecretString) -> Result<Self, SupabaseError> {
        Self::with_http_client(reqwest::Client::new(), base_url, api_key)
    }

    /// Create a client reusing an existing connection pool.
    ///
    /// # Errors
    ///
    /// Returns [`SupabaseError::Url`] if `base_url` is not an absolute URL.
    pub fn with_http_client(
        http: reqwest::Client,
        base_url: &str,
        api_key: SecretString,
    ) -> Result<Self, SupabaseError> {
        // Trailing slash so that `join` appends instead of replacing the last segment
        let base_url = Url::parse(&format!("{}/", base_url.trim_end_matches('/')))?;
        Ok(Self {
            inner: Arc::new(SupabaseClientInner {
                http,
                base_url,
                api_key,
            }),
        })
    }

    /// Project base URL.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Query builder for a table or view.
    #[must_use]
    pub fn table(&self, name: &str) -> Table {
        Table::new(self.clone(), name)
    }

    /// Identity provider endpoints.
    #[must_use]
    pub fn auth(&self) -> AuthClient {
        AuthClient::new(self.clone())
    }

    /// Object storage for one bucket.
    #[must_use]
    pub fn storage(&self, bucket: &str) -> StorageClient {
        StorageClient::new(self.clone(), bucket)
    }

    /// Server function invocation.
    #[must_use]
    pub fn functions(&self) -> FunctionsClient {
        FunctionsClient::new(self.clone())
    }

    pub(crate) fn endpoint(&self, path: &str) -> Result<Url, SupabaseError> {
        Ok(self.inner.base_url.join(path)?)
    }

    /// Start a request with the project key and bearer headers set.
    pub(crate) fn request(&self, method: Method, url: Url, bearer: Option<&str>) -> RequestBuilder {
        let key = self.inner.api_key.expose_secret();
        self.inner
            .http
            .request(method, url)
            .header("apikey", key)
            .bearer_auth(bearer.unwrap_or(key))
    }
}

/// Read a response body, turning non-success statuses into errors.
pub(crate) async fn read_body(response: reqwest::Response) -> Result<String, SupabaseError> {
    let status = response.status();

    if status == StatusCode::TOO_MANY_REQUESTS {
        let retry_after = response
            .headers()
            .get("Retry-After")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(1);
        return Err(SupabaseError::RateLimited(retry_after));
    }

    let text = response.text().await?;

    if status.is_success() {
        return Ok(text);
    }

    tracing::debug!(
        status = %status,
        body = %text.chars().take(500).collect::<String>(),
        "Backend returned non-success status"
    );
    Err(SupabaseError::from_response(status, &text))
}

/// Parse a JSON body, logging the payload when it does not match.
pub(crate) fn parse_json<T: serde::de::DeserializeOwned>(text: &str) -> Result<T, SupabaseError> {
    serde_json::from_str(text).map_err(|e| {
        tracing::error!(
            error = %e,
            body = %text.chars().take(500).collect::<String>(),
            "Failed to parse backend response"
        );
        SupabaseError::Parse(e)
    })
}
