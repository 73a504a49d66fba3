//! GoTrue identity provider endpoints.

use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use tracing::instrument;
use uuid::Uuid;

use crate::{SupabaseClient, SupabaseError, parse_json, read_body};

/// An authenticated session issued by the identity provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default)]
    pub expires_at: Option<i64>,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub user: Option<AuthUser>,
}

/// Identity provider user record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: Uuid,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub email_confirmed_at: Option<DateTime<Utc>>,
}

#[derive(Serialize)]
struct PasswordCredentials<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct RefreshGrant<'a> {
    refresh_token: &'a str,
}

/// Sign-in, sign-up and token endpoints under `/auth/v1`.
#[derive(Clone)]
pub struct AuthClient {
    client: SupabaseClient,
}

impl AuthClient {
    pub(crate) const fn new(client: SupabaseClient) -> Self {
        Self { client }
    }

    async fn token_grant<B: Serialize + Sync>(
        &self,
        grant_type: &str,
        body: &B,
    ) -> Result<Session, SupabaseError> {
        let mut url = self.client.endpoint("auth/v1/token")?;
        url.query_pairs_mut().append_pair("grant_type", grant_type);

        let response = self
            .client
            .request(Method::POST, url, None)
            .json(body)
            .send()
            .await?;
        parse_json(&read_body(response).await?)
    }

    /// Exchange email and password for a session.
    ///
    /// # Errors
    ///
    /// Returns [`SupabaseError::Api`] with the provider's message for bad
    /// credentials.
    #[instrument(skip(self, password))]
    pub async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, SupabaseError> {
        self.token_grant("password", &PasswordCredentials { email, password })
            .await
    }

    /// Register a new account.
    ///
    /// Returns `None` when the project requires email confirmation: the user
    /// exists but no session is issued until the link is followed.
    ///
    /// # Errors
    ///
    /// Returns [`SupabaseError::Api`] with the provider's message, e.g. for an
    /// already registered email.
    #[instrument(skip(self, password))]
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<Session>, SupabaseError> {
        let url = self.client.endpoint("auth/v1/signup")?;
        let response = self
            .client
            .request(Method::POST, url, None)
            .json(&PasswordCredentials { email, password })
            .send()
            .await?;
        let body: serde_json::Value = parse_json(&read_body(response).await?)?;
        session_from_signup(body)
    }

    /// Trade a refresh token for a new session.
    ///
    /// # Errors
    ///
    /// Returns an error if the refresh token is invalid or already used.
    #[instrument(skip_all)]
    pub async fn refresh_session(&self, refresh_token: &str) -> Result<Session, SupabaseError> {
        self.token_grant("refresh_token", &RefreshGrant { refresh_token })
            .await
    }

    /// Revoke the session owning `access_token`.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider rejects the token.
    #[instrument(skip_all)]
    pub async fn sign_out(&self, access_token: &str) -> Result<(), SupabaseError> {
        let url = self.client.endpoint("auth/v1/logout")?;
        let response = self
            .client
            .request(Method::POST, url, Some(access_token))
            .send()
            .await?;
        read_body(response).await.map(drop)
    }

    /// The user owning `access_token`.
    ///
    /// # Errors
    ///
    /// Returns [`SupabaseError::Unauthorized`] (or an API error) for invalid
    /// or expired tokens.
    #[instrument(skip_all)]
    pub async fn get_user(&self, access_token: &str) -> Result<AuthUser, SupabaseError> {
        let url = self.client.endpoint("auth/v1/user")?;
        let response = self
            .client
            .request(Method::GET, url, Some(access_token))
            .send()
            .await?;
        parse_json(&read_body(response).await?)
    }
}

/// The sign-up endpoint answers with a session when the account is usable
/// right away and with a bare user while confirmation is pending.
fn session_from_signup(body: serde_json::Value) -> Result<Option<Session>, SupabaseError> {
    if body.get("access_token").is_some() {
        Ok(Some(serde_json::from_value(body)?))
    } else {
        Ok(None)
    }
}
