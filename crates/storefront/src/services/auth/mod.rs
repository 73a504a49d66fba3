//! Authentication service.
//!
//! Credentials are exchanged with the backend's identity provider; this
//! service validates input, turns provider sessions into the session-held
//! [`CurrentUser`], and looks up the caller's profile.

mod error;

pub use error::AuthError;

use bazaar_core::models::Profile;
use bazaar_core::{Email, UserId};
use bazaar_supabase::{Claims, JwtError, Session, SupabaseClient};
use serde::Deserialize;
use tracing::instrument;

use crate::models::CurrentUser;

/// Minimum password length accepted by the identity provider.
const MIN_PASSWORD_LENGTH: usize = 6;

/// Authentication service.
pub struct AuthService<'a> {
    client: &'a SupabaseClient,
}

#[derive(Debug, Deserialize)]
struct AdminFlag {
    #[serde(default)]
    is_admin: bool,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(client: &'a SupabaseClient) -> Self {
        Self { client }
    }

    /// Sign in with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` for a malformed email and
    /// `AuthError::InvalidCredentials` when the provider rejects the pair.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<CurrentUser, AuthError> {
        let email = Email::parse(email)?;
        let session = self
            .client
            .auth()
            .sign_in_with_password(email.as_str(), password)
            .await
            .map_err(AuthError::from_sign_in)?;
        self.current_user_from(email, session).await
    }

    /// Register a new account.
    ///
    /// Returns `None` when the account still needs email confirmation.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail`, `AuthError::WeakPassword` or
    /// `AuthError::UserAlreadyExists`.
    #[instrument(skip(self, password))]
    pub async fn register(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<CurrentUser>, AuthError> {
        let email = Email::parse(email)?;
        validate_password(password)?;

        let session = self
            .client
            .auth()
            .sign_up(email.as_str(), password)
            .await
            .map_err(AuthError::from_provider)?;

        match session {
            Some(session) => Ok(Some(self.current_user_from(email, session).await?)),
            None => Ok(None),
        }
    }

    /// Revoke the user's session with the provider.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider rejects the token.
    #[instrument(skip_all, fields(user_id = %user.id))]
    pub async fn logout(&self, user: &CurrentUser) -> Result<(), AuthError> {
        self.client
            .auth()
            .sign_out(&user.access_token)
            .await
            .map_err(AuthError::from_provider)
    }

    /// Trade a refresh token for new tokens.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::SessionExpired` if the refresh token is no longer
    /// valid.
    #[instrument(skip_all)]
    pub async fn refresh(&self, refresh_token: &str) -> Result<Session, AuthError> {
        self.client
            .auth()
            .refresh_session(refresh_token)
            .await
            .map_err(AuthError::from_refresh)
    }

    /// The identity provider's record for `access_token`.
    ///
    /// # Errors
    ///
    /// Returns an error for invalid or expired tokens.
    #[instrument(skip_all)]
    pub async fn current_user(
        &self,
        access_token: &str,
    ) -> Result<bazaar_supabase::AuthUser, AuthError> {
        Ok(self.client.auth().get_user(access_token).await?)
    }

    /// The profile row of `user_id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the profile does not exist.
    #[instrument(skip(self))]
    pub async fn profile(&self, user_id: UserId) -> Result<Profile, AuthError> {
        Ok(self
            .client
            .table("profiles")
            .select("*")
            .eq("id", user_id)
            .fetch_one()
            .await?)
    }

    async fn current_user_from(
        &self,
        email: Email,
        session: Session,
    ) -> Result<CurrentUser, AuthError> {
        let id = match &session.user {
            Some(user) => UserId::new(user.id),
            None => decode_token(&session.access_token)
                .ok()
                .and_then(|claims| claims.sub.parse().ok())
                .ok_or(AuthError::InvalidToken)?,
        };

        // A missing profile row just means "not an admin"
        let admin: Option<AdminFlag> = self
            .client
            .table("profiles")
            .auth(&session.access_token)
            .select("is_admin")
            .eq("id", id)
            .fetch_optional()
            .await?;

        Ok(CurrentUser {
            id,
            email,
            access_token: session.access_token,
            refresh_token: session.refresh_token,
            is_admin: admin.is_some_and(|a| a.is_admin),
        })
    }
}

/// Decode the claims of an access token without verifying it.
///
/// # Errors
///
/// Returns an error if the token is not a JWT.
pub fn decode_token(token: &str) -> Result<Claims, JwtError> {
    bazaar_supabase::decode_token(token)
}

/// Whether an access token is expired (undecodable tokens count as expired).
#[must_use]
pub fn is_token_expired(token: &str) -> bool {
    bazaar_supabase::is_token_expired(token)
}

/// Validate password requirements.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    if password.trim().is_empty() {
        return Err(AuthError::WeakPassword(
            "Password cannot be blank".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_password_too_short() {
        assert!(matches!(
            validate_password("12345"),
            Err(AuthError::WeakPassword(_))
        ));
    }

    #[test]
    fn test_validate_password_blank() {
        assert!(validate_password("        ").is_err());
    }

    #[test]
    fn test_validate_password_counts_characters() {
        assert!(validate_password("пароль").is_ok());
        assert!(validate_password("secret-enough").is_ok());
    }

    #[test]
    fn test_is_token_expired_for_garbage() {
        assert!(is_token_expired("garbage"));
        assert!(decode_token("garbage").is_err());
    }
}
