//! Authentication error types.

use bazaar_supabase::SupabaseError;
use thiserror::Error;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] bazaar_core::EmailError),

    /// Wrong email or password.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// An account with this email already exists.
    #[error("user already exists")]
    UserAlreadyExists,

    /// Password too weak or invalid.
    #[error("password validation failed: {0}")]
    WeakPassword(String),

    /// The account exists but the email link has not been followed yet.
    #[error("email not confirmed")]
    EmailNotConfirmed,

    /// Refresh token rejected; the user has to sign in again.
    #[error("session expired")]
    SessionExpired,

    /// Token does not carry a usable user id.
    #[error("invalid token")]
    InvalidToken,

    /// Any other rejection from the identity provider, with its message.
    #[error("{0}")]
    Provider(String),

    /// Backend request failed.
    #[error("backend error: {0}")]
    Backend(#[from] SupabaseError),
}

impl AuthError {
    /// Classify an identity provider error.
    pub(crate) fn from_provider(err: SupabaseError) -> Self {
        let code = err.code().map(str::to_owned);
        match (code.as_deref(), err) {
            (Some("invalid_credentials"), _) => Self::InvalidCredentials,
            (Some("user_already_exists" | "email_exists"), _) => Self::UserAlreadyExists,
            (Some("email_not_confirmed"), _) => Self::EmailNotConfirmed,
            (Some("weak_password"), SupabaseError::Api { message, .. }) => {
                Self::WeakPassword(message)
            }
            (_, err) => Self::from_status(err),
        }
    }

    fn from_status(err: SupabaseError) -> Self {
        match err {
            SupabaseError::Api {
                status: 400 | 422,
                message,
                ..
            } => Self::Provider(message),
            other => Self::Backend(other),
        }
    }

    /// Classify an error from the password grant. Older providers answer bad
    /// credentials with a plain 400.
    pub(crate) fn from_sign_in(err: SupabaseError) -> Self {
        match Self::from_provider(err) {
            Self::Provider(_) | Self::Backend(SupabaseError::Unauthorized(_)) => {
                Self::InvalidCredentials
            }
            other => other,
        }
    }

    /// Classify an error from the refresh grant.
    pub(crate) fn from_refresh(err: SupabaseError) -> Self {
        match Self::from_provider(err) {
            Self::Provider(_) | Self::Backend(SupabaseError::Unauthorized(_)) => {
                Self::SessionExpired
            }
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api(status: u16, code: Option<&str>, message: &str) -> SupabaseError {
        SupabaseError::Api {
            status,
            code: code.map(str::to_string),
            message: message.to_string(),
        }
    }

    #[test]
    fn test_symbolic_codes() {
        assert!(matches!(
            AuthError::from_provider(api(422, Some("user_already_exists"), "taken")),
            AuthError::UserAlreadyExists
        ));
        assert!(matches!(
            AuthError::from_provider(api(422, Some("weak_password"), "Password should be at least 6 characters")),
            AuthError::WeakPassword(ref m) if m.contains("6 characters")
        ));
        assert!(matches!(
            AuthError::from_provider(api(400, Some("email_not_confirmed"), "Email not confirmed")),
            AuthError::EmailNotConfirmed
        ));
    }

    #[test]
    fn test_plain_400_on_sign_in_is_bad_credentials() {
        assert!(matches!(
            AuthError::from_sign_in(api(400, None, "Invalid login credentials")),
            AuthError::InvalidCredentials
        ));
    }

    #[test]
    fn test_refresh_rejection_expires_session() {
        assert!(matches!(
            AuthError::from_refresh(api(400, None, "Invalid Refresh Token: Already Used")),
            AuthError::SessionExpired
        ));
    }

    #[test]
    fn test_server_errors_stay_backend() {
        assert!(matches!(
            AuthError::from_sign_in(api(500, None, "boom")),
            AuthError::Backend(_)
        ));
    }
}
