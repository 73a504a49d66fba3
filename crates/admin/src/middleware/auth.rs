//! Admin authentication extractor.

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, header::AUTHORIZATION, request::Parts},
};
use bazaar_core::UserId;
use tracing::warn;

use crate::error::{AdminError, set_sentry_user};
use crate::state::AppState;

/// Extractor that requires a bearer token belonging to an admin.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAdmin(admin_id): RequireAdmin,
/// ) -> impl IntoResponse {
///     format!("Hello, {admin_id}!")
/// }
/// ```
pub struct RequireAdmin(pub UserId);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AdminError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)
            .ok_or_else(|| AdminError::Unauthorized("Authentication required".to_string()))?;

        let backend = state.backend();
        let user_id = backend
            .user_for_token(token)
            .await?
            .ok_or_else(|| AdminError::Unauthorized("Invalid or expired token".to_string()))?;

        if !backend.is_admin(user_id).await? {
            warn!(user_id = %user_id, path = %parts.uri.path(), "Non-admin console access");
            return Err(AdminError::Forbidden(
                "Unauthorized - Admin access required".to_string(),
            ));
        }

        set_sentry_user(&user_id);
        Ok(Self(user_id))
    }
}

/// The token from an `Authorization: Bearer <token>` header.
#[must_use]
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?.trim();
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_bearer_token_parsed() {
        assert_eq!(bearer_token(&headers("Bearer abc.def")), Some("abc.def"));
        assert_eq!(bearer_token(&headers("bearer  abc")), Some("abc"));
    }

    #[test]
    fn test_bearer_token_rejects_other_schemes() {
        assert_eq!(bearer_token(&headers("Basic dXNlcjpwYXNz")), None);
        assert_eq!(bearer_token(&headers("Bearer")), None);
        assert_eq!(bearer_token(&headers("Bearer   ")), None);
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }
}
