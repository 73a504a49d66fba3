//! Local JWT claim decoding.
//!
//! Only the payload is read. Signatures are verified by the backend on every
//! request, so this is used for expiry checks and display, never for
//! authorization.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Claims carried by a backend access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User id.
    pub sub: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub role: String,
    /// Expiry, seconds since the Unix epoch.
    pub exp: i64,
}

/// A token that could not be decoded.
#[derive(Debug, Error)]
pub enum JwtError {
    #[error("token is not a three-part JWT")]
    Malformed,
    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("invalid claims: {0}")]
    Claims(#[from] serde_json::Error),
}

/// Decode the claims of `token` without verifying its signature.
///
/// # Errors
///
/// Returns [`JwtError`] if the token is not `header.payload.signature` or the
/// payload is not base64url-encoded JSON claims.
pub fn decode_token(token: &str) -> Result<Claims, JwtError> {
    let mut parts = token.split('.');
    let (Some(_header), Some(payload), Some(_signature), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(JwtError::Malformed);
    };

    let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('='))?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// Whether `token` is past its expiry. Undecodable tokens count as expired.
#[must_use]
pub fn is_token_expired(token: &str) -> bool {
    is_expired_at(token, chrono::Utc::now().timestamp())
}

/// Whether `token` had expired at `now` (seconds since the epoch).
#[must_use]
pub fn is_expired_at(token: &str, now: i64) -> bool {
    decode_token(token).map_or(true, |claims| claims.exp < now)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn token(claims: &serde_json::Value) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
        let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
        format!("{header}.{payload}.c2lnbmF0dXJl")
    }

    #[test]
    fn test_decode_claims() {
        let jwt = token(&serde_json::json!({
            "sub": "5b0c3e1a-0000-4000-8000-000000000001",
            "email": "ivan@example.com",
            "role": "authenticated",
            "exp": 1_900_000_000_i64,
            "aud": "authenticated"
        }));
        let claims = decode_token(&jwt).unwrap();
        assert_eq!(claims.email, "ivan@example.com");
        assert_eq!(claims.role, "authenticated");
        assert_eq!(claims.exp, 1_900_000_000);
    }

    #[test]
    fn test_expiry() {
        let jwt = token(&serde_json::json!({"sub": "u", "exp": 1000}));
        assert!(!is_expired_at(&jwt, 999));
        assert!(!is_expired_at(&jwt, 1000));
        assert!(is_expired_at(&jwt, 1001));
    }

    #[test]
    fn test_garbage_counts_as_expired() {
        assert!(is_token_expired("not-a-token"));
        assert!(is_token_expired("a.%%%.c"));
        assert!(is_token_expired(""));
        assert!(matches!(decode_token("a.b"), Err(JwtError::Malformed)));
        assert!(matches!(decode_token("a.b.c.d"), Err(JwtError::Malformed)));
    }

    #[test]
    fn test_missing_exp_is_an_error() {
        let jwt = token(&serde_json::json!({"sub": "u"}));
        assert!(matches!(decode_token(&jwt), Err(JwtError::Claims(_))));
        assert!(is_token_expired(&jwt));
    }
}
