//! Session-related types.
//!
//! Types stored in the session for authentication state.

use serde::{Deserialize, Serialize};

use bazaar_core::{Email, UserId};
use bazaar_supabase::Session as AuthSession;

/// Session-stored user identity and backend tokens.
///
/// The access token is forwarded on every backend request so row-level
/// security sees the user; the refresh token renews it when it expires.
#[derive(Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    /// Auth user id (shared with the profile row).
    pub id: UserId,
    /// User's email address.
    pub email: Email,
    /// Backend access token (JWT).
    pub access_token: String,
    /// Backend refresh token.
    pub refresh_token: String,
    /// Cached `profiles.is_admin` at login time.
    #[serde(default)]
    pub is_admin: bool,
}

impl CurrentUser {
    /// Replace the tokens after a refresh.
    pub fn update_tokens(&mut self, session: &AuthSession) {
        self.access_token.clone_from(&session.access_token);
        self.refresh_token.clone_from(&session.refresh_token);
    }
}

impl std::fmt::Debug for CurrentUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CurrentUser")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .field("is_admin", &self.is_admin)
            .finish()
    }
}

/// Session keys.
pub mod keys {
    /// Key for storing the current logged-in user.
    pub const CURRENT_USER: &str = "current_user";

    /// Key for the shopping cart.
    pub const CART: &str = "cart";

    /// Key for the favorites container.
    pub const FAVORITES: &str = "favorites";

    /// Key for the chat container.
    pub const CHAT: &str = "chat";
}
