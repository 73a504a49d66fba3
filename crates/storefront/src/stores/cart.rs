//! Session-held shopping cart.

use bazaar_core::Cart;
use tower_sessions::Session;

use crate::models::session_keys;

/// The visitor's cart, empty if none was saved yet.
///
/// # Errors
///
/// Returns an error if the session store fails.
pub async fn get_cart(session: &Session) -> Result<Cart, tower_sessions::session::Error> {
    super::load(session, session_keys::CART).await
}

/// Persist the visitor's cart.
///
/// # Errors
///
/// Returns an error if the session store fails.
pub async fn set_cart(session: &Session, cart: &Cart) -> Result<(), tower_sessions::session::Error> {
    super::save(session, session_keys::CART, cart).await
}
