//! HTTP middleware for admin.
//!
//! The console has no sessions: every request carries the caller's access
//! token as a bearer token and is checked against the admin flag.

pub mod auth;

pub use auth::{RequireAdmin, bearer_token};
