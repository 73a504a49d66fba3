//! CLI command implementations.
//!
//! Every command talks to the backend with the service role key through
//! [`SupabaseAdminBackend`].

pub mod admin;
pub mod categories;
pub mod product;

use bazaar_admin::backend::SupabaseAdminBackend;
use bazaar_core::{InvalidValue, ParseIdError};
use bazaar_supabase::{SupabaseClient, SupabaseError};
use secrecy::SecretString;
use thiserror::Error;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CliError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Backend request failed.
    #[error("Backend error: {0}")]
    Backend(#[from] SupabaseError),

    /// Argument is not a valid ID.
    #[error("Invalid ID: {0}")]
    InvalidId(#[from] ParseIdError),

    /// Argument is not an allowed value.
    #[error("{0}")]
    InvalidValue(#[from] InvalidValue),

    /// Seed file could not be read.
    #[error("Could not read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    /// Seed file is not valid YAML.
    #[error("Invalid seed file: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Seed file content is unusable.
    #[error("Invalid seed file: {0}")]
    InvalidSeed(String),

    /// Target row does not exist.
    #[error("{0} not found: {1}")]
    NotFound(&'static str, String),
}

/// Connect with `SUPABASE_URL` and `SUPABASE_SERVICE_ROLE_KEY`.
///
/// # Errors
///
/// Returns an error if either variable is missing or the URL is invalid.
pub fn connect() -> Result<SupabaseAdminBackend, CliError> {
    dotenvy::dotenv().ok();

    let url = std::env::var("SUPABASE_URL").map_err(|_| CliError::MissingEnvVar("SUPABASE_URL"))?;
    let key = std::env::var("SUPABASE_SERVICE_ROLE_KEY")
        .map(SecretString::from)
        .map_err(|_| CliError::MissingEnvVar("SUPABASE_SERVICE_ROLE_KEY"))?;

    Ok(SupabaseAdminBackend::new(SupabaseClient::new(&url, key)?))
}
