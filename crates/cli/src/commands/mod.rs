//! Command implementations.

pub mod admin;
pub mod seed;

use aylia_site::config::{ConfigError, SupabaseConfig};
use aylia_site::db::RepositoryError;
use aylia_site::services::ProvisionError;
use aylia_site::supabase::{Credential, SupabaseClient, SupabaseError};
use thiserror::Error;

/// Errors shared by every command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Environment is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Client could not be built or a call failed.
    #[error("Remote service error: {0}")]
    Remote(#[from] SupabaseError),

    /// Table operation failed.
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    /// Admin provisioning failed.
    #[error(transparent)]
    Provision(#[from] ProvisionError),

    /// Argument did not validate.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// Client and service-role credential from the environment.
///
/// The service role bypasses row-level security, so commands run without
/// anyone being signed in.
pub fn service_client() -> Result<(SupabaseClient, Credential), CommandError> {
    let config = SupabaseConfig::from_env()?;
    let key = config
        .service_role_key
        .clone()
        .ok_or_else(|| ConfigError::MissingEnvVar("SUPABASE_SERVICE_ROLE_KEY".to_string()))?;
    let client = SupabaseClient::new(&config)?;
    Ok((client, Credential::ServiceRole(key)))
}
