//! Admin account commands.
//!
//! # Usage
//!
//! ```bash
//! # Create a new admin account (sign-up + admin role)
//! aylia-cli admin create -e admin@aylia.dev -p 'a long password'
//!
//! # Grant the admin role to an existing account
//! aylia-cli admin grant 0b6f2c1e-8d4a-4f7e-9c2b-7a1d3e5f9b80
//! ```
//!
//! # Environment Variables
//!
//! - `SUPABASE_URL`, `SUPABASE_ANON_KEY`, `SUPABASE_SERVICE_ROLE_KEY`
//! - `SITE_BASE_URL` - Where confirmation links land (default: `http://localhost:3000`)

use aylia_core::{UserId, Validate};
use aylia_site::db::RoleRepository;
use aylia_site::forms::NewAdminForm;
use aylia_site::services::ProvisioningService;

use super::{CommandError, service_client};

const DEFAULT_BASE_URL: &str = "http://localhost:3000";

/// Create an admin account.
///
/// Applies the same email and password rules as the console form. If the
/// role insert fails after sign-up, the error names the account so it can
/// be fixed with [`grant`].
///
/// # Errors
///
/// Returns an error if the arguments are invalid, the environment is
/// incomplete, or either remote step fails.
pub async fn create(email: &str, password: &str) -> Result<UserId, CommandError> {
    let credentials = NewAdminForm {
        email: email.to_owned(),
        password: password.to_owned(),
    }
    .validate()
    .map_err(|errors| {
        let messages: Vec<String> = errors
            .iter()
            .map(|(field, message)| format!("{field}: {message}"))
            .collect();
        CommandError::InvalidArgument(messages.join(", "))
    })?;

    let base_url = std::env::var("SITE_BASE_URL").unwrap_or_else(|_| {
        tracing::warn!("SITE_BASE_URL not set, using default");
        DEFAULT_BASE_URL.to_owned()
    });
    let redirect_to = format!("{}/", base_url.trim_end_matches('/'));

    let (client, credential) = service_client()?;

    tracing::info!("Creating admin account: {}", credentials.email.as_str());
    let user_id = ProvisioningService::new(&client, &credential)
        .provision(credentials.email.as_str(), &credentials.password, &redirect_to)
        .await?;

    tracing::info!(
        "Admin created successfully! ID: {}, Email: {}",
        user_id,
        credentials.email.as_str()
    );
    tracing::info!("A confirmation email was sent; the account can sign in once confirmed.");

    Ok(user_id)
}

/// Grant the admin role to an existing account.
///
/// # Errors
///
/// Returns an error if `user_id` is not a UUID, the environment is
/// incomplete, or the insert is rejected (including when the role row
/// already exists).
pub async fn grant(user_id: &str) -> Result<(), CommandError> {
    let user_id: UserId = user_id
        .parse()
        .map_err(|_| CommandError::InvalidArgument(format!("not a user id: {user_id}")))?;

    let (client, credential) = service_client()?;

    let roles = RoleRepository::new(&client, &credential);
    if roles.has_admin_role(user_id).await? {
        tracing::info!("{} is already an admin", user_id);
        return Ok(());
    }

    roles.grant_admin(user_id).await?;
    tracing::info!("Granted admin role to {}", user_id);
    Ok(())
}
