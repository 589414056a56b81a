//! Admin account provisioning.
//!
//! Provisioning is two remote calls with nothing tying them together: the
//! account is created through the auth API, then an `admin` role row is
//! inserted for it. If the second call fails the account exists without the
//! role. That case is logged with the account id and can be repaired with
//! `aylia-cli admin grant <user_id>`.

use serde_json::json;
use thiserror::Error;
use tracing::instrument;

use aylia_core::UserId;

use crate::db::{RepositoryError, RoleRepository};
use crate::supabase::{Credential, SupabaseClient, SupabaseError};

/// Errors from provisioning an admin.
#[derive(Debug, Error)]
pub enum ProvisionError {
    /// The auth service refused to create the account.
    #[error("sign-up failed: {0}")]
    SignUp(#[source] SupabaseError),

    /// The account was created but the role row was not.
    #[error("account {user_id} created without admin role: {source}")]
    RoleAssignment {
        user_id: UserId,
        #[source]
        source: RepositoryError,
    },
}

impl ProvisionError {
    /// Account left without the admin role, if any.
    #[must_use]
    pub const fn orphaned_user(&self) -> Option<UserId> {
        match self {
            Self::RoleAssignment { user_id, .. } => Some(*user_id),
            Self::SignUp(_) => None,
        }
    }
}

/// Creates admin accounts.
pub struct ProvisioningService<'a> {
    client: &'a SupabaseClient,
    credential: &'a Credential,
}

impl<'a> ProvisioningService<'a> {
    /// `credential` must be allowed to insert into `user_roles`: an admin's
    /// access token or the service role.
    #[must_use]
    pub const fn new(client: &'a SupabaseClient, credential: &'a Credential) -> Self {
        Self { client, credential }
    }

    /// Sign up `email` and grant the new account the admin role.
    ///
    /// `redirect_to` is where the confirmation link lands.
    ///
    /// # Errors
    ///
    /// Returns `ProvisionError::SignUp` if the account could not be created
    /// (no role row is attempted), or `ProvisionError::RoleAssignment` if
    /// the account exists but the role insert failed.
    #[instrument(skip(self, password))]
    pub async fn provision(
        &self,
        email: &str,
        password: &str,
        redirect_to: &str,
    ) -> Result<UserId, ProvisionError> {
        let outcome = self
            .client
            .auth()
            .sign_up(email, password, redirect_to, json!({}))
            .await
            .map_err(ProvisionError::SignUp)?;
        let user_id = outcome.user().id;

        if let Err(source) = RoleRepository::new(self.client, self.credential)
            .grant_admin(user_id)
            .await
        {
            tracing::error!(
                user_id = %user_id,
                error = %source,
                "Admin account created without role row; grant it manually"
            );
            return Err(ProvisionError::RoleAssignment { user_id, source });
        }

        tracing::info!(user_id = %user_id, "Provisioned admin account");
        Ok(user_id)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::config::SupabaseConfig;

    const USER_ID: &str = "3c9e1a7b-5d2f-4e8a-b6c4-1f0d9e8a7b6c";

    fn client_for(server: &MockServer) -> SupabaseClient {
        SupabaseClient::new(&SupabaseConfig {
            url: server.uri(),
            anon_key: "anon-key".to_string(),
            service_role_key: None,
            request_timeout: crate::config::DEFAULT_REQUEST_TIMEOUT,
        })
        .unwrap()
    }

    async fn mount_sign_up(server: &MockServer) {
        Mock::given(method("POST"))
            .and(path("/auth/v1/signup"))
            .and(query_param("redirect_to", "https://aylia.dev/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": USER_ID,
                "email": "new@aylia.dev",
                "user_metadata": {}
            })))
            .expect(1)
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_provision_signs_up_then_grants_role() {
        let server = MockServer::start().await;
        mount_sign_up(&server).await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/user_roles"))
            .and(header("authorization", "Bearer admin-token"))
            .and(body_json(json!({"user_id": USER_ID, "role": "admin"})))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let credential = Credential::User("admin-token".to_string());
        let user_id = ProvisioningService::new(&client, &credential)
            .provision("new@aylia.dev", "secret123", "https://aylia.dev/")
            .await
            .unwrap();

        assert_eq!(user_id.to_string(), USER_ID);
    }

    #[tokio::test]
    async fn test_failed_sign_up_skips_role_insert() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/v1/signup"))
            .respond_with(
                ResponseTemplate::new(422).set_body_json(json!({"msg": "User already registered"})),
            )
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/user_roles"))
            .respond_with(ResponseTemplate::new(201))
            .expect(0)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let credential = Credential::User("admin-token".to_string());
        let err = ProvisioningService::new(&client, &credential)
            .provision("new@aylia.dev", "secret123", "https://aylia.dev/")
            .await
            .unwrap_err();

        assert!(matches!(err, ProvisionError::SignUp(_)));
        assert!(err.orphaned_user().is_none());
    }

    #[tokio::test]
    async fn test_failed_role_insert_reports_orphan() {
        let server = MockServer::start().await;
        mount_sign_up(&server).await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/user_roles"))
            .respond_with(ResponseTemplate::new(403).set_body_json(json!({
                "code": "42501",
                "message": "new row violates row-level security policy"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let credential = Credential::User("admin-token".to_string());
        let err = ProvisioningService::new(&client, &credential)
            .provision("new@aylia.dev", "secret123", "https://aylia.dev/")
            .await
            .unwrap_err();

        assert_eq!(err.orphaned_user().unwrap().to_string(), USER_ID);
    }
}
