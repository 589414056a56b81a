//! Role grant repository.

use tracing::instrument;

use aylia_core::{AppRole, UserId, UserRole};

use super::{RepositoryError, tables};
use crate::supabase::{Credential, SupabaseClient};

/// Repository for `user_roles`.
pub struct RoleRepository<'a> {
    client: &'a SupabaseClient,
    credential: &'a Credential,
}

impl<'a> RoleRepository<'a> {
    /// Create a new repository acting as `credential`.
    #[must_use]
    pub const fn new(client: &'a SupabaseClient, credential: &'a Credential) -> Self {
        Self { client, credential }
    }

    /// Whether `user_id` holds the admin role.
    ///
    /// Only existence matters, so at most one row is fetched; a duplicated
    /// grant still counts.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Remote` if the lookup fails.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn has_admin_role(&self, user_id: UserId) -> Result<bool, RepositoryError> {
        let grant: Option<UserRole> = self
            .client
            .from(tables::USER_ROLES, self.credential)
            .select("user_id,role")
            .eq("user_id", user_id)
            .eq("role", AppRole::Admin)
            .limit(1)
            .maybe_single()
            .await?;
        Ok(grant.is_some())
    }

    /// Grant the admin role to `user_id`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Remote` if the insert is rejected.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn grant_admin(&self, user_id: UserId) -> Result<(), RepositoryError> {
        self.client
            .from(tables::USER_ROLES, self.credential)
            .insert_minimal(&UserRole::admin(user_id))
            .await?;
        Ok(())
    }
}
