//! Table access for the remote data service.
//!
//! # Tables
//!
//! - `featured_projects` - Portfolio entries; readable by anyone, writable by admins
//! - `contact_messages` - Inquiries; insertable by anyone, readable/writable by admins
//! - `user_roles` - Role grants; a user is admin iff a `role = 'admin'` row exists
//!
//! Each repository is bound to the caller's [`Credential`], so row-level
//! security on the service decides what a request may see or change.
//!
//! [`Credential`]: crate::supabase::Credential

pub mod messages;
pub mod projects;
pub mod roles;

use thiserror::Error;

use crate::supabase::SupabaseError;

pub use messages::MessageRepository;
pub use projects::ProjectRepository;
pub use roles::RoleRepository;

/// Table names.
pub mod tables {
    pub const CONTACT_MESSAGES: &str = "contact_messages";
    pub const FEATURED_PROJECTS: &str = "featured_projects";
    pub const USER_ROLES: &str = "user_roles";
}

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Remote service call failed.
    #[error("remote error: {0}")]
    Remote(#[from] SupabaseError),

    /// Requested row was not found (or row-level security hid it).
    #[error("not found")]
    NotFound,
}

/// Take the single row a by-id mutation returns.
fn single_affected<T>(rows: Vec<T>) -> Result<T, RepositoryError> {
    rows.into_iter().next().ok_or(RepositoryError::NotFound)
}
