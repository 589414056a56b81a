//! Business logic services for the site.
//!
//! # Services
//!
//! - `session` - Resolve who is signed in and whether they hold the admin role
//! - `provisioning` - Create admin accounts (sign-up, then role grant)

pub mod provisioning;
pub mod session;

pub use provisioning::{ProvisionError, ProvisioningService};
pub use session::{AuthEvent, SessionResolver};
