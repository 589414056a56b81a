//! Domain types for the AYLIA site.
//!
//! Row shapes for the three remote tables plus the small value types they
//! are built from.

pub mod contact;
pub mod email;
pub mod id;
pub mod project;
pub mod role;
pub mod status;

pub use contact::{ContactMessage, NewContactMessage};
pub use email::{Email, EmailError};
pub use id::*;
pub use project::{FeaturedProject, NewProject, join_tags, parse_tags};
pub use role::UserRole;
pub use status::*;
