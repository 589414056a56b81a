//! AYLIA Core - Shared types library.
//!
//! This crate provides the types used by every AYLIA component:
//! - `site` - Public landing page, sign-in, and the admin console
//! - `cli` - Operator commands for provisioning admins and seeding projects
//!
//! # Architecture
//!
//! The core crate contains only types, validation rules, and traits. No I/O,
//! no HTTP clients. Both binaries validate input the same way because the
//! rules live here.
//!
//! # Modules
//!
//! - [`types`] - Row types, newtype IDs, emails, and statuses
//! - [`validation`] - Field-level form checks

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;
pub mod validation;

pub use types::*;
pub use validation::{FieldErrors, Validate};
