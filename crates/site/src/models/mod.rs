//! Domain models for the site.
//!
//! Row types live in `aylia_core`; this module holds what the server keeps
//! in its own session store.

pub mod session;

pub use session::{AuthSession, Flash, FlashKind, Viewer, keys as session_keys};
