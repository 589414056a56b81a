//! HTTP middleware stack for the site.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layers (hub per request, capture errors)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//! 4. Session layer (tower-sessions, signed cookie, expiring in-memory store)
//! 5. Security headers (CSP, frame denial, etc.)
//! 6. Rate limiting on anonymous write routes (governor)

pub mod auth;
pub mod rate_limit;
pub mod request_id;
pub mod security_headers;
pub mod session;
pub mod session_store;

pub use auth::{
    AdminContext, AdminRejection, OptionalViewer, RequireAdmin, clear_viewer, set_flash,
    set_viewer, take_flash,
};
pub use rate_limit::{auth_rate_limiter, contact_rate_limiter};
pub use request_id::{RequestId, request_id_middleware};
pub use security_headers::security_headers_middleware;
pub use session::create_session_layer;
pub use session_store::ExpiringMemoryStore;
