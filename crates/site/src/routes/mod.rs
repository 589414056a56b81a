//! HTTP route handlers for the site.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                             - Landing page
//! POST /contact                      - Contact form submission
//!
//! # Auth
//! GET  /auth                         - Sign-in / sign-up tabs (?tab=signup)
//! POST /auth/sign-in                 - Sign in
//! POST /auth/sign-up                 - Create an account
//! POST /auth/sign-out                - Sign out
//!
//! # Admin (requires admin role)
//! GET  /admin                        - Dashboard (?new=1, ?edit=<id>)
//! POST /admin/projects               - Create project
//! POST /admin/projects/{id}          - Update project
//! GET  /admin/projects/{id}/delete   - Confirm project deletion
//! POST /admin/projects/{id}/delete   - Delete project
//! POST /admin/messages/{id}/read     - Mark message read
//! GET  /admin/messages/{id}/delete   - Confirm message deletion
//! POST /admin/messages/{id}/delete   - Delete message
//! POST /admin/admins                 - Provision a new admin
//! ```

pub mod admin;
pub mod auth;
pub mod contact;
pub mod home;

use axum::{
    Router,
    routing::{get, post},
};

use crate::middleware::{auth_rate_limiter, contact_rate_limiter};
use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(auth::auth_page))
        .route("/sign-in", post(auth::sign_in).layer(auth_rate_limiter()))
        .route("/sign-up", post(auth::sign_up).layer(auth_rate_limiter()))
        .route("/sign-out", post(auth::sign_out))
}

/// Create the admin routes router.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(admin::dashboard::show))
        .route("/projects", post(admin::projects::create))
        .route("/projects/{id}", post(admin::projects::update))
        .route(
            "/projects/{id}/delete",
            get(admin::projects::confirm_delete).post(admin::projects::delete),
        )
        .route("/messages/{id}/read", post(admin::messages::mark_read))
        .route(
            "/messages/{id}/delete",
            get(admin::messages::confirm_delete).post(admin::messages::delete),
        )
        .route("/admins", post(admin::admins::create))
}

/// Create all page routes for the site.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .route("/contact", post(contact::submit).layer(contact_rate_limiter()))
        .nest("/auth", auth_routes())
        .nest("/admin", admin_routes())
}
