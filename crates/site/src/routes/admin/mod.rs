//! Admin console route handlers.
//!
//! Every handler takes [`RequireAdmin`](crate::middleware::RequireAdmin), so
//! the admin claim is checked before any of them runs. Mutations follow
//! post/redirect/get: they store a notification and redirect to `/admin`,
//! which re-fetches both lists.

pub mod admins;
pub mod dashboard;
pub mod messages;
pub mod projects;

use askama::Template;
use askama_web::WebTemplate;
use axum::response::{IntoResponse, Redirect, Response};
use tower_sessions::Session;

use crate::filters;
use crate::middleware::set_flash;
use crate::models::Flash;

/// Confirmation page shown before a destructive action.
#[derive(Template, WebTemplate)]
#[template(path = "admin/confirm_delete.html")]
pub struct ConfirmDeleteTemplate {
    pub email: Option<String>,
    pub title: &'static str,
    pub description: &'static str,
    /// What is being deleted, shown under the description.
    pub subject: String,
    pub action: String,
}

/// Store `flash` and send the admin back to the dashboard.
pub(crate) async fn back_to_dashboard(session: &Session, flash: Flash) -> Response {
    if let Err(e) = set_flash(session, &flash).await {
        tracing::warn!(error = %e, "Failed to store flash");
    }
    Redirect::to("/admin").into_response()
}
