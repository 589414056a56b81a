//! Contact message triage.

use axum::{
    extract::{Path, State},
    response::Response,
};
use tower_sessions::Session;
use tracing::instrument;

use aylia_core::MessageId;

use super::{ConfirmDeleteTemplate, back_to_dashboard};
use crate::db::MessageRepository;
use crate::error::{AppError, Result, add_breadcrumb};
use crate::middleware::RequireAdmin;
use crate::models::Flash;
use crate::state::AppState;

/// Move a message from `new` to `read`.
///
/// POST /admin/messages/{id}/read
///
/// Marking a message that is already read succeeds and changes nothing.
#[instrument(skip_all, fields(user_id = %admin.user_id(), message_id = %id))]
pub async fn mark_read(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    session: Session,
    Path(id): Path<MessageId>,
) -> Response {
    let credential = admin.credential();
    let flash = match MessageRepository::new(state.supabase(), &credential)
        .mark_read(id)
        .await
    {
        Ok(_) => {
            tracing::info!("Message marked read");
            Flash::success("Status updated")
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to update message status");
            Flash::error("Failed to update status")
        }
    };

    back_to_dashboard(&session, flash).await
}

/// Ask before deleting a message.
///
/// GET /admin/messages/{id}/delete
///
/// # Errors
///
/// Returns `AppError::NotFound` if the message does not exist, or
/// `AppError::Remote` if it could not be fetched.
pub async fn confirm_delete(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<MessageId>,
) -> Result<ConfirmDeleteTemplate> {
    let credential = admin.credential();
    let message = MessageRepository::new(state.supabase(), &credential)
        .find(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("message {id}")))?;

    Ok(ConfirmDeleteTemplate {
        email: admin.email().map(ToOwned::to_owned),
        title: "Delete Message",
        description: "Are you sure you want to delete this message? This action cannot be undone.",
        subject: format!("{} <{}>", message.name, message.email),
        action: format!("/admin/messages/{id}/delete"),
    })
}

/// Delete a message.
///
/// POST /admin/messages/{id}/delete
#[instrument(skip_all, fields(user_id = %admin.user_id(), message_id = %id))]
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    session: Session,
    Path(id): Path<MessageId>,
) -> Response {
    let credential = admin.credential();
    let flash = match MessageRepository::new(state.supabase(), &credential)
        .delete(id)
        .await
    {
        Ok(()) => {
            let message_id = id.to_string();
            add_breadcrumb(
                "admin",
                "Deleted message",
                Some(&[("message_id", message_id.as_str())]),
            );
            tracing::info!("Message deleted");
            Flash::success("Message deleted")
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to delete message");
            Flash::error("Failed to delete message")
        }
    };

    back_to_dashboard(&session, flash).await
}
