//! Contact form route handler.
//!
//! Submissions are validated locally and stored in `contact_messages` as the
//! anonymous visitor. Nothing is sent when validation fails.

use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;
use tracing::instrument;

use aylia_core::{FieldErrors, Validate};

use super::home::{HomeTemplate, featured_projects};
use crate::db::MessageRepository;
use crate::forms::ContactForm;
use crate::middleware::{OptionalViewer, set_flash};
use crate::models::Flash;
use crate::state::AppState;
use crate::supabase::Credential;

const SENT: &str = "Message sent! We'll get back to you soon.";
const FAILED: &str = "Failed to send message. Please try again.";

/// Submit the contact form.
///
/// POST /contact
///
/// - invalid input: 422 with the landing page and inline field messages
/// - stored: flash and redirect back to the contact section
/// - remote failure: landing page with the input kept and an error flash
#[instrument(skip_all, fields(email = %form.email))]
pub async fn submit(
    State(state): State<AppState>,
    OptionalViewer(viewer): OptionalViewer,
    session: Session,
    Form(form): Form<ContactForm>,
) -> Response {
    let message = match form.validate() {
        Ok(message) => message,
        Err(errors) => {
            tracing::debug!(fields = errors.len(), "Contact form rejected");
            let projects = featured_projects(&state).await;
            return (
                StatusCode::UNPROCESSABLE_ENTITY,
                HomeTemplate::new(viewer, None, projects, form, errors),
            )
                .into_response();
        }
    };

    match MessageRepository::new(state.supabase(), &Credential::Anonymous)
        .submit(&message)
        .await
    {
        Ok(()) => {
            tracing::info!("Contact message stored");
            if let Err(e) = set_flash(&session, &Flash::success(SENT)).await {
                tracing::warn!(error = %e, "Failed to store flash");
            }
            Redirect::to("/#contact").into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to store contact message");
            let projects = featured_projects(&state).await;
            (
                StatusCode::BAD_GATEWAY,
                HomeTemplate::new(
                    viewer,
                    Some(Flash::error(FAILED)),
                    projects,
                    form,
                    FieldErrors::new(),
                ),
            )
                .into_response()
        }
    }
}
