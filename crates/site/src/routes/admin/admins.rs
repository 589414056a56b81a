//! Admin account provisioning from the console.

use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tower_sessions::Session;
use tracing::instrument;

use aylia_core::Validate;

use super::back_to_dashboard;
use super::dashboard::{DashboardView, render};
use crate::error::add_breadcrumb;
use crate::forms::NewAdminForm;
use crate::middleware::RequireAdmin;
use crate::models::Flash;
use crate::services::{ProvisionError, ProvisioningService};
use crate::state::AppState;

const CREATE_FAILED: &str = "Failed to create admin";

/// Message for a failed provisioning attempt.
///
/// Sign-up refusals carry a message meant for users ("User already
/// registered"); everything else gets the generic text.
fn failure_message(err: &ProvisionError) -> &str {
    match err {
        ProvisionError::SignUp(e) => e.user_message().unwrap_or(CREATE_FAILED),
        ProvisionError::RoleAssignment { .. } => CREATE_FAILED,
    }
}

/// Create another admin account.
///
/// POST /admin/admins
///
/// The acting admin stays signed in; the new account gets a confirmation
/// email and the `admin` role.
#[instrument(skip_all, fields(user_id = %admin.user_id(), email = %form.email))]
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    session: Session,
    Form(form): Form<NewAdminForm>,
) -> Response {
    let credentials = match form.validate() {
        Ok(credentials) => credentials,
        Err(errors) => {
            let view = DashboardView {
                admin_form: form,
                admin_errors: errors,
                ..DashboardView::default()
            };
            return (
                StatusCode::UNPROCESSABLE_ENTITY,
                render(&state, &admin, view).await,
            )
                .into_response();
        }
    };

    let credential = admin.credential();
    let redirect_to = state.config().email_redirect_url();
    let flash = match ProvisioningService::new(state.supabase(), &credential)
        .provision(
            credentials.email.as_str(),
            &credentials.password,
            &redirect_to,
        )
        .await
    {
        Ok(user_id) => {
            let new_user = user_id.to_string();
            add_breadcrumb(
                "admin",
                "Provisioned admin",
                Some(&[("new_user_id", new_user.as_str())]),
            );
            Flash::success("New admin created successfully")
        }
        Err(e) => {
            if let Some(orphan) = e.orphaned_user() {
                sentry::capture_error(&e);
                tracing::error!(
                    orphan_user_id = %orphan,
                    "Admin provisioning left an account without the role"
                );
            } else {
                tracing::warn!(error = %e, "Admin provisioning failed");
            }
            Flash::error(failure_message(&e))
        }
    };

    back_to_dashboard(&session, flash).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::supabase::SupabaseError;

    #[test]
    fn test_sign_up_refusal_shows_service_message() {
        let err = ProvisionError::SignUp(SupabaseError::Auth {
            status: 422,
            message: "User already registered".to_string(),
        });
        assert_eq!(failure_message(&err), "User already registered");
    }

    #[test]
    fn test_other_failures_show_generic_message() {
        let err = ProvisionError::SignUp(SupabaseError::MultipleRows(2));
        assert_eq!(failure_message(&err), CREATE_FAILED);
    }
}
