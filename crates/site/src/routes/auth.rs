//! Authentication route handlers.
//!
//! Email and password accounts live in the remote auth service. After a
//! sign-in or sign-out the session resolver runs once and the resulting
//! viewer is stored in the server session.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use tower_sessions::Session;
use tracing::instrument;

use aylia_core::{FieldErrors, Validate};

use crate::error::{clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::forms::{SignInForm, SignUpForm};
use crate::middleware::{OptionalViewer, clear_viewer, set_flash, set_viewer, take_flash};
use crate::models::{AuthSession, Flash, Viewer};
use crate::services::{AuthEvent, SessionResolver};
use crate::state::AppState;
use crate::supabase::{SignUpOutcome, SupabaseError};

const WELCOME_BACK: &str = "Welcome back!";
const SIGN_IN_FAILED: &str = "Failed to sign in";
const ACCOUNT_CREATED: &str = "Account created! You can now sign in.";
const SIGN_UP_FAILED: &str = "Failed to sign up";

// =============================================================================
// Templates
// =============================================================================

/// Which tab of the auth page is open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthTab {
    #[default]
    Signin,
    Signup,
}

/// Query parameters for `/auth`.
#[derive(Debug, Default, Deserialize)]
pub struct AuthQuery {
    #[serde(default)]
    pub tab: AuthTab,
}

/// Auth page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth.html")]
pub struct AuthTemplate {
    pub viewer: Viewer,
    pub flash: Option<Flash>,
    pub tab: AuthTab,
    pub sign_in: SignInForm,
    pub sign_in_errors: FieldErrors,
    pub sign_up: SignUpForm,
    pub sign_up_errors: FieldErrors,
}

impl AuthTemplate {
    fn new(tab: AuthTab, flash: Option<Flash>) -> Self {
        Self {
            viewer: Viewer::anonymous(),
            flash,
            tab,
            sign_in: SignInForm::default(),
            sign_in_errors: FieldErrors::new(),
            sign_up: SignUpForm::default(),
            sign_up_errors: FieldErrors::new(),
        }
    }

    /// Re-render the sign-in tab, keeping the email but never the password.
    fn sign_in(form: &SignInForm, errors: FieldErrors, flash: Option<Flash>) -> Self {
        Self {
            sign_in: SignInForm {
                email: form.email.clone(),
                password: String::new(),
            },
            sign_in_errors: errors,
            ..Self::new(AuthTab::Signin, flash)
        }
    }

    /// Re-render the sign-up tab, keeping name and email.
    fn sign_up(form: &SignUpForm, errors: FieldErrors, flash: Option<Flash>) -> Self {
        Self {
            sign_up: SignUpForm {
                full_name: form.full_name.clone(),
                email: form.email.clone(),
                ..SignUpForm::default()
            },
            sign_up_errors: errors,
            ..Self::new(AuthTab::Signup, flash)
        }
    }
}

/// Status and message for a failed auth call.
///
/// The auth service's own messages are written for end users and shown
/// as-is; anything else gets the generic `fallback`.
fn auth_failure(err: &SupabaseError, fallback: &str) -> (StatusCode, Flash) {
    match err {
        SupabaseError::Auth { message, .. } => (StatusCode::UNAUTHORIZED, Flash::error(message)),
        _ => (StatusCode::BAD_GATEWAY, Flash::error(fallback)),
    }
}

async fn store_flash(session: &Session, flash: Flash) {
    if let Err(e) = set_flash(session, &flash).await {
        tracing::warn!(error = %e, "Failed to store flash");
    }
}

// =============================================================================
// Routes
// =============================================================================

/// Display the auth page.
///
/// Signed-in users are sent home.
pub async fn auth_page(
    OptionalViewer(viewer): OptionalViewer,
    session: Session,
    Query(query): Query<AuthQuery>,
) -> Response {
    if viewer.is_signed_in() {
        return Redirect::to("/").into_response();
    }

    let flash = take_flash(&session).await;
    AuthTemplate::new(query.tab, flash).into_response()
}

/// Sign in with email and password.
///
/// Admins land on the dashboard, everyone else on the landing page.
#[instrument(skip_all, fields(email = %form.email))]
pub async fn sign_in(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<SignInForm>,
) -> Response {
    let credentials = match form.validate() {
        Ok(credentials) => credentials,
        Err(errors) => {
            return (
                StatusCode::UNPROCESSABLE_ENTITY,
                AuthTemplate::sign_in(&form, errors, None),
            )
                .into_response();
        }
    };

    let resolver = SessionResolver::new(state.supabase());
    let viewer = match resolver
        .sign_in(credentials.email.as_str(), &credentials.password)
        .await
    {
        Ok(viewer) => viewer,
        Err(e) => {
            tracing::warn!(error = %e, "Sign-in failed");
            let (status, flash) = auth_failure(&e, SIGN_IN_FAILED);
            return (
                status,
                AuthTemplate::sign_in(&form, FieldErrors::new(), Some(flash)),
            )
                .into_response();
        }
    };

    if let Err(e) = set_viewer(&session, &viewer).await {
        tracing::error!(error = %e, "Failed to store session");
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            AuthTemplate::sign_in(&form, FieldErrors::new(), Some(Flash::error(SIGN_IN_FAILED))),
        )
            .into_response();
    }

    if let Some(auth) = viewer.session() {
        set_sentry_user(&auth.user_id, viewer.email());
        tracing::info!(user_id = %auth.user_id, is_admin = viewer.is_admin(), "Signed in");
    }

    store_flash(&session, Flash::success(WELCOME_BACK)).await;
    let target = if viewer.is_admin() { "/admin" } else { "/" };
    Redirect::to(target).into_response()
}

/// Create an account.
///
/// The full name is stored as account metadata. The confirmation link in
/// the auth service's email points back at the site root.
#[instrument(skip_all, fields(email = %form.email))]
pub async fn sign_up(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<SignUpForm>,
) -> Response {
    let sign_up = match form.validate() {
        Ok(sign_up) => sign_up,
        Err(errors) => {
            return (
                StatusCode::UNPROCESSABLE_ENTITY,
                AuthTemplate::sign_up(&form, errors, None),
            )
                .into_response();
        }
    };

    let redirect_to = state.config().email_redirect_url();
    let outcome = state
        .supabase()
        .auth()
        .sign_up(
            sign_up.credentials.email.as_str(),
            &sign_up.credentials.password,
            &redirect_to,
            json!({ "full_name": sign_up.full_name }),
        )
        .await;

    match outcome {
        Ok(SignUpOutcome::PendingConfirmation(user)) => {
            tracing::info!(user_id = %user.id, "Account created, confirmation pending");
            store_flash(&session, Flash::success(ACCOUNT_CREATED)).await;
            Redirect::to("/auth").into_response()
        }
        Ok(SignUpOutcome::Session(grant)) => {
            // Auto-confirmed: the grant is a live session.
            tracing::info!(user_id = %grant.user.id, "Account created and signed in");
            let tokens = AuthSession::from_grant(*grant, Utc::now());
            let viewer = SessionResolver::new(state.supabase())
                .on_event(AuthEvent::SignedIn, Some(tokens))
                .await;
            if let Err(e) = set_viewer(&session, &viewer).await {
                tracing::error!(error = %e, "Failed to store session");
            }
            store_flash(&session, Flash::success(ACCOUNT_CREATED)).await;
            Redirect::to("/").into_response()
        }
        Err(e) => {
            tracing::warn!(error = %e, "Sign-up failed");
            let (status, flash) = auth_failure(&e, SIGN_UP_FAILED);
            (
                status,
                AuthTemplate::sign_up(&form, FieldErrors::new(), Some(flash)),
            )
                .into_response()
        }
    }
}

/// Sign out.
///
/// Tokens are revoked best effort; the local session is cleared regardless.
pub async fn sign_out(
    State(state): State<AppState>,
    OptionalViewer(viewer): OptionalViewer,
    session: Session,
) -> Response {
    SessionResolver::new(state.supabase())
        .sign_out(viewer.session())
        .await;

    if let Err(e) = clear_viewer(&session).await {
        tracing::error!(error = %e, "Failed to clear session");
    }
    clear_sentry_user();

    Redirect::to("/").into_response()
}
