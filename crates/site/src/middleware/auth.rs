//! Authentication extractors and session helpers.
//!
//! The resolved [`Viewer`] is written to the server session when the auth
//! state changes. [`RequireAdmin`] checks the stored claim at the boundary,
//! so admin handlers never see a request from a non-admin.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use chrono::Utc;
use tower_sessions::Session;

use aylia_core::UserId;

use crate::models::{AuthSession, Flash, Viewer, session_keys};
use crate::services::SessionResolver;
use crate::state::AppState;
use crate::supabase::Credential;

/// Flash shown to signed-in users without the admin role.
pub const NO_ADMIN_ACCESS: &str = "You don't have admin access";

// =============================================================================
// Extractors
// =============================================================================

/// Extractor for the current viewer on public pages.
///
/// Never rejects; a missing or unreadable session yields an anonymous viewer.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(OptionalViewer(viewer): OptionalViewer) -> impl IntoResponse {
///     if viewer.is_admin() { "Admin" } else { "Visitor" }
/// }
/// ```
pub struct OptionalViewer(pub Viewer);

impl<S> FromRequestParts<S> for OptionalViewer
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let viewer = match parts.extensions.get::<Session>() {
            Some(session) => load_viewer(session).await,
            None => Viewer::anonymous(),
        };

        Ok(Self(viewer))
    }
}

/// Verified admin claim handed to admin handlers.
#[derive(Debug, Clone)]
pub struct AdminContext {
    session: AuthSession,
}

impl AdminContext {
    #[must_use]
    pub const fn user_id(&self) -> UserId {
        self.session.user_id
    }

    #[must_use]
    pub fn email(&self) -> Option<&str> {
        self.session.email.as_deref()
    }

    /// Credential for table requests made on the admin's behalf.
    #[must_use]
    pub fn credential(&self) -> Credential {
        self.session.credential()
    }
}

/// Extractor that requires a signed-in admin.
///
/// - no session: redirect to `/auth`
/// - expired access token: refresh and re-resolve the role; if the refresh
///   fails the user is signed out and sent to `/auth`
/// - signed in without the admin role: flash and redirect to `/`
///
/// # Example
///
/// ```rust,ignore
/// async fn dashboard(RequireAdmin(admin): RequireAdmin) -> impl IntoResponse {
///     format!("Signed in as {:?}", admin.email())
/// }
/// ```
pub struct RequireAdmin(pub AdminContext);

/// Why an admin route was refused.
#[derive(Debug)]
pub enum AdminRejection {
    /// Not signed in (or the session could not be refreshed).
    RedirectToAuth,
    /// Signed in but not an admin.
    NotAdmin,
    /// Session layer missing or the store failed.
    SessionUnavailable,
}

impl IntoResponse for AdminRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToAuth => Redirect::to("/auth").into_response(),
            Self::NotAdmin => Redirect::to("/").into_response(),
            Self::SessionUnavailable => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        }
    }
}

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AdminRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or(AdminRejection::SessionUnavailable)?;

        let mut viewer = load_viewer(&session).await;
        let Some(auth) = viewer.session() else {
            return Err(AdminRejection::RedirectToAuth);
        };

        if auth.is_expired(Utc::now()) {
            let resolver = SessionResolver::new(state.supabase());
            match resolver.refresh(auth).await {
                Ok(refreshed) => {
                    set_viewer(&session, &refreshed)
                        .await
                        .map_err(|_| AdminRejection::SessionUnavailable)?;
                    viewer = refreshed;
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Session refresh failed, signing out");
                    clear_viewer(&session)
                        .await
                        .map_err(|_| AdminRejection::SessionUnavailable)?;
                    return Err(AdminRejection::RedirectToAuth);
                }
            }
        }

        if !viewer.is_admin() {
            set_flash(&session, &Flash::error(NO_ADMIN_ACCESS))
                .await
                .map_err(|_| AdminRejection::SessionUnavailable)?;
            return Err(AdminRejection::NotAdmin);
        }

        viewer
            .into_session()
            .map(|session| Self(AdminContext { session }))
            .ok_or(AdminRejection::RedirectToAuth)
    }
}

// =============================================================================
// Session Helpers
// =============================================================================

async fn load_viewer(session: &Session) -> Viewer {
    session
        .get::<Viewer>(session_keys::VIEWER)
        .await
        .ok()
        .flatten()
        .unwrap_or_default()
}

/// Store the resolved viewer in the session.
///
/// The session id is cycled when the user changes to prevent fixation.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_viewer(
    session: &Session,
    viewer: &Viewer,
) -> Result<(), tower_sessions::session::Error> {
    let previous = load_viewer(session).await;
    if previous.session().map(|s| s.user_id) != viewer.session().map(|s| s.user_id) {
        session.cycle_id().await?;
    }
    session.insert(session_keys::VIEWER, viewer).await
}

/// Forget the viewer (sign-out).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_viewer(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.remove::<Viewer>(session_keys::VIEWER).await?;
    session.cycle_id().await
}

/// Queue a notification for the next rendered page.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_flash(session: &Session, flash: &Flash) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::FLASH, flash).await
}

/// Take the pending notification, if any.
pub async fn take_flash(session: &Session) -> Option<Flash> {
    session
        .remove::<Flash>(session_keys::FLASH)
        .await
        .ok()
        .flatten()
}
