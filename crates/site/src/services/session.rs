//! Session and role resolution.
//!
//! Turns auth-service tokens into a [`Viewer`] with a verified admin claim.
//! Resolution happens when the session changes (sign-in, token refresh,
//! sign-out); handlers read the stored result instead of repeating the
//! role lookup for every page.

use chrono::Utc;
use tracing::instrument;

use crate::db::RoleRepository;
use crate::models::{AuthSession, Viewer};
use crate::supabase::{SupabaseClient, SupabaseError};

/// A change in authentication state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthEvent {
    SignedIn,
    SignedOut,
    TokenRefreshed,
}

/// Resolves sessions into viewers.
pub struct SessionResolver<'a> {
    client: &'a SupabaseClient,
}

impl<'a> SessionResolver<'a> {
    #[must_use]
    pub const fn new(client: &'a SupabaseClient) -> Self {
        Self { client }
    }

    /// Resolve the admin claim for `session`.
    ///
    /// Without a session no request is made. A failed role lookup is logged
    /// and yields a non-admin viewer; the gate fails closed.
    #[instrument(skip(self, session), fields(user_id))]
    pub async fn resolve(&self, session: Option<AuthSession>) -> Viewer {
        let Some(session) = session else {
            return Viewer::anonymous();
        };
        tracing::Span::current().record("user_id", tracing::field::display(session.user_id));

        let credential = session.credential();
        let is_admin = RoleRepository::new(self.client, &credential)
            .has_admin_role(session.user_id)
            .await
            .unwrap_or_else(|e| {
                tracing::error!(
                    user_id = %session.user_id,
                    error = %e,
                    "Failed to verify admin access"
                );
                false
            });

        Viewer::signed_in(session, is_admin)
    }

    /// Apply an auth state change.
    ///
    /// `SignedOut` drops the session without a network call.
    pub async fn on_event(&self, event: AuthEvent, session: Option<AuthSession>) -> Viewer {
        match event {
            AuthEvent::SignedOut => Viewer::anonymous(),
            AuthEvent::SignedIn | AuthEvent::TokenRefreshed => self.resolve(session).await,
        }
    }

    /// Sign in with email and password.
    ///
    /// # Errors
    ///
    /// Returns [`SupabaseError::Auth`] if the credentials are rejected.
    #[instrument(skip(self, password))]
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Viewer, SupabaseError> {
        let grant = self
            .client
            .auth()
            .sign_in_with_password(email, password)
            .await?;
        let session = AuthSession::from_grant(grant, Utc::now());
        Ok(self.on_event(AuthEvent::SignedIn, Some(session)).await)
    }

    /// Exchange the refresh token for new tokens and re-resolve the role.
    ///
    /// # Errors
    ///
    /// Returns error if the refresh token is rejected; the caller should
    /// treat the user as signed out.
    #[instrument(skip(self, session), fields(user_id = %session.user_id))]
    pub async fn refresh(&self, session: &AuthSession) -> Result<Viewer, SupabaseError> {
        let grant = self
            .client
            .auth()
            .refresh_session(&session.refresh_token)
            .await?;
        let refreshed = AuthSession::from_grant(grant, Utc::now());
        Ok(self
            .on_event(AuthEvent::TokenRefreshed, Some(refreshed))
            .await)
    }

    /// Revoke the session's tokens (best effort) and return an anonymous viewer.
    pub async fn sign_out(&self, session: Option<&AuthSession>) -> Viewer {
        if let Some(session) = session {
            if let Err(e) = self.client.auth().sign_out(&session.access_token).await {
                tracing::warn!(user_id = %session.user_id, error = %e, "Sign-out request failed");
            }
        }
        self.on_event(AuthEvent::SignedOut, None).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Duration;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::config::SupabaseConfig;

    const USER_ID: &str = "0b6f2c1e-8d4a-4f7e-9c2b-7a1d3e5f9b80";

    fn client_for(server: &MockServer) -> SupabaseClient {
        SupabaseClient::new(&SupabaseConfig {
            url: server.uri(),
            anon_key: "anon-key".to_string(),
            service_role_key: None,
            request_timeout: crate::config::DEFAULT_REQUEST_TIMEOUT,
        })
        .unwrap()
    }

    fn session() -> AuthSession {
        AuthSession {
            user_id: USER_ID.parse().unwrap(),
            email: Some("admin@aylia.dev".to_string()),
            access_token: "user-token".to_string(),
            refresh_token: "refresh-token".to_string(),
            expires_at: Utc::now() + Duration::hours(1),
        }
    }

    async fn mount_roles(server: &MockServer, response: ResponseTemplate, calls: u64) {
        Mock::given(method("GET"))
            .and(path("/rest/v1/user_roles"))
            .respond_with(response)
            .expect(calls)
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_no_session_skips_role_query() {
        let server = MockServer::start().await;
        mount_roles(&server, ResponseTemplate::new(200), 0).await;

        let client = client_for(&server);
        let viewer = SessionResolver::new(&client).resolve(None).await;

        assert!(!viewer.is_signed_in());
        assert!(!viewer.is_admin());
    }

    #[tokio::test]
    async fn test_admin_row_grants_claim() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/user_roles"))
            .and(header("authorization", "Bearer user-token"))
            .and(query_param("role", "eq.admin"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!([{"user_id": USER_ID, "role": "admin"}])),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let viewer = SessionResolver::new(&client).resolve(Some(session())).await;

        assert!(viewer.is_signed_in());
        assert!(viewer.is_admin());
    }

    #[tokio::test]
    async fn test_missing_role_row_is_not_admin() {
        let server = MockServer::start().await;
        mount_roles(&server, ResponseTemplate::new(200).set_body_json(json!([])), 1).await;

        let client = client_for(&server);
        let viewer = SessionResolver::new(&client).resolve(Some(session())).await;

        assert!(viewer.is_signed_in());
        assert!(!viewer.is_admin());
    }

    #[tokio::test]
    async fn test_lookup_failure_fails_closed() {
        let server = MockServer::start().await;
        mount_roles(
            &server,
            ResponseTemplate::new(500).set_body_json(json!({"message": "boom"})),
            1,
        )
        .await;

        let client = client_for(&server);
        let viewer = SessionResolver::new(&client).resolve(Some(session())).await;

        assert!(viewer.is_signed_in());
        assert!(!viewer.is_admin());
    }

    #[tokio::test]
    async fn test_signed_out_event_makes_no_request() {
        let server = MockServer::start().await;
        mount_roles(&server, ResponseTemplate::new(200), 0).await;

        let client = client_for(&server);
        let viewer = SessionResolver::new(&client)
            .on_event(AuthEvent::SignedOut, Some(session()))
            .await;

        assert_eq!(viewer, Viewer::anonymous());
    }

    #[tokio::test]
    async fn test_refresh_re_resolves_role() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/v1/token"))
            .and(query_param("grant_type", "refresh_token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "new-token",
                "refresh_token": "new-refresh",
                "expires_in": 3600,
                "token_type": "bearer",
                "user": {"id": USER_ID, "email": "admin@aylia.dev"}
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/user_roles"))
            .and(header("authorization", "Bearer new-token"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!([{"user_id": USER_ID, "role": "admin"}])),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let viewer = SessionResolver::new(&client)
            .refresh(&session())
            .await
            .unwrap();

        assert!(viewer.is_admin());
        assert_eq!(viewer.session().unwrap().access_token, "new-token");
    }
}
