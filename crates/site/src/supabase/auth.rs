//! Auth API operations under `/auth/v1`.

use reqwest::Response;
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::instrument;
use url::Url;

use super::types::{AuthErrorBody, AuthUser, SignUpOutcome, TokenResponse};
use super::{SupabaseClient, SupabaseError};

/// Auth API bound to a client.
#[derive(Debug, Clone, Copy)]
pub struct AuthApi<'a> {
    client: &'a SupabaseClient,
}

impl<'a> AuthApi<'a> {
    pub(super) const fn new(client: &'a SupabaseClient) -> Self {
        Self { client }
    }

    fn url(&self, path: &str) -> Result<Url, SupabaseError> {
        Ok(Url::parse(&format!("{}/auth/v1/{path}", self.client.base_url()))?)
    }

    fn anon_post(&self, url: Url) -> reqwest::RequestBuilder {
        let key = self.client.anon_key();
        self.client
            .http()
            .post(url)
            .header("apikey", key)
            .bearer_auth(key)
    }

    /// Create an account.
    ///
    /// `redirect_to` is where the confirmation email link lands. `metadata`
    /// is stored as the account's `user_metadata`.
    ///
    /// # Errors
    ///
    /// Returns [`SupabaseError::Auth`] if the service rejects the sign-up
    /// (e.g. the email is already registered).
    #[instrument(skip(self, password, metadata))]
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        redirect_to: &str,
        metadata: serde_json::Value,
    ) -> Result<SignUpOutcome, SupabaseError> {
        let mut url = self.url("signup")?;
        url.query_pairs_mut().append_pair("redirect_to", redirect_to);

        let response = self
            .anon_post(url)
            .json(&json!({
                "email": email,
                "password": password,
                "data": metadata,
            }))
            .send()
            .await?;

        let body: serde_json::Value = read_json(response).await?;
        if body.get("access_token").is_some() {
            let tokens: TokenResponse =
                serde_json::from_value(body).map_err(|e| SupabaseError::Decode(e.to_string()))?;
            Ok(SignUpOutcome::Session(Box::new(tokens)))
        } else {
            // Some server versions wrap the bare user as `{ "user": {...} }`.
            let user_value = body.get("user").cloned().unwrap_or(body);
            let user: AuthUser = serde_json::from_value(user_value)
                .map_err(|e| SupabaseError::Decode(e.to_string()))?;
            Ok(SignUpOutcome::PendingConfirmation(user))
        }
    }

    /// Sign in with email and password.
    ///
    /// # Errors
    ///
    /// Returns [`SupabaseError::Auth`] on bad credentials or unconfirmed email.
    #[instrument(skip(self, password))]
    pub async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<TokenResponse, SupabaseError> {
        let mut url = self.url("token")?;
        url.query_pairs_mut().append_pair("grant_type", "password");

        let response = self
            .anon_post(url)
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;
        read_json(response).await
    }

    /// Exchange a refresh token for a fresh grant.
    ///
    /// # Errors
    ///
    /// Returns [`SupabaseError::Auth`] if the refresh token was revoked or
    /// already used.
    #[instrument(skip_all)]
    pub async fn refresh_session(&self, refresh_token: &str) -> Result<TokenResponse, SupabaseError> {
        let mut url = self.url("token")?;
        url.query_pairs_mut()
            .append_pair("grant_type", "refresh_token");

        let response = self
            .anon_post(url)
            .json(&json!({ "refresh_token": refresh_token }))
            .send()
            .await?;
        read_json(response).await
    }

    /// Fetch the account behind an access token.
    ///
    /// # Errors
    ///
    /// Returns [`SupabaseError::Auth`] if the token is invalid or expired.
    #[instrument(skip_all)]
    pub async fn get_user(&self, access_token: &str) -> Result<AuthUser, SupabaseError> {
        let response = self
            .client
            .http()
            .get(self.url("user")?)
            .header("apikey", self.client.anon_key())
            .bearer_auth(access_token)
            .send()
            .await?;
        read_json(response).await
    }

    /// Revoke the session behind an access token.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails. Callers treat this as best effort.
    #[instrument(skip_all)]
    pub async fn sign_out(&self, access_token: &str) -> Result<(), SupabaseError> {
        let response = self
            .client
            .http()
            .post(self.url("logout")?)
            .header("apikey", self.client.anon_key())
            .bearer_auth(access_token)
            .send()
            .await?;
        check_status(response).await.map(|_| ())
    }
}

async fn check_status(response: Response) -> Result<Response, SupabaseError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<AuthErrorBody>(&body)
        .ok()
        .and_then(AuthErrorBody::into_message)
        .unwrap_or(body);

    Err(SupabaseError::Auth {
        status: status.as_u16(),
        message,
    })
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, SupabaseError> {
    let response = check_status(response).await?;
    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|e| SupabaseError::Decode(e.to_string()))
}
