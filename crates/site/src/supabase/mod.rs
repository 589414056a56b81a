//! HTTP client for the hosted data and auth service.
//!
//! The service exposes two APIs under one project URL:
//!
//! - `/rest/v1/{table}` - table reads and writes, filtered with `col=eq.value`
//!   query parameters and authorized by row-level security
//! - `/auth/v1/*` - account sign-up, password sign-in, token refresh, sign-out
//!
//! Every request carries the project's anon key in the `apikey` header. The
//! `Authorization` bearer is the caller's [`Credential`], which decides what
//! row-level security lets the request see.

mod auth;
mod rest;
pub mod types;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

use crate::config::SupabaseConfig;

pub use auth::AuthApi;
pub use rest::TableQuery;
pub use types::{ApiErrorDetails, AuthUser, SignUpOutcome, SortOrder, TokenResponse};

/// Errors that can occur when calling the remote service.
#[derive(Debug, Error)]
pub enum SupabaseError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Table API returned a structured error.
    #[error("API error ({status}): {details}")]
    Api { status: u16, details: ApiErrorDetails },

    /// Auth API rejected the request.
    #[error("auth error ({status}): {message}")]
    Auth { status: u16, message: String },

    /// Non-2xx response whose body could not be decoded.
    #[error("API error ({status}): {message}")]
    Unparsed { status: u16, message: String },

    /// Response body did not match the expected shape.
    #[error("decode error: {0}")]
    Decode(String),

    /// A zero-or-one query matched several rows.
    #[error("expected at most one row, got {0}")]
    MultipleRows(usize),

    /// Update or delete without any filter.
    #[error("refusing unfiltered {operation} on {table}")]
    UnfilteredMutation {
        operation: &'static str,
        table: String,
    },

    /// Could not build a request URL.
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

impl SupabaseError {
    /// Message safe to show an end user.
    ///
    /// The auth API's messages ("Invalid login credentials", "User already
    /// registered") are written for end users; everything else is not.
    #[must_use]
    pub fn user_message(&self) -> Option<&str> {
        match self {
            Self::Auth { message, .. } => Some(message),
            _ => None,
        }
    }
}

/// Who a request is made on behalf of.
///
/// Implements `Debug` manually to redact tokens.
#[derive(Clone)]
pub enum Credential {
    /// Anonymous visitor; the anon key is the bearer.
    Anonymous,
    /// Signed-in user; their access token is the bearer.
    User(String),
    /// Service role; bypasses row-level security. CLI only.
    ServiceRole(SecretString),
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Anonymous => f.write_str("Anonymous"),
            Self::User(_) => f.write_str("User([REDACTED])"),
            Self::ServiceRole(_) => f.write_str("ServiceRole([REDACTED])"),
        }
    }
}

/// Client for the remote data and auth service.
///
/// Cheap to clone; the underlying connection pool is shared.
#[derive(Clone)]
pub struct SupabaseClient {
    http: reqwest::Client,
    base_url: String,
    anon_key: String,
}

impl std::fmt::Debug for SupabaseClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SupabaseClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl SupabaseClient {
    /// Create a new client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &SupabaseConfig) -> Result<Self, SupabaseError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            http,
            base_url: config.url.trim_end_matches('/').to_string(),
            anon_key: config.anon_key.clone(),
        })
    }

    /// Start a query against `table` on behalf of `credential`.
    #[must_use]
    pub fn from<'a>(&'a self, table: &str, credential: &'a Credential) -> TableQuery<'a> {
        TableQuery::new(self, credential, table)
    }

    /// Auth API operations.
    #[must_use]
    pub const fn auth(&self) -> AuthApi<'_> {
        AuthApi::new(self)
    }

    /// Check that the auth API answers.
    ///
    /// # Errors
    ///
    /// Returns error if the service is unreachable or unhealthy.
    pub async fn health(&self) -> Result<(), SupabaseError> {
        let response = self
            .http
            .get(format!("{}/auth/v1/health", self.base_url))
            .header("apikey", &self.anon_key)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(SupabaseError::Unparsed {
                status: status.as_u16(),
                message: response.text().await.unwrap_or_default(),
            })
        }
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    pub(crate) fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn anon_key(&self) -> &str {
        &self.anon_key
    }

    /// Value for the `apikey` header.
    pub(crate) fn api_key<'a>(&'a self, credential: &'a Credential) -> &'a str {
        match credential {
            Credential::ServiceRole(key) => key.expose_secret(),
            Credential::Anonymous | Credential::User(_) => &self.anon_key,
        }
    }

    /// Value for the `Authorization: Bearer` header.
    pub(crate) fn bearer<'a>(&'a self, credential: &'a Credential) -> &'a str {
        match credential {
            Credential::Anonymous => &self.anon_key,
            Credential::User(token) => token,
            Credential::ServiceRole(key) => key.expose_secret(),
        }
    }
}
