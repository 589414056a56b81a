//! Wire types for the remote data and auth APIs.

use std::fmt;

use serde::{Deserialize, Serialize};

use aylia_core::UserId;

/// Error body returned by the table API on non-2xx responses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ApiErrorDetails {
    pub code: Option<String>,
    pub message: Option<String>,
    pub details: Option<String>,
    pub hint: Option<String>,
}

impl fmt::Display for ApiErrorDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if let Some(code) = &self.code {
            parts.push(format!("code {code}"));
        }
        if let Some(message) = &self.message {
            parts.push(message.clone());
        }
        if let Some(details) = &self.details {
            parts.push(format!("details: {details}"));
        }
        if let Some(hint) = &self.hint {
            parts.push(format!("hint: {hint}"));
        }
        write!(f, "{}", parts.join(", "))
    }
}

/// Error body returned by the auth API.
///
/// Different endpoints and server versions fill different fields.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct AuthErrorBody {
    pub error_description: Option<String>,
    pub msg: Option<String>,
    pub message: Option<String>,
    pub error: Option<String>,
}

impl AuthErrorBody {
    pub(crate) fn into_message(self) -> Option<String> {
        self.error_description
            .or(self.msg)
            .or(self.message)
            .or(self.error)
    }
}

/// Sort direction for `order=` clauses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl SortOrder {
    pub(crate) const fn as_str(self) -> &'static str {
        match self {
            Self::Ascending => "asc",
            Self::Descending => "desc",
        }
    }
}

/// An account as reported by the auth API.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AuthUser {
    pub id: UserId,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub user_metadata: serde_json::Value,
}

impl AuthUser {
    /// The `full_name` recorded at sign-up, if any.
    #[must_use]
    pub fn full_name(&self) -> Option<&str> {
        self.user_metadata.get("full_name").and_then(|v| v.as_str())
    }
}

/// Token grant returned by sign-in, refresh and auto-confirmed sign-up.
///
/// Implements `Debug` manually to redact tokens.
#[derive(Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
    /// Absolute expiry (unix seconds). Older servers omit it.
    #[serde(default)]
    pub expires_at: Option<i64>,
    pub token_type: String,
    pub user: AuthUser,
}

impl fmt::Debug for TokenResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenResponse")
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .field("expires_in", &self.expires_in)
            .field("expires_at", &self.expires_at)
            .field("token_type", &self.token_type)
            .field("user", &self.user)
            .finish()
    }
}

/// Result of a sign-up call.
///
/// With email confirmation enabled the service returns only the user;
/// with auto-confirm it returns a full token grant.
#[derive(Debug, Clone)]
pub enum SignUpOutcome {
    /// Account created and signed in.
    Session(Box<TokenResponse>),
    /// Account created; the user must confirm their email first.
    PendingConfirmation(AuthUser),
}

impl SignUpOutcome {
    /// The created account.
    #[must_use]
    pub fn user(&self) -> &AuthUser {
        match self {
            Self::Session(tokens) => &tokens.user,
            Self::PendingConfirmation(user) => user,
        }
    }
}
