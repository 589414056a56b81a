//! Session-related types.
//!
//! Types stored in the server-side session for authentication state and
//! one-shot notifications.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use aylia_core::UserId;

use crate::supabase::{Credential, TokenResponse};

/// Tokens are refreshed this long before they actually expire.
const EXPIRY_LEEWAY_SECONDS: i64 = 30;

/// Tokens issued by the auth service for a signed-in user.
///
/// Implements `Debug` manually to redact tokens.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    /// Account id.
    pub user_id: UserId,
    /// Account email, if the service reported one.
    pub email: Option<String>,
    /// Bearer token for table requests.
    pub access_token: String,
    /// Single-use token for obtaining a new grant.
    pub refresh_token: String,
    /// When `access_token` stops being accepted.
    pub expires_at: DateTime<Utc>,
}

impl std::fmt::Debug for AuthSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSession")
            .field("user_id", &self.user_id)
            .field("email", &self.email)
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

impl AuthSession {
    /// Build a session from a token grant received at `now`.
    #[must_use]
    pub fn from_grant(grant: TokenResponse, now: DateTime<Utc>) -> Self {
        let expires_at = grant
            .expires_at
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .unwrap_or_else(|| now + Duration::seconds(grant.expires_in));

        Self {
            user_id: grant.user.id,
            email: grant.user.email,
            access_token: grant.access_token,
            refresh_token: grant.refresh_token,
            expires_at,
        }
    }

    /// Whether the access token needs refreshing at `now`.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at - Duration::seconds(EXPIRY_LEEWAY_SECONDS) <= now
    }

    /// Credential for requests made on this user's behalf.
    #[must_use]
    pub fn credential(&self) -> Credential {
        Credential::User(self.access_token.clone())
    }
}

/// Who is making the request, as last resolved.
///
/// Resolved when the auth session changes (sign-in, refresh, sign-out) and
/// stored in the server session, so handlers read a verified admin claim
/// instead of looking it up per page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewer {
    session: Option<AuthSession>,
    is_admin: bool,
}

impl Viewer {
    /// Nobody signed in.
    #[must_use]
    pub const fn anonymous() -> Self {
        Self {
            session: None,
            is_admin: false,
        }
    }

    /// A signed-in user with a resolved role claim.
    #[must_use]
    pub const fn signed_in(session: AuthSession, is_admin: bool) -> Self {
        Self {
            session: Some(session),
            is_admin,
        }
    }

    #[must_use]
    pub const fn is_signed_in(&self) -> bool {
        self.session.is_some()
    }

    /// Whether an `admin` role row was found for this user.
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        self.is_admin
    }

    #[must_use]
    pub const fn session(&self) -> Option<&AuthSession> {
        self.session.as_ref()
    }

    #[must_use]
    pub fn into_session(self) -> Option<AuthSession> {
        self.session
    }

    /// Email shown in the admin header.
    #[must_use]
    pub fn email(&self) -> Option<&str> {
        self.session.as_ref().and_then(|s| s.email.as_deref())
    }
}

/// Tone of a flash notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashKind {
    Success,
    Error,
}

/// One-shot notification shown on the next rendered page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub kind: FlashKind,
    pub message: String,
}

impl Flash {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Error,
            message: message.into(),
        }
    }

    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self.kind, FlashKind::Error)
    }

    /// CSS modifier for the notification banner.
    #[must_use]
    pub const fn css_class(&self) -> &'static str {
        match self.kind {
            FlashKind::Success => "flash--success",
            FlashKind::Error => "flash--error",
        }
    }
}

/// Session keys.
pub mod keys {
    /// Key for the resolved [`super::Viewer`].
    pub const VIEWER: &str = "viewer";

    /// Key for the pending [`super::Flash`] notification.
    pub const FLASH: &str = "flash";
}
