//! Contact messages submitted from the landing page.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{MessageId, MessageStatus};

/// Maximum characters in the sender's name.
pub const NAME_MAX: usize = 100;
/// Maximum characters in the sender's email.
pub const EMAIL_MAX: usize = 255;
/// Maximum characters in the optional phone number.
pub const PHONE_MAX: usize = 20;
/// Maximum characters in the message body.
pub const MESSAGE_MAX: usize = 1000;

/// A stored inquiry, as read back from `contact_messages`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactMessage {
    pub id: MessageId,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub message: String,
    pub status: MessageStatus,
    pub created_at: DateTime<Utc>,
}

impl ContactMessage {
    /// Phone number for display, if one was given.
    #[must_use]
    pub fn phone_display(&self) -> Option<&str> {
        self.phone.as_deref().filter(|p| !p.trim().is_empty())
    }

    /// Date the message arrived, e.g. `Mar 1, 2025`.
    #[must_use]
    pub fn received_on(&self) -> String {
        self.created_at.format("%b %-d, %Y").to_string()
    }
}

/// Insert payload for a new inquiry.
///
/// The status is always `new` on insert; callers cannot choose it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewContactMessage {
    name: String,
    email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    phone: Option<String>,
    message: String,
    status: MessageStatus,
}

impl NewContactMessage {
    /// Build an insert payload from already-validated fields.
    #[must_use]
    pub const fn new(name: String, email: String, phone: Option<String>, message: String) -> Self {
        Self {
            name,
            email,
            phone,
            message,
            status: MessageStatus::New,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    #[must_use]
    pub fn phone(&self) -> Option<&str> {
        self.phone.as_deref()
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    #[must_use]
    pub const fn status(&self) -> MessageStatus {
        self.status
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_new_message_is_always_new() {
        let msg = NewContactMessage::new(
            "Ada".into(),
            "ada@example.com".into(),
            None,
            "Hello".into(),
        );
        assert_eq!(msg.status(), MessageStatus::New);
    }

    #[test]
    fn test_insert_payload_omits_missing_phone() {
        let msg = NewContactMessage::new(
            "Ada".into(),
            "ada@example.com".into(),
            None,
            "Hello".into(),
        );
        let json = serde_json::to_value(&msg).unwrap();
        assert!(json.get("phone").is_none());
        assert_eq!(json["status"], "new");
    }

    #[test]
    fn test_deserialize_row() {
        let row = serde_json::json!({
            "id": "0b6f2c1e-8d4a-4f7e-9c2b-7a1d3e5f9b80",
            "name": "Ada",
            "email": "ada@example.com",
            "phone": null,
            "message": "Hello",
            "status": "read",
            "created_at": "2025-03-01T10:00:00+00:00"
        });
        let msg: ContactMessage = serde_json::from_value(row).unwrap();
        assert_eq!(msg.status, MessageStatus::Read);
        assert!(msg.phone_display().is_none());
    }
}
