//! Role grants from `user_roles`.

use serde::{Deserialize, Serialize};

use super::{AppRole, UserId};

/// A single role grant. Also the insert payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRole {
    pub user_id: UserId,
    pub role: AppRole,
}

impl UserRole {
    /// Grant of the admin role to `user_id`.
    #[must_use]
    pub const fn admin(user_id: UserId) -> Self {
        Self {
            user_id,
            role: AppRole::Admin,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_grant_payload() {
        let grant = UserRole::admin(UserId::new(uuid::Uuid::nil()));
        let json = serde_json::to_value(grant).unwrap();
        assert_eq!(json["role"], "admin");
        assert_eq!(json["user_id"], "00000000-0000-0000-0000-000000000000");
    }
}
