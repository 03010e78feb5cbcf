//! User directory port (read side).
//!
//! Account issuance lives in an external auth service; the core only needs
//! to resolve user IDs to display data, roles and push tokens.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{DomainError, UserId};

/// Role of a directory user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Customer,
    Agent,
}

/// Directory record for one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: UserId,
    pub name: String,
    pub role: UserRole,
    /// Device token for push delivery; `None` when the user never
    /// registered a device.
    pub push_token: Option<String>,
}

/// Reader port over the user directory.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Resolve a user by ID. Returns `None` for unknown users.
    async fn find(&self, id: &UserId) -> Result<Option<UserRecord>, DomainError>;

    /// Cheap existence check, used to validate message receivers.
    async fn exists(&self, id: &UserId) -> Result<bool, DomainError> {
        Ok(self.find(id).await?.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_directory_is_object_safe() {
        fn _accepts_dyn(_dir: &dyn UserDirectory) {}
    }
}
