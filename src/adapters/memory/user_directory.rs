//! In-memory user directory.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, UserId};
use crate::ports::{UserDirectory, UserRecord, UserRole};

/// Map-backed user directory for tests and database-less runs.
pub struct InMemoryUserDirectory {
    users: RwLock<HashMap<UserId, UserRecord>>,
}

impl InMemoryUserDirectory {
    pub fn new() -> Self {
        Self {
            users: RwLock::new(HashMap::new()),
        }
    }

    /// Register a user and return its generated ID.
    pub async fn add_user(
        &self,
        name: impl Into<String>,
        role: UserRole,
        push_token: Option<&str>,
    ) -> UserId {
        let record = UserRecord {
            id: UserId::new(),
            name: name.into(),
            role,
            push_token: push_token.map(str::to_string),
        };
        let id = record.id;
        self.users.write().await.insert(id, record);
        id
    }
}

impl Default for InMemoryUserDirectory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn find(&self, id: &UserId) -> Result<Option<UserRecord>, DomainError> {
        Ok(self.users.read().await.get(id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn find_returns_registered_users_only() {
        let dir = InMemoryUserDirectory::new();
        let id = dir.add_user("Ada", UserRole::Agent, Some("tok")).await;

        let record = dir.find(&id).await.unwrap().unwrap();
        assert_eq!(record.name, "Ada");
        assert_eq!(record.role, UserRole::Agent);
        assert_eq!(record.push_token.as_deref(), Some("tok"));

        assert!(dir.find(&UserId::new()).await.unwrap().is_none());
        assert!(dir.exists(&id).await.unwrap());
    }
}
