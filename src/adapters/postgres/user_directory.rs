//! PostgreSQL implementation of UserDirectory.

use async_trait::async_trait;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::domain::foundation::{DomainError, ErrorCode, UserId};
use crate::ports::{UserDirectory, UserRecord, UserRole};

/// PostgreSQL implementation of UserDirectory.
#[derive(Clone)]
pub struct PostgresUserDirectory {
    pool: PgPool,
}

impl PostgresUserDirectory {
    /// Creates a new PostgresUserDirectory.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserDirectory for PostgresUserDirectory {
    async fn find(&self, id: &UserId) -> Result<Option<UserRecord>, DomainError> {
        let row = sqlx::query("SELECT id, name, role, push_token FROM users WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                DomainError::new(ErrorCode::DatabaseError, format!("Failed to fetch user: {}", e))
            })?;

        match row {
            Some(row) => {
                let id: Uuid = row.get("id");
                let role: String = row.get("role");
                Ok(Some(UserRecord {
                    id: UserId::from_uuid(id),
                    name: row.get("name"),
                    role: str_to_user_role(&role)?,
                    push_token: row.get("push_token"),
                }))
            }
            None => Ok(None),
        }
    }

    async fn exists(&self, id: &UserId) -> Result<bool, DomainError> {
        let result: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                DomainError::new(
                    ErrorCode::DatabaseError,
                    format!("Failed to check user existence: {}", e),
                )
            })?;

        Ok(result.0 > 0)
    }
}

fn str_to_user_role(s: &str) -> Result<UserRole, DomainError> {
    match s {
        "customer" => Ok(UserRole::Customer),
        "agent" => Ok(UserRole::Agent),
        _ => Err(DomainError::new(
            ErrorCode::InvalidFormat,
            format!("Invalid user role: {}", s),
        )),
    }
}
