//! User account entity.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use stockflow_core::{DomainError, DomainResult, Entity, RepositoryError, UserId};

use crate::Role;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    /// Unique login name.
    pub username: String,
    /// PHC-format argon2 hash. Never the plaintext.
    pub password_hash: String,
    pub full_name: String,
    pub role: Role,
}

impl User {
    pub fn create(
        id: UserId,
        username: impl Into<String>,
        password_hash: impl Into<String>,
        full_name: impl Into<String>,
        role: Role,
    ) -> DomainResult<Self> {
        let username = username.into();
        if username.trim().is_empty() {
            return Err(DomainError::validation("username cannot be empty"));
        }
        if username.contains(char::is_whitespace) {
            return Err(DomainError::validation("username cannot contain whitespace"));
        }
        Ok(Self {
            id,
            username,
            password_hash: password_hash.into(),
            full_name: full_name.into(),
            role,
        })
    }
}

impl Entity for User {
    type Id = UserId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError>;
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError>;
    async fn list(&self) -> Result<Vec<User>, RepositoryError>;
    async fn upsert(&self, user: &User) -> Result<(), RepositoryError>;
    /// Returns the deleted user, if it existed.
    async fn delete(&self, id: UserId) -> Result<Option<User>, RepositoryError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn username_rules() {
        assert!(User::create(UserId::new(), "", "h", "A", Role::new("user")).is_err());
        assert!(User::create(UserId::new(), "two words", "h", "A", Role::new("user")).is_err());
        assert!(User::create(UserId::new(), "hamza", "h", "Hamza B", Role::new("user")).is_ok());
    }
}
