//! In-memory user repository implementation

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::user::{User, UserId, UserRepository};
use crate::domain::DomainError;

#[derive(Debug, Default)]
struct UserTable {
    users: HashMap<UserId, User>,
    /// email -> user ID
    email_index: HashMap<String, UserId>,
    /// username -> user ID
    username_index: HashMap<String, UserId>,
}

/// In-memory implementation of UserRepository
///
/// The table and both unique indexes sit behind one lock so a create can never
/// interleave with another create between the uniqueness check and the insert.
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    table: Arc<RwLock<UserTable>>,
}

impl InMemoryUserRepository {
    /// Create a new empty repository
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn get(&self, id: &UserId) -> Result<Option<User>, DomainError> {
        let table = self.table.read().await;
        Ok(table.users.get(id).cloned())
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        let table = self.table.read().await;

        Ok(table
            .email_index
            .get(email)
            .and_then(|id| table.users.get(id))
            .cloned())
    }

    async fn get_by_username(&self, username: &str) -> Result<Option<User>, DomainError> {
        let table = self.table.read().await;

        Ok(table
            .username_index
            .get(username)
            .and_then(|id| table.users.get(id))
            .cloned())
    }

    async fn create(&self, user: User) -> Result<User, DomainError> {
        let mut table = self.table.write().await;

        if table.users.contains_key(user.id()) {
            return Err(DomainError::conflict(format!(
                "User with ID '{}' already exists",
                user.id()
            )));
        }

        if table.email_index.contains_key(user.email()) {
            return Err(DomainError::conflict("Email already registered"));
        }

        if table.username_index.contains_key(user.username()) {
            return Err(DomainError::conflict(format!(
                "Username '{}' already exists",
                user.username()
            )));
        }

        table.email_index.insert(user.email().to_string(), *user.id());
        table.username_index.insert(user.username().to_string(), *user.id());
        table.users.insert(*user.id(), user.clone());

        Ok(user)
    }

    async fn update(&self, user: &User) -> Result<User, DomainError> {
        let mut table = self.table.write().await;

        let (old_email, old_username) = match table.users.get(user.id()) {
            Some(old) => (old.email().to_string(), old.username().to_string()),
            None => {
                return Err(DomainError::not_found(format!(
                    "User '{}' not found",
                    user.id()
                )));
            }
        };

        if old_username != user.username() {
            if table.username_index.contains_key(user.username()) {
                return Err(DomainError::conflict(format!(
                    "Username '{}' already exists",
                    user.username()
                )));
            }

            table.username_index.remove(&old_username);
            table.username_index.insert(user.username().to_string(), *user.id());
        }

        if old_email != user.email() {
            if table.email_index.contains_key(user.email()) {
                return Err(DomainError::conflict("Email already registered"));
            }

            table.email_index.remove(&old_email);
            table.email_index.insert(user.email().to_string(), *user.id());
        }

        table.users.insert(*user.id(), user.clone());

        Ok(user.clone())
    }

    async fn delete(&self, id: &UserId) -> Result<bool, DomainError> {
        let mut table = self.table.write().await;

        match table.users.remove(id) {
            Some(user) => {
                table.email_index.remove(user.email());
                table.username_index.remove(user.username());
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
