use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::{UserError, UserResult};
use crate::models::{NewUser, User};

/// Repository trait for User persistence
///
/// Implementations own email uniqueness: `save` and `update` fail with
/// `UserError::Conflict` when another user already holds the email.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Get a user by ID
    async fn find_by_id(&self, id: i64) -> UserResult<Option<User>>;

    /// All users ordered by id ascending
    async fn find_all(&self) -> UserResult<Vec<User>>;

    /// Check whether a (normalized) email is taken, optionally ignoring one user
    async fn exists_by_email(&self, email: &str, exclude_id: Option<i64>) -> UserResult<bool>;

    /// Persist a new user, assigning id and timestamps
    async fn save(&self, user: NewUser) -> UserResult<User>;

    /// Overwrite name, email and age of an existing user
    async fn update(&self, user: User) -> UserResult<User>;

    /// Delete a user by ID, returning whether a row was removed
    async fn delete_by_id(&self, id: i64) -> UserResult<bool>;
}

#[derive(Debug, Default)]
struct Store {
    users: BTreeMap<i64, User>,
    last_id: i64,
}

impl Store {
    fn email_taken(&self, email: &str, exclude_id: Option<i64>) -> bool {
        self.users
            .values()
            .any(|u| Some(u.id) != exclude_id && u.email == email)
    }
}

/// In-memory implementation of UserRepository (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryUserRepository {
    store: Arc<RwLock<Store>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_id(&self, id: i64) -> UserResult<Option<User>> {
        let store = self.store.read().await;
        Ok(store.users.get(&id).cloned())
    }

    async fn find_all(&self) -> UserResult<Vec<User>> {
        let store = self.store.read().await;
        Ok(store.users.values().cloned().collect())
    }

    async fn exists_by_email(&self, email: &str, exclude_id: Option<i64>) -> UserResult<bool> {
        let store = self.store.read().await;
        Ok(store.email_taken(email, exclude_id))
    }

    async fn save(&self, user: NewUser) -> UserResult<User> {
        let mut store = self.store.write().await;

        if store.email_taken(&user.email, None) {
            return Err(UserError::Conflict(user.email));
        }

        store.last_id += 1;
        let now = Utc::now();
        let user = User {
            id: store.last_id,
            name: user.name,
            email: user.email,
            age: user.age,
            created_at: now,
            updated_at: now,
        };
        store.users.insert(user.id, user.clone());

        tracing::info!(user_id = user.id, "Created user");
        Ok(user)
    }

    async fn update(&self, user: User) -> UserResult<User> {
        let mut store = self.store.write().await;

        if store.email_taken(&user.email, Some(user.id)) {
            return Err(UserError::Conflict(user.email));
        }

        let existing = store
            .users
            .get_mut(&user.id)
            .ok_or(UserError::NotFound(user.id))?;

        existing.name = user.name;
        existing.email = user.email;
        existing.age = user.age;
        existing.updated_at = Utc::now();

        tracing::info!(user_id = existing.id, "Updated user");
        Ok(existing.clone())
    }

    async fn delete_by_id(&self, id: i64) -> UserResult<bool> {
        let mut store = self.store.write().await;
        let removed = store.users.remove(&id).is_some();

        if removed {
            tracing::info!(user_id = id, "Deleted user");
        }
        Ok(removed)
    }
}
