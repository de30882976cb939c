//! In-memory SQLite test infrastructure
//!
//! Every `TestDatabase` is a private database living inside a single pooled
//! connection, so tests can run in parallel without sharing state.

use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};

/// Fresh in-memory database with all migrations applied
pub struct TestDatabase {
    pub connection: DatabaseConnection,
}

impl TestDatabase {
    /// Create a new test database with migrations applied
    ///
    /// # Example
    ///
    /// ```no_run
    /// use test_utils::TestDatabase;
    ///
    /// # async fn example() {
    /// let db = TestDatabase::new().await;
    /// // Use db.connection() to create your repository
    /// # }
    /// ```
    pub async fn new() -> Self {
        // A second pooled connection would open a different memory database
        let mut options = ConnectOptions::new("sqlite::memory:");
        options.max_connections(1).min_connections(1).sqlx_logging(false);

        let connection = Database::connect(options)
            .await
            .expect("Failed to open in-memory SQLite database");

        Migrator::up(&connection, None)
            .await
            .expect("Failed to run migrations");

        tracing::debug!("In-memory test database ready");

        Self { connection }
    }

    /// Get a cloned connection (useful for passing to repositories)
    pub fn connection(&self) -> DatabaseConnection {
        self.connection.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use migration::SchemaManager;

    #[tokio::test]
    async fn test_database_has_users_table() {
        let db = TestDatabase::new().await;
        let manager = SchemaManager::new(&db.connection);

        assert!(manager.has_table("users").await.unwrap());
    }

    #[tokio::test]
    async fn test_databases_are_isolated() {
        use sea_orm::ConnectionTrait;

        let db1 = TestDatabase::new().await;
        let db2 = TestDatabase::new().await;

        db1.connection()
            .execute_unprepared(
                "INSERT INTO users (name, email, age, created_at, updated_at) \
                 VALUES ('a', 'a@example.com', 1, '2024-01-01T00:00:00Z', '2024-01-01T00:00:00Z')",
            )
            .await
            .unwrap();

        // Same email is still free in the other database
        db2.connection()
            .execute_unprepared(
                "INSERT INTO users (name, email, age, created_at, updated_at) \
                 VALUES ('a', 'a@example.com', 1, '2024-01-01T00:00:00Z', '2024-01-01T00:00:00Z')",
            )
            .await
            .unwrap();
    }
}
