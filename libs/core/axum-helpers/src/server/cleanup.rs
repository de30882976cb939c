//! Connection cleanup helpers for graceful shutdown.

use std::future::Future;
use std::time::Duration;
use tracing::{error, info, warn};

/// Close a SeaORM connection, logging the outcome.
///
/// # Example
/// ```ignore
/// use axum_helpers::server::close_database;
///
/// close_database(db, "users").await;
/// ```
pub async fn close_database(db: sea_orm::DatabaseConnection, name: &str) {
    match db.close().await {
        Ok(_) => info!("Database connection '{}' closed successfully", name),
        Err(e) => error!("Error closing database connection '{}': {}", name, e),
    }
}

/// Runs cleanup tasks sequentially, each bounded by the same timeout.
#[derive(Default)]
pub struct CleanupCoordinator {
    tasks: Vec<(String, std::pin::Pin<Box<dyn Future<Output = ()> + Send>>)>,
}

impl CleanupCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a named cleanup task.
    pub fn add_task<F>(&mut self, name: impl Into<String>, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.tasks.push((name.into(), Box::pin(task)));
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Run every task in registration order. Slow tasks are abandoned after
    /// `timeout` and the rest still run.
    pub async fn run(self, timeout: Duration) {
        for (name, task) in self.tasks {
            info!("Running cleanup task '{}'", name);
            if tokio::time::timeout(timeout, task).await.is_err() {
                warn!("Cleanup task '{}' exceeded {:?}", name, timeout);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_cleanup_runs_all_tasks_despite_timeout() {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut cleanup = CleanupCoordinator::new();

        cleanup.add_task("slow", std::future::pending::<()>());
        let c = counter.clone();
        cleanup.add_task("fast", async move {
            c.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(cleanup.len(), 2);

        cleanup.run(Duration::from_millis(10)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_close_database_on_sqlite() {
        let mut options = sea_orm::ConnectOptions::new("sqlite::memory:");
        options.max_connections(1);
        let db = sea_orm::Database::connect(options).await.unwrap();

        close_database(db, "test").await;
    }
}
