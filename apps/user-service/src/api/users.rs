use axum::Router;
use domain_users::{InMemoryUserRepository, PgUserRepository, UserService, handlers};

use crate::state::AppState;

/// Users router backed by PostgreSQL when connected, in-memory storage otherwise
pub fn router(state: &AppState) -> Router {
    match &state.db {
        Some(db) => handlers::router(UserService::new(PgUserRepository::new(db.clone()))),
        None => {
            tracing::warn!("No database configured; users are stored in memory only");
            handlers::router(UserService::new(InMemoryUserRepository::new()))
        }
    }
}
