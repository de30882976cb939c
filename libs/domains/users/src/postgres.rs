use async_trait::async_trait;
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, SqlErr, TransactionTrait,
};

use crate::{
    entity,
    error::{UserError, UserResult},
    models::{NewUser, User},
    repository::UserRepository,
};

/// SeaORM-backed repository. Works against PostgreSQL in production and
/// SQLite in tests; the unique email index backs the conflict checks.
pub struct PgUserRepository {
    db: DatabaseConnection,
}

impl PgUserRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn internal(e: DbErr) -> UserError {
    UserError::Internal(format!("Database error: {}", e))
}

/// Unique index violations become `Conflict`, anything else is internal.
fn write_error(e: DbErr, email: &str) -> UserError {
    match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => UserError::Conflict(email.to_string()),
        _ => internal(e),
    }
}

async fn email_taken<C: ConnectionTrait>(
    conn: &C,
    email: &str,
    exclude_id: Option<i64>,
) -> UserResult<bool> {
    let mut query = entity::Entity::find().filter(entity::Column::Email.eq(email));
    if let Some(id) = exclude_id {
        query = query.filter(entity::Column::Id.ne(id));
    }

    Ok(query.one(conn).await.map_err(internal)?.is_some())
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_by_id(&self, id: i64) -> UserResult<Option<User>> {
        let model = entity::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(internal)?;

        Ok(model.map(Into::into))
    }

    async fn find_all(&self) -> UserResult<Vec<User>> {
        let models = entity::Entity::find()
            .order_by_asc(entity::Column::Id)
            .all(&self.db)
            .await
            .map_err(internal)?;

        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn exists_by_email(&self, email: &str, exclude_id: Option<i64>) -> UserResult<bool> {
        email_taken(&self.db, email, exclude_id).await
    }

    async fn save(&self, user: NewUser) -> UserResult<User> {
        let email = user.email.clone();
        let active_model: entity::ActiveModel = user.into();

        let model = active_model
            .insert(&self.db)
            .await
            .map_err(|e| write_error(e, &email))?;

        tracing::info!(user_id = model.id, "Created user");
        Ok(model.into())
    }

    async fn update(&self, user: User) -> UserResult<User> {
        let txn = self.db.begin().await.map_err(internal)?;

        let model = entity::Entity::find_by_id(user.id)
            .one(&txn)
            .await
            .map_err(internal)?
            .ok_or(UserError::NotFound(user.id))?;

        if email_taken(&txn, &user.email, Some(user.id)).await? {
            return Err(UserError::Conflict(user.email));
        }

        let mut active_model: entity::ActiveModel = model.into();
        active_model.name = Set(user.name);
        active_model.email = Set(user.email.clone());
        active_model.age = Set(user.age);
        active_model.updated_at = Set(chrono::Utc::now());

        let updated = active_model
            .update(&txn)
            .await
            .map_err(|e| write_error(e, &user.email))?;

        txn.commit().await.map_err(internal)?;

        tracing::info!(user_id = updated.id, "Updated user");
        Ok(updated.into())
    }

    async fn delete_by_id(&self, id: i64) -> UserResult<bool> {
        let result = entity::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(internal)?;

        let removed = result.rows_affected > 0;
        if removed {
            tracing::info!(user_id = id, "Deleted user");
        }
        Ok(removed)
    }
}
