use std::sync::Arc;

use crate::error::{UserError, UserResult};
use crate::mapper;
use crate::models::{
    CreateUserRequest, UpdateUserRequest, UserListResponse, UserResponse, normalize_email,
};
use crate::repository::UserRepository;

/// Service layer for User business logic
///
/// Emails are normalized before every lookup and write. The uniqueness
/// checks here fail fast; the repository still enforces them on write.
#[derive(Clone)]
pub struct UserService<R: UserRepository> {
    repository: Arc<R>,
}

impl<R: UserRepository> UserService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    /// Create a new user with a unique email
    pub async fn create_user(&self, request: CreateUserRequest) -> UserResult<UserResponse> {
        let email = normalize_email(&request.email);
        self.mail_unique(&email).await?;

        let mut new_user = mapper::from_create(request);
        new_user.email = email;

        let user = self.repository.save(new_user).await?;
        Ok(mapper::to_response(user))
    }

    /// Get a user by ID
    pub async fn read_user(&self, id: i64) -> UserResult<UserResponse> {
        self.repository
            .find_by_id(id)
            .await?
            .map(mapper::to_response)
            .ok_or(UserError::NotFound(id))
    }

    /// Apply a partial update. Changing to an email held by another user
    /// is a conflict; keeping one's own email is not.
    pub async fn update_user(
        &self,
        id: i64,
        request: UpdateUserRequest,
    ) -> UserResult<UserResponse> {
        let mut user = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or(UserError::NotFound(id))?;

        if let Some(email) = request.email.as_deref() {
            let email = normalize_email(email);
            if self.repository.exists_by_email(&email, Some(id)).await? {
                return Err(UserError::Conflict(email));
            }
            user.email = email;
        }

        mapper::apply_update(&request, &mut user);

        let user = self.repository.update(user).await?;
        Ok(mapper::to_response(user))
    }

    /// Permanently delete a user
    pub async fn remove_user_by_id(&self, id: i64) -> UserResult<()> {
        if !self.repository.delete_by_id(id).await? {
            return Err(UserError::NotFound(id));
        }
        Ok(())
    }

    /// All users, ordered by id
    pub async fn get_users(&self) -> UserResult<UserListResponse> {
        let users = self.repository.find_all().await?;
        Ok(UserListResponse::new(
            users.into_iter().map(mapper::to_response).collect(),
        ))
    }

    /// Fail with `Conflict` if any user holds this email
    pub async fn mail_unique(&self, email: &str) -> UserResult<()> {
        let email = normalize_email(email);
        if self.repository.exists_by_email(&email, None).await? {
            return Err(UserError::Conflict(email));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NewUser, User};
    use crate::repository::MockUserRepository;
    use chrono::Utc;
    use mockall::predicate::eq;

    fn stored(id: i64, name: &str, email: &str, age: i32) -> User {
        let now = Utc::now();
        User {
            id,
            name: name.to_string(),
            email: email.to_string(),
            age,
            created_at: now,
            updated_at: now,
        }
    }

    fn echo_update(user: User) -> UserResult<User> {
        Ok(user)
    }

    #[tokio::test]
    async fn test_create_user_normalizes_email() {
        let mut mock_repo = MockUserRepository::new();

        mock_repo
            .expect_exists_by_email()
            .with(eq("a@b.com"), eq(None::<i64>))
            .times(1)
            .returning(|_, _| Ok(false));
        mock_repo
            .expect_save()
            .withf(|user: &NewUser| user.email == "a@b.com" && user.name == "name")
            .times(1)
            .returning(|user| Ok(stored(1, &user.name, &user.email, user.age)));

        let service = UserService::new(mock_repo);
        let response = service
            .create_user(CreateUserRequest {
                name: "name".to_string(),
                email: "  A@B.com ".to_string(),
                age: 3,
            })
            .await
            .unwrap();

        assert_eq!(response.id, 1);
        assert_eq!(response.email, "a@b.com");
    }

    #[tokio::test]
    async fn test_create_user_with_taken_email_is_conflict() {
        let mut mock_repo = MockUserRepository::new();

        mock_repo
            .expect_exists_by_email()
            .returning(|_, _| Ok(true));
        mock_repo.expect_save().never();

        let service = UserService::new(mock_repo);
        let err = service
            .create_user(CreateUserRequest {
                name: "newName".to_string(),
                email: "name@mail.ru".to_string(),
                age: 321,
            })
            .await
            .unwrap_err();

        assert!(matches!(err, UserError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_create_user_surfaces_storage_conflict() {
        let mut mock_repo = MockUserRepository::new();

        // Another request won the race after the pre-check
        mock_repo
            .expect_exists_by_email()
            .returning(|_, _| Ok(false));
        mock_repo
            .expect_save()
            .returning(|user| Err(UserError::Conflict(user.email)));

        let service = UserService::new(mock_repo);
        let err = service
            .create_user(CreateUserRequest {
                name: "n".to_string(),
                email: "n@x.io".to_string(),
                age: 1,
            })
            .await
            .unwrap_err();

        assert!(matches!(err, UserError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_read_user_not_found() {
        let mut mock_repo = MockUserRepository::new();
        mock_repo
            .expect_find_by_id()
            .with(eq(5_i64))
            .returning(|_| Ok(None));

        let service = UserService::new(mock_repo);
        assert!(matches!(
            service.read_user(5).await,
            Err(UserError::NotFound(5))
        ));
    }

    #[tokio::test]
    async fn test_update_user_age_only() {
        let mut mock_repo = MockUserRepository::new();
        mock_repo
            .expect_find_by_id()
            .returning(|id| Ok(Some(stored(id, "name", "name@mail.ru", 10))));
        mock_repo.expect_exists_by_email().never();
        mock_repo.expect_update().returning(echo_update);

        let service = UserService::new(mock_repo);
        let response = service
            .update_user(
                1,
                UpdateUserRequest {
                    age: Some(11),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(response.age, 11);
        assert_eq!(response.name, "name");
        assert_eq!(response.email, "name@mail.ru");
    }

    #[tokio::test]
    async fn test_update_user_changes_email_after_check() {
        let mut mock_repo = MockUserRepository::new();
        mock_repo
            .expect_find_by_id()
            .returning(|id| Ok(Some(stored(id, "name", "name@mail.ru", 10))));
        mock_repo
            .expect_exists_by_email()
            .with(eq("newemail@mail.ru"), eq(Some(1_i64)))
            .times(1)
            .returning(|_, _| Ok(false));
        mock_repo.expect_update().returning(echo_update);

        let service = UserService::new(mock_repo);
        let response = service
            .update_user(
                1,
                UpdateUserRequest {
                    name: None,
                    email: Some("NewEmail@mail.ru".to_string()),
                    age: Some(1234),
                },
            )
            .await
            .unwrap();

        assert_eq!(response.email, "newemail@mail.ru");
        assert_eq!(response.age, 1234);
        assert_eq!(response.name, "name");
    }

    #[tokio::test]
    async fn test_update_user_to_foreign_email_is_conflict() {
        let mut mock_repo = MockUserRepository::new();
        mock_repo
            .expect_find_by_id()
            .returning(|id| Ok(Some(stored(id, "name", "mine@mail.ru", 10))));
        mock_repo
            .expect_exists_by_email()
            .returning(|_, _| Ok(true));
        mock_repo.expect_update().never();

        let service = UserService::new(mock_repo);
        let err = service
            .update_user(
                1,
                UpdateUserRequest {
                    email: Some("taken@mail.ru".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, UserError::Conflict(email) if email == "taken@mail.ru"));
    }

    #[tokio::test]
    async fn test_update_unknown_user_is_not_found() {
        let mut mock_repo = MockUserRepository::new();
        mock_repo.expect_find_by_id().returning(|_| Ok(None));
        mock_repo.expect_update().never();

        let service = UserService::new(mock_repo);
        let err = service
            .update_user(404, UpdateUserRequest::default())
            .await
            .unwrap_err();

        assert!(matches!(err, UserError::NotFound(404)));
    }

    #[tokio::test]
    async fn test_remove_user() {
        let mut mock_repo = MockUserRepository::new();
        mock_repo
            .expect_delete_by_id()
            .with(eq(1_i64))
            .returning(|_| Ok(true));
        mock_repo
            .expect_delete_by_id()
            .with(eq(2_i64))
            .returning(|_| Ok(false));

        let service = UserService::new(mock_repo);
        assert!(service.remove_user_by_id(1).await.is_ok());
        assert!(matches!(
            service.remove_user_by_id(2).await,
            Err(UserError::NotFound(2))
        ));
    }

    #[tokio::test]
    async fn test_get_users_keeps_repository_order() {
        let mut mock_repo = MockUserRepository::new();
        mock_repo.expect_find_all().returning(|| {
            Ok(vec![
                stored(1, "a", "a@x.io", 1),
                stored(2, "b", "b@x.io", 2),
            ])
        });

        let service = UserService::new(mock_repo);
        let list = service.get_users().await.unwrap();

        let emails: Vec<&str> = list.users().iter().map(|u| u.email.as_str()).collect();
        assert_eq!(emails, vec!["a@x.io", "b@x.io"]);
    }

    #[tokio::test]
    async fn test_mail_unique() {
        let mut mock_repo = MockUserRepository::new();
        mock_repo
            .expect_exists_by_email()
            .with(eq("free@x.io"), eq(None::<i64>))
            .returning(|_, _| Ok(false));
        mock_repo
            .expect_exists_by_email()
            .with(eq("taken@x.io"), eq(None::<i64>))
            .returning(|_, _| Ok(true));

        let service = UserService::new(mock_repo);
        assert!(service.mail_unique(" FREE@x.io").await.is_ok());
        assert!(matches!(
            service.mail_unique("taken@x.io").await,
            Err(UserError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn test_storage_failure_is_internal() {
        let mut mock_repo = MockUserRepository::new();
        mock_repo
            .expect_find_all()
            .returning(|| Err(UserError::Internal("Database error: gone".to_string())));

        let service = UserService::new(mock_repo);
        assert!(matches!(
            service.get_users().await,
            Err(UserError::Internal(_))
        ));
    }
}
