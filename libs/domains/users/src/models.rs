use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use utoipa::ToSchema;
use validator::{Validate, ValidateEmail, ValidationError};

/// Persisted user record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Storage-assigned identifier, immutable after creation
    pub id: i64,
    pub name: String,
    /// Always stored normalized (trimmed, lower-cased)
    pub email: String,
    pub age: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A user that has not been saved yet; storage assigns id and timestamps
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub age: i32,
}

/// Input for creating a user
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateUserRequest {
    #[validate(custom(function = "not_blank"))]
    #[schema(example = "name")]
    pub name: String,

    #[validate(custom(function = "valid_email"))]
    #[schema(example = "name@mail.ru")]
    pub email: String,

    #[validate(range(min = 0))]
    #[schema(example = 123, minimum = 0)]
    pub age: i32,
}

/// Partial update; absent fields leave the record unchanged
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateUserRequest {
    #[validate(custom(function = "not_blank"))]
    #[schema(example = "newName")]
    pub name: Option<String>,

    #[validate(custom(function = "valid_email"))]
    #[schema(example = "newemail@mail.ru")]
    pub email: Option<String>,

    #[validate(range(min = 0))]
    #[schema(example = 1234, minimum = 0)]
    pub age: Option<i32>,
}

/// User as returned by the API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    #[schema(example = 1)]
    pub id: i64,
    pub name: String,
    pub email: String,
    pub age: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// HAL-style collection: `{"_embedded": {"userResponseList": [...]}}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UserListResponse {
    #[serde(rename = "_embedded")]
    pub embedded: EmbeddedUsers,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct EmbeddedUsers {
    #[serde(rename = "userResponseList")]
    pub user_response_list: Vec<UserResponse>,
}

impl UserListResponse {
    pub fn new(users: Vec<UserResponse>) -> Self {
        Self {
            embedded: EmbeddedUsers {
                user_response_list: users,
            },
        }
    }

    pub fn users(&self) -> &[UserResponse] {
        &self.embedded.user_response_list
    }
}

/// Canonical form used for storage and uniqueness checks
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank").with_message(Cow::Borrowed("must not be blank")));
    }
    Ok(())
}

fn valid_email(value: &str) -> Result<(), ValidationError> {
    not_blank(value)?;
    if !value.trim().validate_email() {
        return Err(ValidationError::new("email")
            .with_message(Cow::Borrowed("must be a valid email address")));
    }
    Ok(())
}
