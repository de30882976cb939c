//! Conversions between stored users and API shapes.

use crate::models::{CreateUserRequest, NewUser, UpdateUserRequest, User, UserResponse};

pub fn to_response(user: User) -> UserResponse {
    UserResponse {
        id: user.id,
        name: user.name,
        email: user.email,
        age: user.age,
        created_at: user.created_at,
        updated_at: user.updated_at,
    }
}

/// Build an unsaved user. The email is copied as-is; normalizing it is the
/// caller's job.
pub fn from_create(request: CreateUserRequest) -> NewUser {
    NewUser {
        name: request.name,
        email: request.email,
        age: request.age,
    }
}

/// Overwrite `name` and `age` when present. Email is left alone because it
/// needs a uniqueness check first.
pub fn apply_update(request: &UpdateUserRequest, user: &mut User) {
    if let Some(name) = &request.name {
        user.name = name.clone();
    }
    if let Some(age) = request.age {
        user.age = age;
    }
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        to_response(user)
    }
}
