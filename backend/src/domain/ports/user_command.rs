//! Driving port for creating users.

use async_trait::async_trait;

use crate::domain::{Error, User, UserCreateRequest};

/// Failure modes of [`UserCommand::create`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CreateUserError {
    /// The username is already taken.
    #[error("username {username} already exists")]
    DuplicateUsername { username: String },
    /// Any other failure.
    #[error(transparent)]
    Failed(#[from] Error),
}

/// Domain use-case port for user registration.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserCommand: Send + Sync {
    /// Hash the password and persist a new user.
    async fn create(&self, request: UserCreateRequest) -> Result<User, CreateUserError>;
}
