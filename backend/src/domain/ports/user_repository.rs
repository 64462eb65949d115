//! Port abstraction for user persistence adapters and their errors.
use async_trait::async_trait;

use crate::domain::{NewUser, StoredUser, User, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
        /// The unique username constraint rejected an insert.
        DuplicateUsername { username: String } => "username {username} already exists",
    }
}

/// Filter, offset and limit for [`UserRepository::list`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserListFilter {
    /// Case-insensitive substring matched against username and email.
    pub search: Option<String>,
    pub offset: u64,
    /// `None` returns every remaining row.
    pub limit: Option<u32>,
}

/// One slice of the user table plus the total number of matching rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserListing {
    pub rows: Vec<User>,
    pub total: u64,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a user, assigning its id and creation time.
    async fn insert(&self, user: &NewUser) -> Result<User, UserPersistenceError>;

    /// Fetch a user by identifier.
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserPersistenceError>;

    /// Fetch a user and its password hash by exact username.
    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<StoredUser>, UserPersistenceError>;

    /// Set the avatar URL, returning the updated user or `None` when missing.
    async fn update_avatar(
        &self,
        id: UserId,
        avatar_url: &str,
    ) -> Result<Option<User>, UserPersistenceError>;

    /// List users ordered by ascending id.
    async fn list(&self, filter: &UserListFilter) -> Result<UserListing, UserPersistenceError>;
}
