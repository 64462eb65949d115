//! User account domain service.
//!
//! Implements the login, lookup, registration and avatar driving ports on top
//! of the user repository, avatar store and password hasher driven ports.
//! Password hashing and avatar writes are blocking work and run on the
//! blocking thread pool with the caller's trace id carried across.

use std::sync::Arc;

use async_trait::async_trait;
use pagination::Page;
use tokio::task::spawn_blocking;
use tracing::{debug, info};
use zeroize::Zeroizing;

use crate::domain::ports::{
    AvatarStore, AvatarStoreError, AvatarUpload, CreateUserError, LoginService,
    PasswordHashError, PasswordHasher, UserCommand, UserListFilter, UserListQuery,
    UserPersistenceError, UserRepository, UsersQuery,
};
use crate::domain::{
    AvatarImage, Error, LoginCredentials, NewUser, TraceId, UploadResult, User,
    UserCreateRequest, UserId,
};

/// User service implementing the driving ports.
pub struct UserService<R, S, H> {
    users: Arc<R>,
    avatars: Arc<S>,
    hasher: Arc<H>,
}

impl<R, S, H> Clone for UserService<R, S, H> {
    fn clone(&self) -> Self {
        Self {
            users: Arc::clone(&self.users),
            avatars: Arc::clone(&self.avatars),
            hasher: Arc::clone(&self.hasher),
        }
    }
}

impl<R, S, H> UserService<R, S, H> {
    /// Create a new service with the given adapters.
    pub fn new(users: Arc<R>, avatars: Arc<S>, hasher: Arc<H>) -> Self {
        Self {
            users,
            avatars,
            hasher,
        }
    }
}

fn map_persistence_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserPersistenceError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
        UserPersistenceError::DuplicateUsername { username } => {
            Error::conflict(format!("username {username} already exists"))
        }
    }
}

fn map_hash_error(error: PasswordHashError) -> Error {
    Error::internal(error.to_string())
}

fn map_store_error(error: AvatarStoreError) -> Error {
    Error::internal(error.to_string())
}

/// Run blocking work with the current trace id in scope.
async fn run_blocking<T, F>(work: F) -> Result<T, Error>
where
    F: FnOnce() -> Result<T, Error> + Send + 'static,
    T: Send + 'static,
{
    spawn_blocking(TraceId::in_blocking(work))
        .await
        .map_err(|err| Error::internal(format!("blocking task failed: {err}")))?
}

impl<R, S, H> UserService<R, S, H>
where
    R: UserRepository,
    S: AvatarStore + 'static,
    H: PasswordHasher + 'static,
{
    async fn verify_password(
        &self,
        password: Zeroizing<String>,
        hash: String,
    ) -> Result<bool, Error> {
        let hasher = Arc::clone(&self.hasher);
        run_blocking(move || hasher.verify(&password, &hash).map_err(map_hash_error)).await
    }
}

#[async_trait]
impl<R, S, H> LoginService for UserService<R, S, H>
where
    R: UserRepository,
    S: AvatarStore + 'static,
    H: PasswordHasher + 'static,
{
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<UserId, Error> {
        let stored = self
            .users
            .find_by_username(credentials.username())
            .await
            .map_err(map_persistence_error)?;

        let password = Zeroizing::new(credentials.password().to_owned());
        let Some(stored) = stored else {
            // Hash anyway so unknown users cost the same as wrong passwords.
            let hasher = Arc::clone(&self.hasher);
            run_blocking(move || hasher.hash(&password).map_err(map_hash_error)).await?;
            debug!(username = credentials.username(), "login for unknown user");
            return Err(Error::unauthorized("invalid credentials"));
        };

        if self
            .verify_password(password, stored.password_hash.clone())
            .await?
        {
            Ok(stored.user.id())
        } else {
            debug!(user_id = %stored.user.id(), "password mismatch");
            Err(Error::unauthorized("invalid credentials"))
        }
    }
}

#[async_trait]
impl<R, S, H> UsersQuery for UserService<R, S, H>
where
    R: UserRepository,
    S: AvatarStore,
    H: PasswordHasher,
{
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, Error> {
        self.users
            .find_by_id(id)
            .await
            .map_err(map_persistence_error)
    }

    async fn list_users(&self, query: &UserListQuery) -> Result<Page<User>, Error> {
        let request = query.page();
        let filter = UserListFilter {
            search: query.search().map(str::to_owned),
            offset: request.offset(),
            limit: request.limit(),
        };
        let listing = self
            .users
            .list(&filter)
            .await
            .map_err(map_persistence_error)?;
        Ok(Page::new(request, listing.rows, listing.total))
    }
}

#[async_trait]
impl<R, S, H> UserCommand for UserService<R, S, H>
where
    R: UserRepository,
    S: AvatarStore,
    H: PasswordHasher + 'static,
{
    async fn create(&self, request: UserCreateRequest) -> Result<User, CreateUserError> {
        let UserCreateRequest {
            username,
            email,
            role,
            password,
        } = request;

        let hasher = Arc::clone(&self.hasher);
        let password_hash =
            run_blocking(move || hasher.hash(password.as_str()).map_err(map_hash_error)).await?;

        let new_user = NewUser {
            username,
            email,
            role,
            password_hash,
        };
        match self.users.insert(&new_user).await {
            Ok(user) => {
                info!(user_id = %user.id(), username = %user.username(), "user created");
                Ok(user)
            }
            Err(UserPersistenceError::DuplicateUsername { username }) => {
                Err(CreateUserError::DuplicateUsername { username })
            }
            Err(other) => Err(CreateUserError::Failed(map_persistence_error(other))),
        }
    }
}

#[async_trait]
impl<R, S, H> AvatarUpload for UserService<R, S, H>
where
    R: UserRepository,
    S: AvatarStore + 'static,
    H: PasswordHasher,
{
    async fn upload_avatar(
        &self,
        user_id: UserId,
        image: AvatarImage,
    ) -> Result<UploadResult, Error> {
        let exists = self
            .users
            .find_by_id(user_id)
            .await
            .map_err(map_persistence_error)?
            .is_some();
        if !exists {
            return Err(Error::not_found("user not found"));
        }

        let content_type = image.content_type();
        let size = image.size();
        let store = Arc::clone(&self.avatars);
        let stored =
            run_blocking(move || store.store(user_id, &image).map_err(map_store_error)).await?;

        self.users
            .update_avatar(user_id, &stored.url)
            .await
            .map_err(map_persistence_error)?
            .ok_or_else(|| Error::not_found("user not found"))?;

        info!(%user_id, file = %stored.file_name, size, "avatar updated");
        Ok(UploadResult {
            url: stored.url,
            file_name: stored.file_name,
            content_type: content_type.mime().to_owned(),
            size: u64::try_from(size).unwrap_or(u64::MAX),
        })
    }
}

#[cfg(test)]
#[path = "user_service_tests.rs"]
mod tests;
