//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod avatar_store;
mod avatar_upload;
mod login_service;
mod password_hasher;
mod user_command;
mod user_repository;
mod users_query;

#[cfg(test)]
pub use avatar_store::MockAvatarStore;
pub use avatar_store::{AvatarStore, AvatarStoreError};
#[cfg(test)]
pub use avatar_upload::MockAvatarUpload;
pub use avatar_upload::AvatarUpload;
#[cfg(test)]
pub use login_service::MockLoginService;
pub use login_service::LoginService;
#[cfg(test)]
pub use password_hasher::MockPasswordHasher;
pub use password_hasher::{PasswordHashError, PasswordHasher};
#[cfg(test)]
pub use user_command::MockUserCommand;
pub use user_command::{CreateUserError, UserCommand};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserListFilter, UserListing, UserPersistenceError, UserRepository};
#[cfg(test)]
pub use users_query::MockUsersQuery;
pub use users_query::{UserListQuery, UsersQuery};
