//! Port for writing avatar files to storage.

use crate::domain::{AvatarImage, StoredAvatar, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by avatar storage adapters.
    pub enum AvatarStoreError {
        /// The file could not be written.
        Write { message: String } => "avatar write failed: {message}",
    }
}

/// Blocking storage for avatar images.
///
/// Implementations perform file IO directly; callers run them on a blocking
/// thread.
#[cfg_attr(test, mockall::automock)]
pub trait AvatarStore: Send + Sync {
    /// Persist `image` for `user_id`, returning its file name and public URL.
    fn store(&self, user_id: UserId, image: &AvatarImage)
    -> Result<StoredAvatar, AvatarStoreError>;
}
