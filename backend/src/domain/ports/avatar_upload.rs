//! Driving port for avatar uploads.

use async_trait::async_trait;

use crate::domain::{AvatarImage, Error, UploadResult, UserId};

/// Domain use-case port for replacing a user's avatar.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AvatarUpload: Send + Sync {
    /// Store `image` and point the user's avatar URL at it.
    ///
    /// Fails with `not_found` when the user no longer exists.
    async fn upload_avatar(&self, user_id: UserId, image: AvatarImage)
    -> Result<UploadResult, Error>;
}
