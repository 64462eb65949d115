//! Filesystem avatar storage.
//!
//! Files are written through a `cap_std` directory handle so writes cannot
//! escape the configured avatar directory. Each upload gets a fresh name
//! `<userId>-<uuid>.<ext>`; the file is staged under a temporary name and
//! renamed into place.

use std::io;
use std::path::Path;

use cap_std::{ambient_authority, fs::Dir};
use uuid::Uuid;

use crate::domain::ports::{AvatarStore, AvatarStoreError};
use crate::domain::{AvatarImage, StoredAvatar, UserId};

/// [`AvatarStore`] writing into a local directory.
pub struct FilesystemAvatarStore {
    dir: Dir,
    public_prefix: String,
}

impl FilesystemAvatarStore {
    /// Open (creating if needed) `path` and publish files under `public_prefix`.
    ///
    /// # Errors
    ///
    /// Returns the IO error when the directory cannot be created or opened.
    pub fn open(path: &Path, public_prefix: impl Into<String>) -> io::Result<Self> {
        Dir::create_ambient_dir_all(path, ambient_authority())?;
        let dir = Dir::open_ambient_dir(path, ambient_authority())?;
        let public_prefix = public_prefix.into().trim_end_matches('/').to_owned();
        Ok(Self { dir, public_prefix })
    }

    fn public_url(&self, file_name: &str) -> String {
        format!("{}/{file_name}", self.public_prefix)
    }
}

fn write_error(file_name: &str, err: &io::Error) -> AvatarStoreError {
    AvatarStoreError::write(format!("{file_name}: {err}"))
}

impl AvatarStore for FilesystemAvatarStore {
    fn store(&self, user_id: UserId, image: &AvatarImage) -> Result<StoredAvatar, AvatarStoreError> {
        let file_name = format!(
            "{user_id}-{}.{}",
            Uuid::new_v4(),
            image.content_type().extension()
        );
        let staging = format!(".tmp-{file_name}");

        self.dir
            .write(&staging, image.bytes())
            .map_err(|err| write_error(&staging, &err))?;
        if let Err(err) = self.dir.rename(&staging, &self.dir, &file_name) {
            // Best effort; the staging name is never served.
            let _cleanup = self.dir.remove_file(&staging);
            return Err(write_error(&file_name, &err));
        }

        Ok(StoredAvatar {
            url: self.public_url(&file_name),
            file_name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use tempfile::TempDir;

    const GIF_BYTES: &[u8] = b"GIF89a\x01\0\x01\0";

    fn gif() -> AvatarImage {
        AvatarImage::try_new(Some("image/gif"), None, GIF_BYTES.to_vec(), 1024).expect("valid gif")
    }

    #[rstest]
    fn stores_file_under_generated_name() {
        let tmp = TempDir::new().expect("tempdir");
        let store = FilesystemAvatarStore::open(tmp.path(), "/avatars/").expect("open store");
        let user_id = UserId::new(12).expect("valid id");

        let stored = store.store(user_id, &gif()).expect("store avatar");

        assert!(stored.file_name.starts_with("12-"));
        assert!(stored.file_name.ends_with(".gif"));
        assert_eq!(stored.url, format!("/avatars/{}", stored.file_name));
        let written = std::fs::read(tmp.path().join(&stored.file_name)).expect("read back");
        assert_eq!(written, GIF_BYTES);
    }

    #[rstest]
    fn creates_missing_directories() {
        let tmp = TempDir::new().expect("tempdir");
        let nested = tmp.path().join("media").join("avatars");
        let store = FilesystemAvatarStore::open(&nested, "https://cdn.example.com/a")
            .expect("open store");

        let stored = store
            .store(UserId::new(1).expect("valid id"), &gif())
            .expect("store avatar");

        assert!(nested.join(&stored.file_name).exists());
        assert!(stored.url.starts_with("https://cdn.example.com/a/1-"));
    }

    #[rstest]
    fn successive_uploads_do_not_collide() {
        let tmp = TempDir::new().expect("tempdir");
        let store = FilesystemAvatarStore::open(tmp.path(), "/avatars").expect("open store");
        let user_id = UserId::new(3).expect("valid id");

        let first = store.store(user_id, &gif()).expect("first");
        let second = store.store(user_id, &gif()).expect("second");

        assert_ne!(first.file_name, second.file_name);
    }
}
