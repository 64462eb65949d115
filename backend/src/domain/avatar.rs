//! Avatar image uploads.
//!
//! An [`AvatarImage`] is only constructed once the declared content type is
//! one of the accepted image formats, the bytes carry that format's magic
//! signature, and the size is within the configured limit.

use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

/// Default upper bound for an avatar file in bytes.
pub const DEFAULT_AVATAR_MAX_BYTES: usize = 2 * 1024 * 1024;

/// Image formats accepted for avatars.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AvatarContentType {
    Png,
    Jpeg,
    Gif,
    Webp,
}

impl AvatarContentType {
    /// Resolve a MIME type (parameters and case ignored).
    ///
    /// # Examples
    /// ```
    /// use accounts::domain::AvatarContentType;
    ///
    /// assert_eq!(
    ///     AvatarContentType::from_mime("Image/PNG; charset=binary"),
    ///     Some(AvatarContentType::Png)
    /// );
    /// assert_eq!(AvatarContentType::from_mime("text/plain"), None);
    /// ```
    pub fn from_mime(mime: &str) -> Option<Self> {
        let essence = mime.split(';').next().unwrap_or_default().trim();
        match essence.to_ascii_lowercase().as_str() {
            "image/png" => Some(Self::Png),
            "image/jpeg" | "image/jpg" | "image/pjpeg" => Some(Self::Jpeg),
            "image/gif" => Some(Self::Gif),
            "image/webp" => Some(Self::Webp),
            _ => None,
        }
    }

    /// Detect the format from leading magic bytes.
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        const PNG: &[u8] = b"\x89PNG\r\n\x1a\n";
        if bytes.starts_with(PNG) {
            Some(Self::Png)
        } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Some(Self::Jpeg)
        } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
            Some(Self::Gif)
        } else if bytes.starts_with(b"RIFF") && bytes.get(8..12) == Some(b"WEBP".as_slice()) {
            Some(Self::Webp)
        } else {
            None
        }
    }

    /// Canonical MIME type.
    pub const fn mime(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Gif => "image/gif",
            Self::Webp => "image/webp",
        }
    }

    /// File extension used for stored files.
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::Gif => "gif",
            Self::Webp => "webp",
        }
    }
}

/// Reasons an uploaded file is not accepted as an avatar.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AvatarValidationError {
    #[error("multipart field `file` is required")]
    MissingFile,
    #[error("uploaded file is empty")]
    Empty,
    #[error("uploaded file exceeds {max} bytes")]
    TooLarge { max: usize },
    #[error("content type `{value}` is not an accepted image type")]
    UnsupportedContentType { value: String },
    #[error("file content does not match declared type {declared}")]
    ContentMismatch { declared: &'static str },
}

/// Validated avatar image awaiting storage.
#[derive(Clone, PartialEq, Eq)]
pub struct AvatarImage {
    content_type: AvatarContentType,
    original_name: Option<String>,
    bytes: Vec<u8>,
}

impl std::fmt::Debug for AvatarImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AvatarImage")
            .field("content_type", &self.content_type)
            .field("original_name", &self.original_name)
            .field("size", &self.bytes.len())
            .finish()
    }
}

impl AvatarImage {
    /// Validate an uploaded file against the accepted formats and `max_bytes`.
    pub fn try_new(
        declared_type: Option<&str>,
        original_name: Option<String>,
        bytes: Vec<u8>,
        max_bytes: usize,
    ) -> Result<Self, AvatarValidationError> {
        if bytes.is_empty() {
            return Err(AvatarValidationError::Empty);
        }
        if bytes.len() > max_bytes {
            return Err(AvatarValidationError::TooLarge { max: max_bytes });
        }
        let declared = declared_type.unwrap_or("application/octet-stream");
        let content_type = AvatarContentType::from_mime(declared).ok_or_else(|| {
            AvatarValidationError::UnsupportedContentType {
                value: declared.to_owned(),
            }
        })?;
        if AvatarContentType::sniff(&bytes) != Some(content_type) {
            return Err(AvatarValidationError::ContentMismatch {
                declared: content_type.mime(),
            });
        }

        Ok(Self {
            content_type,
            original_name,
            bytes,
        })
    }

    pub fn content_type(&self) -> AvatarContentType {
        self.content_type
    }

    pub fn original_name(&self) -> Option<&str> {
        self.original_name.as_deref()
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

/// Location of a stored avatar as reported by an avatar store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredAvatar {
    pub file_name: String,
    pub url: String,
}

/// Result returned to the client after a successful upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadResult {
    #[schema(example = "/avatars/42-3fa85f64-5717-4562-b3fc-2c963f66afa6.png")]
    pub url: String,
    #[schema(example = "42-3fa85f64-5717-4562-b3fc-2c963f66afa6.png")]
    pub file_name: String,
    #[schema(example = "image/png")]
    pub content_type: String,
    #[schema(example = 20480)]
    pub size: u64,
}

#[cfg(test)]
mod tests {
    //! Content type detection and upload validation.
    use super::*;
    use rstest::rstest;

    const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";
    const WEBP_BYTES: &[u8] = b"RIFF\x10\0\0\0WEBPVP8 ";

    #[rstest]
    #[case(PNG_BYTES, Some(AvatarContentType::Png))]
    #[case(&[0xFF, 0xD8, 0xFF, 0xE0], Some(AvatarContentType::Jpeg))]
    #[case(b"GIF89a....", Some(AvatarContentType::Gif))]
    #[case(WEBP_BYTES, Some(AvatarContentType::Webp))]
    #[case(b"RIFF\x10\0\0\0WAVE", None)]
    #[case(b"RIFF\x10\0\0\0WEB", None)]
    #[case(b"RIFF", None)]
    #[case(b"plain text", None)]
    fn sniffs_magic_bytes(#[case] bytes: &[u8], #[case] expected: Option<AvatarContentType>) {
        assert_eq!(AvatarContentType::sniff(bytes), expected);
    }

    #[rstest]
    fn accepts_matching_png() {
        let image = AvatarImage::try_new(
            Some("image/png"),
            Some("me.png".to_owned()),
            PNG_BYTES.to_vec(),
            1024,
        )
        .expect("valid avatar");
        assert_eq!(image.content_type(), AvatarContentType::Png);
        assert_eq!(image.size(), PNG_BYTES.len());
        assert_eq!(image.original_name(), Some("me.png"));
    }

    #[rstest]
    #[case(Some("image/png"), Vec::new(), 1024, AvatarValidationError::Empty)]
    #[case(Some("image/png"), PNG_BYTES.to_vec(), 4, AvatarValidationError::TooLarge { max: 4 })]
    #[case(
        Some("text/plain"),
        PNG_BYTES.to_vec(),
        1024,
        AvatarValidationError::UnsupportedContentType { value: "text/plain".to_owned() }
    )]
    #[case(
        None,
        PNG_BYTES.to_vec(),
        1024,
        AvatarValidationError::UnsupportedContentType { value: "application/octet-stream".to_owned() }
    )]
    #[case(
        Some("image/gif"),
        PNG_BYTES.to_vec(),
        1024,
        AvatarValidationError::ContentMismatch { declared: "image/gif" }
    )]
    fn rejects_invalid_uploads(
        #[case] declared: Option<&str>,
        #[case] bytes: Vec<u8>,
        #[case] max: usize,
        #[case] expected: AvatarValidationError,
    ) {
        let err = AvatarImage::try_new(declared, None, bytes, max).expect_err("invalid avatar");
        assert_eq!(err, expected);
    }
}
