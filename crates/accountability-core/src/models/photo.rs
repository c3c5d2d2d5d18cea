// ABOUTME: Progress photo records and upload admission checks
// ABOUTME: Size and MIME type are validated before any blob is written
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::photos::MAX_PHOTO_BYTES;
use crate::errors::{AppError, AppResult};

use super::MemberId;

/// Accepted photo encodings
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhotoFormat {
    /// `image/jpeg`
    Jpeg,
    /// `image/png`
    Png,
}

impl PhotoFormat {
    /// Resolve a MIME type, ignoring parameters such as `; charset=`
    ///
    /// # Errors
    ///
    /// Returns `InvalidFileType` for anything other than JPEG or PNG
    pub fn from_mime(mime_type: &str) -> AppResult<Self> {
        let essence = mime_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_lowercase();
        match essence.as_str() {
            "image/jpeg" | "image/jpg" => Ok(Self::Jpeg),
            "image/png" => Ok(Self::Png),
            _ => Err(AppError::invalid_file_type(mime_type)),
        }
    }

    /// Canonical MIME type
    #[must_use]
    pub const fn mime_type(&self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
        }
    }

    /// File extension used by blob stores
    #[must_use]
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
        }
    }

    /// Check an upload's declared type and size
    ///
    /// Size is checked first so an oversized file of the wrong type reports the size.
    ///
    /// # Errors
    ///
    /// `FileTooLarge` above [`MAX_PHOTO_BYTES`], `InvalidFileType` for other encodings
    pub fn validate_upload(mime_type: &str, size_bytes: u64) -> AppResult<Self> {
        if size_bytes > MAX_PHOTO_BYTES {
            return Err(AppError::file_too_large(size_bytes, MAX_PHOTO_BYTES));
        }
        if size_bytes == 0 {
            return Err(AppError::invalid_input("Photo upload is empty"));
        }
        Self::from_mime(mime_type)
    }
}

/// A stored progress photo
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Photo {
    /// Unique identifier
    pub id: Uuid,
    /// Uploading member
    pub member_id: MemberId,
    /// Blob store URL
    pub url: String,
    /// Whether the photo may appear in the public feed
    pub is_public: bool,
    /// Blob size in bytes
    pub size_bytes: u64,
    /// Canonical MIME type
    pub mime_type: String,
    /// Upload time
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorCode;

    #[test]
    fn test_accepts_jpeg_and_png() {
        assert_eq!(
            PhotoFormat::validate_upload("image/jpeg", 1024).unwrap(),
            PhotoFormat::Jpeg
        );
        assert_eq!(
            PhotoFormat::validate_upload("IMAGE/PNG; foo=bar", 1024).unwrap(),
            PhotoFormat::Png
        );
    }

    #[test]
    fn test_rejects_other_types() {
        let err = PhotoFormat::validate_upload("image/gif", 10).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidFileType);
    }

    #[test]
    fn test_size_limit_is_inclusive() {
        assert!(PhotoFormat::validate_upload("image/png", MAX_PHOTO_BYTES).is_ok());
        let err = PhotoFormat::validate_upload("image/gif", MAX_PHOTO_BYTES + 1).unwrap_err();
        assert_eq!(err.code, ErrorCode::FileTooLarge);
    }
}
