// ABOUTME: Photo intake validating size and type before the blob store is touched
// ABOUTME: Records the photo and the member's last photo day; owner-only deletion
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use accountability_core::calendar::{CalendarDay, Clock};
use accountability_core::models::{Member, MemberId, Photo, PhotoFormat};
use bytes::Bytes;
use tracing::{info, warn};
use uuid::Uuid;

use super::run_downstream;
use crate::blob_store::BlobStore;
use crate::database_plugins::DatabaseProvider;
use crate::errors::{AppError, AppResult};

/// An upload as received from the caller
#[derive(Debug, Clone)]
pub struct PhotoUpload {
    /// Raw image bytes
    pub bytes: Bytes,
    /// Declared content type
    pub mime_type: String,
    /// Whether the photo may appear in the public feed
    pub is_public: bool,
}

/// Validate, store, and record a photo for `member`
///
/// # Errors
///
/// Returns `FileTooLarge`, `InvalidFileType`, `ValidationError` for empty
/// uploads, or `StorageUnavailable` when the blob or record cannot be written
pub async fn upload_photo<DB: DatabaseProvider>(
    database: &DB,
    blobs: &dyn BlobStore,
    clock: &dyn Clock,
    member: &Member,
    upload: PhotoUpload,
    retry_attempts: u32,
) -> AppResult<Photo> {
    let size_bytes = upload.bytes.len() as u64;
    let format = PhotoFormat::validate_upload(&upload.mime_type, size_bytes)?;

    let url = blobs.put(&member.id, format, upload.bytes).await?;
    let now = clock.now();
    let photo = Photo {
        id: Uuid::new_v4(),
        member_id: member.id.clone(),
        url,
        is_public: upload.is_public,
        size_bytes,
        mime_type: format.mime_type().to_owned(),
        created_at: now,
    };

    if let Err(e) = database.insert_photo(&photo).await {
        if let Err(cleanup) = blobs.delete(&photo.url).await {
            warn!(url = %photo.url, error = %cleanup, "Failed to remove orphaned photo blob");
        }
        return Err(e);
    }
    info!(
        member_id = %member.id,
        photo_id = %photo.id,
        size_bytes,
        is_public = photo.is_public,
        "Photo uploaded"
    );

    let today = CalendarDay::normalize(&now);
    run_downstream("last_photo_date", retry_attempts, || {
        database.set_last_photo_date(&member.id, today)
    })
    .await;

    Ok(photo)
}

/// Delete a photo owned by `requester`
///
/// Check-ins that referenced the photo keep existing without it.
///
/// # Errors
///
/// Returns `ResourceNotFound`, `PermissionDenied` for non-owners, or a storage error
pub async fn delete_photo<DB: DatabaseProvider>(
    database: &DB,
    blobs: &dyn BlobStore,
    photo_id: Uuid,
    requester: &MemberId,
) -> AppResult<()> {
    let photo = database
        .get_photo(photo_id)
        .await?
        .ok_or_else(|| AppError::not_found("Photo"))?;
    if &photo.member_id != requester {
        return Err(AppError::permission_denied(
            "Only the owner can delete this photo",
        ));
    }

    if !database.delete_photo(photo_id).await? {
        return Err(AppError::not_found("Photo"));
    }
    if let Err(e) = blobs.delete(&photo.url).await {
        warn!(photo_id = %photo_id, error = %e, "Photo record deleted but blob removal failed");
    }
    info!(photo_id = %photo_id, member_id = %requester, "Photo deleted");
    Ok(())
}
