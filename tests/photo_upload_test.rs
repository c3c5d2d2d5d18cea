// ABOUTME: Integration tests for photo upload validation, storage, and deletion
// ABOUTME: Uses the in-memory blob store and a local directory store
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use std::fs;
use std::sync::Arc;

use accountability_server::{
    blob_store::LocalBlobStore,
    constants::photos::MAX_PHOTO_BYTES,
    database_plugins::DatabaseProvider,
    errors::ErrorCode,
    models::{CheckInDetails, CheckInKind, Member, Photo},
    services::{
        checkins,
        photos::{self, PhotoUpload},
    },
};
use bytes::Bytes;
use common::{create_test_env, monday, TestEnv};
use tempfile::TempDir;

fn jpeg(len: usize) -> PhotoUpload {
    PhotoUpload {
        bytes: Bytes::from(vec![0xAB; len]),
        mime_type: "image/jpeg".to_owned(),
        is_public: true,
    }
}

async fn upload(env: &TestEnv, member: &Member, upload: PhotoUpload) -> Result<Photo, ErrorCode> {
    photos::upload_photo(
        env.db(),
        env.resources.blob_store.as_ref(),
        env.resources.clock.as_ref(),
        member,
        upload,
        2,
    )
    .await
    .map_err(|e| e.code)
}

#[tokio::test]
async fn test_upload_stores_blob_and_marks_photo_day() {
    let env = create_test_env();
    let member = env.member("alice").await;

    let photo = upload(&env, &member, jpeg(1024)).await.unwrap();
    assert_eq!(photo.size_bytes, 1024);
    assert_eq!(photo.mime_type, "image/jpeg");
    assert!(photo.url.ends_with(".jpg"));
    assert_eq!(env.blobs.len().await, 1);
    assert_eq!(env.blobs.get(&photo.url).await.unwrap().len(), 1024);

    let stored = env.reload(&member).await;
    assert_eq!(stored.last_photo_date, Some(monday()));
    assert_eq!(env.db().get_photo(photo.id).await.unwrap(), Some(photo));
}

#[tokio::test]
async fn test_upload_rejections_store_nothing() {
    let env = create_test_env();
    let member = env.member("bob").await;

    let oversized = jpeg(MAX_PHOTO_BYTES as usize + 1);
    assert_eq!(
        upload(&env, &member, oversized).await.unwrap_err(),
        ErrorCode::FileTooLarge
    );

    let gif = PhotoUpload {
        mime_type: "image/gif".to_owned(),
        ..jpeg(10)
    };
    assert_eq!(
        upload(&env, &member, gif).await.unwrap_err(),
        ErrorCode::InvalidFileType
    );

    assert_eq!(
        upload(&env, &member, jpeg(0)).await.unwrap_err(),
        ErrorCode::ValidationError
    );

    assert!(env.blobs.is_empty().await);
    assert!(env.db().list_photos(&member.id).await.unwrap().is_empty());
    assert_eq!(env.reload(&member).await.last_photo_date, None);
}

#[tokio::test]
async fn test_upload_at_exact_limit_is_accepted() {
    let env = create_test_env();
    let member = env.member("carol").await;
    let photo = upload(&env, &member, jpeg(MAX_PHOTO_BYTES as usize))
        .await
        .unwrap();
    assert_eq!(photo.size_bytes, MAX_PHOTO_BYTES);
}

#[tokio::test]
async fn test_delete_photo_keeps_check_in() {
    let env = create_test_env();
    let member = env.member("dave").await;
    let stranger = env.member("eve").await;
    let photo = upload(&env, &member, jpeg(64)).await.unwrap();

    let outcome = checkins::create_check_in(
        env.db(),
        env.resources.clock.as_ref(),
        &env.resources.config.checkins,
        &member,
        CheckInKind::Rest,
        CheckInDetails {
            photo_id: Some(photo.id),
            ..CheckInDetails::default()
        },
    )
    .await
    .unwrap();

    let err = photos::delete_photo(
        env.db(),
        env.resources.blob_store.as_ref(),
        photo.id,
        &stranger.id,
    )
    .await
    .unwrap_err();
    assert_eq!(err.code, ErrorCode::PermissionDenied);

    photos::delete_photo(env.db(), env.resources.blob_store.as_ref(), photo.id, &member.id)
        .await
        .unwrap();

    assert!(env.blobs.is_empty().await);
    let check_in = env
        .db()
        .get_check_in(outcome.check_in.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(check_in.photo_id, None);
}

#[tokio::test]
async fn test_local_blob_store_writes_under_root() {
    let dir = TempDir::new().unwrap();
    let store = Arc::new(LocalBlobStore::new(dir.path(), "/photos"));
    let env = create_test_env();
    let resources = (*env.resources).clone().with_blob_store(store.clone());
    let member = env.member("frank").await;

    let photo = photos::upload_photo(
        resources.database.as_ref(),
        resources.blob_store.as_ref(),
        resources.clock.as_ref(),
        &member,
        PhotoUpload {
            mime_type: "image/png".to_owned(),
            ..jpeg(32)
        },
        1,
    )
    .await
    .unwrap();

    assert!(photo.url.starts_with("/photos/frank/"));
    let relative = photo.url.trim_start_matches("/photos/");
    let on_disk = dir.path().join(relative);
    assert_eq!(fs::read(&on_disk).unwrap().len(), 32);

    photos::delete_photo(
        resources.database.as_ref(),
        resources.blob_store.as_ref(),
        photo.id,
        &member.id,
    )
    .await
    .unwrap();
    assert!(!on_disk.exists());
}
