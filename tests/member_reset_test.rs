// ABOUTME: Integration tests for member provisioning and data reset
// ABOUTME: Covers coach role assignment, display name refresh, and full reset cleanup
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use accountability_server::{
    auth::Identity,
    errors::ErrorCode,
    models::{CheckInKind, MemberId, MemberRole},
    services::{
        aggregator, checkins, members,
        photos::{self, PhotoUpload},
    },
};
use bytes::Bytes;
use common::{check_in, create_test_env, create_test_env_with, monday, test_config, COACH_ID};

#[tokio::test]
async fn test_configured_coach_gets_coach_role() {
    let env = create_test_env();
    let coach = env.member(COACH_ID).await;
    let member = env.member("plain").await;
    assert_eq!(coach.role, MemberRole::Coach);
    assert_eq!(member.role, MemberRole::Member);
}

#[tokio::test]
async fn test_upsert_refreshes_name_and_keeps_streak() {
    let env = create_test_env();
    let member = env.member("alice").await;
    check_in(&env, &member, CheckInKind::Workout).await;

    let renamed = members::ensure_member(
        env.db(),
        &Identity {
            member_id: MemberId::new("alice").unwrap(),
            display_name: Some("Alice B.".to_owned()),
        },
        &env.resources.config.members,
        env.resources.now(),
    )
    .await
    .unwrap();
    assert_eq!(renamed.display_name.as_deref(), Some("Alice B."));
    assert_eq!(renamed.current_streak, 1);

    let unnamed = members::ensure_member(
        env.db(),
        &Identity {
            member_id: MemberId::new("alice").unwrap(),
            display_name: None,
        },
        &env.resources.config.members,
        env.resources.now(),
    )
    .await
    .unwrap();
    assert_eq!(unnamed.display_name.as_deref(), Some("Alice B."));
}

#[tokio::test]
async fn test_reset_wipes_member_data() {
    let env = create_test_env();
    let member = env.member("bob").await;
    let other = env.member("carol").await;

    check_in(&env, &member, CheckInKind::Workout).await;
    check_in(&env, &other, CheckInKind::Rest).await;
    photos::upload_photo(
        env.db(),
        env.resources.blob_store.as_ref(),
        env.resources.clock.as_ref(),
        &member,
        PhotoUpload {
            bytes: Bytes::from_static(b"jpeg"),
            mime_type: "image/jpeg".to_owned(),
            is_public: true,
        },
        1,
    )
    .await
    .unwrap();

    let summary = members::reset_member_data(
        env.db(),
        env.resources.blob_store.as_ref(),
        &member.id,
        &env.resources.config.members,
        1,
        env.resources.now(),
    )
    .await
    .unwrap();
    assert_eq!(summary.affected_days, vec![monday()]);
    assert_eq!(summary.photos_deleted, 1);
    assert!(env.blobs.is_empty().await);

    let stored = env.reload(&member).await;
    assert_eq!(stored.current_streak, 0);
    assert_eq!(stored.longest_streak, 0);
    assert_eq!(stored.last_check_in_date, None);
    assert_eq!(stored.last_photo_date, None);

    let history = checkins::list_history(env.db(), &member.id, 365).await.unwrap();
    assert!(history.check_ins.is_empty());

    let aggregate = aggregator::get(env.db(), monday()).await.unwrap();
    assert_eq!(aggregate.workout_count, 0);
    assert_eq!(aggregate.rest_count, 1);

    // Reset members can check in again the same day
    let again = check_in(&env, &member, CheckInKind::Rest).await;
    assert_eq!(again.streak.unwrap().current_streak, 1);
}

#[tokio::test]
async fn test_reset_disabled_by_config() {
    let mut config = test_config();
    config.members.allow_data_reset = false;
    let env = create_test_env_with(config);
    let member = env.member("dave").await;

    let err = members::reset_member_data(
        env.db(),
        env.resources.blob_store.as_ref(),
        &member.id,
        &env.resources.config.members,
        1,
        env.resources.now(),
    )
    .await
    .unwrap_err();
    assert_eq!(err.code, ErrorCode::PermissionDenied);
}
