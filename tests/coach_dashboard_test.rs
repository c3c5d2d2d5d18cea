// ABOUTME: Integration tests for the coach dashboard
// ABOUTME: Checks engagement classification, weekly rates, and photo compliance
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]

mod common;

use accountability_server::{
    engagement::EngagementStatus,
    errors::ErrorCode,
    models::{CheckInKind, Member},
    services::{
        coach,
        photos::{self, PhotoUpload},
    },
};
use bytes::Bytes;
use common::{check_in, create_test_env, monday, TestEnv, COACH_ID};

async fn upload(env: &TestEnv, member: &Member) {
    photos::upload_photo(
        env.db(),
        env.resources.blob_store.as_ref(),
        env.resources.clock.as_ref(),
        member,
        PhotoUpload {
            bytes: Bytes::from_static(b"\x89PNG\r\n\x1a\n"),
            mime_type: "image/png".to_owned(),
            is_public: false,
        },
        1,
    )
    .await
    .unwrap();
}

#[tokio::test]
async fn test_dashboard_classifies_members() {
    let env = create_test_env();
    let coach_member = env.member(COACH_ID).await;
    let active = env.member("active").await;
    let slipper = env.member("slipper").await;
    env.member("ghost").await;

    check_in(&env, &active, CheckInKind::Workout).await;
    check_in(&env, &slipper, CheckInKind::Rest).await;
    upload(&env, &active).await;
    upload(&env, &active).await;
    upload(&env, &slipper).await;

    env.set_day(monday().offset(2), 9);
    check_in(&env, &active, CheckInKind::Reflection).await;

    let dashboard = coach::dashboard(env.db(), env.resources.clock.as_ref(), &coach_member)
        .await
        .unwrap();

    assert_eq!(dashboard.members.len(), 3);
    let status_of = |id: &str| {
        dashboard
            .members
            .iter()
            .find(|m| m.member_id.as_str() == id)
            .unwrap()
            .status
    };
    assert_eq!(status_of("active"), EngagementStatus::Active);
    assert_eq!(status_of("slipper"), EngagementStatus::Slipping);
    assert_eq!(status_of("ghost"), EngagementStatus::Ghosting);

    let active_row = dashboard
        .members
        .iter()
        .find(|m| m.member_id.as_str() == "active")
        .unwrap();
    assert_eq!(active_row.photo_count, 2);
    assert!(active_row.photo_compliant);
    assert_eq!(active_row.current_streak, 0);
    assert_eq!(active_row.longest_streak, 1);

    let stats = &dashboard.stats;
    assert_eq!(stats.total_members, 3);
    assert_eq!(stats.weekly_checkins, 3);
    assert_eq!(stats.weekly_reflections, 1);
    assert_eq!(stats.engagement_rate, 14.3);
    assert_eq!(stats.photo_compliant_count, 1);
    assert_eq!(stats.photo_compliance_rate, 33);
    assert_eq!(stats.active_count, 1);
    assert_eq!(stats.slipping_count, 1);
    assert_eq!(stats.ghosting_count, 1);
}

#[tokio::test]
async fn test_dashboard_requires_coach() {
    let env = create_test_env();
    let member = env.member("curious").await;
    let err = coach::dashboard(env.db(), env.resources.clock.as_ref(), &member)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::PermissionDenied);
}

#[tokio::test]
async fn test_dashboard_without_members() {
    let env = create_test_env();
    let coach_member = env.member(COACH_ID).await;
    let dashboard = coach::dashboard(env.db(), env.resources.clock.as_ref(), &coach_member)
        .await
        .unwrap();
    assert!(dashboard.members.is_empty());
    assert_eq!(dashboard.stats.engagement_rate, 0.0);
    assert_eq!(dashboard.stats.photo_compliance_rate, 0);
}
