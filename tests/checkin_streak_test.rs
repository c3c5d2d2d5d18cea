// ABOUTME: Integration tests for the check-in pipeline and streak progression
// ABOUTME: Walks members across calendar days with a manual clock
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use accountability_server::{
    database_plugins::DatabaseProvider,
    errors::ErrorCode,
    models::{CheckInDetails, CheckInKind, MuscleGroup, Photo},
    services::checkins,
};
use chrono::Duration;
use common::{check_in, create_test_env, monday, workout};
use uuid::Uuid;

#[tokio::test]
async fn test_streak_follows_workout_rest_reflection_workout() {
    let env = create_test_env();
    let member = env.member("alice").await;

    let expected = [
        (CheckInKind::Workout, 1, 1),
        (CheckInKind::Rest, 2, 2),
        (CheckInKind::Reflection, 0, 2),
        (CheckInKind::Workout, 1, 2),
    ];

    for (offset, (kind, current, longest)) in expected.into_iter().enumerate() {
        env.set_day(monday().offset(offset as i64), 9);
        let outcome = check_in(&env, &member, kind).await;
        let streak = outcome.streak.expect("streak step should succeed");
        assert_eq!(streak.current_streak, current, "day {offset}");
        assert_eq!(streak.longest_streak, longest, "day {offset}");
        assert_eq!(streak.last_check_in_date, Some(monday().offset(offset as i64)));
    }

    let stored = env.reload(&member).await;
    assert_eq!(stored.current_streak, 1);
    assert_eq!(stored.longest_streak, 2);
}

#[tokio::test]
async fn test_missed_day_restarts_streak() {
    let env = create_test_env();
    let member = env.member("bob").await;

    check_in(&env, &member, CheckInKind::Workout).await;
    env.set_day(monday().offset(1), 9);
    check_in(&env, &member, CheckInKind::Workout).await;

    env.set_day(monday().offset(3), 9);
    let outcome = check_in(&env, &member, CheckInKind::Rest).await;
    let streak = outcome.streak.unwrap();
    assert_eq!(streak.current_streak, 1);
    assert_eq!(streak.longest_streak, 2);
}

#[tokio::test]
async fn test_day_boundary_is_utc_midnight() {
    let env = create_test_env();
    let member = env.member("carol").await;

    env.set_day(monday(), 23);
    env.clock.advance(Duration::minutes(59));
    let late = check_in(&env, &member, CheckInKind::Workout).await;
    assert_eq!(late.check_in.calendar_day, monday());

    env.clock.advance(Duration::minutes(2));
    let early = check_in(&env, &member, CheckInKind::Workout).await;
    assert_eq!(early.check_in.calendar_day, monday().offset(1));
    assert_eq!(early.streak.unwrap().current_streak, 2);
}

#[tokio::test]
async fn test_second_check_in_same_day_is_rejected() {
    let env = create_test_env();
    let member = env.member("dave").await;

    check_in(&env, &member, CheckInKind::Workout).await;
    env.clock.advance(Duration::hours(5));

    let err = checkins::create_check_in(
        env.db(),
        env.resources.clock.as_ref(),
        &env.resources.config.checkins,
        &member,
        CheckInKind::Rest,
        CheckInDetails::default(),
    )
    .await
    .unwrap_err();
    assert_eq!(err.code, ErrorCode::DuplicateCheckIn);

    let stored = env.reload(&member).await;
    assert_eq!(stored.current_streak, 1);

    let today = checkins::get_today(env.db(), env.resources.clock.as_ref(), &member.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(today.kind, CheckInKind::Workout);
}

#[tokio::test]
async fn test_workout_requires_muscle_group() {
    let env = create_test_env();
    let member = env.member("erin").await;

    let err = checkins::create_check_in(
        env.db(),
        env.resources.clock.as_ref(),
        &env.resources.config.checkins,
        &member,
        CheckInKind::Workout,
        CheckInDetails::default(),
    )
    .await
    .unwrap_err();
    assert_eq!(err.code, ErrorCode::ValidationError);

    let today = checkins::get_today(env.db(), env.resources.clock.as_ref(), &member.id)
        .await
        .unwrap();
    assert!(today.is_none());
}

#[tokio::test]
async fn test_muscle_group_dropped_for_rest() {
    let env = create_test_env();
    let member = env.member("frank").await;

    let outcome = checkins::create_check_in(
        env.db(),
        env.resources.clock.as_ref(),
        &env.resources.config.checkins,
        &member,
        CheckInKind::Rest,
        CheckInDetails {
            note: Some("  stretching only  ".to_owned()),
            ..workout(MuscleGroup::Legs)
        },
    )
    .await
    .unwrap();

    assert_eq!(outcome.check_in.muscle_group, None);
    assert_eq!(outcome.check_in.note.as_deref(), Some("stretching only"));
}

#[tokio::test]
async fn test_photo_must_belong_to_submitter() {
    let env = create_test_env();
    let owner = env.member("gina").await;
    let other = env.member("hank").await;

    let photo = Photo {
        id: Uuid::new_v4(),
        member_id: owner.id.clone(),
        url: "memory://gina/p.jpg".to_owned(),
        is_public: true,
        size_bytes: 10,
        mime_type: "image/jpeg".to_owned(),
        created_at: env.resources.now(),
    };
    env.db().insert_photo(&photo).await.unwrap();

    let err = checkins::create_check_in(
        env.db(),
        env.resources.clock.as_ref(),
        &env.resources.config.checkins,
        &other,
        CheckInKind::Rest,
        CheckInDetails {
            photo_id: Some(photo.id),
            ..CheckInDetails::default()
        },
    )
    .await
    .unwrap_err();
    assert_eq!(err.code, ErrorCode::ValidationError);
}

#[tokio::test]
async fn test_history_is_newest_first_with_heatmap() {
    let env = create_test_env();
    let member = env.member("ivy").await;

    let kinds = [CheckInKind::Workout, CheckInKind::Rest, CheckInKind::Reflection];
    for (offset, kind) in kinds.into_iter().enumerate() {
        env.set_day(monday().offset(offset as i64), 8);
        check_in(&env, &member, kind).await;
    }

    let history = checkins::list_history(env.db(), &member.id, 2).await.unwrap();
    assert_eq!(history.check_ins.len(), 2);
    assert_eq!(history.check_ins[0].calendar_day, monday().offset(2));
    assert_eq!(history.heatmap[0].value, 0);
    assert_eq!(history.heatmap[1].value, 2);
}

#[test]
fn test_history_limit_bounds() {
    assert_eq!(checkins::history_limit(None).unwrap(), 365);
    assert_eq!(checkins::history_limit(Some(30)).unwrap(), 30);
    assert_eq!(
        checkins::history_limit(Some(0)).unwrap_err().code,
        ErrorCode::ValidationError
    );
    assert_eq!(
        checkins::history_limit(Some(366)).unwrap_err().code,
        ErrorCode::ValidationError
    );
}
