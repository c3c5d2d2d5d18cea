// ABOUTME: Criterion benchmarks for streak evaluation and feed queries
// ABOUTME: Measures the pure streak state machine and SQLite-backed feed pages
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Criterion benchmarks for the check-in hot paths.

#![allow(
    clippy::missing_docs_in_private_items,
    clippy::unwrap_used,
    missing_docs
)]

use accountability_server::calendar::CalendarDay;
use accountability_server::database_plugins::{sqlite::SqliteDatabase, DatabaseProvider};
use accountability_server::models::{
    CheckIn, CheckInDetails, CheckInKind, MemberId, MemberProfile,
};
use accountability_server::pagination::PaginationParams;
use accountability_server::services::feed;
use accountability_server::streak::StreakState;
use chrono::Duration;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use tokio::runtime::Runtime;

/// A year of check-ins with a reflection every seventh day
fn year_of_kinds() -> Vec<CheckInKind> {
    (0..365)
        .map(|i| {
            if i % 7 == 6 {
                CheckInKind::Reflection
            } else if i % 3 == 0 {
                CheckInKind::Rest
            } else {
                CheckInKind::Workout
            }
        })
        .collect()
}

fn bench_streak_apply(c: &mut Criterion) {
    let start = CalendarDay::from_ymd(2025, 1, 1).unwrap();
    let kinds = year_of_kinds();

    let mut group = c.benchmark_group("streak");
    group.throughput(Throughput::Elements(kinds.len() as u64));
    group.bench_function("apply_one_year", |b| {
        b.iter(|| {
            kinds
                .iter()
                .enumerate()
                .fold(StreakState::default(), |state, (i, kind)| {
                    state.apply(black_box(*kind), start.offset(i as i64))
                })
        });
    });
    group.finish();
}

/// `SQLite` store with `members` members, each with one check-in; every other note is public
async fn seeded_db(members: usize) -> SqliteDatabase {
    let db = SqliteDatabase::new("sqlite::memory:").await.unwrap();
    let now = CalendarDay::from_ymd(2025, 3, 3).unwrap().start_of_day();
    for i in 0..members {
        let id = MemberId::new(format!("bench-{i}")).unwrap();
        db.upsert_member(&MemberProfile::member(id.clone()), now)
            .await
            .unwrap();
        let check_in = CheckIn::new(
            id,
            CheckInKind::Rest,
            CheckInDetails {
                note: Some(format!("note {i}")),
                is_note_public: i % 2 == 0,
                ..CheckInDetails::default()
            },
            now + Duration::seconds(i as i64),
        );
        db.insert_check_in(&check_in).await.unwrap();
    }
    db
}

fn bench_feed_page(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let mut group = c.benchmark_group("feed");

    for members in [100_usize, 1000] {
        let db = rt.block_on(seeded_db(members));
        group.bench_with_input(BenchmarkId::new("first_page", members), &db, |b, db| {
            b.iter(|| {
                rt.block_on(async {
                    feed::public_feed(db, black_box(PaginationParams::default()))
                        .await
                        .unwrap()
                })
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_streak_apply, bench_feed_page);
criterion_main!(benches);
