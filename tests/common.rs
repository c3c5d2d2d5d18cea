// ABOUTME: Shared test utilities and setup functions for integration tests
// ABOUTME: Builds server resources over in-memory or SQLite stores with a manual clock
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
#![allow(
    dead_code,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::unwrap_used,
    clippy::expect_used
)]
//! Shared test utilities for `accountability_server`

use std::collections::HashSet;
use std::env;
use std::path::Path;
use std::sync::{Arc, Once};

use accountability_server::{
    auth::Identity,
    blob_store::MemoryBlobStore,
    calendar::{CalendarDay, FixedClock},
    config::environment::{CheckInConfig, MemberConfig, ServerConfig},
    database_plugins::{
        factory::Database, memory::InMemoryDatabase, sqlite::SqliteDatabase, DatabaseProvider,
    },
    models::{CheckInDetails, CheckInKind, Member, MemberId, MuscleGroup},
    resources::ServerResources,
    services::{
        checkins::{self, CheckInOutcome},
        members,
    },
};
use chrono::Duration;
use tracing::Level;

static INIT_LOGGER: Once = Once::new();

/// Member id configured as coach in every test environment
pub const COACH_ID: &str = "coach-1";

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let log_level = match env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => Level::TRACE,
            Ok("DEBUG") => Level::DEBUG,
            Ok("INFO") => Level::INFO,
            _ => Level::WARN,
        };

        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .init();
    });
}

/// Monday 2025-03-03, the first day of most scenarios
pub fn monday() -> CalendarDay {
    CalendarDay::from_ymd(2025, 3, 3).unwrap()
}

/// Configuration with one coach and data reset enabled
pub fn test_config() -> ServerConfig {
    ServerConfig {
        checkins: CheckInConfig {
            deletion_window_minutes: 30,
            downstream_retry_attempts: 2,
        },
        members: MemberConfig {
            coach_member_ids: HashSet::from([COACH_ID.to_owned()]),
            allow_data_reset: true,
        },
        ..ServerConfig::default()
    }
}

/// A full set of server resources plus handles to the test doubles inside it
pub struct TestEnv {
    pub resources: Arc<ServerResources>,
    pub clock: Arc<FixedClock>,
    pub blobs: Arc<MemoryBlobStore>,
}

impl TestEnv {
    /// Store under test
    pub fn db(&self) -> &Database {
        self.resources.database.as_ref()
    }

    /// Move the clock to `hour:00` on `day`
    pub fn set_day(&self, day: CalendarDay, hour: u32) {
        self.clock
            .set(day.start_of_day() + Duration::hours(i64::from(hour)));
    }

    /// Provision a member the way an authenticated request would
    pub async fn member(&self, id: &str) -> Member {
        let identity = Identity {
            member_id: MemberId::new(id).unwrap(),
            display_name: Some(format!("Member {id}")),
        };
        members::ensure_member(
            self.db(),
            &identity,
            &self.resources.config.members,
            self.resources.now(),
        )
        .await
        .unwrap()
    }

    /// Re-read a member from the store
    pub async fn reload(&self, member: &Member) -> Member {
        self.db().get_member(&member.id).await.unwrap().unwrap()
    }
}

fn build_env(database: Database, config: ServerConfig) -> TestEnv {
    let clock = Arc::new(FixedClock::at(monday(), 9));
    let blobs = Arc::new(MemoryBlobStore::new());
    let resources = ServerResources::new(database, Arc::new(config))
        .with_clock(clock.clone())
        .with_blob_store(blobs.clone());
    TestEnv {
        resources: Arc::new(resources),
        clock,
        blobs,
    }
}

/// Test environment over the in-memory store
pub fn create_test_env() -> TestEnv {
    init_test_logging();
    build_env(Database::Memory(InMemoryDatabase::empty()), test_config())
}

/// Test environment over the in-memory store with a custom configuration
pub fn create_test_env_with(config: ServerConfig) -> TestEnv {
    init_test_logging();
    build_env(Database::Memory(InMemoryDatabase::empty()), config)
}

/// Test environment over a `SQLite` file inside `dir`
pub async fn create_sqlite_env(dir: &Path) -> TestEnv {
    init_test_logging();
    let url = format!("sqlite:{}", dir.join("accountability.db").display());
    let database = SqliteDatabase::new(&url).await.unwrap();
    build_env(Database::SQLite(database), test_config())
}

/// Details for a valid workout
pub fn workout(group: MuscleGroup) -> CheckInDetails {
    CheckInDetails {
        muscle_group: Some(group),
        ..CheckInDetails::default()
    }
}

/// Record a check-in of `kind` for `member` at the current clock time
pub async fn check_in(env: &TestEnv, member: &Member, kind: CheckInKind) -> CheckInOutcome {
    let details = match kind {
        CheckInKind::Workout => workout(MuscleGroup::Push),
        _ => CheckInDetails::default(),
    };
    checkins::create_check_in(
        env.db(),
        env.resources.clock.as_ref(),
        &env.resources.config.checkins,
        member,
        kind,
        details,
    )
    .await
    .unwrap()
}
