// ABOUTME: Database factory selecting the SQLite or in-memory backend at runtime
// ABOUTME: Database enum delegates every DatabaseProvider call to the chosen implementation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Database factory for creating database providers
//!
//! The backend is picked from the parsed `DATABASE_URL`.

use accountability_core::calendar::CalendarDay;
use accountability_core::models::{
    CheckIn, DailyAggregate, FeedRecord, KindCounts, Member, MemberId, MemberProfile, MemberRole,
    Photo,
};
use accountability_core::pagination::PaginationParams;
use accountability_core::streak::StreakState;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{debug, info};
use uuid::Uuid;

use super::memory::InMemoryDatabase;
use super::sqlite::SqliteDatabase;
use super::DatabaseProvider;
use crate::config::environment::DatabaseUrl;
use crate::errors::{AppError, AppResult};

/// Supported database types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatabaseType {
    /// File-backed `SQLite`
    SQLite,
    /// Process-local maps
    Memory,
}

/// Database instance wrapper that delegates to the appropriate implementation
#[derive(Clone)]
pub enum Database {
    /// `SQLite` backend
    SQLite(SqliteDatabase),
    /// In-memory backend
    Memory(InMemoryDatabase),
}

impl Database {
    /// Open the backend described by `url`
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or migrated
    pub async fn from_url(url: &DatabaseUrl) -> AppResult<Self> {
        match url {
            DatabaseUrl::SQLite { .. } => {
                info!("Initializing SQLite database");
                let db = SqliteDatabase::new(&url.to_connection_string()).await?;
                info!("SQLite database initialized successfully");
                Ok(Self::SQLite(db))
            }
            DatabaseUrl::Memory => {
                info!("Initializing in-memory database");
                Ok(Self::Memory(InMemoryDatabase::empty()))
            }
        }
    }

    /// Get a descriptive string for the current database backend
    #[must_use]
    pub const fn backend_info(&self) -> &'static str {
        match self {
            Self::SQLite(_) => "SQLite (Durable)",
            Self::Memory(_) => "In-memory (Volatile)",
        }
    }

    /// Get the database type enum
    #[must_use]
    pub const fn database_type(&self) -> DatabaseType {
        match self {
            Self::SQLite(_) => DatabaseType::SQLite,
            Self::Memory(_) => DatabaseType::Memory,
        }
    }
}

/// Detect the database type from a connection string
///
/// # Errors
///
/// Returns an error if the URL format is not recognized
pub fn detect_database_type(database_url: &str) -> AppResult<DatabaseType> {
    let parsed = DatabaseUrl::parse_url(database_url).map_err(|e| AppError::config(e.to_string()))?;
    Ok(if parsed.is_memory() {
        DatabaseType::Memory
    } else {
        DatabaseType::SQLite
    })
}

#[async_trait]
impl DatabaseProvider for Database {
    async fn new(database_url: &str) -> AppResult<Self> {
        debug!("Detecting database type from URL: {database_url}");
        let url = DatabaseUrl::parse_url(database_url).map_err(|e| AppError::config(e.to_string()))?;
        Self::from_url(&url).await
    }

    async fn migrate(&self) -> AppResult<()> {
        match self {
            Self::SQLite(db) => db.migrate().await,
            Self::Memory(db) => db.migrate().await,
        }
    }

    async fn upsert_member(
        &self,
        profile: &MemberProfile,
        now: DateTime<Utc>,
    ) -> AppResult<Member> {
        match self {
            Self::SQLite(db) => db.upsert_member(profile, now).await,
            Self::Memory(db) => db.upsert_member(profile, now).await,
        }
    }

    async fn get_member(&self, member_id: &MemberId) -> AppResult<Option<Member>> {
        match self {
            Self::SQLite(db) => db.get_member(member_id).await,
            Self::Memory(db) => db.get_member(member_id).await,
        }
    }

    async fn update_member_streak(
        &self,
        member_id: &MemberId,
        streak: &StreakState,
    ) -> AppResult<()> {
        match self {
            Self::SQLite(db) => db.update_member_streak(member_id, streak).await,
            Self::Memory(db) => db.update_member_streak(member_id, streak).await,
        }
    }

    async fn set_last_photo_date(&self, member_id: &MemberId, day: CalendarDay) -> AppResult<()> {
        match self {
            Self::SQLite(db) => db.set_last_photo_date(member_id, day).await,
            Self::Memory(db) => db.set_last_photo_date(member_id, day).await,
        }
    }

    async fn count_members(&self, role: MemberRole) -> AppResult<u32> {
        match self {
            Self::SQLite(db) => db.count_members(role).await,
            Self::Memory(db) => db.count_members(role).await,
        }
    }

    async fn list_members(&self, role: MemberRole) -> AppResult<Vec<Member>> {
        match self {
            Self::SQLite(db) => db.list_members(role).await,
            Self::Memory(db) => db.list_members(role).await,
        }
    }

    async fn insert_check_in(&self, check_in: &CheckIn) -> AppResult<()> {
        match self {
            Self::SQLite(db) => db.insert_check_in(check_in).await,
            Self::Memory(db) => db.insert_check_in(check_in).await,
        }
    }

    async fn get_check_in(&self, check_in_id: Uuid) -> AppResult<Option<CheckIn>> {
        match self {
            Self::SQLite(db) => db.get_check_in(check_in_id).await,
            Self::Memory(db) => db.get_check_in(check_in_id).await,
        }
    }

    async fn get_check_in_for_day(
        &self,
        member_id: &MemberId,
        day: CalendarDay,
    ) -> AppResult<Option<CheckIn>> {
        match self {
            Self::SQLite(db) => db.get_check_in_for_day(member_id, day).await,
            Self::Memory(db) => db.get_check_in_for_day(member_id, day).await,
        }
    }

    async fn list_check_ins(&self, member_id: &MemberId, limit: u32) -> AppResult<Vec<CheckIn>> {
        match self {
            Self::SQLite(db) => db.list_check_ins(member_id, limit).await,
            Self::Memory(db) => db.list_check_ins(member_id, limit).await,
        }
    }

    async fn delete_check_in(&self, check_in_id: Uuid) -> AppResult<bool> {
        match self {
            Self::SQLite(db) => db.delete_check_in(check_in_id).await,
            Self::Memory(db) => db.delete_check_in(check_in_id).await,
        }
    }

    async fn set_note_visibility(&self, check_in_id: Uuid, is_public: bool) -> AppResult<()> {
        match self {
            Self::SQLite(db) => db.set_note_visibility(check_in_id, is_public).await,
            Self::Memory(db) => db.set_note_visibility(check_in_id, is_public).await,
        }
    }

    async fn count_check_ins_by_kind(&self, day: CalendarDay) -> AppResult<KindCounts> {
        match self {
            Self::SQLite(db) => db.count_check_ins_by_kind(day).await,
            Self::Memory(db) => db.count_check_ins_by_kind(day).await,
        }
    }

    async fn count_check_ins_since(&self, since: DateTime<Utc>) -> AppResult<KindCounts> {
        match self {
            Self::SQLite(db) => db.count_check_ins_since(since).await,
            Self::Memory(db) => db.count_check_ins_since(since).await,
        }
    }

    async fn list_feed_records(&self, params: PaginationParams) -> AppResult<Vec<FeedRecord>> {
        match self {
            Self::SQLite(db) => db.list_feed_records(params).await,
            Self::Memory(db) => db.list_feed_records(params).await,
        }
    }

    async fn insert_photo(&self, photo: &Photo) -> AppResult<()> {
        match self {
            Self::SQLite(db) => db.insert_photo(photo).await,
            Self::Memory(db) => db.insert_photo(photo).await,
        }
    }

    async fn get_photo(&self, photo_id: Uuid) -> AppResult<Option<Photo>> {
        match self {
            Self::SQLite(db) => db.get_photo(photo_id).await,
            Self::Memory(db) => db.get_photo(photo_id).await,
        }
    }

    async fn set_photo_visibility(&self, photo_id: Uuid, is_public: bool) -> AppResult<()> {
        match self {
            Self::SQLite(db) => db.set_photo_visibility(photo_id, is_public).await,
            Self::Memory(db) => db.set_photo_visibility(photo_id, is_public).await,
        }
    }

    async fn delete_photo(&self, photo_id: Uuid) -> AppResult<bool> {
        match self {
            Self::SQLite(db) => db.delete_photo(photo_id).await,
            Self::Memory(db) => db.delete_photo(photo_id).await,
        }
    }

    async fn list_photos(&self, member_id: &MemberId) -> AppResult<Vec<Photo>> {
        match self {
            Self::SQLite(db) => db.list_photos(member_id).await,
            Self::Memory(db) => db.list_photos(member_id).await,
        }
    }

    async fn count_photos(
        &self,
        member_id: &MemberId,
        since: Option<DateTime<Utc>>,
    ) -> AppResult<u32> {
        match self {
            Self::SQLite(db) => db.count_photos(member_id, since).await,
            Self::Memory(db) => db.count_photos(member_id, since).await,
        }
    }

    async fn upsert_daily_aggregate(&self, aggregate: &DailyAggregate) -> AppResult<()> {
        match self {
            Self::SQLite(db) => db.upsert_daily_aggregate(aggregate).await,
            Self::Memory(db) => db.upsert_daily_aggregate(aggregate).await,
        }
    }

    async fn get_daily_aggregate(&self, day: CalendarDay) -> AppResult<Option<DailyAggregate>> {
        match self {
            Self::SQLite(db) => db.get_daily_aggregate(day).await,
            Self::Memory(db) => db.get_daily_aggregate(day).await,
        }
    }

    async fn reset_member_data(&self, member_id: &MemberId) -> AppResult<Vec<CalendarDay>> {
        match self {
            Self::SQLite(db) => db.reset_member_data(member_id).await,
            Self::Memory(db) => db.reset_member_data(member_id).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_database_type() {
        assert_eq!(
            detect_database_type("sqlite:./data/a.db").unwrap(),
            DatabaseType::SQLite
        );
        assert_eq!(detect_database_type("memory").unwrap(), DatabaseType::Memory);
        assert_eq!(
            detect_database_type("sqlite::memory:").unwrap(),
            DatabaseType::Memory
        );
        assert!(detect_database_type("postgresql://localhost/db").is_err());
    }
}
