// ABOUTME: SQLite implementation of the DatabaseProvider trait using sqlx
// ABOUTME: Unique (member_id, calendar_day) index makes duplicate check-ins impossible
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! `SQLite` database implementation
//!
//! Timestamps are stored as fixed-width RFC 3339 strings (microseconds, `Z`), so
//! ordering by the text column orders by instant. Calendar days are stored as
//! `YYYY-MM-DD`.

use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use accountability_core::calendar::CalendarDay;
use accountability_core::models::{
    CheckIn, CheckInKind, DailyAggregate, FeedRecord, KindCounts, Member, MemberId,
    MemberProfile, MemberRole, MuscleGroup, Photo,
};
use accountability_core::pagination::PaginationParams;
use accountability_core::streak::StreakState;
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteRow};
use sqlx::{Error as SqlxError, Row, SqlitePool};
use tokio::fs;
use tracing::{debug, info};
use uuid::Uuid;

use super::DatabaseProvider;
use crate::errors::{AppError, AppResult};

/// Check-in columns, qualified with the `c` alias
const CHECK_IN_COLUMNS: &str = "c.id, c.member_id, c.kind, c.calendar_day, c.muscle_group, \
     c.note, c.is_note_public, c.photo_id, c.created_at";

/// Member columns
const MEMBER_COLUMNS: &str = "id, display_name, role, current_streak, longest_streak, \
     last_check_in_date, last_photo_date, created_at, last_active_at";

/// Photo columns
const PHOTO_COLUMNS: &str = "id, member_id, url, is_public, size_bytes, mime_type, created_at";

/// `SQLite` database implementation
#[derive(Clone)]
pub struct SqliteDatabase {
    pool: SqlitePool,
}

impl SqliteDatabase {
    /// Get a reference to the connection pool
    #[must_use]
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn open_pool(database_url: &str) -> AppResult<SqlitePool> {
        let in_memory = database_url.contains(":memory:");
        let mut options = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| AppError::config(format!("Invalid database URL {database_url}: {e}")))?
            .create_if_missing(true)
            .foreign_keys(true)
            .busy_timeout(Duration::from_secs(5));

        let mut pool_options = SqlitePoolOptions::new();
        if in_memory {
            // Every connection to `:memory:` would be a separate database
            pool_options = pool_options
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None);
        } else {
            options = options.journal_mode(SqliteJournalMode::Wal);
            pool_options = pool_options.max_connections(8);
            if let Some(parent) = options.get_filename().parent() {
                ensure_directory(parent).await?;
            }
        }

        pool_options
            .connect_with(options)
            .await
            .map_err(db_error("Failed to open SQLite database"))
    }

    fn row_to_member(row: &SqliteRow) -> AppResult<Member> {
        let role: String = row.try_get("role")?;
        Ok(Member {
            id: MemberId::new(row.try_get::<String, _>("id")?)?,
            display_name: row.try_get("display_name")?,
            role: role
                .parse()
                .map_err(|e: AppError| AppError::database(e.message))?,
            current_streak: to_u32(row.try_get("current_streak")?)?,
            longest_streak: to_u32(row.try_get("longest_streak")?)?,
            last_check_in_date: parse_optional_day(row.try_get("last_check_in_date")?)?,
            last_photo_date: parse_optional_day(row.try_get("last_photo_date")?)?,
            created_at: parse_timestamp(&row.try_get::<String, _>("created_at")?)?,
            last_active_at: parse_timestamp(&row.try_get::<String, _>("last_active_at")?)?,
        })
    }

    fn row_to_check_in(row: &SqliteRow) -> AppResult<CheckIn> {
        let kind: String = row.try_get("kind")?;
        let muscle_group: Option<String> = row.try_get("muscle_group")?;
        let photo_id: Option<String> = row.try_get("photo_id")?;
        Ok(CheckIn {
            id: parse_uuid(&row.try_get::<String, _>("id")?)?,
            member_id: MemberId::new(row.try_get::<String, _>("member_id")?)?,
            kind: CheckInKind::from_str(&kind).map_err(|e| AppError::database(e.message))?,
            calendar_day: parse_day(&row.try_get::<String, _>("calendar_day")?)?,
            muscle_group: muscle_group
                .map(|g| MuscleGroup::from_str(&g))
                .transpose()
                .map_err(|e| AppError::database(e.message))?,
            note: row.try_get("note")?,
            is_note_public: row.try_get("is_note_public")?,
            photo_id: photo_id.as_deref().map(parse_uuid).transpose()?,
            created_at: parse_timestamp(&row.try_get::<String, _>("created_at")?)?,
        })
    }

    fn row_to_photo(row: &SqliteRow, prefix: &str) -> AppResult<Photo> {
        let column = |name: &str| format!("{prefix}{name}");
        let size_bytes: i64 = row.try_get(column("size_bytes").as_str())?;
        Ok(Photo {
            id: parse_uuid(&row.try_get::<String, _>(column("id").as_str())?)?,
            member_id: MemberId::new(row.try_get::<String, _>(column("member_id").as_str())?)?,
            url: row.try_get(column("url").as_str())?,
            is_public: row.try_get(column("is_public").as_str())?,
            size_bytes: u64::try_from(size_bytes)
                .map_err(|_| AppError::database(format!("Negative photo size: {size_bytes}")))?,
            mime_type: row.try_get(column("mime_type").as_str())?,
            created_at: parse_timestamp(&row.try_get::<String, _>(column("created_at").as_str())?)?,
        })
    }

    fn row_to_feed_record(row: &SqliteRow) -> AppResult<FeedRecord> {
        let photo_id: Option<String> = row.try_get("p_id")?;
        let photo = match photo_id {
            Some(_) => Some(Self::row_to_photo(row, "p_")?),
            None => None,
        };
        Ok(FeedRecord {
            check_in: Self::row_to_check_in(row)?,
            photo,
            author_display_name: row.try_get("author_display_name")?,
        })
    }

    fn row_to_aggregate(row: &SqliteRow) -> AppResult<DailyAggregate> {
        Ok(DailyAggregate {
            day: parse_day(&row.try_get::<String, _>("day")?)?,
            total_members: to_u32(row.try_get("total_members")?)?,
            workout_count: to_u32(row.try_get("workout_count")?)?,
            rest_count: to_u32(row.try_get("rest_count")?)?,
            reflection_count: to_u32(row.try_get("reflection_count")?)?,
            active_today: to_u32(row.try_get("active_today")?)?,
            updated_at: Some(parse_timestamp(&row.try_get::<String, _>("updated_at")?)?),
        })
    }

    fn rows_to_kind_counts(rows: &[SqliteRow]) -> AppResult<KindCounts> {
        let mut counts = KindCounts::default();
        for row in rows {
            let kind: String = row.try_get("kind")?;
            let n = to_u32(row.try_get("n")?)?;
            let kind = CheckInKind::from_str(&kind).map_err(|e| AppError::database(e.message))?;
            counts.add(kind, n);
        }
        Ok(counts)
    }
}

#[async_trait]
impl DatabaseProvider for SqliteDatabase {
    async fn new(database_url: &str) -> AppResult<Self> {
        let pool = Self::open_pool(database_url).await?;
        let db = Self { pool };
        db.migrate().await?;
        info!("SQLite database ready");
        Ok(db)
    }

    async fn migrate(&self) -> AppResult<()> {
        let statements = [
            r"
            CREATE TABLE IF NOT EXISTS members (
                id TEXT PRIMARY KEY,
                display_name TEXT,
                role TEXT NOT NULL DEFAULT 'MEMBER' CHECK (role IN ('MEMBER', 'COACH')),
                current_streak INTEGER NOT NULL DEFAULT 0 CHECK (current_streak >= 0),
                longest_streak INTEGER NOT NULL DEFAULT 0,
                last_check_in_date TEXT,
                last_photo_date TEXT,
                created_at TEXT NOT NULL,
                last_active_at TEXT NOT NULL,
                CHECK (longest_streak >= current_streak)
            )
            ",
            r"
            CREATE TABLE IF NOT EXISTS photos (
                id TEXT PRIMARY KEY,
                member_id TEXT NOT NULL REFERENCES members(id) ON DELETE CASCADE,
                url TEXT NOT NULL,
                is_public BOOLEAN NOT NULL DEFAULT 0,
                size_bytes INTEGER NOT NULL,
                mime_type TEXT NOT NULL,
                created_at TEXT NOT NULL
            )
            ",
            r"
            CREATE TABLE IF NOT EXISTS check_ins (
                id TEXT PRIMARY KEY,
                member_id TEXT NOT NULL REFERENCES members(id) ON DELETE CASCADE,
                kind TEXT NOT NULL CHECK (kind IN ('WORKOUT', 'REST', 'REFLECTION')),
                calendar_day TEXT NOT NULL,
                muscle_group TEXT,
                note TEXT,
                is_note_public BOOLEAN NOT NULL DEFAULT 0,
                photo_id TEXT REFERENCES photos(id) ON DELETE SET NULL,
                created_at TEXT NOT NULL
            )
            ",
            "CREATE UNIQUE INDEX IF NOT EXISTS idx_check_ins_member_day ON check_ins(member_id, calendar_day)",
            "CREATE INDEX IF NOT EXISTS idx_check_ins_day ON check_ins(calendar_day)",
            "CREATE INDEX IF NOT EXISTS idx_check_ins_created_at ON check_ins(created_at)",
            "CREATE INDEX IF NOT EXISTS idx_photos_member ON photos(member_id, created_at)",
            r"
            CREATE TABLE IF NOT EXISTS daily_aggregates (
                day TEXT PRIMARY KEY,
                total_members INTEGER NOT NULL DEFAULT 0,
                workout_count INTEGER NOT NULL DEFAULT 0,
                rest_count INTEGER NOT NULL DEFAULT 0,
                reflection_count INTEGER NOT NULL DEFAULT 0,
                active_today INTEGER NOT NULL DEFAULT 0,
                updated_at TEXT NOT NULL
            )
            ",
        ];

        for statement in statements {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(db_error("Failed to run migration"))?;
        }
        debug!("SQLite migrations applied");
        Ok(())
    }

    async fn upsert_member(
        &self,
        profile: &MemberProfile,
        now: DateTime<Utc>,
    ) -> AppResult<Member> {
        sqlx::query(
            r"
            INSERT INTO members (id, display_name, role, created_at, last_active_at)
            VALUES ($1, $2, $3, $4, $4)
            ON CONFLICT(id) DO UPDATE SET
                display_name = COALESCE(excluded.display_name, members.display_name),
                role = CASE WHEN members.role = 'COACH' THEN 'COACH' ELSE excluded.role END,
                last_active_at = excluded.last_active_at
            ",
        )
        .bind(profile.id.as_str())
        .bind(profile.display_name.as_deref())
        .bind(profile.role.as_str())
        .bind(timestamp(&now))
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to upsert member"))?;

        self.get_member(&profile.id)
            .await?
            .ok_or_else(|| AppError::internal("Member missing after upsert"))
    }

    async fn get_member(&self, member_id: &MemberId) -> AppResult<Option<Member>> {
        let row = sqlx::query(&format!("SELECT {MEMBER_COLUMNS} FROM members WHERE id = $1"))
            .bind(member_id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to get member"))?;

        row.map(|r| Self::row_to_member(&r)).transpose()
    }

    async fn update_member_streak(
        &self,
        member_id: &MemberId,
        streak: &StreakState,
    ) -> AppResult<()> {
        sqlx::query(
            r"
            UPDATE members
            SET current_streak = $1, longest_streak = $2, last_check_in_date = $3
            WHERE id = $4
            ",
        )
        .bind(i64::from(streak.current_streak))
        .bind(i64::from(streak.longest_streak))
        .bind(streak.last_check_in_date.map(|d| d.to_string()))
        .bind(member_id.as_str())
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to update member streak"))?;

        Ok(())
    }

    async fn set_last_photo_date(&self, member_id: &MemberId, day: CalendarDay) -> AppResult<()> {
        sqlx::query("UPDATE members SET last_photo_date = $1 WHERE id = $2")
            .bind(day.to_string())
            .bind(member_id.as_str())
            .execute(&self.pool)
            .await
            .map_err(db_error("Failed to update last photo date"))?;

        Ok(())
    }

    async fn count_members(&self, role: MemberRole) -> AppResult<u32> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM members WHERE role = $1")
            .bind(role.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(db_error("Failed to count members"))?;

        to_u32(count)
    }

    async fn list_members(&self, role: MemberRole) -> AppResult<Vec<Member>> {
        let rows = sqlx::query(&format!(
            "SELECT {MEMBER_COLUMNS} FROM members WHERE role = $1 ORDER BY id"
        ))
        .bind(role.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list members"))?;

        rows.iter().map(Self::row_to_member).collect()
    }

    async fn insert_check_in(&self, check_in: &CheckIn) -> AppResult<()> {
        sqlx::query(
            r"
            INSERT INTO check_ins (
                id, member_id, kind, calendar_day, muscle_group, note,
                is_note_public, photo_id, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ",
        )
        .bind(check_in.id.to_string())
        .bind(check_in.member_id.as_str())
        .bind(check_in.kind.as_str())
        .bind(check_in.calendar_day.to_string())
        .bind(check_in.muscle_group.map(|g| g.as_str()))
        .bind(check_in.note.as_deref())
        .bind(check_in.is_note_public)
        .bind(check_in.photo_id.map(|id| id.to_string()))
        .bind(timestamp(&check_in.created_at))
        .execute(&self.pool)
        .await
        .map_err(|e| {
            let duplicate =
                matches!(&e, SqlxError::Database(db_err) if db_err.is_unique_violation());
            if duplicate {
                AppError::duplicate_check_in()
            } else {
                db_error("Failed to insert check-in")(e)
            }
        })?;

        Ok(())
    }

    async fn get_check_in(&self, check_in_id: Uuid) -> AppResult<Option<CheckIn>> {
        let row = sqlx::query(&format!(
            "SELECT {CHECK_IN_COLUMNS} FROM check_ins c WHERE c.id = $1"
        ))
        .bind(check_in_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to get check-in"))?;

        row.map(|r| Self::row_to_check_in(&r)).transpose()
    }

    async fn get_check_in_for_day(
        &self,
        member_id: &MemberId,
        day: CalendarDay,
    ) -> AppResult<Option<CheckIn>> {
        let row = sqlx::query(&format!(
            "SELECT {CHECK_IN_COLUMNS} FROM check_ins c WHERE c.member_id = $1 AND c.calendar_day = $2"
        ))
        .bind(member_id.as_str())
        .bind(day.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to get check-in for day"))?;

        row.map(|r| Self::row_to_check_in(&r)).transpose()
    }

    async fn list_check_ins(&self, member_id: &MemberId, limit: u32) -> AppResult<Vec<CheckIn>> {
        let rows = sqlx::query(&format!(
            r"
            SELECT {CHECK_IN_COLUMNS} FROM check_ins c
            WHERE c.member_id = $1
            ORDER BY c.calendar_day DESC
            LIMIT $2
            "
        ))
        .bind(member_id.as_str())
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list check-ins"))?;

        rows.iter().map(Self::row_to_check_in).collect()
    }

    async fn delete_check_in(&self, check_in_id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM check_ins WHERE id = $1")
            .bind(check_in_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(db_error("Failed to delete check-in"))?;

        Ok(result.rows_affected() > 0)
    }

    async fn set_note_visibility(&self, check_in_id: Uuid, is_public: bool) -> AppResult<()> {
        sqlx::query("UPDATE check_ins SET is_note_public = $1 WHERE id = $2")
            .bind(is_public)
            .bind(check_in_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(db_error("Failed to update note visibility"))?;

        Ok(())
    }

    async fn count_check_ins_by_kind(&self, day: CalendarDay) -> AppResult<KindCounts> {
        let rows = sqlx::query(
            "SELECT kind, COUNT(*) AS n FROM check_ins WHERE calendar_day = $1 GROUP BY kind",
        )
        .bind(day.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to count check-ins"))?;

        Self::rows_to_kind_counts(&rows)
    }

    async fn count_check_ins_since(&self, since: DateTime<Utc>) -> AppResult<KindCounts> {
        let rows = sqlx::query(
            "SELECT kind, COUNT(*) AS n FROM check_ins WHERE created_at >= $1 GROUP BY kind",
        )
        .bind(timestamp(&since))
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to count recent check-ins"))?;

        Self::rows_to_kind_counts(&rows)
    }

    async fn list_feed_records(&self, params: PaginationParams) -> AppResult<Vec<FeedRecord>> {
        let rows = sqlx::query(&format!(
            r"
            SELECT {CHECK_IN_COLUMNS},
                   m.display_name AS author_display_name,
                   p.id AS p_id, p.member_id AS p_member_id, p.url AS p_url,
                   p.is_public AS p_is_public, p.size_bytes AS p_size_bytes,
                   p.mime_type AS p_mime_type, p.created_at AS p_created_at
            FROM check_ins c
            JOIN members m ON m.id = c.member_id
            LEFT JOIN photos p ON p.id = c.photo_id
            WHERE c.is_note_public = 1 OR p.is_public = 1
            ORDER BY c.created_at DESC, c.id DESC
            LIMIT $1 OFFSET $2
            "
        ))
        .bind(i64::from(params.limit))
        .bind(i64::from(params.offset))
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list feed"))?;

        rows.iter().map(Self::row_to_feed_record).collect()
    }

    async fn insert_photo(&self, photo: &Photo) -> AppResult<()> {
        let size_bytes = i64::try_from(photo.size_bytes)
            .map_err(|_| AppError::invalid_input("Photo size out of range"))?;
        sqlx::query(
            r"
            INSERT INTO photos (id, member_id, url, is_public, size_bytes, mime_type, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ",
        )
        .bind(photo.id.to_string())
        .bind(photo.member_id.as_str())
        .bind(&photo.url)
        .bind(photo.is_public)
        .bind(size_bytes)
        .bind(&photo.mime_type)
        .bind(timestamp(&photo.created_at))
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to insert photo"))?;

        Ok(())
    }

    async fn get_photo(&self, photo_id: Uuid) -> AppResult<Option<Photo>> {
        let row = sqlx::query(&format!("SELECT {PHOTO_COLUMNS} FROM photos WHERE id = $1"))
            .bind(photo_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to get photo"))?;

        row.map(|r| Self::row_to_photo(&r, "")).transpose()
    }

    async fn set_photo_visibility(&self, photo_id: Uuid, is_public: bool) -> AppResult<()> {
        sqlx::query("UPDATE photos SET is_public = $1 WHERE id = $2")
            .bind(is_public)
            .bind(photo_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(db_error("Failed to update photo visibility"))?;

        Ok(())
    }

    async fn delete_photo(&self, photo_id: Uuid) -> AppResult<bool> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin transaction"))?;

        sqlx::query("UPDATE check_ins SET photo_id = NULL WHERE photo_id = $1")
            .bind(photo_id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(db_error("Failed to detach photo"))?;

        let result = sqlx::query("DELETE FROM photos WHERE id = $1")
            .bind(photo_id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(db_error("Failed to delete photo"))?;

        tx.commit()
            .await
            .map_err(db_error("Failed to commit photo deletion"))?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_photos(&self, member_id: &MemberId) -> AppResult<Vec<Photo>> {
        let rows = sqlx::query(&format!(
            "SELECT {PHOTO_COLUMNS} FROM photos WHERE member_id = $1 ORDER BY created_at DESC"
        ))
        .bind(member_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list photos"))?;

        rows.iter().map(|r| Self::row_to_photo(r, "")).collect()
    }

    async fn count_photos(
        &self,
        member_id: &MemberId,
        since: Option<DateTime<Utc>>,
    ) -> AppResult<u32> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM photos WHERE member_id = $1 AND ($2 IS NULL OR created_at >= $2)",
        )
        .bind(member_id.as_str())
        .bind(since.map(|s| timestamp(&s)))
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("Failed to count photos"))?;

        to_u32(count)
    }

    async fn upsert_daily_aggregate(&self, aggregate: &DailyAggregate) -> AppResult<()> {
        let updated_at = aggregate.updated_at.unwrap_or_else(Utc::now);
        sqlx::query(
            r"
            INSERT INTO daily_aggregates (
                day, total_members, workout_count, rest_count, reflection_count,
                active_today, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT(day) DO UPDATE SET
                total_members = excluded.total_members,
                workout_count = excluded.workout_count,
                rest_count = excluded.rest_count,
                reflection_count = excluded.reflection_count,
                active_today = excluded.active_today,
                updated_at = excluded.updated_at
            ",
        )
        .bind(aggregate.day.to_string())
        .bind(i64::from(aggregate.total_members))
        .bind(i64::from(aggregate.workout_count))
        .bind(i64::from(aggregate.rest_count))
        .bind(i64::from(aggregate.reflection_count))
        .bind(i64::from(aggregate.active_today))
        .bind(timestamp(&updated_at))
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to upsert daily aggregate"))?;

        Ok(())
    }

    async fn get_daily_aggregate(&self, day: CalendarDay) -> AppResult<Option<DailyAggregate>> {
        let row = sqlx::query(
            r"
            SELECT day, total_members, workout_count, rest_count, reflection_count,
                   active_today, updated_at
            FROM daily_aggregates
            WHERE day = $1
            ",
        )
        .bind(day.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to get daily aggregate"))?;

        row.map(|r| Self::row_to_aggregate(&r)).transpose()
    }

    async fn reset_member_data(&self, member_id: &MemberId) -> AppResult<Vec<CalendarDay>> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin transaction"))?;

        let days: Vec<String> = sqlx::query_scalar(
            "SELECT DISTINCT calendar_day FROM check_ins WHERE member_id = $1 ORDER BY calendar_day",
        )
        .bind(member_id.as_str())
        .fetch_all(&mut *tx)
        .await
        .map_err(db_error("Failed to list check-in days"))?;

        sqlx::query("DELETE FROM check_ins WHERE member_id = $1")
            .bind(member_id.as_str())
            .execute(&mut *tx)
            .await
            .map_err(db_error("Failed to delete check-ins"))?;

        sqlx::query("DELETE FROM photos WHERE member_id = $1")
            .bind(member_id.as_str())
            .execute(&mut *tx)
            .await
            .map_err(db_error("Failed to delete photos"))?;

        sqlx::query(
            r"
            UPDATE members
            SET current_streak = 0, longest_streak = 0,
                last_check_in_date = NULL, last_photo_date = NULL
            WHERE id = $1
            ",
        )
        .bind(member_id.as_str())
        .execute(&mut *tx)
        .await
        .map_err(db_error("Failed to reset member streak"))?;

        tx.commit()
            .await
            .map_err(db_error("Failed to commit data reset"))?;

        days.iter().map(|d| parse_day(d)).collect()
    }
}

/// Map a sqlx error, keeping transient failures retryable and prefixing `context`
fn db_error(context: &'static str) -> impl FnOnce(SqlxError) -> AppError {
    move |e| {
        let mut error = AppError::from(e);
        error.message = format!("{context}: {}", error.message);
        error
    }
}

/// Create the database directory when it does not exist yet
async fn ensure_directory(dir: &Path) -> AppResult<()> {
    if dir.as_os_str().is_empty() {
        return Ok(());
    }
    fs::create_dir_all(dir).await.map_err(|e| {
        AppError::storage_unavailable(format!(
            "Failed to create database directory {}: {e}",
            dir.display()
        ))
    })
}

/// Fixed-width RFC 3339 representation used for every stored instant
fn timestamp(instant: &DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(raw: &str) -> AppResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| AppError::database(format!("Invalid date: {e}")))
}

fn parse_day(raw: &str) -> AppResult<CalendarDay> {
    raw.parse()
        .map_err(|_| AppError::database(format!("Invalid calendar day: {raw}")))
}

fn parse_optional_day(raw: Option<String>) -> AppResult<Option<CalendarDay>> {
    raw.as_deref().map(parse_day).transpose()
}

fn parse_uuid(raw: &str) -> AppResult<Uuid> {
    Uuid::parse_str(raw).map_err(|e| AppError::database(format!("Invalid UUID: {e}")))
}

fn to_u32(value: i64) -> AppResult<u32> {
    u32::try_from(value).map_err(|_| AppError::database(format!("Count out of range: {value}")))
}
