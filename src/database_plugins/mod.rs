// ABOUTME: Database abstraction layer for the accountability server
// ABOUTME: Plugin architecture with SQLite and in-memory backends behind one trait
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Durable store
//!
//! Everything the check-in engine persists goes through [`DatabaseProvider`]. The
//! one-check-in-per-member-per-day rule is enforced by each backend inside
//! [`DatabaseProvider::insert_check_in`], never by a read-then-write in the caller.

use accountability_core::calendar::CalendarDay;
use accountability_core::models::{
    CheckIn, DailyAggregate, FeedRecord, KindCounts, Member, MemberId, MemberProfile, MemberRole,
    Photo,
};
use accountability_core::pagination::PaginationParams;
use accountability_core::streak::StreakState;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::errors::AppResult;

pub mod factory;
pub mod memory;
pub mod sqlite;

/// Core database abstraction trait
///
/// All database implementations must implement this trait to provide
/// a consistent interface for the service layer.
#[async_trait]
pub trait DatabaseProvider: Send + Sync + Clone {
    /// Open a store at `database_url` and run migrations
    async fn new(database_url: &str) -> AppResult<Self>
    where
        Self: Sized;

    /// Create tables and indexes if they do not exist
    async fn migrate(&self) -> AppResult<()>;

    // ================================
    // Members
    // ================================

    /// Create the member or refresh their display name and activity time
    ///
    /// An existing coach keeps the coach role whatever `profile.role` says.
    async fn upsert_member(&self, profile: &MemberProfile, now: DateTime<Utc>)
        -> AppResult<Member>;

    /// Get a member by id
    async fn get_member(&self, member_id: &MemberId) -> AppResult<Option<Member>>;

    /// Overwrite the stored streak fields
    async fn update_member_streak(&self, member_id: &MemberId, streak: &StreakState)
        -> AppResult<()>;

    /// Record the day of the member's latest photo upload
    async fn set_last_photo_date(&self, member_id: &MemberId, day: CalendarDay) -> AppResult<()>;

    /// Number of members with `role`
    async fn count_members(&self, role: MemberRole) -> AppResult<u32>;

    /// All members with `role`, ordered by id
    async fn list_members(&self, role: MemberRole) -> AppResult<Vec<Member>>;

    // ================================
    // Check-ins
    // ================================

    /// Insert a check-in atomically
    ///
    /// Fails with `DuplicateCheckIn` when the member already has a check-in on
    /// `check_in.calendar_day`, including when two inserts race.
    async fn insert_check_in(&self, check_in: &CheckIn) -> AppResult<()>;

    /// Get a check-in by id
    async fn get_check_in(&self, check_in_id: Uuid) -> AppResult<Option<CheckIn>>;

    /// Get a member's check-in for a day
    async fn get_check_in_for_day(
        &self,
        member_id: &MemberId,
        day: CalendarDay,
    ) -> AppResult<Option<CheckIn>>;

    /// A member's most recent check-ins, newest calendar day first
    async fn list_check_ins(&self, member_id: &MemberId, limit: u32) -> AppResult<Vec<CheckIn>>;

    /// Delete a check-in; returns false when it did not exist
    async fn delete_check_in(&self, check_in_id: Uuid) -> AppResult<bool>;

    /// Set `is_note_public` on a check-in
    async fn set_note_visibility(&self, check_in_id: Uuid, is_public: bool) -> AppResult<()>;

    /// Count the check-ins of each kind stamped with `day`
    async fn count_check_ins_by_kind(&self, day: CalendarDay) -> AppResult<KindCounts>;

    /// Count the check-ins of each kind created at or after `since`
    async fn count_check_ins_since(&self, since: DateTime<Utc>) -> AppResult<KindCounts>;

    /// Check-ins with a public note or a public photo, newest `created_at` first
    ///
    /// Records come back unfiltered; callers project them through
    /// `FeedEntry::project` before they leave the process.
    async fn list_feed_records(&self, params: PaginationParams) -> AppResult<Vec<FeedRecord>>;

    // ================================
    // Photos
    // ================================

    /// Insert a photo record
    async fn insert_photo(&self, photo: &Photo) -> AppResult<()>;

    /// Get a photo by id
    async fn get_photo(&self, photo_id: Uuid) -> AppResult<Option<Photo>>;

    /// Set `is_public` on a photo
    async fn set_photo_visibility(&self, photo_id: Uuid, is_public: bool) -> AppResult<()>;

    /// Delete a photo and clear references to it; returns false when it did not exist
    async fn delete_photo(&self, photo_id: Uuid) -> AppResult<bool>;

    /// All photos uploaded by a member
    async fn list_photos(&self, member_id: &MemberId) -> AppResult<Vec<Photo>>;

    /// Number of photos uploaded by a member, optionally only those at or after `since`
    async fn count_photos(
        &self,
        member_id: &MemberId,
        since: Option<DateTime<Utc>>,
    ) -> AppResult<u32>;

    // ================================
    // Daily aggregates
    // ================================

    /// Insert or replace the aggregate row for `aggregate.day`
    async fn upsert_daily_aggregate(&self, aggregate: &DailyAggregate) -> AppResult<()>;

    /// Get the stored aggregate for a day
    async fn get_daily_aggregate(&self, day: CalendarDay) -> AppResult<Option<DailyAggregate>>;

    // ================================
    // Data reset
    // ================================

    /// Delete a member's check-ins and photos and zero their streak fields
    ///
    /// Returns the distinct calendar days that lost a check-in.
    async fn reset_member_data(&self, member_id: &MemberId) -> AppResult<Vec<CalendarDay>>;
}
