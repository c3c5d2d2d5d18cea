// ABOUTME: In-memory implementation of the DatabaseProvider trait for tests and demos
// ABOUTME: All state sits behind one async RwLock so check + insert is a single critical section
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use accountability_core::calendar::CalendarDay;
use accountability_core::models::{
    CheckIn, DailyAggregate, FeedRecord, KindCounts, Member, MemberId, MemberProfile, MemberRole,
    Photo,
};
use accountability_core::pagination::PaginationParams;
use accountability_core::streak::StreakState;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use super::DatabaseProvider;
use crate::errors::{AppError, AppResult};

#[derive(Debug, Default)]
struct State {
    members: HashMap<MemberId, Member>,
    check_ins: HashMap<Uuid, CheckIn>,
    day_index: HashMap<(MemberId, CalendarDay), Uuid>,
    photos: HashMap<Uuid, Photo>,
    aggregates: BTreeMap<CalendarDay, DailyAggregate>,
}

impl State {
    fn member_mut(&mut self, member_id: &MemberId) -> AppResult<&mut Member> {
        self.members
            .get_mut(member_id)
            .ok_or_else(|| AppError::not_found(format!("Member {member_id}")))
    }
}

/// Volatile store with the same contract as the `SQLite` backend
#[derive(Clone, Default)]
pub struct InMemoryDatabase {
    state: Arc<RwLock<State>>,
}

impl InMemoryDatabase {
    /// Create an empty store
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DatabaseProvider for InMemoryDatabase {
    async fn new(_database_url: &str) -> AppResult<Self> {
        debug!("Using in-memory database");
        Ok(Self::empty())
    }

    async fn migrate(&self) -> AppResult<()> {
        Ok(())
    }

    async fn upsert_member(
        &self,
        profile: &MemberProfile,
        now: DateTime<Utc>,
    ) -> AppResult<Member> {
        let mut state = self.state.write().await;
        let member = state
            .members
            .entry(profile.id.clone())
            .and_modify(|existing| {
                if profile.display_name.is_some() {
                    existing.display_name.clone_from(&profile.display_name);
                }
                if !existing.is_coach() {
                    existing.role = profile.role;
                }
                existing.last_active_at = now;
            })
            .or_insert_with(|| Member::new(profile.clone(), now));
        Ok(member.clone())
    }

    async fn get_member(&self, member_id: &MemberId) -> AppResult<Option<Member>> {
        Ok(self.state.read().await.members.get(member_id).cloned())
    }

    async fn update_member_streak(
        &self,
        member_id: &MemberId,
        streak: &StreakState,
    ) -> AppResult<()> {
        let mut state = self.state.write().await;
        let member = state.member_mut(member_id)?;
        member.current_streak = streak.current_streak;
        member.longest_streak = streak.longest_streak;
        member.last_check_in_date = streak.last_check_in_date;
        Ok(())
    }

    async fn set_last_photo_date(&self, member_id: &MemberId, day: CalendarDay) -> AppResult<()> {
        let mut state = self.state.write().await;
        state.member_mut(member_id)?.last_photo_date = Some(day);
        Ok(())
    }

    async fn count_members(&self, role: MemberRole) -> AppResult<u32> {
        let state = self.state.read().await;
        let count = state.members.values().filter(|m| m.role == role).count();
        u32::try_from(count).map_err(|_| AppError::database("Member count out of range"))
    }

    async fn list_members(&self, role: MemberRole) -> AppResult<Vec<Member>> {
        let state = self.state.read().await;
        let mut members: Vec<Member> = state
            .members
            .values()
            .filter(|m| m.role == role)
            .cloned()
            .collect();
        members.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(members)
    }

    async fn insert_check_in(&self, check_in: &CheckIn) -> AppResult<()> {
        let mut state = self.state.write().await;
        if !state.members.contains_key(&check_in.member_id) {
            return Err(AppError::not_found(format!("Member {}", check_in.member_id)));
        }
        let key = (check_in.member_id.clone(), check_in.calendar_day);
        if state.day_index.contains_key(&key) {
            return Err(AppError::duplicate_check_in());
        }
        state.day_index.insert(key, check_in.id);
        state.check_ins.insert(check_in.id, check_in.clone());
        Ok(())
    }

    async fn get_check_in(&self, check_in_id: Uuid) -> AppResult<Option<CheckIn>> {
        Ok(self.state.read().await.check_ins.get(&check_in_id).cloned())
    }

    async fn get_check_in_for_day(
        &self,
        member_id: &MemberId,
        day: CalendarDay,
    ) -> AppResult<Option<CheckIn>> {
        let state = self.state.read().await;
        Ok(state
            .day_index
            .get(&(member_id.clone(), day))
            .and_then(|id| state.check_ins.get(id))
            .cloned())
    }

    async fn list_check_ins(&self, member_id: &MemberId, limit: u32) -> AppResult<Vec<CheckIn>> {
        let state = self.state.read().await;
        let mut check_ins: Vec<CheckIn> = state
            .check_ins
            .values()
            .filter(|c| &c.member_id == member_id)
            .cloned()
            .collect();
        check_ins.sort_by(|a, b| b.calendar_day.cmp(&a.calendar_day));
        check_ins.truncate(limit as usize);
        Ok(check_ins)
    }

    async fn delete_check_in(&self, check_in_id: Uuid) -> AppResult<bool> {
        let mut state = self.state.write().await;
        let Some(removed) = state.check_ins.remove(&check_in_id) else {
            return Ok(false);
        };
        state
            .day_index
            .remove(&(removed.member_id, removed.calendar_day));
        Ok(true)
    }

    async fn set_note_visibility(&self, check_in_id: Uuid, is_public: bool) -> AppResult<()> {
        let mut state = self.state.write().await;
        let check_in = state
            .check_ins
            .get_mut(&check_in_id)
            .ok_or_else(|| AppError::not_found("Check-in"))?;
        check_in.is_note_public = is_public;
        Ok(())
    }

    async fn count_check_ins_by_kind(&self, day: CalendarDay) -> AppResult<KindCounts> {
        let state = self.state.read().await;
        Ok(state
            .check_ins
            .values()
            .filter(|c| c.calendar_day == day)
            .map(|c| c.kind)
            .collect())
    }

    async fn count_check_ins_since(&self, since: DateTime<Utc>) -> AppResult<KindCounts> {
        let state = self.state.read().await;
        Ok(state
            .check_ins
            .values()
            .filter(|c| c.created_at >= since)
            .map(|c| c.kind)
            .collect())
    }

    async fn list_feed_records(&self, params: PaginationParams) -> AppResult<Vec<FeedRecord>> {
        let state = self.state.read().await;
        let mut records: Vec<FeedRecord> = state
            .check_ins
            .values()
            .map(|c| FeedRecord {
                check_in: c.clone(),
                photo: c.photo_id.and_then(|id| state.photos.get(&id)).cloned(),
                author_display_name: state
                    .members
                    .get(&c.member_id)
                    .and_then(|m| m.display_name.clone()),
            })
            .filter(FeedRecord::is_visible)
            .collect();

        records.sort_by(|a, b| {
            b.check_in
                .created_at
                .cmp(&a.check_in.created_at)
                .then_with(|| b.check_in.id.cmp(&a.check_in.id))
        });

        Ok(records
            .into_iter()
            .skip(params.offset as usize)
            .take(params.limit as usize)
            .collect())
    }

    async fn insert_photo(&self, photo: &Photo) -> AppResult<()> {
        let mut state = self.state.write().await;
        if !state.members.contains_key(&photo.member_id) {
            return Err(AppError::not_found(format!("Member {}", photo.member_id)));
        }
        state.photos.insert(photo.id, photo.clone());
        Ok(())
    }

    async fn get_photo(&self, photo_id: Uuid) -> AppResult<Option<Photo>> {
        Ok(self.state.read().await.photos.get(&photo_id).cloned())
    }

    async fn set_photo_visibility(&self, photo_id: Uuid, is_public: bool) -> AppResult<()> {
        let mut state = self.state.write().await;
        let photo = state
            .photos
            .get_mut(&photo_id)
            .ok_or_else(|| AppError::not_found("Photo"))?;
        photo.is_public = is_public;
        Ok(())
    }

    async fn delete_photo(&self, photo_id: Uuid) -> AppResult<bool> {
        let mut state = self.state.write().await;
        if state.photos.remove(&photo_id).is_none() {
            return Ok(false);
        }
        for check_in in state.check_ins.values_mut() {
            if check_in.photo_id == Some(photo_id) {
                check_in.photo_id = None;
            }
        }
        Ok(true)
    }

    async fn list_photos(&self, member_id: &MemberId) -> AppResult<Vec<Photo>> {
        let state = self.state.read().await;
        let mut photos: Vec<Photo> = state
            .photos
            .values()
            .filter(|p| &p.member_id == member_id)
            .cloned()
            .collect();
        photos.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(photos)
    }

    async fn count_photos(
        &self,
        member_id: &MemberId,
        since: Option<DateTime<Utc>>,
    ) -> AppResult<u32> {
        let state = self.state.read().await;
        let count = state
            .photos
            .values()
            .filter(|p| &p.member_id == member_id)
            .filter(|p| since.is_none_or(|s| p.created_at >= s))
            .count();
        u32::try_from(count).map_err(|_| AppError::database("Photo count out of range"))
    }

    async fn upsert_daily_aggregate(&self, aggregate: &DailyAggregate) -> AppResult<()> {
        let mut stored = aggregate.clone();
        stored.updated_at.get_or_insert_with(Utc::now);
        self.state
            .write()
            .await
            .aggregates
            .insert(aggregate.day, stored);
        Ok(())
    }

    async fn get_daily_aggregate(&self, day: CalendarDay) -> AppResult<Option<DailyAggregate>> {
        Ok(self.state.read().await.aggregates.get(&day).cloned())
    }

    async fn reset_member_data(&self, member_id: &MemberId) -> AppResult<Vec<CalendarDay>> {
        let mut state = self.state.write().await;

        let removed: Vec<Uuid> = state
            .check_ins
            .values()
            .filter(|c| &c.member_id == member_id)
            .map(|c| c.id)
            .collect();
        let mut days = Vec::with_capacity(removed.len());
        for id in removed {
            if let Some(check_in) = state.check_ins.remove(&id) {
                state
                    .day_index
                    .remove(&(check_in.member_id, check_in.calendar_day));
                days.push(check_in.calendar_day);
            }
        }
        days.sort_unstable();
        days.dedup();

        state.photos.retain(|_, p| &p.member_id != member_id);

        if let Some(member) = state.members.get_mut(member_id) {
            member.current_streak = 0;
            member.longest_streak = 0;
            member.last_check_in_date = None;
            member.last_photo_date = None;
        }

        Ok(days)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use accountability_core::errors::ErrorCode;
    use accountability_core::models::{CheckInDetails, CheckInKind};
    use chrono::TimeZone;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 3, hour, 0, 0).unwrap()
    }

    async fn seeded() -> (InMemoryDatabase, MemberId) {
        let db = InMemoryDatabase::empty();
        let id = MemberId::new("alice").unwrap();
        db.upsert_member(&MemberProfile::member(id.clone()), at(8))
            .await
            .unwrap();
        (db, id)
    }

    #[tokio::test]
    async fn test_second_check_in_same_day_is_duplicate() {
        let (db, id) = seeded().await;
        let first = CheckIn::new(id.clone(), CheckInKind::Rest, CheckInDetails::default(), at(9));
        let second = CheckIn::new(id, CheckInKind::Rest, CheckInDetails::default(), at(21));

        db.insert_check_in(&first).await.unwrap();
        let err = db.insert_check_in(&second).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::DuplicateCheckIn);
    }

    #[tokio::test]
    async fn test_coach_is_never_demoted() {
        let db = InMemoryDatabase::empty();
        let id = MemberId::new("coach-1").unwrap();
        let coach = MemberProfile {
            id: id.clone(),
            display_name: Some("Coach".into()),
            role: MemberRole::Coach,
        };
        db.upsert_member(&coach, at(8)).await.unwrap();
        let member = db
            .upsert_member(&MemberProfile::member(id), at(9))
            .await
            .unwrap();

        assert!(member.is_coach());
        assert_eq!(member.display_name.as_deref(), Some("Coach"));
    }

    #[tokio::test]
    async fn test_delete_frees_the_day() {
        let (db, id) = seeded().await;
        let check_in = CheckIn::new(id.clone(), CheckInKind::Rest, CheckInDetails::default(), at(9));
        db.insert_check_in(&check_in).await.unwrap();

        assert!(db.delete_check_in(check_in.id).await.unwrap());
        assert!(!db.delete_check_in(check_in.id).await.unwrap());

        let again = CheckIn::new(id, CheckInKind::Rest, CheckInDetails::default(), at(10));
        db.insert_check_in(&again).await.unwrap();
    }
}
