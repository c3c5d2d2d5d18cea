// ABOUTME: Privacy-safe projection of ledger records into public feed entries
// ABOUTME: Note text and photo URL are filtered independently on their own flags
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Feed projection
//!
//! Storage hands back [`FeedRecord`]s; the only way to turn one into something that
//! leaves the process is [`FeedEntry::project`]. A private note never reaches a
//! [`FeedEntry`], and neither does the URL of a private photo.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::calendar::CalendarDay;

use super::{CheckIn, CheckInKind, MemberId, MuscleGroup, Photo};

/// A ledger record joined with its photo and author, before filtering
#[derive(Debug, Clone)]
pub struct FeedRecord {
    /// The check-in
    pub check_in: CheckIn,
    /// Linked photo, if any
    pub photo: Option<Photo>,
    /// Author display name
    pub author_display_name: Option<String>,
}

impl FeedRecord {
    /// Whether anything about this record is public
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.check_in.is_note_public || self.photo.as_ref().is_some_and(|p| p.is_public)
    }
}

/// Author shown on a feed entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedAuthor {
    /// Member identifier
    pub id: MemberId,
    /// Display name
    pub display_name: Option<String>,
}

/// Public photo reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedPhoto {
    /// Photo identifier
    pub id: Uuid,
    /// Blob URL
    pub url: String,
}

/// Outward view of a check-in in the public feed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedEntry {
    /// Check-in identifier
    pub id: Uuid,
    /// Author
    pub author: FeedAuthor,
    /// Check-in kind
    pub kind: CheckInKind,
    /// Workout focus
    pub muscle_group: Option<MuscleGroup>,
    /// Calendar day
    pub calendar_day: CalendarDay,
    /// Note text, present only when the note is public
    pub note: Option<String>,
    /// Photo, present only when the photo is public
    pub photo: Option<FeedPhoto>,
    /// Creation time
    pub created_at: DateTime<Utc>,
}

impl FeedEntry {
    /// Project a record, or `None` when nothing about it is public
    #[must_use]
    pub fn project(record: FeedRecord) -> Option<Self> {
        if !record.is_visible() {
            return None;
        }
        let FeedRecord {
            check_in,
            photo,
            author_display_name,
        } = record;

        let note = check_in.note.filter(|_| check_in.is_note_public);
        let photo = photo
            .filter(|p| p.is_public)
            .map(|p| FeedPhoto { id: p.id, url: p.url });

        Some(Self {
            id: check_in.id,
            author: FeedAuthor {
                id: check_in.member_id,
                display_name: author_display_name,
            },
            kind: check_in.kind,
            muscle_group: check_in.muscle_group,
            calendar_day: check_in.calendar_day,
            note,
            photo,
            created_at: check_in.created_at,
        })
    }
}
