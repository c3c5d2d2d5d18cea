// ABOUTME: Check-in ledger records and their admission rules
// ABOUTME: CheckInKind, MuscleGroup, CheckInDetails validation, and history heat map points
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::calendar::CalendarDay;
use crate::constants::checkins::MAX_NOTE_CHARS;
use crate::errors::{AppError, AppResult};

use super::MemberId;

// ============================================================================
// Enums
// ============================================================================

/// Kind of daily activity a member reports
#[non_exhaustive]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CheckInKind {
    /// Training session; maintains the streak
    Workout,
    /// Planned rest day; maintains the streak
    Rest,
    /// Honest reflection without activity; resets the streak
    Reflection,
}

impl CheckInKind {
    /// All kinds, in aggregate column order
    pub const ALL: [Self; 3] = [Self::Workout, Self::Rest, Self::Reflection];

    /// Database string representation
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Workout => "WORKOUT",
            Self::Rest => "REST",
            Self::Reflection => "REFLECTION",
        }
    }

    /// Whether this kind extends a running streak
    #[must_use]
    pub const fn maintains_streak(&self) -> bool {
        matches!(self, Self::Workout | Self::Rest)
    }

    /// Intensity value used by the history heat map
    #[must_use]
    pub const fn heatmap_value(&self) -> u8 {
        match self {
            Self::Workout => 1,
            Self::Rest => 2,
            Self::Reflection => 0,
        }
    }
}

impl Display for CheckInKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

impl FromStr for CheckInKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "WORKOUT" => Ok(Self::Workout),
            "REST" => Ok(Self::Rest),
            "REFLECTION" => Ok(Self::Reflection),
            _ => Err(AppError::invalid_input(
                "Valid check-in type is required (WORKOUT, REST, or REFLECTION)",
            )),
        }
    }
}

/// Training focus of a workout check-in
#[non_exhaustive]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MuscleGroup {
    /// Push day (chest, shoulders, triceps)
    Push,
    /// Pull day (back, biceps)
    Pull,
    /// Lower body
    Legs,
    /// Upper body
    Upper,
    /// Full body session
    FullBody,
    /// Conditioning
    Cardio,
    /// Anything else
    Custom,
}

impl MuscleGroup {
    /// Database string representation
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Push => "PUSH",
            Self::Pull => "PULL",
            Self::Legs => "LEGS",
            Self::Upper => "UPPER",
            Self::FullBody => "FULL_BODY",
            Self::Cardio => "CARDIO",
            Self::Custom => "CUSTOM",
        }
    }
}

impl Display for MuscleGroup {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

impl FromStr for MuscleGroup {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().replace([' ', '-'], "_").as_str() {
            "PUSH" => Ok(Self::Push),
            "PULL" => Ok(Self::Pull),
            "LEGS" => Ok(Self::Legs),
            "UPPER" => Ok(Self::Upper),
            "FULL_BODY" => Ok(Self::FullBody),
            "CARDIO" => Ok(Self::Cardio),
            "CUSTOM" => Ok(Self::Custom),
            _ => Err(AppError::invalid_input(format!("Invalid muscle group: {s}"))),
        }
    }
}

/// Visibility flag an owner can toggle after creation
#[non_exhaustive]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum VisibilityField {
    /// The check-in's `is_note_public`
    Note,
    /// The linked photo's `is_public`
    Photo,
}

impl FromStr for VisibilityField {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "note" => Ok(Self::Note),
            "photo" => Ok(Self::Photo),
            _ => Err(AppError::invalid_input(format!(
                "Invalid visibility field: {s} (expected note or photo)"
            ))),
        }
    }
}

// ============================================================================
// Records
// ============================================================================

/// Optional parts of a check-in submission
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckInDetails {
    /// Workout focus; required for workouts
    pub muscle_group: Option<MuscleGroup>,
    /// Free text
    pub note: Option<String>,
    /// Whether the note may appear in the public feed
    #[serde(default)]
    pub is_note_public: bool,
    /// Previously uploaded photo owned by the submitter
    pub photo_id: Option<Uuid>,
}

impl CheckInDetails {
    /// Validate and normalize details for `kind`
    ///
    /// A muscle group supplied for a non-workout kind is dropped; notes are trimmed and
    /// blank notes are treated as absent.
    ///
    /// # Errors
    ///
    /// Returns a validation error when a workout has no muscle group or the note is too long
    pub fn validate_for(self, kind: CheckInKind) -> AppResult<Self> {
        let muscle_group = match (kind, self.muscle_group) {
            (CheckInKind::Workout, None) => {
                return Err(AppError::invalid_input(
                    "Muscle group is required for workout check-ins",
                ));
            }
            (CheckInKind::Workout, group) => group,
            _ => None,
        };

        let note = self
            .note
            .map(|n| n.trim().to_owned())
            .filter(|n| !n.is_empty());
        if let Some(text) = &note {
            if text.chars().count() > MAX_NOTE_CHARS {
                return Err(AppError::invalid_input(format!(
                    "Note must be at most {MAX_NOTE_CHARS} characters"
                )));
            }
        }

        Ok(Self {
            muscle_group,
            note,
            is_note_public: self.is_note_public,
            photo_id: self.photo_id,
        })
    }
}

/// One member's check-in for one calendar day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckIn {
    /// Unique identifier
    pub id: Uuid,
    /// Owning member
    pub member_id: MemberId,
    /// Immutable kind
    pub kind: CheckInKind,
    /// Immutable canonical day
    pub calendar_day: CalendarDay,
    /// Workout focus
    pub muscle_group: Option<MuscleGroup>,
    /// Free text
    pub note: Option<String>,
    /// Whether the note is public
    pub is_note_public: bool,
    /// Linked photo
    pub photo_id: Option<Uuid>,
    /// Wall-clock creation time
    pub created_at: DateTime<Utc>,
}

impl CheckIn {
    /// Build a new check-in stamped with the day of `created_at`
    #[must_use]
    pub fn new(
        member_id: MemberId,
        kind: CheckInKind,
        details: CheckInDetails,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            member_id,
            kind,
            calendar_day: CalendarDay::normalize(&created_at),
            muscle_group: details.muscle_group,
            note: details.note,
            is_note_public: details.is_note_public,
            photo_id: details.photo_id,
            created_at,
        }
    }

    /// Whether the owner may still delete this check-in at `now`
    #[must_use]
    pub fn within_deletion_window(&self, now: DateTime<Utc>, window: Duration) -> bool {
        now - self.created_at <= window
    }
}

/// One cell of the history heat map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeatmapPoint {
    /// Day of the check-in
    pub date: CalendarDay,
    /// Kind of the check-in
    pub kind: CheckInKind,
    /// Heat map intensity
    pub value: u8,
}

impl From<&CheckIn> for HeatmapPoint {
    fn from(check_in: &CheckIn) -> Self {
        Self {
            date: check_in.calendar_day,
            kind: check_in.kind,
            value: check_in.kind.heatmap_value(),
        }
    }
}
