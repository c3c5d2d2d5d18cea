// ABOUTME: Member models for community participants and coaches
// ABOUTME: MemberId, MemberRole, MemberProfile, and Member with stored streak fields
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::calendar::CalendarDay;
use crate::errors::{AppError, AppResult};
use crate::streak::StreakState;

/// Longest accepted external identity
const MAX_MEMBER_ID_LEN: usize = 255;

/// Opaque, stable member identifier handed over by identity resolution
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemberId(String);

impl MemberId {
    /// Validate and wrap an external identity
    ///
    /// # Errors
    ///
    /// Returns a validation error when the identity is blank or unreasonably long
    pub fn new(id: impl Into<String>) -> AppResult<Self> {
        let id = id.into();
        let trimmed = id.trim();
        if trimmed.is_empty() {
            return Err(AppError::invalid_input("Member id must not be empty"));
        }
        if trimmed.len() > MAX_MEMBER_ID_LEN {
            return Err(AppError::invalid_input(format!(
                "Member id must be at most {MAX_MEMBER_ID_LEN} bytes"
            )));
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the raw identifier
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for MemberId {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.0)
    }
}

impl FromStr for MemberId {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// Role of a member within the community
#[non_exhaustive]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MemberRole {
    /// Regular participant
    #[default]
    Member,
    /// Coach with dashboard access and deletion override
    Coach,
}

impl MemberRole {
    /// Database string representation
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Member => "MEMBER",
            Self::Coach => "COACH",
        }
    }
}

impl Display for MemberRole {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

impl FromStr for MemberRole {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "MEMBER" => Ok(Self::Member),
            "COACH" => Ok(Self::Coach),
            _ => Err(AppError::invalid_input(format!("Invalid member role: {s}"))),
        }
    }
}

/// Input for the idempotent member upsert
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberProfile {
    /// Stable member identifier
    pub id: MemberId,
    /// Display name, when identity resolution supplied one
    pub display_name: Option<String>,
    /// Role to create the member with; an upsert never demotes a coach
    pub role: MemberRole,
}

impl MemberProfile {
    /// Profile for a regular member with no display name
    #[must_use]
    pub const fn member(id: MemberId) -> Self {
        Self {
            id,
            display_name: None,
            role: MemberRole::Member,
        }
    }
}

/// A community member and their stored streak fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    /// Stable member identifier
    pub id: MemberId,
    /// Display name
    pub display_name: Option<String>,
    /// Member or coach
    pub role: MemberRole,
    /// Consecutive maintaining days ending at `last_check_in_date`
    pub current_streak: u32,
    /// Best streak ever reached; never decreases outside a data reset
    pub longest_streak: u32,
    /// Day of the most recent check-in of any kind
    pub last_check_in_date: Option<CalendarDay>,
    /// Day of the most recent photo upload
    pub last_photo_date: Option<CalendarDay>,
    /// When the member first contacted the system
    pub created_at: DateTime<Utc>,
    /// Last authenticated contact
    pub last_active_at: DateTime<Utc>,
}

impl Member {
    /// Fresh member with zeroed streak fields
    #[must_use]
    pub fn new(profile: MemberProfile, now: DateTime<Utc>) -> Self {
        Self {
            id: profile.id,
            display_name: profile.display_name,
            role: profile.role,
            current_streak: 0,
            longest_streak: 0,
            last_check_in_date: None,
            last_photo_date: None,
            created_at: now,
            last_active_at: now,
        }
    }

    /// The streak fields as a state machine input
    #[must_use]
    pub const fn streak(&self) -> StreakState {
        StreakState {
            current_streak: self.current_streak,
            longest_streak: self.longest_streak,
            last_check_in_date: self.last_check_in_date,
        }
    }

    /// Whether this member has coach privileges
    #[must_use]
    pub const fn is_coach(&self) -> bool {
        matches!(self.role, MemberRole::Coach)
    }
}
