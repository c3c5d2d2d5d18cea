// ABOUTME: Engagement classification of members for the coach dashboard
// ABOUTME: Derived at read time from the last check-in day and today
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::fmt::{Display, Formatter, Result as FmtResult};

use serde::{Deserialize, Serialize};

use crate::calendar::CalendarDay;
use crate::constants::streaks::{MAX_SLIPPING_DAYS, PHOTOS_PER_WEEK_REQUIRED};

/// How recently a member has checked in
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngagementStatus {
    /// Checked in today
    Active,
    /// Last check-in one or two days ago
    Slipping,
    /// Three or more days, or never
    Ghosting,
}

impl EngagementStatus {
    /// Classify a member from their last check-in day
    #[must_use]
    pub fn classify(last_check_in_date: Option<CalendarDay>, today: CalendarDay) -> Self {
        match last_check_in_date.map(|last| last.days_between(today)) {
            Some(0) => Self::Active,
            Some(days) if days <= MAX_SLIPPING_DAYS => Self::Slipping,
            _ => Self::Ghosting,
        }
    }

    /// Lowercase label used in responses
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Slipping => "slipping",
            Self::Ghosting => "ghosting",
        }
    }
}

impl Display for EngagementStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

/// Whether `photos_last_week` meets the weekly photo requirement
#[must_use]
pub const fn is_photo_compliant(photos_last_week: u32) -> bool {
    photos_last_week >= PHOTOS_PER_WEEK_REQUIRED
}
