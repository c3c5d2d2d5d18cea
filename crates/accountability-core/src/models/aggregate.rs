// ABOUTME: Per-day community rollup derived from the check-in ledger
// ABOUTME: Always rebuilt from counts, never patched incrementally
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::calendar::CalendarDay;

use super::CheckInKind;

/// Check-in counts for one day, split by kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KindCounts {
    /// WORKOUT check-ins
    pub workout: u32,
    /// REST check-ins
    pub rest: u32,
    /// REFLECTION check-ins
    pub reflection: u32,
}

impl KindCounts {
    /// Add one check-in of `kind`
    pub fn record(&mut self, kind: CheckInKind) {
        self.add(kind, 1);
    }

    /// Add `n` check-ins of `kind`
    pub fn add(&mut self, kind: CheckInKind, n: u32) {
        match kind {
            CheckInKind::Workout => self.workout += n,
            CheckInKind::Rest => self.rest += n,
            CheckInKind::Reflection => self.reflection += n,
        }
    }

    /// Count for a single kind
    #[must_use]
    pub const fn get(&self, kind: CheckInKind) -> u32 {
        match kind {
            CheckInKind::Workout => self.workout,
            CheckInKind::Rest => self.rest,
            CheckInKind::Reflection => self.reflection,
        }
    }

    /// Sum across all kinds
    #[must_use]
    pub const fn total(&self) -> u32 {
        self.workout + self.rest + self.reflection
    }
}

impl FromIterator<CheckInKind> for KindCounts {
    fn from_iter<I: IntoIterator<Item = CheckInKind>>(iter: I) -> Self {
        let mut counts = Self::default();
        for kind in iter {
            counts.record(kind);
        }
        counts
    }
}

/// Community statistics for a single calendar day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyAggregate {
    /// The day this row describes
    pub day: CalendarDay,
    /// Snapshot of the member count at recompute time
    pub total_members: u32,
    /// WORKOUT check-ins on `day`
    pub workout_count: u32,
    /// REST check-ins on `day`
    pub rest_count: u32,
    /// REFLECTION check-ins on `day`
    pub reflection_count: u32,
    /// Sum of the three counts
    pub active_today: u32,
    /// Time of the last recompute; `None` for days never computed
    pub updated_at: Option<DateTime<Utc>>,
}

impl DailyAggregate {
    /// Build a row from freshly counted source records
    #[must_use]
    pub const fn from_counts(
        day: CalendarDay,
        total_members: u32,
        counts: KindCounts,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            day,
            total_members,
            workout_count: counts.workout,
            rest_count: counts.rest,
            reflection_count: counts.reflection,
            active_today: counts.total(),
            updated_at: Some(updated_at),
        }
    }

    /// All-zero row for a day with no stored aggregate
    #[must_use]
    pub const fn empty(day: CalendarDay) -> Self {
        Self {
            day,
            total_members: 0,
            workout_count: 0,
            rest_count: 0,
            reflection_count: 0,
            active_today: 0,
            updated_at: None,
        }
    }

    /// Counts as a [`KindCounts`]
    #[must_use]
    pub const fn counts(&self) -> KindCounts {
        KindCounts {
            workout: self.workout_count,
            rest: self.rest_count,
            reflection: self.reflection_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_active_today_is_sum_of_counts() {
        let counts: KindCounts = [
            CheckInKind::Workout,
            CheckInKind::Workout,
            CheckInKind::Rest,
            CheckInKind::Reflection,
        ]
        .into_iter()
        .collect();
        let day = CalendarDay::from_ymd(2025, 2, 3).unwrap();
        let aggregate = DailyAggregate::from_counts(day, 10, counts, Utc::now());
        assert_eq!(aggregate.workout_count, 2);
        assert_eq!(aggregate.active_today, 4);
        assert_eq!(aggregate.counts(), counts);
    }

    #[test]
    fn test_empty_aggregate() {
        let day = CalendarDay::from_ymd(2025, 2, 3).unwrap();
        let aggregate = DailyAggregate::empty(day);
        assert_eq!(aggregate.active_today, 0);
        assert!(aggregate.updated_at.is_none());
    }
}
