// ABOUTME: Canonical UTC calendar days used by every streak and aggregate rule
// ABOUTME: Provides day normalization, day distance, and the injectable clock
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Calendar normalization
//!
//! A [`CalendarDay`] is a date with no time of day, always derived from the UTC
//! representation of an instant. Two submissions made at 23:30 in New York and
//! 05:30 the next morning in Berlin land on the same day if and only if they share
//! a UTC date. This is what makes "one check-in per member per day" well defined.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;
use std::sync::{PoisonError, RwLock};

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;

/// A canonical calendar day (UTC), serialized as `YYYY-MM-DD`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CalendarDay(NaiveDate);

impl CalendarDay {
    /// Collapse any timezone-aware instant onto its UTC calendar day
    #[must_use]
    pub fn normalize<Tz: TimeZone>(timestamp: &DateTime<Tz>) -> Self {
        Self(timestamp.with_timezone(&Utc).date_naive())
    }

    /// Today's calendar day according to `clock`
    #[must_use]
    pub fn today(clock: &dyn Clock) -> Self {
        Self::normalize(&clock.now())
    }

    /// Build a day from its components, `None` when the date does not exist
    #[must_use]
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }

    /// Number of day boundaries between two days, independent of order
    #[must_use]
    pub fn days_between(self, other: Self) -> u64 {
        (self.0 - other.0).num_days().unsigned_abs()
    }

    /// The day `days` after (or before, when negative) this one
    #[must_use]
    pub fn offset(self, days: i64) -> Self {
        Self(self.0 + Duration::days(days))
    }

    /// Midnight UTC at the start of this day
    #[must_use]
    pub fn start_of_day(self) -> DateTime<Utc> {
        self.0.and_time(NaiveTime::MIN).and_utc()
    }

    /// The underlying date
    #[must_use]
    pub const fn as_naive_date(self) -> NaiveDate {
        self.0
    }

    /// Year component
    #[must_use]
    pub fn year(self) -> i32 {
        self.0.year()
    }

    /// Month component (1-12)
    #[must_use]
    pub fn month(self) -> u32 {
        self.0.month()
    }

    /// Day-of-month component (1-31)
    #[must_use]
    pub fn day(self) -> u32 {
        self.0.day()
    }
}

impl From<NaiveDate> for CalendarDay {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

impl Display for CalendarDay {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

impl FromStr for CalendarDay {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .map(Self)
            .map_err(|_| AppError::invalid_input("Invalid date format. Use YYYY-MM-DD"))
    }
}

/// Source of the current instant
///
/// Injected wherever "today" matters so tests can walk a member through several
/// days without sleeping.
pub trait Clock: Send + Sync {
    /// The current instant
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Manually driven clock for tests and seeding tools
#[derive(Debug)]
pub struct FixedClock {
    instant: RwLock<DateTime<Utc>>,
}

impl FixedClock {
    /// Create a clock frozen at `instant`
    #[must_use]
    pub const fn new(instant: DateTime<Utc>) -> Self {
        Self {
            instant: RwLock::new(instant),
        }
    }

    /// Create a clock frozen at `hour:00` UTC on `day`
    #[must_use]
    pub fn at(day: CalendarDay, hour: u32) -> Self {
        Self::new(day.start_of_day() + Duration::hours(i64::from(hour)))
    }

    /// Move the clock to `instant`
    pub fn set(&self, instant: DateTime<Utc>) {
        *self.instant.write().unwrap_or_else(PoisonError::into_inner) = instant;
    }

    /// Move the clock forward by `delta`
    pub fn advance(&self, delta: Duration) {
        let mut guard = self.instant.write().unwrap_or_else(PoisonError::into_inner);
        *guard += delta;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.instant.read().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    #[test]
    fn test_normalize_uses_utc_date() {
        // 23:30 at UTC-5 is already the next day in UTC
        let offset = FixedOffset::west_opt(5 * 3600).unwrap();
        let late_evening = offset.with_ymd_and_hms(2025, 11, 22, 23, 30, 0).unwrap();
        assert_eq!(
            CalendarDay::normalize(&late_evening),
            CalendarDay::from_ymd(2025, 11, 23).unwrap()
        );
    }

    #[test]
    fn test_normalize_ignores_time_of_day() {
        let morning = Utc.with_ymd_and_hms(2025, 11, 22, 0, 0, 1).unwrap();
        let night = Utc.with_ymd_and_hms(2025, 11, 22, 23, 59, 59).unwrap();
        assert_eq!(CalendarDay::normalize(&morning), CalendarDay::normalize(&night));
    }

    #[test]
    fn test_days_between_is_symmetric() {
        let a = CalendarDay::from_ymd(2025, 11, 22).unwrap();
        let b = CalendarDay::from_ymd(2025, 11, 24).unwrap();
        assert_eq!(a.days_between(b), 2);
        assert_eq!(b.days_between(a), 2);
        assert_eq!(a.days_between(a), 0);
    }

    #[test]
    fn test_days_between_crosses_month_and_year() {
        let a = CalendarDay::from_ymd(2024, 12, 31).unwrap();
        let b = CalendarDay::from_ymd(2025, 1, 1).unwrap();
        assert_eq!(a.days_between(b), 1);
    }

    #[test]
    fn test_parse_and_display() {
        let day: CalendarDay = "2025-03-09".parse().unwrap();
        assert_eq!(day.to_string(), "2025-03-09");
        assert_eq!((day.year(), day.month(), day.day()), (2025, 3, 9));
        assert!("09/03/2025".parse::<CalendarDay>().is_err());
    }

    #[test]
    fn test_fixed_clock_advances_days() {
        let start = CalendarDay::from_ymd(2025, 1, 6).unwrap();
        let clock = FixedClock::at(start, 9);
        assert_eq!(CalendarDay::today(&clock), start);
        clock.advance(Duration::days(1));
        assert_eq!(CalendarDay::today(&clock), start.offset(1));
    }
}
