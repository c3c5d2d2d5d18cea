// ABOUTME: Streak state machine applied after every accepted check-in
// ABOUTME: Pure function of prior state, check-in kind, and today's calendar day
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Streak rules
//!
//! WORKOUT and REST maintain a streak, REFLECTION resets it. The anchor date moves
//! on every kind, so a reflection followed by a workout the next day starts over at 1.
//!
//! | kind        | prior gap     | `current_streak` |
//! |-------------|---------------|------------------|
//! | maintaining | no prior date | 1                |
//! | maintaining | 0 days        | unchanged        |
//! | maintaining | 1 day         | +1               |
//! | maintaining | > 1 day       | 1                |
//! | reflection  | any           | 0                |

use serde::{Deserialize, Serialize};

use crate::calendar::CalendarDay;
use crate::constants::streaks::MAX_DAYS_BETWEEN_CHECKINS;
use crate::models::CheckInKind;

/// The streak fields stored on a member
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakState {
    /// Consecutive maintaining days ending at `last_check_in_date`
    pub current_streak: u32,
    /// Best streak reached so far
    pub longest_streak: u32,
    /// Day of the most recent check-in of any kind
    pub last_check_in_date: Option<CalendarDay>,
}

impl StreakState {
    /// State after recording a check-in of `kind` on `today`
    #[must_use]
    pub fn apply(self, kind: CheckInKind, today: CalendarDay) -> Self {
        if !kind.maintains_streak() {
            return Self {
                current_streak: 0,
                longest_streak: self.longest_streak,
                last_check_in_date: Some(today),
            };
        }

        let current_streak = match self.last_check_in_date {
            None => 1,
            Some(last) => match last.days_between(today) {
                0 => self.current_streak,
                gap if gap <= MAX_DAYS_BETWEEN_CHECKINS => self.current_streak.saturating_add(1),
                _ => 1,
            },
        };

        Self {
            current_streak,
            longest_streak: self.longest_streak.max(current_streak),
            last_check_in_date: Some(today),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(offset: i64) -> CalendarDay {
        CalendarDay::from_ymd(2025, 11, 17).unwrap().offset(offset)
    }

    #[test]
    fn test_first_workout_starts_streak() {
        let state = StreakState::default().apply(CheckInKind::Workout, day(0));
        assert_eq!(state.current_streak, 1);
        assert_eq!(state.longest_streak, 1);
        assert_eq!(state.last_check_in_date, Some(day(0)));
    }

    #[test]
    fn test_rest_next_day_extends() {
        let prior = StreakState {
            current_streak: 4,
            longest_streak: 6,
            last_check_in_date: Some(day(0)),
        };
        let state = prior.apply(CheckInKind::Rest, day(1));
        assert_eq!(state.current_streak, 5);
        assert_eq!(state.longest_streak, 6);
    }

    #[test]
    fn test_gap_resets_to_one_and_keeps_longest() {
        let prior = StreakState {
            current_streak: 3,
            longest_streak: 9,
            last_check_in_date: Some(day(0)),
        };
        let state = prior.apply(CheckInKind::Workout, day(3));
        assert_eq!(state.current_streak, 1);
        assert_eq!(state.longest_streak, 9);
    }

    #[test]
    fn test_same_day_leaves_streak_unchanged() {
        let prior = StreakState {
            current_streak: 2,
            longest_streak: 2,
            last_check_in_date: Some(day(0)),
        };
        assert_eq!(prior.apply(CheckInKind::Workout, day(0)), prior);
    }

    #[test]
    fn test_reflection_zeroes_and_moves_anchor() {
        let prior = StreakState {
            current_streak: 7,
            longest_streak: 7,
            last_check_in_date: Some(day(0)),
        };
        let state = prior.apply(CheckInKind::Reflection, day(5));
        assert_eq!(state.current_streak, 0);
        assert_eq!(state.longest_streak, 7);
        assert_eq!(state.last_check_in_date, Some(day(5)));
    }

    #[test]
    fn test_week_sequence() {
        let kinds = [
            CheckInKind::Workout,
            CheckInKind::Rest,
            CheckInKind::Reflection,
            CheckInKind::Workout,
        ];
        let mut state = StreakState::default();
        let mut observed = Vec::new();
        for (offset, kind) in (0_i64..).zip(kinds) {
            state = state.apply(kind, day(offset));
            observed.push(state.current_streak);
        }
        assert_eq!(observed, vec![1, 2, 0, 1]);
        assert_eq!(state.longest_streak, 2);
    }

    #[test]
    fn test_longest_never_below_current() {
        let kinds = [
            (0, CheckInKind::Workout),
            (1, CheckInKind::Workout),
            (2, CheckInKind::Rest),
            (6, CheckInKind::Workout),
            (7, CheckInKind::Reflection),
            (8, CheckInKind::Rest),
            (9, CheckInKind::Rest),
            (10, CheckInKind::Workout),
            (11, CheckInKind::Workout),
        ];
        let mut state = StreakState::default();
        let mut longest_seen = 0;
        for (offset, kind) in kinds {
            state = state.apply(kind, day(offset));
            assert!(state.longest_streak >= state.current_streak);
            assert!(state.longest_streak >= longest_seen);
            longest_seen = state.longest_streak;
        }
        assert_eq!(state.longest_streak, 4);
    }
}
