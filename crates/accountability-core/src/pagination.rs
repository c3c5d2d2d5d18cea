// ABOUTME: Offset pagination for newest-first list endpoints
// ABOUTME: Validates limit bounds and reports whether another page may exist
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use serde::{Deserialize, Serialize};

use crate::constants::feed::{DEFAULT_LIMIT, MAX_LIMIT};
use crate::errors::{AppError, AppResult};

/// Validated limit/offset parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationParams {
    /// Maximum number of items to return (1..=100)
    pub limit: u32,
    /// Number of items to skip
    pub offset: u32,
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            offset: 0,
        }
    }
}

impl PaginationParams {
    /// Build parameters from optional query values, applying defaults
    ///
    /// # Errors
    ///
    /// Returns a validation error when `limit` is outside `1..=100` or `offset` is negative
    pub fn from_query(limit: Option<i64>, offset: Option<i64>) -> AppResult<Self> {
        let limit = limit.unwrap_or(i64::from(DEFAULT_LIMIT));
        if !(1..=i64::from(MAX_LIMIT)).contains(&limit) {
            return Err(AppError::invalid_input(format!(
                "Limit must be between 1 and {MAX_LIMIT}"
            )));
        }
        let offset = offset.unwrap_or(0);
        if offset < 0 {
            return Err(AppError::invalid_input("Offset must be non-negative"));
        }
        let offset = u32::try_from(offset)
            .map_err(|_| AppError::invalid_input("Offset is too large"))?;
        // limit was range-checked above
        let limit = u32::try_from(limit).unwrap_or(DEFAULT_LIMIT);
        Ok(Self { limit, offset })
    }
}

/// One page of results with its request parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OffsetPage<T> {
    /// The items in this page
    pub items: Vec<T>,
    /// Requested page size
    pub limit: u32,
    /// Requested offset
    pub offset: u32,
    /// True when the page is full, so another page may follow
    pub has_more: bool,
}

impl<T> OffsetPage<T> {
    /// Wrap a fetched page
    #[must_use]
    pub fn new(items: Vec<T>, params: PaginationParams) -> Self {
        let has_more = u32::try_from(items.len()).is_ok_and(|len| len == params.limit);
        Self {
            items,
            limit: params.limit,
            offset: params.offset,
            has_more,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let params = PaginationParams::from_query(None, None).unwrap();
        assert_eq!(params, PaginationParams::default());
        assert_eq!(params.limit, 20);
    }

    #[test]
    fn test_limit_bounds() {
        assert!(PaginationParams::from_query(Some(0), None).is_err());
        assert!(PaginationParams::from_query(Some(101), None).is_err());
        assert_eq!(
            PaginationParams::from_query(Some(100), Some(40)).unwrap(),
            PaginationParams {
                limit: 100,
                offset: 40
            }
        );
        assert!(PaginationParams::from_query(Some(10), Some(-1)).is_err());
    }

    #[test]
    fn test_has_more_when_page_is_full() {
        let params = PaginationParams::from_query(Some(2), None).unwrap();
        assert!(OffsetPage::new(vec![1, 2], params).has_more);
        assert!(!OffsetPage::new(vec![1], params).has_more);
    }
}
