// ABOUTME: Public feed service projecting ledger records into privacy-filtered entries
// ABOUTME: Every entry leaves through FeedEntry::project, which nulls private notes and photos
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use accountability_core::models::FeedEntry;
use accountability_core::pagination::{OffsetPage, PaginationParams};

use crate::database_plugins::DatabaseProvider;
use crate::errors::AppResult;

/// One page of the public feed, newest first
///
/// # Errors
///
/// Returns an error if the read fails
pub async fn public_feed<DB: DatabaseProvider>(
    database: &DB,
    params: PaginationParams,
) -> AppResult<OffsetPage<FeedEntry>> {
    let records = database.list_feed_records(params).await?;
    let entries = records.into_iter().filter_map(FeedEntry::project).collect();
    Ok(OffsetPage::new(entries, params))
}
