// ABOUTME: Constants module with domain-separated organization
// ABOUTME: Limits, defaults, and header names for the check-in engine
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Constants grouped by domain.

/// Streak and engagement rules
pub mod streaks {
    /// Largest gap (in calendar days) that still continues a streak
    pub const MAX_DAYS_BETWEEN_CHECKINS: u64 = 1;
    /// Largest gap still classified as slipping; anything beyond is ghosting
    pub const MAX_SLIPPING_DAYS: u64 = 2;
    /// Photos per trailing week required for photo compliance
    pub const PHOTOS_PER_WEEK_REQUIRED: u32 = 2;
    /// Trailing window used by weekly dashboard statistics
    pub const WEEKLY_WINDOW_DAYS: i64 = 7;
}

/// Check-in ledger defaults
pub mod checkins {
    /// Default owner deletion window in minutes
    pub const DEFAULT_DELETION_WINDOW_MINUTES: i64 = 30;
    /// Maximum note length in characters
    pub const MAX_NOTE_CHARS: usize = 2000;
    /// Default number of history entries returned
    pub const DEFAULT_HISTORY_LIMIT: u32 = 365;
    /// Maximum number of history entries returned
    pub const MAX_HISTORY_LIMIT: u32 = 365;
    /// Default attempts for each downstream recomputation step
    pub const DEFAULT_DOWNSTREAM_RETRY_ATTEMPTS: u32 = 2;
}

/// Feed pagination
pub mod feed {
    /// Default page size
    pub const DEFAULT_LIMIT: u32 = 20;
    /// Largest accepted page size
    pub const MAX_LIMIT: u32 = 100;
}

/// Photo upload limits
pub mod photos {
    /// Maximum accepted photo size (10 MB)
    pub const MAX_PHOTO_BYTES: u64 = 10 * 1024 * 1024;
    /// Accepted photo MIME types
    pub const ALLOWED_MIME_TYPES: [&str; 2] = ["image/jpeg", "image/png"];
}

/// HTTP header names used for gateway-asserted identity
pub mod headers {
    /// Stable member identifier
    pub const MEMBER_ID: &str = "x-member-id";
    /// Optional display name
    pub const MEMBER_NAME: &str = "x-member-name";
}

/// Network defaults
pub mod ports {
    /// Default HTTP port
    pub const DEFAULT_HTTP_PORT: u16 = 8081;
}

/// Service names for structured logging
pub mod service_names {
    /// Server service name
    pub const ACCOUNTABILITY_SERVER: &str = "accountability-server";
}
