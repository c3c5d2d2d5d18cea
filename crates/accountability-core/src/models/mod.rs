// ABOUTME: Core data models for members, check-ins, photos, aggregates, and the feed
// ABOUTME: Re-exports the domain types shared by the store, services, and routes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Per-day community rollup
mod aggregate;
/// Check-in ledger records
mod checkin;
/// Privacy-filtered public feed view
mod feed;
/// Community members and roles
mod member;
/// Progress photos
mod photo;

pub use aggregate::{DailyAggregate, KindCounts};
pub use checkin::{
    CheckIn, CheckInDetails, CheckInKind, HeatmapPoint, MuscleGroup, VisibilityField,
};
pub use feed::{FeedAuthor, FeedEntry, FeedPhoto, FeedRecord};
pub use member::{Member, MemberId, MemberProfile, MemberRole};
pub use photo::{Photo, PhotoFormat};
