// ABOUTME: Core types and rules for the community check-in consistency engine
// ABOUTME: Foundation crate with calendar, streak, engagement, models, errors, and constants
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Accountability Core
//!
//! Foundation crate holding the pure rules of the check-in engine. Nothing in here
//! performs I/O: storage, HTTP and blob handling live in the server crate and call
//! into these types.
//!
//! ## Modules
//!
//! - **calendar**: canonical UTC calendar days and the injectable clock
//! - **streak**: the streak state machine applied after every accepted check-in
//! - **engagement**: coach-facing active/slipping/ghosting classification
//! - **models**: members, check-ins, photos, daily aggregates and the public feed view
//! - **errors**: unified `AppError` with stable error codes
//! - **pagination**: limit/offset parameters shared by list endpoints

/// Unified error handling system with standard error codes and HTTP responses
pub mod errors;

/// Application constants organized by domain
pub mod constants;

/// Canonical calendar days and clocks
pub mod calendar;

/// Streak state machine
pub mod streak;

/// Engagement classification for the coach dashboard
pub mod engagement;

/// Offset pagination parameters
pub mod pagination;

/// Core data models (Member, CheckIn, Photo, DailyAggregate, FeedEntry)
pub mod models;
