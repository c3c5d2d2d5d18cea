// ABOUTME: Domain service layer for business logic extracted from route handlers
// ABOUTME: Check-in ledger, streak and aggregate downstream steps, feed, photos, and coach views
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Domain service layer
//!
//! Services are free functions generic over [`DatabaseProvider`], so the same
//! rules apply whichever store the server was started with. Route handlers only
//! parse input, resolve the caller, and shape responses.
//!
//! [`DatabaseProvider`]: crate::database_plugins::DatabaseProvider

use std::future::Future;

use tracing::{error, warn};

use crate::errors::AppResult;

/// Daily community aggregate recomputation
pub mod aggregator;

/// Check-in creation, deletion, visibility, and history
pub mod checkins;

/// Coach dashboard
pub mod coach;

/// Public feed projection
pub mod feed;

/// Member provisioning and data reset
pub mod members;

/// Photo intake and removal
pub mod photos;

/// Run a downstream step up to `attempts` times
///
/// Downstream steps run after the ledger write has committed. Their failure is
/// logged and reported as `None`; it never fails the request.
pub async fn run_downstream<T, F, Fut>(step: &'static str, attempts: u32, mut op: F) -> Option<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = AppResult<T>>,
{
    let attempts = attempts.max(1);
    for attempt in 1..=attempts {
        match op().await {
            Ok(value) => return Some(value),
            Err(e) if attempt < attempts => {
                warn!(step, attempt, error = %e, "Downstream step failed, retrying");
            }
            Err(e) => {
                error!(step, attempts, error = %e, "Downstream step failed, giving up");
            }
        }
    }
    None
}
