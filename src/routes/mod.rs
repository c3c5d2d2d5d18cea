// ABOUTME: Route module organization for the accountability server HTTP endpoints
// ABOUTME: Assembles domain routers behind request tracing and CORS layers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Route module for the accountability server
//!
//! Each domain module holds route definitions and thin handlers that delegate
//! to [`crate::services`]. [`router`] merges them into the served application.

use std::sync::Arc;

use axum::Router;
use tower_http::services::ServeDir;

use crate::middleware::{propagate_request_id_layer, set_request_id_layer, setup_cors, trace_layer};
use crate::resources::ServerResources;

/// Daily check-in routes
pub mod checkins;
/// Coach dashboard routes
pub mod coach;
/// Public community statistics routes
pub mod community;
/// Community feed routes
pub mod feed;
/// Health check routes
pub mod health;
/// Member profile and data reset routes
pub mod members;
/// Photo upload routes
pub mod photos;

pub use checkins::CheckInRoutes;
pub use coach::CoachRoutes;
pub use community::CommunityRoutes;
pub use feed::FeedRoutes;
pub use health::HealthRoutes;
pub use members::MemberRoutes;
pub use photos::PhotoRoutes;

/// Build the full application router
///
/// Stored photos are served from the configured public prefix when it is a
/// path on this server (starts with `/`).
pub fn router(resources: Arc<ServerResources>) -> Router {
    let mut app = Router::new()
        .merge(HealthRoutes::routes(Arc::clone(&resources)))
        .merge(MemberRoutes::routes(Arc::clone(&resources)))
        .merge(CheckInRoutes::routes(Arc::clone(&resources)))
        .merge(PhotoRoutes::routes(Arc::clone(&resources)))
        .merge(FeedRoutes::routes(Arc::clone(&resources)))
        .merge(CommunityRoutes::routes(Arc::clone(&resources)))
        .merge(CoachRoutes::routes(Arc::clone(&resources)));

    let photos = &resources.config.photos;
    let prefix = photos.public_base_url.trim_end_matches('/');
    if prefix.starts_with('/') && prefix.len() > 1 {
        app = app.nest_service(prefix, ServeDir::new(&photos.storage_dir));
    }

    // Layers run bottom-up: the request id is set before the span opens
    app.layer(setup_cors(&resources.config.cors))
        .layer(propagate_request_id_layer())
        .layer(trace_layer())
        .layer(set_request_id_layer())
}
