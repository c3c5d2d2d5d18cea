// ABOUTME: Route handlers for progress photo upload and deletion
// ABOUTME: Uploads are raw request bodies typed by their Content-Type header
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::sync::Arc;

use accountability_core::constants::photos::MAX_PHOTO_BYTES;
use accountability_core::models::Photo;
use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::resources::ServerResources;
use crate::services::photos::{self, PhotoUpload};

/// Room above the photo limit so oversized uploads reach the handler and get a typed error
const BODY_LIMIT_HEADROOM: usize = 1024 * 1024;

/// Query of POST /api/photos
#[derive(Debug, Default, Deserialize)]
pub struct UploadQuery {
    /// Whether the photo may appear in the public feed
    #[serde(default)]
    pub public: bool,
}

/// A stored photo
#[derive(Debug, Serialize, Deserialize)]
pub struct PhotoResponse {
    /// Photo id
    pub id: String,
    /// Public URL
    pub url: String,
    /// Whether the photo is public
    pub is_public: bool,
    /// Size in bytes
    pub size_bytes: u64,
    /// MIME type
    pub mime_type: String,
    /// Upload time
    pub created_at: String,
}

impl From<Photo> for PhotoResponse {
    fn from(photo: Photo) -> Self {
        Self {
            id: photo.id.to_string(),
            url: photo.url,
            is_public: photo.is_public,
            size_bytes: photo.size_bytes,
            mime_type: photo.mime_type,
            created_at: photo.created_at.to_rfc3339(),
        }
    }
}

/// Photo routes
pub struct PhotoRoutes;

impl PhotoRoutes {
    /// Create all photo routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        let body_limit = usize::try_from(MAX_PHOTO_BYTES)
            .unwrap_or(usize::MAX)
            .saturating_add(BODY_LIMIT_HEADROOM);

        Router::new()
            .route(
                "/api/photos",
                post(Self::handle_upload).layer(DefaultBodyLimit::max(body_limit)),
            )
            .route("/api/photos/:id", delete(Self::handle_delete))
            .with_state(resources)
    }

    /// Handle POST /api/photos - Upload a JPEG or PNG
    async fn handle_upload(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Query(query): Query<UploadQuery>,
        body: Bytes,
    ) -> Result<Response, AppError> {
        let member = resources.authenticate(&headers).await?;
        let mime_type = headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_owned();

        let photo = photos::upload_photo(
            resources.database.as_ref(),
            resources.blob_store.as_ref(),
            resources.clock.as_ref(),
            &member,
            PhotoUpload {
                bytes: body,
                mime_type,
                is_public: query.public,
            },
            resources.config.checkins.downstream_retry_attempts,
        )
        .await?;

        Ok((StatusCode::CREATED, Json(PhotoResponse::from(photo))).into_response())
    }

    /// Handle DELETE /api/photos/:id - Delete one of the caller's photos
    async fn handle_delete(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let member = resources.authenticate(&headers).await?;
        let photo_id =
            Uuid::parse_str(&id).map_err(|_| AppError::invalid_input("Invalid photo id"))?;

        photos::delete_photo(
            resources.database.as_ref(),
            resources.blob_store.as_ref(),
            photo_id,
            &member.id,
        )
        .await?;

        Ok(StatusCode::NO_CONTENT.into_response())
    }
}
