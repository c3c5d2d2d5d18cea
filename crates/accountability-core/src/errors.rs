// ABOUTME: Unified error type and stable error codes for the check-in engine
// ABOUTME: Maps domain failures to HTTP statuses and marks which ones are retryable
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Unified Error Handling System
//!
//! Every fallible operation in the engine returns [`AppResult`]. The [`ErrorCode`]
//! decides the HTTP status and whether the caller may retry the whole operation.

use std::error::Error as StdError;
use std::fmt;

#[cfg(feature = "http-response")]
use axum::{
    response::{IntoResponse, Response},
    Json,
};
#[cfg(feature = "http-response")]
use http::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;
#[cfg(feature = "http-response")]
use tracing::{debug, error};

/// Standard error codes used throughout the application
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    /// No member identity was supplied with the request
    #[serde(rename = "AUTH_REQUIRED")]
    AuthRequired,
    /// The caller is not allowed to perform the operation
    #[serde(rename = "PERMISSION_DENIED")]
    PermissionDenied,
    /// Missing or invalid input; the client must change the request
    #[serde(rename = "VALIDATION_ERROR")]
    ValidationError,
    /// The requested record does not exist
    #[serde(rename = "RESOURCE_NOT_FOUND")]
    ResourceNotFound,
    /// A check-in already exists for this member and calendar day
    #[serde(rename = "DUPLICATE_CHECKIN")]
    DuplicateCheckIn,
    /// The owner deletion window has lapsed
    #[serde(rename = "DELETION_WINDOW_EXPIRED")]
    DeletionWindowExpired,
    /// Uploaded blob exceeds the size limit
    #[serde(rename = "FILE_TOO_LARGE")]
    FileTooLarge,
    /// Uploaded blob has a MIME type outside the allowed set
    #[serde(rename = "INVALID_FILE_TYPE")]
    InvalidFileType,
    /// Transient storage failure (timeout, pool exhaustion, I/O)
    #[serde(rename = "STORAGE_UNAVAILABLE")]
    StorageUnavailable,
    /// Configuration is missing or invalid
    #[serde(rename = "CONFIG_ERROR")]
    ConfigError,
    /// Non-transient database failure
    #[serde(rename = "DATABASE_ERROR")]
    DatabaseError,
    /// Serialization or deserialization failure
    #[serde(rename = "SERIALIZATION_ERROR")]
    SerializationError,
    /// Anything else
    #[serde(rename = "INTERNAL_ERROR")]
    InternalError,
}

impl ErrorCode {
    /// Get the HTTP status code for this error
    #[must_use]
    pub const fn http_status(&self) -> u16 {
        match self {
            Self::ValidationError => 400,
            Self::AuthRequired => 401,
            Self::PermissionDenied | Self::DeletionWindowExpired => 403,
            Self::ResourceNotFound => 404,
            Self::DuplicateCheckIn => 409,
            Self::FileTooLarge => 413,
            Self::InvalidFileType => 415,
            Self::StorageUnavailable => 503,
            Self::ConfigError
            | Self::DatabaseError
            | Self::SerializationError
            | Self::InternalError => 500,
        }
    }

    /// Get a user-friendly description of this error
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::AuthRequired => "A member identity is required to access this resource",
            Self::PermissionDenied => "You do not have permission to perform this action",
            Self::ValidationError => "The provided input is invalid",
            Self::ResourceNotFound => "The requested resource was not found",
            Self::DuplicateCheckIn => "You have already checked in today",
            Self::DeletionWindowExpired => "The time allowed to delete this check-in has passed",
            Self::FileTooLarge => "The uploaded file is too large",
            Self::InvalidFileType => "The uploaded file type is not allowed",
            Self::StorageUnavailable => "Storage is temporarily unavailable",
            Self::ConfigError => "Configuration error encountered",
            Self::DatabaseError => "Database operation failed",
            Self::SerializationError => "Data serialization/deserialization failed",
            Self::InternalError => "An internal server error occurred",
        }
    }

    /// Whether retrying the identical operation can succeed
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::StorageUnavailable)
    }

    /// Wire representation of the code
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::AuthRequired => "AUTH_REQUIRED",
            Self::PermissionDenied => "PERMISSION_DENIED",
            Self::ValidationError => "VALIDATION_ERROR",
            Self::ResourceNotFound => "RESOURCE_NOT_FOUND",
            Self::DuplicateCheckIn => "DUPLICATE_CHECKIN",
            Self::DeletionWindowExpired => "DELETION_WINDOW_EXPIRED",
            Self::FileTooLarge => "FILE_TOO_LARGE",
            Self::InvalidFileType => "INVALID_FILE_TYPE",
            Self::StorageUnavailable => "STORAGE_UNAVAILABLE",
            Self::ConfigError => "CONFIG_ERROR",
            Self::DatabaseError => "DATABASE_ERROR",
            Self::SerializationError => "SERIALIZATION_ERROR",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unified error type for the application
#[derive(Debug, Error)]
pub struct AppError {
    /// Error code
    pub code: ErrorCode,
    /// Human-readable error message
    pub message: String,
    /// Source error for error chaining
    #[source]
    pub source: Option<Box<dyn StdError + Send + Sync>>,
}

/// Result type alias for convenience
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// Create a new `AppError` with the given code and message
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            source: None,
        }
    }

    /// Add a source error for error chaining
    #[must_use]
    pub fn with_source(mut self, source: impl StdError + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Get the HTTP status code for this error
    #[must_use]
    pub const fn http_status(&self) -> u16 {
        self.code.http_status()
    }

    /// Whether the caller may retry the whole operation
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        self.code.is_retryable()
    }

    /// Missing member identity
    #[must_use]
    pub fn auth_required() -> Self {
        Self::new(ErrorCode::AuthRequired, "Member identity is required")
    }

    /// Caller lacks permission
    pub fn permission_denied(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::PermissionDenied, message)
    }

    /// Invalid input
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ValidationError, message)
    }

    /// Resource not found
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::ResourceNotFound,
            format!("{} not found", resource.into()),
        )
    }

    /// Second check-in for the same member and day
    #[must_use]
    pub fn duplicate_check_in() -> Self {
        Self::new(
            ErrorCode::DuplicateCheckIn,
            "You have already checked in today",
        )
    }

    /// Owner tried to delete after the window closed
    #[must_use]
    pub fn deletion_window_expired(window_minutes: i64) -> Self {
        Self::new(
            ErrorCode::DeletionWindowExpired,
            format!("Check-ins can only be deleted within {window_minutes} minutes of creation"),
        )
    }

    /// Blob larger than allowed
    #[must_use]
    pub fn file_too_large(size_bytes: u64, max_bytes: u64) -> Self {
        Self::new(
            ErrorCode::FileTooLarge,
            format!("File size {size_bytes} bytes exceeds the {max_bytes} byte limit"),
        )
    }

    /// Blob MIME type not accepted
    pub fn invalid_file_type(mime_type: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::InvalidFileType,
            format!(
                "Only JPEG and PNG images are allowed, got {}",
                mime_type.into()
            ),
        )
    }

    /// Transient storage failure
    pub fn storage_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::StorageUnavailable, message)
    }

    /// Database error
    pub fn database(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::DatabaseError, message)
    }

    /// Configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigError, message)
    }

    /// Internal server error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.description(), self.message)
    }
}

/// HTTP error response format
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error payload
    pub error: ErrorResponseDetails,
}

/// Error payload carried by [`ErrorResponse`]
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponseDetails {
    /// Stable error code
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// Whether the client may retry unchanged
    pub retryable: bool,
}

impl From<&AppError> for ErrorResponse {
    fn from(error: &AppError) -> Self {
        Self {
            error: ErrorResponseDetails {
                code: error.code,
                message: error.message.clone(),
                retryable: error.is_retryable(),
            },
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(error: serde_json::Error) -> Self {
        Self::new(ErrorCode::SerializationError, error.to_string()).with_source(error)
    }
}

#[cfg(feature = "database-errors")]
impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> Self {
        use sqlx::Error as SqlxError;

        // SQLITE_BUSY (5) / SQLITE_LOCKED (6), including extended codes
        let busy = match &error {
            SqlxError::Database(db_err) => db_err
                .code()
                .and_then(|code| code.parse::<i64>().ok())
                .is_some_and(|code| matches!(code & 0xff, 5 | 6)),
            _ => false,
        };
        if busy {
            return Self::storage_unavailable(format!("Database is busy: {error}"))
                .with_source(error);
        }

        let transient = matches!(
            error,
            SqlxError::PoolTimedOut | SqlxError::PoolClosed | SqlxError::Io(_)
        );
        if transient {
            return Self::storage_unavailable(format!("Database unreachable: {error}"))
                .with_source(error);
        }
        if matches!(error, SqlxError::RowNotFound) {
            return Self::not_found("Record");
        }
        Self::database(error.to_string()).with_source(error)
    }
}

#[cfg(feature = "http-response")]
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if status.is_server_error() {
            error!(error.code = %self.code, error.message = %self.message, "Request failed");
        } else {
            debug!(error.code = %self.code, error.message = %self.message, "Request rejected");
        }

        (status, Json(ErrorResponse::from(&self))).into_response()
    }
}
