// ABOUTME: Environment configuration management for deployment-specific settings
// ABOUTME: Parses environment variables into a typed ServerConfig with documented defaults
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Environment-based configuration management

use std::collections::HashSet;
use std::env;
use std::error::Error as StdError;
use std::fmt::{self, Display, Formatter};
use std::path::PathBuf;
use std::str::FromStr;

use accountability_core::constants::{
    checkins::{DEFAULT_DELETION_WINDOW_MINUTES, DEFAULT_DOWNSTREAM_RETRY_ATTEMPTS},
    ports::DEFAULT_HTTP_PORT,
};
use anyhow::{anyhow, Context, Result};
use chrono::Duration;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Default `SQLite` database location
const DEFAULT_DATABASE_URL: &str = "sqlite:./data/accountability.db";
/// Default photo blob directory
const DEFAULT_PHOTO_STORAGE_DIR: &str = "./data/photos";
/// Default public prefix for photo URLs
const DEFAULT_PHOTO_PUBLIC_BASE_URL: &str = "/photos";

/// Deployment environment
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Local development; data reset is allowed by default
    #[default]
    Development,
    /// Production deployment
    Production,
    /// Automated tests
    Testing,
}

impl Environment {
    /// Parse from string with fallback
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "testing" | "test" => Self::Testing,
            _ => Self::Development,
        }
    }

    /// Check if this is a production environment
    #[must_use]
    pub const fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    /// Check if this is a development environment
    #[must_use]
    pub const fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }
}

impl Display for Environment {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
            Self::Testing => write!(f, "testing"),
        }
    }
}

/// Type-safe database location
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum DatabaseUrl {
    /// `SQLite` database file
    SQLite {
        /// Database file path
        path: PathBuf,
    },
    /// Process-local in-memory store
    Memory,
}

impl DatabaseUrl {
    /// Parse a `DATABASE_URL` value
    ///
    /// `memory` and `sqlite::memory:` select the in-memory store; any other
    /// `sqlite:` URL or bare path is treated as a database file.
    ///
    /// # Errors
    ///
    /// Returns an error for empty values and unsupported schemes
    pub fn parse_url(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(anyhow!("DATABASE_URL must not be empty"));
        }
        if s.eq_ignore_ascii_case("memory") {
            return Ok(Self::Memory);
        }
        if let Some(path_str) = s.strip_prefix("sqlite:") {
            let path_str = path_str.trim_start_matches("//");
            if path_str == ":memory:" {
                return Ok(Self::Memory);
            }
            return Ok(Self::SQLite {
                path: PathBuf::from(path_str),
            });
        }
        if s.contains("://") {
            return Err(anyhow!(
                "Unsupported database URL format: {s}. Supported formats: sqlite:path/to/db.sqlite, memory"
            ));
        }
        Ok(Self::SQLite {
            path: PathBuf::from(s),
        })
    }

    /// Convert to a connection string
    #[must_use]
    pub fn to_connection_string(&self) -> String {
        match self {
            Self::SQLite { path } => format!("sqlite:{}", path.display()),
            Self::Memory => "sqlite::memory:".to_owned(),
        }
    }

    /// Check if this is the in-memory store
    #[must_use]
    pub const fn is_memory(&self) -> bool {
        matches!(self, Self::Memory)
    }
}

impl Default for DatabaseUrl {
    fn default() -> Self {
        Self::SQLite {
            path: PathBuf::from("./data/accountability.db"),
        }
    }
}

impl Display for DatabaseUrl {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_connection_string())
    }
}

/// Check-in ledger settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckInConfig {
    /// Minutes after creation during which the owner may delete a check-in
    pub deletion_window_minutes: i64,
    /// Attempts for each downstream recomputation step (at least 1)
    pub downstream_retry_attempts: u32,
}

impl CheckInConfig {
    /// Deletion window as a duration
    #[must_use]
    pub fn deletion_window(&self) -> Duration {
        Duration::minutes(self.deletion_window_minutes)
    }
}

impl Default for CheckInConfig {
    fn default() -> Self {
        Self {
            deletion_window_minutes: DEFAULT_DELETION_WINDOW_MINUTES,
            downstream_retry_attempts: DEFAULT_DOWNSTREAM_RETRY_ATTEMPTS,
        }
    }
}

/// Photo blob storage settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhotoStorageConfig {
    /// Directory blobs are written under
    pub storage_dir: PathBuf,
    /// Prefix of the URLs handed back for stored blobs
    pub public_base_url: String,
}

impl Default for PhotoStorageConfig {
    fn default() -> Self {
        Self {
            storage_dir: PathBuf::from(DEFAULT_PHOTO_STORAGE_DIR),
            public_base_url: DEFAULT_PHOTO_PUBLIC_BASE_URL.to_owned(),
        }
    }
}

/// Member lifecycle settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemberConfig {
    /// Member ids provisioned with the coach role
    pub coach_member_ids: HashSet<String>,
    /// Whether members may wipe their own data
    pub allow_data_reset: bool,
}

impl MemberConfig {
    /// Whether `member_id` is configured as a coach
    #[must_use]
    pub fn is_coach(&self, member_id: &str) -> bool {
        self.coach_member_ids.contains(member_id)
    }
}

/// Cross-origin settings for browser clients
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Comma-separated origins, or `*` for any
    pub allowed_origins: String,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: "*".to_owned(),
        }
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP API port
    pub http_port: u16,
    /// Deployment environment
    pub environment: Environment,
    /// Database location
    pub database: DatabaseUrl,
    /// Check-in ledger settings
    pub checkins: CheckInConfig,
    /// Photo storage settings
    pub photos: PhotoStorageConfig,
    /// Member lifecycle settings
    pub members: MemberConfig,
    /// CORS settings
    pub cors: CorsConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_port: DEFAULT_HTTP_PORT,
            environment: Environment::Development,
            database: DatabaseUrl::default(),
            checkins: CheckInConfig::default(),
            photos: PhotoStorageConfig::default(),
            members: MemberConfig {
                coach_member_ids: HashSet::new(),
                allow_data_reset: true,
            },
            cors: CorsConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error when a variable is present but cannot be parsed
    pub fn from_env() -> Result<Self> {
        info!("Loading configuration from environment variables");

        let environment = Environment::from_str_or_default(&env_var_or("ENVIRONMENT", "development"));

        let config = Self {
            http_port: parse_env("HTTP_PORT", DEFAULT_HTTP_PORT)?,
            environment,
            database: DatabaseUrl::parse_url(&env_var_or("DATABASE_URL", DEFAULT_DATABASE_URL))
                .context("Invalid DATABASE_URL")?,
            checkins: CheckInConfig {
                deletion_window_minutes: parse_env(
                    "CHECKIN_DELETION_WINDOW_MINUTES",
                    DEFAULT_DELETION_WINDOW_MINUTES,
                )?,
                downstream_retry_attempts: parse_env(
                    "DOWNSTREAM_RETRY_ATTEMPTS",
                    DEFAULT_DOWNSTREAM_RETRY_ATTEMPTS,
                )?,
            },
            photos: PhotoStorageConfig {
                storage_dir: PathBuf::from(env_var_or(
                    "PHOTO_STORAGE_DIR",
                    DEFAULT_PHOTO_STORAGE_DIR,
                )),
                public_base_url: env_var_or("PHOTO_PUBLIC_BASE_URL", DEFAULT_PHOTO_PUBLIC_BASE_URL),
            },
            members: MemberConfig {
                coach_member_ids: parse_list(&env_var_or("COACH_MEMBER_IDS", "")),
                allow_data_reset: parse_env("ALLOW_DATA_RESET", environment.is_development())?,
            },
            cors: CorsConfig {
                allowed_origins: env_var_or("CORS_ALLOWED_ORIGINS", "*"),
            },
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns an error for a negative deletion window or zero downstream attempts
    pub fn validate(&self) -> Result<()> {
        if self.checkins.deletion_window_minutes < 0 {
            return Err(anyhow!(
                "CHECKIN_DELETION_WINDOW_MINUTES must not be negative"
            ));
        }
        if self.checkins.downstream_retry_attempts == 0 {
            return Err(anyhow!("DOWNSTREAM_RETRY_ATTEMPTS must be at least 1"));
        }
        if self.environment.is_production() && self.members.allow_data_reset {
            warn!("ALLOW_DATA_RESET is enabled in production");
        }
        if self.members.coach_member_ids.is_empty() {
            warn!("COACH_MEMBER_IDS is empty; nobody can open the coach dashboard");
        }
        Ok(())
    }

    /// One-line-per-setting summary for startup logs
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "Accountability Server Configuration:\n\
             - HTTP Port: {}\n\
             - Environment: {}\n\
             - Database: {}\n\
             - Deletion Window: {} minutes\n\
             - Downstream Attempts: {}\n\
             - Photo Storage: {}\n\
             - Coaches Configured: {}\n\
             - Data Reset: {}",
            self.http_port,
            self.environment,
            if self.database.is_memory() {
                "In-memory"
            } else {
                "SQLite"
            },
            self.checkins.deletion_window_minutes,
            self.checkins.downstream_retry_attempts,
            self.photos.storage_dir.display(),
            self.members.coach_member_ids.len(),
            if self.members.allow_data_reset {
                "Enabled"
            } else {
                "Disabled"
            },
        )
    }
}

/// Read an environment variable with a default
fn env_var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_owned())
}

/// Parse an environment variable, falling back to `default` when unset
fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: StdError + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .with_context(|| format!("Invalid value for {key}: {raw}")),
        _ => Ok(default),
    }
}

/// Parse a comma-separated list
fn parse_list(raw: &str) -> HashSet<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .collect()
}
