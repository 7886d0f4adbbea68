//! # Configuration Module
//!
//! Explicit configuration for a catalog sync run.
//!
//! ## Overview
//!
//! `AppConfig` is built once at process start and passed by reference into
//! the metadata store, the listing provider and the coordinator. Loading is
//! fail-fast: every required setting is checked before any network or
//! database activity, and the first missing one aborts startup.
//!
//! ## Required settings
//!
//! | Key | Meaning |
//! |-----|---------|
//! | `DROPBOX_ACCESS_TOKEN` | Bearer credential for the listing API |
//! | `DB_HOST` | Database host |
//! | `DB_PORT` | Database port |
//! | `DB_NAME` | Database name (file path for the SQLite backend) |
//! | `DB_USER` | Database user |
//! | `DB_PASSWORD` | Database password |
//!
//! ## Optional settings
//!
//! `DROPBOX_START_PATH` (default `/`), `DROPBOX_API_BASE`,
//! `DROPBOX_TIMEOUT_SECS` (30), `DROPBOX_MAX_RETRIES` (3),
//! `DB_BACKEND` (`postgres` | `sqlite`, default `postgres`),
//! `DB_MAX_CONNECTIONS` (5).
//!
//! Settings may also come from a `.env` file in the working directory.
//! Variables already present in the process environment take precedence.
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::{load_dotenv, AppConfig};
//!
//! load_dotenv()?;
//! let config = AppConfig::from_env()?;
//! println!("Syncing {}", config.start_path);
//! ```

use crate::error::{Error, Result};
use crate::logging::redact_if_sensitive;
use std::path::{Path, PathBuf};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use tracing::debug;

/// Account root sentinel
pub const ROOT_PATH: &str = "/";

/// Default API endpoint for RPC-style calls
pub const DEFAULT_API_BASE: &str = "https://api.dropboxapi.com/2";

/// Which relational backend receives the metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DatabaseBackend {
    #[default]
    Postgres,
    /// Single-file database; `DatabaseConfig::name` is the file path
    Sqlite,
}

impl DatabaseBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            DatabaseBackend::Postgres => "postgres",
            DatabaseBackend::Sqlite => "sqlite",
        }
    }
}

impl FromStr for DatabaseBackend {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(DatabaseBackend::Postgres),
            "sqlite" => Ok(DatabaseBackend::Sqlite),
            other => Err(Error::Config(format!("Unknown database backend: {}", other))),
        }
    }
}

impl fmt::Display for DatabaseBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Database connection settings
#[derive(Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub backend: DatabaseBackend,
    pub host: String,
    pub port: u16,
    pub name: String,
    pub user: String,
    pub password: String,
    /// Pool size; the sync itself uses one connection at a time
    pub max_connections: u32,
}

impl DatabaseConfig {
    /// PostgreSQL connection settings
    pub fn postgres(
        host: impl Into<String>,
        port: u16,
        name: impl Into<String>,
        user: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            backend: DatabaseBackend::Postgres,
            host: host.into(),
            port,
            name: name.into(),
            user: user.into(),
            password: password.into(),
            max_connections: 5,
        }
    }

    /// SQLite settings for the file at `path` (`:memory:` for an in-memory database)
    pub fn sqlite(path: impl Into<String>) -> Self {
        Self {
            backend: DatabaseBackend::Sqlite,
            host: String::new(),
            port: 0,
            name: path.into(),
            user: String::new(),
            password: String::new(),
            max_connections: 1,
        }
    }

    pub fn with_max_connections(mut self, max_connections: u32) -> Self {
        self.max_connections = max_connections;
        self
    }
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("backend", &self.backend)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("name", &self.name)
            .field("user", &self.user)
            .field("password", &redact_if_sensitive("password", &self.password))
            .field("max_connections", &self.max_connections)
            .finish()
    }
}

/// Listing API settings
#[derive(Clone, PartialEq, Eq)]
pub struct DropboxConfig {
    pub access_token: String,
    pub api_base_url: String,
    /// Per-request timeout
    pub timeout: Duration,
    /// HTTP attempts per request, including the first one
    pub max_retries: u32,
}

impl DropboxConfig {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            api_base_url: DEFAULT_API_BASE.to_string(),
            timeout: Duration::from_secs(30),
            max_retries: 3,
        }
    }

    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }
}

impl fmt::Debug for DropboxConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DropboxConfig")
            .field(
                "access_token",
                &redact_if_sensitive("access_token", &self.access_token),
            )
            .field("api_base_url", &self.api_base_url)
            .field("timeout", &self.timeout)
            .field("max_retries", &self.max_retries)
            .finish()
    }
}

/// Load `.env` from the working directory or one of its parents
///
/// Returns the loaded path, or `None` when there is no such file. Variables
/// already set in the process environment are not overwritten.
pub fn load_dotenv() -> Result<Option<PathBuf>> {
    match dotenvy::dotenv() {
        Ok(path) => Ok(Some(path)),
        Err(e) if e.not_found() => Ok(None),
        Err(e) => Err(Error::Config(format!("Failed to read .env file: {}", e))),
    }
}

/// Load an explicit env file, without overwriting existing variables
pub fn load_dotenv_from(path: &Path) -> Result<()> {
    dotenvy::from_path(path).map_err(|e| {
        Error::Config(format!("Failed to read env file {}: {}", path.display(), e))
    })
}

/// Complete configuration of one sync run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub dropbox: DropboxConfig,
    pub database: DatabaseConfig,
    /// Traversal root; `/` is the account root
    pub start_path: String,
}

impl AppConfig {
    pub fn new(dropbox: DropboxConfig, database: DatabaseConfig) -> Self {
        Self {
            dropbox,
            database,
            start_path: ROOT_PATH.to_string(),
        }
    }

    pub fn with_start_path(mut self, path: impl Into<String>) -> Self {
        self.start_path = path.into();
        self
    }

    /// Load configuration from the process environment
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingSetting`] for the first absent required key and
    /// [`Error::Config`] for malformed or out-of-range values.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let require = |key: &str| {
            get(key).ok_or_else(|| Error::MissingSetting {
                key: key.to_string(),
            })
        };

        // Checked in this order; the first missing key is reported
        let token = require("DROPBOX_ACCESS_TOKEN")?;
        let host = require("DB_HOST")?;
        let port = require("DB_PORT")?;
        let name = require("DB_NAME")?;
        let user = require("DB_USER")?;
        let password = require("DB_PASSWORD")?;

        let port = parse_number::<u16>("DB_PORT", &port)?;

        let mut database = DatabaseConfig::postgres(host, port, name, user, password);
        if let Some(backend) = get("DB_BACKEND") {
            database.backend = backend.parse()?;
        }
        if let Some(max) = get("DB_MAX_CONNECTIONS") {
            database.max_connections = parse_number("DB_MAX_CONNECTIONS", &max)?;
        }

        let mut dropbox = DropboxConfig::new(token);
        if let Some(base) = get("DROPBOX_API_BASE") {
            dropbox.api_base_url = base.trim_end_matches('/').to_string();
        }
        if let Some(secs) = get("DROPBOX_TIMEOUT_SECS") {
            dropbox.timeout = Duration::from_secs(parse_number("DROPBOX_TIMEOUT_SECS", &secs)?);
        }
        if let Some(retries) = get("DROPBOX_MAX_RETRIES") {
            dropbox.max_retries = parse_number("DROPBOX_MAX_RETRIES", &retries)?;
        }

        let mut config = Self::new(dropbox, database);
        if let Some(path) = get("DROPBOX_START_PATH") {
            config.start_path = path;
        }

        config.validate()?;
        debug!(?config, "Configuration loaded");

        Ok(config)
    }

    /// Validates value ranges
    pub fn validate(&self) -> Result<()> {
        if self.start_path.is_empty() || !self.start_path.starts_with('/') {
            return Err(Error::Config(format!(
                "Start path must be absolute (begin with '/'): {:?}",
                self.start_path
            )));
        }

        if self.dropbox.access_token.trim().is_empty() {
            return Err(Error::Config("Access token cannot be empty".to_string()));
        }

        if self.dropbox.max_retries == 0 {
            return Err(Error::Config(
                "DROPBOX_MAX_RETRIES must be at least 1".to_string(),
            ));
        }

        if self.dropbox.timeout.is_zero() {
            return Err(Error::Config(
                "DROPBOX_TIMEOUT_SECS must be greater than 0".to_string(),
            ));
        }

        if self.database.max_connections == 0 {
            return Err(Error::Config(
                "DB_MAX_CONNECTIONS must be greater than 0".to_string(),
            ));
        }

        if self.database.name.trim().is_empty() {
            return Err(Error::Config("Database name cannot be empty".to_string()));
        }

        Ok(())
    }
}

fn parse_number<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| Error::Config(format!("{} is not a valid number: {:?}", key, value)))
}
