//! # Core Runtime Module
//!
//! Provides foundational runtime infrastructure for the catalog sync:
//! - Logging and tracing infrastructure
//! - Configuration loading and validation
//!
//! ## Overview
//!
//! Configuration is read once at process start into an explicit
//! [`AppConfig`](config::AppConfig) value and handed to the store, the
//! provider and the coordinator by reference. Nothing here keeps global state
//! apart from the `tracing` subscriber installed by
//! [`init_logging`](logging::init_logging).

pub mod config;
pub mod error;
pub mod logging;

pub use config::{AppConfig, DatabaseBackend, DatabaseConfig, DropboxConfig};
pub use error::{Error, Result};
