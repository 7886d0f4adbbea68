//! # Dropbox Provider
//!
//! Implements `ListingSource` over the Dropbox API v2 `files/list_folder`
//! endpoints.
//!
//! ## Overview
//!
//! This module provides:
//! - Recursive folder listing with cursor-based continuation
//! - Decoding of the `.tag`-discriminated metadata into `Entry`
//! - Mapping of HTTP failures into provider errors
//!
//! Transport retries (429, 5xx, connection failures) belong to the injected
//! `HttpClient`.

pub mod connector;
pub mod error;
pub mod types;

pub use connector::DropboxConnector;
pub use error::{DropboxError, Result};
