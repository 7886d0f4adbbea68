//! # Host Bridge Traits
//!
//! Collaborator contracts the sync core depends on.
//!
//! ## Overview
//!
//! The sync core never talks to the network directly. It consumes two
//! capabilities through the traits defined here:
//!
//! - [`HttpClient`](http::HttpClient) - Async HTTP transport
//! - [`ListingSource`](listing::ListingSource) - Paginated, recursive directory listing
//!
//! Listing results are decoded once, at the provider boundary, into the closed
//! [`Entry`](listing::Entry) sum type so callers pattern-match instead of
//! inspecting runtime types.
//!
//! ## Error Handling
//!
//! All bridge traits use [`BridgeError`](error::BridgeError). Provider crates
//! convert their own error enums into it so the orchestrator sees a single
//! "listing service error" taxonomy.
//!
//! ## Thread Safety
//!
//! All bridge traits require `Send + Sync` bounds so implementations can be
//! shared behind `Arc<dyn Trait>`.

pub mod error;
pub mod http;
pub mod listing;

pub use error::BridgeError;

// Re-export commonly used types
pub use http::{HttpClient, HttpMethod, HttpRequest, HttpResponse};
pub use listing::{Entry, FileMetadata, FolderMetadata, ListingPage, ListingSource};
