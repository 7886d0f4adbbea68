//! # Sync Orchestrator
//!
//! Mirrors a remote folder tree into the metadata store.
//!
//! ## Components
//!
//! - **Sync Coordinator** (`coordinator`): paginated traversal, per-entry dispatch and counts
//! - **Traversal State Machine** (`state`): validated `Init → Listing → Done | Failed` transitions
//! - **Listing Session** (`session`): releases the listing source on every exit path

pub mod coordinator;
pub mod error;
pub mod session;
pub mod state;

pub use coordinator::{SyncCoordinator, SyncStats};
pub use error::{Result, SyncError};
pub use session::ListingSession;
pub use state::TraversalState;
