//! # Sync Coordinator
//!
//! Drives one traversal of a remote folder tree into the metadata store.
//!
//! ## Workflow
//!
//! 1. Open a listing session on the source (a failure here ends the run
//!    before any listing call)
//! 2. Request the first page for the start path, recursively
//! 3. For every entry, in order: upsert folders and files, skip other kinds
//! 4. Follow the page cursor until the source reports no more entries
//! 5. Release the listing session, on success and on failure
//!
//! Execution is strictly sequential: one page in flight, one upsert at a
//! time. The first listing or store failure aborts the traversal; rows
//! upserted before it stay committed.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use core_sync::SyncCoordinator;
//!
//! let coordinator = SyncCoordinator::new(listing_source, store);
//! let stats = coordinator.process_tree("/").await?;
//! println!("{} folders, {} files", stats.folders_processed, stats.files_processed);
//! ```

use bridge_traits::{Entry, ListingPage, ListingSource};
use core_store::MetadataStore;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

use crate::session::ListingSession;
use crate::state::TraversalState;
use crate::{Result, SyncError};

/// Per-kind counts of upserted entries
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncStats {
    pub folders_processed: u64,
    pub files_processed: u64,
}

impl SyncStats {
    pub fn total_processed(&self) -> u64 {
        self.folders_processed + self.files_processed
    }
}

pub struct SyncCoordinator {
    source: Arc<dyn ListingSource>,
    store: Arc<dyn MetadataStore>,
}

impl SyncCoordinator {
    pub fn new(source: Arc<dyn ListingSource>, store: Arc<dyn MetadataStore>) -> Self {
        Self { source, store }
    }

    /// Mirror every folder and file under `start_path` into the store
    ///
    /// `start_path` is `"/"` for the account root. Returns the number of
    /// folders and files upserted.
    ///
    /// # Errors
    ///
    /// - [`SyncError::Listing`] when a listing call (or closing the session) fails
    /// - [`SyncError::Store`] when an upsert fails
    #[instrument(skip(self))]
    pub async fn process_tree(&self, start_path: &str) -> Result<SyncStats> {
        let session = ListingSession::open(Arc::clone(&self.source))
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to open listing session");
                SyncError::Listing(e)
            })?;

        let mut state = TraversalState::Init;
        let mut stats = SyncStats::default();

        let outcome = self
            .traverse(session.source(), start_path, &mut state, &mut stats)
            .await;
        let released = session.release().await;

        match (outcome, released) {
            (Ok(()), Ok(())) => Ok(stats),
            (Ok(()), Err(e)) => {
                error!(error = %e, "Failed to close listing session");
                Err(SyncError::Listing(e))
            }
            (Err(e), released) => {
                if let Err(close_err) = released {
                    warn!(error = %close_err, "Failed to close listing session after error");
                }
                error!(
                    error = %e,
                    state = %state,
                    folders = stats.folders_processed,
                    files = stats.files_processed,
                    "Traversal aborted"
                );
                Err(e)
            }
        }
    }

    /// Run the traversal, leaving `state` at `Done` or `Failed`
    async fn traverse(
        &self,
        source: &dyn ListingSource,
        start_path: &str,
        state: &mut TraversalState,
        stats: &mut SyncStats,
    ) -> Result<()> {
        *state = std::mem::take(state).start()?;

        while !state.is_terminal() {
            match self.step(source, start_path, state, stats).await {
                Ok(next) => {
                    *state = next;
                    debug!(state = %state, "Page processed");
                }
                Err(e) => {
                    *state = std::mem::take(state).fail()?;
                    return Err(e);
                }
            }
        }

        Ok(())
    }

    /// Fetch and apply one page, returning the state that follows it
    async fn step(
        &self,
        source: &dyn ListingSource,
        start_path: &str,
        state: &TraversalState,
        stats: &mut SyncStats,
    ) -> Result<TraversalState> {
        let page = match state.cursor() {
            None => source.list_folder(start_path, true).await?,
            Some(cursor) => source.list_folder_continue(cursor).await?,
        };

        self.apply_page(&page, stats).await?;
        state.clone().advance(&page)
    }

    async fn apply_page(&self, page: &ListingPage, stats: &mut SyncStats) -> Result<()> {
        debug!(entries = page.entries.len(), has_more = page.has_more, "Applying page");

        for entry in &page.entries {
            match entry {
                Entry::Folder(folder) => {
                    self.store.upsert_folder(folder).await?;
                    stats.folders_processed += 1;
                    info!(path = folder.path_display.as_deref().unwrap_or_default(), "Folder saved");
                }
                Entry::File(file) => {
                    self.store.upsert_file(file).await?;
                    stats.files_processed += 1;
                    info!(path = file.path_display.as_deref().unwrap_or_default(), "File saved");
                }
                Entry::Other { tag, path_display } => {
                    debug!(
                        kind = %tag,
                        path = path_display.as_deref().unwrap_or_default(),
                        "Skipping entry"
                    );
                }
            }
        }

        Ok(())
    }
}
