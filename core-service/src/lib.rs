//! Core service façade and bootstrap helpers.
//!
//! This crate wires the listing source and the metadata store into a
//! [`SyncCoordinator`] and owns the lifetime of the store for one run.
//! Desktop builds enable the `desktop-shims` feature (the default), which
//! provides [`run`]: the reqwest-backed HTTP client, the Dropbox connector and
//! the configured database backend, built straight from an [`AppConfig`].

pub mod error;

pub use error::{CoreError, Result};

use std::sync::Arc;

use bridge_traits::ListingSource;
use core_runtime::AppConfig;
use core_store::MetadataStore;
use core_sync::{SyncCoordinator, SyncStats};
use tracing::{error, info, warn};

/// Aggregated handle to the collaborators one sync run requires.
pub struct CoreDependencies {
    pub listing_source: Arc<dyn ListingSource>,
    pub store: Arc<dyn MetadataStore>,
}

impl CoreDependencies {
    /// Construct a dependency bundle from explicit handles.
    pub fn new(listing_source: Arc<dyn ListingSource>, store: Arc<dyn MetadataStore>) -> Self {
        Self {
            listing_source,
            store,
        }
    }

    /// Build the desktop collaborators described by `config`.
    ///
    /// Opens the store (schema bootstrap and health check included), so
    /// connection problems surface here before any listing call.
    #[cfg(feature = "desktop-shims")]
    pub async fn bootstrap(config: &AppConfig) -> Result<Self> {
        use bridge_desktop::{ReqwestHttpClient, RetryPolicy};
        use provider_dropbox::DropboxConnector;

        let http_client = ReqwestHttpClient::with_timeout(config.dropbox.timeout)?
            .with_retry_policy(RetryPolicy::default().with_max_attempts(config.dropbox.max_retries));
        let listing_source = DropboxConnector::new(Arc::new(http_client), &config.dropbox);

        let store = core_store::open_store(&config.database).await?;
        info!(backend = %config.database.backend, "Metadata store opened");

        Ok(Self::new(Arc::new(listing_source), store))
    }
}

/// Primary façade exposed to the binary.
pub struct CoreService {
    deps: CoreDependencies,
    start_path: String,
}

impl CoreService {
    /// Create a new service from the provided dependencies.
    pub fn new(deps: CoreDependencies, start_path: impl Into<String>) -> Self {
        Self {
            deps,
            start_path: start_path.into(),
        }
    }

    /// Traverse the start path, then close the store.
    ///
    /// The store is closed whether the traversal succeeded or not. A close
    /// failure fails an otherwise successful run; after a failed traversal it
    /// is only logged and the traversal error is returned.
    pub async fn run(&self) -> Result<SyncStats> {
        let coordinator = SyncCoordinator::new(
            Arc::clone(&self.deps.listing_source),
            Arc::clone(&self.deps.store),
        );

        let outcome = coordinator.process_tree(&self.start_path).await;
        let closed = self.deps.store.close().await;

        match (outcome, closed) {
            (Ok(stats), Ok(())) => {
                info!(
                    folders = stats.folders_processed,
                    files = stats.files_processed,
                    "Process complete. {} folders and {} files saved in database.",
                    stats.folders_processed,
                    stats.files_processed
                );
                Ok(stats)
            }
            (Ok(_), Err(e)) => {
                error!(error = %e, "Failed to close metadata store");
                Err(e.into())
            }
            (Err(e), closed) => {
                if let Err(close_err) = closed {
                    warn!(error = %close_err, "Failed to close metadata store after error");
                }
                Err(e.into())
            }
        }
    }
}

/// Run one complete sync described by `config`.
///
/// Validates the configuration before touching the network or the database
/// and wraps the run in a span carrying a fresh `run_id`.
#[cfg(feature = "desktop-shims")]
pub async fn run(config: &AppConfig) -> Result<SyncStats> {
    use tracing::{info_span, Instrument};
    use uuid::Uuid;

    config.validate()?;

    let span = info_span!("sync_run", run_id = %Uuid::new_v4());
    async {
        info!(start_path = %config.start_path, "Starting sync");
        let deps = CoreDependencies::bootstrap(config).await?;
        CoreService::new(deps, config.start_path.clone()).run().await
    }
    .instrument(span)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bridge_traits::{
        BridgeError, Entry, FileMetadata, FolderMetadata, ListingPage,
    };
    use core_store::{FileRow, FolderRow, StoreError};
    use core_sync::SyncError;
    use mockall::mock;

    mock! {
        Source {}

        #[async_trait]
        impl ListingSource for Source {
            async fn open(&self) -> bridge_traits::error::Result<()>;
            async fn list_folder(&self, path: &str, recursive: bool) -> bridge_traits::error::Result<ListingPage>;
            async fn list_folder_continue(&self, cursor: &str) -> bridge_traits::error::Result<ListingPage>;
            async fn close(&self) -> bridge_traits::error::Result<()>;
        }
    }

    mock! {
        Store {}

        #[async_trait]
        impl MetadataStore for Store {
            async fn migrate(&self) -> core_store::Result<()>;
            async fn health_check(&self) -> core_store::Result<()>;
            async fn upsert_folder(&self, folder: &FolderMetadata) -> core_store::Result<()>;
            async fn upsert_file(&self, file: &FileMetadata) -> core_store::Result<()>;
            async fn find_folder(&self, folder_id: &str) -> core_store::Result<Option<FolderRow>>;
            async fn find_file(&self, file_id: &str) -> core_store::Result<Option<FileRow>>;
            async fn close(&self) -> core_store::Result<()>;
        }
    }

    fn docs() -> Entry {
        Entry::Folder(FolderMetadata {
            id: "id:fid1".to_string(),
            name: "Docs".to_string(),
            path_display: Some("/Docs".to_string()),
            path_lower: Some("/docs".to_string()),
            parent_shared_folder_id: None,
            preview_url: None,
            property_groups: None,
            shared_folder_id: None,
        })
    }

    fn source_with_one_page() -> MockSource {
        let mut source = MockSource::new();
        source.expect_open().times(1).returning(|| Ok(()));
        source.expect_list_folder().times(1).returning(|_, _| {
            Ok(ListingPage {
                entries: vec![docs()],
                has_more: false,
                cursor: Some("c1".to_string()),
            })
        });
        source.expect_close().times(1).returning(|| Ok(()));
        source
    }

    fn closed_error() -> StoreError {
        StoreError::Database(sqlx::Error::PoolClosed)
    }

    #[tokio::test]
    async fn test_run_closes_store_on_success() {
        let mut store = MockStore::new();
        store.expect_upsert_folder().times(1).returning(|_| Ok(()));
        store.expect_close().times(1).returning(|| Ok(()));

        let service = CoreService::new(
            CoreDependencies::new(Arc::new(source_with_one_page()), Arc::new(store)),
            "/",
        );
        let stats = service.run().await.unwrap();

        assert_eq!(stats.folders_processed, 1);
        assert_eq!(stats.files_processed, 0);
    }

    #[tokio::test]
    async fn test_close_failure_fails_successful_run() {
        let mut store = MockStore::new();
        store.expect_upsert_folder().times(1).returning(|_| Ok(()));
        store
            .expect_close()
            .times(1)
            .returning(|| Err(closed_error()));

        let service = CoreService::new(
            CoreDependencies::new(Arc::new(source_with_one_page()), Arc::new(store)),
            "/",
        );
        let result = service.run().await;

        assert!(matches!(result, Err(CoreError::Store(_))));
    }

    #[tokio::test]
    async fn test_traversal_error_wins_over_close_error() {
        let mut source = MockSource::new();
        source.expect_open().times(1).returning(|| Ok(()));
        source
            .expect_list_folder()
            .times(1)
            .returning(|_, _| Err(BridgeError::Unauthorized("invalid_access_token".to_string())));
        source.expect_close().times(1).returning(|| Ok(()));

        let mut store = MockStore::new();
        store
            .expect_close()
            .times(1)
            .returning(|| Err(closed_error()));

        let service = CoreService::new(
            CoreDependencies::new(Arc::new(source), Arc::new(store)),
            "/",
        );
        let result = service.run().await;

        assert!(matches!(
            result,
            Err(CoreError::Sync(SyncError::Listing(BridgeError::Unauthorized(_))))
        ));
    }

    #[tokio::test]
    async fn test_store_closed_after_upsert_failure() {
        let mut store = MockStore::new();
        store
            .expect_upsert_folder()
            .times(1)
            .returning(|_| Err(StoreError::Migration("no table".to_string())));
        store.expect_close().times(1).returning(|| Ok(()));

        let service = CoreService::new(
            CoreDependencies::new(Arc::new(source_with_one_page()), Arc::new(store)),
            "/",
        );
        let result = service.run().await;

        assert!(matches!(
            result,
            Err(CoreError::Sync(SyncError::Store(_)))
        ));
    }

    #[cfg(feature = "desktop-shims")]
    #[tokio::test]
    async fn test_invalid_config_fails_before_io() {
        use core_runtime::{DatabaseConfig, DropboxConfig};

        let config = AppConfig::new(
            DropboxConfig::new("token"),
            DatabaseConfig::sqlite(":memory:"),
        )
        .with_start_path("relative/path");

        let result = run(&config).await;
        assert!(matches!(result, Err(CoreError::Config(_))));
    }
}
