//! Metadata store contract

use async_trait::async_trait;
use bridge_traits::{FileMetadata, FolderMetadata};

use crate::models::{FileRow, FolderRow};
use crate::Result;

/// Persistent home of folder and file metadata
///
/// Upserts are keyed on the provider id and overwrite every column of an
/// existing row (last write wins). Each upsert commits in its own
/// transaction, so rows written before a failure stay committed.
#[async_trait]
pub trait MetadataStore: Send + Sync {
    /// Create the tables when they do not exist yet
    async fn migrate(&self) -> Result<()>;

    /// Round-trip a trivial query through the pool
    async fn health_check(&self) -> Result<()>;

    async fn upsert_folder(&self, folder: &FolderMetadata) -> Result<()>;

    async fn upsert_file(&self, file: &FileMetadata) -> Result<()>;

    async fn find_folder(&self, folder_id: &str) -> Result<Option<FolderRow>>;

    async fn find_file(&self, file_id: &str) -> Result<Option<FileRow>>;

    /// Release the connection pool. Closing an already closed store is a no-op.
    async fn close(&self) -> Result<()>;
}
