//! SQLite metadata store
//!
//! Local single-file mode and the backend the test-suite runs against. The
//! statements are the ones the PostgreSQL store executes.

use async_trait::async_trait;
use bridge_traits::{FileMetadata, FolderMetadata};
use core_runtime::DatabaseConfig;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::models::{file_extension, FileRow, FolderRow};
use crate::sql::{self, bind_file, bind_folder};
use crate::store::MetadataStore;
use crate::{Result, StoreError};

const SCHEMA: &str = include_str!("schema/sqlite.sql");
const IN_MEMORY: &str = ":memory:";

pub struct SqliteMetadataStore {
    pool: SqlitePool,
}

impl SqliteMetadataStore {
    /// Open the database file named by `config.name`, creating it if missing
    pub async fn open(config: &DatabaseConfig) -> Result<Self> {
        info!(path = %config.name, "Opening SQLite database");

        if config.name == IN_MEMORY {
            return Self::in_memory().await;
        }

        let options = SqliteConnectOptions::new()
            .filename(&config.name)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .connect_with(options)
            .await
            .map_err(|e| {
                warn!(error = %e, "Failed to open SQLite database");
                StoreError::Database(e)
            })?;

        Self::bootstrap(pool).await
    }

    /// Private in-memory database with the schema applied
    ///
    /// Every connection to `:memory:` sees its own database, so the pool is
    /// pinned to a single connection that never expires.
    pub async fn in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        Self::bootstrap(pool).await
    }

    async fn bootstrap(pool: SqlitePool) -> Result<Self> {
        let store = Self { pool };
        store.migrate().await?;
        store.health_check().await?;
        Ok(store)
    }
}

#[async_trait]
impl MetadataStore for SqliteMetadataStore {
    async fn migrate(&self) -> Result<()> {
        debug!("Applying SQLite schema");

        for statement in sql::schema_statements(SCHEMA) {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(|e| StoreError::Migration(e.to_string()))?;
        }

        Ok(())
    }

    async fn health_check(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn upsert_folder(&self, folder: &FolderMetadata) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        bind_folder!(sqlx::query(sql::UPSERT_FOLDER), folder)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(())
    }

    async fn upsert_file(&self, file: &FileMetadata) -> Result<()> {
        let extension = file_extension(&file.name);
        let size = sql::size_column(file.size)?;

        let mut tx = self.pool.begin().await?;
        bind_file!(sqlx::query(sql::UPSERT_FILE), file, extension, size)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(())
    }

    async fn find_folder(&self, folder_id: &str) -> Result<Option<FolderRow>> {
        let row = sqlx::query_as::<_, FolderRow>(sql::SELECT_FOLDER)
            .bind(folder_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn find_file(&self, file_id: &str) -> Result<Option<FileRow>> {
        let row = sqlx::query_as::<_, FileRow>(sql::SELECT_FILE)
            .bind(file_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn close(&self) -> Result<()> {
        if !self.pool.is_closed() {
            self.pool.close().await;
            info!("SQLite pool closed");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    fn folder(id: &str, name: &str) -> FolderMetadata {
        FolderMetadata {
            id: id.to_string(),
            name: name.to_string(),
            path_display: Some(format!("/{}", name)),
            path_lower: Some(format!("/{}", name.to_lowercase())),
            parent_shared_folder_id: None,
            preview_url: None,
            property_groups: None,
            shared_folder_id: None,
        }
    }

    fn file(id: &str, name: &str, size: u64) -> FileMetadata {
        FileMetadata {
            id: id.to_string(),
            name: name.to_string(),
            path_display: Some(format!("/{}", name)),
            path_lower: Some(format!("/{}", name.to_lowercase())),
            parent_shared_folder_id: None,
            preview_url: None,
            property_groups: None,
            client_modified: Utc.with_ymd_and_hms(2023, 1, 2, 3, 4, 5).unwrap(),
            server_modified: Utc.with_ymd_and_hms(2023, 1, 2, 3, 4, 6).unwrap(),
            rev: "015f1b1c0a2b".to_string(),
            size,
            content_hash: Some("abc123".to_string()),
            export_info: None,
            file_lock_info: None,
            symlink_info: None,
            media_info: None,
            has_explicit_shared_members: false,
            is_downloadable: true,
        }
    }

    async fn count(store: &SqliteMetadataStore, table: &str) -> i64 {
        sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM {}", table))
            .fetch_one(&store.pool)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_upsert_folder_is_idempotent() {
        let store = SqliteMetadataStore::in_memory().await.unwrap();
        let docs = folder("id:fid1", "Docs");

        store.upsert_folder(&docs).await.unwrap();
        let first = store.find_folder("id:fid1").await.unwrap();
        store.upsert_folder(&docs).await.unwrap();
        let second = store.find_folder("id:fid1").await.unwrap();

        assert_eq!(count(&store, "dropbox_folder").await, 1);
        assert_eq!(first, second);
        let row = second.unwrap();
        assert_eq!(row.folder_name, "Docs");
        assert_eq!(row.path_display.as_deref(), Some("/Docs"));
    }

    #[tokio::test]
    async fn test_upsert_folder_last_write_wins() {
        let store = SqliteMetadataStore::in_memory().await.unwrap();

        let mut docs = folder("id:fid1", "Docs");
        docs.shared_folder_id = Some("sf1".to_string());
        store.upsert_folder(&docs).await.unwrap();

        let renamed = folder("id:fid1", "Documents");
        store.upsert_folder(&renamed).await.unwrap();

        let row = store.find_folder("id:fid1").await.unwrap().unwrap();
        assert_eq!(row.folder_name, "Documents");
        assert_eq!(row.path_display.as_deref(), Some("/Documents"));
        assert_eq!(row.shared_folder_id, None);
        assert_eq!(count(&store, "dropbox_folder").await, 1);
    }

    #[tokio::test]
    async fn test_upsert_file_columns() {
        let store = SqliteMetadataStore::in_memory().await.unwrap();
        let mut a = file("id:file1", "a.txt", 10);
        a.media_info = Some(json!({"metadata": {"dimensions": {"height": 10, "width": 20}}}));

        store.upsert_file(&a).await.unwrap();

        let row = store.find_file("id:file1").await.unwrap().unwrap();
        assert_eq!(row.file_name, "a.txt");
        assert_eq!(row.file_extension.as_deref(), Some("txt"));
        assert_eq!(row.size, 10);
        assert_eq!(row.rev, "015f1b1c0a2b");
        assert_eq!(row.client_modified, a.client_modified);
        assert_eq!(row.server_modified, a.server_modified);
        assert!(row.is_downloadable);
        assert!(!row.has_explicit_shared_members);
        assert_eq!(row.media_info.map(|j| j.0), a.media_info);
        assert_eq!(row.export_info, None);
    }

    #[tokio::test]
    async fn test_upsert_file_without_extension() {
        let store = SqliteMetadataStore::in_memory().await.unwrap();
        store.upsert_file(&file("id:file2", "README", 0)).await.unwrap();

        let row = store.find_file("id:file2").await.unwrap().unwrap();
        assert_eq!(row.file_extension, None);
        assert_eq!(row.size, 0);
    }

    #[tokio::test]
    async fn test_upsert_file_is_idempotent_and_overwrites() {
        let store = SqliteMetadataStore::in_memory().await.unwrap();
        let a = file("id:file1", "a.txt", 10);

        store.upsert_file(&a).await.unwrap();
        store.upsert_file(&a).await.unwrap();
        assert_eq!(count(&store, "dropbox_file").await, 1);

        let mut edited = file("id:file1", "a.md", 42);
        edited.rev = "015f1b1c0a2c".to_string();
        edited.content_hash = None;
        store.upsert_file(&edited).await.unwrap();

        let row = store.find_file("id:file1").await.unwrap().unwrap();
        assert_eq!(row.file_extension.as_deref(), Some("md"));
        assert_eq!(row.size, 42);
        assert_eq!(row.rev, "015f1b1c0a2c");
        assert_eq!(row.content_hash, None);
        assert_eq!(count(&store, "dropbox_file").await, 1);
    }

    #[tokio::test]
    async fn test_oversized_file_is_rejected() {
        let store = SqliteMetadataStore::in_memory().await.unwrap();
        let result = store.upsert_file(&file("id:big", "big.bin", u64::MAX)).await;

        assert!(matches!(result, Err(StoreError::InvalidRecord { .. })));
        assert!(store.find_file("id:big").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_find_missing_rows() {
        let store = SqliteMetadataStore::in_memory().await.unwrap();
        assert!(store.find_folder("id:nope").await.unwrap().is_none());
        assert!(store.find_file("id:nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_migrate_twice() {
        let store = SqliteMetadataStore::in_memory().await.unwrap();
        store.upsert_folder(&folder("id:fid1", "Docs")).await.unwrap();

        store.migrate().await.unwrap();

        assert_eq!(count(&store, "dropbox_folder").await, 1);
    }

    #[tokio::test]
    async fn test_upsert_after_close_fails() {
        let store = SqliteMetadataStore::in_memory().await.unwrap();
        store.close().await.unwrap();
        store.close().await.unwrap();

        let result = store.upsert_folder(&folder("id:fid1", "Docs")).await;
        assert!(matches!(result, Err(StoreError::Database(_))));
    }

    #[tokio::test]
    async fn test_open_in_memory_from_config() {
        let config = DatabaseConfig::sqlite(":memory:");
        let store = SqliteMetadataStore::open(&config).await.unwrap();
        store.health_check().await.unwrap();
    }
}
