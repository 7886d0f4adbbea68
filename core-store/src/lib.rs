//! # Metadata Store
//!
//! Persists folder and file metadata into the `dropbox_folder` and
//! `dropbox_file` tables. Two backends share the same SQL:
//!
//! - [`PostgresMetadataStore`] for the production database
//! - [`SqliteMetadataStore`] for local single-file runs and tests
//!
//! ```ignore
//! let store = core_store::open_store(&config.database).await?;
//! store.upsert_folder(&folder).await?;
//! store.close().await?;
//! ```

pub mod error;
pub mod models;
pub mod postgres;
mod sql;
pub mod sqlite;
pub mod store;

pub use error::{Result, StoreError};
pub use models::{file_extension, FileRow, FolderRow};
pub use postgres::PostgresMetadataStore;
pub use sqlite::SqliteMetadataStore;
pub use store::MetadataStore;

use core_runtime::{DatabaseBackend, DatabaseConfig};
use std::sync::Arc;

/// Open the backend selected by `config.backend`
pub async fn open_store(config: &DatabaseConfig) -> Result<Arc<dyn MetadataStore>> {
    let store: Arc<dyn MetadataStore> = match config.backend {
        DatabaseBackend::Postgres => Arc::new(PostgresMetadataStore::open(config).await?),
        DatabaseBackend::Sqlite => Arc::new(SqliteMetadataStore::open(config).await?),
    };
    Ok(store)
}
