//! PostgreSQL metadata store

use async_trait::async_trait;
use bridge_traits::{FileMetadata, FolderMetadata};
use core_runtime::DatabaseConfig;
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::models::{file_extension, FileRow, FolderRow};
use crate::sql::{self, bind_file, bind_folder};
use crate::store::MetadataStore;
use crate::{Result, StoreError};

const SCHEMA: &str = include_str!("schema/postgres.sql");

pub struct PostgresMetadataStore {
    pool: PgPool,
}

impl PostgresMetadataStore {
    /// Connect, bootstrap the schema and verify the pool
    pub async fn open(config: &DatabaseConfig) -> Result<Self> {
        info!(
            host = %config.host,
            port = config.port,
            database = %config.name,
            user = %config.user,
            max_connections = config.max_connections,
            "Connecting to PostgreSQL"
        );

        let options = PgConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .database(&config.name)
            .username(&config.user)
            .password(&config.password);

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(30))
            .connect_with(options)
            .await
            .map_err(|e| {
                warn!(error = %e, "Failed to connect to PostgreSQL");
                StoreError::Database(e)
            })?;

        let store = Self::from_pool(pool);
        store.migrate().await?;
        store.health_check().await?;

        Ok(store)
    }

    /// Wrap an existing pool without touching the schema
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MetadataStore for PostgresMetadataStore {
    async fn migrate(&self) -> Result<()> {
        debug!("Applying PostgreSQL schema");

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
            info!("PostgreSQL pool closed");
        }
        Ok(())
    }
}
