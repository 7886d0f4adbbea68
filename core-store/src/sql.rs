//! SQL shared by every backend
//!
//! Both PostgreSQL and SQLite accept `$N` placeholders and
//! `ON CONFLICT (...) DO UPDATE SET col = EXCLUDED.col`, so the statements
//! below are used verbatim by each store.

pub(crate) const UPSERT_FOLDER: &str = r#"
    INSERT INTO dropbox_folder (
        folder_id, folder_name, parent_shared_folder_id, path_display, path_lower,
        preview_url, property_groups, shared_folder_id
    ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
    ON CONFLICT (folder_id) DO UPDATE SET
        folder_name = EXCLUDED.folder_name,
        parent_shared_folder_id = EXCLUDED.parent_shared_folder_id,
        path_display = EXCLUDED.path_display,
        path_lower = EXCLUDED.path_lower,
        preview_url = EXCLUDED.preview_url,
        property_groups = EXCLUDED.property_groups,
        shared_folder_id = EXCLUDED.shared_folder_id
"#;

pub(crate) const UPSERT_FILE: &str = r#"
    INSERT INTO dropbox_file (
        id, file_extension, client_modified, content_hash,
        export_info, file_lock_info, has_explicit_shared_members,
        is_downloadable, media_info, file_name, parent_shared_folder_id,
        path_display, path_lower, preview_url, property_groups, rev,
        server_modified, size, symlink_info
    ) VALUES (
        $1, $2, $3, $4, $5, $6, $7, $8, $9, $10,
        $11, $12, $13, $14, $15, $16, $17, $18, $19
    )
    ON CONFLICT (id) DO UPDATE SET
        file_extension = EXCLUDED.file_extension,
        client_modified = EXCLUDED.client_modified,
        content_hash = EXCLUDED.content_hash,
        export_info = EXCLUDED.export_info,
        file_lock_info = EXCLUDED.file_lock_info,
        has_explicit_shared_members = EXCLUDED.has_explicit_shared_members,
        is_downloadable = EXCLUDED.is_downloadable,
        media_info = EXCLUDED.media_info,
        file_name = EXCLUDED.file_name,
        parent_shared_folder_id = EXCLUDED.parent_shared_folder_id,
        path_display = EXCLUDED.path_display,
        path_lower = EXCLUDED.path_lower,
        preview_url = EXCLUDED.preview_url,
        property_groups = EXCLUDED.property_groups,
        rev = EXCLUDED.rev,
        server_modified = EXCLUDED.server_modified,
        size = EXCLUDED.size,
        symlink_info = EXCLUDED.symlink_info
"#;

pub(crate) const SELECT_FOLDER: &str = r#"
    SELECT folder_id, folder_name, parent_shared_folder_id, path_display, path_lower,
           preview_url, property_groups, shared_folder_id
    FROM dropbox_folder
    WHERE folder_id = $1
"#;

pub(crate) const SELECT_FILE: &str = r#"
    SELECT id, file_extension, client_modified, content_hash,
           export_info, file_lock_info, has_explicit_shared_members,
           is_downloadable, media_info, file_name, parent_shared_folder_id,
           path_display, path_lower, preview_url, property_groups, rev,
           server_modified, size, symlink_info
    FROM dropbox_file
    WHERE id = $1
"#;

/// Bind a `FolderMetadata` to [`UPSERT_FOLDER`] in column order
macro_rules! bind_folder {
    ($query:expr, $folder:expr) => {
        $query
            .bind(&$folder.id)
            .bind(&$folder.name)
            .bind(&$folder.parent_shared_folder_id)
            .bind(&$folder.path_display)
            .bind(&$folder.path_lower)
            .bind(&$folder.preview_url)
            .bind($folder.property_groups.as_ref().map(sqlx::types::Json))
            .bind(&$folder.shared_folder_id)
    };
}

/// Bind a `FileMetadata` plus its derived columns to [`UPSERT_FILE`]
macro_rules! bind_file {
    ($query:expr, $file:expr, $extension:expr, $size:expr) => {
        $query
            .bind(&$file.id)
            .bind($extension)
            .bind($file.client_modified)
            .bind(&$file.content_hash)
            .bind($file.export_info.as_ref().map(sqlx::types::Json))
            .bind($file.file_lock_info.as_ref().map(sqlx::types::Json))
            .bind($file.has_explicit_shared_members)
            .bind($file.is_downloadable)
            .bind($file.media_info.as_ref().map(sqlx::types::Json))
            .bind(&$file.name)
            .bind(&$file.parent_shared_folder_id)
            .bind(&$file.path_display)
            .bind(&$file.path_lower)
            .bind(&$file.preview_url)
            .bind($file.property_groups.as_ref().map(sqlx::types::Json))
            .bind(&$file.rev)
            .bind($file.server_modified)
            .bind($size)
            .bind($file.symlink_info.as_ref().map(sqlx::types::Json))
    };
}

pub(crate) use bind_file;
pub(crate) use bind_folder;

/// Convert the unsigned size reported by the provider into a `BIGINT`
pub(crate) fn size_column(size: u64) -> crate::Result<i64> {
    i64::try_from(size).map_err(|_| crate::StoreError::InvalidRecord {
        field: "size".to_string(),
        message: format!("{} does not fit in a BIGINT column", size),
    })
}

/// Split an embedded schema into individual statements
///
/// PostgreSQL prepared statements accept one statement at a time.
pub(crate) fn schema_statements(schema: &str) -> Vec<&str> {
    schema
        .split(';')
        .filter_map(|statement| {
            let trimmed = statement.trim();
            let has_sql = trimmed.lines().any(|line| {
                let line = line.trim();
                !line.is_empty() && !line.starts_with("--")
            });
            has_sql.then_some(trimmed)
        })
        .collect()
}
