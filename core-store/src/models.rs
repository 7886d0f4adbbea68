//! Persisted row types and derived attributes

use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::FromRow;

/// Extension of a file name: the text after the final `.`
///
/// Returns `None` when the name contains no dot. A trailing dot yields an
/// empty extension and a leading dot (`.bashrc`) yields the rest of the name.
pub fn file_extension(name: &str) -> Option<String> {
    name.rsplit_once('.').map(|(_, ext)| ext.to_string())
}

/// A row of `dropbox_folder`
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct FolderRow {
    pub folder_id: String,
    pub folder_name: String,
    pub parent_shared_folder_id: Option<String>,
    pub path_display: Option<String>,
    pub path_lower: Option<String>,
    pub preview_url: Option<String>,
    pub property_groups: Option<Json<serde_json::Value>>,
    pub shared_folder_id: Option<String>,
}

/// A row of `dropbox_file`
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct FileRow {
    pub id: String,
    pub file_extension: Option<String>,
    pub client_modified: DateTime<Utc>,
    pub content_hash: Option<String>,
    pub export_info: Option<Json<serde_json::Value>>,
    pub file_lock_info: Option<Json<serde_json::Value>>,
    pub has_explicit_shared_members: bool,
    pub is_downloadable: bool,
    pub media_info: Option<Json<serde_json::Value>>,
    pub file_name: String,
    pub parent_shared_folder_id: Option<String>,
    pub path_display: Option<String>,
    pub path_lower: Option<String>,
    pub preview_url: Option<String>,
    pub property_groups: Option<Json<serde_json::Value>>,
    pub rev: String,
    pub server_modified: DateTime<Utc>,
    pub size: i64,
    pub symlink_info: Option<Json<serde_json::Value>>,
}
