//! Dropbox API response types
//!
//! Data structures for deserializing Dropbox API v2 `files/list_folder`
//! responses, and their conversion into bridge entries.

use bridge_traits::{Entry, FileMetadata, FolderMetadata};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of `files/list_folder`
#[derive(Debug, Serialize)]
pub struct ListFolderArg<'a> {
    /// Empty string for the account root
    pub path: &'a str,
    pub recursive: bool,
}

/// Body of `files/list_folder/continue`
#[derive(Debug, Serialize)]
pub struct ListFolderContinueArg<'a> {
    pub cursor: &'a str,
}

/// Response of both listing endpoints
///
/// See: https://www.dropbox.com/developers/documentation/http/documentation#files-list_folder
#[derive(Debug, Deserialize)]
pub struct ListFolderResponse {
    pub entries: Vec<Metadata>,
    pub cursor: String,
    pub has_more: bool,
}

/// One listing entry, discriminated by `.tag`
#[derive(Debug, Deserialize)]
#[serde(tag = ".tag", rename_all = "snake_case")]
pub enum Metadata {
    Folder(FolderResource),
    File(FileResource),
    Deleted(DeletedResource),
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Default, Deserialize)]
pub struct SharingInfo {
    #[serde(default)]
    pub parent_shared_folder_id: Option<String>,
    #[serde(default)]
    pub shared_folder_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct FolderResource {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub path_display: Option<String>,
    #[serde(default)]
    pub path_lower: Option<String>,
    #[serde(default)]
    pub parent_shared_folder_id: Option<String>,
    #[serde(default)]
    pub preview_url: Option<String>,
    #[serde(default)]
    pub property_groups: Option<Value>,
    #[serde(default)]
    pub shared_folder_id: Option<String>,
    #[serde(default)]
    pub sharing_info: Option<SharingInfo>,
}

#[derive(Debug, Deserialize)]
pub struct FileResource {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub path_display: Option<String>,
    #[serde(default)]
    pub path_lower: Option<String>,
    #[serde(default)]
    pub parent_shared_folder_id: Option<String>,
    #[serde(default)]
    pub preview_url: Option<String>,
    #[serde(default)]
    pub property_groups: Option<Value>,
    pub client_modified: DateTime<Utc>,
    pub server_modified: DateTime<Utc>,
    pub rev: String,
    pub size: u64,
    #[serde(default)]
    pub content_hash: Option<String>,
    #[serde(default)]
    pub export_info: Option<Value>,
    #[serde(default)]
    pub file_lock_info: Option<Value>,
    #[serde(default)]
    pub symlink_info: Option<Value>,
    #[serde(default)]
    pub media_info: Option<Value>,
    #[serde(default)]
    pub has_explicit_shared_members: bool,
    #[serde(default = "default_true")]
    pub is_downloadable: bool,
    #[serde(default)]
    pub sharing_info: Option<SharingInfo>,
}

/// Marker for an entry removed at the source
#[derive(Debug, Deserialize)]
pub struct DeletedResource {
    pub name: String,
    #[serde(default)]
    pub path_display: Option<String>,
}

/// Error body returned with 4xx statuses
#[derive(Debug, Deserialize)]
pub struct ApiErrorBody {
    pub error_summary: String,
}

fn default_true() -> bool {
    true
}

impl From<Metadata> for Entry {
    fn from(metadata: Metadata) -> Self {
        match metadata {
            Metadata::Folder(folder) => Entry::Folder(folder.into()),
            Metadata::File(file) => Entry::File(file.into()),
            Metadata::Deleted(deleted) => Entry::Other {
                tag: "deleted".to_string(),
                path_display: deleted.path_display,
            },
            Metadata::Unknown => Entry::Other {
                tag: "unknown".to_string(),
                path_display: None,
            },
        }
    }
}

impl From<FolderResource> for FolderMetadata {
    fn from(folder: FolderResource) -> Self {
        let sharing = folder.sharing_info.unwrap_or_default();

        FolderMetadata {
            id: folder.id,
            name: folder.name,
            path_display: folder.path_display,
            path_lower: folder.path_lower,
            parent_shared_folder_id: folder
                .parent_shared_folder_id
                .or(sharing.parent_shared_folder_id),
            preview_url: folder.preview_url,
            property_groups: folder.property_groups,
            shared_folder_id: folder.shared_folder_id.or(sharing.shared_folder_id),
        }
    }
}

impl From<FileResource> for FileMetadata {
    fn from(file: FileResource) -> Self {
        let sharing = file.sharing_info.unwrap_or_default();

        FileMetadata {
            id: file.id,
            name: file.name,
            path_display: file.path_display,
            path_lower: file.path_lower,
            parent_shared_folder_id: file
                .parent_shared_folder_id
                .or(sharing.parent_shared_folder_id),
            preview_url: file.preview_url,
            property_groups: file.property_groups,
            client_modified: file.client_modified,
            server_modified: file.server_modified,
            rev: file.rev,
            size: file.size,
            content_hash: file.content_hash,
            export_info: file.export_info,
            file_lock_info: file.file_lock_info,
            symlink_info: file.symlink_info,
            media_info: file.media_info,
            has_explicit_shared_members: file.has_explicit_shared_members,
            is_downloadable: file.is_downloadable,
        }
    }
}
