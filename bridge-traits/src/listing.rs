//! Listing Source Abstraction
//!
//! A remote, paginated, recursive directory-listing service. Callers open a
//! session with [`ListingSource::open`], start a traversal with
//! [`ListingSource::list_folder`] and keep calling
//! [`ListingSource::list_folder_continue`] with the page cursor until a page
//! reports `has_more == false`. [`ListingSource::close`] ends the session.
//!
//! Provider crates decode their wire format into [`Entry`] exactly once, so
//! consumers match over `Folder`, `File` and `Other` instead of checking
//! runtime types.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Folder node reported by a listing page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FolderMetadata {
    /// Provider-assigned unique identifier
    pub id: String,
    /// Last path component, with original casing
    pub name: String,
    /// Full path for display purposes
    pub path_display: Option<String>,
    /// Lowercased full path, used for case-insensitive comparisons
    pub path_lower: Option<String>,
    /// Shared folder this folder lives in, if any
    pub parent_shared_folder_id: Option<String>,
    pub preview_url: Option<String>,
    /// Structured property-group payload, stored verbatim
    pub property_groups: Option<serde_json::Value>,
    /// Set when this folder is itself a shared folder mount
    pub shared_folder_id: Option<String>,
}

/// File node reported by a listing page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileMetadata {
    /// Provider-assigned unique identifier
    pub id: String,
    pub name: String,
    pub path_display: Option<String>,
    pub path_lower: Option<String>,
    pub parent_shared_folder_id: Option<String>,
    pub preview_url: Option<String>,
    pub property_groups: Option<serde_json::Value>,
    /// Modification time as reported by the uploading client
    pub client_modified: DateTime<Utc>,
    /// Last time the provider saw the file change
    pub server_modified: DateTime<Utc>,
    /// Revision token
    pub rev: String,
    /// Size in bytes
    pub size: u64,
    /// Provider-computed content hash, not interpreted here
    pub content_hash: Option<String>,
    pub export_info: Option<serde_json::Value>,
    pub file_lock_info: Option<serde_json::Value>,
    pub symlink_info: Option<serde_json::Value>,
    pub media_info: Option<serde_json::Value>,
    pub has_explicit_shared_members: bool,
    pub is_downloadable: bool,
}

/// One node of a recursive listing
#[derive(Debug, Clone, PartialEq)]
pub enum Entry {
    Folder(FolderMetadata),
    File(FileMetadata),
    /// Any kind the core does not understand (e.g. deletion markers)
    Other {
        tag: String,
        path_display: Option<String>,
    },
}

impl Entry {
    /// Short name of the entry kind, for logging
    pub fn kind(&self) -> &str {
        match self {
            Entry::Folder(_) => "folder",
            Entry::File(_) => "file",
            Entry::Other { tag, .. } => tag,
        }
    }

    /// Display path of the entry, when the provider reported one
    pub fn path_display(&self) -> Option<&str> {
        match self {
            Entry::Folder(folder) => folder.path_display.as_deref(),
            Entry::File(file) => file.path_display.as_deref(),
            Entry::Other { path_display, .. } => path_display.as_deref(),
        }
    }
}

/// A single page of listing results
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ListingPage {
    /// Entries in the order the provider reported them
    pub entries: Vec<Entry>,
    /// Whether another page can be fetched with `cursor`
    pub has_more: bool,
    /// Opaque continuation token
    pub cursor: Option<String>,
}

impl ListingPage {
    /// Cursor to continue from, only when more pages remain
    pub fn next_cursor(&self) -> Option<&str> {
        if self.has_more {
            self.cursor.as_deref()
        } else {
            None
        }
    }
}

/// Paginated recursive listing service
///
/// Every call may fail with a [`BridgeError`](crate::error::BridgeError);
/// consumers treat all of them as a listing-service failure.
///
/// # Example
///
/// ```ignore
/// use bridge_traits::listing::ListingSource;
///
/// async fn count(source: &dyn ListingSource) -> Result<usize> {
///     source.open().await?;
///     let mut page = source.list_folder("/", true).await?;
///     let mut total = page.entries.len();
///     while let Some(cursor) = page.next_cursor().map(str::to_owned) {
///         page = source.list_folder_continue(&cursor).await?;
///         total += page.entries.len();
///     }
///     source.close().await?;
///     Ok(total)
/// }
/// ```
#[async_trait]
pub trait ListingSource: Send + Sync {
    /// Acquire a listing session, making the source usable again after
    /// [`close`](ListingSource::close)
    async fn open(&self) -> Result<()>;

    /// List `path`, descending into sub-folders when `recursive` is set
    ///
    /// `"/"` denotes the account root.
    async fn list_folder(&self, path: &str, recursive: bool) -> Result<ListingPage>;

    /// Fetch the page following `cursor`
    async fn list_folder_continue(&self, cursor: &str) -> Result<ListingPage>;

    /// Release any session or connection held by the client
    async fn close(&self) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn folder(id: &str, path: &str) -> Entry {
        Entry::Folder(FolderMetadata {
            id: id.to_string(),
            name: path.rsplit('/').next().unwrap_or_default().to_string(),
            path_display: Some(path.to_string()),
            path_lower: Some(path.to_lowercase()),
            parent_shared_folder_id: None,
            preview_url: None,
            property_groups: None,
            shared_folder_id: None,
        })
    }

    #[test]
    fn test_next_cursor_only_when_more() {
        let mut page = ListingPage {
            entries: vec![],
            has_more: true,
            cursor: Some("c1".to_string()),
        };
        assert_eq!(page.next_cursor(), Some("c1"));

        page.has_more = false;
        assert_eq!(page.next_cursor(), None);
    }

    #[test]
    fn test_entry_accessors() {
        let entry = folder("id:1", "/Docs");
        assert_eq!(entry.kind(), "folder");
        assert_eq!(entry.path_display(), Some("/Docs"));

        let other = Entry::Other {
            tag: "deleted".to_string(),
            path_display: None,
        };
        assert_eq!(other.kind(), "deleted");
        assert_eq!(other.path_display(), None);
    }
}
