//! Dropbox API connector implementation
//!
//! Implements the `ListingSource` trait for Dropbox API v2.

use async_trait::async_trait;
use bridge_traits::error::Result;
use bridge_traits::http::{HttpClient, HttpMethod, HttpRequest, HttpResponse};
use bridge_traits::listing::{Entry, ListingPage, ListingSource};
use core_runtime::config::{DropboxConfig, ROOT_PATH};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use crate::error::DropboxError;
use crate::types::{ApiErrorBody, ListFolderArg, ListFolderContinueArg, ListFolderResponse};

const LIST_FOLDER: &str = "files/list_folder";
const LIST_FOLDER_CONTINUE: &str = "files/list_folder/continue";

/// Dropbox API connector
///
/// Implements `ListingSource` for Dropbox API v2.
///
/// # Example
///
/// ```ignore
/// use provider_dropbox::DropboxConnector;
/// use bridge_traits::ListingSource;
///
/// let connector = DropboxConnector::new(http_client, &config.dropbox);
/// let page = connector.list_folder("/", true).await?;
/// ```
pub struct DropboxConnector {
    /// HTTP client for API requests
    http_client: Arc<dyn HttpClient>,

    /// OAuth 2.0 access token
    access_token: String,

    /// API base, e.g. `https://api.dropboxapi.com/2`
    api_base_url: String,

    timeout: Duration,

    closed: AtomicBool,
}

impl DropboxConnector {
    pub fn new(http_client: Arc<dyn HttpClient>, config: &DropboxConfig) -> Self {
        Self {
            http_client,
            access_token: config.access_token.clone(),
            api_base_url: config.api_base_url.trim_end_matches('/').to_string(),
            timeout: config.timeout,
            closed: AtomicBool::new(false),
        }
    }

    /// Path form expected by the API; the account root is the empty string
    fn api_path(path: &str) -> &str {
        if path == ROOT_PATH {
            ""
        } else {
            path
        }
    }

    fn endpoint(&self, route: &str) -> String {
        format!("{}/{}", self.api_base_url, route)
    }

    fn ensure_open(&self) -> std::result::Result<(), DropboxError> {
        if self.closed.load(Ordering::Acquire) {
            Err(DropboxError::SessionClosed)
        } else {
            Ok(())
        }
    }

    /// POST a JSON argument to an RPC route and decode the listing page
    async fn call<B: Serialize + Sync>(
        &self,
        route: &str,
        arg: &B,
    ) -> std::result::Result<ListingPage, DropboxError> {
        self.ensure_open()?;

        let request = HttpRequest::new(HttpMethod::Post, self.endpoint(route))
            .bearer_token(&self.access_token)
            .timeout(self.timeout)
            .json(arg)?;

        let response = self.http_client.execute(request).await?;
        let response = Self::check_status(response)?;

        let body: ListFolderResponse = serde_json::from_slice(&response.body).map_err(|e| {
            DropboxError::ParseError(format!("Failed to parse {} response: {}", route, e))
        })?;

        let entries: Vec<Entry> = body.entries.into_iter().map(Entry::from).collect();
        debug!(
            route,
            entries = entries.len(),
            has_more = body.has_more,
            "Fetched listing page"
        );

        Ok(ListingPage {
            entries,
            has_more: body.has_more,
            cursor: Some(body.cursor),
        })
    }

    /// Map non-success statuses into provider errors
    fn check_status(response: HttpResponse) -> std::result::Result<HttpResponse, DropboxError> {
        let status = response.status;
        if response.is_success() {
            return Ok(response);
        }

        let summary = serde_json::from_slice::<ApiErrorBody>(&response.body)
            .map(|body| body.error_summary)
            .unwrap_or_else(|_| String::from_utf8_lossy(&response.body).trim().to_string());

        warn!(status, error = %summary, "Dropbox API request failed");

        Err(match status {
            401 => DropboxError::AuthenticationFailed(summary),
            _ => DropboxError::ApiError {
                status_code: status,
                message: summary,
            },
        })
    }
}

#[async_trait]
impl ListingSource for DropboxConnector {
    async fn open(&self) -> Result<()> {
        if self.closed.swap(false, Ordering::AcqRel) {
            debug!("Dropbox session reopened");
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn list_folder(&self, path: &str, recursive: bool) -> Result<ListingPage> {
        info!("Listing Dropbox folder");

        let arg = ListFolderArg {
            path: Self::api_path(path),
            recursive,
        };
        Ok(self.call(LIST_FOLDER, &arg).await?)
    }

    #[instrument(skip(self, cursor))]
    async fn list_folder_continue(&self, cursor: &str) -> Result<ListingPage> {
        let arg = ListFolderContinueArg { cursor };
        Ok(self.call(LIST_FOLDER_CONTINUE, &arg).await?)
    }

    async fn close(&self) -> Result<()> {
        if !self.closed.swap(true, Ordering::AcqRel) {
            debug!("Dropbox session closed");
        }
        Ok(())
    }
}
