//! Scoped ownership of a remote listing session

use bridge_traits::error::Result;
use bridge_traits::ListingSource;
use std::sync::Arc;
use tokio::runtime::Handle;
use tracing::{debug, warn};

/// Holds a listing source open for the duration of one traversal
///
/// [`ListingSession::open`] acquires the session on the source and
/// [`ListingSession::release`] closes it. A session dropped without
/// being released (the traversal future was cancelled) schedules the close
/// on the current tokio runtime instead.
pub struct ListingSession {
    source: Arc<dyn ListingSource>,
    released: bool,
}

impl ListingSession {
    /// Open the source; nothing needs releasing when this fails
    pub async fn open(source: Arc<dyn ListingSource>) -> Result<Self> {
        source.open().await?;
        debug!("Listing session opened");
        Ok(Self {
            source,
            released: false,
        })
    }

    pub fn source(&self) -> &dyn ListingSource {
        self.source.as_ref()
    }

    /// Close the underlying source exactly once
    pub async fn release(mut self) -> Result<()> {
        self.released = true;
        let result = self.source.close().await;
        debug!(ok = result.is_ok(), "Listing session released");
        result
    }
}

impl Drop for ListingSession {
    fn drop(&mut self) {
        if self.released {
            return;
        }

        match Handle::try_current() {
            Ok(handle) => {
                let source = Arc::clone(&self.source);
                handle.spawn(async move {
                    if let Err(e) = source.close().await {
                        warn!(error = %e, "Failed to close abandoned listing session");
                    }
                });
            }
            Err(_) => warn!("Listing session dropped outside a runtime; not closed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bridge_traits::error::BridgeError;
    use bridge_traits::ListingPage;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingSource {
        opens: AtomicUsize,
        closes: AtomicUsize,
        refuse_open: bool,
    }

    #[async_trait]
    impl ListingSource for CountingSource {
        async fn open(&self) -> Result<()> {
            if self.refuse_open {
                return Err(BridgeError::Unauthorized("invalid_access_token".to_string()));
            }
            self.opens.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn list_folder(&self, _path: &str, _recursive: bool) -> Result<ListingPage> {
            Err(BridgeError::NotAvailable("list_folder".to_string()))
        }

        async fn list_folder_continue(&self, _cursor: &str) -> Result<ListingPage> {
            Err(BridgeError::NotAvailable("list_folder_continue".to_string()))
        }

        async fn close(&self) -> Result<()> {
            self.closes.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_release_closes_once() {
        let source = Arc::new(CountingSource::default());
        let session = ListingSession::open(source.clone()).await.unwrap();

        session.release().await.unwrap();

        assert_eq!(source.opens.load(Ordering::SeqCst), 1);
        assert_eq!(source.closes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failed_open_does_not_close() {
        let source = Arc::new(CountingSource {
            refuse_open: true,
            ..Default::default()
        });

        let result = ListingSession::open(source.clone()).await;
        tokio::task::yield_now().await;

        assert!(matches!(result, Err(BridgeError::Unauthorized(_))));
        assert_eq!(source.closes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_drop_schedules_close() {
        let source = Arc::new(CountingSource::default());
        drop(ListingSession::open(source.clone()).await.unwrap());

        // Let the spawned close run on the current-thread runtime
        tokio::task::yield_now().await;

        assert_eq!(source.closes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_drop_without_runtime_does_not_panic() {
        let source = Arc::new(CountingSource::default());
        let session = tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap()
            .block_on(ListingSession::open(source.clone()))
            .unwrap();

        drop(session);
        assert_eq!(source.closes.load(Ordering::SeqCst), 0);
    }
}
