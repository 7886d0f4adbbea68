use bridge_traits::error::BridgeError;
use core_store::StoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Listing service error: {0}")]
    Listing(#[from] BridgeError),

    #[error("Metadata store error: {0}")]
    Store(#[from] StoreError),

    #[error("Listing page reported more entries without a continuation cursor")]
    MissingCursor,

    #[error("Invalid state transition from {from} to {to}: {reason}")]
    InvalidStateTransition {
        from: String,
        to: String,
        reason: String,
    },
}

pub type Result<T> = std::result::Result<T, SyncError>;
