//! Error types for the Dropbox provider

use bridge_traits::error::BridgeError;
use thiserror::Error;

/// Dropbox provider errors
#[derive(Error, Debug)]
pub enum DropboxError {
    /// Access token missing, expired or revoked
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// API request returned an error
    #[error("Dropbox API error (status {status_code}): {message}")]
    ApiError { status_code: u16, message: String },

    /// Failed to parse API response
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// The connector was closed
    #[error("Dropbox session is closed")]
    SessionClosed,

    /// Bridge error
    #[error(transparent)]
    BridgeError(#[from] BridgeError),
}

/// Result type for Dropbox operations
pub type Result<T> = std::result::Result<T, DropboxError>;

impl From<DropboxError> for BridgeError {
    fn from(error: DropboxError) -> Self {
        match error {
            DropboxError::AuthenticationFailed(msg) => BridgeError::Unauthorized(msg),
            DropboxError::SessionClosed => {
                BridgeError::SessionClosed("Dropbox connector".to_string())
            }
            DropboxError::ApiError {
                status_code,
                message,
            } => BridgeError::OperationFailed(format!(
                "API error (status {}): {}",
                status_code, message
            )),
            DropboxError::ParseError(msg) => {
                BridgeError::OperationFailed(format!("Parse error: {}", msg))
            }
            DropboxError::BridgeError(e) => e,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = DropboxError::ApiError {
            status_code: 409,
            message: "path/not_found/..".to_string(),
        };

        assert_eq!(
            error.to_string(),
            "Dropbox API error (status 409): path/not_found/.."
        );
    }

    #[test]
    fn test_error_conversion() {
        let bridge_error: BridgeError =
            DropboxError::AuthenticationFailed("expired_access_token".to_string()).into();
        assert!(matches!(bridge_error, BridgeError::Unauthorized(_)));

        let bridge_error: BridgeError = DropboxError::SessionClosed.into();
        assert!(matches!(bridge_error, BridgeError::SessionClosed(_)));

        let bridge_error: BridgeError = DropboxError::ParseError("eof".to_string()).into();
        assert!(matches!(bridge_error, BridgeError::OperationFailed(_)));
    }
}
