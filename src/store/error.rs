//! Store error types

use thiserror::Error;

use crate::feed::{EndpointError, FeedError};

/// Errors that can occur in store operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// HTTP fetch failed (transport, status or body)
    #[error("Feed error: {0}")]
    Feed(#[from] FeedError),

    /// Configured base address could not be resolved
    #[error("Endpoint error: {0}")]
    Endpoint(#[from] EndpointError),

    /// Push channel handshake or transport failed
    #[error("Push channel error: {0}")]
    Push(#[from] tokio_tungstenite::tungstenite::Error),

    /// Push message was not a list of matches
    #[error("Malformed push message: {0}")]
    Decode(#[from] serde_json::Error),

    /// Handshake completed after `disconnect` or a newer `connect_ws`
    #[error("Push connection superseded before the handshake completed")]
    Superseded,

    /// Invalid store configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias for store operations
pub type StoreResult<T> = Result<T, StoreError>;
