//! Error types for the QuartzKV client
//!
//! Provides a unified error type for all client-side failures.
//!
//! Server-reported status codes are *not* errors at this level: they travel
//! back to the caller inside an [`OperationResult`](crate::OperationResult)
//! and are inspected through `success`/`status`. `QuartzError` covers the
//! client side only: transport problems, framing problems, pool exhaustion
//! and transcoding failures.

use thiserror::Error;

/// Result type alias using QuartzError
pub type Result<T> = std::result::Result<T, QuartzError>;

/// Unified error type for QuartzKV client operations
#[derive(Debug, Error)]
pub enum QuartzError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Transport Errors
    // -------------------------------------------------------------------------
    #[error("Transport failure: {0}")]
    Transport(String),

    #[error("Connection pool exhausted: {0}")]
    PoolExhausted(String),

    // -------------------------------------------------------------------------
    // Protocol Errors
    // -------------------------------------------------------------------------
    #[error("Protocol error: {0}")]
    Protocol(String),

    // -------------------------------------------------------------------------
    // Transcoding Errors
    // -------------------------------------------------------------------------
    #[error("Encoding error: {0}")]
    Encoding(String),

    #[error("Decoding error: {0}")]
    Decoding(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl QuartzError {
    /// Whether this error originated at the transport layer
    ///
    /// Transport errors (dead connection, socket failure, pool exhaustion)
    /// surface on results as `TransportFailure`; everything else is a local
    /// client defect.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            QuartzError::Io(_) | QuartzError::Transport(_) | QuartzError::PoolExhausted(_)
        )
    }
}
