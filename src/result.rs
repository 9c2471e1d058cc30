//! Operation results
//!
//! Server status codes are data, not faults: every execution produces
//! exactly one [`OperationResult`] and callers branch on `success`/`status`.
//! The `error` field is populated only for client-side failures (transport,
//! framing, transcoding) where no usable server response exists.

use crate::error::QuartzError;
use crate::protocol::ResponseStatus;

/// Outcome of a single operation execution
///
/// Created once per execute call, immutable, owned solely by the caller.
#[derive(Debug)]
pub struct OperationResult<T> {
    /// Classified response status
    pub status: ResponseStatus,

    /// Whether the operation succeeded
    pub success: bool,

    /// Diagnostic text; empty on success
    pub message: String,

    /// Decoded value; absent on failure and for valueless operations
    pub value: Option<T>,

    /// CAS token reported by the server
    pub cas: u64,

    /// Client-side failure, set only when no server status classification
    /// applies
    pub error: Option<QuartzError>,
}

impl<T> OperationResult<T> {
    /// Result of an operation that has not been executed yet
    pub fn pending() -> Self {
        Self {
            status: ResponseStatus::Failure,
            success: false,
            message: String::new(),
            value: None,
            cas: 0,
            error: None,
        }
    }

    /// Successful execution with an optional decoded value
    pub fn success(value: Option<T>, cas: u64) -> Self {
        Self {
            status: ResponseStatus::Success,
            success: true,
            message: String::new(),
            value,
            cas,
            error: None,
        }
    }

    /// A statically known non-success server status
    pub fn from_status(status: ResponseStatus, cas: u64) -> Self {
        Self {
            success: status.is_success(),
            message: status.describe().to_string(),
            status,
            value: None,
            cas,
            error: None,
        }
    }

    /// A status code resolved through the error map
    pub fn mapped_failure(message: String, cas: u64) -> Self {
        Self {
            status: ResponseStatus::Failure,
            success: false,
            message,
            value: None,
            cas,
            error: None,
        }
    }

    /// A status code with no error-map entry
    pub fn unknown_error(message: String, cas: u64) -> Self {
        Self {
            status: ResponseStatus::UnknownError,
            success: false,
            message,
            value: None,
            cas,
            error: None,
        }
    }

    /// A connection-level failure; no server response was read
    pub fn transport_failure(error: QuartzError) -> Self {
        Self {
            status: ResponseStatus::TransportFailure,
            success: false,
            message: error.to_string(),
            value: None,
            cas: 0,
            error: Some(error),
        }
    }

    /// A local client failure (framing, transcoding) on an otherwise
    /// delivered response
    pub fn local_failure(error: QuartzError) -> Self {
        Self {
            status: ResponseStatus::Failure,
            success: false,
            message: error.to_string(),
            value: None,
            cas: 0,
            error: Some(error),
        }
    }
}
