//! Operations Module
//!
//! Typed command/response pairs. An operation knows its opcode, encodes
//! itself into a request frame, and decodes a response frame into a typed
//! result.
//!
//! ## Lifecycle
//!
//! Constructed by the caller (opaque assigned from a global sequence at
//! construction), handed to the I/O service for one execution, then read
//! back through [`Operation::take_result`]. For a retry, [`Operation::clone_op`]
//! produces a fresh instance sharing the semantic fields (key, vbucket, cas,
//! creation time, opaque) but none of the in-flight decode state.

mod delete;
mod get;
mod get_error_map;
mod getk;
mod hello;
mod store;

pub use delete::Delete;
pub use get::Get;
pub use get_error_map::GetErrorMap;
pub use getk::GetK;
pub use hello::Hello;
pub use store::{Add, Replace, Set};

use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{Duration, Instant};

use bytes::{BufMut, BytesMut};

use crate::error::{QuartzError, Result};
use crate::protocol::{Magic, OpCode, ResponseHeader, ResponseStatus, HEADER_SIZE};
use crate::result::OperationResult;
use crate::vbucket::VBucket;

/// Maximum key length in bytes
pub const MAX_KEY_SIZE: usize = 250;

// =============================================================================
// Operation Trait
// =============================================================================

/// A typed protocol operation
pub trait Operation {
    /// Decoded response payload type
    type Output;

    /// Wire opcode
    fn opcode(&self) -> OpCode;

    /// Key the operation addresses (empty for keyless operations)
    fn key(&self) -> &str;

    /// Shard assignment stamped into the request header
    fn vbucket(&self) -> VBucket;

    /// Correlation id, unique among requests in flight on one connection
    fn opaque(&self) -> u32;

    /// Optimistic-concurrency token; 0 means no check
    fn cas(&self) -> u64;

    /// Stamp a CAS token before send
    fn set_cas(&mut self, cas: u64);

    /// When the operation was constructed
    fn creation_time(&self) -> Instant;

    /// Lifespan: how long the operation may wait for its response
    fn timeout(&self) -> Duration;

    /// Build the extras region for the request
    ///
    /// Value-carrying operations fix their data format here, derived from
    /// the value's runtime shape.
    fn create_extras(&mut self) -> Vec<u8> {
        Vec::new()
    }

    /// Build the value region for the request
    fn request_body(&mut self) -> Result<Vec<u8>> {
        Ok(Vec::new())
    }

    /// Assemble the full request frame
    fn write(&mut self) -> Result<Vec<u8>> {
        let extras = self.create_extras();
        let body = self.request_body()?;
        build_request(
            self.opcode(),
            self.key(),
            self.vbucket().index,
            self.opaque(),
            self.cas(),
            &extras,
            &body,
        )
    }

    /// Decode a response frame into operation state
    ///
    /// Returns the parsed header. A buffer shorter than the 24-byte header,
    /// or with inconsistent body bounds, is a framing error.
    fn read(&mut self, buffer: &[u8]) -> Result<ResponseHeader>;

    /// Produce the caller-facing result from decoded state
    ///
    /// Before any response has been read this yields a pending result with
    /// no value and an empty message.
    fn take_result(&mut self) -> OperationResult<Self::Output>;

    /// Clone for retry: semantic fields preserved, in-flight state reset
    fn clone_op(&self) -> Self
    where
        Self: Sized;
}

// =============================================================================
// Shared Operation State
// =============================================================================

static OPAQUE_SEQUENCE: AtomicU32 = AtomicU32::new(1);

/// Next correlation id from the global sequence
pub(crate) fn next_opaque() -> u32 {
    OPAQUE_SEQUENCE.fetch_add(1, Ordering::Relaxed)
}

/// Fields common to every operation
#[derive(Debug, Clone)]
pub(crate) struct OpCore {
    pub key: String,
    pub vbucket: VBucket,
    pub opaque: u32,
    pub cas: u64,
    pub creation_time: Instant,
    pub timeout: Duration,
}

impl OpCore {
    pub fn new(key: impl Into<String>, vbucket: VBucket, timeout: Duration) -> Self {
        Self {
            key: key.into(),
            vbucket,
            opaque: next_opaque(),
            cas: 0,
            creation_time: Instant::now(),
            timeout,
        }
    }
}

// =============================================================================
// Frame Assembly
// =============================================================================

/// Build a request frame: header, extras, key, value
pub(crate) fn build_request(
    opcode: OpCode,
    key: &str,
    vbucket: u16,
    opaque: u32,
    cas: u64,
    extras: &[u8],
    body: &[u8],
) -> Result<Vec<u8>> {
    if key.len() > MAX_KEY_SIZE {
        return Err(QuartzError::Encoding(format!(
            "Key too long: {} bytes (max {})",
            key.len(),
            MAX_KEY_SIZE
        )));
    }
    if extras.len() > u8::MAX as usize {
        return Err(QuartzError::Encoding(format!(
            "Extras too long: {} bytes (max {})",
            extras.len(),
            u8::MAX
        )));
    }

    let total_body = extras.len() + key.len() + body.len();
    let mut frame = BytesMut::with_capacity(HEADER_SIZE + total_body);

    frame.put_u8(Magic::Request as u8);
    frame.put_u8(opcode as u8);
    frame.put_u16(key.len() as u16);
    frame.put_u8(extras.len() as u8);
    frame.put_u8(0); // data type: raw
    frame.put_u16(vbucket);
    frame.put_u32(total_body as u32);
    frame.put_u32(opaque);
    frame.put_u64(cas);
    frame.put_slice(extras);
    frame.put_slice(key.as_bytes());
    frame.put_slice(body);

    Ok(frame.to_vec())
}

// =============================================================================
// Result Completion
// =============================================================================

/// Turn decoded state into a result, deferring value decode to `decode_value`
///
/// `decode_value` runs only for a success status. Unknown status codes fall
/// back to `UnknownError` here; the I/O service normally intercepts them for
/// error-map classification before this point.
pub(crate) fn complete<T>(
    header: Option<&ResponseHeader>,
    decode_value: impl FnOnce() -> Result<Option<T>>,
) -> OperationResult<T> {
    let Some(header) = header else {
        return OperationResult::pending();
    };

    match ResponseStatus::from_code(header.status) {
        Some(ResponseStatus::Success) => match decode_value() {
            Ok(value) => OperationResult::success(value, header.cas),
            Err(e) => OperationResult::local_failure(e),
        },
        Some(status) => OperationResult::from_status(status, header.cas),
        None => OperationResult::unknown_error(String::new(), header.cas),
    }
}
