//! Store operations: Add, Set, Replace
//!
//! All three carry the same frame shape: extras = flags (4) + expiry (4),
//! body = transcoded value bytes. They differ only in opcode and server-side
//! precondition (Add stores iff absent, Replace iff present, Set always).
//!
//! `create_extras` fixes the data format from the value's runtime shape, so
//! a later read re-reports the format the value was stored with.

use std::sync::Arc;
use std::time::{Duration, Instant};

use bytes::{BufMut, BytesMut};

use crate::error::Result;
use crate::operations::{complete, OpCore, Operation};
use crate::protocol::{OpCode, ResponseHeader};
use crate::result::OperationResult;
use crate::transcoder::{DataFormat, Transcoder, Value};
use crate::vbucket::VBucket;

/// Shared state for the three store variants
struct StoreOp {
    core: OpCore,
    transcoder: Arc<dyn Transcoder>,
    value: Value,
    format: DataFormat,
    /// Expiry in seconds; 0 means never
    expiry: u32,
    header: Option<ResponseHeader>,
}

impl StoreOp {
    fn new(
        key: impl Into<String>,
        value: Value,
        vbucket: VBucket,
        transcoder: Arc<dyn Transcoder>,
        timeout: Duration,
    ) -> Self {
        let format = value.format();
        Self {
            core: OpCore::new(key, vbucket, timeout),
            transcoder,
            value,
            format,
            expiry: 0,
            header: None,
        }
    }

    fn create_extras(&mut self) -> Vec<u8> {
        // Re-derive from the value's runtime shape; the constructor value
        // may have been swapped by a caller between construction and send
        self.format = self.value.format();

        let mut extras = BytesMut::with_capacity(8);
        extras.put_u32(self.format.to_flags());
        extras.put_u32(self.expiry);
        extras.to_vec()
    }

    fn request_body(&mut self) -> Result<Vec<u8>> {
        let (bytes, format) = self.transcoder.encode(&self.value)?;
        self.format = format;
        Ok(bytes)
    }

    fn read(&mut self, buffer: &[u8]) -> Result<ResponseHeader> {
        let header = ResponseHeader::parse(buffer)?;
        self.header = Some(header);
        Ok(header)
    }

    fn take_result(&mut self) -> OperationResult<()> {
        complete(self.header.as_ref(), || Ok(None))
    }

    fn clone_op(&self) -> Self {
        Self {
            core: self.core.clone(),
            transcoder: Arc::clone(&self.transcoder),
            value: self.value.clone(),
            format: self.value.format(),
            expiry: self.expiry,
            header: None,
        }
    }
}

/// Declare one public store variant over [`StoreOp`]
macro_rules! store_variant {
    ($(#[$doc:meta])* $name:ident, $opcode:expr) => {
        $(#[$doc])*
        pub struct $name(StoreOp);

        impl $name {
            /// Create the operation for `key` holding `value`
            pub fn new(
                key: impl Into<String>,
                value: impl Into<Value>,
                vbucket: VBucket,
                transcoder: Arc<dyn Transcoder>,
                timeout: Duration,
            ) -> Self {
                Self(StoreOp::new(key, value.into(), vbucket, transcoder, timeout))
            }

            /// Set the expiry in seconds (0 = never)
            pub fn with_expiry(mut self, seconds: u32) -> Self {
                self.0.expiry = seconds;
                self
            }

            /// The data format assigned from the value's runtime shape
            pub fn format(&self) -> DataFormat {
                self.0.format
            }
        }

        impl Operation for $name {
            type Output = ();

            fn opcode(&self) -> OpCode {
                $opcode
            }

            fn key(&self) -> &str {
                &self.0.core.key
            }

            fn vbucket(&self) -> VBucket {
                self.0.core.vbucket
            }

            fn opaque(&self) -> u32 {
                self.0.core.opaque
            }

            fn cas(&self) -> u64 {
                self.0.core.cas
            }

            fn set_cas(&mut self, cas: u64) {
                self.0.core.cas = cas;
            }

            fn creation_time(&self) -> Instant {
                self.0.core.creation_time
            }

            fn timeout(&self) -> Duration {
                self.0.core.timeout
            }

            fn create_extras(&mut self) -> Vec<u8> {
                self.0.create_extras()
            }

            fn request_body(&mut self) -> Result<Vec<u8>> {
                self.0.request_body()
            }

            fn read(&mut self, buffer: &[u8]) -> Result<ResponseHeader> {
                self.0.read(buffer)
            }

            fn take_result(&mut self) -> OperationResult<()> {
                self.0.take_result()
            }

            fn clone_op(&self) -> Self {
                Self(self.0.clone_op())
            }
        }
    };
}

store_variant!(
    /// Store a value iff the key does not exist (`KeyExists` otherwise)
    Add,
    OpCode::Add
);

store_variant!(
    /// Store a value unconditionally
    Set,
    OpCode::Set
);

store_variant!(
    /// Store a value iff the key already exists (`KeyNotFound` otherwise)
    Replace,
    OpCode::Replace
);
