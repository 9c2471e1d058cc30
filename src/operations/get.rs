//! Get operation
//!
//! Reads the value stored under a key. The request carries no extras or
//! body; the response extras hold the 4-byte flags field the value was
//! stored with, which fixes the data format used for decoding.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::error::Result;
use crate::operations::{complete, OpCore, Operation};
use crate::protocol::{convert, OpCode, ResponseHeader, HEADER_SIZE};
use crate::result::OperationResult;
use crate::transcoder::{DataFormat, Transcoder, Value};
use crate::vbucket::VBucket;

/// Read a key's value
pub struct Get {
    core: OpCore,
    transcoder: Arc<dyn Transcoder>,
    format: DataFormat,
    header: Option<ResponseHeader>,
    value_bytes: Vec<u8>,
}

impl Get {
    /// Create a Get for `key`
    pub fn new(
        key: impl Into<String>,
        vbucket: VBucket,
        transcoder: Arc<dyn Transcoder>,
        timeout: Duration,
    ) -> Self {
        Self {
            core: OpCore::new(key, vbucket, timeout),
            transcoder,
            format: DataFormat::Binary,
            header: None,
            value_bytes: Vec::new(),
        }
    }

    /// The data format reported by the server for the stored value
    pub fn format(&self) -> DataFormat {
        self.format
    }
}

impl Operation for Get {
    type Output = Value;

    fn opcode(&self) -> OpCode {
        OpCode::Get
    }

    fn key(&self) -> &str {
        &self.core.key
    }

    fn vbucket(&self) -> VBucket {
        self.core.vbucket
    }

    fn opaque(&self) -> u32 {
        self.core.opaque
    }

    fn cas(&self) -> u64 {
        self.core.cas
    }

    fn set_cas(&mut self, cas: u64) {
        self.core.cas = cas;
    }

    fn creation_time(&self) -> Instant {
        self.core.creation_time
    }

    fn timeout(&self) -> Duration {
        self.core.timeout
    }

    fn read(&mut self, buffer: &[u8]) -> Result<ResponseHeader> {
        let header = ResponseHeader::parse(buffer)?;

        // Flags live in the first four extras bytes on read responses
        if header.extras_length >= 4 {
            let flags = convert::read_u32(buffer, HEADER_SIZE);
            self.format = DataFormat::from_flags(flags);
        }
        self.value_bytes = buffer[header.value_range()].to_vec();
        self.header = Some(header);

        Ok(header)
    }

    fn take_result(&mut self) -> OperationResult<Value> {
        let format = self.format;
        let transcoder = Arc::clone(&self.transcoder);
        let value_bytes = std::mem::take(&mut self.value_bytes);
        complete(self.header.as_ref(), || {
            transcoder.decode(&value_bytes, format).map(Some)
        })
    }

    fn clone_op(&self) -> Self {
        Self {
            core: self.core.clone(),
            transcoder: Arc::clone(&self.transcoder),
            format: DataFormat::Binary,
            header: None,
            value_bytes: Vec::new(),
        }
    }
}
