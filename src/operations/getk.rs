//! GetK operation
//!
//! Like Get, but the response body carries the key back ahead of the value,
//! so multi-get fan-out can match a response to its key without out-of-band
//! correlation.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::error::Result;
use crate::operations::{complete, OpCore, Operation};
use crate::protocol::{convert, OpCode, ResponseHeader, HEADER_SIZE};
use crate::result::OperationResult;
use crate::transcoder::{DataFormat, Transcoder, Value};
use crate::vbucket::VBucket;

/// Read a key's value, echoing the key in the response
pub struct GetK {
    core: OpCore,
    transcoder: Arc<dyn Transcoder>,
    format: DataFormat,
    header: Option<ResponseHeader>,
    returned_key: Option<String>,
    value_bytes: Vec<u8>,
}

impl GetK {
    /// Create a GetK for `key`
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
            returned_key: None,
            value_bytes: Vec::new(),
        }
    }

    /// The data format reported by the server for the stored value
    pub fn format(&self) -> DataFormat {
        self.format
    }

    /// The key echoed back in the response body, once read
    pub fn returned_key(&self) -> Option<&str> {
        self.returned_key.as_deref()
    }
}

impl Operation for GetK {
    type Output = Value;

    fn opcode(&self) -> OpCode {
        OpCode::GetK
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

        if header.extras_length >= 4 {
            let flags = convert::read_u32(buffer, HEADER_SIZE);
            self.format = DataFormat::from_flags(flags);
        }
        if header.key_length > 0 {
            let key = &buffer[header.key_range()];
            self.returned_key = Some(String::from_utf8_lossy(key).into_owned());
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
            returned_key: None,
            value_bytes: Vec::new(),
        }
    }
}
