//! GetErrorMap operation
//!
//! Fetches the server's error map: the request body is the highest map
//! format version the client understands (big-endian u16), the response
//! body is the map as JSON.

use std::time::{Duration, Instant};

use crate::error::Result;
use crate::errormap::ErrorMap;
use crate::operations::{complete, OpCore, Operation};
use crate::protocol::{OpCode, ResponseHeader};
use crate::result::OperationResult;
use crate::vbucket::VBucket;

/// Error map format version this client understands
pub const ERROR_MAP_VERSION: u16 = 1;

/// Fetch the server's error map
pub struct GetErrorMap {
    core: OpCore,
    version: u16,
    header: Option<ResponseHeader>,
    body: Vec<u8>,
}

impl GetErrorMap {
    /// Create a GetErrorMap requesting the current format version
    pub fn new(timeout: Duration) -> Self {
        Self {
            core: OpCore::new("", VBucket::default(), timeout),
            version: ERROR_MAP_VERSION,
            header: None,
            body: Vec::new(),
        }
    }
}

impl Operation for GetErrorMap {
    type Output = ErrorMap;

    fn opcode(&self) -> OpCode {
        OpCode::GetErrorMap
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

    fn request_body(&mut self) -> Result<Vec<u8>> {
        Ok(self.version.to_be_bytes().to_vec())
    }

    fn read(&mut self, buffer: &[u8]) -> Result<ResponseHeader> {
        let header = ResponseHeader::parse(buffer)?;
        self.body = buffer[header.value_range()].to_vec();
        self.header = Some(header);
        Ok(header)
    }

    fn take_result(&mut self) -> OperationResult<ErrorMap> {
        let body = std::mem::take(&mut self.body);
        complete(self.header.as_ref(), || ErrorMap::from_json(&body).map(Some))
    }

    fn clone_op(&self) -> Self {
        Self {
            core: self.core.clone(),
            version: self.version,
            header: None,
            body: Vec::new(),
        }
    }
}
