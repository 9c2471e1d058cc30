//! Delete operation
//!
//! Removes a key. No extras, no body; a CAS token, when set, makes the
//! delete conditional on the stored version.

use std::time::{Duration, Instant};

use crate::error::Result;
use crate::operations::{complete, OpCore, Operation};
use crate::protocol::{OpCode, ResponseHeader};
use crate::result::OperationResult;
use crate::vbucket::VBucket;

/// Remove a key
pub struct Delete {
    core: OpCore,
    header: Option<ResponseHeader>,
}

impl Delete {
    /// Create a Delete for `key`
    pub fn new(key: impl Into<String>, vbucket: VBucket, timeout: Duration) -> Self {
        Self {
            core: OpCore::new(key, vbucket, timeout),
            header: None,
        }
    }
}

impl Operation for Delete {
    type Output = ();

    fn opcode(&self) -> OpCode {
        OpCode::Delete
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
        self.header = Some(header);
        Ok(header)
    }

    fn take_result(&mut self) -> OperationResult<()> {
        complete(self.header.as_ref(), || Ok(None))
    }

    fn clone_op(&self) -> Self {
        Self {
            core: self.core.clone(),
            header: None,
        }
    }
}
