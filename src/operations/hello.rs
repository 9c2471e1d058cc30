//! Hello operation
//!
//! Protocol feature negotiation. The request key identifies the client, the
//! body is a literal concatenation of big-endian 16-bit feature codes in
//! listed order; the response body lists the features the server accepted.

use std::time::{Duration, Instant};

use bytes::{BufMut, BytesMut};

use crate::error::Result;
use crate::operations::{complete, OpCore, Operation};
use crate::protocol::{convert, OpCode, ResponseHeader, ServerFeature};
use crate::result::OperationResult;
use crate::vbucket::VBucket;

/// Negotiate protocol features with a server node
pub struct Hello {
    core: OpCore,
    features: Vec<ServerFeature>,
    header: Option<ResponseHeader>,
    accepted: Vec<ServerFeature>,
}

impl Hello {
    /// Create a Hello requesting `features`, in order
    pub fn new(features: Vec<ServerFeature>, timeout: Duration) -> Self {
        Self {
            core: OpCore::new(crate::CLIENT_ID, VBucket::default(), timeout),
            features,
            header: None,
            accepted: Vec::new(),
        }
    }

    /// The features requested by this operation
    pub fn features(&self) -> &[ServerFeature] {
        &self.features
    }
}

impl Operation for Hello {
    type Output = Vec<ServerFeature>;

    fn opcode(&self) -> OpCode {
        OpCode::Hello
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
        let mut body = BytesMut::with_capacity(self.features.len() * 2);
        for feature in &self.features {
            body.put_u16(*feature as u16);
        }
        Ok(body.to_vec())
    }

    fn read(&mut self, buffer: &[u8]) -> Result<ResponseHeader> {
        let header = ResponseHeader::parse(buffer)?;

        // Response body: the accepted feature codes, two bytes each.
        // Unrecognized codes are skipped rather than failing negotiation.
        let value_range = header.value_range();
        self.accepted = buffer[value_range.clone()]
            .chunks_exact(2)
            .filter_map(|pair| {
                let code = convert::read_u16(pair, 0);
                ServerFeature::from_code(code)
            })
            .collect();
        self.header = Some(header);

        Ok(header)
    }

    fn take_result(&mut self) -> OperationResult<Vec<ServerFeature>> {
        let accepted = std::mem::take(&mut self.accepted);
        complete(self.header.as_ref(), || Ok(Some(accepted)))
    }

    fn clone_op(&self) -> Self {
        Self {
            core: self.core.clone(),
            features: self.features.clone(),
            header: None,
            accepted: Vec::new(),
        }
    }
}
