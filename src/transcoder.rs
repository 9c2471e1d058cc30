//! Transcoder collaborator
//!
//! Turns stored values into body bytes plus a data-format tag, and bytes
//! plus tag back into values.
//!
//! The format tag is decided by inspecting the value's concrete runtime
//! shape (a byte sequence is Binary, text is String, anything structured is
//! Json), never by a static declaration. A later read of the same key must
//! reproduce the originally stored tag, so the tag is persisted in the
//! flags field of store-operation extras and carried back in read-operation
//! response extras.

use serde_json as json;

use crate::error::{QuartzError, Result};

// =============================================================================
// Data Format Tag
// =============================================================================

/// Data format recorded alongside a stored value
///
/// Wire encoding: the tag occupies the top byte of the 32-bit flags field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum DataFormat {
    /// Structured document
    Json = 0x02,
    /// Raw byte sequence
    Binary = 0x03,
    /// UTF-8 text
    String = 0x04,
}

impl DataFormat {
    /// Pack the tag into a 32-bit flags field
    pub fn to_flags(self) -> u32 {
        (self as u32) << 24
    }

    /// Recover the tag from a 32-bit flags field
    ///
    /// Unrecognized tags degrade to Binary so foreign writers' values stay
    /// readable as raw bytes.
    pub fn from_flags(flags: u32) -> Self {
        match (flags >> 24) as u8 {
            0x02 => DataFormat::Json,
            0x04 => DataFormat::String,
            _ => DataFormat::Binary,
        }
    }
}

// =============================================================================
// Value
// =============================================================================

/// A value as stored under a key
///
/// Closed variant over the three supported runtime shapes. The variant, not
/// any declared type, decides the data format written to the wire.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Raw byte sequence
    Bytes(Vec<u8>),
    /// UTF-8 text
    Text(String),
    /// Structured document
    Json(json::Value),
}

impl Value {
    /// The data format implied by this value's runtime shape
    pub fn format(&self) -> DataFormat {
        match self {
            Value::Bytes(_) => DataFormat::Binary,
            Value::Text(_) => DataFormat::String,
            Value::Json(_) => DataFormat::Json,
        }
    }
}

impl From<Vec<u8>> for Value {
    fn from(bytes: Vec<u8>) -> Self {
        Value::Bytes(bytes)
    }
}

impl From<&[u8]> for Value {
    fn from(bytes: &[u8]) -> Self {
        Value::Bytes(bytes.to_vec())
    }
}

impl From<String> for Value {
    fn from(text: String) -> Self {
        Value::Text(text)
    }
}

impl From<&str> for Value {
    fn from(text: &str) -> Self {
        Value::Text(text.to_string())
    }
}

impl From<json::Value> for Value {
    fn from(document: json::Value) -> Self {
        Value::Json(document)
    }
}

// =============================================================================
// Transcoder Trait
// =============================================================================

/// Converts values to body bytes and back
///
/// Implementations must keep `encode` and `decode` symmetric: decoding the
/// bytes produced by `encode` under the same format tag yields an equal
/// value.
pub trait Transcoder: Send + Sync {
    /// Encode a value into body bytes plus its format tag
    fn encode(&self, value: &Value) -> Result<(Vec<u8>, DataFormat)>;

    /// Decode body bytes under the given format tag
    fn decode(&self, bytes: &[u8], format: DataFormat) -> Result<Value>;
}

// =============================================================================
// Default Transcoder
// =============================================================================

/// Default transcoder: passthrough bytes, UTF-8 text, JSON documents
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultTranscoder;

impl Transcoder for DefaultTranscoder {
    fn encode(&self, value: &Value) -> Result<(Vec<u8>, DataFormat)> {
        let format = value.format();
        let bytes = match value {
            Value::Bytes(bytes) => bytes.clone(),
            Value::Text(text) => text.as_bytes().to_vec(),
            Value::Json(document) => json::to_vec(document)
                .map_err(|e| QuartzError::Encoding(format!("JSON encode failed: {}", e)))?,
        };
        Ok((bytes, format))
    }

    fn decode(&self, bytes: &[u8], format: DataFormat) -> Result<Value> {
        match format {
            DataFormat::Binary => Ok(Value::Bytes(bytes.to_vec())),
            DataFormat::String => {
                let text = std::str::from_utf8(bytes)
                    .map_err(|e| QuartzError::Decoding(format!("invalid UTF-8 body: {}", e)))?;
                Ok(Value::Text(text.to_string()))
            }
            DataFormat::Json => {
                let document = json::from_slice(bytes)
                    .map_err(|e| QuartzError::Decoding(format!("JSON decode failed: {}", e)))?;
                Ok(Value::Json(document))
            }
        }
    }
}
