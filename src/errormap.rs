//! Server error map
//!
//! A versioned, server-supplied table translating numeric status codes into
//! human-readable descriptions. Fetched once per session with a dedicated
//! request and consulted when a response carries a status code outside the
//! static [`ResponseStatus`](crate::protocol::ResponseStatus) vocabulary.
//!
//! The map is replaced wholesale on refresh, never merged; the I/O service
//! shares it across operations as an atomically swapped snapshot.

use std::collections::HashMap;
use std::fmt;

use serde::Deserialize;

use crate::error::{QuartzError, Result};

// =============================================================================
// Error Code Record
// =============================================================================

/// A single error-map entry
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ErrorCode {
    /// Short mnemonic, e.g. `KEY_ENOENT`
    pub name: String,

    /// Human-readable description
    #[serde(default)]
    pub desc: String,

    /// Classification attributes, e.g. `item-only`, `retry-later`
    #[serde(default)]
    pub attrs: Vec<String>,
}

impl ErrorCode {
    /// The text reported to callers when this code classifies a response
    ///
    /// The description when present, the mnemonic otherwise.
    pub fn description(&self) -> &str {
        if self.desc.is_empty() {
            &self.name
        } else {
            &self.desc
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.desc.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}: {}", self.name, self.desc)
        }
    }
}

// =============================================================================
// Error Map
// =============================================================================

/// The server's status-code translation table
///
/// Keys of `errors` are the non-padded hex rendering of the status code
/// (e.g. `0x2c` → `"2c"`). Lookup is case-insensitive over the hex digits.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorMap {
    /// Protocol revision of the map format
    pub version: u32,

    /// Server configuration revision the map was generated from
    pub revision: u32,

    /// Status code (hex string) → error record
    #[serde(default)]
    pub errors: HashMap<String, ErrorCode>,
}

impl ErrorMap {
    /// Parse an error map from its JSON wire body
    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes)
            .map_err(|e| QuartzError::Decoding(format!("error map parse failed: {}", e)))
    }

    /// Resolve a status code to its record, if mapped
    ///
    /// Servers key the map with either non-padded or two-digit hex, in
    /// either case; all four renderings are tried.
    pub fn lookup(&self, status: u16) -> Option<&ErrorCode> {
        let candidates = [
            format!("{:x}", status),
            format!("{:02x}", status),
            format!("{:X}", status),
            format!("{:02X}", status),
        ];
        candidates.iter().find_map(|key| self.errors.get(key))
    }
}
