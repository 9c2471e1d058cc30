//! # QuartzKV Client
//!
//! A client driver for the QuartzKV distributed key-value store with:
//! - Binary, length-prefixed request/response wire protocol
//! - Bounded connection pooling with per-connection mutual exclusion
//! - Server capability negotiation (Hello)
//! - Two-tier error classification (static status set + server error map)
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Caller                                │
//! │              (builds typed Operations)                       │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │               Multiplexing I/O Service                       │
//! │       (negotiate once, execute, classify failures)           │
//! └─────────┬───────────────────────────────────────┬───────────┘
//!           │                                       │
//!           ▼                                       ▼
//!   ┌───────────────┐                       ┌───────────────┐
//!   │ Connection    │                       │   Error Map   │
//!   │ Pool (bounded)│                       │  (snapshot)   │
//!   └───────┬───────┘                       └───────────────┘
//!           │
//!           ▼
//!   ┌───────────────┐
//!   │  Connection   │
//!   │ (TCP, framed) │
//!   └───────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod protocol;
pub mod transcoder;
pub mod errormap;
pub mod vbucket;
pub mod operations;
pub mod result;
pub mod io;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{QuartzError, Result};
pub use config::PoolConfig;
pub use errormap::{ErrorCode, ErrorMap};
pub use io::{Connection, ConnectionPool, MultiplexIoService, TcpConnection, TcpConnectionPool};
pub use operations::{Add, Delete, Get, GetErrorMap, GetK, Hello, Operation, Replace, Set};
pub use result::OperationResult;
pub use transcoder::{DataFormat, DefaultTranscoder, Transcoder, Value};
pub use vbucket::VBucket;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of the QuartzKV client
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Client identifier sent as the Hello request key
pub const CLIENT_ID: &str = concat!("quartzkv-client/", env!("CARGO_PKG_VERSION"));
