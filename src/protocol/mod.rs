//! Protocol Module
//!
//! Defines the binary wire protocol spoken with QuartzKV server nodes.
//!
//! ## Frame Layout
//!
//! Every frame is a fixed 24-byte header followed by extras, key and value
//! regions. Requests and responses share the header layout; offset 6-7 holds
//! the vbucket id on requests and the status code on responses.
//!
//! ```text
//! ┌────────┬────────┬─────────────┬──────────┬──────────┐
//! │ offset │  size  │   request   │ response │  format  │
//! ├────────┼────────┼─────────────┴──────────┼──────────┤
//! │   0    │   1    │ magic (0x80 / 0x81)    │  u8      │
//! │   1    │   1    │ opcode                 │  u8      │
//! │   2    │   2    │ key length             │  u16 BE  │
//! │   4    │   1    │ extras length          │  u8      │
//! │   5    │   1    │ data type              │  u8      │
//! │   6    │   2    │ vbucket id │ status    │  u16 BE  │
//! │   8    │   4    │ total body length      │  u32 BE  │
//! │  12    │   4    │ opaque                 │  u32 BE  │
//! │  16    │   8    │ CAS                    │  u64 BE  │
//! └────────┴────────┴────────────────────────┴──────────┘
//! ```
//!
//! Total body length = extras length + key length + value length; the value
//! region bounds are derived, never carried explicitly.

pub mod convert;
mod header;

pub use header::{
    header_offset, Magic, OpCode, ResponseHeader, ResponseStatus, ServerFeature, HEADER_SIZE,
};
