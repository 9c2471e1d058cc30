//! Shared test doubles
//!
//! In-memory substitutes for the Connection and ConnectionPool contracts so
//! the I/O service can be exercised without a socket: a scripted connection
//! that replays canned response frames, and a single-node server double that
//! actually implements the store semantics.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use quartzkv_client::io::{Connection, ConnectionPool, MultiplexIoService};
use quartzkv_client::protocol::{convert, header_offset, Magic, OpCode, HEADER_SIZE};
use quartzkv_client::{PoolConfig, QuartzError, Result};

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

// =============================================================================
// Response Frame Builder
// =============================================================================

/// Build a response frame: 24-byte header, then extras, key and value
pub fn build_response(
    opcode: u8,
    status: u16,
    extras: &[u8],
    key: &[u8],
    value: &[u8],
    opaque: u32,
    cas: u64,
) -> Vec<u8> {
    let total_body = extras.len() + key.len() + value.len();
    let mut frame = vec![0u8; HEADER_SIZE + total_body];

    frame[header_offset::MAGIC] = Magic::Response as u8;
    frame[header_offset::OPCODE] = opcode;
    convert::write_u16(&mut frame, header_offset::KEY_LENGTH, key.len() as u16);
    frame[header_offset::EXTRAS_LENGTH] = extras.len() as u8;
    convert::write_u16(&mut frame, header_offset::STATUS, status);
    convert::write_u32(&mut frame, header_offset::BODY_LENGTH, total_body as u32);
    convert::write_u32(&mut frame, header_offset::OPAQUE, opaque);
    convert::write_u64(&mut frame, header_offset::CAS, cas);

    let mut offset = HEADER_SIZE;
    convert::write_bytes(&mut frame, offset, extras);
    offset += extras.len();
    convert::write_bytes(&mut frame, offset, key);
    offset += key.len();
    convert::write_bytes(&mut frame, offset, value);

    frame
}

/// A success response for a Hello request (no accepted features)
pub fn hello_ok() -> Vec<u8> {
    build_response(OpCode::Hello as u8, 0, &[], &[], &[], 0, 0)
}

// =============================================================================
// Scripted Connection
// =============================================================================

/// Shared view into a scripted connection's state
#[derive(Default)]
pub struct ScriptState {
    pub connected: bool,
    pub responses: VecDeque<Vec<u8>>,
    pub sent: Vec<Vec<u8>>,
}

/// Replays canned response frames and records every request frame sent
pub struct ScriptedConnection {
    state: Arc<Mutex<ScriptState>>,
}

impl ScriptedConnection {
    /// A connected scripted connection replaying `responses` in order
    pub fn new(responses: Vec<Vec<u8>>) -> (Self, Arc<Mutex<ScriptState>>) {
        let state = Arc::new(Mutex::new(ScriptState {
            connected: true,
            responses: responses.into(),
            sent: Vec::new(),
        }));
        (
            Self {
                state: Arc::clone(&state),
            },
            state,
        )
    }

    /// A scripted connection reporting not-connected
    pub fn disconnected() -> (Self, Arc<Mutex<ScriptState>>) {
        let (connection, state) = Self::new(Vec::new());
        state.lock().unwrap().connected = false;
        (connection, state)
    }
}

impl Connection for ScriptedConnection {
    fn send(&mut self, request: &[u8]) -> Result<Vec<u8>> {
        let mut state = self.state.lock().unwrap();
        state.sent.push(request.to_vec());
        state
            .responses
            .pop_front()
            .ok_or_else(|| QuartzError::Transport("no scripted response left".to_string()))
    }

    fn is_connected(&self) -> bool {
        self.state.lock().unwrap().connected
    }
}

// =============================================================================
// Mock Pool
// =============================================================================

/// A pool over pre-built connections, no sockets involved
pub struct MockPool {
    config: PoolConfig,
    idle: Mutex<Vec<Box<dyn Connection>>>,
}

impl MockPool {
    pub fn new(connections: Vec<Box<dyn Connection>>, config: PoolConfig) -> Self {
        Self {
            config,
            idle: Mutex::new(connections),
        }
    }

    /// A service over a pool holding exactly `connection`
    pub fn service(
        connection: Box<dyn Connection>,
        config: PoolConfig,
    ) -> Arc<MultiplexIoService> {
        let pool = Arc::new(MockPool::new(vec![connection], config));
        Arc::new(MultiplexIoService::new(pool))
    }
}

impl ConnectionPool for MockPool {
    fn acquire(&self) -> Result<Box<dyn Connection>> {
        self.idle
            .lock()
            .unwrap()
            .pop()
            .ok_or_else(|| QuartzError::PoolExhausted("mock pool empty".to_string()))
    }

    fn release(&self, connection: Box<dyn Connection>) {
        self.idle.lock().unwrap().push(connection);
    }

    fn configuration(&self) -> &PoolConfig {
        &self.config
    }
}

// =============================================================================
// In-Memory Server Node
// =============================================================================

struct StoredItem {
    flags: u32,
    cas: u64,
    value: Vec<u8>,
}

/// A single-node server double implementing the store semantics
///
/// Parses request frames, applies Get/GetK/Add/Set/Replace/Delete/Hello/
/// GetErrorMap against an in-memory map and answers with well-formed
/// response frames, so end-to-end properties can run without a cluster.
pub struct InMemoryNode {
    store: HashMap<Vec<u8>, StoredItem>,
    cas_sequence: u64,
    error_map_json: Vec<u8>,
}

impl Default for InMemoryNode {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryNode {
    pub fn new() -> Self {
        Self {
            store: HashMap::new(),
            cas_sequence: 0,
            error_map_json: serde_json::to_vec(&serde_json::json!({
                "version": 1,
                "revision": 2,
                "errors": {
                    "7f": { "name": "BUSY_RANGE", "desc": "Requested range is busy", "attrs": ["retry-later"] }
                }
            }))
            .unwrap(),
        }
    }

    fn next_cas(&mut self) -> u64 {
        self.cas_sequence += 1;
        self.cas_sequence
    }

    fn handle(&mut self, request: &[u8]) -> Vec<u8> {
        assert!(request.len() >= HEADER_SIZE, "short request frame");
        assert_eq!(request[header_offset::MAGIC], Magic::Request as u8);

        let opcode = request[header_offset::OPCODE];
        let key_length = convert::read_u16(request, header_offset::KEY_LENGTH) as usize;
        let extras_length = request[header_offset::EXTRAS_LENGTH] as usize;
        let total_body = convert::read_u32(request, header_offset::BODY_LENGTH) as usize;
        let opaque = convert::read_u32(request, header_offset::OPAQUE);

        let key_start = HEADER_SIZE + extras_length;
        let key = request[key_start..key_start + key_length].to_vec();
        let value = request[key_start + key_length..HEADER_SIZE + total_body].to_vec();

        let respond = |status: u16, extras: &[u8], key: &[u8], value: &[u8], cas: u64| {
            build_response(opcode, status, extras, key, value, opaque, cas)
        };

        match opcode {
            // Get
            0x00 => match self.store.get(&key) {
                Some(item) => respond(0, &item.flags.to_be_bytes(), &[], &item.value, item.cas),
                None => respond(0x01, &[], &[], &[], 0),
            },
            // GetK: key echoed back in the body
            0x0c => match self.store.get(&key) {
                Some(item) => respond(0, &item.flags.to_be_bytes(), &key, &item.value, item.cas),
                None => respond(0x01, &[], &[], &[], 0),
            },
            // Set / Add / Replace
            0x01 | 0x02 | 0x03 => {
                if opcode == 0x02 && self.store.contains_key(&key) {
                    return respond(0x02, &[], &[], &[], 0);
                }
                if opcode == 0x03 && !self.store.contains_key(&key) {
                    return respond(0x01, &[], &[], &[], 0);
                }
                let flags = convert::read_u32(request, HEADER_SIZE);
                let cas = self.next_cas();
                self.store.insert(key, StoredItem { flags, cas, value });
                respond(0, &[], &[], &[], cas)
            }
            // Delete
            0x04 => match self.store.remove(&key) {
                Some(_) => respond(0, &[], &[], &[], 0),
                None => respond(0x01, &[], &[], &[], 0),
            },
            // Hello: accept every requested feature
            0x1f => respond(0, &[], &[], &value, 0),
            // GetErrorMap
            0xfe => {
                let body = self.error_map_json.clone();
                respond(0, &[], &[], &body, 0)
            }
            _ => respond(0x0081, &[], &[], &[], 0),
        }
    }
}

impl Connection for InMemoryNode {
    fn send(&mut self, request: &[u8]) -> Result<Vec<u8>> {
        Ok(self.handle(request))
    }

    fn is_connected(&self) -> bool {
        true
    }
}
