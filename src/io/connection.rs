//! Connection
//!
//! A single duplex byte-stream to one server node. The I/O service never
//! touches a socket directly; it talks through the [`Connection`] trait so
//! tests can substitute an in-memory double.

use std::io::{BufReader, BufWriter, Read, Write};
use std::net::{TcpStream, ToSocketAddrs};

use crate::config::PoolConfig;
use crate::error::{QuartzError, Result};
use crate::protocol::{convert, header_offset, HEADER_SIZE};

/// Maximum response body size (20 MB)
pub const MAX_BODY_SIZE: usize = 20 * 1024 * 1024;

// =============================================================================
// Connection Contract
// =============================================================================

/// A duplex request/response byte stream
pub trait Connection: Send {
    /// Send a request frame and read back the complete response frame
    fn send(&mut self, request: &[u8]) -> Result<Vec<u8>>;

    /// Whether the connection is believed usable
    ///
    /// A false return means the next send would fail; the service
    /// short-circuits such operations without writing any bytes.
    fn is_connected(&self) -> bool;
}

// =============================================================================
// TCP Connection
// =============================================================================

/// A pooled TCP connection to one server node
pub struct TcpConnection {
    /// TCP stream reader (buffered for efficiency)
    reader: BufReader<TcpStream>,

    /// TCP stream writer (buffered for efficiency)
    writer: BufWriter<TcpStream>,

    /// Peer address for logging
    peer_addr: String,

    /// Cleared on any I/O failure; a half-used stream may hold an unread
    /// response that would answer the wrong request
    connected: bool,
}

impl TcpConnection {
    /// Connect to `addr`, applying the pool's timeouts
    ///
    /// Disables Nagle's algorithm and bounds every read and write by the
    /// configured operation timeout, which is what enforces an operation's
    /// lifespan at the socket layer.
    pub fn connect(addr: &str, config: &PoolConfig) -> Result<Self> {
        let socket_addr = addr
            .to_socket_addrs()?
            .next()
            .ok_or_else(|| QuartzError::Config(format!("unresolvable address: {}", addr)))?;

        let stream = TcpStream::connect_timeout(&socket_addr, config.connect_timeout)?;

        // Disable Nagle's algorithm for low latency
        stream.set_nodelay(true)?;
        stream.set_read_timeout(Some(config.operation_timeout))?;
        stream.set_write_timeout(Some(config.operation_timeout))?;

        let peer_addr = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| addr.to_string());

        // Clone stream for separate read/write handles
        let read_stream = stream.try_clone()?;
        let write_stream = stream;

        tracing::debug!("Connection established to {}", peer_addr);

        Ok(Self {
            reader: BufReader::new(read_stream),
            writer: BufWriter::new(write_stream),
            peer_addr,
            connected: true,
        })
    }

    /// Get the peer address string
    pub fn peer_addr(&self) -> &str {
        &self.peer_addr
    }

    /// Read one complete response frame: 24-byte header, then the body the
    /// header declares
    fn receive(&mut self) -> Result<Vec<u8>> {
        let mut header = [0u8; HEADER_SIZE];
        self.reader.read_exact(&mut header)?;

        let total_body = convert::read_u32(&header, header_offset::BODY_LENGTH) as usize;
        if total_body > MAX_BODY_SIZE {
            return Err(QuartzError::Protocol(format!(
                "Response body too large: {} bytes (max {})",
                total_body, MAX_BODY_SIZE
            )));
        }

        let mut frame = vec![0u8; HEADER_SIZE + total_body];
        frame[..HEADER_SIZE].copy_from_slice(&header);
        if total_body > 0 {
            self.reader.read_exact(&mut frame[HEADER_SIZE..])?;
        }

        Ok(frame)
    }

    fn round_trip(&mut self, request: &[u8]) -> Result<Vec<u8>> {
        self.writer.write_all(request)?;
        self.writer.flush()?;
        self.receive()
    }
}

impl Connection for TcpConnection {
    fn send(&mut self, request: &[u8]) -> Result<Vec<u8>> {
        if !self.connected {
            return Err(QuartzError::Transport(format!(
                "connection to {} is closed",
                self.peer_addr
            )));
        }

        match self.round_trip(request) {
            Ok(response) => Ok(response),
            Err(e) => {
                tracing::warn!("I/O failure on connection to {}: {}", self.peer_addr, e);
                self.connected = false;
                Err(e)
            }
        }
    }

    fn is_connected(&self) -> bool {
        self.connected
    }
}
