//! Connection Pool
//!
//! Owns a bounded set of connections and hands one out per request.
//! Ownership of the boxed connection moves to the borrower, so a connection
//! can never serve two requests at once; `release` returns it (or a
//! replacement) to the idle queue.

use crossbeam::channel::{bounded, Receiver, Sender};

use crate::config::PoolConfig;
use crate::error::{QuartzError, Result};
use crate::io::connection::{Connection, TcpConnection};

// =============================================================================
// Pool Contract
// =============================================================================

/// A bounded pool of connections
pub trait ConnectionPool: Send + Sync {
    /// Take a connection out of the pool
    ///
    /// Blocks while the pool is exhausted, failing once the configured
    /// operation timeout elapses with no connection released.
    fn acquire(&self) -> Result<Box<dyn Connection>>;

    /// Return a connection to the pool
    fn release(&self, connection: Box<dyn Connection>);

    /// The configuration the pool was built with
    fn configuration(&self) -> &PoolConfig;
}

// =============================================================================
// TCP Pool
// =============================================================================

/// A bounded pool of TCP connections to one server node
pub struct TcpConnectionPool {
    addr: String,
    config: PoolConfig,
    idle_tx: Sender<Box<dyn Connection>>,
    idle_rx: Receiver<Box<dyn Connection>>,
}

impl TcpConnectionPool {
    /// Open a pool of `config.size` connections to `addr`
    ///
    /// All connections are established eagerly; a node that refuses
    /// connections fails pool construction rather than individual requests.
    pub fn connect(addr: impl Into<String>, config: PoolConfig) -> Result<Self> {
        let addr = addr.into();
        let size = config.size.max(1);
        let (idle_tx, idle_rx) = bounded::<Box<dyn Connection>>(size);

        for _ in 0..size {
            let connection = TcpConnection::connect(&addr, &config)?;
            idle_tx
                .try_send(Box::new(connection))
                .map_err(|_| QuartzError::PoolExhausted("idle queue overflow".to_string()))?;
        }

        tracing::debug!("Pool of {} connections open to {}", size, addr);

        Ok(Self {
            addr,
            config,
            idle_tx,
            idle_rx,
        })
    }
}

impl ConnectionPool for TcpConnectionPool {
    fn acquire(&self) -> Result<Box<dyn Connection>> {
        self.idle_rx
            .recv_timeout(self.config.operation_timeout)
            .map_err(|_| {
                QuartzError::PoolExhausted(format!(
                    "no connection to {} released within {:?}",
                    self.addr, self.config.operation_timeout
                ))
            })
    }

    fn release(&self, connection: Box<dyn Connection>) {
        let connection = if connection.is_connected() {
            connection
        } else {
            // Reconnect is best-effort: when it fails the dead connection
            // keeps the slot, and the next execute on it short-circuits
            // into a transport failure instead of hanging the pool.
            match TcpConnection::connect(&self.addr, &self.config) {
                Ok(fresh) => {
                    tracing::debug!("Replaced dead connection to {}", self.addr);
                    Box::new(fresh) as Box<dyn Connection>
                }
                Err(e) => {
                    tracing::warn!("Reconnect to {} failed: {}", self.addr, e);
                    connection
                }
            }
        };

        // Cannot overflow: every slot in flight came out of this queue
        let _ = self.idle_tx.try_send(connection);
    }

    fn configuration(&self) -> &PoolConfig {
        &self.config
    }
}
