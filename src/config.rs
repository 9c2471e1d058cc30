//! Configuration for the QuartzKV client
//!
//! Centralized pool configuration with sensible defaults.

use std::time::Duration;

/// Configuration for a connection pool
///
/// Immutable after pool construction; shared by the pool and the I/O
/// service that drives it.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    // -------------------------------------------------------------------------
    // Pool Sizing
    // -------------------------------------------------------------------------
    /// Number of connections the pool owns
    pub size: usize,

    // -------------------------------------------------------------------------
    // Timeouts
    // -------------------------------------------------------------------------
    /// Per-operation lifespan: bounds both pool acquisition and the socket
    /// round trip for a single request
    pub operation_timeout: Duration,

    /// Timeout for establishing a TCP connection
    pub connect_timeout: Duration,

    // -------------------------------------------------------------------------
    // Negotiation
    // -------------------------------------------------------------------------
    /// Request mutation-sequence-number tracking during Hello negotiation
    ///
    /// When set, mutations carry sequence numbers the cluster can use for
    /// stronger replication-acknowledgement guarantees.
    pub use_enhanced_durability: bool,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            size: 2,
            operation_timeout: Duration::from_millis(2500),
            connect_timeout: Duration::from_millis(10_000),
            use_enhanced_durability: false,
        }
    }
}

impl PoolConfig {
    /// Create a new config builder
    pub fn builder() -> PoolConfigBuilder {
        PoolConfigBuilder::default()
    }
}

/// Builder for PoolConfig
#[derive(Default)]
pub struct PoolConfigBuilder {
    config: PoolConfig,
}

impl PoolConfigBuilder {
    /// Set the number of pooled connections
    pub fn size(mut self, size: usize) -> Self {
        self.config.size = size;
        self
    }

    /// Set the per-operation timeout
    pub fn operation_timeout(mut self, timeout: Duration) -> Self {
        self.config.operation_timeout = timeout;
        self
    }

    /// Set the connect timeout
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = timeout;
        self
    }

    /// Request enhanced durability during negotiation
    pub fn use_enhanced_durability(mut self, enabled: bool) -> Self {
        self.config.use_enhanced_durability = enabled;
        self
    }

    pub fn build(self) -> PoolConfig {
        self.config
    }
}
