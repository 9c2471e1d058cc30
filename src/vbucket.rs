//! VBucket assignment
//!
//! A vbucket is a shard of the keyspace. Each key maps deterministically to
//! exactly one vbucket, which in turn maps to a server node. The mapping is
//! produced by the cluster configuration layer; this crate only consumes it
//! and stamps the index into outgoing request headers.

/// A key's shard assignment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VBucket {
    /// Shard id, written into the request header
    pub index: u16,

    /// Topology revision the assignment was computed against
    ///
    /// Used to detect stale mappings after a rebalance; the server rejects
    /// requests routed with an outdated assignment with
    /// `VBucketBelongsToAnotherServer`.
    pub revision: u64,
}

impl VBucket {
    /// Create a vbucket assignment
    pub fn new(index: u16, revision: u64) -> Self {
        Self { index, revision }
    }
}

impl Default for VBucket {
    /// Assignment for single-node deployments (everything in shard 0)
    fn default() -> Self {
        Self {
            index: 0,
            revision: 0,
        }
    }
}
