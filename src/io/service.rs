//! Multiplexing I/O Service
//!
//! The orchestrator of the execution pipeline: negotiates protocol features
//! once per pool, then executes operations by acquiring a connection,
//! sending the encoded frame, decoding the response, and classifying
//! failures against the static status set and the server error map.
//!
//! ## Pipeline
//!
//! 1. Acquired connection not connected → `TransportFailure`, nothing sent.
//! 2. Send the encoded frame, read the response frame.
//! 3. Status in the static set → typed result as decoded by the operation.
//! 4. Status outside the static set → error map: mapped ⇒ `Failure` with
//!    the map's description, unmapped ⇒ `UnknownError` with the response
//!    body as best-effort diagnostic text.

use std::sync::Arc;

use arc_swap::ArcSwapOption;
use parking_lot::Once;

use crate::error::QuartzError;
use crate::errormap::ErrorMap;
use crate::io::pool::ConnectionPool;
use crate::operations::{GetErrorMap, Hello, Operation};
use crate::protocol::{ResponseStatus, ServerFeature};
use crate::result::OperationResult;

/// Executes operations over a pool of connections
pub struct MultiplexIoService {
    pool: Arc<dyn ConnectionPool>,
    error_map: ArcSwapOption<ErrorMap>,
    negotiation: Once,
}

impl MultiplexIoService {
    /// Create a service over `pool`
    pub fn new(pool: Arc<dyn ConnectionPool>) -> Self {
        Self {
            pool,
            error_map: ArcSwapOption::empty(),
            negotiation: Once::new(),
        }
    }

    /// The pool this service executes over
    pub fn pool(&self) -> &Arc<dyn ConnectionPool> {
        &self.pool
    }

    // =========================================================================
    // Execution
    // =========================================================================

    /// Execute an operation, blocking until a result or timeout
    ///
    /// The first call on a pool triggers feature negotiation. The operation
    /// stays borrowed so callers can inspect decoded state (e.g. the data
    /// format a GetK reported) after completion.
    pub fn execute<O: Operation>(&self, op: &mut O) -> OperationResult<O::Output> {
        self.negotiate();
        self.execute_inner(op)
    }

    /// Execute an operation on a worker thread, delivering the result
    /// through `completed`
    ///
    /// The callback fires after the operation's response has been fully
    /// read; operations running on different connections complete in any
    /// relative order.
    pub fn execute_async<O, F>(self: Arc<Self>, mut op: O, completed: F)
    where
        O: Operation + Send + 'static,
        O::Output: Send + 'static,
        F: FnOnce(OperationResult<O::Output>) + Send + 'static,
    {
        std::thread::spawn(move || {
            let result = self.execute(&mut op);
            completed(result);
        });
    }

    fn execute_inner<O: Operation>(&self, op: &mut O) -> OperationResult<O::Output> {
        // Lifespan check before spending a connection on a dead operation
        if op.creation_time().elapsed() > op.timeout() {
            return OperationResult::transport_failure(QuartzError::Transport(format!(
                "operation lifespan {:?} elapsed before dispatch",
                op.timeout()
            )));
        }

        let mut connection = match self.pool.acquire() {
            Ok(connection) => connection,
            Err(e) => return OperationResult::transport_failure(e),
        };

        // Short-circuit: no bytes are sent over a dead connection
        if !connection.is_connected() {
            self.pool.release(connection);
            return OperationResult::transport_failure(QuartzError::Transport(
                "connection is not connected".to_string(),
            ));
        }

        let request = match op.write() {
            Ok(request) => request,
            Err(e) => {
                self.pool.release(connection);
                return OperationResult::local_failure(e);
            }
        };

        tracing::trace!(
            opcode = ?op.opcode(),
            opaque = op.opaque(),
            len = request.len(),
            "dispatching operation"
        );

        let response = match connection.send(&request) {
            Ok(response) => response,
            Err(e) => {
                self.pool.release(connection);
                return OperationResult::transport_failure(e);
            }
        };
        self.pool.release(connection);

        self.classify(op, &response)
    }

    /// Decode and classify a response
    fn classify<O: Operation>(&self, op: &mut O, response: &[u8]) -> OperationResult<O::Output> {
        let header = match op.read(response) {
            Ok(header) => header,
            // Malformed/short header: fatal for this call, surfaced as a
            // result rather than an escaped fault
            Err(e) => return OperationResult::transport_failure(e),
        };

        if ResponseStatus::from_code(header.status).is_some() {
            return op.take_result();
        }

        // Outside the static set: consult the error map
        let map = self.error_map.load();
        match map.as_ref().and_then(|map| map.lookup(header.status)) {
            Some(code) => {
                tracing::debug!(status = header.status, "status resolved via error map: {}", code);
                OperationResult::mapped_failure(code.description().to_string(), header.cas)
            }
            None => {
                let body = String::from_utf8_lossy(&response[header.value_range()]).into_owned();
                OperationResult::unknown_error(body, header.cas)
            }
        }
    }

    // =========================================================================
    // Negotiation
    // =========================================================================

    /// Feature list for Hello, in wire order
    fn feature_list(&self) -> Vec<ServerFeature> {
        let mut features = vec![
            ServerFeature::SubdocXAttributes,
            ServerFeature::SelectBucket,
        ];
        if self.pool.configuration().use_enhanced_durability {
            features.push(ServerFeature::MutationSeqno);
        }
        features
    }

    /// Run Hello negotiation exactly once per pool
    ///
    /// Best-effort: a failed Hello is logged and never blocks subsequent
    /// operations, and is not retried.
    fn negotiate(&self) {
        self.negotiation.call_once(|| {
            let timeout = self.pool.configuration().operation_timeout;
            let mut hello = Hello::new(self.feature_list(), timeout);
            let result = self.execute_inner(&mut hello);
            if result.success {
                tracing::debug!(features = ?result.value, "negotiated server features");
            } else {
                tracing::warn!("feature negotiation failed: {}", result.message);
            }
        });
    }

    // =========================================================================
    // Error Map
    // =========================================================================

    /// Install an error map, replacing any previous one atomically
    ///
    /// Takes effect for every operation classified afterwards, including
    /// ones already in flight.
    pub fn set_error_map(&self, map: ErrorMap) {
        self.error_map.store(Some(Arc::new(map)));
    }

    /// The currently installed error map snapshot
    pub fn error_map(&self) -> Option<Arc<ErrorMap>> {
        self.error_map.load_full()
    }

    /// Fetch the server's error map and install it on success
    pub fn fetch_error_map(&self) -> OperationResult<ErrorMap> {
        let timeout = self.pool.configuration().operation_timeout;
        let mut op = GetErrorMap::new(timeout);
        let result = self.execute(&mut op);
        if let Some(map) = &result.value {
            self.set_error_map(map.clone());
        }
        result
    }
}
