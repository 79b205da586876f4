use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use serde_json::Value;
use tokio::sync::oneshot;
use tracing::debug;

use crate::rpc::{RequestId, Transport, TransportError};

type Continuation = Box<dyn FnOnce(Value) + Send>;

/// Tracks in-flight requests by correlation id and routes each response to
/// the continuation waiting for it.
///
/// Cancellation races with in-flight responses are expected, so a response
/// for an unknown id is a silent no-op, never a fault. A continuation is
/// invoked at most once; whether the context that justified the request is
/// still current (document revision and the like) is re-checked by the
/// continuation itself, not here.
pub struct RequestCorrelator {
    transport: Arc<dyn Transport>,
    pending: DashMap<RequestId, Continuation>,
    next_id: AtomicU64,
}

impl RequestCorrelator {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            pending: DashMap::new(),
            next_id: AtomicU64::new(1),
        }
    }

    /// Transmit `params`, keeping `continuation` keyed by the freshly
    /// minted id. On a transport error the continuation is dropped without
    /// being invoked.
    pub fn send(
        &self,
        method: &str,
        params: Value,
        continuation: impl FnOnce(Value) + Send + 'static,
    ) -> Result<RequestId, TransportError> {
        let id = RequestId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.pending.insert(id, Box::new(continuation));
        if let Err(err) = self.transport.send(id, method, params) {
            self.pending.remove(&id);
            return Err(err);
        }
        Ok(id)
    }

    /// Awaitable variant: the response arrives on the returned channel. A
    /// dropped sender (cancellation) surfaces as a receive error.
    pub fn request(
        &self,
        method: &str,
        params: Value,
    ) -> Result<(RequestId, oneshot::Receiver<Value>), TransportError> {
        let (tx, rx) = oneshot::channel();
        let id = self.send(method, params, move |response| {
            let _ = tx.send(response);
        })?;
        Ok((id, rx))
    }

    /// Deliver a response. Unknown ids (already cancelled, duplicate, or
    /// never issued) are dropped with a debug note.
    pub fn complete(
        &self,
        id: RequestId,
        response: Value,
    ) {
        match self.pending.remove(&id) {
            Some((_, continuation)) => continuation(response),
            None => debug!("dropping response for unknown request {id}"),
        }
    }

    /// Remove the continuation without invoking it and tell the transport
    /// to send a best-effort cancellation notice. Always succeeds locally.
    pub fn cancel(
        &self,
        id: RequestId,
    ) {
        if self.pending.remove(&id).is_some() {
            self.transport.cancel(id);
        }
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }
}

#[cfg(test)]
#[path = "../../tests/src/rpc/correlator_tests.rs"]
mod tests;
