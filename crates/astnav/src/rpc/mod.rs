//! Asynchronous request plumbing: the transport boundary and the
//! correlation of responses to waiting callers.

pub(crate) mod correlator;

use std::fmt;

use serde_json::Value;

pub use self::correlator::RequestCorrelator;

/// Unique token matching an async response to the request that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(pub u64);

impl fmt::Display for RequestId {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The connection to the analysis service is gone.
    Disconnected,
    /// The transport rejected the payload.
    Send(String),
}

impl fmt::Display for TransportError {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            TransportError::Disconnected => write!(f, "analysis service transport disconnected"),
            TransportError::Send(reason) => write!(f, "failed to send request: {reason}"),
        }
    }
}

impl std::error::Error for TransportError {}

/// The wire boundary. Implementations own the encoding and the connection;
/// this core only needs to transmit a payload under a correlation id and to
/// fire best-effort cancellation notices.
pub trait Transport: Send + Sync {
    fn send(
        &self,
        id: RequestId,
        method: &str,
        params: Value,
    ) -> Result<(), TransportError>;

    /// Fire-and-forget: the remote service may answer anyway, and that late
    /// response is dropped by the correlator.
    fn cancel(
        &self,
        id: RequestId,
    );
}
