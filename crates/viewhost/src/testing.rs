//! Test support: an in-memory transport and a recording main-thread sink.
//!
//! Used by this crate's tests and by the demo; not meant for production
//! wiring.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc;

use viewrpc::Handle;
use viewrpc::MainCall;

use crate::response::Response;
use crate::shape::MainThread;
use crate::transport;
use crate::transport::Transport;

/// A duplex channel transport using tokio mpsc channels.
///
/// Messages sent via `send()` appear on the other end's `recv()` and vice
/// versa.
pub struct DuplexChannelTransport {
    tx: mpsc::UnboundedSender<Vec<u8>>,
    rx: Arc<tokio::sync::Mutex<mpsc::UnboundedReceiver<Vec<u8>>>>,
}

impl DuplexChannelTransport {
    /// Creates a pair of transports connected to each other.
    pub fn pair() -> (Self, Self) {
        let (tx_a, rx_a) = mpsc::unbounded_channel();
        let (tx_b, rx_b) = mpsc::unbounded_channel();

        let a = Self { tx: tx_a, rx: Arc::new(tokio::sync::Mutex::new(rx_b)) };
        let b = Self { tx: tx_b, rx: Arc::new(tokio::sync::Mutex::new(rx_a)) };

        (a, b)
    }
}

#[async_trait::async_trait]
impl Transport for DuplexChannelTransport {
    async fn send(&self, payload: &[u8]) -> transport::Result<()> {
        self.tx
            .send(payload.to_vec())
            .map_err(|_| transport::Error::ConnectionLost("Channel closed".into()))
    }

    async fn recv(&self) -> transport::Result<Option<Vec<u8>>> {
        let mut rx = self.rx.lock().await;
        Ok(rx.recv().await)
    }
}

/// Records every submitted call and acknowledges it immediately.
#[derive(Default)]
pub struct RecordingMainThread {
    calls: Mutex<Vec<MainCall>>,
}

impl RecordingMainThread {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything recorded so far, in submission order.
    pub fn calls(&self) -> Vec<MainCall> {
        self.calls.lock().clone()
    }

    /// Drains the record.
    pub fn take(&self) -> Vec<MainCall> {
        std::mem::take(&mut *self.calls.lock())
    }

    /// Number of recorded calls with the given wire method name.
    pub fn count(&self, method: &str) -> usize {
        self.calls.lock().iter().filter(|call| call.method() == method).count()
    }

    /// Wire method names in submission order.
    pub fn methods(&self) -> Vec<&'static str> {
        self.calls.lock().iter().map(MainCall::method).collect()
    }

    /// The most recent call addressed to `handle`.
    pub fn last_for(&self, handle: Handle) -> Option<MainCall> {
        self.calls.lock().iter().rev().find(|call| call.target() == handle).cloned()
    }
}

impl MainThread for RecordingMainThread {
    fn submit(&self, call: MainCall) -> Response {
        self.calls.lock().push(call);
        Response::ack()
    }
}
