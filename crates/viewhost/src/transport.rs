//! # Transport Abstraction
//!
//! A minimal, async interface for moving frames between the two sides.
//!
//! ## Philosophy
//!
//! - **Byte-Oriented**: The transport knows nothing about frames, calls or
//!   handles. It moves opaque buffers.
//! - **Duplex**: Either side may send at any time. Request/reply correlation
//!   lives in the `Peer`, not here.

use std::fmt;

/// Errors that occur at the transport layer.
#[derive(Debug, Clone)]
pub enum Error {
    /// The remote side is unreachable or the connection was dropped.
    ConnectionLost(String),
    /// The operation timed out.
    Timeout,
    /// The transport refused the payload size.
    PayloadTooLarge,
    /// Generic I/O error or internal transport failure.
    Io(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConnectionLost(msg) => write!(f, "Connection lost: {}", msg),
            Self::Timeout => write!(f, "Transport timed out"),
            Self::PayloadTooLarge => write!(f, "Payload too large for transport"),
            Self::Io(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

pub type Result<T> = std::result::Result<T, Error>;

/// A bidirectional byte pipe.
///
/// Object-safe, so a `Peer` can own a `Box<dyn Transport>`.
#[async_trait::async_trait]
pub trait Transport: Send + Sync + 'static {
    /// Sends one payload.
    ///
    /// # Invariants
    /// - Payloads sent from one task arrive in the order they were sent.
    /// - Must not interpret the payload.
    async fn send(&self, payload: &[u8]) -> Result<()>;

    /// Receives the next payload. `Ok(None)` means the stream closed cleanly.
    async fn recv(&self) -> Result<Option<Vec<u8>>>;
}
