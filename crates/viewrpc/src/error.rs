//! # Error Definitions
//!
//! The central ledger of all operational and protocol failures.

use serde::Deserialize;
use serde::Serialize;

/// Operational failures within the RPC mechanism itself.
#[derive(Debug)]
pub enum Error {
    /// JSON encoding or decoding of a frame failed.
    Codec(serde_json::Error),
    /// The structure of the message was valid JSON but broke the protocol
    /// (e.g. a reply arriving for a call that was never sent).
    ProtocolViolation(String),
    /// The peers cannot agree on a protocol version.
    VersionMismatch { local: u32, remote: u32 },
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Codec(e) => write!(f, "codec error: {}", e),
            Self::ProtocolViolation(msg) => write!(f, "protocol violation: {}", msg),
            Self::VersionMismatch { local, remote } => {
                write!(f, "protocol version mismatch: local {}, remote {}", local, remote)
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Codec(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self { Self::Codec(e) }
}

/// A specialized Result type for RPC operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Reasons for an RPC failure (the "Err" side of a Reply).
///
/// These are distinct from `Error`; these represent the *remote* side refusing
/// or failing a call, whereas `Error` represents the wire itself failing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FailureReason {
    /// The invocation was addressed to a shape this peer does not serve.
    UnsupportedTarget,
    /// A positional argument (page index, etc.) was out of range.
    InvalidIndex { index: usize, len: usize },
    /// No command is registered under this id.
    CommandNotFound(String),
    /// The call frame was malformed.
    ProtocolViolation(String),
    /// The handler failed for a reason of its own.
    Internal(String),
}

impl std::fmt::Display for FailureReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnsupportedTarget => write!(f, "unsupported target"),
            Self::InvalidIndex { index, len } => write!(f, "index {} out of range for length {}", index, len),
            Self::CommandNotFound(id) => write!(f, "command '{}' not found", id),
            Self::ProtocolViolation(msg) => write!(f, "protocol violation: {}", msg),
            Self::Internal(msg) => write!(f, "internal failure: {}", msg),
        }
    }
}
