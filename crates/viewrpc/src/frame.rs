//! # Protocol Frames
//!
//! Defines the envelope around calls (Hello vs Call vs Reply).
//!
//! ## Invariants
//! - **Panic Safety**: All decoding paths return `Result`, never panicking on unknown data.
//! - **Hello First**: Each side's first frame is `Hello`; versions are settled
//!   before any call is interpreted.
//! - **Correlation**: A `Reply` carries the `seq` of the `Call` it answers.

use serde::Deserialize;
use serde::Serialize;

use crate::call::Invocation;
use crate::error::Error;
use crate::error::FailureReason;
use crate::error::Result;

/// The version this build speaks.
pub const PROTOCOL_VERSION: u32 = 1;

/// The oldest version this build still accepts.
pub const MIN_SUPPORTED_VERSION: u32 = 1;

/// Outcome of a call as seen by the caller.
pub type ReplyStatus = std::result::Result<serde_json::Value, FailureReason>;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Frame {
    Hello { version: u32, peer: String },
    Call { seq: u64, invocation: Invocation },
    Reply { seq: u64, status: ReplyStatus },
}

impl Frame {
    pub fn hello(peer: impl Into<String>) -> Self {
        Self::Hello { version: PROTOCOL_VERSION, peer: peer.into() }
    }

    pub fn call(seq: u64, invocation: impl Into<Invocation>) -> Self {
        Self::Call { seq, invocation: invocation.into() }
    }

    pub fn reply(seq: u64, status: ReplyStatus) -> Self {
        Self::Reply { seq, status }
    }
}

/// Encodes a frame into bytes ready for a transport.
pub fn encode(frame: &Frame) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(frame)?)
}

/// Decodes a frame from transport bytes.
pub fn decode(bytes: &[u8]) -> Result<Frame> {
    Ok(serde_json::from_slice(bytes)?)
}

/// Settles the version two peers will speak.
///
/// Both sides end up on the lower of the two versions. A version below
/// `MIN_SUPPORTED_VERSION` on either side cannot be spoken.
pub fn negotiate(local: u32, remote: u32) -> Result<u32> {
    if remote < MIN_SUPPORTED_VERSION || local < MIN_SUPPORTED_VERSION {
        return Err(Error::VersionMismatch { local, remote });
    }
    Ok(local.min(remote))
}
