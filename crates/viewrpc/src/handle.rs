//! Handles for remote objects.
//!
//! A handle is the only thing that crosses the wire to name an object. The
//! newtype keeps it from being confused with page indices, sequence numbers
//! or comment ids, which are all plain integers too.

use serde::Deserialize;
use serde::Serialize;

/// Opaque, session-local address of a proxied object.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Handle(pub u64);

impl std::fmt::Display for Handle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "handle-{}", self.0)
    }
}

impl From<u64> for Handle {
    fn from(value: u64) -> Self {
        Self(value)
    }
}
