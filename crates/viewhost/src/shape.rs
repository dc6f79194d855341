//! # Sides of the Boundary
//!
//! The two traits the runtime talks through. `MainThread` is where proxies
//! send their pushes; `ExtHostProxy` is how the main side reaches back.
//! A connected `Peer` implements both, and tests substitute recording fakes.

use viewrpc::HostCall;
use viewrpc::MainCall;

use crate::response::Response;

/// Sink for calls addressed to the main thread.
///
/// `submit` must enqueue synchronously: two calls submitted from one thread
/// are delivered in submission order.
pub trait MainThread: Send + Sync + 'static {
    fn submit(&self, call: MainCall) -> Response;
}

/// Sink for calls addressed to the extension host.
pub trait ExtHostProxy: Send + Sync + 'static {
    fn request(&self, call: HostCall) -> Response;
}

/// Identifies the extension that owns an object.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ExtensionInfo {
    pub id: String,
}

impl ExtensionInfo {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}
