//! # Responses
//!
//! `Response` is the awaitable side of a submitted call. Submission has
//! already happened when a `Response` exists; awaiting it only observes the
//! reply. Dropping it is fine for fire-and-forget pushes.

use std::future::IntoFuture;
use std::time::Duration;

use futures::future::BoxFuture;
use serde::de::DeserializeOwned;
use tokio::sync::oneshot;

use viewrpc::FailureReason;

use crate::transport;

#[derive(Debug, Clone)]
pub enum Error {
    Transport(transport::Error),
    Codec(String),
    Protocol(String),
    Remote(FailureReason),
    VersionMismatch { local: u32, remote: u32 },
    Timeout,
    ChannelClosed,
    Disconnected,
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Transport(e) => write!(f, "Transport error: {}", e),
            Self::Codec(msg) => write!(f, "Codec error: {}", msg),
            Self::Protocol(msg) => write!(f, "Protocol violation: {}", msg),
            Self::Remote(reason) => write!(f, "Remote failure: {}", reason),
            Self::VersionMismatch { local, remote } => {
                write!(f, "Version mismatch: local {}, remote {}", local, remote)
            }
            Self::Timeout => write!(f, "Request timed out"),
            Self::ChannelClosed => write!(f, "Response channel closed"),
            Self::Disconnected => write!(f, "Peer disconnected"),
        }
    }
}

impl std::error::Error for Error {}

impl From<transport::Error> for Error {
    fn from(e: transport::Error) -> Self {
        Self::Transport(e)
    }
}

impl From<viewrpc::Error> for Error {
    fn from(e: viewrpc::Error) -> Self {
        match e {
            viewrpc::Error::Codec(e) => Self::Codec(e.to_string()),
            viewrpc::Error::ProtocolViolation(msg) => Self::Protocol(msg),
            viewrpc::Error::VersionMismatch { local, remote } => Self::VersionMismatch { local, remote },
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Self::Codec(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

pub(crate) type Reply = oneshot::Receiver<Result<serde_json::Value>>;

enum State {
    Ready(Result<serde_json::Value>),
    Waiting {
        rx: Reply,
        timeout: Duration,
        on_abandon: Option<Box<dyn FnOnce() + Send>>,
    },
}

/// The eventual reply to a submitted call.
#[must_use = "a response does nothing unless awaited; drop it explicitly for fire-and-forget"]
pub struct Response {
    state: State,
}

impl Response {
    /// A response that already succeeded.
    pub fn ready(value: serde_json::Value) -> Self {
        Self { state: State::Ready(Ok(value)) }
    }

    pub fn ack() -> Self {
        Self::ready(serde_json::Value::Null)
    }

    pub fn failed(error: Error) -> Self {
        Self { state: State::Ready(Err(error)) }
    }

    /// A response still in flight. `on_abandon` runs if the wait times out
    /// or the sender is dropped, so the caller can forget the pending entry.
    pub(crate) fn waiting(rx: Reply, timeout: Duration, on_abandon: Box<dyn FnOnce() + Send>) -> Self {
        Self { state: State::Waiting { rx, timeout, on_abandon: Some(on_abandon) } }
    }

    /// Awaits the reply and discards its value.
    pub async fn acked(self) -> Result<()> {
        self.await.map(|_| ())
    }

    /// Awaits the reply and decodes its value.
    pub async fn decode<T: DeserializeOwned>(self) -> Result<T> {
        let value = self.await?;
        Ok(serde_json::from_value(value)?)
    }
}

impl IntoFuture for Response {
    type Output = Result<serde_json::Value>;
    type IntoFuture = BoxFuture<'static, Self::Output>;

    fn into_future(self) -> Self::IntoFuture {
        Box::pin(async move {
            match self.state {
                State::Ready(result) => result,
                State::Waiting { rx, timeout, mut on_abandon } => {
                    let outcome = match tokio::time::timeout(timeout, rx).await {
                        Ok(Ok(result)) => return result,
                        Ok(Err(_)) => Error::ChannelClosed,
                        Err(_) => Error::Timeout,
                    };
                    if let Some(abandon) = on_abandon.take() {
                        abandon();
                    }
                    Err(outcome)
                }
            }
        })
    }
}

impl std::fmt::Debug for Response {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.state {
            State::Ready(result) => f.debug_tuple("Response::Ready").field(result).finish(),
            State::Waiting { timeout, .. } => f.debug_struct("Response::Waiting").field("timeout", timeout).finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;
    use std::sync::atomic::AtomicBool;
    use std::sync::atomic::Ordering;

    #[tokio::test]
    async fn test_ready_response_resolves_immediately() {
        let value = Response::ready(serde_json::json!(true)).decode::<bool>().await.expect("decode");
        assert!(value);
        Response::ack().acked().await.expect("ack");
    }

    #[tokio::test]
    async fn test_waiting_response_times_out_and_abandons() {
        let (_tx, rx) = oneshot::channel();
        let abandoned = Arc::new(AtomicBool::new(false));
        let flag = abandoned.clone();

        let response = Response::waiting(rx, Duration::from_millis(10), Box::new(move || flag.store(true, Ordering::SeqCst)));
        let err = response.await.expect_err("must time out");

        assert!(matches!(err, Error::Timeout));
        assert!(abandoned.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_waiting_response_sees_dropped_sender() {
        let (tx, rx) = oneshot::channel::<Result<serde_json::Value>>();
        drop(tx);

        let response = Response::waiting(rx, Duration::from_secs(5), Box::new(|| {}));
        assert!(matches!(response.await, Err(Error::ChannelClosed)));
    }
}
