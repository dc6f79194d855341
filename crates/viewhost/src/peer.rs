//! # RPC Peer with Async Pump
//!
//! A `Peer` owns one transport and speaks the frame protocol over it. The
//! same type serves both sides: the extension host submits `MainCall`s
//! through it, the main side submits `HostCall`s.
//!
//! ## Tasks
//!
//! - **Writer**: spawned by `new`. Drains an unbounded outbox in FIFO order,
//!   so calls leave in exactly the order they were submitted. `Hello` is the
//!   first frame queued.
//! - **Reader**: spawned by `serve`. Negotiates the version from the remote
//!   `Hello`, routes replies to their waiting callers by sequence number, and
//!   hands inbound calls to a `Handler`.
//!
//! ## Invariants
//!
//! - Inbound calls reach the handler in arrival order. The handler's
//!   synchronous part runs inline on the reader; only reply futures are
//!   spawned.
//! - When the transport closes, every pending call fails.
//! - Once the connection has ended, the error that ended it is kept and every
//!   later call fails with it immediately.

use std::sync::Arc;
use std::sync::OnceLock;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::AtomicU32;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

use dashmap::DashMap;
use futures::future::BoxFuture;
use tokio::sync::mpsc;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::debug;
use tracing::error;
use tracing::info;
use tracing::trace;
use tracing::warn;

use viewrpc::FailureReason;
use viewrpc::Frame;
use viewrpc::HostCall;
use viewrpc::Invocation;
use viewrpc::MainCall;
use viewrpc::ReplyStatus;

use crate::config::PeerConfig;
use crate::response::Error;
use crate::response::Response;
use crate::response::Result;
use crate::shape::ExtHostProxy;
use crate::shape::MainThread;
use crate::transport::Transport;

/// Serves the calls a peer receives.
pub trait Handler: Send + Sync + 'static {
    /// Runs the synchronous part of `invocation` now and returns the reply.
    fn handle(&self, invocation: Invocation) -> BoxFuture<'static, ReplyStatus>;
}

type Pending = Arc<DashMap<u64, oneshot::Sender<Result<serde_json::Value>>>>;
type Closed = Arc<OnceLock<Error>>;

pub struct Peer {
    config: PeerConfig,
    transport: Arc<dyn Transport>,
    outbox: mpsc::UnboundedSender<Frame>,
    pending: Pending,
    closed: Closed,
    seq_gen: AtomicU64,
    negotiated: Arc<AtomicU32>,
    serving: AtomicBool,
}

impl Peer {
    /// Creates a peer, queues its `Hello` and spawns the writer task.
    pub fn new(config: PeerConfig, transport: Box<dyn Transport>) -> Arc<Self> {
        let transport: Arc<dyn Transport> = Arc::from(transport);
        let pending: Pending = Arc::new(DashMap::new());
        let closed: Closed = Arc::new(OnceLock::new());
        let (outbox, rx) = mpsc::unbounded_channel();

        let hello = Frame::Hello { version: config.protocol_version, peer: config.name.clone() };
        // The receiver is alive until the writer below exits, so this cannot fail.
        let _ = outbox.send(hello);

        tokio::spawn(Self::write_loop(config.name.clone(), transport.clone(), rx, pending.clone(), closed.clone()));

        Arc::new(Self {
            config,
            transport,
            outbox,
            pending,
            closed,
            seq_gen: AtomicU64::new(1),
            negotiated: Arc::new(AtomicU32::new(0)),
            serving: AtomicBool::new(false),
        })
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// The version both sides settled on, once the remote `Hello` arrived.
    pub fn negotiated_version(&self) -> Option<u32> {
        match self.negotiated.load(Ordering::SeqCst) {
            0 => None,
            version => Some(version),
        }
    }

    pub fn pending_calls(&self) -> usize {
        self.pending.len()
    }

    /// The error that ended the connection, if it has ended.
    pub fn closed(&self) -> Option<Error> {
        self.closed.get().cloned()
    }

    /// Spawns the reader task. Only the first call has any effect.
    pub fn serve(&self, handler: Arc<dyn Handler>) -> Option<JoinHandle<()>> {
        if self.serving.swap(true, Ordering::SeqCst) {
            warn!(peer = %self.config.name, "peer is already being served");
            return None;
        }
        let reader = Reader {
            name: self.config.name.clone(),
            local_version: self.config.protocol_version,
            transport: self.transport.clone(),
            outbox: self.outbox.clone(),
            pending: self.pending.clone(),
            closed: self.closed.clone(),
            negotiated: self.negotiated.clone(),
            handler,
        };
        Some(tokio::spawn(reader.run()))
    }

    /// Queues a call and returns its eventual reply.
    pub fn invoke(&self, invocation: Invocation) -> Response {
        if let Some(error) = self.closed() {
            trace!(peer = %self.config.name, method = invocation.method(), "call refused: {}", error);
            return Response::failed(error);
        }

        let seq = self.seq_gen.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = oneshot::channel();
        self.pending.insert(seq, tx);

        // The connection may have ended between the check above and the insert.
        if let Some(error) = self.closed() {
            self.pending.remove(&seq);
            return Response::failed(error);
        }

        trace!(peer = %self.config.name, seq, method = invocation.method(), "call queued");
        if self.outbox.send(Frame::call(seq, invocation)).is_err() {
            self.pending.remove(&seq);
            return Response::failed(Error::Disconnected);
        }

        let pending = self.pending.clone();
        Response::waiting(rx, self.config.call_timeout, Box::new(move || {
            pending.remove(&seq);
        }))
    }

    async fn write_loop(
        name: String,
        transport: Arc<dyn Transport>,
        mut rx: mpsc::UnboundedReceiver<Frame>,
        pending: Pending,
        closed: Closed,
    ) {
        while let Some(frame) = rx.recv().await {
            let bytes = match viewrpc::encode(&frame) {
                Ok(bytes) => bytes,
                Err(e) => {
                    error!(peer = %name, "failed to encode frame: {}", e);
                    if let Frame::Call { seq, .. } = frame {
                        if let Some((_, tx)) = pending.remove(&seq) {
                            let _ = tx.send(Err(e.into()));
                        }
                    }
                    continue;
                }
            };
            if let Err(e) = transport.send(&bytes).await {
                error!(peer = %name, "transport send failed: {}", e);
                close(&closed, &pending, Error::Transport(e));
                break;
            }
        }
        debug!(peer = %name, "writer stopped");
    }
}

/// Records `error` as the end of the connection, unless an earlier error
/// already did, then fails every pending call with the recorded one.
fn close(closed: &OnceLock<Error>, pending: &DashMap<u64, oneshot::Sender<Result<serde_json::Value>>>, error: Error) {
    let error = closed.get_or_init(|| error).clone();
    notify_all_pending(pending, error);
}

/// Fails every pending call with `error`.
fn notify_all_pending(pending: &DashMap<u64, oneshot::Sender<Result<serde_json::Value>>>, error: Error) {
    let keys: Vec<u64> = pending.iter().map(|entry| *entry.key()).collect();
    for key in keys {
        if let Some((_, tx)) = pending.remove(&key) {
            let _ = tx.send(Err(error.clone()));
        }
    }
}

struct Reader {
    name: String,
    local_version: u32,
    transport: Arc<dyn Transport>,
    outbox: mpsc::UnboundedSender<Frame>,
    pending: Pending,
    closed: Closed,
    negotiated: Arc<AtomicU32>,
    handler: Arc<dyn Handler>,
}

impl Reader {
    async fn run(self) {
        let error = loop {
            match self.transport.recv().await {
                Ok(Some(bytes)) => {
                    if let Err(e) = self.handle_bytes(&bytes) {
                        break e;
                    }
                }
                Ok(None) => break Error::Disconnected,
                Err(e) => {
                    warn!(peer = %self.name, "transport receive failed: {}", e);
                    break Error::Transport(e);
                }
            }
        };

        debug!(peer = %self.name, "reader stopped: {}", error);
        close(&self.closed, &self.pending, error);
    }

    fn greeted(&self) -> bool {
        self.negotiated.load(Ordering::SeqCst) != 0
    }

    /// Handles one inbound frame. An `Err` ends the connection.
    fn handle_bytes(&self, bytes: &[u8]) -> Result<()> {
        let frame = match viewrpc::decode(bytes) {
            Ok(frame) => frame,
            Err(e) => {
                warn!(peer = %self.name, "dropping undecodable frame: {}", e);
                return Ok(());
            }
        };

        match frame {
            Frame::Hello { version, peer } => {
                let negotiated = viewrpc::negotiate(self.local_version, version).inspect_err(|e| {
                    error!(peer = %self.name, remote = %peer, "handshake failed: {}", e);
                })?;
                self.negotiated.store(negotiated, Ordering::SeqCst);
                info!(peer = %self.name, remote = %peer, version = negotiated, "handshake complete");
            }
            Frame::Call { seq, invocation } => {
                if !self.greeted() {
                    let reason = FailureReason::ProtocolViolation("call before hello".into());
                    let _ = self.outbox.send(Frame::reply(seq, Err(reason)));
                    return Ok(());
                }
                trace!(peer = %self.name, seq, method = invocation.method(), "call received");
                let reply = self.handler.handle(invocation);
                let outbox = self.outbox.clone();
                tokio::spawn(async move {
                    let status = reply.await;
                    let _ = outbox.send(Frame::reply(seq, status));
                });
            }
            Frame::Reply { seq, status } => match self.pending.remove(&seq) {
                Some((_, tx)) => {
                    let _ = tx.send(status.map_err(Error::Remote));
                }
                None => debug!(peer = %self.name, seq, "reply for unknown or abandoned call"),
            },
        }
        Ok(())
    }
}

impl MainThread for Peer {
    fn submit(&self, call: MainCall) -> Response {
        self.invoke(call.into())
    }
}

impl ExtHostProxy for Peer {
    fn request(&self, call: HostCall) -> Response {
        self.invoke(call.into())
    }
}

impl std::fmt::Debug for Peer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Peer")
            .field("name", &self.config.name)
            .field("negotiated", &self.negotiated_version())
            .field("pending", &self.pending.len())
            .field("closed", &self.closed.get().is_some())
            .finish()
    }
}
