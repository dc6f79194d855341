//! # ViewHost
//!
//! The extension-host half of a remote model-view UI layer. Extensions build
//! dialogs, wizards, tabs, buttons, editors and comment threads as local
//! proxy objects; every proxy is named by a `Handle` and mirrors its state to
//! the main thread through fire-and-forget `MainCall`s.
//!
//! ## Layout
//!
//! - `host` / `proxy`: the object model and the factories that mint it.
//! - `registry`, `handles`, `relay`: handle issuance and inbound routing.
//! - `comments`, `marshal`, `commands`: comment threads and command arguments.
//! - `peer`, `transport`, `router`, `mirror`: the connection and both ends of it.

pub mod commands;
pub mod comments;
pub mod config;
pub mod content;
pub mod event;
pub mod handles;
pub mod host;
pub mod marshal;
pub mod mirror;
pub mod operation;
pub mod peer;
pub mod proxy;
pub mod registry;
pub mod relay;
pub mod response;
pub mod router;
pub mod shape;
pub mod testing;
pub mod transport;

pub(crate) mod dispatch;

pub use commands::CommandRegistry;
pub use comments::Comment;
pub use comments::CommentController;
pub use comments::CommentThread;
pub use comments::CommentsHost;
pub use config::ButtonLabels;
pub use config::HostConfig;
pub use config::PeerConfig;
pub use config::ViewTypes;
pub use content::ModelView;
pub use content::ModelViewRegistrar;
pub use content::ViewProviders;
pub use event::Emitter;
pub use event::Event;
pub use event::Subscription;
pub use handles::HandleAllocator;
pub use host::HostBuilder;
pub use host::ModelViewDialogHost;
pub use marshal::Argument;
pub use mirror::MainThreadMirror;
pub use operation::BackgroundOperationInfo;
pub use operation::LocalTaskManager;
pub use operation::OperationContext;
pub use operation::TaskManager;
pub use peer::Handler;
pub use peer::Peer;
pub use proxy::Button;
pub use proxy::Dialog;
pub use proxy::DialogContent;
pub use proxy::Editor;
pub use proxy::Lifecycle;
pub use proxy::ProxyObject;
pub use proxy::Registration;
pub use proxy::Tab;
pub use proxy::Wizard;
pub use proxy::WizardPage;
pub use registry::HandleRegistry;
pub use relay::WizardPageEvent;
pub use response::Error;
pub use response::Response;
pub use response::Result;
pub use router::ExtHostRouter;
pub use shape::ExtHostProxy;
pub use shape::ExtensionInfo;
pub use shape::MainThread;
pub use transport::Transport;

pub use viewrpc::Handle;
