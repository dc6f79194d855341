//! # ViewRPC
//!
//! The wire protocol between an extension host and the main thread that
//! renders its UI objects.
//!
//! ## Architecture
//!
//! Objects never cross the boundary by value. Each side names them by
//! `Handle`, pushes complete snapshots (`details`) when they change, and
//! exchanges `Frame`s that carry either a call or the reply to one.

pub mod call;
pub mod details;
pub mod error;
pub mod frame;
pub mod handle;
pub mod marshal;


pub use call::HostCall;
pub use call::Invocation;
pub use call::MainCall;
pub use details::ButtonDetails;
pub use details::CollapsibleState;
pub use details::CommentPayload;
pub use details::CommentThreadChanges;
pub use details::DialogContentDetails;
pub use details::DialogDetails;
pub use details::DialogMessage;
pub use details::EditorOptions;
pub use details::MessageLevel;
pub use details::Range;
pub use details::TabDetails;
pub use details::ViewColumn;
pub use details::WizardDetails;
pub use details::WizardPageChangeInfo;
pub use details::WizardPageDetails;
pub use error::Error;
pub use error::FailureReason;
pub use error::Result;
pub use frame::Frame;
pub use frame::ReplyStatus;
pub use frame::MIN_SUPPORTED_VERSION;
pub use frame::PROTOCOL_VERSION;
pub use frame::decode;
pub use frame::encode;
pub use frame::negotiate;
pub use handle::Handle;
pub use marshal::MarshalledArg;
pub use marshal::ThreadRef;
