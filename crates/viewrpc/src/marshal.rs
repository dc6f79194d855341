//! # Marshalled Arguments
//!
//! Command arguments arrive as raw JSON. Some of them are references to live
//! objects on the receiving side, marked with a `$mid` discriminator. This
//! module names those shapes; resolving them against live objects is the
//! receiver's business.

use serde::Deserialize;
use serde::Serialize;

use crate::handle::Handle;

/// Addresses one comment thread under one controller.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreadRef {
    pub comment_control_handle: Handle,
    pub comment_thread_handle: Handle,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "$mid", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum MarshalledArg {
    CommentController {
        handle: Handle,
    },
    CommentThread {
        comment_control_handle: Handle,
        comment_thread_handle: Handle,
    },
    CommentThreadReply {
        thread: ThreadRef,
        text: String,
    },
    CommentNode {
        thread: ThreadRef,
        comment_unique_id: u64,
    },
    CommentThreadNode {
        thread: ThreadRef,
        comment_unique_id: u64,
        text: String,
    },
}

impl MarshalledArg {
    /// Recognizes a marshalled reference. Anything without a known `$mid`
    /// (or with the right tag but a malformed body) is not one.
    pub fn parse(value: &serde_json::Value) -> Option<Self> {
        if value.get("$mid").is_none() {
            return None;
        }
        serde_json::from_value(value.clone()).ok()
    }
}
