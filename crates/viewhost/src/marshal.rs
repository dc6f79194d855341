//! # Argument Rehydration
//!
//! Command arguments that reference live comment objects arrive as `$mid`
//! tagged JSON. Each one is resolved against the comments host. Whenever a
//! lookup misses, the argument is passed through untouched.

use viewrpc::MarshalledArg;
use viewrpc::ThreadRef;

use crate::comments::Comment;
use crate::comments::CommentController;
use crate::comments::CommentThread;
use crate::comments::CommentsHost;

/// A command argument after rehydration.
#[derive(Clone, Debug)]
pub enum Argument {
    /// Anything that was not, or could not be resolved to, a live object.
    Raw(serde_json::Value),
    Controller(CommentController),
    Thread(CommentThread),
    Reply { thread: CommentThread, text: String },
    Comment { thread: CommentThread, unique_id: u64, comment: Comment },
}

impl Argument {
    pub fn as_raw(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Raw(value) => Some(value),
            _ => None,
        }
    }
}

pub fn process_argument(comments: &CommentsHost, value: serde_json::Value) -> Argument {
    let Some(marshalled) = MarshalledArg::parse(&value) else {
        return Argument::Raw(value);
    };
    resolve(comments, marshalled).unwrap_or(Argument::Raw(value))
}

fn resolve(comments: &CommentsHost, marshalled: MarshalledArg) -> Option<Argument> {
    match marshalled {
        MarshalledArg::CommentController { handle } => comments.controller(handle).map(Argument::Controller),
        MarshalledArg::CommentThread { comment_control_handle, comment_thread_handle } => {
            let thread = find_thread(comments, ThreadRef { comment_control_handle, comment_thread_handle })?;
            Some(Argument::Thread(thread))
        }
        MarshalledArg::CommentThreadReply { thread: at, text } => {
            let thread = find_thread(comments, at)?;
            Some(Argument::Reply { thread, text })
        }
        MarshalledArg::CommentNode { thread: at, comment_unique_id } => {
            let thread = find_thread(comments, at)?;
            let comment = thread.comment_by_unique_id(comment_unique_id)?;
            Some(Argument::Comment { thread, unique_id: comment_unique_id, comment })
        }
        MarshalledArg::CommentThreadNode { thread: at, comment_unique_id, text } => {
            let thread = find_thread(comments, at)?;
            let comment = thread.edit_comment_body(comment_unique_id, text)?;
            Some(Argument::Comment { thread, unique_id: comment_unique_id, comment })
        }
    }
}

fn find_thread(comments: &CommentsHost, at: ThreadRef) -> Option<CommentThread> {
    comments.controller(at.comment_control_handle)?.comment_thread(at.comment_thread_handle)
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;

    use serde_json::json;

    use viewrpc::Range;

    use crate::shape::ExtensionInfo;
    use crate::testing::RecordingMainThread;

    fn setup() -> (CommentsHost, CommentController, CommentThread) {
        let comments = CommentsHost::new(Arc::new(RecordingMainThread::new()));
        let controller = comments.create_comment_controller(ExtensionInfo::new("ext"), "review", "Review");
        let thread = controller.create_comment_thread("file:///a.sql", Range::default(), vec![Comment::new("draft", "ana")]);
        (comments, controller, thread)
    }

    fn thread_ref(controller: &CommentController, thread: &CommentThread) -> serde_json::Value {
        json!({ "commentControlHandle": controller.handle().0, "commentThreadHandle": thread.handle().0 })
    }

    #[test]
    fn test_plain_values_pass_through() {
        let (comments, _, _) = setup();
        let arg = comments.process_argument(json!({ "file": "a.sql" }));
        assert_eq!(arg.as_raw(), Some(&json!({ "file": "a.sql" })));
    }

    #[test]
    fn test_controller_and_thread_resolve() {
        let (comments, controller, thread) = setup();

        let arg = comments.process_argument(json!({ "$mid": "commentController", "handle": controller.handle().0 }));
        assert!(matches!(arg, Argument::Controller(c) if c.handle() == controller.handle()));

        let mut raw = thread_ref(&controller, &thread);
        raw["$mid"] = json!("commentThread");
        let arg = comments.process_argument(raw);
        assert!(matches!(arg, Argument::Thread(t) if t.handle() == thread.handle()));
    }

    #[test]
    fn test_reply_carries_text() {
        let (comments, controller, thread) = setup();
        let raw = json!({ "$mid": "commentThreadReply", "thread": thread_ref(&controller, &thread), "text": "lgtm" });

        match comments.process_argument(raw) {
            Argument::Reply { thread: t, text } => {
                assert_eq!(t.handle(), thread.handle());
                assert_eq!(text, "lgtm");
            }
            other => panic!("expected reply, got {:?}", other),
        }
    }

    #[test]
    fn test_thread_node_edits_the_body() {
        let (comments, controller, thread) = setup();
        let raw = json!({
            "$mid": "commentThreadNode",
            "thread": thread_ref(&controller, &thread),
            "commentUniqueId": 1,
            "text": "final"
        });

        match comments.process_argument(raw) {
            Argument::Comment { unique_id, comment, .. } => {
                assert_eq!(unique_id, 1);
                assert_eq!(comment.body, "final");
            }
            other => panic!("expected comment, got {:?}", other),
        }
        assert_eq!(thread.comment_by_unique_id(1).map(|c| c.body), Some("final".to_string()));
    }

    #[test]
    fn test_misses_fall_back_to_the_original() {
        let (comments, controller, thread) = setup();

        let unknown_controller = json!({ "$mid": "commentController", "handle": 999 });
        assert_eq!(comments.process_argument(unknown_controller.clone()).as_raw(), Some(&unknown_controller));

        let unknown_comment = json!({
            "$mid": "commentNode",
            "thread": thread_ref(&controller, &thread),
            "commentUniqueId": 42
        });
        assert_eq!(comments.process_argument(unknown_comment.clone()).as_raw(), Some(&unknown_comment));

        let malformed = json!({ "$mid": "commentThreadReply", "thread": 3 });
        assert_eq!(comments.process_argument(malformed.clone()).as_raw(), Some(&malformed));
    }
}
