//! # Comments
//!
//! Comment controllers and their threads. Controllers register on the main
//! side when created; threads announce themselves and then push their full
//! state after every change.
//!
//! ## Invariants
//!
//! - A thread's id defaults to `"{controller id}.{thread handle}"`.
//! - Comment ids are unique within a thread, start at 1 and are never reused.
//!   A comment keeps its id across `set_comments` as long as it is unchanged.
//! - A disposed thread sends nothing and is no longer found through its
//!   controller.

use std::sync::Arc;
use std::sync::Weak;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;

use dashmap::DashMap;
use parking_lot::Mutex;
use tracing::debug;

use viewrpc::CollapsibleState;
use viewrpc::CommentPayload;
use viewrpc::CommentThreadChanges;
use viewrpc::Handle;
use viewrpc::MainCall;
use viewrpc::Range;

use crate::handles::HandleAllocator;
use crate::marshal::Argument;
use crate::shape::ExtensionInfo;
use crate::shape::MainThread;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Comment {
    pub body: String,
    pub author: String,
    pub label: Option<String>,
    pub context_value: Option<String>,
}

impl Comment {
    pub fn new(body: impl Into<String>, author: impl Into<String>) -> Self {
        Self { body: body.into(), author: author.into(), label: None, context_value: None }
    }
}

struct CommentsShared {
    main: Arc<dyn MainThread>,
    controller_handles: HandleAllocator,
    thread_handles: Arc<HandleAllocator>,
    controllers: DashMap<Handle, CommentController>,
}

/// Extension-host registry of comment controllers.
#[derive(Clone)]
pub struct CommentsHost {
    shared: Arc<CommentsShared>,
}

impl CommentsHost {
    pub fn new(main: Arc<dyn MainThread>) -> Self {
        Self::with_allocators(main, HandleAllocator::new(), HandleAllocator::new())
    }

    /// A comments host drawing controller and thread handles from the given
    /// allocators.
    pub fn with_allocators(main: Arc<dyn MainThread>, controllers: HandleAllocator, threads: HandleAllocator) -> Self {
        let shared = CommentsShared {
            main,
            controller_handles: controllers,
            thread_handles: Arc::new(threads),
            controllers: DashMap::new(),
        };
        Self { shared: Arc::new(shared) }
    }

    pub fn create_comment_controller(
        &self,
        extension: ExtensionInfo,
        id: impl Into<String>,
        label: impl Into<String>,
    ) -> CommentController {
        let handle = self.shared.controller_handles.allocate();
        let core = ControllerCore {
            main: self.shared.main.clone(),
            handle,
            id: id.into(),
            label: label.into(),
            extension,
            thread_handles: self.shared.thread_handles.clone(),
            threads: Arc::new(DashMap::new()),
        };
        let controller = CommentController { core: Arc::new(core) };
        self.shared.controllers.insert(handle, controller.clone());

        drop(self.shared.main.submit(MainCall::RegisterCommentController {
            handle,
            id: controller.id().to_string(),
            label: controller.label().to_string(),
        }));
        debug!(%handle, id = controller.id(), "comment controller registered");
        controller
    }

    pub fn controller(&self, handle: Handle) -> Option<CommentController> {
        self.shared.controllers.get(&handle).map(|entry| entry.clone())
    }

    /// Disposes a controller and forgets it.
    pub fn dispose_controller(&self, handle: Handle) {
        if let Some((_, controller)) = self.shared.controllers.remove(&handle) {
            controller.dispose();
        }
    }

    pub fn create_comment_thread_template(&self, controller: Handle, uri: &str, range: Range) {
        if let Some(controller) = self.controller(controller) {
            controller.create_comment_thread_template(uri, range);
        }
    }

    pub fn update_comment_thread_template(&self, controller: Handle, thread: Handle, range: Range) {
        if let Some(controller) = self.controller(controller) {
            controller.update_comment_thread_template(thread, range);
        }
    }

    pub fn delete_comment_thread(&self, controller: Handle, thread: Handle) {
        if let Some(controller) = self.controller(controller) {
            controller.delete_comment_thread(thread);
        }
    }

    /// Turns a raw command argument into the live object it refers to.
    pub fn process_argument(&self, value: serde_json::Value) -> Argument {
        crate::marshal::process_argument(self, value)
    }
}

struct ControllerCore {
    main: Arc<dyn MainThread>,
    handle: Handle,
    id: String,
    label: String,
    extension: ExtensionInfo,
    thread_handles: Arc<HandleAllocator>,
    threads: Arc<ThreadMap>,
}

type ThreadMap = DashMap<Handle, CommentThread>;

#[derive(Clone)]
pub struct CommentController {
    core: Arc<ControllerCore>,
}

impl CommentController {
    pub fn handle(&self) -> Handle {
        self.core.handle
    }

    pub fn id(&self) -> &str {
        &self.core.id
    }

    pub fn label(&self) -> &str {
        &self.core.label
    }

    pub fn extension(&self) -> &ExtensionInfo {
        &self.core.extension
    }

    pub fn create_comment_thread(&self, uri: impl Into<String>, range: Range, comments: Vec<Comment>) -> CommentThread {
        self.spawn_thread(None, uri.into(), range, comments, CollapsibleState::Collapsed)
    }

    /// Like `create_comment_thread` with an explicit thread id.
    pub fn create_comment_thread_with_id(
        &self,
        thread_id: impl Into<String>,
        uri: impl Into<String>,
        range: Range,
        comments: Vec<Comment>,
    ) -> CommentThread {
        self.spawn_thread(Some(thread_id.into()), uri.into(), range, comments, CollapsibleState::Collapsed)
    }

    pub fn comment_thread(&self, handle: Handle) -> Option<CommentThread> {
        self.core.threads.get(&handle).map(|entry| entry.clone())
    }

    pub fn threads(&self) -> Vec<CommentThread> {
        let mut threads: Vec<CommentThread> = self.core.threads.iter().map(|entry| entry.value().clone()).collect();
        threads.sort_by_key(|thread| thread.handle());
        threads
    }

    /// Disposes every thread and unregisters the controller.
    pub fn dispose(&self) {
        for thread in self.threads() {
            thread.dispose();
        }
        self.core.threads.clear();
        drop(self.core.main.submit(MainCall::UnregisterCommentController { handle: self.core.handle }));
    }

    /// The main side started a new thread in the editor.
    pub(crate) fn create_comment_thread_template(&self, uri: &str, range: Range) -> CommentThread {
        self.spawn_thread(None, uri.to_string(), range, Vec::new(), CollapsibleState::Expanded)
    }

    pub(crate) fn update_comment_thread_template(&self, thread: Handle, range: Range) {
        if let Some(thread) = self.comment_thread(thread) {
            thread.set_range(range);
        }
    }

    pub(crate) fn delete_comment_thread(&self, thread: Handle) {
        if let Some((_, thread)) = self.core.threads.remove(&thread) {
            thread.dispose();
        }
    }

    fn spawn_thread(
        &self,
        thread_id: Option<String>,
        uri: String,
        range: Range,
        comments: Vec<Comment>,
        collapse_state: CollapsibleState,
    ) -> CommentThread {
        let handle = self.core.thread_handles.allocate();
        let thread_id = thread_id.unwrap_or_else(|| format!("{}.{}", self.core.id, handle.0));
        let mut state = ThreadState {
            range,
            label: None,
            context_value: None,
            comments: Vec::new(),
            next_comment_id: 1,
            collapse_state,
            can_reply: true,
        };
        state.assign(comments);

        let core = ThreadCore {
            main: self.core.main.clone(),
            controller: self.core.handle,
            siblings: Arc::downgrade(&self.core.threads),
            handle,
            thread_id,
            uri,
            state: Mutex::new(state),
            disposed: AtomicBool::new(false),
        };
        let thread = CommentThread { core: Arc::new(core) };
        self.core.threads.insert(handle, thread.clone());

        drop(self.core.main.submit(MainCall::CreateCommentThread {
            controller: self.core.handle,
            thread: handle,
            thread_id: thread.id().to_string(),
            uri: thread.uri().to_string(),
            range,
        }));
        thread.push();
        thread
    }
}

struct ThreadState {
    range: Range,
    label: Option<String>,
    context_value: Option<String>,
    comments: Vec<(u64, Comment)>,
    next_comment_id: u64,
    collapse_state: CollapsibleState,
    can_reply: bool,
}

impl ThreadState {
    /// Replaces the comment list, keeping ids of comments that did not change.
    fn assign(&mut self, comments: Vec<Comment>) {
        let mut previous = std::mem::take(&mut self.comments);
        for comment in comments {
            let id = match previous.iter().position(|(_, old)| *old == comment) {
                Some(at) => previous.remove(at).0,
                None => {
                    let id = self.next_comment_id;
                    self.next_comment_id += 1;
                    id
                }
            };
            self.comments.push((id, comment));
        }
    }

    fn changes(&self) -> CommentThreadChanges {
        CommentThreadChanges {
            range: self.range,
            label: self.label.clone(),
            context_value: self.context_value.clone(),
            comments: self
                .comments
                .iter()
                .map(|(id, comment)| CommentPayload {
                    unique_id_in_thread: *id,
                    body: comment.body.clone(),
                    user_name: comment.author.clone(),
                    label: comment.label.clone(),
                    context_value: comment.context_value.clone(),
                })
                .collect(),
            collapse_state: self.collapse_state,
            can_reply: self.can_reply,
        }
    }
}

struct ThreadCore {
    main: Arc<dyn MainThread>,
    controller: Handle,
    siblings: Weak<ThreadMap>,
    handle: Handle,
    thread_id: String,
    uri: String,
    state: Mutex<ThreadState>,
    disposed: AtomicBool,
}

#[derive(Clone)]
pub struct CommentThread {
    core: Arc<ThreadCore>,
}

impl CommentThread {
    pub fn handle(&self) -> Handle {
        self.core.handle
    }

    pub fn controller(&self) -> Handle {
        self.core.controller
    }

    pub fn id(&self) -> &str {
        &self.core.thread_id
    }

    pub fn uri(&self) -> &str {
        &self.core.uri
    }

    pub fn range(&self) -> Range {
        self.core.state.lock().range
    }

    /// Moves the thread. Setting the same range again sends nothing.
    pub fn set_range(&self, range: Range) {
        {
            let mut state = self.core.state.lock();
            if state.range == range {
                return;
            }
            state.range = range;
        }
        self.push();
    }

    pub fn label(&self) -> Option<String> {
        self.core.state.lock().label.clone()
    }

    pub fn set_label(&self, label: Option<String>) {
        self.core.state.lock().label = label;
        self.push();
    }

    pub fn context_value(&self) -> Option<String> {
        self.core.state.lock().context_value.clone()
    }

    pub fn set_context_value(&self, context_value: Option<String>) {
        self.core.state.lock().context_value = context_value;
        self.push();
    }

    pub fn comments(&self) -> Vec<Comment> {
        self.core.state.lock().comments.iter().map(|(_, comment)| comment.clone()).collect()
    }

    pub fn set_comments(&self, comments: Vec<Comment>) {
        self.core.state.lock().assign(comments);
        self.push();
    }

    pub fn collapsible_state(&self) -> CollapsibleState {
        self.core.state.lock().collapse_state
    }

    pub fn set_collapsible_state(&self, collapse_state: CollapsibleState) {
        self.core.state.lock().collapse_state = collapse_state;
        self.push();
    }

    pub fn can_reply(&self) -> bool {
        self.core.state.lock().can_reply
    }

    pub fn set_can_reply(&self, can_reply: bool) {
        {
            let mut state = self.core.state.lock();
            if state.can_reply == can_reply {
                return;
            }
            state.can_reply = can_reply;
        }
        self.push();
    }

    pub fn comment_by_unique_id(&self, unique_id: u64) -> Option<Comment> {
        let state = self.core.state.lock();
        state.comments.iter().find(|(id, _)| *id == unique_id).map(|(_, comment)| comment.clone())
    }

    /// Rewrites a comment's body in place, keeping its id. Local only.
    pub(crate) fn edit_comment_body(&self, unique_id: u64, body: String) -> Option<Comment> {
        let mut state = self.core.state.lock();
        let (_, comment) = state.comments.iter_mut().find(|(id, _)| *id == unique_id)?;
        comment.body = body;
        Some(comment.clone())
    }

    pub fn is_disposed(&self) -> bool {
        self.core.disposed.load(Ordering::SeqCst)
    }

    /// Removes the thread from the main side. Later setters are local only.
    pub fn dispose(&self) {
        if self.core.disposed.swap(true, Ordering::SeqCst) {
            return;
        }
        if let Some(siblings) = self.core.siblings.upgrade() {
            siblings.remove(&self.core.handle);
        }
        drop(self.core.main.submit(MainCall::DeleteCommentThread {
            controller: self.core.controller,
            thread: self.core.handle,
        }));
    }

    fn push(&self) {
        if self.is_disposed() {
            return;
        }
        let changes = self.core.state.lock().changes();
        drop(self.core.main.submit(MainCall::UpdateCommentThread {
            controller: self.core.controller,
            thread: self.core.handle,
            thread_id: self.core.thread_id.clone(),
            uri: self.core.uri.clone(),
            changes,
        }));
    }
}

impl std::fmt::Debug for CommentThread {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommentThread").field("handle", &self.core.handle).field("id", &self.core.thread_id).finish()
    }
}

impl std::fmt::Debug for CommentController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommentController").field("handle", &self.core.handle).field("id", &self.core.id).finish()
    }
}
