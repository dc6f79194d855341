//! # Main-Thread Mirror
//!
//! A headless model of the main side. It applies every `MainCall` to plain
//! per-handle records and plays the user: clicking, validating, navigating,
//! closing and saving through the extension host's inbound calls.
//!
//! Wizard page lists are owned here once calls arrive. Every change to one is
//! reported back with `UpdateWizardPageInfo`, and `SetWizardPage` is reported
//! back as a page change.

use std::sync::Arc;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

use dashmap::DashMap;
use futures::future::BoxFuture;
use futures::future::ready;
use tracing::debug;

use viewrpc::ButtonDetails;
use viewrpc::CommentThreadChanges;
use viewrpc::DialogDetails;
use viewrpc::EditorOptions;
use viewrpc::FailureReason;
use viewrpc::Handle;
use viewrpc::HostCall;
use viewrpc::Invocation;
use viewrpc::MainCall;
use viewrpc::Range;
use viewrpc::ReplyStatus;
use viewrpc::TabDetails;
use viewrpc::ViewColumn;
use viewrpc::WizardDetails;
use viewrpc::WizardPageChangeInfo;
use viewrpc::WizardPageDetails;

use crate::peer::Handler;
use crate::response;
use crate::response::Response;
use crate::shape::ExtHostProxy;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct DialogView {
    pub details: Option<DialogDetails>,
    pub name: Option<String>,
    pub open: bool,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct WizardView {
    pub details: Option<WizardDetails>,
    pub pages: Vec<Handle>,
    pub current_page: usize,
    pub open: bool,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct EditorView {
    pub content_id: Option<String>,
    pub title: String,
    pub options: EditorOptions,
    pub column: Option<ViewColumn>,
    pub dirty: bool,
    pub open: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CommentControllerView {
    pub id: String,
    pub label: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CommentThreadView {
    pub controller: Handle,
    pub thread_id: String,
    pub uri: String,
    pub range: Range,
    pub changes: Option<CommentThreadChanges>,
}

pub struct MainThreadMirror {
    ext_host: Arc<dyn ExtHostProxy>,
    dialogs: DashMap<Handle, DialogView>,
    tabs: DashMap<Handle, TabDetails>,
    buttons: DashMap<Handle, ButtonDetails>,
    wizards: DashMap<Handle, WizardView>,
    pages: DashMap<Handle, WizardPageDetails>,
    editors: DashMap<Handle, EditorView>,
    controllers: DashMap<Handle, CommentControllerView>,
    threads: DashMap<Handle, CommentThreadView>,
    applied: AtomicU64,
}

impl MainThreadMirror {
    pub fn new(ext_host: Arc<dyn ExtHostProxy>) -> Self {
        Self {
            ext_host,
            dialogs: DashMap::new(),
            tabs: DashMap::new(),
            buttons: DashMap::new(),
            wizards: DashMap::new(),
            pages: DashMap::new(),
            editors: DashMap::new(),
            controllers: DashMap::new(),
            threads: DashMap::new(),
            applied: AtomicU64::new(0),
        }
    }

    /// Number of calls applied successfully.
    pub fn applied(&self) -> u64 {
        self.applied.load(Ordering::SeqCst)
    }

    pub fn dialog(&self, handle: Handle) -> Option<DialogView> {
        self.dialogs.get(&handle).map(|entry| entry.clone())
    }

    pub fn tab(&self, handle: Handle) -> Option<TabDetails> {
        self.tabs.get(&handle).map(|entry| entry.clone())
    }

    pub fn button(&self, handle: Handle) -> Option<ButtonDetails> {
        self.buttons.get(&handle).map(|entry| entry.clone())
    }

    pub fn wizard(&self, handle: Handle) -> Option<WizardView> {
        self.wizards.get(&handle).map(|entry| entry.clone())
    }

    pub fn page(&self, handle: Handle) -> Option<WizardPageDetails> {
        self.pages.get(&handle).map(|entry| entry.clone())
    }

    pub fn editor(&self, handle: Handle) -> Option<EditorView> {
        self.editors.get(&handle).map(|entry| entry.clone())
    }

    pub fn comment_controller(&self, handle: Handle) -> Option<CommentControllerView> {
        self.controllers.get(&handle).map(|entry| entry.clone())
    }

    pub fn comment_thread(&self, handle: Handle) -> Option<CommentThreadView> {
        self.threads.get(&handle).map(|entry| entry.clone())
    }

    /// Applies one call to the model.
    pub fn apply(&self, call: MainCall) -> ReplyStatus {
        let method = call.method();
        let result = self.apply_inner(call);
        match &result {
            Ok(_) => {
                self.applied.fetch_add(1, Ordering::SeqCst);
            }
            Err(reason) => debug!(method, "mirror rejected call: {}", reason),
        }
        result
    }

    fn apply_inner(&self, call: MainCall) -> ReplyStatus {
        match call {
            MainCall::OpenDialog { handle, name } => {
                let mut view = self.dialogs.entry(handle).or_default();
                view.open = true;
                view.name = name;
            }
            MainCall::CloseDialog { handle } => {
                self.dialogs.entry(handle).or_default().open = false;
            }
            MainCall::SetDialogDetails { handle, details } => {
                self.dialogs.entry(handle).or_default().details = Some(details);
            }
            MainCall::SetTabDetails { handle, details } => {
                self.tabs.insert(handle, details);
            }
            MainCall::SetButtonDetails { handle, details } => {
                self.buttons.insert(handle, details);
            }
            MainCall::SetWizardDetails { handle, details } => {
                let mut view = self.wizards.entry(handle).or_default();
                view.pages = details.pages.clone();
                view.current_page = details.current_page;
                view.details = Some(details);
            }
            MainCall::SetWizardPageDetails { handle, details } => {
                self.pages.insert(handle, details);
            }
            MainCall::AddWizardPage { wizard, page, index } => {
                let (pages, current_page) = {
                    let mut view = self.wizards.entry(wizard).or_default();
                    let at = index.map_or(view.pages.len(), |index| index.min(view.pages.len()));
                    view.pages.insert(at, page);
                    (view.pages.clone(), view.current_page)
                };
                self.report(HostCall::UpdateWizardPageInfo { handle: wizard, pages, current_page });
            }
            MainCall::RemoveWizardPage { wizard, index } => {
                let (pages, current_page) = {
                    let mut view = self.wizards.entry(wizard).or_default();
                    let len = view.pages.len();
                    if index >= len {
                        return Err(FailureReason::InvalidIndex { index, len });
                    }
                    view.pages.remove(index);
                    if view.current_page >= view.pages.len() {
                        view.current_page = view.pages.len().saturating_sub(1);
                    }
                    (view.pages.clone(), view.current_page)
                };
                self.report(HostCall::UpdateWizardPageInfo { handle: wizard, pages, current_page });
            }
            MainCall::SetWizardPage { wizard, index } => {
                let info = {
                    let mut view = self.wizards.entry(wizard).or_default();
                    let len = view.pages.len();
                    if index >= len {
                        return Err(FailureReason::InvalidIndex { index, len });
                    }
                    let info = WizardPageChangeInfo { last_page: Some(view.current_page), new_page: index };
                    view.current_page = index;
                    info
                };
                self.report(HostCall::OnWizardPageChanged { handle: wizard, info });
            }
            MainCall::OpenWizard { handle } => {
                self.wizards.entry(handle).or_default().open = true;
            }
            MainCall::CloseWizard { handle } => {
                self.wizards.entry(handle).or_default().open = false;
            }
            MainCall::OpenEditor { handle, content_id, title, options, column } => {
                let mut view = self.editors.entry(handle).or_default();
                view.content_id = content_id;
                view.title = title;
                view.options = options;
                view.column = column;
                view.open = true;
            }
            MainCall::SetDirty { handle, dirty } => {
                self.editors.entry(handle).or_default().dirty = dirty;
            }
            MainCall::RegisterCommentController { handle, id, label } => {
                self.controllers.insert(handle, CommentControllerView { id, label });
            }
            MainCall::UnregisterCommentController { handle } => {
                self.controllers.remove(&handle);
                self.threads.retain(|_, thread| thread.controller != handle);
            }
            MainCall::CreateCommentThread { controller, thread, thread_id, uri, range } => {
                if !self.controllers.contains_key(&controller) {
                    return Err(FailureReason::UnsupportedTarget);
                }
                let view = CommentThreadView { controller, thread_id, uri, range, changes: None };
                self.threads.insert(thread, view);
            }
            MainCall::UpdateCommentThread { thread, changes, .. } => {
                let Some(mut view) = self.threads.get_mut(&thread) else {
                    return Err(FailureReason::UnsupportedTarget);
                };
                view.range = changes.range;
                view.changes = Some(changes);
            }
            MainCall::DeleteCommentThread { thread, .. } => {
                self.threads.remove(&thread);
            }
        }
        Ok(serde_json::Value::Null)
    }

    /// Sends a notification back without waiting on it. Must not be called
    /// while holding a table entry.
    fn report(&self, call: HostCall) {
        drop(self.ext_host.request(call));
    }

    // ========================================================================
    //  USER ACTIONS
    // ========================================================================

    pub fn click(&self, button: Handle) -> Response {
        self.ext_host.request(HostCall::OnButtonClick { handle: button })
    }

    pub fn set_panel_validity(&self, panel: Handle, valid: bool) -> Response {
        self.ext_host.request(HostCall::OnPanelValidityChanged { handle: panel, valid })
    }

    /// Asks to close a dialog; closes it locally if the validator agrees.
    pub async fn request_close(&self, dialog: Handle) -> response::Result<bool> {
        let allowed: bool = self.ext_host.request(HostCall::ValidateDialogClose { handle: dialog }).decode().await?;
        if allowed {
            if let Some(mut view) = self.dialogs.get_mut(&dialog) {
                view.open = false;
            }
        }
        Ok(allowed)
    }

    /// Moves a wizard to page `to` if the navigation validator agrees.
    pub async fn navigate(&self, wizard: Handle, to: usize) -> response::Result<bool> {
        let last_page = self.wizards.get(&wizard).map(|view| view.current_page);
        let info = WizardPageChangeInfo { last_page, new_page: to };

        let allowed: bool = self.ext_host.request(HostCall::ValidateNavigation { handle: wizard, info }).decode().await?;
        if allowed {
            self.wizards.entry(wizard).or_default().current_page = to;
            self.ext_host.request(HostCall::OnWizardPageChanged { handle: wizard, info }).acked().await?;
        }
        Ok(allowed)
    }

    /// Saves an editor; clears its dirty flag if the save handler succeeds.
    pub async fn save(&self, editor: Handle) -> response::Result<bool> {
        let saved: bool = self.ext_host.request(HostCall::HandleSave { handle: editor }).decode().await?;
        if saved {
            if let Some(mut view) = self.editors.get_mut(&editor) {
                view.dirty = false;
            }
        }
        Ok(saved)
    }

    pub fn execute_command(&self, id: impl Into<String>, args: Vec<serde_json::Value>) -> Response {
        self.ext_host.request(HostCall::ExecuteCommand { id: id.into(), args })
    }
}

impl Handler for MainThreadMirror {
    fn handle(&self, invocation: Invocation) -> BoxFuture<'static, ReplyStatus> {
        let status = match invocation {
            Invocation::MainThread(call) => self.apply(call),
            Invocation::ExtHost(_) => Err(FailureReason::UnsupportedTarget),
        };
        Box::pin(ready(status))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use parking_lot::Mutex;

    #[derive(Default)]
    struct RecordingExtHost {
        calls: Mutex<Vec<HostCall>>,
    }

    impl ExtHostProxy for RecordingExtHost {
        fn request(&self, call: HostCall) -> Response {
            let answer = match call {
                HostCall::ValidateNavigation { info, .. } => serde_json::json!(info.new_page != 2),
                HostCall::ValidateDialogClose { .. } | HostCall::HandleSave { .. } => serde_json::json!(true),
                _ => serde_json::Value::Null,
            };
            self.calls.lock().push(call);
            Response::ready(answer)
        }
    }

    fn mirror() -> (Arc<RecordingExtHost>, MainThreadMirror) {
        let ext = Arc::new(RecordingExtHost::default());
        (ext.clone(), MainThreadMirror::new(ext))
    }

    #[test]
    fn test_add_page_echoes_page_info() {
        let (ext, mirror) = mirror();
        let wizard = Handle(10);

        mirror.apply(MainCall::AddWizardPage { wizard, page: Handle(1), index: None }).expect("append");
        mirror.apply(MainCall::AddWizardPage { wizard, page: Handle(2), index: Some(0) }).expect("insert");

        assert_eq!(mirror.wizard(wizard).expect("wizard").pages, vec![Handle(2), Handle(1)]);
        let last = ext.calls.lock().last().cloned();
        assert_eq!(last, Some(HostCall::UpdateWizardPageInfo {
            handle: wizard,
            pages: vec![Handle(2), Handle(1)],
            current_page: 0,
        }));
    }

    #[test]
    fn test_out_of_range_is_rejected() {
        let (_ext, mirror) = mirror();
        let wizard = Handle(10);
        mirror.apply(MainCall::AddWizardPage { wizard, page: Handle(1), index: None }).expect("append");

        let status = mirror.apply(MainCall::RemoveWizardPage { wizard, index: 3 });
        assert_eq!(status, Err(FailureReason::InvalidIndex { index: 3, len: 1 }));
        let status = mirror.apply(MainCall::SetWizardPage { wizard, index: 1 });
        assert_eq!(status, Err(FailureReason::InvalidIndex { index: 1, len: 1 }));
        assert_eq!(mirror.applied(), 1);
    }

    #[test]
    fn test_set_wizard_page_reports_change() {
        let (ext, mirror) = mirror();
        let wizard = Handle(10);
        for page in [1, 2, 3] {
            mirror.apply(MainCall::AddWizardPage { wizard, page: Handle(page), index: None }).expect("append");
        }

        mirror.apply(MainCall::SetWizardPage { wizard, index: 2 }).expect("in range");
        let last = ext.calls.lock().last().cloned();
        assert_eq!(last, Some(HostCall::OnWizardPageChanged {
            handle: wizard,
            info: WizardPageChangeInfo { last_page: Some(0), new_page: 2 },
        }));
    }

    #[tokio::test]
    async fn test_navigation_respects_validator() {
        let (_ext, mirror) = mirror();
        let wizard = Handle(10);
        for page in [1, 2, 3] {
            mirror.apply(MainCall::AddWizardPage { wizard, page: Handle(page), index: None }).expect("append");
        }

        assert!(mirror.navigate(wizard, 1).await.expect("navigate"));
        assert_eq!(mirror.wizard(wizard).expect("wizard").current_page, 1);
        assert!(!mirror.navigate(wizard, 2).await.expect("navigate"));
        assert_eq!(mirror.wizard(wizard).expect("wizard").current_page, 1);
    }

    #[test]
    fn test_threads_need_a_controller() {
        let (_ext, mirror) = mirror();
        let create = MainCall::CreateCommentThread {
            controller: Handle(0),
            thread: Handle(0),
            thread_id: "review.0".into(),
            uri: "file:///a.sql".into(),
            range: Range::default(),
        };
        assert_eq!(mirror.apply(create.clone()), Err(FailureReason::UnsupportedTarget));

        mirror
            .apply(MainCall::RegisterCommentController { handle: Handle(0), id: "review".into(), label: "Review".into() })
            .expect("register");
        mirror.apply(create).expect("create");
        assert!(mirror.comment_thread(Handle(0)).is_some());

        mirror.apply(MainCall::UnregisterCommentController { handle: Handle(0) }).expect("unregister");
        assert!(mirror.comment_thread(Handle(0)).is_none());
    }
}
