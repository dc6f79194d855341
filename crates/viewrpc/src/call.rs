//! # Calls
//!
//! The two directions of the protocol, each as one closed enum.
//!
//! - `MainCall`: extension host → main thread. Mutations and lifecycle
//!   directives for objects rendered on the main side.
//! - `HostCall`: main thread → extension host. Notifications about user
//!   actions plus the three yes/no requests (close, navigate, save).
//!
//! Every call is addressed by handle. On the wire a call is
//! `{"method": "...", "params": {...}}`.

use serde::Deserialize;
use serde::Serialize;

use crate::details::ButtonDetails;
use crate::details::CommentThreadChanges;
use crate::details::DialogDetails;
use crate::details::EditorOptions;
use crate::details::Range;
use crate::details::TabDetails;
use crate::details::ViewColumn;
use crate::details::WizardDetails;
use crate::details::WizardPageChangeInfo;
use crate::details::WizardPageDetails;
use crate::handle::Handle;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", content = "params", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum MainCall {
    OpenDialog {
        handle: Handle,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
    },
    CloseDialog { handle: Handle },
    SetDialogDetails { handle: Handle, details: DialogDetails },
    SetTabDetails { handle: Handle, details: TabDetails },
    SetButtonDetails { handle: Handle, details: ButtonDetails },
    SetWizardDetails { handle: Handle, details: WizardDetails },
    SetWizardPageDetails { handle: Handle, details: WizardPageDetails },
    AddWizardPage {
        wizard: Handle,
        page: Handle,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        index: Option<usize>,
    },
    RemoveWizardPage { wizard: Handle, index: usize },
    SetWizardPage { wizard: Handle, index: usize },
    OpenWizard { handle: Handle },
    CloseWizard { handle: Handle },
    OpenEditor {
        handle: Handle,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        content_id: Option<String>,
        title: String,
        options: EditorOptions,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        column: Option<ViewColumn>,
    },
    SetDirty { handle: Handle, dirty: bool },
    RegisterCommentController { handle: Handle, id: String, label: String },
    UnregisterCommentController { handle: Handle },
    CreateCommentThread {
        controller: Handle,
        thread: Handle,
        thread_id: String,
        uri: String,
        range: Range,
    },
    UpdateCommentThread {
        controller: Handle,
        thread: Handle,
        thread_id: String,
        uri: String,
        changes: CommentThreadChanges,
    },
    DeleteCommentThread { controller: Handle, thread: Handle },
}

impl MainCall {
    /// The wire name of the call, useful for logging.
    pub fn method(&self) -> &'static str {
        match self {
            Self::OpenDialog { .. } => "openDialog",
            Self::CloseDialog { .. } => "closeDialog",
            Self::SetDialogDetails { .. } => "setDialogDetails",
            Self::SetTabDetails { .. } => "setTabDetails",
            Self::SetButtonDetails { .. } => "setButtonDetails",
            Self::SetWizardDetails { .. } => "setWizardDetails",
            Self::SetWizardPageDetails { .. } => "setWizardPageDetails",
            Self::AddWizardPage { .. } => "addWizardPage",
            Self::RemoveWizardPage { .. } => "removeWizardPage",
            Self::SetWizardPage { .. } => "setWizardPage",
            Self::OpenWizard { .. } => "openWizard",
            Self::CloseWizard { .. } => "closeWizard",
            Self::OpenEditor { .. } => "openEditor",
            Self::SetDirty { .. } => "setDirty",
            Self::RegisterCommentController { .. } => "registerCommentController",
            Self::UnregisterCommentController { .. } => "unregisterCommentController",
            Self::CreateCommentThread { .. } => "createCommentThread",
            Self::UpdateCommentThread { .. } => "updateCommentThread",
            Self::DeleteCommentThread { .. } => "deleteCommentThread",
        }
    }

    /// The handle of the object the call is addressed to.
    pub fn target(&self) -> Handle {
        match self {
            Self::OpenDialog { handle, .. }
            | Self::CloseDialog { handle }
            | Self::SetDialogDetails { handle, .. }
            | Self::SetTabDetails { handle, .. }
            | Self::SetButtonDetails { handle, .. }
            | Self::SetWizardDetails { handle, .. }
            | Self::SetWizardPageDetails { handle, .. }
            | Self::OpenWizard { handle }
            | Self::CloseWizard { handle }
            | Self::OpenEditor { handle, .. }
            | Self::SetDirty { handle, .. }
            | Self::RegisterCommentController { handle, .. }
            | Self::UnregisterCommentController { handle } => *handle,
            Self::AddWizardPage { wizard, .. }
            | Self::RemoveWizardPage { wizard, .. }
            | Self::SetWizardPage { wizard, .. } => *wizard,
            Self::CreateCommentThread { thread, .. }
            | Self::UpdateCommentThread { thread, .. }
            | Self::DeleteCommentThread { thread, .. } => *thread,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", content = "params", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum HostCall {
    OnButtonClick { handle: Handle },
    OnPanelValidityChanged { handle: Handle, valid: bool },
    OnWizardPageChanged { handle: Handle, info: WizardPageChangeInfo },
    UpdateWizardPageInfo { handle: Handle, pages: Vec<Handle>, current_page: usize },
    ValidateNavigation { handle: Handle, info: WizardPageChangeInfo },
    ValidateDialogClose { handle: Handle },
    HandleSave { handle: Handle },
    CreateCommentThreadTemplate { controller: Handle, uri: String, range: Range },
    UpdateCommentThreadTemplate { controller: Handle, thread: Handle, range: Range },
    DeleteCommentThread { controller: Handle, thread: Handle },
    ExecuteCommand {
        id: String,
        #[serde(default)]
        args: Vec<serde_json::Value>,
    },
}

impl HostCall {
    pub fn method(&self) -> &'static str {
        match self {
            Self::OnButtonClick { .. } => "onButtonClick",
            Self::OnPanelValidityChanged { .. } => "onPanelValidityChanged",
            Self::OnWizardPageChanged { .. } => "onWizardPageChanged",
            Self::UpdateWizardPageInfo { .. } => "updateWizardPageInfo",
            Self::ValidateNavigation { .. } => "validateNavigation",
            Self::ValidateDialogClose { .. } => "validateDialogClose",
            Self::HandleSave { .. } => "handleSave",
            Self::CreateCommentThreadTemplate { .. } => "createCommentThreadTemplate",
            Self::UpdateCommentThreadTemplate { .. } => "updateCommentThreadTemplate",
            Self::DeleteCommentThread { .. } => "deleteCommentThread",
            Self::ExecuteCommand { .. } => "executeCommand",
        }
    }

    /// Whether the caller is waiting on a meaningful answer rather than an ack.
    pub fn is_request(&self) -> bool {
        matches!(
            self,
            Self::ValidateNavigation { .. }
                | Self::ValidateDialogClose { .. }
                | Self::HandleSave { .. }
                | Self::ExecuteCommand { .. }
        )
    }
}

/// A call tagged with the side that serves it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "target", content = "call", rename_all = "camelCase")]
pub enum Invocation {
    MainThread(MainCall),
    ExtHost(HostCall),
}

impl Invocation {
    pub fn method(&self) -> &'static str {
        match self {
            Self::MainThread(call) => call.method(),
            Self::ExtHost(call) => call.method(),
        }
    }
}

impl From<MainCall> for Invocation {
    fn from(call: MainCall) -> Self {
        Self::MainThread(call)
    }
}

impl From<HostCall> for Invocation {
    fn from(call: HostCall) -> Self {
        Self::ExtHost(call)
    }
}
