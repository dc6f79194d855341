//! # Payload Records
//!
//! Plain structured records carried by calls. Every `Set*Details` record is a
//! complete snapshot of one object: sub-objects are referenced by handle and
//! their own state travels in their own records.

use serde::Deserialize;
use serde::Serialize;

use crate::handle::Handle;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MessageLevel {
    Error,
    Warning,
    Information,
}

/// A message shown at the top of a dialog or wizard.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DialogMessage {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<MessageLevel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl DialogMessage {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into(), level: None, description: None }
    }

    pub fn with_level(mut self, level: MessageLevel) -> Self {
        self.level = Some(level);
        self
    }
}

/// Dialog content: either a single model view id or a list of tab handles.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DialogContentDetails {
    ModelView(String),
    Tabs(Vec<Handle>),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DialogDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_wide: Option<bool>,
    pub ok_button: Handle,
    pub cancel_button: Handle,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<DialogContentDetails>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_buttons: Option<Vec<Handle>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<DialogMessage>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ButtonDetails {
    pub label: String,
    pub enabled: bool,
    pub hidden: bool,
    /// Only ever `Some(true)`: focus is a one-shot request, never state.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub focused: Option<bool>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WizardDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub pages: Vec<Handle>,
    pub current_page: usize,
    pub done_button: Handle,
    pub cancel_button: Handle,
    pub generate_script_button: Handle,
    pub next_button: Handle,
    pub back_button: Handle,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_buttons: Option<Vec<Handle>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<DialogMessage>,
    pub display_page_titles: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WizardPageDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_buttons: Option<Vec<Handle>>,
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Describes a wizard navigation from one page index to another.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WizardPageChangeInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_page: Option<usize>,
    pub new_page: usize,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retain_context_when_hidden: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supports_save: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_name: Option<String>,
}

/// Editor column the main side should open an editor in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ViewColumn(pub i32);

// ============================================================================
//  COMMENTS
// ============================================================================

/// Zero-based text range inside a document.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Range {
    pub start_line: u32,
    pub start_character: u32,
    pub end_line: u32,
    pub end_character: u32,
}

impl Range {
    pub fn new(start_line: u32, start_character: u32, end_line: u32, end_character: u32) -> Self {
        Self { start_line, start_character, end_line, end_character }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CollapsibleState {
    #[default]
    Collapsed,
    Expanded,
}

/// A comment as rendered by the main side, keyed by its id within the thread.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentPayload {
    pub unique_id_in_thread: u64,
    pub body: String,
    pub user_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_value: Option<String>,
}

/// Full state of a comment thread.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentThreadChanges {
    pub range: Range,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_value: Option<String>,
    pub comments: Vec<CommentPayload>,
    pub collapse_state: CollapsibleState,
    pub can_reply: bool,
}
