use std::future::Future;
use std::sync::Arc;
use std::sync::Weak;

use futures::future::BoxFuture;
use parking_lot::Mutex;

use viewrpc::DialogMessage;
use viewrpc::Handle;

use crate::handles::ObjectKey;
use crate::host::Shared;
use crate::operation::BackgroundOperationHandler;
use crate::operation::BackgroundOperationInfo;
use crate::proxy::Button;
use crate::proxy::PanelCore;
use crate::proxy::Tab;
use crate::proxy::Validator;
use crate::proxy::accept;
use crate::proxy::model_view_panel;
use crate::response::Response;

/// What a dialog shows: one model view, or a set of tabs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DialogContent {
    ModelView(String),
    Tabs(Vec<Tab>),
}

#[derive(Default)]
pub(crate) struct DialogState {
    pub(crate) title: Option<String>,
    pub(crate) message: Option<DialogMessage>,
    pub(crate) content: Option<DialogContent>,
    pub(crate) custom_buttons: Option<Vec<Button>>,
    pub(crate) dialog_name: Option<String>,
    pub(crate) is_wide: Option<bool>,
}

pub(crate) struct DialogCore {
    host: Weak<Shared>,
    handle: Handle,
    panel: PanelCore,
    ok_button: Button,
    cancel_button: Button,
    state: Mutex<DialogState>,
    close_validator: Mutex<Option<Validator<()>>>,
    operation: Arc<BackgroundOperationHandler>,
}

/// Snapshot of a dialog's pushable state.
pub(crate) struct DialogSnapshot {
    pub(crate) title: Option<String>,
    pub(crate) is_wide: Option<bool>,
    pub(crate) ok_button: Button,
    pub(crate) cancel_button: Button,
    pub(crate) content: Option<DialogContent>,
    pub(crate) custom_buttons: Option<Vec<Button>>,
    pub(crate) message: Option<DialogMessage>,
}

/// A modal dialog.
#[derive(Clone)]
pub struct Dialog {
    core: Arc<DialogCore>,
}

model_view_panel!(Dialog);

impl Dialog {
    pub(crate) fn new(
        host: Weak<Shared>,
        panel: PanelCore,
        handle: Handle,
        buttons: (Button, Button),
        operation: Arc<BackgroundOperationHandler>,
        state: DialogState,
    ) -> Self {
        let (ok_button, cancel_button) = buttons;
        let core = DialogCore {
            host,
            handle,
            panel,
            ok_button,
            cancel_button,
            state: Mutex::new(state),
            close_validator: Mutex::new(None),
            operation,
        };
        Self { core: Arc::new(core) }
    }

    pub(crate) fn key(&self) -> ObjectKey {
        ObjectKey::of(&self.core)
    }

    fn attach(&self, _host: &Shared) -> Handle {
        self.core.handle
    }

    fn content_bound(&self, view_id: &str) {
        self.core.state.lock().content = Some(DialogContent::ModelView(view_id.to_string()));
    }

    pub fn handle(&self) -> Handle {
        self.core.handle
    }

    pub fn title(&self) -> Option<String> {
        self.core.state.lock().title.clone()
    }

    pub fn set_title(&self, title: impl Into<String>) {
        self.core.state.lock().title = Some(title.into());
        self.push();
    }

    pub fn message(&self) -> Option<DialogMessage> {
        self.core.state.lock().message.clone()
    }

    pub fn set_message(&self, message: Option<DialogMessage>) {
        self.core.state.lock().message = message;
        self.push();
    }

    pub fn content(&self) -> Option<DialogContent> {
        self.core.state.lock().content.clone()
    }

    pub fn set_content(&self, content: DialogContent) {
        self.core.state.lock().content = Some(content);
        self.push();
    }

    pub fn custom_buttons(&self) -> Option<Vec<Button>> {
        self.core.state.lock().custom_buttons.clone()
    }

    pub fn set_custom_buttons(&self, buttons: Vec<Button>) {
        self.core.state.lock().custom_buttons = Some(buttons);
        self.push();
    }

    pub fn is_wide(&self) -> Option<bool> {
        self.core.state.lock().is_wide
    }

    pub fn set_is_wide(&self, is_wide: bool) {
        self.core.state.lock().is_wide = Some(is_wide);
        self.push();
    }

    /// Name the main side uses for telemetry. Sent with `open`.
    pub fn dialog_name(&self) -> Option<String> {
        self.core.state.lock().dialog_name.clone()
    }

    pub fn set_dialog_name(&self, name: impl Into<String>) {
        self.core.state.lock().dialog_name = Some(name.into());
    }

    pub fn ok_button(&self) -> Button {
        self.core.ok_button.clone()
    }

    pub fn cancel_button(&self) -> Button {
        self.core.cancel_button.clone()
    }

    pub fn register_close_validator<F, Fut>(&self, validator: F)
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = bool> + Send + 'static,
    {
        let validator: Validator<()> = Arc::new(move |()| -> BoxFuture<'static, bool> { Box::pin(validator()) });
        *self.core.close_validator.lock() = Some(validator);
    }

    /// Asks the close validator. With none registered, closing is allowed.
    pub fn validate_close(&self) -> BoxFuture<'static, bool> {
        let validator = self.core.close_validator.lock().clone();
        match validator {
            Some(validator) => validator(()),
            None => accept(),
        }
    }

    /// Stores an operation to start when the ok button is clicked.
    pub fn register_operation(&self, info: BackgroundOperationInfo) {
        self.core.operation.register_operation(info);
    }

    pub fn operation_id(&self) -> Option<String> {
        self.core.operation.operation_id()
    }

    /// Shows the dialog. Pushes the full state first.
    pub fn open(&self) -> Response {
        match self.core.host.upgrade() {
            Some(host) => host.dispatcher().open_dialog(self),
            None => Response::failed(crate::response::Error::Disconnected),
        }
    }

    pub fn close(&self) -> Response {
        match self.core.host.upgrade() {
            Some(host) => host.dispatcher().close_dialog(self),
            None => Response::failed(crate::response::Error::Disconnected),
        }
    }

    pub(crate) fn mark_open(&self) {
        self.core.panel.open();
    }

    pub(crate) fn mark_closed(&self) {
        self.core.panel.close();
    }

    pub(crate) fn snapshot(&self) -> DialogSnapshot {
        let state = self.core.state.lock();
        DialogSnapshot {
            title: state.title.clone(),
            is_wide: state.is_wide,
            ok_button: self.core.ok_button.clone(),
            cancel_button: self.core.cancel_button.clone(),
            content: state.content.clone(),
            custom_buttons: state.custom_buttons.clone(),
            message: state.message.clone(),
        }
    }

    fn push(&self) {
        if let Some(host) = self.core.host.upgrade() {
            drop(host.dispatcher().update_dialog(self));
        }
    }
}

impl std::fmt::Debug for Dialog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dialog").field("handle", &self.core.handle).field("title", &self.title()).finish()
    }
}
