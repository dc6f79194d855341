use std::sync::Arc;
use std::sync::Weak;

use parking_lot::Mutex;

use viewrpc::ButtonDetails;
use viewrpc::Handle;

use crate::event::Emitter;
use crate::event::Event;
use crate::handles::ObjectKey;
use crate::host::Shared;

struct ButtonState {
    label: String,
    enabled: bool,
    hidden: bool,
    focused: Option<bool>,
}

pub(crate) struct ButtonCore {
    host: Weak<Shared>,
    handle: Handle,
    state: Mutex<ButtonState>,
    click: Emitter<()>,
}

/// A push button on a dialog, wizard or page.
#[derive(Clone)]
pub struct Button {
    core: Arc<ButtonCore>,
}

impl Button {
    pub(crate) fn new(host: Weak<Shared>, handle: Handle, label: impl Into<String>) -> Self {
        let core = ButtonCore {
            host,
            handle,
            state: Mutex::new(ButtonState { label: label.into(), enabled: true, hidden: false, focused: None }),
            click: Emitter::new(),
        };
        Self { core: Arc::new(core) }
    }

    pub(crate) fn key(&self) -> ObjectKey {
        ObjectKey::of(&self.core)
    }

    pub(crate) fn click_emitter(&self) -> Emitter<()> {
        self.core.click.clone()
    }

    pub fn handle(&self) -> Handle {
        self.core.handle
    }

    pub fn label(&self) -> String {
        self.core.state.lock().label.clone()
    }

    pub fn set_label(&self, label: impl Into<String>) {
        self.core.state.lock().label = label.into();
        self.push();
    }

    pub fn enabled(&self) -> bool {
        self.core.state.lock().enabled
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.core.state.lock().enabled = enabled;
        self.push();
    }

    pub fn hidden(&self) -> bool {
        self.core.state.lock().hidden
    }

    pub fn set_hidden(&self, hidden: bool) {
        self.core.state.lock().hidden = hidden;
        self.push();
    }

    /// Asks the main side to focus this button. Focus is a one-shot request:
    /// it goes out in one push and is not part of later snapshots.
    pub fn focus(&self) {
        self.core.state.lock().focused = Some(true);
        self.push();
        self.core.state.lock().focused = None;
    }

    pub fn on_click(&self) -> Event<()> {
        self.core.click.event()
    }

    pub(crate) fn details(&self) -> ButtonDetails {
        let state = self.core.state.lock();
        ButtonDetails {
            label: state.label.clone(),
            enabled: state.enabled,
            hidden: state.hidden,
            focused: state.focused,
        }
    }

    fn push(&self) {
        if let Some(host) = self.core.host.upgrade() {
            drop(host.dispatcher().update_button(self));
        }
    }
}

impl std::fmt::Debug for Button {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Button").field("handle", &self.core.handle).field("label", &self.label()).finish()
    }
}
