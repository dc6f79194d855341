use std::sync::Arc;
use std::sync::Weak;

use parking_lot::Mutex;

use viewrpc::Handle;
use viewrpc::WizardPageDetails;

use crate::handles::ObjectKey;
use crate::host::Shared;
use crate::proxy::Button;
use crate::proxy::PanelCore;
use crate::proxy::model_view_panel;

struct PageState {
    title: Option<String>,
    description: Option<String>,
    enabled: bool,
    custom_buttons: Option<Vec<Button>>,
}

pub(crate) struct WizardPageCore {
    host: Weak<Shared>,
    handle: Handle,
    panel: PanelCore,
    state: Mutex<PageState>,
}

/// One page of a wizard.
#[derive(Clone)]
pub struct WizardPage {
    core: Arc<WizardPageCore>,
}

model_view_panel!(WizardPage);

impl WizardPage {
    pub(crate) fn new(host: Weak<Shared>, panel: PanelCore, handle: Handle, title: Option<String>) -> Self {
        let state = PageState { title, description: None, enabled: true, custom_buttons: None };
        let core = WizardPageCore { host, handle, panel, state: Mutex::new(state) };
        Self { core: Arc::new(core) }
    }

    pub(crate) fn key(&self) -> ObjectKey {
        ObjectKey::of(&self.core)
    }

    fn attach(&self, _host: &Shared) -> Handle {
        self.core.handle
    }

    fn content_bound(&self, _view_id: &str) {}

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

    pub fn description(&self) -> Option<String> {
        self.core.state.lock().description.clone()
    }

    pub fn set_description(&self, description: impl Into<String>) {
        self.core.state.lock().description = Some(description.into());
        self.push();
    }

    pub fn enabled(&self) -> bool {
        self.core.state.lock().enabled
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.core.state.lock().enabled = enabled;
        self.push();
    }

    /// The model-view id shown on this page.
    pub fn content(&self) -> Option<String> {
        self.core.panel.content_id()
    }

    pub fn set_content(&self, content: impl Into<String>) {
        self.core.panel.replace_content_id(Some(content.into()));
        self.push();
    }

    pub fn custom_buttons(&self) -> Option<Vec<Button>> {
        self.core.state.lock().custom_buttons.clone()
    }

    pub fn set_custom_buttons(&self, buttons: Vec<Button>) {
        self.core.state.lock().custom_buttons = Some(buttons);
        self.push();
    }

    pub(crate) fn details_with(&self, custom_buttons: Option<Vec<Handle>>) -> WizardPageDetails {
        let state = self.core.state.lock();
        WizardPageDetails {
            content: self.core.panel.content_id(),
            custom_buttons,
            enabled: state.enabled,
            title: state.title.clone(),
            description: state.description.clone(),
        }
    }

    fn push(&self) {
        if let Some(host) = self.core.host.upgrade() {
            drop(host.dispatcher().update_wizard_page(self));
        }
    }
}

impl std::fmt::Debug for WizardPage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WizardPage").field("handle", &self.core.handle).field("title", &self.title()).finish()
    }
}
