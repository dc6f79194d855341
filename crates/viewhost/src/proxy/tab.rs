use std::sync::Arc;
use std::sync::Weak;

use parking_lot::Mutex;

use viewrpc::Handle;
use viewrpc::TabDetails;

use crate::handles::ObjectKey;
use crate::host::Shared;
use crate::proxy::PanelCore;
use crate::proxy::model_view_panel;

pub(crate) struct TabCore {
    host: Weak<Shared>,
    handle: Handle,
    panel: PanelCore,
    title: Mutex<Option<String>>,
}

/// One tab of a tabbed dialog.
#[derive(Clone)]
pub struct Tab {
    core: Arc<TabCore>,
}

model_view_panel!(Tab);

impl Tab {
    pub(crate) fn new(host: Weak<Shared>, panel: PanelCore, handle: Handle, title: Option<String>) -> Self {
        let core = TabCore { host, handle, panel, title: Mutex::new(title) };
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
        self.core.title.lock().clone()
    }

    pub fn set_title(&self, title: impl Into<String>) {
        *self.core.title.lock() = Some(title.into());
        self.push();
    }

    /// The model-view id shown in this tab.
    pub fn content(&self) -> Option<String> {
        self.core.panel.content_id()
    }

    pub fn set_content(&self, content: impl Into<String>) {
        self.core.panel.replace_content_id(Some(content.into()));
        self.push();
    }

    pub(crate) fn details(&self) -> TabDetails {
        TabDetails { title: self.title(), content: self.content() }
    }

    fn push(&self) {
        if let Some(host) = self.core.host.upgrade() {
            drop(host.dispatcher().update_tab(self));
        }
    }
}

impl std::fmt::Debug for Tab {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tab").field("handle", &self.core.handle).field("title", &self.title()).finish()
    }
}
