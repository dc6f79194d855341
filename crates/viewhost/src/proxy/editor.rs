use std::future::Future;
use std::sync::Arc;
use std::sync::Weak;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;

use futures::future::BoxFuture;
use parking_lot::Mutex;

use viewrpc::EditorOptions;
use viewrpc::Handle;
use viewrpc::ViewColumn;

use crate::handles::ObjectKey;
use crate::host::Shared;
use crate::proxy::PanelCore;
use crate::proxy::ProxyObject;
use crate::proxy::Validator;
use crate::proxy::accept;
use crate::proxy::model_view_panel;
use crate::response;
use crate::response::Response;

pub(crate) struct EditorCore {
    host: Weak<Shared>,
    panel: PanelCore,
    title: String,
    options: EditorOptions,
    dirty: AtomicBool,
    save_handler: Mutex<Option<Validator<()>>>,
}

/// A model-view backed editor.
///
/// Unlike the other proxies it has no handle until it first crosses the
/// boundary: registering content, opening, marking dirty, or subscribing to
/// validity all mint one.
#[derive(Clone)]
pub struct Editor {
    core: Arc<EditorCore>,
}

model_view_panel!(Editor);

impl Editor {
    pub(crate) fn new(host: Weak<Shared>, panel: PanelCore, title: impl Into<String>, options: EditorOptions) -> Self {
        let core = EditorCore {
            host,
            panel,
            title: title.into(),
            options,
            dirty: AtomicBool::new(false),
            save_handler: Mutex::new(None),
        };
        Self { core: Arc::new(core) }
    }

    pub(crate) fn key(&self) -> ObjectKey {
        ObjectKey::of(&self.core)
    }

    /// Returns this editor's handle, minting it if this is the first crossing.
    pub(crate) fn attach(&self, host: &Shared) -> Handle {
        if let Some(handle) = self.core.panel.handle() {
            return handle;
        }
        let handle = host.registry.get_or_assign(&ProxyObject::Editor(self.clone()));
        if self.core.panel.set_handle(handle) {
            self.panel_core().track_validity(host, handle);
        }
        handle
    }

    fn content_bound(&self, _view_id: &str) {}

    /// `None` until the editor first crosses the boundary.
    pub fn handle(&self) -> Option<Handle> {
        self.core.panel.handle()
    }

    pub fn title(&self) -> &str {
        &self.core.title
    }

    pub fn options(&self) -> &EditorOptions {
        &self.core.options
    }

    pub fn is_dirty(&self) -> bool {
        self.core.dirty.load(Ordering::SeqCst)
    }

    pub fn set_dirty(&self, dirty: bool) {
        self.core.dirty.store(dirty, Ordering::SeqCst);
        if let Some(host) = self.core.host.upgrade() {
            let handle = self.attach(&host);
            drop(host.dispatcher().set_dirty(handle, dirty));
        }
    }

    pub fn register_save_handler<F, Fut>(&self, handler: F)
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = bool> + Send + 'static,
    {
        let handler: Validator<()> = Arc::new(move |()| -> BoxFuture<'static, bool> { Box::pin(handler()) });
        *self.core.save_handler.lock() = Some(handler);
    }

    /// Runs the save handler. With none registered, the save succeeds.
    pub fn handle_save(&self) -> BoxFuture<'static, bool> {
        let handler = self.core.save_handler.lock().clone();
        match handler {
            Some(handler) => handler(()),
            None => accept(),
        }
    }

    pub fn open_editor(&self, column: Option<ViewColumn>) -> Response {
        match self.core.host.upgrade() {
            Some(host) => {
                let handle = self.attach(&host);
                self.core.panel.open();
                host.dispatcher().open_editor(self, handle, column)
            }
            None => Response::failed(response::Error::Disconnected),
        }
    }
}

impl std::fmt::Debug for Editor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Editor").field("handle", &self.handle()).field("title", &self.core.title).finish()
    }
}
