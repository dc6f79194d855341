use std::sync::Arc;
use std::sync::OnceLock;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;

use parking_lot::Mutex;

use viewrpc::Handle;

use crate::content::ContentProvider;
use crate::content::ModelView;
use crate::host::Shared;
use crate::proxy::Lifecycle;
use crate::proxy::Registration;
use crate::shape::ExtensionInfo;

struct PanelState {
    content_id: Option<String>,
    lifecycle: Lifecycle,
}

/// State every model-view panel carries.
pub(crate) struct PanelCore {
    view_type: String,
    registration: Registration,
    extension: Option<ExtensionInfo>,
    handle: OnceLock<Handle>,
    valid: Arc<AtomicBool>,
    model_view: Arc<Mutex<Option<ModelView>>>,
    state: Mutex<PanelState>,
}

impl PanelCore {
    pub(crate) fn eager(view_type: impl Into<String>, extension: Option<ExtensionInfo>, handle: Handle) -> Self {
        let core = Self::new(view_type, Registration::Eager, extension, Lifecycle::Registered);
        let _ = core.handle.set(handle);
        core
    }

    pub(crate) fn on_first_use(view_type: impl Into<String>, extension: Option<ExtensionInfo>) -> Self {
        Self::new(view_type, Registration::OnFirstUse, extension, Lifecycle::Constructed)
    }

    fn new(view_type: impl Into<String>, registration: Registration, extension: Option<ExtensionInfo>, lifecycle: Lifecycle) -> Self {
        Self {
            view_type: view_type.into(),
            registration,
            extension,
            handle: OnceLock::new(),
            valid: Arc::new(AtomicBool::new(true)),
            model_view: Arc::new(Mutex::new(None)),
            state: Mutex::new(PanelState { content_id: None, lifecycle }),
        }
    }

    pub(crate) fn handle(&self) -> Option<Handle> {
        self.handle.get().copied()
    }

    /// Records a freshly minted handle. Returns false if one was already set.
    pub(crate) fn set_handle(&self, handle: Handle) -> bool {
        if self.handle.set(handle).is_err() {
            return false;
        }
        self.advance(Lifecycle::Registered);
        true
    }

    /// Starts tracking validity notifications for `handle`.
    pub(crate) fn track_validity(&self, host: &Shared, handle: Handle) {
        let valid = self.valid.clone();
        let _ = host.relay.validity_event(handle).subscribe(move |value: &bool| {
            valid.store(*value, Ordering::SeqCst);
        });
    }

    /// Binds content through the registrar. Returns the new view id, or
    /// `None` if the panel already had content.
    pub(crate) fn register_content(&self, host: &Shared, handle: Handle, provider: ContentProvider) -> Option<String> {
        let view_id = format!("{}{}", self.view_type, handle.0);
        if !self.bind_content_id(&view_id) {
            return None;
        }

        let slot = self.model_view.clone();
        let provider: ContentProvider = Arc::new(move |view: ModelView| {
            *slot.lock() = Some(view.clone());
            provider(view)
        });
        host.content.register_provider(&view_id, provider, self.extension.as_ref());
        Some(view_id)
    }

    pub(crate) fn bind_content_id(&self, view_id: &str) -> bool {
        let mut state = self.state.lock();
        if state.content_id.is_some() {
            return false;
        }
        state.content_id = Some(view_id.to_string());
        if state.lifecycle < Lifecycle::ContentBound {
            state.lifecycle = Lifecycle::ContentBound;
        }
        true
    }

    /// Overwrites the content id without the binding guard.
    pub(crate) fn replace_content_id(&self, view_id: Option<String>) {
        let mut state = self.state.lock();
        if view_id.is_some() && state.lifecycle < Lifecycle::ContentBound {
            state.lifecycle = Lifecycle::ContentBound;
        }
        state.content_id = view_id;
    }

    pub(crate) fn content_id(&self) -> Option<String> {
        self.state.lock().content_id.clone()
    }

    pub(crate) fn model_view(&self) -> Option<ModelView> {
        self.model_view.lock().clone()
    }

    pub(crate) fn valid(&self) -> bool {
        self.valid.load(Ordering::SeqCst)
    }

    pub(crate) fn lifecycle(&self) -> Lifecycle {
        self.state.lock().lifecycle
    }

    pub(crate) fn registration(&self) -> Registration {
        self.registration
    }

    /// Moves forward to `to`; never moves back except through `open`/`close`.
    pub(crate) fn advance(&self, to: Lifecycle) {
        let mut state = self.state.lock();
        if state.lifecycle < to {
            state.lifecycle = to;
        }
    }

    pub(crate) fn open(&self) {
        self.state.lock().lifecycle = Lifecycle::Active;
    }

    pub(crate) fn close(&self) {
        self.state.lock().lifecycle = Lifecycle::Closed;
    }
}
