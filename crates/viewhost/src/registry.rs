//! # Handle Registry
//!
//! Bidirectional map between live proxies and the handles that name them on
//! the wire.
//!
//! ## Invariants
//!
//! - **Stable**: once an object has a handle, every lookup returns it.
//! - **Unique**: two distinct objects never share a handle.
//! - **Monotonic**: handles come from one allocator and are never reused.
//! - **Retained**: the registry holds its objects for the life of the host.
//!   Nothing is ever removed.

use dashmap::DashMap;

use viewrpc::Handle;

use crate::handles::HandleAllocator;
use crate::handles::ObjectKey;
use crate::proxy::Button;
use crate::proxy::Dialog;
use crate::proxy::Editor;
use crate::proxy::ProxyObject;
use crate::proxy::Tab;
use crate::proxy::Wizard;
use crate::proxy::WizardPage;

pub struct HandleRegistry {
    allocator: HandleAllocator,
    by_key: DashMap<ObjectKey, Handle>,
    by_handle: DashMap<Handle, ProxyObject>,
}

impl HandleRegistry {
    pub fn new(allocator: HandleAllocator) -> Self {
        Self { allocator, by_key: DashMap::new(), by_handle: DashMap::new() }
    }

    /// Returns the object's handle, minting one on first sight.
    pub fn get_or_assign(&self, object: &ProxyObject) -> Handle {
        let key = object.key();
        if let Some(handle) = self.by_key.get(&key) {
            return *handle;
        }
        *self.by_key.entry(key).or_insert_with(|| {
            let handle = self.allocator.allocate();
            self.by_handle.insert(handle, object.clone());
            handle
        })
    }

    /// Mints a handle for an object that is about to be built around it.
    /// Must be followed by `bind` before the handle is handed out.
    pub(crate) fn reserve(&self) -> Handle {
        self.allocator.allocate()
    }

    pub(crate) fn bind(&self, handle: Handle, object: ProxyObject) {
        self.by_key.insert(object.key(), handle);
        self.by_handle.insert(handle, object);
    }

    pub fn lookup(&self, object: &ProxyObject) -> Option<Handle> {
        self.by_key.get(&object.key()).map(|handle| *handle)
    }

    pub fn resolve(&self, handle: Handle) -> Option<ProxyObject> {
        self.by_handle.get(&handle).map(|object| object.clone())
    }

    pub fn resolve_button(&self, handle: Handle) -> Option<Button> {
        match self.resolve(handle)? {
            ProxyObject::Button(button) => Some(button),
            _ => None,
        }
    }

    pub fn resolve_dialog(&self, handle: Handle) -> Option<Dialog> {
        match self.resolve(handle)? {
            ProxyObject::Dialog(dialog) => Some(dialog),
            _ => None,
        }
    }

    pub fn resolve_tab(&self, handle: Handle) -> Option<Tab> {
        match self.resolve(handle)? {
            ProxyObject::Tab(tab) => Some(tab),
            _ => None,
        }
    }

    pub fn resolve_wizard(&self, handle: Handle) -> Option<Wizard> {
        match self.resolve(handle)? {
            ProxyObject::Wizard(wizard) => Some(wizard),
            _ => None,
        }
    }

    pub fn resolve_wizard_page(&self, handle: Handle) -> Option<WizardPage> {
        match self.resolve(handle)? {
            ProxyObject::WizardPage(page) => Some(page),
            _ => None,
        }
    }

    pub fn resolve_editor(&self, handle: Handle) -> Option<Editor> {
        match self.resolve(handle)? {
            ProxyObject::Editor(editor) => Some(editor),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.by_handle.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_handle.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;

    use crate::host::ModelViewDialogHost;
    use crate::testing::RecordingMainThread;

    fn host() -> ModelViewDialogHost {
        ModelViewDialogHost::new(Arc::new(RecordingMainThread::new()))
    }

    #[test]
    fn test_eager_objects_are_bound_at_creation() {
        let host = host();
        let button = host.create_button("Ok");
        let tab = host.create_tab("Tab", None);

        assert_eq!(host.registry().lookup(&button.clone().into()), Some(button.handle()));
        assert_eq!(host.registry().resolve_tab(tab.handle()), Some(tab));
        assert_eq!(host.registry().len(), 2);
    }

    #[test]
    fn test_resolve_checks_kind() {
        let host = host();
        let button = host.create_button("Ok");

        assert!(host.registry().resolve_button(button.handle()).is_some());
        assert!(host.registry().resolve_wizard(button.handle()).is_none());
        assert!(host.registry().resolve(Handle(500)).is_none());
    }

    #[test]
    fn test_lazy_objects_get_one_handle() {
        let host = host();
        let editor = host.create_model_view_editor("Editor", None, None);
        let object: ProxyObject = editor.clone().into();
        assert!(host.registry().lookup(&object).is_none());

        let first = host.registry().get_or_assign(&object);
        let second = host.registry().get_or_assign(&editor.into());
        assert_eq!(first, second);
        assert_eq!(host.registry().resolve_editor(first).map(|editor| editor.title().to_string()), Some("Editor".into()));
    }

    #[test]
    fn test_handles_are_never_reused() {
        let host = host();
        let handles: Vec<Handle> = (0..5).map(|i| host.create_button(format!("b{}", i)).handle()).collect();
        assert_eq!(handles, (0..5).map(Handle).collect::<Vec<_>>());
    }
}
