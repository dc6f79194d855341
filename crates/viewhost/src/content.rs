//! # Content Providers
//!
//! A panel's content is drawn by a provider registered under the panel's
//! model-view id. When the main side opens that view, the provider runs with
//! the `ModelView` it was given.

use std::sync::Arc;

use dashmap::DashMap;
use futures::future::BoxFuture;
use parking_lot::Mutex;

use crate::shape::ExtensionInfo;

/// The view a content provider draws into.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModelView {
    pub id: String,
}

impl ModelView {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

pub type ContentProvider = Arc<dyn Fn(ModelView) -> BoxFuture<'static, ()> + Send + Sync>;

/// Where panels register their content providers.
pub trait ModelViewRegistrar: Send + Sync + 'static {
    fn register_provider(&self, view_id: &str, provider: ContentProvider, extension: Option<&ExtensionInfo>);
}

/// In-process registrar: keeps every provider and runs it on `open_view`.
#[derive(Default)]
pub struct ViewProviders {
    providers: DashMap<String, (ContentProvider, Option<ExtensionInfo>)>,
    order: Mutex<Vec<String>>,
}

impl ViewProviders {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_registered(&self, view_id: &str) -> bool {
        self.providers.contains_key(view_id)
    }

    /// View ids in registration order, one entry per `register_provider` call.
    pub fn registrations(&self) -> Vec<String> {
        self.order.lock().clone()
    }

    pub fn extension_of(&self, view_id: &str) -> Option<ExtensionInfo> {
        self.providers.get(view_id).and_then(|entry| entry.1.clone())
    }

    /// Runs the provider for `view_id`. Returns false if none is registered.
    pub async fn open_view(&self, view_id: &str) -> bool {
        let provider = match self.providers.get(view_id) {
            Some(entry) => entry.0.clone(),
            None => return false,
        };
        provider(ModelView::new(view_id)).await;
        true
    }
}

impl ModelViewRegistrar for ViewProviders {
    fn register_provider(&self, view_id: &str, provider: ContentProvider, extension: Option<&ExtensionInfo>) {
        self.providers.insert(view_id.to_string(), (provider, extension.cloned()));
        self.order.lock().push(view_id.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::AtomicUsize;
    use std::sync::atomic::Ordering;

    #[tokio::test]
    async fn test_open_view_runs_provider() {
        let providers = ViewProviders::new();
        let runs = Arc::new(AtomicUsize::new(0));

        let counter = runs.clone();
        let provider: ContentProvider = Arc::new(move |view: ModelView| -> BoxFuture<'static, ()> {
            assert_eq!(view.id, "modelViewDialog0");
            let counter = counter.clone();
            Box::pin(async move {
                counter.fetch_add(1, Ordering::SeqCst);
            })
        });
        providers.register_provider("modelViewDialog0", provider, Some(&ExtensionInfo::new("ext")));

        assert!(providers.open_view("modelViewDialog0").await);
        assert!(!providers.open_view("modelViewDialog1").await);
        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert_eq!(providers.extension_of("modelViewDialog0"), Some(ExtensionInfo::new("ext")));
    }
}
