//! # Proxy Objects
//!
//! Local stand-ins for UI objects rendered on the main side. Each public type
//! is a cheap, cloneable facade over an `Arc` core; clones share state and
//! identity. Setters update local state and push a full snapshot.
//!
//! ## Invariants
//!
//! - A proxy holds its host weakly. Once the host is gone, setters still
//!   update local state but nothing is sent.
//! - Eager proxies have a handle from construction. An `Editor` gets one the
//!   first time it crosses the boundary.

use std::sync::Arc;

use futures::future::BoxFuture;

use crate::handles::ObjectKey;

mod button;
mod dialog;
mod editor;
mod panel;
mod tab;
mod wizard;
mod wizard_page;

pub use button::Button;
pub use dialog::Dialog;
pub use dialog::DialogContent;
pub use editor::Editor;
pub use tab::Tab;
pub use wizard::Wizard;
pub use wizard_page::WizardPage;

pub(crate) use dialog::DialogState;
pub(crate) use panel::PanelCore;
pub(crate) use wizard::WizardButtons;

/// Where an object is in its life.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Lifecycle {
    Constructed,
    Registered,
    ContentBound,
    Active,
    Closed,
}

/// When an object's handle is minted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Registration {
    /// At construction, by the factory.
    Eager,
    /// The first time the object is named in an outbound call.
    OnFirstUse,
}

/// A yes/no hook the main side consults before acting.
pub(crate) type Validator<A> = Arc<dyn Fn(A) -> BoxFuture<'static, bool> + Send + Sync>;

pub(crate) fn accept() -> BoxFuture<'static, bool> {
    Box::pin(futures::future::ready(true))
}

/// Any proxy the registry can hold.
#[derive(Clone)]
pub enum ProxyObject {
    Button(Button),
    Dialog(Dialog),
    Tab(Tab),
    Wizard(Wizard),
    WizardPage(WizardPage),
    Editor(Editor),
}

impl ProxyObject {
    pub(crate) fn key(&self) -> ObjectKey {
        match self {
            Self::Button(button) => button.key(),
            Self::Dialog(dialog) => dialog.key(),
            Self::Tab(tab) => tab.key(),
            Self::Wizard(wizard) => wizard.key(),
            Self::WizardPage(page) => page.key(),
            Self::Editor(editor) => editor.key(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Button(_) => "button",
            Self::Dialog(_) => "dialog",
            Self::Tab(_) => "tab",
            Self::Wizard(_) => "wizard",
            Self::WizardPage(_) => "wizardPage",
            Self::Editor(_) => "editor",
        }
    }
}

impl std::fmt::Debug for ProxyObject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ProxyObject::{}({:?})", self.kind(), self.key())
    }
}

macro_rules! impl_proxy_object {
    ($($ty:ident),*) => {
        $(
            impl From<$ty> for ProxyObject {
                fn from(object: $ty) -> Self {
                    Self::$ty(object)
                }
            }

            impl From<&$ty> for ProxyObject {
                fn from(object: &$ty) -> Self {
                    Self::$ty(object.clone())
                }
            }

            impl PartialEq for $ty {
                fn eq(&self, other: &Self) -> bool {
                    self.key() == other.key()
                }
            }

            impl Eq for $ty {}
        )*
    };
}

impl_proxy_object!(Button, Dialog, Tab, Wizard, WizardPage, Editor);

/// Panel capability shared by dialogs, tabs, wizard pages and editors.
///
/// Expects the type to have `core.panel: PanelCore`, `core.host: Weak<Shared>`,
/// `fn attach(&self, &Shared) -> Handle` and `fn content_bound(&self, &str)`.
macro_rules! model_view_panel {
    ($ty:ident) => {
        impl $ty {
            /// Registers the content provider for this panel. Only the first
            /// call on a panel has any effect.
            pub fn register_content<F, Fut>(&self, handler: F)
            where
                F: Fn($crate::content::ModelView) -> Fut + Send + Sync + 'static,
                Fut: std::future::Future<Output = ()> + Send + 'static,
            {
                let Some(host) = self.core.host.upgrade() else {
                    return;
                };
                let handle = self.attach(&host);
                let provider: $crate::content::ContentProvider = std::sync::Arc::new(
                    move |view: $crate::content::ModelView| -> futures::future::BoxFuture<'static, ()> {
                        Box::pin(handler(view))
                    },
                );
                if let Some(view_id) = self.core.panel.register_content(&host, handle, provider) {
                    self.content_bound(&view_id);
                }
            }

            /// Binds an explicit model-view id. A no-op if content is already bound.
            pub fn set_model_view_id(&self, view_id: impl Into<String>) -> bool {
                let view_id = view_id.into();
                let bound = self.core.panel.bind_content_id(&view_id);
                if bound {
                    self.content_bound(&view_id);
                }
                bound
            }

            pub fn model_view_id(&self) -> Option<String> {
                self.core.panel.content_id()
            }

            /// The view handed to the content provider, once the main side opened it.
            pub fn model_view(&self) -> Option<$crate::content::ModelView> {
                self.core.panel.model_view()
            }

            pub fn valid(&self) -> bool {
                self.core.panel.valid()
            }

            pub fn on_validity_changed(&self) -> $crate::event::Event<bool> {
                let Some(host) = self.core.host.upgrade() else {
                    return $crate::event::Event::detached();
                };
                let handle = self.attach(&host);
                host.relay.validity_event(handle)
            }

            pub fn lifecycle(&self) -> $crate::proxy::Lifecycle {
                self.core.panel.lifecycle()
            }

            pub fn registration(&self) -> $crate::proxy::Registration {
                self.core.panel.registration()
            }

            pub(crate) fn panel_core(&self) -> &$crate::proxy::PanelCore {
                &self.core.panel
            }
        }
    };
}

pub(crate) use model_view_panel;
