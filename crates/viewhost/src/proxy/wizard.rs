use std::future::Future;
use std::sync::Arc;
use std::sync::Weak;

use futures::future::BoxFuture;
use parking_lot::Mutex;

use viewrpc::DialogMessage;
use viewrpc::Handle;
use viewrpc::WizardPageChangeInfo;

use crate::event::Emitter;
use crate::event::Event;
use crate::handles::ObjectKey;
use crate::host::Shared;
use crate::operation::BackgroundOperationHandler;
use crate::operation::BackgroundOperationInfo;
use crate::proxy::Button;
use crate::proxy::Lifecycle;
use crate::proxy::Validator;
use crate::proxy::WizardPage;
use crate::proxy::accept;
use crate::relay::WizardPageEvent;
use crate::response;
use crate::response::Response;

/// The five buttons every wizard owns.
pub(crate) struct WizardButtons {
    pub(crate) done: Button,
    pub(crate) cancel: Button,
    pub(crate) generate_script: Button,
    pub(crate) next: Button,
    pub(crate) back: Button,
}

struct WizardState {
    title: Option<String>,
    pages: Vec<WizardPage>,
    current_page: usize,
    message: Option<DialogMessage>,
    display_page_titles: bool,
    custom_buttons: Option<Vec<Button>>,
    lifecycle: Lifecycle,
}

pub(crate) struct WizardCore {
    host: Weak<Shared>,
    handle: Handle,
    buttons: WizardButtons,
    state: Mutex<WizardState>,
    page_changed: Emitter<WizardPageChangeInfo>,
    navigation_validator: Mutex<Option<Validator<WizardPageChangeInfo>>>,
    operation: Arc<BackgroundOperationHandler>,
}

/// Snapshot of a wizard's pushable state.
pub(crate) struct WizardSnapshot {
    pub(crate) title: Option<String>,
    pub(crate) pages: Vec<WizardPage>,
    pub(crate) current_page: usize,
    pub(crate) message: Option<DialogMessage>,
    pub(crate) display_page_titles: bool,
    pub(crate) custom_buttons: Option<Vec<Button>>,
}

/// A multi-page wizard.
#[derive(Clone)]
pub struct Wizard {
    core: Arc<WizardCore>,
}

impl Wizard {
    pub(crate) fn new(
        host: Weak<Shared>,
        handle: Handle,
        title: Option<String>,
        buttons: WizardButtons,
        operation: Arc<BackgroundOperationHandler>,
    ) -> Self {
        let state = WizardState {
            title,
            pages: Vec::new(),
            current_page: 0,
            message: None,
            display_page_titles: true,
            custom_buttons: None,
            lifecycle: Lifecycle::Registered,
        };
        let core = WizardCore {
            host,
            handle,
            buttons,
            state: Mutex::new(state),
            page_changed: Emitter::new(),
            navigation_validator: Mutex::new(None),
            operation,
        };
        Self { core: Arc::new(core) }
    }

    pub(crate) fn key(&self) -> ObjectKey {
        ObjectKey::of(&self.core)
    }

    /// Applies what the main side reported about this wizard's pages.
    pub(crate) fn handle_page_event(&self, event: WizardPageEvent) {
        match event {
            WizardPageEvent::PageChanged(info) => {
                self.core.state.lock().current_page = info.new_page;
                self.core.page_changed.fire(info);
            }
            WizardPageEvent::PagesUpdated { pages, current_page } => {
                let mut state = self.core.state.lock();
                state.pages = pages;
                state.current_page = current_page;
            }
        }
    }

    pub(crate) fn downgrade(&self) -> Weak<WizardCore> {
        Arc::downgrade(&self.core)
    }

    pub(crate) fn upgrade(core: &Weak<WizardCore>) -> Option<Self> {
        core.upgrade().map(|core| Self { core })
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

    pub fn pages(&self) -> Vec<WizardPage> {
        self.core.state.lock().pages.clone()
    }

    pub fn current_page(&self) -> usize {
        self.core.state.lock().current_page
    }

    pub fn message(&self) -> Option<DialogMessage> {
        self.core.state.lock().message.clone()
    }

    pub fn set_message(&self, message: Option<DialogMessage>) {
        self.core.state.lock().message = message;
        self.push();
    }

    pub fn display_page_titles(&self) -> bool {
        self.core.state.lock().display_page_titles
    }

    pub fn set_display_page_titles(&self, display: bool) {
        self.core.state.lock().display_page_titles = display;
        self.push();
    }

    pub fn custom_buttons(&self) -> Option<Vec<Button>> {
        self.core.state.lock().custom_buttons.clone()
    }

    pub fn set_custom_buttons(&self, buttons: Vec<Button>) {
        self.core.state.lock().custom_buttons = Some(buttons);
        self.push();
    }

    pub fn done_button(&self) -> Button {
        self.core.buttons.done.clone()
    }

    pub fn cancel_button(&self) -> Button {
        self.core.buttons.cancel.clone()
    }

    pub fn generate_script_button(&self) -> Button {
        self.core.buttons.generate_script.clone()
    }

    pub fn next_button(&self) -> Button {
        self.core.buttons.next.clone()
    }

    pub fn back_button(&self) -> Button {
        self.core.buttons.back.clone()
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.core.state.lock().lifecycle
    }

    pub fn on_page_changed(&self) -> Event<WizardPageChangeInfo> {
        self.core.page_changed.event()
    }

    pub fn register_navigation_validator<F, Fut>(&self, validator: F)
    where
        F: Fn(WizardPageChangeInfo) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = bool> + Send + 'static,
    {
        let validator: Validator<WizardPageChangeInfo> =
            Arc::new(move |info| -> BoxFuture<'static, bool> { Box::pin(validator(info)) });
        *self.core.navigation_validator.lock() = Some(validator);
    }

    /// Asks the navigation validator. With none registered, navigation is allowed.
    pub fn validate_navigation(&self, info: WizardPageChangeInfo) -> BoxFuture<'static, bool> {
        let validator = self.core.navigation_validator.lock().clone();
        match validator {
            Some(validator) => validator(info),
            None => accept(),
        }
    }

    /// Stores an operation to start when the done button is clicked.
    pub fn register_operation(&self, info: BackgroundOperationInfo) {
        self.core.operation.register_operation(info);
    }

    pub fn operation_id(&self) -> Option<String> {
        self.core.operation.operation_id()
    }

    /// Inserts `page` at `index` (clamped to the page count; `None` appends).
    ///
    /// The page's own state is pushed before the insertion is announced, and
    /// the local page list changes before the main side confirms.
    pub fn add_page(&self, page: &WizardPage, index: Option<usize>) -> BoxFuture<'static, response::Result<()>> {
        let Some(host) = self.core.host.upgrade() else {
            return Box::pin(futures::future::ready(Err(response::Error::Disconnected)));
        };
        let dispatcher = host.dispatcher();
        let pushed = dispatcher.update_wizard_page(page);
        {
            let mut state = self.core.state.lock();
            let at = index.map_or(state.pages.len(), |index| index.min(state.pages.len()));
            state.pages.insert(at, page.clone());
        }
        let added = dispatcher.add_page(self, page, index);
        Box::pin(async move {
            pushed.acked().await?;
            added.acked().await
        })
    }

    /// Removes the page at `index`. Out-of-range indices leave the local list
    /// alone; the main side decides what to make of them.
    pub fn remove_page(&self, index: usize) -> Response {
        {
            let mut state = self.core.state.lock();
            if index < state.pages.len() {
                state.pages.remove(index);
            }
        }
        self.with_host(|host| host.dispatcher().remove_page(self, index))
    }

    /// Asks the main side to show the page at `index`. The local current page
    /// follows once the main side reports the change.
    pub fn set_current_page(&self, index: usize) -> Response {
        self.with_host(|host| host.dispatcher().set_wizard_page(self, index))
    }

    pub fn open(&self) -> Response {
        self.with_host(|host| host.dispatcher().open_wizard(self))
    }

    pub fn close(&self) -> Response {
        self.with_host(|host| host.dispatcher().close_wizard(self))
    }

    pub(crate) fn mark_open(&self) {
        self.core.state.lock().lifecycle = Lifecycle::Active;
    }

    pub(crate) fn mark_closed(&self) {
        self.core.state.lock().lifecycle = Lifecycle::Closed;
    }

    pub(crate) fn snapshot(&self) -> WizardSnapshot {
        let state = self.core.state.lock();
        WizardSnapshot {
            title: state.title.clone(),
            pages: state.pages.clone(),
            current_page: state.current_page,
            message: state.message.clone(),
            display_page_titles: state.display_page_titles,
            custom_buttons: state.custom_buttons.clone(),
        }
    }

    pub(crate) fn buttons(&self) -> &WizardButtons {
        &self.core.buttons
    }

    fn with_host(&self, f: impl FnOnce(&Shared) -> Response) -> Response {
        match self.core.host.upgrade() {
            Some(host) => f(&host),
            None => Response::failed(response::Error::Disconnected),
        }
    }

    fn push(&self) {
        if let Some(host) = self.core.host.upgrade() {
            drop(host.dispatcher().update_wizard(self));
        }
    }
}

impl std::fmt::Debug for Wizard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Wizard")
            .field("handle", &self.core.handle)
            .field("title", &self.title())
            .field("current_page", &self.current_page())
            .finish()
    }
}
