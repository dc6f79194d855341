//! # Model-View Dialog Host
//!
//! The extension-host side boundary object. It owns the handle registry and
//! event relay, builds proxies, forwards proxy commands to the main side, and
//! receives the main side's notifications and requests.
//!
//! ## Inbound semantics
//!
//! - Notifications naming an unknown handle are dropped silently.
//! - Requests naming an unknown handle resolve to `true`.

use std::sync::Arc;

use futures::future::BoxFuture;
use tracing::debug;

use viewrpc::EditorOptions;
use viewrpc::Handle;
use viewrpc::WizardPageChangeInfo;

use crate::config::HostConfig;
use crate::content::ModelViewRegistrar;
use crate::content::ViewProviders;
use crate::dispatch::Dispatcher;
use crate::handles::HandleAllocator;
use crate::operation::BackgroundOperationHandler;
use crate::operation::LocalTaskManager;
use crate::operation::TaskManager;
use crate::proxy::Button;
use crate::proxy::Dialog;
use crate::proxy::DialogState;
use crate::proxy::Editor;
use crate::proxy::PanelCore;
use crate::proxy::Tab;
use crate::proxy::Wizard;
use crate::proxy::WizardButtons;
use crate::proxy::WizardPage;
use crate::proxy::accept;
use crate::registry::HandleRegistry;
use crate::relay::EventRelay;
use crate::relay::WizardPageEvent;
use crate::response::Response;
use crate::shape::ExtensionInfo;
use crate::shape::MainThread;

/// State every proxy of one host reaches through a weak reference.
pub(crate) struct Shared {
    pub(crate) registry: HandleRegistry,
    pub(crate) relay: EventRelay,
    pub(crate) main: Arc<dyn MainThread>,
    pub(crate) content: Arc<dyn ModelViewRegistrar>,
    pub(crate) tasks: Arc<dyn TaskManager>,
    pub(crate) config: HostConfig,
}

impl Shared {
    pub(crate) fn dispatcher(&self) -> Dispatcher<'_> {
        Dispatcher::new(&self.registry, self.main.as_ref())
    }
}

/// Assembles a `ModelViewDialogHost`.
pub struct HostBuilder {
    main: Arc<dyn MainThread>,
    content: Option<Arc<dyn ModelViewRegistrar>>,
    tasks: Option<Arc<dyn TaskManager>>,
    allocator: Option<HandleAllocator>,
    config: HostConfig,
}

impl HostBuilder {
    pub fn new(main: Arc<dyn MainThread>) -> Self {
        Self { main, content: None, tasks: None, allocator: None, config: HostConfig::default() }
    }

    pub fn content_registrar(mut self, content: Arc<dyn ModelViewRegistrar>) -> Self {
        self.content = Some(content);
        self
    }

    pub fn task_manager(mut self, tasks: Arc<dyn TaskManager>) -> Self {
        self.tasks = Some(tasks);
        self
    }

    pub fn allocator(mut self, allocator: HandleAllocator) -> Self {
        self.allocator = Some(allocator);
        self
    }

    pub fn config(mut self, config: HostConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> ModelViewDialogHost {
        let shared = Shared {
            registry: HandleRegistry::new(self.allocator.unwrap_or_default()),
            relay: EventRelay::new(),
            main: self.main,
            content: self.content.unwrap_or_else(|| Arc::new(ViewProviders::new())),
            tasks: self.tasks.unwrap_or_else(|| Arc::new(LocalTaskManager::new())),
            config: self.config,
        };
        ModelViewDialogHost { shared: Arc::new(shared) }
    }
}

#[derive(Clone)]
pub struct ModelViewDialogHost {
    shared: Arc<Shared>,
}

impl ModelViewDialogHost {
    pub fn new(main: Arc<dyn MainThread>) -> Self {
        Self::builder(main).build()
    }

    pub fn builder(main: Arc<dyn MainThread>) -> HostBuilder {
        HostBuilder::new(main)
    }

    pub fn registry(&self) -> &HandleRegistry {
        &self.shared.registry
    }

    pub fn config(&self) -> &HostConfig {
        &self.shared.config
    }

    // ========================================================================
    //  FACTORIES
    // ========================================================================

    pub fn create_button(&self, label: impl Into<String>) -> Button {
        let shared = &self.shared;
        let handle = shared.registry.reserve();
        let button = Button::new(Arc::downgrade(shared), handle, label);
        shared.registry.bind(handle, button.clone().into());

        let click = button.click_emitter();
        shared.relay.set_click_callback(handle, Arc::new(move || click.fire(())));

        drop(shared.dispatcher().update_button(&button));
        button
    }

    pub fn create_dialog(
        &self,
        title: impl Into<String>,
        dialog_name: Option<String>,
        extension: Option<ExtensionInfo>,
        is_wide: Option<bool>,
    ) -> Dialog {
        let shared = &self.shared;
        let labels = &shared.config.labels;
        let ok_button = self.create_button(labels.done.clone());
        let cancel_button = self.create_button(labels.cancel.clone());

        let operation = Arc::new(BackgroundOperationHandler::new(
            "dialog",
            shared.config.operation_id_prefix.clone(),
            shared.tasks.clone(),
        ));
        let trigger = operation.clone();
        let _ = ok_button.on_click().subscribe(move |_| trigger.create_operation());

        let handle = shared.registry.reserve();
        let panel = PanelCore::eager(shared.config.view_types.dialog.clone(), extension, handle);
        let state = DialogState { title: Some(title.into()), dialog_name, is_wide, ..DialogState::default() };
        let dialog = Dialog::new(Arc::downgrade(shared), panel, handle, (ok_button, cancel_button), operation, state);
        shared.registry.bind(handle, dialog.clone().into());
        dialog.panel_core().track_validity(shared, handle);
        debug!(%handle, "dialog created");

        dialog
    }

    pub fn create_tab(&self, title: impl Into<String>, extension: Option<ExtensionInfo>) -> Tab {
        let shared = &self.shared;
        let handle = shared.registry.reserve();
        let panel = PanelCore::eager(shared.config.view_types.tab.clone(), extension, handle);
        let tab = Tab::new(Arc::downgrade(shared), panel, handle, Some(title.into()));
        shared.registry.bind(handle, tab.clone().into());
        tab.panel_core().track_validity(shared, handle);
        tab
    }

    pub fn create_wizard_page(&self, title: impl Into<String>, extension: Option<ExtensionInfo>) -> WizardPage {
        let shared = &self.shared;
        let handle = shared.registry.reserve();
        let panel = PanelCore::eager(shared.config.view_types.wizard_page.clone(), extension, handle);
        let page = WizardPage::new(Arc::downgrade(shared), panel, handle, Some(title.into()));
        shared.registry.bind(handle, page.clone().into());
        page.panel_core().track_validity(shared, handle);
        page
    }

    pub fn create_wizard(&self, title: impl Into<String>) -> Wizard {
        let shared = &self.shared;
        let title = title.into();
        let labels = &shared.config.labels;
        let buttons = WizardButtons {
            done: self.create_button(labels.done.clone()),
            cancel: self.create_button(labels.cancel.clone()),
            generate_script: self.create_button(labels.generate_script.clone()),
            next: self.create_button(labels.next.clone()),
            back: self.create_button(labels.previous.clone()),
        };

        let operation = Arc::new(BackgroundOperationHandler::new(
            format!("wizard{}", title),
            shared.config.operation_id_prefix.clone(),
            shared.tasks.clone(),
        ));
        let trigger = operation.clone();
        let _ = buttons.done.on_click().subscribe(move |_| trigger.create_operation());

        let handle = shared.registry.reserve();
        let wizard = Wizard::new(Arc::downgrade(shared), handle, Some(title), buttons, operation);
        shared.registry.bind(handle, wizard.clone().into());
        debug!(%handle, "wizard created");

        let weak = wizard.downgrade();
        shared.relay.set_page_info_callback(
            handle,
            Arc::new(move |event: WizardPageEvent| {
                if let Some(wizard) = Wizard::upgrade(&weak) {
                    wizard.handle_page_event(event);
                }
            }),
        );

        wizard
    }

    /// Builds an editor. It has no handle until it first crosses the boundary.
    pub fn create_model_view_editor(
        &self,
        title: impl Into<String>,
        extension: Option<ExtensionInfo>,
        options: Option<EditorOptions>,
    ) -> Editor {
        let shared = &self.shared;
        let panel = PanelCore::on_first_use(shared.config.view_types.editor.clone(), extension);
        Editor::new(Arc::downgrade(shared), panel, title, options.unwrap_or_default())
    }

    // ========================================================================
    //  COMMANDS
    // ========================================================================

    pub fn open_dialog(&self, dialog: &Dialog) -> Response {
        self.shared.dispatcher().open_dialog(dialog)
    }

    pub fn close_dialog(&self, dialog: &Dialog) -> Response {
        self.shared.dispatcher().close_dialog(dialog)
    }

    pub fn update_dialog_content(&self, dialog: &Dialog) -> Response {
        self.shared.dispatcher().update_dialog(dialog)
    }

    pub fn update_tab_content(&self, tab: &Tab) -> Response {
        self.shared.dispatcher().update_tab(tab)
    }

    pub fn update_button(&self, button: &Button) -> Response {
        self.shared.dispatcher().update_button(button)
    }

    pub fn update_wizard(&self, wizard: &Wizard) -> Response {
        self.shared.dispatcher().update_wizard(wizard)
    }

    pub fn update_wizard_page(&self, page: &WizardPage) -> Response {
        self.shared.dispatcher().update_wizard_page(page)
    }

    pub fn add_page(
        &self,
        wizard: &Wizard,
        page: &WizardPage,
        index: Option<usize>,
    ) -> BoxFuture<'static, crate::response::Result<()>> {
        wizard.add_page(page, index)
    }

    pub fn remove_page(&self, wizard: &Wizard, index: usize) -> Response {
        wizard.remove_page(index)
    }

    pub fn set_wizard_page(&self, wizard: &Wizard, index: usize) -> Response {
        wizard.set_current_page(index)
    }

    pub fn open_wizard(&self, wizard: &Wizard) -> Response {
        self.shared.dispatcher().open_wizard(wizard)
    }

    pub fn close_wizard(&self, wizard: &Wizard) -> Response {
        self.shared.dispatcher().close_wizard(wizard)
    }

    // ========================================================================
    //  INBOUND
    // ========================================================================

    pub fn on_button_click(&self, handle: Handle) {
        self.shared.relay.fire_click(handle);
    }

    pub fn on_panel_validity_changed(&self, handle: Handle, valid: bool) {
        self.shared.relay.fire_validity(handle, valid);
    }

    pub fn on_wizard_page_changed(&self, handle: Handle, info: WizardPageChangeInfo) {
        self.shared.relay.fire_page_info(handle, WizardPageEvent::PageChanged(info));
    }

    /// Replaces a wizard's page list. Page handles this host does not know
    /// are skipped.
    pub fn update_wizard_page_info(&self, handle: Handle, pages: &[Handle], current_page: usize) {
        let Some(callback) = self.shared.relay.page_info_callback(handle) else {
            return;
        };
        let pages: Vec<WizardPage> = pages
            .iter()
            .filter_map(|page| self.shared.registry.resolve_wizard_page(*page))
            .collect();
        callback(WizardPageEvent::PagesUpdated { pages, current_page });
    }

    pub fn validate_navigation(&self, handle: Handle, info: WizardPageChangeInfo) -> BoxFuture<'static, bool> {
        match self.shared.registry.resolve_wizard(handle) {
            Some(wizard) => wizard.validate_navigation(info),
            None => accept(),
        }
    }

    pub fn validate_dialog_close(&self, handle: Handle) -> BoxFuture<'static, bool> {
        match self.shared.registry.resolve_dialog(handle) {
            Some(dialog) => dialog.validate_close(),
            None => accept(),
        }
    }

    pub fn handle_save(&self, handle: Handle) -> BoxFuture<'static, bool> {
        match self.shared.registry.resolve_editor(handle) {
            Some(editor) => editor.handle_save(),
            None => accept(),
        }
    }
}
