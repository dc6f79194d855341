//! # Outbound Dispatch
//!
//! Turns proxy state into `MainCall`s. Every update is a full snapshot of
//! one object, and any object it references by handle is pushed first so the
//! main side never sees a handle it knows nothing about.
//!
//! Push order:
//! - dialog: tabs, custom buttons, ok, cancel, then the dialog.
//! - wizard: pages, back, cancel, generate-script, done, next, custom
//!   buttons, then the wizard.
//! - wizard page: its custom buttons, then the page.

use viewrpc::DialogContentDetails;
use viewrpc::DialogDetails;
use viewrpc::Handle;
use viewrpc::MainCall;
use viewrpc::ViewColumn;
use viewrpc::WizardDetails;

use crate::proxy::Button;
use crate::proxy::Dialog;
use crate::proxy::DialogContent;
use crate::proxy::Editor;
use crate::proxy::ProxyObject;
use crate::proxy::Tab;
use crate::proxy::Wizard;
use crate::proxy::WizardPage;
use crate::registry::HandleRegistry;
use crate::response::Response;
use crate::shape::MainThread;

pub(crate) struct Dispatcher<'a> {
    registry: &'a HandleRegistry,
    main: &'a dyn MainThread,
}

impl<'a> Dispatcher<'a> {
    pub(crate) fn new(registry: &'a HandleRegistry, main: &'a dyn MainThread) -> Self {
        Self { registry, main }
    }

    fn handle_of(&self, object: impl Into<ProxyObject>) -> Handle {
        self.registry.get_or_assign(&object.into())
    }

    fn push_buttons(&self, buttons: &Option<Vec<Button>>) -> Option<Vec<Handle>> {
        buttons.as_ref().map(|buttons| {
            buttons
                .iter()
                .map(|button| {
                    drop(self.update_button(button));
                    self.handle_of(button)
                })
                .collect()
        })
    }

    pub(crate) fn update_button(&self, button: &Button) -> Response {
        let handle = self.handle_of(button);
        self.main.submit(MainCall::SetButtonDetails { handle, details: button.details() })
    }

    pub(crate) fn update_tab(&self, tab: &Tab) -> Response {
        let handle = self.handle_of(tab);
        self.main.submit(MainCall::SetTabDetails { handle, details: tab.details() })
    }

    pub(crate) fn update_dialog(&self, dialog: &Dialog) -> Response {
        let snapshot = dialog.snapshot();

        let content = snapshot.content.as_ref().map(|content| match content {
            DialogContent::ModelView(id) => DialogContentDetails::ModelView(id.clone()),
            DialogContent::Tabs(tabs) => DialogContentDetails::Tabs(
                tabs.iter()
                    .map(|tab| {
                        drop(self.update_tab(tab));
                        self.handle_of(tab)
                    })
                    .collect(),
            ),
        });
        let custom_buttons = self.push_buttons(&snapshot.custom_buttons);
        drop(self.update_button(&snapshot.ok_button));
        drop(self.update_button(&snapshot.cancel_button));

        let details = DialogDetails {
            title: snapshot.title,
            is_wide: snapshot.is_wide,
            ok_button: self.handle_of(&snapshot.ok_button),
            cancel_button: self.handle_of(&snapshot.cancel_button),
            content,
            custom_buttons,
            message: snapshot.message,
        };
        let handle = self.handle_of(dialog);
        self.main.submit(MainCall::SetDialogDetails { handle, details })
    }

    pub(crate) fn update_wizard_page(&self, page: &WizardPage) -> Response {
        let custom_buttons = self.push_buttons(&page.custom_buttons());
        let handle = self.handle_of(page);
        self.main.submit(MainCall::SetWizardPageDetails { handle, details: page.details_with(custom_buttons) })
    }

    pub(crate) fn update_wizard(&self, wizard: &Wizard) -> Response {
        let snapshot = wizard.snapshot();
        let buttons = wizard.buttons();

        let pages = snapshot
            .pages
            .iter()
            .map(|page| {
                drop(self.update_wizard_page(page));
                self.handle_of(page)
            })
            .collect();
        drop(self.update_button(&buttons.back));
        drop(self.update_button(&buttons.cancel));
        drop(self.update_button(&buttons.generate_script));
        drop(self.update_button(&buttons.done));
        drop(self.update_button(&buttons.next));
        let custom_buttons = self.push_buttons(&snapshot.custom_buttons);

        let details = WizardDetails {
            title: snapshot.title,
            pages,
            current_page: snapshot.current_page,
            done_button: self.handle_of(&buttons.done),
            cancel_button: self.handle_of(&buttons.cancel),
            generate_script_button: self.handle_of(&buttons.generate_script),
            next_button: self.handle_of(&buttons.next),
            back_button: self.handle_of(&buttons.back),
            custom_buttons,
            message: snapshot.message,
            display_page_titles: snapshot.display_page_titles,
        };
        let handle = self.handle_of(wizard);
        self.main.submit(MainCall::SetWizardDetails { handle, details })
    }

    pub(crate) fn open_dialog(&self, dialog: &Dialog) -> Response {
        drop(self.update_dialog(dialog));
        dialog.mark_open();
        let handle = self.handle_of(dialog);
        self.main.submit(MainCall::OpenDialog { handle, name: dialog.dialog_name() })
    }

    pub(crate) fn close_dialog(&self, dialog: &Dialog) -> Response {
        dialog.mark_closed();
        let handle = self.handle_of(dialog);
        self.main.submit(MainCall::CloseDialog { handle })
    }

    pub(crate) fn add_page(&self, wizard: &Wizard, page: &WizardPage, index: Option<usize>) -> Response {
        let wizard = self.handle_of(wizard);
        let page = self.handle_of(page);
        self.main.submit(MainCall::AddWizardPage { wizard, page, index })
    }

    pub(crate) fn remove_page(&self, wizard: &Wizard, index: usize) -> Response {
        let wizard = self.handle_of(wizard);
        self.main.submit(MainCall::RemoveWizardPage { wizard, index })
    }

    pub(crate) fn set_wizard_page(&self, wizard: &Wizard, index: usize) -> Response {
        let wizard = self.handle_of(wizard);
        self.main.submit(MainCall::SetWizardPage { wizard, index })
    }

    pub(crate) fn open_wizard(&self, wizard: &Wizard) -> Response {
        drop(self.update_wizard(wizard));
        wizard.mark_open();
        let handle = self.handle_of(wizard);
        self.main.submit(MainCall::OpenWizard { handle })
    }

    pub(crate) fn close_wizard(&self, wizard: &Wizard) -> Response {
        wizard.mark_closed();
        let handle = self.handle_of(wizard);
        self.main.submit(MainCall::CloseWizard { handle })
    }

    pub(crate) fn open_editor(&self, editor: &Editor, handle: Handle, column: Option<ViewColumn>) -> Response {
        self.main.submit(MainCall::OpenEditor {
            handle,
            content_id: editor.model_view_id(),
            title: editor.title().to_string(),
            options: editor.options().clone(),
            column,
        })
    }

    pub(crate) fn set_dirty(&self, handle: Handle, dirty: bool) -> Response {
        self.main.submit(MainCall::SetDirty { handle, dirty })
    }
}
