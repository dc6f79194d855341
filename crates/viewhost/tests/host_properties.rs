//! Integration tests for the dialog host against a recording main thread.

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;

use viewrpc::DialogContentDetails;
use viewrpc::DialogMessage;
use viewrpc::Handle;
use viewrpc::MainCall;
use viewrpc::WizardPageChangeInfo;

use viewhost::BackgroundOperationInfo;
use viewhost::DialogContent;
use viewhost::ExtensionInfo;
use viewhost::HandleAllocator;
use viewhost::Lifecycle;
use viewhost::LocalTaskManager;
use viewhost::ModelViewDialogHost;
use viewhost::ProxyObject;
use viewhost::Registration;
use viewhost::ViewProviders;
use viewhost::testing::RecordingMainThread;

struct Fixture {
    main: Arc<RecordingMainThread>,
    views: Arc<ViewProviders>,
    tasks: Arc<LocalTaskManager>,
    host: ModelViewDialogHost,
}

fn fixture() -> Fixture {
    let main = Arc::new(RecordingMainThread::new());
    let views = Arc::new(ViewProviders::new());
    let tasks = Arc::new(LocalTaskManager::new());
    let host = ModelViewDialogHost::builder(main.clone())
        .content_registrar(views.clone())
        .task_manager(tasks.clone())
        .build();
    Fixture { main, views, tasks, host }
}

fn extension() -> Option<ExtensionInfo> {
    Some(ExtensionInfo::new("test.extension"))
}

// --- Handle uniqueness and stability ---

#[tokio::test]
async fn test_handles_are_unique_and_stable() {
    let f = fixture();
    let dialog = f.host.create_dialog("Dialog", None, extension(), None);
    let tab = f.host.create_tab("Tab", extension());
    let page = f.host.create_wizard_page("Page", extension());
    let wizard = f.host.create_wizard("Wizard");
    let button = f.host.create_button("Button");

    let objects: Vec<ProxyObject> = vec![
        dialog.clone().into(),
        tab.clone().into(),
        page.clone().into(),
        wizard.clone().into(),
        button.clone().into(),
    ];
    let handles: Vec<Handle> = objects.iter().map(|object| f.host.registry().get_or_assign(object)).collect();

    let distinct: HashSet<Handle> = handles.iter().copied().collect();
    assert_eq!(distinct.len(), handles.len());
    assert_eq!(handles, vec![dialog.handle(), tab.handle(), page.handle(), wizard.handle(), button.handle()]);

    for (object, handle) in objects.iter().zip(&handles) {
        assert_eq!(f.host.registry().get_or_assign(object), *handle);
        assert_eq!(f.host.registry().lookup(object), Some(*handle));
    }

    let clone = dialog.clone();
    assert_eq!(f.host.registry().lookup(&clone.into()), Some(dialog.handle()));
}

#[tokio::test]
async fn test_allocator_is_per_host() {
    let first = fixture();
    let second = ModelViewDialogHost::builder(Arc::new(RecordingMainThread::new()))
        .allocator(HandleAllocator::starting_at(1000))
        .build();

    let a = first.host.create_button("a");
    let b = second.create_button("b");
    assert_eq!(a.handle(), Handle(0));
    assert_eq!(b.handle(), Handle(1000));
}

// --- Unknown handles ---

#[tokio::test]
async fn test_inbound_for_unknown_handles_is_harmless() {
    let f = fixture();
    let wizard = f.host.create_wizard("Wizard");
    let page = f.host.create_wizard_page("Page", None);
    wizard.add_page(&page, None).await.expect("add page");
    let clicks = Arc::new(AtomicUsize::new(0));
    let counter = clicks.clone();
    let _sub = wizard.done_button().on_click().subscribe(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });
    f.main.take();

    let unknown = Handle(9_999);
    f.host.on_button_click(unknown);
    f.host.on_panel_validity_changed(unknown, false);
    f.host.on_wizard_page_changed(unknown, WizardPageChangeInfo { last_page: Some(0), new_page: 3 });
    f.host.update_wizard_page_info(unknown, &[page.handle()], 0);

    assert!(f.main.calls().is_empty());
    assert_eq!(clicks.load(Ordering::SeqCst), 0);
    assert_eq!(wizard.pages(), vec![page.clone()]);
    assert_eq!(wizard.current_page(), 0);
    assert!(page.valid());

    assert!(f.host.validate_dialog_close(unknown).await);
    assert!(f.host.validate_navigation(unknown, WizardPageChangeInfo { last_page: None, new_page: 1 }).await);
    assert!(f.host.handle_save(unknown).await);
}

#[tokio::test]
async fn test_handle_of_wrong_kind_is_treated_as_unknown() {
    let f = fixture();
    let tab = f.host.create_tab("Tab", None);
    assert!(f.host.registry().resolve_dialog(tab.handle()).is_none());
    assert!(f.host.validate_dialog_close(tab.handle()).await);
}

// --- Default-accept validators ---

#[tokio::test]
async fn test_validators_default_to_accept() {
    let f = fixture();
    let dialog = f.host.create_dialog("Dialog", None, None, None);
    let wizard = f.host.create_wizard("Wizard");
    let editor = f.host.create_model_view_editor("Editor", None, None);

    assert!(dialog.validate_close().await);
    assert!(wizard.validate_navigation(WizardPageChangeInfo { last_page: Some(0), new_page: 1 }).await);
    assert!(editor.handle_save().await);
}

#[tokio::test]
async fn test_registered_validators_are_consulted() {
    let f = fixture();
    let dialog = f.host.create_dialog("Dialog", None, None, None);
    dialog.register_close_validator(|| async { false });
    let wizard = f.host.create_wizard("Wizard");
    wizard.register_navigation_validator(|info: WizardPageChangeInfo| async move { info.new_page < 2 });

    assert!(!f.host.validate_dialog_close(dialog.handle()).await);
    let info = |new_page| WizardPageChangeInfo { last_page: Some(0), new_page };
    assert!(f.host.validate_navigation(wizard.handle(), info(1)).await);
    assert!(!f.host.validate_navigation(wizard.handle(), info(2)).await);
}

// --- Idempotent content binding ---

#[tokio::test]
async fn test_register_content_registers_once() {
    let f = fixture();
    let tab = f.host.create_tab("Tab", extension());
    let calls = Arc::new(AtomicUsize::new(0));

    let counter = calls.clone();
    tab.register_content(move |_view| {
        let counter = counter.clone();
        async move {
            counter.fetch_add(1, Ordering::SeqCst);
        }
    });
    tab.register_content(|_view| async {});
    assert!(!tab.set_model_view_id("somethingElse"));

    let expected = format!("modelViewDialogTab{}", tab.handle().0);
    assert_eq!(f.views.registrations(), vec![expected.clone()]);
    assert_eq!(tab.model_view_id(), Some(expected.clone()));
    assert_eq!(tab.lifecycle(), Lifecycle::ContentBound);
    assert_eq!(f.views.extension_of(&expected), extension());

    assert!(f.views.open_view(&expected).await);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(tab.model_view().map(|view| view.id), Some(expected));
}

#[tokio::test]
async fn test_dialog_content_follows_registration() {
    let f = fixture();
    let dialog = f.host.create_dialog("Dialog", None, None, None);
    dialog.register_content(|_view| async {});

    let expected = format!("modelViewDialog{}", dialog.handle().0);
    assert_eq!(dialog.content(), Some(DialogContent::ModelView(expected)));
}

// --- Full-state resend ---

#[tokio::test]
async fn test_setting_message_resends_full_dialog() {
    let f = fixture();
    let dialog = f.host.create_dialog("T", None, None, None);
    let tab = f.host.create_tab("Tab", None);
    dialog.set_content(DialogContent::Tabs(vec![tab.clone()]));
    f.main.take();

    dialog.set_message(Some(DialogMessage::new("hi")));

    assert_eq!(f.main.count("setDialogDetails"), 1);
    let Some(MainCall::SetDialogDetails { handle, details }) = f.main.last_for(dialog.handle()) else {
        panic!("expected a dialog update");
    };
    assert_eq!(handle, dialog.handle());
    assert_eq!(details.title.as_deref(), Some("T"));
    assert_eq!(details.message.map(|message| message.text).as_deref(), Some("hi"));
    assert_eq!(details.ok_button, dialog.ok_button().handle());
    assert_eq!(details.cancel_button, dialog.cancel_button().handle());
    assert_eq!(details.content, Some(DialogContentDetails::Tabs(vec![tab.handle()])));
}

#[tokio::test]
async fn test_referenced_objects_are_pushed_first() {
    let f = fixture();
    let dialog = f.host.create_dialog("T", None, None, None);
    let tab = f.host.create_tab("Tab", None);
    dialog.set_content(DialogContent::Tabs(vec![tab]));
    f.main.take();

    drop(dialog.open());

    assert_eq!(f.main.methods(), vec![
        "setTabDetails",
        "setButtonDetails",
        "setButtonDetails",
        "setDialogDetails",
        "openDialog",
    ]);
    assert_eq!(dialog.lifecycle(), Lifecycle::Active);
}

#[tokio::test]
async fn test_dialog_name_travels_with_open() {
    let f = fixture();
    let dialog = f.host.create_dialog("T", Some("first".into()), None, Some(true));
    dialog.set_dialog_name("renamed");
    assert_eq!(f.main.count("setDialogDetails"), 0);

    drop(f.host.open_dialog(&dialog));
    let last = f.main.calls().pop();
    assert_eq!(last, Some(MainCall::OpenDialog { handle: dialog.handle(), name: Some("renamed".into()) }));
}

// --- Closing ---

#[tokio::test]
async fn test_closed_dialog_keeps_its_handle() {
    let f = fixture();
    let dialog = f.host.create_dialog("Dialog", None, extension(), None);
    dialog.register_close_validator(|| async { false });
    f.host.open_dialog(&dialog).await.expect("open");
    assert_eq!(dialog.lifecycle(), Lifecycle::Active);

    dialog.close().await.expect("close");
    assert_eq!(dialog.lifecycle(), Lifecycle::Closed);
    assert_eq!(f.main.calls().pop(), Some(MainCall::CloseDialog { handle: dialog.handle() }));

    assert_eq!(f.host.registry().resolve_dialog(dialog.handle()), Some(dialog.clone()));
    assert!(!f.host.validate_dialog_close(dialog.handle()).await);
}

#[tokio::test]
async fn test_host_close_dialog_matches_proxy_close() {
    let f = fixture();
    let dialog = f.host.create_dialog("Dialog", None, None, None);

    f.host.close_dialog(&dialog).await.expect("close");
    assert_eq!(dialog.lifecycle(), Lifecycle::Closed);
    assert_eq!(f.main.count("closeDialog"), 1);
    assert!(f.host.registry().resolve(dialog.handle()).is_some());
}

#[tokio::test]
async fn test_closed_wizard_keeps_its_handle() {
    let f = fixture();
    let wizard = f.host.create_wizard("Wizard");
    let page = f.host.create_wizard_page("Page", None);
    f.host.add_page(&wizard, &page, None).await.expect("add page");
    f.host.open_wizard(&wizard).await.expect("open");
    assert_eq!(wizard.lifecycle(), Lifecycle::Active);

    f.host.close_wizard(&wizard).await.expect("close");
    assert_eq!(wizard.lifecycle(), Lifecycle::Closed);
    assert_eq!(f.main.calls().pop(), Some(MainCall::CloseWizard { handle: wizard.handle() }));

    let resolved = f.host.registry().resolve_wizard(wizard.handle()).expect("wizard still resolves");
    assert_eq!(resolved.handle(), wizard.handle());
    assert_eq!(resolved.lifecycle(), Lifecycle::Closed);
    assert_eq!(f.host.registry().resolve_wizard_page(page.handle()), Some(page.clone()));

    wizard.close().await.expect("close again");
    assert_eq!(f.main.count("closeWizard"), 2);
    assert_eq!(wizard.lifecycle(), Lifecycle::Closed);
}

#[tokio::test]
async fn test_focus_is_one_shot() {
    let f = fixture();
    let button = f.host.create_button("Go");
    f.main.take();

    button.focus();
    button.set_label("Went");

    let calls = f.main.take();
    let focused: Vec<Option<bool>> = calls
        .into_iter()
        .filter_map(|call| match call {
            MainCall::SetButtonDetails { details, .. } => Some(details.focused),
            _ => None,
        })
        .collect();
    assert_eq!(focused, vec![Some(true), None]);
}

// --- Operations ---

#[tokio::test]
async fn test_operation_id_generated_once() {
    let f = fixture();
    let dialog = f.host.create_dialog("T", None, None, None);
    dialog.register_operation(BackgroundOperationInfo::new("Deploy", "Deploying").with_operation(|_context| {}));
    assert!(dialog.operation_id().is_none());

    f.host.on_button_click(dialog.ok_button().handle());
    let first = dialog.operation_id().expect("id after first click");
    f.host.on_button_click(dialog.ok_button().handle());
    let second = dialog.operation_id().expect("id after second click");

    assert_eq!(first, second);
    assert!(first.starts_with("OperationId"));
    assert!(first.ends_with("dialog"));
    assert_eq!(f.tasks.registrations(), vec![first.clone(), first]);
}

#[tokio::test]
async fn test_wizard_operation_runs_on_done() {
    let f = fixture();
    let wizard = f.host.create_wizard("Setup");
    wizard.register_operation(BackgroundOperationInfo::new("Setup", "Running setup").with_operation(|_context| {}));

    f.host.on_button_click(wizard.next_button().handle());
    assert!(wizard.operation_id().is_none());

    f.host.on_button_click(wizard.done_button().handle());
    let id = wizard.operation_id().expect("id after done");
    assert!(id.ends_with("wizardSetup"));
    assert!(f.tasks.get(&id).is_some());
}

// --- Wizard pages ---

#[tokio::test]
async fn test_add_page_at_front_shifts_existing_pages() {
    let f = fixture();
    let wizard = f.host.create_wizard("Wizard");
    let first = f.host.create_wizard_page("First", None);
    let second = f.host.create_wizard_page("Second", None);
    let front = f.host.create_wizard_page("Front", None);

    f.host.add_page(&wizard, &first, None).await.expect("append first");
    f.host.add_page(&wizard, &second, None).await.expect("append second");
    f.host.add_page(&wizard, &front, Some(0)).await.expect("insert at front");

    let pages = wizard.pages();
    assert_eq!(pages, vec![front.clone(), first.clone(), second.clone()]);
    for page in &pages {
        let resolved = f.host.registry().resolve_wizard_page(page.handle()).expect("page resolves");
        assert_eq!(&resolved, page);
    }

    let last = f.main.calls().pop();
    assert_eq!(last, Some(MainCall::AddWizardPage { wizard: wizard.handle(), page: front.handle(), index: Some(0) }));
}

#[tokio::test]
async fn test_page_state_precedes_insertion() {
    let f = fixture();
    let wizard = f.host.create_wizard("Wizard");
    let page = f.host.create_wizard_page("Page", None);
    f.main.take();

    f.host.add_page(&wizard, &page, Some(7)).await.expect("add");
    assert_eq!(f.main.methods(), vec!["setWizardPageDetails", "addWizardPage"]);
    assert_eq!(wizard.pages(), vec![page]);
}

#[tokio::test]
async fn test_remove_page_out_of_range_keeps_local_list() {
    let f = fixture();
    let wizard = f.host.create_wizard("Wizard");
    let page = f.host.create_wizard_page("Page", None);
    f.host.add_page(&wizard, &page, None).await.expect("add");

    drop(f.host.remove_page(&wizard, 4));
    assert_eq!(wizard.pages().len(), 1);

    drop(f.host.remove_page(&wizard, 0));
    assert!(wizard.pages().is_empty());
    assert_eq!(f.main.count("removeWizardPage"), 2);
}

#[tokio::test]
async fn test_page_change_updates_wizard() {
    let f = fixture();
    let wizard = f.host.create_wizard("Wizard");
    let seen = Arc::new(parking_lot::Mutex::new(Vec::new()));
    let sink = seen.clone();
    let _sub = wizard.on_page_changed().subscribe(move |info: &WizardPageChangeInfo| sink.lock().push(*info));

    let info = WizardPageChangeInfo { last_page: Some(0), new_page: 2 };
    f.host.on_wizard_page_changed(wizard.handle(), info);

    assert_eq!(wizard.current_page(), 2);
    assert_eq!(*seen.lock(), vec![info]);
}

#[tokio::test]
async fn test_page_info_skips_unknown_pages() {
    let f = fixture();
    let wizard = f.host.create_wizard("Wizard");
    let page = f.host.create_wizard_page("Page", None);

    f.host.update_wizard_page_info(wizard.handle(), &[Handle(4_242), page.handle()], 0);
    assert_eq!(wizard.pages(), vec![page]);
}

#[tokio::test]
async fn test_wizard_push_order() {
    let f = fixture();
    let wizard = f.host.create_wizard("Wizard");
    let page = f.host.create_wizard_page("Page", None);
    f.host.add_page(&wizard, &page, None).await.expect("add");
    f.main.take();

    drop(f.host.open_wizard(&wizard));

    assert_eq!(f.main.methods(), vec![
        "setWizardPageDetails",
        "setButtonDetails",
        "setButtonDetails",
        "setButtonDetails",
        "setButtonDetails",
        "setButtonDetails",
        "setWizardDetails",
        "openWizard",
    ]);
    assert_eq!(wizard.lifecycle(), Lifecycle::Active);
}

// --- Editors ---

#[tokio::test]
async fn test_editor_registers_on_first_use() {
    let f = fixture();
    let before = f.host.registry().len();
    let editor = f.host.create_model_view_editor("Editor", extension(), None);

    assert_eq!(editor.registration(), Registration::OnFirstUse);
    assert_eq!(editor.handle(), None);
    assert_eq!(f.host.registry().len(), before);

    editor.register_content(|_view| async {});
    let handle = editor.handle().expect("handle after content");
    assert_eq!(f.host.registry().len(), before + 1);
    assert_eq!(editor.model_view_id(), Some(format!("modelViewEditor{}", handle.0)));

    editor.set_dirty(true);
    assert_eq!(editor.handle(), Some(handle));
    assert_eq!(f.main.last_for(handle), Some(MainCall::SetDirty { handle, dirty: true }));
}

#[tokio::test]
async fn test_editor_save_handler() {
    let f = fixture();
    let editor = f.host.create_model_view_editor("Editor", None, None);
    drop(editor.open_editor(None));
    let handle = editor.handle().expect("handle after open");

    editor.register_save_handler(|| async { false });
    assert!(!f.host.handle_save(handle).await);
}

// --- Validity ---

#[tokio::test]
async fn test_validity_notifications_reach_listeners() {
    let f = fixture();
    let page = f.host.create_wizard_page("Page", None);
    let seen = Arc::new(parking_lot::Mutex::new(Vec::new()));
    let sink = seen.clone();
    let _sub = page.on_validity_changed().subscribe(move |valid: &bool| sink.lock().push(*valid));

    f.host.on_panel_validity_changed(page.handle(), false);
    assert!(!page.valid());
    f.host.on_panel_validity_changed(page.handle(), true);
    assert!(page.valid());
    assert_eq!(*seen.lock(), vec![false, true]);
}

#[tokio::test]
async fn test_proxies_outlive_their_host_quietly() {
    let main = Arc::new(RecordingMainThread::new());
    let host = ModelViewDialogHost::new(main.clone());
    let dialog = host.create_dialog("T", None, None, None);
    drop(host);
    main.take();

    dialog.set_title("still local");
    assert_eq!(dialog.title().as_deref(), Some("still local"));
    assert!(main.calls().is_empty());
    assert!(matches!(dialog.open().await, Err(viewhost::Error::Disconnected)));
}
