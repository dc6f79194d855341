//! Loopback demo: an extension host drives a dialog and a wizard rendered by
//! an in-process main-thread mirror. Set `RUST_LOG` to adjust logging.

use std::sync::Arc;

use anyhow::Context;
use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use viewrpc::DialogMessage;
use viewrpc::MessageLevel;

use viewhost::BackgroundOperationInfo;
use viewhost::CommandRegistry;
use viewhost::CommentsHost;
use viewhost::DialogContent;
use viewhost::ExtHostRouter;
use viewhost::ExtensionInfo;
use viewhost::MainThreadMirror;
use viewhost::ModelViewDialogHost;
use viewhost::Peer;
use viewhost::PeerConfig;
use viewhost::testing::DuplexChannelTransport;

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(true).init();

    let (ext_side, main_side) = DuplexChannelTransport::pair();
    let ext = Peer::new(PeerConfig::new("ext-host"), Box::new(ext_side));
    let main = Peer::new(PeerConfig::new("main-thread"), Box::new(main_side));

    let dialogs = ModelViewDialogHost::new(ext.clone());
    let router = ExtHostRouter::new(dialogs.clone(), CommentsHost::new(ext.clone()), CommandRegistry::new());
    let mirror = Arc::new(MainThreadMirror::new(main.clone()));
    ext.serve(Arc::new(router)).context("extension host already served")?;
    main.serve(mirror.clone()).context("main thread already served")?;

    run_dialog(&dialogs, &mirror).await?;
    run_wizard(&dialogs, &mirror).await?;

    info!(applied = mirror.applied(), "demo finished");
    Ok(())
}

async fn run_dialog(dialogs: &ModelViewDialogHost, mirror: &MainThreadMirror) -> Result<()> {
    let extension = Some(ExtensionInfo::new("demo.connections"));
    let dialog = dialogs.create_dialog("New connection", Some("newConnection".into()), extension.clone(), Some(true));
    let general = dialogs.create_tab("General", extension.clone());
    let advanced = dialogs.create_tab("Advanced", extension);
    general.register_content(|view| async move { info!(view = %view.id, "drawing general tab") });
    advanced.register_content(|view| async move { info!(view = %view.id, "drawing advanced tab") });
    dialog.set_content(DialogContent::Tabs(vec![general, advanced]));
    dialog.register_operation(
        BackgroundOperationInfo::new("Connect", "Connecting to server")
            .with_operation(|context| info!(id = %context.operation_id, "connecting")),
    );

    dialogs.open_dialog(&dialog).await.context("open dialog")?;
    dialog.set_message(Some(DialogMessage::new("Server unreachable").with_level(MessageLevel::Warning)));

    mirror.click(dialog.ok_button().handle()).acked().await.context("click ok")?;
    let closed = mirror.request_close(dialog.handle()).await.context("close dialog")?;
    info!(handle = %dialog.handle(), closed, operation = ?dialog.operation_id(), "dialog done");
    Ok(())
}

async fn run_wizard(dialogs: &ModelViewDialogHost, mirror: &MainThreadMirror) -> Result<()> {
    let wizard = dialogs.create_wizard("Import data");
    for title in ["Source", "Columns", "Summary"] {
        let page = dialogs.create_wizard_page(title, None);
        dialogs.add_page(&wizard, &page, None).await.with_context(|| format!("add page {}", title))?;
    }
    let welcome = dialogs.create_wizard_page("Welcome", None);
    dialogs.add_page(&wizard, &welcome, Some(0)).await.context("add welcome page")?;
    wizard.register_navigation_validator(|info| async move { info.new_page != 3 });

    dialogs.open_wizard(&wizard).await.context("open wizard")?;
    let moved = mirror.navigate(wizard.handle(), 1).await.context("navigate")?;
    let blocked = !mirror.navigate(wizard.handle(), 3).await.context("navigate")?;
    dialogs.remove_page(&wizard, 2).await.context("remove page")?;

    let titles: Vec<String> = wizard.pages().iter().filter_map(|page| page.title()).collect();
    info!(moved, blocked, current = wizard.current_page(), ?titles, "wizard done");
    Ok(())
}
