//! # Extension-Host Router
//!
//! The `Handler` for the extension-host end of a peer. Each `HostCall` goes
//! to the dialog host, the comments host or the command registry.
//! Notifications reply `null` once applied; requests reply with their answer.

use futures::FutureExt;
use futures::future::BoxFuture;
use futures::future::ready;

use viewrpc::FailureReason;
use viewrpc::HostCall;
use viewrpc::Invocation;
use viewrpc::ReplyStatus;

use crate::commands::CommandRegistry;
use crate::comments::CommentsHost;
use crate::host::ModelViewDialogHost;
use crate::peer::Handler;

#[derive(Clone)]
pub struct ExtHostRouter {
    dialogs: ModelViewDialogHost,
    comments: CommentsHost,
    commands: CommandRegistry,
}

impl ExtHostRouter {
    pub fn new(dialogs: ModelViewDialogHost, comments: CommentsHost, commands: CommandRegistry) -> Self {
        Self { dialogs, comments, commands }
    }

    pub fn dialogs(&self) -> &ModelViewDialogHost {
        &self.dialogs
    }

    pub fn comments(&self) -> &CommentsHost {
        &self.comments
    }

    pub fn commands(&self) -> &CommandRegistry {
        &self.commands
    }

    fn route(&self, call: HostCall) -> BoxFuture<'static, ReplyStatus> {
        let applied = || -> BoxFuture<'static, ReplyStatus> { ready(Ok(serde_json::Value::Null)).boxed() };
        let answer = |answer: BoxFuture<'static, bool>| -> BoxFuture<'static, ReplyStatus> {
            answer.map(|ok| Ok(serde_json::Value::Bool(ok))).boxed()
        };

        match call {
            HostCall::OnButtonClick { handle } => {
                self.dialogs.on_button_click(handle);
                applied()
            }
            HostCall::OnPanelValidityChanged { handle, valid } => {
                self.dialogs.on_panel_validity_changed(handle, valid);
                applied()
            }
            HostCall::OnWizardPageChanged { handle, info } => {
                self.dialogs.on_wizard_page_changed(handle, info);
                applied()
            }
            HostCall::UpdateWizardPageInfo { handle, pages, current_page } => {
                self.dialogs.update_wizard_page_info(handle, &pages, current_page);
                applied()
            }
            HostCall::ValidateNavigation { handle, info } => answer(self.dialogs.validate_navigation(handle, info)),
            HostCall::ValidateDialogClose { handle } => answer(self.dialogs.validate_dialog_close(handle)),
            HostCall::HandleSave { handle } => answer(self.dialogs.handle_save(handle)),
            HostCall::CreateCommentThreadTemplate { controller, uri, range } => {
                self.comments.create_comment_thread_template(controller, &uri, range);
                applied()
            }
            HostCall::UpdateCommentThreadTemplate { controller, thread, range } => {
                self.comments.update_comment_thread_template(controller, thread, range);
                applied()
            }
            HostCall::DeleteCommentThread { controller, thread } => {
                self.comments.delete_comment_thread(controller, thread);
                applied()
            }
            HostCall::ExecuteCommand { id, args } => {
                let args = args.into_iter().map(|arg| self.comments.process_argument(arg)).collect();
                match self.commands.execute(&id, args) {
                    Some(result) => result.map(ReplyStatus::Ok).boxed(),
                    None => ready(Err(FailureReason::CommandNotFound(id))).boxed(),
                }
            }
        }
    }
}

impl Handler for ExtHostRouter {
    fn handle(&self, invocation: Invocation) -> BoxFuture<'static, ReplyStatus> {
        match invocation {
            Invocation::ExtHost(call) => self.route(call),
            Invocation::MainThread(_) => ready(Err(FailureReason::UnsupportedTarget)).boxed(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;

    use serde_json::json;

    use viewrpc::Handle;
    use viewrpc::MainCall;
    use viewrpc::WizardPageChangeInfo;

    use crate::marshal::Argument;
    use crate::testing::RecordingMainThread;

    fn router() -> ExtHostRouter {
        let main = Arc::new(RecordingMainThread::new());
        ExtHostRouter::new(ModelViewDialogHost::new(main.clone()), CommentsHost::new(main), CommandRegistry::new())
    }

    #[tokio::test]
    async fn test_requests_for_unknown_handles_accept() {
        let router = router();
        let info = WizardPageChangeInfo { last_page: Some(0), new_page: 1 };

        let status = router.handle(HostCall::ValidateNavigation { handle: Handle(77), info }.into()).await;
        assert_eq!(status, Ok(json!(true)));
        let status = router.handle(HostCall::HandleSave { handle: Handle(78) }.into()).await;
        assert_eq!(status, Ok(json!(true)));
    }

    #[tokio::test]
    async fn test_notifications_reply_null() {
        let router = router();
        let status = router.handle(HostCall::OnButtonClick { handle: Handle(5) }.into()).await;
        assert_eq!(status, Ok(serde_json::Value::Null));
    }

    #[tokio::test]
    async fn test_main_calls_are_rejected() {
        let router = router();
        let status = router.handle(MainCall::CloseDialog { handle: Handle(0) }.into()).await;
        assert_eq!(status, Err(FailureReason::UnsupportedTarget));
    }

    #[tokio::test]
    async fn test_execute_command() {
        let router = router();
        router.commands().register_command("echo", |args: Vec<Argument>| async move {
            json!(args.iter().filter_map(|a| a.as_raw().cloned()).collect::<Vec<_>>())
        });

        let status = router.handle(HostCall::ExecuteCommand { id: "echo".into(), args: vec![json!("a"), json!(2)] }.into()).await;
        assert_eq!(status, Ok(json!(["a", 2])));

        let status = router.handle(HostCall::ExecuteCommand { id: "nope".into(), args: vec![] }.into()).await;
        assert_eq!(status, Err(FailureReason::CommandNotFound("nope".into())));
    }
}
