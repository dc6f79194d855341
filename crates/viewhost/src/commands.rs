//! # Commands
//!
//! Extension commands the main side can execute by id. Arguments are
//! rehydrated before the handler sees them.

use std::future::Future;
use std::sync::Arc;

use dashmap::DashMap;
use futures::future::BoxFuture;

use crate::marshal::Argument;

pub type CommandHandler = Arc<dyn Fn(Vec<Argument>) -> BoxFuture<'static, serde_json::Value> + Send + Sync>;

#[derive(Clone, Default)]
pub struct CommandRegistry {
    commands: Arc<DashMap<String, CommandHandler>>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` under `id`, replacing any previous handler.
    pub fn register_command<F, Fut>(&self, id: impl Into<String>, handler: F)
    where
        F: Fn(Vec<Argument>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = serde_json::Value> + Send + 'static,
    {
        let handler: CommandHandler =
            Arc::new(move |args| -> BoxFuture<'static, serde_json::Value> { Box::pin(handler(args)) });
        self.commands.insert(id.into(), handler);
    }

    pub fn unregister_command(&self, id: &str) -> bool {
        self.commands.remove(id).is_some()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.commands.contains_key(id)
    }

    /// Starts the command. `None` if no command has that id.
    pub fn execute(&self, id: &str, args: Vec<Argument>) -> Option<BoxFuture<'static, serde_json::Value>> {
        let handler = self.commands.get(id).map(|entry| entry.clone())?;
        Some(handler(args))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    #[tokio::test]
    async fn test_execute_registered_command() {
        let commands = CommandRegistry::new();
        commands.register_command("count", |args: Vec<Argument>| async move { json!(args.len()) });

        let result = commands.execute("count", vec![Argument::Raw(json!(1)), Argument::Raw(json!(2))]).expect("registered");
        assert_eq!(result.await, json!(2));
    }

    #[test]
    fn test_unknown_command_is_none() {
        let commands = CommandRegistry::new();
        assert!(commands.execute("missing", vec![]).is_none());
        assert!(!commands.unregister_command("missing"));
    }
}
