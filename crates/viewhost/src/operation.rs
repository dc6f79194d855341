//! # Background Operations
//!
//! A dialog or wizard may carry a deferred background operation. It is
//! registered up front and started when the user confirms (ok / done).
//!
//! ## Invariants
//!
//! - The operation id is synthesized at most once per owner, then reused.
//! - Nothing reaches the task manager unless both a descriptor and its body
//!   are present.

use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::Mutex;
use tracing::debug;
use tracing::info;

/// Body of a background operation. Runs once per registration.
pub type OperationBody = Arc<dyn Fn(&OperationContext) + Send + Sync>;

/// What an operation body learns about itself when it runs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OperationContext {
    pub operation_id: String,
    pub display_name: String,
}

#[derive(Clone)]
pub struct BackgroundOperationInfo {
    pub operation_id: Option<String>,
    pub display_name: String,
    pub description: String,
    pub is_cancelable: bool,
    pub connection: Option<String>,
    pub operation: Option<OperationBody>,
}

impl BackgroundOperationInfo {
    pub fn new(display_name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            operation_id: None,
            display_name: display_name.into(),
            description: description.into(),
            is_cancelable: false,
            connection: None,
            operation: None,
        }
    }

    pub fn with_operation<F>(mut self, body: F) -> Self
    where
        F: Fn(&OperationContext) + Send + Sync + 'static,
    {
        self.operation = Some(Arc::new(body));
        self
    }

    pub fn cancelable(mut self, is_cancelable: bool) -> Self {
        self.is_cancelable = is_cancelable;
        self
    }

    pub fn with_connection(mut self, connection: impl Into<String>) -> Self {
        self.connection = Some(connection.into());
        self
    }

    fn context(&self) -> OperationContext {
        OperationContext {
            operation_id: self.operation_id.clone().unwrap_or_default(),
            display_name: self.display_name.clone(),
        }
    }
}

impl std::fmt::Debug for BackgroundOperationInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackgroundOperationInfo")
            .field("operation_id", &self.operation_id)
            .field("display_name", &self.display_name)
            .field("description", &self.description)
            .field("is_cancelable", &self.is_cancelable)
            .field("connection", &self.connection)
            .field("operation", &self.operation.as_ref().map(|_| "<fn>"))
            .finish()
    }
}

/// Accepts operations for execution.
pub trait TaskManager: Send + Sync + 'static {
    fn register_task(&self, info: BackgroundOperationInfo);
}

/// Per-owner operation state: the stored descriptor and its id.
pub(crate) struct BackgroundOperationHandler {
    name: String,
    prefix: String,
    tasks: Arc<dyn TaskManager>,
    info: Mutex<Option<BackgroundOperationInfo>>,
}

impl BackgroundOperationHandler {
    pub(crate) fn new(name: impl Into<String>, prefix: impl Into<String>, tasks: Arc<dyn TaskManager>) -> Self {
        Self { name: name.into(), prefix: prefix.into(), tasks, info: Mutex::new(None) }
    }

    pub(crate) fn register_operation(&self, info: BackgroundOperationInfo) {
        *self.info.lock() = Some(info);
    }

    pub(crate) fn operation_id(&self) -> Option<String> {
        self.info.lock().as_ref().and_then(|info| info.operation_id.clone())
    }

    /// Starts the registered operation, if any.
    pub(crate) fn create_operation(&self) {
        let info = {
            let mut slot = self.info.lock();
            let Some(info) = slot.as_mut() else {
                return;
            };
            if info.operation_id.is_none() {
                info.operation_id = Some(format!("{}{}{}", self.prefix, unique_token(), self.name));
            }
            info.clone()
        };

        if info.operation.is_none() {
            debug!(name = %self.name, "operation descriptor has no body; not starting");
            return;
        }
        self.tasks.register_task(info);
    }
}

fn unique_token() -> String {
    format!("{:032x}", rand::random::<u128>())
}

/// Runs operations in-process and remembers what it was given.
#[derive(Default)]
pub struct LocalTaskManager {
    tasks: DashMap<String, BackgroundOperationInfo>,
    order: Mutex<Vec<String>>,
}

impl LocalTaskManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Operation ids in registration order, one entry per registration.
    pub fn registrations(&self) -> Vec<String> {
        self.order.lock().clone()
    }

    pub fn get(&self, operation_id: &str) -> Option<BackgroundOperationInfo> {
        self.tasks.get(operation_id).map(|entry| entry.clone())
    }
}

impl TaskManager for LocalTaskManager {
    fn register_task(&self, info: BackgroundOperationInfo) {
        let context = info.context();
        info!(operation_id = %context.operation_id, name = %context.display_name, "background operation registered");

        self.order.lock().push(context.operation_id.clone());
        let body = info.operation.clone();
        self.tasks.insert(context.operation_id.clone(), info);

        let Some(body) = body else {
            return;
        };
        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                runtime.spawn_blocking(move || body(&context));
            }
            Err(_) => body(&context),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::AtomicUsize;
    use std::sync::atomic::Ordering;

    #[test]
    fn test_no_descriptor_is_a_no_op() {
        let tasks = Arc::new(LocalTaskManager::new());
        let handler = BackgroundOperationHandler::new("dialog", "OperationId", tasks.clone());

        handler.create_operation();
        assert!(handler.operation_id().is_none());
        assert!(tasks.registrations().is_empty());
    }

    #[test]
    fn test_id_is_generated_once() {
        let tasks = Arc::new(LocalTaskManager::new());
        let runs = Arc::new(AtomicUsize::new(0));
        let handler = BackgroundOperationHandler::new("dialog", "OperationId", tasks.clone());

        let r = runs.clone();
        handler.register_operation(
            BackgroundOperationInfo::new("Export", "exports things").with_operation(move |_| {
                r.fetch_add(1, Ordering::SeqCst);
            }),
        );

        handler.create_operation();
        let first = handler.operation_id().expect("id after first start");
        handler.create_operation();
        let second = handler.operation_id().expect("id after second start");

        assert_eq!(first, second);
        assert!(first.starts_with("OperationId"));
        assert!(first.ends_with("dialog"));
        assert_eq!(tasks.registrations(), vec![first.clone(), first]);
        // No runtime here, so bodies ran inline.
        assert_eq!(runs.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_descriptor_without_body_is_not_forwarded() {
        let tasks = Arc::new(LocalTaskManager::new());
        let handler = BackgroundOperationHandler::new("wizardSetup", "OperationId", tasks.clone());

        handler.register_operation(BackgroundOperationInfo::new("Nothing", "no body"));
        handler.create_operation();

        assert!(handler.operation_id().is_some());
        assert!(tasks.registrations().is_empty());
    }

    #[test]
    fn test_supplied_id_is_kept() {
        let tasks = Arc::new(LocalTaskManager::new());
        let handler = BackgroundOperationHandler::new("dialog", "OperationId", tasks.clone());

        let mut info = BackgroundOperationInfo::new("Named", "").with_operation(|_| {});
        info.operation_id = Some("fixed".into());
        handler.register_operation(info);
        handler.create_operation();

        assert_eq!(handler.operation_id().as_deref(), Some("fixed"));
        assert!(tasks.get("fixed").is_some());
    }
}
