use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use mesh_model::{ApplicationRef, RuntimeRef};

use crate::{
    config::TargetSelector, error::CoreError, handler::NotificationHandler, script::ScriptRunner,
};

/// Registers the target application with the mesh once it is connected and
/// cleans it up when its row is deleted.
pub struct AppLifecycleHandler {
    scripts: Arc<dyn ScriptRunner>,
    targets: TargetSelector,
}

impl AppLifecycleHandler {
    pub fn new(scripts: Arc<dyn ScriptRunner>, targets: TargetSelector) -> Self {
        Self { scripts, targets }
    }

    /// Decode the row, `None` unless it is the target application.
    fn target_app(&self, payload: &[u8]) -> Result<Option<ApplicationRef>, CoreError> {
        let app = ApplicationRef::from_slice(payload)?;
        if !self.targets.is_target_application(&app.name) {
            debug!(app = %app.name, "event is not for the target application, skipping");
            return Ok(None);
        }
        Ok(Some(app))
    }

    async fn register(&self, payload: &[u8]) -> Result<(), CoreError> {
        let Some(app) = self.target_app(payload)? else {
            return Ok(());
        };
        if !app.is_connected() {
            info!(app = %app.name, condition = %app.status_condition, "application is not connected yet");
            return Ok(());
        }
        info!(app = %app.name, "registering application cluster");
        self.scripts.register_application().await?;
        Ok(())
    }
}

#[async_trait]
impl NotificationHandler for AppLifecycleHandler {
    fn name(&self) -> &'static str {
        "application-lifecycle"
    }

    async fn handle_create(&self, payload: &[u8]) -> Result<(), CoreError> {
        self.register(payload).await
    }

    async fn handle_update(&self, payload: &[u8]) -> Result<(), CoreError> {
        self.register(payload).await
    }

    async fn handle_delete(&self, payload: &[u8]) -> Result<(), CoreError> {
        let Some(app) = self.target_app(payload)? else {
            return Ok(());
        };
        info!(app = %app.name, "cleaning up application cluster");
        self.scripts.delete_application().await?;
        Ok(())
    }
}

/// Registers the target runtime with the mesh once it is connected and
/// cleans it up when its row is deleted.
pub struct RuntimeLifecycleHandler {
    scripts: Arc<dyn ScriptRunner>,
    targets: TargetSelector,
}

impl RuntimeLifecycleHandler {
    pub fn new(scripts: Arc<dyn ScriptRunner>, targets: TargetSelector) -> Self {
        Self { scripts, targets }
    }

    fn target(&self, payload: &[u8]) -> Result<Option<RuntimeRef>, CoreError> {
        let rt = RuntimeRef::from_slice(payload)?;
        if !self.targets.is_target_runtime(&rt.name) {
            debug!(runtime = %rt.name, "event is not for the target runtime, skipping");
            return Ok(None);
        }
        Ok(Some(rt))
    }

    async fn register(&self, payload: &[u8]) -> Result<(), CoreError> {
        let Some(rt) = self.target(payload)? else {
            return Ok(());
        };
        if !rt.is_connected() {
            info!(runtime = %rt.name, condition = %rt.status_condition, "runtime is not connected yet");
            return Ok(());
        }
        info!(runtime = %rt.name, "registering runtime cluster");
        self.scripts.register_runtime().await?;
        Ok(())
    }
}

#[async_trait]
impl NotificationHandler for RuntimeLifecycleHandler {
    fn name(&self) -> &'static str {
        "runtime-lifecycle"
    }

    async fn handle_create(&self, payload: &[u8]) -> Result<(), CoreError> {
        self.register(payload).await
    }

    async fn handle_update(&self, payload: &[u8]) -> Result<(), CoreError> {
        self.register(payload).await
    }

    async fn handle_delete(&self, payload: &[u8]) -> Result<(), CoreError> {
        let Some(rt) = self.target(payload)? else {
            return Ok(());
        };
        info!(runtime = %rt.name, "cleaning up runtime cluster");
        self.scripts.delete_runtime().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{RecordingScripts, ScriptCall};
    use serde_json::json;

    fn row(name: &str, condition: &str) -> Vec<u8> {
        serde_json::to_vec(&json!({
            "id": "id-1",
            "tenant_id": "tenant-1",
            "name": name,
            "description": null,
            "status_condition": condition,
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn registers_connected_target_application() {
        let scripts = Arc::new(RecordingScripts::default());
        let h = AppLifecycleHandler::new(scripts.clone(), TargetSelector::default());

        h.handle_create(&row("commerce-mock", "INITIAL")).await.unwrap();
        assert!(scripts.calls().is_empty());

        h.handle_update(&row("commerce-mock", "connected")).await.unwrap();
        assert_eq!(scripts.calls(), vec![ScriptCall::RegisterApplication]);
    }

    #[tokio::test]
    async fn application_delete_ignores_status() {
        let scripts = Arc::new(RecordingScripts::default());
        let h = AppLifecycleHandler::new(scripts.clone(), TargetSelector::default());

        h.handle_delete(&row("commerce-mock", "FAILED")).await.unwrap();
        h.handle_delete(&row("other-app", "CONNECTED")).await.unwrap();

        assert_eq!(scripts.calls(), vec![ScriptCall::DeleteApplication]);
    }

    #[tokio::test]
    async fn runtime_lifecycle_targets_only_named_runtime() {
        let scripts = Arc::new(RecordingScripts::default());
        let h = RuntimeLifecycleHandler::new(scripts.clone(), TargetSelector::default());

        h.handle_create(&row("prod-eu", "CONNECTED")).await.unwrap();
        h.handle_update(&row("runtime-poc", "Connected")).await.unwrap();
        h.handle_delete(&row("runtime-poc", "INITIAL")).await.unwrap();

        assert_eq!(
            scripts.calls(),
            vec![ScriptCall::RegisterRuntime, ScriptCall::DeleteRuntime]
        );
    }

    #[tokio::test]
    async fn script_failure_propagates() {
        let scripts = Arc::new(RecordingScripts::default().failing_on("register_runtime"));
        let h = RuntimeLifecycleHandler::new(scripts.clone(), TargetSelector::default());

        let err = h
            .handle_create(&row("runtime-poc", "CONNECTED"))
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Script(_)));
    }

    #[tokio::test]
    async fn malformed_row_is_decode_failure() {
        let scripts = Arc::new(RecordingScripts::default());
        let h = AppLifecycleHandler::new(scripts.clone(), TargetSelector::default());

        let err = h.handle_create(b"\"nope\"").await.unwrap_err();
        assert!(matches!(err, CoreError::Decode(_)));
    }
}
