use std::{collections::BTreeMap, sync::Arc};

use async_trait::async_trait;
use tracing::{debug, info, instrument};

use mesh_model::{Label, Operation, ResourceKind};

use crate::{
    error::CoreError,
    handler::{LabelHandler, NotificationHandler},
};

/// Entry point for label notifications.
///
/// Rules, in order:
/// 1. keys not containing `scenario` (any casing) are ignored;
/// 2. on create and delete a value of exactly `["DEFAULT"]` is ignored, update always proceeds;
/// 3. labels owned by an application go to the application handler, labels owned by
///    a runtime to the runtime handler, anything else is ignored;
/// 4. a missing handler for the owner kind is [`CoreError::InvalidConfiguration`].
#[derive(Default)]
pub struct LabelDispatcher {
    handlers: BTreeMap<ResourceKind, Arc<dyn LabelHandler>>,
}

impl LabelDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Route labels owned by `kind` to `handler`, replacing any previous one.
    pub fn with_handler(mut self, kind: ResourceKind, handler: Arc<dyn LabelHandler>) -> Self {
        self.handlers.insert(kind, handler);
        self
    }

    fn route(&self, label: &Label) -> Result<Option<&Arc<dyn LabelHandler>>, CoreError> {
        let kind = if label.app_id().is_some() {
            ResourceKind::Application
        } else if label.runtime_id().is_some() {
            ResourceKind::Runtime
        } else {
            info!(label_id = %label.id, key = %label.key, "label does not belong to a runtime or an application");
            return Ok(None);
        };

        self.handlers.get(&kind).map(Some).ok_or_else(|| {
            CoreError::InvalidConfiguration(format!("handler for {kind} labels not found"))
        })
    }

    #[instrument(level = "debug", skip_all, fields(operation = %operation))]
    async fn dispatch(&self, operation: Operation, payload: &[u8]) -> Result<(), CoreError> {
        let label = Label::from_slice(payload)?;

        if !label.is_scenario_like() {
            debug!(key = %label.key, "label is not a scenario label, nothing to do");
            return Ok(());
        }

        if operation != Operation::Update && label.scenarios()?.is_default_only() {
            debug!(key = %label.key, "label holds only the DEFAULT scenario, nothing to do");
            return Ok(());
        }

        let Some(handler) = self.route(&label)? else {
            return Ok(());
        };

        match operation {
            Operation::Create => handler.handle_create(&label).await?,
            Operation::Update => handler.handle_update(&label).await?,
            Operation::Delete => handler.handle_delete(&label).await?,
        }

        info!(label_id = %label.id, handler = handler.name(), "successfully handled {operation} event for label");
        Ok(())
    }
}

#[async_trait]
impl NotificationHandler for LabelDispatcher {
    fn name(&self) -> &'static str {
        "label-dispatcher"
    }

    async fn handle_create(&self, payload: &[u8]) -> Result<(), CoreError> {
        self.dispatch(Operation::Create, payload).await
    }

    async fn handle_update(&self, payload: &[u8]) -> Result<(), CoreError> {
        self.dispatch(Operation::Update, payload).await
    }

    async fn handle_delete(&self, payload: &[u8]) -> Result<(), CoreError> {
        self.dispatch(Operation::Delete, payload).await
    }
}
