//! Handler seams the notification processor dispatches to.
//!
//! A [`NotificationHandler`] receives the raw row JSON of one resource kind and is
//! registered against a [`mesh_model::HandlerKey`]. A [`LabelHandler`] receives an
//! already decoded [`Label`] and sits behind the label dispatcher.
use async_trait::async_trait;

use mesh_model::{Label, Operation};

use crate::error::CoreError;

/// Handler of raw change notifications for one resource kind.
#[async_trait]
pub trait NotificationHandler: Send + Sync {
    /// Handler name used in logs and diagnostics.
    fn name(&self) -> &'static str;

    async fn handle_create(&self, payload: &[u8]) -> Result<(), CoreError>;

    async fn handle_update(&self, payload: &[u8]) -> Result<(), CoreError>;

    async fn handle_delete(&self, payload: &[u8]) -> Result<(), CoreError>;

    /// Route to the method matching `operation`.
    async fn handle(&self, operation: Operation, payload: &[u8]) -> Result<(), CoreError> {
        match operation {
            Operation::Create => self.handle_create(payload).await,
            Operation::Update => self.handle_update(payload).await,
            Operation::Delete => self.handle_delete(payload).await,
        }
    }
}

/// Handler of scenario label changes for one owner kind (application or runtime).
#[async_trait]
pub trait LabelHandler: Send + Sync {
    fn name(&self) -> &'static str;

    async fn handle_create(&self, label: &Label) -> Result<(), CoreError>;

    async fn handle_update(&self, label: &Label) -> Result<(), CoreError>;

    async fn handle_delete(&self, label: &Label) -> Result<(), CoreError>;
}
