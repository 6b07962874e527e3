use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use mesh_model::{Application, Label, LabelFilter, Page, Runtime};

use crate::store::{RequestScope, StoreError, Transaction};

#[async_trait]
pub trait RuntimeLister<Tx: Transaction>: Send + Sync {
    /// Runtimes of the scope's tenant matching every filter.
    async fn list(
        &self,
        scope: &mut RequestScope<Tx>,
        filters: &[LabelFilter],
        page_size: u32,
        cursor: Option<&str>,
    ) -> Result<Page<Runtime>, StoreError>;
}

#[async_trait]
pub trait RuntimeGetter<Tx: Transaction>: Send + Sync {
    async fn get(&self, scope: &mut RequestScope<Tx>, id: &str) -> Result<Runtime, StoreError>;
}

#[async_trait]
pub trait ApplicationLister<Tx: Transaction>: Send + Sync {
    /// Applications sharing a scenario with the runtime.
    ///
    /// Fails with [`StoreError::NotFound`] when the runtime does not exist.
    async fn list_by_runtime_id(
        &self,
        scope: &mut RequestScope<Tx>,
        runtime_id: Uuid,
        page_size: u32,
        cursor: Option<&str>,
    ) -> Result<Page<Application>, StoreError>;
}

#[async_trait]
pub trait LabelGetter<Tx: Transaction>: Send + Sync {
    /// Label `key` of the object; [`StoreError::NotFound`] when absent.
    async fn get_label(
        &self,
        scope: &mut RequestScope<Tx>,
        object_id: &str,
        key: &str,
    ) -> Result<Label, StoreError>;
}

/// Query services a reconciler reads through.
pub struct Queries<Tx: Transaction> {
    pub runtimes: Arc<dyn RuntimeLister<Tx>>,
    pub runtime_getter: Arc<dyn RuntimeGetter<Tx>>,
    pub applications: Arc<dyn ApplicationLister<Tx>>,
    pub app_labels: Arc<dyn LabelGetter<Tx>>,
    pub runtime_labels: Arc<dyn LabelGetter<Tx>>,
}

impl<Tx: Transaction> Clone for Queries<Tx> {
    fn clone(&self) -> Self {
        Self {
            runtimes: Arc::clone(&self.runtimes),
            runtime_getter: Arc::clone(&self.runtime_getter),
            applications: Arc::clone(&self.applications),
            app_labels: Arc::clone(&self.app_labels),
            runtime_labels: Arc::clone(&self.runtime_labels),
        }
    }
}
