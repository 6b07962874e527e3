//! Resource handlers that turn change notifications into mesh operations.
//!
//! All reads happen inside one transaction per event and reflect the current
//! database state rather than the notification payload. External calls are made
//! only after that transaction is committed.
mod dispatcher;
pub use dispatcher::LabelDispatcher;

mod app_label;
pub use app_label::AppLabelHandler;

mod runtime_label;
pub use runtime_label::RuntimeLabelHandler;

mod lifecycle;
pub use lifecycle::{AppLifecycleHandler, RuntimeLifecycleHandler};

mod service_entries;

use tracing::warn;
use uuid::Uuid;

use mesh_model::{Application, LabelFilter, Runtime, SCENARIOS_KEY};

use crate::{
    error::CoreError,
    store::{ApplicationLister, LabelGetter, RequestScope, RuntimeLister, StoreError, Transaction},
};

/// `true` if the object carries a scenarios label with more than the default scenario.
///
/// A missing label excludes the object; a malformed one fails the event.
async fn in_non_default_scenario<Tx: Transaction>(
    labels: &dyn LabelGetter<Tx>,
    scope: &mut RequestScope<Tx>,
    object_id: &str,
) -> Result<bool, CoreError> {
    match labels.get_label(scope, object_id, SCENARIOS_KEY).await {
        Ok(label) => {
            if label.scenarios()?.is_default_only() {
                warn!(object_id, "object is only in the DEFAULT scenario, skipping");
                return Ok(false);
            }
            Ok(true)
        }
        Err(e) if e.is_not_found() => {
            warn!(object_id, "object has no scenarios label, skipping");
            Ok(false)
        }
        Err(e) => Err(e.into()),
    }
}

async fn list_all_runtimes<Tx: Transaction>(
    lister: &dyn RuntimeLister<Tx>,
    scope: &mut RequestScope<Tx>,
    filters: &[LabelFilter],
    page_size: u32,
) -> Result<Vec<Runtime>, StoreError> {
    let mut out = Vec::new();
    let mut cursor: Option<String> = None;
    loop {
        let page = lister
            .list(scope, filters, page_size, cursor.as_deref())
            .await?;
        out.extend(page.data);
        match page.next_cursor {
            Some(next) if !next.is_empty() => cursor = Some(next),
            _ => return Ok(out),
        }
    }
}

async fn list_all_applications<Tx: Transaction>(
    lister: &dyn ApplicationLister<Tx>,
    scope: &mut RequestScope<Tx>,
    runtime_id: Uuid,
    page_size: u32,
) -> Result<Vec<Application>, StoreError> {
    let mut out = Vec::new();
    let mut cursor: Option<String> = None;
    loop {
        let page = lister
            .list_by_runtime_id(scope, runtime_id, page_size, cursor.as_deref())
            .await?;
        out.extend(page.data);
        match page.next_cursor {
            Some(next) if !next.is_empty() => cursor = Some(next),
            _ => return Ok(out),
        }
    }
}
