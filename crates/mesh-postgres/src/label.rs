use async_trait::async_trait;
use sqlx::FromRow;
use uuid::Uuid;

use mesh_core::{LabelGetter, RequestScope, StoreError};
use mesh_model::Label;

use crate::{
    PgTx,
    error::{parse_id, store_err},
};

/// Object type a label repository reads labels of.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelOwner {
    Application,
    Runtime,
}

impl LabelOwner {
    fn query(self) -> &'static str {
        match self {
            LabelOwner::Application => {
                "SELECT id, tenant_id, key, app_id, runtime_id, value FROM labels \
                 WHERE tenant_id = $1 AND app_id = $2 AND key = $3"
            }
            LabelOwner::Runtime => {
                "SELECT id, tenant_id, key, app_id, runtime_id, value FROM labels \
                 WHERE tenant_id = $1 AND runtime_id = $2 AND key = $3"
            }
        }
    }
}

#[derive(Debug, FromRow)]
struct LabelRow {
    id: Uuid,
    tenant_id: Uuid,
    key: String,
    app_id: Option<Uuid>,
    runtime_id: Option<Uuid>,
    value: serde_json::Value,
}

impl From<LabelRow> for Label {
    fn from(r: LabelRow) -> Self {
        Label {
            id: r.id.to_string(),
            tenant_id: r.tenant_id.to_string(),
            key: r.key,
            app_id: r.app_id.map(|id| id.to_string()),
            runtime_id: r.runtime_id.map(|id| id.to_string()),
            value: r.value,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PgLabelRepository {
    owner: LabelOwner,
}

impl PgLabelRepository {
    pub fn new(owner: LabelOwner) -> Self {
        Self { owner }
    }
}

#[async_trait]
impl LabelGetter<PgTx> for PgLabelRepository {
    async fn get_label(
        &self,
        scope: &mut RequestScope<PgTx>,
        object_id: &str,
        key: &str,
    ) -> Result<Label, StoreError> {
        let tenant = parse_id(scope.tenant_id())?;
        let owner_id = parse_id(object_id)?;

        let row: Option<LabelRow> = sqlx::query_as(self.owner.query())
            .bind(tenant)
            .bind(owner_id)
            .bind(key)
            .fetch_optional(scope.tx_mut().conn())
            .await
            .map_err(store_err)?;

        row.map(Label::from)
            .ok_or_else(|| StoreError::not_found("label", format!("{object_id}/{key}")))
    }
}
