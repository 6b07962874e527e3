use async_trait::async_trait;
use sqlx::FromRow;
use uuid::Uuid;

use mesh_core::{ApplicationLister, RequestScope, StoreError};
use mesh_model::{Application, ApplicationStatus, Page, SCENARIOS_KEY, StatusCondition};

use crate::{
    PgTx, cursor,
    error::{parse_id, store_err},
};

#[derive(Debug, FromRow)]
struct ApplicationRow {
    id: Uuid,
    tenant_id: Uuid,
    name: String,
    provider_name: Option<String>,
    description: Option<String>,
    status_condition: String,
    healthcheck_url: Option<String>,
    integration_system_id: Option<Uuid>,
    total_count: i64,
}

impl From<ApplicationRow> for Application {
    fn from(r: ApplicationRow) -> Self {
        Application {
            id: r.id.to_string(),
            tenant_id: r.tenant_id.to_string(),
            name: r.name,
            provider_name: r.provider_name,
            description: r.description,
            status: ApplicationStatus {
                condition: StatusCondition::from(r.status_condition.as_str()),
            },
            healthcheck_url: r.healthcheck_url,
            integration_system_id: r.integration_system_id.map(|id| id.to_string()),
        }
    }
}

/// Applications table, scoped by tenant.
#[derive(Debug, Clone, Copy, Default)]
pub struct PgApplicationRepository;

/// Applications whose scenarios label shares at least one entry with the runtime's.
const LIST_BY_RUNTIME: &str = "\
SELECT a.id, a.tenant_id, a.name, a.provider_name, a.description, a.status_condition, \
       a.healthcheck_url, a.integration_system_id, COUNT(*) OVER() AS total_count \
FROM applications a \
JOIN labels al ON al.app_id = a.id AND al.key = $3 \
JOIN labels rl ON rl.runtime_id = $2 AND rl.key = $3 \
WHERE a.tenant_id = $1 \
  AND al.value ?| ARRAY(SELECT jsonb_array_elements_text(rl.value)) \
ORDER BY a.name, a.id \
LIMIT $4 OFFSET $5";

#[async_trait]
impl ApplicationLister<PgTx> for PgApplicationRepository {
    async fn list_by_runtime_id(
        &self,
        scope: &mut RequestScope<PgTx>,
        runtime_id: Uuid,
        page_size: u32,
        cursor: Option<&str>,
    ) -> Result<Page<Application>, StoreError> {
        let tenant = parse_id(scope.tenant_id())?;
        let offset = cursor::offset(cursor)?;

        let exists: Option<i32> =
            sqlx::query_scalar("SELECT 1 FROM runtimes WHERE tenant_id = $1 AND id = $2")
                .bind(tenant)
                .bind(runtime_id)
                .fetch_optional(scope.tx_mut().conn())
                .await
                .map_err(store_err)?;
        if exists.is_none() {
            return Err(StoreError::not_found("runtime", runtime_id.to_string()));
        }

        let rows: Vec<ApplicationRow> = sqlx::query_as(LIST_BY_RUNTIME)
            .bind(tenant)
            .bind(runtime_id)
            .bind(SCENARIOS_KEY)
            .bind(i64::from(page_size))
            .bind(offset)
            .fetch_all(scope.tx_mut().conn())
            .await
            .map_err(store_err)?;

        let total = rows.first().map_or(0, |r| r.total_count);
        let next_cursor = cursor::next(offset, rows.len(), total);

        Ok(Page {
            data: rows.into_iter().map(Application::from).collect(),
            total_count: usize::try_from(total).unwrap_or_default(),
            next_cursor,
        })
    }
}
