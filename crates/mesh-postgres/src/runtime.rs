use async_trait::async_trait;
use sqlx::{FromRow, Postgres, QueryBuilder};
use tracing::debug;
use uuid::Uuid;

use mesh_core::{RequestScope, RuntimeGetter, RuntimeLister, StoreError};
use mesh_model::{LabelFilter, Page, Runtime, StatusCondition};

use crate::{
    PgTx, cursor,
    error::{parse_id, store_err},
};

#[derive(Debug, FromRow)]
struct RuntimeRow {
    id: Uuid,
    tenant_id: Uuid,
    name: String,
    description: Option<String>,
    status_condition: String,
    #[sqlx(default)]
    total_count: i64,
}

impl From<RuntimeRow> for Runtime {
    fn from(r: RuntimeRow) -> Self {
        Runtime {
            id: r.id.to_string(),
            tenant_id: r.tenant_id.to_string(),
            name: r.name,
            description: r.description,
            status_condition: StatusCondition::from(r.status_condition.as_str()),
        }
    }
}

/// Runtimes table, scoped by tenant.
#[derive(Debug, Clone, Copy, Default)]
pub struct PgRuntimeRepository;

/// Runtimes of `tenant` carrying every filtered label, ordered by name.
///
/// A filter without query matches on the key alone; with a query the label
/// value must satisfy the JSON-path predicate (`@?`).
fn list_query<'a>(
    tenant: Uuid,
    filters: &'a [LabelFilter],
    limit: i64,
    offset: i64,
) -> QueryBuilder<'a, Postgres> {
    let mut qb = QueryBuilder::new(
        "SELECT r.id, r.tenant_id, r.name, r.description, r.status_condition, \
         COUNT(*) OVER() AS total_count FROM runtimes r WHERE r.tenant_id = ",
    );
    qb.push_bind(tenant);

    for f in filters {
        qb.push(" AND EXISTS (SELECT 1 FROM labels l WHERE l.runtime_id = r.id AND l.key = ");
        qb.push_bind(f.key.as_str());
        if let Some(query) = &f.query {
            qb.push(" AND l.value @? ");
            qb.push_bind(query.as_str());
            qb.push("::jsonpath");
        }
        qb.push(")");
    }

    qb.push(" ORDER BY r.name, r.id LIMIT ");
    qb.push_bind(limit);
    qb.push(" OFFSET ");
    qb.push_bind(offset);
    qb
}

#[async_trait]
impl RuntimeLister<PgTx> for PgRuntimeRepository {
    async fn list(
        &self,
        scope: &mut RequestScope<PgTx>,
        filters: &[LabelFilter],
        page_size: u32,
        cursor: Option<&str>,
    ) -> Result<Page<Runtime>, StoreError> {
        let tenant = parse_id(scope.tenant_id())?;
        let offset = cursor::offset(cursor)?;

        let mut qb = list_query(tenant, filters, i64::from(page_size), offset);
        let rows: Vec<RuntimeRow> = qb
            .build_query_as::<RuntimeRow>()
            .fetch_all(scope.tx_mut().conn())
            .await
            .map_err(store_err)?;

        let total = rows.first().map_or(0, |r| r.total_count);
        let next_cursor = cursor::next(offset, rows.len(), total);
        debug!(returned = rows.len(), total, "runtimes listed");

        Ok(Page {
            data: rows.into_iter().map(Runtime::from).collect(),
            total_count: usize::try_from(total).unwrap_or_default(),
            next_cursor,
        })
    }
}

#[async_trait]
impl RuntimeGetter<PgTx> for PgRuntimeRepository {
    async fn get(&self, scope: &mut RequestScope<PgTx>, id: &str) -> Result<Runtime, StoreError> {
        let tenant = parse_id(scope.tenant_id())?;
        let runtime_id = parse_id(id)?;

        let row: Option<RuntimeRow> = sqlx::query_as(
            "SELECT id, tenant_id, name, description, status_condition \
             FROM runtimes WHERE tenant_id = $1 AND id = $2",
        )
        .bind(tenant)
        .bind(runtime_id)
        .fetch_optional(scope.tx_mut().conn())
        .await
        .map_err(store_err)?;

        row.map(Runtime::from)
            .ok_or_else(|| StoreError::not_found("runtime", id))
    }
}
