use async_trait::async_trait;
use sqlx::{PgConnection, PgPool, Postgres};

use mesh_core::{StoreError, Transaction, Transactioner};

use crate::error::store_err;

/// Open Postgres transaction; rolled back by sqlx when dropped uncommitted.
pub struct PgTx(sqlx::Transaction<'static, Postgres>);

impl PgTx {
    pub(crate) fn conn(&mut self) -> &mut PgConnection {
        &mut self.0
    }
}

#[async_trait]
impl Transaction for PgTx {
    async fn commit(self) -> Result<(), StoreError> {
        self.0.commit().await.map_err(store_err)
    }
}

#[derive(Clone)]
pub struct PgTransactioner {
    pool: PgPool,
}

impl PgTransactioner {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Transactioner for PgTransactioner {
    type Tx = PgTx;

    async fn begin(&self) -> Result<PgTx, StoreError> {
        self.pool.begin().await.map(PgTx).map_err(store_err)
    }
}
