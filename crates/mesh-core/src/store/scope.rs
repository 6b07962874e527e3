use crate::store::{StoreError, Transaction};

/// Transaction and tenant of one handled event, passed explicitly to every query.
pub struct RequestScope<Tx> {
    tx: Tx,
    tenant_id: String,
}

impl<Tx: Transaction> RequestScope<Tx> {
    pub fn new(tx: Tx, tenant_id: impl Into<String>) -> Self {
        Self {
            tx,
            tenant_id: tenant_id.into(),
        }
    }

    pub fn tenant_id(&self) -> &str {
        &self.tenant_id
    }

    pub fn tx_mut(&mut self) -> &mut Tx {
        &mut self.tx
    }

    /// Commit the underlying transaction, consuming the scope.
    pub async fn commit(self) -> Result<(), StoreError> {
        self.tx.commit().await
    }
}
