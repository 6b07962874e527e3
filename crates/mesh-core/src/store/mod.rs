//! Transaction boundary and read-only query seams used by the reconcilers.
//!
//! Handlers never share a transaction: every event opens one through a
//! [`Transactioner`], wraps it into a [`RequestScope`] together with the tenant
//! and either commits it or drops it, which rolls it back.
mod error;
pub use error::StoreError;

mod scope;
pub use scope::RequestScope;

mod query;
pub use query::{ApplicationLister, LabelGetter, Queries, RuntimeGetter, RuntimeLister};

use async_trait::async_trait;

/// Open database transaction.
///
/// Dropping a transaction without calling [`commit`](Transaction::commit) rolls it back.
#[async_trait]
pub trait Transaction: Send + 'static {
    async fn commit(self) -> Result<(), StoreError>;
}

/// Factory of transactions.
#[async_trait]
pub trait Transactioner: Send + Sync + 'static {
    type Tx: Transaction;

    async fn begin(&self) -> Result<Self::Tx, StoreError>;
}
