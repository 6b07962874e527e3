use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// The requested row does not exist. Reconcilers treat this as benign.
    #[error("{entity} '{id}' not found")]
    NotFound { entity: &'static str, id: String },

    #[error("database error: {0}")]
    Database(String),

    #[error("decode error: {0}")]
    Decode(String),
}

impl StoreError {
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        StoreError::NotFound {
            entity,
            id: id.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }
}
