use mesh_core::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PostgresError {
    #[error("invalid database configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to connect: {0}")]
    Connect(#[from] sqlx::Error),
}

/// Map a driver error onto the store error the reconcilers understand.
pub(crate) fn store_err(e: sqlx::Error) -> StoreError {
    match e {
        sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) | sqlx::Error::ColumnNotFound(_) => {
            StoreError::Decode(e.to_string())
        }
        other => StoreError::Database(other.to_string()),
    }
}

/// Ids are UUIDs in the database; anything else cannot match a row.
pub(crate) fn parse_id(id: &str) -> Result<uuid::Uuid, StoreError> {
    mesh_model::parse_object_id(id).map_err(|e| StoreError::Decode(e.to_string()))
}
