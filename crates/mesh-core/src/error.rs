use thiserror::Error;

use mesh_model::{HandlerKey, ModelError};

use crate::{listener::ListenerError, script::ScriptError, store::StoreError};

#[derive(Debug, Error)]
pub enum CoreError {
    /// Wiring problem, e.g. a label handler that was never registered.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("handler already registered for key '{0}'")]
    DuplicateHandler(HandlerKey),

    #[error(transparent)]
    Decode(#[from] ModelError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("script error: {0}")]
    Script(#[from] ScriptError),

    #[error("transport error: {0}")]
    Transport(#[from] ListenerError),

    #[error("supervisor error: {0}")]
    Supervisor(String),
}
