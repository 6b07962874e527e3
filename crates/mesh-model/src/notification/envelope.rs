use serde::Deserialize;

use crate::{
    error::{ModelError, ModelResult},
    kind::{Operation, ResourceKind},
    notification::HandlerKey,
};

/// Decoded change notification.
///
/// The payload keeps the raw row JSON; handlers decode it into the type they expect.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NotificationEnvelope {
    pub channel: String,
    pub kind: ResourceKind,
    pub operation: Operation,
    pub payload: Vec<u8>,
}

#[derive(Deserialize)]
struct Wire {
    resource_type: String,
    operation: String,
    #[serde(default)]
    data: serde_json::Value,
}

impl NotificationEnvelope {
    /// Decode a NOTIFY payload of the form
    /// `{"resource_type": "...", "operation": "...", "data": {...}}`.
    pub fn decode(channel: &str, raw: &str) -> ModelResult<Self> {
        let wire: Wire = serde_json::from_str(raw)
            .map_err(|e| ModelError::Decode(format!("could not unmarshal notification: {e}")))?;

        let kind = wire.resource_type.parse::<ResourceKind>()?;
        let operation = wire.operation.parse::<Operation>()?;
        let payload = serde_json::to_vec(&wire.data)?;

        Ok(Self {
            channel: channel.to_string(),
            kind,
            operation,
            payload,
        })
    }

    pub fn key(&self) -> HandlerKey {
        HandlerKey::new(self.channel.clone(), self.kind)
    }
}
