use std::fmt;

use serde::{Deserialize, Serialize};

use crate::kind::ResourceKind;

/// Routing key of a handler: the channel a notification arrived on plus the kind of row it carries.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandlerKey {
    pub channel: String,
    pub kind: ResourceKind,
}

impl HandlerKey {
    pub fn new(channel: impl Into<String>, kind: ResourceKind) -> Self {
        Self {
            channel: channel.into(),
            kind,
        }
    }
}

impl fmt::Display for HandlerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.channel, self.kind)
    }
}
