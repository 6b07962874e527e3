use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

use crate::error::{ModelError, ModelResult};

/// Runtime row projection decoded from a change notification.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeRef {
    pub id: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub tenant_id: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub name: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub provider_name: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub description: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub status_condition: String,
    #[serde(rename = "healthcheck_url", deserialize_with = "null_as_empty")]
    pub health_check_url: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub integration_system_id: String,
}

/// Application row projection decoded from a change notification.
///
/// Same shape as [`RuntimeRef`]; kept distinct so handlers cannot mix them up.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicationRef {
    pub id: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub tenant_id: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub name: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub provider_name: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub description: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub status_condition: String,
    #[serde(rename = "healthcheck_url", deserialize_with = "null_as_empty")]
    pub health_check_url: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub integration_system_id: String,
}

macro_rules! row_ref_impl {
    ($ty:ty, $what:literal) => {
        impl $ty {
            /// Decode the projection from a notification payload.
            pub fn from_slice(data: &[u8]) -> ModelResult<Self> {
                serde_json::from_slice(data).map_err(|e| {
                    ModelError::Decode(format!(concat!("could not unmarshal ", $what, ": {}"), e))
                })
            }

            /// `true` if the status condition reads `connected` in any casing.
            pub fn is_connected(&self) -> bool {
                self.status_condition.eq_ignore_ascii_case("connected")
            }
        }
    };
}

row_ref_impl!(RuntimeRef, "runtime");
row_ref_impl!(ApplicationRef, "application");

/// Runtime read model returned by query services.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Runtime {
    pub id: String,
    pub tenant_id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub status_condition: StatusCondition,
}

/// Application read model returned by query services.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub id: String,
    pub tenant_id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub status: ApplicationStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub healthcheck_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub integration_system_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationStatus {
    pub condition: StatusCondition,
}

/// Connection condition of a runtime or an application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusCondition {
    Initial,
    Connected,
    Failed,
    /// Any value not known to this version, kept verbatim.
    Other(String),
}

impl StatusCondition {
    pub fn as_str(&self) -> &str {
        match self {
            StatusCondition::Initial => "INITIAL",
            StatusCondition::Connected => "CONNECTED",
            StatusCondition::Failed => "FAILED",
            StatusCondition::Other(s) => s,
        }
    }

    pub fn is_connected(&self) -> bool {
        matches!(self, StatusCondition::Connected)
    }
}

impl FromStr for StatusCondition {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_uppercase().as_str() {
            "INITIAL" => StatusCondition::Initial,
            "CONNECTED" => StatusCondition::Connected,
            "FAILED" => StatusCondition::Failed,
            _ => StatusCondition::Other(s.to_string()),
        })
    }
}

impl From<&str> for StatusCondition {
    fn from(s: &str) -> Self {
        match s.parse() {
            Ok(c) => c,
            Err(never) => match never {},
        }
    }
}

impl fmt::Display for StatusCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for StatusCondition {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for StatusCondition {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(StatusCondition::from(s.as_str()))
    }
}

/// Parse an object id as a UUID, as the stores key rows by UUID.
pub fn parse_object_id(id: &str) -> ModelResult<Uuid> {
    Uuid::parse_str(id).map_err(|e| ModelError::InvalidId {
        id: id.to_string(),
        reason: e.to_string(),
    })
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
