use serde::{Deserialize, Deserializer, Serialize};

use crate::{
    domain::{SCENARIOS_KEY, ScenarioSet},
    error::{ModelError, ModelResult},
};

/// Label row as it arrives in a change notification or from a label query.
///
/// The value is kept as raw JSON: only scenario labels are required to hold
/// a list of strings, and they are decoded on demand through [`Label::scenarios`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Label {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub tenant_id: String,
    pub key: String,
    /// Owning application, if any.
    #[serde(default, deserialize_with = "non_empty")]
    pub app_id: Option<String>,
    /// Owning runtime, if any.
    #[serde(default, deserialize_with = "non_empty")]
    pub runtime_id: Option<String>,
    #[serde(default)]
    pub value: serde_json::Value,
}

impl Label {
    /// Decode a label from a notification payload.
    pub fn from_slice(data: &[u8]) -> ModelResult<Self> {
        serde_json::from_slice(data)
            .map_err(|e| ModelError::Decode(format!("could not unmarshal label: {e}")))
    }

    /// `true` if the key names a scenario label in any casing (`scenarios`, `Scenario_x`, ...).
    pub fn is_scenario_like(&self) -> bool {
        self.key.to_lowercase().contains("scenario")
    }

    /// `true` only for the exact scenarios key.
    pub fn is_scenarios(&self) -> bool {
        self.key == SCENARIOS_KEY
    }

    /// Typed view of the value as a scenario set.
    pub fn scenarios(&self) -> ModelResult<ScenarioSet> {
        ScenarioSet::try_from(&self.value)
    }

    pub fn app_id(&self) -> Option<&str> {
        self.app_id.as_deref()
    }

    pub fn runtime_id(&self) -> Option<&str> {
        self.runtime_id.as_deref()
    }
}

/// Treats `null`, a missing field and `""` alike.
fn non_empty<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.filter(|s| !s.is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_notification_payload() {
        let raw = br#"{
            "id": "l1",
            "tenant_id": "t1",
            "key": "scenarios",
            "app_id": "app1",
            "runtime_id": null,
            "value": ["S1", "S2"]
        }"#;

        let label = Label::from_slice(raw).unwrap();
        assert_eq!(label.app_id(), Some("app1"));
        assert_eq!(label.runtime_id(), None);
        assert!(label.is_scenarios());
        assert_eq!(label.scenarios().unwrap().len(), 2);
    }

    #[test]
    fn empty_ids_are_absent() {
        let raw = br#"{"key": "scenarios", "app_id": "", "runtime_id": "rt1", "value": []}"#;
        let label = Label::from_slice(raw).unwrap();

        assert_eq!(label.app_id(), None);
        assert_eq!(label.runtime_id(), Some("rt1"));
    }

    #[test]
    fn scenario_like_is_case_insensitive() {
        for key in ["scenarios", "SCENARIOS", "my-Scenario-key"] {
            let label = Label::from_slice(format!(r#"{{"key":"{key}"}}"#).as_bytes()).unwrap();
            assert!(label.is_scenario_like(), "{key} should be scenario-like");
        }

        let label = Label::from_slice(br#"{"key":"region"}"#).unwrap();
        assert!(!label.is_scenario_like());
        assert!(!label.is_scenarios());
    }

    #[test]
    fn malformed_payload_is_decode_failure() {
        let err = Label::from_slice(b"{not json").unwrap_err();
        assert!(matches!(err, ModelError::Decode(_)));
    }

    #[test]
    fn non_list_value_fails_only_when_read_as_scenarios() {
        let label = Label::from_slice(br#"{"key":"scenarios","value":{"a":1}}"#).unwrap();
        assert!(matches!(label.scenarios(), Err(ModelError::Decode(_))));
    }
}
