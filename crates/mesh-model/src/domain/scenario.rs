use std::convert::TryFrom;

use serde::{Deserialize, Serialize};

use crate::{
    domain::DEFAULT_SCENARIO,
    error::{ModelError, ModelResult},
};

/// Scenario names carried by a `scenarios` label, in label order.
#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScenarioSet(Vec<String>);

impl ScenarioSet {
    /// `true` iff the set is exactly `["DEFAULT"]`.
    ///
    /// Such membership is trivial and never triggers reconciliation.
    pub fn is_default_only(&self) -> bool {
        self.0.len() == 1 && self.0[0] == DEFAULT_SCENARIO
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl TryFrom<&serde_json::Value> for ScenarioSet {
    type Error = ModelError;

    fn try_from(value: &serde_json::Value) -> ModelResult<Self> {
        let items = value.as_array().ok_or_else(|| {
            ModelError::Decode(format!("scenario label value must be a list, got {value}"))
        })?;

        items
            .iter()
            .map(|item| {
                item.as_str().map(str::to_owned).ok_or_else(|| {
                    ModelError::Decode(format!("scenario name must be a string, got {item}"))
                })
            })
            .collect::<ModelResult<Vec<_>>>()
            .map(Self)
    }
}

impl<'a> IntoIterator for &'a ScenarioSet {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
