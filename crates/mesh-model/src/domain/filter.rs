use serde::{Deserialize, Serialize};

use crate::domain::SCENARIOS_KEY;

/// Label-based filter applied by list queries.
///
/// Without a query the filter matches objects that carry the key at all.
/// With a query it matches objects whose label value satisfies the JSON-path predicate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelFilter {
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
}

impl LabelFilter {
    pub fn for_key(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            query: None,
        }
    }

    pub fn for_key_with_query(key: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            query: Some(query.into()),
        }
    }

    /// Filter on the scenarios label matching any of the given scenario names.
    ///
    /// Produces `$[*] ? (@ == "A" || @ == "B")`.
    pub fn scenarios_any_of<'a, I>(scenarios: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let predicates: Vec<String> = scenarios
            .into_iter()
            .map(|s| format!("@ == \"{}\"", escape(s)))
            .collect();

        Self::for_key_with_query(
            SCENARIOS_KEY,
            format!("$[*] ? ( {} )", predicates.join(" || ")),
        )
    }
}

fn escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}
