//! Concept records extracted from DAK CodeSystem FSH files

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A single coded entry of an FSH CodeSystem
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Concept {
    pub code: String,
    pub display: String,
    #[serde(default)]
    pub definition: String,
    /// Decision table identifier from the `table` property
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_ref: Option<String>,
    /// UI tab label from the `tab` property
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tab_ref: Option<String>,
    /// CQL expression carried in a designation value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cql: Option<String>,
    /// Remaining `property` code/valueString pairs in source order
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub properties: IndexMap<String, String>,
}

impl Concept {
    pub fn new(code: impl Into<String>, display: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            display: display.into(),
            ..Default::default()
        }
    }

    /// Case-insensitive match against code, display and definition
    pub fn matches(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        self.code.to_lowercase().contains(&query)
            || self.display.to_lowercase().contains(&query)
            || self.definition.to_lowercase().contains(&query)
    }

    /// Set a property value, routing the `table` and `tab` codes to their fields
    pub fn set_property(&mut self, code: &str, value: String) {
        match code {
            "table" => self.table_ref = Some(value),
            "tab" => self.tab_ref = Some(value),
            other => {
                self.properties.insert(other.to_string(), value);
            }
        }
    }
}
