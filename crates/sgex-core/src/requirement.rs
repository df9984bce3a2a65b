//! Typed field records for DAK functional and non-functional requirements

use crate::{Result, SgexError};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::warn;

/// Requirement artifact kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequirementKind {
    Functional,
    #[serde(alias = "non-functional")]
    NonFunctional,
}

impl RequirementKind {
    /// Logical model parent of generated documents
    pub fn parent(&self) -> &'static str {
        match self {
            RequirementKind::Functional => "FunctionalRequirement",
            RequirementKind::NonFunctional => "NonFunctionalRequirement",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RequirementKind::Functional => "functional",
            RequirementKind::NonFunctional => "nonfunctional",
        }
    }
}

impl fmt::Display for RequirementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequirementKind {
    type Err = SgexError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "functional" => Ok(RequirementKind::Functional),
            "nonfunctional" | "non-functional" => Ok(RequirementKind::NonFunctional),
            other => Err(SgexError::invalid_argument(format!(
                "unknown requirement kind '{}' (expected 'functional' or 'nonfunctional')",
                other
            ))),
        }
    }
}

/// How a field value is rendered on its `* field = value` line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldValue<'a> {
    /// Quoted, escaped free text
    Text(&'a str),
    /// `Reference(<target>)`
    Reference(&'a str),
    /// Bare `#code` token
    Code(&'a str),
}

/// Fields of a functional requirement
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FunctionalRequirementFields {
    pub id: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub activity: Option<String>,
    pub actor: Option<String>,
    pub capability: Option<String>,
    pub benefit: Option<String>,
    pub classification: Option<String>,
}

/// Fields of a non-functional requirement
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NonFunctionalRequirementFields {
    pub id: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub requirement: Option<String>,
    pub category: Option<String>,
    pub classification: Option<String>,
}

/// Requirement fields discriminated by kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum RequirementFields {
    Functional(FunctionalRequirementFields),
    #[serde(alias = "non-functional")]
    NonFunctional(NonFunctionalRequirementFields),
}

/// Value if present and not blank
fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

impl RequirementFields {
    /// Empty field set for a kind
    pub fn empty(kind: RequirementKind) -> Self {
        match kind {
            RequirementKind::Functional => {
                RequirementFields::Functional(FunctionalRequirementFields::default())
            }
            RequirementKind::NonFunctional => {
                RequirementFields::NonFunctional(NonFunctionalRequirementFields::default())
            }
        }
    }

    /// Build typed fields from a flat key/value map, as produced by editor forms
    ///
    /// Keys that do not belong to `kind` are ignored.
    pub fn from_map(kind: RequirementKind, map: &IndexMap<String, String>) -> Self {
        let mut fields = Self::empty(kind);
        for (key, value) in map {
            if !fields.set(key, value.clone()) {
                warn!("Ignoring unknown {} requirement field '{}'", kind, key);
            }
        }
        fields
    }

    /// Set a field by name; returns false if the kind has no such field
    pub fn set(&mut self, key: &str, value: String) -> bool {
        let slot = match self {
            RequirementFields::Functional(f) => match key {
                "id" => &mut f.id,
                "title" => &mut f.title,
                "description" => &mut f.description,
                "activity" => &mut f.activity,
                "actor" => &mut f.actor,
                "capability" => &mut f.capability,
                "benefit" => &mut f.benefit,
                "classification" => &mut f.classification,
                _ => return false,
            },
            RequirementFields::NonFunctional(f) => match key {
                "id" => &mut f.id,
                "title" => &mut f.title,
                "description" => &mut f.description,
                "requirement" => &mut f.requirement,
                "category" => &mut f.category,
                "classification" => &mut f.classification,
                _ => return false,
            },
        };
        *slot = Some(value);
        true
    }

    pub fn kind(&self) -> RequirementKind {
        match self {
            RequirementFields::Functional(_) => RequirementKind::Functional,
            RequirementFields::NonFunctional(_) => RequirementKind::NonFunctional,
        }
    }

    pub fn id(&self) -> Option<&str> {
        match self {
            RequirementFields::Functional(f) => present(&f.id),
            RequirementFields::NonFunctional(f) => present(&f.id),
        }
    }

    pub fn title(&self) -> Option<&str> {
        match self {
            RequirementFields::Functional(f) => present(&f.title),
            RequirementFields::NonFunctional(f) => present(&f.title),
        }
    }

    pub fn description(&self) -> Option<&str> {
        match self {
            RequirementFields::Functional(f) => present(&f.description),
            RequirementFields::NonFunctional(f) => present(&f.description),
        }
    }

    /// Populated `* field = value` entries in document order
    pub fn field_lines(&self) -> Vec<(&'static str, FieldValue<'_>)> {
        let candidates: Vec<(&'static str, Option<FieldValue<'_>>)> = match self {
            RequirementFields::Functional(f) => vec![
                ("id", present(&f.id).map(FieldValue::Text)),
                ("activity", present(&f.activity).map(FieldValue::Text)),
                ("actor", present(&f.actor).map(FieldValue::Reference)),
                ("capability", present(&f.capability).map(FieldValue::Text)),
                ("benefit", present(&f.benefit).map(FieldValue::Text)),
                (
                    "classification",
                    present(&f.classification).map(FieldValue::Code),
                ),
            ],
            RequirementFields::NonFunctional(f) => vec![
                ("id", present(&f.id).map(FieldValue::Text)),
                ("requirement", present(&f.requirement).map(FieldValue::Text)),
                ("category", present(&f.category).map(FieldValue::Code)),
                (
                    "classification",
                    present(&f.classification).map(FieldValue::Code),
                ),
            ],
        };

        candidates
            .into_iter()
            .filter_map(|(name, value)| value.map(|v| (name, v)))
            .collect()
    }
}
