//! Configuration structure

use crate::escape::NewlinePolicy;
use crate::requirement::RequirementKind;
use serde::{Deserialize, Deserializer, Serialize};

/// Top-level sgex configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SgexConfig {
    /// Requirement document generation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generator: Option<GeneratorConfiguration>,

    /// File discovery patterns for batch parsing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub files: Option<FilesConfiguration>,
}

impl SgexConfig {
    /// Generator configuration with defaults
    pub fn generator_config(&self) -> GeneratorConfiguration {
        self.generator.clone().unwrap_or_default()
    }

    /// Files configuration with defaults
    pub fn files_config(&self) -> FilesConfiguration {
        self.files.clone().unwrap_or_default()
    }
}

/// Settings for the requirement document generator
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct GeneratorConfiguration {
    /// Handling of line breaks in single-line free-text fields
    pub newline_policy: NewlinePolicy,

    /// Header placeholders for functional requirements
    #[serde(deserialize_with = "functional_defaults")]
    pub functional: RequirementDefaults,

    /// Header placeholders for non-functional requirements
    #[serde(deserialize_with = "non_functional_defaults")]
    pub non_functional: RequirementDefaults,
}

impl Default for GeneratorConfiguration {
    fn default() -> Self {
        Self {
            newline_policy: NewlinePolicy::default(),
            functional: RequirementDefaults::for_kind(RequirementKind::Functional),
            non_functional: RequirementDefaults::for_kind(RequirementKind::NonFunctional),
        }
    }
}

impl GeneratorConfiguration {
    pub fn defaults_for(&self, kind: RequirementKind) -> &RequirementDefaults {
        match kind {
            RequirementKind::Functional => &self.functional,
            RequirementKind::NonFunctional => &self.non_functional,
        }
    }
}

/// Placeholder header values used when a field is left empty
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RequirementDefaults {
    pub id: String,
    pub title: String,
    pub description: String,
}

impl RequirementDefaults {
    /// Built-in placeholders for a requirement kind
    pub fn for_kind(kind: RequirementKind) -> Self {
        match kind {
            RequirementKind::Functional => Self {
                id: "NewFunctionalRequirement".to_string(),
                title: "New Functional Requirement".to_string(),
                description: "Describe the functional requirement".to_string(),
            },
            RequirementKind::NonFunctional => Self {
                id: "NewNonFunctionalRequirement".to_string(),
                title: "New Non-Functional Requirement".to_string(),
                description: "Describe the non-functional requirement".to_string(),
            },
        }
    }
}

/// A configured defaults section; keys left out keep the built-in value
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PartialDefaults {
    id: Option<String>,
    title: Option<String>,
    description: Option<String>,
}

impl PartialDefaults {
    fn resolve(self, kind: RequirementKind) -> RequirementDefaults {
        let builtin = RequirementDefaults::for_kind(kind);
        RequirementDefaults {
            id: self.id.unwrap_or(builtin.id),
            title: self.title.unwrap_or(builtin.title),
            description: self.description.unwrap_or(builtin.description),
        }
    }
}

fn functional_defaults<'de, D>(deserializer: D) -> Result<RequirementDefaults, D::Error>
where
    D: Deserializer<'de>,
{
    PartialDefaults::deserialize(deserializer).map(|p| p.resolve(RequirementKind::Functional))
}

fn non_functional_defaults<'de, D>(deserializer: D) -> Result<RequirementDefaults, D::Error>
where
    D: Deserializer<'de>,
{
    PartialDefaults::deserialize(deserializer).map(|p| p.resolve(RequirementKind::NonFunctional))
}

/// File discovery configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct FilesConfiguration {
    /// Glob patterns of files to include, relative to the scan root
    pub include: Vec<String>,

    /// Glob patterns of files to exclude
    pub exclude: Vec<String>,
}

impl Default for FilesConfiguration {
    fn default() -> Self {
        Self {
            include: vec!["**/*.fsh".to_string()],
            exclude: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_generator_section_keeps_defaults() {
        let config: SgexConfig =
            serde_json::from_str(r#"{"generator": {"newlinePolicy": "reject"}}"#).unwrap();
        let generator = config.generator_config();

        assert_eq!(generator.newline_policy, NewlinePolicy::Reject);
        assert_eq!(generator.functional.id, "NewFunctionalRequirement");
    }

    #[test]
    fn test_partial_kind_section_keeps_builtin_placeholders() {
        let config: SgexConfig = serde_json::from_str(
            r#"{"generator": {"functional": {"title": "Draft requirement"}, "nonFunctional": {"id": "NFR-DRAFT"}}}"#,
        )
        .unwrap();
        let generator = config.generator_config();

        assert_eq!(generator.functional.id, "NewFunctionalRequirement");
        assert_eq!(generator.functional.title, "Draft requirement");
        assert_eq!(
            generator.functional.description,
            "Describe the functional requirement"
        );
        assert_eq!(generator.non_functional.id, "NFR-DRAFT");
        assert_eq!(
            generator.non_functional.title,
            "New Non-Functional Requirement"
        );
    }

    #[test]
    fn test_files_defaults() {
        let config = SgexConfig::default();
        assert_eq!(config.files_config().include, vec!["**/*.fsh"]);
        assert!(config.files_config().exclude.is_empty());
    }

    #[test]
    fn test_defaults_for_kind() {
        let generator = GeneratorConfiguration::default();
        assert_eq!(
            generator.defaults_for(RequirementKind::NonFunctional).id,
            "NewNonFunctionalRequirement"
        );
    }
}
