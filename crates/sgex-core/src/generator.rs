//! FSH Logical model generation for DAK requirements
//!
//! ```fsh
//! Logical: FR-1
//! Title: "Register client"
//! Description: "The system registers a new client"
//! Parent: FunctionalRequirement
//! * id = "FR-1"
//! * actor = Reference(HealthWorker)
//! * classification = #core
//! ```

use crate::config::GeneratorConfiguration;
use crate::escape::{format_code, quote_text};
use crate::requirement::{FieldValue, RequirementFields, RequirementKind};
use crate::Result;
use indexmap::IndexMap;
use tracing::debug;

/// Renders requirement fields into FSH source text
#[derive(Debug, Clone, Default)]
pub struct RequirementGenerator {
    config: GeneratorConfiguration,
}

impl RequirementGenerator {
    pub fn new(config: GeneratorConfiguration) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GeneratorConfiguration {
        &self.config
    }

    /// Generate the FSH document for a requirement
    pub fn generate(&self, fields: &RequirementFields) -> Result<String> {
        let kind = fields.kind();
        let defaults = self.config.defaults_for(kind);
        let policy = self.config.newline_policy;

        let name = fields.id().map(str::trim).unwrap_or(defaults.id.as_str());
        let title = fields.title().unwrap_or(defaults.title.as_str());
        let description = fields.description().unwrap_or(defaults.description.as_str());

        let mut fsh = String::new();
        fsh.push_str(&format!("Logical: {}\n", name));
        fsh.push_str(&format!("Title: {}\n", quote_text(title, policy)?));
        fsh.push_str(&format!(
            "Description: {}\n",
            quote_text(description, policy)?
        ));
        fsh.push_str(&format!("Parent: {}\n", kind.parent()));

        let lines = fields.field_lines();
        for (field, value) in &lines {
            let rendered = match value {
                FieldValue::Text(text) => quote_text(text, policy)?,
                FieldValue::Reference(target) => format!("Reference({})", target.trim()),
                FieldValue::Code(code) => format_code(code),
            };
            fsh.push_str(&format!("* {} = {}\n", field, rendered));
        }

        debug!(
            "Generated {} requirement '{}' with {} field lines",
            kind,
            name,
            lines.len()
        );
        Ok(fsh)
    }

    /// Generate from an untyped kind name and flat field map
    pub fn generate_from_map(&self, kind: &str, map: &IndexMap<String, String>) -> Result<String> {
        let kind: RequirementKind = kind.parse()?;
        self.generate(&RequirementFields::from_map(kind, map))
    }
}

/// Generate with the default configuration
pub fn generate(fields: &RequirementFields) -> Result<String> {
    RequirementGenerator::default().generate(fields)
}

/// Generate with the default configuration from an untyped kind and field map
pub fn generate_with_kind(kind: &str, map: &IndexMap<String, String>) -> Result<String> {
    RequirementGenerator::default().generate_from_map(kind, map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::escape::NewlinePolicy;
    use crate::requirement::{FunctionalRequirementFields, NonFunctionalRequirementFields};
    use insta::assert_snapshot;

    fn map(pairs: &[(&str, &str)]) -> IndexMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_full_functional_document() {
        let fields = RequirementFields::Functional(FunctionalRequirementFields {
            id: Some("FR-1".to_string()),
            title: Some("Register client".to_string()),
            description: Some("The system registers a \"new\" client".to_string()),
            activity: Some("Register client".to_string()),
            actor: Some("HealthWorker".to_string()),
            capability: Some("Create a client record".to_string()),
            benefit: Some("Clients can be tracked".to_string()),
            classification: Some("core".to_string()),
        });

        assert_snapshot!(generate(&fields).unwrap(), @r#"
        Logical: FR-1
        Title: "Register client"
        Description: "The system registers a \"new\" client"
        Parent: FunctionalRequirement
        * id = "FR-1"
        * activity = "Register client"
        * actor = Reference(HealthWorker)
        * capability = "Create a client record"
        * benefit = "Clients can be tracked"
        * classification = #core
        "#);
    }

    #[test]
    fn test_nonfunctional_order() {
        let fields = RequirementFields::NonFunctional(NonFunctionalRequirementFields {
            id: Some("NFR-1".to_string()),
            classification: Some("mandatory".to_string()),
            category: Some("performance".to_string()),
            requirement: Some("System SHALL respond within 2s".to_string()),
            ..Default::default()
        });
        let fsh = generate(&fields).unwrap();

        let field_lines: Vec<&str> = fsh.lines().filter(|l| l.starts_with("* ")).collect();
        assert_eq!(
            field_lines,
            vec![
                "* id = \"NFR-1\"",
                "* requirement = \"System SHALL respond within 2s\"",
                "* category = #performance",
                "* classification = #mandatory",
            ]
        );
        assert!(fsh.contains("Parent: NonFunctionalRequirement"));
    }

    #[test]
    fn test_empty_fields_use_placeholders() {
        let fsh = generate_with_kind("functional", &IndexMap::new()).unwrap();
        assert_eq!(
            fsh,
            "Logical: NewFunctionalRequirement\n\
             Title: \"New Functional Requirement\"\n\
             Description: \"Describe the functional requirement\"\n\
             Parent: FunctionalRequirement\n"
        );
    }

    #[test]
    fn test_unknown_kind_fails() {
        let err = generate_with_kind("informal", &map(&[("id", "X")])).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::InvalidArgument);
    }

    #[test]
    fn test_reject_policy_propagates() {
        let config = GeneratorConfiguration {
            newline_policy: NewlinePolicy::Reject,
            ..Default::default()
        };
        let generator = RequirementGenerator::new(config);
        let result =
            generator.generate_from_map("functional", &map(&[("benefit", "one\ntwo")]));
        assert!(result.is_err());
    }

    #[test]
    fn test_triple_quote_policy_for_description() {
        let config = GeneratorConfiguration {
            newline_policy: NewlinePolicy::TripleQuote,
            ..Default::default()
        };
        let generator = RequirementGenerator::new(config);
        let fsh = generator
            .generate_from_map(
                "nonfunctional",
                &map(&[("id", "NFR-3"), ("description", "First\nSecond")]),
            )
            .unwrap();
        assert!(fsh.contains("Description: \"\"\"First\nSecond\"\"\"\n"));
    }
}
