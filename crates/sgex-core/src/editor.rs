//! Editor sessions over repository content
//!
//! [`ConceptBrowser`] backs the decision-support variable table: it loads a
//! CodeSystem file, parses it and answers search/sort/filter queries.
//! [`RequirementEditor`] holds the form state of one requirement edit session
//! and commits the generated FSH on save.

use crate::concept::Concept;
use crate::generator::RequirementGenerator;
use crate::parser::parse_concepts;
use crate::repository::{CommitResult, DakRepository, RepositoryRef, content_sha};
use crate::requirement::{RequirementFields, RequirementKind};
use crate::{Result, SgexError};
use std::cmp::Ordering;
use tracing::info;

/// Directory requirement files are written to
pub const REQUIREMENTS_DIR: &str = "input/fsh/requirements";

/// Column a concept table is sorted by
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConceptSortKey {
    Code,
    Display,
    TableRef,
}

/// Parsed concepts of one CodeSystem file
#[derive(Debug, Clone)]
pub struct ConceptBrowser {
    path: String,
    concepts: Vec<Concept>,
}

impl ConceptBrowser {
    /// Fetch and parse a file from the repository
    pub async fn load(
        repo: &dyn DakRepository,
        location: &RepositoryRef,
        path: &str,
    ) -> Result<Self> {
        let source = repo.get_file_content(location, path).await?;
        let browser = Self::from_source(path, &source);
        info!("Loaded {} concepts from {}", browser.concepts.len(), path);
        Ok(browser)
    }

    pub fn from_source(path: impl Into<String>, source: &str) -> Self {
        Self {
            path: path.into(),
            concepts: parse_concepts(source),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn concepts(&self) -> &[Concept] {
        &self.concepts
    }

    /// Concepts whose code, display or definition contain `query`
    pub fn search(&self, query: &str) -> Vec<&Concept> {
        let query = query.trim();
        if query.is_empty() {
            return self.concepts.iter().collect();
        }
        self.concepts.iter().filter(|c| c.matches(query)).collect()
    }

    /// Concepts that reference the given decision table
    pub fn filter_by_table(&self, table: &str) -> Vec<&Concept> {
        self.concepts
            .iter()
            .filter(|c| c.table_ref.as_deref() == Some(table))
            .collect()
    }

    /// Stable sort; concepts without a table reference sort first when ascending
    pub fn sort_by(&mut self, key: ConceptSortKey, ascending: bool) {
        self.concepts.sort_by(|a, b| {
            let ordering = compare(a, b, key);
            if ascending {
                ordering
            } else {
                ordering.reverse()
            }
        });
    }
}

fn compare(a: &Concept, b: &Concept, key: ConceptSortKey) -> Ordering {
    match key {
        ConceptSortKey::Code => a.code.cmp(&b.code),
        ConceptSortKey::Display => a.display.to_lowercase().cmp(&b.display.to_lowercase()),
        ConceptSortKey::TableRef => a.table_ref.cmp(&b.table_ref),
    }
}

/// Form state of a single requirement edit session
#[derive(Debug, Clone)]
pub struct RequirementEditor {
    fields: RequirementFields,
    generator: RequirementGenerator,
    /// Version of the file this session overwrites, if any
    sha: Option<String>,
}

impl RequirementEditor {
    /// Start a session for a new requirement
    pub fn new(kind: RequirementKind, generator: RequirementGenerator) -> Self {
        Self::with_fields(RequirementFields::empty(kind), generator)
    }

    pub fn with_fields(fields: RequirementFields, generator: RequirementGenerator) -> Self {
        Self {
            fields,
            generator,
            sha: None,
        }
    }

    pub fn fields(&self) -> &RequirementFields {
        &self.fields
    }

    pub fn kind(&self) -> RequirementKind {
        self.fields.kind()
    }

    /// Update one form field
    pub fn set_field(&mut self, key: &str, value: impl Into<String>) -> Result<()> {
        if self.fields.set(key, value.into()) {
            Ok(())
        } else {
            Err(SgexError::invalid_argument(format!(
                "{} requirements have no field '{}'",
                self.kind(),
                key
            )))
        }
    }

    /// Record the version of an existing file so that save overwrites it
    pub async fn track_existing(
        &mut self,
        repo: &dyn DakRepository,
        location: &RepositoryRef,
        path: &str,
    ) -> Result<()> {
        let content = repo.get_file_content(location, path).await?;
        self.sha = Some(content_sha(content.as_bytes()));
        Ok(())
    }

    /// Repository path for this requirement
    pub fn default_path(&self) -> String {
        let defaults = self.generator.config().defaults_for(self.kind());
        let id = self.fields.id().map(str::trim).unwrap_or(defaults.id.as_str());
        format!("{}/{}.fsh", REQUIREMENTS_DIR, id)
    }

    /// FSH text as it would be committed
    pub fn preview(&self) -> Result<String> {
        self.generator.generate(&self.fields)
    }

    /// Generate and commit the requirement
    pub async fn save(
        &mut self,
        repo: &dyn DakRepository,
        location: &RepositoryRef,
        path: &str,
        message: &str,
    ) -> Result<CommitResult> {
        let content = self.preview()?;
        let commit = repo
            .create_or_update_file(location, path, &content, message, self.sha.as_deref())
            .await?;
        info!("Saved {} requirement to {}", self.kind(), path);
        self.sha = Some(commit.sha.clone());
        Ok(commit)
    }

    /// Delete the file this session tracks
    pub async fn delete(
        &mut self,
        repo: &dyn DakRepository,
        location: &RepositoryRef,
        path: &str,
        message: &str,
    ) -> Result<()> {
        let Some(sha) = self.sha.take() else {
            return Err(SgexError::invalid_argument(format!(
                "no saved version of '{}' is tracked by this session",
                path
            )));
        };
        repo.delete_file(location, path, message, &sha).await
    }
}
