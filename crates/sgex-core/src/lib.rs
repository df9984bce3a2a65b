//! SGEX Core
//!
//! FHIR Shorthand (FSH) handling for WHO SMART Guidelines Digital Adaptation
//! Kit (DAK) repositories: concept extraction from CodeSystem files and
//! Logical model generation for functional and non-functional requirements.

pub mod concept;
pub mod config;
pub mod discovery;
pub mod editor;
pub mod error;
pub mod escape;
pub mod generator;
pub mod parser;
pub mod repository;
pub mod requirement;
pub mod result;
pub mod tokenizer;

// Re-export commonly used types
pub use concept::Concept;
pub use config::{
    ConfigLoader, FilesConfiguration, GeneratorConfiguration, RequirementDefaults, SgexConfig,
};
pub use discovery::{FileConcepts, discover_fsh_files, parse_files};
pub use editor::{ConceptBrowser, ConceptSortKey, RequirementEditor};
pub use error::{ErrorKind, SgexError};
pub use escape::{NewlinePolicy, escape_string, unescape_string};
pub use generator::{RequirementGenerator, generate, generate_with_kind};
pub use parser::{ConceptParser, parse_concepts};
pub use repository::{
    CommitResult, DakRepository, DirectoryEntry, EntryType, LocalRepository, RepositoryRef,
};
pub use requirement::{
    FunctionalRequirementFields, NonFunctionalRequirementFields, RequirementFields,
    RequirementKind,
};
pub use result::{Result, ResultExt};

/// Initialize the tracing subscriber for logging
pub fn init_tracing() {
    use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("sgex=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_thread_ids(false)
                .with_file(true)
                .with_line_number(true),
        )
        .init();
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
