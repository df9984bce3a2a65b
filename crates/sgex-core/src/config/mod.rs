//! Configuration system for sgex
//!
//! Configuration files are discovered by traversing up from a start
//! directory, checking in order:
//! - `.sgexrc.json`
//! - `.sgexrc.toml`
//! - `sgex.yaml` / `sgex.yml`
//! - `sgex.json`
//!
//! ## Example Configuration (sgex.yaml)
//!
//! ```yaml
//! generator:
//!   newlinePolicy: tripleQuote
//!   functional:
//!     id: NewFunctionalRequirement
//!     title: New Functional Requirement
//!     description: Describe the functional requirement
//!
//! files:
//!   include:
//!     - "input/fsh/**/*.fsh"
//!   exclude:
//!     - "**/*.draft.fsh"
//! ```

mod loader;
mod sgex_config;

pub use loader::{CONFIG_FILE_NAMES, ConfigLoader};
pub use sgex_config::{
    FilesConfiguration, GeneratorConfiguration, RequirementDefaults, SgexConfig,
};
