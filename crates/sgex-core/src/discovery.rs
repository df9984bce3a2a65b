//! FSH file discovery and batch concept extraction

use crate::concept::Concept;
use crate::config::FilesConfiguration;
use crate::parser::parse_concepts;
use crate::result::ResultExt;
use crate::{Result, SgexError};
use glob::{MatchOptions, Pattern};
use rayon::prelude::*;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// Concepts extracted from one file
#[derive(Debug, Clone, Serialize)]
pub struct FileConcepts {
    pub path: PathBuf,
    pub concepts: Vec<Concept>,
}

fn compile_patterns(patterns: &[String]) -> Result<Vec<Pattern>> {
    patterns
        .iter()
        .map(|p| {
            Pattern::new(p)
                .map_err(|e| SgexError::config_error(format!("Invalid glob pattern '{}': {}", p, e)))
        })
        .collect()
}

/// Find files under `root` matching the include patterns and none of the
/// exclude patterns. Patterns are matched against paths relative to `root`.
pub fn discover_fsh_files(root: &Path, files: &FilesConfiguration) -> Result<Vec<PathBuf>> {
    let include = compile_patterns(&files.include)?;
    let exclude = compile_patterns(&files.exclude)?;

    let mut found = Vec::new();
    for entry in WalkDir::new(root).follow_links(false) {
        let entry = entry.map_err(|e| {
            let path = e.path().map(Path::to_path_buf).unwrap_or_else(|| root.to_path_buf());
            SgexError::io_error(path, std::io::Error::other(e.to_string()))
        })?;
        if !entry.file_type().is_file() {
            continue;
        }

        let relative = entry.path().strip_prefix(root).unwrap_or(entry.path());
        let included = include
            .iter()
            .any(|p| p.matches_path_with(relative, MATCH_OPTIONS));
        let excluded = exclude
            .iter()
            .any(|p| p.matches_path_with(relative, MATCH_OPTIONS));
        if included && !excluded {
            found.push(entry.path().to_path_buf());
        }
    }

    found.sort();
    debug!("Discovered {} files under {}", found.len(), root.display());
    Ok(found)
}

fn read_concepts(path: &Path) -> Result<FileConcepts> {
    let source = std::fs::read_to_string(path).map_err(|e| SgexError::io_error(path, e))?;
    Ok(FileConcepts {
        path: path.to_path_buf(),
        concepts: parse_concepts(&source),
    })
}

/// Parse files in parallel; unreadable files are logged and skipped
pub fn parse_files(paths: &[PathBuf]) -> Vec<FileConcepts> {
    let results: Vec<FileConcepts> = paths
        .par_iter()
        .filter_map(|path| read_concepts(path).log_and_continue())
        .collect();

    info!(
        "Extracted {} concepts from {} files",
        results.iter().map(|f| f.concepts.len()).sum::<usize>(),
        results.len()
    );
    results
}
