//! CLI command implementations

use indexmap::IndexMap;
use sgex_core::repository::RepositoryRef;
use sgex_core::{
    ConceptBrowser, ConceptSortKey, ConfigLoader, LocalRepository, NewlinePolicy,
    RequirementEditor, RequirementFields, RequirementGenerator, RequirementKind, Result,
    SgexConfig, SgexError, discover_fsh_files, parse_files,
};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};

use crate::output::OutputFormatter;
use crate::{ConfigFormat, OutputFormat, SortColumn};

/// Load configuration from an explicit path or by discovery from `start`
fn load_config(config_path: Option<PathBuf>, start: &Path) -> Result<SgexConfig> {
    let start_dir = if start.is_file() {
        match start.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    } else {
        start
    };
    ConfigLoader::load(config_path.as_deref(), Some(start_dir))
}

/// Concepts command implementation
pub async fn concepts_command(
    file: PathBuf,
    format: OutputFormat,
    search: Option<String>,
    table: Option<String>,
    sort: Option<SortColumn>,
    desc: bool,
    use_colors: bool,
) -> Result<()> {
    debug!("Listing concepts of {}", file.display());

    let source = tokio::fs::read_to_string(&file)
        .await
        .map_err(|e| SgexError::io_error(&file, e))?;
    let mut browser = ConceptBrowser::from_source(file.display().to_string(), &source);

    if let Some(column) = sort {
        let key = match column {
            SortColumn::Code => ConceptSortKey::Code,
            SortColumn::Display => ConceptSortKey::Display,
            SortColumn::Table => ConceptSortKey::TableRef,
        };
        browser.sort_by(key, !desc);
    }

    let mut selected = browser.search(search.as_deref().unwrap_or(""));
    if let Some(table) = &table {
        selected.retain(|c| c.table_ref.as_deref() == Some(table.as_str()));
    }

    OutputFormatter::new(format, use_colors).print_concepts(browser.path(), &selected)
}

/// Scan command implementation
pub async fn scan_command(
    root: PathBuf,
    format: OutputFormat,
    include: Vec<String>,
    exclude: Vec<String>,
    use_colors: bool,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config(config_path, &root)?;
    let mut files = config.files_config();
    if !include.is_empty() {
        files.include = include;
    }
    if !exclude.is_empty() {
        files.exclude = exclude;
    }

    let start_time = Instant::now();
    let paths = discover_fsh_files(&root, &files)?;
    let results = tokio::task::spawn_blocking(move || parse_files(&paths))
        .await
        .map_err(|e| SgexError::io_error(&root, std::io::Error::other(e)))?;
    info!("Scan finished in {:?}", start_time.elapsed());

    OutputFormatter::new(format, use_colors).print_scan(&results)
}

/// Generate command implementation
pub async fn generate_command(
    kind: String,
    fields: Vec<(String, String)>,
    input: Option<PathBuf>,
    output: Option<PathBuf>,
    save: Option<PathBuf>,
    newline_policy: Option<NewlinePolicy>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let kind: RequirementKind = kind.parse()?;
    let config = load_config(config_path, Path::new("."))?;

    let mut generator_config = config.generator_config();
    if let Some(policy) = newline_policy {
        generator_config.newline_policy = policy;
    }
    let generator = RequirementGenerator::new(generator_config);

    let mut values: IndexMap<String, String> = IndexMap::new();
    if let Some(input) = &input {
        let content = tokio::fs::read_to_string(input)
            .await
            .map_err(|e| SgexError::io_error(input, e))?;
        let from_file: IndexMap<String, String> = serde_json::from_str(&content)?;
        values.extend(from_file);
    }
    values.extend(fields);

    let editor = RequirementEditor::with_fields(RequirementFields::from_map(kind, &values), generator);

    if let Some(repo_root) = save {
        return save_requirement(editor, repo_root).await;
    }

    let fsh = editor.preview()?;
    match output {
        Some(path) => {
            tokio::fs::write(&path, &fsh)
                .await
                .map_err(|e| SgexError::io_error(&path, e))?;
            println!("Wrote {}", path.display());
        }
        None => print!("{}", fsh),
    }
    Ok(())
}

async fn save_requirement(mut editor: RequirementEditor, repo_root: PathBuf) -> Result<()> {
    let repo = LocalRepository::new(&repo_root);
    let location = RepositoryRef::new("local", repo_root.display().to_string(), "HEAD");
    let path = editor.default_path();

    if repo_root.join(&path).is_file() {
        editor.track_existing(&repo, &location, &path).await?;
    }

    let message = format!(
        "Update {} requirement {}",
        editor.kind(),
        editor.fields().id().unwrap_or("(new)")
    );
    let commit = editor.save(&repo, &location, &path, &message).await?;
    println!(
        "{} {}",
        if commit.created { "Created" } else { "Updated" },
        commit.path
    );
    Ok(())
}

/// Config init command implementation
pub async fn config_init_command(format: ConfigFormat, force: bool) -> Result<()> {
    let (filename, content) = match format {
        ConfigFormat::Json => (
            ".sgexrc.json",
            serde_json::to_string_pretty(&default_config())?,
        ),
        ConfigFormat::Toml => (
            ".sgexrc.toml",
            toml::to_string_pretty(&default_config())
                .map_err(|e| SgexError::serialization_error(e.to_string()))?,
        ),
    };

    let path = PathBuf::from(filename);
    if path.exists() && !force {
        return Err(SgexError::config_error(format!(
            "Configuration file {} already exists. Use --force to overwrite.",
            filename
        )));
    }

    tokio::fs::write(&path, content)
        .await
        .map_err(|e| SgexError::io_error(&path, e))?;
    println!("Created {}", filename);
    Ok(())
}

/// Fully populated configuration written by `config init`
fn default_config() -> SgexConfig {
    SgexConfig {
        generator: Some(Default::default()),
        files: Some(Default::default()),
    }
}

/// Config show command implementation
pub async fn config_show_command(config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config(config_path, Path::new("."))?;
    let resolved = SgexConfig {
        generator: Some(config.generator_config()),
        files: Some(config.files_config()),
    };
    println!("{}", serde_json::to_string_pretty(&resolved)?);
    Ok(())
}
