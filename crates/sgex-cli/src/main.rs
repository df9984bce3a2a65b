//! SGEX CLI
//!
//! Command-line interface for reading and writing WHO SMART Guidelines DAK
//! FSH artifacts

mod commands;
mod output;

use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use sgex_core::{NewlinePolicy, Result, init_tracing};
use std::io;
use std::path::PathBuf;
use tracing::error;

#[derive(Parser)]
#[command(name = "sgex")]
#[command(about = "SGEX: FSH concept extraction and requirement authoring for WHO SMART Guidelines DAKs")]
#[command(version = sgex_core::VERSION)]
#[command(
    long_about = "SGEX reads and writes FHIR Shorthand (FSH) artifacts of WHO SMART Guidelines\n\
Digital Adaptation Kits (DAKs).\n\
\n\
Examples:\n  \
sgex concepts input/fsh/IMMZ.D2.fsh          # List concepts of a CodeSystem\n  \
sgex scan input/fsh --format json            # Extract concepts from every FSH file\n  \
sgex generate -k functional -f id=FR-1       # Render a functional requirement\n  \
sgex config init                             # Initialize configuration file"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Configuration file path
    #[arg(
        short,
        long,
        global = true,
        help = "Path to configuration file (.sgexrc.json/.sgexrc.toml/sgex.yaml)"
    )]
    config: Option<PathBuf>,

    /// Verbose output (can be used multiple times for increased verbosity)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Generate shell completion script
    #[arg(
        long,
        value_enum,
        help = "Generate completion script for specified shell"
    )]
    generate_completion: Option<Shell>,
}

#[derive(Subcommand)]
enum Commands {
    /// List the concepts of a CodeSystem FSH file
    Concepts {
        /// FSH file to parse
        #[arg(help = "Path to the FSH file")]
        file: PathBuf,

        /// Output format
        #[arg(short, long, default_value = "human", help = "Output format")]
        format: OutputFormat,

        /// Only show concepts matching a search term
        #[arg(short, long, help = "Case-insensitive search over code, display and definition")]
        search: Option<String>,

        /// Only show concepts referencing a decision table
        #[arg(long, help = "Filter by decision table identifier")]
        table: Option<String>,

        /// Sort column
        #[arg(long, help = "Sort concepts by column")]
        sort: Option<SortColumn>,

        /// Sort descending
        #[arg(long, help = "Sort in descending order", requires = "sort")]
        desc: bool,
    },

    /// Extract concepts from every FSH file under a directory
    Scan {
        /// Directory to scan
        #[arg(help = "Directory to scan (default: current directory)")]
        root: Option<PathBuf>,

        /// Output format
        #[arg(short, long, default_value = "human", help = "Output format")]
        format: OutputFormat,

        /// Include patterns (glob syntax)
        #[arg(
            long,
            help = "Include files matching pattern (can be used multiple times)"
        )]
        include: Vec<String>,

        /// Exclude patterns (glob syntax)
        #[arg(
            long,
            help = "Exclude files matching pattern (can be used multiple times)"
        )]
        exclude: Vec<String>,
    },

    /// Generate FSH for a functional or non-functional requirement
    Generate {
        /// Requirement kind
        #[arg(short, long, help = "Requirement kind: functional or nonfunctional")]
        kind: String,

        /// Field values
        #[arg(
            short,
            long = "field",
            help = "Field value as key=value (can be used multiple times)",
            value_parser = parse_field
        )]
        fields: Vec<(String, String)>,

        /// JSON file with a flat object of field values
        #[arg(short, long, help = "Read field values from a JSON object")]
        input: Option<PathBuf>,

        /// Write to a file instead of stdout
        #[arg(short, long, help = "Output file path", conflicts_with = "save")]
        output: Option<PathBuf>,

        /// Commit into a DAK working tree at the default requirements path
        #[arg(long, help = "Save into the DAK repository at this path")]
        save: Option<PathBuf>,

        /// Override the configured newline policy
        #[arg(long, help = "How line breaks in single-line fields are handled")]
        newline_policy: Option<NewlinePolicyArg>,
    },

    /// Configuration file management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Show version information
    #[command(alias = "ver")]
    Version {
        /// Show detailed version information
        #[arg(long, help = "Show detailed version and build information")]
        detailed: bool,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Initialize a new configuration file
    Init {
        /// Configuration file format
        #[arg(long, default_value = "json", help = "Configuration file format")]
        format: ConfigFormat,

        /// Overwrite existing configuration file
        #[arg(long, help = "Overwrite existing configuration file")]
        force: bool,
    },

    /// Show the resolved configuration
    Show,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum OutputFormat {
    /// Human-readable output with colors
    Human,
    /// JSON format for programmatic consumption
    Json,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum SortColumn {
    Code,
    Display,
    Table,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum NewlinePolicyArg {
    /// Emit \n escape sequences
    Escape,
    /// Emit multi-line text as """ blocks
    TripleQuote,
    /// Fail on multi-line text
    Reject,
}

impl From<NewlinePolicyArg> for NewlinePolicy {
    fn from(arg: NewlinePolicyArg) -> Self {
        match arg {
            NewlinePolicyArg::Escape => NewlinePolicy::Escape,
            NewlinePolicyArg::TripleQuote => NewlinePolicy::TripleQuote,
            NewlinePolicyArg::Reject => NewlinePolicy::Reject,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ConfigFormat {
    /// JSON configuration format
    Json,
    /// TOML configuration format
    Toml,
}

/// Parse a field value in the format key=value
fn parse_field(s: &str) -> std::result::Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!(
            "Invalid field '{}'. Expected 'key=value'",
            s
        )),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(shell) = cli.generate_completion {
        generate_completion_script(shell);
        return Ok(());
    }

    if !cli.no_color && std::env::var("NO_COLOR").is_err() {
        colored::control::set_override(true);
    } else {
        colored::control::set_override(false);
    }

    let log_level = match cli.verbose {
        0 => "sgex=error",
        1 => "sgex=warn",
        2 => "sgex=info",
        3 => "sgex=debug",
        _ => "sgex=trace",
    };
    unsafe {
        std::env::set_var("RUST_LOG", log_level);
    }
    init_tracing();

    match run_command(cli).await {
        Ok(()) => Ok(()),
        Err(e) => {
            error!("sgex failed: {}", e);
            std::process::exit(1);
        }
    }
}

fn generate_completion_script(shell: Shell) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
}

async fn run_command(cli: Cli) -> Result<()> {
    let use_colors = !cli.no_color;

    match cli.command {
        Some(Commands::Concepts {
            file,
            format,
            search,
            table,
            sort,
            desc,
        }) => {
            commands::concepts_command(file, format, search, table, sort, desc, use_colors).await
        }

        Some(Commands::Scan {
            root,
            format,
            include,
            exclude,
        }) => {
            let root = root.unwrap_or_else(|| PathBuf::from("."));
            commands::scan_command(root, format, include, exclude, use_colors, cli.config).await
        }

        Some(Commands::Generate {
            kind,
            fields,
            input,
            output,
            save,
            newline_policy,
        }) => {
            commands::generate_command(
                kind,
                fields,
                input,
                output,
                save,
                newline_policy.map(Into::into),
                cli.config,
            )
            .await
        }

        Some(Commands::Config { action }) => match action {
            ConfigAction::Init { format, force } => {
                commands::config_init_command(format, force).await
            }
            ConfigAction::Show => commands::config_show_command(cli.config).await,
        },

        Some(Commands::Version { detailed }) => {
            if detailed {
                println!("sgex {}", sgex_core::VERSION);
                println!("Build information:");
                println!("  Target: {}", std::env::consts::ARCH);
                println!("  OS: {}", std::env::consts::OS);
            } else {
                println!("{}", sgex_core::VERSION);
            }
            Ok(())
        }

        None => {
            let mut cmd = Cli::command();
            cmd.print_help()
                .map_err(|e| sgex_core::SgexError::io_error("<stdout>", e))?;
            Ok(())
        }
    }
}
