//! # mox CLI entry point
//!
//! Parses command-line arguments, layers settings and dispatches to the
//! subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use mox_cli::config::{MoxConfig, Overrides, Settings};
use mox_cli::exit_code;
use mox_cli::schema::{run_schema, SchemaArgs};
use mox_cli::templates::{run_apply_templates, ApplyTemplatesArgs};
use mox_cli::types::{run_types, TypesArgs};
use mox_cli::validate::{run_validate, ValidateArgs};

/// Object model compiler for the mox registry.
///
/// Inspects the declared object types, generates their validation
/// documents, validates registrations and renders the persistence script.
#[derive(Parser, Debug)]
#[command(name = "mox", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Log line format.
    #[arg(long, value_enum, default_value_t = LogFormat::Text, global = true)]
    log_format: LogFormat,

    /// Path to configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Structure document replacing the built-in object types.
    #[arg(long, env = "MOX_DB_STRUCTURE", global = true)]
    structure: Option<PathBuf>,

    /// Extension document applied after the structure. Repeatable.
    #[arg(long = "extension", value_name = "FILE", global = true)]
    extensions: Vec<PathBuf>,

    /// Directory of `*.sql.hbs` templates overriding the built-in ones.
    #[arg(long, env = "MOX_TEMPLATE_DIR", global = true)]
    template_dir: Option<PathBuf>,

    /// Where uploaded content is stored.
    #[arg(long, env = "MOX_UPLOAD_DIR", global = true)]
    upload_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List object types or describe one.
    Types(TypesArgs),

    /// Print the validation document for an object type.
    Schema(SchemaArgs),

    /// Validate a registration payload against its object type.
    Validate(ValidateArgs),

    /// Render the SQL script for every object type and template.
    #[command(name = "apply-templates")]
    ApplyTemplates(ApplyTemplatesArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.log_format);

    tracing::debug!(version = env!("CARGO_PKG_VERSION"), "mox CLI starting");

    match run(cli) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(exit_code(&e))
        }
    }
}

fn init_tracing(verbose: u8, format: LogFormat) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

fn run(cli: Cli) -> anyhow::Result<u8> {
    let config = match &cli.config {
        Some(path) => MoxConfig::load(path)?,
        None => MoxConfig::default(),
    };
    let settings = Settings::resolve(
        Overrides {
            structure: cli.structure,
            extensions: cli.extensions,
            template_dir: cli.template_dir,
            upload_dir: cli.upload_dir,
        },
        config,
    );
    tracing::debug!(?settings, "resolved settings");

    let compiler = settings.compiler()?;
    match cli.command {
        Commands::Types(args) => run_types(&args, &compiler),
        Commands::Schema(args) => run_schema(&args, &compiler),
        Commands::Validate(args) => run_validate(&args, &compiler, settings.upload_dir.as_deref()),
        Commands::ApplyTemplates(args) => {
            let engine = settings.template_engine()?;
            run_apply_templates(&args, &compiler, &engine)
        }
    }
}
