//! Command-line interface for claimcheck.

use clap::{Args, Parser, Subcommand};
use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};

use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::extract::{ClaimDocument, Extractor};
use crate::report::{self, OutputFormat};
use crate::search::SearchChain;
use crate::validate::{Runner, SourceRoot, Validator};

/// Exit codes.
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILED: i32 = 1;
pub const EXIT_ERROR: i32 = 2;

/// Environment variable holding a log filter directive.
pub const LOG_ENV: &str = "CLAIMCHECK_LOG";

/// Configuration template written by `init`.
pub const CONFIG_TEMPLATE: &str = include_str!("templates/claimcheck.yaml");

/// Documentation claim checker.
///
/// Extracts technical claims (class names, methods, events, tables, ACL
/// resources) from documentation markup and checks each one against a
/// source checkout, producing a confidence-scored report.
#[derive(Parser)]
#[command(name = "claimcheck")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options accepted by every command.
#[derive(Args)]
pub struct GlobalArgs {
    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only print errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Path to config YAML file (default: auto-discover)
    #[arg(short, long, global = true, env = "CLAIMCHECK_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Extract claims from a documentation page
    Extract(ExtractArgs),
    /// Check extracted claims against a source tree
    #[command(visible_alias = "check")]
    Validate(ValidateArgs),
    /// Write a default config file
    Init(InitArgs),
}

/// Arguments for the extract command.
#[derive(Parser)]
pub struct ExtractArgs {
    /// Documentation file (HTML)
    pub document: PathBuf,

    /// Claims output file (default: <document>_claims.yaml)
    pub output: Option<PathBuf>,
}

/// Arguments for the validate command.
#[derive(Parser)]
pub struct ValidateArgs {
    /// Claims file produced by `extract`
    pub claims: PathBuf,

    /// Source checkout to validate against (default: validation.source_root)
    pub source_root: Option<PathBuf>,

    /// Report output file (default: <claims>_validation.<format>)
    pub output: Option<PathBuf>,

    /// Report format: yaml or json
    #[arg(short, long, default_value = "yaml")]
    pub format: String,

    /// Worker threads (default: validation.jobs)
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Search backend to use, repeatable, in fallback order
    #[arg(long = "backend")]
    pub backends: Vec<String>,

    /// Exit with status 1 if any checked claim is not found
    #[arg(long)]
    pub strict: bool,
}

/// Arguments for the init command.
#[derive(Parser)]
pub struct InitArgs {
    /// Output file path
    #[arg(short, long, default_value = "claimcheck.yaml")]
    pub output: PathBuf,

    /// Overwrite an existing file
    #[arg(long)]
    pub force: bool,
}

/// Install the stderr log subscriber.
///
/// `CLAIMCHECK_LOG` takes precedence over the verbosity flags.
pub fn init_logging(global: &GlobalArgs) {
    let level = if global.quiet {
        "error"
    } else {
        match global.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    };

    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(format!("claimcheck={}", level)));

    let _ = tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// `<dir>/<stem><suffix>.<ext>` next to `input`.
pub fn default_output(input: &Path, suffix: &str, extension: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "claims".to_string());
    let name = format!("{}{}.{}", stem, suffix, extension);
    match input.parent() {
        Some(parent) => parent.join(name),
        None => PathBuf::from(name),
    }
}

fn load_config(global: &GlobalArgs) -> Option<Config> {
    match Config::load(global.config.as_deref()) {
        Ok((config, path)) => {
            if let Some(path) = path {
                debug!(path = %path.display(), "using config");
            }
            Some(config)
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            None
        }
    }
}

/// Run the extract command.
pub fn run_extract(args: &ExtractArgs, global: &GlobalArgs) -> anyhow::Result<i32> {
    let Some(config) = load_config(global) else {
        return Ok(EXIT_ERROR);
    };

    if !args.document.is_file() {
        eprintln!("Error: file not found: {}", args.document.display());
        return Ok(EXIT_ERROR);
    }

    let set = Extractor::new(&config.extraction).extract_file(&args.document)?;

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| default_output(&args.document, "_claims", "yaml"));
    ClaimDocument::from(&set).write_file(&output)?;
    info!(output = %output.display(), claims = set.len(), "wrote claims");

    if !global.quiet {
        report::write_extraction_summary(&mut io::stdout().lock(), &set, &output)?;
    }

    Ok(EXIT_SUCCESS)
}

/// Run the validate command.
pub fn run_validate(args: &ValidateArgs, global: &GlobalArgs) -> anyhow::Result<i32> {
    let Some(config) = load_config(global) else {
        return Ok(EXIT_ERROR);
    };

    let Some(format) = OutputFormat::parse(&args.format) else {
        eprintln!(
            "Error: invalid format {:?}, must be 'yaml' or 'json'",
            args.format
        );
        return Ok(EXIT_ERROR);
    };

    if !args.claims.is_file() {
        eprintln!("Error: claims file not found: {}", args.claims.display());
        return Ok(EXIT_ERROR);
    }

    let root_path = match args
        .source_root
        .as_ref()
        .or(config.validation.source_root.as_ref())
    {
        Some(p) => p.clone(),
        None => {
            eprintln!("Error: no source root given");
            eprintln!("Pass it as an argument or set validation.source_root in the config");
            return Ok(EXIT_ERROR);
        }
    };

    let root = match SourceRoot::from_config(&root_path, &config.validation) {
        Ok(root) => root,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Ok(EXIT_ERROR);
        }
    };

    let chain = match SearchChain::from_config(&config.search, &args.backends) {
        Ok(chain) => chain,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Ok(EXIT_ERROR);
        }
    };
    debug!(backends = ?chain.backend_names(), "search chain");

    let set = match ClaimDocument::read_file(&args.claims) {
        Ok(document) => document.into_claim_set(),
        Err(e) => {
            eprintln!("Error: {}", e);
            return Ok(EXIT_ERROR);
        }
    };
    info!(
        claims = set.len(),
        modules = %root.modules().display(),
        "validating"
    );

    let validator = Validator::new(root, chain);
    let report = Runner::new(&validator)
        .jobs(args.jobs.unwrap_or(config.validation.jobs))
        .show_progress(!global.quiet && io::stderr().is_terminal())
        .run(&set)?;

    let output = args.output.clone().unwrap_or_else(|| {
        default_output(&args.claims, "_validation", format.extension())
    });
    report.write_file(&output, format)?;

    if !global.quiet {
        report::write_validation_summary(&mut io::stdout().lock(), &report, &output)?;
    }

    if args.strict && report.has_missing() {
        return Ok(EXIT_FAILED);
    }
    Ok(EXIT_SUCCESS)
}

/// Run the init command.
pub fn run_init(args: &InitArgs) -> anyhow::Result<i32> {
    if args.output.exists() && !args.force {
        eprintln!("Error: file already exists: {}", args.output.display());
        eprintln!("Use --force to overwrite or --output to choose another path");
        return Ok(EXIT_ERROR);
    }

    if let Some(parent) = args.output.parent() {
        if !parent.as_os_str().is_empty() && parent != Path::new(".") {
            if let Err(e) = std::fs::create_dir_all(parent) {
                eprintln!("Error: failed to create directory: {}", e);
                return Ok(EXIT_ERROR);
            }
        }
    }

    if let Err(e) = std::fs::write(&args.output, CONFIG_TEMPLATE) {
        eprintln!("Error: failed to write config: {}", e);
        return Ok(EXIT_ERROR);
    }

    println!("Created {}", args.output.display());
    println!();
    println!("Next steps:");
    println!("  1. Set validation.source_root or pass a source checkout to validate");
    println!("  2. Run: claimcheck extract docs/architecture.html");
    println!(
        "  3. Run: claimcheck validate docs/architecture_claims.yaml --config {}",
        args.output.display()
    );

    Ok(EXIT_SUCCESS)
}
