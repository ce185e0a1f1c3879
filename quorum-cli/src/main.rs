//! Quorum CLI - score factory diffs with a panel of LLM reviewers
//!
//! Evaluates automated code changes (loop iterations or pull requests) by
//! fanning a scoring prompt out to independent reviewer models and
//! reconciling their judgments into one verdict.

mod commands;

use clap::{Parser, Subcommand};
use quorum_core::Config;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use commands::{IterArgs, PrArgs};

/// Quorum: multi-reviewer evaluation for software factory output
#[derive(Parser, Debug)]
#[command(name = "quorum")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Reviewer models, comma separated (overrides config and env)
    #[arg(long, global = true, env = "QUORUM_MODELS", value_delimiter = ',')]
    models: Option<Vec<String>>,

    /// Project name recorded in traces (overrides config and env)
    #[arg(long, global = true, env = "QUORUM_PROJECT")]
    project: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show version information
    Version,

    /// Evaluate one iteration of a factory run
    #[command(visible_alias = "i")]
    Iter(IterArgs),

    /// Score a pull request and optionally post the result as a comment
    Pr(PrArgs),

    /// Show current configuration
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    // Load configuration with overrides
    let config = Config::load_with_overrides(cli.models.clone(), cli.project.clone())?;

    if cli.verbose {
        tracing::info!(
            models = ?config.eval.models,
            project = %config.eval.project,
            "Configuration loaded"
        );
    }

    match cli.command {
        Some(Commands::Version) => {
            println!("quorum {}", env!("CARGO_PKG_VERSION"));
        }
        Some(Commands::Iter(args)) => {
            args.execute(cli.verbose, &config).await?;
        }
        Some(Commands::Pr(args)) => {
            args.execute(cli.verbose, &config).await?;
        }
        Some(Commands::Config) => {
            println!("Quorum Configuration");
            println!("====================");
            println!();
            println!("Evaluation Settings:");
            println!("  models: {}", config.eval.models.join(", "));
            println!(
                "  reviewer_timeout: {}s",
                config.eval.reviewer_timeout.as_secs()
            );
            println!("  project: {}", config.eval.project);
            println!(
                "  context_file: {}",
                config
                    .eval
                    .context_file
                    .as_ref()
                    .map(|path| path.display().to_string())
                    .unwrap_or_else(|| "(none)".to_string())
            );
            println!();
            println!("LLM Settings:");
            println!("  base_url: {}", config.llm.base_url);
            println!();
            if let Some(path) = Config::default_config_path() {
                println!("Config file: {}", path.display());
                if path.exists() {
                    println!("  (exists)");
                } else {
                    println!("  (not found - using defaults)");
                }
            }
        }
        None => {
            println!("Quorum - multi-reviewer evaluation for software factory output");
            println!();
            println!("Use --help for usage information");
        }
    }

    Ok(())
}
