use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mivzak::config::Config;

mod commands;

use commands::{BatchParams, DetectParams, OutputFormat};

#[derive(Parser)]
#[command(
    name = "mivzak",
    version,
    about = "Politician mention detection for Hebrew news articles",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log format (text, json)
    #[arg(long, global = true)]
    log_format: Option<String>,

    /// TOML configuration file (environment variables when unset)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Override the roster path
    #[arg(long, global = true)]
    roster: Option<PathBuf>,

    /// Override the rules path
    #[arg(long, global = true)]
    rules: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Detect politicians mentioned in one article
    Detect {
        /// Article JSON file ({"title", "description", "content"})
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Article title
        #[arg(long)]
        title: Option<String>,

        /// Article description
        #[arg(long)]
        description: Option<String>,

        /// Article body text
        #[arg(long)]
        content: Option<String>,

        /// Strip HTML and URLs before detection
        #[arg(long, default_value = "false")]
        clean: bool,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Detect politicians across a JSON-lines file of articles
    Batch {
        /// Input JSON-lines file
        #[arg(short, long)]
        input: PathBuf,

        /// Output JSON-lines file (stdout when unset)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Articles processed concurrently
        #[arg(long, default_value = "8")]
        concurrency: usize,

        /// Strip HTML and URLs before detection
        #[arg(long, default_value = "false")]
        clean: bool,
    },

    /// Export the active rule set as TOML
    Rules {
        /// Output file path
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Assign portrait images to roster records
    Images {
        /// Portrait directory override
        #[arg(long)]
        images_dir: Option<PathBuf>,

        /// Write the updated roster back to disk
        #[arg(long, default_value = "false")]
        write: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("Failed to load config: {}", path.display()))?,
        None => Config::from_env().context("Failed to read configuration from environment")?,
    };
    if let Some(roster) = cli.roster {
        config.paths.roster = roster;
    }
    if let Some(rules) = cli.rules {
        config.paths.rules = Some(rules);
    }
    if let Some(format) = cli.log_format {
        config.logging.format = format;
    }
    config.validate().context("Invalid configuration")?;

    // Initialize tracing/logging
    setup_tracing(&config.logging.format, &config.logging.level, cli.verbose)?;

    tracing::debug!(config = ?config, "Configuration loaded");

    match cli.command {
        Commands::Detect {
            input,
            title,
            description,
            content,
            clean,
            format,
        } => {
            tracing::debug!(input = ?input, clean = %clean, "Starting detect command");
            commands::detect(
                &config,
                DetectParams {
                    input,
                    title,
                    description,
                    content,
                    clean,
                    format,
                },
            )?;
        }

        Commands::Batch {
            input,
            output,
            concurrency,
            clean,
        } => {
            tracing::info!(
                input = %input.display(),
                output = ?output,
                concurrency = %concurrency,
                "Starting batch command"
            );
            commands::batch(
                &config,
                BatchParams {
                    input,
                    output,
                    concurrency,
                    clean,
                },
            )
            .await?;
        }

        Commands::Rules { output } => {
            commands::rules(&config, output.as_deref())?;
        }

        Commands::Images { images_dir, write } => {
            if let Some(dir) = images_dir {
                config.paths.images_dir = dir;
            }
            tracing::info!(
                roster = %config.paths.roster.display(),
                images_dir = %config.paths.images_dir.display(),
                write = %write,
                "Starting images command"
            );
            commands::images(&config, write)?;
        }
    }

    Ok(())
}

/// Logs go to stderr so command output on stdout stays machine-readable.
fn setup_tracing(format: &str, level: &str, verbose: bool) -> Result<()> {
    let env_filter = if verbose {
        tracing_subscriber::EnvFilter::new("mivzak=debug,info")
    } else {
        tracing_subscriber::EnvFilter::new(format!("mivzak={},warn", level.to_lowercase()))
    };

    match format {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }

    Ok(())
}
