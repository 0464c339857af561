//! CLI application for Turkish tax plate extraction.

mod commands;

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use commands::{batch, config, process, recover};

/// Vergi Levhası extraction - structured data and tax identifiers from tax plate PDFs
#[derive(Parser)]
#[command(name = "levha")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract fields from a single tax plate PDF
    Process(process::ProcessArgs),

    /// Extract fields from multiple PDFs
    Batch(batch::BatchArgs),

    /// Recover only the tax identifier from a PDF or image
    Recover(recover::RecoverArgs),

    /// Manage configuration
    Config(config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Process(args) => process::run(args, config_path).await?,
        Commands::Batch(args) => batch::run(args, config_path).await?,
        Commands::Recover(args) => {
            if !recover::run(args, config_path).await? {
                return Ok(ExitCode::FAILURE);
            }
        }
        Commands::Config(args) => config::run(args, config_path).await?,
    }
    Ok(ExitCode::SUCCESS)
}
