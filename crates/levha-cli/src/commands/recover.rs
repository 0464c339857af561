//! Recover command - find only the tax identifier.

use std::fs;
use std::path::PathBuf;

use clap::Args;
use console::style;
use tracing::info;

use levha_core::TaxPlateParser;

use super::load_config;

/// Arguments for the recover command.
#[derive(Args)]
pub struct RecoverArgs {
    /// Input file (PDF or image)
    #[arg(required = true)]
    input: PathBuf,

    /// Print the identifier and diagnostics as JSON
    #[arg(long)]
    json: bool,
}

/// Returns whether an identifier was found.
pub async fn run(args: RecoverArgs, config_path: Option<&str>) -> anyhow::Result<bool> {
    let config = load_config(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }
    let data = fs::read(&args.input)?;

    let parser = TaxPlateParser::new(config).with_recovery(true);
    let result = parser.recover_identifier(&data)?;
    info!(
        "Recovery made {} attempts in {}ms",
        result.diagnostics.attempts, result.diagnostics.processing_time_ms
    );

    if args.json {
        println!(
            "{}",
            serde_json::to_string(&serde_json::json!({
                "identifier": result.identifier,
                "diagnostics": result.diagnostics,
            }))?
        );
    } else if let Some(identifier) = &result.identifier {
        println!("{}", identifier);
    }

    if !result.found() {
        eprintln!("{} No tax identifier found", style("✗").red());
    }
    Ok(result.found())
}
