//! Process command - extract fields from a single tax plate PDF.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use levha_core::{DebugArtifacts, Diagnostics, DocumentRecord, ParseResult, TaxPlateParser};

use super::{extension, load_config};

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input PDF
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Write normalized text and intermediate rasters to this directory
    #[arg(long)]
    debug_dir: Option<PathBuf>,

    /// Skip identifier recovery when no labeled identifier is found
    #[arg(long)]
    no_recovery: bool,

    /// Include diagnostics in JSON output and print warnings
    #[arg(long)]
    diagnostics: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text summary
    Text,
}

impl OutputFormat {
    pub fn file_extension(self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Text => "txt",
        }
    }
}

pub async fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let mut config = load_config(config_path)?;
    if args.debug_dir.is_some() {
        config.debug = true;
    }
    if args.no_recovery {
        config.recovery.enabled = false;
    }

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }
    let ext = extension(&args.input);
    if ext != "pdf" {
        anyhow::bail!(
            "Unsupported file format: {} (use `levha recover` for images)",
            ext
        );
    }

    info!("Processing file: {}", args.input.display());

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.set_message("Parsing tax plate...");

    let data = fs::read(&args.input)?;
    let parser = TaxPlateParser::new(config);
    let result = parser.parse_document(&data)?;

    pb.finish_and_clear();

    if let (Some(dir), Some(artifacts)) = (&args.debug_dir, &result.diagnostics.artifacts) {
        write_artifacts(dir, artifacts)?;
        eprintln!(
            "{} Debug artifacts written to {}",
            style("✓").green(),
            dir.display()
        );
    }

    if args.diagnostics {
        for warning in &result.diagnostics.warnings {
            eprintln!("{} {}", style("!").yellow(), warning);
        }
    }

    let output = format_result(&result, args.format, args.diagnostics)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    debug!("Total processing time: {:?}", start.elapsed());
    Ok(())
}

/// Write the normalized text and every named raster.
fn write_artifacts(dir: &Path, artifacts: &DebugArtifacts) -> anyhow::Result<()> {
    fs::create_dir_all(dir)?;
    fs::write(dir.join("normalized_text.txt"), &artifacts.normalized_text)?;
    for (i, raster) in artifacts.rasters.iter().enumerate() {
        let path = dir.join(format!("{:02}_{}.png", i, raster.name));
        raster.image.save(&path)?;
        debug!("Wrote {}", path.display());
    }
    Ok(())
}

pub fn format_result(
    result: &ParseResult,
    format: OutputFormat,
    with_diagnostics: bool,
) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => {
            let diagnostics = with_diagnostics.then_some(&result.diagnostics);
            Ok(format_json(&result.record, diagnostics)?)
        }
        OutputFormat::Csv => format_csv(&result.record),
        OutputFormat::Text => Ok(format_text(&result.record)),
    }
}

fn format_json(
    record: &DocumentRecord,
    diagnostics: Option<&Diagnostics>,
) -> serde_json::Result<String> {
    match diagnostics {
        Some(diagnostics) => serde_json::to_string(&serde_json::json!({
            "record": record,
            "diagnostics": diagnostics,
        })),
        None => serde_json::to_string(record),
    }
}

pub const CSV_HEADER: [&str; 10] = [
    "tax_id",
    "personal_name",
    "organization_name",
    "tax_office",
    "national_id",
    "start_date",
    "business_address",
    "tax_types",
    "activities",
    "tax_bases",
];

/// Record fields in [`CSV_HEADER`] order; lists are joined with "; ".
pub fn csv_fields(record: &DocumentRecord) -> [String; 10] {
    let tax_types = record
        .tax_types
        .iter()
        .map(|t| t.display())
        .collect::<Vec<_>>()
        .join("; ");
    let activities = record
        .activities
        .iter()
        .map(|a| format!("{} - {}", a.code, a.description))
        .collect::<Vec<_>>()
        .join("; ");
    let tax_bases = record
        .tax_bases
        .iter()
        .map(|b| format!("{}: {}", b.year, b.amount))
        .collect::<Vec<_>>()
        .join("; ");

    [
        record.tax_id.clone().unwrap_or_default(),
        record.personal_name.clone().unwrap_or_default(),
        record.organization_name.clone().unwrap_or_default(),
        record.tax_office.clone().unwrap_or_default(),
        record.national_id.clone().unwrap_or_default(),
        record.start_date.map(|d| d.to_string()).unwrap_or_default(),
        record.business_address.clone().unwrap_or_default(),
        tax_types,
        activities,
        tax_bases,
    ]
}

pub fn format_csv(record: &DocumentRecord) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(CSV_HEADER)?;
    wtr.write_record(csv_fields(record))?;
    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

pub fn format_text(record: &DocumentRecord) -> String {
    let mut output = String::new();

    if let Some(name) = &record.organization_name {
        output.push_str(&format!("Ticaret Ünvanı: {}\n", name));
    }
    if let Some(name) = &record.personal_name {
        output.push_str(&format!("Adı Soyadı: {}\n", name));
    }
    if let Some(id) = &record.tax_id {
        output.push_str(&format!("Vergi Kimlik No: {}\n", id));
    }
    if let Some(id) = &record.national_id {
        output.push_str(&format!("T.C. Kimlik No: {}\n", id));
    }
    if let Some(office) = &record.tax_office {
        output.push_str(&format!("Vergi Dairesi: {}\n", office));
    }
    if let Some(date) = record.start_date {
        output.push_str(&format!("İşe Başlama Tarihi: {}\n", date.format("%d.%m.%Y")));
    }
    if let Some(address) = &record.business_address {
        output.push_str(&format!("İş Yeri Adresi: {}\n", address));
    }

    if !record.tax_types.is_empty() {
        output.push_str("\nVergi Türleri:\n");
        for tax_type in &record.tax_types {
            output.push_str(&format!("  {}\n", tax_type.display()));
        }
    }

    if !record.activities.is_empty() {
        output.push_str("\nFaaliyetler:\n");
        for activity in &record.activities {
            output.push_str(&format!("  {} - {}\n", activity.code, activity.description));
        }
    }

    if !record.tax_bases.is_empty() {
        output.push_str("\nGeçmiş Matrahlar:\n");
        for base in &record.tax_bases {
            output.push_str(&format!("  {}: {} TL", base.year, base.amount));
            if let Some(period) = &base.period {
                output.push_str(&format!(" ({})", period));
            }
            output.push('\n');
        }
    }

    output
}
