//! Extended CSD field resolver
//! Decodes an ASCII-hex register dump and prints the configured fields
//!
//! Fields come either from a delimited configuration (`id,name,high,low`)
//! or from a JSON register sheet. A decode failure, or any resolution
//! failure in the default fail-fast mode, exits non-zero without printing
//! records. With `--lenient` the good rows are printed and the run still
//! exits non-zero if any row failed.

use anyhow::Context;
use clap::{Args, Parser, ValueEnum};
use jesd84_rs::{render_table, BinaryBuffer, ErrorMode, Pipeline, RegisterSheet, Report};
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt::format::FmtSpan, prelude::*, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "jesd84", version, about = "Resolve Extended CSD fields from a hex dump")]
struct Cli {
    /// Hex text file holding the register image
    #[arg(short = 'b', long = "binary")]
    binary: PathBuf,

    #[command(flatten)]
    source: FieldSource,

    /// JSON file with decoder/profile settings
    #[arg(short = 'p', long = "profile")]
    profile: Option<PathBuf>,

    /// Record delimiter (overrides the profile)
    #[arg(short = 'd', long = "delimiter")]
    delimiter: Option<char>,

    /// Exact number of bytes to decode, e.g. 512 for a full Extended CSD
    #[arg(short = 'n', long = "length")]
    length: Option<usize>,

    /// Keep resolving after row errors; still exits non-zero if any occurred
    #[arg(long)]
    lenient: bool,

    /// Print a hex dump of the decoded buffer first
    #[arg(long)]
    dump: bool,

    /// Output format
    #[arg(short = 'f', long = "format", value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
struct FieldSource {
    /// Delimited field configuration
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// JSON register sheet
    #[arg(short = 'j', long = "json")]
    sheet: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
    JsonPretty,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let pipeline = build_pipeline(&cli)?;
    tracing::debug!("Pipeline settings: {:?}", pipeline);

    let hex = fs::read(&cli.binary)
        .with_context(|| format!("Failed to read {}", cli.binary.display()))?;
    tracing::info!("Loaded {} bytes from {}", hex.len(), cli.binary.display());

    let buffer = pipeline.decode(&hex)?;
    tracing::info!("Decoded {}", buffer);

    let report = resolve(&cli.source, &pipeline, &buffer)?;

    if cli.dump {
        print!("{}", buffer.printable(None, None));
        println!();
    }

    match cli.format {
        OutputFormat::Table => print!("{}", render_table(&report.resolved)),
        OutputFormat::Json => println!("{}", report.resolved.to_json()?),
        OutputFormat::JsonPretty => println!("{}", report.resolved.to_json_pretty()?),
    }

    if !report.is_clean() {
        for err in &report.errors {
            eprintln!("  {}", err);
        }
        anyhow::bail!("{} row(s) could not be resolved", report.errors.len());
    }

    Ok(())
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter_layer = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let format_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_span_events(FmtSpan::NONE);

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(format_layer)
        .init();
}

fn build_pipeline(cli: &Cli) -> anyhow::Result<Pipeline> {
    let mut pipeline = match &cli.profile {
        Some(path) => {
            let json = read_text(path)?;
            Pipeline::from_json(&json)
                .with_context(|| format!("Invalid profile {}", path.display()))?
        }
        None => Pipeline::default(),
    };

    if let Some(delimiter) = cli.delimiter {
        pipeline.profile.delimiter = delimiter;
    }
    if let Some(length) = cli.length {
        pipeline.decoder.expected_len = Some(length);
        pipeline.decoder.max_len = pipeline.decoder.max_len.max(length);
    }
    if cli.lenient {
        pipeline.profile.mode = ErrorMode::Lenient;
    }

    Ok(pipeline)
}

fn resolve(
    source: &FieldSource,
    pipeline: &Pipeline,
    buffer: &BinaryBuffer,
) -> anyhow::Result<Report> {
    let report = match (&source.config, &source.sheet) {
        (Some(path), _) => {
            let text = read_text(path)?;
            pipeline.resolve_config(buffer, &text)?
        }
        (None, Some(path)) => {
            let sheet = RegisterSheet::load(path)
                .with_context(|| format!("Failed to load sheet {}", path.display()))?;
            tracing::info!("Loaded {} sheet entries", sheet.len());

            let descs = sheet.descriptors(pipeline.profile.max_name_len);
            pipeline.resolve_descriptors(buffer, &descs)?
        }
        (None, None) => anyhow::bail!("Either --config or --json is required"),
    };

    tracing::info!("Resolved {} fields", report.resolved.len());
    Ok(report)
}

fn read_text(path: &Path) -> anyhow::Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}
