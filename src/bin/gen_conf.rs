//! Register sheet to field configuration converter
//! Reads a JSON register sheet and writes one `id,name,high,low` record per entry

use anyhow::Context;
use clap::Parser;
use jesd84_rs::{RegisterSheet, COMMA_DELIMITER};
use std::fs::File;
use std::io::{self, BufWriter};
use std::path::PathBuf;
use tracing_subscriber::{prelude::*, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "gen-conf", version, about = "Generate a field configuration from a register sheet")]
struct Cli {
    /// JSON register sheet
    #[arg(short = 'j', long = "json")]
    sheet: PathBuf,

    /// Output file; standard output when omitted
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,

    /// Record delimiter
    #[arg(short = 'd', long = "delimiter", default_value_t = COMMA_DELIMITER)]
    delimiter: char,
}

fn main() -> anyhow::Result<()> {
    let filter_layer = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("warn"))
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter_layer)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();

    let sheet = RegisterSheet::load(&cli.sheet)
        .with_context(|| format!("Failed to load sheet {}", cli.sheet.display()))?;
    tracing::info!("Loaded {} sheet entries", sheet.len());

    match &cli.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            sheet.write_config(BufWriter::new(file), cli.delimiter)?;
            eprintln!("Wrote {} records to {}", sheet.len(), path.display());
        }
        None => sheet.write_config(io::stdout().lock(), cli.delimiter)?,
    }

    Ok(())
}
