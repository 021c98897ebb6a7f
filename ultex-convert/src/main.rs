use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::PathBuf;
use ultex_convert::{flatten, write_csv, write_plain};

/// Flattens a FACET analysis JSON document into a per-frame table.
#[derive(Parser)]
#[command(name = "ultex-convert")]
struct Args {
    /// Input JSON file
    input: PathBuf,

    /// Output table; defaults to the input path with a .csv extension
    output: Option<PathBuf>,

    /// Whitespace-delimited numbers without a header row, instead of CSV
    #[arg(long)]
    plain: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let text = fs::read_to_string(&args.input)
        .with_context(|| format!("failed to read {}", args.input.display()))?;
    let doc = serde_json::from_str(&text)
        .with_context(|| format!("{} is not valid JSON", args.input.display()))?;
    let rows = flatten(&doc).context("document does not match the FACET schema")?;

    let output = args
        .output
        .unwrap_or_else(|| args.input.with_extension("csv"));
    let file = File::create(&output)
        .with_context(|| format!("failed to create {}", output.display()))?;
    let writer = BufWriter::new(file);
    if args.plain {
        write_plain(writer, &rows)?;
    } else {
        write_csv(writer, &rows)?;
    }

    info!("wrote {} rows to {}", rows.len(), output.display());
    println!("{} rows -> {}", rows.len(), output.display());
    Ok(())
}
