//! Process command - extract fields from a single invoice file.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use invex_core::InvoicePipeline;

use super::load_config;
use super::output::{format_record, OutputFormat};

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input file (PDF or image)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Print the extracted raw text to stderr
    #[arg(long)]
    show_text: bool,
}

pub async fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    // Check input file exists
    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    info!("Processing file: {}", args.input.display());

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}")?,
    );
    pb.set_message(format!("Extracting fields from {}...", args.input.display()));
    pb.enable_steady_tick(std::time::Duration::from_millis(100));

    let pipeline = InvoicePipeline::from_config(config)?;
    let input = args.input.clone();
    let result = tokio::task::spawn_blocking(move || pipeline.process_detailed(&input)).await?;

    pb.finish_and_clear();

    let Some(result) = result? else {
        anyhow::bail!("Unsupported file format: {}", args.input.display());
    };

    if args.show_text {
        eprintln!("{}", style("Extracted text:").cyan());
        eprintln!("{}", result.raw_text);
        eprintln!();
    }

    if !result.rejected.is_empty() {
        let names: Vec<&str> = result.rejected.iter().map(|f| f.as_str()).collect();
        eprintln!(
            "{} Rejected malformed fields: {}",
            style("⚠").yellow(),
            names.join(", ")
        );
    }

    // Format output
    let output = format_record(&result.record, args.format)?;

    // Write output
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
