//! Batch processing command for multiple invoice files.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Local};
use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, warn};

use invex_core::{classify, ExtractionResult, InvoicePipeline};

use super::load_config;
use super::output::{format_record, OutputFormat};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Input files or glob pattern
    #[arg(required = true)]
    input: String,

    /// Output directory
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Output format for each file
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Also generate a summary CSV
    #[arg(long)]
    summary: bool,

    /// Number of parallel workers
    #[arg(short = 'j', long, default_value = "4")]
    jobs: usize,

    /// Give up on a file after this many seconds
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Continue on error
    #[arg(long)]
    continue_on_error: bool,
}

/// Result of processing a single file.
struct ProcessResult {
    path: PathBuf,
    extraction: Option<ExtractionResult>,
    error: Option<String>,
    processing_time_ms: u64,
    processed_at: DateTime<Local>,
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    if args.jobs == 0 {
        anyhow::bail!("--jobs must be at least 1");
    }

    // Expand glob pattern
    let (files, skipped): (Vec<PathBuf>, Vec<PathBuf>) = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| p.is_file())
        .partition(|p| classify(p).is_supported());

    for path in &skipped {
        debug!("Skipping unsupported file {}", path.display());
    }

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    println!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );

    // Create output directory if specified
    if let Some(ref output_dir) = args.output_dir {
        fs::create_dir_all(output_dir)?;
    }

    let overall_pb = ProgressBar::new(files.len() as u64);
    overall_pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
            .progress_chars("=>-"),
    );

    let pipeline = Arc::new(InvoicePipeline::from_config(config)?);
    let permits = Arc::new(Semaphore::new(args.jobs));
    let timeout = args.timeout_secs.map(Duration::from_secs);

    let mut tasks = JoinSet::new();
    for (index, path) in files.iter().cloned().enumerate() {
        let pipeline = Arc::clone(&pipeline);
        let permits = Arc::clone(&permits);
        tasks.spawn(async move {
            let _permit = permits.acquire_owned().await;
            (index, process_file(pipeline, path, timeout).await)
        });
    }

    let mut results: Vec<(usize, ProcessResult)> = Vec::with_capacity(files.len());
    while let Some(joined) = tasks.join_next().await {
        let (index, result) = joined?;
        overall_pb.inc(1);

        if let Some(error_msg) = &result.error {
            if args.continue_on_error {
                warn!("Failed to process {}: {}", result.path.display(), error_msg);
            } else {
                error!("Failed to process {}: {}", result.path.display(), error_msg);
                overall_pb.abandon();
                anyhow::bail!("Processing failed for {}: {}", result.path.display(), error_msg);
            }
        }
        results.push((index, result));
    }

    overall_pb.finish_with_message("Complete");

    results.sort_by_key(|(index, _)| *index);
    let results: Vec<ProcessResult> = results.into_iter().map(|(_, r)| r).collect();

    // Write outputs
    let successful: Vec<_> = results.iter().filter(|r| r.extraction.is_some()).collect();
    let failed: Vec<_> = results.iter().filter(|r| r.error.is_some()).collect();

    let paths: Vec<&Path> = successful.iter().map(|r| r.path.as_path()).collect();
    let output_names = unique_output_names(&paths, args.format);

    for (result, output_name) in successful.iter().zip(&output_names) {
        let Some(extraction) = &result.extraction else {
            continue;
        };
        let content = format_record(&extraction.record, args.format)?;

        if let Some(output_dir) = &args.output_dir {
            let output_path = output_dir.join(output_name);
            fs::write(&output_path, content)?;
            debug!("Wrote output to {}", output_path.display());
        } else {
            println!("{}", style(result.path.display()).bold());
            println!("{}", content);
        }
    }

    // Generate summary if requested
    if args.summary {
        let summary_path = args
            .output_dir
            .as_ref()
            .map(|d| d.join("summary.csv"))
            .unwrap_or_else(|| PathBuf::from("summary.csv"));

        write_summary(&summary_path, &results)?;
        println!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    // Print summary
    println!();
    println!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        results.len(),
        start.elapsed()
    );
    println!(
        "   {} successful, {} failed, {} skipped",
        style(successful.len()).green(),
        style(failed.len()).red(),
        style(skipped.len()).yellow()
    );

    if !failed.is_empty() {
        println!();
        println!("{}", style("Failed files:").red());
        for result in &failed {
            println!(
                "  - {}: {}",
                result.path.display(),
                result.error.as_deref().unwrap_or("unknown error")
            );
        }
    }

    Ok(())
}

/// Run the pipeline for one file on the blocking pool, bounded by `timeout`.
///
/// A timed-out file is reported as failed; its blocking task cannot be
/// cancelled and finishes in the background.
async fn process_file(
    pipeline: Arc<InvoicePipeline>,
    path: PathBuf,
    timeout: Option<Duration>,
) -> ProcessResult {
    let file_start = Instant::now();
    let task_path = path.clone();
    let task = tokio::task::spawn_blocking(move || pipeline.process_detailed(&task_path));

    let joined = match timeout {
        Some(limit) => match tokio::time::timeout(limit, task).await {
            Ok(joined) => joined,
            Err(_) => {
                return failed(path, format!("timed out after {}s", limit.as_secs()), file_start);
            }
        },
        None => task.await,
    };

    let outcome = match joined {
        Ok(outcome) => outcome,
        Err(e) => return failed(path, format!("worker failed: {}", e), file_start),
    };

    match outcome {
        Ok(Some(extraction)) => ProcessResult {
            path,
            extraction: Some(extraction),
            error: None,
            processing_time_ms: file_start.elapsed().as_millis() as u64,
            processed_at: Local::now(),
        },
        Ok(None) => failed(path, "Unsupported file format".to_string(), file_start),
        Err(e) => failed(path, e.to_string(), file_start),
    }
}

fn failed(path: PathBuf, error: String, started: Instant) -> ProcessResult {
    ProcessResult {
        path,
        extraction: None,
        error: Some(error),
        processing_time_ms: started.elapsed().as_millis() as u64,
        processed_at: Local::now(),
    }
}

/// `<file name with dots as underscores>.<ext>`, so `a.pdf` and `a.png` do
/// not collide.
fn output_file_name(path: &Path, format: OutputFormat) -> String {
    let name = path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("invoice")
        .replace('.', "_");
    format!("{}.{}", name, format.extension())
}

/// [`output_file_name`] for each path, with `_2`, `_3`, ... appended to the
/// stem of repeats so files with the same name in different directories do
/// not overwrite each other.
fn unique_output_names(paths: &[&Path], format: OutputFormat) -> Vec<String> {
    let mut used = HashSet::new();
    paths
        .iter()
        .map(|path| {
            let base = output_file_name(path, format);
            let mut name = base.clone();
            let mut n = 2;
            while !used.insert(name.clone()) {
                let stem = base.trim_end_matches(&format!(".{}", format.extension()));
                name = format!("{}_{}.{}", stem, n, format.extension());
                n += 1;
            }
            name
        })
        .collect()
}

fn write_summary(path: &Path, results: &[ProcessResult]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "filename",
        "status",
        "invoice_number",
        "date",
        "total_amount",
        "address",
        "rejected",
        "processing_time_ms",
        "processed_at",
        "error",
    ])?;

    for result in results {
        let filename = result.path.file_name().and_then(|s| s.to_str()).unwrap_or("");
        let time_ms = result.processing_time_ms.to_string();
        let processed_at = result.processed_at.to_rfc3339();

        if let Some(extraction) = &result.extraction {
            let record = &extraction.record;
            let rejected: Vec<&str> = extraction.rejected.iter().map(|f| f.as_str()).collect();
            wtr.write_record([
                filename,
                "success",
                record.invoice_number.as_deref().unwrap_or(""),
                record.date.as_deref().unwrap_or(""),
                record.total_amount.as_deref().unwrap_or(""),
                record.address.as_deref().unwrap_or(""),
                rejected.join(";").as_str(),
                time_ms.as_str(),
                processed_at.as_str(),
                "",
            ])?;
        } else {
            wtr.write_record([
                filename,
                "error",
                "",
                "",
                "",
                "",
                "",
                time_ms.as_str(),
                processed_at.as_str(),
                result.error.as_deref().unwrap_or(""),
            ])?;
        }
    }

    wtr.flush()?;
    Ok(())
}
