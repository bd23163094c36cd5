//! Batch processing command for multiple OCR document records.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use clap::Args;
use console::style;
use futures_util::stream::{self, StreamExt};
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::task::JoinError;
use tracing::{debug, error, warn};

use ocrinv_core::invoice::{ExtractionResult, TabularInvoiceParser};
use ocrinv_core::models::invoice::InvoiceRecord;

use super::process::{extract_file, format_invoice, OutputFormat};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Glob pattern, or a directory to scan for document records
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

    /// Number of parallel workers (default from config)
    #[arg(short = 'j', long)]
    jobs: Option<usize>,

    /// Continue on I/O and JSON errors
    #[arg(long)]
    continue_on_error: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Status {
    Success,
    Skipped,
    Failed,
}

impl Status {
    fn as_str(self) -> &'static str {
        match self {
            Status::Success => "success",
            Status::Skipped => "skipped",
            Status::Failed => "error",
        }
    }
}

/// Result of processing a single file.
struct ProcessResult {
    path: PathBuf,
    status: Status,
    invoice: Option<InvoiceRecord>,
    warnings: usize,
    error: Option<String>,
    processing_time_ms: u64,
}

impl ProcessResult {
    fn unsuccessful(path: PathBuf, status: Status, error: String, processing_time_ms: u64) -> Self {
        Self {
            path,
            status,
            invoice: None,
            warnings: 0,
            error: Some(error),
            processing_time_ms,
        }
    }
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let config = super::config::load(config_path)?;

    let files = collect_inputs(&args.input, &config.batch.extension)?;
    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    println!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );

    if let Some(ref output_dir) = args.output_dir {
        fs::create_dir_all(output_dir)?;
    }

    let jobs = args.jobs.unwrap_or(config.batch.jobs).max(1);
    debug!("Processing with {} workers", jobs);

    let progress = ProgressBar::new(files.len() as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files",
            )?
            .progress_chars("=>-"),
    );

    let parser = Arc::new(TabularInvoiceParser::from_config(&config.extraction)?);

    // Results come back in input order regardless of which worker finishes first.
    let mut outcomes = stream::iter(files.into_iter().map(|path| {
        let parser = Arc::clone(&parser);
        async move {
            let file_start = Instant::now();
            let task_path = path.clone();
            let outcome =
                tokio::task::spawn_blocking(move || extract_file(&task_path, &parser)).await;
            (path, outcome, file_start.elapsed().as_millis() as u64)
        }
    }))
    .buffered(jobs);

    let mut results = Vec::new();
    while let Some((path, outcome, processing_time_ms)) = outcomes.next().await {
        progress.inc(1);

        let result = match settle(path, outcome, processing_time_ms, args.continue_on_error) {
            Ok(result) => result,
            Err(e) => {
                progress.abandon();
                return Err(e);
            }
        };

        results.push(result);
    }

    progress.finish_and_clear();

    if let Some(ref output_dir) = args.output_dir {
        for result in &results {
            if let Some(invoice) = &result.invoice {
                let output_path = output_path(output_dir, &result.path, args.format);
                fs::write(&output_path, format_invoice(invoice, args.format)?)?;
                debug!("Wrote output to {}", output_path.display());
            }
        }
    }

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

    let count = |status: Status| results.iter().filter(|r| r.status == status).count();

    println!();
    println!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        results.len(),
        start.elapsed()
    );
    println!(
        "   {} successful, {} skipped, {} failed",
        style(count(Status::Success)).green(),
        style(count(Status::Skipped)).yellow(),
        style(count(Status::Failed)).red()
    );

    let unsuccessful: Vec<_> = results
        .iter()
        .filter(|r| r.status != Status::Success)
        .collect();
    if !unsuccessful.is_empty() {
        println!();
        println!("{}", style("Not extracted:").red());
        for result in unsuccessful {
            println!(
                "  - {} ({}): {}",
                result.path.display(),
                result.status.as_str(),
                result.error.as_deref().unwrap_or("unknown error")
            );
        }
    }

    Ok(())
}

/// Apply the batch error policy to one worker outcome.
///
/// Layout failures are always skipped. Anything else, a panicked worker
/// included, stops the run unless `continue_on_error` is set.
fn settle(
    path: PathBuf,
    outcome: Result<ocrinv_core::Result<ExtractionResult>, JoinError>,
    processing_time_ms: u64,
    continue_on_error: bool,
) -> anyhow::Result<ProcessResult> {
    let error = match outcome {
        Ok(Ok(extraction)) => {
            return Ok(ProcessResult {
                path,
                status: Status::Success,
                warnings: extraction.warnings.len(),
                invoice: Some(extraction.invoice),
                error: None,
                processing_time_ms,
            });
        }
        Ok(Err(e)) if e.is_layout_failure() => {
            warn!("Skipping {}: {}", path.display(), e);
            let message = e.to_string();
            return Ok(ProcessResult::unsuccessful(
                path,
                Status::Skipped,
                message,
                processing_time_ms,
            ));
        }
        Ok(Err(e)) => anyhow::Error::from(e),
        Err(e) => anyhow::Error::from(e),
    };

    if continue_on_error {
        warn!("Failed to process {}: {}", path.display(), error);
        let message = error.to_string();
        return Ok(ProcessResult::unsuccessful(
            path,
            Status::Failed,
            message,
            processing_time_ms,
        ));
    }

    error!("Failed to process {}: {}", path.display(), error);
    Err(error.context(format!("Processing failed for {}", path.display())))
}

/// Expand the input into document paths. A directory is scanned for files
/// with the configured extension.
fn collect_inputs(input: &str, extension: &str) -> anyhow::Result<Vec<PathBuf>> {
    let dir = Path::new(input);
    let pattern = if dir.is_dir() {
        dir.join(format!("*.{}", extension))
            .to_string_lossy()
            .into_owned()
    } else {
        input.to_string()
    };

    let mut files: Vec<PathBuf> = glob(&pattern)?
        .filter_map(|r| r.ok())
        .filter(|p| p.is_file())
        .collect();
    files.sort();

    Ok(files)
}

/// `<dir>/<input file stem>.<format extension>`. A record named
/// `scan.pdf.json` therefore lands at `scan.pdf.json` in JSON format.
fn output_path(output_dir: &Path, input: &Path, format: OutputFormat) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("invoice");

    output_dir.join(format!("{}.{}", stem, format.extension()))
}

fn write_summary(path: &Path, results: &[ProcessResult]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "filename",
        "status",
        "invoice_number",
        "date",
        "vendor_name",
        "bill_to_name",
        "items",
        "items_total",
        "warnings",
        "processing_time_ms",
        "error",
    ])?;

    for result in results {
        let filename = result
            .path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("");

        if let Some(invoice) = &result.invoice {
            wtr.write_record([
                filename,
                result.status.as_str(),
                &invoice.invoice_number,
                &invoice.date,
                &invoice.vendor_name,
                &invoice.bill_to_name,
                &invoice.items.len().to_string(),
                &format!("{:.2}", invoice.items_total()),
                &result.warnings.to_string(),
                &result.processing_time_ms.to_string(),
                "",
            ])?;
        } else {
            wtr.write_record([
                filename,
                result.status.as_str(),
                "",
                "",
                "",
                "",
                "",
                "",
                "",
                &result.processing_time_ms.to_string(),
                result.error.as_deref().unwrap_or(""),
            ])?;
        }
    }

    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ocrinv_core::ExtractionError;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_output_path_keeps_source_name() {
        let path = output_path(
            Path::new("results"),
            Path::new("ocr/scan-01.pdf.json"),
            OutputFormat::Json,
        );
        assert_eq!(path, PathBuf::from("results/scan-01.pdf.json"));

        let path = output_path(Path::new("out"), Path::new("a.json"), OutputFormat::Text);
        assert_eq!(path, PathBuf::from("out/a.txt"));
    }

    async fn panicked_worker() -> JoinError {
        tokio::task::spawn_blocking(|| -> ocrinv_core::Result<ExtractionResult> {
            panic!("worker crashed")
        })
        .await
        .unwrap_err()
    }

    #[test]
    fn test_settle_skips_layout_failures() {
        let outcome = Ok(Err(ExtractionError::UnsupportedLayout.into()));
        let result = settle(PathBuf::from("letter.json"), outcome, 3, false).unwrap();

        assert_eq!(result.status, Status::Skipped);
        assert!(result.invoice.is_none());
    }

    #[tokio::test]
    async fn test_settle_panicked_worker_stops_run() {
        let outcome = Err(panicked_worker().await);
        let err = settle(PathBuf::from("scan.json"), outcome, 3, false)
            .err()
            .unwrap();

        assert!(err.to_string().contains("scan.json"));
    }

    #[tokio::test]
    async fn test_settle_panicked_worker_continues_on_error() {
        let outcome = Err(panicked_worker().await);
        let result = settle(PathBuf::from("scan.json"), outcome, 3, true).unwrap();

        assert_eq!(result.status, Status::Failed);
        assert!(result.error.is_some());
    }

    #[test]
    fn test_collect_inputs_scans_directory() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.json"), "{}").unwrap();
        fs::write(dir.path().join("a.json"), "{}").unwrap();
        fs::write(dir.path().join("notes.txt"), "").unwrap();

        let files = collect_inputs(dir.path().to_str().unwrap(), "json").unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
            .collect();

        assert_eq!(names, vec!["a.json", "b.json"]);
    }
}
