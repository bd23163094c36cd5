//! Verify command - compare extracted records against reference records.
//!
//! The reference is the OCR service's own interpretation of the same
//! document, stored under the same file name as the extracted result.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use clap::Args;
use console::style;
use rust_decimal::Decimal;
use tracing::{debug, info};

use ocrinv_core::models::document::ReferenceDocument;
use ocrinv_core::models::invoice::InvoiceRecord;

/// Arguments for the verify command.
#[derive(Args)]
pub struct VerifyArgs {
    /// Directory of extracted JSON records
    #[arg(long)]
    results: PathBuf,

    /// Directory of reference JSON records with matching file names
    #[arg(long)]
    reference: PathBuf,
}

/// One field that differs between a result and its reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mismatch {
    pub field: &'static str,
    pub extracted: String,
    pub expected: String,
}

impl Mismatch {
    fn new(field: &'static str, extracted: impl ToString, expected: impl ToString) -> Self {
        Self {
            field,
            extracted: extracted.to_string(),
            expected: expected.to_string(),
        }
    }
}

pub async fn run(args: VerifyArgs) -> anyhow::Result<()> {
    let mut files: Vec<PathBuf> = fs::read_dir(&args.results)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.extension().and_then(|e| e.to_str()) == Some("json"))
        .collect();
    files.sort();

    if files.is_empty() {
        anyhow::bail!("No JSON results found in {}", args.results.display());
    }

    info!("Verifying {} results against {}", files.len(), args.reference.display());

    let mut failed = 0usize;
    for result_path in &files {
        let name = result_path.file_name().unwrap_or_default();
        let reference_path = args.reference.join(name);

        let mismatches = match verify_file(result_path, &reference_path) {
            Ok(mismatches) => mismatches,
            Err(e) => {
                failed += 1;
                println!(
                    "{} {}: {}",
                    style("✗").red(),
                    result_path.display(),
                    e
                );
                continue;
            }
        };

        if mismatches.is_empty() {
            println!("{} {}", style("✓").green(), result_path.display());
            continue;
        }

        failed += 1;
        println!("{} {}", style("✗").red(), result_path.display());
        for m in &mismatches {
            println!(
                "    {}: extracted {:?}, expected {:?}",
                m.field, m.extracted, m.expected
            );
        }
    }

    println!();
    println!(
        "   {} matched, {} mismatched",
        style(files.len() - failed).green(),
        style(failed).red()
    );

    if failed > 0 {
        anyhow::bail!("{} of {} results did not match their reference", failed, files.len());
    }

    Ok(())
}

fn verify_file(result_path: &Path, reference_path: &Path) -> anyhow::Result<Vec<Mismatch>> {
    if !reference_path.exists() {
        anyhow::bail!("Reference not found: {}", reference_path.display());
    }

    let invoice: InvoiceRecord = serde_json::from_str(&fs::read_to_string(result_path)?)?;
    let reference = ReferenceDocument::from_json(&fs::read_to_string(reference_path)?)?;

    debug!("Comparing {} with {}", result_path.display(), reference_path.display());

    Ok(compare(&invoice, &reference))
}

/// Field by field comparison. Dates compare as calendar dates and item
/// totals as sums rounded to cents.
pub fn compare(invoice: &InvoiceRecord, reference: &ReferenceDocument) -> Vec<Mismatch> {
    let mut mismatches = Vec::new();

    let mut text_field = |field: &'static str, extracted: &str, expected: Option<&str>| {
        if expected != Some(extracted) {
            mismatches.push(Mismatch::new(field, extracted, expected.unwrap_or("<missing>")));
        }
    };

    text_field(
        "invoice_number",
        &invoice.invoice_number,
        reference.invoice_number.as_deref(),
    );
    text_field(
        "bill_to_name",
        &invoice.bill_to_name,
        reference.bill_to.name.as_deref(),
    );
    text_field(
        "vendor_name",
        &invoice.vendor_name,
        reference.vendor.name.as_deref(),
    );

    let extracted_date = invoice.issue_date();
    let expected_date = reference.issue_date();
    if extracted_date.is_none() || extracted_date != expected_date {
        mismatches.push(Mismatch::new(
            "date",
            display_date(extracted_date, &invoice.date),
            display_date(expected_date, reference.date.as_deref().unwrap_or("<missing>")),
        ));
    }

    if invoice.items.len() != reference.line_items.len() {
        mismatches.push(Mismatch::new(
            "item_count",
            invoice.items.len(),
            reference.line_items.len(),
        ));
    }

    let extracted_total: Decimal = invoice.items_total();
    let expected_total: Decimal = reference.items_total();
    if extracted_total != expected_total {
        mismatches.push(Mismatch::new(
            "items_total",
            format!("{:.2}", extracted_total),
            format!("{:.2}", expected_total),
        ));
    }

    mismatches
}

fn display_date(parsed: Option<NaiveDate>, raw: &str) -> String {
    parsed
        .map(|d| d.to_string())
        .unwrap_or_else(|| format!("unparseable {:?}", raw))
}
