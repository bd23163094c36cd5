//! Process command - extract an invoice from a single OCR document record.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use tracing::{debug, info};

use ocrinv_core::invoice::{ExtractionResult, InvoiceParser, TabularInvoiceParser};
use ocrinv_core::models::document::OcrDocument;
use ocrinv_core::models::invoice::InvoiceRecord;

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input OCR document record (JSON with an `ocr_text` field)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Print extraction warnings to stderr
    #[arg(long)]
    show_warnings: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output, one line per item
    Csv,
    /// Plain text summary
    Text,
}

impl OutputFormat {
    /// File extension used when writing this format to a directory.
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Text => "txt",
        }
    }
}

pub async fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let config = super::config::load(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    info!("Processing file: {}", args.input.display());

    let parser = TabularInvoiceParser::from_config(&config.extraction)?;
    let result = extract_file(&args.input, &parser)?;

    if args.show_warnings && !result.warnings.is_empty() {
        eprintln!("{}", style("Extraction warnings:").yellow());
        for warning in &result.warnings {
            eprintln!("  - {}", warning);
        }
    }

    let output = format_invoice(&result.invoice, args.format)?;

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

    debug!(
        "Total processing time: {:?} (extraction {}ms)",
        start.elapsed(),
        result.processing_time_ms
    );

    Ok(())
}

/// Read a document record from disk and run extraction on its OCR text.
pub fn extract_file(
    path: &Path,
    parser: &TabularInvoiceParser,
) -> ocrinv_core::Result<ExtractionResult> {
    let content = fs::read_to_string(path)?;
    let document = OcrDocument::from_json(&content)?;
    Ok(parser.parse(&document.ocr_text)?)
}

pub fn format_invoice(invoice: &InvoiceRecord, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(invoice)?),
        OutputFormat::Csv => format_csv(invoice),
        OutputFormat::Text => Ok(format_text(invoice)),
    }
}

fn format_csv(invoice: &InvoiceRecord) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "invoice_number",
        "date",
        "vendor_name",
        "vendor_address",
        "bill_to_name",
        "sku",
        "description",
        "quantity",
        "price",
        "total",
    ])?;

    for item in &invoice.items {
        wtr.write_record([
            invoice.invoice_number.as_str(),
            invoice.date.as_str(),
            invoice.vendor_name.as_str(),
            invoice.vendor_address.as_str(),
            invoice.bill_to_name.as_str(),
            item.sku.as_str(),
            item.description.as_str(),
            &item.quantity.to_string(),
            &format!("{:.2}", item.price),
            &format!("{:.2}", item.total),
        ])?;
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(invoice: &InvoiceRecord) -> String {
    let mut output = String::new();

    output.push_str(&format!("Invoice: {}\n", invoice.invoice_number));
    output.push_str(&format!("Date: {}\n", invoice.date));
    output.push('\n');

    output.push_str("Vendor:\n");
    output.push_str(&format!("  {}\n", invoice.vendor_name));
    output.push_str(&format!("  {}\n", invoice.vendor_address));
    output.push('\n');

    output.push_str(&format!("Bill to: {}\n", invoice.bill_to_name));
    output.push('\n');

    output.push_str(&format!("Items ({}):\n", invoice.items.len()));
    for item in &invoice.items {
        output.push_str(&format!(
            "  {} | {} x {:.2} = {:.2}\n",
            item.description, item.quantity, item.price, item.total
        ));
    }
    output.push('\n');

    output.push_str(&format!("Total: {:.2} USD\n", invoice.items_total()));

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use ocrinv_core::models::invoice::LineItem;
    use pretty_assertions::assert_eq;

    fn sample() -> InvoiceRecord {
        let mut invoice = InvoiceRecord::unknown();
        invoice.invoice_number = "9230090".to_string();
        invoice.items.push(LineItem::new("Dark Fiber, Route 9", 1.0, 1200.0, 1200.0));
        invoice
    }

    #[test]
    fn test_csv_one_line_per_item() {
        let csv = format_csv(&sample()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[1],
            concat!(
                "9230090,Unknown,Unknown,Unknown,Unknown,Unknown,",
                "\"Dark Fiber, Route 9\",1,1200.00,1200.00",
            )
        );
    }

    #[test]
    fn test_text_summary() {
        let text = format_text(&sample());
        assert!(text.starts_with("Invoice: 9230090\n"));
        assert!(text.contains("Items (1):"));
        assert!(text.contains("Total: 1200.00 USD"));
    }

    #[test]
    fn test_json_uses_record_field_names() {
        let json = format_invoice(&sample(), OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["bill_to_name"], "Unknown");
        assert_eq!(value["items"][0]["tax_rate"], serde_json::Value::Null);
    }
}
