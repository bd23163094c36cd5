use ocrinv_core::models::config::{ExtractionConfig, RowRules, SpliceRule};
use ocrinv_core::{
    ExtractionError, InvoiceExtractor, InvoiceParser, LineItem, OcrDocument, TabularInvoiceParser,
    UNKNOWN,
};
use pretty_assertions::assert_eq;

fn extract(text: &str) -> Result<ocrinv_core::InvoiceRecord, ExtractionError> {
    TabularInvoiceParser::new().extract_from_text(text)
}

/// Two-page statement the way the OCR service returns it: CRLF line ends,
/// a form feed between pages and the letterhead repeated on page two.
const STATEMENT: &str = concat!(
    "Northwind Transit LLC\r\n",
    "Please make payments to: Northwind Transit LLC\r\n",
    "1200 Harbor Way, Oakland, CA 94607\r\n",
    "PO Box 8812\r\n",
    "Invoice Date Due Date\tInvoice No.\r\n",
    "\t09/22/23\t10/22/23\t4471023\r\n",
    "\r\n",
    "IncentX\r\n",
    "Account No.\tB-22649380\r\n",
    "Description Quantity Rate Amount\r\n",
    "Transport | 10G Wave\t1\t1,500.00\t$1,500.00\r\n",
    "Oakland to Sacramento\r\n",
    "B-22649380\t\t\t\r\n",
    "\u{c}Invoice 4471023\r\n",
    "Page 2 of 2\r\n",
    "PO Box 8812\t\t\t\r\n",
    "Description\t\t\t\r\n",
    "Cross Connect 12\t25.00\t300.00\r\n",
    "IncentX 100 Main St\t\t\t\r\n",
    "Dark Fiber invoice switch 2\t1\t0.00\t-50.00\r\n",
    "\tTotal USD\t$1,750.00\r\n",
);

#[test]
fn test_single_row_table() {
    let invoice = extract(
        "Description Quantity Rate Amount\nWidget\t2\t10.00\t20.00\n\tTotal USD\t$20.00",
    )
    .unwrap();

    assert_eq!(invoice.items, vec![LineItem::new("Widget", 2.0, 10.0, 20.0)]);
    assert_eq!(invoice.items[0].sku, UNKNOWN);
    assert_eq!(invoice.items[0].tax_rate, None);
}

#[test]
fn test_missing_table_header_is_unsupported() {
    let err = extract("Widget\t2\t10.00\t20.00\n\tTotal USD\t$20.00").unwrap_err();
    assert_eq!(err, ExtractionError::UnsupportedLayout);
}

#[test]
fn test_missing_total_line_is_price_section_error() {
    let err = extract("Description Quantity Rate Amount\nWidget\t2\t10.00\t20.00").unwrap_err();
    assert_eq!(err, ExtractionError::PriceSectionNotFound);
}

#[test]
fn test_bill_to_row_is_dropped() {
    let text = "Invoice Date Due Date\tInvoice No.\n\
        \t01/12/24\t02/11/24\t9230090\n\
        \n\
        Contoso Ltd\n\
        Description Quantity Rate Amount\n\
        Contoso Ltd\t\t\t\n\
        Widget\t2\t10.00\t20.00\n\
        \tTotal USD\t$20.00";
    let invoice = extract(text).unwrap();

    assert_eq!(invoice.bill_to_name, "Contoso Ltd");
    assert_eq!(invoice.items, vec![LineItem::new("Widget", 2.0, 10.0, 20.0)]);
}

#[test]
fn test_wrapped_description_joins() {
    let text = concat!(
        "Description Quantity Rate Amount\n",
        "Long Service\n",
        "Description Continued\t1\t5.00\t5.00\n",
        "\tTotal USD\t$5.00",
    );
    let invoice = extract(text).unwrap();

    assert_eq!(
        invoice.items,
        vec![LineItem::new("Long Service Description Continued", 1.0, 5.0, 5.0)]
    );
}

#[test]
fn test_noise_line_before_first_row_is_dropped() {
    let text = concat!(
        "Description Quantity Rate Amount\n",
        "PO Box 8812\n",
        "Widget\t2\t10.00\t20.00\n",
        "\tTotal USD\t$20.00",
    );
    let invoice = extract(text).unwrap();

    assert_eq!(invoice.items, vec![LineItem::new("Widget", 2.0, 10.0, 20.0)]);
}

#[test]
fn test_multi_page_statement() {
    let result = TabularInvoiceParser::new().parse(STATEMENT).unwrap();
    let invoice = result.invoice;

    assert_eq!(invoice.vendor_name, "Northwind Transit LLC");
    assert_eq!(invoice.vendor_address, "Oakland, CA 94607");
    assert_eq!(invoice.date, "09/22/23");
    assert_eq!(invoice.invoice_number, "4471023");
    assert_eq!(invoice.bill_to_name, "IncentX");
    assert_eq!(
        invoice.items,
        vec![
            LineItem::new("Transport | 10G Wave Oakland to Sacramento", 1.0, 1500.0, 1500.0),
            LineItem::new("Cross Connect", 12.0, 25.0, 300.0),
            LineItem::new("Dark Fiber", 1.0, 0.0, 0.0),
        ]
    );
    assert!(result.warnings.is_empty());
}

#[test]
fn test_unknown_bill_to_keeps_rows_mentioning_unknown() {
    let text = concat!(
        "Description Quantity Rate Amount\n",
        "Unknown carrier surcharge\t1\t3.00\t3.00\n",
        "\tTotal USD\t$3.00",
    );
    let invoice = extract(text).unwrap();

    assert_eq!(invoice.bill_to_name, UNKNOWN);
    assert_eq!(invoice.items.len(), 1);
}

#[test]
fn test_splice_rule_from_config() {
    let config = ExtractionConfig {
        rules: RowRules {
            splices: vec![SpliceRule {
                prefix: "Lit Service A".to_string(),
                marker: "Lit Service B".to_string(),
            }],
            ..RowRules::default()
        },
    };
    let parser = TabularInvoiceParser::from_config(&config).unwrap();
    let text = concat!(
        "Description Quantity Rate Amount\n",
        "Lit Service A\t1\t9.00\t9.00\n",
        "Lit Service B\n",
        "\tTotal USD\t$9.00",
    );
    let invoice = parser.extract_from_text(text).unwrap();

    assert_eq!(invoice.items[0].description, "Lit Service A");
}

#[test]
fn test_document_record_json() {
    let doc = OcrDocument::from_json(concat!(
        r#"{"ocr_text": "Description Quantity Rate Amount\nWidget\t2\t10.00\t20.00\n"#,
        r#"\tTotal USD\t$20.00", "date": "2023-09-22 00:00:00"}"#,
    ))
    .unwrap();
    let invoice = TabularInvoiceParser::new().extract(&doc).unwrap();

    assert_eq!(invoice.items.len(), 1);
    assert_eq!(invoice.items_total(), rust_decimal::Decimal::from(20));
}

#[test]
fn test_normalized_text_extracts_the_same_items() {
    let first = extract(STATEMENT).unwrap();
    let normalized = ocrinv_core::invoice::normalize_text(STATEMENT).unwrap();
    let second = extract(&normalized).unwrap();

    assert_eq!(first.items, second.items);
}
