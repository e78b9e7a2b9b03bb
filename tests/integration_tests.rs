//! Integration tests for the invoice rendering pipeline.
//!
//! These validate the externally observable properties:
//! - Default completion for partial layout specs
//! - Column ordering determinism (stable sort)
//! - Stylesheet purity
//! - Missing-field tolerance in table rows
//! - Sample data idempotence
//! - Email body defaulting
//! - The end-to-end render scenario

use sha2::{Digest, Sha256};
use serde_json::json;

use billpress::context::RenderContext;
use billpress::document::invoice_html;
use billpress::email;
use billpress::error::{LayoutError, PipelineError, RenderError};
use billpress::invoice::InvoiceRecord;
use billpress::layout_spec::{LayoutSpec, DEFAULT_PRIMARY_COLOR, DEFAULT_SECONDARY_COLOR};
use billpress::pipeline::{
    compute_document_layout, preview, render_invoice, render_invoice_bytes,
};
use billpress::sample::sample_invoice;
use billpress::theme::{compile_stylesheet, Theme};

// =====================================================================
// Helpers
// =====================================================================

fn layout(value: serde_json::Value) -> LayoutSpec {
    LayoutSpec::from_json(&value).unwrap()
}

fn assert_valid_pdf(bytes: &[u8]) {
    assert!(bytes.len() > 100, "PDF too small: {} bytes", bytes.len());
    assert_eq!(&bytes[0..5], b"%PDF-", "missing PDF header");
}

fn all_page_text(invoice: &InvoiceRecord, spec: &LayoutSpec) -> String {
    let doc = compute_document_layout(invoice, spec).unwrap();
    let mut out = Vec::new();
    fn walk(b: &billpress::page::LayoutBox, out: &mut Vec<String>) {
        if let Some(t) = &b.text {
            for line in &t.lines {
                out.push(line.text.clone());
            }
        }
        for c in &b.children {
            walk(c, out);
        }
    }
    for page in &doc.pages {
        for b in &page.boxes {
            walk(b, &mut out);
        }
    }
    out.join("\n")
}

// =====================================================================
// Default completion
// =====================================================================

#[test]
fn empty_layout_renders_with_all_defaults() {
    let spec = layout(json!({}));
    let bytes = render_invoice_bytes(&sample_invoice(), &spec).unwrap();
    assert_valid_pdf(&bytes);

    let css = compile_stylesheet(&Theme::from_layout(&spec));
    assert!(css.contains(DEFAULT_PRIMARY_COLOR));
    assert!(css.contains(DEFAULT_SECONDARY_COLOR));
    assert!(css.contains("Helvetica, Arial, sans-serif"));
}

#[test]
fn every_partial_subset_renders_and_backfills_defaults() {
    let specs = [
        json!({ "colors": { "primary": "#336699" } }),
        json!({ "fonts": { "heading": "Georgia, serif" } }),
        json!({ "header": { "text": "<p>Hello</p>" } }),
        json!({ "footer": { "text": "<p>Bye</p>" } }),
        json!({ "columns": [{ "field": "description", "order": 1 }] }),
        json!({ "logo_url": null }),
    ];
    for value in specs {
        let spec = layout(value.clone());
        let bytes = render_invoice_bytes(&sample_invoice(), &spec).unwrap();
        assert_valid_pdf(&bytes);

        let css = compile_stylesheet(&Theme::from_layout(&spec));
        if value.get("colors").is_none() {
            assert!(css.contains(DEFAULT_PRIMARY_COLOR), "missing default primary");
        }
        assert!(css.contains(DEFAULT_SECONDARY_COLOR), "missing default secondary");
        if value.get("fonts").is_none() {
            assert!(css.contains("Helvetica, Arial, sans-serif"));
        }
    }
}

// =====================================================================
// Column ordering determinism
// =====================================================================

#[test]
fn columns_sort_by_order_attribute() {
    let spec = layout(json!({
        "columns": [
            { "field": "quantity", "label": "Qty", "order": 3 },
            { "field": "description", "label": "Description", "order": 1 },
            { "field": "unit_price", "label": "Unit", "order": 2 }
        ]
    }));
    let ctx = RenderContext::new(sample_invoice(), &spec);
    let fields: Vec<&str> = ctx.columns.iter().map(|c| c.field.as_str()).collect();
    assert_eq!(fields, vec!["description", "unit_price", "quantity"]);
}

#[test]
fn duplicate_and_missing_orders_are_stable() {
    let spec = layout(json!({
        "columns": [
            { "field": "barcode", "order": 1 },
            { "field": "description" },
            { "field": "serial_number", "order": 1 },
            { "field": "quantity", "order": 0 }
        ]
    }));
    let ctx = RenderContext::new(sample_invoice(), &spec);
    let fields: Vec<&str> = ctx.columns.iter().map(|c| c.field.as_str()).collect();
    // Missing order = 0 keeps input position among the zeros.
    assert_eq!(
        fields,
        vec!["description", "quantity", "barcode", "serial_number"]
    );
}

#[test]
fn header_row_follows_sorted_columns() {
    let spec = layout(json!({
        "columns": [
            { "field": "description", "label": "Description", "order": 1 },
            { "field": "total_price", "label": "Total", "order": 0 }
        ]
    }));
    let html = invoice_html(&RenderContext::new(sample_invoice(), &spec));
    let total = html.find("<th>Total</th>").unwrap();
    let description = html.find("<th>Description</th>").unwrap();
    assert!(total < description);
}

// =====================================================================
// Stylesheet purity
// =====================================================================

#[test]
fn stylesheet_is_byte_identical_for_identical_themes() {
    let theme = Theme {
        primary_color: "#ff0000".into(),
        secondary_color: "#424242".into(),
        heading_font: "Georgia, serif".into(),
        body_font: "Helvetica, Arial, sans-serif".into(),
    };
    let first = Sha256::digest(compile_stylesheet(&theme).as_bytes());
    let second = Sha256::digest(compile_stylesheet(&theme).as_bytes());
    assert_eq!(first, second);
}

#[test]
fn stylesheet_ignores_structural_layout_fields() {
    let with_columns = layout(json!({
        "colors": { "primary": "#123123" },
        "columns": [{ "field": "description", "order": 5 }],
        "header": { "text": "<p>x</p>" },
        "logo_url": "data:image/png;base64,AAAA"
    }));
    let theme_only = layout(json!({ "colors": { "primary": "#123123" } }));
    assert_eq!(
        compile_stylesheet(&Theme::from_layout(&with_columns)),
        compile_stylesheet(&Theme::from_layout(&theme_only))
    );
}

// =====================================================================
// Missing-field tolerance in rows
// =====================================================================

#[test]
fn unknown_column_field_renders_empty_cell_not_error() {
    let spec = layout(json!({
        "columns": [
            { "field": "warranty_expiry", "label": "Warranty", "order": 0 },
            { "field": "description", "label": "Description", "order": 1 }
        ]
    }));
    let bytes = render_invoice_bytes(&sample_invoice(), &spec).unwrap();
    assert_valid_pdf(&bytes);

    let text = all_page_text(&sample_invoice(), &spec);
    // Other columns still render normally.
    assert!(text.contains("Oxygen Cylinder 40L"));
    assert!(text.contains("Nitrogen Cylinder 20L"));
}

// =====================================================================
// Sample data idempotence
// =====================================================================

#[test]
fn sample_invoices_match_apart_from_dates() {
    let a = sample_invoice();
    let b = sample_invoice();
    assert_eq!(a.invoice_number, b.invoice_number);
    assert_eq!(a.customer_name, b.customer_name);
    assert_eq!(a.subtotal, b.subtotal);
    assert_eq!(a.tax_amount, b.tax_amount);
    assert_eq!(a.total_amount, b.total_amount);
    assert_eq!(a.line_items.len(), b.line_items.len());
    for (x, y) in a.line_items.iter().zip(&b.line_items) {
        assert_eq!(x.description, y.description);
        assert_eq!(x.unit_price, y.unit_price);
        assert_eq!(x.total_price, y.total_price);
    }
}

// =====================================================================
// End-to-end scenario
// =====================================================================

#[test]
fn end_to_end_red_theme_two_columns() {
    let spec = layout(json!({
        "colors": { "primary": "#ff0000" },
        "columns": [
            { "field": "description", "label": "Description", "order": 1 },
            { "field": "total_price", "label": "Total", "order": 0 }
        ]
    }));
    let invoice = sample_invoice();
    assert_eq!(invoice.subtotal, 270.00);
    assert_eq!(invoice.tax_amount, 29.70);
    assert_eq!(invoice.total_amount, 299.70);

    // Stylesheet: custom primary in the heading/table-header rules,
    // secondary falls back.
    let css = compile_stylesheet(&Theme::from_layout(&spec));
    assert!(css.contains("background-color: #ff0000"));
    assert!(css.contains("color: #ff0000"));
    assert!(css.contains(DEFAULT_SECONDARY_COLOR));

    // Rendered document: both line items, columns ordered [Total, Description],
    // grand total line present.
    let text = all_page_text(&invoice, &spec);
    assert!(text.contains("Oxygen Cylinder 40L"));
    assert!(text.contains("Nitrogen Cylinder 20L"));
    assert!(text.contains("299.70"));
    let total_header = text.find("Total").unwrap();
    let desc_header = text.find("Description").unwrap();
    assert!(total_header < desc_header);

    let bytes = render_invoice_bytes(&invoice, &spec).unwrap();
    assert_valid_pdf(&bytes);
}

#[test]
fn preview_writes_artifact_to_unique_temp_path() {
    let a = preview(&LayoutSpec::default()).unwrap();
    let b = preview(&LayoutSpec::default()).unwrap();
    assert_valid_pdf(&a.bytes);
    assert_ne!(a.path, b.path);
    assert!(a.path.exists() && b.path.exists());
    std::fs::remove_file(&a.path).unwrap();
    std::fs::remove_file(&b.path).unwrap();
}

#[test]
fn multi_page_invoice_flows_naturally() {
    let mut invoice = sample_invoice();
    let template = invoice.line_items[0].clone();
    for i in 0..120 {
        let mut item = template.clone();
        item.description = format!("Rental line {i}");
        invoice.line_items.push(item);
    }
    let spec = layout(json!({
        "columns": [
            { "field": "description", "label": "Description", "order": 0 },
            { "field": "total_price", "label": "Total", "order": 1 }
        ]
    }));
    let doc = compute_document_layout(&invoice, &spec).unwrap();
    assert!(
        doc.pages.len() > 1,
        "expected natural pagination, got {} page(s)",
        doc.pages.len()
    );
}

// =====================================================================
// Failure semantics
// =====================================================================

#[test]
fn malformed_layout_structure_is_a_layout_error() {
    let err = LayoutSpec::from_json(&json!({ "columns": { "field": "x" } })).unwrap_err();
    assert!(matches!(err, LayoutError::BadColumns(_)));
}

#[test]
fn malformed_color_is_a_render_error_and_no_artifact_is_left() {
    let spec = layout(json!({ "colors": { "primary": "#zzzzzz" } }));
    let err = render_invoice(&sample_invoice(), &spec).unwrap_err();
    assert!(matches!(
        err,
        PipelineError::Render(RenderError::InvalidColor { .. })
    ));
}

// =====================================================================
// Email composition
// =====================================================================

#[test]
fn email_body_defaults_payment_terms_to_net_30() {
    let mut invoice = sample_invoice();
    invoice.payment_terms = None;
    let body = email::default_body(&invoice, &LayoutSpec::default());
    assert!(body.contains("Net 30"));
}

#[test]
fn email_body_carries_invoice_facts() {
    let invoice = sample_invoice();
    let spec = layout(json!({
        "header": { "text": "<p>From Sample Co</p>" },
        "footer": { "text": "<p>See you soon</p>" }
    }));
    let body = email::default_body(&invoice, &spec);
    assert!(body.contains("INV-000001"));
    assert!(body.contains("Sample Customer"));
    assert!(body.contains("$299.70"));
    assert!(body.contains("From Sample Co"));
    assert!(body.contains("See you soon"));
}

#[test]
fn attachment_filename_defaults_to_literal_invoice() {
    assert_eq!(email::attachment_filename(None), "Invoice_invoice.pdf");
    assert_eq!(
        email::attachment_filename(Some("INV-42")),
        "Invoice_INV-42.pdf"
    );
}

#[test]
fn stored_template_placeholders_expand() {
    let invoice = sample_invoice();
    let subject = email::expand_placeholders("Invoice {invoice_number} from {company_name}", &invoice);
    assert_eq!(subject, "Invoice INV-000001 from Sample Company");
}
