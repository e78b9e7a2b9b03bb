//! Canonical sample invoice used for template preview.
//!
//! Pure apart from the embedded current date: two calls in the same instant
//! produce identical records. Preview rendering uses this fixture so "does
//! the layout render" never depends on live data.

use chrono::Local;

use crate::invoice::{InvoiceRecord, LineItem};

/// Build the canonical preview invoice: two fixed line items, fixed totals,
/// placeholder organization identity.
pub fn sample_invoice() -> InvoiceRecord {
    let today = Local::now().date_naive().to_string();

    InvoiceRecord {
        customer_id: "CUST001".into(),
        customer_name: "Sample Customer".into(),
        customer_address: "123 Main St, City, State 12345".into(),
        customer_email: "customer@example.com".into(),
        invoice_number: "INV-000001".into(),
        invoice_date: today.clone(),
        invoice_period_start: today.clone(),
        invoice_period_end: today.clone(),
        line_items: vec![
            LineItem {
                description: "Oxygen Cylinder 40L".into(),
                barcode: "BC001".into(),
                serial_number: "SN001".into(),
                rental_start_date: today.clone(),
                rental_days: 30,
                quantity: 1,
                unit_price: 5.00,
                total_price: 150.00,
            },
            LineItem {
                description: "Nitrogen Cylinder 20L".into(),
                barcode: "BC002".into(),
                serial_number: "SN002".into(),
                rental_start_date: today,
                rental_days: 30,
                quantity: 1,
                unit_price: 4.00,
                total_price: 120.00,
            },
        ],
        subtotal: 270.00,
        tax_rate: 0.11,
        tax_amount: 29.70,
        total_amount: 299.70,
        organization_name: "Sample Company".into(),
        organization_address: "456 Business Ave, City, State 67890".into(),
        organization_phone: "(555) 123-4567".into(),
        organization_email: "info@sample.com".into(),
        organization_logo_url: None,
        payment_terms: Some("Net 30".into()),
        invoice_notes: Some("Thank you for your business!".into()),
        invoice_footer: Some("This is a sample invoice footer.".into()),
    }
}
