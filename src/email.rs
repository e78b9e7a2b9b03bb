//! Email composition – the default subject/body and attachment naming used
//! by the dispatch collaborator. The body is a simpler sibling of the
//! document template: it consumes the same header/footer layout fields and a
//! fixed subset of invoice fields, with identical defaulting rules.

use crate::document::escape_html;
use crate::invoice::{format_amount, InvoiceRecord};
use crate::layout_spec::LayoutSpec;

/// Attachment filename: `Invoice_<invoice_number>.pdf`, with a literal
/// `invoice` segment when the number is absent.
pub fn attachment_filename(invoice_number: Option<&str>) -> String {
    let segment = match invoice_number {
        Some(n) if !n.trim().is_empty() => n,
        _ => "invoice",
    };
    format!("Invoice_{segment}.pdf")
}

/// Default subject line.
pub fn default_subject(invoice: &InvoiceRecord) -> String {
    format!(
        "Invoice {} from {}",
        invoice.invoice_number, invoice.organization_name
    )
}

/// Default HTML body for the invoice email.
pub fn default_body(invoice: &InvoiceRecord, layout: &LayoutSpec) -> String {
    let mut body = String::with_capacity(1024);

    if let Some(fragment) = layout.header_fragment() {
        body.push_str(fragment);
        body.push('\n');
    }

    body.push_str(&format!(
        "<p>Dear {},</p>\n",
        escape_html(&invoice.customer_name)
    ));
    body.push_str(&format!(
        "<p>Please find attached invoice {} for the period {} to {}.</p>\n",
        escape_html(&invoice.invoice_number),
        escape_html(&invoice.invoice_period_start),
        escape_html(&invoice.invoice_period_end)
    ));
    body.push_str(&format!(
        "<p>Amount due: ${}</p>\n",
        format_amount(invoice.total_amount)
    ));
    body.push_str(&format!(
        "<p>Payment terms: {}</p>\n",
        escape_html(invoice.payment_terms_or_default())
    ));

    if let Some(fragment) = layout.footer_fragment() {
        body.push_str(fragment);
        body.push('\n');
    }

    body
}

/// Substitute the stored-template placeholders `{company_name}`,
/// `{invoice_number}`, `{customer_name}`, and `{total_amount}` in a stored
/// subject or body.
pub fn expand_placeholders(text: &str, invoice: &InvoiceRecord) -> String {
    text.replace("{company_name}", &invoice.organization_name)
        .replace("{invoice_number}", &invoice.invoice_number)
        .replace("{customer_name}", &invoice.customer_name)
        .replace(
            "{total_amount}",
            &format!("${}", format_amount(invoice.total_amount)),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample::sample_invoice;

    #[test]
    fn filename_defaults_when_number_absent() {
        assert_eq!(attachment_filename(None), "Invoice_invoice.pdf");
        assert_eq!(attachment_filename(Some("")), "Invoice_invoice.pdf");
        assert_eq!(
            attachment_filename(Some("INV-000001")),
            "Invoice_INV-000001.pdf"
        );
    }

    #[test]
    fn subject_names_invoice_and_company() {
        let subject = default_subject(&sample_invoice());
        assert_eq!(subject, "Invoice INV-000001 from Sample Company");
    }

    #[test]
    fn body_defaults_payment_terms_to_net_30() {
        let mut inv = sample_invoice();
        inv.payment_terms = None;
        let body = default_body(&inv, &LayoutSpec::default());
        assert!(body.contains("Net 30"));
    }

    #[test]
    fn body_formats_total_to_two_decimals() {
        let inv = sample_invoice();
        let body = default_body(&inv, &LayoutSpec::default());
        assert!(body.contains("$299.70"));
        assert!(body.contains("INV-000001"));
        assert!(body.contains("Sample Customer"));
    }

    #[test]
    fn body_includes_layout_header_and_footer() {
        let layout = LayoutSpec::from_json(&serde_json::json!({
            "header": { "text": "<p>From the desk of Sample Co</p>" },
            "footer": { "text": "<p>Thanks!</p>" }
        }))
        .unwrap();
        let body = default_body(&sample_invoice(), &layout);
        let head = body.find("From the desk").unwrap();
        let dear = body.find("Dear ").unwrap();
        let foot = body.find("Thanks!").unwrap();
        assert!(head < dear && dear < foot);
    }

    #[test]
    fn placeholders_expand() {
        let inv = sample_invoice();
        let out = expand_placeholders(
            "Invoice {invoice_number} for {customer_name}: {total_amount} ({company_name})",
            &inv,
        );
        assert_eq!(
            out,
            "Invoice INV-000001 for Sample Customer: $299.70 (Sample Company)"
        );
    }
}
