//! Structural document template – the fixed invoice skeleton.
//!
//! End users style the document through the layout spec; they do not author
//! this structure. Block order is fixed: optional header, organization
//! identity, invoice title/number/dates, bill-to, the line-item table over
//! the sorted columns, totals, optional notes, optional footer. Record data
//! is HTML-escaped; header/footer layout fragments are inserted verbatim.

use crate::context::RenderContext;
use crate::invoice::format_amount;

/// Expand the structural template against a render context.
pub fn invoice_html(ctx: &RenderContext) -> String {
    let inv = &ctx.invoice;
    let mut html = String::with_capacity(4096);
    html.push_str("<div class=\"page-root\">\n");

    // Optional user header fragment.
    if let Some(fragment) = ctx.layout.header_fragment() {
        html.push_str("<div class=\"header\">");
        html.push_str(fragment);
        html.push_str("</div>\n");
    }

    // Organization identity.
    html.push_str("<div class=\"company-info\">\n");
    if let Some(logo) = ctx.layout.logo() {
        html.push_str(&format!(
            "<img class=\"logo\" src=\"{}\" />\n",
            escape_attr(logo)
        ));
    }
    html.push_str(&format!(
        "<div class=\"company-name\">{}</div>\n",
        escape_html(&inv.organization_name)
    ));
    for line in [
        &inv.organization_address,
        &inv.organization_phone,
        &inv.organization_email,
    ] {
        if !line.is_empty() {
            html.push_str(&format!("<p>{}</p>\n", escape_html(line)));
        }
    }
    html.push_str("</div>\n");

    // Invoice title / number / dates.
    html.push_str("<div class=\"invoice-title\">INVOICE</div>\n");
    html.push_str("<div class=\"invoice-details\">\n");
    html.push_str(&format!(
        "<p>Invoice #: {}</p>\n",
        escape_html(&inv.invoice_number)
    ));
    if !inv.invoice_date.is_empty() {
        html.push_str(&format!(
            "<p>Date: {}</p>\n",
            escape_html(&inv.invoice_date)
        ));
    }
    if !inv.invoice_period_start.is_empty() || !inv.invoice_period_end.is_empty() {
        html.push_str(&format!(
            "<p>Period: {} to {}</p>\n",
            escape_html(&inv.invoice_period_start),
            escape_html(&inv.invoice_period_end)
        ));
    }
    html.push_str("</div>\n");
    html.push_str(&format!(
        "<div class=\"generated-on\">Generated on {}</div>\n",
        escape_html(&ctx.generated_on())
    ));

    // Bill-to.
    html.push_str("<div class=\"bill-to\">\n");
    html.push_str("<div class=\"bill-to-title\">BILL TO</div>\n");
    html.push_str(&format!(
        "<div class=\"customer-name\">{}</div>\n",
        escape_html(&inv.customer_name)
    ));
    for line in [&inv.customer_address, &inv.customer_email] {
        if !line.is_empty() {
            html.push_str(&format!("<p>{}</p>\n", escape_html(line)));
        }
    }
    html.push_str("</div>\n");

    // Line-item table: exactly and only the configured columns, in sorted
    // order. A column naming an unknown field yields empty cells.
    if !ctx.columns.is_empty() {
        html.push_str("<table>\n<tr>");
        for col in &ctx.columns {
            html.push_str(&format!("<th>{}</th>", escape_html(col.heading())));
        }
        html.push_str("</tr>\n");
        for item in &inv.line_items {
            html.push_str("<tr>");
            for col in &ctx.columns {
                html.push_str(&format!("<td>{}</td>", escape_html(&item.lookup(&col.field))));
            }
            html.push_str("</tr>\n");
        }
        html.push_str("</table>\n");
    }

    // Totals.
    html.push_str("<div class=\"totals\">\n");
    total_row(&mut html, "", "Subtotal:", &format_amount(inv.subtotal));
    total_row(
        &mut html,
        "",
        &format!("Tax ({:.0}%):", inv.tax_rate * 100.0),
        &format_amount(inv.tax_amount),
    );
    total_row(
        &mut html,
        " grand-total",
        "Total:",
        &format_amount(inv.total_amount),
    );
    html.push_str("</div>\n");

    // Optional notes.
    if let Some(notes) = inv.invoice_notes.as_deref().filter(|n| !n.trim().is_empty()) {
        html.push_str(&format!(
            "<div class=\"notes\">{}</div>\n",
            escape_html(notes)
        ));
    }

    // Optional user footer fragment.
    if let Some(fragment) = ctx.layout.footer_fragment() {
        html.push_str("<div class=\"footer\">");
        html.push_str(fragment);
        html.push_str("</div>\n");
    }

    html.push_str("</div>\n");
    html
}

fn total_row(html: &mut String, extra_class: &str, label: &str, amount: &str) {
    html.push_str(&format!(
        "<div class=\"total-row{extra_class}\"><span class=\"total-label\">{}</span><span class=\"total-amount\">{}</span></div>\n",
        escape_html(label),
        escape_html(amount)
    ));
}

/// Escape text for element content.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

/// Escape text for a double-quoted attribute value.
pub fn escape_attr(s: &str) -> String {
    escape_html(s).replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::RenderContext;
    use crate::invoice::InvoiceRecord;
    use crate::layout_spec::LayoutSpec;
    use crate::sample::sample_invoice;

    fn layout(json: serde_json::Value) -> LayoutSpec {
        LayoutSpec::from_json(&json).unwrap()
    }

    #[test]
    fn block_order_is_fixed() {
        let spec = layout(serde_json::json!({
            "header": { "text": "<p>HEAD</p>" },
            "footer": { "text": "<p>FOOT</p>" },
            "columns": [{ "field": "description", "label": "Description", "order": 1 }]
        }));
        let html = invoice_html(&RenderContext::new(sample_invoice(), &spec));

        let order = [
            html.find("class=\"header\"").unwrap(),
            html.find("class=\"company-info\"").unwrap(),
            html.find("class=\"invoice-title\"").unwrap(),
            html.find("class=\"bill-to\"").unwrap(),
            html.find("<table>").unwrap(),
            html.find("class=\"totals\"").unwrap(),
            html.find("class=\"notes\"").unwrap(),
            html.find("class=\"footer\"").unwrap(),
        ];
        assert!(order.windows(2).all(|w| w[0] < w[1]), "blocks out of order");
    }

    #[test]
    fn absent_header_footer_are_omitted_entirely() {
        let html = invoice_html(&RenderContext::new(
            sample_invoice(),
            &LayoutSpec::default(),
        ));
        assert!(!html.contains("class=\"header\""));
        assert!(!html.contains("class=\"footer\""));
        // No columns configured: the table is omitted, totals still render.
        assert!(!html.contains("<table>"));
        assert!(html.contains("299.70"));
    }

    #[test]
    fn columns_render_in_sorted_order() {
        let spec = layout(serde_json::json!({
            "columns": [
                { "field": "description", "label": "Description", "order": 1 },
                { "field": "total_price", "label": "Total", "order": 0 }
            ]
        }));
        let html = invoice_html(&RenderContext::new(sample_invoice(), &spec));
        let total_pos = html.find("<th>Total</th>").unwrap();
        let desc_pos = html.find("<th>Description</th>").unwrap();
        assert!(total_pos < desc_pos);
        // Both line items appear.
        assert!(html.contains("Oxygen Cylinder 40L"));
        assert!(html.contains("Nitrogen Cylinder 20L"));
    }

    #[test]
    fn unknown_column_field_renders_empty_cells() {
        let spec = layout(serde_json::json!({
            "columns": [
                { "field": "no_such_field", "label": "Mystery", "order": 0 },
                { "field": "description", "label": "Description", "order": 1 }
            ]
        }));
        let html = invoice_html(&RenderContext::new(sample_invoice(), &spec));
        assert!(html.contains("<td></td>"));
        assert!(html.contains("Oxygen Cylinder 40L"));
    }

    #[test]
    fn record_data_is_escaped_but_fragments_are_not() {
        let mut inv = InvoiceRecord::default();
        inv.customer_name = "Tom & <Jerry>".into();
        let spec = layout(serde_json::json!({ "header": { "text": "<p>raw &amp; kept</p>" } }));
        let html = invoice_html(&RenderContext::new(inv, &spec));
        assert!(html.contains("Tom &amp; &lt;Jerry&gt;"));
        assert!(html.contains("<p>raw &amp; kept</p>"));
    }
}
