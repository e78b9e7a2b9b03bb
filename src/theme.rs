//! Theme-to-stylesheet compiler.
//!
//! A pure function from the four effective theme values (primary/secondary
//! color, heading/body font) to a complete stylesheet. Page geometry and the
//! structural rules – row striping, heading hierarchy, total-block emphasis –
//! are fixed; only the four theme slots vary, so identical inputs always
//! produce byte-identical output. Content structure (columns, line items) is
//! the document template's concern, never this module's.

use crate::layout_spec::LayoutSpec;

/// The four-value visual theme extracted from a [`LayoutSpec`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    pub primary_color: String,
    pub secondary_color: String,
    pub heading_font: String,
    pub body_font: String,
}

impl Theme {
    /// Extract the effective theme from a layout. No other layout field
    /// participates.
    pub fn from_layout(layout: &LayoutSpec) -> Self {
        Self {
            primary_color: layout.primary_color().to_string(),
            secondary_color: layout.secondary_color().to_string(),
            heading_font: layout.heading_font().to_string(),
            body_font: layout.body_font().to_string(),
        }
    }
}

/// Compile the invoice stylesheet for a theme.
pub fn compile_stylesheet(theme: &Theme) -> String {
    let Theme {
        primary_color,
        secondary_color,
        heading_font,
        body_font,
    } = theme;

    format!(
        r#"@page {{
    size: A4;
    margin: 20mm;
}}

body {{
    font-family: {body_font};
    font-size: 10pt;
    color: #333;
    line-height: 1.4;
}}

.header {{
    margin-bottom: 20px;
}}

.company-info {{
    margin-bottom: 20px;
}}

.company-name {{
    font-family: {heading_font};
    font-size: 24pt;
    font-weight: bold;
    color: {primary_color};
    margin-bottom: 10px;
}}

.invoice-title {{
    font-family: {heading_font};
    font-size: 32pt;
    font-weight: bold;
    color: {primary_color};
    text-align: right;
    margin-bottom: 20px;
}}

.invoice-details {{
    text-align: right;
    margin-bottom: 20px;
}}

.generated-on {{
    text-align: right;
    font-size: 8pt;
    color: {secondary_color};
    margin-bottom: 10px;
}}

.bill-to {{
    margin-bottom: 20px;
}}

.bill-to-title {{
    font-family: {heading_font};
    font-size: 12pt;
    font-weight: bold;
    color: {primary_color};
    margin-bottom: 5px;
}}

.customer-name {{
    font-weight: bold;
    margin-bottom: 5px;
}}

table {{
    width: 100%;
    margin: 20px 0;
}}

th {{
    background-color: {primary_color};
    color: white;
    padding: 10px;
    text-align: left;
    font-weight: bold;
}}

td {{
    padding: 8px;
    border-bottom: 1px solid #ddd;
}}

tr:nth-child(even) {{
    background-color: #f9f9f9;
}}

.totals {{
    margin-top: 20px;
}}

.total-row {{
    display: flex;
    justify-content: flex-end;
    margin: 5px 0;
}}

.total-label {{
    width: 150px;
    color: {secondary_color};
}}

.total-amount {{
    width: 100px;
    text-align: right;
}}

.grand-total {{
    font-size: 14pt;
    font-weight: bold;
    color: {primary_color};
    border-top: 2px solid {primary_color};
    padding-top: 10px;
    margin-top: 10px;
}}

.notes {{
    margin-top: 30px;
    padding: 10px;
    background-color: #f5f5f5;
}}

.footer {{
    margin-top: 40px;
    padding-top: 20px;
    border-top: 1px solid #ddd;
    text-align: center;
    font-size: 8pt;
    color: #666;
}}

.logo {{
    max-width: 200px;
    max-height: 80px;
    margin-bottom: 10px;
}}
"#
    )
}
