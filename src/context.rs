//! Render context – the flattened variable set one render call consumes.
//!
//! Combines an [`InvoiceRecord`] and a [`LayoutSpec`]: columns come out
//! stably sorted by their `order` attribute, theme fields arrive already
//! defaulted, and the current timestamp is captured once for the
//! "Generated on" line. Owned exclusively by one render call.

use chrono::{DateTime, Local};

use crate::invoice::InvoiceRecord;
use crate::layout_spec::{ColumnSpec, LayoutSpec};

/// Flattened variables for a single render call.
#[derive(Debug, Clone)]
pub struct RenderContext {
    pub invoice: InvoiceRecord,
    /// Columns sorted ascending by `order`; ties keep input order.
    pub columns: Vec<ColumnSpec>,
    pub layout: LayoutSpec,
    /// Captured at build time. This is the one non-deterministic input:
    /// two renders of the same data differ only in the line derived from it.
    pub generated_at: DateTime<Local>,
}

impl RenderContext {
    /// Build a context from an invoice and a layout.
    pub fn new(invoice: InvoiceRecord, layout: &LayoutSpec) -> Self {
        Self::with_generated_at(invoice, layout, Local::now())
    }

    /// Like [`RenderContext::new`] but with an injected timestamp, keeping
    /// the rest of the pipeline byte-deterministic for tests and caching.
    pub fn with_generated_at(
        invoice: InvoiceRecord,
        layout: &LayoutSpec,
        generated_at: DateTime<Local>,
    ) -> Self {
        let mut columns = layout.columns.clone();
        // Stable: equal orders keep their input position.
        columns.sort_by_key(|c| c.order);

        Self {
            invoice,
            columns,
            layout: layout.clone(),
            generated_at,
        }
    }

    /// "Generated on" display text.
    pub fn generated_on(&self) -> String {
        self.generated_at.format("%Y-%m-%d %H:%M").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout_spec::ColumnSpec;

    fn col(field: &str, order: i64) -> ColumnSpec {
        ColumnSpec {
            field: field.into(),
            label: field.to_uppercase(),
            order,
        }
    }

    #[test]
    fn columns_sort_ascending_by_order() {
        let layout = LayoutSpec {
            columns: vec![col("a", 3), col("b", 1), col("c", 2)],
            ..Default::default()
        };
        let ctx = RenderContext::new(InvoiceRecord::default(), &layout);
        let fields: Vec<&str> = ctx.columns.iter().map(|c| c.field.as_str()).collect();
        assert_eq!(fields, vec!["b", "c", "a"]);
    }

    #[test]
    fn duplicate_orders_preserve_input_order() {
        let layout = LayoutSpec {
            columns: vec![col("x", 1), col("y", 0), col("z", 1), col("w", 0)],
            ..Default::default()
        };
        let ctx = RenderContext::new(InvoiceRecord::default(), &layout);
        let fields: Vec<&str> = ctx.columns.iter().map(|c| c.field.as_str()).collect();
        assert_eq!(fields, vec!["y", "w", "x", "z"]);
    }

    #[test]
    fn missing_order_defaults_to_zero() {
        // A column parsed without an explicit order carries order = 0 and
        // sorts with the zeros in input position.
        let layout = LayoutSpec::from_json(&serde_json::json!({
            "columns": [
                { "field": "description", "order": 1 },
                { "field": "total_price" }
            ]
        }))
        .unwrap();
        let ctx = RenderContext::new(InvoiceRecord::default(), &layout);
        let fields: Vec<&str> = ctx.columns.iter().map(|c| c.field.as_str()).collect();
        assert_eq!(fields, vec!["total_price", "description"]);
    }
}
