//! Invoice data model – an immutable snapshot of one invoice's billing
//! facts, constructed once per render request and read-only thereafter.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ContextError;

/// One billed line on the invoice.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LineItem {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub barcode: String,
    #[serde(default)]
    pub serial_number: String,
    #[serde(default)]
    pub rental_start_date: String,
    #[serde(default)]
    pub rental_days: i64,
    #[serde(default)]
    pub quantity: i64,
    #[serde(default)]
    pub unit_price: f64,
    #[serde(default)]
    pub total_price: f64,
}

/// The closed set of line-item fields a layout column may bind to.
///
/// Column binding is late and by name: a `ColumnSpec.field` string resolves
/// here at render time. Anything outside this set renders as an empty cell
/// rather than failing the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemField {
    Description,
    Barcode,
    SerialNumber,
    RentalStartDate,
    RentalDays,
    Quantity,
    UnitPrice,
    TotalPrice,
}

impl ItemField {
    /// Resolve a column field name. Unknown names yield `None`.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "description" => Some(ItemField::Description),
            "barcode" => Some(ItemField::Barcode),
            "serial_number" => Some(ItemField::SerialNumber),
            "rental_start_date" => Some(ItemField::RentalStartDate),
            "rental_days" => Some(ItemField::RentalDays),
            "quantity" => Some(ItemField::Quantity),
            "unit_price" => Some(ItemField::UnitPrice),
            "total_price" => Some(ItemField::TotalPrice),
            _ => None,
        }
    }
}

impl LineItem {
    /// Lenient parse: any entry shape is accepted, wrong-typed fields fall
    /// back to defaults (a malformed row must not sink the whole invoice).
    pub fn from_json(value: &Value) -> Self {
        let Value::Object(obj) = value else {
            return Self::default();
        };
        Self {
            description: text_field(obj, "description"),
            barcode: text_field(obj, "barcode"),
            serial_number: text_field(obj, "serial_number"),
            rental_start_date: text_field(obj, "rental_start_date"),
            rental_days: integer_field(obj, "rental_days"),
            quantity: integer_field(obj, "quantity"),
            unit_price: number_field(obj, "unit_price"),
            total_price: number_field(obj, "total_price"),
        }
    }

    /// Display text for a bound column field.
    pub fn field_text(&self, field: ItemField) -> String {
        match field {
            ItemField::Description => self.description.clone(),
            ItemField::Barcode => self.barcode.clone(),
            ItemField::SerialNumber => self.serial_number.clone(),
            ItemField::RentalStartDate => self.rental_start_date.clone(),
            ItemField::RentalDays => self.rental_days.to_string(),
            ItemField::Quantity => self.quantity.to_string(),
            ItemField::UnitPrice => format_amount(self.unit_price),
            ItemField::TotalPrice => format_amount(self.total_price),
        }
    }

    /// Display text for a column field name; empty for unknown fields.
    pub fn lookup(&self, field_name: &str) -> String {
        match ItemField::parse(field_name) {
            Some(f) => self.field_text(f),
            None => String::new(),
        }
    }
}

/// Immutable snapshot of one invoice's billing facts.
///
/// Every field tolerates absence on parse (missing → empty/zero); only a
/// `null` record itself is an error, surfaced as [`ContextError`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InvoiceRecord {
    #[serde(default)]
    pub invoice_number: String,
    #[serde(default)]
    pub invoice_date: String,
    #[serde(default)]
    pub invoice_period_start: String,
    #[serde(default)]
    pub invoice_period_end: String,

    #[serde(default)]
    pub customer_id: String,
    #[serde(default)]
    pub customer_name: String,
    #[serde(default)]
    pub customer_address: String,
    #[serde(default)]
    pub customer_email: String,

    #[serde(default)]
    pub line_items: Vec<LineItem>,

    #[serde(default)]
    pub subtotal: f64,
    #[serde(default)]
    pub tax_rate: f64,
    #[serde(default)]
    pub tax_amount: f64,
    #[serde(default)]
    pub total_amount: f64,

    #[serde(default)]
    pub organization_name: String,
    #[serde(default)]
    pub organization_address: String,
    #[serde(default)]
    pub organization_phone: String,
    #[serde(default)]
    pub organization_email: String,
    #[serde(default)]
    pub organization_logo_url: Option<String>,

    #[serde(default)]
    pub payment_terms: Option<String>,
    #[serde(default)]
    pub invoice_notes: Option<String>,
    #[serde(default)]
    pub invoice_footer: Option<String>,
}

impl InvoiceRecord {
    /// Parse an invoice record from a JSON value.
    ///
    /// `null` is a [`ContextError::MissingInvoice`] and a non-object is
    /// [`ContextError::NotAnObject`]; `line_items` must be an array when
    /// present. Every other field degrades to its default on any type
    /// mismatch rather than failing the render.
    pub fn from_json(value: &Value) -> Result<Self, ContextError> {
        let obj = match value {
            Value::Null => return Err(ContextError::MissingInvoice),
            Value::Object(map) => map,
            other => return Err(ContextError::NotAnObject(json_type_name(other))),
        };

        let line_items = match obj.get("line_items") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(entries)) => entries.iter().map(LineItem::from_json).collect(),
            Some(other) => {
                return Err(ContextError::BadLineItems(format!(
                    "got {}",
                    json_type_name(other)
                )))
            }
        };

        Ok(Self {
            invoice_number: text_field(obj, "invoice_number"),
            invoice_date: text_field(obj, "invoice_date"),
            invoice_period_start: text_field(obj, "invoice_period_start"),
            invoice_period_end: text_field(obj, "invoice_period_end"),
            customer_id: text_field(obj, "customer_id"),
            customer_name: text_field(obj, "customer_name"),
            customer_address: text_field(obj, "customer_address"),
            customer_email: text_field(obj, "customer_email"),
            line_items,
            subtotal: number_field(obj, "subtotal"),
            tax_rate: number_field(obj, "tax_rate"),
            tax_amount: number_field(obj, "tax_amount"),
            total_amount: number_field(obj, "total_amount"),
            organization_name: text_field(obj, "organization_name"),
            organization_address: text_field(obj, "organization_address"),
            organization_phone: text_field(obj, "organization_phone"),
            organization_email: text_field(obj, "organization_email"),
            organization_logo_url: optional_text_field(obj, "organization_logo_url"),
            payment_terms: optional_text_field(obj, "payment_terms"),
            invoice_notes: optional_text_field(obj, "invoice_notes"),
            invoice_footer: optional_text_field(obj, "invoice_footer"),
        })
    }

    /// Payment terms, defaulting to "Net 30" when absent or blank.
    pub fn payment_terms_or_default(&self) -> &str {
        match self.payment_terms.as_deref() {
            Some(t) if !t.trim().is_empty() => t,
            _ => "Net 30",
        }
    }
}

/// Two-decimal amount formatting used everywhere an amount is displayed.
pub fn format_amount(amount: f64) -> String {
    format!("{:.2}", amount)
}

type JsonMap = serde_json::Map<String, Value>;

fn text_field(obj: &JsonMap, key: &str) -> String {
    match obj.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

fn optional_text_field(obj: &JsonMap, key: &str) -> Option<String> {
    match obj.get(key) {
        Some(Value::String(s)) => Some(s.clone()),
        _ => None,
    }
}

fn number_field(obj: &JsonMap, key: &str) -> f64 {
    match obj.get(key) {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    }
}

fn integer_field(obj: &JsonMap, key: &str) -> i64 {
    match obj.get(key) {
        Some(Value::Number(n)) => n.as_i64().unwrap_or_else(|| {
            n.as_f64().map(|f| f as i64).unwrap_or(0)
        }),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0),
        _ => 0,
    }
}

pub(crate) fn json_type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn null_invoice_is_missing() {
        let err = InvoiceRecord::from_json(&Value::Null).unwrap_err();
        assert!(matches!(err, ContextError::MissingInvoice));
    }

    #[test]
    fn non_object_invoice_is_rejected() {
        let err = InvoiceRecord::from_json(&json!([1, 2, 3])).unwrap_err();
        assert!(matches!(err, ContextError::NotAnObject("array")));
    }

    #[test]
    fn bad_line_items_shape_is_rejected() {
        let err = InvoiceRecord::from_json(&json!({ "line_items": "nope" })).unwrap_err();
        assert!(matches!(err, ContextError::BadLineItems(_)));
    }

    #[test]
    fn missing_fields_default() {
        let record = InvoiceRecord::from_json(&json!({})).unwrap();
        assert_eq!(record.invoice_number, "");
        assert!(record.line_items.is_empty());
        assert_eq!(record.total_amount, 0.0);
        assert_eq!(record.payment_terms_or_default(), "Net 30");
    }

    #[test]
    fn wrong_typed_fields_degrade_to_defaults() {
        let record = InvoiceRecord::from_json(&json!({
            "invoice_number": 42,
            "customer_name": { "unexpected": true },
            "subtotal": "270.00",
            "total_amount": [],
            "line_items": [
                { "description": "Cylinder", "quantity": "3", "unit_price": 5 },
                "not-an-object"
            ]
        }))
        .unwrap();
        assert_eq!(record.invoice_number, "42");
        assert_eq!(record.customer_name, "");
        assert_eq!(record.subtotal, 270.0);
        assert_eq!(record.total_amount, 0.0);
        assert_eq!(record.line_items.len(), 2);
        assert_eq!(record.line_items[0].quantity, 3);
        assert_eq!(record.line_items[0].unit_price, 5.0);
        assert_eq!(record.line_items[1].description, "");
    }

    #[test]
    fn unknown_field_renders_empty() {
        let item = LineItem {
            description: "Oxygen Cylinder 40L".into(),
            ..Default::default()
        };
        assert_eq!(item.lookup("description"), "Oxygen Cylinder 40L");
        assert_eq!(item.lookup("no_such_field"), "");
    }

    #[test]
    fn amounts_render_two_decimals() {
        let item = LineItem {
            unit_price: 5.0,
            total_price: 150.0,
            ..Default::default()
        };
        assert_eq!(item.lookup("unit_price"), "5.00");
        assert_eq!(item.lookup("total_price"), "150.00");
        assert_eq!(format_amount(299.7), "299.70");
    }
}
