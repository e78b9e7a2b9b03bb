//! Layout specification – the user-authored document theme and column
//! configuration, stored as JSON and fetched per organization/template.
//!
//! Every field is optional; an empty mapping is a valid spec that renders
//! with defaults only. Defaulting is localized here: downstream components
//! read through the accessor methods and never see an absent value.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::LayoutError;
use crate::invoice::json_type_name;

/// Default primary (accent) color.
pub const DEFAULT_PRIMARY_COLOR: &str = "#1976d2";
/// Default secondary (muted) color.
pub const DEFAULT_SECONDARY_COLOR: &str = "#424242";
/// Default font stack for both heading and body roles.
pub const DEFAULT_FONT_STACK: &str = "Helvetica, Arial, sans-serif";

/// Semantic color roles.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ColorSpec {
    #[serde(default)]
    pub primary: Option<String>,
    #[serde(default)]
    pub secondary: Option<String>,
}

/// Font-family roles.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FontSpec {
    #[serde(default)]
    pub heading: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
}

/// An optional header/footer block carrying an HTML fragment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TextBlock {
    #[serde(default)]
    pub text: Option<String>,
}

impl TextBlock {
    /// The fragment, if present and non-empty. Absent text means the block
    /// is omitted from output entirely, not rendered empty.
    pub fn fragment(&self) -> Option<&str> {
        match self.text.as_deref() {
            Some(t) if !t.trim().is_empty() => Some(t),
            _ => None,
        }
    }
}

/// One line-item column: which field to show, under what label, in what
/// position. Order uniqueness is not enforced; ties are broken stably.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ColumnSpec {
    #[serde(default)]
    pub field: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub order: i64,
}

impl ColumnSpec {
    /// Column heading: the label, or the field name when no label was given.
    pub fn heading(&self) -> &str {
        if self.label.trim().is_empty() {
            &self.field
        } else {
            &self.label
        }
    }
}

/// The user-authored layout specification.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LayoutSpec {
    #[serde(default)]
    pub colors: ColorSpec,
    #[serde(default)]
    pub fonts: FontSpec,
    #[serde(default)]
    pub header: Option<TextBlock>,
    #[serde(default)]
    pub footer: Option<TextBlock>,
    #[serde(default)]
    pub columns: Vec<ColumnSpec>,
    #[serde(default)]
    pub logo_url: Option<String>,
}

impl LayoutSpec {
    /// Parse a layout spec from its stored JSON form.
    ///
    /// Missing fields are fine – `{}` is valid. Only structural mismatches
    /// fail: a non-object spec, or `columns` that is not an array of
    /// objects.
    pub fn from_json(value: &Value) -> Result<Self, LayoutError> {
        let obj = match value {
            // An absent layout is the all-defaults layout.
            Value::Null => return Ok(LayoutSpec::default()),
            Value::Object(map) => map,
            other => return Err(LayoutError::NotAnObject(json_type_name(other))),
        };

        if let Some(cols) = obj.get("columns") {
            if !cols.is_null() && !cols.is_array() {
                return Err(LayoutError::BadColumns(format!(
                    "got {}",
                    json_type_name(cols)
                )));
            }
            if let Some(entries) = cols.as_array() {
                if let Some(bad) = entries.iter().find(|e| !e.is_object()) {
                    return Err(LayoutError::BadColumns(format!(
                        "entry is {}, expected object",
                        json_type_name(bad)
                    )));
                }
            }
        }

        // Keys stored as explicit nulls behave like absent keys.
        let mut normalized = obj.clone();
        normalized.retain(|_, v| !v.is_null());

        serde_json::from_value(Value::Object(normalized)).map_err(|e| LayoutError::BadField {
            field: "layout",
            message: e.to_string(),
        })
    }

    /// Effective primary color.
    pub fn primary_color(&self) -> &str {
        non_blank(self.colors.primary.as_deref()).unwrap_or(DEFAULT_PRIMARY_COLOR)
    }

    /// Effective secondary color.
    pub fn secondary_color(&self) -> &str {
        non_blank(self.colors.secondary.as_deref()).unwrap_or(DEFAULT_SECONDARY_COLOR)
    }

    /// Effective heading font stack.
    pub fn heading_font(&self) -> &str {
        non_blank(self.fonts.heading.as_deref()).unwrap_or(DEFAULT_FONT_STACK)
    }

    /// Effective body font stack.
    pub fn body_font(&self) -> &str {
        non_blank(self.fonts.body.as_deref()).unwrap_or(DEFAULT_FONT_STACK)
    }

    /// Header fragment, if one should be rendered.
    pub fn header_fragment(&self) -> Option<&str> {
        self.header.as_ref().and_then(TextBlock::fragment)
    }

    /// Footer fragment, if one should be rendered.
    pub fn footer_fragment(&self) -> Option<&str> {
        self.footer.as_ref().and_then(TextBlock::fragment)
    }

    /// Logo reference, if one should be rendered.
    pub fn logo(&self) -> Option<&str> {
        non_blank(self.logo_url.as_deref())
    }
}

fn non_blank(s: Option<&str>) -> Option<&str> {
    match s {
        Some(v) if !v.trim().is_empty() => Some(v),
        _ => None,
    }
}
