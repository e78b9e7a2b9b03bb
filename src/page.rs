//! Page model – the frozen intermediate representation between layout
//! computation and PDF rendering. Encodes exactly what goes on each page,
//! with page-absolute coordinates in points.

use serde::{Deserialize, Serialize};

use crate::fonts::FontFamily;

/// A complete paginated document ready for rendering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentLayout {
    /// Document title embedded in the PDF metadata.
    pub title: String,
    /// Width of each page in PDF points (1 pt = 1/72 inch).
    pub page_width_pt: f32,
    /// Height of each page in PDF points.
    pub page_height_pt: f32,
    /// Ordered list of pages.
    pub pages: Vec<PageLayout>,
}

/// One page of content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageLayout {
    pub page_index: usize,
    pub boxes: Vec<LayoutBox>,
}

/// A positioned rectangle with optional content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutBox {
    /// Position relative to the page top-left, in points.
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,

    pub background_color: Option<[f32; 4]>,
    /// Visible border edges: top, right, bottom, left.
    pub borders: [Option<BorderEdge>; 4],

    pub text: Option<TextContent>,
    pub image: Option<ImageContent>,

    pub children: Vec<LayoutBox>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BorderEdge {
    pub width: f32,
    pub color: [f32; 4],
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextContent {
    /// Pre-wrapped lines, each with its alignment offset resolved.
    pub lines: Vec<TextLine>,
    pub family: FontFamily,
    pub font_size: f32,
    pub bold: bool,
    pub italic: bool,
    pub color: [f32; 4],
    pub line_height: f32,
    pub underline: bool,
    /// List bullet/number prefix (e.g. "\u{2022} " or "1. ").
    pub list_marker: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextLine {
    pub text: String,
    /// X offset within the layout box (alignment + padding).
    pub x_offset: f32,
    /// Y offset from the top of the box to the top of the line.
    pub y_offset: f32,
    /// Measured width in points.
    pub width: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageContent {
    pub src: String,
    pub width: f32,
    pub height: f32,
}

impl LayoutBox {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
            background_color: None,
            borders: [None; 4],
            text: None,
            image: None,
            children: Vec::new(),
        }
    }

    pub fn has_visible_border(&self) -> bool {
        self.borders.iter().any(|b| b.is_some())
    }
}

impl DocumentLayout {
    /// Serialise to JSON (debugging aid for the CLI).
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}
