//! Font resolution and text measurement.
//!
//! Layout needs text widths before the PDF stage runs. Loaded TTF/OTF faces
//! are measured through `ttf-parser` glyph advances; without loaded bytes a
//! per-family average-width heuristic keeps measurements close enough for
//! the PDF builtin fonts the renderer embeds.
//!
//! Theme fonts arrive as CSS stacks ("Helvetica, Arial, sans-serif"); the
//! first recognised family wins and maps onto one of the three builtin PDF
//! families.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// The builtin families the PDF renderer can embed without font files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FontFamily {
    #[default]
    Helvetica,
    Times,
    Courier,
}

impl FontFamily {
    /// Resolve a CSS font-family stack to a builtin family. Walks the stack
    /// left to right and takes the first name it recognises; an entirely
    /// unknown stack falls back to Helvetica.
    pub fn from_stack(stack: &str) -> Self {
        for name in stack.split(',') {
            let name = name.trim().trim_matches('"').trim_matches('\'').to_ascii_lowercase();
            match name.as_str() {
                "helvetica" | "arial" | "sans-serif" | "verdana" | "tahoma" => {
                    return FontFamily::Helvetica;
                }
                "times" | "times new roman" | "georgia" | "serif" | "garamond" => {
                    return FontFamily::Times;
                }
                "courier" | "courier new" | "monospace" | "consolas" => {
                    return FontFamily::Courier;
                }
                _ => continue,
            }
        }
        FontFamily::Helvetica
    }

    /// Average glyph width as a fraction of the font size, used when no real
    /// face is loaded.
    fn heuristic_advance(&self, bold: bool) -> f32 {
        let base = match self {
            FontFamily::Helvetica => 0.50,
            FontFamily::Times => 0.48,
            FontFamily::Courier => 0.60,
        };
        if bold {
            base * 1.08
        } else {
            base
        }
    }
}

#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub struct FontKey {
    pub family: FontFamily,
    pub bold: bool,
    pub italic: bool,
}

/// A loaded font face with metrics.
#[derive(Clone)]
pub struct FontData {
    /// Raw bytes, kept alive for ttf-parser's zero-copy API.
    pub bytes: Vec<u8>,
    pub units_per_em: f32,
    pub ascender: f32,
    pub descender: f32,
}

/// Holds loaded faces and answers measurement queries.
pub struct FontManager {
    faces: HashMap<FontKey, FontData>,
}

impl FontManager {
    pub fn new() -> Self {
        Self {
            faces: HashMap::new(),
        }
    }

    /// Load a TTF/OTF face for a family/weight/style slot.
    pub fn load_font(
        &mut self,
        family: FontFamily,
        bold: bool,
        italic: bool,
        bytes: Vec<u8>,
    ) -> Result<(), String> {
        let face = ttf_parser::Face::parse(&bytes, 0)
            .map_err(|e| format!("failed to parse font: {e}"))?;
        let data = FontData {
            units_per_em: face.units_per_em() as f32,
            ascender: face.ascender() as f32,
            descender: face.descender() as f32,
            bytes,
        };
        self.faces.insert(
            FontKey {
                family,
                bold,
                italic,
            },
            data,
        );
        Ok(())
    }

    /// Measure the width of a string at a given size in points.
    pub fn text_width(
        &self,
        text: &str,
        size: f32,
        bold: bool,
        italic: bool,
        family: FontFamily,
    ) -> f32 {
        let key = FontKey {
            family,
            bold,
            italic,
        };
        if let Some(data) = self.faces.get(&key) {
            if let Ok(face) = ttf_parser::Face::parse(&data.bytes, 0) {
                let scale = size / data.units_per_em;
                return text
                    .chars()
                    .map(|ch| match face.glyph_index(ch) {
                        Some(gid) => face.glyph_hor_advance(gid).unwrap_or(0) as f32 * scale,
                        None => size * 0.5,
                    })
                    .sum();
            }
        }
        text.chars().count() as f32 * size * family.heuristic_advance(bold)
    }

    /// Line height in points.
    pub fn line_height_pt(&self, size: f32, factor: f32) -> f32 {
        size * factor
    }

    /// Baseline offset from the top of the line, in points.
    pub fn ascender_pt(&self, size: f32, key: &FontKey) -> f32 {
        match self.faces.get(key) {
            Some(data) if data.units_per_em > 0.0 => data.ascender * size / data.units_per_em,
            _ => size * 0.75,
        }
    }

    /// Raw bytes for embedding, when a real face is loaded.
    pub fn font_bytes(&self, key: &FontKey) -> Option<&[u8]> {
        self.faces.get(key).map(|d| d.bytes.as_slice())
    }
}

impl Default for FontManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Word-wrap text to fit `max_width` points. Newlines are respected; words
/// longer than the line stand alone rather than being broken mid-word.
pub fn wrap_text(
    text: &str,
    size: f32,
    bold: bool,
    italic: bool,
    family: FontFamily,
    max_width: f32,
    fonts: &FontManager,
) -> Vec<String> {
    if max_width <= 0.0 || text.is_empty() {
        return vec![text.to_string()];
    }

    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        let words: Vec<&str> = paragraph.split_whitespace().collect();
        if words.is_empty() {
            lines.push(String::new());
            continue;
        }
        let mut current = String::new();
        for word in words {
            let candidate = if current.is_empty() {
                word.to_string()
            } else {
                format!("{current} {word}")
            };
            if fonts.text_width(&candidate, size, bold, italic, family) > max_width
                && !current.is_empty()
            {
                lines.push(current);
                current = word.to_string();
            } else {
                current = candidate;
            }
        }
        if !current.is_empty() {
            lines.push(current);
        }
    }

    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stack_resolution_takes_first_known_family() {
        assert_eq!(
            FontFamily::from_stack("Helvetica, Arial, sans-serif"),
            FontFamily::Helvetica
        );
        assert_eq!(
            FontFamily::from_stack("\"Times New Roman\", serif"),
            FontFamily::Times
        );
        assert_eq!(FontFamily::from_stack("Comic Sans, Courier"), FontFamily::Courier);
        assert_eq!(FontFamily::from_stack("Wingdings"), FontFamily::Helvetica);
    }

    #[test]
    fn heuristic_width_scales_with_size() {
        let fonts = FontManager::new();
        let w10 = fonts.text_width("Hello", 10.0, false, false, FontFamily::Helvetica);
        let w20 = fonts.text_width("Hello", 20.0, false, false, FontFamily::Helvetica);
        assert!((w20 - 2.0 * w10).abs() < 0.001);
        // 5 chars × 10pt × 0.5
        assert!((w10 - 25.0).abs() < 0.001);
    }

    #[test]
    fn wrapping_respects_width() {
        let fonts = FontManager::new();
        let lines = wrap_text(
            "alpha beta gamma delta",
            10.0,
            false,
            false,
            FontFamily::Helvetica,
            40.0,
            &fonts,
        );
        assert!(lines.len() >= 2, "expected wrapping, got {lines:?}");
    }
}
