//! PDF renderer – takes a [`DocumentLayout`] and produces PDF bytes using
//! `printpdf` (v0.8 ops-based API).

use std::collections::{HashMap, HashSet};

use base64::{engine::general_purpose::STANDARD as BASE64_STD, Engine as _};
use printpdf::*;

use crate::error::RenderError;
use crate::fonts::FontFamily;
use crate::page::{DocumentLayout, LayoutBox};

/// A printpdf XObject together with the pixel dimensions of the source image.
struct ImageResource {
    xobj_id: XObjectId,
    px_width: u32,
    px_height: u32,
}

/// Render a document layout into PDF bytes.
///
/// Images whose `src` is not a base64 data URI, or whose bytes cannot be
/// decoded, are skipped with a `log::warn` – the artifact still renders.
pub fn render_document(layout: &DocumentLayout) -> Result<Vec<u8>, RenderError> {
    let page_w = Mm(layout.page_width_pt * 0.352778); // pt → mm
    let page_h = Mm(layout.page_height_pt * 0.352778);

    let mut doc = PdfDocument::new(&layout.title);

    // ── Pre-register all images ───────────────────────────────────────────
    let mut all_srcs: HashSet<&str> = HashSet::new();
    for page in &layout.pages {
        for lbox in &page.boxes {
            collect_image_srcs(lbox, &mut all_srcs);
        }
    }

    let mut images: HashMap<String, ImageResource> = HashMap::new();
    let mut warnings: Vec<PdfWarnMsg> = Vec::new();

    for src in &all_srcs {
        let bytes = match parse_data_uri(src) {
            Ok(b) => b,
            Err(e) => {
                log::warn!("skipping image: {e}");
                continue;
            }
        };
        let decoded = match ::image::load_from_memory(&bytes) {
            Ok(img) => img,
            Err(e) => {
                log::warn!("skipping image, decode error: {e}");
                continue;
            }
        };
        let raw = match RawImage::decode_from_bytes(&bytes, &mut warnings) {
            Ok(r) => r,
            Err(e) => {
                log::warn!("skipping image, PDF encode error: {e}");
                continue;
            }
        };
        let xobj_id = doc.add_image(&raw);
        images.insert(
            src.to_string(),
            ImageResource {
                xobj_id,
                px_width: decoded.width(),
                px_height: decoded.height(),
            },
        );
    }

    // ── Render pages ──────────────────────────────────────────────────────
    let mut pages = Vec::new();
    for page in &layout.pages {
        let mut ops = Vec::new();
        for lbox in &page.boxes {
            render_box(&mut ops, lbox, layout.page_height_pt, &images);
        }
        pages.push(PdfPage::new(page_w, page_h, ops));
    }
    if pages.is_empty() {
        pages.push(PdfPage::new(page_w, page_h, Vec::new()));
    }

    doc.with_pages(pages);
    Ok(doc.save(&PdfSaveOptions::default(), &mut Vec::new()))
}

/// Map a resolved family + weight + style to a builtin PDF font.
fn builtin_font(family: FontFamily, bold: bool, italic: bool) -> BuiltinFont {
    match (family, bold, italic) {
        (FontFamily::Helvetica, false, false) => BuiltinFont::Helvetica,
        (FontFamily::Helvetica, true, false) => BuiltinFont::HelveticaBold,
        (FontFamily::Helvetica, false, true) => BuiltinFont::HelveticaOblique,
        (FontFamily::Helvetica, true, true) => BuiltinFont::HelveticaBoldOblique,
        (FontFamily::Times, false, false) => BuiltinFont::TimesRoman,
        (FontFamily::Times, true, false) => BuiltinFont::TimesBold,
        (FontFamily::Times, false, true) => BuiltinFont::TimesItalic,
        (FontFamily::Times, true, true) => BuiltinFont::TimesBoldItalic,
        (FontFamily::Courier, false, false) => BuiltinFont::Courier,
        (FontFamily::Courier, true, false) => BuiltinFont::CourierBold,
        (FontFamily::Courier, false, true) => BuiltinFont::CourierOblique,
        (FontFamily::Courier, true, true) => BuiltinFont::CourierBoldOblique,
    }
}

/// Convert a UTF-8 string to raw Windows-1252 bytes wrapped in a String so
/// printpdf writes the bytes unchanged into the PDF stream (builtin fonts
/// use WinAnsiEncoding, one byte per glyph).
fn to_winlatin(s: &str) -> String {
    let bytes: Vec<u8> = s
        .chars()
        .map(|c| match c {
            '\u{20AC}' => 0x80, // euro
            '\u{2026}' => 0x85, // ellipsis
            '\u{2018}' => 0x91, // left single quote
            '\u{2019}' => 0x92, // right single quote
            '\u{201C}' => 0x93, // left double quote
            '\u{201D}' => 0x94, // right double quote
            '\u{2022}' => 0x95, // bullet
            '\u{2013}' => 0x96, // en-dash
            '\u{2014}' => 0x97, // em-dash
            '\u{00A0}' => 0x20, // non-breaking space -> space
            c if (c as u32) < 256 => c as u8,
            _ => b'?',
        })
        .collect();
    // SAFETY: intentionally non-UTF-8 for the 0x80-0x9F range; printpdf
    // passes these bytes straight through, decoded by WinAnsiEncoding.
    #[allow(unsafe_code)]
    unsafe {
        String::from_utf8_unchecked(bytes)
    }
}

/// Parse a `data:<mime>;base64,<data>` URI into raw bytes.
fn parse_data_uri(src: &str) -> Result<Vec<u8>, String> {
    if !src.starts_with("data:") {
        let preview = if src.len() > 80 { &src[..80] } else { src };
        return Err(format!(
            "image src must be a base64 data URI, got: {preview:?}"
        ));
    }
    let rest = &src["data:".len()..];
    let comma = rest
        .find(',')
        .ok_or_else(|| "invalid data URI: missing `,` separator".to_string())?;
    if !rest[..comma].contains(";base64") {
        return Err("only base64-encoded data URIs are supported".to_string());
    }
    BASE64_STD
        .decode(rest[comma + 1..].trim())
        .map_err(|e| format!("base64 decode error: {e}"))
}

fn collect_image_srcs<'a>(lbox: &'a LayoutBox, srcs: &mut HashSet<&'a str>) {
    if let Some(img) = &lbox.image {
        srcs.insert(img.src.as_str());
    }
    for child in &lbox.children {
        collect_image_srcs(child, srcs);
    }
}

fn rgb(color: [f32; 4]) -> Color {
    Color::Rgb(Rgb {
        r: color[0],
        g: color[1],
        b: color[2],
        icc_profile: None,
    })
}

/// Recursively render a layout box and its children into PDF ops.
fn render_box(
    ops: &mut Vec<Op>,
    lbox: &LayoutBox,
    page_height: f32,
    images: &HashMap<String, ImageResource>,
) {
    // PDF origin is bottom-left; layout origin is top-left.
    let pdf_y = page_height - lbox.y;

    if let Some(bg) = &lbox.background_color {
        ops.push(Op::SetFillColor { col: rgb(*bg) });
        let (x1, y1) = (lbox.x, pdf_y - lbox.height);
        let (x2, y2) = (lbox.x + lbox.width, pdf_y);
        ops.push(Op::DrawPolygon {
            polygon: Polygon {
                rings: vec![PolygonRing {
                    points: vec![
                        corner(x1, y1),
                        corner(x2, y1),
                        corner(x2, y2),
                        corner(x1, y2),
                    ],
                }],
                mode: PaintMode::Fill,
                winding_order: WindingOrder::NonZero,
            },
        });
    }

    if lbox.has_visible_border() {
        let (x1, y1) = (lbox.x, pdf_y - lbox.height);
        let (x2, y2) = (lbox.x + lbox.width, pdf_y);
        // Edge order matches the layout model: top, right, bottom, left.
        let segments = [
            ((x1, y2), (x2, y2)),
            ((x2, y2), (x2, y1)),
            ((x1, y1), (x2, y1)),
            ((x1, y2), (x1, y1)),
        ];
        for (edge, (from, to)) in lbox.borders.iter().zip(segments) {
            let Some(edge) = edge else { continue };
            ops.push(Op::SetOutlineColor {
                col: rgb(edge.color),
            });
            ops.push(Op::SetOutlineThickness {
                pt: Pt(edge.width),
            });
            ops.push(Op::DrawLine {
                line: Line {
                    points: vec![corner(from.0, from.1), corner(to.0, to.1)],
                    is_closed: false,
                },
            });
        }
    }

    if let Some(text) = &lbox.text {
        let font = builtin_font(text.family, text.bold, text.italic);

        for tline in &text.lines {
            if tline.text.is_empty() {
                continue;
            }
            let text_x = lbox.x + tline.x_offset;
            // Baseline ≈ top of line + ascender (approx 0.75 × font size).
            let ascender = text.font_size * 0.75;
            let text_y = pdf_y - tline.y_offset - ascender;

            ops.push(Op::StartTextSection);
            ops.push(Op::SetTextCursor {
                pos: Point {
                    x: Pt(text_x),
                    y: Pt(text_y),
                },
            });
            ops.push(Op::SetFontSizeBuiltinFont {
                size: Pt(text.font_size),
                font,
            });
            ops.push(Op::SetLineHeight {
                lh: Pt(text.line_height),
            });
            ops.push(Op::SetFillColor {
                col: rgb(text.color),
            });
            ops.push(Op::WriteTextBuiltinFont {
                items: vec![TextItem::Text(to_winlatin(&tline.text))],
                font,
            });
            ops.push(Op::EndTextSection);

            if text.underline {
                let underline_y = text_y - text.font_size * 0.1;
                ops.push(Op::SetOutlineThickness { pt: Pt(0.5) });
                ops.push(Op::SetOutlineColor {
                    col: rgb(text.color),
                });
                ops.push(Op::DrawLine {
                    line: Line {
                        points: vec![
                            corner(text_x, underline_y),
                            corner(text_x + tline.width, underline_y),
                        ],
                        is_closed: false,
                    },
                });
            }
        }

        // List bullet/number in the gutter left of the box.
        if let Some(marker) = &text.list_marker {
            let marker_y = pdf_y - text.font_size * 0.75;
            ops.push(Op::StartTextSection);
            ops.push(Op::SetTextCursor {
                pos: Point {
                    x: Pt(lbox.x - 14.0),
                    y: Pt(marker_y),
                },
            });
            ops.push(Op::SetFontSizeBuiltinFont {
                size: Pt(text.font_size),
                font,
            });
            ops.push(Op::SetFillColor {
                col: rgb(text.color),
            });
            ops.push(Op::WriteTextBuiltinFont {
                items: vec![TextItem::Text(to_winlatin(marker))],
                font,
            });
            ops.push(Op::EndTextSection);
        }
    }

    if let Some(img) = &lbox.image {
        if let Some(res) = images.get(&img.src) {
            let img_bottom_y = page_height - lbox.y - img.height;
            // At dpi 72 printpdf renders 1 px = 1 pt.
            let scale_x = if res.px_width > 0 {
                img.width / res.px_width as f32
            } else {
                1.0
            };
            let scale_y = if res.px_height > 0 {
                img.height / res.px_height as f32
            } else {
                1.0
            };
            ops.push(Op::UseXobject {
                id: res.xobj_id.clone(),
                transform: XObjectTransform {
                    translate_x: Some(Pt(lbox.x)),
                    translate_y: Some(Pt(img_bottom_y)),
                    dpi: Some(72.0),
                    scale_x: Some(scale_x),
                    scale_y: Some(scale_y),
                    rotate: None,
                },
            });
        }
    }

    for child in &lbox.children {
        render_box(ops, child, page_height, images);
    }
}

fn corner(x: f32, y: f32) -> LinePoint {
    LinePoint {
        p: Point { x: Pt(x), y: Pt(y) },
        bezier: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::{PageLayout, TextContent, TextLine};

    fn empty_doc() -> DocumentLayout {
        DocumentLayout {
            title: "test".into(),
            page_width_pt: 595.28,
            page_height_pt: 841.89,
            pages: Vec::new(),
        }
    }

    #[test]
    fn render_empty_document() {
        let bytes = render_document(&empty_doc()).unwrap();
        assert!(bytes.len() > 100);
        assert_eq!(&bytes[0..5], b"%PDF-");
    }

    #[test]
    fn render_text_box() {
        let mut doc = empty_doc();
        let mut b = LayoutBox::new(56.0, 56.0, 200.0, 20.0);
        b.text = Some(TextContent {
            lines: vec![TextLine {
                text: "Total: 299.70".into(),
                x_offset: 0.0,
                y_offset: 0.0,
                width: 80.0,
            }],
            family: FontFamily::Helvetica,
            font_size: 10.0,
            bold: false,
            italic: false,
            color: [0.0, 0.0, 0.0, 1.0],
            line_height: 14.0,
            underline: false,
            list_marker: None,
        });
        doc.pages.push(PageLayout {
            page_index: 0,
            boxes: vec![b],
        });
        let bytes = render_document(&doc).unwrap();
        assert_eq!(&bytes[0..5], b"%PDF-");
    }

    #[test]
    fn data_uri_parsing() {
        assert!(parse_data_uri("http://example.com/x.png").is_err());
        assert!(parse_data_uri("data:image/png;base64,AAAA").is_ok());
        assert!(parse_data_uri("data:image/png,plain").is_err());
    }

    #[test]
    fn font_mapping_covers_families() {
        assert!(matches!(
            builtin_font(FontFamily::Times, true, false),
            BuiltinFont::TimesBold
        ));
        assert!(matches!(
            builtin_font(FontFamily::Courier, false, true),
            BuiltinFont::CourierOblique
        ));
    }
}
