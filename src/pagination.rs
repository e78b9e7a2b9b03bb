//! Pagination – splits positioned boxes into pages.
//!
//! Pagination is a consequence of content flow against the fixed page
//! geometry: boxes that overflow the content height start a new page, and
//! table rows split individually so a long line-item table continues across
//! pages. Text alignment offsets are resolved here, once per line, so the
//! PDF stage only replays coordinates.

use crate::css::{Display, TextAlign};
use crate::fonts::{FontFamily, FontManager};
use crate::layout::{BoxContent, PositionedBox};
use crate::page::{
    BorderEdge, DocumentLayout, ImageContent, LayoutBox, PageLayout, TextContent, TextLine,
};

/// Convert positioned boxes into a paginated document layout.
pub fn paginate(
    boxes: &[PositionedBox],
    title: &str,
    page_width: f32,
    page_height: f32,
    page_margin: f32,
    fonts: &FontManager,
) -> DocumentLayout {
    let mut doc = DocumentLayout {
        title: title.to_string(),
        page_width_pt: page_width,
        page_height_pt: page_height,
        pages: Vec::new(),
    };

    let content_height = page_height - 2.0 * page_margin;
    let flat = flatten_oversized(boxes, content_height);

    let mut current = PageLayout {
        page_index: 0,
        boxes: Vec::new(),
    };
    // Document-space y at which the current page begins; `pbox.y` values are
    // absolute document coordinates from the layout extractor.
    let mut page_start_y = 0.0f32;

    for pbox in &flat {
        let y_on_page = (pbox.y - page_start_y).max(0.0);
        let bottom = y_on_page + pbox.height;

        if bottom > content_height && !current.boxes.is_empty() {
            if pbox.style.display == Display::Table && !pbox.children.is_empty() {
                split_table_rows(
                    pbox,
                    &mut doc,
                    &mut current,
                    &mut page_start_y,
                    content_height,
                    page_margin,
                    fonts,
                );
                continue;
            }
            doc.pages.push(current);
            current = PageLayout {
                page_index: doc.pages.len(),
                boxes: Vec::new(),
            };
            page_start_y = pbox.y;
        }

        let y_on_page = (pbox.y - page_start_y).max(0.0);
        current
            .boxes
            .push(to_layout_box(pbox, page_margin + y_on_page - pbox.y, fonts));
    }

    if !current.boxes.is_empty() {
        doc.pages.push(current);
    }
    if doc.pages.is_empty() {
        doc.pages.push(PageLayout {
            page_index: 0,
            boxes: Vec::new(),
        });
    }
    doc
}

/// Expand pure-container boxes taller than one page so their children can
/// split individually (the template's root wrapper, long fragments).
fn flatten_oversized<'a>(
    boxes: &'a [PositionedBox],
    content_height: f32,
) -> Vec<&'a PositionedBox> {
    let mut result = Vec::new();
    for pbox in boxes {
        if pbox.height > content_height
            && matches!(pbox.content, BoxContent::None)
            && !pbox.children.is_empty()
        {
            result.extend(flatten_oversized(&pbox.children, content_height));
        } else {
            result.push(pbox);
        }
    }
    result
}

fn split_table_rows(
    table: &PositionedBox,
    doc: &mut DocumentLayout,
    current: &mut PageLayout,
    page_start_y: &mut f32,
    content_height: f32,
    page_margin: f32,
    fonts: &FontManager,
) {
    for row in &table.children {
        let y_on_page = (row.y - *page_start_y).max(0.0);
        if y_on_page + row.height > content_height && !current.boxes.is_empty() {
            doc.pages.push(std::mem::replace(
                current,
                PageLayout {
                    page_index: doc.pages.len(),
                    boxes: Vec::new(),
                },
            ));
            *page_start_y = row.y;
        }
        let y_on_page = (row.y - *page_start_y).max(0.0);
        current
            .boxes
            .push(to_layout_box(row, page_margin + y_on_page - row.y, fonts));
    }
}

/// Convert one positioned box (and its subtree) to page coordinates.
/// `y_shift` maps document-space y to page-space y for this subtree.
fn to_layout_box(pbox: &PositionedBox, y_shift: f32, fonts: &FontManager) -> LayoutBox {
    let mut lb = LayoutBox::new(pbox.x, pbox.y + y_shift, pbox.width, pbox.height);
    let style = &pbox.style;

    if !style.background_color.is_transparent() {
        let c = style.background_color;
        lb.background_color = Some([c.r, c.g, c.b, c.a]);
    }

    for (slot, edge) in lb.borders.iter_mut().zip([
        style.border_top,
        style.border_right,
        style.border_bottom,
        style.border_left,
    ]) {
        if edge.is_visible() {
            *slot = Some(BorderEdge {
                width: edge.width,
                color: [edge.color.r, edge.color.g, edge.color.b, edge.color.a],
            });
        }
    }

    match &pbox.content {
        BoxContent::Text { lines } => {
            lb.text = Some(text_content(lines, pbox, fonts, None));
        }
        BoxContent::Marker { text } => {
            lb.text = Some(text_content(&[], pbox, fonts, Some(text.clone())));
        }
        BoxContent::Image { src } => {
            lb.image = Some(ImageContent {
                src: src.clone(),
                width: pbox.width,
                height: pbox.height,
            });
        }
        BoxContent::None => {}
    }

    for child in &pbox.children {
        lb.children.push(to_layout_box(child, y_shift, fonts));
    }
    lb
}

fn text_content(
    lines: &[String],
    pbox: &PositionedBox,
    fonts: &FontManager,
    list_marker: Option<String>,
) -> TextContent {
    let style = &pbox.style;
    let bold = style.font_weight == crate::css::FontWeight::Bold;
    let italic = style.font_style == crate::css::FontStyle::Italic;
    let family = FontFamily::from_stack(&style.font_family);
    let size = style.font_size;
    let line_height = fonts.line_height_pt(size, style.line_height);
    let content_width = (pbox.width - style.padding_left - style.padding_right).max(0.0);

    let text_lines = lines
        .iter()
        .enumerate()
        .map(|(i, line)| {
            let width = fonts.text_width(line, size, bold, italic, family);
            let align_offset = match style.text_align {
                TextAlign::Left => 0.0,
                TextAlign::Center => ((content_width - width) / 2.0).max(0.0),
                TextAlign::Right => (content_width - width).max(0.0),
            };
            TextLine {
                text: line.to_string(),
                x_offset: style.padding_left + align_offset,
                y_offset: style.padding_top + i as f32 * line_height,
                width,
            }
        })
        .collect();

    TextContent {
        lines: text_lines,
        family,
        font_size: size,
        bold,
        italic,
        color: [style.color.r, style.color.g, style.color.b, style.color.a],
        line_height,
        underline: style.text_decoration == crate::css::TextDecoration::Underline,
        list_marker,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::css::{build_styled_tree, Stylesheet};
    use crate::dom::parse_html;
    use crate::layout::compute_layout;

    fn paginate_html(html: &str, css: &str) -> DocumentLayout {
        let sheet = Stylesheet::parse(css).unwrap();
        let dom = parse_html(html);
        let styled = build_styled_tree(&dom, &sheet);
        let fonts = FontManager::new();
        let boxes = compute_layout(
            &styled,
            sheet.page.content_width(),
            sheet.page.margin_pt,
            &fonts,
        );
        paginate(
            &boxes,
            "test",
            sheet.page.width_pt,
            sheet.page.height_pt,
            sheet.page.margin_pt,
            &fonts,
        )
    }

    #[test]
    fn short_content_fits_one_page() {
        let doc = paginate_html("<p>Short text</p>", "");
        assert_eq!(doc.pages.len(), 1);
    }

    #[test]
    fn long_content_flows_to_multiple_pages() {
        let mut html = String::new();
        for i in 0..120 {
            html.push_str(&format!("<p>Line item narrative {i} with some text</p>"));
        }
        let doc = paginate_html(&html, "");
        assert!(doc.pages.len() > 1, "expected >1 pages, got {}", doc.pages.len());
    }

    #[test]
    fn long_tables_split_by_row() {
        let mut html = String::from("<table>");
        html.push_str("<tr><th>Description</th><th>Total</th></tr>");
        for i in 0..200 {
            html.push_str(&format!("<tr><td>Item {i}</td><td>{i}.00</td></tr>"));
        }
        html.push_str("</table>");
        let doc = paginate_html(&html, "table { width: 100%; } td { padding: 8px; } th { padding: 10px; }");
        assert!(doc.pages.len() > 1, "table should span pages");
        // Every page got at least one row.
        assert!(doc.pages.iter().all(|p| !p.boxes.is_empty()));
    }

    #[test]
    fn right_alignment_offsets_lines() {
        let doc = paginate_html(
            r#"<div class="invoice-title">INVOICE</div>"#,
            ".invoice-title { text-align: right; font-size: 32pt; }",
        );
        let text = doc.pages[0].boxes[0].text.as_ref().unwrap();
        assert!(
            text.lines[0].x_offset > 100.0,
            "right-aligned line should be offset, got {}",
            text.lines[0].x_offset
        );
    }

    #[test]
    fn boxes_stay_within_page_bounds() {
        let doc = paginate_html("<p>alpha</p><p>beta</p>", "");
        for page in &doc.pages {
            for b in &page.boxes {
                assert!(b.x >= 0.0 && b.x < doc.page_width_pt);
                assert!(b.y >= 0.0 && b.y < doc.page_height_pt);
            }
        }
    }
}
