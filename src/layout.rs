//! Layout engine – builds a Taffy tree from the styled DOM and extracts a
//! flat list of positioned boxes in document coordinates.
//!
//! Tables use the HTML table model mapped onto flex (rows are flex rows,
//! cells equal-width flex children); blocks whose children are all inline
//! are merged into a single wrapped text leaf so fragments flow naturally.

use std::collections::HashMap;

use base64::{engine::general_purpose::STANDARD as BASE64_STD, Engine as _};
use taffy::prelude::*;

use crate::css::{self, ComputedStyle, Display as CssDisplay, FontStyle, FontWeight, StyledNode};
use crate::dom::Tag;
use crate::fonts::{wrap_text, FontFamily, FontManager};

// ---------------------------------------------------------------------------
// Positioned boxes (pre-pagination)
// ---------------------------------------------------------------------------

/// A positioned box in document coordinates, before page splitting.
#[derive(Debug, Clone)]
pub struct PositionedBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub style: ComputedStyle,
    pub content: BoxContent,
    pub children: Vec<PositionedBox>,
}

#[derive(Debug, Clone)]
pub enum BoxContent {
    None,
    Text { lines: Vec<String> },
    Image { src: String },
    /// List bullet/number for an `<li>` container.
    Marker { text: String },
}

// ---------------------------------------------------------------------------
// Tree construction
// ---------------------------------------------------------------------------

struct LayoutBuilder<'a> {
    taffy: TaffyTree<()>,
    fonts: &'a FontManager,
    node_styles: HashMap<NodeId, ComputedStyle>,
    node_content: HashMap<NodeId, BoxContent>,
    available_width: f32,
}

impl<'a> LayoutBuilder<'a> {
    fn new(fonts: &'a FontManager, available_width: f32) -> Self {
        Self {
            taffy: TaffyTree::new(),
            fonts,
            node_styles: HashMap::new(),
            node_content: HashMap::new(),
            available_width,
        }
    }

    /// Concatenated text of an inline subtree.
    fn collect_inline_text(node: &StyledNode) -> String {
        match node {
            StyledNode::Text { text, .. } => text.clone(),
            StyledNode::Element { tag, children, .. } => {
                if *tag == Tag::Br {
                    "\n".to_string()
                } else {
                    children.iter().map(Self::collect_inline_text).collect()
                }
            }
        }
    }

    /// True when every child is a text node or an inline element.
    fn all_inline(children: &[StyledNode]) -> bool {
        children.iter().all(|c| match c {
            StyledNode::Text { .. } => true,
            StyledNode::Element {
                style,
                children: grandchildren,
                ..
            } => style.display == CssDisplay::Inline && Self::all_inline(grandchildren),
        })
    }

    /// Blocks whose children are all inline collapse into one wrapped text
    /// leaf. Table parts and list items keep their container structure.
    fn merges_to_text(tag: &Tag, style: &ComputedStyle, children: &[StyledNode]) -> bool {
        !children.is_empty()
            && !tag.is_table_part()
            && matches!(
                style.display,
                CssDisplay::Block | CssDisplay::Inline | CssDisplay::InlineBlock
            )
            && *tag != Tag::Img
            && Self::all_inline(children)
    }

    fn build_node(&mut self, node: &StyledNode, parent_width: f32) -> NodeId {
        match node {
            StyledNode::Text { text, style } => self.build_text_leaf(text, style, parent_width),
            StyledNode::Element {
                tag,
                style,
                children,
                attrs,
            } => self.build_element(tag, style, children, attrs, parent_width),
        }
    }

    /// Build a wrapped text leaf. The leaf box carries the block's spacing
    /// and box styling; `parent_width` bounds the wrap width.
    fn build_text_leaf(&mut self, text: &str, style: &ComputedStyle, parent_width: f32) -> NodeId {
        let bold = style.font_weight == FontWeight::Bold;
        let italic = style.font_style == FontStyle::Italic;
        let family = FontFamily::from_stack(&style.font_family);
        let size = style.font_size;
        let line_height = self.fonts.line_height_pt(size, style.line_height);

        // Explicit width wins; otherwise aligned blocks claim the full
        // parent width so alignment offsets have room, and left-aligned
        // text shrinks to its measured width.
        let box_width = match style.width {
            css::Dimension::Pt(w) => Some(w),
            css::Dimension::Percent(p) => Some(parent_width * p / 100.0),
            css::Dimension::Auto => {
                if style.text_align != css::TextAlign::Left {
                    Some(parent_width.max(1.0))
                } else {
                    None
                }
            }
        };

        let content_bound = box_width
            .unwrap_or(if parent_width > 0.0 {
                parent_width
            } else {
                self.available_width
            })
            - style.padding_left
            - style.padding_right;

        let lines = wrap_text(
            text.trim(),
            size,
            bold,
            italic,
            family,
            content_bound.max(1.0),
            self.fonts,
        );

        let measured = lines
            .iter()
            .map(|l| self.fonts.text_width(l, size, bold, italic, family))
            .fold(0.0f32, f32::max);
        let width = box_width
            .unwrap_or(measured + style.padding_left + style.padding_right);
        let height = lines.len() as f32 * line_height
            + style.padding_top
            + style.padding_bottom;

        let taffy_style = Style {
            size: Size {
                width: Dimension::Length(width),
                height: Dimension::Length(height),
            },
            margin: Rect {
                top: LengthPercentageAuto::Length(style.margin_top),
                right: LengthPercentageAuto::Length(style.margin_right),
                bottom: LengthPercentageAuto::Length(style.margin_bottom),
                left: LengthPercentageAuto::Length(style.margin_left),
            },
            ..Default::default()
        };

        let node = self.taffy.new_leaf(taffy_style).unwrap();
        self.node_styles.insert(node, style.clone());
        self.node_content.insert(node, BoxContent::Text { lines });
        node
    }

    fn build_element(
        &mut self,
        tag: &Tag,
        style: &ComputedStyle,
        children: &[StyledNode],
        attrs: &HashMap<String, String>,
        parent_width: f32,
    ) -> NodeId {
        if Self::merges_to_text(tag, style, children) {
            let raw: String = children.iter().map(Self::collect_inline_text).collect();
            let combined = normalize_whitespace(&raw);
            if !combined.is_empty() {
                return self.build_text_leaf(&combined, style, parent_width);
            }
        }

        let my_width = match style.width {
            css::Dimension::Pt(w) => w,
            css::Dimension::Percent(p) => parent_width * p / 100.0,
            css::Dimension::Auto => parent_width,
        };
        let inner_width = my_width - style.padding_left - style.padding_right;

        // Estimate per-child width for row containers so text wraps to the
        // right column width at build time.
        let is_row = (style.display == CssDisplay::Flex
            && style.flex_direction == css::FlexDirection::Row)
            || style.display == CssDisplay::TableRow;
        let element_children = children
            .iter()
            .filter(|c| matches!(c, StyledNode::Element { .. }))
            .count()
            .max(1);
        let child_width = if is_row {
            let gaps = style.gap * element_children.saturating_sub(1) as f32;
            ((inner_width - gaps) / element_children as f32).max(1.0)
        } else {
            inner_width
        };

        let mut child_ids = Vec::new();
        let mut item_counter = 0u32;
        for child in children {
            let marker = match child {
                StyledNode::Element {
                    tag: child_tag, ..
                } if *child_tag == Tag::Li => {
                    item_counter += 1;
                    Some(if *tag == Tag::Ol {
                        format!("{item_counter}. ")
                    } else {
                        "\u{2022} ".to_string()
                    })
                }
                _ => None,
            };

            let child_id = self.build_node(child, child_width);
            if let Some(text) = marker {
                // List containers carry no text of their own, so the marker
                // slot is free.
                self.node_content.insert(child_id, BoxContent::Marker { text });
            }
            child_ids.push(child_id);
        }

        // Images resolve to concrete dimensions up front; Taffy would give
        // an auto-sized empty container 0×0.
        let resolved_style;
        let effective_style = if *tag == Tag::Img {
            let src = attrs.get("src").map(String::as_str).unwrap_or("");
            resolved_style = resolve_image_dimensions(src, style, parent_width);
            &resolved_style
        } else {
            style
        };

        let taffy_style = taffy_style_for(effective_style, tag);
        let node = self
            .taffy
            .new_with_children(taffy_style, &child_ids)
            .unwrap();
        self.node_styles.insert(node, effective_style.clone());

        if *tag == Tag::Img {
            let src = attrs.get("src").cloned().unwrap_or_default();
            self.node_content.insert(node, BoxContent::Image { src });
        }

        node
    }

    /// Extract positioned boxes after layout, accumulating absolute
    /// document coordinates.
    fn extract(&self, node: NodeId, offset_x: f32, offset_y: f32) -> PositionedBox {
        let layout = self.taffy.layout(node).unwrap();
        let style = self.node_styles.get(&node).cloned().unwrap_or_default();
        let content = self
            .node_content
            .get(&node)
            .cloned()
            .unwrap_or(BoxContent::None);

        let x = offset_x + layout.location.x;
        let y = offset_y + layout.location.y;

        let children = self
            .taffy
            .children(node)
            .unwrap_or_default()
            .iter()
            .map(|&child| self.extract(child, x, y))
            .collect();

        PositionedBox {
            x,
            y,
            width: layout.size.width,
            height: layout.size.height,
            style,
            content,
            children,
        }
    }
}

fn normalize_whitespace(raw: &str) -> String {
    // Collapse runs of spaces but keep explicit newlines from <br>.
    raw.lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

fn taffy_style_for(s: &ComputedStyle, tag: &Tag) -> Style {
    let mut ts = Style::default();

    let spacing = |ts: &mut Style| {
        ts.margin = Rect {
            top: LengthPercentageAuto::Length(s.margin_top),
            right: LengthPercentageAuto::Length(s.margin_right),
            bottom: LengthPercentageAuto::Length(s.margin_bottom),
            left: LengthPercentageAuto::Length(s.margin_left),
        };
        ts.padding = Rect {
            top: LengthPercentage::Length(s.padding_top),
            right: LengthPercentage::Length(s.padding_right),
            bottom: LengthPercentage::Length(s.padding_bottom),
            left: LengthPercentage::Length(s.padding_left),
        };
        ts.border = Rect {
            top: LengthPercentage::Length(s.border_top.width),
            right: LengthPercentage::Length(s.border_right.width),
            bottom: LengthPercentage::Length(s.border_bottom.width),
            left: LengthPercentage::Length(s.border_left.width),
        };
    };

    // HTML table model: flex regardless of computed display.
    match tag {
        Tag::Table => {
            ts.display = taffy::Display::Flex;
            ts.flex_direction = taffy::FlexDirection::Column;
            ts.size.width = dim_to_taffy(s.width);
            ts.size.height = dim_to_taffy(s.height);
            ts.min_size.width = taffy::Dimension::Length(0.0);
            spacing(&mut ts);
            return ts;
        }
        Tag::Tr => {
            ts.display = taffy::Display::Flex;
            ts.flex_direction = taffy::FlexDirection::Row;
            ts.align_items = Some(taffy::AlignItems::Stretch);
            ts.size.width = taffy::Dimension::Percent(1.0);
            ts.min_size.width = taffy::Dimension::Length(0.0);
            ts.margin = Rect {
                top: LengthPercentageAuto::Length(s.margin_top),
                right: LengthPercentageAuto::Length(s.margin_right),
                bottom: LengthPercentageAuto::Length(s.margin_bottom),
                left: LengthPercentageAuto::Length(s.margin_left),
            };
            return ts;
        }
        Tag::Td | Tag::Th => {
            ts.display = taffy::Display::Flex;
            ts.flex_direction = taffy::FlexDirection::Column;
            ts.flex_grow = 1.0;
            ts.flex_shrink = 1.0;
            ts.flex_basis = taffy::Dimension::Length(0.0); // equal columns
            ts.min_size.width = taffy::Dimension::Length(0.0);
            spacing(&mut ts);
            return ts;
        }
        _ => {}
    }

    match s.display {
        CssDisplay::Flex => {
            ts.display = taffy::Display::Flex;
            ts.flex_direction = match s.flex_direction {
                css::FlexDirection::Row => taffy::FlexDirection::Row,
                css::FlexDirection::Column => taffy::FlexDirection::Column,
            };
            ts.justify_content = Some(match s.justify_content {
                css::JustifyContent::Start => taffy::JustifyContent::Start,
                css::JustifyContent::End => taffy::JustifyContent::End,
                css::JustifyContent::Center => taffy::JustifyContent::Center,
                css::JustifyContent::SpaceBetween => taffy::JustifyContent::SpaceBetween,
            });
            ts.align_items = Some(match s.align_items {
                css::AlignItems::Start => taffy::AlignItems::Start,
                css::AlignItems::End => taffy::AlignItems::End,
                css::AlignItems::Center => taffy::AlignItems::Center,
                css::AlignItems::Stretch => taffy::AlignItems::Stretch,
            });
        }
        CssDisplay::Block
        | CssDisplay::ListItem
        | CssDisplay::Table
        | CssDisplay::TableRow
        | CssDisplay::TableCell
        | CssDisplay::InlineBlock => {
            // Block-level elements stack vertically.
            ts.display = taffy::Display::Flex;
            ts.flex_direction = taffy::FlexDirection::Column;
        }
        CssDisplay::Inline => {
            ts.display = taffy::Display::Flex;
            ts.flex_direction = taffy::FlexDirection::Row;
            ts.flex_wrap = taffy::FlexWrap::Wrap;
        }
        CssDisplay::None => {
            ts.display = taffy::Display::None;
        }
    }

    ts.size = Size {
        width: dim_to_taffy(s.width),
        height: dim_to_taffy(s.height),
    };
    ts.min_size = Size {
        width: if s.flex_shrink > 0.0 || s.flex_grow > 0.0 {
            taffy::Dimension::Length(0.0)
        } else {
            taffy::Dimension::Auto
        },
        height: taffy::Dimension::Auto,
    };
    ts.max_size = Size {
        width: dim_to_taffy(s.max_width),
        height: dim_to_taffy(s.max_height),
    };
    ts.flex_grow = s.flex_grow;
    ts.flex_shrink = s.flex_shrink;
    ts.gap = Size {
        width: LengthPercentage::Length(s.gap),
        height: LengthPercentage::Length(s.gap),
    };
    spacing(&mut ts);
    ts
}

fn dim_to_taffy(d: css::Dimension) -> taffy::Dimension {
    match d {
        css::Dimension::Auto => taffy::Dimension::Auto,
        css::Dimension::Pt(v) => taffy::Dimension::Length(v),
        css::Dimension::Percent(v) => taffy::Dimension::Percent(v / 100.0),
    }
}

// ---------------------------------------------------------------------------
// Image sizing
// ---------------------------------------------------------------------------

/// Resolve an image's box to concrete point dimensions: explicit sizes win,
/// intrinsic pixel dimensions fill in the rest, and max-width/max-height
/// scale the result down preserving aspect ratio (the logo rule).
///
/// A source that is not a decodable base64 data URI collapses to an empty
/// box; the render stage skips it with a warning as well.
fn resolve_image_dimensions(
    src: &str,
    style: &ComputedStyle,
    parent_width: f32,
) -> ComputedStyle {
    let mut s = style.clone();

    let as_pt = |d: css::Dimension| match d {
        css::Dimension::Pt(v) => Some(v),
        css::Dimension::Percent(p) => Some(parent_width * p / 100.0),
        css::Dimension::Auto => None,
    };

    let intrinsic = decode_intrinsic_size(src);
    let (mut w, mut h) = match (as_pt(s.width), as_pt(s.height), intrinsic) {
        (Some(w), Some(h), _) => (w, h),
        (Some(w), None, Some((iw, ih))) => (w, w * ih / iw),
        (None, Some(h), Some((iw, ih))) => (h * iw / ih, h),
        (None, None, Some((iw, ih))) => (iw, ih),
        (Some(w), None, None) => (w, w),
        (None, Some(h), None) => (h, h),
        (None, None, None) => {
            log::warn!("image has no resolvable dimensions, skipping: {src:.40}");
            (0.0, 0.0)
        }
    };

    // Scale down to fit max constraints, preserving aspect.
    if w > 0.0 && h > 0.0 {
        let mut scale = 1.0f32;
        if let Some(max_w) = as_pt(s.max_width) {
            scale = scale.min(max_w / w);
        }
        if let Some(max_h) = as_pt(s.max_height) {
            scale = scale.min(max_h / h);
        }
        if scale < 1.0 {
            w *= scale;
            h *= scale;
        }
    }

    s.width = css::Dimension::Pt(w);
    s.height = css::Dimension::Pt(h);
    s
}

fn decode_intrinsic_size(src: &str) -> Option<(f32, f32)> {
    if !src.starts_with("data:") || !src.contains(";base64,") {
        return None;
    }
    let comma = src.find(',')?;
    let bytes = BASE64_STD.decode(src[comma + 1..].trim()).ok()?;
    let img = ::image::load_from_memory(&bytes).ok()?;
    let (w, h) = (img.width() as f32, img.height() as f32);
    if w == 0.0 || h == 0.0 {
        None
    } else {
        Some((w, h))
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Compute layout for a styled tree within the given content width, starting
/// at `origin_x` (the page margin). Returns top-level positioned boxes in
/// document coordinates.
pub fn compute_layout(
    styled_nodes: &[StyledNode],
    content_width: f32,
    origin_x: f32,
    fonts: &FontManager,
) -> Vec<PositionedBox> {
    let mut builder = LayoutBuilder::new(fonts, content_width);

    let mut child_ids = Vec::new();
    for node in styled_nodes {
        child_ids.push(builder.build_node(node, content_width));
    }

    let root_style = Style {
        display: taffy::Display::Flex,
        flex_direction: taffy::FlexDirection::Column,
        size: Size {
            width: taffy::Dimension::Length(content_width),
            height: taffy::Dimension::Auto,
        },
        ..Default::default()
    };
    let root = builder
        .taffy
        .new_with_children(root_style, &child_ids)
        .unwrap();

    builder
        .taffy
        .compute_layout(
            root,
            Size {
                width: AvailableSpace::Definite(content_width),
                height: AvailableSpace::MaxContent,
            },
        )
        .unwrap();

    let root_box = builder.extract(root, origin_x, 0.0);
    root_box.children
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::css::Stylesheet;
    use crate::dom::parse_html;

    fn layout_of(html: &str, css: &str) -> Vec<PositionedBox> {
        let sheet = Stylesheet::parse(css).unwrap();
        let dom = parse_html(html);
        let styled = css::build_styled_tree(&dom, &sheet);
        let fonts = FontManager::new();
        compute_layout(&styled, sheet.page.content_width(), sheet.page.margin_pt, &fonts)
    }

    #[test]
    fn paragraph_produces_a_text_box() {
        let boxes = layout_of("<p>Hello world</p>", "");
        assert_eq!(boxes.len(), 1);
        assert!(boxes[0].width > 0.0 && boxes[0].height > 0.0);
        assert!(matches!(&boxes[0].content, BoxContent::Text { lines } if lines[0] == "Hello world"));
    }

    #[test]
    fn table_rows_become_nested_boxes() {
        let boxes = layout_of(
            "<table><tr><th>A</th><th>B</th></tr><tr><td>1</td><td>2</td></tr></table>",
            "table { width: 100%; }",
        );
        assert_eq!(boxes.len(), 1);
        let table = &boxes[0];
        assert_eq!(table.children.len(), 2);
        assert_eq!(table.children[0].children.len(), 2);
        // Cells split the row width roughly in half.
        let row = &table.children[0];
        let (a, b) = (&row.children[0], &row.children[1]);
        assert!((a.width - b.width).abs() < 1.0);
    }

    #[test]
    fn right_aligned_block_claims_full_width() {
        let boxes = layout_of(
            r#"<div class="invoice-title">INVOICE</div>"#,
            ".invoice-title { text-align: right; font-size: 32pt; }",
        );
        let b = &boxes[0];
        // Full content width (A4 minus two default margins).
        assert!(b.width > 400.0, "width was {}", b.width);
    }

    #[test]
    fn flex_row_places_children_side_by_side() {
        let boxes = layout_of(
            r#"<div class="total-row"><span class="total-label">Subtotal:</span><span class="total-amount">270.00</span></div>"#,
            ".total-row { display: flex; justify-content: flex-end; } .total-label { width: 150px; } .total-amount { width: 100px; }",
        );
        let row = &boxes[0];
        assert_eq!(row.children.len(), 2);
        let (label, amount) = (&row.children[0], &row.children[1]);
        assert!((label.width - 150.0).abs() < 0.5);
        assert!((amount.width - 100.0).abs() < 0.5);
        assert!(label.x < amount.x);
        // Pushed to the right edge of the content area.
        assert!(amount.x + amount.width > 400.0);
    }

    #[test]
    fn hidden_elements_take_no_space() {
        let boxes = layout_of("<script>alert(1)</script><p>visible</p>", "");
        let visible: Vec<_> = boxes.iter().filter(|b| b.height > 0.0).collect();
        assert_eq!(visible.len(), 1);
    }

    #[test]
    fn image_max_constraints_scale_down() {
        // 1×1 px PNG scaled up by explicit width/height then clamped.
        let style = ComputedStyle {
            width: css::Dimension::Pt(400.0),
            height: css::Dimension::Pt(160.0),
            max_width: css::Dimension::Pt(200.0),
            max_height: css::Dimension::Pt(80.0),
            ..Default::default()
        };
        let resolved = resolve_image_dimensions("logo.png", &style, 500.0);
        let css::Dimension::Pt(w) = resolved.width else {
            panic!("expected resolved width");
        };
        let css::Dimension::Pt(h) = resolved.height else {
            panic!("expected resolved height");
        };
        assert!((w - 200.0).abs() < 0.5);
        assert!((h - 80.0).abs() < 0.5);
    }
}
